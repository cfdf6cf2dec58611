// SPDX-License-Identifier: MIT OR Apache-2.0
//! Material/shader graph node catalogue.
//!
//! Every node type here maps onto a [`NodeOp`] the compiler knows how to
//! turn into an expression.

use crate::node::{BinaryOp, NodeCategory, NodeOp, NodeRegistry, NodeType, ShaderInput, UnaryOp};
use crate::slot::{Dimension, Slot, Value};

/// Create the material graph node registry with all available node types
pub fn create_material_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();

    // ========================================================================
    // Output Nodes
    // ========================================================================

    registry.register(NodeType {
        id: "surface_output".to_string(),
        name: "Surface Output".to_string(),
        category: NodeCategory::Output,
        description: "Final surface attributes".to_string(),
        op: NodeOp::Output,
        inputs: vec![
            Slot::input("Base Color", Dimension::Vec4),
            Slot::input("Normal", Dimension::Vec3),
            Slot::input("Emission", Dimension::Vec3),
            Slot::input("Metallic", Dimension::Scalar),
            Slot::input("Roughness", Dimension::Scalar).with_default(Value::Float(0.5)),
            Slot::input("Opacity", Dimension::Scalar).with_default(Value::Float(1.0)),
        ],
        outputs: vec![],
    });

    registry.register(NodeType {
        id: "unlit_output".to_string(),
        name: "Unlit Output".to_string(),
        category: NodeCategory::Output,
        description: "Unlit color output (no lighting)".to_string(),
        op: NodeOp::Output,
        inputs: vec![Slot::input("Color", Dimension::Vec4)],
        outputs: vec![],
    });

    // ========================================================================
    // Input Nodes - Constants
    // ========================================================================

    for (id, name, value) in [
        ("float_constant", "Float", Value::Float(0.0)),
        ("vector2_constant", "Vector2", Value::Float2([0.0; 2])),
        ("vector3_constant", "Vector3", Value::Float3([0.0; 3])),
        ("color_constant", "Color", Value::Float4([0.0, 0.0, 0.0, 1.0])),
    ] {
        registry.register(NodeType {
            id: id.to_string(),
            name: name.to_string(),
            category: NodeCategory::Input,
            description: format!("Constant {} value", value.dimension()),
            op: NodeOp::Constant(value),
            inputs: vec![],
            outputs: vec![Slot::output("Value", value.dimension())],
        });
    }

    // ========================================================================
    // Input Nodes - Parameters
    // ========================================================================

    for (id, name, value) in [
        ("float_parameter", "Float Parameter", Value::Float(0.0)),
        ("vector3_parameter", "Vector3 Parameter", Value::Float3([0.0; 3])),
        ("color_parameter", "Color Parameter", Value::Float4([1.0; 4])),
    ] {
        registry.register(NodeType {
            id: id.to_string(),
            name: name.to_string(),
            category: NodeCategory::Input,
            description: format!("Externally supplied {} value", value.dimension()),
            op: NodeOp::Parameter {
                name: name.replace(' ', "_").to_lowercase(),
                default: value,
            },
            inputs: vec![],
            outputs: vec![Slot::output("Value", value.dimension())],
        });
    }

    // ========================================================================
    // Input Nodes - Shader Stage
    // ========================================================================

    for (id, name, input) in [
        ("uv_coord", "UV Coordinates", ShaderInput::Uv),
        ("world_position", "World Position", ShaderInput::WorldPosition),
        ("world_normal", "World Normal", ShaderInput::WorldNormal),
        ("vertex_color", "Vertex Color", ShaderInput::VertexColor),
        ("time", "Time", ShaderInput::Time),
    ] {
        registry.register(NodeType {
            id: id.to_string(),
            name: name.to_string(),
            category: NodeCategory::Input,
            description: format!("Shader input `{}`", input.symbol()),
            op: NodeOp::Input(input),
            inputs: vec![],
            outputs: vec![Slot::output("Value", input.dimension())],
        });
    }

    // ========================================================================
    // Math Nodes - Basic Operations
    // ========================================================================

    for (id, name, description, op) in [
        ("add", "Add", "Add two values", BinaryOp::Add),
        ("subtract", "Subtract", "Subtract B from A", BinaryOp::Subtract),
        ("multiply", "Multiply", "Multiply two values", BinaryOp::Multiply),
        ("divide", "Divide", "Divide A by B", BinaryOp::Divide),
        ("min", "Minimum", "Minimum of two values", BinaryOp::Min),
        ("max", "Maximum", "Maximum of two values", BinaryOp::Max),
    ] {
        registry.register(NodeType {
            id: id.to_string(),
            name: name.to_string(),
            category: NodeCategory::Math,
            description: description.to_string(),
            op: NodeOp::Binary(op),
            inputs: vec![
                Slot::input("A", Dimension::Vec4),
                Slot::input("B", Dimension::Vec4),
            ],
            outputs: vec![Slot::output("Result", Dimension::Vec4)],
        });
    }

    // ========================================================================
    // Math Nodes - Single Operand
    // ========================================================================

    for (id, name, description, op) in [
        ("negate", "Negate", "Negate value (-x)", UnaryOp::Negate),
        ("one_minus", "One Minus", "One minus value (1 - x)", UnaryOp::OneMinus),
        ("abs", "Absolute", "Absolute value", UnaryOp::Abs),
        ("saturate", "Saturate", "Clamp value between 0 and 1", UnaryOp::Saturate),
        ("fract", "Fraction", "Fractional part of value", UnaryOp::Fract),
        ("floor", "Floor", "Round down to nearest integer", UnaryOp::Floor),
        ("ceil", "Ceiling", "Round up to nearest integer", UnaryOp::Ceil),
        ("sin", "Sine", "Sine of angle (radians)", UnaryOp::Sin),
        ("cos", "Cosine", "Cosine of angle (radians)", UnaryOp::Cos),
        ("sqrt", "Square Root", "Square root of value", UnaryOp::Sqrt),
        ("normalize", "Normalize", "Normalize vector to unit length", UnaryOp::Normalize),
    ] {
        registry.register(NodeType {
            id: id.to_string(),
            name: name.to_string(),
            category: NodeCategory::Math,
            description: description.to_string(),
            op: NodeOp::Unary(op),
            inputs: vec![Slot::input("Value", Dimension::Vec4)],
            outputs: vec![Slot::output("Result", Dimension::Vec4)],
        });
    }

    registry.register(NodeType {
        id: "length".to_string(),
        name: "Length".to_string(),
        category: NodeCategory::Math,
        description: "Length of vector".to_string(),
        op: NodeOp::Unary(UnaryOp::Length),
        inputs: vec![Slot::input("Value", Dimension::Vec4)],
        outputs: vec![Slot::output("Result", Dimension::Scalar)],
    });

    // ========================================================================
    // Vector Operations
    // ========================================================================

    registry.register(NodeType {
        id: "dot".to_string(),
        name: "Dot Product".to_string(),
        category: NodeCategory::Math,
        description: "Dot product of two vectors".to_string(),
        op: NodeOp::Dot,
        inputs: vec![
            Slot::input("A", Dimension::Vec4),
            Slot::input("B", Dimension::Vec4),
        ],
        outputs: vec![Slot::output("Result", Dimension::Scalar)],
    });

    registry.register(NodeType {
        id: "split_vector".to_string(),
        name: "Split Vector".to_string(),
        category: NodeCategory::Utility,
        description: "Split a vector into components".to_string(),
        op: NodeOp::Split,
        inputs: vec![Slot::input("Vector", Dimension::Vec4)],
        outputs: ["R", "G", "B", "A"]
            .into_iter()
            .map(|name| Slot::output(name, Dimension::Scalar))
            .collect(),
    });

    for dimension in [Dimension::Vec2, Dimension::Vec3, Dimension::Vec4] {
        registry.register(NodeType {
            id: format!("combine_vector{}", dimension.width()),
            name: format!("Combine Vector{}", dimension.width()),
            category: NodeCategory::Utility,
            description: format!("Combine components into {dimension}"),
            op: NodeOp::Combine(dimension),
            inputs: ["R", "G", "B", "A"][..dimension.width()]
                .iter()
                .map(|name| Slot::input(*name, Dimension::Scalar))
                .collect(),
            outputs: vec![Slot::output("Vector", dimension)],
        });
    }

    registry
}
