// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the shader graph.

use crate::slot::{Dimension, Slot, Value};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Node type category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Input nodes (constants, parameters, shader inputs)
    Input,
    /// Output nodes
    Output,
    /// Math operations
    Math,
    /// Vector composition
    Utility,
}

/// Elementwise two-operand operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    /// `a + b`
    Add,
    /// `a - b`
    Subtract,
    /// `a * b`
    Multiply,
    /// `a / b`
    Divide,
    /// `min(a, b)`
    Min,
    /// `max(a, b)`
    Max,
}

impl BinaryOp {
    /// Render the operation over two operand symbols
    pub fn render(self, a: &str, b: &str) -> String {
        match self {
            Self::Add => format!("({a} + {b})"),
            Self::Subtract => format!("({a} - {b})"),
            Self::Multiply => format!("({a} * {b})"),
            Self::Divide => format!("({a} / {b})"),
            Self::Min => format!("min({a}, {b})"),
            Self::Max => format!("max({a}, {b})"),
        }
    }
}

/// Single-operand operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `-x`
    Negate,
    /// `1 - x`
    OneMinus,
    /// Absolute value
    Abs,
    /// Clamp to `[0, 1]`
    Saturate,
    /// Fractional part
    Fract,
    /// Round down
    Floor,
    /// Round up
    Ceil,
    /// Sine
    Sin,
    /// Cosine
    Cos,
    /// Square root
    Sqrt,
    /// Unit-length vector
    Normalize,
    /// Vector length
    Length,
}

impl UnaryOp {
    /// Render the operation over an operand symbol
    pub fn render(self, x: &str) -> String {
        let function = match self {
            Self::Negate => return format!("(-{x})"),
            Self::OneMinus => return format!("(1.0 - {x})"),
            Self::Abs => "abs",
            Self::Saturate => "saturate",
            Self::Fract => "fract",
            Self::Floor => "floor",
            Self::Ceil => "ceil",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Sqrt => "sqrt",
            Self::Normalize => "normalize",
            Self::Length => "length",
        };
        format!("{function}({x})")
    }

    /// Width of the result for an operand of the given width
    pub fn output_dimension(self, input: Dimension) -> Dimension {
        match self {
            Self::Length => Dimension::Scalar,
            _ => input,
        }
    }
}

/// Values provided by the shader stage itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShaderInput {
    /// Mesh texture coordinates
    Uv,
    /// Fragment world position
    WorldPosition,
    /// Fragment world normal
    WorldNormal,
    /// Per-vertex color
    VertexColor,
    /// Elapsed time in seconds
    Time,
}

impl ShaderInput {
    /// Source text referring to the input
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Uv => "in.uv",
            Self::WorldPosition => "in.world_position",
            Self::WorldNormal => "in.world_normal",
            Self::VertexColor => "in.color",
            Self::Time => "uniforms.time",
        }
    }

    /// Width of the input
    pub fn dimension(self) -> Dimension {
        match self {
            Self::Uv => Dimension::Vec2,
            Self::WorldPosition | Self::WorldNormal => Dimension::Vec3,
            Self::VertexColor => Dimension::Vec4,
            Self::Time => Dimension::Scalar,
        }
    }
}

/// Operation a node performs when compiled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeOp {
    /// Inline constant
    Constant(Value),
    /// Externally supplied value exposed under a unique name
    Parameter {
        /// Requested parameter name
        name: String,
        /// Default value
        default: Value,
    },
    /// Built-in shader stage input
    Input(ShaderInput),
    /// Elementwise binary operation on `A` and `B`
    Binary(BinaryOp),
    /// Unary operation on `Value`
    Unary(UnaryOp),
    /// Dot product of `A` and `B`
    Dot,
    /// Split `Vector` into `R`, `G`, `B`, `A`
    Split,
    /// Combine scalar channels into a vector
    Combine(Dimension),
    /// Graph sink
    Output,
}

/// Node type definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeType {
    /// Unique type identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Category
    pub category: NodeCategory,
    /// Description
    pub description: String,
    /// Operation
    pub op: NodeOp,
    /// Default input slots
    pub inputs: Vec<Slot>,
    /// Default output slots
    pub outputs: Vec<Slot>,
}

/// A node instance in the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Node type ID
    pub node_type: String,
    /// Display name (can be customized)
    pub name: String,
    /// Operation
    pub op: NodeOp,
    /// Input slots
    pub inputs: Vec<Slot>,
    /// Output slots
    pub outputs: Vec<Slot>,
}

impl Node {
    /// Create a new node from a type definition
    pub fn new(node_type: &NodeType) -> Self {
        Self {
            id: NodeId::new(),
            node_type: node_type.id.clone(),
            name: node_type.name.clone(),
            op: node_type.op.clone(),
            inputs: node_type.inputs.clone(),
            outputs: node_type.outputs.clone(),
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replace the value of a constant or parameter node.
    ///
    /// The output slot follows the new value's width. Returns `None` for
    /// nodes that hold no value.
    pub fn with_value(mut self, value: Value) -> Option<Self> {
        match &mut self.op {
            NodeOp::Constant(v) => *v = value,
            NodeOp::Parameter { default, .. } => *default = value,
            _ => return None,
        }
        for slot in &mut self.outputs {
            slot.dimension = value.dimension();
        }
        Some(self)
    }

    /// Set the requested name of a parameter node. Returns `None` for other
    /// nodes.
    pub fn with_parameter_name(mut self, requested: impl Into<String>) -> Option<Self> {
        match &mut self.op {
            NodeOp::Parameter { name, .. } => *name = requested.into(),
            _ => return None,
        }
        Some(self)
    }

    /// Get an input slot by name
    pub fn input(&self, name: &str) -> Option<&Slot> {
        self.inputs.iter().find(|s| s.name == name)
    }

    /// Get an output slot by name
    pub fn output(&self, name: &str) -> Option<&Slot> {
        self.outputs.iter().find(|s| s.name == name)
    }

    /// Get all slots
    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.inputs.iter().chain(self.outputs.iter())
    }
}

/// Registry of available node types
pub struct NodeRegistry {
    /// Registered node types by ID
    types: indexmap::IndexMap<String, NodeType>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            types: indexmap::IndexMap::new(),
        }
    }

    /// Register a node type
    pub fn register(&mut self, node_type: NodeType) {
        self.types.insert(node_type.id.clone(), node_type);
    }

    /// Get a node type by ID
    pub fn get(&self, id: &str) -> Option<&NodeType> {
        self.types.get(id)
    }

    /// Get all registered types
    pub fn types(&self) -> impl Iterator<Item = &NodeType> {
        self.types.values()
    }

    /// Get types by category
    pub fn types_in_category(&self, category: NodeCategory) -> impl Iterator<Item = &NodeType> {
        self.types.values().filter(move |t| t.category == category)
    }

    /// Create a node from a type ID
    pub fn create_node(&self, type_id: &str) -> Option<Node> {
        self.get(type_id).map(Node::new)
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant_type() -> NodeType {
        NodeType {
            id: "float_constant".to_string(),
            name: "Float".to_string(),
            category: NodeCategory::Input,
            description: "Constant float value".to_string(),
            op: NodeOp::Constant(Value::Float(0.0)),
            inputs: vec![],
            outputs: vec![Slot::output("Value", Dimension::Scalar)],
        }
    }

    #[test]
    fn test_render_ops() {
        assert_eq!(BinaryOp::Add.render("a", "b"), "(a + b)");
        assert_eq!(BinaryOp::Max.render("a", "b"), "max(a, b)");
        assert_eq!(UnaryOp::Negate.render("x"), "(-x)");
        assert_eq!(UnaryOp::OneMinus.render("x"), "(1.0 - x)");
        assert_eq!(UnaryOp::Saturate.render("x"), "saturate(x)");
        assert_eq!(UnaryOp::Length.output_dimension(Dimension::Vec3), Dimension::Scalar);
        assert_eq!(UnaryOp::Sin.output_dimension(Dimension::Vec3), Dimension::Vec3);
    }

    #[test]
    fn test_with_value_updates_output_width() {
        let node = Node::new(&constant_type())
            .with_value(Value::Float3([1.0, 0.0, 0.0]))
            .unwrap();
        assert_eq!(node.op, NodeOp::Constant(Value::Float3([1.0, 0.0, 0.0])));
        assert_eq!(node.output("Value").unwrap().dimension, Dimension::Vec3);
        assert!(node.with_parameter_name("tint").is_none());
    }

    #[test]
    fn test_renamed_node_keeps_slots() {
        let mut node_type = constant_type();
        node_type.inputs.push(Slot::input("Scale", Dimension::Scalar));
        let node = Node::new(&node_type).with_name("Intensity");

        assert_eq!(node.name, "Intensity");
        assert_eq!(node.node_type, "float_constant");
        let names: Vec<_> = node.slots().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Scale", "Value"]);
    }

    #[test]
    fn test_registry_creates_fresh_ids() {
        let mut registry = NodeRegistry::new();
        registry.register(constant_type());
        let a = registry.create_node("float_constant").unwrap();
        let b = registry.create_node("float_constant").unwrap();
        assert_ne!(a.id, b.id);
        assert!(registry.create_node("missing").is_none());
        assert_eq!(registry.types_in_category(NodeCategory::Input).count(), 1);
    }
}
