// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shader graph compiler for `OrdoPlay` materials.
//!
//! Turns an immutable node graph into shading-language expression fragments
//! plus a list of uniquely named external parameters, ready to be spliced
//! into a generated shader program.
//!
//! ## Architecture
//!
//! - [`expression`]: symbolic expressions with swizzle/widen rules
//! - [`resolve`]: operand width pairing for binary operations
//! - [`node`], [`slot`], [`connection`], [`graph`]: the immutable graph model
//! - [`compiler`]: memoized depth-first compilation and parameter naming
//! - [`graphs`]: node catalogues
//!
//! ```
//! use ordoplay_shader_graph::graphs::material::create_material_registry;
//! use ordoplay_shader_graph::{GraphBuilder, GraphCompiler, Value};
//!
//! let registry = create_material_registry();
//! let mut builder = GraphBuilder::new("Tinted");
//! let tint = builder.add_node(registry.create_node("color_parameter").unwrap());
//! let uv = builder.add_node(registry.create_node("uv_coord").unwrap());
//! let mul = builder.add_node(registry.create_node("multiply").unwrap());
//! let out = builder.add_root(registry.create_node("unlit_output").unwrap());
//! builder.connect(tint, "Value", mul, "A").unwrap();
//! builder.connect(uv, "Value", mul, "B").unwrap();
//! builder.connect(mul, "Result", out, "Color").unwrap();
//! let graph = builder.build().unwrap();
//!
//! let compiled = GraphCompiler::new(&graph).compile_graph().unwrap();
//! assert_eq!(
//!     compiled.root_output("Color").unwrap().symbol(),
//!     "float4((color_parameter.rg * in.uv), 0.0, 0.0)"
//! );
//! assert_eq!(compiled.parameters[0].declaration(), "float4 color_parameter;");
//! assert_eq!(compiled.parameters[0].default, Value::Float4([1.0; 4]));
//! ```

pub mod compiler;
pub mod config;
pub mod connection;
pub mod expression;
pub mod graph;
pub mod graphs;
pub mod node;
pub mod resolve;
pub mod slot;

pub use compiler::{
    CompileError, CompiledGraph, GraphCompiler, NodeOutputs, Parameter, StructuralError,
};
pub use config::CompilerOptions;
pub use connection::Connection;
pub use expression::{DimensionError, Expression};
pub use graph::{ConnectionError, Graph, GraphBuilder, GraphError};
pub use node::{BinaryOp, Node, NodeId, NodeOp, NodeType, ShaderInput, UnaryOp};
pub use resolve::resolve_input_expressions;
pub use slot::{Dimension, Slot, SlotDirection, Value};
