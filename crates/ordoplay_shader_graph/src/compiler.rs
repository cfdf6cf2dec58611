// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph compilation to shader expressions.
//!
//! [`GraphCompiler`] walks a [`Graph`] depth-first from its root, compiling
//! each producer before its consumers. Every node is compiled at most once
//! per session: the result is cached by node ID, so a parameter node feeding
//! several consumers allocates its parameter exactly once.
//!
//! A compiler is consumed by [`GraphCompiler::compile_graph`]; its cache and
//! parameter-name registry never outlive one compilation.

use crate::config::CompilerOptions;
use crate::connection::Connection;
use crate::expression::{DimensionError, Expression};
use crate::graph::Graph;
use crate::node::{Node, NodeId, NodeOp};
use crate::resolve::{elementwise_dimension, resolve_input_expressions, UNCONNECTED_DIMENSION};
use crate::slot::{Dimension, Slot, Value};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// Input slots of vector combine nodes, in channel order
const CHANNEL_SLOTS: [&str; 4] = ["R", "G", "B", "A"];

/// Compiled outputs of one node, keyed by slot name
pub type NodeOutputs = IndexMap<String, Expression>;

/// Externally supplied value referenced by name in compiled expressions
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Parameter type
    pub ty: Dimension,
    /// Session-unique name
    pub name: String,
    /// Default value
    pub default: Value,
}

impl Parameter {
    /// Declaration statement, e.g. `float4 tint;`
    pub fn declaration(&self) -> String {
        format!("{} {};", self.ty.type_name(), self.name)
    }
}

/// Result of compiling a graph
#[derive(Debug, Clone)]
pub struct CompiledGraph {
    /// Outputs of the root node
    pub root: NodeOutputs,
    /// Outputs of additionally requested nodes
    pub outputs: IndexMap<NodeId, NodeOutputs>,
    /// Parameters in allocation order
    pub parameters: Vec<Parameter>,
}

impl CompiledGraph {
    /// Get a root output by slot name
    pub fn root_output(&self, slot: &str) -> Option<&Expression> {
        self.root.get(slot)
    }

    /// Get an output of a requested node
    pub fn output(&self, node_id: NodeId, slot: &str) -> Option<&Expression> {
        self.outputs.get(&node_id)?.get(slot)
    }
}

/// Memoized depth-first graph compiler, one per compilation
pub struct GraphCompiler<'a> {
    /// The graph being compiled
    graph: &'a Graph,
    options: CompilerOptions,
    /// Cached node outputs
    compiled: HashMap<NodeId, NodeOutputs>,
    /// Nodes on the current traversal path
    visiting: HashSet<NodeId>,
    parameter_names: HashSet<String>,
    parameters: Vec<Parameter>,
}

/// A node whose inputs are being gathered
struct Frame<'a> {
    node: &'a Node,
    /// Index of the first input not yet resolved
    next_input: usize,
    inputs: HashMap<&'a str, Option<Expression>>,
}

impl<'a> GraphCompiler<'a> {
    /// Create a compiler with default options
    pub fn new(graph: &'a Graph) -> Self {
        Self::with_options(graph, CompilerOptions::default())
    }

    /// Create a compiler with explicit options
    pub fn with_options(graph: &'a Graph, options: CompilerOptions) -> Self {
        let parameter_names = options.reserved_names.iter().cloned().collect();
        Self {
            graph,
            options,
            compiled: HashMap::new(),
            visiting: HashSet::new(),
            parameter_names,
            parameters: Vec::new(),
        }
    }

    /// Compile the graph from its root
    pub fn compile_graph(self) -> Result<CompiledGraph, CompileError> {
        self.compile_graph_with_outputs(&[])
    }

    /// Compile the graph from its root, also returning the outputs of
    /// `requested` nodes from the same session
    pub fn compile_graph_with_outputs(
        mut self,
        requested: &[NodeId],
    ) -> Result<CompiledGraph, CompileError> {
        tracing::debug!(
            graph = self.graph.name(),
            nodes = self.graph.node_count(),
            "Compiling shader graph"
        );

        let root = self.compile_node(self.graph.root())?;

        let mut outputs = IndexMap::new();
        for &node_id in requested {
            let node_outputs = self.compile_node(node_id)?;
            outputs.insert(node_id, node_outputs);
        }

        tracing::debug!(
            graph = self.graph.name(),
            compiled = self.compiled.len(),
            parameters = self.parameters.len(),
            "Compiled shader graph"
        );

        Ok(CompiledGraph {
            root,
            outputs,
            parameters: self.parameters,
        })
    }

    /// Allocate a parameter under a name unique within this session.
    ///
    /// The requested name is made into an identifier first; on collision a
    /// numeric suffix is appended.
    pub fn add_parameter(
        &mut self,
        ty: Dimension,
        requested: &str,
        default: Value,
    ) -> Result<String, CompileError> {
        let base = sanitize_identifier(requested);
        let name = self
            .allocate_name(&base)
            .ok_or_else(|| CompileError::NameAllocationExhausted {
                requested: requested.to_string(),
            })?;

        if name != base {
            tracing::debug!(requested, name = %name, "Parameter name disambiguated");
        }
        tracing::trace!(name = %name, ty = %ty, "Allocated parameter");

        self.parameter_names.insert(name.clone());
        self.parameters.push(Parameter {
            ty,
            name: name.clone(),
            default,
        });
        Ok(name)
    }

    fn allocate_name(&self, base: &str) -> Option<String> {
        if !self.parameter_names.contains(base) {
            return Some(base.to_string());
        }
        (1..=self.options.max_name_suffix)
            .map(|n| format!("{base}_{n}"))
            .find(|candidate| !self.parameter_names.contains(candidate))
    }

    /// Compile a node and everything it depends on.
    ///
    /// Dependencies are walked with an explicit stack of frames so that
    /// long chains do not exhaust the thread stack. A frame whose next input
    /// is fed by an uncompiled producer pushes that producer and retries the
    /// same input once the producer is cached.
    fn compile_node(&mut self, node_id: NodeId) -> Result<NodeOutputs, CompileError> {
        if let Some(cached) = self.compiled.get(&node_id) {
            return Ok(cached.clone());
        }

        let graph = self.graph;
        let mut stack = vec![self.enter(node_id)?];
        while let Some(frame) = stack.last_mut() {
            let node = frame.node;
            let Some(slot) = node.inputs.get(frame.next_input) else {
                let Some(frame) = stack.pop() else { break };
                let outputs = self.finish(frame)?;
                if stack.is_empty() {
                    return Ok(outputs);
                }
                continue;
            };

            let expr = match graph.connection_to(node.id, &slot.name) {
                None => slot.default_expression(),
                Some(connection) => match self.compiled.get(&connection.from_node) {
                    Some(outputs) => Some(producer_output(outputs, connection)?),
                    None => {
                        let producer = self.enter(connection.from_node)?;
                        stack.push(producer);
                        continue;
                    }
                },
            };
            frame.inputs.insert(slot.name.as_str(), expr);
            frame.next_input += 1;
        }

        Err(StructuralError::NodeNotFound(node_id).into())
    }

    /// Start compiling a node: mark it visiting and check its connections
    fn enter(&mut self, node_id: NodeId) -> Result<Frame<'a>, CompileError> {
        if !self.visiting.insert(node_id) {
            return Err(StructuralError::Cycle { node: node_id }.into());
        }

        let graph = self.graph;
        let node = graph
            .node(node_id)
            .ok_or(StructuralError::NodeNotFound(node_id))?;

        // Connections left dangling by a node replacement
        for connection in graph.connections().filter(|c| c.to_node == node_id) {
            if node.input(&connection.to_slot).is_none() {
                return Err(StructuralError::SlotNotFound {
                    node: node_id,
                    slot: connection.to_slot.clone(),
                }
                .into());
            }
        }

        Ok(Frame {
            node,
            next_input: 0,
            inputs: HashMap::new(),
        })
    }

    /// Apply the node's template once all inputs are known, then cache
    fn finish(&mut self, frame: Frame<'a>) -> Result<NodeOutputs, CompileError> {
        let node = frame.node;
        let outputs = self.apply_template(node, &frame.inputs)?;
        check_outputs(node, &outputs)?;

        tracing::trace!(node = %node.id, node_type = %node.node_type, "Compiled node");

        self.visiting.remove(&node.id);
        self.compiled.insert(node.id, outputs.clone());
        Ok(outputs)
    }

    fn apply_template(
        &mut self,
        node: &Node,
        inputs: &HashMap<&str, Option<Expression>>,
    ) -> Result<NodeOutputs, CompileError> {
        let mut outputs = NodeOutputs::new();

        match &node.op {
            NodeOp::Constant(value) => {
                let slot = single_output(node)?;
                expect_declared(node, slot, value.dimension())?;
                outputs.insert(slot.name.clone(), value.to_expression());
            }
            NodeOp::Parameter { name, default } => {
                let slot = single_output(node)?;
                expect_declared(node, slot, default.dimension())?;
                let name = self.add_parameter(default.dimension(), name, *default)?;
                outputs.insert(slot.name.clone(), Expression::new(name, default.dimension()));
            }
            NodeOp::Input(input) => {
                let slot = single_output(node)?;
                expect_declared(node, slot, input.dimension())?;
                outputs.insert(
                    slot.name.clone(),
                    Expression::new(input.symbol(), input.dimension()),
                );
            }
            NodeOp::Binary(op) => {
                let (a, b) = resolve_input_expressions(
                    operand(node, inputs, "A")?,
                    operand(node, inputs, "B")?,
                );
                let dimension = elementwise_dimension(&a, &b)
                    .map_err(|e| dimension_error(node, None, e))?;
                let slot = single_output(node)?;
                outputs.insert(
                    slot.name.clone(),
                    Expression::new(op.render(&a.symbol(), &b.symbol()), dimension),
                );
            }
            NodeOp::Unary(op) => {
                let x = operand(node, inputs, "Value")?
                    .unwrap_or_else(|| Expression::literal(UNCONNECTED_DIMENSION));
                let slot = single_output(node)?;
                outputs.insert(
                    slot.name.clone(),
                    Expression::new(op.render(&x.symbol()), op.output_dimension(x.dimension())),
                );
            }
            NodeOp::Dot => {
                let (a, b) = resolve_input_expressions(
                    operand(node, inputs, "A")?,
                    operand(node, inputs, "B")?,
                );
                if a.dimension() != b.dimension() {
                    return Err(dimension_error(
                        node,
                        None,
                        DimensionError::Mismatch {
                            left: a.dimension(),
                            right: b.dimension(),
                        },
                    ));
                }
                let slot = single_output(node)?;
                outputs.insert(
                    slot.name.clone(),
                    Expression::new(
                        format!("dot({}, {})", a.symbol(), b.symbol()),
                        Dimension::Scalar,
                    ),
                );
            }
            NodeOp::Split => {
                let vector = operand(node, inputs, "Vector")?
                    .unwrap_or_else(|| Expression::literal(UNCONNECTED_DIMENSION));
                for (index, slot) in node.outputs.iter().enumerate() {
                    // Channels past the input's width read as zero padding
                    let channel = if index < vector.dimension().width() {
                        vector.channel(index)
                    } else if index < Dimension::Vec4.width() {
                        Ok(Expression::literal(Dimension::Scalar))
                    } else {
                        Err(DimensionError::ChannelOutOfRange {
                            channel: index,
                            dimension: Dimension::Vec4,
                        })
                    };
                    let channel = channel.map_err(|e| dimension_error(node, Some(&slot.name), e))?;
                    outputs.insert(slot.name.clone(), channel);
                }
            }
            NodeOp::Combine(dimension) => {
                let mut args = Vec::with_capacity(dimension.width());
                for name in CHANNEL_SLOTS.into_iter().take(dimension.width()) {
                    let component = coerce_input(node, name, inputs, Dimension::Scalar)?;
                    args.push(component.symbol().into_owned());
                }
                let slot = single_output(node)?;
                outputs.insert(
                    slot.name.clone(),
                    Expression::new(
                        format!("{}({})", dimension.type_name(), args.join(", ")),
                        *dimension,
                    ),
                );
            }
            NodeOp::Output => {
                for slot in &node.inputs {
                    let expr = coerce_input(node, &slot.name, inputs, slot.dimension)?;
                    outputs.insert(slot.name.clone(), expr);
                }
            }
        }

        Ok(outputs)
    }
}

/// Named output of a compiled producer
fn producer_output(
    producer_outputs: &NodeOutputs,
    connection: &Connection,
) -> Result<Expression, CompileError> {
    producer_outputs
        .get(&connection.from_slot)
        .cloned()
        .ok_or_else(|| {
            StructuralError::SlotNotFound {
                node: connection.from_node,
                slot: connection.from_slot.clone(),
            }
            .into()
        })
}

/// Make a requested name usable as an identifier
fn sanitize_identifier(requested: &str) -> String {
    let mut name: String = requested
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if name.is_empty() {
        name.push_str("param");
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

/// Compiled expression of a named input, checking the slot is declared
fn operand(
    node: &Node,
    inputs: &HashMap<&str, Option<Expression>>,
    name: &str,
) -> Result<Option<Expression>, CompileError> {
    match inputs.get(name) {
        Some(expr) => Ok(expr.clone()),
        None => Err(StructuralError::SlotNotFound {
            node: node.id,
            slot: name.to_string(),
        }
        .into()),
    }
}

/// Input expression narrowed or widened to `dimension`
fn coerce_input(
    node: &Node,
    name: &str,
    inputs: &HashMap<&str, Option<Expression>>,
    dimension: Dimension,
) -> Result<Expression, CompileError> {
    operand(node, inputs, name)?
        .unwrap_or_else(|| Expression::literal(UNCONNECTED_DIMENSION))
        .coerce(dimension)
        .map_err(|e| dimension_error(node, Some(name), e))
}

fn single_output(node: &Node) -> Result<&Slot, CompileError> {
    node.outputs
        .first()
        .ok_or_else(|| StructuralError::NoOutputSlot(node.id).into())
}

fn expect_declared(node: &Node, slot: &Slot, actual: Dimension) -> Result<(), CompileError> {
    if slot.dimension == actual {
        Ok(())
    } else {
        Err(dimension_error(
            node,
            Some(&slot.name),
            DimensionError::DeclaredMismatch {
                declared: slot.dimension,
                actual,
            },
        ))
    }
}

/// Every output must fit the slot it is published under
fn check_outputs(node: &Node, outputs: &NodeOutputs) -> Result<(), CompileError> {
    // The sink publishes its inputs
    if matches!(node.op, NodeOp::Output) {
        return Ok(());
    }
    for (name, expr) in outputs {
        let slot = node.output(name).ok_or_else(|| StructuralError::SlotNotFound {
            node: node.id,
            slot: name.clone(),
        })?;
        if expr.dimension() > slot.dimension {
            return Err(dimension_error(
                node,
                Some(name),
                DimensionError::DeclaredMismatch {
                    declared: slot.dimension,
                    actual: expr.dimension(),
                },
            ));
        }
    }
    Ok(())
}

fn dimension_error(node: &Node, slot: Option<&str>, source: DimensionError) -> CompileError {
    CompileError::Dimension {
        node: node.id,
        slot: slot.map(str::to_string),
        source,
    }
}

/// Error in the shape of the graph
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructuralError {
    /// A connection or the root refers to a missing node
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// A connection refers to a missing slot
    #[error("Slot '{slot}' not found on node {node}")]
    SlotNotFound {
        /// Node searched
        node: NodeId,
        /// Missing slot name
        slot: String,
    },

    /// A node that must produce a value declares no output slot
    #[error("Node {0} has no output slot")]
    NoOutputSlot(NodeId),

    /// The node depends on its own output
    #[error("Dependency cycle through node {node}")]
    Cycle {
        /// Node reached twice on one path
        node: NodeId,
    },
}

/// Error during compilation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// Graph structure is invalid
    #[error(transparent)]
    Structural(#[from] StructuralError),

    /// Operand widths cannot be reconciled
    #[error("Dimension error on node {node}: {source}")]
    Dimension {
        /// Offending node
        node: NodeId,
        /// Offending slot, when one slot is at fault
        slot: Option<String>,
        /// Underlying error
        source: DimensionError,
    },

    /// No free parameter name within the suffix bound
    #[error("Could not allocate a unique name for parameter '{requested}'")]
    NameAllocationExhausted {
        /// Name as requested
        requested: String,
    },
}
