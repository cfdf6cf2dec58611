// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and connections.
//!
//! A [`Graph`] is an immutable snapshot. It is assembled with a
//! [`GraphBuilder`] and changed afterwards only through the `with_*` /
//! `without_*` methods, each of which returns a new graph and leaves the
//! original untouched, so a compile holding a reference always sees one
//! consistent state.
//!
//! Deserialized graphs are checked the same way: every node key must match
//! its node ID, the root and all connection endpoints must exist, and each
//! input slot takes at most one connection.

use crate::connection::Connection;
use crate::node::{Node, NodeId};
use crate::slot::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A shader node graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GraphData", into = "GraphData")]
pub struct Graph {
    /// Graph name
    name: String,
    /// Nodes in the graph
    nodes: IndexMap<NodeId, Node>,
    /// Connections between nodes
    connections: Vec<Connection>,
    /// Sink node compilation starts from
    root: NodeId,
}

impl Graph {
    /// Graph name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// ID of the root (sink) node
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get all connections
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter()
    }

    /// Get the connection feeding an input slot, if any
    pub fn connection_to(&self, node_id: NodeId, slot: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.targets(node_id, slot))
    }

    /// Get connections leaving a node
    pub fn connections_from(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.from_node == node_id)
    }

    /// Get connections involving a node
    pub fn connections_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.involves_node(node_id))
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Copy with a different name
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Copy with a node added, or replaced if its ID is already present.
    ///
    /// Existing connections are kept as they are.
    pub fn with_node(&self, node: Node) -> Self {
        let mut graph = self.clone();
        graph.nodes.insert(node.id, node);
        graph
    }

    /// Copy with a constant or parameter node holding a new value
    pub fn with_node_value(&self, node_id: NodeId, value: Value) -> Result<Self, GraphError> {
        let node = self.node(node_id).ok_or(GraphError::NodeNotFound(node_id))?;
        let node = node
            .clone()
            .with_value(value)
            .ok_or(GraphError::NodeHasNoValue(node_id))?;
        Ok(self.with_node(node))
    }

    /// Copy with a node and its connections removed
    pub fn without_node(&self, node_id: NodeId) -> Result<Self, GraphError> {
        if node_id == self.root {
            return Err(GraphError::RemovesRoot(node_id));
        }
        if !self.nodes.contains_key(&node_id) {
            return Err(GraphError::NodeNotFound(node_id));
        }

        let mut graph = self.clone();
        graph.connections.retain(|c| !c.involves_node(node_id));
        graph.nodes.shift_remove(&node_id);
        Ok(graph)
    }

    /// Copy with an additional connection
    pub fn with_connection(
        &self,
        from_node: NodeId,
        from_slot: &str,
        to_node: NodeId,
        to_slot: &str,
    ) -> Result<Self, ConnectionError> {
        let connection = Connection::new(from_node, from_slot, to_node, to_slot);
        validate_connection(&self.nodes, &self.connections, &connection)?;

        let mut graph = self.clone();
        graph.connections.push(connection);
        Ok(graph)
    }

    /// Copy with the connection feeding an input slot removed
    pub fn without_connection(&self, to_node: NodeId, to_slot: &str) -> Self {
        let mut graph = self.clone();
        graph.connections.retain(|c| !c.targets(to_node, to_slot));
        graph
    }

    /// Copy with a different root node
    pub fn with_root(&self, root: NodeId) -> Result<Self, GraphError> {
        if !self.nodes.contains_key(&root) {
            return Err(GraphError::NodeNotFound(root));
        }
        Ok(Self {
            root,
            ..self.clone()
        })
    }

    /// Append a connection without validation
    #[cfg(test)]
    pub(crate) fn with_connection_unchecked(&self, connection: Connection) -> Self {
        let mut graph = self.clone();
        graph.connections.push(connection);
        graph
    }
}

/// Incremental construction of a [`Graph`]
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    name: String,
    nodes: IndexMap<NodeId, Node>,
    connections: Vec<Connection>,
    root: Option<NodeId>,
}

impl GraphBuilder {
    /// Create a new empty builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            connections: Vec::new(),
            root: None,
        }
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Add a node and make it the root
    pub fn add_root(&mut self, node: Node) -> NodeId {
        let id = self.add_node(node);
        self.root = Some(id);
        id
    }

    /// Choose the root node
    pub fn set_root(&mut self, node_id: NodeId) {
        self.root = Some(node_id);
    }

    /// Add a connection between slots.
    ///
    /// Cycles are not rejected here; compilation reports them.
    pub fn connect(
        &mut self,
        from_node: NodeId,
        from_slot: &str,
        to_node: NodeId,
        to_slot: &str,
    ) -> Result<(), ConnectionError> {
        let connection = Connection::new(from_node, from_slot, to_node, to_slot);
        validate_connection(&self.nodes, &self.connections, &connection)?;
        self.connections.push(connection);
        Ok(())
    }

    /// Finish building
    pub fn build(self) -> Result<Graph, GraphError> {
        let root = self.root.ok_or(GraphError::RootNotSet)?;
        if !self.nodes.contains_key(&root) {
            return Err(GraphError::NodeNotFound(root));
        }

        Ok(Graph {
            name: self.name,
            nodes: self.nodes,
            connections: self.connections,
            root,
        })
    }
}

/// Serialized form of a [`Graph`], validated on the way in
#[derive(Serialize, Deserialize)]
#[serde(rename = "Graph")]
struct GraphData {
    name: String,
    nodes: IndexMap<NodeId, Node>,
    connections: Vec<Connection>,
    root: NodeId,
}

impl From<Graph> for GraphData {
    fn from(graph: Graph) -> Self {
        Self {
            name: graph.name,
            nodes: graph.nodes,
            connections: graph.connections,
            root: graph.root,
        }
    }
}

impl TryFrom<GraphData> for Graph {
    type Error = GraphError;

    fn try_from(data: GraphData) -> Result<Self, Self::Error> {
        for (key, node) in &data.nodes {
            if *key != node.id {
                return Err(GraphError::NodeIdMismatch {
                    key: *key,
                    id: node.id,
                });
            }
        }
        if !data.nodes.contains_key(&data.root) {
            return Err(GraphError::NodeNotFound(data.root));
        }

        // Slots may dangle after `with_node`; compilation reports those
        for (index, connection) in data.connections.iter().enumerate() {
            connection_endpoints(&data.nodes, connection)?;
            ensure_input_free(&data.connections[..index], connection)?;
        }

        Ok(Self {
            name: data.name,
            nodes: data.nodes,
            connections: data.connections,
            root: data.root,
        })
    }
}

fn connection_endpoints<'n>(
    nodes: &'n IndexMap<NodeId, Node>,
    connection: &Connection,
) -> Result<(&'n Node, &'n Node), ConnectionError> {
    let source_node = nodes
        .get(&connection.from_node)
        .ok_or(ConnectionError::NodeNotFound(connection.from_node))?;
    let target_node = nodes
        .get(&connection.to_node)
        .ok_or(ConnectionError::NodeNotFound(connection.to_node))?;
    Ok((source_node, target_node))
}

/// An input takes a single connection
fn ensure_input_free(
    connections: &[Connection],
    connection: &Connection,
) -> Result<(), ConnectionError> {
    if connections
        .iter()
        .any(|c| c.targets(connection.to_node, &connection.to_slot))
    {
        return Err(ConnectionError::SlotAlreadyConnected {
            node: connection.to_node,
            slot: connection.to_slot.clone(),
        });
    }
    Ok(())
}

fn validate_connection(
    nodes: &IndexMap<NodeId, Node>,
    connections: &[Connection],
    connection: &Connection,
) -> Result<(), ConnectionError> {
    let (source_node, target_node) = connection_endpoints(nodes, connection)?;

    // Validate slots exist with the right direction
    if source_node.output(&connection.from_slot).is_none() {
        return Err(ConnectionError::SlotNotFound {
            node: connection.from_node,
            slot: connection.from_slot.clone(),
        });
    }
    if target_node.input(&connection.to_slot).is_none() {
        return Err(ConnectionError::SlotNotFound {
            node: connection.to_node,
            slot: connection.to_slot.clone(),
        });
    }

    ensure_input_free(connections, connection)
}

/// Error when creating a connection
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Slot not found
    #[error("Slot '{slot}' not found on node {node}")]
    SlotNotFound {
        /// Node searched
        node: NodeId,
        /// Missing slot name
        slot: String,
    },

    /// Input slot is already connected
    #[error("Slot '{slot}' on node {node} is already connected")]
    SlotAlreadyConnected {
        /// Target node
        node: NodeId,
        /// Target slot name
        slot: String,
    },
}

/// Error when building or modifying a graph
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// No root node was chosen
    #[error("Graph has no root node")]
    RootNotSet,

    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Node carries no value to replace
    #[error("Node {0} has no value")]
    NodeHasNoValue(NodeId),

    /// The root node cannot be removed
    #[error("Cannot remove root node {0}")]
    RemovesRoot(NodeId),

    /// A node is stored under another node's ID
    #[error("Node {id} stored under key {key}")]
    NodeIdMismatch {
        /// Map key
        key: NodeId,
        /// ID carried by the node
        id: NodeId,
    },

    /// Invalid connection
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphs::material::create_material_registry;
    use crate::node::NodeOp;

    fn add_graph() -> (Graph, NodeId, NodeId, NodeId) {
        let registry = create_material_registry();
        let mut builder = GraphBuilder::new("Add");
        let a = builder.add_node(registry.create_node("float_constant").unwrap());
        let b = builder.add_node(registry.create_node("float_constant").unwrap());
        let add = builder.add_root(registry.create_node("add").unwrap());
        builder.connect(a, "Value", add, "A").unwrap();
        builder.connect(b, "Value", add, "B").unwrap();
        (builder.build().unwrap(), a, b, add)
    }

    #[test]
    fn test_build_requires_root() {
        let registry = create_material_registry();
        let mut builder = GraphBuilder::new("No root");
        builder.add_node(registry.create_node("add").unwrap());
        assert_eq!(builder.build().unwrap_err(), GraphError::RootNotSet);
    }

    #[test]
    fn test_connect_validation() {
        let registry = create_material_registry();
        let mut builder = GraphBuilder::new("Test");
        let a = builder.add_node(registry.create_node("float_constant").unwrap());
        let add = builder.add_node(registry.create_node("add").unwrap());

        assert!(matches!(
            builder.connect(a, "Missing", add, "A"),
            Err(ConnectionError::SlotNotFound { .. })
        ));
        // Inputs are not valid sources
        assert!(matches!(
            builder.connect(add, "A", a, "Value"),
            Err(ConnectionError::SlotNotFound { .. })
        ));
        assert!(matches!(
            builder.connect(NodeId::new(), "Value", add, "A"),
            Err(ConnectionError::NodeNotFound(_))
        ));

        builder.connect(a, "Value", add, "A").unwrap();
        assert!(matches!(
            builder.connect(a, "Value", add, "A"),
            Err(ConnectionError::SlotAlreadyConnected { .. })
        ));
    }

    #[test]
    fn test_self_loop_accepted_by_builder() {
        let registry = create_material_registry();
        let mut builder = GraphBuilder::new("Loop");
        let add = builder.add_root(registry.create_node("add").unwrap());
        builder.connect(add, "Result", add, "A").unwrap();
        assert_eq!(builder.build().unwrap().connection_count(), 1);
    }

    #[test]
    fn test_with_node_value_copies() {
        let (graph, a, _, _) = add_graph();
        let edited = graph.with_node_value(a, Value::Float(2.0)).unwrap();

        assert_eq!(graph.node(a).unwrap().op, NodeOp::Constant(Value::Float(0.0)));
        assert_eq!(edited.node(a).unwrap().op, NodeOp::Constant(Value::Float(2.0)));
        assert_eq!(edited.connection_count(), graph.connection_count());

        let root = graph.root();
        assert_eq!(
            graph.with_node_value(root, Value::Float(1.0)).unwrap_err(),
            GraphError::NodeHasNoValue(root)
        );
    }

    #[test]
    fn test_without_node_drops_connections() {
        let (graph, a, b, add) = add_graph();
        let trimmed = graph.without_node(a).unwrap();
        assert_eq!(trimmed.node_count(), 2);
        assert_eq!(trimmed.connection_count(), 1);
        assert!(trimmed.connection_to(add, "A").is_none());
        assert!(trimmed.connection_to(add, "B").is_some());
        assert_eq!(graph.node_count(), 3);

        assert_eq!(graph.without_node(add).unwrap_err(), GraphError::RemovesRoot(add));
        assert_eq!(graph.connections_from(b).count(), 1);
    }

    #[test]
    fn test_with_and_without_connection() {
        let (graph, a, _, add) = add_graph();
        let detached = graph.without_connection(add, "A");
        assert_eq!(detached.connection_count(), 1);

        let reattached = detached.with_connection(a, "Value", add, "A").unwrap();
        assert_eq!(reattached.connection_count(), 2);
        assert!(matches!(
            graph.with_connection(a, "Value", add, "A"),
            Err(ConnectionError::SlotAlreadyConnected { .. })
        ));
    }

    #[test]
    fn test_with_root() {
        let (graph, a, _, _) = add_graph();
        assert_eq!(graph.with_root(a).unwrap().root(), a);
        assert!(matches!(
            graph.with_root(NodeId::new()),
            Err(GraphError::NodeNotFound(_))
        ));
        assert_eq!(graph.with_name("Renamed").name(), "Renamed");
    }

    #[test]
    fn test_set_root_and_lookups() {
        let registry = create_material_registry();
        let mut builder = GraphBuilder::new("Lookups");
        let k = builder.add_node(registry.create_node("float_constant").unwrap());
        let neg = builder.add_node(registry.create_node("negate").unwrap());
        builder.connect(k, "Value", neg, "Value").unwrap();
        builder.set_root(neg);
        let graph = builder.build().unwrap();

        assert_eq!(graph.root(), neg);
        assert_eq!(graph.node_ids().collect::<Vec<_>>(), vec![k, neg]);
        assert_eq!(graph.nodes().count(), 2);
        assert_eq!(graph.connections_for_node(k).count(), 1);
        assert_eq!(graph.connections_for_node(neg).count(), 1);

        let mut builder = GraphBuilder::new("Dangling root");
        builder.set_root(NodeId::new());
        assert!(matches!(builder.build(), Err(GraphError::NodeNotFound(_))));
    }

    fn to_ron<T: Serialize>(value: &T) -> String {
        ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default()).unwrap()
    }

    #[test]
    fn test_serialization() {
        let (graph, a, _, add) = add_graph();
        let graph = graph.with_node_value(a, Value::Float(1.5)).unwrap();

        let loaded: Graph = ron::from_str(&to_ron(&graph)).unwrap();
        assert_eq!(loaded, graph);
        assert_eq!(loaded.connection_to(add, "A").unwrap().from_node, a);
    }

    #[test]
    fn test_deserialize_rejects_second_connection_into_input() {
        let (graph, _, b, add) = add_graph();
        let mut data = GraphData::from(graph);
        data.connections.push(Connection::new(b, "Value", add, "A"));

        let err = ron::from_str::<Graph>(&to_ron(&data)).unwrap_err();
        assert!(err.to_string().contains("already connected"), "{err}");
    }

    #[test]
    fn test_deserialize_rejects_inconsistent_nodes() {
        let (graph, a, _, _) = add_graph();

        let mut data = GraphData::from(graph.clone());
        let node = data.nodes.shift_remove(&a).unwrap();
        data.nodes.insert(NodeId::new(), node);
        let err = ron::from_str::<Graph>(&to_ron(&data)).unwrap_err();
        assert!(err.to_string().contains("stored under key"), "{err}");

        let mut data = GraphData::from(graph.clone());
        data.connections.push(Connection::new(NodeId::new(), "Value", a, "Value"));
        assert!(ron::from_str::<Graph>(&to_ron(&data)).is_err());

        let mut data = GraphData::from(graph);
        data.root = NodeId::new();
        assert!(ron::from_str::<Graph>(&to_ron(&data)).is_err());
    }

    #[test]
    fn test_deserialize_keeps_dangling_slot() {
        let (graph, a, _, add) = add_graph();
        let registry = create_material_registry();
        let mut replacement = registry.create_node("negate").unwrap();
        replacement.id = add;
        let graph = graph.with_node(replacement);

        let loaded: Graph = ron::from_str(&to_ron(&graph)).unwrap();
        assert_eq!(loaded.connection_to(add, "A").unwrap().from_node, a);
    }
}
