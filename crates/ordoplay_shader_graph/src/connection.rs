// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection (edge) definitions for the graph.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};

/// A connection from a producer's output slot to a consumer's input slot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    /// Source node ID
    pub from_node: NodeId,
    /// Source output slot name
    pub from_slot: String,
    /// Target node ID
    pub to_node: NodeId,
    /// Target input slot name
    pub to_slot: String,
}

impl Connection {
    /// Create a new connection
    pub fn new(
        from_node: NodeId,
        from_slot: impl Into<String>,
        to_node: NodeId,
        to_slot: impl Into<String>,
    ) -> Self {
        Self {
            from_node,
            from_slot: from_slot.into(),
            to_node,
            to_slot: to_slot.into(),
        }
    }

    /// Check if this connection involves a specific node
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.from_node == node_id || self.to_node == node_id
    }

    /// Check if this connection feeds a specific input slot
    pub fn targets(&self, node_id: NodeId, slot: &str) -> bool {
        self.to_node == node_id && self.to_slot == slot
    }
}
