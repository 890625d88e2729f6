//! Canvas data model: placed blocks, edges, and the snapshot type.
//!
//! A [`CanvasState`] is only ever handed out behind an `Arc` ([`Snapshot`]).
//! The store mutates its private copy through `Arc::make_mut`, so a snapshot
//! held by a reader is never changed underneath it; the next mutation simply
//! clones the state first.

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Immutable point-in-time view of the canvas.
pub type Snapshot = Arc<CanvasState>;

/// World-space position of a block's top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A block instance on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedBlock {
    pub instance_id: String,
    /// Always resolves in the store's registry.
    pub kind_id: String,
    pub position: Position,
    pub label: String,
}

/// Directed connection between two placed blocks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub source_instance_id: String,
    pub target_instance_id: String,
}

impl Edge {
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self { source_instance_id: source.into(), target_instance_id: target.into() }
    }

    /// True if either endpoint is `instance_id`.
    #[must_use]
    pub fn touches(&self, instance_id: &str) -> bool {
        self.source_instance_id == instance_id || self.target_instance_id == instance_id
    }
}

/// Blocks keyed by instance id plus the ordered edge list.
#[derive(Debug, Clone, Default)]
pub struct CanvasState {
    blocks: HashMap<String, PlacedBlock>,
    /// Instance ids in placement order; lookup stays in `blocks`.
    order: Vec<String>,
    edges: Vec<Edge>,
    /// Bumped on every mutation.
    version: u64,
}

impl CanvasState {
    #[must_use]
    pub fn get(&self, instance_id: &str) -> Option<&PlacedBlock> {
        self.blocks.get(instance_id)
    }

    #[must_use]
    pub fn contains(&self, instance_id: &str) -> bool {
        self.blocks.contains_key(instance_id)
    }

    /// Key/value view of all placed blocks.
    #[must_use]
    pub fn blocks(&self) -> &HashMap<String, PlacedBlock> {
        &self.blocks
    }

    /// Placed blocks in the order they were placed.
    pub fn blocks_in_order(&self) -> impl Iterator<Item = &PlacedBlock> {
        self.order.iter().filter_map(|id| self.blocks.get(id))
    }

    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges leaving `instance_id`, in creation order.
    pub fn edges_from<'a>(&'a self, instance_id: &'a str) -> impl Iterator<Item = &'a Edge> {
        self.edges
            .iter()
            .filter(move |e| e.source_instance_id == instance_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Mutation counter. Unchanged for as long as the contents are unchanged.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    // -------------------------------------------------------------------------
    // Mutations (store only)
    // -------------------------------------------------------------------------

    /// Add a block under its instance id. A live block is never replaced;
    /// returns false and changes nothing if the id is taken.
    pub(crate) fn insert_block(&mut self, block: PlacedBlock) -> bool {
        if self.blocks.contains_key(&block.instance_id) {
            return false;
        }
        self.order.push(block.instance_id.clone());
        self.blocks.insert(block.instance_id.clone(), block);
        self.version += 1;
        true
    }

    /// Replace a block's position wholesale. Returns false if absent.
    pub(crate) fn set_position(&mut self, instance_id: &str, position: Position) -> bool {
        let Some(block) = self.blocks.get_mut(instance_id) else {
            return false;
        };
        block.position = position;
        self.version += 1;
        true
    }

    /// Remove a block and every edge touching it. Returns false if absent.
    pub(crate) fn remove_block(&mut self, instance_id: &str) -> bool {
        if self.blocks.remove(instance_id).is_none() {
            return false;
        }
        self.order.retain(|id| id != instance_id);
        self.edges.retain(|e| !e.touches(instance_id));
        self.version += 1;
        true
    }

    pub(crate) fn find_edge(&self, source: &str, target: &str) -> Option<&Edge> {
        self.edges
            .iter()
            .find(|e| e.source_instance_id == source && e.target_instance_id == target)
    }

    pub(crate) fn push_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
        self.version += 1;
    }

    pub(crate) fn remove_edge(&mut self, source: &str, target: &str) -> bool {
        let before = self.edges.len();
        self.edges
            .retain(|e| !(e.source_instance_id == source && e.target_instance_id == target));
        if self.edges.len() == before {
            return false;
        }
        self.version += 1;
        true
    }

    pub(crate) fn clear(&mut self) {
        self.blocks.clear();
        self.order.clear();
        self.edges.clear();
        self.version += 1;
    }
}
