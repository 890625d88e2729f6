//! Canvas state store: the single owner of what is on the canvas.
//!
//! DESIGN
//! ======
//! `CanvasStore` is a cheap-to-clone handle over `Arc<Mutex<Inner>>`. The
//! inner state keeps the current [`Snapshot`] and mutates it through
//! `Arc::make_mut`, so every mutation yields a fresh immutable snapshot while
//! readers keep whatever snapshot they already hold.
//!
//! Observers get an unbounded channel each. Snapshots are pushed while the
//! lock is held, which keeps delivery order identical to operation order,
//! and an unbounded send never blocks the mutating caller. Receivers that
//! have been dropped are pruned on the next publish.
//!
//! Operations that change nothing (removing an absent block, re-connecting
//! an existing edge) do not publish.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tracing::debug;

use super::CanvasError;
use super::state::{CanvasState, Edge, PlacedBlock, Position, Snapshot};
use crate::ids::{CounterIds, IdSource};
use crate::registry::Registry;

struct Inner {
    current: Snapshot,
    ids: Box<dyn IdSource>,
    observers: Vec<mpsc::UnboundedSender<Snapshot>>,
}

impl Inner {
    fn publish(&mut self) {
        let snapshot = Arc::clone(&self.current);
        self.observers
            .retain(|tx| tx.send(Arc::clone(&snapshot)).is_ok());
    }

    fn state_mut(&mut self) -> &mut CanvasState {
        Arc::make_mut(&mut self.current)
    }
}

/// Shared handle to one editing session's canvas.
#[derive(Clone)]
pub struct CanvasStore {
    registry: Registry,
    inner: Arc<Mutex<Inner>>,
}

impl CanvasStore {
    /// Empty canvas backed by `registry`, with counter-plus-random ids.
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self::with_ids(registry, CounterIds::new())
    }

    /// Empty canvas with a caller-chosen id source.
    #[must_use]
    pub fn with_ids(registry: Registry, ids: impl IdSource + 'static) -> Self {
        let inner = Inner { current: Arc::new(CanvasState::default()), ids: Box::new(ids), observers: Vec::new() };
        Self { registry, inner: Arc::new(Mutex::new(inner)) }
    }

    #[must_use]
    pub fn registry(&self) -> Registry {
        self.registry
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // BLOCKS
    // =========================================================================

    /// Place a new instance of `kind_id`. The label defaults to the kind's
    /// display name.
    ///
    /// # Errors
    ///
    /// Returns `UnknownKind` if `kind_id` is not in the registry.
    pub fn place_block(&self, kind_id: &str, position: Position, label: Option<&str>) -> Result<String, CanvasError> {
        let kind = self.registry.get_kind(kind_id)?;
        let mut inner = self.lock();
        // Externally chosen ids share the namespace; skip any already live.
        let mut instance_id = inner.ids.next_id();
        while inner.current.contains(&instance_id) {
            instance_id = inner.ids.next_id();
        }
        let block = PlacedBlock {
            instance_id: instance_id.clone(),
            kind_id: kind.kind_id.to_string(),
            position,
            label: label.unwrap_or(kind.display_name).to_string(),
        };
        inner.state_mut().insert_block(block);
        inner.publish();
        debug!(instance_id = %instance_id, kind_id, "block placed");
        Ok(instance_id)
    }

    /// Place a block under an id chosen elsewhere, e.g. the id a dataset was
    /// generated under on the backend.
    ///
    /// # Errors
    ///
    /// Returns `UnknownKind` for an unregistered kind and `DuplicateInstance`
    /// if the id is already on the canvas.
    pub fn place_block_with_id(
        &self,
        instance_id: &str,
        kind_id: &str,
        position: Position,
        label: Option<&str>,
    ) -> Result<(), CanvasError> {
        let kind = self.registry.get_kind(kind_id)?;
        let mut inner = self.lock();
        if inner.current.contains(instance_id) {
            return Err(CanvasError::DuplicateInstance(instance_id.to_string()));
        }
        let block = PlacedBlock {
            instance_id: instance_id.to_string(),
            kind_id: kind.kind_id.to_string(),
            position,
            label: label.unwrap_or(kind.display_name).to_string(),
        };
        inner.state_mut().insert_block(block);
        inner.publish();
        debug!(instance_id, kind_id, "block placed with external id");
        Ok(())
    }

    /// Replace the position of an existing block.
    ///
    /// # Errors
    ///
    /// Returns `UnknownInstance` (and changes nothing) if the block is absent.
    pub fn move_block(&self, instance_id: &str, position: Position) -> Result<(), CanvasError> {
        let mut inner = self.lock();
        if !inner.current.contains(instance_id) {
            return Err(CanvasError::UnknownInstance(instance_id.to_string()));
        }
        inner.state_mut().set_position(instance_id, position);
        inner.publish();
        debug!(instance_id, x = position.x, y = position.y, "block moved");
        Ok(())
    }

    /// Remove a block and its edges. Removing an absent block is a no-op;
    /// returns whether anything was removed.
    pub fn remove_block(&self, instance_id: &str) -> bool {
        let mut inner = self.lock();
        if !inner.current.contains(instance_id) {
            return false;
        }
        inner.state_mut().remove_block(instance_id);
        inner.publish();
        debug!(instance_id, "block removed");
        true
    }

    /// Remove every block and edge. Clearing an empty canvas is a no-op.
    pub fn clear(&self) {
        let mut inner = self.lock();
        if inner.current.is_empty() {
            return;
        }
        inner.state_mut().clear();
        inner.publish();
        debug!("canvas cleared");
    }

    // =========================================================================
    // EDGES
    // =========================================================================

    /// Connect `source_id` to `target_id`. Connecting an already-connected
    /// ordered pair returns the existing edge unchanged.
    ///
    /// # Errors
    ///
    /// Returns `UnknownInstance` if either end is absent and `SelfLoop` if the
    /// two ends are the same block.
    pub fn connect(&self, source_id: &str, target_id: &str) -> Result<Edge, CanvasError> {
        let mut inner = self.lock();
        for id in [source_id, target_id] {
            if !inner.current.contains(id) {
                return Err(CanvasError::UnknownInstance(id.to_string()));
            }
        }
        if source_id == target_id {
            return Err(CanvasError::SelfLoop(source_id.to_string()));
        }
        if let Some(existing) = inner.current.find_edge(source_id, target_id) {
            return Ok(existing.clone());
        }
        let edge = Edge::new(source_id, target_id);
        inner.state_mut().push_edge(edge.clone());
        inner.publish();
        debug!(source = source_id, target = target_id, "blocks connected");
        Ok(edge)
    }

    /// Remove the edge `source_id -> target_id`; returns whether it existed.
    pub fn disconnect(&self, source_id: &str, target_id: &str) -> bool {
        let mut inner = self.lock();
        if inner.current.find_edge(source_id, target_id).is_none() {
            return false;
        }
        inner.state_mut().remove_edge(source_id, target_id);
        inner.publish();
        debug!(source = source_id, target = target_id, "blocks disconnected");
        true
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Current immutable view. Later operations never alter it.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.lock().current)
    }

    /// Register an observer. Every later mutation sends its resulting
    /// snapshot, in operation order.
    #[must_use]
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Snapshot> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().observers.push(tx);
        rx
    }
}

impl Default for CanvasStore {
    fn default() -> Self {
        Self::new(Registry::builtin())
    }
}
