//! Graph payload: the wire form of a canvas snapshot.
//!
//! `build_payload` is a pure transform. Nodes follow placement order and
//! edges follow creation order, so the same snapshot always serializes to
//! the same bytes.

#[cfg(test)]
#[path = "payload_test.rs"]
mod payload_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SyncError;
use crate::canvas::{CanvasError, CanvasState, Edge};
use crate::registry::{BlockCategory, Registry};

/// Per-node metadata the backend needs to build the model component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockInfo {
    pub id: String,
    /// Backend component name (`mlp`, `diff_eq_integrator -- euler`, ...).
    pub name: String,
    pub kind_id: String,
    pub label: String,
    pub class_type: String,
    pub category: BlockCategory,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub block_info: BlockInfo,
}

/// Body of a construct request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphPayload {
    pub problem_id: String,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<Edge>,
}

/// Fresh problem id, unique per construct request.
#[must_use]
pub fn new_problem_id() -> String {
    format!("problem_{}", Uuid::new_v4().simple())
}

/// Serialize `snapshot` into a construct payload.
///
/// # Errors
///
/// Returns `EmptyCanvas` if the snapshot holds no blocks, and an
/// `UnknownKind` canvas error if a block's kind is missing from `registry`.
pub fn build_payload(snapshot: &CanvasState, problem_id: &str, registry: Registry) -> Result<GraphPayload, SyncError> {
    if snapshot.is_empty() {
        return Err(SyncError::EmptyCanvas);
    }

    let nodes = snapshot
        .blocks_in_order()
        .map(|block| {
            let kind = registry
                .get_kind(&block.kind_id)
                .map_err(CanvasError::from)?;
            let block_info = BlockInfo {
                id: block.instance_id.clone(),
                name: kind.backend_name.to_string(),
                kind_id: block.kind_id.clone(),
                label: block.label.clone(),
                class_type: kind.category.class_type().to_string(),
                category: kind.category,
                x: block.position.x,
                y: block.position.y,
            };
            Ok(GraphNode { id: block.instance_id.clone(), block_info })
        })
        .collect::<Result<Vec<_>, SyncError>>()?;

    Ok(GraphPayload { problem_id: problem_id.to_string(), nodes, edges: snapshot.edges().to_vec() })
}
