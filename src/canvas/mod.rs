//! Canvas: placed blocks, their connections, and the store that owns them.

pub mod state;
pub mod store;

pub use state::{CanvasState, Edge, PlacedBlock, Position, Snapshot};
pub use store::CanvasStore;

use crate::error::ErrorCode;
use crate::registry::RegistryError;

#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("unknown block kind: {0}")]
    UnknownKind(String),
    #[error("unknown block instance: {0}")]
    UnknownInstance(String),
    #[error("cannot connect block {0} to itself")]
    SelfLoop(String),
    #[error("block instance already exists: {0}")]
    DuplicateInstance(String),
}

impl From<RegistryError> for CanvasError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(kind_id) => Self::UnknownKind(kind_id),
        }
    }
}

impl ErrorCode for CanvasError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownKind(_) => "E_UNKNOWN_KIND",
            Self::UnknownInstance(_) => "E_UNKNOWN_INSTANCE",
            Self::SelfLoop(_) => "E_SELF_LOOP",
            Self::DuplicateInstance(_) => "E_DUPLICATE_INSTANCE",
        }
    }
}
