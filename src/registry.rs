//! Block registry: the fixed catalogue of placeable block kinds.
//!
//! DESIGN
//! ======
//! The catalogue is a `'static` slice built at compile time. It is never
//! mutated, so a [`Registry`] is a `Copy` handle over that slice and can be
//! handed to every store without sharing or locking.
//!
//! Each kind also carries the two strings the training backend names its
//! components by: the category-wide `class_type` and the per-kind
//! `backend_name`.

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;

// =============================================================================
// TYPES
// =============================================================================

/// Closed set of block categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockCategory {
    /// Trainable function approximator (linear map, MLP, ...).
    Layer,
    /// ODE integrator wrapping a layer.
    Integrator,
    /// Training objective term.
    Loss,
    /// Simulated trajectory data from a dynamical system.
    Dataset,
}

impl BlockCategory {
    /// Backend class tag for blocks of this category.
    #[must_use]
    pub fn class_type(self) -> &'static str {
        match self {
            Self::Layer => "neuromancer_block",
            Self::Integrator => "neuromancer_integrator",
            Self::Loss => "neuromancer_loss",
            Self::Dataset => "neuromancer_dataset",
        }
    }
}

/// Default on-canvas footprint of a block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Immutable catalogue entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockKind {
    /// Stable key used by placed blocks to reference this kind.
    pub kind_id: &'static str,
    /// Human-readable name; also the default label of new instances.
    pub display_name: &'static str,
    pub category: BlockCategory,
    pub default_size: Size,
    /// Name the backend matches on when building the model.
    pub backend_name: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("block kind not found: {0}")]
    NotFound(String),
}

impl ErrorCode for RegistryError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_KIND_NOT_FOUND",
        }
    }
}

// =============================================================================
// CATALOGUE
// =============================================================================

const SMALL: Size = Size { width: 48.0, height: 48.0 };
const LARGE: Size = Size { width: 128.0, height: 128.0 };

const fn kind(
    kind_id: &'static str,
    display_name: &'static str,
    category: BlockCategory,
    default_size: Size,
    backend_name: &'static str,
) -> BlockKind {
    BlockKind { kind_id, display_name, category, default_size, backend_name }
}

static BUILTIN_KINDS: &[BlockKind] = &[
    kind("linear", "Linear", BlockCategory::Layer, SMALL, "linear"),
    kind("mlp", "MLP", BlockCategory::Layer, SMALL, "mlp"),
    kind("resmlp", "ResNet", BlockCategory::Layer, SMALL, "resmlp"),
    kind("rnn", "RNN", BlockCategory::Layer, SMALL, "rnn"),
    kind("euler", "Euler", BlockCategory::Integrator, LARGE, "diff_eq_integrator -- euler"),
    kind("rk4", "RK4", BlockCategory::Integrator, LARGE, "diff_eq_integrator -- rk4"),
    kind("reference_tracking", "Reference Tracking", BlockCategory::Loss, LARGE, "reference tracking"),
    kind("finite_difference", "Finite Difference", BlockCategory::Loss, LARGE, "finite difference"),
    kind("dataset", "Dataset", BlockCategory::Dataset, SMALL, "dataset"),
];

/// Kind id used for blocks created from dataset-generation responses.
pub const DATASET_KIND_ID: &str = "dataset";

// =============================================================================
// REGISTRY
// =============================================================================

/// Read-only view over a static block catalogue.
#[derive(Debug, Clone, Copy)]
pub struct Registry {
    kinds: &'static [BlockKind],
}

impl Registry {
    /// The catalogue shipped with the editor.
    #[must_use]
    pub fn builtin() -> Self {
        Self { kinds: BUILTIN_KINDS }
    }

    /// Wrap a custom static catalogue.
    #[must_use]
    pub fn new(kinds: &'static [BlockKind]) -> Self {
        Self { kinds }
    }

    /// All kinds in catalogue order. Same order on every call.
    #[must_use]
    pub fn list_kinds(&self) -> &'static [BlockKind] {
        self.kinds
    }

    /// Look up a kind by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no kind has this id.
    pub fn get_kind(&self, kind_id: &str) -> Result<&'static BlockKind, RegistryError> {
        self.kinds
            .iter()
            .find(|k| k.kind_id == kind_id)
            .ok_or_else(|| RegistryError::NotFound(kind_id.to_string()))
    }

    /// Kinds belonging to one category, in catalogue order.
    pub fn kinds_in(&self, category: BlockCategory) -> impl Iterator<Item = &'static BlockKind> {
        self.kinds.iter().filter(move |k| k.category == category)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}
