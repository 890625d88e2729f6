//! Block-graph model and backend sync for the neuromancer visual editor.
//!
//! The editor lets a user drop model components (layers, integrators,
//! losses) and simulated datasets onto a canvas, wire them together, and
//! ship the resulting graph to a training backend. This crate owns the
//! parts of that flow that are not rendering: what can be placed, what is
//! placed, and how the placed graph is exchanged with the backend.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`registry`] | Static catalogue of placeable block kinds |
//! | [`canvas`] | Canvas state store, snapshots, and observers |
//! | [`ids`] | Instance id generation |
//! | [`sync`] | Graph payloads, problem lifecycle, and the HTTP backend |
//! | [`error`] | Shared error-code trait |

pub mod canvas;
pub mod error;
pub mod ids;
pub mod registry;
pub mod sync;
