//! Error classification shared by every component error type.
//!
//! Each error enum in the crate implements [`ErrorCode`] so callers (the
//! rendering layer, the CLI) can show a stable code and decide whether a
//! retry makes sense without matching on every variant.

/// Stable machine-readable code plus a retry hint for an error.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}
