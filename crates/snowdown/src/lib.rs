//! Public facade crate for `snowdown`.
//!
//! This crate intentionally contains no IO or document-specific logic.
//! It re-exports the backend-agnostic types/traits from `snowdown-core`.

pub use snowdown_core::*;
