//! Domain layer types and invariants.

pub mod archive;
pub mod entities;
pub mod error;
pub mod language;
