//! Core type definitions for the MRET collaboration layer.
//!
//! This crate defines the small, engine-agnostic types shared by the schema
//! and the XRC synchronization layer:
//! - Entity keys (UUID-derived strings) and entity kinds
//! - Math primitives carried by scene entities (vectors, rotations, transforms, colors)

mod ids;
mod math;

pub use ids::{EntityKey, EntityType};
pub use math::{Color, Quaternion, Transform, Vector2, Vector3};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("entity key must not be empty")]
    EmptyKey,

    #[error("unknown entity type: {0}")]
    UnknownEntityType(String),
}
