//! Error types for the XRC layer.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for XRC operations.
pub type XrcResult<T> = Result<T, XrcError>;

/// Result type for attribute conversions.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised while converting between typed entities and staged attributes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    /// A required attribute is absent or empty.
    #[error("missing required attribute {path}")]
    MissingField { path: String },

    /// Enum text that names no known variant.
    #[error("invalid value {value:?} for {path}")]
    InvalidEnum { path: String, value: String },

    /// A UUID attribute that does not parse.
    #[error("invalid UUID {value:?} at {path}")]
    InvalidUuid { path: String, value: String },

    /// The attribute exists but holds a different primitive kind.
    #[error("attribute {path} holds {found}, expected {expected}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A blob whose length does not fit its element layout.
    #[error("malformed blob at {path}: {len} bytes")]
    InvalidBlob { path: String, len: usize },

    /// An integer attribute out of range for its field.
    #[error("attribute {path} out of range: {value}")]
    OutOfRange { path: String, value: i64 },

    /// The native store refused the write.
    #[error("native store rejected attribute {path}")]
    Rejected { path: String },
}

/// Errors that can occur in XRC session and entity operations.
#[derive(Debug, Error)]
pub enum XrcError {
    /// The layer has not been started.
    #[error("XRC is not started")]
    NotStarted,

    /// `start_up` called twice.
    #[error("XRC is already started")]
    AlreadyStarted,

    /// A session is active where none may be.
    #[error("a session is already active: {0}")]
    SessionActive(String),

    /// An operation that needs a session was called without one.
    #[error("no active session")]
    NoActiveSession,

    /// Only the session master may do this.
    #[error("only the session master may {0}")]
    NotMaster(&'static str),

    /// The session master may not do this.
    #[error("the session master may not {0}")]
    IsMaster(&'static str),

    /// The entity has no UUID to derive its key from.
    #[error("entity {0:?} has no UUID")]
    MissingEntityId(String),

    /// Transform edits on a category that has no transform.
    #[error("{0} entities carry no transform")]
    NoTransform(mret_schema::Category),

    /// Converting an entity to or from attributes failed.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The native engine reported failure.
    #[error("native call failed: {0}")]
    Native(String),

    /// The engine library could not be found.
    #[error("XRC engine not found (searched {searched:?})")]
    EngineNotFound { searched: Vec<PathBuf> },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
