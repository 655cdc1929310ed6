//! Run error types.
//!
//! Structural failures that abort an attainment run. Per-cell numeric
//! problems never surface here; they degrade to a zero contribution inside
//! the attainment engine.

use thiserror::Error;

/// Errors that abort an attainment run before or during document reading.
#[derive(Debug, Error)]
pub enum RunError {
    /// No student identifiers were supplied.
    #[error("no registration numbers provided")]
    MissingStudents,

    /// No weight rows were supplied.
    #[error("no component weights provided")]
    MissingWeights,

    /// No documents were supplied.
    #[error("no documents provided")]
    MissingDocuments,

    /// A weight row does not have exactly six CO weights.
    #[error("component '{component}' has {found} weights, expected 6")]
    WeightArity { component: String, found: usize },

    /// A weight is negative or not a finite number.
    #[error("component '{component}' has an invalid weight for {co}: {value}")]
    InvalidWeight {
        component: String,
        co: String,
        value: f64,
    },

    /// Two weight rows share a component name.
    #[error("duplicate component in weight table: {0}")]
    DuplicateComponent(String),

    /// The same document appears twice in the processing order.
    #[error("duplicate document in processing order: {0}")]
    DuplicateDocument(String),

    /// A document could not be opened or read.
    #[error("failed to read document '{document}': {reason}")]
    DocumentUnreadable { document: String, reason: String },
}

impl RunError {
    /// Returns `true` if this error comes from the caller's inputs rather
    /// than from reading a document.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, RunError::DocumentUnreadable { .. })
    }
}
