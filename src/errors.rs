//! Hard errors
//!
//! Degenerate geometry is never reported through these types; it is dropped or
//! recovered locally and logged. `CsgError` covers misuse of the API contract only.

use crate::float_types::Real;

/// Errors returned by strict constructors and engine setup
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CsgError {
    /// (TooFewVertices) A strict polygon constructor received fewer than 3 vertices
    #[error("(TooFewVertices) A polygon needs at least 3 vertices, found {found}")]
    TooFewVertices { found: usize },

    /// (NonFinitePlane) A strict constructor received a plane with NaN or infinite components
    #[error("(NonFinitePlane) The plane has a NaN or infinite component (offset {offset})")]
    NonFinitePlane { offset: Real },

    /// (IndexOutOfRange) A face of a polyhedron refers to a point that does not exist
    #[error("(IndexOutOfRange) Face index {index} is out of range for {len} points")]
    IndexOutOfRange { index: usize, len: usize },

    /// (InvalidEnvironment) A tolerance or limit in the geometry environment is unusable
    #[error("(InvalidEnvironment) {0}")]
    InvalidEnvironment(String),
}
