//! Error types for locating, aggregating, and writing vertex datasets.

use crate::models::Shape;
use thiserror::Error;

/// Errors that can occur while processing an ensemble file.
#[derive(Error, Debug)]
pub enum LcmvError {
    /// No group with the requested name exists below the search root
    #[error("Group '{name}' not found below '{start}'")]
    GroupNotFound {
        /// Name that was searched for
        name: String,
        /// Path the search started from
        start: String,
    },

    /// Group search followed links deeper than the depth limit
    #[error("Search for group '{name}' exceeded the depth limit at '{path}'")]
    SearchTooDeep {
        /// Name that was searched for
        name: String,
        /// Link path where the search stopped
        path: String,
    },

    /// Member name does not follow the `<label>_<index>` convention
    #[error("Invalid member name '{name}': {reason}")]
    InvalidMemberName {
        /// Offending member name
        name: String,
        /// What is wrong with it
        reason: String,
    },

    /// Source group has no members to concatenate
    #[error("Source group '{path}' has no datasets to concatenate")]
    EmptySource {
        /// Full path of the source group
        path: String,
    },

    /// Zero-dimensional datasets have no leading axis
    #[error("Dataset '{path}' is zero-dimensional and cannot be concatenated")]
    ScalarDataset {
        /// Full path of the dataset
        path: String,
    },

    /// Trailing axes differ from the first dataset
    #[error("Shape mismatch at '{path}': {found} cannot be stacked onto {expected} along axis 0")]
    ShapeMismatch {
        /// Full path of the offending dataset
        path: String,
        /// Shape of the first dataset
        expected: Shape,
        /// Shape of the offending dataset
        found: Shape,
    },

    /// Element type that cannot be concatenated
    #[error("Unsupported element type at '{path}': {descriptor}")]
    UnsupportedType {
        /// Full path of the dataset
        path: String,
        /// HDF5 type description
        descriptor: String,
    },

    /// Layout configuration is unusable
    #[error("Invalid layout configuration: {0}")]
    InvalidLayout(String),

    /// HDF5 library error
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),

    /// Array concatenation failed
    #[error("Concatenation failed: {0}")]
    Concatenate(#[from] ndarray::ShapeError),
}

/// Result type for lcmv operations
pub type Result<T> = std::result::Result<T, LcmvError>;
