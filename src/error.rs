//! Error types for the segmentation pipeline

use thiserror::Error;

/// Result type used by the library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating, scaling, clustering or labelling data
#[derive(Error, Debug)]
pub enum Error {
    /// Pipeline configuration is inconsistent (cluster count, segment map, ...)
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Error message
        message: String,
    },

    /// No rows were supplied
    #[error("Empty input: {what} has no rows")]
    EmptyInput {
        /// Which input was empty
        what: &'static str,
    },

    /// Input values that cannot be processed (NaN, infinities, too few distinct points)
    #[error("Invalid data: {message}")]
    InvalidData {
        /// Error message
        message: String,
    },

    /// A feature column has zero variance and the scaler was asked to reject it
    #[error("Feature column {column} ('{name}') has zero variance")]
    DegenerateColumn {
        /// Column index in the feature matrix
        column: usize,
        /// Column name, if known
        name: String,
    },

    /// A row or matrix does not have the expected number of features
    #[error("Dimension mismatch: expected {expected} features, got {actual}")]
    DimensionMismatch {
        /// Expected feature count
        expected: usize,
        /// Actual feature count
        actual: usize,
    },

    /// A cluster id has no entry in the segment map
    #[error("Cluster {cluster} has no segment name in the segment map")]
    UnmappedCluster {
        /// The unmapped cluster id
        cluster: usize,
    },

    /// The k-means backend failed
    #[error("Clustering failed: {message}")]
    Clustering {
        /// Error message
        message: String,
    },

    /// Building or writing the output table failed
    #[error("Table error: {0}")]
    Frame(#[from] polars::prelude::PolarsError),

    /// I/O failure while exporting
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new InvalidConfig error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a new InvalidData error
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new Clustering error
    pub fn clustering(message: impl Into<String>) -> Self {
        Self::Clustering {
            message: message.into(),
        }
    }

    /// True for errors caused by the caller's configuration rather than the data
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. })
    }
}
