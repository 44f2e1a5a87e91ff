//! Error types for island generation

use thiserror::Error;

/// Main error type for the generation pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// Top and bottom heightmaps must cover the same columns.
    #[error("heightmap dimensions differ: top is {top:?}, bottom is {bottom:?}")]
    DimensionMismatch {
        top: (usize, usize),
        bottom: (usize, usize),
    },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_message() {
        let err = Error::DimensionMismatch { top: (4, 4), bottom: (4, 5) };
        let msg = err.to_string();
        assert!(msg.contains("(4, 4)"));
        assert!(msg.contains("(4, 5)"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
