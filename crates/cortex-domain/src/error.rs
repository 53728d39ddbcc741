//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Cortex indexing engine
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (simple form)
    #[error("I/O error: {source}")]
    IoSimple {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// I/O operation error (with context)
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON parsing or serialization error
    #[error("JSON parsing error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// A parse produced a partial tree with no usable constructs
    #[error("Extraction error: {message}")]
    Extraction {
        /// Description of the extraction error
        message: String,
    },

    /// Embedding service operation error
    #[error("Embedding error: {message}")]
    Embedding {
        /// Description of the embedding error
        message: String,
    },

    /// Chunk store operation error
    #[error("Store error: {message}")]
    Store {
        /// Description of the store error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Branch store schema does not match the current schema version
    #[error("Store schema version {found} does not match expected {expected}")]
    SchemaVersionMismatch {
        /// Version found in the store file
        found: i64,
        /// Version this build expects
        expected: i64,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error
        message: String,
    },

    /// Source-control introspection error
    #[error("Source control error: {message}")]
    Git {
        /// Description of the source-control error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Resource not found error
    #[error("Not found: {resource}")]
    NotFound {
        /// The resource that was not found
        resource: String,
    },

    /// Invalid argument provided to a function
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument
        message: String,
    },

    /// Operation was cancelled before completion
    #[error("Operation cancelled")]
    Cancelled,

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

impl Error {
    /// Create an I/O error with a message
    pub fn io<S: Into<String>>(message: S) -> Self {
        Error::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Create an I/O error wrapping a source error
    pub fn io_with_source<S: Into<String>>(
        message: S,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Error::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an extraction error
    pub fn extraction<S: Into<String>>(message: S) -> Self {
        Error::Extraction {
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding<S: Into<String>>(message: S) -> Self {
        Error::Embedding {
            message: message.into(),
        }
    }

    /// Create a store error with a message
    pub fn store<S: Into<String>>(message: S) -> Self {
        Error::Store {
            message: message.into(),
            source: None,
        }
    }

    /// Create a store error wrapping a source error
    pub fn store_with_source<S: Into<String>>(
        message: S,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Error::Store {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Create a source-control error with a message
    pub fn git<S: Into<String>>(message: S) -> Self {
        Error::Git {
            message: message.into(),
            source: None,
        }
    }

    /// Create a source-control error wrapping a source error
    pub fn git_with_source<S: Into<String>>(
        message: S,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Error::Git {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Error::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an invalid-argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Error::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }

    /// Whether this error represents cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Whether this error is fatal to an entire index call rather than a
    /// single file (schema mismatch, configuration, cancellation)
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::SchemaVersionMismatch { .. } | Error::Config { .. } | Error::Cancelled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_helpers() {
        assert!(matches!(Error::io("x"), Error::Io { .. }));
        assert!(matches!(Error::embedding("x"), Error::Embedding { .. }));
        assert!(matches!(Error::store("x"), Error::Store { .. }));
        assert!(matches!(Error::config("x"), Error::Config { .. }));
    }

    #[test]
    fn test_cancelled_is_fatal() {
        assert!(Error::Cancelled.is_cancelled());
        assert!(Error::Cancelled.is_fatal());
        assert!(!Error::io("disk").is_fatal());
    }

    #[test]
    fn test_schema_mismatch_display() {
        let err = Error::SchemaVersionMismatch {
            found: 1,
            expected: 2,
        };
        assert!(err.to_string().contains("schema version 1"));
    }
}
