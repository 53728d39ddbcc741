//! Provider layer constants

/// Content-Type header value for embedding requests
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Default HTTP timeout for one embedding request, seconds
pub const EMBEDDING_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Interval between readiness polls of the embedding service, milliseconds
pub const EMBEDDING_READY_POLL_MS: u64 = 200;

/// Error message for embedding request timeouts
pub const ERROR_MSG_REQUEST_TIMEOUT: &str = "Embedding request timed out after";

/// sqlite busy timeout, milliseconds
pub const STORE_BUSY_TIMEOUT_MS: u64 = 5_000;
