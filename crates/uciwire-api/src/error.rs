use thiserror::Error;

use crate::status::UbusStatus;

/// Top-level error type for the `uciwire-api` crate.
///
/// Covers every failure mode of the ubus JSON-RPC surface:
/// HTTP transport, message framing, JSON-RPC errors, and ubus status codes.
/// `uciwire-core` maps these into domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected, or the session is no longer valid
    /// (JSON-RPC error `-32002`, "Access denied").
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Non-success HTTP status from the RPC endpoint.
    #[error("RPC call to {object}/{method} failed with HTTP error {status}")]
    Http {
        object: String,
        method: String,
        status: u16,
    },

    // ── JSON-RPC ────────────────────────────────────────────────────
    /// The reply was not a `jsonrpc: "2.0"` frame.
    #[error("RPC call to {object}/{method} returned invalid message frame")]
    InvalidFrame { object: String, method: String },

    /// The reply carried a JSON-RPC `error` object.
    #[error("RPC call to {object}/{method} failed with error {code}: {message}")]
    Rpc {
        object: String,
        method: String,
        code: i64,
        message: String,
    },

    // ── ubus ────────────────────────────────────────────────────────
    /// The ubus call completed with a nonzero status code.
    #[error("ubus call {object}/{method} returned status {status}")]
    Status {
        object: String,
        method: String,
        status: UbusStatus,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}
