// ── Core error types ──
//
// User-facing errors from uciwire-core. Consumers never see JSON-RPC frame
// failures or HTTP status codes directly; the `From<uciwire_api::Error>`
// impl folds transport-layer errors into domain variants.
//
// Lookup misses and invalid mutation arguments are NOT errors here. The
// overlay answers those with `None`, `false`, or a silent no-op.

use thiserror::Error;
use uciwire_api::UbusStatus;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Remote call timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Remote rejections ────────────────────────────────────────────
    #[error("Remote call rejected: {message}")]
    Rpc {
        message: String,
        /// The ubus status the remote answered with, if it got that far.
        status: Option<UbusStatus>,
    },

    // ── Apply/confirm protocol ───────────────────────────────────────
    #[error("Apply rejected by remote with status {status}")]
    ApplyRejected { status: UbusStatus },

    #[error("Changes not confirmed before the deadline (last status {status}); the remote rolls back on its own")]
    ConfirmTimeout { status: UbusStatus },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The ubus status carried by this error, if any.
    pub fn status(&self) -> Option<UbusStatus> {
        match self {
            Self::Rpc { status, .. } => *status,
            Self::ApplyRejected { status } | Self::ConfirmTimeout { status } => Some(*status),
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<uciwire_api::Error> for CoreError {
    fn from(err: uciwire_api::Error) -> Self {
        match err {
            uciwire_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            uciwire_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Rpc {
                        message: e.to_string(),
                        status: None,
                    }
                }
            }
            uciwire_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            uciwire_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            uciwire_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            uciwire_api::Error::Status {
                status: UbusStatus::PermissionDenied,
                object,
                method,
            } => CoreError::AuthenticationFailed {
                message: format!("permission denied for {object}/{method}"),
            },
            err @ uciwire_api::Error::Status { status, .. } => CoreError::Rpc {
                message: err.to_string(),
                status: Some(status),
            },
            err @ (uciwire_api::Error::Http { .. }
            | uciwire_api::Error::InvalidFrame { .. }
            | uciwire_api::Error::Rpc { .. }) => CoreError::Rpc {
                message: err.to_string(),
                status: None,
            },
            uciwire_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
