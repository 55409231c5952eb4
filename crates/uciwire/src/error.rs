//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use uciwire_config::ConfigError;
use uciwire_core::{CoreError, UbusStatus};

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 5;
    pub const ROLLED_BACK: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to router at {url}: {reason}")]
    #[diagnostic(
        code(uciwire::connection_failed),
        help(
            "Check that rpcd and uhttpd-mod-ubus are running on the router.\n\
             URL: {url}\n\
             A self-signed certificate may also need --insecure (-k)."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(uciwire::auth_failed),
        help(
            "Verify the username and password, and that the user's rpcd ACL\n\
             grants access to the uci object.\n\
             Run: uciwire config set-password --profile {profile}"
        )
    )]
    AuthFailed { profile: String, message: String },

    #[error("No password configured for user '{username}' in profile '{profile}'")]
    #[diagnostic(
        code(uciwire::no_credentials),
        help(
            "Store one with: uciwire config set-password --profile {profile}\n\
             Or set the UCIWIRE_PASSWORD environment variable."
        )
    )]
    NoCredentials { profile: String, username: String },

    // ── Lookups ──────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(uciwire::not_found),
        help("Run: uciwire show {config} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        config: String,
    },

    // ── Remote ───────────────────────────────────────────────────────

    #[error("Router rejected the request: {message}")]
    #[diagnostic(code(uciwire::rpc))]
    Rpc { message: String },

    #[error("Router refused to apply changes ({status})")]
    #[diagnostic(
        code(uciwire::apply_rejected),
        help("Another apply may still be pending. Check: uciwire changes")
    )]
    ApplyRejected { status: UbusStatus },

    #[error("Changes were not confirmed in time ({status})")]
    #[diagnostic(
        code(uciwire::rolled_back),
        help(
            "The router restores the previous configuration on its own.\n\
             If the change cut off this connection, that is expected."
        )
    )]
    RolledBack { status: UbusStatus },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(uciwire::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(uciwire::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: uciwire config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No router configured")]
    #[diagnostic(
        code(uciwire::no_config),
        help(
            "Create a profile with: uciwire config init\n\
             Expected at: {path}\n\
             Or pass --endpoint / set UCIWIRE_ENDPOINT."
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(uciwire::config))]
    Config(Box<figment::Error>),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(uciwire::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(uciwire::timeout),
        help("Increase timeout with --timeout or check router responsiveness.")
    )]
    Timeout { seconds: u64 },

    #[error("Internal error: {0}")]
    #[diagnostic(code(uciwire::internal))]
    Internal(String),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to write configuration: {0}")]
    #[diagnostic(code(uciwire::toml))]
    Toml(#[from] toml::ser::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(uciwire::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(uciwire::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Rpc { .. } | Self::ApplyRejected { .. } => exit_code::REJECTED,
            Self::RolledBack { .. } => exit_code::ROLLED_BACK,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                profile: "default".into(),
                message,
            },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::Rpc {
                message,
                status: Some(status),
            } => CliError::Rpc {
                message: format!("{message} [{status}]"),
            },
            CoreError::Rpc {
                message,
                status: None,
            } => CliError::Rpc { message },

            CoreError::ApplyRejected { status } => CliError::ApplyRejected { status },
            CoreError::ConfirmTimeout { status } => CliError::RolledBack { status },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile, username } => {
                CliError::NoCredentials { profile, username }
            }
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: "(none)".into(),
            },
            ConfigError::Serialization(e) => CliError::Toml(e),
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}

impl CliError {
    /// Attach the active profile name to authentication failures.
    pub fn for_profile(self, name: &str) -> Self {
        match self {
            Self::AuthFailed { message, .. } => Self::AuthFailed {
                profile: name.into(),
                message,
            },
            other => other,
        }
    }
}
