// ── Runtime connection configuration ──
//
// These types describe *how* to reach a ubus JSON-RPC endpoint and how the
// apply/confirm protocol is timed. They carry credential data but never
// touch disk; the CLI builds a `RemoteConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// How to authenticate against rpcd.
#[derive(Debug, Clone, Default)]
pub enum AuthCredentials {
    /// Keep the all-zero anonymous session. Only useful when rpcd's ACLs
    /// grant `uci` access to unauthenticated callers.
    #[default]
    Anonymous,
    /// `session.login` with a system account.
    Credentials {
        username: String,
        password: SecretString,
    },
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification. Default: routers ship self-signed certificates.
    #[default]
    DangerAcceptInvalid,
}

/// Timing of the apply/confirm protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplySettings {
    /// Rollback window requested from the remote. Values under one second
    /// fall back to the default.
    pub timeout: Duration,
    /// Pause between a successful apply and the first confirm attempt.
    pub confirm_delay: Duration,
    /// Pause between unsuccessful confirm attempts.
    pub confirm_interval: Duration,
}

impl ApplySettings {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Rollback window to use for a call, honoring the one-second floor.
    pub fn effective_timeout(&self, requested: Option<Duration>) -> Duration {
        let timeout = requested.unwrap_or(self.timeout);
        if timeout < Duration::from_secs(1) {
            Self::DEFAULT_TIMEOUT
        } else {
            timeout
        }
    }
}

impl Default for ApplySettings {
    fn default() -> Self {
        Self {
            timeout: Self::DEFAULT_TIMEOUT,
            confirm_delay: Duration::from_secs(1),
            confirm_interval: Duration::from_millis(250),
        }
    }
}

/// Configuration for connecting to a single router.
///
/// Built by the CLI, passed to [`Overlay::connect`](crate::Overlay::connect).
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// JSON-RPC endpoint (e.g., `https://192.168.1.1/ubus`).
    pub url: Url,
    /// Authentication method and credentials.
    pub auth: AuthCredentials,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Apply/confirm timing.
    pub apply: ApplySettings,
}

impl RemoteConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            auth: AuthCredentials::default(),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(5),
            apply: ApplySettings::default(),
        }
    }
}
