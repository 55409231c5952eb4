//! Shared configuration for uciwire.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `uciwire_core::RemoteConfig`. The CLI layers its
//! global flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use uciwire_core::{ApplySettings, AuthCredentials, RemoteConfig, TlsVerification};

/// Keyring service name under which profile passwords are stored.
pub const KEYRING_SERVICE: &str = "uciwire";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for user '{username}' in profile '{profile}'")]
    NoCredentials { profile: String, username: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named router profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Pick `name`, else the default profile.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, &Profile), ConfigError> {
        let name = name
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into());
        self.profiles
            .get(&name)
            .map(|profile| (name.clone(), profile))
            .ok_or(ConfigError::UnknownProfile { name })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Rollback window for `apply`, in seconds.
    #[serde(default = "default_apply_timeout")]
    pub apply_timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            apply_timeout: default_apply_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    5
}
fn default_apply_timeout() -> u64 {
    10
}

/// A named router profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// JSON-RPC endpoint (e.g., "https://192.168.1.1/ubus").
    pub endpoint: String,

    /// Login user. Without one the anonymous session is used.
    pub username: Option<String>,

    /// Password (plaintext: prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override request timeout (seconds).
    pub timeout: Option<u64>,

    /// Override apply rollback window (seconds).
    pub apply_timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "uciwire", "uciwire").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("uciwire");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. `UCIWIRE_*` variables override file values;
/// `__` separates nesting levels (`UCIWIRE_DEFAULTS__TIMEOUT=10`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("UCIWIRE_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(&config_path(), cfg)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve the login password for `username`.
pub fn resolve_password(
    profile: &Profile,
    profile_name: &str,
    username: &str,
) -> Result<SecretString, ConfigError> {
    // 1. Global env var
    if let Ok(pw) = std::env::var("UCIWIRE_PASSWORD") {
        return Ok(SecretString::from(pw));
    }

    // 2. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(pw) = std::env::var(env_name) {
            return Ok(SecretString::from(pw));
        }
    }

    // 3. Keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password")) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 4. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
        username: username.into(),
    })
}

/// Resolve `AuthCredentials`: a username means `session.login`, no
/// username means the anonymous session.
pub fn resolve_auth(profile: &Profile, profile_name: &str) -> Result<AuthCredentials, ConfigError> {
    let username = profile
        .username
        .clone()
        .or_else(|| std::env::var("UCIWIRE_USERNAME").ok());

    match username {
        None => Ok(AuthCredentials::Anonymous),
        Some(username) => {
            let password = resolve_password(profile, profile_name, &username)?;
            Ok(AuthCredentials::Credentials { username, password })
        }
    }
}

/// Store a profile password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
        .and_then(|entry| entry.set_password(password))
        .map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        })
}

/// Parse and check a profile endpoint.
pub fn parse_endpoint(raw: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "endpoint".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "endpoint".into(),
            reason: format!("expected http or https, got '{}'", url.scheme()),
        });
    }
    Ok(url)
}

/// Build a `RemoteConfig` from a profile: no CLI flag overrides.
pub fn profile_to_remote_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<RemoteConfig, ConfigError> {
    let url = parse_endpoint(&profile.endpoint)?;
    let auth = resolve_auth(profile, profile_name)?;

    // Routers ship self-signed certificates, so verification is opt-in:
    // `insecure = false` or a custom CA.
    let tls = match (profile.insecure, &profile.ca_cert) {
        (Some(true), _) | (None, None) => TlsVerification::DangerAcceptInvalid,
        (_, Some(ca_path)) => TlsVerification::CustomCa(ca_path.clone()),
        (Some(false), None) => TlsVerification::SystemDefaults,
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    let apply = ApplySettings {
        timeout: Duration::from_secs(profile.apply_timeout.unwrap_or(defaults.apply_timeout)),
        ..ApplySettings::default()
    };

    Ok(RemoteConfig {
        url,
        auth,
        tls,
        timeout,
        apply,
    })
}
