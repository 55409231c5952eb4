//! CLI configuration: thin wrapper around `uciwire_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--endpoint, --username, etc.).

use secrecy::SecretString;

use uciwire_core::{AuthCredentials, RemoteConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use uciwire_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Names of all configured profiles, sorted, for help text.
pub fn available_profiles(config: &Config) -> String {
    let mut names: Vec<_> = config.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}

/// Build a `RemoteConfig` from the config file, profile, and CLI overrides.
///
/// Without a stored profile, `--endpoint` alone is enough: the remaining
/// settings come from `[defaults]`.
pub fn build_remote_config(global: &GlobalOpts) -> Result<(String, RemoteConfig), CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.endpoint.is_some() => Profile::default(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        None => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    let remote = resolve_profile(profile, &profile_name, &cfg.defaults, global)?;
    Ok((profile_name, remote))
}

/// Translate a `Profile` + global flags into a `RemoteConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    mut profile: Profile,
    profile_name: &str,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<RemoteConfig, CliError> {
    if let Some(ref endpoint) = global.endpoint {
        profile.endpoint.clone_from(endpoint);
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    // A password on the command line stands in for keyring and plaintext.
    if let Some(ref password) = global.password {
        profile.password = Some(password.clone());
        profile.password_env = None;
    }

    let mut remote = uciwire_config::profile_to_remote_config(&profile, profile_name, defaults)?;

    if let (Some(password), AuthCredentials::Credentials { password: current, .. }) =
        (global.password.as_ref(), &mut remote.auth)
    {
        *current = SecretString::from(password.clone());
    }

    Ok(remote)
}
