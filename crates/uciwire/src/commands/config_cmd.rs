//! Config subcommand handlers.

use dialoguer::{Confirm, Input, Password, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of `cfg` with plaintext passwords masked.
fn redacted(cfg: &Config) -> Config {
    let profiles = cfg
        .profiles
        .iter()
        .map(|(name, p)| {
            let mut p = p.clone();
            if p.password.is_some() {
                p.password = Some("****".into());
            }
            (name.clone(), p)
        })
        .collect();

    Config {
        default_profile: cfg.default_profile.clone(),
        defaults: cfg.defaults.clone(),
        profiles,
    }
}

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# failed to render config: {e}"))
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Ask for a password and store it in the keyring, or hand it back for
/// plaintext storage.
///
/// Returns `Some(password)` if the user chose plaintext, `None` if stored in keyring.
fn prompt_password_storage(profile_name: &str) -> Result<Option<String>, CliError> {
    let password = Password::new()
        .with_prompt("Password")
        .interact()
        .map_err(prompt_err)?;
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }

    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        uciwire_config::store_password(profile_name, &password)?;
        eprintln!("   ✓ Password stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(password))
    }
}

fn profile_not_found(name: String, cfg: &Config) -> CliError {
    CliError::ProfileNotFound {
        name,
        available: config::available_profiles(cfg),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, format_config_redacted, |c| {
                format_config_redacted(c)
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: uciwire config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(name, &cfg));
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));

            let Some(prof) = cfg.profiles.get(&profile_name) else {
                return Err(profile_not_found(profile_name, &cfg));
            };
            if prof.username.is_none() {
                eprintln!("Note: profile '{profile_name}' has no username and uses the anonymous session");
            }

            let password = Password::new()
                .with_prompt(format!("Password for '{profile_name}'"))
                .interact()
                .map_err(prompt_err)?;
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "value cannot be empty".into(),
                });
            }
            uciwire_config::store_password(&profile_name, &password)?;

            eprintln!("✓ Password stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}

// ── Init: interactive wizard ────────────────────────────────────────

fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("✨ uciwire configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    // 1. Profile name
    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    // 2. Endpoint
    let endpoint: String = Input::new()
        .with_prompt("JSON-RPC endpoint")
        .default("https://192.168.1.1/ubus".into())
        .validate_with(|raw: &String| {
            uciwire_config::parse_endpoint(raw)
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact_text()
        .map_err(prompt_err)?;

    // 3. Credentials
    let auth_choices = &["Username/Password (session.login)", "Anonymous session"];
    let auth_selection = Select::new()
        .with_prompt("Authentication method")
        .items(auth_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let (username, password) = if auth_selection == 0 {
        let user: String = Input::new()
            .with_prompt("Username")
            .default("root".into())
            .interact_text()
            .map_err(prompt_err)?;
        (Some(user), prompt_password_storage(&profile_name)?)
    } else {
        (None, None)
    };

    // 4. TLS
    let insecure = endpoint.starts_with("https")
        && Confirm::new()
            .with_prompt("Accept self-signed certificates?")
            .default(true)
            .interact()
            .map_err(prompt_err)?;

    // 5. Build profile and config, keeping other profiles
    let profile = Profile {
        endpoint,
        username,
        password,
        insecure: Some(insecure),
        ..Profile::default()
    };

    let mut cfg = config::load_config_or_default();
    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());

    // 6. Write config
    config::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: uciwire show network");

    Ok(())
}
