//! Shared helpers for command handlers.

use std::io::IsTerminal;

use uciwire_core::{RemoteOverlay, Section};

use crate::error::CliError;

/// A `config[.section[.option]]` path as `uci` spells it on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UciPath {
    pub config: String,
    pub section: Option<String>,
    pub option: Option<String>,
}

impl UciPath {
    /// Section part, or a validation error naming what was expected.
    pub fn require_section(&self) -> Result<&str, CliError> {
        self.section.as_deref().ok_or_else(|| CliError::Validation {
            field: "path".into(),
            reason: format!("expected {}.<section>", self.config),
        })
    }

    pub fn require_option(&self) -> Result<(&str, &str), CliError> {
        let section = self.require_section()?;
        let option = self.option.as_deref().ok_or_else(|| CliError::Validation {
            field: "path".into(),
            reason: format!("expected {}.{section}.<option>", self.config),
        })?;
        Ok((section, option))
    }

    /// Dotted form, for messages.
    pub fn display(&self) -> String {
        [Some(self.config.as_str()), self.section.as_deref(), self.option.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(".")
    }
}

fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Parse `config`, `config.section` or `config.section.option`. The section
/// part may use `@type[n]` notation.
pub fn parse_path(raw: &str) -> Result<UciPath, CliError> {
    let invalid = |reason: &str| CliError::Validation {
        field: "path".into(),
        reason: format!("{reason}: '{raw}'"),
    };

    let mut parts = raw.splitn(3, '.');
    let config = parts.next().unwrap_or_default();
    if !valid_name(config) {
        return Err(invalid("invalid configuration name"));
    }

    let section = parts.next().map(str::to_owned);
    if section.as_deref().is_some_and(str::is_empty) {
        return Err(invalid("empty section name"));
    }

    let option = parts.next().map(str::to_owned);
    if let Some(ref option) = option {
        if !valid_name(option) {
            return Err(invalid("invalid option name"));
        }
    }

    Ok(UciPath {
        config: config.to_owned(),
        section,
        option,
    })
}

/// Parse `path=value`. The value is taken verbatim, including any further
/// `=` characters.
pub fn parse_assignment(raw: &str) -> Result<(UciPath, String), CliError> {
    let (path, value) = raw.split_once('=').ok_or_else(|| CliError::Validation {
        field: "assignment".into(),
        reason: format!("expected <path>=<value>, got '{raw}'"),
    })?;
    Ok((parse_path(path)?, value.to_owned()))
}

/// Parse an `option=value` pair as accepted by `add`.
pub fn parse_option_pair(raw: &str) -> Result<(String, String), CliError> {
    match raw.split_once('=') {
        Some((option, value)) if valid_name(option) => Ok((option.to_owned(), value.to_owned())),
        _ => Err(CliError::Validation {
            field: "option".into(),
            reason: format!("expected <option>=<value>, got '{raw}'"),
        }),
    }
}

/// The effective section at `path`, or a not-found error.
pub fn require_section(overlay: &RemoteOverlay, path: &UciPath) -> Result<Section, CliError> {
    let sid = path.require_section()?;
    overlay
        .section(&path.config, sid)
        .ok_or_else(|| CliError::NotFound {
            resource_type: "section".into(),
            identifier: format!("{}.{sid}", path.config),
            config: path.config.clone(),
        })
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}
