//! `changes` handler.

use serde::Serialize;
use tabled::Tabled;
use uciwire_core::{Change, RemoteOverlay};

use crate::cli::{ChangesArgs, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, quote};

/// A remote change together with the configuration it belongs to.
#[derive(Debug, Serialize)]
struct ConfigChange {
    config: String,
    #[serde(flatten)]
    change: Change,
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ChangeRow {
    #[tabled(rename = "Config")]
    config: String,
    #[tabled(rename = "Operation")]
    operation: String,
    #[tabled(rename = "Change")]
    change: String,
}

impl From<&ConfigChange> for ChangeRow {
    fn from(c: &ConfigChange) -> Self {
        Self {
            config: c.config.clone(),
            operation: c
                .change
                .op()
                .map_or_else(|| "unknown".into(), |op| op.to_string()),
            change: change_line(&c.config, &c.change),
        }
    }
}

/// One change in `uci changes` notation: `-` removes, `@` reorders,
/// `+` appends to a list, `~` removes from a list.
fn change_line(config: &str, change: &Change) -> String {
    let target = |section: &str, option: Option<&str>| match option {
        Some(option) => format!("{config}.{section}.{option}"),
        None => format!("{config}.{section}"),
    };

    match change {
        Change::Add {
            section,
            section_type,
        } => format!("{}={section_type}", target(section, None)),
        Change::Set {
            section,
            option: None,
            value,
        } => format!("{}={value}", target(section, None)),
        Change::Set {
            section,
            option: Some(option),
            value,
        } => format!("{}={}", target(section, Some(option)), quote(value)),
        Change::Remove { section, option } => format!("-{}", target(section, option.as_deref())),
        Change::Order { section, index } => format!("@{}={index}", target(section, None)),
        Change::Rename {
            section,
            option,
            name,
        } => format!("{}={name}", target(section, option.as_deref())),
        Change::ListAdd {
            section,
            option,
            value,
        } => format!("+{}={}", target(section, Some(option)), quote(value)),
        Change::ListDel {
            section,
            option,
            value,
        } => format!("~{}={}", target(section, Some(option)), quote(value)),
        Change::Unknown { fields } => format!("? {config} {}", fields.join(" ")),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    overlay: &RemoteOverlay,
    args: ChangesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let changes: Vec<ConfigChange> = overlay
        .changes()
        .await?
        .into_iter()
        .filter(|(config, _)| args.config.as_ref().is_none_or(|wanted| wanted == config))
        .flat_map(|(config, changes)| {
            changes.into_iter().map(move |change| ConfigChange {
                config: config.clone(),
                change,
            })
        })
        .collect();

    if changes.is_empty() {
        output::notice(&global.color, global.quiet, "No pending changes");
        return Ok(());
    }

    let out = output::render_list(
        &global.output,
        &changes,
        |c| ChangeRow::from(c),
        |c| change_line(&c.config, &c.change),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
