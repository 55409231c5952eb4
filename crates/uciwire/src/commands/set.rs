//! `set` handler.

use uciwire_core::{RemoteOverlay, SectionRef};

use crate::cli::{GlobalOpts, SetArgs};
use crate::error::CliError;

use super::util::{self, UciPath};

pub async fn handle(
    overlay: &RemoteOverlay,
    args: SetArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let assignments = args
        .assignments
        .iter()
        .map(|raw| util::parse_assignment(raw))
        .collect::<Result<Vec<_>, _>>()?;

    overlay
        .load_all(assignments.iter().map(|(path, _)| path.config.as_str()))
        .await?;

    for (path, value) in &assignments {
        stage(overlay, path, value)?;
    }

    super::commit(overlay, &args.commit, global).await?;
    Ok(())
}

/// Record one assignment. `config.section=type` creates a named section;
/// `config.section.option=value` sets an option on an existing one.
fn stage(overlay: &RemoteOverlay, path: &UciPath, value: &str) -> Result<(), CliError> {
    let sid = path.require_section()?;

    let Some(option) = path.option.as_deref() else {
        return create_named(overlay, path, sid, value);
    };

    util::require_section(overlay, path)?;
    tracing::debug!(target = %path.display(), "set");
    overlay.set(&path.config, sid, option, value);
    Ok(())
}

fn create_named(
    overlay: &RemoteOverlay,
    path: &UciPath,
    sid: &str,
    section_type: &str,
) -> Result<(), CliError> {
    if section_type.is_empty() {
        return Err(CliError::Validation {
            field: path.display(),
            reason: "section type cannot be empty".into(),
        });
    }

    match overlay.section(&path.config, sid) {
        Some(existing) if existing.section_type == section_type => Ok(()),
        Some(existing) => Err(CliError::Validation {
            field: path.display(),
            reason: format!(
                "section already exists with type '{}'",
                existing.section_type
            ),
        }),
        None if SectionRef::parse(sid).as_named().is_none() => Err(CliError::NotFound {
            resource_type: "section".into(),
            identifier: path.display(),
            config: path.config.clone(),
        }),
        None => {
            overlay.add(&path.config, section_type, Some(sid));
            Ok(())
        }
    }
}
