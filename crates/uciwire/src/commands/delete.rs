//! `delete` handler.

use uciwire_core::RemoteOverlay;

use crate::cli::{DeleteArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    overlay: &RemoteOverlay,
    args: DeleteArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let path = util::parse_path(&args.path)?;
    let sid = path.require_section()?;
    overlay.load(&path.config).await?;

    let section = util::require_section(overlay, &path)?;

    match path.option.as_deref() {
        Some(option) => {
            if !section.has_option(option) {
                return Err(CliError::NotFound {
                    resource_type: "option".into(),
                    identifier: path.display(),
                    config: path.config.clone(),
                });
            }
            overlay.unset(&path.config, sid, option);
        }
        None => {
            let prompt = format!(
                "Delete {} section {}.{} and all of its options?",
                section.section_type, path.config, section.name
            );
            if !util::confirm(&prompt, global.yes)? {
                output::warning(&global.color, "Aborted");
                return Ok(());
            }
            overlay.remove(&path.config, sid);
        }
    }

    super::commit(overlay, &args.commit, global).await?;
    Ok(())
}
