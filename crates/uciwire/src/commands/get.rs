//! `get` handler: one option value, or a section's type.

use uciwire_core::RemoteOverlay;

use crate::cli::{GetArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    overlay: &RemoteOverlay,
    args: GetArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let path = util::parse_path(&args.path)?;
    overlay.load(&path.config).await?;

    let section = util::require_section(overlay, &path)?;

    let out = match path.option.as_deref() {
        None => output::render_single(
            &global.output,
            section.section_type.as_str(),
            ToString::to_string,
            ToString::to_string,
        )?,
        Some(option) => {
            let value = section
                .get(option)
                .ok_or_else(|| CliError::NotFound {
                    resource_type: "option".into(),
                    identifier: path.display(),
                    config: path.config.clone(),
                })?;
            output::render_single(&global.output, value, ToString::to_string, ToString::to_string)?
        }
    };

    output::print_output(&out, global.quiet);
    Ok(())
}
