//! `add` handler.

use uciwire_core::{CreatedSection, RemoteOverlay};

use crate::cli::{AddArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    overlay: &RemoteOverlay,
    args: AddArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let options = args
        .options
        .iter()
        .map(|raw| util::parse_option_pair(raw))
        .collect::<Result<Vec<_>, _>>()?;

    overlay.load(&args.config).await?;

    if let Some(ref name) = args.name {
        if overlay.section(&args.config, name.as_str()).is_some() {
            return Err(CliError::Validation {
                field: "name".into(),
                reason: format!("section {}.{name} already exists", args.config),
            });
        }
    }

    let local_id = overlay.add(&args.config, &args.section_type, args.name.as_deref());
    for (option, value) in &options {
        overlay.set(&args.config, local_id.as_str(), option, value.as_str());
    }

    let report = super::commit(overlay, &args.commit, global).await?;

    // The remote names anonymous sections on save.
    let created = report
        .created
        .into_iter()
        .find(|c| c.config == args.config && c.local_id == local_id)
        .unwrap_or_else(|| CreatedSection {
            config: args.config.clone(),
            name: local_id.clone(),
            local_id,
        });

    let out = output::render_single(&global.output, &created, |c| c.name.clone(), |c| c.name.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
