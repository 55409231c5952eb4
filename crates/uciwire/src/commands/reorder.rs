//! `reorder` handler.

use uciwire_core::{RemoteOverlay, SectionRef};

use crate::cli::{GlobalOpts, ReorderArgs};
use crate::error::CliError;

use super::util;

pub async fn handle(
    overlay: &RemoteOverlay,
    args: ReorderArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let path = util::parse_path(&args.path)?;
    let sid = path.require_section()?;
    overlay.load(&path.config).await?;

    let (anchor, after) = match (args.before, args.after) {
        (Some(before), _) => (Some(before), false),
        (None, Some(after)) => (Some(after), true),
        (None, None) => (None, false),
    };
    let anchor_ref = anchor.as_deref().map(SectionRef::parse);

    if !overlay.move_section(&path.config, sid, anchor_ref, after) {
        let identifier = match anchor {
            Some(anchor) => format!("{} or {}.{anchor}", path.display(), path.config),
            None => path.display(),
        };
        return Err(CliError::NotFound {
            resource_type: "section".into(),
            identifier,
            config: path.config.clone(),
        });
    }

    super::commit(overlay, &args.commit, global).await?;
    Ok(())
}
