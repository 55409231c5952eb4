//! `add-list` / `del-list` handlers.

use uciwire_core::{OptionValue, RemoteOverlay};

use crate::cli::{GlobalOpts, ListValueArgs};
use crate::error::CliError;

use super::util;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEdit {
    Append,
    Remove,
}

impl ListEdit {
    /// New list contents, or `None` if a removal matched nothing. A scalar
    /// option is treated as a one-element list.
    fn edit(self, current: Option<&OptionValue>, value: &str) -> Option<Vec<String>> {
        let mut items = current.map(OptionValue::to_vec).unwrap_or_default();
        match self {
            Self::Append => items.push(value.to_owned()),
            Self::Remove => {
                let before = items.len();
                items.retain(|item| item != value);
                if items.len() == before {
                    return None;
                }
            }
        }
        Some(items)
    }
}

pub async fn handle(
    overlay: &RemoteOverlay,
    args: ListValueArgs,
    edit: ListEdit,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (path, value) = util::parse_assignment(&args.assignment)?;
    let (sid, option) = path.require_option()?;
    overlay.load(&path.config).await?;

    let section = util::require_section(overlay, &path)?;
    let items = edit
        .edit(section.get(option), &value)
        .ok_or_else(|| CliError::NotFound {
            resource_type: "list value".into(),
            identifier: format!("{}={value}", path.display()),
            config: path.config.clone(),
        })?;

    // An emptied list unsets the option.
    overlay.set(&path.config, sid, option, OptionValue::List(items));

    super::commit(overlay, &args.commit, global).await?;
    Ok(())
}
