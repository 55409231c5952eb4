//! Command dispatch: bridges CLI args -> overlay operations -> output formatting.

pub mod add;
pub mod apply;
pub mod changes;
pub mod config_cmd;
pub mod delete;
pub mod get;
pub mod list_value;
pub mod reorder;
pub mod set;
pub mod show;
pub mod util;

use std::time::Duration;

use uciwire_core::{RemoteOverlay, SaveReport};

use crate::cli::{Command, CommitArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// Dispatch a router-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    overlay: &RemoteOverlay,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Show(args) => show::handle(overlay, args, global).await,
        Command::Get(args) => get::handle(overlay, args, global).await,
        Command::Set(args) => set::handle(overlay, args, global).await,
        Command::Delete(args) => delete::handle(overlay, args, global).await,
        Command::Add(args) => add::handle(overlay, args, global).await,
        Command::AddList(args) => {
            list_value::handle(overlay, args, list_value::ListEdit::Append, global).await
        }
        Command::DelList(args) => {
            list_value::handle(overlay, args, list_value::ListEdit::Remove, global).await
        }
        Command::Reorder(args) => reorder::handle(overlay, args, global).await,
        Command::Changes(args) => changes::handle(overlay, args, global).await,
        Command::Apply(args) => {
            apply::run(overlay, args.timeout.map(Duration::from_secs), global).await
        }
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "local command dispatched to the router".into(),
        )),
    }
}

/// Save pending changes and, with `--apply`, activate them.
pub async fn commit(
    overlay: &RemoteOverlay,
    args: &CommitArgs,
    global: &GlobalOpts,
) -> Result<SaveReport, CliError> {
    let report = overlay.save().await?;
    if report.configs.is_empty() {
        output::notice(&global.color, global.quiet, "Nothing to save");
        return Ok(report);
    }
    output::notice(
        &global.color,
        global.quiet,
        &format!("Saved changes to {}", report.configs.join(", ")),
    );

    if args.apply {
        apply::run(overlay, args.rollback_timeout.map(Duration::from_secs), global).await?;
    }
    Ok(report)
}
