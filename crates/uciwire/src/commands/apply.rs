//! `apply` handler: drives the apply/confirm protocol with a spinner.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use uciwire_core::{ApplyState, RemoteOverlay};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

fn spinner(global: &GlobalOpts) -> ProgressBar {
    if global.quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn describe(state: ApplyState) -> &'static str {
    match state {
        ApplyState::Idle => "Waiting",
        ApplyState::Applying => "Applying changes",
        ApplyState::AwaitingConfirmation => "Confirming changes before rollback",
        ApplyState::Confirmed => "Confirmed",
        ApplyState::RolledBack => "Rolling back",
    }
}

/// Apply saved changes and confirm them, reporting progress on stderr.
pub async fn run(
    overlay: &RemoteOverlay,
    timeout: Option<Duration>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let bar = spinner(global);
    let mut states = overlay.apply_state();

    let apply = overlay.apply(timeout);
    tokio::pin!(apply);

    let result = loop {
        tokio::select! {
            result = &mut apply => break result,
            changed = states.changed() => {
                if changed.is_err() {
                    break (&mut apply).await;
                }
                let state = *states.borrow_and_update();
                tracing::trace!(%state, "apply progress");
                bar.set_message(describe(state));
            }
        }
    };
    bar.finish_and_clear();

    result?;
    output::notice(&global.color, global.quiet, "Changes applied and confirmed");
    Ok(())
}
