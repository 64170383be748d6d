//! Event loop: user input lines and I/O completions feed the controller; every
//! state change re-renders the active screen.

use std::{io::Write, time::Duration};

use anyhow::{Context, Result};
use client_core::{
    render_screen, LightMarkup, MarkupRenderer, SkipReason, SubmitOutcome, WorkflowController,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::{
    commands::{self, CommandError, UserIntent, HELP},
    view,
};

/// How long a health probe still outstanding at end of input may take to report.
const HEALTH_CHECK_GRACE: Duration = Duration::from_millis(500);

pub async fn run<R, W>(mut controller: WorkflowController, input: R, mut out: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let renderer = LightMarkup;
    let mut lines = input.lines();

    writeln!(out, "PreventiveCare AI - type `help` for commands")?;
    print_screen(&controller, &renderer, &mut out)?;

    loop {
        let pending = controller.has_pending();
        let before = controller.store().clone();
        tokio::select! {
            biased;

            applied = controller.wait_for_completion(), if pending => {
                if applied {
                    print_notices(&mut controller, &mut out)?;
                    if controller.store() != &before {
                        print_screen(&controller, &renderer, &mut out)?;
                    }
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read input")? else {
                    break;
                };
                match commands::parse(&line) {
                    Ok(UserIntent::Quit) => return Ok(()),
                    Ok(intent) => handle_intent(&mut controller, intent, &renderer, &mut out)?,
                    Err(CommandError::Empty) => {}
                    Err(err) => writeln!(out, "{err}")?,
                }
            }
        }
    }

    // Input closed: let pending work land so its outcome is still shown.
    if controller.has_pending() {
        controller.settle().await;
        let _ = tokio::time::timeout(HEALTH_CHECK_GRACE, async {
            while controller.wait_for_completion().await {}
        })
        .await;
        print_notices(&mut controller, &mut out)?;
        print_screen(&controller, &renderer, &mut out)?;
    }
    Ok(())
}

fn handle_intent<W: Write>(
    controller: &mut WorkflowController,
    intent: UserIntent,
    renderer: &dyn MarkupRenderer,
    out: &mut W,
) -> Result<()> {
    tracing::debug!(intent = intent.name(), "handling user intent");
    match intent {
        UserIntent::Edit { field, value } => match controller.edit_field(field, value) {
            Ok(()) => print_screen(controller, renderer, out)?,
            Err(err) => writeln!(out, "{err}")?,
        },
        UserIntent::Sync => {
            controller.sync_device();
            print_screen(controller, renderer, out)?;
        }
        UserIntent::Submit => match controller.submit_analysis() {
            SubmitOutcome::Dispatched => print_screen(controller, renderer, out)?,
            SubmitOutcome::Skipped(SkipReason::Busy) => {
                writeln!(out, "Please wait for the current operation to finish.")?
            }
            SubmitOutcome::Skipped(SkipReason::AgeUnset) => {
                writeln!(out, "Enter your age before running the analysis.")?
            }
        },
        UserIntent::Back => {
            controller.go_to_input();
            print_screen(controller, renderer, out)?;
        }
        UserIntent::Show => print_screen(controller, renderer, out)?,
        UserIntent::Status => {
            controller.check_service();
            writeln!(out, "Checking service...")?;
        }
        UserIntent::Help => writeln!(out, "{HELP}")?,
        UserIntent::Quit => {}
    }
    Ok(())
}

fn print_screen<W: Write>(
    controller: &WorkflowController,
    renderer: &dyn MarkupRenderer,
    out: &mut W,
) -> Result<()> {
    let screen = render_screen(controller.store(), renderer);
    writeln!(out, "{}", view::render_screen(&screen))?;
    out.flush()?;
    Ok(())
}

fn print_notices<W: Write>(controller: &mut WorkflowController, out: &mut W) -> Result<()> {
    for alert in controller.take_alerts() {
        writeln!(out, "ALERT: {}", alert.message)?;
    }
    for report in controller.take_health_reports() {
        match report {
            Ok(health) => writeln!(out, "Service {}: {}", health.status, health.system)?,
            Err(err) => writeln!(out, "{}", err.user_message())?,
        }
    }
    Ok(())
}
