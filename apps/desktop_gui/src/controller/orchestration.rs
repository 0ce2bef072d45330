//! Command orchestration helpers from UI actions to backend command queue.

use client_core::ClientError;
use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::controller::reducer::Console;

const QUEUE_FULL: &str = "UI command queue is full; please retry";
const WORKER_GONE: &str =
    "Backend worker disconnected (possible startup/runtime failure); restart the console";

/// Queues `cmd` for the backend worker. On failure the status line explains
/// why and the unsent command is handed back.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) -> Result<(), BackendCommand> {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            Ok(())
        }
        Err(TrySendError::Full(cmd)) => {
            *status = QUEUE_FULL.to_string();
            tracing::warn!(command = cmd_name, "ui->backend command queue is full");
            Err(cmd)
        }
        Err(TrySendError::Disconnected(cmd)) => {
            *status = WORKER_GONE.to_string();
            tracing::error!(command = cmd_name, "backend worker is gone");
            Err(cmd)
        }
    }
}

/// Sends everything the reducer queued since the last frame. A command that
/// never reached the worker is answered locally with a transport failure so
/// the screen that issued it does not wait forever.
pub fn flush_commands(console: &mut Console, cmd_tx: &Sender<BackendCommand>) {
    for cmd in console.take_commands() {
        let Err(unsent) = dispatch_backend_command(cmd_tx, cmd, console.status_mut()) else {
            continue;
        };
        let reason = console.status().to_string();
        if let Some(event) = unsent_failure(unsent, reason) {
            console.apply(event);
        }
    }
}

fn unsent_failure(cmd: BackendCommand, message: String) -> Option<UiEvent> {
    let err = ClientError::Transport { message };
    match cmd {
        BackendCommand::Load { ticket, .. } => Some(UiEvent::Loaded {
            ticket,
            result: Err(err),
        }),
        BackendCommand::Submit { ticket, .. } => Some(UiEvent::MutationFinished {
            ticket,
            result: Err(err),
        }),
        BackendCommand::CancelView { .. } => None,
    }
}
