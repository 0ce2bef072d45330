//! Runtime bridge between UI command queue and backend event intake.

use std::{collections::HashMap, sync::Arc, thread, time::Duration};

use client_core::{CanteenGateway, ClientError};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use tokio::task::JoinHandle;

use crate::backend_bridge::commands::{BackendCommand, LoadRequest, Mutation, ViewTicket};
use crate::controller::events::{
    Loaded, MutationOutcome, UiError, UiErrorCategory, UiErrorContext, UiEvent,
};

const DELIVERY_RETRY: Duration = Duration::from_millis(25);

/// Tasks still running on behalf of each mounted screen.
#[derive(Default)]
pub struct TaskRegistry {
    tasks: HashMap<ViewTicket, Vec<JoinHandle<()>>>,
}

impl TaskRegistry {
    pub fn register(&mut self, ticket: ViewTicket, handle: JoinHandle<()>) {
        self.tasks.entry(ticket).or_default().push(handle);
    }

    /// Aborts the ticket's unfinished tasks and returns how many there were.
    pub fn cancel(&mut self, ticket: ViewTicket) -> usize {
        let Some(handles) = self.tasks.remove(&ticket) else {
            return 0;
        };
        let mut aborted = 0;
        for handle in handles {
            if !handle.is_finished() {
                handle.abort();
                aborted += 1;
            }
        }
        aborted
    }

    pub fn prune(&mut self) {
        self.tasks.retain(|_, handles| {
            handles.retain(|handle| !handle.is_finished());
            !handles.is_empty()
        });
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn abort_all(&mut self) {
        for (_, handles) in self.tasks.drain() {
            for handle in handles {
                handle.abort();
            }
        }
    }
}

pub fn launch(
    gateway: Arc<dyn CanteenGateway>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::new(
                    UiErrorCategory::Config,
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let mut registry = TaskRegistry::default();
            tracing::info!("backend worker ready");
            let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

            while let Ok(cmd) = cmd_rx.recv() {
                handle_command(&mut registry, &gateway, &ui_tx, cmd);
            }

            registry.prune();
            if !registry.is_empty() {
                tracing::debug!("aborting in-flight backend tasks");
            }
            registry.abort_all();
            tracing::info!("command queue closed; backend worker stopping");
        });
    })
}

fn handle_command(
    registry: &mut TaskRegistry,
    gateway: &Arc<dyn CanteenGateway>,
    ui_tx: &Sender<UiEvent>,
    cmd: BackendCommand,
) {
    registry.prune();
    let cmd_name = cmd.name();
    match cmd {
        BackendCommand::Load { ticket, request } => {
            let gateway = Arc::clone(gateway);
            let ui_tx = ui_tx.clone();
            let handle = tokio::spawn(async move {
                let result = execute_load(gateway.as_ref(), request).await;
                deliver(&ui_tx, UiEvent::Loaded { ticket, result }).await;
            });
            registry.register(ticket, handle);
        }
        BackendCommand::Submit { ticket, mutation } => {
            let gateway = Arc::clone(gateway);
            let ui_tx = ui_tx.clone();
            let handle = tokio::spawn(async move {
                let result = execute_mutation(gateway.as_ref(), mutation).await;
                deliver(&ui_tx, UiEvent::MutationFinished { ticket, result }).await;
            });
            registry.register(ticket, handle);
        }
        BackendCommand::CancelView { ticket } => {
            let aborted = registry.cancel(ticket);
            if aborted > 0 {
                tracing::debug!(ticket = ticket.0, aborted, "cancelled tasks for left view");
            }
            return;
        }
    }
    tracing::debug!(command = cmd_name, "spawned backend task");
}

/// Waits out a full UI queue instead of dropping the result; the screen that
/// asked for it is stuck until it arrives. Gives up once the UI side is gone.
/// Returns whether the event was handed over.
async fn deliver(ui_tx: &Sender<UiEvent>, mut event: UiEvent) -> bool {
    let mut warned = false;
    loop {
        match ui_tx.try_send(event) {
            Ok(()) => return true,
            Err(TrySendError::Full(returned)) => {
                if !warned {
                    tracing::warn!("ui event queue is full; holding backend result");
                    warned = true;
                }
                event = returned;
                tokio::time::sleep(DELIVERY_RETRY).await;
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::warn!("ui event queue closed; dropping backend result");
                return false;
            }
        }
    }
}

pub async fn execute_load(
    gateway: &dyn CanteenGateway,
    request: LoadRequest,
) -> Result<Loaded, ClientError> {
    match request {
        LoadRequest::Users => gateway.list_users().await.map(Loaded::Users),
        LoadRequest::User(id) => gateway.get_user(&id).await.map(Loaded::User),
        LoadRequest::Products => gateway.list_products().await.map(Loaded::Products),
        LoadRequest::Product(id) => gateway.get_product(&id).await.map(Loaded::Product),
    }
}

pub async fn execute_mutation(
    gateway: &dyn CanteenGateway,
    mutation: Mutation,
) -> Result<MutationOutcome, ClientError> {
    match mutation {
        Mutation::CreateUser(user) => {
            gateway.create_user(&user).await?;
            Ok(MutationOutcome::UserCreated)
        }
        Mutation::ChangeBalance { user_id, change } => {
            let response = gateway.change_balance(&user_id, change).await?;
            Ok(MutationOutcome::BalanceChanged {
                change,
                message: response.message,
            })
        }
        Mutation::CreateProduct(product) => {
            gateway.create_product(&product).await?;
            Ok(MutationOutcome::ProductCreated)
        }
        Mutation::UpdateProduct { product_id, update } => {
            gateway.update_product(&product_id, &update).await?;
            Ok(MutationOutcome::ProductUpdated)
        }
        Mutation::AdjustStock {
            product_id,
            adjustment,
        } => {
            gateway.adjust_stock(&product_id, adjustment).await?;
            Ok(MutationOutcome::StockAdjusted {
                product_id,
                delta: adjustment.delta,
            })
        }
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
