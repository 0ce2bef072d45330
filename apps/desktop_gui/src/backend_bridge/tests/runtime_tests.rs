use super::*;

use std::time::Duration;

use crossbeam_channel::bounded;
use shared::{
    domain::{BalanceOperation, ProductId, UserId},
    money::Money,
    protocol::StockAdjustment,
};
use tokio::sync::oneshot;

use crate::test_support::{not_found, FakeGateway};
use client_core::BalanceChange;

#[tokio::test]
async fn load_requests_map_to_gateway_reads() {
    let gateway = FakeGateway::with_data();

    let loaded = execute_load(&gateway, LoadRequest::Users)
        .await
        .expect("users");
    assert!(matches!(loaded, Loaded::Users(ref users) if users.len() == 2));

    let loaded = execute_load(&gateway, LoadRequest::Product(ProductId::from(11)))
        .await
        .expect("product");
    assert!(matches!(loaded, Loaded::Product(ref product) if product.name == "Suco"));

    let err = execute_load(&gateway, LoadRequest::User(UserId::from(99)))
        .await
        .expect_err("unknown user");
    assert!(err.is_not_found());
}

#[tokio::test]
async fn mutations_report_what_to_apply_locally() {
    let gateway = FakeGateway::with_data();
    let change = BalanceChange {
        operation: BalanceOperation::Withdraw,
        amount: Money::from_cents(250),
    };

    let outcome = execute_mutation(
        &gateway,
        Mutation::ChangeBalance {
            user_id: UserId::from(1),
            change,
        },
    )
    .await
    .expect("balance change");
    assert_eq!(
        outcome,
        MutationOutcome::BalanceChanged {
            change,
            message: Some("Depósito realizado".to_string()),
        }
    );

    let outcome = execute_mutation(
        &gateway,
        Mutation::AdjustStock {
            product_id: ProductId::from(10),
            adjustment: StockAdjustment { delta: 5 },
        },
    )
    .await
    .expect("adjust");
    assert_eq!(
        outcome,
        MutationOutcome::StockAdjusted {
            product_id: ProductId::from(10),
            delta: 5,
        }
    );
    assert_eq!(gateway.calls(), vec!["withdraw 1 250", "adjust_stock 10 5"]);
}

#[tokio::test]
async fn failed_mutation_passes_error_through() {
    let gateway = FakeGateway::failing(not_found());
    let err = execute_mutation(
        &gateway,
        Mutation::AdjustStock {
            product_id: ProductId::from(10),
            adjustment: StockAdjustment { delta: 1 },
        },
    )
    .await
    .expect_err("backend failure");
    assert_eq!(err, not_found());
}

#[tokio::test]
async fn cancelling_a_ticket_aborts_its_tasks_only() {
    let mut registry = TaskRegistry::default();
    let (left_tx, left_rx) = oneshot::channel::<()>();
    let (kept_tx, kept_rx) = oneshot::channel::<()>();

    registry.register(
        ViewTicket(1),
        tokio::spawn(async move {
            let _guard = left_tx;
            std::future::pending::<()>().await;
        }),
    );
    registry.register(
        ViewTicket(2),
        tokio::spawn(async move {
            let _ = kept_tx.send(());
        }),
    );

    assert_eq!(registry.cancel(ViewTicket(1)), 1);
    assert!(left_rx.await.is_err(), "aborted task drops its sender");
    assert!(kept_rx.await.is_ok());
    assert_eq!(registry.cancel(ViewTicket(1)), 0);
}

#[tokio::test]
async fn full_ui_queue_holds_results_until_drained() {
    let (ui_tx, ui_rx) = bounded(1);
    ui_tx
        .try_send(UiEvent::Info("busy".to_string()))
        .expect("room for one");

    let pending = tokio::spawn({
        let ui_tx = ui_tx.clone();
        async move {
            deliver(
                &ui_tx,
                UiEvent::Loaded {
                    ticket: ViewTicket(4),
                    result: Err(not_found()),
                },
            )
            .await
        }
    });
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(!pending.is_finished(), "waits while the queue is full");

    assert!(matches!(ui_rx.try_recv(), Ok(UiEvent::Info(_))));
    assert!(pending.await.expect("delivery task"));
    assert!(matches!(
        ui_rx.try_recv(),
        Ok(UiEvent::Loaded {
            ticket: ViewTicket(4),
            result: Err(_),
        })
    ));

    drop(ui_rx);
    assert!(!deliver(&ui_tx, UiEvent::Info("late".to_string())).await);
}

fn next_backend_event(ui_rx: &Receiver<UiEvent>) -> UiEvent {
    loop {
        match ui_rx.recv_timeout(Duration::from_secs(5)) {
            Ok(UiEvent::Info(_)) => continue,
            Ok(event) => return event,
            Err(err) => panic!("no backend event: {err}"),
        }
    }
}

#[test]
fn worker_answers_loads_with_the_requesting_ticket() {
    let (cmd_tx, cmd_rx) = bounded(8);
    let (ui_tx, ui_rx) = bounded(8);
    let worker = launch(Arc::new(FakeGateway::with_data()), cmd_rx, ui_tx);

    cmd_tx
        .send(BackendCommand::Load {
            ticket: ViewTicket(7),
            request: LoadRequest::Products,
        })
        .expect("send load");

    match next_backend_event(&ui_rx) {
        UiEvent::Loaded {
            ticket,
            result: Ok(Loaded::Products(products)),
        } => {
            assert_eq!(ticket, ViewTicket(7));
            assert_eq!(products.len(), 2);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    drop(cmd_tx);
    worker.join().expect("worker exits once the queue closes");
}

#[test]
fn cancelled_view_never_receives_its_result() {
    let gateway = FakeGateway::stalled();
    let (cmd_tx, cmd_rx) = bounded(8);
    let (ui_tx, ui_rx) = bounded(8);
    let worker = launch(Arc::new(gateway), cmd_rx, ui_tx);

    cmd_tx
        .send(BackendCommand::Load {
            ticket: ViewTicket(1),
            request: LoadRequest::Users,
        })
        .expect("send load");
    cmd_tx
        .send(BackendCommand::CancelView {
            ticket: ViewTicket(1),
        })
        .expect("send cancel");
    drop(cmd_tx);
    worker.join().expect("worker exits");

    let leftovers: Vec<UiEvent> = ui_rx.try_iter().collect();
    assert!(
        leftovers
            .iter()
            .all(|event| matches!(event, UiEvent::Info(_))),
        "got {leftovers:?}"
    );
}
