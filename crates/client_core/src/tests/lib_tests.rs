use super::*;

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, put},
    Json, Router,
};
use serde_json::{json, Value};
use shared::domain::Role;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct BackendState {
    received: Arc<Mutex<Vec<(String, Value)>>>,
}

impl BackendState {
    async fn record(&self, route: impl Into<String>, body: Value) {
        self.received.lock().await.push((route.into(), body));
    }

    async fn received(&self) -> Vec<(String, Value)> {
        self.received.lock().await.clone()
    }
}

async fn list_users() -> Json<Value> {
    Json(json!([
        {"id": 1, "nome": "Ana", "sobrenome": "Lima", "quarto": "12", "tipo_usuario": 1, "saldo": 15.5},
        {"id": "u-2", "nome": "Rui", "sobrenome": "Costa", "quarto": "3", "tipo_usuario": "2"}
    ]))
}

async fn get_user(Path(id): Path<String>) -> (StatusCode, Json<Value>) {
    if id == "1" {
        (
            StatusCode::OK,
            Json(json!({"id": 1, "nome": "Ana", "sobrenome": "Lima", "quarto": "12", "tipo_usuario": 1, "saldo": null})),
        )
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Usuário não encontrado"})),
        )
    }
}

async fn create_user(
    State(state): State<BackendState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.record("POST /usuarios", body.clone()).await;
    let mut created = body;
    created["id"] = json!(99);
    (StatusCode::CREATED, Json(created))
}

async fn deposit(
    State(state): State<BackendState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.record(format!("PUT /deposit/{id}"), body).await;
    Json(json!({"message": "Depósito realizado"}))
}

async fn withdraw(
    State(state): State<BackendState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.record(format!("PUT /withdraw/{id}"), body).await;
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"message": "Saldo insuficiente"})),
    )
}

async fn list_products() -> Json<Value> {
    Json(json!([
        {"id": 10, "nome": "Chocolate", "quantidade": 3, "tipo": "Doce", "preco": 4.5}
    ]))
}

async fn get_product() -> &'static str {
    "not json"
}

async fn create_product(
    State(state): State<BackendState>,
    Json(body): Json<Value>,
) -> &'static str {
    state.record("POST /produtos", body).await;
    "created"
}

async fn update_product(
    State(state): State<BackendState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.record(format!("PUT /produtos/{id}"), body.clone()).await;
    Json(json!({"id": id, "nome": body["nome"], "quantidade": 3, "tipo": body["tipo"], "preco": body["preco"]}))
}

async fn adjust_stock(
    State(state): State<BackendState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.record(format!("PATCH /produtos/{id}/adjust"), body.clone()).await;
    let delta = body["delta"].as_i64().unwrap_or_default();
    Json(json!({"id": id, "nome": "Chocolate", "quantidade": 3 + delta, "tipo": "Doce", "preco": 4.5}))
}

async fn spawn_backend() -> Result<(String, BackendState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = BackendState::default();
    let app = Router::new()
        .route("/usuarios", get(list_users).post(create_user))
        .route("/usuarios/:id", get(get_user))
        .route("/deposit/:id", put(deposit))
        .route("/withdraw/:id", put(withdraw))
        .route("/produtos", get(list_products).post(create_product))
        .route("/produtos/:id", get(get_product).put(update_product))
        .route("/produtos/:id/adjust", patch(adjust_stock))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

async fn client() -> (CanteenClient, BackendState) {
    let (url, state) = spawn_backend().await.expect("spawn backend");
    let client = CanteenClient::new(&format!("{url}/")).expect("client");
    (client, state)
}

#[tokio::test]
async fn lists_users_with_mixed_id_and_role_shapes() {
    let (client, _) = client().await;

    let users = client.list_users().await.expect("list users");
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].id, UserId::from(1));
    assert_eq!(users[0].balance, Money::from_cents(1550));
    assert_eq!(users[1].id.as_str(), "u-2");
    assert_eq!(users[1].role, Some(Role::Staff));
    assert_eq!(users[1].balance, Money::ZERO);
}

#[tokio::test]
async fn missing_user_surfaces_status_and_backend_message() {
    let (client, _) = client().await;

    let user = client.get_user(&UserId::from(1)).await.expect("get user");
    assert_eq!(user.full_name(), "Ana Lima");

    let err = client
        .get_user(&UserId::from(404))
        .await
        .expect_err("missing user");
    assert_eq!(
        err,
        ClientError::Status {
            status: 404,
            status_text: "Not Found".to_string(),
            message: Some("Usuário não encontrado".to_string()),
        }
    );
}

#[tokio::test]
async fn create_user_posts_wire_payload() {
    let (client, state) = client().await;
    let payload = NewUser {
        first_name: "Rui".to_string(),
        last_name: "Costa".to_string(),
        nickname: Some("Ruizinho".to_string()),
        room: "3".to_string(),
        role: Role::Staff,
        initial_balance: Some(Money::from_cents(1000)),
    };

    let created = client.create_user(&payload).await.expect("create user");
    assert_eq!(created.map(|user| user.id), Some(UserId::from(99)));
    assert_eq!(
        state.received().await,
        vec![(
            "POST /usuarios".to_string(),
            json!({"nome": "Rui", "sobrenome": "Costa", "nickname": "Ruizinho", "quarto": "3", "tipo_usuario": 2, "saldo": 10.0})
        )]
    );
}

#[tokio::test]
async fn deposit_sends_valor_and_returns_message() {
    let (client, state) = client().await;

    let response = client
        .deposit(&UserId::from(7), Money::from_cents(1050))
        .await
        .expect("deposit");
    assert_eq!(response.message.as_deref(), Some("Depósito realizado"));
    assert_eq!(
        state.received().await,
        vec![("PUT /deposit/7".to_string(), json!({"valor": 10.5}))]
    );
}

#[tokio::test]
async fn rejected_withdrawal_carries_backend_message() {
    let (client, _) = client().await;

    let err = client
        .withdraw(&UserId::from(7), Money::from_cents(500))
        .await
        .expect_err("insufficient balance");
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.server_message(), Some("Saldo insuficiente"));
}

#[tokio::test]
async fn product_reads_and_decode_failures() {
    let (client, _) = client().await;

    let products = client.list_products().await.expect("list products");
    assert_eq!(products[0].quantity, 3);
    assert_eq!(products[0].price, Money::from_cents(450));

    let err = client
        .get_product(&ProductId::from(10))
        .await
        .expect_err("body is not json");
    assert!(matches!(err, ClientError::Decode { .. }), "got {err:?}");
}

#[tokio::test]
async fn mutations_accept_unreadable_success_bodies() {
    let (client, state) = client().await;
    let payload = NewProduct {
        name: "Bala".to_string(),
        quantity: 100,
        kind: "Doce".to_string(),
        price: Money::from_cents(50),
    };

    let created = client.create_product(&payload).await.expect("create product");
    assert!(created.is_none());
    assert_eq!(
        state.received().await,
        vec![(
            "POST /produtos".to_string(),
            json!({"nome": "Bala", "quantidade": 100, "tipo": "Doce", "preco": 0.5})
        )]
    );
}

#[tokio::test]
async fn product_update_never_sends_quantity() {
    let (client, state) = client().await;
    let update = ProductUpdate {
        name: "Chocolate amargo".to_string(),
        kind: "Doce".to_string(),
        price: Money::from_cents(600),
    };

    let updated = client
        .update_product(&ProductId::from(10), &update)
        .await
        .expect("update product")
        .expect("updated product body");
    assert_eq!(updated.name, "Chocolate amargo");
    assert_eq!(updated.quantity, 3);

    let received = state.received().await;
    assert_eq!(received[0].0, "PUT /produtos/10");
    assert!(received[0].1.get("quantidade").is_none());
}

#[tokio::test]
async fn stock_adjustment_patches_delta() {
    let (client, state) = client().await;

    let product = client
        .adjust_stock(&ProductId::from(10), StockAdjustment { delta: 4 })
        .await
        .expect("adjust stock")
        .expect("product body");
    assert_eq!(product.quantity, 7);
    assert_eq!(
        state.received().await,
        vec![("PATCH /produtos/10/adjust".to_string(), json!({"delta": 4}))]
    );
}

#[tokio::test]
async fn ids_are_percent_encoded_into_the_path() {
    let client = CanteenClient::new("http://127.0.0.1:5000/api/").expect("client");
    let url = client
        .endpoint(&["usuarios", "a/b c"])
        .expect("endpoint");
    assert_eq!(url.as_str(), "http://127.0.0.1:5000/api/usuarios/a%2Fb%20c");
    assert_eq!(client.base_url(), "http://127.0.0.1:5000/api");
}

#[tokio::test]
async fn closed_port_is_a_transport_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = CanteenClient::new(&format!("http://{addr}")).expect("client");
    let err = client.list_products().await.expect_err("nothing listening");
    assert!(matches!(err, ClientError::Transport { .. }), "got {err:?}");
}

#[test]
fn rejects_non_http_base_urls() {
    assert!(matches!(
        CanteenClient::new("file:///tmp/canteen"),
        Err(ClientError::InvalidBaseUrl { .. })
    ));
}
