//! In-memory gateway shared by the controller and worker tests.

use std::sync::Mutex;

use async_trait::async_trait;
use client_core::{BalanceChange, CanteenGateway, ClientError, ClientResult};
use shared::{
    domain::{Product, ProductId, Role, User, UserId},
    money::Money,
    protocol::{MessageResponse, NewProduct, NewUser, ProductUpdate, StockAdjustment},
};

pub fn user(id: i64, first: &str, last: &str, role: Role, cents: i64) -> User {
    User {
        id: UserId::from(id),
        first_name: first.to_string(),
        last_name: last.to_string(),
        nickname: None,
        room: id.to_string(),
        role: Some(role),
        balance: Money::from_cents(cents),
    }
}

pub fn product(id: i64, name: &str, kind: &str, quantity: u32, cents: i64) -> Product {
    Product {
        id: ProductId::from(id),
        name: name.to_string(),
        quantity,
        kind: kind.to_string(),
        price: Money::from_cents(cents),
    }
}

pub fn not_found() -> ClientError {
    ClientError::Status {
        status: 404,
        status_text: "Not Found".to_string(),
        message: None,
    }
}

#[derive(Default)]
pub struct FakeGateway {
    pub users: Vec<User>,
    pub products: Vec<Product>,
    pub failure: Option<ClientError>,
    pub balance_message: Option<String>,
    /// Never resolves any call; used to observe cancellation.
    pub stalled: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub fn with_data() -> Self {
        Self {
            users: vec![
                user(1, "Ana", "Lima", Role::Camper, 1500),
                user(2, "Rui", "Costa", Role::Staff, 0),
            ],
            products: vec![
                product(10, "Chocolate", "Doce", 3, 450),
                product(11, "Suco", "Bebida", 20, 600),
            ],
            balance_message: Some("Depósito realizado".to_string()),
            ..Self::default()
        }
    }

    pub fn stalled() -> Self {
        Self {
            stalled: true,
            ..Self::with_data()
        }
    }

    pub fn failing(err: ClientError) -> Self {
        Self {
            failure: Some(err),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    async fn call(&self, name: String) -> ClientResult<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(name);
        }
        if self.stalled {
            std::future::pending::<()>().await;
        }
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CanteenGateway for FakeGateway {
    async fn list_users(&self) -> ClientResult<Vec<User>> {
        self.call("list_users".to_string()).await?;
        Ok(self.users.clone())
    }

    async fn get_user(&self, id: &UserId) -> ClientResult<User> {
        self.call(format!("get_user {id}")).await?;
        self.users
            .iter()
            .find(|user| &user.id == id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn create_user(&self, user: &NewUser) -> ClientResult<Option<User>> {
        self.call(format!("create_user {}", user.first_name)).await?;
        Ok(None)
    }

    async fn change_balance(
        &self,
        id: &UserId,
        change: BalanceChange,
    ) -> ClientResult<MessageResponse> {
        self.call(format!(
            "{} {id} {}",
            change.operation.path_segment(),
            change.amount.cents()
        ))
        .await?;
        Ok(MessageResponse {
            message: self.balance_message.clone(),
        })
    }

    async fn list_products(&self) -> ClientResult<Vec<Product>> {
        self.call("list_products".to_string()).await?;
        Ok(self.products.clone())
    }

    async fn get_product(&self, id: &ProductId) -> ClientResult<Product> {
        self.call(format!("get_product {id}")).await?;
        self.products
            .iter()
            .find(|product| &product.id == id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn create_product(&self, product: &NewProduct) -> ClientResult<Option<Product>> {
        self.call(format!("create_product {}", product.name)).await?;
        Ok(None)
    }

    async fn update_product(
        &self,
        id: &ProductId,
        update: &ProductUpdate,
    ) -> ClientResult<Option<Product>> {
        self.call(format!("update_product {id} {}", update.name))
            .await?;
        Ok(None)
    }

    async fn adjust_stock(
        &self,
        id: &ProductId,
        adjustment: StockAdjustment,
    ) -> ClientResult<Option<Product>> {
        self.call(format!("adjust_stock {id} {}", adjustment.delta))
            .await?;
        Ok(None)
    }
}
