//! Request and response bodies exchanged with the canteen backend.

use serde::{Deserialize, Serialize};

use crate::{domain::Role, money::Money};

/// `POST /usuarios`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    #[serde(rename = "nome")]
    pub first_name: String,
    #[serde(rename = "sobrenome")]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(rename = "quarto")]
    pub room: String,
    #[serde(rename = "tipo_usuario")]
    pub role: Role,
    #[serde(rename = "saldo", default, skip_serializing_if = "Option::is_none")]
    pub initial_balance: Option<Money>,
}

/// `PUT /deposit/{id}` and `PUT /withdraw/{id}`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceChangeRequest {
    #[serde(rename = "valor")]
    pub amount: Money,
}

/// Success body of deposit/withdraw, and the error body of most failures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default, alias = "error", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// `POST /produtos`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "quantidade")]
    pub quantity: u32,
    #[serde(rename = "tipo")]
    pub kind: String,
    #[serde(rename = "preco")]
    pub price: Money,
}

/// `PUT /produtos/{id}`. Quantity is deliberately absent: it only moves
/// through [`StockAdjustment`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "tipo")]
    pub kind: String,
    #[serde(rename = "preco")]
    pub price: Money,
}

/// `PATCH /produtos/{id}/adjust`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub delta: i32,
}
