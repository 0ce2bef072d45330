//! Backend commands queued from UI to backend worker.

use client_core::BalanceChange;
use shared::{
    domain::{ProductId, UserId},
    protocol::{NewProduct, NewUser, ProductUpdate, StockAdjustment},
};

/// Identifies one mounted screen. Every navigation mints a new ticket, so
/// results addressed to an older ticket belong to a screen that is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewTicket(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub enum LoadRequest {
    Users,
    User(UserId),
    Products,
    Product(ProductId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    CreateUser(NewUser),
    ChangeBalance {
        user_id: UserId,
        change: BalanceChange,
    },
    CreateProduct(NewProduct),
    UpdateProduct {
        product_id: ProductId,
        update: ProductUpdate,
    },
    AdjustStock {
        product_id: ProductId,
        adjustment: StockAdjustment,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    Load {
        ticket: ViewTicket,
        request: LoadRequest,
    },
    Submit {
        ticket: ViewTicket,
        mutation: Mutation,
    },
    /// Aborts every task still running for `ticket`.
    CancelView { ticket: ViewTicket },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Load { request, .. } => match request {
                LoadRequest::Users => "list_users",
                LoadRequest::User(_) => "get_user",
                LoadRequest::Products => "list_products",
                LoadRequest::Product(_) => "get_product",
            },
            BackendCommand::Submit { mutation, .. } => match mutation {
                Mutation::CreateUser(_) => "create_user",
                Mutation::ChangeBalance { .. } => "change_balance",
                Mutation::CreateProduct(_) => "create_product",
                Mutation::UpdateProduct { .. } => "update_product",
                Mutation::AdjustStock { .. } => "adjust_stock",
            },
            BackendCommand::CancelView { .. } => "cancel_view",
        }
    }
}
