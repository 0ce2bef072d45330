use std::fmt::Write as _;

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use client_core::{
    catalog::{filter_and_sort, ListCriteria, ProductSortKey, UserSortKey},
    forms::{parse_stock_delta, BalanceDraft, ProductDraft, ProductEditDraft, UserDraft},
    CanteenGateway,
};
use serde::Serialize;
use shared::{
    domain::{BalanceOperation, Product, ProductId, Role, User, UserId},
    protocol::MessageResponse,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UserSort {
    Name,
    Balance,
    Role,
    Room,
}

impl From<UserSort> for UserSortKey {
    fn from(value: UserSort) -> Self {
        match value {
            UserSort::Name => UserSortKey::Name,
            UserSort::Balance => UserSortKey::Balance,
            UserSort::Role => UserSortKey::Role,
            UserSort::Room => UserSortKey::Room,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProductSort {
    Name,
    Quantity,
    Kind,
    Price,
}

impl From<ProductSort> for ProductSortKey {
    fn from(value: ProductSort) -> Self {
        match value {
            ProductSort::Name => ProductSortKey::Name,
            ProductSort::Quantity => ProductSortKey::Quantity,
            ProductSort::Kind => ProductSortKey::Kind,
            ProductSort::Price => ProductSortKey::Price,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    Camper,
    Staff,
    Canteen,
}

impl From<RoleArg> for Role {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::Camper => Role::Camper,
            RoleArg::Staff => Role::Staff,
            RoleArg::Canteen => Role::Canteen,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List users, optionally filtered and sorted.
    Users {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, value_enum, default_value = "name")]
        sort: UserSort,
        #[arg(long)]
        desc: bool,
    },
    /// Show one user.
    User { id: String },
    CreateUser {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        surname: String,
        #[arg(long, default_value = "")]
        nickname: String,
        #[arg(long)]
        room: String,
        #[arg(long, value_enum, default_value = "camper")]
        role: RoleArg,
        /// Accepts `10.50` or `10,50`.
        #[arg(long, default_value = "")]
        initial_balance: String,
    },
    Deposit { id: String, amount: String },
    Withdraw { id: String, amount: String },
    /// List products, optionally filtered and sorted.
    Products {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, value_enum, default_value = "name")]
        sort: ProductSort,
        #[arg(long)]
        desc: bool,
    },
    /// Show one product.
    Product { id: String },
    CreateProduct {
        #[arg(long)]
        name: String,
        #[arg(long)]
        quantity: String,
        #[arg(long)]
        kind: String,
        #[arg(long)]
        price: String,
    },
    /// Change name, kind or price. Omitted fields keep their current value.
    EditProduct {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        kind: Option<String>,
        #[arg(long)]
        price: Option<String>,
    },
    /// Add a positive number of units to a product's stock.
    AddStock { id: String, delta: String },
}

/// Runs one command and returns what should be printed.
pub async fn run<G>(gateway: &G, command: Command, json: bool) -> Result<String>
where
    G: CanteenGateway + ?Sized,
{
    match command {
        Command::Users { search, sort, desc } => {
            let users = gateway.list_users().await?;
            let criteria = ListCriteria {
                query: search,
                sort_key: sort.into(),
                ascending: !desc,
            };
            let rows = filter_and_sort(&users, &criteria);
            if json {
                return to_json(&rows);
            }
            Ok(render_users(&rows))
        }
        Command::User { id } => {
            let user = gateway.get_user(&UserId::from(id.as_str())).await?;
            if json {
                return to_json(&user);
            }
            Ok(render_users(&[&user]))
        }
        Command::CreateUser {
            first_name,
            surname,
            nickname,
            room,
            role,
            initial_balance,
        } => {
            let draft = UserDraft {
                first_name,
                last_name: surname,
                nickname,
                room,
                role: role.into(),
                initial_balance,
            };
            let payload = draft.to_payload()?;
            let created = gateway.create_user(&payload).await?;
            match created {
                Some(user) if json => to_json(&user),
                Some(user) => Ok(format!("Created user {} ({})", user.full_name(), user.id)),
                None => Ok(format!(
                    "Created user {} {}",
                    payload.first_name, payload.last_name
                )),
            }
        }
        Command::Deposit { id, amount } => {
            change_balance(gateway, &id, BalanceOperation::Deposit, amount, json).await
        }
        Command::Withdraw { id, amount } => {
            change_balance(gateway, &id, BalanceOperation::Withdraw, amount, json).await
        }
        Command::Products { search, sort, desc } => {
            let products = gateway.list_products().await?;
            let criteria = ListCriteria {
                query: search,
                sort_key: sort.into(),
                ascending: !desc,
            };
            let rows = filter_and_sort(&products, &criteria);
            if json {
                return to_json(&rows);
            }
            Ok(render_products(&rows))
        }
        Command::Product { id } => {
            let product = gateway.get_product(&ProductId::from(id.as_str())).await?;
            if json {
                return to_json(&product);
            }
            Ok(render_products(&[&product]))
        }
        Command::CreateProduct {
            name,
            quantity,
            kind,
            price,
        } => {
            let draft = ProductDraft {
                name,
                quantity,
                kind,
                price,
            };
            let payload = draft.to_payload()?;
            let created = gateway.create_product(&payload).await?;
            match created {
                Some(product) if json => to_json(&product),
                Some(product) => Ok(format!("Created product {} ({})", product.name, product.id)),
                None => Ok(format!("Created product {}", payload.name)),
            }
        }
        Command::EditProduct {
            id,
            name,
            kind,
            price,
        } => {
            let product_id = ProductId::from(id.as_str());
            let current = gateway.get_product(&product_id).await?;
            let mut draft = ProductEditDraft::from_product(&current);
            if let Some(name) = name {
                draft.name = name;
            }
            if let Some(kind) = kind {
                draft.kind = kind;
            }
            if let Some(price) = price {
                draft.price = price;
            }
            let update = draft.to_payload()?;
            let updated = gateway.update_product(&product_id, &update).await?;
            match updated {
                Some(product) if json => to_json(&product),
                _ => Ok(format!("Updated product {product_id}")),
            }
        }
        Command::AddStock { id, delta } => {
            let product_id = ProductId::from(id.as_str());
            let adjustment = parse_stock_delta(&delta)?;
            let adjusted = gateway.adjust_stock(&product_id, adjustment).await?;
            match adjusted {
                Some(product) if json => to_json(&product),
                Some(product) => Ok(format!(
                    "{} now has {} units",
                    product.name, product.quantity
                )),
                None => Ok(format!(
                    "Added {} units to product {product_id}",
                    adjustment.delta
                )),
            }
        }
    }
}

async fn change_balance<G>(
    gateway: &G,
    id: &str,
    operation: BalanceOperation,
    amount: String,
    json: bool,
) -> Result<String>
where
    G: CanteenGateway + ?Sized,
{
    let change = BalanceDraft { operation, amount }.to_payload()?;
    let user_id = UserId::from(id);
    let sent = match operation {
        BalanceOperation::Deposit => gateway.deposit(&user_id, change.amount).await,
        BalanceOperation::Withdraw => gateway.withdraw(&user_id, change.amount).await,
    };
    let response: MessageResponse =
        sent.with_context(|| format!("{} for user {id} failed", operation.label()))?;
    if json {
        return to_json(&response);
    }
    Ok(response.message.unwrap_or_else(|| {
        format!("{} of {} registered", operation.label(), change.amount)
    }))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to encode output")
}

pub fn render_users(users: &[&User]) -> String {
    if users.is_empty() {
        return "No users found.".to_string();
    }
    let mut out = format!(
        "{:<10} {:<28} {:<14} {:<8} {:<10} {:>12}\n",
        "ID", "NAME", "NICKNAME", "ROOM", "ROLE", "BALANCE"
    );
    for user in users {
        let _ = writeln!(
            out,
            "{:<10} {:<28} {:<14} {:<8} {:<10} {:>12}",
            user.id.as_str(),
            user.full_name(),
            user.nickname.as_deref().unwrap_or("-"),
            user.room,
            user.role_label(),
            user.balance.to_string(),
        );
    }
    out.trim_end().to_string()
}

/// Low-stock rows are marked with `!`.
pub fn render_products(products: &[&Product]) -> String {
    if products.is_empty() {
        return "No products found.".to_string();
    }
    let mut out = format!(
        "{:<10} {:<24} {:<14} {:>9} {:>12}\n",
        "ID", "NAME", "KIND", "QUANTITY", "PRICE"
    );
    for product in products {
        let marker = if product.is_low_stock() { "!" } else { "" };
        let _ = writeln!(
            out,
            "{:<10} {:<24} {:<14} {:>9} {:>12}",
            product.id.as_str(),
            product.name,
            product.kind,
            format!("{marker}{}", product.quantity),
            product.price.to_string(),
        );
    }
    out.trim_end().to_string()
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
