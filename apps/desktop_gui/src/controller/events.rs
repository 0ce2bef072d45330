//! UI/backend events and error modeling for desktop GUI controller.

use client_core::{BalanceChange, ClientError};
use shared::domain::{Product, ProductId, User};

use crate::backend_bridge::commands::ViewTicket;

#[derive(Debug, Clone, PartialEq)]
pub enum Loaded {
    Users(Vec<User>),
    User(User),
    Products(Vec<Product>),
    Product(Product),
}

/// What the backend confirmed. Carries just enough to update the held copy
/// without a re-fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    UserCreated,
    BalanceChanged {
        change: BalanceChange,
        message: Option<String>,
    },
    ProductCreated,
    ProductUpdated,
    StockAdjusted {
        product_id: ProductId,
        delta: i32,
    },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    Info(String),
    Loaded {
        ticket: ViewTicket,
        result: Result<Loaded, ClientError>,
    },
    MutationFinished {
        ticket: ViewTicket,
        result: Result<MutationOutcome, ClientError>,
    },
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Http,
    Decode,
    Validation,
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Load,
    Submit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn new(
        category: UiErrorCategory,
        context: UiErrorContext,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            context,
            message: message.into(),
        }
    }

    pub fn from_client(context: UiErrorContext, err: &ClientError) -> Self {
        let category = match err {
            ClientError::Transport { .. } => UiErrorCategory::Transport,
            ClientError::Status { .. } => UiErrorCategory::Http,
            ClientError::Decode { .. } => UiErrorCategory::Decode,
            ClientError::Validation(_) => UiErrorCategory::Validation,
            ClientError::InvalidBaseUrl { .. } => UiErrorCategory::Config,
        };
        Self::new(category, context, err.to_string())
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Short prefix for the status bar.
    pub fn label(&self) -> &'static str {
        match self.category {
            UiErrorCategory::Transport => "Backend unreachable",
            UiErrorCategory::Http => "Request rejected",
            UiErrorCategory::Decode => "Unexpected response",
            UiErrorCategory::Validation => "Invalid input",
            UiErrorCategory::Config => "Configuration error",
        }
    }
}
