//! Form drafts. Every field is kept as typed text; `to_payload` is the single
//! place where input is validated and turned into a request body.

use shared::{
    domain::{BalanceOperation, Product, Role},
    error::ValidationError,
    money::{Money, MoneyParseError},
    protocol::{BalanceChangeRequest, NewProduct, NewUser, ProductUpdate, StockAdjustment},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub room: String,
    pub role: Role,
    pub initial_balance: String,
}

impl Default for UserDraft {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            nickname: String::new(),
            room: String::new(),
            role: Role::Camper,
            initial_balance: String::new(),
        }
    }
}

impl UserDraft {
    pub fn to_payload(&self) -> Result<NewUser, ValidationError> {
        let initial_balance = match self.initial_balance.trim() {
            "" => None,
            raw => Some(parse_money("initial balance", raw)?),
        };

        Ok(NewUser {
            first_name: required("first name", &self.first_name)?,
            last_name: required("surname", &self.last_name)?,
            nickname: optional(&self.nickname),
            room: required("room", &self.room)?,
            role: self.role,
            initial_balance,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub quantity: String,
    pub kind: String,
    pub price: String,
}

impl ProductDraft {
    pub fn to_payload(&self) -> Result<NewProduct, ValidationError> {
        Ok(NewProduct {
            name: required("name", &self.name)?,
            quantity: parse_quantity("quantity", &self.quantity)?,
            kind: required("type", &self.kind)?,
            price: parse_price(&self.price)?,
        })
    }
}

/// Edits name, type and price. `quantity` is only shown; stock moves through
/// the stock screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductEditDraft {
    pub name: String,
    pub kind: String,
    pub price: String,
    pub quantity: u32,
}

impl ProductEditDraft {
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            kind: product.kind.clone(),
            price: format!("{:.2}", product.price.to_major()),
            quantity: product.quantity,
        }
    }

    pub fn to_payload(&self) -> Result<ProductUpdate, ValidationError> {
        Ok(ProductUpdate {
            name: required("name", &self.name)?,
            kind: required("type", &self.kind)?,
            price: parse_price(&self.price)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceChange {
    pub operation: BalanceOperation,
    pub amount: Money,
}

impl BalanceChange {
    pub fn request(&self) -> BalanceChangeRequest {
        BalanceChangeRequest {
            amount: self.amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceDraft {
    pub operation: BalanceOperation,
    pub amount: String,
}

impl Default for BalanceDraft {
    fn default() -> Self {
        Self {
            operation: BalanceOperation::Deposit,
            amount: String::new(),
        }
    }
}

impl BalanceDraft {
    pub fn to_payload(&self) -> Result<BalanceChange, ValidationError> {
        let amount = parse_money("amount", &self.amount)?;
        if !amount.is_positive() {
            return Err(not_positive("amount", &self.amount));
        }
        Ok(BalanceChange {
            operation: self.operation,
            amount,
        })
    }
}

/// The stock editor only adds units, so the delta must be a positive integer.
pub fn parse_stock_delta(input: &str) -> Result<StockAdjustment, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field: "delta" });
    }
    let delta = trimmed
        .parse::<i32>()
        .map_err(|_| ValidationError::NotANumber {
            field: "delta",
            value: trimmed.to_string(),
        })?;
    if delta <= 0 {
        return Err(ValidationError::NotPositive { field: "delta" });
    }
    Ok(StockAdjustment { delta })
}

fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Required { field })
    } else {
        Ok(trimmed.to_string())
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_money(field: &'static str, value: &str) -> Result<Money, ValidationError> {
    Money::parse_amount(value).map_err(|err| match err {
        MoneyParseError::Empty => ValidationError::Required { field },
        MoneyParseError::Invalid(value) => ValidationError::NotANumber { field, value },
    })
}

/// Free items are allowed; only a negative price is refused.
fn parse_price(value: &str) -> Result<Money, ValidationError> {
    let price = parse_money("price", value)?;
    if price.cents() < 0 {
        Err(ValidationError::Negative { field: "price" })
    } else {
        Ok(price)
    }
}

// Amounts are rounded to cents, so a positive input under half a cent
// lands on zero and gets its own message.
fn not_positive(field: &'static str, raw: &str) -> ValidationError {
    let trimmed = raw.trim();
    match trimmed.replacen(',', ".", 1).parse::<f64>() {
        Ok(value) if value > 0.0 => ValidationError::BelowOneCent {
            field,
            value: trimmed.to_string(),
        },
        _ => ValidationError::NotPositive { field },
    }
}

fn parse_quantity(field: &'static str, value: &str) -> Result<u32, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field });
    }
    trimmed
        .parse::<u32>()
        .map_err(|_| ValidationError::NotAQuantity {
            field,
            value: trimmed.to_string(),
        })
}

#[cfg(test)]
#[path = "tests/forms_tests.rs"]
mod tests;
