use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{error::ValidationError, money::Money};

/// Products at or below this quantity are flagged on the stock screen.
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// Backend ids arrive as either JSON strings or numbers; both are kept as text.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        }
    }
}

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into_string()))
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(ProductId);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCode {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl RawCode {
    fn as_i64(&self) -> Option<i64> {
        match self {
            RawCode::Integer(code) => Some(*code),
            RawCode::Float(code) if code.fract() == 0.0 => Some(*code as i64),
            RawCode::Float(_) => None,
            RawCode::Text(text) => text.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Camper,
    Staff,
    Canteen,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Camper, Role::Staff, Role::Canteen];

    /// Wire value of `tipo_usuario`.
    pub const fn code(self) -> u8 {
        match self {
            Role::Camper => 1,
            Role::Staff => 2,
            Role::Canteen => 3,
        }
    }

    pub const fn from_code(code: i64) -> Option<Role> {
        match code {
            1 => Some(Role::Camper),
            2 => Some(Role::Staff),
            3 => Some(Role::Canteen),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Role::Camper => "Acampante",
            Role::Staff => "Equipe",
            Role::Canteen => "Cantina",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    /// Accepts the display label, the English name or the numeric code.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let lower = trimmed.to_lowercase();
        let role = match lower.as_str() {
            "acampante" | "camper" | "1" => Role::Camper,
            "equipe" | "staff" | "2" => Role::Staff,
            "cantina" | "canteen" | "3" => Role::Canteen,
            _ => return Err(ValidationError::UnknownRole(trimmed.to_string())),
        };
        Ok(role)
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawCode::deserialize(deserializer)?;
        raw.as_i64()
            .and_then(Role::from_code)
            .ok_or_else(|| serde::de::Error::custom("tipo_usuario must be 1, 2 or 3"))
    }
}

/// Unknown or missing role codes read as `None` instead of failing the whole list.
fn lenient_role<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Role>, D::Error> {
    let raw = Option::<RawCode>::deserialize(deserializer)?;
    Ok(raw.and_then(|code| code.as_i64()).and_then(Role::from_code))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceOperation {
    Deposit,
    Withdraw,
}

impl BalanceOperation {
    pub const fn path_segment(self) -> &'static str {
        match self {
            BalanceOperation::Deposit => "deposit",
            BalanceOperation::Withdraw => "withdraw",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            BalanceOperation::Deposit => "Deposit",
            BalanceOperation::Withdraw => "Withdrawal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(rename = "nome")]
    pub first_name: String,
    #[serde(rename = "sobrenome", default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(rename = "quarto", default)]
    pub room: String,
    #[serde(
        rename = "tipo_usuario",
        default,
        deserialize_with = "lenient_role",
        skip_serializing_if = "Option::is_none"
    )]
    pub role: Option<Role>,
    #[serde(rename = "saldo", default)]
    pub balance: Money,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Empty for unknown role codes.
    pub fn role_label(&self) -> &'static str {
        self.role.map(Role::label).unwrap_or("")
    }

    pub fn initial(&self) -> Option<char> {
        self.first_name
            .chars()
            .next()
            .and_then(|c| c.to_uppercase().next())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "quantidade", default)]
    pub quantity: u32,
    #[serde(rename = "tipo", default)]
    pub kind: String,
    #[serde(rename = "preco", default)]
    pub price: Money,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= LOW_STOCK_THRESHOLD
    }

    /// Mirrors a stock adjustment the backend has already confirmed.
    pub fn apply_stock_delta(&mut self, delta: i32) {
        self.quantity = self.quantity.saturating_add_signed(delta);
    }
}
