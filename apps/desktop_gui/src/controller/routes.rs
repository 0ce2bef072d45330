//! Screen addresses. Paths mirror the console's navigation surface.

use std::fmt;

use shared::domain::{ProductId, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Users,
    Products,
    CreateUser,
    CreateProduct,
    Deposit(UserId),
    EditProduct(ProductId),
    Stock,
}

impl Route {
    /// Entries shown in the sidebar.
    pub const NAVIGATION: [(Route, &'static str); 5] = [
        (Route::Users, "Users"),
        (Route::Products, "Products"),
        (Route::Stock, "Stock"),
        (Route::CreateUser, "New user"),
        (Route::CreateProduct, "New product"),
    ];

    /// `/` and the empty path redirect to the user list. Unknown paths yield
    /// `None`.
    pub fn parse(path: &str) -> Option<Route> {
        let trimmed = path.trim().trim_end_matches('/');
        let segments: Vec<&str> = trimmed
            .trim_start_matches('/')
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        let route = match segments.as_slice() {
            [] | ["users"] => Route::Users,
            ["products"] => Route::Products,
            ["stock"] => Route::Stock,
            ["create", "users"] => Route::CreateUser,
            ["create", "products"] => Route::CreateProduct,
            ["deposit", id] => Route::Deposit(UserId::from(*id)),
            ["edit", "product", id] => Route::EditProduct(ProductId::from(*id)),
            _ => return None,
        };
        Some(route)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Users => "/users".to_string(),
            Route::Products => "/products".to_string(),
            Route::CreateUser => "/create/users".to_string(),
            Route::CreateProduct => "/create/products".to_string(),
            Route::Deposit(id) => format!("/deposit/{id}"),
            Route::EditProduct(id) => format!("/edit/product/{id}"),
            Route::Stock => "/stock".to_string(),
        }
    }

    /// The list a form returns to.
    pub fn parent(&self) -> Route {
        match self {
            Route::CreateUser | Route::Deposit(_) => Route::Users,
            Route::CreateProduct | Route::EditProduct(_) => Route::Products,
            other => other.clone(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
