use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{BalanceOperation, Product, ProductId, User, UserId},
    money::Money,
    protocol::{MessageResponse, NewProduct, NewUser, ProductUpdate, StockAdjustment},
};
use tracing::{debug, warn};
use url::Url;

pub mod catalog;
pub mod config;
pub mod error;
pub mod forms;
pub mod view_state;

pub use config::{load_settings, Settings};
pub use error::ClientError;
pub use forms::BalanceChange;

pub type ClientResult<T> = Result<T, ClientError>;

/// One method per backend endpoint. Each call issues exactly one request and
/// never retries.
///
/// Mutations decode their response best-effort: a 2xx status is the
/// confirmation, the body is returned when it parses.
#[async_trait]
pub trait CanteenGateway: Send + Sync {
    async fn list_users(&self) -> ClientResult<Vec<User>>;
    async fn get_user(&self, id: &UserId) -> ClientResult<User>;
    async fn create_user(&self, user: &NewUser) -> ClientResult<Option<User>>;
    async fn change_balance(
        &self,
        id: &UserId,
        change: BalanceChange,
    ) -> ClientResult<MessageResponse>;

    async fn list_products(&self) -> ClientResult<Vec<Product>>;
    async fn get_product(&self, id: &ProductId) -> ClientResult<Product>;
    async fn create_product(&self, product: &NewProduct) -> ClientResult<Option<Product>>;
    async fn update_product(
        &self,
        id: &ProductId,
        update: &ProductUpdate,
    ) -> ClientResult<Option<Product>>;
    async fn adjust_stock(
        &self,
        id: &ProductId,
        adjustment: StockAdjustment,
    ) -> ClientResult<Option<Product>>;

    async fn deposit(&self, id: &UserId, amount: Money) -> ClientResult<MessageResponse> {
        self.change_balance(
            id,
            BalanceChange {
                operation: BalanceOperation::Deposit,
                amount,
            },
        )
        .await
    }

    async fn withdraw(&self, id: &UserId, amount: Money) -> ClientResult<MessageResponse> {
        self.change_balance(
            id,
            BalanceChange {
                operation: BalanceOperation::Withdraw,
                amount,
            },
        )
        .await
    }
}

#[derive(Debug, Clone)]
pub struct CanteenClient {
    http: Client,
    base_url: Url,
}

impl CanteenClient {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        Self::with_http(Client::new(), base_url)
    }

    pub fn from_settings(settings: &Settings) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(ClientError::from)?;
        Self::with_http(http, &settings.api_base_url)
    }

    fn with_http(http: Client, base_url: &str) -> ClientResult<Self> {
        let normalized = config::normalize_base_url(base_url)?;
        let base_url = Url::parse(&normalized).map_err(|err| ClientError::InvalidBaseUrl {
            url: normalized.clone(),
            reason: err.to_string(),
        })?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Joins `segments` onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> ClientResult<Response> {
        let url = self.endpoint(segments)?;
        debug!(%method, path = url.path(), "sending request");

        let response = match build(self.http.request(method.clone(), url.clone())).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(%method, path = url.path(), "request failed: {err}");
                return Err(ClientError::from(err));
            }
        };

        if response.status().is_success() {
            return Ok(response);
        }
        let err = status_error(response).await;
        warn!(%method, path = url.path(), "backend rejected request: {err}");
        Err(err)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> ClientResult<T> {
        let response = self.send(Method::GET, segments, |req| req).await?;
        response.json::<T>().await.map_err(|err| {
            warn!(path = %segments.join("/"), "could not decode response: {err}");
            ClientError::Decode {
                message: err.to_string(),
            }
        })
    }
}

async fn status_error(response: Response) -> ClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<MessageResponse>(&body)
        .ok()
        .and_then(|parsed| parsed.message)
        .filter(|message| !message.trim().is_empty());
    ClientError::Status {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
        message,
    }
}

/// Mutation bodies vary between backend versions, so an unreadable body is
/// not an error once the status said yes.
async fn decode_best_effort<T: DeserializeOwned>(response: Response) -> Option<T> {
    let body = response.text().await.ok()?;
    match serde_json::from_str(&body) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            debug!("ignoring unreadable mutation response: {err}");
            None
        }
    }
}

#[async_trait]
impl CanteenGateway for CanteenClient {
    async fn list_users(&self) -> ClientResult<Vec<User>> {
        self.get_json(&["usuarios"]).await
    }

    async fn get_user(&self, id: &UserId) -> ClientResult<User> {
        self.get_json(&["usuarios", id.as_str()]).await
    }

    async fn create_user(&self, user: &NewUser) -> ClientResult<Option<User>> {
        let response = self
            .send(Method::POST, &["usuarios"], |req| req.json(user))
            .await?;
        Ok(decode_best_effort(response).await)
    }

    async fn change_balance(
        &self,
        id: &UserId,
        change: BalanceChange,
    ) -> ClientResult<MessageResponse> {
        let body = change.request();
        let response = self
            .send(
                Method::PUT,
                &[change.operation.path_segment(), id.as_str()],
                |req| req.json(&body),
            )
            .await?;
        Ok(decode_best_effort(response).await.unwrap_or_default())
    }

    async fn list_products(&self) -> ClientResult<Vec<Product>> {
        self.get_json(&["produtos"]).await
    }

    async fn get_product(&self, id: &ProductId) -> ClientResult<Product> {
        self.get_json(&["produtos", id.as_str()]).await
    }

    async fn create_product(&self, product: &NewProduct) -> ClientResult<Option<Product>> {
        let response = self
            .send(Method::POST, &["produtos"], |req| req.json(product))
            .await?;
        Ok(decode_best_effort(response).await)
    }

    async fn update_product(
        &self,
        id: &ProductId,
        update: &ProductUpdate,
    ) -> ClientResult<Option<Product>> {
        let response = self
            .send(Method::PUT, &["produtos", id.as_str()], |req| req.json(update))
            .await?;
        Ok(decode_best_effort(response).await)
    }

    async fn adjust_stock(
        &self,
        id: &ProductId,
        adjustment: StockAdjustment,
    ) -> ClientResult<Option<Product>> {
        let response = self
            .send(
                Method::PATCH,
                &["produtos", id.as_str(), "adjust"],
                |req| req.json(&adjustment),
            )
            .await?;
        Ok(decode_best_effort(response).await)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
