//! # HTTP Backend
//!
//! [`OrderBackend`] over the REST API with `reqwest`.
//!
//! The backend is not strict about how it says "no active order": it may answer
//! `204`, `404`, an empty body, `null`, `{}` or an object whose `order_id` is null.
//! All of these decode to `None`.

use crate::clients::backend::{ApiError, OrderBackend};
use crate::config::BackendConfig;
use crate::model::{AuthToken, Order, OrderId};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, trace};

/// REST client for the order endpoints.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, ApiError> {
        let user_agent = config.user_agent.clone().unwrap_or_else(|| {
            format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
        });
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| ApiError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn body(resp: Response) -> Result<String, ApiError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }
        resp.text().await.map_err(|e| ApiError::Http(e.to_string()))
    }
}

#[async_trait]
impl OrderBackend for HttpBackend {
    #[instrument(skip(self, token))]
    async fn current_order(&self, token: &AuthToken) -> Result<Option<Order>, ApiError> {
        let resp = self
            .client
            .get(self.url("/orders/current"))
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|e| ApiError::Http(e.to_string()))?;

        if matches!(resp.status(), StatusCode::NO_CONTENT | StatusCode::NOT_FOUND) {
            debug!(status = %resp.status(), "No active order");
            return Ok(None);
        }
        let body = Self::body(resp).await?;
        trace!(%body, "current order");
        decode_current_order(&body)
    }

    #[instrument(skip(self, token))]
    async fn complete_order(&self, token: &AuthToken, order_id: &OrderId) -> Result<(), ApiError> {
        let resp = self
            .client
            .patch(self.url(&format!("/orders/{}/complete", order_id)))
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|e| ApiError::Http(e.to_string()))?;

        // The body is either the updated order or a bare ack; only the status matters.
        let body = Self::body(resp).await?;
        trace!(%body, "complete ack");
        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn order_history(&self, token: &AuthToken) -> Result<Vec<Order>, ApiError> {
        let resp = self
            .client
            .get(self.url("/orders/history"))
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|e| ApiError::Http(e.to_string()))?;

        let body = Self::body(resp).await?;
        trace!(len = body.len(), "order history");
        decode_history(&body)
    }
}

/// Decodes the body of `GET /orders/current`.
pub fn decode_current_order(body: &str) -> Result<Option<Order>, ApiError> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    match value {
        Value::Null => Ok(None),
        Value::Object(ref fields) if fields.get("order_id").map_or(true, Value::is_null) => Ok(None),
        value => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| ApiError::Decode(e.to_string())),
    }
}

/// Decodes the body of `GET /orders/history`: a bare array or `{"orders": [...]}`.
pub fn decode_history(body: &str) -> Result<Vec<Order>, ApiError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum History {
        List(Vec<Order>),
        Wrapped { orders: Vec<Order> },
    }

    let body = body.trim();
    if body.is_empty() {
        return Ok(Vec::new());
    }

    match serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))? {
        History::List(orders) | History::Wrapped { orders } => Ok(orders),
    }
}
