use std::time::Duration;

use config::ApiConfig;
use errors::ApiError;
use jt_core::SessionHandle;
use reqwest::{Client, Method, Url};
use serde_json::Value;
use tracing::{debug, warn};

use crate::telemetry::Telemetry;

/// Authenticated request pipeline.
///
/// Every call is at-most-once: no retry, no caching. The bearer token is
/// fetched from the session's provider on every call and never stored here.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url).map_err(ApiError::dispatch)?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::dispatch_message(format!(
                "Base URL {} cannot carry a path",
                config.base_url
            )));
        }

        let mut builder = Client::builder();
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let http_client = builder.build().map_err(ApiError::dispatch)?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL extended by `segments`, each percent-encoded as one path
    /// segment.
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send one request and return the decoded body.
    ///
    /// Non-JSON success bodies come back as [`Value::String`]; an empty body
    /// is [`Value::Null`].
    pub async fn send(
        &self,
        session: &SessionHandle,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let result = self.dispatch(session, &method, url, body).await;
        Telemetry::record_result(method.as_str(), &result);
        if let Err(e) = &result {
            warn!(method = %method, kind = %e.kind(), status = ?e.status(), error = %e, "API request failed");
        }
        result
    }

    async fn dispatch(
        &self,
        session: &SessionHandle,
        method: &Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let token = session.bearer_token().await.map_err(ApiError::dispatch)?;
        debug!(
            method = %method,
            path = url.path(),
            authenticated = token.is_some(),
            "Dispatching API request"
        );

        let mut request = self.http_client.request(method.clone(), url);
        if let Some(token) = &token {
            request = request.bearer_auth(token.expose());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(classify_send_error)?;
        let status = response.status();
        let text = response.text().await.map_err(ApiError::no_response)?;

        if !status.is_success() {
            return Err(ApiError::from_response(status.as_u16(), &text));
        }

        debug!(status = status.as_u16(), "API request succeeded");
        Ok(decode_body(text))
    }
}

fn classify_send_error(e: reqwest::Error) -> ApiError {
    if e.is_builder() {
        ApiError::dispatch(e)
    } else {
        ApiError::no_response(e)
    }
}

fn decode_body(text: String) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}
