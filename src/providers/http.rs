//! HTTP transport shared by all provider adapters

use reqwest::{Client, Proxy};
use serde_json::Value;
use tracing::debug;

use super::types::{ProviderError, ProviderRequest, Result};
use crate::config::HttpConfig;

/// Error bodies are cut to this many bytes before they reach logs or errors
const MAX_ERROR_BODY: usize = 512;

/// JSON-over-HTTP client for provider endpoints
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new client from the `[http]` config section
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(5));

        if let Some(url) = &config.proxy {
            let proxy = Proxy::all(url)
                .map_err(|e| ProviderError::InvalidEndpoint(format!("invalid proxy: {e}")))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self { client })
    }

    /// POST the request body as JSON and decode a JSON reply
    pub async fn send(&self, request: &ProviderRequest) -> Result<Value> {
        debug!(url = %redact_query(&request.url), "Sending provider request");

        let mut builder = self.client.post(&request.url).json(&request.body);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let response = builder.send().await.map_err(map_transport_error)?;
        decode(response).await
    }

    /// GET a JSON document; used for token exchange
    pub async fn get_json(&self, url: &str) -> Result<Value> {
        debug!(url = %redact_query(url), "Fetching JSON");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_transport_error)?;
        decode(response).await
    }
}

fn map_transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Network("request timed out".to_string())
    } else if e.is_connect() {
        ProviderError::Network(format!("connection failed: {e}"))
    } else {
        ProviderError::Network(e.to_string())
    }
}

async fn decode(response: reqwest::Response) -> Result<Value> {
    let status = response.status();

    if !status.is_success() {
        let mut body = response.text().await.unwrap_or_default();
        truncate_at_char_boundary(&mut body, MAX_ERROR_BODY);
        return Err(ProviderError::Http {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| ProviderError::ResponseFormat(format!("body is not JSON: {e}")))
}

fn truncate_at_char_boundary(text: &mut String, max: usize) {
    if text.len() > max {
        let mut end = max;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
    }
}

/// Query strings may carry secrets (`client_secret`, `access_token`)
fn redact_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}
