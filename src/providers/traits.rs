use async_trait::async_trait;
use serde_json::Value;

use super::http::HttpClient;
use super::response::extract_topic;
use super::types::{ChatPrompt, ProviderRequest, Result};
use crate::profiles::ProviderProfile;

/// One AI service dialect
///
/// Adapters only translate: they build the wire request for a profile and
/// pull the topic text back out of the reply. Sending is done by the caller
/// through the shared [`HttpClient`], which building may also use for
/// preliminary steps such as token exchange.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    async fn build_request(
        &self,
        http: &HttpClient,
        profile: &ProviderProfile,
        prompt: &ChatPrompt,
    ) -> Result<ProviderRequest>;

    fn parse_response(&self, body: &Value) -> Result<String> {
        extract_topic(body)
    }
}
