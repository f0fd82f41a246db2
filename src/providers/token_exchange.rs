use async_trait::async_trait;
use serde_json::json;
use tracing::debug;
use url::Url;

use super::http::HttpClient;
use super::openai::TEMPERATURE;
use super::traits::ProviderAdapter;
use super::types::{ChatPrompt, ProviderError, ProviderRequest, Result};
use crate::profiles::ProviderProfile;

pub const BAIDU_TOKEN_URL: &str = "https://aip.baidubce.com/oauth/2.0/token";

/// Two-step provider: exchange client credentials for an access token, then
/// call the chat endpoint with `?access_token=`.
///
/// `api_key` is the client id and `secondary_key` the client secret.
#[derive(Debug, Clone)]
pub struct TokenExchangeAdapter {
    token_url: String,
}

impl TokenExchangeAdapter {
    pub fn new(token_url: impl Into<String>) -> Self {
        Self {
            token_url: token_url.into(),
        }
    }

    pub fn baidu() -> Self {
        Self::new(BAIDU_TOKEN_URL)
    }

    fn token_request_url(&self, client_id: &str, client_secret: &str) -> Result<Url> {
        Url::parse_with_params(
            &self.token_url,
            &[
                ("grant_type", "client_credentials"),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ],
        )
        .map_err(|e| ProviderError::InvalidEndpoint(format!("token url: {e}")))
    }

    async fn fetch_token(&self, http: &HttpClient, profile: &ProviderProfile) -> Result<String> {
        let secret = profile
            .secondary_key
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ProviderError::Credentials(format!(
                    "profile '{}' needs a secret key for token exchange",
                    profile.id
                ))
            })?;

        let url = self.token_request_url(&profile.api_key, secret)?;

        let reply = http.get_json(url.as_str()).await.map_err(|e| match e {
            ProviderError::Http { status, body } if status == 401 || status == 403 => {
                ProviderError::Credentials(format!("token exchange rejected ({status}): {body}"))
            }
            other => other,
        })?;

        let token = reply
            .get("access_token")
            .and_then(|t| t.as_str())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ProviderError::Credentials("token response has no access_token".to_string())
            })?;

        debug!(provider = %profile.id, "Access token obtained");
        Ok(token.to_string())
    }
}

#[async_trait]
impl ProviderAdapter for TokenExchangeAdapter {
    fn name(&self) -> &'static str {
        "token-exchange"
    }

    async fn build_request(
        &self,
        http: &HttpClient,
        profile: &ProviderProfile,
        prompt: &ChatPrompt,
    ) -> Result<ProviderRequest> {
        let token = self.fetch_token(http, profile).await?;

        let mut endpoint = Url::parse(&profile.endpoint)
            .map_err(|e| ProviderError::InvalidEndpoint(format!("{}: {e}", profile.endpoint)))?;
        endpoint.query_pairs_mut().append_pair("access_token", &token);

        let body = json!({
            "messages": prompt.messages(),
            "temperature": TEMPERATURE,
            "top_p": TEMPERATURE,
        });

        Ok(ProviderRequest::new(endpoint.to_string(), body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;

    #[test]
    fn test_token_url_encodes_credentials() {
        let adapter = TokenExchangeAdapter::baidu();
        let url = adapter.token_request_url("id&1", "s e/c").unwrap();

        assert_eq!(
            url.as_str(),
            "https://aip.baidubce.com/oauth/2.0/token?grant_type=client_credentials&client_id=id%261&client_secret=s+e%2Fc"
        );
    }

    #[tokio::test]
    async fn test_missing_secret_is_credentials_error() {
        let http = HttpClient::new(&HttpConfig::default()).unwrap();
        let profile = ProviderProfile {
            endpoint: "https://aip.baidubce.com/rpc/2.0/chat".to_string(),
            api_key: "client-id".to_string(),
            ..ProviderProfile::new("baidu", "ERNIE")
        };

        let result = TokenExchangeAdapter::baidu()
            .build_request(&http, &profile, &ChatPrompt::new("s", "u"))
            .await;
        assert!(matches!(result, Err(ProviderError::Credentials(_))));
    }
}
