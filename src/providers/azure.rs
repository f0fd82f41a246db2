use async_trait::async_trait;
use serde_json::json;

use super::http::HttpClient;
use super::openai::TEMPERATURE;
use super::traits::ProviderAdapter;
use super::types::{ChatPrompt, ProviderRequest, Result};
use crate::profiles::ProviderProfile;

/// Azure OpenAI deployment: `api-key` header, model fixed by the deployment URL
#[derive(Debug, Clone, Default)]
pub struct AzureAdapter;

#[async_trait]
impl ProviderAdapter for AzureAdapter {
    fn name(&self) -> &'static str {
        "azure"
    }

    async fn build_request(
        &self,
        _http: &HttpClient,
        profile: &ProviderProfile,
        prompt: &ChatPrompt,
    ) -> Result<ProviderRequest> {
        let body = json!({
            "messages": prompt.messages(),
            "max_tokens": prompt.max_tokens,
            "temperature": TEMPERATURE,
        });

        Ok(ProviderRequest::new(&profile.endpoint, body).header("api-key", &profile.api_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;

    #[tokio::test]
    async fn test_azure_uses_api_key_header_and_no_model() {
        let http = HttpClient::new(&HttpConfig::default()).unwrap();
        let profile = ProviderProfile {
            endpoint: "https://res.openai.azure.com/openai/deployments/d/chat/completions"
                .to_string(),
            api_key: "azure-key".to_string(),
            model: Some("ignored".to_string()),
            ..ProviderProfile::new("azure", "Azure")
        };

        let request = AzureAdapter
            .build_request(&http, &profile, &ChatPrompt::new("s", "u"))
            .await
            .unwrap();

        assert_eq!(request.header_value("api-key"), Some("azure-key"));
        assert_eq!(request.header_value("authorization"), None);
        assert!(request.body.get("model").is_none());
        assert_eq!(request.body["max_tokens"], 30);
    }
}
