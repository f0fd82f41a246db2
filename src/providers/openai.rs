use async_trait::async_trait;
use serde_json::{Value, json};

use super::http::HttpClient;
use super::traits::ProviderAdapter;
use super::types::{ChatPrompt, ProviderRequest, Result};
use crate::profiles::ProviderProfile;

pub(crate) const TEMPERATURE: f64 = 0.1;

/// OpenAI chat-completions dialect with bearer auth.
///
/// Covers OpenAI itself, the OpenAI-compatible vendors and any custom
/// endpoint; variants differ only in their default model and whether
/// `stream: false` is sent explicitly.
#[derive(Debug, Clone)]
pub struct OpenAiCompatible {
    name: &'static str,
    default_model: &'static str,
    explicit_no_stream: bool,
}

impl OpenAiCompatible {
    pub const fn openai() -> Self {
        Self {
            name: "openai",
            default_model: "gpt-3.5-turbo",
            explicit_no_stream: false,
        }
    }

    pub const fn deepseek() -> Self {
        Self {
            name: "deepseek",
            default_model: "deepseek-chat",
            explicit_no_stream: false,
        }
    }

    pub const fn guiji() -> Self {
        Self {
            name: "guiji",
            default_model: "glm-4",
            explicit_no_stream: true,
        }
    }

    /// Fallback for ids without a dedicated adapter
    pub const fn custom() -> Self {
        Self {
            name: "custom",
            default_model: "gpt-3.5-turbo",
            explicit_no_stream: false,
        }
    }

    pub fn default_model(&self) -> &'static str {
        self.default_model
    }

    fn body(&self, profile: &ProviderProfile, prompt: &ChatPrompt) -> Value {
        let model = profile.model.as_deref().unwrap_or(self.default_model);

        let mut body = json!({
            "model": model,
            "messages": prompt.messages(),
            "max_tokens": prompt.max_tokens,
            "temperature": TEMPERATURE,
        });
        if self.explicit_no_stream {
            body["stream"] = Value::Bool(false);
        }
        body
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiCompatible {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn build_request(
        &self,
        _http: &HttpClient,
        profile: &ProviderProfile,
        prompt: &ChatPrompt,
    ) -> Result<ProviderRequest> {
        Ok(
            ProviderRequest::new(&profile.endpoint, self.body(profile, prompt))
                .header("Authorization", format!("Bearer {}", profile.api_key)),
        )
    }
}
