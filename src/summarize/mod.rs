//! Topic summarization through the active provider profile

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{HttpConfig, NamingConfig};
use crate::profiles::{ProfileSet, ProviderProfile};
use crate::providers::{AdapterRegistry, ChatPrompt, HttpClient, ProviderError};

/// Number of CJK characters or words kept from a model reply
pub const TOPIC_MAX_UNITS: usize = 8;

const PROBE_PROMPT: &str = "Hello";
const PROBE_MAX_TOKENS: u32 = 5;

#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("provider profile '{profile_id}' has no endpoint or API key")]
    MissingCredentials { profile_id: String },

    #[error("provider profile '{profile_id}' not found")]
    ProfileNotFound { profile_id: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("provider returned HTTP {status}")]
    ProviderHttp { status: u16 },

    #[error("unusable provider response: {0}")]
    ResponseFormat(String),
}

pub type Result<T> = std::result::Result<T, SummarizeError>;

impl SummarizeError {
    fn from_provider(profile_id: &str, err: ProviderError) -> Self {
        match err {
            ProviderError::Network(msg) => Self::Network(msg),
            ProviderError::InvalidEndpoint(msg) => Self::Network(msg),
            ProviderError::Http { status, body } => {
                debug!(provider = profile_id, status, body = %body, "Provider error body");
                Self::ProviderHttp { status }
            }
            ProviderError::ResponseFormat(msg) => Self::ResponseFormat(msg),
            ProviderError::Credentials(msg) => {
                debug!(provider = profile_id, reason = %msg, "Credentials rejected");
                Self::MissingCredentials {
                    profile_id: profile_id.to_string(),
                }
            }
        }
    }
}

/// System message for the model
pub fn system_instruction(force_simple_charset: bool) -> &'static str {
    if force_simple_charset {
        "You are a file naming assistant. Summarize the topic in up to 8 English words. \
         Translate any non-English content to English. Provide only the result without explanation."
    } else {
        "You are a file naming assistant. Summarize the topic in 8 Chinese characters or \
         8 English words. Provide only the result without explanation."
    }
}

/// Clamp a model reply to a short topic.
///
/// Text containing a CJK unified ideograph keeps its first 8 characters,
/// anything else its first 8 whitespace-separated words. `None` when
/// nothing is left.
pub fn normalize_topic(raw: &str) -> Option<String> {
    let raw = raw.trim();

    let topic = if raw.chars().any(is_cjk_ideograph) {
        raw.chars().take(TOPIC_MAX_UNITS).collect::<String>().trim().to_string()
    } else {
        raw.split_whitespace()
            .take(TOPIC_MAX_UNITS)
            .collect::<Vec<_>>()
            .join(" ")
    };

    (!topic.is_empty()).then_some(topic)
}

fn is_cjk_ideograph(c: char) -> bool {
    ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

/// The profile named by `naming.active_provider_id`, if it is usable
pub fn resolve_profile<'a>(
    naming: &NamingConfig,
    profiles: &'a ProfileSet,
) -> Result<&'a ProviderProfile> {
    let profile = profiles
        .get(&naming.active_provider_id)
        .ok_or_else(|| SummarizeError::ProfileNotFound {
            profile_id: naming.active_provider_id.clone(),
        })?;

    if !profile.has_credentials() {
        return Err(SummarizeError::MissingCredentials {
            profile_id: profile.id.clone(),
        });
    }

    Ok(profile)
}

/// Cut `text` to at most `max` bytes without splitting a character
fn truncate_prompt(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Seam between the naming race and the provider layer
#[async_trait]
pub trait TopicSummarizer: Send + Sync {
    /// Summarize `content` with an already-resolved profile; no deadline of its own
    async fn summarize_with_profile(
        &self,
        content: &str,
        profile: &ProviderProfile,
        naming: &NamingConfig,
    ) -> Result<String>;
}

/// Provider-backed summarizer
#[derive(Clone)]
pub struct SummarizationClient {
    http: HttpClient,
    registry: AdapterRegistry,
}

impl SummarizationClient {
    pub fn new(http: HttpClient, registry: AdapterRegistry) -> Self {
        Self { http, registry }
    }

    /// Client with the built-in adapters
    pub fn from_config(config: &HttpConfig) -> std::result::Result<Self, ProviderError> {
        Ok(Self::new(HttpClient::new(config)?, AdapterRegistry::with_defaults()))
    }

    /// Resolve the active profile and summarize
    pub async fn summarize(
        &self,
        content: &str,
        naming: &NamingConfig,
        profiles: &ProfileSet,
    ) -> Result<String> {
        let profile = resolve_profile(naming, profiles)?;
        self.summarize_with_profile(content, profile, naming).await
    }

    /// Minimal round trip to check a profile's connectivity and credentials.
    /// Returns the raw reply text.
    pub async fn probe(&self, profile: &ProviderProfile) -> Result<String> {
        if !profile.has_credentials() {
            return Err(SummarizeError::MissingCredentials {
                profile_id: profile.id.clone(),
            });
        }

        let prompt =
            ChatPrompt::new(system_instruction(false), PROBE_PROMPT).with_max_tokens(PROBE_MAX_TOKENS);
        self.complete(profile, &prompt).await
    }

    async fn complete(&self, profile: &ProviderProfile, prompt: &ChatPrompt) -> Result<String> {
        let adapter = self.registry.resolve(&profile.id);
        let to_error = |e| SummarizeError::from_provider(&profile.id, e);

        let request = adapter
            .build_request(&self.http, profile, prompt)
            .await
            .map_err(to_error)?;
        let body = self.http.send(&request).await.map_err(to_error)?;

        adapter.parse_response(&body).map_err(to_error)
    }
}

#[async_trait]
impl TopicSummarizer for SummarizationClient {
    async fn summarize_with_profile(
        &self,
        content: &str,
        profile: &ProviderProfile,
        naming: &NamingConfig,
    ) -> Result<String> {
        info!(provider = %profile.id, "Requesting topic summary");

        let content = truncate_prompt(content, naming.max_prompt_bytes.as_u64() as usize);
        let prompt = ChatPrompt::new(system_instruction(naming.force_simple_charset), content);

        let raw = self.complete(profile, &prompt).await?;
        debug!(provider = %profile.id, raw = %raw, "Provider replied");

        normalize_topic(&raw)
            .ok_or_else(|| SummarizeError::ResponseFormat("empty topic after normalization".into()))
    }
}
