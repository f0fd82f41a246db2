use std::collections::BTreeMap;
use std::sync::Arc;

use super::azure::AzureAdapter;
use super::openai::OpenAiCompatible;
use super::token_exchange::TokenExchangeAdapter;
use super::traits::ProviderAdapter;

/// Provider id to adapter table with a fallback for unknown ids
#[derive(Clone)]
pub struct AdapterRegistry {
    adapters: BTreeMap<String, Arc<dyn ProviderAdapter>>,
    fallback: Arc<dyn ProviderAdapter>,
}

impl AdapterRegistry {
    pub fn new(fallback: Arc<dyn ProviderAdapter>) -> Self {
        Self {
            adapters: BTreeMap::new(),
            fallback,
        }
    }

    pub fn register(&mut self, provider_id: impl Into<String>, adapter: Arc<dyn ProviderAdapter>) {
        self.adapters.insert(provider_id.into(), adapter);
    }

    /// Adapter for `provider_id`, or the fallback
    pub fn resolve(&self, provider_id: &str) -> Arc<dyn ProviderAdapter> {
        self.adapters
            .get(provider_id)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.fallback))
    }

    pub fn has_adapter(&self, provider_id: &str) -> bool {
        self.adapters.contains_key(provider_id)
    }

    /// Built-in dialects keyed by their well-known profile ids
    pub fn with_defaults() -> Self {
        let mut registry = Self::new(Arc::new(OpenAiCompatible::custom()));

        registry.register("openai", Arc::new(OpenAiCompatible::openai()));
        registry.register("deepseek", Arc::new(OpenAiCompatible::deepseek()));
        registry.register("guiji", Arc::new(OpenAiCompatible::guiji()));
        registry.register("azure", Arc::new(AzureAdapter));
        registry.register("baidu", Arc::new(TokenExchangeAdapter::baidu()));

        registry
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
