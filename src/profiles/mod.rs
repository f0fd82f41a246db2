//! AI provider profiles and the collection that owns them
//!
//! A [`ProfileSet`] always holds exactly one default profile. Every mutation
//! goes through its methods so that invariant cannot be broken from outside.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Profile shipped with a fresh install; custom OpenAI-compatible endpoint
pub const CUSTOM_DEFAULT_ID: &str = "custom-default";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("Provider profile '{id}' not found")]
    NotFound { id: String },

    #[error("Provider profile '{id}' already exists")]
    DuplicateId { id: String },

    #[error("Cannot delete the default provider profile '{id}'")]
    CannotRemoveDefault { id: String },

    #[error("Cannot delete provider profile '{id}' while it is active for naming")]
    CannotRemoveActive { id: String },

    #[error("Exactly one default provider profile is required, found {count}")]
    DefaultCount { count: usize },
}

pub type Result<T> = std::result::Result<T, ProfileError>;

/// Connection settings for one AI service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderProfile {
    /// Empty on creation requests; [`ProfileSet::add`] assigns one
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    /// Client secret for token-exchange providers
    #[serde(default)]
    pub secondary_key: Option<String>,
    /// Overrides the adapter's model; `None` uses the adapter default
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

impl ProviderProfile {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            endpoint: String::new(),
            api_key: String::new(),
            secondary_key: None,
            model: None,
            is_default: false,
        }
    }

    pub fn custom_default() -> Self {
        Self {
            endpoint: "https://api.example.com/v1/chat/completions".to_string(),
            model: Some("gpt-3.5-turbo".to_string()),
            is_default: true,
            ..Self::new(CUSTOM_DEFAULT_ID, "Custom API")
        }
    }

    /// Endpoint and API key are both set
    pub fn has_credentials(&self) -> bool {
        !self.endpoint.trim().is_empty() && !self.api_key.trim().is_empty()
    }
}

/// Partial edit; `None` leaves a field unchanged. For the optional fields an
/// empty string clears the value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub secondary_key: Option<String>,
    pub model: Option<String>,
}

impl ProfileUpdate {
    fn apply(self, profile: &mut ProviderProfile) {
        if let Some(display_name) = self.display_name {
            profile.display_name = display_name;
        }
        if let Some(endpoint) = self.endpoint {
            profile.endpoint = endpoint;
        }
        if let Some(api_key) = self.api_key {
            profile.api_key = api_key;
        }
        if let Some(secondary_key) = self.secondary_key {
            profile.secondary_key = non_empty(secondary_key);
        }
        if let Some(model) = self.model {
            profile.model = non_empty(model);
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() { None } else { Some(value) }
}

/// Ordered profile collection with a single default
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProfileSet {
    profiles: Vec<ProviderProfile>,
}

impl ProfileSet {
    /// Rejects duplicate ids and anything but exactly one default
    pub fn new(profiles: Vec<ProviderProfile>) -> Result<Self> {
        for (i, profile) in profiles.iter().enumerate() {
            if profiles[..i].iter().any(|p| p.id == profile.id) {
                return Err(ProfileError::DuplicateId {
                    id: profile.id.clone(),
                });
            }
        }

        let count = profiles.iter().filter(|p| p.is_default).count();
        if count != 1 {
            return Err(ProfileError::DefaultCount { count });
        }

        Ok(Self { profiles })
    }

    pub fn with_defaults() -> Self {
        Self {
            profiles: vec![ProviderProfile::custom_default()],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProviderProfile> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ProviderProfile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    pub fn default_profile(&self) -> Option<&ProviderProfile> {
        self.profiles.iter().find(|p| p.is_default)
    }

    /// Appends a non-default profile. An empty id is replaced by a generated
    /// `custom-<uuid>` id.
    pub fn add(&mut self, mut profile: ProviderProfile) -> Result<&ProviderProfile> {
        if profile.id.trim().is_empty() {
            profile.id = format!("custom-{}", Uuid::now_v7());
        }

        if self.get(&profile.id).is_some() {
            return Err(ProfileError::DuplicateId { id: profile.id });
        }

        profile.is_default = false;
        self.profiles.push(profile);

        let index = self.profiles.len() - 1;
        Ok(&self.profiles[index])
    }

    pub fn update(&mut self, id: &str, update: ProfileUpdate) -> Result<&ProviderProfile> {
        let profile = self
            .profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ProfileError::NotFound { id: id.to_string() })?;

        update.apply(profile);
        Ok(&*profile)
    }

    /// Removes a profile unless it is the default or `active_id`
    pub fn remove(&mut self, id: &str, active_id: &str) -> Result<ProviderProfile> {
        let index = self
            .profiles
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| ProfileError::NotFound { id: id.to_string() })?;

        if self.profiles[index].is_default {
            return Err(ProfileError::CannotRemoveDefault { id: id.to_string() });
        }
        if id == active_id {
            return Err(ProfileError::CannotRemoveActive { id: id.to_string() });
        }

        Ok(self.profiles.remove(index))
    }

    pub fn set_default(&mut self, id: &str) -> Result<()> {
        if self.get(id).is_none() {
            return Err(ProfileError::NotFound { id: id.to_string() });
        }

        for profile in &mut self.profiles {
            profile.is_default = profile.id == id;
        }
        Ok(())
    }

    pub fn into_vec(self) -> Vec<ProviderProfile> {
        self.profiles
    }
}

impl Default for ProfileSet {
    fn default() -> Self {
        Self::with_defaults()
    }
}
