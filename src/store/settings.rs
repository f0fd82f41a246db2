use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::LocalStore;
use super::error::{Result, StoreError};
use super::keys::{SETTINGS_NAMING, SETTINGS_PROFILES, encode_settings_key};
use crate::config::{NamingConfig, validate_naming};
use crate::profiles::{ProfileSet, ProviderProfile};

impl LocalStore {
    pub fn save_profiles(&self, profiles: &ProfileSet) -> Result<()> {
        self.put_setting(SETTINGS_PROFILES, profiles)
    }

    /// `None` until profiles have been saved once
    pub fn load_profiles(&self) -> Result<Option<ProfileSet>> {
        let Some(profiles) = self.get_setting::<Vec<ProviderProfile>>(SETTINGS_PROFILES)? else {
            return Ok(None);
        };

        ProfileSet::new(profiles)
            .map(Some)
            .map_err(|e| StoreError::InvalidSettings(e.to_string()))
    }

    pub fn save_naming(&self, naming: &NamingConfig) -> Result<()> {
        self.put_setting(SETTINGS_NAMING, naming)
    }

    pub fn load_naming(&self) -> Result<Option<NamingConfig>> {
        let Some(naming) = self.get_setting::<NamingConfig>(SETTINGS_NAMING)? else {
            return Ok(None);
        };

        validate_naming(&naming).map_err(|e| StoreError::InvalidSettings(e.to_string()))?;
        Ok(Some(naming))
    }

    fn put_setting<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        self.settings
            .insert(encode_settings_key(name), serde_json::to_vec(value)?)?;
        debug!(setting = name, "Saved setting");
        Ok(())
    }

    fn get_setting<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        match self.settings.get(encode_settings_key(name))? {
            Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
            None => Ok(None),
        }
    }
}
