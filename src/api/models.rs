use serde::{Deserialize, Serialize};

use crate::config::NamingConfig;
use crate::observability::MetricsSnapshot;
use crate::orchestrator::{DownloadEvent, PageContext};
use crate::profiles::ProviderProfile;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub history_count: usize,
    pub metrics: MetricsSnapshot,
}

/// Body of `POST /downloads/name`
#[derive(Debug, Clone, Deserialize)]
pub struct NameRequest {
    pub download: DownloadEvent,
    #[serde(default)]
    pub page: Option<PageContext>,
}

/// Download lifecycle state as reported by the browser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadState {
    InProgress,
    Complete,
    #[serde(alias = "canceled")]
    Cancelled,
    Interrupted,
}

/// Body of `POST /downloads/changed`. Fields the browser did not report are
/// filled from what was recorded when the download was named.
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadChange {
    pub id: u64,
    #[serde(default)]
    pub state: Option<DownloadState>,
    /// Browser interrupt reason, e.g. `NETWORK_FAILED`
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub new_name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChangeResponse {
    pub recorded: bool,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ClearedResponse {
    pub cleared: usize,
}

/// Provider profile as returned to clients; keys are never echoed back
#[derive(Debug, Clone, Serialize)]
pub struct ProviderView {
    pub id: String,
    pub display_name: String,
    pub endpoint: String,
    pub model: Option<String>,
    pub is_default: bool,
    pub is_active: bool,
    pub has_api_key: bool,
    pub has_secondary_key: bool,
}

impl ProviderView {
    pub fn new(profile: &ProviderProfile, active_id: &str) -> Self {
        Self {
            id: profile.id.clone(),
            display_name: profile.display_name.clone(),
            endpoint: profile.endpoint.clone(),
            model: profile.model.clone(),
            is_default: profile.is_default,
            is_active: profile.id == active_id,
            has_api_key: !profile.api_key.trim().is_empty(),
            has_secondary_key: profile
                .secondary_key
                .as_deref()
                .is_some_and(|k| !k.trim().is_empty()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProbeResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub naming: NamingConfig,
    pub providers: Vec<ProviderView>,
}
