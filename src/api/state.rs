use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::info;

use crate::batch::BatchGrouper;
use crate::config::{Config, apply_secret_overrides};
use crate::observability::Metrics;
use crate::orchestrator::{NamingOrchestrator, NamingSnapshot};
use crate::profiles::ProfileSet;
use crate::store::{LocalStore, Result as StoreResult, StoreError};
use crate::summarize::SummarizationClient;

/// Upper bound on downloads named but not yet finished
const MAX_PENDING: usize = 1024;

/// Name decided for a download that has not finished yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingName {
    pub original_name: String,
    pub new_name: String,
    pub url: String,
    pub used_ai: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub settings: Arc<RwLock<NamingSnapshot>>,
    pub batches: Arc<Mutex<BatchGrouper>>,
    pub pending: Arc<Mutex<HashMap<u64, PendingName>>>,
    pub store: Arc<LocalStore>,
    pub orchestrator: NamingOrchestrator,
    pub summarizer: Arc<SummarizationClient>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(
        config: Config,
        snapshot: NamingSnapshot,
        store: LocalStore,
        summarizer: SummarizationClient,
    ) -> Self {
        let metrics = Arc::new(Metrics::new());
        let summarizer = Arc::new(summarizer);
        let orchestrator = NamingOrchestrator::new(summarizer.clone(), metrics.clone());

        Self {
            config: Arc::new(config),
            settings: Arc::new(RwLock::new(snapshot)),
            batches: Arc::new(Mutex::new(BatchGrouper::new())),
            pending: Arc::new(Mutex::new(HashMap::new())),
            store: Arc::new(store),
            orchestrator,
            summarizer,
            metrics,
        }
    }

    /// Copy of the settings for one naming decision
    pub async fn snapshot(&self) -> NamingSnapshot {
        self.settings.read().await.clone()
    }

    pub async fn remember(&self, id: u64, name: PendingName) {
        let mut pending = self.pending.lock().await;
        if pending.len() >= MAX_PENDING && !pending.contains_key(&id) {
            // Ids grow monotonically within a browser session
            if let Some(oldest) = pending.keys().min().copied() {
                pending.remove(&oldest);
            }
        }
        pending.insert(id, name);
    }

    pub async fn forget(&self, id: u64) -> Option<PendingName> {
        self.pending.lock().await.remove(&id)
    }
}

/// Settings saved through the service win over the configuration file
pub fn load_snapshot(config: &Config, store: &LocalStore) -> StoreResult<NamingSnapshot> {
    let naming = match store.load_naming()? {
        Some(naming) => {
            info!("Using naming settings saved in the store");
            naming
        }
        None => config.naming.clone(),
    };

    let mut profiles = match store.load_profiles()? {
        Some(profiles) => {
            info!(count = profiles.len(), "Using provider profiles saved in the store");
            profiles.into_vec()
        }
        None => config.providers.clone(),
    };
    // Credentials from the environment win over stored ones
    apply_secret_overrides(&mut profiles);
    let profiles =
        ProfileSet::new(profiles).map_err(|e| StoreError::InvalidSettings(e.to_string()))?;

    Ok(NamingSnapshot { naming, profiles })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NamingConfig;
    use crate::profiles::ProviderProfile;
    use tempfile::TempDir;

    fn state(dir: &TempDir) -> AppState {
        let config = Config::default();
        let store = LocalStore::open(dir.path().join("store")).unwrap();
        let snapshot = load_snapshot(&config, &store).unwrap();
        let summarizer = SummarizationClient::from_config(&config.http).unwrap();
        AppState::new(config, snapshot, store, summarizer)
    }

    fn pending(name: &str) -> PendingName {
        PendingName {
            original_name: "a.pdf".to_string(),
            new_name: name.to_string(),
            url: "https://example.com/a.pdf".to_string(),
            used_ai: false,
        }
    }

    #[test]
    fn test_load_snapshot_prefers_store() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::open(dir.path().join("store")).unwrap();
        let config = Config::default();

        assert_eq!(
            load_snapshot(&config, &store).unwrap(),
            NamingSnapshot::default()
        );

        let naming = NamingConfig {
            ai_enabled: true,
            ..NamingConfig::default()
        };
        let mut profiles = ProfileSet::with_defaults();
        profiles.add(ProviderProfile::new("openai", "OpenAI")).unwrap();
        store.save_naming(&naming).unwrap();
        store.save_profiles(&profiles).unwrap();

        let snapshot = load_snapshot(&config, &store).unwrap();
        assert!(snapshot.naming.ai_enabled);
        assert_eq!(snapshot.profiles.len(), 2);
    }

    #[tokio::test]
    async fn test_remember_and_forget() {
        let dir = TempDir::new().unwrap();
        let state = state(&dir);

        state.remember(7, pending("Report.pdf")).await;
        assert_eq!(state.forget(7).await, Some(pending("Report.pdf")));
        assert_eq!(state.forget(7).await, None);
    }

    #[tokio::test]
    async fn test_pending_is_bounded() {
        let dir = TempDir::new().unwrap();
        let state = state(&dir);

        for id in 0..(MAX_PENDING as u64 + 5) {
            state.remember(id, pending("x.pdf")).await;
        }

        let pending = state.pending.lock().await;
        assert_eq!(pending.len(), MAX_PENDING);
        assert!(!pending.contains_key(&0));
        assert!(pending.contains_key(&(MAX_PENDING as u64 + 4)));
    }
}
