use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, warn};

use super::{
    error::ApiError,
    models::{
        ChangeResponse, ClearedResponse, DownloadChange, DownloadState, HealthResponse,
        HistoryQuery, NameRequest, ProbeResponse, ProviderView, SettingsResponse,
    },
    state::{AppState, PendingName},
};
use crate::config::{NamingConfig, validate_naming};
use crate::orchestrator::DownloadEvent;
use crate::profiles::{ProfileSet, ProfileUpdate, ProviderProfile};
use crate::store::HistoryRecord;

const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Health check endpoint (GET /health)
pub async fn health(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let stats = state.store.stats()?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        history_count: stats.history_count,
        metrics: state.metrics.snapshot(),
    }))
}

/// Batch classification for a newly created download (POST /downloads/created)
pub async fn download_created(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let event: DownloadEvent = serde_json::from_slice(&body)?;
    let classification = state.batches.lock().await.observe(event.id, event.created_at);

    if classification.new_batch {
        state.metrics.batch_started();
    }
    info!(
        download_id = event.id,
        new_batch = classification.new_batch,
        batch_size = classification.batch_size,
        "Download created"
    );

    Ok(Json(classification))
}

/// Filename decision for a download (POST /downloads/name)
///
/// Always answers with a filename. Provider failures and timeouts fall back
/// to the locally rendered name; the `fallback` field says why.
pub async fn download_name(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let request: NameRequest = serde_json::from_slice(&body)?;
    let snapshot = state.snapshot().await;
    let original_name = request.download.suggested_filename.clone();
    let url = request.download.url.clone();
    let id = request.download.id;

    let suggestion = state
        .orchestrator
        .suggest(request.download, request.page, snapshot)
        .await;

    state
        .remember(
            id,
            PendingName {
                original_name,
                new_name: suggestion.filename.clone(),
                url,
                used_ai: suggestion.used_ai,
            },
        )
        .await;

    Ok(Json(suggestion))
}

/// Download state change (POST /downloads/changed)
///
/// A completed download is appended to the history. Cancellation and
/// interruption are logged and drop the pending name.
pub async fn download_changed(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let change: DownloadChange = serde_json::from_slice(&body)?;
    if let Some(error) = change.error.as_deref() {
        warn!(download_id = change.id, error, "Download failed");
    }

    let recorded = match change.state {
        Some(DownloadState::Complete) => {
            let pending = state.forget(change.id).await;
            record_completion(&state, change, pending)?
        }
        Some(DownloadState::Cancelled) => {
            state.forget(change.id).await;
            info!(download_id = change.id, "Download cancelled");
            false
        }
        Some(DownloadState::Interrupted) => {
            state.forget(change.id).await;
            warn!(
                download_id = change.id,
                error = change.error.as_deref().unwrap_or("unknown"),
                "Download interrupted"
            );
            false
        }
        Some(DownloadState::InProgress) | None => false,
    };

    Ok(Json(ChangeResponse { recorded }))
}

fn record_completion(
    state: &AppState,
    change: DownloadChange,
    pending: Option<PendingName>,
) -> Result<bool, ApiError> {
    let (original_name, new_name, url, used_ai) = match pending {
        Some(p) => (
            change.original_name.unwrap_or(p.original_name),
            change.new_name.unwrap_or(p.new_name),
            change.url.unwrap_or(p.url),
            p.used_ai,
        ),
        None => {
            let Some(new_name) = change.new_name else {
                warn!(download_id = change.id, "Completed download was never named, skipping history");
                return Ok(false);
            };
            (
                change.original_name.unwrap_or_else(|| new_name.clone()),
                new_name,
                change.url.unwrap_or_default(),
                false,
            )
        }
    };

    let record = HistoryRecord::builder()
        .id(change.id)
        .original_name(original_name)
        .new_name(new_name)
        .url(url)
        .file_size(change.file_size.unwrap_or_default())
        .mime_type(change.mime_type.unwrap_or_default())
        .used_ai(used_ai)
        .build();

    let removed = state
        .store
        .append_history(&record, state.config.history.max_entries)?;
    state.store.persist()?;
    info!(
        download_id = record.id,
        new_name = %record.new_name,
        removed,
        "Recorded download in history"
    );

    Ok(true)
}

/// Recent downloads, newest first (GET /history)
pub async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    Ok(Json(state.store.list_history(limit)?))
}

/// DELETE /history
pub async fn clear_history(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let cleared = state.store.clear_history()?;
    state.store.persist()?;
    info!(cleared, "History cleared");
    Ok(Json(ClearedResponse { cleared }))
}

/// GET /providers
pub async fn list_providers(State(state): State<AppState>) -> impl IntoResponse {
    let settings = state.settings.read().await;
    Json(provider_views(&settings.profiles, &settings.naming.active_provider_id))
}

/// POST /providers
pub async fn add_provider(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let profile: ProviderProfile = serde_json::from_slice(&body)?;
    let mut settings = state.settings.write().await;

    let mut profiles = settings.profiles.clone();
    let view = ProviderView::new(profiles.add(profile)?, &settings.naming.active_provider_id);
    save_profiles(&state, &profiles)?;
    settings.profiles = profiles;

    info!(provider = %view.id, "Provider profile added");
    Ok((StatusCode::CREATED, Json(view)))
}

/// PUT /providers/{id}
///
/// Edits the profile in place, including the built-in default.
pub async fn update_provider(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let update: ProfileUpdate = serde_json::from_slice(&body)?;
    let mut settings = state.settings.write().await;

    let mut profiles = settings.profiles.clone();
    let view = ProviderView::new(
        profiles.update(&id, update)?,
        &settings.naming.active_provider_id,
    );
    save_profiles(&state, &profiles)?;
    settings.profiles = profiles;

    info!(provider = %id, "Provider profile updated");
    Ok(Json(view))
}

/// DELETE /providers/{id}
pub async fn delete_provider(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let mut settings = state.settings.write().await;

    let mut profiles = settings.profiles.clone();
    profiles.remove(&id, &settings.naming.active_provider_id)?;
    save_profiles(&state, &profiles)?;
    settings.profiles = profiles;

    info!(provider = %id, "Provider profile deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Make a profile the default and the active one for naming
/// (POST /providers/{id}/default)
pub async fn set_default_provider(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let mut settings = state.settings.write().await;

    let mut profiles = settings.profiles.clone();
    profiles.set_default(&id)?;
    let naming = NamingConfig {
        active_provider_id: id.clone(),
        ..settings.naming.clone()
    };

    save_profiles(&state, &profiles)?;
    state.store.save_naming(&naming)?;
    state.store.persist()?;
    settings.profiles = profiles;
    settings.naming = naming;

    info!(provider = %id, "Default provider changed");
    Ok(Json(provider_views(&settings.profiles, &settings.naming.active_provider_id)))
}

/// Connectivity check for one profile (POST /providers/{id}/test)
///
/// Provider failures are reported in the body, not as an error status.
pub async fn test_provider(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = {
        let settings = state.settings.read().await;
        settings
            .profiles
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("provider profile '{id}'")))?
    };

    let response = match state.summarizer.probe(&profile).await {
        Ok(reply) => {
            info!(provider = %id, "Provider probe succeeded");
            ProbeResponse {
                ok: true,
                reply: Some(reply),
                error: None,
            }
        }
        Err(e) => {
            warn!(provider = %id, error = %e, "Provider probe failed");
            ProbeResponse {
                ok: false,
                reply: None,
                error: Some(e.to_string()),
            }
        }
    };

    Ok(Json(response))
}

/// GET /settings
pub async fn get_settings(State(state): State<AppState>) -> impl IntoResponse {
    let settings = state.settings.read().await;
    Json(SettingsResponse {
        naming: settings.naming.clone(),
        providers: provider_views(&settings.profiles, &settings.naming.active_provider_id),
    })
}

/// Replace the naming settings (PUT /settings)
pub async fn put_settings(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let naming: NamingConfig = serde_json::from_slice(&body)?;
    validate_naming(&naming)?;

    let mut settings = state.settings.write().await;
    if settings.profiles.get(&naming.active_provider_id).is_none() {
        return Err(ApiError::InvalidPayload(format!(
            "active provider '{}' does not exist",
            naming.active_provider_id
        )));
    }

    state.store.save_naming(&naming)?;
    state.store.persist()?;
    settings.naming = naming;

    info!(
        ai_enabled = settings.naming.ai_enabled,
        provider = %settings.naming.active_provider_id,
        "Naming settings replaced"
    );
    Ok(Json(SettingsResponse {
        naming: settings.naming.clone(),
        providers: provider_views(&settings.profiles, &settings.naming.active_provider_id),
    }))
}

fn provider_views(profiles: &ProfileSet, active_id: &str) -> Vec<ProviderView> {
    profiles
        .iter()
        .map(|p| ProviderView::new(p, active_id))
        .collect()
}

fn save_profiles(state: &AppState, profiles: &ProfileSet) -> Result<(), ApiError> {
    state.store.save_profiles(profiles)?;
    state.store.persist()?;
    Ok(())
}
