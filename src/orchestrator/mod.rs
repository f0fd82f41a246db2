//! Per-download naming decision
//!
//! A decision always computes the local name first. With AI naming enabled
//! and a usable profile, a spawned summarization task races the configured
//! deadline; the first to settle decides, and a losing task is aborted so a
//! late reply can never change an emitted name.

mod types;

pub use types::{
    ConflictAction, Decision, DownloadEvent, FilenameResult, FilenameSuggestion, NamingError,
    NamingFallback, NamingSnapshot, PageContext,
};

use std::sync::Arc;
use tracing::{info, warn};

use crate::naming::{AI_MARKER, TemplateVars, render, sanitize, split_extension};
use crate::observability::Metrics;
use crate::summarize::{TopicSummarizer, resolve_profile};

const FALLBACK_BASE_NAME: &str = "download";

#[derive(Clone)]
pub struct NamingOrchestrator {
    summarizer: Arc<dyn TopicSummarizer>,
    metrics: Arc<Metrics>,
}

impl NamingOrchestrator {
    pub fn new(summarizer: Arc<dyn TopicSummarizer>, metrics: Arc<Metrics>) -> Self {
        Self {
            summarizer,
            metrics,
        }
    }

    /// Decide the final name for `event`.
    ///
    /// Provider problems never surface here; they pick the local name and
    /// are reported through [`Decision::fallback`]. The only error is a page
    /// URL that cannot be parsed.
    pub async fn decide(
        &self,
        event: &DownloadEvent,
        page: Option<&PageContext>,
        snapshot: &NamingSnapshot,
    ) -> Result<Decision, NamingError> {
        self.metrics.decision();
        let naming = &snapshot.naming;

        let title = page
            .map(|p| p.title.trim())
            .filter(|t| !t.is_empty())
            .unwrap_or(event.suggested_filename.as_str());
        let page_url = page
            .map(|p| p.url.trim())
            .filter(|u| !u.is_empty())
            .unwrap_or(event.url.as_str());

        let vars = TemplateVars::for_page(title, page_url, event.created_at).map_err(|source| {
            NamingError::InvalidUrl {
                url: page_url.to_string(),
                source,
            }
        })?;

        let (stem, extension) = split_extension(&event.suggested_filename);
        let local = FilenameResult {
            base_name: non_empty_or_fallback(render(&vars, naming), stem),
            extension: extension.to_string(),
            used_ai: false,
        };

        if !naming.ai_enabled {
            self.metrics.ai_disabled();
            return Ok(local_decision(local, NamingFallback::AiDisabled));
        }

        let profile = match resolve_profile(naming, &snapshot.profiles) {
            Ok(profile) => profile.clone(),
            Err(e) => {
                warn!(download_id = event.id, error = %e, "AI naming enabled but provider unusable");
                return Ok(local_decision(local, NamingFallback::ProfileUnavailable));
            }
        };

        let content = summary_input(title, page);
        let task_naming = naming.clone();
        let summarizer = Arc::clone(&self.summarizer);
        let mut task = tokio::spawn(async move {
            summarizer
                .summarize_with_profile(&content, &profile, &task_naming)
                .await
        });

        let deadline = naming.ai_timeout();
        let outcome = tokio::select! {
            biased;
            joined = &mut task => Some(joined),
            _ = tokio::time::sleep(deadline) => None,
        };

        let topic = match outcome {
            Some(Ok(Ok(topic))) => topic,
            Some(Ok(Err(e))) => {
                self.metrics.ai_error();
                warn!(download_id = event.id, error = %e, "AI naming failed, using local name");
                return Ok(local_decision(local, NamingFallback::AiFailed));
            }
            Some(Err(e)) => {
                self.metrics.ai_error();
                warn!(download_id = event.id, error = %e, "AI naming task did not finish");
                return Ok(local_decision(local, NamingFallback::AiAborted));
            }
            None => {
                task.abort();
                self.metrics.ai_timeout();
                warn!(
                    download_id = event.id,
                    timeout_secs = naming.ai_timeout_seconds,
                    "AI naming timed out, using local name"
                );
                return Ok(local_decision(local, NamingFallback::TimeoutExceeded));
            }
        };

        let mut base_name = render(&vars.with_topic(topic), naming);
        if base_name.is_empty() {
            return Ok(local_decision(local, NamingFallback::EmptyAiName));
        }
        base_name.push_str(AI_MARKER);

        self.metrics.ai_named();
        Ok(Decision {
            result: FilenameResult {
                base_name,
                extension: local.extension,
                used_ai: true,
            },
            fallback: None,
        })
    }

    /// Answer the download subsystem exactly once.
    ///
    /// The decision runs in its own task; if it errors or panics the
    /// browser's suggested filename is returned unchanged.
    pub async fn suggest(
        &self,
        event: DownloadEvent,
        page: Option<PageContext>,
        snapshot: NamingSnapshot,
    ) -> FilenameSuggestion {
        let this = self.clone();
        let task_event = event.clone();
        let save_path = snapshot.naming.default_save_path.clone();

        let decision = tokio::spawn(async move {
            this.decide(&task_event, page.as_ref(), &snapshot).await
        })
        .await;

        let (filename, used_ai, fallback) = match decision {
            Ok(Ok(decision)) => (
                decision.result.file_name(),
                decision.result.used_ai,
                decision.fallback,
            ),
            Ok(Err(e)) => {
                warn!(download_id = event.id, error = %e, "Naming failed, keeping original filename");
                (
                    event.suggested_filename.clone(),
                    false,
                    Some(NamingFallback::OriginalName),
                )
            }
            Err(e) => {
                warn!(download_id = event.id, error = %e, "Naming task failed, keeping original filename");
                (
                    event.suggested_filename.clone(),
                    false,
                    Some(NamingFallback::OriginalName),
                )
            }
        };

        let filename = with_save_path(&save_path, filename);
        info!(download_id = event.id, filename = %filename, used_ai, "Filename decided");

        FilenameSuggestion {
            filename,
            conflict_action: ConflictAction::Uniquify,
            used_ai,
            fallback,
        }
    }
}

fn local_decision(result: FilenameResult, fallback: NamingFallback) -> Decision {
    Decision {
        result,
        fallback: Some(fallback),
    }
}

/// A pattern can render to nothing (e.g. only punctuation); fall back to the
/// suggested stem, then to a fixed name.
fn non_empty_or_fallback(rendered: String, stem: &str) -> String {
    if !rendered.is_empty() {
        return rendered;
    }
    let stem = sanitize(stem);
    if stem.is_empty() { FALLBACK_BASE_NAME.to_string() } else { stem }
}

fn summary_input(title: &str, page: Option<&PageContext>) -> String {
    match page.and_then(|p| p.content_snippet.as_deref()).map(str::trim) {
        Some(snippet) if !snippet.is_empty() => format!("{title}\n\n{snippet}"),
        _ => title.to_string(),
    }
}

fn with_save_path(save_path: &str, filename: String) -> String {
    let dir = save_path.trim().trim_end_matches(['/', '\\']);
    if dir.is_empty() {
        filename
    } else {
        format!("{dir}/{filename}")
    }
}
