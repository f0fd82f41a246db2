use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::NamingConfig;
use crate::profiles::ProfileSet;

/// A download as reported by the browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadEvent {
    pub id: u64,
    pub url: String,
    pub suggested_filename: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// The page the download was started from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageContext {
    pub title: String,
    pub url: String,
    pub content_snippet: Option<String>,
}

/// Final name for one download
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilenameResult {
    pub base_name: String,
    pub extension: String,
    pub used_ai: bool,
}

impl FilenameResult {
    /// `base.ext`, or just `base` when there is no extension
    pub fn file_name(&self) -> String {
        if self.extension.is_empty() {
            self.base_name.clone()
        } else {
            format!("{}.{}", self.base_name, self.extension)
        }
    }
}

/// Settings a decision reads; cloned once so a decision never observes an
/// edit made while it runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamingSnapshot {
    pub naming: NamingConfig,
    pub profiles: ProfileSet,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictAction {
    #[default]
    Uniquify,
}

/// Reply to the download subsystem's "determining filename" callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilenameSuggestion {
    pub filename: String,
    pub conflict_action: ConflictAction,
    pub used_ai: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<NamingFallback>,
}

/// Why the local name was used instead of an AI name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingFallback {
    AiDisabled,
    ProfileUnavailable,
    TimeoutExceeded,
    AiFailed,
    AiAborted,
    EmptyAiName,
    /// The decision itself failed; the browser's own name was kept
    OriginalName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub result: FilenameResult,
    pub fallback: Option<NamingFallback>,
}

#[derive(Debug, Error)]
pub enum NamingError {
    #[error("invalid page url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_joins_extension() {
        let result = FilenameResult {
            base_name: "Report_example.com_20240101".into(),
            extension: "pdf".into(),
            used_ai: false,
        };
        assert_eq!(result.file_name(), "Report_example.com_20240101.pdf");

        let bare = FilenameResult {
            extension: String::new(),
            ..result
        };
        assert_eq!(bare.file_name(), "Report_example.com_20240101");
    }

    #[test]
    fn test_suggestion_wire_format() {
        let suggestion = FilenameSuggestion {
            filename: "a.pdf".into(),
            conflict_action: ConflictAction::Uniquify,
            used_ai: false,
            fallback: Some(NamingFallback::TimeoutExceeded),
        };
        let json = serde_json::to_value(&suggestion).unwrap();
        assert_eq!(json["conflict_action"], "uniquify");
        assert_eq!(json["fallback"], "timeout_exceeded");
    }

    #[test]
    fn test_event_created_at_defaults_to_now() {
        let event: DownloadEvent = serde_json::from_str(
            r#"{"id": 7, "url": "https://example.com/a.zip", "suggested_filename": "a.zip"}"#,
        )
        .unwrap();
        assert_eq!(event.id, 7);
        assert!(Utc::now() - event.created_at < chrono::TimeDelta::minutes(1));
    }
}
