use bon::bon;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::LocalStore;
use super::error::{Result, StoreError};
use super::keys::{decode_history_key, encode_history_key};

/// A completed download, as shown in the history list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: u64,
    pub original_name: String,
    pub new_name: String,
    pub url: String,
    /// ISO-8601 completion time
    pub date: DateTime<Utc>,
    pub file_size: u64,
    pub mime_type: String,
    /// Completion time in epoch milliseconds
    pub timestamp: i64,
    #[serde(default)]
    pub used_ai: bool,
}

#[bon]
impl HistoryRecord {
    #[builder]
    pub fn new(
        id: u64,
        #[builder(into)] original_name: String,
        #[builder(into)] new_name: String,
        #[builder(into)] url: String,
        #[builder(default)] file_size: u64,
        #[builder(into, default)] mime_type: String,
        #[builder(default)] used_ai: bool,
        #[builder(default = Utc::now())] completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            original_name,
            new_name,
            url,
            date: completed_at,
            file_size,
            mime_type,
            timestamp: completed_at.timestamp_millis(),
            used_ai,
        }
    }
}

impl LocalStore {
    /// Add a record and drop the oldest ones beyond `max_entries`
    pub fn append_history(&self, record: &HistoryRecord, max_entries: usize) -> Result<usize> {
        let key = encode_history_key(record.timestamp, record.id);
        self.history.insert(key, serde_json::to_vec(record)?)?;
        debug!(download_id = record.id, "Appended history record");

        let total = self.history.len()?;
        let excess = total.saturating_sub(max_entries);
        if excess == 0 {
            return Ok(0);
        }

        let mut stale = Vec::with_capacity(excess);
        for item in self.history.iter().take(excess) {
            let (key, _) = item?;
            stale.push(key);
        }
        let removed = stale.len();
        for key in stale {
            self.history.remove(key)?;
        }

        debug!(removed, "Capped history");
        Ok(removed)
    }

    /// Newest first, at most `limit` records
    pub fn list_history(&self, limit: usize) -> Result<Vec<HistoryRecord>> {
        let mut records = Vec::new();
        for item in self.history.iter().rev().take(limit) {
            let (_, value) = item?;
            records.push(serde_json::from_slice(&value)?);
        }
        Ok(records)
    }

    /// Remove records completed before `cutoff`
    pub fn purge_history_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let cutoff_ms = cutoff.timestamp_millis();

        let mut expired = Vec::new();
        for item in self.history.iter() {
            let (key, _) = item?;
            match decode_history_key(&key) {
                Some((ts, _)) if ts < cutoff_ms => expired.push(key),
                Some(_) => break,
                None => {
                    return Err(StoreError::InvalidKey(
                        String::from_utf8_lossy(&key).to_string(),
                    ));
                }
            }
        }

        let purged = expired.len();
        for key in expired {
            self.history.remove(key)?;
        }

        info!(purged, cutoff = %cutoff, "Purged expired history");
        Ok(purged)
    }

    pub fn clear_history(&self) -> Result<usize> {
        let mut keys = Vec::new();
        for item in self.history.iter() {
            let (key, _) = item?;
            keys.push(key);
        }
        let cleared = keys.len();
        for key in keys {
            self.history.remove(key)?;
        }
        Ok(cleared)
    }
}
