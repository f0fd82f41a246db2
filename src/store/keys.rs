/// Key layout for the store partitions
///
/// - `history`: hist:{timestamp_ms:020}:{download_id:020} -> HistoryRecord (JSON)
/// - `settings`: settings:{name} -> JSON document
///
/// History keys sort chronologically, so iteration order is insertion time
/// and a reverse scan yields newest first.

pub const HISTORY_PREFIX: &str = "hist:";

pub const SETTINGS_PROFILES: &str = "profiles";
pub const SETTINGS_NAMING: &str = "naming";

/// Encode a history key. Negative timestamps clamp to zero.
pub fn encode_history_key(timestamp_ms: i64, download_id: u64) -> Vec<u8> {
    format!(
        "{HISTORY_PREFIX}{:020}:{:020}",
        timestamp_ms.max(0),
        download_id
    )
    .into_bytes()
}

/// Decode a history key -> (timestamp_ms, download_id)
pub fn decode_history_key(key: &[u8]) -> Option<(i64, u64)> {
    let key_str = std::str::from_utf8(key).ok()?;
    let (ts, id) = key_str.strip_prefix(HISTORY_PREFIX)?.split_once(':')?;
    Some((ts.parse().ok()?, id.parse().ok()?))
}

/// Encode a settings key: settings:{name}
pub fn encode_settings_key(name: &str) -> Vec<u8> {
    format!("settings:{name}").into_bytes()
}
