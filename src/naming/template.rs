use chrono::{DateTime, Utc};
use url::Url;

use super::sanitize::sanitize;
use crate::config::NamingConfig;

/// Suffixes stripped from topic and site values so a page title that looks
/// like a filename does not produce a double extension.
pub const KNOWN_EXTENSIONS: &[&str] = &[
    "zip", "rar", "tar", "gz", "7z", "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt",
    "html", "htm", "xml", "json", "csv", "jpg", "jpeg", "png", "gif", "bmp", "svg", "mp3", "mp4",
    "avi", "mov", "wmv", "flv", "mkv", "webm",
];

/// Marker appended to AI-derived base names, before the extension.
pub const AI_MARKER: &str = "_ai";

/// Values substituted into a naming pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateVars {
    pub main_topic: String,
    pub site_name: String,
    pub date: String,
    pub timestamp: String,
}

impl TemplateVars {
    /// Deterministic variables for a page: host without `www.`, `YYYYMMDD`
    /// date and epoch milliseconds, all taken from `at`.
    pub fn for_page(
        main_topic: impl Into<String>,
        page_url: &str,
        at: DateTime<Utc>,
    ) -> Result<Self, url::ParseError> {
        Ok(Self {
            main_topic: main_topic.into(),
            site_name: site_name_from_url(page_url)?,
            date: format_date(at),
            timestamp: at.timestamp_millis().to_string(),
        })
    }

    /// Same variables with a different topic
    pub fn with_topic(&self, main_topic: impl Into<String>) -> Self {
        Self {
            main_topic: main_topic.into(),
            ..self.clone()
        }
    }
}

/// Expands `cfg.pattern` into a sanitized base filename (no extension).
pub fn render(vars: &TemplateVars, cfg: &NamingConfig) -> String {
    let main_topic = strip_known_extension(&vars.main_topic);
    let site_name = strip_known_extension(&vars.site_name);

    let mut filename = expand_placeholders(&cfg.pattern, |name| match name {
        "mainTopic" => Some(main_topic),
        "siteName" => Some(site_name),
        "date" => Some(vars.date.as_str()),
        "timestamp" => Some(vars.timestamp.as_str()),
        _ => None,
    });

    if cfg.force_simple_charset {
        filename = simplify_charset(&filename);
    }

    if cfg.use_timestamp && !vars.date.is_empty() && !filename.contains(&vars.date) {
        filename.push('_');
        filename.push_str(&vars.date);
    }

    sanitize(&filename)
}

/// Single pass over the pattern, so substituted values are never re-scanned
/// for placeholders. Unknown `{...}` sequences are copied verbatim.
fn expand_placeholders<'a>(pattern: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut rest = pattern;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];

        match tail.find('}') {
            Some(close) => match lookup(&tail[1..close]) {
                Some(value) => {
                    out.push_str(value);
                    rest = &tail[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = &tail[1..];
                }
            },
            None => {
                out.push_str(tail);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

/// Keeps only ASCII letters, digits, `-` and `_`. Non-ASCII characters are
/// dropped; other ASCII becomes `_`.
fn simplify_charset(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_underscore = false;

    for c in text.chars().filter(char::is_ascii) {
        let mapped = if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            c
        } else {
            '_'
        };

        if mapped == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(mapped);
            prev_underscore = false;
        }
    }

    out.trim_matches('_').to_string()
}

/// Removes one trailing known extension, case-insensitively.
pub fn strip_known_extension(text: &str) -> &str {
    let text = text.trim();
    match text.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty() && KNOWN_EXTENSIONS.iter().any(|k| k.eq_ignore_ascii_case(ext)) =>
        {
            stem
        }
        _ => text,
    }
}

/// Host of `page_url` without a leading `www.`; empty for host-less URLs.
pub fn site_name_from_url(page_url: &str) -> Result<String, url::ParseError> {
    let url = Url::parse(page_url)?;
    let host = url.host_str().unwrap_or_default();
    Ok(host.strip_prefix("www.").unwrap_or(host).to_string())
}

pub fn format_date(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d").to_string()
}

/// Splits the last path component of `filename` into `(stem, extension)`.
///
/// A name without a dot, or whose only dot is leading (`.bashrc`), has an
/// empty extension.
pub fn split_extension(filename: &str) -> (&str, &str) {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, ext),
        _ => (name, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn cfg(pattern: &str) -> NamingConfig {
        NamingConfig {
            pattern: pattern.to_string(),
            use_timestamp: true,
            force_simple_charset: false,
            ..NamingConfig::default()
        }
    }

    fn vars(main_topic: &str, site_name: &str) -> TemplateVars {
        TemplateVars {
            main_topic: main_topic.to_string(),
            site_name: site_name.to_string(),
            date: "20240101".to_string(),
            timestamp: "1704067200000".to_string(),
        }
    }

    #[test]
    fn test_renders_default_pattern_and_strips_extension() {
        let name = render(
            &vars("Report.pdf", "www.example.com"),
            &cfg("{mainTopic}_{siteName}_{date}"),
        );
        assert_eq!(name, "Report_www.example.com_20240101");
    }

    #[test]
    fn test_extension_strip_is_case_insensitive_and_single() {
        assert_eq!(strip_known_extension("Slides.PPTX"), "Slides");
        assert_eq!(strip_known_extension("archive.tar.gz"), "archive.tar");
        assert_eq!(strip_known_extension("notes.md"), "notes.md");
        assert_eq!(strip_known_extension(".pdf"), ".pdf");
    }

    #[test]
    fn test_appends_date_only_when_missing() {
        let name = render(&vars("Topic", "site"), &cfg("{mainTopic}-{siteName}"));
        assert_eq!(name, "Topic-site_20240101");

        let mut no_stamp = cfg("{mainTopic}-{siteName}");
        no_stamp.use_timestamp = false;
        assert_eq!(render(&vars("Topic", "site"), &no_stamp), "Topic-site");
    }

    #[test]
    fn test_unknown_placeholders_are_kept() {
        let mut config = cfg("{mainTopic}_{author}_{date");
        config.use_timestamp = false;
        assert_eq!(render(&vars("T", "s"), &config), "T_{author}_{date");
    }

    #[test]
    fn test_substituted_values_are_not_rescanned() {
        let mut config = cfg("{mainTopic}_{siteName}");
        config.use_timestamp = false;
        let name = render(&vars("{siteName}", "host"), &config);
        assert_eq!(name, "{siteName}_host");
    }

    #[test]
    fn test_timestamp_placeholder_is_substituted() {
        let name = render(&vars("T", "s"), &cfg("{mainTopic}_{timestamp}"));
        assert_eq!(name, "T_1704067200000_20240101");
    }

    #[test]
    fn test_simple_charset_drops_native_script() {
        let mut config = cfg("{mainTopic}_{siteName}_{date}");
        config.force_simple_charset = true;

        let name = render(&vars("季度报告 Q3 summary", "www.example.com"), &config);
        assert_eq!(name, "Q3_summary_www_example_com_20240101");
        assert!(
            name.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_render_is_deterministic() {
        let config = cfg("{mainTopic}_{siteName}_{date}");
        let v = vars("Some: title?", "example.org");
        assert_eq!(render(&v, &config), render(&v, &config));
        assert_eq!(render(&v, &config), "Some_title_example.org_20240101");
    }

    #[test]
    fn test_page_vars_from_url() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        let v = TemplateVars::for_page("Title", "https://www.rust-lang.org/learn", at).unwrap();
        assert_eq!(v.site_name, "rust-lang.org");
        assert_eq!(v.date, "20240309");
        assert_eq!(v.timestamp, at.timestamp_millis().to_string());

        assert!(TemplateVars::for_page("Title", "not a url", at).is_err());
    }

    #[test]
    fn test_host_less_url_gives_empty_site() {
        assert_eq!(site_name_from_url("data:text/plain,hello").unwrap(), "");
    }

    #[test]
    fn test_splits_trailing_extension() {
        assert_eq!(split_extension("report.final.pdf"), ("report.final", "pdf"));
        assert_eq!(split_extension("/home/u/Downloads/a.tar.gz"), ("a.tar", "gz"));
        assert_eq!(split_extension("C:\\dl\\photo.JPG"), ("photo", "JPG"));
        assert_eq!(split_extension("README"), ("README", ""));
        assert_eq!(split_extension(".bashrc"), (".bashrc", ""));
    }
}
