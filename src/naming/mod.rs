//! Deterministic naming: sanitization and pattern expansion
//!
//! Everything in this module is pure. The local name produced by [`render`]
//! is the guaranteed fallback of every naming decision.
//!
//! ## Example
//!
//! ```rust
//! use smartsave::config::NamingConfig;
//! use smartsave::naming::{TemplateVars, render};
//!
//! let vars = TemplateVars {
//!     main_topic: "Report.pdf".into(),
//!     site_name: "www.example.com".into(),
//!     date: "20240101".into(),
//!     timestamp: "0".into(),
//! };
//! assert_eq!(render(&vars, &NamingConfig::default()), "Report_www.example.com_20240101");
//! ```

mod sanitize;
mod template;

pub use sanitize::sanitize;
pub use template::{
    AI_MARKER, KNOWN_EXTENSIONS, TemplateVars, format_date, render, site_name_from_url,
    split_extension, strip_known_extension,
};
