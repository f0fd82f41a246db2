pub mod api;
pub mod batch;
pub mod config;
pub mod humanize;
pub mod naming;
pub mod observability;
pub mod orchestrator;
pub mod profiles;
pub mod providers;
pub mod store;
pub mod summarize;
