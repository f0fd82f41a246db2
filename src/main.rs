mod cli;

use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use cli::{Cli, Commands, HistoryArgs, NameArgs};
use tracing_subscriber::EnvFilter;

use smartsave::config::Config;
use smartsave::humanize::ByteSize;
use smartsave::observability::Metrics;
use smartsave::orchestrator::{DownloadEvent, NamingOrchestrator, NamingSnapshot, PageContext};
use smartsave::profiles::ProfileSet;
use smartsave::store::LocalStore;
use smartsave::summarize::SummarizationClient;

type AnyError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), AnyError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("smartsave=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => smartsave::api::run(args.address).await?,
        Commands::Name(args) => name(args).await?,
        Commands::History(args) => history(args)?,
    }

    Ok(())
}

/// Uses the configuration file only, so it can run next to a live service
/// holding the store.
async fn name(args: NameArgs) -> Result<(), AnyError> {
    let config = Config::load()?;
    let snapshot = NamingSnapshot {
        naming: config.naming.clone(),
        profiles: ProfileSet::new(config.providers.clone())?,
    };

    let summarizer = Arc::new(SummarizationClient::from_config(&config.http)?);
    let orchestrator = NamingOrchestrator::new(summarizer, Arc::new(Metrics::new()));

    let event = DownloadEvent {
        id: 0,
        url: args.url.clone(),
        suggested_filename: args.filename,
        created_at: Utc::now(),
    };
    let page = args.title.map(|title| PageContext {
        title,
        url: args.url,
        content_snippet: args.snippet,
    });

    let suggestion = orchestrator.suggest(event, page, snapshot).await;
    println!("{}", serde_json::to_string_pretty(&suggestion)?);
    Ok(())
}

fn history(args: HistoryArgs) -> Result<(), AnyError> {
    let config = Config::load()?;
    let store = LocalStore::open(&config.server.store_path)?;

    for record in store.list_history(args.limit)? {
        println!(
            "{}  {:>10}  {}{}  <- {}",
            record.date.format("%Y-%m-%d %H:%M:%S"),
            ByteSize(record.file_size).to_human_readable(),
            record.new_name,
            if record.used_ai { " (ai)" } else { "" },
            record.original_name,
        );
    }
    Ok(())
}
