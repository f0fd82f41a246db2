use clap::{Parser, Subcommand};
use std::net::SocketAddr;

#[derive(Parser, Debug)]
#[command(name = "smartsave")]
#[command(about = "Download naming service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the local HTTP service
    Serve(ServeArgs),
    /// Decide a filename for one download and print the suggestion
    Name(NameArgs),
    /// Print recent downloads
    History(HistoryArgs),
}

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Address to bind to; defaults to `server.bind_addr` from the config
    #[arg(long)]
    pub address: Option<SocketAddr>,
}

#[derive(clap::Args, Debug)]
pub struct NameArgs {
    /// Download URL
    #[arg(long)]
    pub url: String,

    /// Filename suggested by the browser
    #[arg(long)]
    pub filename: String,

    /// Title of the page the download started from
    #[arg(long)]
    pub title: Option<String>,

    /// Page text passed to the AI provider along with the title
    #[arg(long)]
    pub snippet: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct HistoryArgs {
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}
