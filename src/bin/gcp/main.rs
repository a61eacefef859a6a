use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use gcpkit::config::{
    CredentialSource, ENV_PROJECT_ID, ENV_PUBSUB_EMULATOR_HOST, ENV_SCOPES,
    ENV_SERVICE_ACCOUNT_KEY,
};
use gcpkit::{Config, Gcp};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "gcp",
    about = "GCP utilities: tokens, spreadsheet records, pubsub, monitoring"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Service account key: a path, or the JSON itself
    #[arg(long, global = true, env = ENV_SERVICE_ACCOUNT_KEY, hide_env_values = true)]
    key: Option<String>,

    /// OAuth scopes (comma separated); defaults to cloud-platform
    #[arg(long = "scope", global = true, env = ENV_SCOPES, value_delimiter = ',')]
    scopes: Vec<String>,

    /// Project for Pub/Sub resource names; defaults to the key's project
    #[arg(long, global = true, env = ENV_PROJECT_ID)]
    project: Option<String>,

    /// host:port of a Pub/Sub emulator
    #[arg(long, global = true, env = ENV_PUBSUB_EMULATOR_HOST)]
    pubsub_emulator_host: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long, global = true, default_value_t = 120)]
    timeout: u64,
}

impl GlobalArgs {
    fn config(&self) -> Config {
        Config {
            credentials: self.key.as_deref().map(CredentialSource::parse),
            scopes: self
                .scopes
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            project_id: self.project.clone(),
            pubsub_emulator_host: self.pubsub_emulator_host.clone(),
            request_timeout: std::time::Duration::from_secs(self.timeout),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print an OAuth 2.0 access token
    Token {
        /// Sign a JWT access token locally instead of asking the token endpoint
        #[arg(long)]
        self_signed: bool,
    },

    /// Read and write spreadsheet rows
    #[command(subcommand)]
    Sheet(commands::sheet::SheetCommand),

    /// Publish to topics and drain subscriptions
    #[command(subcommand)]
    Pubsub(commands::pubsub::PubsubCommand),

    /// Run an MQL time series query
    Query {
        /// Project to query; defaults to the key's project
        #[arg(long = "query-project")]
        query_project: Option<String>,
        query: String,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let gcp = Gcp::new(cli.global.config()).context("Failed to initialize GCP access")?;
    match cli.cmd {
        Commands::Token { self_signed } => commands::token::run(&gcp, self_signed).await,
        Commands::Sheet(cmd) => commands::sheet::run(&gcp, cmd).await,
        Commands::Pubsub(cmd) => commands::pubsub::run(&gcp, cmd).await,
        Commands::Query {
            query_project,
            query,
        } => commands::query::run(&gcp, query_project.as_deref(), &query).await,
    }
}

mod commands;
mod common;
