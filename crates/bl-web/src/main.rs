use anyhow::{Context, Result};
use bl_web::routes::router;
use bl_web::state::AppState;
use builder_ledger::bitquery::save_run_log;
use builder_ledger::{BitqueryClient, Config, FileConfig, TradeCache, TradeSource, calculate_stats, filter_trades_by_addresses};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bl-web")]
#[command(about = "Dashboard of DEX trading by known Ethereum block builders")]
struct Cli {
    /// Optional TOML config file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Bitquery API bearer token
    #[arg(long, env = "BITQUERY_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Address to listen on (overrides server.addr)
    #[arg(long, env = "BIND_ADDR")]
    addr: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the web dashboard (default)
    Serve,
    /// Fetch once, filter to builders, and write the result as JSON
    Fetch {
        #[arg(long)]
        out: PathBuf,
        /// Trades to request (overrides api.limit)
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let file = FileConfig::load_or_default(&cli.config)?;
    let config = Config::from_file(file, cli.token, cli.addr)?;
    info!(
        "[server] Tracking {} builders via {}",
        config.allowlist.len(),
        config.endpoint
    );

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Fetch { out, limit } => fetch_once(config, out, limit).await,
    }
}

async fn serve(config: Config) -> Result<()> {
    let client = BitqueryClient::new(&config.endpoint, &config.token, config.request_timeout)?;
    let cache = TradeCache::new(Box::new(client), Arc::new(config.allowlist))
        .with_ttl(config.cache_ttl)
        .with_limit(config.limit)
        .with_dump_path(config.dump_path);
    let app = router(Arc::new(AppState::new(cache)));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!("[server] Listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

async fn fetch_once(config: Config, out: PathBuf, limit: Option<usize>) -> Result<()> {
    let limit = config.fetch_limit(limit)?;
    let client = BitqueryClient::new(&config.endpoint, &config.token, config.request_timeout)?;
    let envelope = client
        .fetch_trades(limit)
        .await
        .context("Failed to fetch trades")?;

    let fetched = envelope.len();
    let filtered = filter_trades_by_addresses(envelope, &config.allowlist);
    save_run_log(&filtered, &out)?;

    let stats = calculate_stats(filtered.trades(), &config.allowlist);
    info!(
        "[fetch] Wrote {} of {} trades to {} ({} builders active, ${:.2} volume)",
        filtered.len(),
        fetched,
        out.display(),
        stats.builder_summary.len(),
        stats.total_value_usd
    );
    Ok(())
}
