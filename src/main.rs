//! Google Photos to Amazon Photos migration CLI
//!
//! Wires the reqwest-backed HTTP client into both provider connectors and
//! hands them to the transfer engine. Credentials come from the
//! environment; everything else is configured through flags.

mod http;
mod report;

use anyhow::Context;
use clap::Parser;
use core_auth::{OAuthConfig, TokenManager};
use core_transfer::{TransferConfig, TransferCoordinator};
use provider_amazon_photos::AmazonPhotosConnector;
use provider_google_photos::GooglePhotosConnector;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use transfer_traits::destination::MediaDestination;
use transfer_traits::http::HttpClient;
use transfer_traits::source::MediaSource;

use http::ReqwestHttpClient;
use report::TransferReport;

/// Amazon OAuth token endpoint used to refresh access tokens
const AMAZON_TOKEN_URL: &str = "https://api.amazon.com/auth/o2/token";

#[derive(Parser)]
#[command(name = "photoport")]
#[command(version)]
#[command(about = "Transfer photos from Google Photos to Amazon Photos", long_about = None)]
struct Cli {
    /// Maximum number of items to transfer per listing pass
    #[arg(long)]
    max_items: Option<u64>,

    /// Page size requested from the source library
    #[arg(long, default_value_t = 50)]
    batch_size: u32,

    /// Directory media is staged in between download and upload
    #[arg(long)]
    staging_dir: Option<PathBuf>,

    /// Path the JSON transfer report is written to
    #[arg(long, default_value = "transfer_report.json")]
    report_path: PathBuf,

    /// Simulate the transfer without downloading or uploading anything
    #[arg(long)]
    dry_run: bool,

    /// Skip album transfer and only transfer individual photos
    #[arg(long)]
    skip_albums: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if cli.dry_run {
        info!("DRY RUN MODE: No actual downloads or uploads will be performed");
    }
    if cli.skip_albums {
        info!("Skipping album transfer as requested");
    } else {
        info!("Albums will be transferred with 1:1 mapping between Google Photos and Amazon Photos");
    }

    let http_client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());

    info!("Initializing Google Photos connector...");
    let google_token = require_env("GOOGLE_ACCESS_TOKEN")?;
    let source: Arc<dyn MediaSource> =
        Arc::new(GooglePhotosConnector::new(http_client.clone(), google_token));

    info!("Initializing Amazon Photos connector...");
    let token_manager = TokenManager::new(
        OAuthConfig {
            client_id: amazon_credential(cli.dry_run, "AMAZON_CLIENT_ID")?,
            client_secret: Some(amazon_credential(cli.dry_run, "AMAZON_CLIENT_SECRET")?),
            token_url: AMAZON_TOKEN_URL.to_string(),
        },
        http_client.clone(),
        amazon_credential(cli.dry_run, "AMAZON_REFRESH_TOKEN")?,
    );
    let destination: Arc<dyn MediaDestination> =
        Arc::new(AmazonPhotosConnector::new(http_client, token_manager));

    let defaults = TransferConfig::default();
    let config = TransferConfig {
        batch_size: cli.batch_size,
        max_items: cli.max_items,
        dry_run: cli.dry_run,
        transfer_albums: !cli.skip_albums,
        staging_dir: cli.staging_dir.unwrap_or(defaults.staging_dir),
        page_delay: defaults.page_delay,
    };

    let coordinator = TransferCoordinator::new(config, source, destination);
    let run = coordinator.run().await?;

    let report = TransferReport::from_run(&run);
    match report.write_to(&cli.report_path).await {
        Ok(()) => info!("Transfer report saved to {}", cli.report_path.display()),
        Err(e) => warn!("Failed to write transfer report: {e:#}"),
    }

    info!(
        "Transfer completed. Transferred {} photos successfully.",
        run.stats.success
    );
    Ok(())
}

fn require_env(name: &str) -> anyhow::Result<String> {
    std::env::var(name).with_context(|| format!("{name} environment variable must be set"))
}

/// Amazon credentials may be absent in dry-run mode; the destination is
/// never called, so placeholder values are fine.
fn amazon_credential(dry_run: bool, name: &str) -> anyhow::Result<String> {
    if dry_run {
        Ok(std::env::var(name).unwrap_or_default())
    } else {
        require_env(name)
    }
}
