mod apply;
mod config;
mod provider;
mod reconcile;

use anyhow::Result;
use clap::Parser;
use log::{info, warn};

use provider::cloudflare::CloudflareClient;

#[derive(Parser, Debug)]
#[command(name = "zone-sync")]
#[command(about = "Reconciles declared DNS records against a live Cloudflare zone")]
struct Args {
    /// API token used to authenticate against the provider
    token: String,

    /// Identifier of the zone to reconcile
    zone: String,

    /// Path to the YAML file with the declared records
    config: String,

    /// Log the full record sets being compared
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logger from the verbose flag (RUST_LOG takes precedence)
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .init();

    info!("Loading configuration from: {}", args.config);
    let config = config::Config::load(&args.config)?;

    let client = CloudflareClient::new(&args.token);

    info!("Fetching zone records");
    let live = client.list_records(&args.zone).await?;
    reconcile::log_live_records(&live, args.verbose);

    let plan = reconcile::reconcile(&config.records, live, &config.domain);
    reconcile::log_plan(&plan, args.verbose);

    // Buckets are disjoint, so the relative order only affects log output.
    let mut failed = 0;
    failed += apply::delete_records(&client, &args.zone, &plan.to_delete).await;
    failed += apply::update_records(&client, &args.zone, &plan.to_update).await;
    failed += apply::create_records(&client, &args.zone, &plan.to_create).await;

    if failed > 0 {
        warn!("Reconciliation finished with {} failed operation(s)", failed);
    } else {
        info!("Reconciliation finished");
    }

    Ok(())
}
