//! Developer CLI for `mintkit-core`.
//!
//! ```text
//! mintkit --rpc-url https://rpc.example.org supply 0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed
//! mintkit --config mint.json supply --gallery gallery.json
//! mintkit embed-url --public-id 0xfeed --target https://mint.example.org/
//! mintkit label --presale
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use eyre::{eyre, Result, WrapErr};
use mintkit_core::config::{MintKitConfig, SecondaryFlowConfig};
use mintkit_core::gate::TriggerPredicates;
use mintkit_core::supply::{ExplorerLinks, JsonRpcLedger, SupplyAggregator};
use mintkit_core::{AssetId, CollectibleRef, Environment};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "mintkit", version, about = "MintKit developer CLI")]
struct Cli {
    /// JSON configuration file. Takes precedence over `--environment` and `--rpc-url`.
    #[arg(long, global = true, env = "MINTKIT_CONFIG")]
    config: Option<PathBuf>,

    /// Network environment.
    #[arg(long, global = true, env = "MINTKIT_ENVIRONMENT", default_value = "production")]
    environment: Environment,

    /// JSON-RPC endpoint of the ledger.
    #[arg(long, global = true, env = "MINTKIT_RPC_URL")]
    rpc_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetches remaining supply and prints the gallery entries as JSON.
    Supply {
        /// JSON file holding a list of collectibles.
        #[arg(long, conflicts_with = "assets")]
        gallery: Option<PathBuf>,
        /// Asset addresses to look up.
        assets: Vec<String>,
    },
    /// Prints the URL of the embedded secondary verification flow.
    EmbedUrl {
        /// Public identifier of the wallet.
        #[arg(long)]
        public_id: String,
        /// Where the flow returns to.
        #[arg(long)]
        target: String,
    },
    /// Prints the trigger label for a mint state.
    Label {
        /// Nothing is left to mint.
        #[arg(long)]
        sold_out: bool,
        /// A mint is in flight.
        #[arg(long)]
        busy: bool,
        /// The mint is in presale.
        #[arg(long)]
        presale: bool,
        /// Minting has not started.
        #[arg(long)]
        inactive: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| eyre!("failed to initialize logging: {e}"))?;

    let cli = Cli::parse();
    match &cli.command {
        Command::Supply { gallery, assets } => {
            let config = load_config(&cli)?;
            let collectibles = match gallery {
                Some(path) => read_gallery(path)?,
                None => collectibles_from_assets(assets)?,
            };
            supply(&config, &collectibles).await
        }
        Command::EmbedUrl { public_id, target } => {
            let secondary_flow = match &cli.config {
                Some(path) => read_config(path)?.secondary_flow,
                None => SecondaryFlowConfig::default(),
            };
            println!("{}", secondary_flow.embed_url_for(public_id, target)?);
            Ok(())
        }
        Command::Label {
            sold_out,
            busy,
            presale,
            inactive,
        } => {
            let predicates = TriggerPredicates {
                sold_out: *sold_out,
                busy: *busy,
                presale: *presale,
                active: !*inactive,
            };
            let state = if predicates.is_disabled() {
                "disabled"
            } else {
                "enabled"
            };
            println!("{} ({state})", predicates.label());
            Ok(())
        }
    }
}

async fn supply(config: &MintKitConfig, collectibles: &[CollectibleRef]) -> Result<()> {
    let aggregator = SupplyAggregator::new(Arc::new(JsonRpcLedger::from_config(config)));
    let entries = aggregator
        .refresh(collectibles)
        .await
        .wrap_err("remaining supply lookup failed")?;
    tracing::info!(entries, rpc_url = %config.rpc_url, "fetched remaining supply");

    let explorer = ExplorerLinks::for_environment(config.environment);
    let gallery = aggregator.gallery(collectibles, &explorer);
    println!("{}", serde_json::to_string_pretty(&gallery)?);
    Ok(())
}

fn load_config(cli: &Cli) -> Result<MintKitConfig> {
    if let Some(path) = &cli.config {
        return read_config(path);
    }
    let rpc_url = cli
        .rpc_url
        .clone()
        .ok_or_else(|| eyre!("either --config or --rpc-url is required"))?;
    Ok(MintKitConfig::from_environment(cli.environment, rpc_url)?)
}

fn read_config(path: &Path) -> Result<MintKitConfig> {
    let json = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read config {}", path.display()))?;
    MintKitConfig::from_json(&json)
        .wrap_err_with(|| format!("invalid config {}", path.display()))
}

fn read_gallery(path: &Path) -> Result<Vec<CollectibleRef>> {
    let json = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read gallery {}", path.display()))?;
    serde_json::from_str(&json)
        .wrap_err_with(|| format!("invalid gallery {}", path.display()))
}

fn collectibles_from_assets(assets: &[String]) -> Result<Vec<CollectibleRef>> {
    if assets.is_empty() {
        return Err(eyre!("pass at least one asset address or --gallery"));
    }
    assets
        .iter()
        .map(|raw| -> Result<CollectibleRef> {
            let asset: AssetId = raw.parse()?;
            Ok(CollectibleRef {
                image: String::new(),
                name: asset.shortened(),
                asset: Some(asset),
                action_link: None,
            })
        })
        .collect()
}
