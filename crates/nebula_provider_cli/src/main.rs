use std::path::PathBuf;
use std::process::ExitCode;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use clap::{Args, Parser, Subcommand};
use nebula_base_layer::{EthereumMarketConfig, EthereumMarketContract};
use nebula_offer_reconciler::{OfferReconciler, UpdateOptions};
use tracing::error;
use tracing::metadata::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

mod config;
mod prompt;

use config::{load_provider_config, resolve_offers, ConfigError};
use prompt::{AlwaysYes, StdinPrompt};

#[derive(Parser, Debug)]
#[command(
    name = "nebula-provider",
    about = "Provider-side tooling for the Nebula compute marketplace"
)]
pub struct NebulaProviderCli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Offer management against the on-chain marketplace.
    #[clap(subcommand)]
    Offer(OfferCommand),
}

#[derive(Debug, Subcommand)]
enum OfferCommand {
    /// Diff configured offers against their on-chain state and submit the
    /// reconciling transactions as one signed batch.
    Update(UpdateArgs),
}

#[derive(Debug, Args)]
struct UpdateArgs {
    /// Path to the provider configuration file.
    #[clap(short = 'c', long, default_value = "nebula-provider.toml")]
    config: PathBuf,
    /// Offer names to update. Updates every configured offer when empty.
    #[clap(long, value_delimiter = ',')]
    offers: Vec<String>,
    /// Overrides the RPC endpoint from the configuration file.
    #[clap(long)]
    node_url: Option<Url>,
    /// Overrides the market contract address from the configuration file.
    #[clap(long)]
    market_address: Option<Address>,
    /// Answers the confirmation prompt with yes.
    #[clap(short = 'y', long)]
    yes: bool,
    /// Prints the update plan without prompting or submitting anything.
    #[clap(long)]
    dry_run: bool,
    /// Hex-encoded private key of the provider wallet.
    #[clap(long, env = "NEBULA_PRIV_KEY", hide_env_values = true)]
    priv_key: String,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid provider private key: {0}")]
    PrivateKey(#[from] alloy::signers::local::LocalSignerError),
    #[error(transparent)]
    Update(#[from] nebula_offer_reconciler::OfferUpdateError),
}

async fn update_offers(args: UpdateArgs) -> Result<(), CliError> {
    let provider_config = load_provider_config(&args.config)?;
    let desired = resolve_offers(&provider_config, &args.offers)?;

    let market_config = EthereumMarketConfig {
        node_url: args.node_url.unwrap_or(provider_config.node_url),
        market_contract_address: args
            .market_address
            .unwrap_or(provider_config.market_contract_address),
    };
    let signer: PrivateKeySigner = args.priv_key.trim().parse()?;
    let chain = EthereumMarketContract::new(market_config, signer);

    let options = UpdateOptions { dry_run: args.dry_run };
    if args.yes {
        OfferReconciler::new(chain, AlwaysYes, options).update_offers(desired).await?;
    } else {
        OfferReconciler::new(chain, StdinPrompt, options).update_offers(desired).await?;
    }
    Ok(())
}

fn configure_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy()
        .add_directive("alloy_provider=info".parse().unwrap())
        .add_directive("alloy_rpc_client=info".parse().unwrap())
        .add_directive("alloy_transport_http=info".parse().unwrap())
        .add_directive("hyper=info".parse().unwrap());

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    configure_tracing();
    let cli = NebulaProviderCli::parse();

    let result = match cli.command {
        Command::Offer(OfferCommand::Update(args)) => update_offers(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{error}");
            ExitCode::FAILURE
        }
    }
}
