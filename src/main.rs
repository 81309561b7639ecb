//! NFT Minter - mint NFTs on an EVM chain with a single EIP-1559 transaction
//!
//! Prompts for a chain and a count, pays the on-chain mint price and polls
//! for the receipt until the transaction succeeds, fails or times out.

use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

mod chain;
mod config;
mod error;
mod mint;
mod prompt;
mod tx;
mod units;

use chain::{ChainProvider, L2PassContract};
use config::{ChainRegistry, Settings};
use error::{ErrorCategory, MinterError, MinterResult};
use mint::Minter;
use tx::{Account, Confirmation};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    init_logging();

    match run().await {
        Ok(Some(Confirmation::Success)) | Ok(None) => ExitCode::SUCCESS,
        Ok(Some(_)) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            report(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> MinterResult<Option<Confirmation>> {
    info!("Starting NFT Minter v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration, letting a local .env file fill in unset variables
    dotenvy::dotenv().ok();
    let settings = Settings::load()?;
    let registry = ChainRegistry::load(&settings.chains_file)?;
    info!("Loaded {} chains from {:?}", registry.names().len(), settings.chains_file);

    let (chain, count) = {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        let chain = prompt::select_chain(&registry, &mut input, &mut output)?.clone();
        let count = prompt::read_mint_count(&mut input, &mut output)?;
        (chain, count)
    };

    let account = Account::from_secret(settings.private_key.as_deref())?;
    info!("Minting from {}", account.checksum_address());

    let provider = ChainProvider::new(chain.clone(), settings.proxy.as_deref())?;
    let contract = L2PassContract::load(
        &settings.abi_file,
        settings.contract_address,
        provider.http(),
    )?;
    info!("Using contract {:?} on {}", contract.address(), chain.name);

    let spend_limit = settings
        .max_spend
        .map(|amount| units::to_base_units(amount, units::ETHER_DECIMALS))
        .transpose()?;

    let minter = Minter::new(
        Arc::new(provider),
        Arc::new(contract),
        account,
        chain,
        settings.poll,
    )
    .with_spend_limit(spend_limit);

    let report = minter.mint(count).await?;
    Ok(report.map(|r| r.confirmation))
}

/// Print the failure line for the operator
fn report(err: &MinterError) {
    match err.category() {
        ErrorCategory::Rpc => println!("RPC error: {}", err),
        ErrorCategory::MissingFile => println!("File is not found: {}", err),
        ErrorCategory::Other => println!("Something went wrong: {}", err),
    }
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,nft_minter=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(io::stderr))
        .init();
}
