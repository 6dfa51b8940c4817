use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tokio::sync::watch;

use liquidex_lib::config::{FEE_WIF_ENV, MARKET_WIF_ENV};
use liquidex_lib::{
    DaemonConfig, DaemonError, FeeDepositAddressRequest, FundingWatcher, OperatorService,
    identity_from_env,
};
use liquidex_sdk::{ElectrumBackend, Network};
use liquidex_store::MarketStore;

#[derive(Parser, Debug)]
#[command(name = "liquidex-daemon", version, about = "Liquidex market-maker operator daemon")]
struct Args {
    /// Data directory holding liquidex.json and the market database.
    #[arg(long)]
    datadir: Option<PathBuf>,

    /// liquid, liquid-testnet or liquid-regtest. Overrides the config file.
    #[arg(long)]
    network: Option<Network>,

    /// Log level used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Run a single funding scan and exit.
    #[arg(long)]
    once: bool,
}

fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{level},electrum_client=warn,rustls=warn"))
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn default_datadir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".liquidex")
}

async fn run(args: Args) -> Result<(), DaemonError> {
    let datadir = args.datadir.unwrap_or_else(default_datadir);
    let config = DaemonConfig::load_or_init(&datadir, args.network)?;
    log::info!(
        "liquidex-daemon v{} on {} ({})",
        env!("CARGO_PKG_VERSION"),
        config.network,
        config.electrum_url()
    );
    log::info!(
        "base asset {}, market fee {} bps, fee rate {} sat/vbyte",
        config.base_asset(),
        config.market_fee,
        config.fee_rate()?.sat_per_vbyte()
    );

    let store_path = config.store_path();
    let store_path = store_path
        .to_str()
        .ok_or_else(|| DaemonError::Config(format!("non UTF-8 path {}", store_path.display())))?;
    let registry = Arc::new(Mutex::new(MarketStore::open(store_path)?));

    let market = identity_from_env(MARKET_WIF_ENV, config.network)?;
    let fee = identity_from_env(FEE_WIF_ENV, config.network)?;
    let service = OperatorService::new(market, fee, Arc::clone(&registry));
    log::info!(
        "fee deposit address {}",
        service.fee_deposit_address(FeeDepositAddressRequest {})?.address
    );
    log::info!("{} market(s) registered", service.market_addresses()?.len());

    let chain = Arc::new(ElectrumBackend::new(&config.electrum_url()));
    let watcher = FundingWatcher::new(
        chain,
        registry,
        &config.base_asset(),
        config.market_fee,
        config.poll_interval(),
    );

    if args.once {
        let funded = watcher.scan_once().await;
        log::info!("scan complete, {} market(s) became tradable", funded.len());
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("failed to listen for ctrl-c: {e}");
        }
        let _ = shutdown_tx.send(true);
    });
    watcher.run(shutdown_rx).await;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
