use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use liquidex_sdk::{FeeRate, HolderIdentity, Network, encode_asset};

use crate::error::{DaemonError, Result};

pub const CONFIG_FILE: &str = "liquidex.json";
pub const STORE_FILE: &str = "markets.db";

pub const MARKET_WIF_ENV: &str = "LIQUIDEX_MARKET_WIF";
pub const FEE_WIF_ENV: &str = "LIQUIDEX_FEE_WIF";

const DEFAULT_MARKET_FEE: u32 = 25;
const DEFAULT_FEE_RATE: f64 = 0.1;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Operator settings, persisted as `liquidex.json` in the data directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaemonConfig {
    #[serde(default)]
    pub network: Network,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub electrum_url: Option<String>,
    #[serde(default)]
    pub datadir: PathBuf,
    /// Hex asset id every market is quoted against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_asset: Option<String>,
    /// Market fee in basis points.
    #[serde(default = "default_market_fee")]
    pub market_fee: u32,
    /// Sat/vbyte.
    #[serde(default = "default_fee_rate")]
    pub fee_rate: f64,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

fn default_market_fee() -> u32 {
    DEFAULT_MARKET_FEE
}

fn default_fee_rate() -> f64 {
    DEFAULT_FEE_RATE
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

impl DaemonConfig {
    pub fn defaults(network: Network, datadir: &Path) -> Self {
        Self {
            network,
            electrum_url: Some(network.default_electrum_url().to_string()),
            datadir: datadir.to_path_buf(),
            base_asset: Some(network.fee_asset()),
            market_fee: DEFAULT_MARKET_FEE,
            fee_rate: DEFAULT_FEE_RATE,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }

    /// Load `liquidex.json` from `datadir`, writing defaults on first run.
    ///
    /// A `network` given on the command line overrides the file.
    pub fn load_or_init(datadir: &Path, network: Option<Network>) -> Result<Self> {
        let path = datadir.join(CONFIG_FILE);
        let mut config = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let mut config: DaemonConfig = serde_json::from_str(&contents)?;
            config.datadir = datadir.to_path_buf();
            config
        } else {
            let config = Self::defaults(network.unwrap_or_default(), datadir);
            fs::create_dir_all(datadir)?;
            fs::write(&path, serde_json::to_string_pretty(&config)?)?;
            log::info!("wrote default config to {}", path.display());
            config
        };
        if let Some(network) = network {
            if network != config.network {
                config.network = network;
                config.electrum_url = None;
                config.base_asset = None;
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        encode_asset(&self.base_asset())
            .map_err(|e| DaemonError::Config(format!("baseAsset: {e}")))?;
        self.fee_rate()?;
        if self.poll_interval_secs == 0 {
            return Err(DaemonError::Config("pollIntervalSecs must be positive".into()));
        }
        if self.market_fee > 10_000 {
            return Err(DaemonError::Config(format!(
                "marketFee {} exceeds 10000 basis points",
                self.market_fee
            )));
        }
        Ok(())
    }

    pub fn electrum_url(&self) -> String {
        self.electrum_url
            .clone()
            .unwrap_or_else(|| self.network.default_electrum_url().to_string())
    }

    pub fn base_asset(&self) -> String {
        self.base_asset
            .as_ref()
            .map(|a| a.to_lowercase())
            .unwrap_or_else(|| self.network.fee_asset())
    }

    pub fn fee_rate(&self) -> Result<FeeRate> {
        FeeRate::from_sat_per_vbyte(self.fee_rate)
            .map_err(|e| DaemonError::Config(format!("feeRate: {e}")))
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.poll_interval_secs)
    }

    pub fn store_path(&self) -> PathBuf {
        self.datadir.join(STORE_FILE)
    }
}

/// Recover a holder identity from the WIF in `var`, or generate an
/// ephemeral one if the variable is unset.
pub fn identity_from_env(var: &str, network: Network) -> Result<HolderIdentity> {
    match std::env::var(var) {
        Ok(wif) => {
            let wif = Zeroizing::new(wif);
            Ok(HolderIdentity::from_wif(&wif, network)?)
        }
        Err(_) => {
            log::warn!("{var} not set, using an ephemeral key; funds sent to it are lost on exit");
            Ok(HolderIdentity::random(network))
        }
    }
}
