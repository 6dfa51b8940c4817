//! `FundingWatcher`: polls market wallets until they are funded.
//!
//! Chain lookups are blocking Electrum calls, so every scan runs on the
//! tokio blocking pool. The registry lock is held only while reading the
//! market list and while recording a single update.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;

use liquidex_sdk::{ChainBackend, MarketRegistry, MarketUpdate, funding_update, record_funding};

pub struct FundingWatcher<B, R> {
    chain: Arc<B>,
    registry: Arc<Mutex<R>>,
    base_asset: String,
    fee: u32,
    poll_interval: Duration,
}

impl<B, R> FundingWatcher<B, R>
where
    B: ChainBackend + Send + Sync + 'static,
    R: MarketRegistry,
{
    pub fn new(
        chain: Arc<B>,
        registry: Arc<Mutex<R>>,
        base_asset: &str,
        fee: u32,
        poll_interval: Duration,
    ) -> Self {
        Self {
            chain,
            registry,
            base_asset: base_asset.to_lowercase(),
            fee,
            poll_interval,
        }
    }

    /// Scan every market not yet tradable and record the ones now funded.
    ///
    /// Returns `(address, update)` for each market recorded in this pass.
    pub async fn scan_once(&self) -> Vec<(String, MarketUpdate)> {
        let chain = Arc::clone(&self.chain);
        let registry = Arc::clone(&self.registry);
        let base_asset = self.base_asset.clone();
        let fee = self.fee;

        match tokio::task::spawn_blocking(move || {
            scan_blocking(chain.as_ref(), registry.as_ref(), &base_asset, fee)
        })
        .await
        {
            Ok(funded) => funded,
            Err(e) => {
                log::error!("funding scan task failed: {e}");
                Vec::new()
            }
        }
    }

    /// Scan on every poll interval until `shutdown` flips to `true` or its
    /// sender is dropped.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        log::info!(
            "funding watcher started, polling every {}s",
            self.poll_interval.as_secs()
        );
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let funded = self.scan_once().await;
                    if !funded.is_empty() {
                        log::info!("{} market(s) became tradable", funded.len());
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        log::info!("funding watcher stopped");
    }
}

fn scan_blocking<B, R>(
    chain: &B,
    registry: &Mutex<R>,
    base_asset: &str,
    fee: u32,
) -> Vec<(String, MarketUpdate)>
where
    B: ChainBackend + ?Sized,
    R: MarketRegistry,
{
    let markets = match registry.lock() {
        Ok(mut registry) => registry.find_markets_sorted_by_timestamp(),
        Err(_) => Err("failed to lock registry".to_string()),
    };
    let markets = match markets {
        Ok(markets) => markets,
        Err(e) => {
            log::error!("cannot fetch markets from registry: {e}");
            return Vec::new();
        }
    };

    let mut funded = Vec::new();
    for market in markets.into_iter().filter(|m| !m.tradable) {
        let utxos = match chain.list_unspents(&market.address) {
            Ok(utxos) => utxos,
            Err(e) => {
                log::warn!("failed to list unspents for {}: {e}", market.address);
                continue;
            }
        };
        let Some(update) = funding_update(&utxos, base_asset, fee) else {
            log::debug!("market {} not funded yet", market.address);
            continue;
        };

        let recorded = match registry.lock() {
            Ok(mut registry) => record_funding(&mut *registry, &market.address, &update),
            Err(_) => {
                log::error!("failed to lock registry for {}", market.address);
                false
            }
        };
        if recorded {
            funded.push((market.address, update));
        }
    }
    funded
}
