//! Detection of funded market wallets.

use crate::pset::Utxo;
use crate::registry::{MarketRegistry, MarketUpdate};

/// Deposit addresses of every registered market, oldest first.
///
/// Registry failures are logged and yield an empty list.
pub fn market_addresses<R: MarketRegistry + ?Sized>(registry: &mut R) -> Vec<String> {
    match registry.find_markets_sorted_by_timestamp() {
        Ok(markets) => markets.into_iter().map(|m| m.address).collect(),
        Err(e) => {
            log::error!("failed to list markets: {e}");
            Vec::new()
        }
    }
}

/// Derive the registry update for a market wallet from its funding outputs.
///
/// Only the first two outputs are considered: one must be in `base_asset`
/// and the other in a different (quote) asset. Anything else means the
/// market is not funded yet.
pub fn funding_update(funding: &[Utxo], base_asset: &str, fee: u32) -> Option<MarketUpdate> {
    let [first, second, ..] = funding else {
        return None;
    };
    let (base, quote) = if first.is_asset(base_asset) {
        (first, second)
    } else {
        (second, first)
    };
    if !base.is_asset(base_asset) || quote.is_asset(base_asset) {
        return None;
    }

    Some(MarketUpdate {
        base_asset: base.asset.clone(),
        quote_asset: quote.asset.clone(),
        base_funding_tx: base.txid.to_string(),
        quote_funding_tx: quote.txid.to_string(),
        fee,
        tradable: true,
    })
}

/// Record a detected funding for the market at `address`.
///
/// Returns whether the registry applied it. Failures are logged, never
/// propagated.
pub fn record_funding<R: MarketRegistry + ?Sized>(
    registry: &mut R,
    address: &str,
    update: &MarketUpdate,
) -> bool {
    match registry.update_by_address(address, update) {
        Ok(true) => {
            log::info!(
                "new deposit for market {} on address {address}",
                update.quote_asset
            );
            true
        }
        Ok(false) => {
            log::warn!("no market registered for address {address}");
            false
        }
        Err(e) => {
            log::error!(
                "failed to record market {} on address {address}: {e}",
                update.quote_asset
            );
            false
        }
    }
}
