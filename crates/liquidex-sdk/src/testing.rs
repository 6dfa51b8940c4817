//! Fixtures shared by unit and integration tests.

use std::collections::HashMap;
use std::sync::Mutex;

use lwk_wollet::elements::hashes::Hash;
use lwk_wollet::elements::secp256k1_zkp::SecretKey;
use lwk_wollet::elements::{Transaction, Txid};

use crate::chain::ChainBackend;
use crate::error::{Error, Result};
use crate::holder::HolderIdentity;
use crate::network::Network;
use crate::pset::Utxo;
use crate::registry::{MarketRecord, MarketRegistry, MarketUpdate};

/// Liquid mainnet policy asset.
pub const LBTC: &str = "6f0279e9ed041c3d710a9f57d0c02928416460c4b722ae3457a11eec381c526d";
/// Tether USDt on Liquid mainnet.
pub const USDT: &str = "ce091c998b83c78bb71a632313ba3760f1763d9cfcffae02258ffa9865a37bd2";

pub fn test_txid(n: u8) -> Txid {
    Txid::from_byte_array([n; 32])
}

/// An explicit UTXO at `test_txid(n):0`.
pub fn test_utxo(n: u8, asset: &str, value: u64) -> Utxo {
    Utxo::new(test_txid(n), 0, asset, value)
}

/// A deterministic holder identity.
pub fn fixed_holder(network: Network) -> HolderIdentity {
    let secret_key = SecretKey::from_slice(&[0x11; 32]).expect("valid secret key");
    HolderIdentity::from_secret_key(secret_key, network)
}

/// Registry kept in memory. Timestamps are insertion sequence numbers.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    markets: Vec<MarketRecord>,
    fail: bool,
}

impl InMemoryRegistry {
    /// A registry whose every call fails.
    pub fn failing() -> Self {
        Self {
            markets: Vec::new(),
            fail: true,
        }
    }

    pub fn markets(&self) -> &[MarketRecord] {
        &self.markets
    }

    fn check(&self) -> std::result::Result<(), String> {
        if self.fail {
            Err("registry unavailable".into())
        } else {
            Ok(())
        }
    }
}

impl MarketRegistry for InMemoryRegistry {
    fn create_market(&mut self, address: &str) -> std::result::Result<(), String> {
        self.check()?;
        if self.markets.iter().any(|m| m.address == address) {
            return Ok(());
        }
        self.markets.push(MarketRecord {
            address: address.to_string(),
            base_asset: None,
            quote_asset: None,
            base_funding_tx: None,
            quote_funding_tx: None,
            fee: 0,
            tradable: false,
            created_at: format!("{:06}", self.markets.len()),
        });
        Ok(())
    }

    fn find_markets_sorted_by_timestamp(
        &mut self,
    ) -> std::result::Result<Vec<MarketRecord>, String> {
        self.check()?;
        Ok(self.markets.clone())
    }

    fn update_by_address(
        &mut self,
        address: &str,
        update: &MarketUpdate,
    ) -> std::result::Result<bool, String> {
        self.check()?;
        let Some(market) = self.markets.iter_mut().find(|m| m.address == address) else {
            return Ok(false);
        };
        market.base_asset = Some(update.base_asset.clone());
        market.quote_asset = Some(update.quote_asset.clone());
        market.base_funding_tx = Some(update.base_funding_tx.clone());
        market.quote_funding_tx = Some(update.quote_funding_tx.clone());
        market.fee = update.fee;
        market.tradable = update.tradable;
        Ok(true)
    }
}

/// Chain source serving canned unspents per address.
#[derive(Debug, Default)]
pub struct InMemoryChain {
    unspents: Mutex<HashMap<String, Vec<Utxo>>>,
    broadcasts: Mutex<Vec<Transaction>>,
}

impl InMemoryChain {
    pub fn fund(&self, address: &str, utxo: Utxo) {
        self.unspents
            .lock()
            .expect("chain lock")
            .entry(address.to_string())
            .or_default()
            .push(utxo);
    }

    pub fn broadcasts(&self) -> Vec<Transaction> {
        self.broadcasts.lock().expect("chain lock").clone()
    }
}

impl ChainBackend for InMemoryChain {
    fn list_unspents(&self, address: &str) -> Result<Vec<Utxo>> {
        Ok(self
            .unspents
            .lock()
            .expect("chain lock")
            .get(address)
            .cloned()
            .unwrap_or_default())
    }

    fn fetch_transaction(&self, txid: &Txid) -> Result<Transaction> {
        self.broadcasts
            .lock()
            .expect("chain lock")
            .iter()
            .find(|tx| tx.txid() == *txid)
            .cloned()
            .ok_or_else(|| Error::Query(format!("transaction {txid} not found")))
    }

    fn broadcast(&self, tx: &Transaction) -> Result<Txid> {
        self.broadcasts.lock().expect("chain lock").push(tx.clone());
        Ok(tx.txid())
    }
}
