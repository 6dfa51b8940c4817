use std::str::FromStr;

use lwk_wollet::elements::confidential::{Asset, Value as ConfValue};
use lwk_wollet::elements::{Address, Script, Transaction, Txid};

use crate::error::{Error, Result};
use crate::pset::Utxo;

/// Source of unspent outputs and transaction relay for Liquid.
pub trait ChainBackend {
    /// Explicit unspent outputs paying to `address`.
    fn list_unspents(&self, address: &str) -> Result<Vec<Utxo>>;

    fn fetch_transaction(&self, txid: &Txid) -> Result<Transaction>;

    /// Broadcast a signed transaction and return its txid.
    fn broadcast(&self, tx: &Transaction) -> Result<Txid>;
}

/// Electrum-based chain backend for Liquid.
pub struct ElectrumBackend {
    electrum_url: String,
}

impl ElectrumBackend {
    pub fn new(electrum_url: &str) -> Self {
        Self {
            electrum_url: electrum_url.to_string(),
        }
    }

    pub fn electrum_url(&self) -> &str {
        &self.electrum_url
    }

    fn lwk_client(&self) -> Result<lwk_wollet::ElectrumClient> {
        let url: lwk_wollet::ElectrumUrl = self
            .electrum_url
            .parse()
            .map_err(|e| Error::Electrum(format!("{:?}", e)))?;
        lwk_wollet::ElectrumClient::new(&url).map_err(|e| Error::Electrum(e.to_string()))
    }
}

impl ChainBackend for ElectrumBackend {
    fn list_unspents(&self, address: &str) -> Result<Vec<Utxo>> {
        use electrum_client::ElectrumApi;

        let script_pubkey = Address::from_str(address)
            .map_err(|e| Error::InvalidAddress(format!("{address}: {e}")))?
            .script_pubkey();

        let client = electrum_client::Client::new(&self.electrum_url)
            .map_err(|e| Error::Electrum(e.to_string()))?;
        let resp = client
            .raw_call(
                "blockchain.scripthash.listunspent",
                [electrum_client::Param::String(script_hash_hex(&script_pubkey))],
            )
            .map_err(|e| Error::Electrum(e.to_string()))?;

        let entries = resp
            .as_array()
            .ok_or_else(|| Error::Query("expected array response".into()))?;

        let mut utxos = Vec::new();
        for entry in entries {
            let tx_hash_hex = entry["tx_hash"]
                .as_str()
                .ok_or_else(|| Error::Query("missing tx_hash".into()))?;
            let tx_pos = entry["tx_pos"]
                .as_u64()
                .ok_or_else(|| Error::Query("missing tx_pos".into()))?;
            let vout =
                u32::try_from(tx_pos).map_err(|_| Error::Query(format!("bad tx_pos {tx_pos}")))?;

            let txid: Txid = tx_hash_hex
                .parse()
                .map_err(|e| Error::Query(format!("bad tx_hash: {e}")))?;

            let tx = self.fetch_transaction(&txid)?;
            let txout = tx
                .output
                .get(vout as usize)
                .ok_or_else(|| Error::Query("vout out of range".into()))?;

            match (txout.asset, txout.value) {
                (Asset::Explicit(asset), ConfValue::Explicit(value)) => {
                    utxos.push(
                        Utxo::new(txid, vout, &asset.to_string(), value)
                            .with_script(txout.script_pubkey.clone()),
                    );
                }
                _ => log::debug!("skipping blinded output {txid}:{vout}"),
            }
        }
        Ok(utxos)
    }

    fn fetch_transaction(&self, txid: &Txid) -> Result<Transaction> {
        use lwk_wollet::blocking::BlockchainBackend;

        let client = self.lwk_client()?;
        let txs = client
            .get_transactions(&[*txid])
            .map_err(|e| Error::Electrum(e.to_string()))?;
        txs.into_iter()
            .next()
            .ok_or_else(|| Error::Query(format!("transaction {} not found", txid)))
    }

    fn broadcast(&self, tx: &Transaction) -> Result<Txid> {
        use lwk_wollet::blocking::BlockchainBackend;

        let client = self.lwk_client()?;
        client
            .broadcast(tx)
            .map_err(|e| Error::Broadcast(e.to_string()))
    }
}

/// Electrum script hash: SHA256 of the script with reversed byte order.
fn script_hash_hex(script_pubkey: &Script) -> String {
    use sha2::{Digest, Sha256};

    let mut hash = Sha256::digest(script_pubkey.as_bytes()).to_vec();
    hash.reverse();
    hex::encode(hash)
}
