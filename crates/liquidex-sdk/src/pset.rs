use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use lwk_wollet::elements::confidential::{Asset, Nonce, Value as ConfValue};
use lwk_wollet::elements::encode::{deserialize, serialize};
use lwk_wollet::elements::pset::{Input, Output, PartiallySignedTransaction};
use lwk_wollet::elements::{OutPoint, Script, Sequence, TxOut, TxOutWitness, Txid};

use crate::codec::{self, ASSET_TAG_LEN};
use crate::error::{Error, Result};

/// An unspent output offered to the builder by the chain indexer.
///
/// `asset` is the hex id in display order, lowercased on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    pub txid: Txid,
    pub vout: u32,
    pub asset: String,
    pub value: u64,
    pub script: Option<Script>,
}

impl Utxo {
    pub fn new(txid: Txid, vout: u32, asset: &str, value: u64) -> Self {
        Self {
            txid,
            vout,
            asset: asset.to_lowercase(),
            value,
            script: None,
        }
    }

    pub fn with_script(mut self, script: Script) -> Self {
        self.script = Some(script);
        self
    }

    pub fn outpoint(&self) -> OutPoint {
        OutPoint::new(self.txid, self.vout)
    }

    pub fn is_asset(&self, asset_hex: &str) -> bool {
        self.asset.eq_ignore_ascii_case(asset_hex)
    }
}

/// Create a new empty PSET v2.
pub(crate) fn new_pset() -> PartiallySignedTransaction {
    PartiallySignedTransaction::new_v2()
}

/// Parse a base64 PSET.
pub fn decode_pset(pset_base64: &str) -> Result<PartiallySignedTransaction> {
    let bytes = BASE64
        .decode(pset_base64.trim())
        .map_err(|e| Error::MalformedTransaction(format!("base64: {e}")))?;
    deserialize(&bytes).map_err(|e| Error::MalformedTransaction(e.to_string()))
}

/// Serialize a PSET to base64.
pub fn encode_pset(pset: &PartiallySignedTransaction) -> String {
    BASE64.encode(serialize(pset))
}

/// Build an explicit TxOut from already-encoded asset and value bytes.
pub(crate) fn explicit_txout(
    asset_tag: &[u8; ASSET_TAG_LEN],
    satoshis: u64,
    script_pubkey: &Script,
) -> Result<TxOut> {
    let value = codec::encode_value(satoshis)?;
    Ok(TxOut {
        asset: codec::tag_to_asset(asset_tag)?,
        value: codec::bytes_to_value(&value)?,
        nonce: Nonce::Null,
        script_pubkey: script_pubkey.clone(),
        witness: TxOutWitness::default(),
    })
}

/// Add an input spending `utxo`, declaring `script_pubkey` as its witness script.
pub(crate) fn add_pset_input(
    pset: &mut PartiallySignedTransaction,
    utxo: &Utxo,
    asset_tag: &[u8; ASSET_TAG_LEN],
    script_pubkey: &Script,
) -> Result<()> {
    let witness_utxo = explicit_txout(asset_tag, utxo.value, script_pubkey)?;
    let input = Input {
        previous_txid: utxo.txid,
        previous_output_index: utxo.vout,
        witness_utxo: Some(witness_utxo),
        sequence: Some(Sequence::ENABLE_LOCKTIME_NO_RBF),
        ..Default::default()
    };
    pset.add_input(input);
    Ok(())
}

/// Add an explicit output to a PSET. An empty script marks a fee output.
pub(crate) fn add_pset_output(
    pset: &mut PartiallySignedTransaction,
    asset_tag: &[u8; ASSET_TAG_LEN],
    satoshis: u64,
    script_pubkey: &Script,
) -> Result<()> {
    let txout = explicit_txout(asset_tag, satoshis, script_pubkey)?;
    let output = Output {
        amount: match txout.value {
            ConfValue::Explicit(v) => Some(v),
            _ => None,
        },
        asset: match txout.asset {
            Asset::Explicit(id) => Some(id),
            _ => None,
        },
        script_pubkey: txout.script_pubkey,
        ..Default::default()
    };
    pset.add_output(output);
    Ok(())
}
