//! Signing and finalization of P2WPKH inputs.

use lwk_wollet::elements::bitcoin::PublicKey;
use lwk_wollet::elements::encode::serialize_hex;
use lwk_wollet::elements::hashes::{Hash, hash160};
use lwk_wollet::elements::opcodes::all::{OP_CHECKSIG, OP_DUP, OP_EQUALVERIFY, OP_HASH160};
use lwk_wollet::elements::pset::PartiallySignedTransaction;
use lwk_wollet::elements::script::Builder;
use lwk_wollet::elements::secp256k1_zkp::{self, Message, ecdsa};
use lwk_wollet::elements::sighash::SighashCache;
use lwk_wollet::elements::{EcdsaSighashType, Script, Transaction};

use crate::error::{Error, Result};
use crate::holder::p2wpkh_script;
use crate::pset::{decode_pset, encode_pset};

/// Signing capability over a single P2WPKH key.
pub trait InputSigner {
    /// Output script owned by this signer; inputs declaring it get signed.
    fn script_pubkey(&self) -> &Script;

    fn public_key(&self) -> PublicKey;

    fn sign_ecdsa(&self, msg: &Message) -> ecdsa::Signature;
}

/// Sign every input whose witness UTXO script belongs to `signer`.
///
/// Each new signature is verified before moving on. Inputs owned by other
/// parties are left untouched.
pub fn sign<S: InputSigner + ?Sized>(pset_base64: &str, signer: &S) -> Result<String> {
    let mut pset = decode_pset(pset_base64)?;
    let unsigned = unsigned_tx(&pset)?;
    let public_key = signer.public_key();
    let script_code = p2pkh_script_code(&public_key);

    let mut signed = 0usize;
    for index in 0..pset.inputs().len() {
        let value = match &pset.inputs()[index].witness_utxo {
            Some(prevout) if prevout.script_pubkey == *signer.script_pubkey() => prevout.value,
            _ => {
                log::debug!("input {index} not owned by signer, skipping");
                continue;
            }
        };

        let msg = segwit_message(&unsigned, index, &script_code, value)?;
        let sig = signer.sign_ecdsa(&msg);
        let mut sig_bytes = sig.serialize_der().to_vec();
        sig_bytes.push(EcdsaSighashType::All as u8);

        pset.inputs_mut()[index]
            .partial_sigs
            .insert(public_key, sig_bytes);
        verify_input(&pset, &unsigned, index)?;
        signed += 1;
    }

    log::debug!("signed {signed} of {} inputs", pset.inputs().len());
    Ok(encode_pset(&pset))
}

/// Verify every input, build the final witnesses, and extract the
/// broadcastable transaction.
pub fn finalize_and_extract(pset_base64: &str) -> Result<Transaction> {
    let mut pset = decode_pset(pset_base64)?;
    let unsigned = unsigned_tx(&pset)?;

    for index in 0..pset.inputs().len() {
        verify_input(&pset, &unsigned, index)?;
    }

    for (index, input) in pset.inputs_mut().iter_mut().enumerate() {
        let (public_key, sig) = input
            .partial_sigs
            .iter()
            .next()
            .map(|(pk, sig)| (*pk, sig.clone()))
            .ok_or(Error::InvalidSignature(index))?;
        input.final_script_witness = Some(vec![sig, public_key.to_bytes()]);
        input.partial_sigs.clear();
    }

    pset.extract_tx()
        .map_err(|e| Error::MalformedTransaction(format!("extract: {e}")))
}

/// [`finalize_and_extract`] serialized as consensus hex, ready for broadcast.
pub fn to_hex(pset_base64: &str) -> Result<String> {
    finalize_and_extract(pset_base64).map(|tx| serialize_hex(&tx))
}

/// Check that input `index` carries at least one valid signature for the
/// key committed to by its witness UTXO.
fn verify_input(
    pset: &PartiallySignedTransaction,
    unsigned: &Transaction,
    index: usize,
) -> Result<()> {
    let input = &pset.inputs()[index];
    let prevout = input
        .witness_utxo
        .as_ref()
        .ok_or(Error::InvalidSignature(index))?;
    if input.partial_sigs.is_empty() {
        return Err(Error::InvalidSignature(index));
    }

    let secp = secp256k1_zkp::Secp256k1::verification_only();
    for (public_key, sig_bytes) in &input.partial_sigs {
        if p2wpkh_script(public_key) != prevout.script_pubkey {
            return Err(Error::InvalidSignature(index));
        }
        let (flag, der) = sig_bytes
            .split_last()
            .ok_or(Error::InvalidSignature(index))?;
        if *flag != EcdsaSighashType::All as u8 {
            return Err(Error::InvalidSignature(index));
        }
        let sig = ecdsa::Signature::from_der(der).map_err(|_| Error::InvalidSignature(index))?;
        let msg = segwit_message(
            unsigned,
            index,
            &p2pkh_script_code(public_key),
            prevout.value,
        )?;
        secp.verify_ecdsa(&msg, &sig, &public_key.inner)
            .map_err(|_| Error::InvalidSignature(index))?;
    }
    Ok(())
}

fn unsigned_tx(pset: &PartiallySignedTransaction) -> Result<Transaction> {
    pset.extract_tx()
        .map_err(|e| Error::MalformedTransaction(format!("extract: {e}")))
}

fn segwit_message(
    tx: &Transaction,
    index: usize,
    script_code: &Script,
    value: lwk_wollet::elements::confidential::Value,
) -> Result<Message> {
    let sighash = SighashCache::new(tx).segwitv0_sighash(
        index,
        script_code,
        value,
        EcdsaSighashType::All,
    );
    Message::from_digest_slice(sighash.as_byte_array())
        .map_err(|e| Error::MalformedTransaction(format!("sighash: {e}")))
}

/// BIP143 script code for a P2WPKH spend.
fn p2pkh_script_code(public_key: &PublicKey) -> Script {
    let hash = hash160::Hash::hash(&public_key.to_bytes());
    Builder::new()
        .push_opcode(OP_DUP)
        .push_opcode(OP_HASH160)
        .push_slice(hash.as_byte_array())
        .push_opcode(OP_EQUALVERIFY)
        .push_opcode(OP_CHECKSIG)
        .into_script()
}
