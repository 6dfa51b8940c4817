//! End-to-end swap construction: swap legs, fee leg, signatures from both
//! parties, then finalization and broadcast against an in-memory chain.

use liquidex_sdk::elements::confidential::Value as ConfValue;
use liquidex_sdk::testing::{InMemoryChain, LBTC, USDT, fixed_holder, test_utxo};
use liquidex_sdk::{
    ChainBackend, Error, FeeRate, HolderIdentity, Network, TxBuilder, decode_pset,
    finalize_and_extract, to_hex,
};

// ── Helpers ─────────────────────────────────────────────────────────────

struct Swap {
    maker: HolderIdentity,
    taker: HolderIdentity,
    pset: String,
    fee: u64,
}

/// Taker sells 150k USDt for 100k L-BTC, maker pays out L-BTC, taker pays fees.
fn build_swap() -> Swap {
    let maker = fixed_holder(Network::Liquid);
    let taker = HolderIdentity::random(Network::Liquid);
    let builder = TxBuilder::new(Network::Liquid);

    let taker_leg = builder
        .update_tx(
            &builder.create_empty(),
            &[test_utxo(1, USDT, 200_000)],
            150_000,
            100_000,
            USDT,
            LBTC,
            taker.script_pubkey(),
        )
        .unwrap();
    let maker_leg = builder
        .update_tx(
            &taker_leg.pset,
            &[test_utxo(2, LBTC, 60_000), test_utxo(3, LBTC, 60_000)],
            100_000,
            150_000,
            LBTC,
            USDT,
            maker.script_pubkey(),
        )
        .unwrap();
    let fee_leg = builder
        .pay_fees(
            &maker_leg.pset,
            &[test_utxo(4, USDT, 1_000_000), test_utxo(5, LBTC, 5_000)],
            taker.script_pubkey(),
            FeeRate::from_sat_per_vbyte(0.1).unwrap(),
        )
        .unwrap();

    Swap {
        maker,
        taker,
        pset: fee_leg.pset,
        fee: fee_leg.fee.fee,
    }
}

// ── Tests ───────────────────────────────────────────────────────────────

#[test]
fn legs_append_in_order() {
    let swap = build_swap();
    let pset = decode_pset(&swap.pset).unwrap();

    // taker 1 + maker 2 + fee 1
    assert_eq!(pset.inputs().len(), 4);
    // taker dest + change, maker dest + change, fee + change
    assert_eq!(pset.outputs().len(), 6);

    let amounts: Vec<_> = pset.outputs().iter().map(|o| o.amount.unwrap()).collect();
    assert_eq!(amounts[..4], [100_000u64, 50_000, 150_000, 20_000]);
    assert_eq!(amounts[4], swap.fee);
    assert_eq!(amounts[5], 5_000 - swap.fee);
    assert!(pset.outputs()[4].script_pubkey.is_empty());
}

#[test]
fn both_parties_sign_then_finalize() {
    let swap = build_swap();
    let signed = swap.taker.sign(&swap.pset).unwrap();
    let signed = swap.maker.sign(&signed).unwrap();

    let pset = decode_pset(&signed).unwrap();
    assert!(pset.inputs().iter().all(|i| i.partial_sigs.len() == 1));

    let tx = finalize_and_extract(&signed).unwrap();
    assert_eq!(tx.input.len(), 4);
    assert!(tx.input.iter().all(|i| i.witness.script_witness.len() == 2));
    assert!(tx.output[4].is_fee());
    assert_eq!(tx.output[4].value, ConfValue::Explicit(swap.fee));

    let chain = InMemoryChain::default();
    let txid = chain.broadcast(&tx).unwrap();
    assert_eq!(chain.fetch_transaction(&txid).unwrap(), tx);
    assert_eq!(to_hex(&signed).unwrap().len() % 2, 0);
}

#[test]
fn missing_counterparty_signature_blocks_finalize() {
    let swap = build_swap();
    let taker_only = swap.taker.sign(&swap.pset).unwrap();
    // maker inputs sit at indices 1 and 2
    assert!(matches!(
        finalize_and_extract(&taker_only),
        Err(Error::InvalidSignature(1))
    ));
}

#[test]
fn stranger_cannot_complete_swap() {
    let swap = build_swap();
    let stranger = HolderIdentity::random(Network::Liquid);
    let signed = stranger.sign(&swap.pset).unwrap();
    assert_eq!(signed, swap.pset);
    assert!(matches!(
        finalize_and_extract(&signed),
        Err(Error::InvalidSignature(0))
    ));
}
