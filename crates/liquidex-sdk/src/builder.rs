use lwk_wollet::elements::Script;

use crate::codec::encode_asset;
use crate::coin_select::select;
use crate::error::{Error, Result};
use crate::fee::{FeeQuote, FeeRate, estimate_fee};
use crate::network::Network;
use crate::pset::{Utxo, add_pset_input, add_pset_output, decode_pset, encode_pset, new_pset};

/// Result of adding a swap leg.
#[derive(Debug, Clone)]
pub struct SwapLegResult {
    /// The updated PSET, base64 encoded.
    pub pset: String,
    /// Candidates consumed as new inputs, in input order.
    pub selected: Vec<Utxo>,
    pub change: u64,
}

/// Result of adding the fee leg.
#[derive(Debug, Clone)]
pub struct FeeLegResult {
    pub pset: String,
    pub selected: Vec<Utxo>,
    pub fee: FeeQuote,
    pub change: u64,
}

/// Appends funded legs to a PSET for one network.
///
/// Every call decodes its own copy of the PSET and returns a new encoding;
/// on error the caller still holds its untouched input. Legs are appended,
/// never replaced, so each step should run once per transaction.
#[derive(Debug, Clone, Copy)]
pub struct TxBuilder {
    network: Network,
}

impl TxBuilder {
    pub fn new(network: Network) -> Self {
        Self { network }
    }

    /// A new empty PSET, base64 encoded.
    pub fn create_empty(&self) -> String {
        create_empty(self.network)
    }

    /// Add a swap leg: inputs covering `input_amount` of `input_asset`, one
    /// output of `output_amount` in `output_asset`, then change if any.
    ///
    /// Outputs: `[.., destination, change?]`.
    #[allow(clippy::too_many_arguments)]
    pub fn update_tx(
        &self,
        pset_base64: &str,
        candidates: &[Utxo],
        input_amount: u64,
        output_amount: u64,
        input_asset: &str,
        output_asset: &str,
        holder_script: &Script,
    ) -> Result<SwapLegResult> {
        if candidates.is_empty() {
            return Err(Error::NoCandidates("swap"));
        }
        let mut pset = decode_pset(pset_base64)?;

        let input_tag = encode_asset(input_asset)?;
        let output_tag = encode_asset(output_asset)?;
        let selection = select(candidates, input_amount, Some(input_asset))?;

        for utxo in &selection.selected {
            add_pset_input(&mut pset, utxo, &input_tag, holder_script)?;
        }
        add_pset_output(&mut pset, &output_tag, output_amount, holder_script)?;
        if selection.change > 0 {
            add_pset_output(&mut pset, &input_tag, selection.change, holder_script)?;
        }

        log::debug!(
            "swap leg: {} input(s) for {input_amount}, paying {output_amount}, change {}",
            selection.selected.len(),
            selection.change
        );

        Ok(SwapLegResult {
            pset: encode_pset(&pset),
            selected: selection.selected,
            change: selection.change,
        })
    }

    /// Add the fee leg, paid in the network fee asset.
    ///
    /// The fee is quoted for the current shape plus one input and two
    /// outputs (fee and change). It is not re-quoted if more than one fee
    /// input ends up selected.
    ///
    /// Outputs: `[.., fee, change?]`.
    pub fn pay_fees(
        &self,
        pset_base64: &str,
        candidates: &[Utxo],
        holder_script: &Script,
        fee_rate: FeeRate,
    ) -> Result<FeeLegResult> {
        if candidates.is_empty() {
            return Err(Error::NoCandidates("fees"));
        }
        let mut pset = decode_pset(pset_base64)?;

        let quote = estimate_fee(pset.inputs().len() + 1, pset.outputs().len() + 2, fee_rate);
        let fee_asset = self.network.fee_asset();
        let fee_tag = encode_asset(&fee_asset)?;
        let selection = select(candidates, quote.fee, Some(&fee_asset))?;

        for utxo in &selection.selected {
            add_pset_input(&mut pset, utxo, &fee_tag, holder_script)?;
        }
        add_pset_output(&mut pset, &fee_tag, quote.fee, &Script::new())?;
        if selection.change > 0 {
            add_pset_output(&mut pset, &fee_tag, selection.change, holder_script)?;
        }

        log::debug!(
            "fee leg: {} sat for {} vbytes at {} sat/kvb, {} input(s)",
            quote.fee,
            quote.vsize,
            fee_rate.sat_per_kvb(),
            selection.selected.len()
        );

        Ok(FeeLegResult {
            pset: encode_pset(&pset),
            selected: selection.selected,
            fee: quote,
            change: selection.change,
        })
    }
}

/// A new empty PSET for `network`, base64 encoded.
///
/// PSET v2 carries no network tag; the network only fixes the fee asset and
/// address version used by the builder and holder.
pub fn create_empty(network: Network) -> String {
    log::trace!("new empty pset for {network}");
    encode_pset(&new_pset())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_value;
    use crate::fee::estimate;
    use crate::testing::{LBTC, USDT, fixed_holder, test_utxo};
    use lwk_wollet::elements::confidential::Value as ConfValue;

    fn builder() -> TxBuilder {
        TxBuilder::new(Network::Liquid)
    }

    #[test]
    fn swap_leg_orders_destination_then_change() {
        let holder = fixed_holder(Network::Liquid);
        let b = builder();
        let utxos = vec![test_utxo(1, USDT, 150_000)];

        let res = b
            .update_tx(
                &b.create_empty(),
                &utxos,
                100_000,
                100_000,
                USDT,
                LBTC,
                holder.script_pubkey(),
            )
            .unwrap();

        assert_eq!(res.selected, utxos);
        assert_eq!(res.change, 50_000);

        let pset = decode_pset(&res.pset).unwrap();
        assert_eq!(pset.inputs().len(), 1);
        assert_eq!(pset.outputs().len(), 2);

        let dest = &pset.outputs()[0];
        assert_eq!(dest.amount, Some(100_000));
        assert_eq!(dest.asset.unwrap().to_string(), LBTC);
        assert_eq!(dest.script_pubkey, *holder.script_pubkey());

        let change = &pset.outputs()[1];
        assert_eq!(change.amount, Some(50_000));
        assert_eq!(change.asset.unwrap().to_string(), USDT);
        assert_eq!(change.script_pubkey, *holder.script_pubkey());

        let prevout = pset.inputs()[0].witness_utxo.as_ref().unwrap();
        assert_eq!(prevout.value, ConfValue::Explicit(150_000));
        assert_eq!(prevout.script_pubkey, *holder.script_pubkey());
    }

    #[test]
    fn exact_amount_has_no_change_output() {
        let holder = fixed_holder(Network::Liquid);
        let b = builder();
        let utxos = vec![test_utxo(1, USDT, 40_000), test_utxo(2, USDT, 60_000)];
        let res = b
            .update_tx(
                &b.create_empty(),
                &utxos,
                100_000,
                3_000,
                USDT,
                LBTC,
                holder.script_pubkey(),
            )
            .unwrap();
        let pset = decode_pset(&res.pset).unwrap();
        assert_eq!(pset.inputs().len(), 2);
        assert_eq!(pset.outputs().len(), 1);
        assert_eq!(res.change, 0);
    }

    #[test]
    fn swap_leg_ignores_other_assets() {
        let holder = fixed_holder(Network::Liquid);
        let b = builder();
        let utxos = vec![test_utxo(1, LBTC, 1_000_000), test_utxo(2, USDT, 500)];
        let err = b
            .update_tx(
                &b.create_empty(),
                &utxos,
                1_000,
                1_000,
                USDT,
                LBTC,
                holder.script_pubkey(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientFunds { needed: 1_000, available: 500 }));
    }

    #[test]
    fn swap_leg_errors() {
        let holder = fixed_holder(Network::Liquid);
        let b = builder();
        let spk = holder.script_pubkey();
        assert!(matches!(
            b.update_tx(&b.create_empty(), &[], 1, 1, USDT, LBTC, spk),
            Err(Error::NoCandidates(_))
        ));
        let utxos = vec![test_utxo(1, USDT, 10)];
        assert!(matches!(
            b.update_tx("garbage", &utxos, 1, 1, USDT, LBTC, spk),
            Err(Error::MalformedTransaction(_))
        ));
        assert!(matches!(
            b.update_tx(&b.create_empty(), &utxos, 1, 1, "beef", LBTC, spk),
            Err(Error::MalformedAsset(_))
        ));
    }

    #[test]
    fn fee_leg_reserves_one_input_two_outputs() {
        let holder = fixed_holder(Network::Liquid);
        let b = builder();
        let swap = b
            .update_tx(
                &b.create_empty(),
                &[test_utxo(1, USDT, 150_000)],
                100_000,
                100_000,
                USDT,
                LBTC,
                holder.script_pubkey(),
            )
            .unwrap();

        let rate = FeeRate::from_sat_per_vbyte(0.2).unwrap();
        let fee_utxos = vec![test_utxo(9, LBTC, 1_000)];
        let res = b
            .pay_fees(&swap.pset, &fee_utxos, holder.script_pubkey(), rate)
            .unwrap();

        assert_eq!(res.fee, estimate(2, 4, 0.2).unwrap());
        assert_eq!(res.change, 1_000 - res.fee.fee);

        let pset = decode_pset(&res.pset).unwrap();
        assert_eq!(pset.inputs().len(), 2);
        assert_eq!(pset.outputs().len(), 4);

        let fee_out = &pset.outputs()[2];
        assert!(fee_out.script_pubkey.is_empty());
        assert_eq!(fee_out.amount, Some(res.fee.fee));
        assert_eq!(fee_out.asset.unwrap().to_string(), LBTC);

        let change = &pset.outputs()[3];
        assert_eq!(change.amount, Some(res.change));
        assert_eq!(change.script_pubkey, *holder.script_pubkey());
    }

    #[test]
    fn fee_leg_takes_several_small_inputs_in_order() {
        let holder = fixed_holder(Network::Liquid);
        let b = builder();
        let swap = b
            .update_tx(
                &b.create_empty(),
                &[test_utxo(1, USDT, 150_000)],
                100_000,
                100_000,
                USDT,
                LBTC,
                holder.script_pubkey(),
            )
            .unwrap();

        // quote is 84 sat, no single L-BTC candidate covers it
        let rate = FeeRate::from_sat_per_vbyte(0.2).unwrap();
        let fee_utxos = vec![
            test_utxo(2, LBTC, 30),
            test_utxo(3, USDT, 1_000_000),
            test_utxo(4, LBTC, 40),
            test_utxo(5, LBTC, 50),
            test_utxo(6, LBTC, 1_000),
        ];
        let res = b
            .pay_fees(&swap.pset, &fee_utxos, holder.script_pubkey(), rate)
            .unwrap();

        assert_eq!(res.fee, estimate(2, 4, 0.2).unwrap());
        assert_eq!(res.fee.fee, 84);
        assert_eq!(
            res.selected,
            vec![fee_utxos[0].clone(), fee_utxos[2].clone(), fee_utxos[3].clone()]
        );
        let total: u64 = res.selected.iter().map(|u| u.value).sum();
        assert_eq!(res.change, total - res.fee.fee);
        assert_eq!(res.change, 36);

        let pset = decode_pset(&res.pset).unwrap();
        assert_eq!(pset.inputs().len(), 4);
        let appended: Vec<_> = pset.inputs()[1..]
            .iter()
            .map(|i| i.previous_txid)
            .collect();
        assert_eq!(appended, res.selected.iter().map(|u| u.txid).collect::<Vec<_>>());

        assert_eq!(pset.outputs().len(), 4);
        assert_eq!(pset.outputs()[2].amount, Some(84));
        assert!(pset.outputs()[2].script_pubkey.is_empty());
        assert_eq!(pset.outputs()[3].amount, Some(36));
    }

    #[test]
    fn fee_leg_skips_non_fee_assets() {
        let holder = fixed_holder(Network::Liquid);
        let b = builder();
        let rate = FeeRate::from_sat_per_vbyte(0.1).unwrap();
        let quote = estimate_fee(1, 2, rate);
        let utxos = vec![test_utxo(1, USDT, 1_000_000), test_utxo(2, LBTC, quote.fee)];
        let res = b
            .pay_fees(&b.create_empty(), &utxos, holder.script_pubkey(), rate)
            .unwrap();
        assert_eq!(res.selected, vec![utxos[1].clone()]);
        assert_eq!(res.change, 0);
        let pset = decode_pset(&res.pset).unwrap();
        assert_eq!(pset.outputs().len(), 1);
        let fee_prevout = pset.inputs()[0].witness_utxo.as_ref().unwrap();
        assert_eq!(
            decode_value(&lwk_wollet::elements::encode::serialize(&fee_prevout.value)).unwrap(),
            quote.fee
        );
    }

    #[test]
    fn fee_leg_errors() {
        let holder = fixed_holder(Network::Liquid);
        let b = builder();
        let rate = FeeRate::from_sat_per_vbyte(0.1).unwrap();
        assert!(matches!(
            b.pay_fees(&b.create_empty(), &[], holder.script_pubkey(), rate),
            Err(Error::NoCandidates(_))
        ));
        let dust = vec![test_utxo(1, LBTC, 1)];
        assert!(matches!(
            b.pay_fees(&b.create_empty(), &dust, holder.script_pubkey(), rate),
            Err(Error::InsufficientFunds { .. })
        ));
    }

    #[test]
    fn input_pset_is_not_mutated() {
        let holder = fixed_holder(Network::Liquid);
        let b = builder();
        let base = b.create_empty();
        let utxos = vec![test_utxo(1, USDT, 150_000)];
        let first = b
            .update_tx(&base, &utxos, 100_000, 1, USDT, LBTC, holder.script_pubkey())
            .unwrap();
        let second = b
            .update_tx(&base, &utxos, 100_000, 1, USDT, LBTC, holder.script_pubkey())
            .unwrap();
        assert_eq!(first.pset, second.pset);
        assert!(decode_pset(&base).unwrap().inputs().is_empty());
    }
}
