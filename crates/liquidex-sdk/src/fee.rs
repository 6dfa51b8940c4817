//! Fee estimation for explicit single-sig swap transactions.
//!
//! Sizes are virtual bytes of a segwit Elements transaction whose inputs are
//! P2WPKH spends and whose outputs are explicit (no range or surjection
//! proofs).

use crate::error::{Error, Result};

/// Version, locktime, segwit flag and the two count varints.
pub const TX_OVERHEAD_VBYTES: u64 = 11;
/// Outpoint, sequence, empty script_sig plus the discounted witness stack.
pub const INPUT_VBYTES: u64 = 69;
/// Explicit asset (33), explicit value (9), null nonce, P2WPKH script.
pub const OUTPUT_VBYTES: u64 = 67;

/// A fee rate, stored in satoshis per 1000 virtual bytes so that fee
/// arithmetic stays integral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeeRate {
    sat_per_kvb: u64,
}

impl FeeRate {
    pub fn from_sat_per_kvb(sat_per_kvb: u64) -> Result<Self> {
        if sat_per_kvb == 0 {
            return Err(Error::InvalidFeeRate("fee rate must be positive".into()));
        }
        Ok(Self { sat_per_kvb })
    }

    /// Build from a (possibly fractional) sat/vbyte rate such as `0.1`.
    ///
    /// Rounds up to the next whole sat/kvB, so any positive rate is at
    /// least 1 sat/kvB.
    pub fn from_sat_per_vbyte(rate: f64) -> Result<Self> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(Error::InvalidFeeRate(format!("{rate} sat/vbyte")));
        }
        // absorb float noise such as 1.1 * 1000 = 1100.0000000000002
        let kvb = (rate * 1000.0 - 1e-6).ceil().max(1.0);
        if kvb > u64::MAX as f64 {
            return Err(Error::InvalidFeeRate(format!("{rate} sat/vbyte")));
        }
        Self::from_sat_per_kvb(kvb as u64)
    }

    pub fn sat_per_kvb(self) -> u64 {
        self.sat_per_kvb
    }

    pub fn sat_per_vbyte(self) -> f64 {
        self.sat_per_kvb as f64 / 1000.0
    }
}

/// Fee required for a transaction, in the network fee asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeQuote {
    pub vsize: u64,
    pub fee: u64,
}

/// Estimated virtual size of a transaction with the given shape.
pub fn estimate_vsize(inputs: usize, outputs: usize) -> u64 {
    TX_OVERHEAD_VBYTES
        .saturating_add(INPUT_VBYTES.saturating_mul(inputs as u64))
        .saturating_add(OUTPUT_VBYTES.saturating_mul(outputs as u64))
}

/// Fee for a transaction with the given shape, rounded up to a whole satoshi.
pub fn estimate_fee(inputs: usize, outputs: usize, rate: FeeRate) -> FeeQuote {
    let vsize = estimate_vsize(inputs, outputs);
    let fee = (vsize as u128 * rate.sat_per_kvb as u128).div_ceil(1000);
    FeeQuote {
        vsize,
        fee: u64::try_from(fee).unwrap_or(u64::MAX),
    }
}

/// Convenience over [`estimate_fee`] taking a raw sat/vbyte rate.
pub fn estimate(inputs: usize, outputs: usize, sat_per_vbyte: f64) -> Result<FeeQuote> {
    Ok(estimate_fee(
        inputs,
        outputs,
        FeeRate::from_sat_per_vbyte(sat_per_vbyte)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_with_fee_leg() {
        // 1 input + 2 outputs already present, fee leg reserves 1 + 2 more
        let quote = estimate(2, 4, 0.2).unwrap();
        assert_eq!(quote.vsize, 11 + 2 * 69 + 4 * 67);
        // 417 * 0.2 = 83.4 -> 84
        assert_eq!(quote.fee, 84);
    }

    #[test]
    fn rounds_up() {
        let rate = FeeRate::from_sat_per_kvb(1).unwrap();
        assert_eq!(estimate_fee(0, 0, rate).fee, 1);
        let rate = FeeRate::from_sat_per_vbyte(1.0).unwrap();
        assert_eq!(estimate_fee(1, 1, rate).fee, 11 + 69 + 67);
    }

    #[test]
    fn deterministic() {
        let rate = FeeRate::from_sat_per_vbyte(0.1).unwrap();
        assert_eq!(estimate_fee(3, 5, rate), estimate_fee(3, 5, rate));
    }

    #[test]
    fn monotonic_in_counts_and_rate() {
        let slow = FeeRate::from_sat_per_vbyte(0.1).unwrap();
        let fast = FeeRate::from_sat_per_vbyte(0.3).unwrap();
        for i in 0..6 {
            for o in 0..6 {
                let base = estimate_fee(i, o, slow).fee;
                assert!(estimate_fee(i + 1, o, slow).fee >= base);
                assert!(estimate_fee(i, o + 1, slow).fee >= base);
                assert!(estimate_fee(i, o, fast).fee >= base);
            }
        }
    }

    #[test]
    fn tiny_rates_round_up_to_one_sat_per_kvb() {
        assert_eq!(FeeRate::from_sat_per_vbyte(0.0001).unwrap().sat_per_kvb(), 1);
        assert_eq!(FeeRate::from_sat_per_vbyte(0.0015).unwrap().sat_per_kvb(), 2);
        assert_eq!(FeeRate::from_sat_per_vbyte(1.1).unwrap().sat_per_kvb(), 1_100);
        assert_eq!(FeeRate::from_sat_per_vbyte(0.1).unwrap().sat_per_kvb(), 100);
        // 417 vbytes at 1 sat/kvB
        assert_eq!(estimate(2, 4, 0.0004).unwrap().fee, 1);
    }

    #[test]
    fn rejects_non_positive_rates() {
        assert!(matches!(estimate(1, 1, 0.0), Err(Error::InvalidFeeRate(_))));
        assert!(matches!(estimate(1, 1, -0.5), Err(Error::InvalidFeeRate(_))));
        assert!(matches!(estimate(1, 1, f64::NAN), Err(Error::InvalidFeeRate(_))));
        assert!(matches!(
            FeeRate::from_sat_per_kvb(0),
            Err(Error::InvalidFeeRate(_))
        ));
    }
}
