use crate::error::{Error, Result};
use crate::pset::Utxo;

/// Outcome of a coin selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub selected: Vec<Utxo>,
    pub change: u64,
}

/// Select the shortest prefix of `candidates` (optionally restricted to one
/// asset) whose running total reaches `target`.
///
/// Candidates are taken in the order given; callers wanting largest-first or
/// least-waste behaviour sort before calling. At least one candidate is
/// always consumed, even for a zero target.
pub fn select(candidates: &[Utxo], target: u64, asset: Option<&str>) -> Result<Selection> {
    let mut selected = Vec::new();
    let mut total: u64 = 0;

    for utxo in candidates
        .iter()
        .filter(|u| asset.is_none_or(|a| u.is_asset(a)))
    {
        total = total
            .checked_add(utxo.value)
            .ok_or(Error::ValueOutOfRange(utxo.value))?;
        selected.push(utxo.clone());
        if total >= target {
            return Ok(Selection {
                selected,
                change: total - target,
            });
        }
    }

    Err(Error::InsufficientFunds {
        needed: target,
        available: total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{LBTC, USDT, test_utxo};

    #[test]
    fn single_exact() {
        let utxos = vec![test_utxo(1, LBTC, 10_000)];
        let sel = select(&utxos, 10_000, None).unwrap();
        assert_eq!(sel.selected.len(), 1);
        assert_eq!(sel.change, 0);
    }

    #[test]
    fn shortest_prefix_wins() {
        let utxos = vec![
            test_utxo(1, LBTC, 3_000),
            test_utxo(2, LBTC, 4_000),
            test_utxo(3, LBTC, 50_000),
            test_utxo(4, LBTC, 1_000),
        ];
        let sel = select(&utxos, 6_000, None).unwrap();
        assert_eq!(sel.selected, utxos[..2].to_vec());
        assert_eq!(sel.change, 1_000);
    }

    #[test]
    fn order_is_respected_not_sorted() {
        let utxos = vec![test_utxo(1, LBTC, 1_000), test_utxo(2, LBTC, 100_000)];
        let sel = select(&utxos, 500, None).unwrap();
        assert_eq!(sel.selected.len(), 1);
        assert_eq!(sel.selected[0].value, 1_000);
        assert_eq!(sel.change, 500);
    }

    #[test]
    fn filters_by_asset() {
        let utxos = vec![
            test_utxo(1, USDT, 90_000),
            test_utxo(2, LBTC, 20_000),
            test_utxo(3, USDT, 5_000),
            test_utxo(4, LBTC, 30_000),
        ];
        let sel = select(&utxos, 40_000, Some(LBTC)).unwrap();
        assert!(sel.selected.iter().all(|u| u.asset == LBTC));
        assert_eq!(sel.selected.len(), 2);
        assert_eq!(sel.change, 10_000);
    }

    #[test]
    fn insufficient_funds() {
        let utxos = vec![test_utxo(1, LBTC, 1_000), test_utxo(2, USDT, 1_000_000)];
        let err = select(&utxos, 2_000, Some(LBTC)).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientFunds {
                needed: 2_000,
                available: 1_000
            }
        ));
    }

    #[test]
    fn empty_candidates_are_insufficient() {
        assert!(matches!(
            select(&[], 1, None),
            Err(Error::InsufficientFunds { available: 0, .. })
        ));
        let utxos = vec![test_utxo(1, USDT, 5)];
        assert!(matches!(
            select(&utxos, 0, Some(LBTC)),
            Err(Error::InsufficientFunds { .. })
        ));
    }

    #[test]
    fn zero_target_consumes_first_candidate() {
        let utxos = vec![test_utxo(1, LBTC, 700), test_utxo(2, LBTC, 800)];
        let sel = select(&utxos, 0, None).unwrap();
        assert_eq!(sel.selected.len(), 1);
        assert_eq!(sel.change, 700);
    }
}
