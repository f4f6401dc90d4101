//! Property tests for curve invariants: monotonicity, reserve bounds,
//! quote/price convergence, and round-trip loss.

use proptest::prelude::*;

use crate::chain::types::PoolReserves;
use crate::curve::{BondingCurve, CurveConfig, Direction, CURVE_NORM};

fn curve() -> BondingCurve {
    BondingCurve::new(CurveConfig::default())
}

fn fee_free() -> BondingCurve {
    BondingCurve::new(CurveConfig {
        fee_bps: 0,
        ..CurveConfig::default()
    })
}

/// Reserves produced by settling `sold_units` whole units through the
/// curve, so the native side exactly backs the sold tokens.
fn consistent_pool(sold_units: u128) -> PoolReserves {
    let cfg = CurveConfig::default();
    let v = cfg.virtual_native;
    let s = v + sold_units;
    PoolReserves {
        reserve_native: (s * s - v * v) / cfg.proportion,
        reserve_token: cfg.total_supply - sold_units * CURVE_NORM,
    }
}

proptest! {
    #[test]
    fn buy_output_monotone_in_input(
        sold in 0u128..=1_000_000_000,
        a in 1u128..=1_000_000_000_000,
        extra in 0u128..=1_000_000_000_000,
    ) {
        let reserves = consistent_pool(sold);
        let small = curve().quote(&reserves, Direction::Buy, a).unwrap();
        let large = curve().quote(&reserves, Direction::Buy, a + extra).unwrap();
        prop_assert!(large.amount_out >= small.amount_out);
    }

    #[test]
    fn sell_output_monotone_in_input(
        sold in 2u128..=1_000_000_000,
        frac_a in 1u128..=1000,
        frac_b in 1u128..=1000,
    ) {
        let reserves = consistent_pool(sold);
        let total = sold * CURVE_NORM;
        let a = (total * frac_a.min(frac_b)) / 1000;
        let b = (total * frac_a.max(frac_b)) / 1000;
        prop_assume!(a > 0);
        let small = curve().quote(&reserves, Direction::Sell, a).unwrap();
        let large = curve().quote(&reserves, Direction::Sell, b).unwrap();
        prop_assert!(large.amount_out >= small.amount_out);
    }

    #[test]
    fn sell_payout_never_exceeds_native_reserve(
        sold in 1u128..=1_000_000_000,
        frac in 1u128..=1000,
    ) {
        let reserves = consistent_pool(sold);
        let amount = (sold * CURVE_NORM * frac) / 1000;
        prop_assume!(amount > 0);
        let q = curve().quote(&reserves, Direction::Sell, amount).unwrap();
        prop_assert!(q.amount_out + q.fee_applied <= reserves.reserve_native);
    }

    /// Fee-free quoting at `k` units implies a per-unit price within one
    /// truncation step of the marginal price: with state `s`, the payout
    /// satisfies `2sk - raw * proportion` in `[k^2, k^2 + proportion)`.
    #[test]
    fn sell_quote_brackets_marginal_price(
        sold in 1u128..=1_000_000_000,
        k in 1u128..=1000,
    ) {
        prop_assume!(k <= sold);
        let cfg = CurveConfig::default();
        let reserves = consistent_pool(sold);
        let raw = fee_free()
            .quote(&reserves, Direction::Sell, k * CURVE_NORM)
            .unwrap()
            .amount_out;
        let s = cfg.virtual_native + sold;
        let lhs = 2 * s * k - raw * cfg.proportion;
        prop_assert!(lhs >= k * k);
        prop_assert!(lhs < k * k + cfg.proportion);
    }

    /// Buying and immediately selling back can never pay out more native
    /// than went in, even before fees.
    #[test]
    fn round_trip_is_never_profitable(
        sold in 0u128..=999_000_000,
        lamports in 1u128..=1_000_000_000_000,
    ) {
        let c = fee_free();
        let reserves = consistent_pool(sold);
        let bought = c.quote(&reserves, Direction::Buy, lamports).unwrap().amount_out;
        prop_assume!(bought > 0);

        let after = PoolReserves {
            reserve_native: reserves.reserve_native + lamports,
            reserve_token: reserves.reserve_token - bought,
        };
        let back = c.quote(&after, Direction::Sell, bought).unwrap();
        prop_assert!(back.amount_out <= lamports);
    }
}
