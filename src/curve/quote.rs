use rust_decimal::Decimal;

use crate::chain::types::PoolReserves;
use crate::error::EngineError;

use super::math::{isqrt, mul_div, split_fee};
use super::{CurveConfig, CURVE_NORM, NATIVE_SCALE};

/// Trade direction. `Buy` spends native for tokens, `Sell` the reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Buy,
    Sell,
}

/// Pre-trade estimate. `amount_out` is in token base units for a buy and
/// native base units for a sell; `fee_applied` is in the input asset for a
/// buy (taken off the top) and the output asset for a sell (taken from the
/// payout).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteResult {
    pub amount_out: u128,
    pub fee_applied: u128,
}

/// Quadratic bonding curve over virtual + real reserves.
///
/// The curve works on a normalized "sold amount": with `u = (total_supply -
/// reserve_token) / CURVE_NORM`, the native cost of moving the pool from
/// `u0` to `u1` sold units is `((v + u1)^2 - (v + u0)^2) / proportion`
/// base units, where `v` is the virtual native constant. All intermediate
/// arithmetic stays in u128 and truncates toward zero.
#[derive(Debug, Clone, Copy)]
pub struct BondingCurve {
    cfg: CurveConfig,
}

impl BondingCurve {
    pub fn new(cfg: CurveConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &CurveConfig {
        &self.cfg
    }

    /// Token base units sold out of the pool so far.
    fn sold_base(&self, reserves: &PoolReserves) -> Result<u128, EngineError> {
        self.cfg
            .total_supply
            .checked_sub(reserves.reserve_token)
            .ok_or(EngineError::Overflow)
    }

    /// Curve state `v + u` for a given sold amount in base units.
    fn state_at(&self, sold_base: u128) -> Result<u128, EngineError> {
        self.cfg
            .virtual_native
            .checked_add(sold_base / CURVE_NORM)
            .ok_or(EngineError::Overflow)
    }

    /// Native backing per unit scale: `(virtual_native + reserve_native) /
    /// 10^9`. This is the chart's y value and the market-cap label.
    pub fn spot_price(&self, reserves: &PoolReserves) -> Result<Decimal, EngineError> {
        let backing = self
            .cfg
            .virtual_native
            .checked_add(reserves.reserve_native)
            .ok_or(EngineError::Overflow)?;
        let mantissa = i128::try_from(backing).map_err(|_| EngineError::Overflow)?;
        Ok(Decimal::from_i128_with_scale(mantissa, NATIVE_SCALE))
    }

    /// Instantaneous native price of one whole token at the current
    /// reserves. Quotes at ever-smaller amounts converge to this value.
    pub fn marginal_price(&self, reserves: &PoolReserves) -> Result<Decimal, EngineError> {
        let state = self.state_at(self.sold_base(reserves)?)?;
        let two_s = state.checked_mul(2).ok_or(EngineError::Overflow)?;
        let mantissa = i128::try_from(two_s).map_err(|_| EngineError::Overflow)?;
        let proportion =
            i128::try_from(self.cfg.proportion).map_err(|_| EngineError::Overflow)?;
        Ok(Decimal::from_i128_with_scale(mantissa, NATIVE_SCALE)
            / Decimal::from_i128_with_scale(proportion, 0))
    }

    /// Amount-out estimation for a hypothetical trade against `reserves`.
    pub fn quote(
        &self,
        reserves: &PoolReserves,
        direction: Direction,
        amount_in: u128,
    ) -> Result<QuoteResult, EngineError> {
        if amount_in == 0 {
            return Err(EngineError::InvalidAmount("amount must be positive"));
        }
        match direction {
            Direction::Buy => self.quote_buy(reserves, amount_in),
            Direction::Sell => self.quote_sell(reserves, amount_in),
        }
    }

    /// Native in, tokens out. The fee is taken off the input, then the
    /// curve is inverted: the new state is the root of `state^2 + net *
    /// proportion`.
    fn quote_buy(
        &self,
        reserves: &PoolReserves,
        amount_in: u128,
    ) -> Result<QuoteResult, EngineError> {
        let (net, fee_applied) = split_fee(amount_in, self.cfg.fee_bps)?;
        let state = self.state_at(self.sold_base(reserves)?)?;

        let squared = state.checked_mul(state).ok_or(EngineError::Overflow)?;
        let target = squared
            .checked_add(
                net.checked_mul(self.cfg.proportion)
                    .ok_or(EngineError::Overflow)?,
            )
            .ok_or(EngineError::Overflow)?;

        // Input too small to move the curve a whole unit quotes as zero.
        let delta = isqrt(target) - state;
        let amount_out = delta.checked_mul(CURVE_NORM).ok_or(EngineError::Overflow)?;

        Ok(QuoteResult {
            amount_out,
            fee_applied,
        })
    }

    /// Tokens in, native out. The payout is the difference of squares,
    /// taken in full u128 width before any narrowing, so small deltas
    /// never suffer catastrophic cancellation.
    fn quote_sell(
        &self,
        reserves: &PoolReserves,
        amount_in: u128,
    ) -> Result<QuoteResult, EngineError> {
        let sold = self.sold_base(reserves)?;
        if amount_in > sold {
            return Err(EngineError::InvalidAmount("amount exceeds sold supply"));
        }

        // The delta is normalized, not each side: truncation always favors
        // the pool, and dust below one curve unit pays out nothing.
        let delta = amount_in / CURVE_NORM;
        if delta == 0 {
            return Ok(QuoteResult {
                amount_out: 0,
                fee_applied: 0,
            });
        }

        let before = self.state_at(sold)?;
        let after = before.checked_sub(delta).ok_or(EngineError::Overflow)?;

        let diff = before
            .checked_mul(before)
            .ok_or(EngineError::Overflow)?
            .checked_sub(after.checked_mul(after).ok_or(EngineError::Overflow)?)
            .ok_or(EngineError::Overflow)?;
        let raw = mul_div(diff, 1, self.cfg.proportion)?;

        let (amount_out, fee_applied) = split_fee(raw, self.cfg.fee_bps)?;
        Ok(QuoteResult {
            amount_out,
            fee_applied,
        })
    }
}
