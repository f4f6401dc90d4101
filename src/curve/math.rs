use crate::error::EngineError;

use super::BPS_DENOMINATOR;

/// Safe (a * b) / d. Division truncates toward zero; every division in the
/// curve goes through here or uses the same rule, so the quote path and the
/// price paths round identically.
#[inline]
pub fn mul_div(a: u128, b: u128, d: u128) -> Result<u128, EngineError> {
    a.checked_mul(b)
        .and_then(|p| p.checked_div(d))
        .ok_or(EngineError::Overflow)
}

/// Splits `amount` into (net, fee) with `net = amount * (10_000 - fee_bps)
/// / 10_000`, truncating.
#[inline]
pub fn split_fee(amount: u128, fee_bps: u32) -> Result<(u128, u128), EngineError> {
    let keep = BPS_DENOMINATOR
        .checked_sub(fee_bps as u128)
        .ok_or(EngineError::Overflow)?;
    let net = mul_div(amount, keep, BPS_DENOMINATOR)?;
    Ok((net, amount - net))
}

/// Floor of the square root.
pub fn isqrt(v: u128) -> u128 {
    if v < 2 {
        return v;
    }

    // Newton's method from a guess that is >= sqrt(v), so the sequence
    // decreases monotonically onto the floor.
    let bits = 128 - v.leading_zeros();
    let mut x = 1u128 << ((bits + 1) / 2);
    loop {
        let y = (x + v / x) / 2;
        if y >= x {
            return x;
        }
        x = y;
    }
}
