pub mod math;
pub mod quote;

#[cfg(test)]
mod proptest_properties;

pub use quote::{BondingCurve, Direction, QuoteResult};

/// Token base units per curve unit. All curve evaluation happens on
/// amounts divided by this normalization.
pub const CURVE_NORM: u128 = 1_000_000_000;

/// Decimal scale of the native asset (base units per whole unit = 10^9).
pub const NATIVE_SCALE: u32 = 9;

pub const BPS_DENOMINATOR: u128 = 10_000;

/// Curve shape constants. Immutable for the lifetime of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurveConfig {
    /// Virtual native liquidity added to real reserves (base units).
    pub virtual_native: u128,
    /// Total token supply in base units.
    pub total_supply: u128,
    /// Steepness divisor of the quadratic curve.
    pub proportion: u128,
    /// Trade fee in basis points, taken outside the pool.
    pub fee_bps: u32,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            virtual_native: 25_000_000_000,
            total_supply: 1_000_000_000_000_000_000,
            proportion: 1280,
            fee_bps: 100,
        }
    }
}
