use thiserror::Error;

/// Engine failure taxonomy.
///
/// `InvalidAmount` is a recoverable input problem; the UI shows it as a
/// disabled trade button, never as a hard failure. `Overflow` means the
/// curve arithmetic exceeded 128 bits, which the width selection makes
/// unreachable for realistic supply magnitudes. The remaining variants are
/// degraded-mode conditions recovered with last-known-good values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("invalid amount: {0}")]
    InvalidAmount(&'static str),

    #[error("arithmetic overflow in curve math")]
    Overflow,

    #[error("exchange rate refresh failed, cache is stale")]
    StaleRate,

    #[error("price feed unavailable: {0}")]
    FeedUnavailable(&'static str),
}
