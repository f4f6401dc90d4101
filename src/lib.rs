pub mod candles;
pub mod chain;
pub mod curve;
pub mod error;
pub mod feed;
pub mod fx;
