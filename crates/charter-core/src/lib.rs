//! Core types for the charter application.
//!
//! This crate provides fundamental data structures with no external dependencies:
//! - `Candle` / `CandleSeries` - OHLCV candle data and the canonical timeline
//! - `Timeframe` - Time period enumeration and bucket alignment
//! - `TimeSeries` / `DerivedPoint` - Containers for indicator output
//! - `Viewport` - Visible index window and pixel scale

pub mod candle;
pub mod series;
pub mod timeframe;
pub mod viewport;

pub use candle::{Candle, CandleSeries, OHLCV};
pub use series::{DerivedPoint, TimeSeries};
pub use timeframe::Timeframe;
pub use viewport::Viewport;
