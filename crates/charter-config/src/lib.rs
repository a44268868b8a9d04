//! Configuration management for charter.
//!
//! Loads configuration from TOML files with support for per-timeframe
//! indicator parameters.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub api: ApiConfig,
    pub indicators: IndicatorsConfig,
    pub viewport: ViewportConfig,
    pub display: DisplayConfig,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from default locations.
    ///
    /// Searches in order:
    /// 1. `./config.toml`
    /// 2. `~/.config/charter/config.toml`
    ///
    /// Returns default config if no file found.
    pub fn load_default() -> Self {
        if let Ok(config) = Self::load(Self::default_path()) {
            return config;
        }

        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("charter").join("config.toml");
            if let Ok(config) = Self::load(&config_path) {
                return config;
            }
        }

        Self::default()
    }

    /// Save configuration to a file path.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the default config file path.
    pub fn default_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    /// Get indicator parameters for a specific timeframe.
    /// Falls back to default if timeframe not configured.
    pub fn indicators_for_timeframe(&self, timeframe: &str) -> IndicatorSettings {
        self.indicators
            .timeframes
            .get(timeframe)
            .map(|tf| self.indicators.default.merge(tf))
            .unwrap_or_else(|| self.indicators.default.clone())
    }
}

/// General application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Symbol to load on startup.
    pub default_symbol: String,
    /// Timeframe label to load on startup (e.g. "1h").
    pub default_timeframe: String,
    /// Target frame interval of the render loop in milliseconds.
    pub frame_interval_ms: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_symbol: "BTCUSDT".to_string(),
            default_timeframe: "1h".to_string(),
            frame_interval_ms: 16,
        }
    }
}

/// Market data API configuration.
///
/// Endpoint entries are URL templates; `{symbol}` and `{timeframe}` are
/// substituted per request. Endpoints are tried in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Snapshot endpoints for equities, commodities and forex.
    pub snapshot_endpoints: Vec<String>,
    /// Snapshot endpoints for crypto symbols.
    pub crypto_endpoints: Vec<String>,
    /// Push-price stream URL template. Empty disables the stream.
    pub ws_url: String,
    /// Symbol suffixes that mark a crypto pair.
    pub crypto_suffixes: Vec<String>,
    /// Seconds between snapshot refreshes.
    pub poll_interval_secs: u64,
    /// Seconds before retrying a failed snapshot.
    pub retry_interval_secs: u64,
    /// Seconds before reconnecting a closed stream.
    pub reconnect_delay_secs: u64,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            snapshot_endpoints: vec![
                "http://127.0.0.1:8080/api/market/{symbol}?timeframe={timeframe}".to_string(),
            ],
            crypto_endpoints: vec![
                "http://127.0.0.1:8080/api/crypto/{symbol}?timeframe={timeframe}".to_string(),
            ],
            ws_url: "ws://127.0.0.1:8080/ws/{symbol}".to_string(),
            crypto_suffixes: vec!["USDT".to_string(), "USDC".to_string(), "-USD".to_string()],
            poll_interval_secs: 30,
            retry_interval_secs: 5,
            reconnect_delay_secs: 3,
            request_timeout_secs: 10,
        }
    }
}

/// Indicator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorsConfig {
    /// Default indicator parameters.
    pub default: IndicatorSettings,
    /// Per-timeframe overrides.
    #[serde(default)]
    pub timeframes: HashMap<String, IndicatorOverride>,
}

impl Default for IndicatorsConfig {
    fn default() -> Self {
        let mut timeframes = HashMap::new();

        // Shorter timeframes are noisier; widen the pivot window
        timeframes.insert(
            "1m".to_string(),
            IndicatorOverride {
                pivot_left_bars: Some(8),
                pivot_right_bars: Some(8),
                ..Default::default()
            },
        );
        timeframes.insert(
            "5m".to_string(),
            IndicatorOverride {
                pivot_left_bars: Some(6),
                pivot_right_bars: Some(6),
                ..Default::default()
            },
        );
        timeframes.insert(
            "1d".to_string(),
            IndicatorOverride {
                cluster_tolerance_pct: Some(1.0),
                ..Default::default()
            },
        );
        timeframes.insert(
            "1w".to_string(),
            IndicatorOverride {
                cluster_tolerance_pct: Some(1.5),
                fib_lookback: Some(52),
                ..Default::default()
            },
        );

        Self {
            default: IndicatorSettings::default(),
            timeframes,
        }
    }
}

/// Indicator parameters (full config with all fields).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorSettings {
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub rsi_period: usize,
    pub stoch_period: usize,
    pub smooth_k: usize,
    pub smooth_d: usize,
    pub pivot_left_bars: usize,
    pub pivot_right_bars: usize,
    /// Percent distance under which pivots merge into one level.
    pub cluster_tolerance_pct: f64,
    /// Number of support/resistance levels kept.
    pub max_levels: usize,
    pub trend_ema_period: usize,
    pub trend_atr_period: usize,
    pub trend_multiplier: f64,
    pub fib_lookback: usize,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            ema_fast: 9,
            ema_slow: 21,
            rsi_period: 14,
            stoch_period: 14,
            smooth_k: 3,
            smooth_d: 3,
            pivot_left_bars: 5,
            pivot_right_bars: 5,
            cluster_tolerance_pct: 0.5,
            max_levels: 6,
            trend_ema_period: 20,
            trend_atr_period: 14,
            trend_multiplier: 2.0,
            fib_lookback: 100,
        }
    }
}

impl IndicatorSettings {
    /// Merge with an override, using override values where present.
    pub fn merge(&self, o: &IndicatorOverride) -> Self {
        Self {
            ema_fast: o.ema_fast.unwrap_or(self.ema_fast),
            ema_slow: o.ema_slow.unwrap_or(self.ema_slow),
            rsi_period: o.rsi_period.unwrap_or(self.rsi_period),
            stoch_period: o.stoch_period.unwrap_or(self.stoch_period),
            smooth_k: o.smooth_k.unwrap_or(self.smooth_k),
            smooth_d: o.smooth_d.unwrap_or(self.smooth_d),
            pivot_left_bars: o.pivot_left_bars.unwrap_or(self.pivot_left_bars),
            pivot_right_bars: o.pivot_right_bars.unwrap_or(self.pivot_right_bars),
            cluster_tolerance_pct: o.cluster_tolerance_pct.unwrap_or(self.cluster_tolerance_pct),
            max_levels: o.max_levels.unwrap_or(self.max_levels),
            trend_ema_period: o.trend_ema_period.unwrap_or(self.trend_ema_period),
            trend_atr_period: o.trend_atr_period.unwrap_or(self.trend_atr_period),
            trend_multiplier: o.trend_multiplier.unwrap_or(self.trend_multiplier),
            fib_lookback: o.fib_lookback.unwrap_or(self.fib_lookback),
        }
    }
}

/// Indicator override (all fields optional for partial overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorOverride {
    pub ema_fast: Option<usize>,
    pub ema_slow: Option<usize>,
    pub rsi_period: Option<usize>,
    pub stoch_period: Option<usize>,
    pub smooth_k: Option<usize>,
    pub smooth_d: Option<usize>,
    pub pivot_left_bars: Option<usize>,
    pub pivot_right_bars: Option<usize>,
    pub cluster_tolerance_pct: Option<f64>,
    pub max_levels: Option<usize>,
    pub trend_ema_period: Option<usize>,
    pub trend_atr_period: Option<usize>,
    pub trend_multiplier: Option<f64>,
    pub fib_lookback: Option<usize>,
}

/// Zoom, pan and animation tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Candles shown after a reset.
    pub default_visible: usize,
    pub min_candle_width: f64,
    pub max_candle_width: f64,
    /// Exponent scale applied to wheel delta.
    pub zoom_sensitivity: f64,
    /// Fraction of the remaining distance covered per animation frame.
    pub animation_smoothing: f64,
    /// Velocity multiplier per inertia frame.
    pub inertia_decay: f64,
    /// Release velocity (px/frame) above which inertia starts.
    pub inertia_start_threshold: f64,
    /// Velocity (px/frame) below which inertia stops.
    pub inertia_stop_threshold: f64,
    /// Initial price panel share of the chart height.
    pub divider_ratio: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            default_visible: 100,
            min_candle_width: 2.0,
            max_candle_width: 40.0,
            zoom_sensitivity: 0.002,
            animation_smoothing: 0.25,
            inertia_decay: 0.92,
            inertia_start_threshold: 2.0,
            inertia_stop_threshold: 0.1,
            divider_ratio: 0.7,
        }
    }
}

/// Overlay toggles and live price cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub show_ema: bool,
    pub show_trend: bool,
    pub show_fibonacci: bool,
    pub show_levels: bool,
    pub show_signals: bool,
    pub show_volume: bool,
    pub show_oscillator: bool,
    /// Interval at which the displayed price catches up with the last tick.
    pub price_update_ms: u64,
    /// How long the up/down color flash lasts.
    pub price_flash_ms: u64,
    /// Device pixel ratio of the target surface.
    pub device_pixel_ratio: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_ema: true,
            show_trend: true,
            show_fibonacci: false,
            show_levels: true,
            show_signals: true,
            show_volume: true,
            show_oscillator: true,
            price_update_ms: 500,
            price_flash_ms: 800,
            device_pixel_ratio: 1.0,
        }
    }
}
