//! Timeframe types and bucket alignment.

/// Timeframe enumeration for different chart periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Timeframe {
    Min1,
    Min5,
    Min15,
    #[default]
    Hour1,
    Hour4,
    Day1,
    Week1,
}

impl Timeframe {
    /// Returns the duration of this timeframe in seconds.
    pub fn seconds(&self) -> f64 {
        match self {
            Timeframe::Min1 => 60.0,
            Timeframe::Min5 => 60.0 * 5.0,
            Timeframe::Min15 => 60.0 * 15.0,
            Timeframe::Hour1 => 60.0 * 60.0,
            Timeframe::Hour4 => 60.0 * 60.0 * 4.0,
            Timeframe::Day1 => 60.0 * 60.0 * 24.0,
            Timeframe::Week1 => 60.0 * 60.0 * 24.0 * 7.0,
        }
    }

    /// Returns a short label for this timeframe.
    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::Min1 => "1m",
            Timeframe::Min5 => "5m",
            Timeframe::Min15 => "15m",
            Timeframe::Hour1 => "1h",
            Timeframe::Hour4 => "4h",
            Timeframe::Day1 => "1d",
            Timeframe::Week1 => "1w",
        }
    }

    /// Parses a label produced by [`Timeframe::label`].
    pub fn from_label(label: &str) -> Option<Self> {
        Self::all().iter().copied().find(|tf| tf.label() == label)
    }

    /// Returns all available timeframes in order.
    pub fn all() -> &'static [Timeframe] {
        &[
            Timeframe::Min1,
            Timeframe::Min5,
            Timeframe::Min15,
            Timeframe::Hour1,
            Timeframe::Hour4,
            Timeframe::Day1,
            Timeframe::Week1,
        ]
    }

    /// Start of the bucket containing `timestamp`.
    pub fn bucket_start(&self, timestamp: f64) -> f64 {
        let interval = self.seconds();
        (timestamp / interval).floor() * interval
    }

    /// Whether two timestamps fall into the same bucket.
    pub fn same_bucket(&self, a: f64, b: f64) -> bool {
        self.bucket_start(a) == self.bucket_start(b)
    }
}
