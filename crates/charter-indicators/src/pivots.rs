//! Pivot-based support and resistance clustering.

use charter_core::Candle;

/// Pivot support/resistance configuration.
#[derive(Debug, Clone)]
pub struct PivotConfig {
    /// Candles that must be strictly dominated on the left (default: 5).
    pub left_bars: usize,
    /// Candles that must be strictly dominated on the right (default: 5).
    pub right_bars: usize,
    /// Relative distance, in percent, under which neighbouring pivots merge.
    pub cluster_tolerance_pct: f64,
    /// Levels returned, strongest first (default: 6).
    pub max_levels: usize,
}

impl Default for PivotConfig {
    fn default() -> Self {
        Self {
            left_bars: 5,
            right_bars: 5,
            cluster_tolerance_pct: 0.5,
            max_levels: 6,
        }
    }
}

/// Which side of price a level acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelKind {
    Support,
    Resistance,
}

/// A single swing high (resistance origin) or swing low (support origin).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pivot {
    pub index: usize,
    pub timestamp: f64,
    pub price: f64,
    pub origin: LevelKind,
}

/// A merged price level.
#[derive(Debug, Clone, PartialEq)]
pub struct SrLevel {
    pub price: f64,
    pub kind: LevelKind,
    /// Number of pivots merged into this level.
    pub strength: usize,
    /// Candle index of the most recent member pivot.
    pub last_index: usize,
    /// Timestamp of the most recent member pivot.
    pub last_touch: f64,
}

/// Find strict pivot highs and lows.
pub fn find_pivots(candles: &[Candle], left_bars: usize, right_bars: usize) -> Vec<Pivot> {
    let n = candles.len();
    if n < left_bars + right_bars + 1 {
        return Vec::new();
    }

    let mut pivots = Vec::new();
    for i in left_bars..n - right_bars {
        let c = &candles[i];
        let neighbours = (i - left_bars..i).chain(i + 1..=i + right_bars);

        let mut is_high = true;
        let mut is_low = true;
        for j in neighbours {
            is_high &= c.high > candles[j].high;
            is_low &= c.low < candles[j].low;
        }

        if is_high {
            pivots.push(Pivot {
                index: i,
                timestamp: c.timestamp,
                price: c.high,
                origin: LevelKind::Resistance,
            });
        }
        if is_low {
            pivots.push(Pivot {
                index: i,
                timestamp: c.timestamp,
                price: c.low,
                origin: LevelKind::Support,
            });
        }
    }
    pivots
}

struct Cluster {
    weighted_sum: f64,
    count: usize,
    resistance_votes: usize,
    support_votes: usize,
    last_index: usize,
    last_touch: f64,
}

impl Cluster {
    fn start(pivot: &Pivot) -> Self {
        let mut cluster = Self {
            weighted_sum: 0.0,
            count: 0,
            resistance_votes: 0,
            support_votes: 0,
            last_index: pivot.index,
            last_touch: pivot.timestamp,
        };
        cluster.add(pivot);
        cluster
    }

    fn add(&mut self, pivot: &Pivot) {
        self.weighted_sum += pivot.price;
        self.count += 1;
        match pivot.origin {
            LevelKind::Resistance => self.resistance_votes += 1,
            LevelKind::Support => self.support_votes += 1,
        }
        if pivot.index >= self.last_index {
            self.last_index = pivot.index;
            self.last_touch = pivot.timestamp;
        }
    }

    fn into_level(self, last_close: f64) -> SrLevel {
        let price = self.weighted_sum / self.count as f64;
        let kind = if self.resistance_votes > self.support_votes {
            LevelKind::Resistance
        } else if self.support_votes > self.resistance_votes {
            LevelKind::Support
        } else if price > last_close {
            LevelKind::Resistance
        } else {
            LevelKind::Support
        };
        SrLevel {
            price,
            kind,
            strength: self.count,
            last_index: self.last_index,
            last_touch: self.last_touch,
        }
    }
}

/// Merge pivots into levels with single linkage on price.
///
/// Pivots are walked in ascending price order; each joins the running
/// cluster when it lies within `tolerance_pct` percent of its lower
/// neighbour. Levels come back strongest first, ties broken by the most
/// recent touch.
pub fn cluster_pivots(pivots: &[Pivot], tolerance_pct: f64, last_close: f64) -> Vec<SrLevel> {
    let mut sorted: Vec<&Pivot> = pivots.iter().filter(|p| p.price.is_finite()).collect();
    sorted.sort_by(|a, b| a.price.total_cmp(&b.price));

    let mut levels = Vec::new();
    let mut current: Option<Cluster> = None;
    let mut prev_price = 0.0;

    for pivot in sorted {
        match current.as_mut() {
            Some(cluster) if within_tolerance(prev_price, pivot.price, tolerance_pct) => {
                cluster.add(pivot);
            }
            _ => {
                if let Some(done) = current.take() {
                    levels.push(done.into_level(last_close));
                }
                current = Some(Cluster::start(pivot));
            }
        }
        prev_price = pivot.price;
    }
    if let Some(done) = current {
        levels.push(done.into_level(last_close));
    }

    levels.sort_by(|a, b| {
        b.strength
            .cmp(&a.strength)
            .then_with(|| b.last_index.cmp(&a.last_index))
    });
    levels
}

fn within_tolerance(reference: f64, price: f64, tolerance_pct: f64) -> bool {
    if reference == 0.0 {
        return price == 0.0;
    }
    ((price - reference) / reference).abs() * 100.0 <= tolerance_pct
}

/// Pivot support/resistance calculator.
pub struct PivotSr {
    config: PivotConfig,
}

impl PivotSr {
    pub fn new(config: PivotConfig) -> Self {
        Self { config }
    }

    /// Top levels for the series, strongest first.
    pub fn calculate(&self, candles: &[Candle]) -> Vec<SrLevel> {
        let Some(last) = candles.last() else {
            return Vec::new();
        };
        let pivots = find_pivots(candles, self.config.left_bars, self.config.right_bars);
        let mut levels = cluster_pivots(&pivots, self.config.cluster_tolerance_pct, last.close);
        levels.truncate(self.config.max_levels);
        levels
    }

    pub fn config(&self) -> &PivotConfig {
        &self.config
    }
}
