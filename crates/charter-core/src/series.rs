//! TimeSeries container for indicator output.

use crate::candle::CandleSeries;

/// A derived value tagged with the timestamp of the candle it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedPoint<T> {
    pub timestamp: f64,
    pub value: T,
}

/// A time-indexed series of values, typically used for indicator output.
///
/// Values are aligned with candle indices: the first value belongs to the
/// candle at `start_index`. Indices before that fall inside the warm-up
/// window and have no value.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries<T> {
    values: Vec<Option<T>>,
    start_index: usize,
}

impl<T> TimeSeries<T> {
    /// Creates a new empty TimeSeries.
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            start_index: 0,
        }
    }

    /// Creates a TimeSeries with the given values starting at the specified index.
    pub fn with_offset(values: Vec<Option<T>>, start_index: usize) -> Self {
        Self {
            values,
            start_index,
        }
    }

    /// Creates a TimeSeries whose values are all present.
    pub fn from_vec(values: Vec<T>, start_index: usize) -> Self {
        Self {
            values: values.into_iter().map(Some).collect(),
            start_index,
        }
    }

    /// Returns the starting index of this series.
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    /// One past the last candle index covered by this series.
    pub fn end_index(&self) -> usize {
        self.start_index + self.values.len()
    }

    /// Returns the number of values in this series.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this series is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Gets the value at the given candle index, if available.
    pub fn get(&self, index: usize) -> Option<&T> {
        if index < self.start_index {
            return None;
        }
        let local_idx = index - self.start_index;
        self.values.get(local_idx).and_then(|v| v.as_ref())
    }

    /// The first present value.
    pub fn first(&self) -> Option<&T> {
        self.values.iter().find_map(|v| v.as_ref())
    }

    /// The last present value.
    pub fn last(&self) -> Option<&T> {
        self.values.iter().rev().find_map(|v| v.as_ref())
    }

    /// Returns an iterator over (index, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.as_ref().map(|val| (self.start_index + i, val)))
    }

    /// Iterates the (index, value) pairs whose index lies in `[start, end)`.
    pub fn iter_range(&self, start: usize, end: usize) -> impl Iterator<Item = (usize, &T)> {
        self.iter()
            .skip_while(move |(i, _)| *i < start)
            .take_while(move |(i, _)| *i < end)
    }

    /// Returns the underlying values slice.
    pub fn values(&self) -> &[Option<T>] {
        &self.values
    }
}

impl<T: Clone> TimeSeries<T> {
    /// Resolves every value to the timestamp of its candle.
    ///
    /// Values whose index is outside the candle series are skipped, so every
    /// returned point refers to a timestamp that exists in `candles`.
    pub fn points(&self, candles: &CandleSeries) -> Vec<DerivedPoint<T>> {
        self.iter()
            .filter_map(|(i, value)| {
                candles.get(i).map(|c| DerivedPoint {
                    timestamp: c.timestamp,
                    value: value.clone(),
                })
            })
            .collect()
    }

    /// Creates a TimeSeries from a slice of values, all present.
    pub fn from_values(values: &[T], start_index: usize) -> Self {
        Self {
            values: values.iter().cloned().map(Some).collect(),
            start_index,
        }
    }
}

impl<T> Default for TimeSeries<T> {
    fn default() -> Self {
        Self::new()
    }
}
