//! Descriptive statistics over a series of collected evaluation values
//!
//! [`AggregateSeries`] keeps samples in insertion order and derives every
//! statistic on demand; nothing is cached and reading never reorders the
//! stored samples.
//!
//! # Example
//!
//! ```rust
//! use search_eval::AggregateSeries;
//!
//! let series: AggregateSeries<f64> = vec![0.5, 0.75, 1.0, 0.25].into();
//! assert_eq!(series.min().unwrap(), 0.25);
//! assert!((series.avg().unwrap() - 0.625).abs() < 1e-12);
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Default number of decimal places used by [`round`]
pub const DEFAULT_ROUNDING_PRECISION: u32 = 3;

/// A primitive numeric sample type
pub trait Numeric: Copy + PartialEq + fmt::Debug {
    /// Widen the sample to `f64`
    fn to_f64(self) -> f64;
}

macro_rules! impl_numeric {
    ($($t:ty),* $(,)?) => {
        $(
            impl Numeric for $t {
                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_numeric!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

fn numeric_cmp<T: Numeric>(a: &T, b: &T) -> Ordering {
    a.to_f64().total_cmp(&b.to_f64())
}

/// Round to [`DEFAULT_ROUNDING_PRECISION`] decimal places
#[must_use]
pub fn round(value: f64) -> f64 {
    round_to(value, DEFAULT_ROUNDING_PRECISION)
}

/// Round to `precision` decimal places, halves rounding towards positive infinity
#[must_use]
pub fn round_to(value: f64, precision: u32) -> f64 {
    let pow = 10f64.powi(precision as i32);
    (value * pow + 0.5).floor() / pow
}

/// Ordered, mutable series of numeric samples
///
/// Duplicates are allowed. Not synchronized: callers sharing a series
/// across threads must provide their own locking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateSeries<T> {
    values: Vec<T>,
}

impl<T> Default for AggregateSeries<T> {
    fn default() -> Self {
        Self { values: Vec::new() }
    }
}

impl<T: Numeric> AggregateSeries<T> {
    /// Create an empty series
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample
    pub fn push(&mut self, value: T) {
        self.values.push(value);
    }

    /// Number of samples
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the series holds no samples
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Samples in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }

    /// Samples in insertion order
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// Consume the series, returning its samples
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.values
    }

    fn sorted(&self) -> Vec<T> {
        let mut sorted = self.values.clone();
        sorted.sort_by(numeric_cmp);
        sorted
    }

    /// Smallest sample
    pub fn min(&self) -> Result<T> {
        self.values
            .iter()
            .copied()
            .min_by(numeric_cmp)
            .ok_or_else(|| Error::empty("min"))
    }

    /// Largest sample
    pub fn max(&self) -> Result<T> {
        self.values
            .iter()
            .copied()
            .max_by(numeric_cmp)
            .ok_or_else(|| Error::empty("max"))
    }

    /// Sum of all samples; 0 for an empty series
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.values.iter().map(|v| v.to_f64()).sum()
    }

    /// Arithmetic mean
    pub fn avg(&self) -> Result<f64> {
        if self.values.is_empty() {
            return Err(Error::empty("avg"));
        }
        Ok(self.sum() / self.values.len() as f64)
    }

    /// Sample variance, `Σ(avg - x)² / (n - 1)`
    pub fn variance(&self) -> Result<f64> {
        let n = self.values.len();
        if n < 2 {
            return Err(Error::InsufficientSamples {
                operation: "variance",
                required: 2,
                actual: n,
            });
        }

        let avg = self.avg()?;
        let squares: f64 = self
            .values
            .iter()
            .map(|v| (avg - v.to_f64()).powi(2))
            .sum();
        Ok(squares / (n - 1) as f64)
    }

    /// Sample standard deviation
    pub fn std_deviation(&self) -> Result<f64> {
        self.variance().map(f64::sqrt)
    }

    /// The p-quantile of the samples
    ///
    /// `p <= 0` yields the minimum and `p >= 1` the maximum. Otherwise the
    /// samples are sorted and `pos = n·p`; an integral `pos` selects the
    /// sample at that index, a fractional one blends the samples at
    /// `floor(pos)` and `min(floor(pos) + 1, n - 1)` with weights `p` and
    /// `1 - p`.
    ///
    /// The weighting is intentionally not the textbook linear
    /// interpolation; reported figures depend on it.
    pub fn quantile(&self, p: f64) -> Result<f64> {
        match self.values.as_slice() {
            [] => return Err(Error::empty("quantile")),
            [only] => return Ok(only.to_f64()),
            _ => {}
        }

        if p.is_nan() {
            return Err(Error::InvalidArgument(
                "quantile fraction must be a number within [0, 1]".to_string(),
            ));
        }
        if p <= 0.0 {
            return self.min().map(Numeric::to_f64);
        }
        if p >= 1.0 {
            return self.max().map(Numeric::to_f64);
        }

        let sorted = self.sorted();
        let n = sorted.len();
        let pos = n as f64 * p;
        let lower = pos.floor() as usize;

        if pos.fract() == 0.0 {
            return Ok(sorted[lower].to_f64());
        }

        let upper = (lower + 1).min(n - 1);
        Ok(p * sorted[lower].to_f64() + (1.0 - p) * sorted[upper].to_f64())
    }

    /// The 0.5-quantile
    pub fn median(&self) -> Result<f64> {
        self.quantile(0.5)
    }

    /// Distinct values with their number of occurrences, ascending by value
    #[must_use]
    pub fn cluster(&self) -> Vec<(T, usize)> {
        let mut clusters: Vec<(T, usize)> = Vec::new();
        for value in self.sorted() {
            match clusters.last_mut() {
                Some((last, count)) if numeric_cmp(last, &value) == Ordering::Equal => {
                    *count += 1;
                }
                _ => clusters.push((value, 1)),
            }
        }
        clusters
    }

    /// Descriptive summary rounded to `precision` decimal places
    pub fn summary(&self, precision: u32) -> Result<Summary> {
        let r = |v: f64| round_to(v, precision);
        let variance = self.variance().ok();

        Ok(Summary {
            size: self.len(),
            min: r(self.min()?.to_f64()),
            max: r(self.max()?.to_f64()),
            avg: r(self.avg()?),
            median: r(self.median()?),
            quartile: r(self.quantile(0.25)?),
            quantile_90: r(self.quantile(0.9)?),
            variance: variance.map(r),
            std_deviation: variance.map(|v| r(v.sqrt())),
        })
    }
}

impl<T: Numeric> From<Vec<T>> for AggregateSeries<T> {
    fn from(values: Vec<T>) -> Self {
        Self { values }
    }
}

impl<T: Numeric> FromIterator<T> for AggregateSeries<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl<T: Numeric> Extend<T> for AggregateSeries<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.values.extend(iter);
    }
}

impl<'a, T> IntoIterator for &'a AggregateSeries<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// Rounded descriptive statistics of a non-empty series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of samples
    pub size: usize,
    /// Smallest sample
    pub min: f64,
    /// Largest sample
    pub max: f64,
    /// Arithmetic mean
    pub avg: f64,
    /// 0.5-quantile
    pub median: f64,
    /// 0.25-quantile
    pub quartile: f64,
    /// 0.9-quantile
    pub quantile_90: f64,
    /// Sample variance, absent below two samples
    pub variance: Option<f64>,
    /// Sample standard deviation, absent below two samples
    pub std_deviation: Option<f64>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opt = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |v| v.to_string());

        writeln!(f, "size: {}", self.size)?;
        writeln!(f, "min: {}", self.min)?;
        writeln!(f, "max: {}", self.max)?;
        writeln!(f, "avg: {}", self.avg)?;
        writeln!(f, "median: {}", self.median)?;
        writeln!(f, "quartile: {}", self.quartile)?;
        writeln!(f, "quantile(0.9): {}", self.quantile_90)?;
        writeln!(f, "variance: {}", opt(self.variance))?;
        write!(f, "std deviation: {}", opt(self.std_deviation))
    }
}
