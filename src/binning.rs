//! Partitioning of numeric values into contiguous bins.
//!
//! ## Threshold rules
//! - **Count**: an approximate bin count; bin edges land on round tick values
//! - **Sturges**: `ceil(log2(n)) + 1`
//! - **Scott**: bin width `3.49 * std / n^(1/3)`
//! - **Freedman-Diaconis**: bin width `2 * IQR / n^(1/3)`, quartiles
//!   interpolated at `(n - 1) * p` over the sorted values
//! - **Explicit / Custom**: caller-provided edges, sorted ascending with NaN
//!   edges dropped before use

use std::{fmt, sync::Arc};

use statrs::statistics::Statistics;

use crate::ticks::{nice, tick_increment, ticks};

/// Edge generator: `(finite values, min, max) -> thresholds`.
pub type ThresholdFn = Arc<dyn Fn(&[f64], f64, f64) -> Vec<f64> + Send + Sync>;

/// How bin edges are chosen.
///
/// Edges given through `Explicit` or produced by `Custom` need not be ordered;
/// they are sorted ascending and NaN edges are dropped.
#[derive(Clone)]
pub enum Thresholds {
    Count(usize),
    Sturges,
    Scott,
    FreedmanDiaconis,
    Explicit(Vec<f64>),
    Custom(ThresholdFn),
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds::Count(40)
    }
}

impl fmt::Debug for Thresholds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Thresholds::Count(n) => f.debug_tuple("Count").field(n).finish(),
            Thresholds::Sturges => f.write_str("Sturges"),
            Thresholds::Scott => f.write_str("Scott"),
            Thresholds::FreedmanDiaconis => f.write_str("FreedmanDiaconis"),
            Thresholds::Explicit(t) => f.debug_tuple("Explicit").field(t).finish(),
            Thresholds::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Thresholds {
    /// Bin count suggested by a count rule, `None` for edge-producing rules.
    fn count(&self, values: &[f64], min: f64, max: f64) -> Option<usize> {
        let n = values.len() as f64;
        let from_width = |width: f64| {
            if n > 0. && width > 0. && width.is_finite() {
                ((max - min) / width).ceil().max(0.) as usize
            } else {
                1
            }
        };
        match self {
            Thresholds::Count(c) => Some(*c),
            Thresholds::Sturges => Some((n.log2().ceil() + 1.).max(1.) as usize),
            Thresholds::Scott => {
                let deviation = values.iter().std_dev();
                Some(from_width(3.49 * deviation / n.cbrt()))
            }
            Thresholds::FreedmanDiaconis => {
                let mut sorted = values.to_vec();
                sorted.sort_by(f64::total_cmp);
                let iqr = quantile_sorted(&sorted, 0.75) - quantile_sorted(&sorted, 0.25);
                Some(from_width(2. * iqr * n.powf(-1. / 3.)))
            }
            Thresholds::Explicit(_) | Thresholds::Custom(_) => None,
        }
    }
}

/// A half-open interval `[x0, x1)` and the indices of the values inside it.
///
/// The last bin of a partition is closed on the right.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bin {
    pub x0: f64,
    pub x1: f64,
    pub indices: Vec<usize>,
}

impl Bin {
    fn empty(x0: f64, x1: f64) -> Self {
        Self {
            x0,
            x1,
            indices: Vec::new(),
        }
    }
    pub fn len(&self) -> usize {
        self.indices.len()
    }
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Bins `values` by position, ignoring non-finite entries.
///
/// Returns no bins when there is no finite value.
pub fn bin(values: &[f64], thresholds: &Thresholds) -> Vec<Bin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let Some((mut x0, mut x1)) = extent(&finite) else {
        return Vec::new();
    };
    let mut step = f64::NAN;
    let mut tz = match thresholds.count(&finite, x0, x1) {
        Some(count) => {
            let tn = count as f64;
            let max = x1;
            (x0, x1) = nice(x0, x1, tn);
            let mut tz = ticks(x0, x1, tn);
            if tz.first().is_some_and(|t| *t <= x0) {
                step = tick_increment(x0, x1, tn);
            }
            if tz.last().is_some_and(|t| *t >= x1) {
                if max >= x1 {
                    let inc = tick_increment(x0, x1, tn);
                    if inc > 0. && inc.is_finite() {
                        x1 = ((x1 / inc).floor() + 1.) * inc;
                    } else if inc < 0. && inc.is_finite() {
                        x1 = ((x1 * -inc).ceil() + 1.) / -inc;
                    }
                } else {
                    tz.pop();
                }
            }
            tz
        }
        None => {
            let mut tz = match thresholds {
                Thresholds::Custom(f) => f(&finite, x0, x1),
                Thresholds::Explicit(t) => t.clone(),
                _ => Vec::new(),
            };
            tz.retain(|t| !t.is_nan());
            tz.sort_by(f64::total_cmp);
            tz
        }
    };

    let lo = tz.iter().take_while(|t| **t <= x0).count();
    let mut hi = tz.len();
    while hi > lo && tz[hi - 1] > x1 {
        hi -= 1;
    }
    tz.truncate(hi);
    tz.drain(..lo);
    let m = tz.len();

    let mut bins: Vec<Bin> = (0..=m)
        .map(|i| {
            Bin::empty(
                if i > 0 { tz[i - 1] } else { x0 },
                if i < m { tz[i] } else { x1 },
            )
        })
        .collect();

    for (i, &x) in values.iter().enumerate() {
        if !(x0 <= x && x <= x1) {
            continue;
        }
        let j = if step.is_finite() && step > 0. {
            (((x - x0) / step).floor() as usize).min(m)
        } else if step.is_finite() && step < 0. {
            let j = ((x0 - x) * step).floor() as usize;
            (j + tz.get(j).is_some_and(|t| *t <= x) as usize).min(m)
        } else {
            tz.partition_point(|t| *t <= x)
        };
        bins[j].indices.push(i);
    }
    tracing::trace!(bins = bins.len(), x0, x1, "binned values");
    bins
}

/// Quantile `p` of ascending `sorted`, interpolated at position `(n - 1) * p`.
fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let Some(&first) = sorted.first() else {
        return f64::NAN;
    };
    let last = sorted.len() - 1;
    if p <= 0. || last == 0 {
        return first;
    }
    if p >= 1. {
        return sorted[last];
    }
    let i = last as f64 * p;
    let i0 = i.floor() as usize;
    let lo = sorted[i0];
    let hi = sorted[(i0 + 1).min(last)];
    lo + (hi - lo) * (i - i0 as f64)
}

fn extent(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
