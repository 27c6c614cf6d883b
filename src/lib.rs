//! Histogram charts and a sequence scrubber.
//!
//! [`HistogramOptions`] resolves into a [`Histogram`] that renders to SVG
//! markup or onto any `plotters` drawing area. [`Scrubber`] is a play/pause
//! slider driven by a host-provided [`Scheduler`].
//!
//! ```
//! use histscrub::{HistogramOptions, Thresholds};
//!
//! let mut options = HistogramOptions::<f64>::new();
//! options.set_thresholds(Thresholds::Count(10)).set_label("value");
//! let chart = options.resolve().unwrap();
//! let svg = chart.render(&[1.0, 2.0, 2.5, 3.0, 7.0]);
//! assert_eq!(svg.name(), "svg");
//! ```

pub mod axis;
pub mod binning;
pub mod error;
pub mod format;
pub mod histogram;
pub mod markup;
pub mod scale;
pub mod scheduler;
pub mod scrubber;
pub mod ticks;

pub use binning::{bin, Bin, ThresholdFn, Thresholds};
pub use error::{ChartError, ScrubberError};
pub use format::FormatSpec;
pub use histogram::{Accessor, Histogram, HistogramLayout, HistogramOptions, Margins};
pub use markup::{Element, Node};
pub use scale::{Scale, ScaleKind};
pub use scheduler::{Scheduler, TimerId, VirtualClock};
pub use scrubber::{Direction, RunMode, Scrubber, ScrubberOptions};

#[derive(Debug, Clone, PartialEq)]
enum DrawRange<A> {
    Auto,
    Static(A),
}

/// Records that are numbers themselves.
pub trait Datum {
    fn value(&self) -> f64;
}

macro_rules! impl_datum {
    ($($t:ty),*) => {
        $(impl Datum for $t {
            fn value(&self) -> f64 {
                *self as f64
            }
        })*
    };
}

impl_datum!(f64, f32, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
