//! Continuous scales mapping a data domain onto a pixel range.

use crate::{
    format::{precision_fixed, precision_prefix, precision_round, FormatKind, FormatSpec},
    ticks::{tick_step, ticks},
};

/// Transformation applied before linear interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScaleKind {
    #[default]
    Linear,
    /// Base-10 logarithm; the domain must not straddle zero.
    Log,
    Sqrt,
    Pow(f64),
}

impl ScaleKind {
    fn exponent(self) -> f64 {
        match self {
            ScaleKind::Sqrt => 0.5,
            ScaleKind::Pow(k) => k,
            _ => 1.,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    kind: ScaleKind,
    domain: (f64, f64),
    range: (f64, f64),
}

impl Scale {
    pub fn new(kind: ScaleKind, domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            kind,
            domain,
            range,
        }
    }

    pub fn linear(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self::new(ScaleKind::Linear, domain, range)
    }

    pub fn kind(&self) -> ScaleKind {
        self.kind
    }
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Log scales over a negative domain are mirrored through the origin.
    fn reflected(&self) -> bool {
        self.kind == ScaleKind::Log && self.domain.0 < 0.
    }

    /// Maps a domain value into transformed space.
    pub fn transform(&self, x: f64) -> f64 {
        match self.kind {
            ScaleKind::Linear => x,
            ScaleKind::Log if self.reflected() => -(-x).log10(),
            ScaleKind::Log => x.log10(),
            ScaleKind::Sqrt | ScaleKind::Pow(_) => {
                let k = self.kind.exponent();
                if k == 1. {
                    x
                } else {
                    x.signum() * x.abs().powf(k)
                }
            }
        }
    }

    /// Inverse of [`Scale::transform`].
    pub fn untransform(&self, t: f64) -> f64 {
        match self.kind {
            ScaleKind::Linear => t,
            ScaleKind::Log if self.reflected() => -(10f64.powf(-t)),
            ScaleKind::Log => 10f64.powf(t),
            ScaleKind::Sqrt | ScaleKind::Pow(_) => {
                let k = self.kind.exponent();
                if k == 1. {
                    t
                } else {
                    t.signum() * t.abs().powf(1. / k)
                }
            }
        }
    }

    /// Domain in transformed space.
    pub fn transformed_domain(&self) -> (f64, f64) {
        (self.transform(self.domain.0), self.transform(self.domain.1))
    }

    /// Position of `x` within the domain: 0 at the start, 1 at the end.
    ///
    /// A collapsed domain places every value halfway.
    fn normalize(&self, x: f64) -> f64 {
        let (t0, t1) = self.transformed_domain();
        let span = t1 - t0;
        if span.is_nan() {
            f64::NAN
        } else if span == 0. {
            0.5
        } else {
            (self.transform(x) - t0) / span
        }
    }

    pub fn map(&self, x: f64) -> f64 {
        let (r0, r1) = self.range;
        r0 + self.normalize(x) * (r1 - r0)
    }

    pub fn invert(&self, y: f64) -> f64 {
        let (r0, r1) = self.range;
        let (t0, t1) = self.transformed_domain();
        let t = if r1 - r0 == 0. { 0.5 } else { (y - r0) / (r1 - r0) };
        self.untransform(t0 + t * (t1 - t0))
    }

    /// Roughly `count` representative values from the domain.
    pub fn ticks(&self, count: f64) -> Vec<f64> {
        match self.kind {
            ScaleKind::Log => self.log_ticks(count),
            _ => ticks(self.domain.0, self.domain.1, count),
        }
    }

    fn log_ticks(&self, count: f64) -> Vec<f64> {
        let (mut u, mut v) = self.domain;
        let reverse = v < u;
        if reverse {
            std::mem::swap(&mut u, &mut v);
        }
        if u < 0. && v < 0. {
            let mirrored = Scale::new(ScaleKind::Log, (-v, -u), self.range);
            let mut z: Vec<f64> = mirrored.log_ticks(count).into_iter().map(|t| -t).collect();
            z.reverse();
            if reverse {
                z.reverse();
            }
            return z;
        }
        if !(u > 0.) || !v.is_finite() {
            return Vec::new();
        }
        let (i, j) = (u.log10(), v.log10());
        let mut z = Vec::new();
        if j - i < count {
            for e in (i.floor() as i32)..=(j.ceil() as i32) {
                for k in 1..10 {
                    let t = if e < 0 {
                        k as f64 / 10f64.powi(-e)
                    } else {
                        k as f64 * 10f64.powi(e)
                    };
                    if t < u {
                        continue;
                    }
                    if t > v {
                        break;
                    }
                    z.push(t);
                }
            }
            if (z.len() as f64) * 2. < count {
                z = ticks(u, v, count);
            }
        } else {
            z = ticks(i, j, (j - i).min(count))
                .into_iter()
                .map(|e| 10f64.powf(e))
                .collect();
        }
        if reverse {
            z.reverse();
        }
        z
    }

    /// Formatter suited to the ticks produced by [`Scale::ticks`] for the same
    /// `count`. A missing precision in `spec` is derived from the tick step.
    pub fn tick_format(&self, count: f64, spec: Option<FormatSpec>) -> TickFormat {
        match self.kind {
            ScaleKind::Log => self.log_tick_format(count, spec),
            _ => TickFormat {
                spec: self.linear_tick_spec(count, spec),
                max_mantissa: None,
            },
        }
    }

    fn linear_tick_spec(&self, count: f64, spec: Option<FormatSpec>) -> FormatSpec {
        let (start, stop) = self.domain;
        let step = tick_step(start, stop, count);
        let mut spec = spec.unwrap_or(FormatSpec {
            comma: true,
            kind: FormatKind::Fixed,
            ..FormatSpec::default()
        });
        if spec.precision.is_some() {
            return spec;
        }
        let widest = start.abs().max(stop.abs());
        spec.precision = match spec.kind {
            FormatKind::SiPrefix => precision_prefix(step, widest),
            FormatKind::Default
            | FormatKind::Exponent
            | FormatKind::General
            | FormatKind::Rounded => precision_round(step, widest)
                .map(|p| p.saturating_sub((spec.kind == FormatKind::Exponent) as usize)),
            FormatKind::Fixed => precision_fixed(step),
            FormatKind::Percent => precision_fixed(step).map(|p| p.saturating_sub(2)),
            FormatKind::Decimal => None,
        };
        spec
    }

    fn log_tick_format(&self, count: f64, spec: Option<FormatSpec>) -> TickFormat {
        let mut spec = spec.unwrap_or(FormatSpec {
            kind: FormatKind::SiPrefix,
            ..FormatSpec::default()
        });
        if spec.precision.is_none() {
            spec.trim = true;
        }
        let max_mantissa = if count.is_finite() {
            let shown = self.ticks(10.).len().max(1) as f64;
            Some((10. * count / shown).max(1.))
        } else {
            None
        };
        TickFormat { spec, max_mantissa }
    }
}

/// Tick label formatter returned by [`Scale::tick_format`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickFormat {
    spec: FormatSpec,
    /// Log scales label only ticks whose leading digit is at most this.
    max_mantissa: Option<f64>,
}

impl TickFormat {
    pub fn spec(&self) -> FormatSpec {
        self.spec
    }

    pub fn format(&self, x: f64) -> String {
        if let Some(k) = self.max_mantissa {
            let mut i = x / 10f64.powf(crate::ticks::round_half_up(x.abs().log10()));
            if i * 10. < 9.5 {
                i *= 10.;
            }
            if i.abs() > k {
                return String::new();
            }
        }
        self.spec.format(x)
    }
}
