//! Number formatting for tick labels and tooltips.
//!
//! Specifiers follow the familiar `[,][.precision][~][type]` shape:
//! `,` groups thousands, `~` trims insignificant trailing zeros and the type
//! is one of `f`, `%`, `e`, `d`, `s`, `g`, `r` or empty. Negative values use
//! the typographic minus sign.

use std::{fmt, str::FromStr};

use crate::error::ChartError;

const MINUS: char = '\u{2212}';
const SI_PREFIXES: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "\u{b5}", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    /// `""`: shortest significant form, alias of `.12~g`.
    Default,
    /// `f`: fixed point.
    Fixed,
    /// `%`: multiplied by 100, fixed point, with a percent sign.
    Percent,
    /// `e`: exponent notation.
    Exponent,
    /// `d`: rounded integer.
    Decimal,
    /// `s`: significant digits with an SI prefix.
    SiPrefix,
    /// `g`: significant digits, fixed or exponent notation.
    General,
    /// `r`: significant digits, always fixed point.
    Rounded,
}

/// A parsed number format specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatSpec {
    pub comma: bool,
    pub precision: Option<usize>,
    pub trim: bool,
    pub kind: FormatKind,
}

impl Default for FormatSpec {
    fn default() -> Self {
        Self {
            comma: false,
            precision: None,
            trim: false,
            kind: FormatKind::Default,
        }
    }
}

impl FromStr for FormatSpec {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ChartError::InvalidFormat {
            spec: s.to_string(),
        };
        let mut spec = FormatSpec::default();
        let mut rest = s;
        if let Some(r) = rest.strip_prefix(',') {
            spec.comma = true;
            rest = r;
        }
        if let Some(r) = rest.strip_prefix('.') {
            let digits = r.chars().take_while(char::is_ascii_digit).count();
            if digits == 0 {
                return Err(invalid());
            }
            spec.precision = Some(r[..digits].parse().map_err(|_| invalid())?);
            rest = &r[digits..];
        }
        if let Some(r) = rest.strip_prefix('~') {
            spec.trim = true;
            rest = r;
        }
        spec.kind = match rest {
            "" => FormatKind::Default,
            "f" => FormatKind::Fixed,
            "%" => FormatKind::Percent,
            "e" => FormatKind::Exponent,
            "d" => FormatKind::Decimal,
            "s" => FormatKind::SiPrefix,
            "g" => FormatKind::General,
            "r" => FormatKind::Rounded,
            _ => return Err(invalid()),
        };
        Ok(spec)
    }
}

impl fmt::Display for FormatSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.comma {
            f.write_str(",")?;
        }
        if let Some(p) = self.precision {
            write!(f, ".{p}")?;
        }
        if self.trim {
            f.write_str("~")?;
        }
        f.write_str(match self.kind {
            FormatKind::Default => "",
            FormatKind::Fixed => "f",
            FormatKind::Percent => "%",
            FormatKind::Exponent => "e",
            FormatKind::Decimal => "d",
            FormatKind::SiPrefix => "s",
            FormatKind::General => "g",
            FormatKind::Rounded => "r",
        })
    }
}

impl FormatSpec {
    fn significant_precision(&self, default: usize) -> usize {
        self.precision.unwrap_or(default).clamp(1, 21)
    }

    fn fixed_precision(&self) -> usize {
        self.precision.unwrap_or(6).min(20)
    }

    pub fn format(&self, x: f64) -> String {
        if x.is_nan() {
            return "NaN".to_string();
        }
        if x.is_infinite() {
            return if x < 0. {
                format!("{MINUS}Infinity")
            } else {
                "Infinity".to_string()
            };
        }
        let value = x.abs();
        let (mut body, suffix) = match self.kind {
            FormatKind::Default => (to_precision(value, self.significant_precision(12)), ""),
            FormatKind::General => (to_precision(value, self.significant_precision(6)), ""),
            FormatKind::Fixed => (format!("{:.*}", self.fixed_precision(), value), ""),
            FormatKind::Percent => (format!("{:.*}", self.fixed_precision(), value * 100.), "%"),
            FormatKind::Exponent => (to_exponential(value, self.fixed_precision()), ""),
            FormatKind::Decimal => (format!("{:.0}", crate::ticks::round_half_up(value)), ""),
            FormatKind::Rounded => (to_rounded(value, self.significant_precision(6)), ""),
            FormatKind::SiPrefix => to_si(value, self.significant_precision(6)),
        };
        if self.trim || self.kind == FormatKind::Default {
            body = trim_zeros(&body);
        }
        if self.comma {
            body = group_thousands(&body);
        }
        signed(x, body + suffix)
    }
}

fn signed(x: f64, body: String) -> String {
    let nonzero = body
        .chars()
        .take_while(|c| *c != 'e')
        .any(|c| c.is_ascii_digit() && c != '0');
    if x < 0. && nonzero {
        format!("{MINUS}{body}")
    } else {
        body
    }
}

/// Mantissa digits (no decimal point) and decimal exponent of `x` rounded to
/// `p` significant digits.
fn decimal_parts(x: f64, p: usize) -> (String, i32) {
    let s = format!("{:.*e}", p.saturating_sub(1), x);
    let (mantissa, exp) = s.split_once('e').unwrap_or((s.as_str(), "0"));
    (mantissa.replace('.', ""), exp.parse().unwrap_or(0))
}

/// Decimal exponent of `x`, `d.ddd × 10^e`.
pub(crate) fn exponent(x: f64) -> Option<i32> {
    if x == 0. || !x.is_finite() {
        return None;
    }
    let s = format!("{:e}", x.abs());
    s.split_once('e').and_then(|(_, e)| e.parse().ok())
}

fn to_exponential(x: f64, p: usize) -> String {
    let s = format!("{:.*e}", p, x);
    match s.split_once('e') {
        Some((m, e)) if !e.starts_with('-') => format!("{m}e+{e}"),
        _ => s,
    }
}

fn to_precision(x: f64, p: usize) -> String {
    if x == 0. {
        return if p > 1 {
            format!("0.{}", "0".repeat(p - 1))
        } else {
            "0".to_string()
        };
    }
    let (_, e) = decimal_parts(x, p);
    if e < -6 || e >= p as i32 {
        to_exponential(x, p - 1)
    } else {
        format!("{:.*}", (p as i32 - 1 - e) as usize, x)
    }
}

fn to_rounded(x: f64, p: usize) -> String {
    if x == 0. {
        return "0".to_string();
    }
    let (digits, e) = decimal_parts(x, p);
    let decimals = p as i32 - 1 - e;
    if decimals >= 0 {
        format!("{:.*}", decimals as usize, x)
    } else {
        format!("{digits}{}", "0".repeat((-decimals) as usize))
    }
}

fn to_si(x: f64, p: usize) -> (String, &'static str) {
    if x == 0. {
        return (to_precision(0., p), "");
    }
    let (coefficient, e) = decimal_parts(x, p);
    let prefix_exponent = (e as f64 / 3.).floor().clamp(-8., 8.) as i32;
    let i = e - prefix_exponent * 3 + 1;
    let n = coefficient.len() as i32;
    let digits = if i == n {
        coefficient
    } else if i > n {
        format!("{coefficient}{}", "0".repeat((i - n) as usize))
    } else if i > 0 {
        let (head, tail) = coefficient.split_at(i as usize);
        format!("{head}.{tail}")
    } else {
        let scaled = x / 10f64.powi(prefix_exponent * 3);
        format!("{:.*}", (p as i32 - e + prefix_exponent * 3 - 1).max(0) as usize, scaled)
    };
    (digits, SI_PREFIXES[(prefix_exponent + 8) as usize])
}

fn trim_zeros(s: &str) -> String {
    let (number, exp) = match s.find('e') {
        Some(i) => s.split_at(i),
        None => (s, ""),
    };
    if !number.contains('.') {
        return s.to_string();
    }
    let trimmed = number.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed}{exp}")
}

fn group_thousands(s: &str) -> String {
    let end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    let (int, rest) = s.split_at(end);
    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, c) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped + rest
}

/// Precision for fixed notation given the distance between ticks.
pub fn precision_fixed(step: f64) -> Option<usize> {
    exponent(step).map(|e| (-e).max(0) as usize)
}

/// Significant digits needed to tell ticks `step` apart up to `max`.
pub fn precision_round(step: f64, max: f64) -> Option<usize> {
    let step = step.abs();
    let max = max.abs() - step;
    let (es, em) = (exponent(step)?, exponent(max)?);
    Some((em - es).max(0) as usize + 1)
}

/// Precision for SI-prefixed output of values near `value` spaced by `step`.
pub fn precision_prefix(step: f64, value: f64) -> Option<usize> {
    let ev = exponent(value)?;
    let es = exponent(step)?;
    Some(((ev as f64 / 3.).floor().clamp(-8., 8.) as i32 * 3 - es).max(0) as usize)
}

/// Prints a number the way a JavaScript engine stringifies it.
pub fn js_number(x: f64) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x < 0. { "-Infinity" } else { "Infinity" }.to_string();
    }
    if x == 0. {
        return "0".to_string();
    }
    let abs = x.abs();
    if abs >= 1e21 || abs < 1e-6 {
        let s = format!("{x:e}");
        match s.split_once('e') {
            Some((m, e)) if !e.starts_with('-') => format!("{m}e+{e}"),
            _ => s,
        }
    } else {
        format!("{x}")
    }
}
