//! Human-friendly tick generation.
//!
//! Ticks are spaced at 1, 2 or 5 times a power of ten. Fractional steps are
//! carried as a negative inverse increment so that `0.1` is produced as
//! `1 / 10` rather than accumulated, which keeps tick values exact enough to
//! print cleanly.

const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

/// `Math.round` semantics: halves round towards positive infinity.
pub(crate) fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

fn tick_spec(start: f64, stop: f64, count: f64) -> (f64, f64, f64) {
    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.
    } else if error >= E5 {
        5.
    } else if error >= E2 {
        2.
    } else {
        1.
    };
    let (mut i1, mut i2, inc);
    if power < 0. {
        let scale = 10f64.powf(-power) / factor;
        i1 = round_half_up(start * scale);
        i2 = round_half_up(stop * scale);
        if i1 / scale < start {
            i1 += 1.;
        }
        if i2 / scale > stop {
            i2 -= 1.;
        }
        inc = -scale;
    } else {
        let scale = 10f64.powf(power) * factor;
        i1 = round_half_up(start / scale);
        i2 = round_half_up(stop / scale);
        if i1 * scale < start {
            i1 += 1.;
        }
        if i2 * scale > stop {
            i2 -= 1.;
        }
        inc = scale;
    }
    if i2 < i1 && (0.5..2.).contains(&count) {
        return tick_spec(start, stop, count * 2.);
    }
    (i1, i2, inc)
}

/// Tick increment for the given extent.
///
/// A positive result is the step itself; a negative result `-k` means a step
/// of `1 / k`. Non-finite results signal a degenerate extent.
pub fn tick_increment(start: f64, stop: f64, count: f64) -> f64 {
    tick_spec(start, stop, count).2
}

/// Signed step between adjacent ticks, always expressed as a plain number.
pub fn tick_step(start: f64, stop: f64, count: f64) -> f64 {
    let reverse = stop < start;
    let inc = if reverse {
        tick_increment(stop, start, count)
    } else {
        tick_increment(start, stop, count)
    };
    let step = if inc < 0. { 1. / -inc } else { inc };
    if reverse {
        -step
    } else {
        step
    }
}

/// Approximately `count` evenly spaced round values within `[start, stop]`.
///
/// The returned ticks follow the order of the arguments, so a reversed extent
/// yields descending ticks.
pub fn ticks(start: f64, stop: f64, count: f64) -> Vec<f64> {
    if !(count > 0.) {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let reverse = stop < start;
    let (i1, i2, inc) = if reverse {
        tick_spec(stop, start, count)
    } else {
        tick_spec(start, stop, count)
    };
    if !(i2 >= i1) || !i1.is_finite() || !i2.is_finite() {
        return Vec::new();
    }
    let n = (i2 - i1) as usize + 1;
    (0..n)
        .map(|i| {
            let k = if reverse { i2 - i as f64 } else { i1 + i as f64 };
            if inc < 0. {
                k / -inc
            } else {
                k * inc
            }
        })
        .collect()
}

/// Extends `[start, stop]` outward until both ends land on tick boundaries.
pub fn nice(mut start: f64, mut stop: f64, count: f64) -> (f64, f64) {
    let mut previous = None;
    loop {
        let step = tick_increment(start, stop, count);
        if previous == Some(step) || step == 0. || !step.is_finite() {
            return (start, stop);
        } else if step > 0. {
            start = (start / step).floor() * step;
            stop = (stop / step).ceil() * step;
        } else {
            start = (start * step).ceil() / step;
            stop = (stop * step).floor() / step;
        }
        previous = Some(step);
    }
}
