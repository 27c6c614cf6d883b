//! Timer primitives the scrubber is driven by.
//!
//! A host owns the event loop: it hands out [`TimerId`]s through
//! [`Scheduler`] and later reports each due callback back to the widget that
//! requested it. [`VirtualClock`] is such a host over simulated time.

use std::time::Duration;

/// Shortest period a repeating timer may have.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Handle of one scheduled callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

impl TimerId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
    pub fn raw(self) -> u64 {
        self.0
    }
}

pub trait Scheduler {
    /// One-shot callback on the next display frame.
    fn request_animation_frame(&mut self) -> TimerId;
    /// Repeating callback every `period` until cancelled.
    fn set_interval(&mut self, period: Duration) -> TimerId;
    /// One-shot callback after `delay`.
    fn set_timeout(&mut self, delay: Duration) -> TimerId;
    /// Cancels a pending callback. Unknown or already fired ids are ignored.
    fn cancel(&mut self, id: TimerId);
    fn is_pending(&self, id: TimerId) -> bool;
}

#[derive(Debug, Clone)]
struct Timer {
    id: TimerId,
    due: Duration,
    /// Orders timers due at the same instant.
    seq: u64,
    period: Option<Duration>,
}

/// Deterministic [`Scheduler`] advancing only when told to.
#[derive(Debug, Clone)]
pub struct VirtualClock {
    now: Duration,
    frame_period: Duration,
    next_id: u64,
    next_seq: u64,
    timers: Vec<Timer>,
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::with_frame_period(Duration::from_millis(16))
    }

    pub fn with_frame_period(frame_period: Duration) -> Self {
        Self {
            now: Duration::ZERO,
            frame_period: frame_period.max(MIN_PERIOD),
            next_id: 0,
            next_seq: 0,
            timers: Vec::new(),
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn frame_period(&self) -> Duration {
        self.frame_period
    }

    /// Number of callbacks still scheduled.
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    fn schedule(&mut self, delay: Duration, period: Option<Duration>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let seq = self.bump_seq();
        self.timers.push(Timer {
            id,
            due: self.now + delay,
            seq,
            period,
        });
        id
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Advances the clock by `duration`, handing every callback that falls due
    /// to `dispatch` in due-time order. Callbacks scheduled from within
    /// `dispatch` fire in the same run when they fall due before its end.
    pub fn run_for<F>(&mut self, duration: Duration, mut dispatch: F)
    where
        F: FnMut(TimerId, &mut Self),
    {
        let end = self.now + duration;
        while let Some(pos) = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= end)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(i, _)| i)
        {
            let due = self.timers[pos].due;
            let id = self.timers[pos].id;
            self.now = due;
            match self.timers[pos].period {
                Some(period) => {
                    let seq = self.bump_seq();
                    let timer = &mut self.timers[pos];
                    timer.due = due + period;
                    timer.seq = seq;
                }
                None => {
                    self.timers.remove(pos);
                }
            }
            tracing::trace!(id = id.raw(), now = ?self.now, "timer fired");
            dispatch(id, self);
        }
        self.now = end;
    }
}

impl Scheduler for VirtualClock {
    fn request_animation_frame(&mut self) -> TimerId {
        let period = self.frame_period;
        self.schedule(period, None)
    }
    fn set_interval(&mut self, period: Duration) -> TimerId {
        let period = period.max(MIN_PERIOD);
        self.schedule(period, Some(period))
    }
    fn set_timeout(&mut self, delay: Duration) -> TimerId {
        self.schedule(delay, None)
    }
    fn cancel(&mut self, id: TimerId) {
        self.timers.retain(|t| t.id != id);
    }
    fn is_pending(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }
}
