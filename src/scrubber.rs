//! Play/pause control stepping through a sequence of values.

use std::{fmt::Display, time::Duration};

use crate::{
    error::ScrubberError,
    markup::Element,
    scheduler::{Scheduler, TimerId},
};

/// Produces the readout shown next to the slider from `(value, index, values)`.
pub type ScrubberFormat<T> = Box<dyn Fn(&T, usize, &[T]) -> String>;
type Listener<T> = Box<dyn FnMut(&T, usize)>;

const FORM_STYLE: &str = "font: 12px var(--sans-serif); font-variant-numeric: tabular-nums; display: flex; height: 33px; align-items: center;";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
    fn delta(self) -> isize {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// What the scrubber is currently waiting on. Each running mode owns exactly
/// one scheduler handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Stopped,
    RunningFrame(TimerId),
    RunningInterval(TimerId),
    PendingLoopDelay { timer: TimerId },
}

impl RunMode {
    pub fn timer(self) -> Option<TimerId> {
        match self {
            RunMode::Stopped => None,
            RunMode::RunningFrame(t)
            | RunMode::RunningInterval(t)
            | RunMode::PendingLoopDelay { timer: t } => Some(t),
        }
    }
    pub fn is_running(self) -> bool {
        self != RunMode::Stopped
    }
}

pub struct ScrubberOptions<T> {
    format: ScrubberFormat<T>,
    initial: usize,
    delay: Option<Duration>,
    autoplay: bool,
    looping: bool,
    loop_delay: Option<Duration>,
    alternate: bool,
}

impl<T: Display + 'static> ScrubberOptions<T> {
    pub fn new() -> Self {
        Self::with_format(|v: &T, _: usize, _: &[T]| v.to_string())
    }
}

impl<T: Display + 'static> Default for ScrubberOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ScrubberOptions<T> {
    pub fn with_format(format: impl Fn(&T, usize, &[T]) -> String + 'static) -> Self {
        Self {
            format: Box::new(format),
            initial: 0,
            delay: None,
            autoplay: true,
            looping: true,
            loop_delay: None,
            alternate: false,
        }
    }
    pub fn set_format(&mut self, format: impl Fn(&T, usize, &[T]) -> String + 'static) -> &mut Self {
        self.format = Box::new(format);
        self
    }
    pub fn set_initial(&mut self, initial: usize) -> &mut Self {
        self.initial = initial;
        self
    }
    /// Steps on a fixed interval instead of every animation frame.
    pub fn set_delay(&mut self, delay: Duration) -> &mut Self {
        self.delay = Some(delay);
        self
    }
    pub fn set_autoplay(&mut self, autoplay: bool) -> &mut Self {
        self.autoplay = autoplay;
        self
    }
    pub fn set_loop(&mut self, looping: bool) -> &mut Self {
        self.looping = looping;
        self
    }
    /// Pause held at either end before looping around.
    pub fn set_loop_delay(&mut self, delay: Duration) -> &mut Self {
        self.loop_delay = Some(delay);
        self
    }
    /// Bounce between the ends instead of wrapping.
    pub fn set_alternate(&mut self, alternate: bool) -> &mut Self {
        self.alternate = alternate;
        self
    }
}

/// A slider over `values` with a play/pause button.
///
/// The scrubber never owns a timer itself: it asks a [`Scheduler`] for
/// callbacks and expects the host to report them through
/// [`Scrubber::handle_timer`].
pub struct Scrubber<T> {
    values: Vec<T>,
    index: usize,
    direction: Direction,
    mode: RunMode,
    readout: String,
    format: ScrubberFormat<T>,
    delay: Option<Duration>,
    looping: bool,
    loop_delay: Option<Duration>,
    alternate: bool,
    listeners: Vec<Listener<T>>,
}

impl<T> Scrubber<T> {
    pub fn new<I, S>(values: I, options: ScrubberOptions<T>, sched: &mut S) -> Result<Self, ScrubberError>
    where
        I: IntoIterator<Item = T>,
        S: Scheduler,
    {
        let values: Vec<T> = values.into_iter().collect();
        if values.is_empty() {
            return Err(ScrubberError::EmptyValues);
        }
        if options.initial >= values.len() {
            return Err(ScrubberError::InitialOutOfRange {
                initial: options.initial,
                len: values.len(),
            });
        }
        let mut scrubber = Self {
            values,
            index: options.initial,
            direction: Direction::Forward,
            mode: RunMode::Stopped,
            readout: String::new(),
            format: options.format,
            delay: options.delay,
            looping: options.looping,
            loop_delay: options.loop_delay,
            alternate: options.alternate,
            listeners: Vec::new(),
        };
        scrubber.notify();
        if options.autoplay {
            scrubber.start(sched);
        }
        Ok(scrubber)
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
    pub fn value(&self) -> &T {
        &self.values[self.index]
    }
    pub fn index(&self) -> usize {
        self.index
    }
    pub fn direction(&self) -> Direction {
        self.direction
    }
    pub fn run_mode(&self) -> RunMode {
        self.mode
    }
    pub fn is_running(&self) -> bool {
        self.mode.is_running()
    }
    /// Text of the output element.
    pub fn readout(&self) -> &str {
        &self.readout
    }
    pub fn button_label(&self) -> &'static str {
        if self.is_running() {
            "Pause"
        } else {
            "Play"
        }
    }

    /// Registers a callback run with `(value, index)` after every step.
    pub fn on_input(&mut self, listener: impl FnMut(&T, usize) + 'static) -> &mut Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Button press: pauses when running, otherwise steps once and plays.
    pub fn click<S: Scheduler>(&mut self, sched: &mut S) {
        if self.is_running() {
            self.stop(sched);
            return;
        }
        let last = self.values.len() - 1;
        self.direction = if self.alternate && self.index == last {
            Direction::Backward
        } else {
            Direction::Forward
        };
        self.index = self.offset(self.direction.delta());
        self.notify();
        self.start(sched);
    }

    pub fn play<S: Scheduler>(&mut self, sched: &mut S) {
        if !self.is_running() {
            self.click(sched);
        }
    }

    pub fn pause<S: Scheduler>(&mut self, sched: &mut S) {
        if self.is_running() {
            self.stop(sched);
        }
    }

    /// User moved the slider: playback stops and the position is clamped to
    /// the slider's range.
    pub fn drag<S: Scheduler>(&mut self, index: usize, sched: &mut S) {
        if self.is_running() {
            self.stop(sched);
        }
        self.seek(index);
    }

    /// Moves to `index` (clamped) without touching playback.
    pub fn seek(&mut self, index: usize) {
        self.index = index.min(self.values.len() - 1);
        self.notify();
    }

    /// Delivers a due callback. Ids other than the active handle are ignored.
    pub fn handle_timer<S: Scheduler>(&mut self, id: TimerId, sched: &mut S) {
        match self.mode {
            RunMode::RunningFrame(t) | RunMode::RunningInterval(t) if t == id => self.tick(sched),
            RunMode::PendingLoopDelay { timer } if timer == id => {
                self.mode = RunMode::Stopped;
                self.step();
                self.start(sched);
            }
            mode => tracing::trace!(id = id.raw(), ?mode, "ignoring stale timer"),
        }
    }

    /// Stops playback and releases the pending callback, if any.
    pub fn dispose<S: Scheduler>(mut self, sched: &mut S) {
        self.stop(sched);
        tracing::debug!(index = self.index, "scrubber disposed");
    }

    fn tick<S: Scheduler>(&mut self, sched: &mut S) {
        let terminal = match self.direction {
            Direction::Forward => self.values.len() - 1,
            Direction::Backward => 0,
        };
        if self.index == terminal {
            if !self.looping {
                self.stop(sched);
                return;
            }
            if self.alternate {
                self.direction = self.direction.reversed();
            }
            if let Some(delay) = self.loop_delay {
                self.cancel_active(sched);
                let timer = sched.set_timeout(delay);
                self.mode = RunMode::PendingLoopDelay { timer };
                tracing::debug!(index = self.index, ?delay, "holding before loop");
                return;
            }
        }
        if self.delay.is_none() {
            self.mode = RunMode::RunningFrame(sched.request_animation_frame());
        }
        self.step();
    }

    fn offset(&self, delta: isize) -> usize {
        let len = self.values.len() as isize;
        (self.index as isize + delta).rem_euclid(len) as usize
    }

    fn step(&mut self) {
        self.index = self.offset(self.direction.delta());
        self.notify();
    }

    fn notify(&mut self) {
        let value = &self.values[self.index];
        self.readout = (self.format)(value, self.index, &self.values);
        for listener in &mut self.listeners {
            listener(value, self.index);
        }
    }

    fn start<S: Scheduler>(&mut self, sched: &mut S) {
        self.cancel_active(sched);
        self.mode = match self.delay {
            None => RunMode::RunningFrame(sched.request_animation_frame()),
            Some(delay) => RunMode::RunningInterval(sched.set_interval(delay)),
        };
        debug_assert!(self.mode.timer().is_some_and(|t| sched.is_pending(t)));
        tracing::debug!(index = self.index, mode = ?self.mode, "scrubber started");
    }

    fn stop<S: Scheduler>(&mut self, sched: &mut S) {
        self.cancel_active(sched);
        tracing::debug!(index = self.index, "scrubber stopped");
    }

    fn cancel_active<S: Scheduler>(&mut self, sched: &mut S) {
        if let Some(t) = self.mode.timer() {
            sched.cancel(t);
            debug_assert!(!sched.is_pending(t));
        }
        self.mode = RunMode::Stopped;
    }

    /// The control as an HTML form.
    pub fn to_html(&self) -> Element {
        Element::new("form")
            .attr("style", FORM_STYLE)
            .child(
                Element::new("button")
                    .attr("name", "b")
                    .attr("type", "button")
                    .attr("style", "margin-right: 0.4em; width: 5em;")
                    .text(self.button_label()),
            )
            .child(
                Element::new("label")
                    .attr("style", "display: flex; align-items: center; width: 100%; max-width: 800px")
                    .child(
                        Element::new("input")
                            .attr("name", "i")
                            .attr("type", "range")
                            .attr("min", 0)
                            .attr("max", self.values.len() - 1)
                            .attr("value", self.index)
                            .attr("step", 1)
                            .attr("style", "width: 70%;"),
                    )
                    .child(
                        Element::new("output")
                            .attr("name", "o")
                            .attr("style", "margin-left: 0.4em;")
                            .text(&self.readout),
                    ),
            )
    }
}
