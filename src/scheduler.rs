use crate::config::Config;
use crate::error::Error;
use log::debug;
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// A monotonic time source. Timestamps are durations since some fixed
/// origin, so "difference between two timestamps" is plain subtraction.
pub trait Clock {
    fn now(&mut self) -> Result<Duration, Error>;
}

/// wall clock, measured from when it was created
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&mut self) -> Result<Duration, Error> {
        Ok(self.origin.elapsed())
    }
}

/// clock that only moves when told to; for tests and replays. Clones share
/// the same time, so one handle can drive a clock owned elsewhere
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&mut self) -> Result<Duration, Error> {
        Ok(self.now.get())
    }
}

/// the three things the scheduler paces
pub trait Clocked {
    /// run one instruction
    fn execute(&mut self) -> Result<(), Error>;
    /// count the timers down once
    fn tick(&mut self);
    /// redraw the screen
    fn present(&mut self) -> Result<(), Error>;
}

/// Fires at most once per poll, and only once a full period has passed
/// since it last fired. Late polls drift the schedule rather than
/// bunching up to catch up.
#[derive(Debug, Clone)]
pub struct Gate {
    period: Duration,
    last_fired: Duration,
    count: u64,
}

impl Gate {
    pub fn new(period: Duration, now: Duration) -> Self {
        Gate {
            period,
            last_fired: now,
            count: 0,
        }
    }

    /// a gate firing `hz` times a second; zero is treated as one
    pub fn with_frequency(hz: u32, now: Duration) -> Self {
        Gate::new(Duration::from_nanos(1_000_000_000 / hz.max(1) as u64), now)
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn poll(&mut self, now: Duration) -> bool {
        if now.saturating_sub(self.last_fired) >= self.period {
            self.last_fired = now;
            self.count += 1;
            true
        } else {
            false
        }
    }

    /// how long until the next poll would fire
    pub fn until_due(&self, now: Duration) -> Duration {
        self.period
            .saturating_sub(now.saturating_sub(self.last_fired))
    }

    /// firings since last asked
    pub fn take_count(&mut self) -> u64 {
        std::mem::take(&mut self.count)
    }
}

/// which gates went off during a poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fired {
    pub instruction: bool,
    pub timer: bool,
    pub frame: bool,
}

/// Paces instruction execution, timer ticks and (when the display is
/// decoupled) screen refreshes off one clock, without any of them waiting
/// on the others.
pub struct Scheduler {
    instructions: Gate,
    timers: Gate,
    frames: Option<Gate>,
    report: Gate,
}

impl Scheduler {
    pub fn new(config: &Config, now: Duration) -> Self {
        Scheduler {
            instructions: Gate::with_frequency(config.instructions_per_second, now),
            timers: Gate::with_frequency(config.timer_frequency, now),
            frames: config
                .decouple_display
                .then(|| Gate::with_frequency(config.frame_rate, now)),
            report: Gate::new(Duration::from_secs(1), now),
        }
    }

    /// give every gate one chance to fire
    pub fn poll(&mut self, now: Duration, machine: &mut impl Clocked) -> Result<Fired, Error> {
        let mut fired = Fired::default();

        if self.instructions.poll(now) {
            machine.execute()?;
            fired.instruction = true;
        }
        if self.timers.poll(now) {
            machine.tick();
            fired.timer = true;
        }
        if let Some(frames) = self.frames.as_mut() {
            if frames.poll(now) {
                machine.present()?;
                fired.frame = true;
            }
        }
        if self.report.poll(now) {
            debug!(
                "rates: {} instructions/s, {} ticks/s, {} frames/s",
                self.instructions.take_count(),
                self.timers.take_count(),
                self.frames.as_mut().map_or(0, Gate::take_count),
            );
        }
        Ok(fired)
    }

    /// time until the soonest gate is due; what the caller can safely sleep
    pub fn until_next(&self, now: Duration) -> Duration {
        let mut next = self
            .instructions
            .until_due(now)
            .min(self.timers.until_due(now));
        if let Some(frames) = &self.frames {
            next = next.min(frames.until_due(now));
        }
        next
    }
}
