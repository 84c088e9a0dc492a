use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use super::frame::FrameInfo;

/// Monotonic time since some fixed origin
pub trait TimeSource {
    fn now(&self) -> Duration;
}

/// Wall-clock time since construction
#[derive(Debug, Clone, Copy)]
pub struct SystemTime {
    origin: Instant,
}

impl SystemTime {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTime {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven time for headless runs and tests.
///
/// Clones share the same time, so a test can keep one and advance it after
/// handing the other to a runner.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_secs(&self, secs: f32) {
        self.advance(Duration::from_secs_f32(secs));
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Frame clock - turns a time source into numbered frames with deltas
#[derive(Debug)]
pub struct Clock<S: TimeSource> {
    source: S,
    start: Duration,
    last_tick: Option<Duration>,
    frame: u64,
}

impl<S: TimeSource> Clock<S> {
    pub fn new(source: S) -> Self {
        let start = source.now();
        Self {
            source,
            start,
            last_tick: None,
            frame: 0,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn now(&self) -> Duration {
        self.source.now()
    }

    /// Advance one frame. The first frame has a zero delta.
    pub fn tick(&mut self) -> FrameInfo {
        let now = self.source.now();
        let delta = self
            .last_tick
            .map(|last| now.saturating_sub(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_tick = Some(now);

        let info = FrameInfo::new(self.frame, now.saturating_sub(self.start).as_secs_f32(), delta);
        self.frame += 1;
        info
    }
}
