/// Self-contained timers - accumulate delta time and decide when to fire

/// Fixed rate timer - fires at specific Hz
#[derive(Debug, Clone, Copy)]
pub struct FixedHz {
    pub interval: f32,
    pub accumulator: f32,
}

impl FixedHz {
    /// Create timer that fires at given frequency
    pub fn new(hz: f32) -> Self {
        Self {
            interval: 1.0 / hz.max(f32::EPSILON),
            accumulator: 0.0,
        }
    }

    /// Update with delta and consume every whole interval that has passed.
    /// Returns how many intervals that was; none are carried over.
    pub fn drain(&mut self, delta: f32) -> u32 {
        self.accumulator += delta;
        // tolerance absorbs f32 rounding of exact multiples
        let due = (self.accumulator / self.interval + 1e-4).floor();
        self.accumulator = (self.accumulator - due * self.interval).max(0.0);
        due as u32
    }

    /// Make the next `drain` fire regardless of delta
    pub fn prime(&mut self) {
        self.accumulator = self.interval;
    }

    /// Seconds left until the next interval boundary
    pub fn remaining(&self) -> f32 {
        (self.interval - self.accumulator).max(0.0)
    }
}

/// Frame counter - fires every N ticks
#[derive(Debug, Clone, Copy)]
pub struct EveryNTicks {
    interval: u64,
    count: u64,
}

impl EveryNTicks {
    /// Create timer that fires every N ticks
    pub fn new(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
            count: 0,
        }
    }

    /// Tick once, returns true if should fire
    pub fn tick(&mut self) -> bool {
        self.count += 1;
        if self.count >= self.interval {
            self.count = 0;
            true
        } else {
            false
        }
    }
}
