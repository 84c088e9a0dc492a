use std::time::Duration;

use thiserror::Error;

use super::timer::FixedHz;
use crate::animation::LoopState;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("the frame loop was disposed and cannot be restarted")]
    Disposed,
}

/// Permission to run one tick now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickRequest {
    pub number: u64,
    /// Display refreshes that passed without a tick since the previous one
    pub dropped: u32,
}

/// Decides when the animation step runs.
///
/// A tick runs at most once per display refresh, and only when one was
/// requested. Requests coalesce: asking twice before the next refresh still
/// yields a single tick. Refreshes missed because a tick ran long are counted
/// as dropped and never replayed.
#[derive(Debug)]
pub struct FrameScheduler {
    state: LoopState,
    requested: bool,
    refresh: FixedHz,
    last_poll: Option<Duration>,
    ticks: u64,
    dropped: u64,
}

impl FrameScheduler {
    pub fn new(refresh_hz: f32) -> Self {
        Self {
            state: LoopState::Stopped,
            requested: false,
            refresh: FixedHz::new(refresh_hz),
            last_poll: None,
            ticks: 0,
            dropped: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs_f32(self.refresh.interval)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn dropped_frames(&self) -> u64 {
        self.dropped
    }

    pub fn has_pending_request(&self) -> bool {
        self.requested
    }

    /// Enter `Running` and request the first tick, which fires on the next poll
    pub fn start(&mut self) -> Result<(), SchedulerError> {
        match self.state {
            LoopState::Disposed => Err(SchedulerError::Disposed),
            LoopState::Running => Ok(()),
            LoopState::Stopped => {
                self.state = LoopState::Running;
                self.requested = true;
                self.last_poll = None;
                self.refresh.prime();
                Ok(())
            }
        }
    }

    /// Back to `Stopped`; pending requests are discarded
    pub fn stop(&mut self) {
        if self.state == LoopState::Running {
            self.state = LoopState::Stopped;
        }
        self.requested = false;
    }

    pub fn dispose(&mut self) {
        self.state = LoopState::Disposed;
        self.requested = false;
    }

    /// Ask for another tick at the next refresh. Returns false when the loop
    /// is not running.
    pub fn request_next_tick(&mut self) -> bool {
        if self.state != LoopState::Running {
            return false;
        }
        self.requested = true;
        true
    }

    /// Check whether a tick should run at time `now`
    pub fn poll(&mut self, now: Duration) -> Option<TickRequest> {
        let delta = self
            .last_poll
            .map(|last| now.saturating_sub(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_poll = Some(now);

        let due = self.refresh.drain(delta);
        if self.state != LoopState::Running || !self.requested || due == 0 {
            return None;
        }

        self.requested = false;
        let dropped = due - 1;
        self.dropped += u64::from(dropped);
        let request = TickRequest {
            number: self.ticks,
            dropped,
        };
        self.ticks += 1;
        Some(request)
    }

    /// Time until the next refresh boundary, for event-loop wakeups
    pub fn time_to_next_refresh(&self) -> Duration {
        Duration::from_secs_f32(self.refresh.remaining())
    }
}
