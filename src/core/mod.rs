//! Loop timing: clocks, timers, frame metadata, and the frame scheduler.

mod clock;
mod frame;
mod scheduler;
mod timer;

pub use clock::{Clock, ManualClock, SystemTime, TimeSource};
pub use frame::FrameInfo;
pub use scheduler::{FrameScheduler, SchedulerError, TickRequest};
pub use timer::{EveryNTicks, FixedHz};
