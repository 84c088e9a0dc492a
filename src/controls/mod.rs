//! Control binding layer: widgets bound to parameters, and the queue of
//! edits they produce.

mod panel;
mod queue;

pub use panel::{Binding, ChangeCallback, ControlPanel, Section, Widget};
pub use queue::{ChangeQueue, ParamChange};
