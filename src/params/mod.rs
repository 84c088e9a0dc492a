//! Parameter store: the live values behind a scene's debug panel.
//!
//! Each scene owns one `ParameterStore`. Values are typed (number, toggle,
//! color, choice, action) and every write is checked against the declared
//! spec, so a stored number is always inside its bounds and a stored choice
//! is always one of its options.

mod error;
mod spec;
mod store;

pub use error::ParamError;
pub use spec::{ChoiceOption, ParamKind, ParamSpec, ParamValue};
pub use store::{ClampPolicy, Parameter, ParameterStore, Preset, SetOutcome};
