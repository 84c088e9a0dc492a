use std::collections::VecDeque;

use crate::math::Color;
use crate::params::{ParamError, ParamKind, ParamValue};

/// A parameter edit waiting to be applied to the scene graph
#[derive(Debug, Clone, PartialEq)]
pub struct ParamChange {
    pub name: String,
    pub value: ParamValue,
}

impl ParamChange {
    pub fn new(name: &str, value: impl Into<ParamValue>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
        }
    }

    pub fn number(&self) -> Result<f32, ParamError> {
        self.value.as_number().ok_or_else(|| self.mismatch(ParamKind::Number))
    }

    pub fn flag(&self) -> Result<bool, ParamError> {
        self.value.as_bool().ok_or_else(|| self.mismatch(ParamKind::Toggle))
    }

    pub fn color(&self) -> Result<Color, ParamError> {
        self.value.as_color().ok_or_else(|| self.mismatch(ParamKind::Color))
    }

    pub fn choice(&self) -> Result<&str, ParamError> {
        self.value.as_choice().ok_or_else(|| self.mismatch(ParamKind::Choice))
    }

    fn mismatch(&self, expected: ParamKind) -> ParamError {
        ParamError::TypeMismatch {
            name: self.name.clone(),
            expected,
            found: self.value.kind(),
        }
    }
}

/// FIFO of pending edits between the UI and the scene reducer
#[derive(Debug, Default)]
pub struct ChangeQueue {
    pending: VecDeque<ParamChange>,
}

impl ChangeQueue {
    pub fn push(&mut self, change: ParamChange) {
        self.pending.push_back(change);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn drain(&mut self) -> Vec<ParamChange> {
        self.pending.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_preserves_order_and_empties() {
        let mut queue = ChangeQueue::default();
        queue.push(ParamChange::new("posX", 1.0));
        queue.push(ParamChange::new("posY", 2.0));

        let drained = queue.drain();
        assert_eq!(drained[0].name, "posX");
        assert_eq!(drained[1].name, "posY");
        assert!(queue.is_empty());
    }

    #[test]
    fn typed_access_checks_kind() {
        let change = ParamChange::new("wireframe", true);
        assert_eq!(change.flag(), Ok(true));
        assert!(matches!(change.number(), Err(ParamError::TypeMismatch { .. })));
    }
}
