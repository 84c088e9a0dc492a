use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::error::ParamError;
use super::spec::{snap_to_step, ParamKind, ParamSpec, ParamValue};
use crate::math::Color;

/// What `set` does with a number outside the declared bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ClampPolicy {
    /// Store the nearest bound, as a slider would
    #[default]
    Clamp,
    /// Fail with `OutOfRange` and keep the previous value
    Reject,
}

/// Result of a successful `set`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetOutcome {
    /// Stored value differs from the previous one (always true for actions)
    pub changed: bool,
    /// Requested number before clamping, when clamping happened
    pub clamped_from: Option<f32>,
}

/// A declared parameter with its current and default value
#[derive(Debug, Clone)]
pub struct Parameter {
    name: String,
    spec: ParamSpec,
    value: ParamValue,
    default: ParamValue,
}

impl Parameter {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn spec(&self) -> &ParamSpec {
        &self.spec
    }

    pub fn value(&self) -> &ParamValue {
        &self.value
    }

    pub fn default_value(&self) -> &ParamValue {
        &self.default
    }
}

/// Named parameter values, JSON-compatible
pub type Preset = BTreeMap<String, serde_json::Value>;

/// Flat mapping from parameter name to current value, scoped to one scene
#[derive(Debug, Clone, Default)]
pub struct ParameterStore {
    params: Vec<Parameter>,
    index: HashMap<String, usize>,
    policy: ClampPolicy,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: ClampPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> ClampPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: ClampPolicy) {
        self.policy = policy;
    }

    /// Declare a parameter. Out-of-range numeric defaults are clamped
    /// regardless of policy; a default of the wrong type is an error.
    pub fn declare(
        &mut self,
        name: &str,
        spec: ParamSpec,
        default: impl Into<ParamValue>,
    ) -> Result<(), ParamError> {
        if self.index.contains_key(name) {
            return Err(ParamError::DuplicateParameter(name.to_string()));
        }
        spec.validate(name)?;

        let requested = default.into();
        let (value, _) = normalize(name, &spec, requested, ClampPolicy::Clamp)?;

        self.index.insert(name.to_string(), self.params.len());
        self.params.push(Parameter {
            name: name.to_string(),
            spec,
            value: value.clone(),
            default: value,
        });
        Ok(())
    }

    /// Declare a stateless button
    pub fn declare_action(&mut self, name: &str) -> Result<(), ParamError> {
        self.declare(name, ParamSpec::Action, ParamValue::Trigger)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Parameters in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    pub fn parameter(&self, name: &str) -> Result<&Parameter, ParamError> {
        self.index
            .get(name)
            .map(|&i| &self.params[i])
            .ok_or_else(|| ParamError::UnknownParameter(name.to_string()))
    }

    pub fn spec(&self, name: &str) -> Result<&ParamSpec, ParamError> {
        self.parameter(name).map(|p| &p.spec)
    }

    pub fn get(&self, name: &str) -> Result<&ParamValue, ParamError> {
        self.parameter(name).map(|p| &p.value)
    }

    pub fn number(&self, name: &str) -> Result<f32, ParamError> {
        let value = self.get(name)?;
        value.as_number().ok_or_else(|| mismatch(name, ParamKind::Number, value))
    }

    pub fn flag(&self, name: &str) -> Result<bool, ParamError> {
        let value = self.get(name)?;
        value.as_bool().ok_or_else(|| mismatch(name, ParamKind::Toggle, value))
    }

    pub fn color(&self, name: &str) -> Result<Color, ParamError> {
        let value = self.get(name)?;
        value.as_color().ok_or_else(|| mismatch(name, ParamKind::Color, value))
    }

    pub fn choice(&self, name: &str) -> Result<&str, ParamError> {
        let value = self.get(name)?;
        value.as_choice().ok_or_else(|| mismatch(name, ParamKind::Choice, value))
    }

    /// Write a value, enforcing the declared bounds. On error the store is unchanged.
    pub fn set(&mut self, name: &str, value: impl Into<ParamValue>) -> Result<SetOutcome, ParamError> {
        let &idx = self
            .index
            .get(name)
            .ok_or_else(|| ParamError::UnknownParameter(name.to_string()))?;
        let param = &mut self.params[idx];

        let (normalized, clamped_from) = normalize(name, &param.spec, value.into(), self.policy)?;

        let changed = matches!(param.spec, ParamSpec::Action) || param.value != normalized;
        param.value = normalized;

        Ok(SetOutcome { changed, clamped_from })
    }

    /// Current values of every stateful parameter
    pub fn snapshot(&self) -> BTreeMap<String, ParamValue> {
        self.params
            .iter()
            .filter(|p| p.spec.kind() != ParamKind::Action)
            .map(|p| (p.name.clone(), p.value.clone()))
            .collect()
    }

}

fn mismatch(name: &str, expected: ParamKind, found: &ParamValue) -> ParamError {
    ParamError::TypeMismatch {
        name: name.to_string(),
        expected,
        found: found.kind(),
    }
}

/// Check a value against a spec; returns the value to store and the
/// pre-clamp number if clamping happened.
fn normalize(
    name: &str,
    spec: &ParamSpec,
    value: ParamValue,
    policy: ClampPolicy,
) -> Result<(ParamValue, Option<f32>), ParamError> {
    match (spec, value) {
        (ParamSpec::Number { min, max, step }, ParamValue::Number(v)) => {
            let out_of_range = || ParamError::OutOfRange {
                name: name.to_string(),
                value: v,
                min: *min,
                max: *max,
            };
            if !v.is_finite() {
                return Err(out_of_range());
            }

            let outside = v < *min || v > *max;
            if outside && policy == ClampPolicy::Reject {
                return Err(out_of_range());
            }

            let stored = snap_to_step(v, *min, *step).clamp(*min, *max);
            Ok((ParamValue::Number(stored), outside.then_some(v)))
        }
        (ParamSpec::Toggle, v @ ParamValue::Bool(_)) => Ok((v, None)),
        (ParamSpec::Color, v @ ParamValue::Color(_)) => Ok((v, None)),
        (ParamSpec::Color, ParamValue::Choice(text)) => {
            // hex strings arrive as choices from untyped callers
            let color = text.parse::<Color>().map_err(|e| ParamError::Parse {
                name: name.to_string(),
                input: text.clone(),
                reason: e.to_string(),
            })?;
            Ok((ParamValue::Color(color), None))
        }
        (ParamSpec::Choice { options }, ParamValue::Choice(choice)) => {
            if options.iter().any(|o| o.value == choice) {
                Ok((ParamValue::Choice(choice), None))
            } else {
                Err(ParamError::InvalidChoice {
                    name: name.to_string(),
                    value: choice,
                    options: options.iter().map(|o| o.value.clone()).collect(),
                })
            }
        }
        (ParamSpec::Action, _) => Ok((ParamValue::Trigger, None)),
        (spec, other) => Err(mismatch(name, spec.kind(), &other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ParameterStore {
        let mut store = ParameterStore::new();
        store.declare("size", ParamSpec::number(0.1, 1.5, 0.1), 1.0).unwrap();
        store.declare("visible", ParamSpec::Toggle, true).unwrap();
        store
            .declare("color", ParamSpec::Color, Color::from_hex(0x00ff00))
            .unwrap();
        store
            .declare(
                "shape",
                ParamSpec::choice(&[("Cube", "cube"), ("Sphere", "sphere")]),
                "cube",
            )
            .unwrap();
        store
    }

    #[test]
    fn get_returns_declared_default() {
        let store = store();
        assert_eq!(store.number("size").unwrap(), 1.0);
        assert!(store.flag("visible").unwrap());
        assert_eq!(store.choice("shape").unwrap(), "cube");
    }

    #[test]
    fn duplicate_declaration_fails() {
        let mut store = store();
        assert_eq!(
            store.declare("size", ParamSpec::Toggle, false),
            Err(ParamError::DuplicateParameter("size".into()))
        );
    }

    #[test]
    fn out_of_range_default_is_clamped() {
        let mut store = ParameterStore::with_policy(ClampPolicy::Reject);
        store.declare("posX", ParamSpec::number(-4.0, 4.0, 0.1), 5.0).unwrap();
        assert_eq!(store.number("posX").unwrap(), 4.0);
    }

    #[test]
    fn set_clamps_by_default() {
        let mut store = store();
        let outcome = store.set("size", 9.0).unwrap();
        assert_eq!(outcome.clamped_from, Some(9.0));
        assert!(outcome.changed);
        assert_eq!(store.number("size").unwrap(), 1.5);
    }

    #[test]
    fn set_rejects_under_reject_policy() {
        let mut store = store();
        store.set_policy(ClampPolicy::Reject);
        assert!(matches!(store.set("size", -1.0), Err(ParamError::OutOfRange { .. })));
        assert_eq!(store.number("size").unwrap(), 1.0);
    }

    #[test]
    fn set_rejects_nan_under_any_policy() {
        let mut store = store();
        assert!(matches!(store.set("size", f32::NAN), Err(ParamError::OutOfRange { .. })));
    }

    #[test]
    fn same_value_is_unchanged() {
        let mut store = store();
        assert!(!store.set("visible", true).unwrap().changed);
        assert!(store.set("visible", false).unwrap().changed);
    }

    #[test]
    fn wrong_type_is_mismatch() {
        let mut store = store();
        assert!(matches!(
            store.set("visible", 1.0),
            Err(ParamError::TypeMismatch { expected: ParamKind::Toggle, found: ParamKind::Number, .. })
        ));
        assert!(matches!(store.number("visible"), Err(ParamError::TypeMismatch { .. })));
    }

    #[test]
    fn hex_string_sets_color() {
        let mut store = store();
        store.set("color", "#ff0000").unwrap();
        assert_eq!(store.color("color").unwrap().to_hex(), 0xff0000);
    }

    #[test]
    fn invalid_choice_leaves_store_unchanged() {
        let mut store = store();
        assert!(matches!(store.set("shape", "cone"), Err(ParamError::InvalidChoice { .. })));
        assert_eq!(store.choice("shape").unwrap(), "cube");
    }

    #[test]
    fn actions_always_report_change() {
        let mut store = ParameterStore::new();
        store.declare_action("visibleToggle").unwrap();
        assert!(store.set("visibleToggle", ParamValue::Trigger).unwrap().changed);
        assert!(store.set("visibleToggle", ParamValue::Trigger).unwrap().changed);
        assert!(!store.snapshot().contains_key("visibleToggle"));
    }

    #[test]
    fn snapshot_serializes_to_plain_json() {
        let store = store();
        let json = serde_json::to_value(store.snapshot()).unwrap();
        assert_eq!(json["shape"], "cube");
        assert_eq!(json["color"], "#00ff00");
        assert_eq!(json["visible"], true);
    }
}
