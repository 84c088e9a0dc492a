use serde::Serialize;
use std::fmt;

use super::error::ParamError;
use crate::math::Color;

/// Semantic type of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Number,
    Toggle,
    Color,
    Choice,
    Action,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamKind::Number => "number",
            ParamKind::Toggle => "toggle",
            ParamKind::Color => "color",
            ParamKind::Choice => "choice",
            ParamKind::Action => "action",
        };
        f.write_str(name)
    }
}

/// Current value of a parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f32),
    Bool(bool),
    Color(Color),
    Choice(String),
    /// Value carried by an action (button press); actions hold no state
    Trigger,
}

impl ParamValue {
    pub fn kind(&self) -> ParamKind {
        match self {
            ParamValue::Number(_) => ParamKind::Number,
            ParamValue::Bool(_) => ParamKind::Toggle,
            ParamValue::Color(_) => ParamKind::Color,
            ParamValue::Choice(_) => ParamKind::Choice,
            ParamValue::Trigger => ParamKind::Action,
        }
    }

    pub fn as_number(&self) -> Option<f32> {
        match self {
            ParamValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            ParamValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_choice(&self) -> Option<&str> {
        match self {
            ParamValue::Choice(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(v) => write!(f, "{v}"),
            ParamValue::Bool(v) => write!(f, "{v}"),
            ParamValue::Color(c) => write!(f, "{c}"),
            ParamValue::Choice(s) => f.write_str(s),
            ParamValue::Trigger => f.write_str("<trigger>"),
        }
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        ParamValue::Number(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<Color> for ParamValue {
    fn from(c: Color) -> Self {
        ParamValue::Color(c)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Choice(s.to_string())
    }
}

/// One entry of a dropdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    pub label: String,
    pub value: String,
}

/// Declared shape of a parameter: its type and bounds
#[derive(Debug, Clone, PartialEq)]
pub enum ParamSpec {
    /// Inclusive bounds; `step == 0.0` means continuous
    Number { min: f32, max: f32, step: f32 },
    Toggle,
    Color,
    Choice { options: Vec<ChoiceOption> },
    Action,
}

impl ParamSpec {
    pub fn number(min: f32, max: f32, step: f32) -> Self {
        ParamSpec::Number { min, max, step }
    }

    /// Continuous slider without snapping
    pub fn range(min: f32, max: f32) -> Self {
        ParamSpec::Number { min, max, step: 0.0 }
    }

    /// Dropdown from `(label, value)` pairs
    pub fn choice(options: &[(&str, &str)]) -> Self {
        ParamSpec::Choice {
            options: options
                .iter()
                .map(|(label, value)| ChoiceOption {
                    label: label.to_string(),
                    value: value.to_string(),
                })
                .collect(),
        }
    }

    pub fn kind(&self) -> ParamKind {
        match self {
            ParamSpec::Number { .. } => ParamKind::Number,
            ParamSpec::Toggle => ParamKind::Toggle,
            ParamSpec::Color => ParamKind::Color,
            ParamSpec::Choice { .. } => ParamKind::Choice,
            ParamSpec::Action => ParamKind::Action,
        }
    }

    pub(crate) fn validate(&self, name: &str) -> Result<(), ParamError> {
        let invalid = |reason: &str| ParamError::InvalidSpec {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        match self {
            ParamSpec::Number { min, max, step } => {
                if !min.is_finite() || !max.is_finite() || !step.is_finite() {
                    return Err(invalid("bounds must be finite"));
                }
                if min > max {
                    return Err(invalid("min is greater than max"));
                }
                if *step < 0.0 {
                    return Err(invalid("step is negative"));
                }
            }
            ParamSpec::Choice { options } if options.is_empty() => {
                return Err(invalid("choice has no options"));
            }
            _ => {}
        }
        Ok(())
    }

    /// Parse a textual value (CLI `--set name=value`) according to this spec
    pub fn parse_str(&self, name: &str, input: &str) -> Result<ParamValue, ParamError> {
        let parse_error = |reason: String| ParamError::Parse {
            name: name.to_string(),
            input: input.to_string(),
            reason,
        };

        match self {
            ParamSpec::Number { .. } => input
                .trim()
                .parse::<f32>()
                .map(ParamValue::Number)
                .map_err(|e| parse_error(e.to_string())),
            ParamSpec::Toggle => match input.trim().to_ascii_lowercase().as_str() {
                "true" | "on" | "yes" | "1" => Ok(ParamValue::Bool(true)),
                "false" | "off" | "no" | "0" => Ok(ParamValue::Bool(false)),
                other => Err(parse_error(format!("'{other}' is not a boolean"))),
            },
            ParamSpec::Color => input
                .parse::<Color>()
                .map(ParamValue::Color)
                .map_err(|e| parse_error(e.to_string())),
            ParamSpec::Choice { options } => {
                // Accept either the stored value or the display label
                let trimmed = input.trim();
                options
                    .iter()
                    .find(|o| o.value == trimmed || o.label.eq_ignore_ascii_case(trimmed))
                    .map(|o| ParamValue::Choice(o.value.clone()))
                    .ok_or_else(|| ParamError::InvalidChoice {
                        name: name.to_string(),
                        value: trimmed.to_string(),
                        options: options.iter().map(|o| o.value.clone()).collect(),
                    })
            }
            ParamSpec::Action => Ok(ParamValue::Trigger),
        }
    }

    /// Convert a JSON preset value according to this spec
    pub fn coerce_json(&self, name: &str, value: &serde_json::Value) -> Result<ParamValue, ParamError> {
        let found = |v: &serde_json::Value| match v {
            serde_json::Value::Bool(_) => ParamKind::Toggle,
            serde_json::Value::Number(_) => ParamKind::Number,
            serde_json::Value::String(_) => ParamKind::Choice,
            _ => ParamKind::Action,
        };
        let mismatch = || ParamError::TypeMismatch {
            name: name.to_string(),
            expected: self.kind(),
            found: found(value),
        };

        match (self, value) {
            (ParamSpec::Number { .. }, serde_json::Value::Number(n)) => n
                .as_f64()
                .map(|v| ParamValue::Number(v as f32))
                .ok_or_else(mismatch),
            (ParamSpec::Toggle, serde_json::Value::Bool(b)) => Ok(ParamValue::Bool(*b)),
            (ParamSpec::Color, serde_json::Value::String(s)) => self.parse_str(name, s),
            (ParamSpec::Choice { .. }, serde_json::Value::String(s)) => self.parse_str(name, s),
            (ParamSpec::Action, _) => Ok(ParamValue::Trigger),
            _ => Err(mismatch()),
        }
    }
}

/// Round a snapped value to the decimals `step` and `min` are written with
/// so that repeated snapping does not accumulate float noise.
pub(crate) fn snap_to_step(value: f32, min: f32, step: f32) -> f32 {
    if step <= 0.0 {
        return value;
    }
    let (value, min, step) = (f64::from(value), f64::from(min), f64::from(step));
    let snapped = min + ((value - min) / step).round() * step;
    let scale = 10f64.powi(decimals(step).max(decimals(min)));
    ((snapped * scale).round() / scale) as f32
}

/// Fewest decimal places that represent `x` as an f32 would print it
fn decimals(x: f64) -> i32 {
    const MAX_DECIMALS: i32 = 7;
    (0..MAX_DECIMALS)
        .find(|&d| {
            let scaled = x * 10f64.powi(d);
            (scaled - scaled.round()).abs() < 1e-6 * scaled.abs().max(1.0)
        })
        .unwrap_or(MAX_DECIMALS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snap_removes_float_noise() {
        assert_eq!(snap_to_step(1.0, 0.1, 0.1), 1.0);
        assert_eq!(snap_to_step(0.1, 0.1, 0.1), 0.1);
        assert_eq!(snap_to_step(0.449, -5.0, 0.01), 0.45);
    }

    #[test]
    fn snap_keeps_multi_digit_steps() {
        assert_eq!(snap_to_step(0.25, 0.0, 0.25), 0.25);
        assert_eq!(snap_to_step(0.8, 0.0, 0.25), 0.75);
        assert_eq!(snap_to_step(0.13, 0.0, 0.125), 0.125);
        assert_eq!(snap_to_step(0.16, 0.0, 0.075), 0.15);
        assert_eq!(snap_to_step(1.3, 0.5, 0.25), 1.25);
    }

    #[test]
    fn snap_is_noop_without_step() {
        assert_eq!(snap_to_step(3.14159, 0.0, 0.0), 3.14159);
    }

    #[test]
    fn invalid_specs_are_reported() {
        assert!(ParamSpec::number(2.0, 1.0, 0.1).validate("x").is_err());
        assert!(ParamSpec::number(0.0, 1.0, -0.1).validate("x").is_err());
        assert!(ParamSpec::Choice { options: vec![] }.validate("x").is_err());
        assert!(ParamSpec::number(0.0, 0.0, 0.0).validate("x").is_ok());
    }

    #[test]
    fn parse_choice_accepts_label_or_value() {
        let spec = ParamSpec::choice(&[("Cube", "cube"), ("Sphere", "sphere")]);
        assert_eq!(spec.parse_str("shape", "sphere").unwrap(), ParamValue::Choice("sphere".into()));
        assert_eq!(spec.parse_str("shape", "Cube").unwrap(), ParamValue::Choice("cube".into()));
        assert!(matches!(
            spec.parse_str("shape", "cone"),
            Err(ParamError::InvalidChoice { .. })
        ));
    }

    #[test]
    fn parse_toggle_words() {
        assert_eq!(ParamSpec::Toggle.parse_str("v", "off").unwrap(), ParamValue::Bool(false));
        assert!(ParamSpec::Toggle.parse_str("v", "maybe").is_err());
    }

    #[test]
    fn coerce_json_checks_type() {
        let spec = ParamSpec::range(0.0, 50.0);
        assert_eq!(
            spec.coerce_json("intensity", &serde_json::json!(20)).unwrap(),
            ParamValue::Number(20.0)
        );
        assert!(matches!(
            spec.coerce_json("intensity", &serde_json::json!(true)),
            Err(ParamError::TypeMismatch { .. })
        ));
    }
}
