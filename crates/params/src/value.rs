use serde::{Deserialize, Serialize};
use shapestage_common::Color;
use std::collections::BTreeMap;

/// A parameter value as the panel edits it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Color(Color),
}

impl ParamValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Color(_) => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(c) => Some(*c),
            Self::Number(_) => None,
        }
    }

    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Color(_) => "color",
        }
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Color(c) => write!(f, "{c}"),
        }
    }
}

/// Numeric constraint: values are clamped to `[min, max]` and snapped to `min + k * step`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumberRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl NumberRange {
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if !(self.min.is_finite() && self.max.is_finite() && self.step.is_finite()) {
            return Err("bounds and step must be finite");
        }
        if self.min > self.max {
            return Err("min is greater than max");
        }
        if self.step <= 0.0 {
            return Err("step must be positive");
        }
        Ok(())
    }

    /// Clamp into range and snap to the step grid.
    pub fn constrain(&self, value: f64) -> f64 {
        let clamped = value.clamp(self.min, self.max);
        let k = ((clamped - self.min) / self.step).round();
        let decimals = step_decimals(self.step).max(step_decimals(self.min));
        let scale = 10f64.powi(decimals as i32);
        let snapped = ((self.min + k * self.step) * scale).round() / scale;
        snapped.clamp(self.min, self.max)
    }
}

/// Decimal places needed to write `x` exactly (capped at 9).
fn step_decimals(x: f64) -> u32 {
    (0..9)
        .find(|&d| {
            let scaled = x * 10f64.powi(d as i32);
            (scaled - scaled.round()).abs() < 1e-9
        })
        .unwrap_or(9)
}

/// What a declaration says about one key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamSpec {
    Number {
        default: f64,
        range: Option<NumberRange>,
    },
    Color {
        default: Color,
    },
}

impl ParamSpec {
    pub fn default_value(&self) -> ParamValue {
        match self {
            Self::Number { default, .. } => ParamValue::Number(*default),
            Self::Color { default } => ParamValue::Color(*default),
        }
    }

    pub fn range(&self) -> Option<NumberRange> {
        match self {
            Self::Number { range, .. } => *range,
            Self::Color { .. } => None,
        }
    }
}

/// One declaration site: an owner name and the keys it owns.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    owner: String,
    entries: Vec<(String, ParamSpec)>,
}

impl Declaration {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            entries: Vec::new(),
        }
    }

    pub fn number(mut self, name: impl Into<String>, default: f64) -> Self {
        self.entries.push((
            name.into(),
            ParamSpec::Number {
                default,
                range: None,
            },
        ));
        self
    }

    pub fn ranged(
        mut self,
        name: impl Into<String>,
        default: f64,
        min: f64,
        max: f64,
        step: f64,
    ) -> Self {
        self.entries.push((
            name.into(),
            ParamSpec::Number {
                default,
                range: Some(NumberRange::new(min, max, step)),
            },
        ));
        self
    }

    pub fn color(mut self, name: impl Into<String>, default: Color) -> Self {
        self.entries
            .push((name.into(), ParamSpec::Color { default }));
        self
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn entries(&self) -> &[(String, ParamSpec)] {
        &self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

/// A snapshot of named values, as returned to components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamValues(BTreeMap<String, ParamValue>);

impl ParamValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<ParamValue> {
        self.0.get(name).copied()
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(|v| v.as_number())
    }

    pub fn color(&self, name: &str) -> Option<Color> {
        self.get(name).and_then(|v| v.as_color())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}
