use serde::{Deserialize, Serialize};
use std::fmt;

use super::parser;

/// A number paired with its CSS unit (empty for unitless values)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Dimension {
    pub value: f64,
    pub unit: String,
}

/// One function of a transform chain, e.g. `rotate(45deg)`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TransformFunction {
    pub name: String,
    pub args: Vec<Dimension>,
}

/// Typed CSS property value produced by the value parser
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CssValue {
    /// Space separated numbers with optional units: `0`, `10px 5%`
    Numeric(Vec<Dimension>),
    /// Opaque keyword or shorthand, applied verbatim
    Static(String),
    /// Hex color, `#rrggbb` when interpolable
    Color(String),
    /// Chain of transform functions in declaration order, names unique
    Transform(Vec<TransformFunction>),
}

impl Dimension {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }

    pub fn unitless(value: f64) -> Self {
        Self::new(value, "")
    }

    /// Blend toward `target`, keeping this unit when the target is unitless
    fn interpolate(&self, target: &Dimension, rate: f64) -> Dimension {
        let unit = if target.unit.is_empty() {
            self.unit.clone()
        } else {
            target.unit.clone()
        };
        Dimension {
            value: lerp(self.value, target.value, rate),
            unit,
        }
    }
}

impl TransformFunction {
    pub fn new(name: impl Into<String>, args: Vec<Dimension>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

impl CssValue {
    /// Parse a raw property value; never fails, unknown syntax becomes `Static`
    pub fn parse(raw: &str) -> CssValue {
        parser::parse(raw)
    }

    /// Render back into a CSS string
    pub fn to_css_string(&self) -> String {
        self.to_string()
    }

    /// Variant name used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            CssValue::Numeric(_) => "numeric",
            CssValue::Static(_) => "static",
            CssValue::Color(_) => "color",
            CssValue::Transform(_) => "transform",
        }
    }

    /// Whether blending `self` into `other` is well defined.
    ///
    /// Static values on either side always qualify since they switch
    /// discretely instead of blending.
    pub fn shape_matches(&self, other: &CssValue) -> bool {
        match (self, other) {
            (CssValue::Static(_), _) | (_, CssValue::Static(_)) => true,
            (CssValue::Numeric(a), CssValue::Numeric(b)) => a.len() == b.len(),
            (CssValue::Color(_), CssValue::Color(_)) => true,
            (CssValue::Transform(a), CssValue::Transform(b)) => {
                a.len() == b.len()
                    && a.iter().all(|func| {
                        b.iter()
                            .find(|other| other.name == func.name)
                            .is_some_and(|other| other.args.len() == func.args.len())
                    })
            }
            _ => false,
        }
    }

    /// Compute the value `rate` of the way from `self` toward `target`.
    ///
    /// Dispatches on the target variant. `rate <= 0` yields `self` and
    /// `rate >= 1` yields `target` exactly.
    pub fn interpolate(&self, target: &CssValue, rate: f64) -> CssValue {
        if rate <= 0.0 {
            return self.clone();
        }
        if rate >= 1.0 {
            return target.clone();
        }

        match (self, target) {
            (CssValue::Numeric(from), CssValue::Numeric(to)) => {
                CssValue::Numeric(interpolate_dimensions(from, to, rate))
            }
            (CssValue::Transform(from), CssValue::Transform(to)) => {
                let functions = to
                    .iter()
                    .map(|target_fn| match from.iter().find(|f| f.name == target_fn.name) {
                        Some(current_fn) => TransformFunction {
                            name: target_fn.name.clone(),
                            args: interpolate_dimensions(&current_fn.args, &target_fn.args, rate),
                        },
                        None => target_fn.clone(),
                    })
                    .collect();
                CssValue::Transform(functions)
            }
            (CssValue::Color(from), CssValue::Color(to)) => {
                match (parse_hex(from), parse_hex(to)) {
                    (Some(from), Some(to)) => {
                        let channel = |i: usize| {
                            lerp(from[i] as f64, to[i] as f64, rate)
                                .round()
                                .clamp(0.0, 255.0) as u8
                        };
                        CssValue::Color(format!(
                            "#{:02x}{:02x}{:02x}",
                            channel(0),
                            channel(1),
                            channel(2)
                        ))
                    }
                    // malformed colors are not blended
                    _ => target.clone(),
                }
            }
            // Static targets and mismatched variants switch instantly
            _ => target.clone(),
        }
    }
}

impl fmt::Display for CssValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CssValue::Numeric(values) => {
                let parts: Vec<String> = values.iter().map(format_dimension).collect();
                write!(f, "{}", parts.join(" "))
            }
            CssValue::Transform(functions) => {
                let parts: Vec<String> = functions
                    .iter()
                    .map(|func| {
                        let args: Vec<String> = func.args.iter().map(format_dimension).collect();
                        format!("{}({})", func.name, args.join(","))
                    })
                    .collect();
                write!(f, "{}", parts.join(" "))
            }
            CssValue::Static(value) | CssValue::Color(value) => write!(f, "{value}"),
        }
    }
}

fn interpolate_dimensions(from: &[Dimension], to: &[Dimension], rate: f64) -> Vec<Dimension> {
    to.iter()
        .enumerate()
        .map(|(i, target)| match from.get(i) {
            Some(current) => current.interpolate(target, rate),
            None => target.clone(),
        })
        .collect()
}

/// Linear interpolation
fn lerp(from: f64, to: f64, rate: f64) -> f64 {
    from + (to - from) * rate
}

fn format_number(value: f64) -> String {
    // avoid rendering negative zero as "-0"
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

fn format_dimension(dimension: &Dimension) -> String {
    format!("{}{}", format_number(dimension.value), dimension.unit)
}

/// Parse `#rrggbb` into its three channels
fn parse_hex(value: &str) -> Option<[u8; 3]> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some([r, g, b])
}
