use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::properties::CssValue;
use crate::config::TimeUnit;
use crate::error::{ResolutionError, ValidationError};

/// Separator between the layer id and the object selector
pub const OBJECT_SEPARATOR: &str = ">>";

/// Raw styles as authored: property name -> CSS value string
pub type Styles = BTreeMap<String, String>;

/// Styles after value parsing
pub type ParsedStyles = BTreeMap<String, CssValue>;

/// Build a `Styles` map from `(property, value)` pairs
pub fn styles<I, K, V>(pairs: I) -> Styles
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// A timed style declaration as authored, in author time units
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Rule {
    /// Blend `from` into `to` over `timespan`
    Range {
        selector: String,
        timespan: [f64; 2],
        from: Styles,
        to: Styles,
    },
    /// Apply `styles` once `at` is reached
    Instant {
        selector: String,
        at: f64,
        styles: Styles,
    },
}

impl Rule {
    pub fn range(selector: impl Into<String>, timespan: [f64; 2], from: Styles, to: Styles) -> Self {
        Rule::Range {
            selector: selector.into(),
            timespan,
            from,
            to,
        }
    }

    pub fn instant(selector: impl Into<String>, at: f64, styles: Styles) -> Self {
        Rule::Instant {
            selector: selector.into(),
            at,
            styles,
        }
    }

    pub fn selector(&self) -> &str {
        match self {
            Rule::Range { selector, .. } | Rule::Instant { selector, .. } => selector,
        }
    }

    /// Check time bounds and that `from`/`to` declare the same properties
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Rule::Range {
                selector,
                timespan: [start, end],
                from,
                to,
            } => {
                if !start.is_finite() || !end.is_finite() || *start < 0.0 || start >= end {
                    return Err(ValidationError::InvalidTimespan {
                        selector: selector.clone(),
                        start: *start,
                        end: *end,
                    });
                }

                let mismatch = |property: &String, declared_in, missing_from| {
                    ValidationError::PropertyMismatch {
                        selector: selector.clone(),
                        property: property.clone(),
                        declared_in,
                        missing_from,
                    }
                };
                if let Some(property) = from.keys().find(|p| !to.contains_key(*p)) {
                    return Err(mismatch(property, "from", "to"));
                }
                if let Some(property) = to.keys().find(|p| !from.contains_key(*p)) {
                    return Err(mismatch(property, "to", "from"));
                }
                Ok(())
            }
            Rule::Instant { selector, at, .. } => {
                if !at.is_finite() || *at < 0.0 {
                    return Err(ValidationError::InvalidInstant {
                        selector: selector.clone(),
                        at: *at,
                    });
                }
                Ok(())
            }
        }
    }

    /// Validate, parse every style value and convert times to milliseconds
    pub fn to_parsed(&self, unit: TimeUnit) -> Result<ParsedRule, ValidationError> {
        self.validate()?;

        match self {
            Rule::Range {
                selector,
                timespan: [start, end],
                from,
                to,
            } => {
                let from = parse_styles(from);
                let to = parse_styles(to);

                for (property, from_value) in &from {
                    let Some(to_value) = to.get(property) else {
                        continue;
                    };
                    if !from_value.shape_matches(to_value) {
                        return Err(ValidationError::ShapeMismatch {
                            selector: selector.clone(),
                            property: property.clone(),
                            from: from_value.to_css_string(),
                            to: to_value.to_css_string(),
                            from_kind: from_value.kind(),
                            to_kind: to_value.kind(),
                        });
                    }
                }

                Ok(ParsedRule::Range {
                    selector: selector.clone(),
                    start: unit.to_millis(*start),
                    end: unit.to_millis(*end),
                    from,
                    to,
                })
            }
            Rule::Instant {
                selector,
                at,
                styles,
            } => Ok(ParsedRule::Instant {
                selector: selector.clone(),
                at: unit.to_millis(*at),
                styles: parse_styles(styles),
            }),
        }
    }
}

fn parse_styles(styles: &Styles) -> ParsedStyles {
    styles
        .iter()
        .map(|(property, raw)| (property.clone(), CssValue::parse(raw)))
        .collect()
}

/// A rule with typed values and times in milliseconds
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedRule {
    Range {
        selector: String,
        start: f64,
        end: f64,
        from: ParsedStyles,
        to: ParsedStyles,
    },
    Instant {
        selector: String,
        at: f64,
        styles: ParsedStyles,
    },
}

impl ParsedRule {
    pub fn selector(&self) -> &str {
        match self {
            ParsedRule::Range { selector, .. } | ParsedRule::Instant { selector, .. } => selector,
        }
    }

    pub fn start(&self) -> f64 {
        match self {
            ParsedRule::Range { start, .. } => *start,
            ParsedRule::Instant { at, .. } => *at,
        }
    }

    pub fn end(&self) -> f64 {
        match self {
            ParsedRule::Range { end, .. } => *end,
            ParsedRule::Instant { at, .. } => *at,
        }
    }

    /// Styles in effect once the rule is over
    pub fn end_styles(&self) -> &ParsedStyles {
        match self {
            ParsedRule::Range { to, .. } => to,
            ParsedRule::Instant { styles, .. } => styles,
        }
    }

    /// Whether `time` falls inside a range rule's active interval
    pub fn is_in_progress(&self, time: f64) -> bool {
        match self {
            ParsedRule::Range { start, end, .. } => *start <= time && time < *end,
            ParsedRule::Instant { .. } => false,
        }
    }

    pub fn is_completed(&self, time: f64) -> bool {
        time >= self.end()
    }
}

/// `LAYER_ID [ '>>' OBJECT_SELECTOR ]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub layer: String,
    pub object: Option<String>,
}

impl Selector {
    pub fn parse(raw: &str) -> Result<Self, ResolutionError> {
        let malformed = || ResolutionError::MalformedSelector {
            selector: raw.to_string(),
        };

        let mut parts = raw.split(OBJECT_SEPARATOR);
        let layer = parts.next().map(str::trim).unwrap_or_default();
        let object = parts.next().map(str::trim);
        if parts.next().is_some() {
            return Err(malformed());
        }

        if layer.is_empty() || layer.contains(char::is_whitespace) {
            return Err(malformed());
        }
        if object.is_some_and(str::is_empty) {
            return Err(malformed());
        }

        Ok(Self {
            layer: layer.to_string(),
            object: object.map(str::to_string),
        })
    }
}
