use thiserror::Error;

/// Rule declarations that are internally inconsistent
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("rule '{selector}': property '{property}' is declared in `{declared_in}` but missing from `{missing_from}`")]
    PropertyMismatch {
        selector: String,
        property: String,
        declared_in: &'static str,
        missing_from: &'static str,
    },

    #[error("rule '{selector}': timespan [{start}, {end}] must be finite with 0 <= start < end")]
    InvalidTimespan { selector: String, start: f64, end: f64 },

    #[error("rule '{selector}': instant {at} must be a finite, non-negative time")]
    InvalidInstant { selector: String, at: f64 },

    #[error("rule '{selector}': property '{property}' cannot blend {from_kind} value '{from}' into {to_kind} value '{to}'")]
    ShapeMismatch {
        selector: String,
        property: String,
        from: String,
        to: String,
        from_kind: &'static str,
        to_kind: &'static str,
    },
}

/// Selectors that do not point at any registered element
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolutionError {
    #[error("malformed selector '{selector}'")]
    MalformedSelector { selector: String },

    #[error("selector '{selector}': no layer registered with id '{layer}'")]
    UnknownLayer { selector: String, layer: String },

    #[error("selector '{selector}': no element matches inside its layer")]
    NoMatch { selector: String },
}

/// Any failure that aborts a `define` call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DefineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}
