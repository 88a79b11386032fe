use super::lexer::{lex, Token};
use super::properties::{CssValue, Dimension, TransformFunction};

/// Transform functions whose arguments can be interpolated
pub const TRANSFORM_FUNCTIONS: &[&str] = &[
    "translate",
    "translateX",
    "translateY",
    "translateZ",
    "translate3d",
    "scale",
    "scaleX",
    "scaleY",
    "scaleZ",
    "scale3d",
    "rotate",
    "rotateX",
    "rotateY",
    "rotateZ",
    "skew",
    "skewX",
    "skewY",
    "perspective",
];

type Handler = fn(&[Token]) -> Option<CssValue>;

/// Handlers tried in order; the first match wins.
///
/// Single-token values must be classified before numeric ones, and the
/// transform grammar is tried last as the most permissive.
const HANDLERS: &[Handler] = &[parse_single, parse_numeric, parse_transform];

/// Parse a raw CSS value, falling back to `Static` with the raw string
pub fn parse(raw: &str) -> CssValue {
    let tokens = lex(raw);
    HANDLERS
        .iter()
        .find_map(|handler| handler(&tokens))
        .unwrap_or_else(|| CssValue::Static(raw.to_string()))
}

pub fn is_transform_function(name: &str) -> bool {
    TRANSFORM_FUNCTIONS.contains(&name)
}

fn parse_single(tokens: &[Token]) -> Option<CssValue> {
    match tokens {
        [Token::Text(text)] if text.starts_with('#') => Some(CssValue::Color(text.clone())),
        // a bare function name such as `translate()` is left to the fallback
        [Token::Text(text)] if !is_transform_function(text) => {
            Some(CssValue::Static(text.clone()))
        }
        _ => None,
    }
}

fn parse_numeric(tokens: &[Token]) -> Option<CssValue> {
    if !matches!(tokens.first(), Some(Token::Number(_))) {
        return None;
    }
    pair_dimensions(tokens).map(CssValue::Numeric)
}

/// Greedily pair every number with the text token following it.
///
/// Numbers without a following unit get an empty one. Returns `None` when a
/// text token appears where a number is expected.
fn pair_dimensions(tokens: &[Token]) -> Option<Vec<Dimension>> {
    let mut dimensions = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let value = tokens[i].as_number()?;
        match tokens.get(i + 1).and_then(Token::as_text) {
            Some(unit) if !unit.starts_with('#') => {
                dimensions.push(Dimension::new(value, unit));
                i += 2;
            }
            Some(_) => return None,
            None => {
                dimensions.push(Dimension::unitless(value));
                i += 1;
            }
        }
    }

    Some(dimensions)
}

fn parse_transform(tokens: &[Token]) -> Option<CssValue> {
    let first = tokens.first()?.as_text()?;
    if !is_transform_function(first) {
        return None;
    }

    // split at function names; any other text directly after a number is a unit
    let mut groups: Vec<(&str, Vec<Token>)> = Vec::new();
    let mut previous_was_number = false;
    for token in tokens {
        match token {
            Token::Text(text) if !previous_was_number || is_transform_function(text) => {
                if !is_transform_function(text) {
                    return None;
                }
                groups.push((text.as_str(), Vec::new()));
                previous_was_number = false;
            }
            _ => {
                groups.last_mut()?.1.push(token.clone());
                previous_was_number = matches!(token, Token::Number(_));
            }
        }
    }

    let mut functions: Vec<TransformFunction> = Vec::with_capacity(groups.len());
    for (name, args) in groups {
        if functions.iter().any(|f| f.name == name) {
            return None;
        }
        let args = pair_dimensions(&args)?;
        if args.is_empty() {
            return None;
        }
        // units must be given for all parameters or for none
        let unitless = args.iter().filter(|d| d.unit.is_empty()).count();
        if unitless != 0 && unitless != args.len() {
            return None;
        }
        functions.push(TransformFunction::new(name, args));
    }

    Some(CssValue::Transform(functions))
}
