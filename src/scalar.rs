use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::Value;

static INT_DEC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-+]?[0-9]+$").expect("valid regex"));
static INT_HEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]+$").expect("valid regex"));
static INT_OCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0o[0-7]+$").expect("valid regex"));
static FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-+]?(\.[0-9]+|[0-9]+(\.[0-9]*)?)([eE][-+]?[0-9]+)?$").expect("valid regex")
});

/// Parse a literal token into a typed value, following the YAML core schema.
///
/// Used for include parameters (`<<port=8080>>`) and reference defaults.
pub fn parse_scalar(text: &str) -> Value {
    let text = text.trim();

    if let Some(inner) = unquote(text) {
        return Value::String(inner.to_string());
    }

    match text {
        "" | "~" | "null" | "Null" | "NULL" => return Value::Null,
        "true" | "True" | "TRUE" => return Value::Bool(true),
        "false" | "False" | "FALSE" => return Value::Bool(false),
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => return Value::Float(f64::INFINITY),
        "-.inf" | "-.Inf" | "-.INF" => return Value::Float(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => return Value::Float(f64::NAN),
        _ => {}
    }

    if INT_DEC.is_match(text) {
        if let Ok(i) = text.parse::<i64>() {
            return Value::Integer(i);
        }
        // Too large for i64, keep the magnitude as a float.
        if let Ok(f) = text.parse::<f64>() {
            return Value::Float(f);
        }
    }
    if INT_HEX.is_match(text) {
        if let Ok(i) = i64::from_str_radix(&text[2..], 16) {
            return Value::Integer(i);
        }
    }
    if INT_OCT.is_match(text) {
        if let Ok(i) = i64::from_str_radix(&text[2..], 8) {
            return Value::Integer(i);
        }
    }
    if FLOAT.is_match(text) {
        if let Ok(f) = text.parse::<f64>() {
            return Value::Float(f);
        }
    }

    Value::String(text.to_string())
}

fn unquote(text: &str) -> Option<&str> {
    if text.len() < 2 {
        return None;
    }
    let first = text.chars().next()?;
    if (first == '"' || first == '\'') && text.ends_with(first) {
        Some(&text[1..text.len() - 1])
    } else {
        None
    }
}
