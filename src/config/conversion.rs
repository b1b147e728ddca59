// Author: Dustin Pilgrim
// License: MIT

use std::collections::HashMap;

use crate::{Value, XymlError};

fn expected(what: &str, value: &Value, hint: &str, code: u32) -> XymlError {
    XymlError::type_error(
        format!("Expected {}, got {} '{}'", what, value.type_name(), value),
        Some(hint),
        code,
    )
}

impl TryFrom<Value> for String {
    type Error = XymlError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(s),
            _ => Err(expected("string", &value, "Quote the value in your config", 401)),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = XymlError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Integer(i) => Ok(i as f64),
            _ => Err(expected("number", &value, "Use a number value in your config", 402)),
        }
    }
}

impl TryFrom<Value> for f32 {
    type Error = XymlError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        f64::try_from(value).map(|f| f as f32)
    }
}

impl TryFrom<Value> for i64 {
    type Error = XymlError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Integer(i) => Ok(i),
            Value::Float(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => Ok(f as i64),
            Value::Float(f) => Err(XymlError::type_error(
                format!("Expected integer, got {}", f),
                Some("Drop the fractional part"),
                406,
            )),
            _ => Err(expected("integer", &value, "Use a number value in your config", 402)),
        }
    }
}

/// Narrow integer targets go through `i64` with a range check.
macro_rules! narrow_integer {
    ($($ty:ty),*) => {$(
        impl TryFrom<Value> for $ty {
            type Error = XymlError;

            fn try_from(value: Value) -> Result<Self, Self::Error> {
                let n = i64::try_from(value)?;
                <$ty>::try_from(n).map_err(|_| {
                    XymlError::type_error(
                        format!("Number {} out of range for {}", n, stringify!($ty)),
                        Some(format!("Use a number between {} and {}", <$ty>::MIN, <$ty>::MAX).as_str()),
                        407,
                    )
                })
            }
        }
    )*};
}

narrow_integer!(i32, u8, u16, u32, u64, usize);

impl TryFrom<Value> for bool {
    type Error = XymlError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Bool(b) => Ok(b),
            Value::String(ref s) if s.to_lowercase().starts_with("tru") || s.to_lowercase().starts_with("fal") => {
                Err(XymlError::type_error(
                    format!("Invalid boolean value '{}'. Did you mean 'true' or 'false'?", s),
                    None,
                    404,
                ))
            }
            _ => Err(expected("boolean", &value, "Use true or false", 404)),
        }
    }
}

impl<T> TryFrom<Value> for Vec<T>
where
    T: TryFrom<Value, Error = XymlError>,
{
    type Error = XymlError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Sequence(items) => items.into_iter().map(T::try_from).collect(),
            _ => Err(expected("list", &value, "Use a YAML sequence in your config", 405)),
        }
    }
}

impl<T> TryFrom<Value> for Option<T>
where
    T: TryFrom<Value, Error = XymlError>,
{
    type Error = XymlError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(None),
            v => Ok(Some(T::try_from(v)?)),
        }
    }
}

impl<T> TryFrom<Value> for HashMap<String, T>
where
    T: TryFrom<Value, Error = XymlError>,
{
    type Error = XymlError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Mapping(m) => m.into_iter().map(|(k, v)| Ok((k, T::try_from(v)?))).collect(),
            _ => Err(expected("mapping", &value, "Use a YAML mapping in your config", 410)),
        }
    }
}
