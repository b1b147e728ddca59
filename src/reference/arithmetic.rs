use crate::ast::Value;
use crate::XymlError;

/// Apply `value <op> operand` for the single-operator suffix of a reference.
pub(super) fn apply(value: Value, op: &str, operand: &str, expression: &str) -> Result<Value, XymlError> {
    let rhs = if operand.contains('.') {
        operand.parse::<f64>().ok().map(Value::Float)
    } else {
        operand.parse::<i64>().ok().map(Value::Integer)
    }
    .ok_or_else(|| {
        XymlError::syntax(format!("Invalid operand '{}' in '{}'", operand, expression), None, 107)
    })?;

    match (value, rhs) {
        (Value::Integer(a), Value::Integer(b)) => {
            let result = match op {
                "+" => a.checked_add(b),
                "-" => a.checked_sub(b),
                "*" => a.checked_mul(b),
                _ => return Err(unknown_operator(op, expression)),
            };
            result.map(Value::Integer).ok_or_else(|| {
                XymlError::type_error(format!("Integer overflow evaluating '{}'", expression), None, 403)
            })
        }
        (Value::Integer(a), Value::Float(b)) => float_op(a as f64, b, op, expression),
        (Value::Float(a), Value::Integer(b)) => float_op(a, b as f64, op, expression),
        (Value::Float(a), Value::Float(b)) => float_op(a, b, op, expression),
        (other, _) => Err(XymlError::type_error(
            format!(
                "Arithmetic in '{}' needs a numeric value, got {} '{}'",
                expression,
                other.type_name(),
                other
            ),
            Some("Only integers and floats support +, - and *"),
            402,
        )),
    }
}

fn float_op(a: f64, b: f64, op: &str, expression: &str) -> Result<Value, XymlError> {
    match op {
        "+" => Ok(Value::Float(a + b)),
        "-" => Ok(Value::Float(a - b)),
        "*" => Ok(Value::Float(a * b)),
        _ => Err(unknown_operator(op, expression)),
    }
}

fn unknown_operator(op: &str, expression: &str) -> XymlError {
    XymlError::syntax(format!("Unknown operator '{}' in '{}'", op, expression), None, 108)
}
