use crate::ast::{Mapping, Value};
use crate::XymlError;

/// Fold one resolved include fragment into the accumulated content of a
/// directive.
///
/// - sequences append (a mapping accumulator becomes its first element)
/// - a mapping is appended to a sequence accumulator, or deep-merged into a
///   mapping accumulator
/// - an empty document contributes nothing
pub fn update_inc_content(acc: Option<Value>, fragment: Value) -> Result<Option<Value>, XymlError> {
    match fragment {
        Value::Null => return Ok(acc),
        Value::Sequence(_) | Value::Mapping(_) => {}
        other => {
            return Err(XymlError::syntax(
                format!(
                    "Resolved include content is not of list or dict type (got {} '{}')",
                    other.type_name(),
                    other
                ),
                Some("An included file must contain a mapping or a list"),
                113,
            ));
        }
    }

    let Some(acc) = acc else {
        return Ok(Some(fragment));
    };

    let merged = match (acc, fragment) {
        (Value::Sequence(mut items), Value::Sequence(more)) => {
            items.extend(more);
            Value::Sequence(items)
        }
        (Value::Sequence(mut items), mapping) => {
            items.push(mapping);
            Value::Sequence(items)
        }
        (Value::Mapping(existing), Value::Sequence(more)) => {
            let mut items = vec![Value::Mapping(existing)];
            items.extend(more);
            Value::Sequence(items)
        }
        (Value::Mapping(mut existing), Value::Mapping(incoming)) => {
            update_content_with_include_content(&mut existing, incoming);
            Value::Mapping(existing)
        }
        (acc, _) => acc,
    };
    Ok(Some(merged))
}

/// Deep-merge `incoming` into `existing`. Keys already present win unless
/// both sides are mappings, in which case the merge recurses.
pub fn update_content_with_include_content(existing: &mut Mapping, incoming: Mapping) {
    for (key, value) in incoming {
        if let Some(current) = existing.get_mut(&key) {
            if let (Value::Mapping(current), Value::Mapping(value)) = (current, value) {
                update_content_with_include_content(current, value);
            }
        } else {
            existing.insert(key, value);
        }
    }
}
