use std::borrow::Cow;
use std::env;

use crate::ast::Value;
use crate::lexer::PathSegment;

/// Result of walking a path through a context.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(Value),
    /// The segment (as written) at which the walk stopped.
    Missing(String),
}

/// Lookup root for reference resolution.
///
/// Besides the root tree a context exposes two reserved namespaces:
/// `xyml.env.NAME` reads an environment variable and `xyml.param.NAME`
/// reads from the caller-supplied parameters.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    root: &'a Value,
    params: Option<&'a Value>,
}

impl<'a> Context<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self { root, params: None }
    }

    /// Attach parameters; `params` should be a mapping.
    pub fn with_params(mut self, params: &'a Value) -> Self {
        self.params = Some(params);
        self
    }

    pub fn root(&self) -> &'a Value {
        self.root
    }

    pub fn params(&self) -> Option<&'a Value> {
        self.params
    }

    pub fn lookup(&self, segments: &[PathSegment]) -> Lookup {
        let result = match segments {
            [ns, kind, rest @ ..] if is_plain(ns, "xyml") && is_plain(kind, "env") => {
                lookup_env(rest)
            }
            [ns, kind, rest @ ..] if is_plain(ns, "xyml") && is_plain(kind, "param") => {
                match self.params {
                    Some(params) if !rest.is_empty() => walk(params, rest).map(Cow::into_owned),
                    _ => Err(rest.first().map_or_else(|| "param".to_string(), |s| s.to_string())),
                }
            }
            _ => walk(self.root, segments).map(Cow::into_owned),
        };

        match result {
            Ok(value) => Lookup::Found(value),
            Err(segment) => Lookup::Missing(segment),
        }
    }
}

fn is_plain(segment: &PathSegment, name: &str) -> bool {
    segment.indexes.is_empty() && segment.name == name
}

fn lookup_env(rest: &[PathSegment]) -> Result<Value, String> {
    match rest {
        [var] if var.indexes.is_empty() => env::var(&var.name)
            .map(Value::String)
            .map_err(|_| var.name.clone()),
        [] => Err("env".into()),
        [var, ..] => Err(var.to_string()),
    }
}

/// Walk `segments` down from `current`.
fn walk<'v>(current: &'v Value, segments: &[PathSegment]) -> Result<Cow<'v, Value>, String> {
    let Some((segment, rest)) = segments.split_first() else {
        return Ok(Cow::Borrowed(current));
    };
    match step(current, segment)? {
        Cow::Borrowed(next) => walk(next, rest),
        Cow::Owned(next) => walk(&next, rest).map(|v| Cow::Owned(v.into_owned())),
    }
}

fn step<'v>(current: &'v Value, segment: &PathSegment) -> Result<Cow<'v, Value>, String> {
    let mut node = if segment.name.is_empty() {
        Cow::Borrowed(current)
    } else {
        field(current, &segment.name).ok_or_else(|| segment.name.clone())?
    };

    for &index in &segment.indexes {
        node = match node {
            Cow::Borrowed(v) => v.as_sequence().and_then(|items| items.get(index)).map(Cow::Borrowed),
            Cow::Owned(Value::Sequence(mut items)) if index < items.len() => {
                Some(Cow::Owned(items.swap_remove(index)))
            }
            Cow::Owned(_) => None,
        }
        .ok_or_else(|| format!("{}[{}]", segment.name, index))?;
    }

    Ok(node)
}

fn field<'v>(current: &'v Value, name: &str) -> Option<Cow<'v, Value>> {
    match current {
        Value::Mapping(m) => m.get(name).map(Cow::Borrowed),
        Value::Sequence(items) => {
            if let Ok(index) = name.parse::<usize>() {
                return items.get(index).map(Cow::Borrowed);
            }
            // Project the key over a list of mappings.
            let projected: Vec<Value> = items
                .iter()
                .filter_map(|item| item.as_mapping()?.get(name).cloned())
                .collect();
            if projected.is_empty() {
                None
            } else {
                Some(Cow::Owned(Value::Sequence(projected)))
            }
        }
        _ => None,
    }
}
