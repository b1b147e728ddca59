// Author: Dustin Pilgrim
// License: MIT

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::ast::Value;
use crate::context::{Context, Lookup};
use crate::lexer::{self, Placeholder};
use crate::resolver::Resolver;
use crate::scalar::parse_scalar;
use crate::XymlError;

mod arithmetic;

/// Maximum nesting of reference substitutions for a single scalar.
pub const MAX_REFERENCE_DEPTH: usize = 30;

static ARITHMETIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<path>.+?)\s*(?P<op>[-+*])\s*(?P<operand>[0-9]+(?:\.[0-9]+)?)$")
        .expect("valid regex")
});

/// What happens to a placeholder whose path cannot be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Use the default if there is one, otherwise fail.
    #[default]
    Strict,
    /// Use the default if there is one, otherwise keep the placeholder text.
    Lenient,
    /// Substitute only paths that are found; keep everything else verbatim,
    /// defaults included, so a later pass can still see it.
    Partial,
}

/// Replaces `{{ path : default }}` placeholders in every string of a tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceResolver {
    mode: Mode,
}

impl ReferenceResolver {
    pub fn new(fail_on_resolve: bool) -> Self {
        let mode = if fail_on_resolve { Mode::Strict } else { Mode::Lenient };
        Self { mode }
    }

    pub fn with_mode(mode: Mode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Resolve every placeholder of a single string.
    ///
    /// If the whole string is one placeholder the result keeps the
    /// referenced value's type; otherwise the value is embedded as text.
    pub fn get_reference(
        &self,
        text: String,
        context: &Context<'_>,
        depth: usize,
    ) -> Result<Value, XymlError> {
        self.substitute(text, context, depth, 0)
    }

    fn walk(&self, value: Value, context: &Context<'_>, depth: usize) -> Result<Value, XymlError> {
        match value {
            Value::String(s) => self.get_reference(s, context, depth),
            Value::Sequence(items) => items
                .into_iter()
                .map(|item| self.walk(item, context, depth))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Sequence),
            Value::Mapping(mut mapping) => {
                for v in mapping.values_mut() {
                    *v = self.walk(std::mem::take(v), context, depth)?;
                }
                if let Some(directive) = mapping.include_mut() {
                    for statement in directive.statements.iter_mut() {
                        *statement = self.walk(std::mem::take(statement), context, depth)?;
                    }
                }
                Ok(Value::Mapping(mapping))
            }
            other => Ok(other),
        }
    }

    fn substitute(
        &self,
        text: String,
        context: &Context<'_>,
        depth: usize,
        from: usize,
    ) -> Result<Value, XymlError> {
        let Some(placeholder) = lexer::find_placeholder(&text, from) else {
            return Ok(Value::String(text));
        };
        if depth >= MAX_REFERENCE_DEPTH {
            return Err(XymlError::RecursiveReference {
                value: text,
                hint: Some(format!(
                    "References may nest at most {} levels; check for self-referencing values",
                    MAX_REFERENCE_DEPTH
                )),
                code: Some(202),
            });
        }
        trace!(reference = %placeholder.raw, depth, "resolving reference");

        let Some(value) = self.resolve_placeholder(&placeholder, context, depth)? else {
            return self.substitute(text, context, depth, placeholder.end);
        };

        if placeholder.start == 0 && placeholder.end == text.len() {
            return if value.has_placeholder() {
                self.walk(value, context, depth + 1)
            } else {
                Ok(value)
            };
        }

        // Every later copy of the same placeholder is replaced in this step.
        let rendered = value.to_string();
        let mut next = String::with_capacity(text.len() + rendered.len());
        next.push_str(&text[..placeholder.start]);
        next.push_str(&text[placeholder.start..].replace(&placeholder.raw, &rendered));
        self.substitute(next, context, depth + 1, from)
    }

    /// `None` means the placeholder stays as written.
    fn resolve_placeholder(
        &self,
        placeholder: &Placeholder,
        context: &Context<'_>,
        depth: usize,
    ) -> Result<Option<Value>, XymlError> {
        match self.lookup_expression(&placeholder.path, context)? {
            Lookup::Found(value) => Ok(Some(value)),
            Lookup::Missing(segment) => match (&placeholder.default, self.mode) {
                (_, Mode::Partial) => Ok(None),
                (Some(default), _) => self.resolve_default(default, context, depth).map(Some),
                (None, Mode::Strict) => Err(XymlError::ReferenceNotFound {
                    segment,
                    expression: placeholder.raw.clone(),
                    hint: Some("Define the value or give a default with {{ path : default }}".into()),
                    code: Some(201),
                }),
                (None, Mode::Lenient) => Ok(None),
            },
        }
    }

    fn resolve_default(
        &self,
        default: &str,
        context: &Context<'_>,
        depth: usize,
    ) -> Result<Value, XymlError> {
        if default.is_empty() {
            Ok(Value::String(String::new()))
        } else if default.contains("{{") {
            self.substitute(default.to_string(), context, depth + 1, 0)
        } else {
            Ok(parse_scalar(default))
        }
    }

    /// Look up a path, falling back to `path <op> number` arithmetic when the
    /// text is not itself a valid, present path.
    fn lookup_expression(&self, path: &str, context: &Context<'_>) -> Result<Lookup, XymlError> {
        let literal = lexer::parse_path(path).map(|segments| context.lookup(&segments));
        if let Ok(Lookup::Found(_)) = literal {
            return literal;
        }

        if let Some(caps) = ARITHMETIC.captures(path) {
            let segments = lexer::parse_path(&caps["path"])?;
            return match context.lookup(&segments) {
                Lookup::Found(value) => {
                    arithmetic::apply(value, &caps["op"], &caps["operand"], path).map(Lookup::Found)
                }
                missing => Ok(missing),
            };
        }

        literal
    }
}

impl Resolver for ReferenceResolver {
    fn resolve(&self, tree: Value, context: &Context<'_>) -> Result<Value, XymlError> {
        self.walk(tree, context, 0)
    }
}

/// Every top-level placeholder in `text` as `(raw, path, default)`.
pub fn parse_references(text: &str) -> Vec<(String, String, Option<String>)> {
    lexer::find_placeholders(text)
        .into_iter()
        .map(|p| (p.raw, p.path, p.default))
        .collect()
}
