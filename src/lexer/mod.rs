// Author: Dustin Pilgrim
// License: MIT

//! Hand-rolled scanners for the two micro-languages embedded in documents:
//! `{{ path : default }}` placeholders and `file.yaml << k=v >>` include
//! statements.

use crate::XymlError;

mod scanner;

use scanner::bump;

/// A `{{ ... }}` placeholder located in a string.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    /// Byte offset of the opening `{{`.
    pub start: usize,
    /// Byte offset just past the closing `}}`.
    pub end: usize,
    pub raw: String,
    pub path: String,
    /// `Some("")` for `{{ref:}}`, `None` when there is no `:` at all.
    pub default: Option<String>,
}

/// One dotted path segment, `name` or `name[1][2]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
    pub name: String,
    pub indexes: Vec<usize>,
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        for i in &self.indexes {
            write!(f, "[{}]", i)?;
        }
        Ok(())
    }
}

/// Byte cursor over a string. Delimiters are all ASCII, so byte positions
/// always land on char boundaries when they are compared against them.
pub struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Scanner { src, pos: 0 }
    }

    pub fn at(src: &'a str, pos: usize) -> Self {
        Scanner { src, pos }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn starts_with(&self, pat: &str) -> bool {
        self.rest().starts_with(pat)
    }
}

/// Find the first complete placeholder at or after byte offset `from`.
///
/// Nested `{{ }}` pairs are balanced, so a default such as
/// `{{a:{{b}}}}` is captured whole.
pub fn find_placeholder(text: &str, from: usize) -> Option<Placeholder> {
    let mut search = from;
    while let Some(rel) = text.get(search..)?.find("{{") {
        let start = search + rel;
        if let Some(end) = closing_braces(text, start) {
            let body = &text[start + 2..end - 2];
            let (path, default) = split_default(body);
            return Some(Placeholder {
                start,
                end,
                raw: text[start..end].to_string(),
                path,
                default,
            });
        }
        search = start + 2;
    }
    None
}

/// List every top-level placeholder of `text`, left to right.
pub fn find_placeholders(text: &str) -> Vec<Placeholder> {
    let mut found = Vec::new();
    let mut from = 0;
    while let Some(p) = find_placeholder(text, from) {
        from = p.end;
        found.push(p);
    }
    found
}

/// Returns the byte offset past the `}}` matching the `{{` at `start`.
fn closing_braces(text: &str, start: usize) -> Option<usize> {
    let mut scanner = Scanner::at(text, start + 2);
    let mut depth = 1usize;
    while !scanner.is_eof() {
        if scanner.starts_with("{{") {
            depth += 1;
            scanner.pos += 2;
        } else if scanner.starts_with("}}") {
            depth -= 1;
            scanner.pos += 2;
            if depth == 0 {
                return Some(scanner.pos);
            }
        } else {
            bump(&mut scanner);
        }
    }
    None
}

/// Split a placeholder body at the first `:` that is not inside a nested
/// placeholder.
fn split_default(body: &str) -> (String, Option<String>) {
    let mut scanner = Scanner::new(body);
    let mut depth = 0usize;
    while let Some(c) = scanner.peek() {
        if scanner.starts_with("{{") {
            depth += 1;
            scanner.pos += 2;
            continue;
        }
        if scanner.starts_with("}}") && depth > 0 {
            depth -= 1;
            scanner.pos += 2;
            continue;
        }
        if c == ':' && depth == 0 {
            let path = body[..scanner.pos].trim().to_string();
            let default = body[scanner.pos + 1..].trim().to_string();
            return (path, Some(default));
        }
        bump(&mut scanner);
    }
    (body.trim().to_string(), None)
}

/// Parse a dotted reference path into segments.
pub fn parse_path(path: &str) -> Result<Vec<PathSegment>, XymlError> {
    split_top_level(path, '.')
        .into_iter()
        .map(|raw| parse_segment(raw.trim(), path))
        .collect()
}

fn parse_segment(raw: &str, path: &str) -> Result<PathSegment, XymlError> {
    let mut scanner = Scanner::new(raw);
    let mut name = String::new();
    while let Some(c) = scanner.peek() {
        if c == '[' {
            break;
        }
        name.push(c);
        bump(&mut scanner);
    }

    let mut indexes = Vec::new();
    while scanner.peek() == Some('[') {
        bump(&mut scanner);
        let mut digits = String::new();
        while let Some(c) = scanner.peek() {
            if c == ']' {
                break;
            }
            digits.push(c);
            bump(&mut scanner);
        }
        if bump(&mut scanner) != Some(']') {
            return Err(XymlError::syntax(
                format!("Unclosed '[' in reference path '{}'", path),
                Some("Use name[index] with a closing bracket"),
                104,
            ));
        }
        let index = digits.trim().parse::<usize>().map_err(|_| {
            XymlError::syntax(
                format!("Unable to convert index of '{}' to a non-negative integer", raw),
                Some("Array indexes must be non-negative integers, e.g. list[0]"),
                105,
            )
        })?;
        indexes.push(index);
    }

    if !scanner.is_eof() {
        return Err(XymlError::syntax(
            format!("Unexpected '{}' after index in reference path '{}'", scanner.rest(), path),
            None,
            106,
        ));
    }

    Ok(PathSegment { name: name.trim().to_string(), indexes })
}

/// Split an include statement into its path expression and the raw
/// parameter text between `<<` and `>>`.
pub fn split_statement(statement: &str) -> Result<(String, Option<String>), XymlError> {
    let mut scanner = Scanner::new(statement);
    let mut depth = 0usize;
    while !scanner.is_eof() {
        if scanner.starts_with("{{") {
            depth += 1;
            scanner.pos += 2;
        } else if scanner.starts_with("}}") && depth > 0 {
            depth -= 1;
            scanner.pos += 2;
        } else if depth == 0 && scanner.starts_with("<<") {
            let path = statement[..scanner.pos].trim().to_string();
            let params = statement[scanner.pos + 2..].trim_end();
            let Some(inner) = params.strip_suffix(">>") else {
                return Err(XymlError::syntax(
                    format!("Parameter block of include '{}' is not closed", statement),
                    Some("Write parameters as `file.yaml << key=value, other=1 >>`"),
                    110,
                ));
            };
            return Ok((path, Some(inner.to_string())));
        } else {
            bump(&mut scanner);
        }
    }
    Ok((statement.trim().to_string(), None))
}

/// Split on `sep`, ignoring separators inside quotes, brackets, braces and
/// placeholders.
pub fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut scanner = Scanner::new(text);
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut last = 0;

    while let Some(c) = scanner.peek() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '[') | (None, '{') => depth += 1,
            (None, ']') | (None, '}') => depth = depth.saturating_sub(1),
            (None, c) if c == sep && depth == 0 => {
                parts.push(&text[last..scanner.pos]);
                last = scanner.pos + c.len_utf8();
            }
            _ => {}
        }
        bump(&mut scanner);
    }
    parts.push(&text[last..]);
    parts
}
