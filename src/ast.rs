use std::fmt;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Reserved mapping key holding include statements.
pub const INCLUDE_KEY: &str = "xyml.include";

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Value>),
    Mapping(Mapping),
}

/// The include directive of a mapping, split off the regular keys when the
/// mapping is built.
#[derive(Debug, Clone, PartialEq)]
pub struct IncludeDirective {
    pub statements: Vec<Value>,
}

impl IncludeDirective {
    /// A directive value is either a single statement or a list of them.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Sequence(statements) => Self { statements },
            other => Self { statements: vec![other] },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mapping {
    entries: IndexMap<String, Value>,
    include: Option<IncludeDirective>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key. The reserved include key is stored as a directive and
    /// never shows up among the regular entries.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        if key == INCLUDE_KEY {
            self.include = Some(IncludeDirective::from_value(value));
            return None;
        }
        self.entries.insert(key, value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.entries.values_mut()
    }

    pub fn include(&self) -> Option<&IncludeDirective> {
        self.include.as_ref()
    }

    pub fn include_mut(&mut self) -> Option<&mut IncludeDirective> {
        self.include.as_mut()
    }

    pub fn take_include(&mut self) -> Option<IncludeDirective> {
        self.include.take()
    }

    pub fn set_include(&mut self, directive: IncludeDirective) {
        self.include = Some(directive);
    }
}

impl IntoIterator for Mapping {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for (k, v) in iter {
            mapping.insert(k, v);
        }
        mapping
    }
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        if let Value::String(s) = self { Some(s) } else { None }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        if let Value::Mapping(m) = self { Some(m) } else { None }
    }

    pub fn as_sequence(&self) -> Option<&Vec<Value>> {
        if let Value::Sequence(s) = self { Some(s) } else { None }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }

    /// Whether any string in this subtree still holds a `{{` placeholder.
    pub fn has_placeholder(&self) -> bool {
        match self {
            Value::String(s) => s.contains("{{"),
            Value::Sequence(items) => items.iter().any(Value::has_placeholder),
            Value::Mapping(m) => {
                m.entries.values().any(Value::has_placeholder)
                    || m.include
                        .as_ref()
                        .is_some_and(|d| d.statements.iter().any(Value::has_placeholder))
            }
            _ => false,
        }
    }
}

fn fmt_float(f: f64) -> String {
    if f.is_nan() {
        ".nan".into()
    } else if f.is_infinite() {
        if f > 0.0 { ".inf".into() } else { "-.inf".into() }
    } else if f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else {
        format!("{}", f)
    }
}

/// Text form used when a value is embedded into a larger string.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(n) => write!(f, "{}", fmt_float(*n)),
            Value::String(s) => write!(f, "{}", s),
            Value::Sequence(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", parts.join(" "))
            }
            Value::Mapping(m) => {
                let parts: Vec<String> = m.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Sequence(items) => items.serialize(serializer),
            Value::Mapping(m) => m.serialize(serializer),
        }
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = usize::from(self.include.is_some());
        let mut map = serializer.serialize_map(Some(self.entries.len() + extra))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        if let Some(directive) = &self.include {
            map.serialize_entry(INCLUDE_KEY, &directive.statements)?;
        }
        map.end()
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}

impl From<Mapping> for Value {
    fn from(m: Mapping) -> Self {
        Value::Mapping(m)
    }
}
