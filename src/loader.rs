// Author: Dustin Pilgrim
// License: MIT

use std::fs;
use std::path::{Path, PathBuf};

use crate::ast::{Mapping, Value};
use crate::XymlError;

/// Source of parsed documents for the include resolver.
pub trait Loader {
    fn load(&self, path: &Path) -> Result<Value, XymlError>;

    /// Whether `path` names a loadable document.
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    /// Stable identity of a document, used to detect include cycles.
    fn identity(&self, path: &Path) -> PathBuf {
        fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
    }
}

/// Reads YAML files from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlLoader;

impl Loader for YamlLoader {
    fn load(&self, path: &Path) -> Result<Value, XymlError> {
        let content = fs::read_to_string(path).map_err(|e| XymlError::FileError {
            message: format!("Failed to read file: {}", e),
            path: path.to_string_lossy().to_string(),
            hint: Some("Check that the file exists and is readable".into()),
            code: Some(301),
        })?;

        parse_document(&content).map_err(|e| match e {
            XymlError::FileError { message, hint, code, .. } => XymlError::FileError {
                message,
                path: path.to_string_lossy().to_string(),
                hint,
                code,
            },
            other => other,
        })
    }
}

/// Parse YAML text into a document tree.
pub fn parse_document(text: &str) -> Result<Value, XymlError> {
    let raw: serde_yaml::Value = serde_yaml::from_str(text).map_err(|e| XymlError::FileError {
        message: format!("Invalid YAML: {}", e),
        path: "<string>".into(),
        hint: None,
        code: Some(302),
    })?;
    convert(raw)
}

fn convert(raw: serde_yaml::Value) -> Result<Value, XymlError> {
    Ok(match raw {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else {
                // u64 beyond i64 and real floats
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => {
            Value::Sequence(items.into_iter().map(convert).collect::<Result<_, _>>()?)
        }
        serde_yaml::Value::Mapping(map) => {
            let mut mapping = Mapping::new();
            for (k, v) in map {
                mapping.insert(key_to_string(k)?, convert(v)?);
            }
            Value::Mapping(mapping)
        }
        serde_yaml::Value::Tagged(tagged) => convert(tagged.value)?,
    })
}

fn key_to_string(key: serde_yaml::Value) -> Result<String, XymlError> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Null => Ok("null".into()),
        serde_yaml::Value::Tagged(tagged) => key_to_string(tagged.value),
        other => Err(XymlError::FileError {
            message: format!("Unsupported mapping key: {:?}", other),
            path: "<string>".into(),
            hint: Some("Only scalar mapping keys are supported".into()),
            code: Some(303),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::INCLUDE_KEY;

    #[test]
    fn test_parse_document_types() {
        let doc = parse_document("a: 1\nb: 2.5\nc: text\nd: [x, true, ~]\n1: numeric key\n")
            .expect("valid yaml");
        let m = doc.as_mapping().expect("mapping");

        assert_eq!(m.get("a"), Some(&Value::Integer(1)));
        assert_eq!(m.get("b"), Some(&Value::Float(2.5)));
        assert_eq!(m.get("c"), Some(&Value::from("text")));
        assert_eq!(
            m.get("d"),
            Some(&Value::Sequence(vec![Value::from("x"), Value::Bool(true), Value::Null]))
        );
        assert_eq!(m.get("1"), Some(&Value::from("numeric key")));
    }

    #[test]
    fn test_include_key_becomes_directive() {
        let doc = parse_document("xyml.include:\n  - a.yaml\n  - b.yaml\nkey: v\n").unwrap();
        let m = doc.as_mapping().unwrap();
        assert!(!m.contains_key(INCLUDE_KEY));
        assert_eq!(m.include().unwrap().statements.len(), 2);
    }

    #[test]
    fn test_invalid_yaml() {
        let err = parse_document("a: [unclosed").unwrap_err();
        assert_eq!(err.code(), Some(302));
    }

    #[test]
    fn test_missing_file() {
        let err = YamlLoader.load(Path::new("/definitely/not/here.yaml")).unwrap_err();
        match err {
            XymlError::FileError { code, .. } => assert_eq!(code, Some(301)),
            other => panic!("Expected FileError, got {:?}", other),
        }
    }
}
