use super::*;
use crate::context::Lookup;
use crate::lexer::parse_path;

impl XymlFile {
    /// Get a typed value using the reference path grammar
    /// (`server.port`, `hosts[0]`, `users.name`).
    ///
    /// Automatically handles both `snake_case` and `kebab-case` key names.
    ///
    /// # Examples
    /// ```no_run
    /// # use xyml::XymlFile;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// # let config = XymlFile::from_file("config.yaml")?;
    /// let host: String = config.get("server.host")?;
    /// let port: u16 = config.get("server.port")?;
    /// let debug: bool = config.get("debug")?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    /// Returns error if path doesn't exist or value can't be converted to type T.
    pub fn get<T>(&self, path: &str) -> Result<T, XymlError>
    where
        T: TryFrom<Value, Error = XymlError>,
    {
        let value = self.get_value_flexible(path)?;
        T::try_from(value).map_err(|e| match e {
            XymlError::TypeError { message, hint, code } => XymlError::TypeError {
                message: format!("{} (at '{}')", message, path),
                hint,
                code,
            },
            other => other,
        })
    }

    /// Get an optional typed value - returns `None` if the path doesn't exist.
    pub fn get_optional<T>(&self, path: &str) -> Result<Option<T>, XymlError>
    where
        T: TryFrom<Value, Error = XymlError>,
    {
        match self.get_value_flexible(path) {
            Ok(value) => Ok(Some(T::try_from(value)?)),
            Err(XymlError::ReferenceNotFound { code: Some(304), .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Get a value with a fallback default.
    ///
    /// ```no_run
    /// # use xyml::XymlFile;
    /// # let config = XymlFile::from_file("config.yaml").unwrap();
    /// let timeout = config.get_or("server.timeout", 30u64);
    /// ```
    pub fn get_or<T>(&self, path: &str, default: T) -> T
    where
        T: TryFrom<Value, Error = XymlError>,
    {
        self.get(path).unwrap_or(default)
    }

    /// Tries each `snake_case` / `kebab-case` spelling per segment.
    fn get_value_flexible(&self, path: &str) -> Result<Value, XymlError> {
        if let Ok(v) = self.get_value(path) {
            return Ok(v);
        }
        if path.trim().is_empty() {
            return self.get_value(path);
        }

        let segs: Vec<&str> = path.split('.').collect();

        fn variants(seg: &str) -> Vec<String> {
            let mut out = vec![seg.to_string()];
            for v in [seg.replace('-', "_"), seg.replace('_', "-")] {
                if !out.contains(&v) {
                    out.push(v);
                }
            }
            out
        }

        // DFS over combinations, stop on first that resolves
        fn dfs(file: &XymlFile, segs: &[&str], i: usize, cur: &mut Vec<String>) -> Option<Value> {
            if i == segs.len() {
                return file.get_value(&cur.join(".")).ok();
            }
            for v in variants(segs[i]) {
                cur.push(v);
                if let Some(val) = dfs(file, segs, i + 1, cur) {
                    return Some(val);
                }
                cur.pop();
            }
            None
        }

        match dfs(self, &segs, 0, &mut Vec::new()) {
            Some(value) => Ok(value),
            // Report the error of the path as written.
            None => self.get_value(path),
        }
    }

    /// Get a raw `Value`. The empty path returns the whole document.
    pub fn get_value(&self, path: &str) -> Result<Value, XymlError> {
        if path.trim().is_empty() {
            return Ok(self.content.clone());
        }

        let segments = parse_path(path.trim())?;
        match Context::new(&self.content).lookup(&segments) {
            Lookup::Found(value) => Ok(value),
            Lookup::Missing(segment) => Err(XymlError::ReferenceNotFound {
                segment,
                expression: path.to_string(),
                hint: Some("Check that the path exists in your config file".into()),
                code: Some(304),
            }),
        }
    }

    /// Get all keys at a given path level.
    pub fn get_keys(&self, path: &str) -> Result<Vec<String>, XymlError> {
        match self.get_value_flexible(path)? {
            Value::Mapping(m) => Ok(m.keys().cloned().collect()),
            other => Err(XymlError::type_error(
                format!("Path '{}' is not a mapping (got {})", path, other.type_name()),
                Some("Only mappings have keys"),
                306,
            )),
        }
    }

    pub fn has(&self, path: &str) -> bool {
        self.get_value_flexible(path).is_ok()
    }
}
