use std::path::{Path, PathBuf};

use crate::XymlError;

/// Expand a leading `~/` to the home directory.
pub fn expand_home(raw_path: &str) -> Result<PathBuf, XymlError> {
    if let Some(rest) = raw_path.strip_prefix("~/") {
        let home = dirs::home_dir().ok_or_else(|| XymlError::FileError {
            message: "Could not determine home directory for ~ expansion".into(),
            path: raw_path.to_string(),
            hint: Some("Set HOME or use an absolute include path".into()),
            code: Some(300),
        })?;
        return Ok(home.join(rest));
    }
    Ok(PathBuf::from(raw_path))
}

/// Make a directory absolute against the current working directory.
pub fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home() {
        let expanded = expand_home("~/conf/base.yaml").expect("home dir");
        assert!(expanded.is_absolute());
        assert!(expanded.ends_with("conf/base.yaml"));
        assert_eq!(expand_home("rel/x.yaml").unwrap(), PathBuf::from("rel/x.yaml"));
    }

    #[test]
    fn test_absolute() {
        assert!(absolute(Path::new("some/dir")).is_absolute());
        assert_eq!(absolute(Path::new("/abs")), PathBuf::from("/abs"));
    }
}
