use std::fmt;
use std::path::PathBuf;

/// The main error type for reference and include expansion.
#[derive(Debug, Clone, PartialEq)]
pub enum XymlError {
    /// Malformed include statement, include parameters or reference path.
    SyntaxError {
        message: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// A reference path could not be resolved and no default was given.
    ReferenceNotFound {
        segment: String,
        expression: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Substitution exceeded the maximum reference depth.
    RecursiveReference {
        value: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    IncludeNotFound {
        path: String,
        search_dirs: Vec<PathBuf>,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised when an include re-enters a file that is still being expanded.
    IncludeCycle {
        path: PathBuf,
        chain: Vec<PathBuf>,
        hint: Option<String>,
        code: Option<u32>,
    },
    TypeError {
        message: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised by the loader when a file cannot be read or parsed.
    FileError {
        message: String,
        path: String,
        hint: Option<String>,
        code: Option<u32>,
    },
}

fn suffix(hint: &Option<String>, code: &Option<u32>) -> String {
    format!(
        "{}{}",
        hint.as_ref().map_or(String::new(), |h| format!(" Hint: {}", h)),
        code.map_or(String::new(), |c| format!(" Code: {}", c))
    )
}

impl fmt::Display for XymlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XymlError::SyntaxError { message, hint, code } =>
                write!(f, "[XYML] Syntax Error: {}{}", message, suffix(hint, code)),
            XymlError::ReferenceNotFound { segment, expression, hint, code } =>
                write!(f, "[XYML] Reference Not Found: '{}' in '{}'{}",
                    segment, expression, suffix(hint, code)
                ),
            XymlError::RecursiveReference { value, hint, code } =>
                write!(f, "[XYML] Recursive Reference while resolving '{}'{}",
                    value, suffix(hint, code)
                ),
            XymlError::IncludeNotFound { path, search_dirs, hint, code } => {
                let dirs: Vec<String> = search_dirs.iter().map(|d| d.display().to_string()).collect();
                write!(f, "[XYML] Include file '{}' not found (searched: {}){}",
                    path,
                    if dirs.is_empty() { "<none>".to_string() } else { dirs.join(", ") },
                    suffix(hint, code)
                )
            }
            XymlError::IncludeCycle { path, chain, hint, code } => {
                let chain: Vec<String> = chain.iter().map(|p| p.display().to_string()).collect();
                write!(f, "[XYML] Include cycle at '{}': {}{}",
                    path.display(), chain.join(" -> "), suffix(hint, code)
                )
            }
            XymlError::TypeError { message, hint, code } =>
                write!(f, "[XYML] Type Error: {}{}", message, suffix(hint, code)),
            XymlError::FileError { message, path, hint, code } =>
                write!(f, "[XYML] File Error '{}': {}{}", path, message, suffix(hint, code)),
        }
    }
}

impl std::error::Error for XymlError {}

impl XymlError {
    /// Numeric code attached to the error, if any.
    pub fn code(&self) -> Option<u32> {
        match self {
            XymlError::SyntaxError { code, .. }
            | XymlError::ReferenceNotFound { code, .. }
            | XymlError::RecursiveReference { code, .. }
            | XymlError::IncludeNotFound { code, .. }
            | XymlError::IncludeCycle { code, .. }
            | XymlError::TypeError { code, .. }
            | XymlError::FileError { code, .. } => *code,
        }
    }

    pub(crate) fn syntax(message: impl Into<String>, hint: Option<&str>, code: u32) -> Self {
        XymlError::SyntaxError {
            message: message.into(),
            hint: hint.map(String::from),
            code: Some(code),
        }
    }

    pub(crate) fn type_error(message: impl Into<String>, hint: Option<&str>, code: u32) -> Self {
        XymlError::TypeError {
            message: message.into(),
            hint: hint.map(String::from),
            code: Some(code),
        }
    }
}
