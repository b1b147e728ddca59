use crate::ast::Mapping;
use crate::lexer;
use crate::scalar::parse_scalar;
use crate::XymlError;

/// One parsed entry of an include directive: `path << key=value, ... >>`.
#[derive(Debug, Clone, PartialEq)]
pub struct IncludeStatement {
    /// Path expression, still subject to reference resolution.
    pub path_expr: String,
    pub params: Option<Mapping>,
}

impl IncludeStatement {
    pub fn parse(statement: &str) -> Result<Self, XymlError> {
        let (path_expr, raw_params) = lexer::split_statement(statement)?;
        if path_expr.is_empty() {
            return Err(XymlError::syntax(
                format!("Include statement '{}' has no path", statement),
                Some("Write `xyml.include: path/to/file.yaml`"),
                112,
            ));
        }
        let params = raw_params.as_deref().map(parse_parameters).transpose()?;
        Ok(Self { path_expr, params })
    }
}

/// Parse `key=value, other=1` into a mapping of typed values.
pub fn parse_parameters(raw: &str) -> Result<Mapping, XymlError> {
    let mut params = Mapping::new();
    for pair in lexer::split_top_level(raw, ',') {
        let (key, value) = pair
            .split_once('=')
            .map(|(k, v)| (k.trim(), v.trim()))
            .unwrap_or((pair.trim(), ""));
        if key.is_empty() || value.is_empty() {
            return Err(XymlError::syntax(
                format!("Invalid parameter string '{}'", raw),
                Some("Parameters are written as key=value pairs separated by commas"),
                111,
            ));
        }
        params.insert(key, parse_scalar(value));
    }
    Ok(params)
}
