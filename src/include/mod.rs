// Author: Dustin Pilgrim
// License: MIT

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::ast::{IncludeDirective, Mapping, Value};
use crate::context::Context;
use crate::loader::Loader;
use crate::reference::{Mode, ReferenceResolver};
use crate::resolver::Resolver;
use crate::utils;
use crate::XymlError;

mod merge;
mod statement;

pub use merge::{update_content_with_include_content, update_inc_content};
pub use statement::{parse_parameters, IncludeStatement};

/// Expands `xyml.include` directives by splicing in other documents.
pub struct IncludeResolver<'l> {
    loader: &'l dyn Loader,
    search_dirs: Vec<PathBuf>,
    /// Identities of the documents currently being expanded, outermost first.
    open: Vec<PathBuf>,
}

impl<'l> IncludeResolver<'l> {
    /// Relative include paths are looked up in `search_dirs`, in order.
    pub fn new(loader: &'l dyn Loader, search_dirs: Vec<PathBuf>) -> Self {
        Self {
            loader,
            search_dirs: search_dirs.iter().map(|d| utils::absolute(d)).collect(),
            open: Vec::new(),
        }
    }

    /// Mark the document being resolved so including it again is a cycle.
    pub fn with_origin(mut self, path: &Path) -> Self {
        self.open.push(self.loader.identity(path));
        self
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Resolver for the content of `file`: sees this resolver's directories
    /// plus the file's own.
    fn nested(&self, file: &Path, identity: PathBuf) -> Self {
        let mut search_dirs = self.search_dirs.clone();
        if let Some(parent) = file.parent() {
            let parent = utils::absolute(parent);
            if !search_dirs.contains(&parent) {
                search_dirs.push(parent);
            }
        }
        let mut open = self.open.clone();
        open.push(identity);
        Self { loader: self.loader, search_dirs, open }
    }

    fn walk(&self, value: Value, context: &Context<'_>) -> Result<Value, XymlError> {
        match value {
            Value::Mapping(mut mapping) => {
                let directive = mapping.take_include();
                for v in mapping.values_mut() {
                    *v = self.walk(std::mem::take(v), context)?;
                }
                match directive {
                    Some(directive) => self.apply_directive(mapping, directive, context),
                    None => Ok(Value::Mapping(mapping)),
                }
            }
            Value::Sequence(items) => {
                let mut resolved = Vec::with_capacity(items.len());
                for item in items {
                    let was_mapping = matches!(item, Value::Mapping(_));
                    match self.walk(item, context)? {
                        // A list include inside a list is spliced in place.
                        Value::Sequence(inner) if was_mapping => resolved.extend(inner),
                        other => resolved.push(other),
                    }
                }
                Ok(Value::Sequence(resolved))
            }
            other => Ok(other),
        }
    }

    fn apply_directive(
        &self,
        mut mapping: Mapping,
        directive: IncludeDirective,
        context: &Context<'_>,
    ) -> Result<Value, XymlError> {
        match self.resolve_directive(directive, context)? {
            None => Ok(Value::Mapping(mapping)),
            Some(Value::Mapping(fragment)) => {
                update_content_with_include_content(&mut mapping, fragment);
                Ok(Value::Mapping(mapping))
            }
            Some(Value::Sequence(items)) if mapping.is_empty() => Ok(Value::Sequence(items)),
            Some(Value::Sequence(_)) => Err(XymlError::syntax(
                format!(
                    "Include resolved to a list but its mapping also has keys: {}",
                    mapping.keys().cloned().collect::<Vec<_>>().join(", ")
                ),
                Some("Put a list include in its own list item"),
                114,
            )),
            Some(other) => Err(XymlError::syntax(
                format!("Resolved include content is not of list or dict type (got {})", other.type_name()),
                None,
                113,
            )),
        }
    }

    fn resolve_directive(
        &self,
        directive: IncludeDirective,
        context: &Context<'_>,
    ) -> Result<Option<Value>, XymlError> {
        let mut content = None;
        for statement in directive.statements {
            let Value::String(text) = statement else {
                return Err(XymlError::syntax(
                    format!("Include statement must be a string, got {} '{}'", statement.type_name(), statement),
                    None,
                    115,
                ));
            };
            let fragment = self.resolve_statement(&text, context)?;
            content = update_inc_content(content, fragment)?;
        }
        Ok(content)
    }

    fn resolve_statement(&self, text: &str, context: &Context<'_>) -> Result<Value, XymlError> {
        let statement = IncludeStatement::parse(text)?;

        let path = match ReferenceResolver::with_mode(Mode::Lenient).get_reference(
            statement.path_expr,
            context,
            0,
        )? {
            Value::String(s) => s,
            other => other.to_string(),
        };
        info!(include = %path, "resolving include");

        let file = self.find_file(&path)?;
        let identity = self.loader.identity(&file);
        if self.open.contains(&identity) {
            let mut chain = self.open.clone();
            chain.push(identity.clone());
            return Err(XymlError::IncludeCycle {
                path: identity,
                chain,
                hint: Some("A file may not include itself, directly or indirectly".into()),
                code: Some(311),
            });
        }

        let content = self.loader.load(&file)?;
        let nested = self.nested(&file, identity);

        match statement.params {
            Some(params) => {
                let params = Value::Mapping(params);
                let scope = Context::new(&params).with_params(&params);
                // Parameterized content sees nothing but its parameters, so a
                // miss can never be left for the final pass.
                let content = ReferenceResolver::with_mode(Mode::Strict).resolve(content, &scope)?;
                nested.walk(content, &scope)
            }
            None => {
                let content = ReferenceResolver::with_mode(Mode::Partial).resolve(content, context)?;
                nested.walk(content, context)
            }
        }
    }

    fn find_file(&self, path: &str) -> Result<PathBuf, XymlError> {
        let candidate = utils::expand_home(path)?;
        if candidate.is_absolute() {
            if self.loader.exists(&candidate) {
                return Ok(candidate);
            }
        } else {
            for dir in &self.search_dirs {
                let full = dir.join(&candidate);
                if self.loader.exists(&full) {
                    return Ok(full);
                }
                debug!(dir = %dir.display(), include = path, "include not in search dir");
            }
        }

        Err(XymlError::IncludeNotFound {
            path: path.to_string(),
            search_dirs: self.search_dirs.clone(),
            hint: Some("Are include directories provided?".into()),
            code: Some(310),
        })
    }
}

impl Resolver for IncludeResolver<'_> {
    fn resolve(&self, tree: Value, context: &Context<'_>) -> Result<Value, XymlError> {
        self.walk(tree, context)
    }
}
