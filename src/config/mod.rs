// Author: Dustin Pilgrim
// License: MIT

use std::env;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::ast::{Mapping, Value};
use crate::context::Context;
use crate::include::IncludeResolver;
use crate::loader::{parse_document, Loader, YamlLoader};
use crate::reference::ReferenceResolver;
use crate::resolver::Resolver;
use crate::{utils, XymlError};

mod access;
mod conversion;

/// Knobs for loading a document.
#[derive(Debug, Clone)]
pub struct Options {
    include_dirs: Vec<PathBuf>,
    params: Mapping,
    fail_on_resolve: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            include_dirs: Vec::new(),
            params: Mapping::new(),
            fail_on_resolve: true,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extra directory searched for relative includes, after the directory
    /// of the root file.
    pub fn include_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.include_dirs.push(dir.into());
        self
    }

    pub fn include_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.include_dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    /// Value exposed as `xyml.param.<name>` to every reference in the document.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name, value.into());
        self
    }

    pub fn params(mut self, params: Mapping) -> Self {
        self.params = params;
        self
    }

    /// When false, unresolvable references are kept verbatim instead of
    /// failing the load.
    pub fn fail_on_resolve(mut self, fail: bool) -> Self {
        self.fail_on_resolve = fail;
        self
    }
}

/// A fully expanded document: includes spliced in, references substituted.
///
/// # Example
/// ```no_run
/// # use xyml::XymlFile;
/// # fn main() -> Result<(), xyml::XymlError> {
/// let config = XymlFile::from_file("app.yaml")?;
/// let port: u16 = config.get("server.port")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct XymlFile {
    path: Option<PathBuf>,
    content: Value,
}

impl XymlFile {
    /// Load a YAML file, resolving includes relative to its own directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, XymlError> {
        Self::from_file_with_options(path, &Options::default())
    }

    pub fn from_file_with_options<P: AsRef<Path>>(path: P, options: &Options) -> Result<Self, XymlError> {
        let path = path.as_ref();
        Self::from_loaded(path, YamlLoader.load(path)?, options)
    }

    fn from_loaded(path: &Path, tree: Value, options: &Options) -> Result<Self, XymlError> {
        let base_dir = utils::absolute(path.parent().unwrap_or_else(|| Path::new(".")));
        let content = expand(tree, &YamlLoader, search_dirs(Some(base_dir), options), options, Some(path))?;

        Ok(Self {
            path: Some(path.to_path_buf()),
            content,
        })
    }

    /// Load `primary`, or `fallback` if `primary` cannot be read.
    ///
    /// Only a failure to read or parse `primary` itself triggers the
    /// fallback. Errors from its includes or references are reported as is.
    pub fn from_file_with_fallback<P: AsRef<Path>>(
        primary: P,
        fallback: P,
        options: &Options,
    ) -> Result<Self, XymlError> {
        let primary_path = primary.as_ref();
        match YamlLoader.load(primary_path) {
            Ok(tree) => Self::from_loaded(primary_path, tree, options),
            Err(XymlError::FileError { .. }) => {
                debug!(
                    primary = %primary.as_ref().display(),
                    fallback = %fallback.as_ref().display(),
                    "primary config unavailable, trying fallback"
                );
                Self::from_file_with_options(&fallback, options).map_err(|e| match e {
                    XymlError::FileError { message, .. } => XymlError::FileError {
                        message: format!(
                            "Failed to load config from primary path '{}' or fallback path '{}': {}",
                            primary.as_ref().display(),
                            fallback.as_ref().display(),
                            message
                        ),
                        path: format!(
                            "{} (fallback: {})",
                            primary.as_ref().display(),
                            fallback.as_ref().display()
                        ),
                        hint: Some("Check that at least one of the config files exists".into()),
                        code: Some(301),
                    },
                    other => other,
                })
            }
            Err(other) => Err(other),
        }
    }

    /// Parse YAML text. Relative includes are looked up in the configured
    /// include directories, then the current directory.
    pub fn from_str(yaml: &str, options: &Options) -> Result<Self, XymlError> {
        Self::from_value(parse_document(yaml)?, options)
    }

    pub fn from_value(tree: Value, options: &Options) -> Result<Self, XymlError> {
        Self::from_value_with_loader(tree, &YamlLoader, options)
    }

    /// Like [`XymlFile::from_value`] with includes read through `loader`.
    pub fn from_value_with_loader(tree: Value, loader: &dyn Loader, options: &Options) -> Result<Self, XymlError> {
        let content = expand(tree, loader, search_dirs(None, options), options, None)?;
        Ok(Self { path: None, content })
    }

    /// The file this document was loaded from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn content(&self) -> &Value {
        &self.content
    }

    pub fn into_content(self) -> Value {
        self.content
    }

    /// Deserialize the whole document into `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, XymlError> {
        let yaml = serde_yaml::to_value(&self.content)
            .map_err(|e| XymlError::type_error(format!("Failed to serialize document: {}", e), None, 412))?;
        serde_yaml::from_value(yaml).map_err(|e| {
            XymlError::type_error(
                format!("Failed to deserialize document: {}", e),
                Some("Check that the document matches the target type"),
                412,
            )
        })
    }
}

fn search_dirs(base_dir: Option<PathBuf>, options: &Options) -> Vec<PathBuf> {
    let candidates = base_dir
        .into_iter()
        .chain(options.include_dirs.iter().map(|d| utils::absolute(d)))
        .chain(env::current_dir().ok());

    let mut dirs = Vec::new();
    for dir in candidates {
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    dirs
}

/// Include expansion followed by a reference pass over the merged tree.
fn expand(
    tree: Value,
    loader: &dyn Loader,
    search_dirs: Vec<PathBuf>,
    options: &Options,
    origin: Option<&Path>,
) -> Result<Value, XymlError> {
    let params = Value::Mapping(options.params.clone());

    let mut includes = IncludeResolver::new(loader, search_dirs);
    if let Some(origin) = origin {
        includes = includes.with_origin(origin);
    }
    let snapshot = tree.clone();
    let expanded = includes.resolve(tree, &Context::new(&snapshot).with_params(&params))?;

    let snapshot = expanded.clone();
    ReferenceResolver::new(options.fail_on_resolve).resolve(expanded, &Context::new(&snapshot).with_params(&params))
}

#[cfg(test)]
mod tests;
