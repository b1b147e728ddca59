//! YAML documents with `{{ path }}` references and `xyml.include` directives.
//!
//! Loading a file runs two passes: includes are expanded into the tree, then
//! every remaining reference is substituted against the merged result.

pub mod ast;
pub mod config;
pub mod context;
pub mod error;
pub mod include;
pub mod lexer;
pub mod loader;
pub mod reference;
pub mod resolver;
pub mod scalar;
pub mod utils;

pub use ast::{Mapping, Value};
pub use config::{Options, XymlFile};
pub use context::Context;
pub use error::XymlError;
pub use include::IncludeResolver;
pub use loader::{parse_document, Loader, YamlLoader};
pub use reference::{Mode, ReferenceResolver};
pub use resolver::Resolver;
pub use scalar::parse_scalar;
