use crate::ast::Value;
use crate::context::Context;
use crate::XymlError;

/// A pass that rewrites a document tree against a lookup context.
///
/// The tree is handed over by value and the rewritten tree is returned, so a
/// pass may change its shape (an include can turn a mapping into a list).
pub trait Resolver {
    fn resolve(&self, tree: Value, context: &Context<'_>) -> Result<Value, XymlError>;

    /// Resolve a tree against a snapshot of itself.
    fn resolve_self(&self, tree: Value) -> Result<Value, XymlError> {
        let snapshot = tree.clone();
        self.resolve(tree, &Context::new(&snapshot))
    }
}
