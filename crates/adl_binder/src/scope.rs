//! Binding containers.

use adl_ast::types::{NodeId, SymbolId};

/// Where the binder currently declares symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Top level of a source file: declarations go into the file's exports
    /// and belong to the global namespace.
    File { file: NodeId },
    /// Inside a namespace (block or blockless): declarations go into the
    /// namespace symbol's exports.
    Namespace { symbol: SymbolId },
}
