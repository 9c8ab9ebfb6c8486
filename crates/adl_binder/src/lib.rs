//! adl_binder: Symbol table construction.
//!
//! The binder walks the syntax tree and creates symbols for every
//! declaration, links reopened namespaces within one table, records the
//! namespace each declaration belongs to, and collects `using` directives
//! and blockless-namespace scopes for the checker's resolver.

mod binder;
mod scope;
mod symbol;

pub use binder::Binder;
pub use symbol::{Symbol, SymbolKind, SymbolTable};
