//! adl_ast: Syntax tree definitions for the ADL compiler front end.
//!
//! Nodes live in an index arena owned by [`Ast`] and refer to each other by
//! [`NodeId`]. Every node records its parent, so resolution can walk the
//! lexical scope chain outward. The [`syntax`] module builds trees from a
//! declarative description in place of a textual parser.

pub mod node;
pub mod syntax;
pub mod syntax_kind;
pub mod types;
pub mod visitor;

// Re-export key types
pub use node::*;
pub use syntax_kind::SyntaxKind;
pub use types::*;
