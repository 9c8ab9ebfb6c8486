//! adl_checker: The ADL type checker.
//!
//! Turns bound syntax into a graph of types: merges reopened namespaces,
//! resolves references, instantiates templates, enforces the structural
//! rules of models, interfaces and enums, and applies decorators supplied
//! through a [`DecoratorRegistry`].

mod checker;
mod declarations;
pub mod decorators;
mod error;
pub mod instantiation;
mod merge;
mod models;
mod names;
mod resolve;
pub mod types;

pub use checker::Checker;
pub use decorators::{
    Decorator, DecoratorApplication, DecoratorArgument, DecoratorContext, DecoratorRegistry, StateMap,
};
pub use error::{CheckerError, DecoratorError};
pub use instantiation::{InstantiationMap, SymbolLinks};
pub use names::type_name;
pub use types::{Type, TypeKind, TypeTable};
