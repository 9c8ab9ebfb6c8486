//! Decorator application.
//!
//! Decorators are supplied from outside the checker through a
//! [`DecoratorRegistry`] keyed by qualified path. The checker resolves each
//! decorator expression to a decorator symbol, evaluates its arguments and,
//! once the target type is complete, invokes the implementation. Effects are
//! recorded in the [`StateMap`], never on the type itself.

use crate::checker::Checker;
use crate::error::{CheckerError, DecoratorError};
use crate::names::type_name;
use crate::types::{TypeKind, TypeTable};
use adl_ast::node::{Ast, NodeKind};
use adl_ast::types::{NodeId, TypeId};
use adl_binder::SymbolKind;
use adl_diagnostics::messages;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::fmt;
use std::rc::Rc;
use tracing::warn;

/// An evaluated decorator argument. Literal types are passed by value.
#[derive(Debug, Clone, PartialEq)]
pub enum DecoratorArgument {
    String(String),
    Number(f64),
    Boolean(bool),
    Type(TypeId),
}

impl DecoratorArgument {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DecoratorArgument::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            DecoratorArgument::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DecoratorArgument::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<TypeId> {
        match self {
            DecoratorArgument::Type(t) => Some(*t),
            _ => None,
        }
    }
}

/// A decorator resolved against a declaration, waiting to run on its type.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoratorApplication {
    /// Qualified registry path, e.g. `doc` or `My.Lib.tag`.
    pub path: String,
    pub arguments: Vec<DecoratorArgument>,
    /// The decorator expression, absent for synthesized applications.
    pub node: Option<NodeId>,
}

impl DecoratorApplication {
    /// The unqualified decorator name.
    pub fn name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }
}

/// What a decorator implementation may see and touch.
pub struct DecoratorContext<'c> {
    pub types: &'c TypeTable,
    pub ast: &'c Ast,
    pub state: &'c mut StateMap,
    /// The decorator expression being applied, if any.
    pub node: Option<NodeId>,
}

impl DecoratorContext<'_> {
    pub fn type_name(&self, ty: TypeId) -> String {
        type_name(self.types, self.ast, ty)
    }
}

/// A decorator implementation.
pub trait Decorator {
    fn apply(
        &self,
        ctx: &mut DecoratorContext<'_>,
        target: TypeId,
        arguments: &[DecoratorArgument],
    ) -> Result<(), DecoratorError>;
}

impl<F> Decorator for F
where
    F: Fn(&mut DecoratorContext<'_>, TypeId, &[DecoratorArgument]) -> Result<(), DecoratorError>,
{
    fn apply(
        &self,
        ctx: &mut DecoratorContext<'_>,
        target: TypeId,
        arguments: &[DecoratorArgument],
    ) -> Result<(), DecoratorError> {
        self(ctx, target, arguments)
    }
}

/// Decorator implementations by qualified path.
#[derive(Clone, Default)]
pub struct DecoratorRegistry {
    decorators: IndexMap<String, Rc<dyn Decorator>>,
}

impl DecoratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, path: &str, decorator: impl Decorator + 'static) {
        self.decorators.insert(path.to_string(), Rc::new(decorator));
    }

    /// Register a closure. Unlike [`register`](Self::register), the closure's
    /// parameter types are inferred.
    pub fn register_fn<F>(&mut self, path: &str, decorator: F)
    where
        F: Fn(&mut DecoratorContext<'_>, TypeId, &[DecoratorArgument]) -> Result<(), DecoratorError>
            + 'static,
    {
        self.register(path, decorator);
    }

    pub fn get(&self, path: &str) -> Option<Rc<dyn Decorator>> {
        self.decorators.get(path).cloned()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.decorators.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.decorators.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.decorators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decorators.is_empty()
    }
}

impl fmt::Debug for DecoratorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.decorators.keys()).finish()
    }
}

/// Out-of-band decorator state: `key → type → value`.
#[derive(Debug, Clone, Default)]
pub struct StateMap {
    maps: FxHashMap<String, IndexMap<TypeId, DecoratorArgument>>,
}

impl StateMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, target: TypeId, value: DecoratorArgument) {
        self.maps.entry(key.to_string()).or_default().insert(target, value);
    }

    pub fn get(&self, key: &str, target: TypeId) -> Option<&DecoratorArgument> {
        self.maps.get(key)?.get(&target)
    }

    pub fn has(&self, key: &str, target: TypeId) -> bool {
        self.get(key, target).is_some()
    }

    /// Entries under `key` in insertion order.
    pub fn entries(&self, key: &str) -> impl Iterator<Item = (TypeId, &DecoratorArgument)> {
        self.maps
            .get(key)
            .into_iter()
            .flat_map(|m| m.iter().map(|(t, v)| (*t, v)))
    }
}

impl<'a> Checker<'a> {
    /// Resolve and evaluate the decorators written on a declaration.
    /// The result is in application order: closest to the declaration first.
    pub(crate) fn check_decorators(&mut self, node: NodeId) -> Vec<DecoratorApplication> {
        let ast = self.ast;
        let mut applications = Vec::new();
        for &decorator in ast.kind(node).decorators() {
            let NodeKind::DecoratorExpression(expr) = ast.kind(decorator) else {
                continue;
            };
            let Some(symbol) = self.resolve_reference(expr.target, true) else {
                continue;
            };
            let path = match &self.binder.symbol(symbol).kind {
                SymbolKind::Decorator { path } => path.clone(),
                SymbolKind::Type => {
                    let name = self.binder.symbol(symbol).name_text.clone();
                    self.report(&messages::_0_IS_NOT_A_DECORATOR, &[&name], Some(decorator));
                    continue;
                }
            };
            let arguments = expr
                .arguments
                .iter()
                .map(|&argument| {
                    let ty = self.get_type_for_node(argument);
                    self.decorator_argument(ty)
                })
                .collect();
            applications.push(DecoratorApplication {
                path,
                arguments,
                node: Some(decorator),
            });
        }
        applications.reverse();
        applications
    }

    fn decorator_argument(&self, ty: TypeId) -> DecoratorArgument {
        match self.types.kind(ty) {
            TypeKind::String(value) => DecoratorArgument::String(value.clone()),
            TypeKind::Number(value) => DecoratorArgument::Number(*value),
            TypeKind::Boolean(value) => DecoratorArgument::Boolean(*value),
            _ => DecoratorArgument::Type(ty),
        }
    }

    /// Run every decorator recorded on a type.
    pub(crate) fn finish_type(&mut self, ty: TypeId) {
        let applications = self.types.kind(ty).decorators().to_vec();
        self.run_decorators(ty, &applications);
    }

    pub(crate) fn run_decorators(&mut self, ty: TypeId, applications: &[DecoratorApplication]) {
        for application in applications {
            if self.fatal.is_some() {
                return;
            }
            let Some(decorator) = self.registry.get(&application.path) else {
                self.report(
                    &messages::DECORATOR_0_HAS_NO_IMPLEMENTATION,
                    &[application.name()],
                    application.node,
                );
                continue;
            };

            let result = {
                let mut ctx = DecoratorContext {
                    types: &self.types,
                    ast: self.ast,
                    state: &mut self.state,
                    node: application.node,
                };
                decorator.apply(&mut ctx, ty, &application.arguments)
            };

            if let Err(error) = result {
                if self.design_time_build {
                    warn!(decorator = application.name(), %error, "decorator failed");
                    let message = error.to_string();
                    let location = self.types.get(ty).node.or(application.node);
                    self.report(
                        &messages::DECORATOR_0_FAILED_1,
                        &[application.name(), &message],
                        location,
                    );
                } else {
                    self.fatal = Some(CheckerError::Decorator {
                        name: application.name().to_string(),
                        source: error,
                    });
                    return;
                }
            }
        }
    }
}
