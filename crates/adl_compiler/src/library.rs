//! Decorators every program gets.

use adl_ast::TypeId;
use adl_checker::{DecoratorArgument, DecoratorContext, DecoratorError, DecoratorRegistry, StateMap};

/// State key the `@doc` decorator writes under.
pub const DOC_KEY: &str = "doc";

/// Install the standard decorators into `registry`.
pub fn register_standard_decorators(registry: &mut DecoratorRegistry) {
    registry.register_fn("doc", doc);
}

/// `@doc("text")`: attach documentation to any type.
fn doc(
    ctx: &mut DecoratorContext<'_>,
    target: TypeId,
    arguments: &[DecoratorArgument],
) -> Result<(), DecoratorError> {
    let [argument] = arguments else {
        return Err(DecoratorError::ArgumentCount {
            expected: 1,
            actual: arguments.len(),
        });
    };
    if argument.as_str().is_none() {
        return Err(DecoratorError::InvalidArgument {
            index: 0,
            reason: "expected a string".to_string(),
        });
    }
    ctx.state.set(DOC_KEY, target, argument.clone());
    Ok(())
}

/// The documentation attached to `target` by `@doc`, if any.
pub fn get_doc(state: &StateMap, target: TypeId) -> Option<&str> {
    state.get(DOC_KEY, target).and_then(DecoratorArgument::as_str)
}
