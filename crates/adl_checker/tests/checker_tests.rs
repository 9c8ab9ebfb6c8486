//! Integration tests for the ADL checker
//!
//! Programs are built with the `adl_ast::syntax` builders, bound, and checked
//! end to end. Assertions look at the resulting type graph and diagnostics.

use std::cell::RefCell;
use std::rc::Rc;

use adl_ast::syntax::*;
use adl_ast::{Ast, TypeId};
use adl_binder::Binder;
use adl_checker::types::TypeKind;
use adl_checker::{Checker, CheckerError, DecoratorArgument, DecoratorError, DecoratorRegistry};

// ============================================================================
// Helpers
// ============================================================================

fn checker_with<'a>(
    ast: &'a Ast,
    decorators: &[&str],
    registry: DecoratorRegistry,
    design_time_build: bool,
) -> Checker<'a> {
    let mut binder = Binder::new(ast);
    binder.bind_program();
    for path in decorators {
        binder.declare_decorator(path).unwrap();
    }
    Checker::with_options(binder, registry, design_time_build)
}

fn check(ast: &Ast) -> Checker<'_> {
    let mut checker = checker_with(ast, &[], DecoratorRegistry::new(), false);
    checker.check_program().unwrap();
    checker
}

fn declaration(checker: &mut Checker<'_>, ast: &Ast, name: &str) -> TypeId {
    checker.get_type_for_node(ast.find_declaration(name).unwrap())
}

fn property(checker: &Checker<'_>, model: TypeId, name: &str) -> TypeId {
    checker.types().as_model(model).unwrap().properties[name]
}

fn property_type(checker: &Checker<'_>, model: TypeId, name: &str) -> TypeId {
    checker.types().as_property(property(checker, model, name)).unwrap().ty
}

/// A registry with a `tag` decorator that logs `target:label`.
fn tag_registry() -> (DecoratorRegistry, Rc<RefCell<Vec<String>>>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let mut registry = DecoratorRegistry::new();
    registry.register_fn("tag", move |ctx, target, args| {
        let label = args.first().and_then(|a| a.as_str()).unwrap_or_default();
        sink.borrow_mut().push(format!("{}:{}", ctx.type_name(target), label));
        Ok(())
    });
    (registry, log)
}

// ============================================================================
// Declared types and instantiation
// ============================================================================

#[test]
fn test_get_type_for_node_is_idempotent() {
    let mut ast = Ast::new();
    ast.add_file("main.adl", vec![model("Pet").prop("name", ty("string")).into()]);
    let mut checker = checker_with(&ast, &[], DecoratorRegistry::new(), false);

    let first = declaration(&mut checker, &ast, "Pet");
    let second = declaration(&mut checker, &ast, "Pet");
    assert_eq!(first, second);

    checker.check_program().unwrap();
    assert_eq!(declaration(&mut checker, &ast, "Pet"), first);
}

#[test]
fn test_instantiation_is_memoized_per_argument_list() {
    let mut ast = Ast::new();
    ast.add_file(
        "main.adl",
        vec![
            model("Pair").template(&["A", "B"]).prop("a", ty("A")).prop("b", ty("B")).into(),
            model("Uses")
                .prop("x", generic("Pair", vec![ty("string"), ty("int32")]))
                .prop("y", generic("Pair", vec![ty("string"), ty("int32")]))
                .prop("z", generic("Pair", vec![ty("int32"), ty("string")]))
                .prop("w", generic("Pair", vec![ty("string"), ty("boolean")]))
                .into(),
        ],
    );
    let mut checker = check(&ast);
    assert!(checker.diagnostics().is_empty());

    let uses = declaration(&mut checker, &ast, "Uses");
    let x = property_type(&checker, uses, "x");
    let y = property_type(&checker, uses, "y");
    let z = property_type(&checker, uses, "z");
    let w = property_type(&checker, uses, "w");
    assert_eq!(x, y);
    assert_ne!(x, z);
    assert_ne!(x, w);
    assert_eq!(checker.get_type_name(x), "Pair<string, int32>");
    assert_eq!(checker.get_type_name(z), "Pair<int32, string>");

    let pair = declaration(&mut checker, &ast, "Pair");
    assert_ne!(pair, x);
    assert!(checker.types().as_model(pair).unwrap().template_arguments.is_empty());
}

#[test]
fn test_box_of_string_instantiates_once() {
    let mut ast = Ast::new();
    ast.add_file(
        "main.adl",
        vec![
            model("Box").template(&["T"]).prop("value", ty("T")).into(),
            model("Holder")
                .prop("a", generic("Box", vec![ty("string")]))
                .prop("b", generic("Box", vec![ty("string")]))
                .prop("s", ty("string"))
                .into(),
        ],
    );
    let mut checker = check(&ast);
    let holder = declaration(&mut checker, &ast, "Holder");
    let a = property_type(&checker, holder, "a");
    let b = property_type(&checker, holder, "b");
    let string = property_type(&checker, holder, "s");
    assert_eq!(a, b);
    assert_eq!(property_type(&checker, a, "value"), string);
    assert_eq!(checker.types().as_model(a).unwrap().template_arguments, vec![string]);
}

#[test]
fn test_nested_instantiation_shares_cache() {
    let mut ast = Ast::new();
    ast.add_file(
        "main.adl",
        vec![
            model("Box").template(&["T"]).prop("value", ty("T")).into(),
            model("Wrapper")
                .template(&["T"])
                .prop("inner", generic("Box", vec![ty("T")]))
                .into(),
            model("Holder")
                .prop("w", generic("Wrapper", vec![ty("string")]))
                .prop("b", generic("Box", vec![ty("string")]))
                .into(),
        ],
    );
    let mut checker = check(&ast);
    assert!(checker.diagnostics().is_empty());
    let holder = declaration(&mut checker, &ast, "Holder");
    let wrapper = property_type(&checker, holder, "w");
    let boxed = property_type(&checker, holder, "b");
    assert_eq!(property_type(&checker, wrapper, "inner"), boxed);
}

#[test]
fn test_self_referential_template() {
    let mut ast = Ast::new();
    ast.add_file(
        "main.adl",
        vec![
            model("Node")
                .template(&["T"])
                .prop("value", ty("T"))
                .prop("next", generic("Node", vec![ty("T")]))
                .into(),
            model("Holder")
                .prop("n", generic("Node", vec![ty("string")]))
                .into(),
        ],
    );
    let mut checker = check(&ast);
    assert!(checker.diagnostics().is_empty());

    let declared = declaration(&mut checker, &ast, "Node");
    assert_eq!(property_type(&checker, declared, "next"), declared);

    let holder = declaration(&mut checker, &ast, "Holder");
    let node = property_type(&checker, holder, "n");
    assert_ne!(node, declared);
    assert_eq!(property_type(&checker, node, "next"), node);
    assert_eq!(checker.get_type_name(node), "Node<string>");
    assert_eq!(checker.get_type_name(property_type(&checker, node, "value")), "string");
}

#[test]
fn test_template_argument_count_mismatch() {
    let mut ast = Ast::new();
    ast.add_file(
        "main.adl",
        vec![
            model("Pair").template(&["A", "B"]).into(),
            model("Uses")
                .prop("few", generic("Pair", vec![ty("string")]))
                .prop("many", generic("Pair", vec![ty("string"), ty("int32"), ty("boolean")]))
                .into(),
        ],
    );
    let mut checker = check(&ast);
    assert_eq!(checker.diagnostics().count_code(2001), 1);
    assert_eq!(checker.diagnostics().count_code(2002), 1);

    let uses = declaration(&mut checker, &ast, "Uses");
    assert_eq!(checker.get_type_name(property_type(&checker, uses, "few")), "Pair<string, ErrorType>");
    assert_eq!(checker.get_type_name(property_type(&checker, uses, "many")), "Pair<string, int32>");
}

#[test]
fn test_template_arguments_on_non_template() {
    let mut ast = Ast::new();
    ast.add_file(
        "main.adl",
        vec![
            model("Foo").into(),
            model("Uses").prop("f", generic("Foo", vec![ty("string")])).into(),
        ],
    );
    let mut checker = check(&ast);
    assert_eq!(checker.diagnostics().count_code(2003), 1);
    let foo = declaration(&mut checker, &ast, "Foo");
    let uses = declaration(&mut checker, &ast, "Uses");
    assert_eq!(property_type(&checker, uses, "f"), foo);
}

// ============================================================================
// Model rules
// ============================================================================

#[test]
fn test_duplicate_property_keeps_first() {
    let mut ast = Ast::new();
    ast.add_file(
        "main.adl",
        vec![model("A").prop("x", ty("string")).prop("x", ty("int32")).into()],
    );
    let mut checker = check(&ast);
    assert_eq!(checker.diagnostics().len(), 1);
    assert_eq!(checker.diagnostics().count_code(3003), 1);

    let a = declaration(&mut checker, &ast, "A");
    assert_eq!(checker.types().as_model(a).unwrap().properties.len(), 1);
    assert_eq!(checker.get_type_name(property_type(&checker, a, "x")), "string");
}

#[test]
fn test_inherited_property_cannot_be_overridden() {
    let mut ast = Ast::new();
    ast.add_file(
        "main.adl",
        vec![
            model("Base").prop("x", ty("string")).into(),
            model("Derived").extends(ty("Base")).prop("x", ty("int32")).into(),
        ],
    );
    let mut checker = check(&ast);
    assert_eq!(checker.diagnostics().count_code(3004), 1);
    assert_eq!(checker.diagnostics().count_code(3003), 0);
    let derived = declaration(&mut checker, &ast, "Derived");
    assert!(checker.types().as_model(derived).unwrap().properties.is_empty());
}

#[test]
fn test_intersection_duplicate_property() {
    let mut ast = Ast::new();
    ast.add_file(
        "main.adl",
        vec![
            model("A").prop("x", ty("string")).prop("a", ty("string")).into(),
            model("B").prop("x", ty("int32")).into(),
            alias("C", intersect(vec![ty("A"), ty("B")])).into(),
        ],
    );
    let mut checker = check(&ast);
    assert_eq!(checker.diagnostics().count_code(3007), 1);

    let c = declaration(&mut checker, &ast, "C");
    let model = checker.types().as_model(c).unwrap();
    assert!(model.name.is_empty());
    assert_eq!(model.properties.keys().collect::<Vec<_>>(), vec!["x", "a"]);
    assert_eq!(checker.get_type_name(property_type(&checker, c, "x")), "string");
}

#[test]
fn test_spread_copies_inherited_properties() {
    let mut ast = Ast::new();
    ast.add_file(
        "main.adl",
        vec![
            model("Base").prop("y", ty("string")).into(),
            model("Mid").extends(ty("Base")).prop("z", ty("int32")).into(),
            model("Copy").spread(ty("Mid")).into(),
        ],
    );
    let mut checker = check(&ast);
    assert!(checker.diagnostics().is_empty());

    let base = declaration(&mut checker, &ast, "Base");
    let mid = declaration(&mut checker, &ast, "Mid");
    let copy = declaration(&mut checker, &ast, "Copy");
    let copied = checker.types().as_model(copy).unwrap();
    assert_eq!(copied.properties.keys().collect::<Vec<_>>(), vec!["z", "y"]);
    assert!(copied.base_model.is_none());

    for (owner, name) in [(mid, "z"), (base, "y")] {
        let original = property(&checker, owner, name);
        let clone = property(&checker, copy, name);
        assert_ne!(clone, original);
        assert_eq!(checker.types().as_property(clone).unwrap().source_property, Some(original));
    }
}

#[test]
fn test_spread_of_template_parameter_is_deferred() {
    let mut ast = Ast::new();
    ast.add_file(
        "main.adl",
        vec![
            model("Pet").prop("name", ty("string")).into(),
            model("WithId").template(&["T"]).prop("id", ty("string")).spread(ty("T")).into(),
            model("Uses").prop("p", generic("WithId", vec![ty("Pet")])).into(),
        ],
    );
    let mut checker = check(&ast);
    assert!(checker.diagnostics().is_empty());

    let declared = declaration(&mut checker, &ast, "WithId");
    assert_eq!(checker.types().as_model(declared).unwrap().properties.len(), 1);
    let uses = declaration(&mut checker, &ast, "Uses");
    let instance = property_type(&checker, uses, "p");
    let keys: Vec<_> = checker.types().as_model(instance).unwrap().properties.keys().cloned().collect();
    assert_eq!(keys, vec!["id", "name"]);
}

#[test]
fn test_is_of_template_parameter_is_deferred() {
    let mut ast = Ast::new();
    ast.add_file(
        "main.adl",
        vec![
            model("Pet").prop("name", ty("string")).into(),
            model("Copy").template(&["T"]).is(ty("T")).into(),
            model("X").prop("c", generic("Copy", vec![ty("Pet")])).into(),
        ],
    );
    let mut checker = check(&ast);
    assert!(checker.diagnostics().is_empty());

    let x = declaration(&mut checker, &ast, "X");
    let copy = property_type(&checker, x, "c");
    assert_eq!(checker.get_type_name(copy), "Copy<Pet>");
    assert!(checker.types().as_model(copy).unwrap().properties.contains_key("name"));
}

#[test]
fn test_pet_and_dog() {
    let mut ast = Ast::new();
    ast.add_file(
        "main.adl",
        vec![
            model("Pet").prop("name", ty("string")).into(),
            model("Dog").extends(ty("Pet")).prop("bark", ty("string")).into(),
        ],
    );
    let mut checker = check(&ast);
    assert!(checker.diagnostics().is_empty());

    let dog = declaration(&mut checker, &ast, "Dog");
    let model = checker.types().as_model(dog).unwrap();
    assert_eq!(model.name, "Dog");
    let base = model.base_model.unwrap();
    assert_eq!(checker.types().as_model(base).unwrap().name, "Pet");
    assert_eq!(model.properties.keys().collect::<Vec<_>>(), vec!["bark"]);

    let walked: Vec<_> = checker
        .types()
        .walk_properties_inherited(dog)
        .into_iter()
        .map(|p| checker.types().as_property(p).unwrap().name.clone())
        .collect();
    assert_eq!(walked, vec!["bark", "name"]);
}

// ============================================================================
// Namespaces and resolution
// ============================================================================

#[test]
fn test_namespace_reopened_across_files() {
    let mut ast = Ast::new();
    ast.add_file("a.adl", vec![namespace("Foo").statement(model("A")).into()]);
    ast.add_file("b.adl", vec![namespace("Foo").statement(model("B")).into()]);
    let mut checker = check(&ast);
    assert!(checker.diagnostics().is_empty());

    let decls = ast.find_declarations("Foo");
    let first = checker.get_type_for_node(decls[0]);
    let second = checker.get_type_for_node(decls[1]);
    assert_eq!(first, second);

    let foo = checker.types().as_namespace(first).unwrap();
    assert_eq!(foo.models.keys().collect::<Vec<_>>(), vec!["A", "B"]);
    let global = checker.types().as_namespace(checker.global_namespace_type()).unwrap();
    assert_eq!(global.namespaces.len(), 1);
    assert_eq!(global.namespaces["Foo"], first);
}

#[test]
fn test_reopened_namespace_members_resolve_across_files() {
    let mut ast = Ast::new();
    ast.add_file("a.adl", vec![namespace("Foo").statement(model("A")).into()]);
    ast.add_file(
        "b.adl",
        vec![namespace("Foo").statement(model("B").prop("a", ty("A"))).into()],
    );
    let mut checker = check(&ast);
    assert!(checker.diagnostics().is_empty());
    let a = declaration(&mut checker, &ast, "A");
    let b = declaration(&mut checker, &ast, "B");
    assert_eq!(property_type(&checker, b, "a"), a);
}

#[test]
fn test_unknown_identifier_yields_error_type() {
    let mut ast = Ast::new();
    ast.add_file("main.adl", vec![model("A").prop("x", ty("Bogus")).into()]);
    let mut checker = check(&ast);

    let diagnostics = checker.diagnostics().diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, 1001);
    assert_eq!(diagnostics[0].message_text, "Unknown identifier Bogus");
    assert_eq!(diagnostics[0].file.as_deref(), Some("main.adl"));

    let a = declaration(&mut checker, &ast, "A");
    assert_eq!(property_type(&checker, a, "x"), checker.error_type());
}

#[test]
fn test_blockless_namespace_scopes_rest_of_file() {
    let mut ast = Ast::new();
    ast.add_file(
        "main.adl",
        vec![
            blockless_namespace("Store.Models").into(),
            model("Pet").into(),
            model("Owner").prop("pet", ty("Pet")).into(),
        ],
    );
    let mut checker = check(&ast);
    assert!(checker.diagnostics().is_empty());

    let pet = declaration(&mut checker, &ast, "Pet");
    assert_eq!(checker.get_type_name(pet), "Store.Models.Pet");
    let models = checker.get_type_for_node(ast.find_namespace("Store.Models").unwrap());
    assert_eq!(checker.types().as_namespace(models).unwrap().models.len(), 2);
    let owner = declaration(&mut checker, &ast, "Owner");
    assert_eq!(property_type(&checker, owner, "pet"), pet);
}

#[test]
fn test_using_imports_namespace_members() {
    let mut ast = Ast::new();
    ast.add_file("lib.adl", vec![namespace("Lib").statement(model("Pet")).into()]);
    ast.add_file(
        "app.adl",
        vec![
            using("Lib"),
            model("Owner").prop("pet", ty("Pet")).into(),
        ],
    );
    let mut checker = check(&ast);
    assert!(checker.diagnostics().is_empty());
    let pet = declaration(&mut checker, &ast, "Pet");
    let owner = declaration(&mut checker, &ast, "Owner");
    assert_eq!(property_type(&checker, owner, "pet"), pet);
}

#[test]
fn test_using_is_scoped_to_its_file() {
    let mut ast = Ast::new();
    ast.add_file("lib.adl", vec![namespace("Lib").statement(model("Pet")).into()]);
    ast.add_file("a.adl", vec![using("Lib")]);
    ast.add_file("b.adl", vec![model("Owner").prop("pet", ty("Pet")).into()]);
    let checker = check(&ast);
    assert_eq!(checker.diagnostics().count_code(1001), 1);
}

#[test]
fn test_using_must_name_a_namespace() {
    let mut ast = Ast::new();
    ast.add_file(
        "main.adl",
        vec![namespace("Lib").statement(model("Pet")).into(), using("Lib.Pet")],
    );
    let checker = check(&ast);
    assert_eq!(checker.diagnostics().count_code(1008), 1);
}

// ============================================================================
// Decorators
// ============================================================================

#[test]
fn test_decorators_apply_closest_first() {
    let mut ast = Ast::new();
    ast.add_file(
        "main.adl",
        vec![model("A")
            .decorate(dec("tag").arg(string_lit("first")))
            .decorate(dec("tag").arg(string_lit("second")))
            .property(prop("x", ty("string")).decorate(dec("tag").arg(string_lit("prop"))))
            .into()],
    );
    let (registry, log) = tag_registry();
    let mut checker = checker_with(&ast, &["tag"], registry, false);
    checker.check_program().unwrap();
    assert!(checker.diagnostics().is_empty());
    assert_eq!(*log.borrow(), vec!["x:prop", "A:second", "A:first"]);
}

#[test]
fn test_is_source_decorators_run_before_own() {
    let mut ast = Ast::new();
    ast.add_file(
        "main.adl",
        vec![
            model("Base").decorate(dec("tag").arg(string_lit("base"))).into(),
            model("Derived")
                .is(ty("Base"))
                .decorate(dec("tag").arg(string_lit("own")))
                .into(),
        ],
    );
    let (registry, log) = tag_registry();
    let mut checker = checker_with(&ast, &["tag"], registry, false);
    checker.check_program().unwrap();
    assert_eq!(*log.borrow(), vec!["Base:base", "Derived:base", "Derived:own"]);
}

#[test]
fn test_template_declarations_do_not_run_decorators() {
    let mut ast = Ast::new();
    ast.add_file(
        "main.adl",
        vec![
            model("Box")
                .template(&["T"])
                .decorate(dec("tag").arg(string_lit("box")))
                .prop("value", ty("T"))
                .into(),
            model("Holder").prop("b", generic("Box", vec![ty("string")])).into(),
        ],
    );
    let (registry, log) = tag_registry();
    let mut checker = checker_with(&ast, &["tag"], registry, false);
    checker.check_program().unwrap();
    assert_eq!(*log.borrow(), vec!["Box<string>:box"]);
}

#[test]
fn test_instances_with_open_arguments_do_not_run_decorators() {
    let mut ast = Ast::new();
    ast.add_file(
        "main.adl",
        vec![
            model("Box")
                .template(&["T"])
                .decorate(dec("tag").arg(string_lit("box")))
                .prop("value", ty("T"))
                .into(),
            model("Wrapper")
                .template(&["U"])
                .prop("b", generic("Box", vec![ty("U")]))
                .into(),
            model("Holder").prop("w", generic("Wrapper", vec![ty("string")])).into(),
        ],
    );
    let (registry, log) = tag_registry();
    let mut checker = checker_with(&ast, &["tag"], registry, false);
    checker.check_program().unwrap();
    assert!(checker.diagnostics().is_empty());
    assert_eq!(*log.borrow(), vec!["Box<string>:box"]);
}

#[test]
fn test_mixed_in_operations_with_open_arguments_do_not_run_decorators() {
    let mut ast = Ast::new();
    ast.add_file(
        "main.adl",
        vec![
            interface("Crud")
                .template(&["T"])
                .op(op("read").returns(ty("T")).decorate(dec("tag").arg(string_lit("r"))))
                .into(),
            interface("Wrapped")
                .template(&["U"])
                .mixes(generic("Crud", vec![ty("U")]))
                .into(),
        ],
    );
    let (registry, log) = tag_registry();
    let mut checker = checker_with(&ast, &["tag"], registry, false);
    checker.check_program().unwrap();
    assert!(checker.diagnostics().is_empty());
    assert!(log.borrow().is_empty());

    let wrapped = declaration(&mut checker, &ast, "Wrapped");
    assert!(checker.types().as_interface(wrapped).unwrap().operations.contains_key("read"));
}

#[test]
fn test_reopened_namespace_runs_each_declarations_decorators() {
    let mut ast = Ast::new();
    ast.add_file(
        "a.adl",
        vec![namespace("Foo").decorate(dec("tag").arg(string_lit("a"))).into()],
    );
    ast.add_file(
        "b.adl",
        vec![namespace("Foo").decorate(dec("tag").arg(string_lit("b"))).into()],
    );
    let (registry, log) = tag_registry();
    let mut checker = checker_with(&ast, &["tag"], registry, false);
    checker.check_program().unwrap();
    assert_eq!(*log.borrow(), vec!["Foo:a", "Foo:b"]);

    let foo = checker.get_type_for_node(ast.find_declaration("Foo").unwrap());
    assert_eq!(checker.types().as_namespace(foo).unwrap().decorators.len(), 2);
}

#[test]
fn test_namespaced_decorator_resolution() {
    let mut ast = Ast::new();
    ast.add_file(
        "main.adl",
        vec![
            namespace("Lib")
                .statement(model("Inner").decorate(dec("mark").arg(string_lit("inner"))))
                .into(),
            model("Outer").decorate(dec("Lib.mark").arg(string_lit("outer"))).into(),
        ],
    );
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let mut registry = DecoratorRegistry::new();
    registry.register_fn("Lib.mark", move |ctx, target, args| {
        let label = args.first().and_then(|a| a.as_str()).unwrap_or_default();
        sink.borrow_mut().push(format!("{}:{}", ctx.type_name(target), label));
        Ok(())
    });
    let mut checker = checker_with(&ast, &["Lib.mark"], registry, false);
    checker.check_program().unwrap();
    assert!(checker.diagnostics().is_empty());
    assert_eq!(*log.borrow(), vec!["Lib.Inner:inner", "Outer:outer"]);
}

#[test]
fn test_decorator_state_and_type_arguments() {
    let mut ast = Ast::new();
    ast.add_file(
        "main.adl",
        vec![
            model("Pet").into(),
            model("Owner").decorate(dec("link").arg(ty("Pet")).arg(number(3.0))).into(),
        ],
    );
    let mut registry = DecoratorRegistry::new();
    registry.register_fn("link", |ctx, target, args| {
        if args.len() != 2 {
            return Err(DecoratorError::ArgumentCount {
                expected: 2,
                actual: args.len(),
            });
        }
        ctx.state.set("link", target, args[0].clone());
        ctx.state.set("weight", target, args[1].clone());
        Ok(())
    });
    let mut checker = checker_with(&ast, &["link"], registry, false);
    checker.check_program().unwrap();

    let pet = declaration(&mut checker, &ast, "Pet");
    let owner = declaration(&mut checker, &ast, "Owner");
    assert_eq!(checker.state().get("link", owner), Some(&DecoratorArgument::Type(pet)));
    assert_eq!(checker.state().get("weight", owner), Some(&DecoratorArgument::Number(3.0)));
    assert!(checker.state().get("link", pet).is_none());
}

#[test]
fn test_decorator_failure_is_fatal_in_batch_mode() {
    let mut ast = Ast::new();
    ast.add_file(
        "main.adl",
        vec![
            model("A").decorate(dec("fail")).into(),
            model("B").decorate(dec("tag").arg(string_lit("b"))).into(),
        ],
    );
    let (mut registry, log) = tag_registry();
    registry.register_fn("fail", |_ctx, _target, _args| {
        Err(DecoratorError::Message("boom".to_string()))
    });
    let mut checker = checker_with(&ast, &["tag", "fail"], registry, false);

    let error = checker.check_program().unwrap_err();
    assert_eq!(
        error,
        CheckerError::Decorator {
            name: "fail".to_string(),
            source: DecoratorError::Message("boom".to_string()),
        }
    );
    assert_eq!(error.to_string(), "decorator @fail failed: boom");
    // Nothing runs after the failure.
    assert!(log.borrow().is_empty());
    assert!(checker.diagnostics().is_empty());
}

#[test]
fn test_decorator_failure_is_reported_in_design_time_build() {
    let mut ast = Ast::new();
    ast.add_file(
        "main.adl",
        vec![
            model("A").decorate(dec("fail")).into(),
            model("B").decorate(dec("tag").arg(string_lit("b"))).into(),
        ],
    );
    let (mut registry, log) = tag_registry();
    registry.register_fn("fail", |_ctx, _target, _args| {
        Err(DecoratorError::Message("boom".to_string()))
    });
    let mut checker = checker_with(&ast, &["tag", "fail"], registry, true);

    checker.check_program().unwrap();
    let diagnostics = checker.diagnostics().diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, 5001);
    assert_eq!(diagnostics[0].message_text, "Decorator @fail failed: boom");
    assert_eq!(*log.borrow(), vec!["B:b"]);
}

#[test]
fn test_decorator_without_implementation_warns() {
    let mut ast = Ast::new();
    ast.add_file("main.adl", vec![model("A").decorate(dec("ghost")).into()]);
    let mut checker = checker_with(&ast, &["ghost"], DecoratorRegistry::new(), false);
    checker.check_program().unwrap();
    assert_eq!(checker.diagnostics().count_code(5002), 1);
    assert!(!checker.diagnostics().has_errors());
}

#[test]
fn test_unknown_decorator_is_unknown_identifier() {
    let mut ast = Ast::new();
    ast.add_file("main.adl", vec![model("A").decorate(dec("missing")).into()]);
    let checker = check(&ast);
    assert_eq!(checker.diagnostics().count_code(1001), 1);
}

#[test]
fn test_decorator_cannot_be_used_as_type() {
    let mut ast = Ast::new();
    ast.add_file("main.adl", vec![model("A").prop("x", ty("@tag")).into()]);
    let mut checker = checker_with(&ast, &["tag"], DecoratorRegistry::new(), false);
    checker.check_program().unwrap();
    assert_eq!(checker.diagnostics().count_code(1005), 1);
    let a = declaration(&mut checker, &ast, "A");
    assert_eq!(property_type(&checker, a, "x"), checker.error_type());
}

// ============================================================================
// Type names
// ============================================================================

#[test]
fn test_type_names() {
    let mut ast = Ast::new();
    ast.add_file(
        "main.adl",
        vec![
            namespace("Store")
                .statement(model("Box").template(&["T"]).prop("value", ty("T")))
                .statement(enum_decl("Kind").member(member("cat")))
                .statement(interface("Pets").op(op("list")))
                .into(),
            model("Uses")
                .prop("boxed", generic("Store.Box", vec![ty("string")]))
                .prop("list", array(ty("int32")))
                .prop("pair", tuple(vec![string_lit("a"), boolean(false)]))
                .prop("either", union(vec![ty("string"), ty("Store.Kind")]))
                .into(),
        ],
    );
    let mut checker = check(&ast);
    let uses = declaration(&mut checker, &ast, "Uses");
    let name = |checker: &Checker<'_>, p: &str| checker.get_type_name(property_type(checker, uses, p));
    assert_eq!(name(&checker, "boxed"), "Store.Box<string>");
    assert_eq!(name(&checker, "list"), "int32[]");
    assert_eq!(name(&checker, "pair"), "[\"a\", false]");
    assert_eq!(name(&checker, "either"), "string | Store.Kind");

    let pets = declaration(&mut checker, &ast, "Pets");
    assert_eq!(checker.get_type_name(pets), "Store.Pets");
    let list = checker.types().as_interface(pets).unwrap().operations["list"];
    assert_eq!(checker.get_type_name(list), "Store.Pets.list");
    let kind = declaration(&mut checker, &ast, "Kind");
    assert_eq!(checker.get_type_name(kind), "Store.Kind");
    assert!(matches!(checker.types().kind(kind), TypeKind::Enum(_)));
}
