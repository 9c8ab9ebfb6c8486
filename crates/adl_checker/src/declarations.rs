//! Namespaces, operations, interfaces, enums and aliases.

use crate::checker::Checker;
use crate::types::{EnumMemberType, EnumMemberValue, EnumType, InterfaceType, OperationType, TypeKind};
use adl_ast::node::*;
use adl_ast::types::*;
use adl_diagnostics::messages;
use indexmap::IndexMap;
use rustc_hash::FxHashSet;

impl<'a> Checker<'a> {
    // ========================================================================
    // Namespaces
    // ========================================================================

    /// Every declaration of a namespace shares one type. Each declaration's
    /// own decorators and statements are checked the first time that
    /// declaration is visited.
    pub(crate) fn check_namespace(&mut self, node: NodeId, namespace: &NamespaceStatement) -> TypeId {
        let Some(ty) = self
            .binder
            .symbol_of_node(node)
            .and_then(|s| self.namespace_type_of_symbol(s))
        else {
            return self.internal_error(format!("namespace {} has no type", namespace.name.text));
        };
        if self.checked_namespace_nodes.insert(node) {
            let decorators = self.check_decorators(node);
            if let Some(ns) = self.types.namespace_mut(ty) {
                ns.decorators.extend(decorators.iter().cloned());
            }
            self.run_decorators(ty, &decorators);
            for &statement in &namespace.statements {
                self.check_node(statement);
            }
        }
        ty
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// An interface member checked on its own resolves through its interface.
    pub(crate) fn check_operation_node(&mut self, node: NodeId, operation: &OperationStatement) -> TypeId {
        let ast = self.ast;
        let Some(interface_node) = ast
            .parent(node)
            .filter(|&p| matches!(ast.kind(p), NodeKind::InterfaceStatement(_)))
        else {
            return self.check_operation(node, operation, None);
        };
        let interface = self.check_node(interface_node);
        let existing = self.types.as_interface(interface).and_then(|i| {
            i.operations
                .get(&operation.name.text)
                .copied()
                .filter(|&o| self.types.get(o).node == Some(node))
        });
        match existing {
            Some(existing) => existing,
            None => self.check_operation(node, operation, Some(interface)),
        }
    }

    pub(crate) fn check_operation(
        &mut self,
        node: NodeId,
        operation: &OperationStatement,
        interface: Option<TypeId>,
    ) -> TypeId {
        let symbol = self.binder.symbol_of_node(node);
        if interface.is_none() {
            if let Some(ty) = symbol.and_then(|s| self.declared_type(s)) {
                return ty;
            }
        }

        let namespace = self.get_parent_namespace_type(node);
        let parameters = self.check_node(operation.parameters);
        let return_type = self.check_node(operation.return_type);
        let decorators = self.check_decorators(node);
        let ty = self.types.add_type(
            Some(node),
            TypeKind::Operation(OperationType {
                name: operation.name.text.clone(),
                namespace,
                interface,
                parameters,
                return_type,
                decorators,
            }),
        );

        // Members of an uninstantiated template interface stay unfinished.
        if self.should_finish(node) {
            self.finish_type(ty);
            if interface.is_none() {
                if let Some(symbol) = symbol {
                    self.links_mut(symbol).declared_type = Some(ty);
                }
                if let Some(namespace) = namespace.and_then(|n| self.types.namespace_mut(n)) {
                    namespace.operations.entry(operation.name.text.clone()).or_insert(ty);
                }
            }
        }
        ty
    }

    /// Copy an operation into another interface.
    fn clone_operation(&mut self, source: TypeId, interface: TypeId, finish: bool) -> TypeId {
        let Some(operation) = self.types.as_operation(source).cloned() else {
            return source;
        };
        let node = self.types.get(source).node;
        let copy = self.types.add_type(
            node,
            TypeKind::Operation(OperationType {
                interface: Some(interface),
                ..operation
            }),
        );
        if finish {
            self.finish_type(copy);
        }
        copy
    }

    // ========================================================================
    // Interfaces
    // ========================================================================

    pub(crate) fn check_interface(&mut self, node: NodeId, interface: &InterfaceStatement) -> TypeId {
        let symbol = self.binder.symbol_of_node(node);
        let instantiating = self.is_instantiating(node);
        if !instantiating {
            if let Some(ty) = symbol.and_then(|s| self.declared_type(s)) {
                return ty;
            }
        }
        let key = (node, self.template_key(node));
        if let Some(&ty) = self.pending_types.get(&key) {
            return ty;
        }

        let namespace = self.get_parent_namespace_type(node);
        let ty = self.types.add_type(
            Some(node),
            TypeKind::Interface(InterfaceType {
                name: interface.name.text.clone(),
                namespace,
                template_arguments: if instantiating { key.1.clone() } else { Vec::new() },
                template_node: (!interface.template_parameters.is_empty()).then_some(node),
                ..Default::default()
            }),
        );
        self.pending_types.insert(key.clone(), ty);
        let finish = self.should_finish(node);

        let mut operations: IndexMap<String, TypeId> = IndexMap::new();
        for &mixin in &interface.mixes {
            let mixin_type = self.check_node(mixin);
            let Some(mixed) = self
                .types
                .as_interface(mixin_type)
                .map(|i| i.operations.values().copied().collect::<Vec<_>>())
            else {
                if !self.types.is_error(mixin_type) {
                    self.report(&messages::INTERFACE_MIXIN_MUST_BE_AN_INTERFACE, &[], Some(mixin));
                }
                continue;
            };
            for operation in mixed {
                let copy = self.clone_operation(operation, ty, finish);
                let Some(name) = self.types.as_operation(copy).map(|o| o.name.clone()) else {
                    continue;
                };
                if operations.contains_key(&name) {
                    self.report(&messages::INTERFACE_MIXINS_HAVE_DUPLICATE_MEMBER_0, &[&name], Some(mixin));
                }
                operations.insert(name, copy);
            }
        }

        let decorators = self.check_decorators(node);
        if let Some(i) = self.types.interface_mut(ty) {
            i.decorators = decorators;
        }

        let ast = self.ast;
        let mut own = FxHashSet::default();
        for &member in &interface.operations {
            let NodeKind::OperationStatement(operation) = ast.kind(member) else {
                continue;
            };
            if !own.insert(operation.name.text.as_str()) {
                self.report(
                    &messages::INTERFACE_ALREADY_HAS_MEMBER_0,
                    &[&operation.name.text],
                    Some(member),
                );
                continue;
            }
            // Own members override mixed-in ones.
            let op = self.check_operation(member, operation, Some(ty));
            operations.insert(operation.name.text.clone(), op);
        }
        if let Some(i) = self.types.interface_mut(ty) {
            i.operations = operations;
        }

        if finish {
            self.finish_type(ty);
        }
        if !instantiating {
            if let Some(symbol) = symbol {
                let links = self.links_mut(symbol);
                links.declared_type = Some(ty);
                if !interface.template_parameters.is_empty() {
                    links.instantiations.set(&key.1, ty);
                }
            }
            if let Some(namespace) = namespace.and_then(|n| self.types.namespace_mut(n)) {
                namespace.interfaces.entry(interface.name.text.clone()).or_insert(ty);
            }
        }
        self.pending_types.remove(&key);
        ty
    }

    // ========================================================================
    // Enums
    // ========================================================================

    pub(crate) fn check_enum(&mut self, node: NodeId, declaration: &EnumStatement) -> TypeId {
        let symbol = self.binder.symbol_of_node(node);
        if let Some(ty) = symbol.and_then(|s| self.declared_type(s)) {
            return ty;
        }

        let namespace = self.get_parent_namespace_type(node);
        let decorators = self.check_decorators(node);
        let ty = self.types.add_type(
            Some(node),
            TypeKind::Enum(EnumType {
                name: declaration.name.text.clone(),
                namespace,
                members: Vec::new(),
                decorators,
            }),
        );
        if let Some(symbol) = symbol {
            self.links_mut(symbol).declared_type = Some(ty);
        }

        let ast = self.ast;
        let mut names = FxHashSet::default();
        let mut members = Vec::with_capacity(declaration.members.len());
        for &member in &declaration.members {
            let NodeKind::EnumMember(m) = ast.kind(member) else {
                continue;
            };
            if !names.insert(m.name.text.as_str()) {
                self.report(&messages::ENUM_ALREADY_HAS_MEMBER_0, &[&m.name.text], Some(member));
                continue;
            }
            let value = m.value.map(|v| self.check_node(v)).and_then(|v| match self.types.kind(v) {
                TypeKind::String(s) => Some(EnumMemberValue::String(s.clone())),
                TypeKind::Number(n) => Some(EnumMemberValue::Number(*n)),
                _ => None,
            });
            let decorators = self.check_decorators(member);
            let member_type = self.types.add_type(
                Some(member),
                TypeKind::EnumMember(EnumMemberType {
                    name: m.name.text.clone(),
                    enum_type: ty,
                    value,
                    decorators,
                }),
            );
            self.finish_type(member_type);
            members.push(member_type);
        }
        if let Some(e) = self.types.enum_mut(ty) {
            e.members = members;
        }

        self.finish_type(ty);
        if let Some(namespace) = namespace.and_then(|n| self.types.namespace_mut(n)) {
            namespace.enums.entry(declaration.name.text.clone()).or_insert(ty);
        }
        ty
    }

    pub(crate) fn check_enum_member_node(&mut self, node: NodeId) -> TypeId {
        let ast = self.ast;
        let Some(parent) = ast.parent(node) else {
            return self.types.error_type;
        };
        let enum_type = self.check_node(parent);
        self.types
            .as_enum(enum_type)
            .and_then(|e| e.members.iter().copied().find(|&m| self.types.get(m).node == Some(node)))
            .unwrap_or(self.types.error_type)
    }

    // ========================================================================
    // Aliases
    // ========================================================================

    pub(crate) fn check_alias(&mut self, node: NodeId, alias: &AliasStatement) -> TypeId {
        let symbol = self.binder.symbol_of_node(node);
        let instantiating = self.is_instantiating(node);
        if !instantiating {
            if let Some(ty) = symbol.and_then(|s| self.declared_type(s)) {
                return ty;
            }
        }
        let key = (node, self.template_key(node));
        if !self.checking_aliases.insert(key.clone()) {
            self.report(
                &messages::ALIAS_RECURSIVELY_REFERENCES_ITSELF_0,
                &[&alias.name.text],
                Some(node),
            );
            return self.types.error_type;
        }
        let ty = self.check_node(alias.value);
        self.checking_aliases.remove(&key);

        if !instantiating {
            if let Some(symbol) = symbol {
                let links = self.links_mut(symbol);
                // An alias reached again through a cycle already settled it.
                if links.declared_type.is_none() {
                    links.declared_type = Some(ty);
                }
                if !alias.template_parameters.is_empty() {
                    links.instantiations.set(&key.1, ty);
                }
            }
        }
        ty
    }
}

#[cfg(test)]
mod tests {
    use crate::types::{EnumMemberValue, TypeKind};
    use crate::Checker;
    use adl_ast::syntax::*;
    use adl_ast::Ast;
    use adl_binder::Binder;

    fn check(ast: &Ast) -> Checker<'_> {
        let mut binder = Binder::new(ast);
        binder.bind_program();
        let mut checker = Checker::new(binder);
        checker.check_program().unwrap();
        checker
    }

    #[test]
    fn test_operation_registers_in_namespace() {
        let mut ast = Ast::new();
        ast.add_file(
            "main.adl",
            vec![namespace("Api")
                .statement(op("read").param("id", ty("string")).returns(ty("int32")))
                .into()],
        );
        let mut checker = check(&ast);
        let api = checker.get_type_for_node(ast.find_namespace("Api").unwrap());
        let read = checker.types().as_namespace(api).unwrap().operations["read"];
        assert_eq!(checker.get_type_for_node(ast.find_declaration("read").unwrap()), read);

        let operation = checker.types().as_operation(read).unwrap();
        let parameters = checker.types().as_model(operation.parameters).unwrap();
        assert_eq!(parameters.properties.keys().collect::<Vec<_>>(), vec!["id"]);
        assert_eq!(checker.get_type_name(operation.return_type), "int32");
        assert_eq!(checker.get_type_name(read), "Api.read");
    }

    #[test]
    fn test_interface_mixins_and_overrides() {
        let mut ast = Ast::new();
        ast.add_file(
            "main.adl",
            vec![
                interface("Reads").op(op("get")).op(op("list")).into(),
                interface("Lists").op(op("list")).into(),
                interface("Store")
                    .mixes(ty("Reads"))
                    .mixes(ty("Lists"))
                    .op(op("get").returns(ty("string")))
                    .into(),
            ],
        );
        let mut checker = check(&ast);
        assert_eq!(checker.diagnostics().count_code(4003), 1);
        assert_eq!(checker.diagnostics().len(), 1);

        let store = checker.get_type_for_node(ast.find_declaration("Store").unwrap());
        let lists = checker.get_type_for_node(ast.find_declaration("Lists").unwrap());
        let interface = checker.types().as_interface(store).unwrap();
        assert_eq!(interface.operations.keys().collect::<Vec<_>>(), vec!["get", "list"]);

        let get = checker.types().as_operation(interface.operations["get"]).unwrap();
        assert_eq!(checker.get_type_name(get.return_type), "string");
        assert_eq!(get.interface, Some(store));

        // Last mixin wins on collision.
        let list = checker.types().as_operation(interface.operations["list"]).unwrap();
        assert_eq!(list.interface, Some(store));
        let list_source = checker.types().get(interface.operations["list"]).node;
        let lists_op = checker.types().as_interface(lists).unwrap().operations["list"];
        assert_eq!(list_source, checker.types().get(lists_op).node);
        assert_eq!(checker.get_type_name(interface.operations["list"]), "Store.list");
    }

    #[test]
    fn test_interface_member_errors() {
        let mut ast = Ast::new();
        ast.add_file(
            "main.adl",
            vec![
                model("NotAnInterface").into(),
                interface("Bad")
                    .mixes(ty("NotAnInterface"))
                    .op(op("a"))
                    .op(op("a"))
                    .into(),
            ],
        );
        let mut checker = check(&ast);
        assert_eq!(checker.diagnostics().count_code(4002), 1);
        assert_eq!(checker.diagnostics().count_code(4004), 1);
        let bad = checker.get_type_for_node(ast.find_declaration("Bad").unwrap());
        assert_eq!(checker.types().as_interface(bad).unwrap().operations.len(), 1);
    }

    #[test]
    fn test_enum_members_and_duplicates() {
        let mut ast = Ast::new();
        ast.add_file(
            "main.adl",
            vec![enum_decl("Color")
                .member(member("red").value(string_lit("r")))
                .member(member("green").value(number(2.0)))
                .member(member("red"))
                .member(member("blue"))
                .into()],
        );
        let mut checker = check(&ast);
        assert_eq!(checker.diagnostics().count_code(4001), 1);

        let color = checker.get_type_for_node(ast.find_declaration("Color").unwrap());
        let members = &checker.types().as_enum(color).unwrap().members;
        assert_eq!(members.len(), 3);
        let values: Vec<_> = members
            .iter()
            .map(|&m| match checker.types().kind(m) {
                TypeKind::EnumMember(member) => member.value.clone(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(
            values,
            vec![
                Some(EnumMemberValue::String("r".into())),
                Some(EnumMemberValue::Number(2.0)),
                None
            ]
        );
        assert_eq!(checker.get_type_name(members[2]), "Color.blue");
    }

    #[test]
    fn test_recursive_alias_is_reported() {
        let mut ast = Ast::new();
        ast.add_file(
            "main.adl",
            vec![alias("A", ty("B")).into(), alias("B", ty("A")).into()],
        );
        let mut checker = check(&ast);
        assert_eq!(checker.diagnostics().count_code(2004), 1);
        let a = checker.get_type_for_node(ast.find_declaration("A").unwrap());
        assert_eq!(a, checker.error_type());
    }

    #[test]
    fn test_template_interface_operations_stay_unregistered() {
        let mut ast = Ast::new();
        ast.add_file(
            "main.adl",
            vec![
                interface("Crud").template(&["T"]).op(op("read").returns(ty("T"))).into(),
                interface("Pets").mixes(generic("Crud", vec![ty("string")])).into(),
            ],
        );
        let mut checker = check(&ast);
        assert!(checker.diagnostics().is_empty());
        let global = checker.global_namespace_type();
        assert!(checker.types().as_namespace(global).unwrap().operations.is_empty());

        let pets = checker.get_type_for_node(ast.find_declaration("Pets").unwrap());
        let read = checker.types().as_interface(pets).unwrap().operations["read"];
        let read = checker.types().as_operation(read).unwrap();
        assert_eq!(checker.get_type_name(read.return_type), "string");
    }
}
