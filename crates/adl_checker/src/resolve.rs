//! Name resolution, type references and template instantiation.

use crate::checker::Checker;
use crate::types::TypeKind;
use adl_ast::node::*;
use adl_ast::types::*;
use adl_core::InternedString;
use adl_diagnostics::messages;
use tracing::trace;

impl<'a> Checker<'a> {
    // ========================================================================
    // Symbol resolution
    // ========================================================================

    /// Resolve an identifier or member expression to a symbol. Decorator
    /// lookups search the separate `@name` key space. Failures are reported
    /// and yield `None`.
    pub(crate) fn resolve_reference(&mut self, node: NodeId, decorator: bool) -> Option<SymbolId> {
        let ast = self.ast;
        match ast.kind(node) {
            NodeKind::Identifier(identifier) => self.resolve_identifier(node, &identifier.name, decorator),
            NodeKind::MemberExpression(member) => {
                let base = self.resolve_reference(member.base, false)?;
                let (is_decorator, is_namespace, declaration) = {
                    let symbol = self.binder.symbol(base);
                    (symbol.is_decorator(), symbol.is_namespace(), symbol.node())
                };
                if is_decorator {
                    self.report(
                        &messages::CANNOT_RESOLVE_0_IN_DECORATOR,
                        &[&member.member.text],
                        Some(node),
                    );
                    return None;
                }
                if !is_namespace {
                    let kind = declaration
                        .map(|d| ast.syntax_kind(d).to_string())
                        .unwrap_or_default();
                    self.report(
                        &messages::CANNOT_RESOLVE_0_IN_NON_NAMESPACE_NODE_1,
                        &[&member.member.text, &kind],
                        Some(node),
                    );
                    return None;
                }

                let found = self
                    .lookup_key(&member.member, decorator)
                    .and_then(|key| self.exports_lookup(base, key));
                if found.is_none() {
                    self.report(
                        &messages::NAMESPACE_DOES_NOT_HAVE_MEMBER_0,
                        &[&member.member.text],
                        Some(node),
                    );
                }
                found
            }
            NodeKind::TypeReference(reference) => self.resolve_reference(reference.target, decorator),
            _ => None,
        }
    }

    fn resolve_identifier(&mut self, node: NodeId, name: &Name, decorator: bool) -> Option<SymbolId> {
        let found = self
            .lookup_key(name, decorator)
            .and_then(|key| self.resolve_in_scope(node, key));
        if found.is_none() {
            self.report(&messages::UNKNOWN_IDENTIFIER_0, &[&name.text], Some(node));
        }
        found
    }

    /// The table key for a name. A decorator key that was never interned
    /// cannot be bound anywhere.
    fn lookup_key(&self, name: &Name, decorator: bool) -> Option<InternedString> {
        if decorator {
            self.ast.interner().get(&format!("@{}", name.text))
        } else {
            Some(name.key)
        }
    }

    /// Walk outward from `node` to the file, then search the file's
    /// implicitly open namespaces, the global namespace and the file's
    /// `using` imports. First match wins.
    fn resolve_in_scope(&self, node: NodeId, key: InternedString) -> Option<SymbolId> {
        let ast = self.ast;
        let mut file = None;
        for scope in ast.ancestors(node) {
            match ast.kind(scope) {
                NodeKind::SourceFile(_) => {
                    file = Some(scope);
                    break;
                }
                NodeKind::NamespaceStatement(_) => {
                    let exported = self
                        .binder
                        .symbol_of_node(scope)
                        .and_then(|s| self.exports_lookup(s, key));
                    if exported.is_some() {
                        return exported;
                    }
                    if let Some(found) = self.binder.locals(scope).and_then(|l| l.get(&key)) {
                        return Some(found);
                    }
                }
                kind if !kind.template_parameters().is_empty() => {
                    if let Some(found) = self.binder.locals(scope).and_then(|l| l.get(&key)) {
                        return Some(found);
                    }
                }
                _ => {}
            }
        }

        if let Some(file) = file {
            for &namespace in self.binder.in_scope_namespaces(file) {
                let exported = self
                    .binder
                    .symbol_of_node(namespace)
                    .and_then(|s| self.exports_lookup(s, key));
                if exported.is_some() {
                    return exported;
                }
            }
        }
        if let Some(found) = self.exports_lookup(self.binder.global_namespace_symbol(), key) {
            return Some(found);
        }
        file.and_then(|f| self.binder.locals(f)).and_then(|l| l.get(&key))
    }

    fn exports_lookup(&self, namespace: SymbolId, key: InternedString) -> Option<SymbolId> {
        let merged = self.get_merged_symbol(namespace);
        self.binder.symbol(merged).exports.as_ref()?.get(&key)
    }

    // ========================================================================
    // Type references
    // ========================================================================

    pub(crate) fn check_type_reference(&mut self, node: NodeId, reference: &TypeReference) -> TypeId {
        let Some(symbol) = self.resolve_reference(reference.target, false) else {
            return self.types.error_type;
        };
        let (is_decorator, flags, declaration) = {
            let symbol = self.binder.symbol(symbol);
            (symbol.is_decorator(), symbol.flags, symbol.node())
        };
        if is_decorator {
            self.report(&messages::CANNOT_USE_DECORATOR_AS_TYPE, &[], Some(node));
            return self.types.error_type;
        }
        let Some(declaration) = declaration else {
            return self.internal_error(format!("type symbol {:?} has no declaration", symbol));
        };

        let mut arguments: Vec<TypeId> = reference
            .arguments
            .iter()
            .map(|&argument| self.check_node(argument))
            .collect();

        let ast = self.ast;
        let parameter_count = ast.kind(declaration).template_parameters().len();
        if flags.intersects(SymbolFlags::TEMPLATED) && parameter_count > 0 {
            self.check_declared_type(symbol, declaration);
            if arguments.len() < parameter_count {
                self.report(&messages::TOO_FEW_TEMPLATE_ARGUMENTS, &[], Some(node));
                arguments.resize(parameter_count, self.types.error_type);
            } else if arguments.len() > parameter_count {
                self.report(&messages::TOO_MANY_TEMPLATE_ARGUMENTS, &[], Some(node));
                arguments.truncate(parameter_count);
            }
            return self.instantiate_template(symbol, declaration, arguments);
        }

        let ty = if flags.contains(SymbolFlags::TEMPLATE_PARAMETER) {
            self.check_template_parameter(declaration)
        } else if flags.contains(SymbolFlags::NAMESPACE) {
            match self.namespace_type_of_symbol(symbol) {
                Some(ty) => ty,
                None => self.check_node(declaration),
            }
        } else {
            self.check_declared_type(symbol, declaration)
        };
        if !reference.arguments.is_empty() {
            self.report(&messages::TEMPLATE_ARGUMENTS_ON_NON_TEMPLATE, &[], Some(node));
        }
        ty
    }

    /// The declared type of a symbol, checking its declaration outside any
    /// instantiation context if needed.
    pub(crate) fn check_declared_type(&mut self, symbol: SymbolId, declaration: NodeId) -> TypeId {
        if let Some(ty) = self.declared_type(symbol) {
            return ty;
        }
        let saved_template = self.instantiating_template.take();
        let saved_arguments = std::mem::take(&mut self.template_arguments);
        let ty = self.check_node(declaration);
        self.instantiating_template = saved_template;
        self.template_arguments = saved_arguments;
        ty
    }

    /// Instantiate a template declaration, memoized per argument list.
    pub(crate) fn instantiate_template(
        &mut self,
        symbol: SymbolId,
        declaration: NodeId,
        arguments: Vec<TypeId>,
    ) -> TypeId {
        if let Some(ty) = self.links.get(&symbol).and_then(|l| l.instantiations.get(&arguments)) {
            return ty;
        }
        if let Some(&ty) = self.pending_types.get(&(declaration, arguments.clone())) {
            return ty;
        }

        let saved_template = self.instantiating_template.replace(declaration);
        let saved_arguments = std::mem::replace(&mut self.template_arguments, arguments.clone());
        let ty = self.check_node(declaration);
        self.instantiating_template = saved_template;
        self.template_arguments = saved_arguments;

        trace!(declaration = ?declaration, arguments = ?arguments, ty = ?ty, "instantiated template");
        self.links_mut(symbol).instantiations.set(&arguments, ty);
        ty
    }

    /// A template parameter checks to its argument while its declaration is
    /// being instantiated, and to a shared placeholder type otherwise.
    pub(crate) fn check_template_parameter(&mut self, parameter: NodeId) -> TypeId {
        let ast = self.ast;
        if let Some(declaration) = ast.parent(parameter).filter(|&d| self.is_instantiating(d)) {
            let index = ast
                .kind(declaration)
                .template_parameters()
                .iter()
                .position(|&p| p == parameter);
            if let Some(&argument) = index.and_then(|i| self.template_arguments.get(i)) {
                return argument;
            }
        }
        if let Some(&ty) = self.template_parameter_types.get(&parameter) {
            return ty;
        }
        let ty = self.types.add_type(Some(parameter), TypeKind::TemplateParameter);
        self.template_parameter_types.insert(parameter, ty);
        ty
    }
}

#[cfg(test)]
mod tests {
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
    fn test_member_expression_resolves_through_namespace() {
        let mut ast = Ast::new();
        ast.add_file(
            "main.adl",
            vec![
                namespace("Lib.Models").statement(model("Pet")).into(),
                model("Owner").prop("pet", ty("Lib.Models.Pet")).into(),
            ],
        );
        let mut checker = check(&ast);
        assert!(checker.diagnostics().is_empty());
        let owner = checker.get_type_for_node(ast.find_declaration("Owner").unwrap());
        let pet = checker.get_type_for_node(ast.find_declaration("Pet").unwrap());
        let model = checker.types().as_model(owner).unwrap();
        assert_eq!(checker.types().as_property(model.properties["pet"]).unwrap().ty, pet);
    }

    #[test]
    fn test_member_of_non_namespace_is_reported() {
        let mut ast = Ast::new();
        ast.add_file(
            "main.adl",
            vec![
                model("Pet").into(),
                model("Owner").prop("x", ty("Pet.name")).into(),
            ],
        );
        let checker = check(&ast);
        let diagnostics = checker.diagnostics().diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, 1004);
        assert_eq!(
            diagnostics[0].message_text,
            "Cannot resolve 'name' in non-namespace node ModelStatement"
        );
    }

    #[test]
    fn test_missing_namespace_member_is_reported() {
        let mut ast = Ast::new();
        ast.add_file(
            "main.adl",
            vec![
                namespace("Lib").into(),
                model("Owner").prop("x", ty("Lib.Missing")).into(),
            ],
        );
        let checker = check(&ast);
        assert_eq!(checker.diagnostics().count_code(1002), 1);
        assert_eq!(checker.diagnostics().len(), 1);
    }

    #[test]
    fn test_template_parameter_outside_instantiation_is_placeholder() {
        let mut ast = Ast::new();
        ast.add_file(
            "main.adl",
            vec![model("Box").template(&["T"]).prop("value", ty("T")).into()],
        );
        let mut checker = check(&ast);
        let declared = checker.get_type_for_node(ast.find_declaration("Box").unwrap());
        let model = checker.types().as_model(declared).unwrap();
        let value = checker.types().as_property(model.properties["value"]).unwrap().ty;
        assert_eq!(checker.get_type_name(value), "T");
        let parameter = checker.get_type_for_node(ast.find_declaration("T").unwrap());
        assert_eq!(parameter, value);
    }
}
