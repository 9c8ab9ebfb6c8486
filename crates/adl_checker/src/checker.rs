//! The type checker.
//!
//! Converts syntax nodes into types on demand. Every construct is checked at
//! most once per instantiation context: declared types and namespace types are
//! cached in symbol links, template instantiations in per-symbol instantiation
//! maps. The per-construct checks live in sibling modules as further `impl`
//! blocks on [`Checker`].

use crate::decorators::{DecoratorRegistry, StateMap};
use crate::error::CheckerError;
use crate::instantiation::SymbolLinks;
use crate::names::type_name;
use crate::types::{ArrayType, NamespaceType, TupleType, TypeKind, TypeTable, UnionType};
use adl_ast::node::*;
use adl_ast::types::*;
use adl_ast::visitor::{walk_node, Visitor};
use adl_binder::Binder;
use adl_diagnostics::{Diagnostic, DiagnosticCollection, DiagnosticMessage};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, error};

/// Literal types, interned by value.
#[derive(Debug, Default)]
pub(crate) struct LiteralTypes {
    strings: FxHashMap<String, TypeId>,
    /// Keyed by the bit pattern of the value.
    numbers: FxHashMap<u64, TypeId>,
    booleans: [Option<TypeId>; 2],
}

/// The type checker resolves references, builds types and reports errors.
pub struct Checker<'a> {
    pub(crate) ast: &'a Ast,
    pub(crate) binder: Binder<'a>,
    pub(crate) types: TypeTable,
    pub(crate) links: FxHashMap<SymbolId, SymbolLinks>,
    /// Per-file namespace symbol → canonical symbol.
    pub(crate) merged_symbols: FxHashMap<SymbolId, SymbolId>,
    pub(crate) global_namespace_type: TypeId,

    /// The template declaration being instantiated and its arguments. Saved
    /// and restored around every re-entrant check.
    pub(crate) instantiating_template: Option<NodeId>,
    pub(crate) template_arguments: Vec<TypeId>,
    /// Models and interfaces under construction, by declaration and
    /// argument list. Self references resolve to these stubs.
    pub(crate) pending_types: FxHashMap<(NodeId, Vec<TypeId>), TypeId>,
    pub(crate) checking_aliases: FxHashSet<(NodeId, Vec<TypeId>)>,
    pub(crate) template_parameter_types: FxHashMap<NodeId, TypeId>,
    pub(crate) literal_types: LiteralTypes,
    /// Namespace nodes whose decorators and statements were checked.
    pub(crate) checked_namespace_nodes: FxHashSet<NodeId>,
    initialized: bool,

    pub(crate) diagnostics: DiagnosticCollection,
    /// Tolerate decorator failures by reporting them as diagnostics.
    pub(crate) design_time_build: bool,
    pub(crate) registry: DecoratorRegistry,
    pub(crate) state: StateMap,
    /// The first fatal error. Once set, no more decorators run.
    pub(crate) fatal: Option<CheckerError>,
}

impl<'a> Checker<'a> {
    pub fn new(binder: Binder<'a>) -> Self {
        Self::with_options(binder, DecoratorRegistry::new(), false)
    }

    pub fn with_options(binder: Binder<'a>, registry: DecoratorRegistry, design_time_build: bool) -> Self {
        let ast = binder.ast();
        let mut types = TypeTable::new();
        let global_namespace_type = types.add_type(
            Some(ast.global_namespace()),
            TypeKind::Namespace(NamespaceType::default()),
        );
        let mut links: FxHashMap<SymbolId, SymbolLinks> = FxHashMap::default();
        links.entry(binder.global_namespace_symbol()).or_default().ty = Some(global_namespace_type);

        Self {
            ast,
            binder,
            types,
            links,
            merged_symbols: FxHashMap::default(),
            global_namespace_type,
            instantiating_template: None,
            template_arguments: Vec::new(),
            pending_types: FxHashMap::default(),
            checking_aliases: FxHashSet::default(),
            template_parameter_types: FxHashMap::default(),
            literal_types: LiteralTypes::default(),
            checked_namespace_nodes: FxHashSet::default(),
            initialized: false,
            diagnostics: DiagnosticCollection::new(),
            design_time_build,
            registry,
            state: StateMap::new(),
            fatal: None,
        }
    }

    // ========================================================================
    // Entry points
    // ========================================================================

    /// Check every file in the program.
    ///
    /// User errors are reported as diagnostics. An `Err` is returned only for
    /// a decorator failure outside design-time builds or an internal error.
    pub fn check_program(&mut self) -> Result<(), CheckerError> {
        self.initialize();
        let ast = self.ast;
        for &file in ast.files() {
            self.check_source_file(file);
        }
        debug!(
            types = self.types.len(),
            diagnostics = self.diagnostics.len(),
            "checked program"
        );
        match &self.fatal {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    pub fn check_source_file(&mut self, file: NodeId) {
        self.initialize();
        let ast = self.ast;
        let NodeKind::SourceFile(source) = ast.kind(file) else {
            return;
        };
        debug!(file = %source.file_name, "checking source file");
        for &statement in &source.statements {
            self.check_node(statement);
        }
    }

    /// The type of a node, checking it if needed. Declarations return their
    /// declared type, so repeated calls return the same id.
    pub fn get_type_for_node(&mut self, node: NodeId) -> TypeId {
        self.initialize();
        self.check_node(node)
    }

    /// The display name of a type.
    pub fn get_type_name(&self, ty: TypeId) -> String {
        type_name(&self.types, self.ast, ty)
    }

    /// Merge namespaces, apply `using` directives, report duplicate names
    /// and create namespace types. Runs once.
    fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;

        let ast = self.ast;
        let global = self.binder.global_namespace_symbol();
        for &file in ast.files() {
            if let Some(exports) = self.binder.file_exports(file).cloned() {
                self.merge_symbol_table(&exports, global);
            }
        }
        debug!(merged = self.merged_symbols.len(), "merged file exports");
        self.check_usings();
        self.report_duplicate_symbols();
        self.create_namespace_types();
        debug!(types = self.types.len(), "initialized namespace types");
    }

    fn create_namespace_types(&mut self) {
        struct NamespaceCollector {
            global: NodeId,
            namespaces: Vec<NodeId>,
        }

        impl Visitor for NamespaceCollector {
            fn visit_node(&mut self, ast: &Ast, id: NodeId) {
                if id != self.global && matches!(ast.kind(id), NodeKind::NamespaceStatement(_)) {
                    self.namespaces.push(id);
                }
                walk_node(self, ast, id);
            }
        }

        let ast = self.ast;
        let mut collector = NamespaceCollector {
            global: ast.global_namespace(),
            namespaces: Vec::new(),
        };
        for &file in ast.files() {
            collector.visit_node(ast, file);
        }

        // Pre-order, so a parent is typed before its children.
        for node in collector.namespaces {
            let NodeKind::NamespaceStatement(ns) = ast.kind(node) else {
                continue;
            };
            let Some(symbol) = self.binder.symbol_of_node(node) else {
                continue;
            };
            let canonical = self.get_merged_symbol(symbol);
            if self.links.get(&canonical).and_then(|l| l.ty).is_some() {
                continue;
            }
            let Some(parent) = self.get_parent_namespace_type(node) else {
                self.internal_error(format!("parent namespace of {} isn't typed yet", ns.name.text));
                continue;
            };
            let ty = self.types.add_type(
                Some(node),
                TypeKind::Namespace(NamespaceType {
                    name: ns.name.text.clone(),
                    namespace: Some(parent),
                    ..Default::default()
                }),
            );
            self.links_mut(canonical).ty = Some(ty);
            if let Some(parent) = self.types.namespace_mut(parent) {
                parent.namespaces.entry(ns.name.text.clone()).or_insert(ty);
            }
        }
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    pub(crate) fn check_node(&mut self, node: NodeId) -> TypeId {
        let ast = self.ast;
        match ast.kind(node) {
            NodeKind::ModelStatement(m) => self.check_model_statement(node, m),
            NodeKind::ModelExpression(e) => self.check_model_expression(node, e),
            NodeKind::ModelProperty(p) => self.check_model_property_node(node, p),
            NodeKind::NamespaceStatement(ns) => self.check_namespace(node, ns),
            NodeKind::OperationStatement(op) => self.check_operation_node(node, op),
            NodeKind::InterfaceStatement(i) => self.check_interface(node, i),
            NodeKind::EnumStatement(e) => self.check_enum(node, e),
            NodeKind::EnumMember(_) => self.check_enum_member_node(node),
            NodeKind::AliasStatement(a) => self.check_alias(node, a),
            NodeKind::IntrinsicStatement(i) => self.check_intrinsic(node, i),
            NodeKind::TemplateParameterDeclaration(_) => self.check_template_parameter(node),
            NodeKind::TypeReference(r) => self.check_type_reference(node, r),
            NodeKind::UnionExpression(u) => self.check_union(node, &u.options),
            NodeKind::IntersectionExpression(i) => self.check_intersection(node, &i.options),
            NodeKind::ArrayExpression(a) => {
                let element_type = self.check_node(a.element_type);
                self.types
                    .add_type(Some(node), TypeKind::Array(ArrayType { element_type }))
            }
            NodeKind::TupleExpression(t) => {
                let values = t.values.iter().map(|&v| self.check_node(v)).collect();
                self.types
                    .add_type(Some(node), TypeKind::Tuple(TupleType { values }))
            }
            NodeKind::StringLiteral(s) => self.check_string_literal(node, &s.value),
            NodeKind::NumericLiteral(n) => self.check_number_literal(node, n.value),
            NodeKind::BooleanLiteral(b) => self.check_boolean_literal(node, b.value),
            NodeKind::SourceFile(_)
            | NodeKind::UsingStatement(_)
            | NodeKind::ModelSpreadProperty(_)
            | NodeKind::Identifier(_)
            | NodeKind::MemberExpression(_)
            | NodeKind::DecoratorExpression(_) => self.types.error_type,
        }
    }

    fn check_union(&mut self, node: NodeId, options: &[NodeId]) -> TypeId {
        let mut flattened = Vec::with_capacity(options.len());
        for &option in options {
            let ty = self.check_node(option);
            match self.types.as_union(ty) {
                Some(union) => flattened.extend_from_slice(&union.options),
                None => flattened.push(ty),
            }
        }
        self.types.add_type(
            Some(node),
            TypeKind::Union(UnionType { options: flattened }),
        )
    }

    fn check_string_literal(&mut self, node: NodeId, value: &str) -> TypeId {
        if let Some(&ty) = self.literal_types.strings.get(value) {
            return ty;
        }
        let ty = self.types.add_type(Some(node), TypeKind::String(value.to_string()));
        self.literal_types.strings.insert(value.to_string(), ty);
        ty
    }

    fn check_number_literal(&mut self, node: NodeId, value: f64) -> TypeId {
        let key = value.to_bits();
        if let Some(&ty) = self.literal_types.numbers.get(&key) {
            return ty;
        }
        let ty = self.types.add_type(Some(node), TypeKind::Number(value));
        self.literal_types.numbers.insert(key, ty);
        ty
    }

    fn check_boolean_literal(&mut self, node: NodeId, value: bool) -> TypeId {
        let slot = usize::from(value);
        if let Some(ty) = self.literal_types.booleans[slot] {
            return ty;
        }
        let ty = self.types.add_type(Some(node), TypeKind::Boolean(value));
        self.literal_types.booleans[slot] = Some(ty);
        ty
    }

    fn check_intrinsic(&mut self, node: NodeId, intrinsic: &IntrinsicStatement) -> TypeId {
        let symbol = self.binder.symbol_of_node(node);
        if let Some(ty) = symbol.and_then(|s| self.declared_type(s)) {
            return ty;
        }
        let ty = self
            .types
            .add_type(Some(node), TypeKind::Intrinsic(intrinsic.name.text.clone()));
        if let Some(symbol) = symbol {
            self.links_mut(symbol).declared_type = Some(ty);
        }
        ty
    }

    // ========================================================================
    // Shared helpers
    // ========================================================================

    pub(crate) fn links_mut(&mut self, symbol: SymbolId) -> &mut SymbolLinks {
        self.links.entry(symbol).or_default()
    }

    pub(crate) fn declared_type(&self, symbol: SymbolId) -> Option<TypeId> {
        self.links.get(&symbol).and_then(|l| l.declared_type)
    }

    /// The canonical symbol for a reopened namespace, or the symbol itself.
    pub fn get_merged_symbol(&self, symbol: SymbolId) -> SymbolId {
        self.merged_symbols.get(&symbol).copied().unwrap_or(symbol)
    }

    pub(crate) fn namespace_type_of_symbol(&self, symbol: SymbolId) -> Option<TypeId> {
        self.links
            .get(&self.get_merged_symbol(symbol))
            .and_then(|l| l.ty)
    }

    /// The namespace type a declaration belongs to.
    pub(crate) fn get_parent_namespace_type(&self, node: NodeId) -> Option<TypeId> {
        self.binder
            .namespace_symbol_of(node)
            .and_then(|s| self.namespace_type_of_symbol(s))
    }

    /// The nearest template declaration enclosing (or being) `node`.
    pub(crate) fn template_declaration_of(&self, node: NodeId) -> Option<NodeId> {
        let ast = self.ast;
        std::iter::once(node)
            .chain(ast.ancestors(node))
            .find(|&n| !ast.kind(n).template_parameters().is_empty())
    }

    /// Whether a type built from `node` is complete: outside any template, or
    /// inside the template currently being instantiated with concrete
    /// arguments. Only complete types run decorators.
    pub(crate) fn should_finish(&self, node: NodeId) -> bool {
        match self.template_declaration_of(node) {
            Some(declaration) => {
                self.instantiating_template == Some(declaration)
                    && !self.template_arguments.iter().any(|&a| self.is_open_type(a))
            }
            None => true,
        }
    }

    /// Whether `ty` still mentions an unfilled template parameter.
    fn is_open_type(&self, ty: TypeId) -> bool {
        match self.types.kind(ty) {
            TypeKind::TemplateParameter => true,
            TypeKind::Model(m) => m.template_arguments.iter().any(|&a| self.is_open_type(a)),
            TypeKind::Interface(i) => i.template_arguments.iter().any(|&a| self.is_open_type(a)),
            TypeKind::Array(a) => self.is_open_type(a.element_type),
            TypeKind::Tuple(t) => t.values.iter().any(|&v| self.is_open_type(v)),
            TypeKind::Union(u) => u.options.iter().any(|&o| self.is_open_type(o)),
            _ => false,
        }
    }

    #[inline]
    pub(crate) fn is_instantiating(&self, declaration: NodeId) -> bool {
        self.instantiating_template == Some(declaration)
    }

    /// The argument list identifying the current check of a declaration:
    /// the instantiation arguments, or the declaration's own parameter types.
    pub(crate) fn template_key(&mut self, declaration: NodeId) -> Vec<TypeId> {
        if self.is_instantiating(declaration) {
            return self.template_arguments.clone();
        }
        let ast = self.ast;
        ast.kind(declaration)
            .template_parameters()
            .iter()
            .map(|&p| self.check_template_parameter(p))
            .collect()
    }

    pub(crate) fn report(&mut self, message: &DiagnosticMessage, args: &[&str], node: Option<NodeId>) {
        let ast = self.ast;
        let location = node.and_then(|n| Some((ast.file_name_of(n)?, ast.node(n).range)));
        let diagnostic = match location {
            Some((file, range)) => Diagnostic::with_location(file.to_string(), range.to_span(), message, args),
            None => Diagnostic::new(message, args),
        };
        self.diagnostics.add(diagnostic);
    }

    /// Latch an internal error and yield the error type.
    pub(crate) fn internal_error(&mut self, message: String) -> TypeId {
        error!(%message, "internal checker error");
        if self.fatal.is_none() {
            self.fatal = Some(CheckerError::Internal(message));
        }
        self.types.error_type
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    pub fn error_type(&self) -> TypeId {
        self.types.error_type
    }

    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn state(&self) -> &StateMap {
        &self.state
    }

    pub fn binder(&self) -> &Binder<'a> {
        &self.binder
    }

    pub fn ast(&self) -> &'a Ast {
        self.ast
    }

    pub fn global_namespace_type(&self) -> TypeId {
        self.global_namespace_type
    }

    pub fn symbol_links(&self, symbol: SymbolId) -> Option<&SymbolLinks> {
        self.links.get(&symbol)
    }

    pub fn is_design_time_build(&self) -> bool {
        self.design_time_build
    }

    pub fn fatal_error(&self) -> Option<&CheckerError> {
        self.fatal.as_ref()
    }
}
