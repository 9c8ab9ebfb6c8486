//! The binder implementation.
//!
//! Walks the AST and builds symbol tables. Handles:
//! - Symbol creation for all declarations
//! - Namespace reopening within one table (declarations are merged)
//! - Blockless namespaces, which capture the rest of their file
//! - Template parameter locals
//! - `using` directive collection
//! - Decorator declarations supplied by libraries

use crate::scope::Scope;
use crate::symbol::{Symbol, SymbolKind, SymbolTable};
use adl_ast::node::*;
use adl_ast::types::*;
use adl_core::intern::InternedString;
use adl_core::IndexVec;
use rustc_hash::FxHashMap;
use tracing::debug;

/// The binder creates symbols and links declarations.
pub struct Binder<'a> {
    ast: &'a Ast,
    /// All symbols created during binding (and later, by the checker's merger).
    symbols: IndexVec<SymbolId, Symbol>,
    /// Declaration node → its symbol.
    node_symbols: FxHashMap<NodeId, SymbolId>,
    /// Declaration node → the namespace symbol it is declared in.
    namespace_symbols: FxHashMap<NodeId, SymbolId>,
    /// Per-file exports: top-level declarations, later merged into the
    /// global namespace.
    file_exports: FxHashMap<NodeId, SymbolTable>,
    /// Locals of files and namespaces (filled by `using`) and of template
    /// declarations (their parameters).
    locals: FxHashMap<NodeId, SymbolTable>,
    /// Namespaces made implicitly in scope by blockless declarations, per file,
    /// innermost first.
    in_scope_namespaces: FxHashMap<NodeId, Vec<NodeId>>,
    /// Every `using` statement in program order.
    usings: Vec<NodeId>,
    global_namespace_symbol: SymbolId,
}

impl<'a> Binder<'a> {
    pub fn new(ast: &'a Ast) -> Self {
        let mut binder = Self {
            ast,
            symbols: IndexVec::new(),
            node_symbols: FxHashMap::default(),
            namespace_symbols: FxHashMap::default(),
            file_exports: FxHashMap::default(),
            locals: FxHashMap::default(),
            in_scope_namespaces: FxHashMap::default(),
            usings: Vec::new(),
            global_namespace_symbol: SymbolId(0),
        };
        binder.bind_global_namespace();
        binder
    }

    pub fn ast(&self) -> &'a Ast {
        self.ast
    }

    // ========================================================================
    // Program binding
    // ========================================================================

    /// Bind every source file in the program.
    pub fn bind_program(&mut self) {
        for &file in self.ast.files() {
            self.bind_source_file(file);
        }
        debug!(
            files = self.ast.files().len(),
            symbols = self.symbols.len(),
            usings = self.usings.len(),
            "bound program"
        );
    }

    fn bind_global_namespace(&mut self) {
        let global = self.ast.global_namespace();
        let name = self.ast.interner().intern("");
        let symbol = self.create_symbol(name, String::new(), SymbolKind::Type, SymbolFlags::NAMESPACE);
        self.symbols[symbol].declarations.push(global);
        self.node_symbols.insert(global, symbol);
        self.global_namespace_symbol = symbol;

        let ast = self.ast;
        if let NodeKind::NamespaceStatement(ns) = ast.kind(global) {
            let scope = Scope::Namespace { symbol };
            for &statement in &ns.statements {
                self.bind_statement(statement, scope);
            }
        }
    }

    /// Bind a source file, creating symbols for all declarations.
    pub fn bind_source_file(&mut self, file: NodeId) {
        let ast = self.ast;
        let NodeKind::SourceFile(source) = ast.kind(file) else {
            return;
        };
        self.file_exports.entry(file).or_default();
        self.locals.entry(file).or_default();

        let mut scope = Scope::File { file };
        for &statement in &source.statements {
            if let Some((symbol, node)) = self.bind_statement(statement, scope) {
                // Statements after a blockless namespace bind into it, and it
                // and its enclosing namespaces become implicitly in scope.
                scope = Scope::Namespace { symbol };
                let chain = std::iter::once(node)
                    .chain(ast.ancestors(node))
                    .take_while(|&n| n != file)
                    .filter(|&n| matches!(ast.kind(n), NodeKind::NamespaceStatement(_)));
                self.in_scope_namespaces.entry(file).or_default().extend(chain);
            }
        }
    }

    /// Bind one statement into `scope`. Returns the symbol and node of a
    /// blockless namespace declared by the statement.
    fn bind_statement(&mut self, statement: NodeId, scope: Scope) -> Option<(SymbolId, NodeId)> {
        let ast = self.ast;
        match ast.kind(statement) {
            NodeKind::NamespaceStatement(ns) => return self.bind_namespace(statement, ns, scope),
            NodeKind::UsingStatement(_) => {
                self.usings.push(statement);
            }
            NodeKind::ModelStatement(m) => {
                self.declare(scope, &m.name, SymbolFlags::MODEL, statement);
                self.bind_template_parameters(statement, &m.template_parameters);
            }
            NodeKind::InterfaceStatement(i) => {
                self.declare(scope, &i.name, SymbolFlags::INTERFACE, statement);
                self.bind_template_parameters(statement, &i.template_parameters);
                let namespace = self.scope_namespace(scope);
                for &operation in &i.operations {
                    self.namespace_symbols.insert(operation, namespace);
                }
            }
            NodeKind::AliasStatement(a) => {
                self.declare(scope, &a.name, SymbolFlags::ALIAS, statement);
                self.bind_template_parameters(statement, &a.template_parameters);
            }
            NodeKind::OperationStatement(o) => {
                self.declare(scope, &o.name, SymbolFlags::OPERATION, statement);
            }
            NodeKind::EnumStatement(e) => {
                self.declare(scope, &e.name, SymbolFlags::ENUM, statement);
            }
            NodeKind::IntrinsicStatement(i) => {
                self.declare(scope, &i.name, SymbolFlags::INTRINSIC, statement);
            }
            _ => {}
        }
        None
    }

    fn bind_namespace(&mut self, node: NodeId, ns: &NamespaceStatement, scope: Scope) -> Option<(SymbolId, NodeId)> {
        let symbol = self.declare(scope, &ns.name, SymbolFlags::NAMESPACE, node);
        self.locals.entry(node).or_default();

        if ns.blockless {
            return Some((symbol, node));
        }
        let inner = Scope::Namespace { symbol };
        let mut blockless = None;
        for &statement in &ns.statements {
            if let Some(found) = self.bind_statement(statement, inner) {
                blockless = Some(found);
            }
        }
        blockless
    }

    fn bind_template_parameters(&mut self, declaration: NodeId, parameters: &[NodeId]) {
        if parameters.is_empty() {
            return;
        }
        let ast = self.ast;
        let namespace = self.namespace_symbols.get(&declaration).copied();
        for &parameter in parameters {
            let NodeKind::TemplateParameterDeclaration(p) = ast.kind(parameter) else {
                continue;
            };
            let symbol = self.create_symbol(
                p.name.key,
                p.name.text.clone(),
                SymbolKind::Type,
                SymbolFlags::TEMPLATE_PARAMETER,
            );
            self.symbols[symbol].declarations.push(parameter);
            self.symbols[symbol].parent = namespace;
            self.node_symbols.insert(parameter, symbol);
            self.locals.entry(declaration).or_default().set(p.name.key, symbol);
        }
    }

    // ========================================================================
    // Decorator declarations
    // ========================================================================

    /// Declare a decorator at a dotted path such as `doc` or `My.Lib.tag`.
    /// The namespace part must name a namespace in the program. Returns
    /// `None` when it does not.
    pub fn declare_decorator(&mut self, path: &str) -> Option<SymbolId> {
        let (namespace, name) = match path.rsplit_once('.') {
            Some((namespace, name)) => (Some(namespace), name),
            None => (None, path),
        };
        let owner = match namespace {
            Some(namespace) => {
                let node = self.ast.find_namespace(namespace)?;
                self.symbol_of_node(node)?
            }
            None => self.global_namespace_symbol,
        };

        let key_text = format!("@{}", name);
        let key = self.ast.interner().intern(&key_text);
        let symbol = self.create_symbol(
            key,
            key_text,
            SymbolKind::Decorator { path: path.to_string() },
            SymbolFlags::DECORATOR,
        );
        self.symbols[symbol].parent = Some(owner);
        if let Some(exports) = self.symbols[owner].exports.as_mut() {
            exports.set(key, symbol);
        }
        Some(symbol)
    }

    // ========================================================================
    // Symbol creation
    // ========================================================================

    /// Allocate a fresh symbol. Used by the binder and by the checker's merger
    /// when it creates canonical namespace symbols.
    pub fn create_symbol(&mut self, name: InternedString, name_text: String, kind: SymbolKind, flags: SymbolFlags) -> SymbolId {
        let id = self.symbols.next_idx();
        self.symbols.push(Symbol::new(id, name, name_text, kind, flags))
    }

    fn scope_namespace(&self, scope: Scope) -> SymbolId {
        match scope {
            Scope::File { .. } => self.global_namespace_symbol,
            Scope::Namespace { symbol } => symbol,
        }
    }

    fn declare(&mut self, scope: Scope, name: &Name, flags: SymbolFlags, declaration: NodeId) -> SymbolId {
        let namespace = self.scope_namespace(scope);
        self.namespace_symbols.insert(declaration, namespace);

        // Reopened namespaces in the same table share one symbol.
        if flags.contains(SymbolFlags::NAMESPACE) {
            let existing = self.table(scope).and_then(|t| t.get(&name.key));
            if let Some(existing) = existing.filter(|&s| self.symbols[s].is_namespace()) {
                self.symbols[existing].declarations.push(declaration);
                self.node_symbols.insert(declaration, existing);
                return existing;
            }
        }

        let symbol = self.create_symbol(name.key, name.text.clone(), SymbolKind::Type, flags);
        self.symbols[symbol].declarations.push(declaration);
        self.symbols[symbol].parent = Some(namespace);
        self.node_symbols.insert(declaration, symbol);
        if let Some(table) = self.table_mut(scope) {
            table.set(name.key, symbol);
        }
        symbol
    }

    fn table(&self, scope: Scope) -> Option<&SymbolTable> {
        match scope {
            Scope::File { file } => self.file_exports.get(&file),
            Scope::Namespace { symbol } => self.symbols[symbol].exports.as_ref(),
        }
    }

    fn table_mut(&mut self, scope: Scope) -> Option<&mut SymbolTable> {
        match scope {
            Scope::File { file } => Some(self.file_exports.entry(file).or_default()),
            Scope::Namespace { symbol } => self.symbols[symbol].exports.as_mut(),
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[inline]
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id]
    }

    pub fn get_symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id]
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    /// The symbol a declaration node binds.
    pub fn symbol_of_node(&self, node: NodeId) -> Option<SymbolId> {
        self.node_symbols.get(&node).copied()
    }

    /// The namespace symbol a declaration belongs to (before merging).
    pub fn namespace_symbol_of(&self, node: NodeId) -> Option<SymbolId> {
        self.namespace_symbols.get(&node).copied()
    }

    pub fn global_namespace_symbol(&self) -> SymbolId {
        self.global_namespace_symbol
    }

    pub fn file_exports(&self, file: NodeId) -> Option<&SymbolTable> {
        self.file_exports.get(&file)
    }

    pub fn locals(&self, node: NodeId) -> Option<&SymbolTable> {
        self.locals.get(&node)
    }

    pub fn locals_mut(&mut self, node: NodeId) -> &mut SymbolTable {
        self.locals.entry(node).or_default()
    }

    /// Every locals table, ordered by owning node.
    pub fn locals_tables(&self) -> Vec<(NodeId, &SymbolTable)> {
        let mut tables: Vec<_> = self.locals.iter().map(|(&n, t)| (n, t)).collect();
        tables.sort_by_key(|(n, _)| *n);
        tables
    }

    pub fn in_scope_namespaces(&self, file: NodeId) -> &[NodeId] {
        self.in_scope_namespaces
            .get(&file)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn usings(&self) -> &[NodeId] {
        &self.usings
    }
}
