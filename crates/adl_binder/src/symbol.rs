//! Symbol and symbol table definitions.

use adl_ast::types::{NodeId, SymbolFlags, SymbolId};
use adl_core::intern::InternedString;
use indexmap::IndexMap;

/// What a symbol binds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolKind {
    /// A type declaration (model, namespace, operation, enum, interface,
    /// alias, intrinsic or template parameter).
    Type,
    /// A decorator function, identified by its qualified path in the
    /// decorator registry.
    Decorator { path: String },
}

/// A symbol represents a named binding in some scope.
#[derive(Debug, Clone)]
pub struct Symbol {
    /// Unique identifier for this symbol. Also the key for checker links.
    pub id: SymbolId,
    /// The name of this symbol (interned). Decorators are keyed `@name`.
    pub name: InternedString,
    pub name_text: String,
    pub kind: SymbolKind,
    pub flags: SymbolFlags,
    /// The declarations that contribute to this symbol. Only namespaces
    /// have more than one.
    pub declarations: Vec<NodeId>,
    /// Exports of this symbol (for namespaces).
    pub exports: Option<SymbolTable>,
    /// The namespace symbol this symbol is declared in.
    pub parent: Option<SymbolId>,
}

impl Symbol {
    pub fn new(id: SymbolId, name: InternedString, name_text: String, kind: SymbolKind, flags: SymbolFlags) -> Self {
        let exports = flags.contains(SymbolFlags::NAMESPACE).then(SymbolTable::new);
        Self {
            id,
            name,
            name_text,
            kind,
            flags,
            declarations: Vec::new(),
            exports,
            parent: None,
        }
    }

    /// The first declaration node of a type symbol.
    pub fn node(&self) -> Option<NodeId> {
        match self.kind {
            SymbolKind::Type => self.declarations.first().copied(),
            SymbolKind::Decorator { .. } => None,
        }
    }

    #[inline]
    pub fn is_namespace(&self) -> bool {
        self.flags.contains(SymbolFlags::NAMESPACE)
    }

    #[inline]
    pub fn is_decorator(&self) -> bool {
        matches!(self.kind, SymbolKind::Decorator { .. })
    }
}

/// A symbol table maps names to symbols in insertion order.
///
/// A name binds to at most one symbol. Later bindings of a taken name are
/// not installed; both symbols are recorded as duplicates for reporting.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    table: IndexMap<InternedString, SymbolId>,
    duplicates: IndexMap<InternedString, Vec<SymbolId>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &InternedString) -> Option<SymbolId> {
        self.table.get(name).copied()
    }

    pub fn has(&self, name: &InternedString) -> bool {
        self.table.contains_key(name)
    }

    /// Bind `name` to `symbol` unless already bound. Returns whether the
    /// binding was installed.
    pub fn set(&mut self, name: InternedString, symbol: SymbolId) -> bool {
        match self.table.get(&name).copied() {
            Some(existing) if existing == symbol => true,
            Some(existing) => {
                self.record_duplicates(name, &[existing, symbol]);
                false
            }
            None => {
                self.table.insert(name, symbol);
                true
            }
        }
    }

    /// Bind `name` to `symbol`, replacing any existing binding. A replaced
    /// binding is recorded as a duplicate.
    pub fn overwrite(&mut self, name: InternedString, symbol: SymbolId) {
        if let Some(existing) = self.table.insert(name, symbol) {
            if existing != symbol {
                self.record_duplicates(name, &[existing, symbol]);
            }
        }
    }

    /// Record symbols as duplicate declarations of `name`.
    pub fn record_duplicates(&mut self, name: InternedString, symbols: &[SymbolId]) {
        let entry = self.duplicates.entry(name).or_default();
        for &symbol in symbols {
            if !entry.contains(&symbol) {
                entry.push(symbol);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&InternedString, &SymbolId)> {
        self.table.iter()
    }

    /// Names bound more than once, with every symbol that claimed them.
    pub fn duplicates(&self) -> impl Iterator<Item = (&InternedString, &Vec<SymbolId>)> {
        self.duplicates.iter()
    }

    pub fn has_duplicates(&self) -> bool {
        !self.duplicates.is_empty()
    }
}
