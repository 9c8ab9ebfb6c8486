//! Namespace merging, `using` directives and duplicate-name reporting.
//!
//! Each file binds its own namespace symbols. Before checking, file exports
//! are merged into the global namespace: all declarations of one namespace
//! path share a single canonical symbol whose exports hold the union of
//! every reopening's members.

use crate::checker::Checker;
use adl_ast::node::NodeKind;
use adl_ast::types::SymbolId;
use adl_binder::{SymbolKind, SymbolTable};
use adl_diagnostics::messages;
use rustc_hash::FxHashSet;
use tracing::trace;

impl<'a> Checker<'a> {
    /// Merge `source` into the exports of the namespace symbol `target`.
    pub(crate) fn merge_symbol_table(&mut self, source: &SymbolTable, target: SymbolId) {
        for (&name, &symbol) in source.iter() {
            if !self.binder.symbol(symbol).is_namespace() {
                if let Some(exports) = self.binder.symbol_mut(target).exports.as_mut() {
                    exports.set(name, symbol);
                }
                continue;
            }

            let existing = self
                .binder
                .symbol(target)
                .exports
                .as_ref()
                .and_then(|e| e.get(&name));
            let canonical = match existing {
                Some(existing) if self.binder.symbol(existing).is_namespace() => {
                    let declarations = self.binder.symbol(symbol).declarations.clone();
                    let merged = &mut self.binder.symbol_mut(existing).declarations;
                    for declaration in declarations {
                        if !merged.contains(&declaration) {
                            merged.push(declaration);
                        }
                    }
                    existing
                }
                _ => {
                    let source_symbol = self.binder.symbol(symbol);
                    let (text, flags) = (source_symbol.name_text.clone(), source_symbol.flags);
                    let declarations = source_symbol.declarations.clone();
                    let canonical = self.binder.create_symbol(name, text, SymbolKind::Type, flags);
                    let canonical_symbol = self.binder.symbol_mut(canonical);
                    canonical_symbol.declarations = declarations;
                    canonical_symbol.parent = Some(target);
                    if let Some(exports) = self.binder.symbol_mut(target).exports.as_mut() {
                        // A clash with a non-namespace is left to duplicate reporting.
                        exports.overwrite(name, canonical);
                    }
                    canonical
                }
            };
            trace!(symbol = ?symbol, canonical = ?canonical, "merged namespace");
            self.merged_symbols.insert(symbol, canonical);

            if let Some(exports) = self.binder.symbol(symbol).exports.clone() {
                self.merge_symbol_table(&exports, canonical);
            }
        }

        if source.has_duplicates() {
            let duplicates: Vec<_> = source
                .duplicates()
                .map(|(&name, symbols)| (name, symbols.clone()))
                .collect();
            if let Some(exports) = self.binder.symbol_mut(target).exports.as_mut() {
                for (name, symbols) in duplicates {
                    exports.record_duplicates(name, &symbols);
                }
            }
        }
    }

    /// Resolve every `using` and import the named namespace's members into
    /// the locals of the file or namespace containing it.
    pub(crate) fn check_usings(&mut self) {
        let ast = self.ast;
        for using in self.binder.usings().to_vec() {
            let NodeKind::UsingStatement(statement) = ast.kind(using) else {
                continue;
            };
            let Some(symbol) = self.resolve_reference(statement.name, false) else {
                continue;
            };
            let (is_decorator, is_namespace) = {
                let symbol = self.binder.symbol(symbol);
                (symbol.is_decorator(), symbol.is_namespace())
            };
            if is_decorator {
                self.report(&messages::USING_CANNOT_REFER_TO_DECORATOR, &[], Some(using));
                continue;
            }
            if !is_namespace {
                self.report(&messages::USING_MUST_REFER_TO_NAMESPACE, &[], Some(using));
                continue;
            }
            let merged = self.get_merged_symbol(symbol);
            let Some(exports) = self.binder.symbol(merged).exports.clone() else {
                continue;
            };
            let Some(owner) = ast.parent(using) else {
                continue;
            };
            let locals = self.binder.locals_mut(owner);
            for (&name, &member) in exports.iter() {
                locals.set(name, member);
            }
        }
    }

    /// Report every symbol recorded as a duplicate, once, at its first
    /// declaration.
    pub(crate) fn report_duplicate_symbols(&mut self) {
        let mut groups: Vec<Vec<SymbolId>> = Vec::new();

        // Canonical namespaces: the global one, merged ones, and any that
        // lost a name clash and were never merged.
        for symbol in self.binder.symbols() {
            if !symbol.is_namespace() || self.get_merged_symbol(symbol.id) != symbol.id {
                continue;
            }
            if let Some(exports) = &symbol.exports {
                groups.extend(exports.duplicates().map(|(_, s)| s.clone()));
            }
        }
        for (_, locals) in self.binder.locals_tables() {
            groups.extend(locals.duplicates().map(|(_, s)| s.clone()));
        }

        let mut reported = FxHashSet::default();
        for symbol in groups.into_iter().flatten() {
            if !reported.insert(symbol) {
                continue;
            }
            let symbol = self.binder.symbol(symbol);
            let name = symbol.name_text.clone();
            let node = symbol.declarations.first().copied();
            self.report(&messages::DUPLICATE_NAME_0, &[&name], node);
        }
    }
}
