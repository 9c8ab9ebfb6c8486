//! Symbol links and the template instantiation cache.

use adl_ast::types::TypeId;
use rustc_hash::FxHashMap;

/// Memoized instantiations of one template declaration, keyed by the
/// ordered argument list. Type ids are arena indices, so comparing keys
/// compares argument identity.
#[derive(Debug, Clone, Default)]
pub struct InstantiationMap {
    map: FxHashMap<Box<[TypeId]>, TypeId>,
}

impl InstantiationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, arguments: &[TypeId]) -> Option<TypeId> {
        self.map.get(arguments).copied()
    }

    pub fn set(&mut self, arguments: &[TypeId], ty: TypeId) {
        self.map.insert(arguments.into(), ty);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Checker-owned state for one symbol. Created on first use and kept for the
/// whole checking pass.
#[derive(Debug, Clone, Default)]
pub struct SymbolLinks {
    /// The canonical type of a declaration: the uninstantiated shape of a
    /// template, or the only type of a non-template.
    pub declared_type: Option<TypeId>,
    /// The type of a namespace symbol.
    pub ty: Option<TypeId>,
    pub instantiations: InstantiationMap,
}
