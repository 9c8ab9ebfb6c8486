//! Id newtypes and flag types shared by the binder and checker.

use adl_core::define_idx;

define_idx! {
    /// Index of a syntax node in the [`Ast`](crate::Ast) arena.
    pub struct NodeId;
}

define_idx! {
    /// Index of a symbol in the binder's symbol arena. Doubles as the key for
    /// checker-owned symbol links.
    pub struct SymbolId;
}

define_idx! {
    /// Index of a type in the checker's type table. Two types are the same
    /// type exactly when their ids are equal.
    pub struct TypeId;
}

bitflags::bitflags! {
    /// What kind of entity a symbol binds.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SymbolFlags: u32 {
        const NONE               = 0;
        const MODEL              = 1 << 0;
        const NAMESPACE          = 1 << 1;
        const OPERATION          = 1 << 2;
        const ENUM               = 1 << 3;
        const INTERFACE          = 1 << 4;
        const ALIAS              = 1 << 5;
        const TEMPLATE_PARAMETER = 1 << 6;
        const INTRINSIC          = 1 << 7;
        const DECORATOR          = 1 << 8;

        const TYPE = Self::MODEL.bits()
            | Self::NAMESPACE.bits()
            | Self::OPERATION.bits()
            | Self::ENUM.bits()
            | Self::INTERFACE.bits()
            | Self::ALIAS.bits()
            | Self::TEMPLATE_PARAMETER.bits()
            | Self::INTRINSIC.bits();

        /// Declarations that may take template parameters.
        const TEMPLATED = Self::MODEL.bits() | Self::INTERFACE.bits() | Self::ALIAS.bits();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adl_core::Idx;

    #[test]
    fn test_ids_are_distinct_types() {
        let node = NodeId::new(3);
        let ty = TypeId::new(3);
        assert_eq!(node.index(), ty.index());
        assert_eq!(format!("{:?}", node), "NodeId(3)");
    }

    #[test]
    fn test_symbol_flag_groups() {
        assert!(SymbolFlags::TYPE.contains(SymbolFlags::NAMESPACE));
        assert!(!SymbolFlags::TYPE.contains(SymbolFlags::DECORATOR));
        assert!(SymbolFlags::TEMPLATED.intersects(SymbolFlags::ALIAS));
    }
}
