//! SyntaxKind enum - the kind of every node in the ADL syntax tree.

use std::fmt;

/// The kind of a syntax node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum SyntaxKind {
    SourceFile,

    // Declarations
    NamespaceStatement,
    UsingStatement,
    ModelStatement,
    ModelProperty,
    ModelSpreadProperty,
    OperationStatement,
    InterfaceStatement,
    EnumStatement,
    EnumMember,
    AliasStatement,
    IntrinsicStatement,
    TemplateParameterDeclaration,

    // Expressions
    ModelExpression,
    TypeReference,
    MemberExpression,
    Identifier,
    UnionExpression,
    IntersectionExpression,
    ArrayExpression,
    TupleExpression,
    StringLiteral,
    NumericLiteral,
    BooleanLiteral,
    DecoratorExpression,
}

impl SyntaxKind {
    /// Declarations that introduce a binding in their parent scope.
    pub fn is_declaration(self) -> bool {
        matches!(
            self,
            SyntaxKind::NamespaceStatement
                | SyntaxKind::ModelStatement
                | SyntaxKind::OperationStatement
                | SyntaxKind::InterfaceStatement
                | SyntaxKind::EnumStatement
                | SyntaxKind::AliasStatement
                | SyntaxKind::IntrinsicStatement
                | SyntaxKind::TemplateParameterDeclaration
        )
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            SyntaxKind::StringLiteral | SyntaxKind::NumericLiteral | SyntaxKind::BooleanLiteral
        )
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
