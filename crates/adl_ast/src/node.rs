//! AST node definitions and the node arena.
//!
//! Each node kind has its own payload struct; [`NodeKind`] is the tagged union
//! over all of them. Nodes are allocated children-first, and allocation links
//! every child back to its parent.

use crate::syntax_kind::SyntaxKind;
use crate::types::NodeId;
use crate::visitor::for_each_child;
use adl_core::text::TextPos;
use adl_core::{IndexVec, InternedString, StringInterner, TextRange};

/// Names of the intrinsic types declared in the global namespace.
pub const INTRINSIC_TYPE_NAMES: &[&str] = &[
    "bytes",
    "string",
    "int8",
    "int16",
    "int32",
    "int64",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "safeint",
    "float32",
    "float64",
    "boolean",
    "null",
    "plainDate",
    "plainTime",
    "zonedDateTime",
    "duration",
];

/// A declared or referenced name. `key` is the interned form used for table
/// lookups; `text` is kept for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    pub key: InternedString,
    pub text: String,
}

/// A node in the syntax tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub range: TextRange,
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    SourceFile(SourceFile),
    NamespaceStatement(NamespaceStatement),
    UsingStatement(UsingStatement),
    ModelStatement(ModelStatement),
    ModelProperty(ModelProperty),
    ModelSpreadProperty(ModelSpreadProperty),
    OperationStatement(OperationStatement),
    InterfaceStatement(InterfaceStatement),
    EnumStatement(EnumStatement),
    EnumMember(EnumMember),
    AliasStatement(AliasStatement),
    IntrinsicStatement(IntrinsicStatement),
    TemplateParameterDeclaration(TemplateParameterDeclaration),
    ModelExpression(ModelExpression),
    TypeReference(TypeReference),
    MemberExpression(MemberExpression),
    Identifier(Identifier),
    UnionExpression(UnionExpression),
    IntersectionExpression(IntersectionExpression),
    ArrayExpression(ArrayExpression),
    TupleExpression(TupleExpression),
    StringLiteral(StringLiteral),
    NumericLiteral(NumericLiteral),
    BooleanLiteral(BooleanLiteral),
    DecoratorExpression(DecoratorExpression),
}

// ============================================================================
// Declarations
// ============================================================================

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub file_name: String,
    pub statements: Vec<NodeId>,
}

/// `namespace Foo { ... }` or the blockless `namespace Foo;`.
///
/// A blockless namespace has no statements of its own: the statements that
/// follow it in the file are bound into it while staying children of the file.
#[derive(Debug, Clone)]
pub struct NamespaceStatement {
    pub name: Name,
    pub statements: Vec<NodeId>,
    pub blockless: bool,
    pub decorators: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct UsingStatement {
    /// An `Identifier` or `MemberExpression`.
    pub name: NodeId,
}

#[derive(Debug, Clone)]
pub struct ModelStatement {
    pub name: Name,
    pub template_parameters: Vec<NodeId>,
    pub extends: Option<NodeId>,
    pub is: Option<NodeId>,
    /// `ModelProperty` and `ModelSpreadProperty` nodes in declaration order.
    pub properties: Vec<NodeId>,
    pub decorators: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct ModelProperty {
    pub name: Name,
    pub optional: bool,
    pub value: NodeId,
    pub default: Option<NodeId>,
    pub decorators: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct ModelSpreadProperty {
    /// A `TypeReference`.
    pub target: NodeId,
}

#[derive(Debug, Clone)]
pub struct OperationStatement {
    pub name: Name,
    /// A `ModelExpression` holding the parameters.
    pub parameters: NodeId,
    pub return_type: NodeId,
    pub decorators: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct InterfaceStatement {
    pub name: Name,
    pub template_parameters: Vec<NodeId>,
    pub mixes: Vec<NodeId>,
    pub operations: Vec<NodeId>,
    pub decorators: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct EnumStatement {
    pub name: Name,
    pub members: Vec<NodeId>,
    pub decorators: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct EnumMember {
    pub name: Name,
    pub value: Option<NodeId>,
    pub decorators: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct AliasStatement {
    pub name: Name,
    pub template_parameters: Vec<NodeId>,
    pub value: NodeId,
}

#[derive(Debug, Clone)]
pub struct IntrinsicStatement {
    pub name: Name,
}

#[derive(Debug, Clone)]
pub struct TemplateParameterDeclaration {
    pub name: Name,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone)]
pub struct ModelExpression {
    pub properties: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct TypeReference {
    /// An `Identifier` or `MemberExpression`.
    pub target: NodeId,
    pub arguments: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct MemberExpression {
    pub base: NodeId,
    pub member: Name,
}

#[derive(Debug, Clone)]
pub struct Identifier {
    pub name: Name,
}

#[derive(Debug, Clone)]
pub struct UnionExpression {
    pub options: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct IntersectionExpression {
    pub options: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct ArrayExpression {
    pub element_type: NodeId,
}

#[derive(Debug, Clone)]
pub struct TupleExpression {
    pub values: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct StringLiteral {
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct NumericLiteral {
    pub value: f64,
}

#[derive(Debug, Clone)]
pub struct BooleanLiteral {
    pub value: bool,
}

#[derive(Debug, Clone)]
pub struct DecoratorExpression {
    /// An `Identifier` or `MemberExpression` naming the decorator.
    pub target: NodeId,
    pub arguments: Vec<NodeId>,
}

impl NodeKind {
    pub fn syntax_kind(&self) -> SyntaxKind {
        match self {
            NodeKind::SourceFile(_) => SyntaxKind::SourceFile,
            NodeKind::NamespaceStatement(_) => SyntaxKind::NamespaceStatement,
            NodeKind::UsingStatement(_) => SyntaxKind::UsingStatement,
            NodeKind::ModelStatement(_) => SyntaxKind::ModelStatement,
            NodeKind::ModelProperty(_) => SyntaxKind::ModelProperty,
            NodeKind::ModelSpreadProperty(_) => SyntaxKind::ModelSpreadProperty,
            NodeKind::OperationStatement(_) => SyntaxKind::OperationStatement,
            NodeKind::InterfaceStatement(_) => SyntaxKind::InterfaceStatement,
            NodeKind::EnumStatement(_) => SyntaxKind::EnumStatement,
            NodeKind::EnumMember(_) => SyntaxKind::EnumMember,
            NodeKind::AliasStatement(_) => SyntaxKind::AliasStatement,
            NodeKind::IntrinsicStatement(_) => SyntaxKind::IntrinsicStatement,
            NodeKind::TemplateParameterDeclaration(_) => SyntaxKind::TemplateParameterDeclaration,
            NodeKind::ModelExpression(_) => SyntaxKind::ModelExpression,
            NodeKind::TypeReference(_) => SyntaxKind::TypeReference,
            NodeKind::MemberExpression(_) => SyntaxKind::MemberExpression,
            NodeKind::Identifier(_) => SyntaxKind::Identifier,
            NodeKind::UnionExpression(_) => SyntaxKind::UnionExpression,
            NodeKind::IntersectionExpression(_) => SyntaxKind::IntersectionExpression,
            NodeKind::ArrayExpression(_) => SyntaxKind::ArrayExpression,
            NodeKind::TupleExpression(_) => SyntaxKind::TupleExpression,
            NodeKind::StringLiteral(_) => SyntaxKind::StringLiteral,
            NodeKind::NumericLiteral(_) => SyntaxKind::NumericLiteral,
            NodeKind::BooleanLiteral(_) => SyntaxKind::BooleanLiteral,
            NodeKind::DecoratorExpression(_) => SyntaxKind::DecoratorExpression,
        }
    }

    /// The declared name, for nodes that declare one.
    pub fn declared_name(&self) -> Option<&Name> {
        match self {
            NodeKind::NamespaceStatement(n) => Some(&n.name),
            NodeKind::ModelStatement(n) => Some(&n.name),
            NodeKind::ModelProperty(n) => Some(&n.name),
            NodeKind::OperationStatement(n) => Some(&n.name),
            NodeKind::InterfaceStatement(n) => Some(&n.name),
            NodeKind::EnumStatement(n) => Some(&n.name),
            NodeKind::EnumMember(n) => Some(&n.name),
            NodeKind::AliasStatement(n) => Some(&n.name),
            NodeKind::IntrinsicStatement(n) => Some(&n.name),
            NodeKind::TemplateParameterDeclaration(n) => Some(&n.name),
            _ => None,
        }
    }

    pub fn decorators(&self) -> &[NodeId] {
        match self {
            NodeKind::NamespaceStatement(n) => &n.decorators,
            NodeKind::ModelStatement(n) => &n.decorators,
            NodeKind::ModelProperty(n) => &n.decorators,
            NodeKind::OperationStatement(n) => &n.decorators,
            NodeKind::InterfaceStatement(n) => &n.decorators,
            NodeKind::EnumStatement(n) => &n.decorators,
            NodeKind::EnumMember(n) => &n.decorators,
            _ => &[],
        }
    }

    pub fn template_parameters(&self) -> &[NodeId] {
        match self {
            NodeKind::ModelStatement(n) => &n.template_parameters,
            NodeKind::InterfaceStatement(n) => &n.template_parameters,
            NodeKind::AliasStatement(n) => &n.template_parameters,
            _ => &[],
        }
    }
}

impl Node {
    #[inline]
    pub fn syntax_kind(&self) -> SyntaxKind {
        self.kind.syntax_kind()
    }

    #[inline]
    pub fn declared_name(&self) -> Option<&Name> {
        self.kind.declared_name()
    }
}

// ============================================================================
// Node arena
// ============================================================================

/// The whole-program syntax tree.
///
/// Created with a synthetic global namespace node whose statements declare the
/// intrinsic types. Source files are added with [`Ast::add_file`].
#[derive(Debug, Clone)]
pub struct Ast {
    nodes: IndexVec<NodeId, Node>,
    files: Vec<NodeId>,
    interner: StringInterner,
    global_namespace: NodeId,
    next_pos: TextPos,
}

impl Ast {
    pub fn new() -> Self {
        let mut ast = Self {
            nodes: IndexVec::new(),
            files: Vec::new(),
            interner: StringInterner::new(),
            global_namespace: NodeId(0),
            next_pos: 0,
        };

        let start = ast.next_pos;
        let statements = INTRINSIC_TYPE_NAMES
            .iter()
            .map(|name| {
                let start = ast.next_pos;
                let name = ast.name(name);
                ast.alloc(start, NodeKind::IntrinsicStatement(IntrinsicStatement { name }))
            })
            .collect();
        let name = ast.name("");
        ast.global_namespace = ast.alloc(
            start,
            NodeKind::NamespaceStatement(NamespaceStatement {
                name,
                statements,
                blockless: false,
                decorators: Vec::new(),
            }),
        );
        ast
    }

    /// Allocate a node whose children are already allocated, linking each
    /// child back to it.
    pub(crate) fn alloc(&mut self, start: TextPos, kind: NodeKind) -> NodeId {
        let id = self.nodes.next_idx();
        for_each_child(&kind, |child| self.nodes[child].parent = Some(id));
        self.next_pos += 1;
        self.nodes.push(Node {
            id,
            range: TextRange::new(start, self.next_pos),
            parent: None,
            kind,
        })
    }

    pub(crate) fn push_file(&mut self, file: NodeId) {
        self.files.push(file);
    }

    pub(crate) fn next_pos(&self) -> TextPos {
        self.next_pos
    }

    /// Make a [`Name`], interning its text.
    pub fn name(&self, text: &str) -> Name {
        Name {
            key: self.interner.intern(text),
            text: text.to_string(),
        }
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id].kind
    }

    #[inline]
    pub fn syntax_kind(&self, id: NodeId) -> SyntaxKind {
        self.nodes[id].kind.syntax_kind()
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    /// Iterate the strict ancestors of a node, innermost first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }

    pub fn files(&self) -> &[NodeId] {
        &self.files
    }

    pub fn global_namespace(&self) -> NodeId {
        self.global_namespace
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// The `SourceFile` containing a node, if any. Intrinsic declarations
    /// belong to no file.
    pub fn source_file_of(&self, id: NodeId) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&n| matches!(self.kind(n), NodeKind::SourceFile(_)))
    }

    pub fn file_name_of(&self, id: NodeId) -> Option<&str> {
        match self.kind(self.source_file_of(id)?) {
            NodeKind::SourceFile(file) => Some(file.file_name.as_str()),
            _ => None,
        }
    }

    /// All declarations with the given simple name, in allocation order.
    pub fn find_declarations(&self, name: &str) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|node| node.syntax_kind().is_declaration())
            .filter(|node| node.declared_name().is_some_and(|n| n.text == name))
            .map(|node| node.id)
            .collect()
    }

    pub fn find_declaration(&self, name: &str) -> Option<NodeId> {
        self.find_declarations(name).into_iter().next()
    }

    /// The first namespace node whose dotted path (through enclosing
    /// namespace nodes) equals `path`.
    pub fn find_namespace(&self, path: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .filter(|node| matches!(node.kind, NodeKind::NamespaceStatement(_)))
            .find(|node| node.id != self.global_namespace && self.namespace_path(node.id) == path)
            .map(|node| node.id)
    }

    fn namespace_path(&self, id: NodeId) -> String {
        let mut parts: Vec<&str> = std::iter::once(id)
            .chain(self.ancestors(id))
            .filter_map(|n| match self.kind(n) {
                NodeKind::NamespaceStatement(ns) if n != self.global_namespace => {
                    Some(ns.name.text.as_str())
                }
                _ => None,
            })
            .collect();
        parts.reverse();
        parts.join(".")
    }
}

impl Default for Ast {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ast_declares_intrinsics() {
        let ast = Ast::new();
        let global = ast.global_namespace();
        let NodeKind::NamespaceStatement(ns) = ast.kind(global) else {
            panic!("global namespace must be a namespace statement");
        };
        assert_eq!(ns.statements.len(), INTRINSIC_TYPE_NAMES.len());
        assert!(ns.name.text.is_empty());

        let string = ast.find_declaration("string").unwrap();
        assert_eq!(ast.syntax_kind(string), SyntaxKind::IntrinsicStatement);
        assert_eq!(ast.parent(string), Some(global));
        assert!(ast.source_file_of(string).is_none());
    }

    #[test]
    fn test_parent_range_covers_children() {
        let ast = Ast::new();
        let global = ast.node(ast.global_namespace());
        let NodeKind::NamespaceStatement(ns) = &global.kind else {
            unreachable!()
        };
        for &child in &ns.statements {
            let range = ast.node(child).range;
            assert!(range.pos >= global.range.pos && range.end <= global.range.end);
        }
    }
}
