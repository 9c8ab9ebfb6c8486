//! AST visitor trait for traversing the syntax tree.
//!
//! Provides a `Visitor` trait for customizable traversal and a
//! `for_each_child` function for generic iteration over all children.

use crate::node::*;
use crate::types::NodeId;

/// Call `f` on every direct child of a node, in source order.
pub fn for_each_child(kind: &NodeKind, mut f: impl FnMut(NodeId)) {
    let mut each = |ids: &[NodeId]| ids.iter().copied().for_each(&mut f);
    match kind {
        NodeKind::SourceFile(n) => each(&n.statements),
        NodeKind::NamespaceStatement(n) => {
            each(&n.decorators);
            each(&n.statements);
        }
        NodeKind::UsingStatement(n) => each(&[n.name]),
        NodeKind::ModelStatement(n) => {
            each(&n.decorators);
            each(&n.template_parameters);
            each(n.extends.as_slice());
            each(n.is.as_slice());
            each(&n.properties);
        }
        NodeKind::ModelProperty(n) => {
            each(&n.decorators);
            each(&[n.value]);
            each(n.default.as_slice());
        }
        NodeKind::ModelSpreadProperty(n) => each(&[n.target]),
        NodeKind::OperationStatement(n) => {
            each(&n.decorators);
            each(&[n.parameters, n.return_type]);
        }
        NodeKind::InterfaceStatement(n) => {
            each(&n.decorators);
            each(&n.template_parameters);
            each(&n.mixes);
            each(&n.operations);
        }
        NodeKind::EnumStatement(n) => {
            each(&n.decorators);
            each(&n.members);
        }
        NodeKind::EnumMember(n) => {
            each(&n.decorators);
            each(n.value.as_slice());
        }
        NodeKind::AliasStatement(n) => {
            each(&n.template_parameters);
            each(&[n.value]);
        }
        NodeKind::ModelExpression(n) => each(&n.properties),
        NodeKind::TypeReference(n) => {
            each(&[n.target]);
            each(&n.arguments);
        }
        NodeKind::MemberExpression(n) => each(&[n.base]),
        NodeKind::UnionExpression(n) => each(&n.options),
        NodeKind::IntersectionExpression(n) => each(&n.options),
        NodeKind::ArrayExpression(n) => each(&[n.element_type]),
        NodeKind::TupleExpression(n) => each(&n.values),
        NodeKind::DecoratorExpression(n) => {
            each(&[n.target]);
            each(&n.arguments);
        }
        NodeKind::IntrinsicStatement(_)
        | NodeKind::TemplateParameterDeclaration(_)
        | NodeKind::Identifier(_)
        | NodeKind::StringLiteral(_)
        | NodeKind::NumericLiteral(_)
        | NodeKind::BooleanLiteral(_) => {}
    }
}

/// Collect the direct children of a node.
pub fn children(kind: &NodeKind) -> Vec<NodeId> {
    let mut out = Vec::new();
    for_each_child(kind, |id| out.push(id));
    out
}

/// A visitor that traverses the AST. The default implementation walks
/// into every child.
pub trait Visitor {
    fn visit_node(&mut self, ast: &Ast, id: NodeId) {
        walk_node(self, ast, id);
    }
}

pub fn walk_node<V: Visitor + ?Sized>(visitor: &mut V, ast: &Ast, id: NodeId) {
    for_each_child(ast.kind(id), |child| visitor.visit_node(ast, child));
}
