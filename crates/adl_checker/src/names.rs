//! Display names for types.

use crate::types::{TypeKind, TypeTable};
use adl_ast::node::Ast;
use adl_ast::types::TypeId;

/// The canonical display name of a type: namespace-qualified, with template
/// arguments rendered as `Name<A, B>`.
pub fn type_name(types: &TypeTable, ast: &Ast, ty: TypeId) -> String {
    match types.kind(ty) {
        TypeKind::Model(model) => {
            if model.name.is_empty() {
                return "(anonymous model)".to_string();
            }
            let name = qualified_name(types, model.namespace, &model.name);
            with_arguments(types, ast, name, &model.template_arguments)
        }
        TypeKind::Interface(interface) => {
            let name = qualified_name(types, interface.namespace, &interface.name);
            with_arguments(types, ast, name, &interface.template_arguments)
        }
        TypeKind::Namespace(_) => namespace_path(types, Some(ty)),
        TypeKind::Operation(operation) => match operation.interface {
            Some(interface) => format!("{}.{}", type_name(types, ast, interface), operation.name),
            None => qualified_name(types, operation.namespace, &operation.name),
        },
        TypeKind::Enum(e) => qualified_name(types, e.namespace, &e.name),
        TypeKind::EnumMember(member) => {
            format!("{}.{}", type_name(types, ast, member.enum_type), member.name)
        }
        TypeKind::ModelProperty(property) => property.name.clone(),
        TypeKind::Union(union) => join(types, ast, &union.options, " | "),
        TypeKind::Array(array) => format!("{}[]", type_name(types, ast, array.element_type)),
        TypeKind::Tuple(tuple) => format!("[{}]", join(types, ast, &tuple.values, ", ")),
        TypeKind::TemplateParameter => types
            .get(ty)
            .node
            .and_then(|n| ast.node(n).declared_name())
            .map(|n| n.text.clone())
            .unwrap_or_default(),
        TypeKind::String(value) => format!("\"{}\"", value),
        TypeKind::Number(value) => value.to_string(),
        TypeKind::Boolean(value) => value.to_string(),
        TypeKind::Intrinsic(name) => name.clone(),
    }
}

fn join(types: &TypeTable, ast: &Ast, ids: &[TypeId], separator: &str) -> String {
    ids.iter()
        .map(|&id| type_name(types, ast, id))
        .collect::<Vec<_>>()
        .join(separator)
}

fn with_arguments(types: &TypeTable, ast: &Ast, name: String, arguments: &[TypeId]) -> String {
    if arguments.is_empty() {
        name
    } else {
        format!("{}<{}>", name, join(types, ast, arguments, ", "))
    }
}

/// Dotted path of a namespace type. The global namespace is unnamed.
fn namespace_path(types: &TypeTable, namespace: Option<TypeId>) -> String {
    let mut segments = Vec::new();
    let mut current = namespace;
    while let Some(id) = current {
        let Some(ns) = types.as_namespace(id) else {
            break;
        };
        if !ns.name.is_empty() {
            segments.push(ns.name.as_str());
        }
        current = ns.namespace;
    }
    segments.reverse();
    segments.join(".")
}

fn qualified_name(types: &TypeTable, namespace: Option<TypeId>, name: &str) -> String {
    let prefix = namespace_path(types, namespace);
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}
