//! Type system representation.
//!
//! Types are stored in a TypeTable (type arena) and referenced by TypeId.
//! A type is built once while its defining construct is checked and is not
//! structurally changed afterwards; decorators record their effects in a
//! separate state map.

use crate::decorators::DecoratorApplication;
use adl_ast::types::{NodeId, TypeId};
use adl_core::IndexVec;
use indexmap::IndexMap;
use std::fmt;

/// A type in the ADL type graph.
#[derive(Debug, Clone)]
pub struct Type {
    pub id: TypeId,
    /// The syntax node this type was checked from, if any.
    pub node: Option<NodeId>,
    pub kind: TypeKind,
}

#[derive(Debug, Clone)]
pub enum TypeKind {
    Model(ModelType),
    ModelProperty(ModelPropertyType),
    Namespace(NamespaceType),
    Operation(OperationType),
    Enum(EnumType),
    EnumMember(EnumMemberType),
    Interface(InterfaceType),
    Union(UnionType),
    Array(ArrayType),
    Tuple(TupleType),
    /// An uninstantiated template parameter. The name lives on the node.
    TemplateParameter,
    String(String),
    Number(f64),
    Boolean(bool),
    /// Built-in types, plus the `ErrorType` sentinel.
    Intrinsic(String),
}

#[derive(Debug, Clone, Default)]
pub struct ModelType {
    /// Empty for anonymous models (expressions and intersections).
    pub name: String,
    pub namespace: Option<TypeId>,
    /// Own properties in declaration order, name → `ModelProperty` type.
    pub properties: IndexMap<String, TypeId>,
    pub base_model: Option<TypeId>,
    /// The arguments this model was instantiated with; empty for
    /// non-templates and uninstantiated template declarations.
    pub template_arguments: Vec<TypeId>,
    /// The template declaration this model comes from, if templated.
    pub template_node: Option<NodeId>,
    pub decorators: Vec<DecoratorApplication>,
}

#[derive(Debug, Clone)]
pub struct ModelPropertyType {
    pub name: String,
    pub ty: TypeId,
    pub optional: bool,
    pub default: Option<TypeId>,
    /// The property this one was copied from by `is`, spread or intersection.
    pub source_property: Option<TypeId>,
    pub decorators: Vec<DecoratorApplication>,
}

#[derive(Debug, Clone, Default)]
pub struct NamespaceType {
    pub name: String,
    pub namespace: Option<TypeId>,
    pub models: IndexMap<String, TypeId>,
    pub operations: IndexMap<String, TypeId>,
    pub namespaces: IndexMap<String, TypeId>,
    pub interfaces: IndexMap<String, TypeId>,
    pub enums: IndexMap<String, TypeId>,
    pub decorators: Vec<DecoratorApplication>,
}

#[derive(Debug, Clone)]
pub struct OperationType {
    pub name: String,
    pub namespace: Option<TypeId>,
    /// The interface declaring this operation, for interface members.
    pub interface: Option<TypeId>,
    /// An anonymous model holding the parameters.
    pub parameters: TypeId,
    pub return_type: TypeId,
    pub decorators: Vec<DecoratorApplication>,
}

#[derive(Debug, Clone)]
pub struct EnumType {
    pub name: String,
    pub namespace: Option<TypeId>,
    pub members: Vec<TypeId>,
    pub decorators: Vec<DecoratorApplication>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnumMemberValue {
    String(String),
    Number(f64),
}

#[derive(Debug, Clone)]
pub struct EnumMemberType {
    pub name: String,
    pub enum_type: TypeId,
    pub value: Option<EnumMemberValue>,
    pub decorators: Vec<DecoratorApplication>,
}

#[derive(Debug, Clone, Default)]
pub struct InterfaceType {
    pub name: String,
    pub namespace: Option<TypeId>,
    pub operations: IndexMap<String, TypeId>,
    pub template_arguments: Vec<TypeId>,
    pub template_node: Option<NodeId>,
    pub decorators: Vec<DecoratorApplication>,
}

#[derive(Debug, Clone)]
pub struct UnionType {
    pub options: Vec<TypeId>,
}

#[derive(Debug, Clone)]
pub struct ArrayType {
    pub element_type: TypeId,
}

#[derive(Debug, Clone)]
pub struct TupleType {
    pub values: Vec<TypeId>,
}

impl TypeKind {
    /// A short name for the kind, as used in messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeKind::Model(_) => "Model",
            TypeKind::ModelProperty(_) => "ModelProperty",
            TypeKind::Namespace(_) => "Namespace",
            TypeKind::Operation(_) => "Operation",
            TypeKind::Enum(_) => "Enum",
            TypeKind::EnumMember(_) => "EnumMember",
            TypeKind::Interface(_) => "Interface",
            TypeKind::Union(_) => "Union",
            TypeKind::Array(_) => "Array",
            TypeKind::Tuple(_) => "Tuple",
            TypeKind::TemplateParameter => "TemplateParameter",
            TypeKind::String(_) => "String",
            TypeKind::Number(_) => "Number",
            TypeKind::Boolean(_) => "Boolean",
            TypeKind::Intrinsic(_) => "Intrinsic",
        }
    }

    /// Decorators applied to this type, for kinds that carry them.
    pub fn decorators(&self) -> &[DecoratorApplication] {
        match self {
            TypeKind::Model(t) => &t.decorators,
            TypeKind::ModelProperty(t) => &t.decorators,
            TypeKind::Namespace(t) => &t.decorators,
            TypeKind::Operation(t) => &t.decorators,
            TypeKind::Enum(t) => &t.decorators,
            TypeKind::EnumMember(t) => &t.decorators,
            TypeKind::Interface(t) => &t.decorators,
            _ => &[],
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind_name())
    }
}

/// The type table stores all types and provides access by TypeId.
#[derive(Debug)]
pub struct TypeTable {
    types: IndexVec<TypeId, Type>,
    /// The sentinel produced by failed resolution and checking.
    pub error_type: TypeId,
}

/// Name of the error sentinel intrinsic.
pub const ERROR_TYPE_NAME: &str = "ErrorType";

impl TypeTable {
    pub fn new() -> Self {
        let mut table = Self {
            types: IndexVec::with_capacity(256),
            error_type: TypeId(0),
        };
        table.error_type = table.add_type(None, TypeKind::Intrinsic(ERROR_TYPE_NAME.to_string()));
        table
    }

    /// Add a new type to the table and return its ID.
    pub fn add_type(&mut self, node: Option<NodeId>, kind: TypeKind) -> TypeId {
        let id = self.types.next_idx();
        self.types.push(Type { id, node, kind })
    }

    #[inline]
    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id]
    }

    #[inline]
    pub fn kind(&self, id: TypeId) -> &TypeKind {
        &self.types[id].kind
    }

    pub(crate) fn get_mut(&mut self, id: TypeId) -> &mut Type {
        &mut self.types[id]
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Type> {
        self.types.iter()
    }

    #[inline]
    pub fn is_error(&self, id: TypeId) -> bool {
        id == self.error_type
    }

    pub fn as_model(&self, id: TypeId) -> Option<&ModelType> {
        match self.kind(id) {
            TypeKind::Model(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_property(&self, id: TypeId) -> Option<&ModelPropertyType> {
        match self.kind(id) {
            TypeKind::ModelProperty(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_namespace(&self, id: TypeId) -> Option<&NamespaceType> {
        match self.kind(id) {
            TypeKind::Namespace(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_operation(&self, id: TypeId) -> Option<&OperationType> {
        match self.kind(id) {
            TypeKind::Operation(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_interface(&self, id: TypeId) -> Option<&InterfaceType> {
        match self.kind(id) {
            TypeKind::Interface(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_enum(&self, id: TypeId) -> Option<&EnumType> {
        match self.kind(id) {
            TypeKind::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_union(&self, id: TypeId) -> Option<&UnionType> {
        match self.kind(id) {
            TypeKind::Union(u) => Some(u),
            _ => None,
        }
    }

    pub(crate) fn model_mut(&mut self, id: TypeId) -> Option<&mut ModelType> {
        match &mut self.get_mut(id).kind {
            TypeKind::Model(m) => Some(m),
            _ => None,
        }
    }

    pub(crate) fn namespace_mut(&mut self, id: TypeId) -> Option<&mut NamespaceType> {
        match &mut self.get_mut(id).kind {
            TypeKind::Namespace(n) => Some(n),
            _ => None,
        }
    }

    pub(crate) fn interface_mut(&mut self, id: TypeId) -> Option<&mut InterfaceType> {
        match &mut self.get_mut(id).kind {
            TypeKind::Interface(i) => Some(i),
            _ => None,
        }
    }

    pub(crate) fn enum_mut(&mut self, id: TypeId) -> Option<&mut EnumType> {
        match &mut self.get_mut(id).kind {
            TypeKind::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// The name of a type that carries one.
    pub fn name_of(&self, id: TypeId) -> Option<&str> {
        match self.kind(id) {
            TypeKind::Model(t) => Some(&t.name),
            TypeKind::ModelProperty(t) => Some(&t.name),
            TypeKind::Namespace(t) => Some(&t.name),
            TypeKind::Operation(t) => Some(&t.name),
            TypeKind::Enum(t) => Some(&t.name),
            TypeKind::EnumMember(t) => Some(&t.name),
            TypeKind::Interface(t) => Some(&t.name),
            TypeKind::Intrinsic(name) => Some(name),
            _ => None,
        }
    }

    /// Properties of a model and of each of its base models, child first.
    pub fn walk_properties_inherited(&self, model: TypeId) -> Vec<TypeId> {
        let mut properties = Vec::new();
        let mut seen = Vec::new();
        let mut current = Some(model);
        while let Some(id) = current {
            if seen.contains(&id) {
                break;
            }
            seen.push(id);
            let Some(m) = self.as_model(id) else {
                break;
            };
            properties.extend(m.properties.values().copied());
            current = m.base_model;
        }
        properties
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_type_is_first() {
        let table = TypeTable::new();
        assert_eq!(table.error_type, TypeId(0));
        assert_eq!(table.name_of(table.error_type), Some(ERROR_TYPE_NAME));
        assert!(table.is_error(TypeId(0)));
    }

    #[test]
    fn test_walk_properties_inherited_child_first() {
        let mut table = TypeTable::new();
        let string = table.add_type(None, TypeKind::Intrinsic("string".into()));
        let prop = |table: &mut TypeTable, name: &str| {
            table.add_type(
                None,
                TypeKind::ModelProperty(ModelPropertyType {
                    name: name.into(),
                    ty: string,
                    optional: false,
                    default: None,
                    source_property: None,
                    decorators: Vec::new(),
                }),
            )
        };
        let name = prop(&mut table, "name");
        let bark = prop(&mut table, "bark");

        let mut base = ModelType {
            name: "Pet".into(),
            ..Default::default()
        };
        base.properties.insert("name".into(), name);
        let base = table.add_type(None, TypeKind::Model(base));

        let mut derived = ModelType {
            name: "Dog".into(),
            base_model: Some(base),
            ..Default::default()
        };
        derived.properties.insert("bark".into(), bark);
        let derived = table.add_type(None, TypeKind::Model(derived));

        assert_eq!(table.walk_properties_inherited(derived), vec![bark, name]);
    }
}
