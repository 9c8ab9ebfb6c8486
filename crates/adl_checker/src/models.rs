//! Model checking: declarations, expressions, properties and intersections.
//!
//! A model is built as a stub first and registered as pending under its
//! declaration and argument list, so references to the model from inside
//! its own heritage or properties resolve to the stub.

use crate::checker::Checker;
use crate::types::{ModelPropertyType, ModelType, TypeKind};
use adl_ast::node::*;
use adl_ast::types::*;
use adl_diagnostics::messages;
use indexmap::IndexMap;
use rustc_hash::FxHashSet;

const NUMERIC_INTRINSICS: &[&str] = &[
    "int8", "int16", "int32", "int64", "uint8", "uint16", "uint32", "uint64", "safeint", "float32",
    "float64",
];

impl<'a> Checker<'a> {
    pub(crate) fn check_model_statement(&mut self, node: NodeId, model: &ModelStatement) -> TypeId {
        let symbol = self.binder.symbol_of_node(node);
        let instantiating = self.is_instantiating(node);
        if !instantiating {
            if let Some(ty) = symbol.and_then(|s| self.declared_type(s)) {
                return ty;
            }
        }
        let key = (node, self.template_key(node));
        if let Some(&ty) = self.pending_types.get(&key) {
            return ty;
        }

        let namespace = self.get_parent_namespace_type(node);
        let stub = ModelType {
            name: model.name.text.clone(),
            namespace,
            template_arguments: if instantiating { key.1.clone() } else { Vec::new() },
            template_node: (!model.template_parameters.is_empty()).then_some(node),
            ..Default::default()
        };
        let ty = self.types.add_type(Some(node), TypeKind::Model(stub));
        self.pending_types.insert(key.clone(), ty);

        if let Some(extends) = model.extends {
            let base = self.check_model_heritage(ty, extends);
            if let Some(m) = self.types.model_mut(ty) {
                m.base_model = base;
            }
        }

        let finish = self.should_finish(node);
        let mut decorators = Vec::new();
        if let Some(is) = model.is {
            if let Some(source) = self.check_model_is(ty, is) {
                let (source_decorators, source_properties, source_base) = match self.types.as_model(source) {
                    Some(m) => (
                        m.decorators.clone(),
                        m.properties.values().copied().collect::<Vec<_>>(),
                        m.base_model,
                    ),
                    None => (Vec::new(), Vec::new(), None),
                };
                decorators.extend(source_decorators);
                let copies: Vec<_> = source_properties
                    .into_iter()
                    .map(|p| self.clone_property(p, finish))
                    .collect();
                for copy in copies {
                    self.define_property(ty, copy, &FxHashSet::default(), is);
                }
                if model.extends.is_none() {
                    if let Some(m) = self.types.model_mut(ty) {
                        m.base_model = source_base;
                    }
                }
            }
        }

        decorators.extend(self.check_decorators(node));
        if let Some(m) = self.types.model_mut(ty) {
            m.decorators = decorators;
        }

        self.check_model_members(ty, node, &model.properties);

        if finish {
            self.finish_type(ty);
        }
        if !instantiating {
            if let Some(symbol) = symbol {
                let links = self.links_mut(symbol);
                links.declared_type = Some(ty);
                if !model.template_parameters.is_empty() {
                    links.instantiations.set(&key.1, ty);
                }
            }
            if let Some(namespace) = namespace.and_then(|n| self.types.namespace_mut(n)) {
                namespace.models.entry(model.name.text.clone()).or_insert(ty);
            }
        }
        self.pending_types.remove(&key);
        ty
    }

    pub(crate) fn check_model_expression(&mut self, node: NodeId, expression: &ModelExpression) -> TypeId {
        let ty = self
            .types
            .add_type(Some(node), TypeKind::Model(ModelType::default()));
        self.check_model_members(ty, node, &expression.properties);
        ty
    }

    /// A property node checked on its own resolves to the property type of
    /// its model when the model was already built from it.
    pub(crate) fn check_model_property_node(&mut self, node: NodeId, property: &ModelProperty) -> TypeId {
        let ast = self.ast;
        if let Some(parent) = ast
            .parent(node)
            .filter(|&p| matches!(ast.kind(p), NodeKind::ModelStatement(_)))
        {
            let model = self.check_node(parent);
            let existing = self.types.as_model(model).and_then(|m| {
                m.properties
                    .values()
                    .copied()
                    .find(|&p| self.types.get(p).node == Some(node))
            });
            if let Some(existing) = existing {
                return existing;
            }
        }
        self.check_model_property(node, property)
    }

    fn check_model_heritage(&mut self, model: TypeId, heritage: NodeId) -> Option<TypeId> {
        let base = self.check_node(heritage);
        match self.types.kind(base) {
            TypeKind::TemplateParameter => None,
            TypeKind::Model(_) => {
                if self.base_chain_contains(base, model) {
                    let name = self.get_type_name(model);
                    self.report(
                        &messages::MODEL_RECURSIVELY_REFERENCES_ITSELF_AS_BASE_0,
                        &[&name],
                        Some(heritage),
                    );
                    return None;
                }
                Some(base)
            }
            _ => {
                if !self.types.is_error(base) {
                    self.report(&messages::MODELS_MUST_EXTEND_OTHER_MODELS, &[], Some(heritage));
                }
                None
            }
        }
    }

    fn check_model_is(&mut self, model: TypeId, is: NodeId) -> Option<TypeId> {
        let source = self.check_node(is);
        match self.types.kind(source) {
            TypeKind::TemplateParameter => None,
            TypeKind::Model(_) => {
                if self.base_chain_contains(source, model) {
                    let name = self.get_type_name(model);
                    self.report(
                        &messages::MODEL_RECURSIVELY_REFERENCES_ITSELF_AS_BASE_0,
                        &[&name],
                        Some(is),
                    );
                    return None;
                }
                Some(source)
            }
            _ => {
                if !self.types.is_error(source) {
                    self.report(&messages::MODEL_IS_MUST_SPECIFY_A_MODEL, &[], Some(is));
                }
                None
            }
        }
    }

    /// Whether `target` is `start` or one of its bases.
    fn base_chain_contains(&self, start: TypeId, target: TypeId) -> bool {
        let mut seen = FxHashSet::default();
        let mut current = Some(start);
        while let Some(id) = current {
            if id == target {
                return true;
            }
            if !seen.insert(id) {
                return false;
            }
            current = self.types.as_model(id).and_then(|m| m.base_model);
        }
        false
    }

    /// Check own and spread properties into `model`.
    fn check_model_members(&mut self, model: TypeId, owner: NodeId, members: &[NodeId]) {
        let inherited: FxHashSet<String> = match self.types.as_model(model).and_then(|m| m.base_model) {
            Some(base) => self
                .types
                .walk_properties_inherited(base)
                .into_iter()
                .filter_map(|p| self.types.as_property(p).map(|p| p.name.clone()))
                .collect(),
            None => FxHashSet::default(),
        };
        let finish = self.should_finish(owner);

        let ast = self.ast;
        for &member in members {
            match ast.kind(member) {
                NodeKind::ModelProperty(property) => {
                    let ty = self.check_model_property(member, property);
                    self.define_property(model, ty, &inherited, member);
                }
                NodeKind::ModelSpreadProperty(spread) => {
                    for ty in self.check_spread_property(spread.target, finish) {
                        self.define_property(model, ty, &inherited, member);
                    }
                }
                _ => {}
            }
        }
    }

    /// Add a property to a model. The first property of a name wins.
    fn define_property(&mut self, model: TypeId, property: TypeId, inherited: &FxHashSet<String>, node: NodeId) {
        let Some(name) = self.types.as_property(property).map(|p| p.name.clone()) else {
            return;
        };
        let exists = self
            .types
            .as_model(model)
            .is_some_and(|m| m.properties.contains_key(&name));
        if exists {
            self.report(&messages::MODEL_ALREADY_HAS_PROPERTY_0, &[&name], Some(node));
            return;
        }
        if inherited.contains(&name) {
            self.report(&messages::CANNOT_OVERRIDE_INHERITED_PROPERTY_0, &[&name], Some(node));
            return;
        }
        if let Some(m) = self.types.model_mut(model) {
            m.properties.insert(name, property);
        }
    }

    fn check_model_property(&mut self, node: NodeId, property: &ModelProperty) -> TypeId {
        let ty = self.check_node(property.value);
        let default = property.default.and_then(|d| self.check_default(ty, d));
        let decorators = self.check_decorators(node);
        let id = self.types.add_type(
            Some(node),
            TypeKind::ModelProperty(ModelPropertyType {
                name: property.name.text.clone(),
                ty,
                optional: property.optional,
                default,
                source_property: None,
                decorators,
            }),
        );
        if self.should_finish(node) {
            self.finish_type(id);
        }
        id
    }

    /// A default value must be a literal matching a string, numeric or
    /// boolean property type. Other property types accept any default.
    fn check_default(&mut self, property_type: TypeId, default_node: NodeId) -> Option<TypeId> {
        let default = self.check_node(default_node);
        let expected = match self.types.kind(property_type) {
            TypeKind::Intrinsic(name) if name == "string" => Some("string"),
            TypeKind::Intrinsic(name) if NUMERIC_INTRINSICS.contains(&name.as_str()) => Some("number"),
            TypeKind::Intrinsic(name) if name == "boolean" => Some("boolean"),
            _ => None,
        };
        let Some(expected) = expected else {
            return Some(default);
        };
        let matches = matches!(
            (expected, self.types.kind(default)),
            ("string", TypeKind::String(_)) | ("number", TypeKind::Number(_)) | ("boolean", TypeKind::Boolean(_))
        );
        if matches {
            Some(default)
        } else {
            self.report(&messages::DEFAULT_MUST_BE_A_0, &[expected], Some(default_node));
            None
        }
    }

    /// Copies of every property of the spread model and its bases.
    fn check_spread_property(&mut self, target: NodeId, finish: bool) -> Vec<TypeId> {
        let source = self.check_node(target);
        match self.types.kind(source) {
            TypeKind::TemplateParameter => Vec::new(),
            TypeKind::Model(_) => self
                .types
                .walk_properties_inherited(source)
                .into_iter()
                .map(|p| self.clone_property(p, finish))
                .collect(),
            _ => {
                if !self.types.is_error(source) {
                    self.report(&messages::CANNOT_SPREAD_NON_MODEL, &[], Some(target));
                }
                Vec::new()
            }
        }
    }

    /// A fresh property type copied from `source`, remembering its origin.
    /// Copies carry the source's decorators and run them again when finished.
    pub(crate) fn clone_property(&mut self, source: TypeId, finish: bool) -> TypeId {
        let Some(property) = self.types.as_property(source).cloned() else {
            return source;
        };
        let node = self.types.get(source).node;
        let copy = self.types.add_type(
            node,
            TypeKind::ModelProperty(ModelPropertyType {
                source_property: Some(source),
                ..property
            }),
        );
        if finish {
            self.finish_type(copy);
        }
        copy
    }

    /// Intersections merge the inherited properties of every operand into
    /// one anonymous model.
    pub(crate) fn check_intersection(&mut self, node: NodeId, options: &[NodeId]) -> TypeId {
        let operands: Vec<(NodeId, TypeId)> = options.iter().map(|&o| (o, self.check_node(o))).collect();
        let finish = self.should_finish(node);

        let mut properties: IndexMap<String, TypeId> = IndexMap::new();
        for (option, operand) in operands {
            match self.types.kind(operand) {
                TypeKind::TemplateParameter => continue,
                TypeKind::Model(_) => {}
                _ => {
                    self.report(&messages::CANNOT_INTERSECT_NON_MODEL_TYPES, &[], Some(option));
                    return self.types.error_type;
                }
            }
            for property in self.types.walk_properties_inherited(operand) {
                let Some(name) = self.types.as_property(property).map(|p| p.name.clone()) else {
                    continue;
                };
                if properties.contains_key(&name) {
                    self.report(&messages::INTERSECTION_DUPLICATE_PROPERTY_0, &[&name], Some(option));
                    continue;
                }
                let copy = self.clone_property(property, finish);
                properties.insert(name, copy);
            }
        }
        self.types.add_type(
            Some(node),
            TypeKind::Model(ModelType {
                properties,
                ..Default::default()
            }),
        )
    }
}
