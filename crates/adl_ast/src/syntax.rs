//! Declarative construction of syntax trees.
//!
//! Describes ADL source the way it reads and lowers it into arena nodes,
//! standing in for a textual parser:
//!
//! ```
//! use adl_ast::syntax::*;
//! use adl_ast::Ast;
//!
//! let mut ast = Ast::new();
//! ast.add_file(
//!     "main.adl",
//!     vec![
//!         model("Pet").prop("name", ty("string")).into(),
//!         model("Dog").extends(ty("Pet")).prop("bark", ty("string")).into(),
//!     ],
//! );
//! assert!(ast.find_declaration("Dog").is_some());
//! ```
//!
//! Dotted names (`namespace("A.B")`, `ty("A.B")`) lower to nested namespace
//! statements and member expressions respectively.

use crate::node::*;
use crate::types::NodeId;

/// A top-level or namespace-level statement.
#[derive(Debug, Clone)]
pub enum Statement {
    Model(ModelDecl),
    Namespace(NamespaceDecl),
    Using(String),
    Operation(OperationDecl),
    Interface(InterfaceDecl),
    Enum(EnumDecl),
    Alias(AliasDecl),
}

/// A type expression.
#[derive(Debug, Clone)]
pub enum Expr {
    Reference { path: String, arguments: Vec<Expr> },
    Model(Vec<Member>),
    Union(Vec<Expr>),
    Intersection(Vec<Expr>),
    Array(Box<Expr>),
    Tuple(Vec<Expr>),
    String(String),
    Number(f64),
    Boolean(bool),
}

/// A model body entry.
#[derive(Debug, Clone)]
pub enum Member {
    Property(PropertyDecl),
    Spread(Expr),
}

#[derive(Debug, Clone)]
pub struct DecoratorDecl {
    pub path: String,
    pub arguments: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub struct PropertyDecl {
    pub name: String,
    pub optional: bool,
    pub ty: Expr,
    pub default: Option<Expr>,
    pub decorators: Vec<DecoratorDecl>,
}

#[derive(Debug, Clone)]
pub struct ModelDecl {
    pub name: String,
    pub template_parameters: Vec<String>,
    pub extends: Option<Expr>,
    pub is: Option<Expr>,
    pub members: Vec<Member>,
    pub decorators: Vec<DecoratorDecl>,
}

#[derive(Debug, Clone)]
pub struct NamespaceDecl {
    pub name: String,
    pub blockless: bool,
    pub statements: Vec<Statement>,
    pub decorators: Vec<DecoratorDecl>,
}

#[derive(Debug, Clone)]
pub struct OperationDecl {
    pub name: String,
    pub parameters: Vec<Member>,
    pub return_type: Expr,
    pub decorators: Vec<DecoratorDecl>,
}

#[derive(Debug, Clone)]
pub struct InterfaceDecl {
    pub name: String,
    pub template_parameters: Vec<String>,
    pub mixes: Vec<Expr>,
    pub operations: Vec<OperationDecl>,
    pub decorators: Vec<DecoratorDecl>,
}

#[derive(Debug, Clone)]
pub struct EnumDecl {
    pub name: String,
    pub members: Vec<EnumMemberDecl>,
    pub decorators: Vec<DecoratorDecl>,
}

#[derive(Debug, Clone)]
pub struct EnumMemberDecl {
    pub name: String,
    pub value: Option<Expr>,
    pub decorators: Vec<DecoratorDecl>,
}

#[derive(Debug, Clone)]
pub struct AliasDecl {
    pub name: String,
    pub template_parameters: Vec<String>,
    pub value: Expr,
}

// ============================================================================
// Constructors
// ============================================================================

pub fn model(name: &str) -> ModelDecl {
    ModelDecl {
        name: name.to_string(),
        template_parameters: Vec::new(),
        extends: None,
        is: None,
        members: Vec::new(),
        decorators: Vec::new(),
    }
}

pub fn namespace(name: &str) -> NamespaceDecl {
    NamespaceDecl {
        name: name.to_string(),
        blockless: false,
        statements: Vec::new(),
        decorators: Vec::new(),
    }
}

/// `namespace Foo;` - the rest of the file is bound into `Foo`.
pub fn blockless_namespace(name: &str) -> NamespaceDecl {
    NamespaceDecl {
        blockless: true,
        ..namespace(name)
    }
}

pub fn using(path: &str) -> Statement {
    Statement::Using(path.to_string())
}

/// An operation returning an empty model until [`OperationDecl::returns`] is set.
pub fn op(name: &str) -> OperationDecl {
    OperationDecl {
        name: name.to_string(),
        parameters: Vec::new(),
        return_type: Expr::Model(Vec::new()),
        decorators: Vec::new(),
    }
}

pub fn interface(name: &str) -> InterfaceDecl {
    InterfaceDecl {
        name: name.to_string(),
        template_parameters: Vec::new(),
        mixes: Vec::new(),
        operations: Vec::new(),
        decorators: Vec::new(),
    }
}

pub fn enum_decl(name: &str) -> EnumDecl {
    EnumDecl {
        name: name.to_string(),
        members: Vec::new(),
        decorators: Vec::new(),
    }
}

pub fn alias(name: &str, value: Expr) -> AliasDecl {
    AliasDecl {
        name: name.to_string(),
        template_parameters: Vec::new(),
        value,
    }
}

pub fn prop(name: &str, ty: Expr) -> PropertyDecl {
    PropertyDecl {
        name: name.to_string(),
        optional: false,
        ty,
        default: None,
        decorators: Vec::new(),
    }
}

pub fn spread(target: Expr) -> Member {
    Member::Spread(target)
}

pub fn dec(path: &str) -> DecoratorDecl {
    DecoratorDecl {
        path: path.to_string(),
        arguments: Vec::new(),
    }
}

pub fn member(name: &str) -> EnumMemberDecl {
    EnumMemberDecl {
        name: name.to_string(),
        value: None,
        decorators: Vec::new(),
    }
}

/// A reference to a (possibly dotted) name.
pub fn ty(path: &str) -> Expr {
    Expr::Reference {
        path: path.to_string(),
        arguments: Vec::new(),
    }
}

/// A reference with template arguments: `Box<string>`.
pub fn generic(path: &str, arguments: Vec<Expr>) -> Expr {
    Expr::Reference {
        path: path.to_string(),
        arguments,
    }
}

pub fn model_expr(members: Vec<Member>) -> Expr {
    Expr::Model(members)
}

pub fn union(options: Vec<Expr>) -> Expr {
    Expr::Union(options)
}

pub fn intersect(options: Vec<Expr>) -> Expr {
    Expr::Intersection(options)
}

pub fn array(element: Expr) -> Expr {
    Expr::Array(Box::new(element))
}

pub fn tuple(values: Vec<Expr>) -> Expr {
    Expr::Tuple(values)
}

pub fn string_lit(value: &str) -> Expr {
    Expr::String(value.to_string())
}

pub fn number(value: f64) -> Expr {
    Expr::Number(value)
}

pub fn boolean(value: bool) -> Expr {
    Expr::Boolean(value)
}

fn names(params: &[&str]) -> Vec<String> {
    params.iter().map(|p| p.to_string()).collect()
}

impl ModelDecl {
    pub fn template(mut self, params: &[&str]) -> Self {
        self.template_parameters = names(params);
        self
    }

    pub fn extends(mut self, base: Expr) -> Self {
        self.extends = Some(base);
        self
    }

    pub fn is(mut self, source: Expr) -> Self {
        self.is = Some(source);
        self
    }

    pub fn prop(self, name: &str, ty: Expr) -> Self {
        self.property(prop(name, ty))
    }

    pub fn property(mut self, property: PropertyDecl) -> Self {
        self.members.push(Member::Property(property));
        self
    }

    pub fn spread(mut self, target: Expr) -> Self {
        self.members.push(Member::Spread(target));
        self
    }

    pub fn decorate(mut self, decorator: DecoratorDecl) -> Self {
        self.decorators.push(decorator);
        self
    }
}

impl PropertyDecl {
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn default(mut self, value: Expr) -> Self {
        self.default = Some(value);
        self
    }

    pub fn decorate(mut self, decorator: DecoratorDecl) -> Self {
        self.decorators.push(decorator);
        self
    }
}

impl NamespaceDecl {
    pub fn statement(mut self, statement: impl Into<Statement>) -> Self {
        self.statements.push(statement.into());
        self
    }

    pub fn decorate(mut self, decorator: DecoratorDecl) -> Self {
        self.decorators.push(decorator);
        self
    }
}

impl OperationDecl {
    pub fn param(mut self, name: &str, ty: Expr) -> Self {
        self.parameters.push(Member::Property(prop(name, ty)));
        self
    }

    pub fn returns(mut self, ty: Expr) -> Self {
        self.return_type = ty;
        self
    }

    pub fn decorate(mut self, decorator: DecoratorDecl) -> Self {
        self.decorators.push(decorator);
        self
    }
}

impl InterfaceDecl {
    pub fn template(mut self, params: &[&str]) -> Self {
        self.template_parameters = names(params);
        self
    }

    pub fn mixes(mut self, mixin: Expr) -> Self {
        self.mixes.push(mixin);
        self
    }

    pub fn op(mut self, operation: OperationDecl) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn decorate(mut self, decorator: DecoratorDecl) -> Self {
        self.decorators.push(decorator);
        self
    }
}

impl EnumDecl {
    pub fn member(mut self, member: EnumMemberDecl) -> Self {
        self.members.push(member);
        self
    }

    pub fn decorate(mut self, decorator: DecoratorDecl) -> Self {
        self.decorators.push(decorator);
        self
    }
}

impl EnumMemberDecl {
    pub fn value(mut self, value: Expr) -> Self {
        self.value = Some(value);
        self
    }

    pub fn decorate(mut self, decorator: DecoratorDecl) -> Self {
        self.decorators.push(decorator);
        self
    }
}

impl AliasDecl {
    pub fn template(mut self, params: &[&str]) -> Self {
        self.template_parameters = names(params);
        self
    }
}

impl DecoratorDecl {
    pub fn arg(mut self, argument: Expr) -> Self {
        self.arguments.push(argument);
        self
    }
}

impl From<PropertyDecl> for Member {
    fn from(property: PropertyDecl) -> Self {
        Member::Property(property)
    }
}

macro_rules! into_statement {
    ($($decl:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$decl> for Statement {
                fn from(decl: $decl) -> Self {
                    Statement::$variant(decl)
                }
            }
        )*
    };
}

into_statement! {
    ModelDecl => Model,
    NamespaceDecl => Namespace,
    OperationDecl => Operation,
    InterfaceDecl => Interface,
    EnumDecl => Enum,
    AliasDecl => Alias,
}

// ============================================================================
// Lowering
// ============================================================================

impl Ast {
    /// Lower a source file into the arena and return its `SourceFile` node.
    pub fn add_file(&mut self, file_name: &str, statements: Vec<Statement>) -> NodeId {
        let start = self.next_pos();
        let statements = statements
            .into_iter()
            .map(|s| self.lower_statement(s))
            .collect();
        let file = self.alloc(
            start,
            NodeKind::SourceFile(SourceFile {
                file_name: file_name.to_string(),
                statements,
            }),
        );
        self.push_file(file);
        file
    }

    fn lower_statement(&mut self, statement: Statement) -> NodeId {
        match statement {
            Statement::Model(decl) => self.lower_model(decl),
            Statement::Namespace(decl) => self.lower_namespace(decl),
            Statement::Using(path) => {
                let start = self.next_pos();
                let name = self.lower_path(&path);
                self.alloc(start, NodeKind::UsingStatement(UsingStatement { name }))
            }
            Statement::Operation(decl) => self.lower_operation(decl),
            Statement::Interface(decl) => {
                let start = self.next_pos();
                let decorators = self.lower_decorators(decl.decorators);
                let template_parameters = self.lower_template_parameters(&decl.template_parameters);
                let mixes = decl.mixes.into_iter().map(|m| self.lower_expr(m)).collect();
                let operations = decl
                    .operations
                    .into_iter()
                    .map(|o| self.lower_operation(o))
                    .collect();
                let name = self.name(&decl.name);
                self.alloc(
                    start,
                    NodeKind::InterfaceStatement(InterfaceStatement {
                        name,
                        template_parameters,
                        mixes,
                        operations,
                        decorators,
                    }),
                )
            }
            Statement::Enum(decl) => {
                let start = self.next_pos();
                let decorators = self.lower_decorators(decl.decorators);
                let members = decl
                    .members
                    .into_iter()
                    .map(|m| {
                        let start = self.next_pos();
                        let decorators = self.lower_decorators(m.decorators);
                        let value = m.value.map(|v| self.lower_expr(v));
                        let name = self.name(&m.name);
                        self.alloc(
                            start,
                            NodeKind::EnumMember(EnumMember {
                                name,
                                value,
                                decorators,
                            }),
                        )
                    })
                    .collect();
                let name = self.name(&decl.name);
                self.alloc(
                    start,
                    NodeKind::EnumStatement(EnumStatement {
                        name,
                        members,
                        decorators,
                    }),
                )
            }
            Statement::Alias(decl) => {
                let start = self.next_pos();
                let template_parameters = self.lower_template_parameters(&decl.template_parameters);
                let value = self.lower_expr(decl.value);
                let name = self.name(&decl.name);
                self.alloc(
                    start,
                    NodeKind::AliasStatement(AliasStatement {
                        name,
                        template_parameters,
                        value,
                    }),
                )
            }
        }
    }

    fn lower_model(&mut self, decl: ModelDecl) -> NodeId {
        let start = self.next_pos();
        let decorators = self.lower_decorators(decl.decorators);
        let template_parameters = self.lower_template_parameters(&decl.template_parameters);
        let extends = decl.extends.map(|e| self.lower_expr(e));
        let is = decl.is.map(|e| self.lower_expr(e));
        let properties = self.lower_members(decl.members);
        let name = self.name(&decl.name);
        self.alloc(
            start,
            NodeKind::ModelStatement(ModelStatement {
                name,
                template_parameters,
                extends,
                is,
                properties,
                decorators,
            }),
        )
    }

    /// `namespace A.B.C { .. }` lowers to `A { B { C { .. } } }`; statements,
    /// decorators and the blockless flag belong to the innermost namespace.
    fn lower_namespace(&mut self, decl: NamespaceDecl) -> NodeId {
        let start = self.next_pos();
        let mut segments: Vec<&str> = decl.name.split('.').collect();
        let innermost = segments.pop().unwrap_or_default();

        let decorators = self.lower_decorators(decl.decorators);
        let statements = decl
            .statements
            .into_iter()
            .map(|s| self.lower_statement(s))
            .collect();
        let name = self.name(innermost);
        let mut current = self.alloc(
            start,
            NodeKind::NamespaceStatement(NamespaceStatement {
                name,
                statements,
                blockless: decl.blockless,
                decorators,
            }),
        );
        for segment in segments.into_iter().rev() {
            let name = self.name(segment);
            current = self.alloc(
                start,
                NodeKind::NamespaceStatement(NamespaceStatement {
                    name,
                    statements: vec![current],
                    blockless: false,
                    decorators: Vec::new(),
                }),
            );
        }
        current
    }

    fn lower_operation(&mut self, decl: OperationDecl) -> NodeId {
        let start = self.next_pos();
        let decorators = self.lower_decorators(decl.decorators);
        let parameters = self.lower_expr(Expr::Model(decl.parameters));
        let return_type = self.lower_expr(decl.return_type);
        let name = self.name(&decl.name);
        self.alloc(
            start,
            NodeKind::OperationStatement(OperationStatement {
                name,
                parameters,
                return_type,
                decorators,
            }),
        )
    }

    fn lower_members(&mut self, members: Vec<Member>) -> Vec<NodeId> {
        members
            .into_iter()
            .map(|m| {
                let start = self.next_pos();
                match m {
                    Member::Property(p) => {
                        let decorators = self.lower_decorators(p.decorators);
                        let value = self.lower_expr(p.ty);
                        let default = p.default.map(|d| self.lower_expr(d));
                        let name = self.name(&p.name);
                        self.alloc(
                            start,
                            NodeKind::ModelProperty(ModelProperty {
                                name,
                                optional: p.optional,
                                value,
                                default,
                                decorators,
                            }),
                        )
                    }
                    Member::Spread(target) => {
                        let target = self.lower_expr(target);
                        self.alloc(start, NodeKind::ModelSpreadProperty(ModelSpreadProperty { target }))
                    }
                }
            })
            .collect()
    }

    fn lower_template_parameters(&mut self, params: &[String]) -> Vec<NodeId> {
        params
            .iter()
            .map(|p| {
                let start = self.next_pos();
                let name = self.name(p);
                self.alloc(
                    start,
                    NodeKind::TemplateParameterDeclaration(TemplateParameterDeclaration { name }),
                )
            })
            .collect()
    }

    fn lower_decorators(&mut self, decorators: Vec<DecoratorDecl>) -> Vec<NodeId> {
        decorators
            .into_iter()
            .map(|d| {
                let start = self.next_pos();
                let target = self.lower_path(&d.path);
                let arguments = d.arguments.into_iter().map(|a| self.lower_expr(a)).collect();
                self.alloc(
                    start,
                    NodeKind::DecoratorExpression(DecoratorExpression { target, arguments }),
                )
            })
            .collect()
    }

    /// `A.B.C` lowers to `Member(Member(Ident(A), B), C)`.
    fn lower_path(&mut self, path: &str) -> NodeId {
        let start = self.next_pos();
        let mut segments = path.split('.');
        let first = segments.next().unwrap_or_default();
        let name = self.name(first);
        let mut current = self.alloc(start, NodeKind::Identifier(Identifier { name }));
        for segment in segments {
            let member = self.name(segment);
            current = self.alloc(
                start,
                NodeKind::MemberExpression(MemberExpression {
                    base: current,
                    member,
                }),
            );
        }
        current
    }

    fn lower_expr(&mut self, expr: Expr) -> NodeId {
        let start = self.next_pos();
        let kind = match expr {
            Expr::Reference { path, arguments } => {
                let target = self.lower_path(&path);
                let arguments = arguments.into_iter().map(|a| self.lower_expr(a)).collect();
                NodeKind::TypeReference(TypeReference { target, arguments })
            }
            Expr::Model(members) => NodeKind::ModelExpression(ModelExpression {
                properties: self.lower_members(members),
            }),
            Expr::Union(options) => NodeKind::UnionExpression(UnionExpression {
                options: options.into_iter().map(|o| self.lower_expr(o)).collect(),
            }),
            Expr::Intersection(options) => NodeKind::IntersectionExpression(IntersectionExpression {
                options: options.into_iter().map(|o| self.lower_expr(o)).collect(),
            }),
            Expr::Array(element) => NodeKind::ArrayExpression(ArrayExpression {
                element_type: self.lower_expr(*element),
            }),
            Expr::Tuple(values) => NodeKind::TupleExpression(TupleExpression {
                values: values.into_iter().map(|v| self.lower_expr(v)).collect(),
            }),
            Expr::String(value) => NodeKind::StringLiteral(StringLiteral { value }),
            Expr::Number(value) => NodeKind::NumericLiteral(NumericLiteral { value }),
            Expr::Boolean(value) => NodeKind::BooleanLiteral(BooleanLiteral { value }),
        };
        self.alloc(start, kind)
    }
}
