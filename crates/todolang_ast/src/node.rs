//! AST node definitions for TodoLang.
//!
//! Nodes live in a `bumpalo::Bump` arena owned by the caller and reference
//! their children through arena references. The tree is strict: every node
//! is reachable from exactly one parent, and the root `Program` is handed
//! back to whoever drove the parse.

use crate::syntax_kind::SyntaxKind;
use crate::types::*;
use serde::Serialize;
use todolang_core::text::{Location, TextSpan};

// ============================================================================
// Core Node Wrapper
// ============================================================================

/// Common data shared by all AST nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeData {
    /// The kind of this node.
    pub kind: SyntaxKind,
    /// Location of the first token of this node.
    pub location: Location,
    /// Byte span from the first to the last token of this node.
    pub span: TextSpan,
}

impl NodeData {
    pub fn new(kind: SyntaxKind, location: Location, span: TextSpan) -> Self {
        Self {
            kind,
            location,
            span,
        }
    }
}

/// A list of nodes, allocated in the arena.
pub type NodeList<'a, T> = &'a [T];

/// An optional arena-allocated node.
pub type OptionalNode<'a, T> = Option<&'a T>;

// ============================================================================
// Program and declarations
// ============================================================================

/// The root of a parsed file.
#[derive(Debug, PartialEq, Serialize)]
pub struct Program<'a> {
    pub data: NodeData,
    pub declarations: NodeList<'a, Declaration<'a>>,
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Declaration<'a> {
    Component(ComponentDeclaration<'a>),
    Model(ModelDeclaration<'a>),
    Service(ServiceDeclaration<'a>),
}

#[derive(Debug, PartialEq, Serialize)]
pub struct ComponentDeclaration<'a> {
    pub data: NodeData,
    pub name: Identifier<'a>,
    pub state: OptionalNode<'a, StateBlock<'a>>,
    pub methods: NodeList<'a, MethodDeclaration<'a>>,
    pub computed: NodeList<'a, ComputedDeclaration<'a>>,
    pub render: OptionalNode<'a, RenderBlock<'a>>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct ModelDeclaration<'a> {
    pub data: NodeData,
    pub name: Identifier<'a>,
    pub properties: NodeList<'a, PropertyDeclaration<'a>>,
    pub methods: NodeList<'a, MethodDeclaration<'a>>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct ServiceDeclaration<'a> {
    pub data: NodeData,
    pub name: Identifier<'a>,
    pub methods: NodeList<'a, MethodDeclaration<'a>>,
}

// ============================================================================
// Members
// ============================================================================

/// `state { ... }` inside a component.
#[derive(Debug, PartialEq, Serialize)]
pub struct StateBlock<'a> {
    pub data: NodeData,
    pub properties: NodeList<'a, PropertyDeclaration<'a>>,
}

/// `name: Type [= default]`, used by state blocks and models.
#[derive(Debug, PartialEq, Serialize)]
pub struct PropertyDeclaration<'a> {
    pub data: NodeData,
    pub name: Identifier<'a>,
    pub type_annotation: TypeNode<'a>,
    pub default_value: OptionalNode<'a, Expression<'a>>,
}

/// A type annotation such as `string`, `Todo[]` or `User?`.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct TypeNode<'a> {
    pub data: NodeData,
    pub name: &'a str,
    pub is_array: bool,
    pub is_optional: bool,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct MethodDeclaration<'a> {
    pub data: NodeData,
    pub modifiers: ModifierFlags,
    pub name: Identifier<'a>,
    pub parameters: NodeList<'a, Parameter<'a>>,
    pub return_type: Option<TypeNode<'a>>,
    pub body: NodeList<'a, Statement<'a>>,
}

impl MethodDeclaration<'_> {
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(ModifierFlags::STATIC)
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct Parameter<'a> {
    pub data: NodeData,
    pub name: Identifier<'a>,
    pub type_annotation: Option<TypeNode<'a>>,
}

/// `computed name [()] [: Type] { ... }` inside a component.
#[derive(Debug, PartialEq, Serialize)]
pub struct ComputedDeclaration<'a> {
    pub data: NodeData,
    pub name: Identifier<'a>,
    pub return_type: Option<TypeNode<'a>>,
    pub body: NodeList<'a, Statement<'a>>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct RenderBlock<'a> {
    pub data: NodeData,
    pub body: NodeList<'a, Statement<'a>>,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Statement<'a> {
    Block(Block<'a>),
    ExpressionStatement(ExpressionStatement<'a>),
    IfStatement(IfStatement<'a>),
    ForStatement(ForStatement<'a>),
    WhileStatement(WhileStatement<'a>),
    ReturnStatement(ReturnStatement<'a>),
}

#[derive(Debug, PartialEq, Serialize)]
pub struct Block<'a> {
    pub data: NodeData,
    pub statements: NodeList<'a, Statement<'a>>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct ExpressionStatement<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct IfStatement<'a> {
    pub data: NodeData,
    pub condition: &'a Expression<'a>,
    pub then_statement: &'a Statement<'a>,
    pub else_statement: OptionalNode<'a, Statement<'a>>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct ForStatement<'a> {
    pub data: NodeData,
    pub initializer: OptionalNode<'a, Expression<'a>>,
    pub condition: OptionalNode<'a, Expression<'a>>,
    pub update: OptionalNode<'a, Expression<'a>>,
    pub body: &'a Statement<'a>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct WhileStatement<'a> {
    pub data: NodeData,
    pub condition: &'a Expression<'a>,
    pub body: &'a Statement<'a>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct ReturnStatement<'a> {
    pub data: NodeData,
    pub expression: OptionalNode<'a, Expression<'a>>,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Expression<'a> {
    Identifier(Identifier<'a>),
    StringLiteral(StringLiteral<'a>),
    NumericLiteral(NumericLiteral<'a>),
    BooleanLiteral(BooleanLiteral),
    NullLiteral(NodeData),
    This(NodeData),
    ArrayLiteral(ArrayLiteralExpression<'a>),
    ObjectLiteral(ObjectLiteralExpression<'a>),
    Member(MemberExpression<'a>),
    Call(CallExpression<'a>),
    Unary(UnaryExpression<'a>),
    Binary(BinaryExpression<'a>),
    Conditional(ConditionalExpression<'a>),
    Assignment(AssignmentExpression<'a>),
    Markup(MarkupElement<'a>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Identifier<'a> {
    pub data: NodeData,
    pub name: &'a str,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct StringLiteral<'a> {
    pub data: NodeData,
    /// Decoded contents, without quotes.
    pub value: &'a str,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct NumericLiteral<'a> {
    pub data: NodeData,
    /// The source lexeme, e.g. `3.50`.
    pub text: &'a str,
    pub value: f64,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct BooleanLiteral {
    pub data: NodeData,
    pub value: bool,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct ArrayLiteralExpression<'a> {
    pub data: NodeData,
    pub elements: NodeList<'a, Expression<'a>>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct ObjectLiteralExpression<'a> {
    pub data: NodeData,
    pub properties: NodeList<'a, ObjectProperty<'a>>,
}

/// `key: value`, `"key": value` or shorthand `key`.
#[derive(Debug, PartialEq, Serialize)]
pub struct ObjectProperty<'a> {
    pub data: NodeData,
    pub key: &'a str,
    pub value: &'a Expression<'a>,
    pub shorthand: bool,
}

/// `object.property` or `object[property]`.
#[derive(Debug, PartialEq, Serialize)]
pub struct MemberExpression<'a> {
    pub data: NodeData,
    pub object: &'a Expression<'a>,
    /// An `Identifier` for dot access, any expression for bracket access.
    pub property: &'a Expression<'a>,
    pub computed: bool,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct CallExpression<'a> {
    pub data: NodeData,
    pub callee: &'a Expression<'a>,
    pub arguments: NodeList<'a, Expression<'a>>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct UnaryExpression<'a> {
    pub data: NodeData,
    pub operator: UnaryOperator,
    pub operand: &'a Expression<'a>,
    pub is_prefix: bool,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct BinaryExpression<'a> {
    pub data: NodeData,
    pub left: &'a Expression<'a>,
    pub operator: BinaryOperator,
    pub right: &'a Expression<'a>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct ConditionalExpression<'a> {
    pub data: NodeData,
    pub condition: &'a Expression<'a>,
    pub true_expr: &'a Expression<'a>,
    pub false_expr: &'a Expression<'a>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct AssignmentExpression<'a> {
    pub data: NodeData,
    pub target: &'a Expression<'a>,
    pub operator: AssignmentOperator,
    pub right: &'a Expression<'a>,
}

// ============================================================================
// Markup
// ============================================================================

/// `<tag attr=...>children</tag>` or `<tag attr=... />`.
#[derive(Debug, PartialEq, Serialize)]
pub struct MarkupElement<'a> {
    pub data: NodeData,
    pub tag_name: &'a str,
    pub attributes: NodeList<'a, MarkupAttribute<'a>>,
    pub children: NodeList<'a, MarkupChild<'a>>,
    pub self_closing: bool,
}

/// A bare attribute has no value.
#[derive(Debug, PartialEq, Serialize)]
pub struct MarkupAttribute<'a> {
    pub data: NodeData,
    pub name: &'a str,
    pub value: OptionalNode<'a, Expression<'a>>,
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum MarkupChild<'a> {
    Text(MarkupText<'a>),
    Expression(MarkupExpression<'a>),
    Element(MarkupElement<'a>),
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct MarkupText<'a> {
    pub data: NodeData,
    pub text: &'a str,
}

/// A `{expression}` splice among markup children.
#[derive(Debug, PartialEq, Serialize)]
pub struct MarkupExpression<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
}
