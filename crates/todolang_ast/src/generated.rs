//! Accessors shared by the AST's tagged unions.
//!
//! Node kind checks and `NodeData` lookups for every variant live here so the
//! node definitions in `node.rs` stay declarative.

use crate::node::*;
use crate::syntax_kind::SyntaxKind;
use todolang_core::text::{Location, TextSpan};

impl<'a> Declaration<'a> {
    pub fn data(&self) -> &NodeData {
        match self {
            Declaration::Component(n) => &n.data,
            Declaration::Model(n) => &n.data,
            Declaration::Service(n) => &n.data,
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.data().kind
    }

    pub fn name(&self) -> &Identifier<'a> {
        match self {
            Declaration::Component(n) => &n.name,
            Declaration::Model(n) => &n.name,
            Declaration::Service(n) => &n.name,
        }
    }

    pub fn as_component(&self) -> Option<&ComponentDeclaration<'a>> {
        match self {
            Declaration::Component(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_model(&self) -> Option<&ModelDeclaration<'a>> {
        match self {
            Declaration::Model(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_service(&self) -> Option<&ServiceDeclaration<'a>> {
        match self {
            Declaration::Service(n) => Some(n),
            _ => None,
        }
    }
}

impl<'a> Statement<'a> {
    pub fn data(&self) -> &NodeData {
        match self {
            Statement::Block(n) => &n.data,
            Statement::ExpressionStatement(n) => &n.data,
            Statement::IfStatement(n) => &n.data,
            Statement::ForStatement(n) => &n.data,
            Statement::WhileStatement(n) => &n.data,
            Statement::ReturnStatement(n) => &n.data,
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.data().kind
    }

    pub fn location(&self) -> Location {
        self.data().location
    }

    pub fn span(&self) -> TextSpan {
        self.data().span
    }
}

impl<'a> Expression<'a> {
    pub fn data(&self) -> &NodeData {
        match self {
            Expression::Identifier(n) => &n.data,
            Expression::StringLiteral(n) => &n.data,
            Expression::NumericLiteral(n) => &n.data,
            Expression::BooleanLiteral(n) => &n.data,
            Expression::NullLiteral(d) => d,
            Expression::This(d) => d,
            Expression::ArrayLiteral(n) => &n.data,
            Expression::ObjectLiteral(n) => &n.data,
            Expression::Member(n) => &n.data,
            Expression::Call(n) => &n.data,
            Expression::Unary(n) => &n.data,
            Expression::Binary(n) => &n.data,
            Expression::Conditional(n) => &n.data,
            Expression::Assignment(n) => &n.data,
            Expression::Markup(n) => &n.data,
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.data().kind
    }

    pub fn location(&self) -> Location {
        self.data().location
    }

    pub fn span(&self) -> TextSpan {
        self.data().span
    }

    /// Whether this expression may appear on the left of an assignment.
    pub fn is_assignment_target(&self) -> bool {
        matches!(self, Expression::Identifier(_) | Expression::Member(_))
    }

    pub fn as_identifier(&self) -> Option<&Identifier<'a>> {
        match self {
            Expression::Identifier(n) => Some(n),
            _ => None,
        }
    }
}

impl<'a> MarkupChild<'a> {
    pub fn data(&self) -> &NodeData {
        match self {
            MarkupChild::Text(n) => &n.data,
            MarkupChild::Expression(n) => &n.data,
            MarkupChild::Element(n) => &n.data,
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.data().kind
    }
}

impl<'a> ComponentDeclaration<'a> {
    /// Look up a method by name.
    pub fn method(&self, name: &str) -> Option<&MethodDeclaration<'a>> {
        self.methods.iter().find(|m| m.name.name == name)
    }
}

impl<'a> ModelDeclaration<'a> {
    pub fn property(&self, name: &str) -> Option<&PropertyDeclaration<'a>> {
        self.properties.iter().find(|p| p.name.name == name)
    }
}
