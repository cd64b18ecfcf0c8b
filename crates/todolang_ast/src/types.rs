//! Flag types and operator enums for the AST.

use crate::syntax_kind::SyntaxKind;
use serde::Serialize;
use std::fmt;

bitflags::bitflags! {
    /// Modifier flags for method declarations.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    pub struct ModifierFlags: u8 {
        const NONE   = 0;
        const STATIC = 1 << 0;
    }
}

impl Default for ModifierFlags {
    fn default() -> Self {
        ModifierFlags::NONE
    }
}

impl ModifierFlags {
    /// Map a modifier keyword to its flag.
    pub fn from_keyword(kind: SyntaxKind) -> Option<ModifierFlags> {
        match kind {
            SyntaxKind::StaticKeyword => Some(ModifierFlags::STATIC),
            _ => None,
        }
    }
}

// ============================================================================
// Operators
// ============================================================================

/// `=`, `+=`, `-=`, `*=`, `/=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AssignmentOperator {
    Assign,
    AddAssign,
    SubtractAssign,
    MultiplyAssign,
    DivideAssign,
}

impl AssignmentOperator {
    pub fn from_token(kind: SyntaxKind) -> Option<Self> {
        match kind {
            SyntaxKind::EqualsToken => Some(Self::Assign),
            SyntaxKind::PlusEqualsToken => Some(Self::AddAssign),
            SyntaxKind::MinusEqualsToken => Some(Self::SubtractAssign),
            SyntaxKind::AsteriskEqualsToken => Some(Self::MultiplyAssign),
            SyntaxKind::SlashEqualsToken => Some(Self::DivideAssign),
            _ => None,
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::AddAssign => "+=",
            Self::SubtractAssign => "-=",
            Self::MultiplyAssign => "*=",
            Self::DivideAssign => "/=",
        }
    }
}

/// Infix operators handled by precedence climbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOperator {
    LogicalOr,
    LogicalAnd,
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
}

impl BinaryOperator {
    pub fn from_token(kind: SyntaxKind) -> Option<Self> {
        match kind {
            SyntaxKind::BarBarToken => Some(Self::LogicalOr),
            SyntaxKind::AmpersandAmpersandToken => Some(Self::LogicalAnd),
            SyntaxKind::EqualsEqualsToken => Some(Self::Equal),
            SyntaxKind::ExclamationEqualsToken => Some(Self::NotEqual),
            SyntaxKind::LessThanToken => Some(Self::LessThan),
            SyntaxKind::GreaterThanToken => Some(Self::GreaterThan),
            SyntaxKind::LessThanEqualsToken => Some(Self::LessThanOrEqual),
            SyntaxKind::GreaterThanEqualsToken => Some(Self::GreaterThanOrEqual),
            SyntaxKind::PlusToken => Some(Self::Add),
            SyntaxKind::MinusToken => Some(Self::Subtract),
            SyntaxKind::AsteriskToken => Some(Self::Multiply),
            SyntaxKind::SlashToken => Some(Self::Divide),
            SyntaxKind::PercentToken => Some(Self::Remainder),
            _ => None,
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Self::LogicalOr => "||",
            Self::LogicalAnd => "&&",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::GreaterThan => ">",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThanOrEqual => ">=",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Remainder => "%",
        }
    }
}

/// Prefix and postfix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOperator {
    Not,
    Negate,
    Increment,
    Decrement,
}

impl UnaryOperator {
    pub fn from_token(kind: SyntaxKind) -> Option<Self> {
        match kind {
            SyntaxKind::ExclamationToken => Some(Self::Not),
            SyntaxKind::MinusToken => Some(Self::Negate),
            SyntaxKind::PlusPlusToken => Some(Self::Increment),
            SyntaxKind::MinusMinusToken => Some(Self::Decrement),
            _ => None,
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Self::Not => "!",
            Self::Negate => "-",
            Self::Increment => "++",
            Self::Decrement => "--",
        }
    }

    /// Whether the operator may also appear after its operand.
    pub fn is_update(self) -> bool {
        matches!(self, Self::Increment | Self::Decrement)
    }
}

impl fmt::Display for AssignmentOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
