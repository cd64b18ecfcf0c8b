//! Operator precedence for binary operators.

use todolang_ast::syntax_kind::SyntaxKind;

/// Operator precedence levels, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum OperatorPrecedence {
    /// Floor for the operands of `?:`; no binary operator has it.
    Conditional = 0,
    LogicalOr = 1,
    LogicalAnd = 2,
    Equality = 3,
    Relational = 4,
    Additive = 5,
    Multiplicative = 6,
    Invalid = 255,
}

/// Get the binary operator precedence for a given token kind.
pub fn get_binary_operator_precedence(kind: SyntaxKind) -> OperatorPrecedence {
    match kind {
        SyntaxKind::BarBarToken => OperatorPrecedence::LogicalOr,
        SyntaxKind::AmpersandAmpersandToken => OperatorPrecedence::LogicalAnd,
        SyntaxKind::EqualsEqualsToken | SyntaxKind::ExclamationEqualsToken => {
            OperatorPrecedence::Equality
        }
        SyntaxKind::LessThanToken
        | SyntaxKind::GreaterThanToken
        | SyntaxKind::LessThanEqualsToken
        | SyntaxKind::GreaterThanEqualsToken => OperatorPrecedence::Relational,
        SyntaxKind::PlusToken | SyntaxKind::MinusToken => OperatorPrecedence::Additive,
        SyntaxKind::AsteriskToken | SyntaxKind::SlashToken | SyntaxKind::PercentToken => {
            OperatorPrecedence::Multiplicative
        }
        _ => OperatorPrecedence::Invalid,
    }
}
