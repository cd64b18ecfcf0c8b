//! Parser utility functions.

use todolang_ast::syntax_kind::SyntaxKind;

/// Check if a token kind can only begin a top-level declaration.
pub fn is_declaration_start(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::ComponentKeyword | SyntaxKind::ModelKeyword | SyntaxKind::ServiceKeyword
    )
}

/// Change in brace nesting caused by a token.
pub fn brace_delta(kind: SyntaxKind) -> i32 {
    match kind {
        SyntaxKind::OpenBraceToken => 1,
        SyntaxKind::CloseBraceToken => -1,
        _ => 0,
    }
}

/// Check if a token kind may be used as a name where reserved words are
/// allowed: member names after `.`, object keys and markup attribute names.
pub fn is_identifier_or_keyword(kind: SyntaxKind) -> bool {
    kind == SyntaxKind::Identifier || kind.is_keyword()
}

/// Check if a token kind ends a `return` statement with no expression.
pub fn ends_return_statement(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::SemicolonToken | SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
    )
}

/// Check if a token kind ends a run of markup text.
pub fn ends_markup_text(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::LessThanToken
            | SyntaxKind::LessThanSlashToken
            | SyntaxKind::OpenBraceToken
            | SyntaxKind::EndOfFileToken
    )
}
