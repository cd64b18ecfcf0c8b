//! Lexer integration tests.
//!
//! Verifies that the lexer correctly tokenizes TodoLang constructs.

use todolang_ast::syntax_kind::SyntaxKind;
use todolang_core::text::{Location, TextSpan};
use todolang_diagnostics::LexErrorKind;
use todolang_lexer::{tokenize, Lexer, Token};

/// Helper: tokenize and return (kind, value) pairs, EOF included.
fn lex_all(source: &str) -> Vec<(SyntaxKind, String)> {
    tokenize(source)
        .expect("source should tokenize")
        .into_iter()
        .map(|t| (t.kind, t.value))
        .collect()
}

/// Helper: token kinds only.
fn lex_kinds(source: &str) -> Vec<SyntaxKind> {
    lex_all(source).into_iter().map(|(k, _)| k).collect()
}

fn lex_tokens(source: &str) -> Vec<Token> {
    tokenize(source).expect("source should tokenize")
}

// ============================================================================
// Empty input and whitespace
// ============================================================================

#[test]
fn test_empty_source() {
    let tokens = lex_tokens("");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, SyntaxKind::EndOfFileToken);
    assert_eq!(tokens[0].value, "");
    assert_eq!(tokens[0].location, Location::new(1, 1));
}

#[test]
fn test_whitespace_only() {
    assert_eq!(lex_kinds("   \t\n  "), vec![SyntaxKind::EndOfFileToken]);
}

#[test]
fn test_exactly_one_eof() {
    let tokens = lex_tokens("component App { }");
    let eofs = tokens.iter().filter(|t| t.is_eof()).count();
    assert_eq!(eofs, 1);
    assert!(tokens.last().map_or(false, Token::is_eof));
}

// ============================================================================
// Keywords and identifiers
// ============================================================================

#[test]
fn test_all_keywords() {
    let source = "component state render computed model service static if else for while return this true false null";
    let kinds = lex_kinds(source);
    let mut expected = SyntaxKind::KEYWORDS.to_vec();
    expected.push(SyntaxKind::EndOfFileToken);
    assert_eq!(kinds, expected);
}

#[test]
fn test_keywords_are_case_sensitive() {
    assert_eq!(
        lex_all("Component componentName"),
        vec![
            (SyntaxKind::Identifier, "Component".to_string()),
            (SyntaxKind::Identifier, "componentName".to_string()),
            (SyntaxKind::EndOfFileToken, String::new()),
        ]
    );
}

#[test]
fn test_identifier_characters() {
    assert_eq!(
        lex_all("_private $store todo2 café"),
        vec![
            (SyntaxKind::Identifier, "_private".to_string()),
            (SyntaxKind::Identifier, "$store".to_string()),
            (SyntaxKind::Identifier, "todo2".to_string()),
            (SyntaxKind::Identifier, "café".to_string()),
            (SyntaxKind::EndOfFileToken, String::new()),
        ]
    );
}

// ============================================================================
// Numbers
// ============================================================================

#[test]
fn test_numeric_literals() {
    assert_eq!(
        lex_all("42 0 123"),
        vec![
            (SyntaxKind::NumericLiteral, "42".to_string()),
            (SyntaxKind::NumericLiteral, "0".to_string()),
            (SyntaxKind::NumericLiteral, "123".to_string()),
            (SyntaxKind::EndOfFileToken, String::new()),
        ]
    );
}

#[test]
fn test_number_then_identifier() {
    assert_eq!(
        lex_all("123abc"),
        vec![
            (SyntaxKind::NumericLiteral, "123".to_string()),
            (SyntaxKind::Identifier, "abc".to_string()),
            (SyntaxKind::EndOfFileToken, String::new()),
        ]
    );
}

#[test]
fn test_decimal_numbers() {
    assert_eq!(
        lex_all("3.14 10."),
        vec![
            (SyntaxKind::NumericLiteral, "3.14".to_string()),
            (SyntaxKind::NumericLiteral, "10".to_string()),
            (SyntaxKind::DotToken, ".".to_string()),
            (SyntaxKind::EndOfFileToken, String::new()),
        ]
    );
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_string_escapes() {
    let tokens = lex_tokens(r#""hello\nworld\t\"test\"""#);
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].kind, SyntaxKind::StringLiteral);
    assert_eq!(tokens[0].value, "hello\nworld\t\"test\"");
}

#[test]
fn test_single_quoted_string() {
    let tokens = lex_tokens(r#"'it\'s' "a\\b""#);
    assert_eq!(tokens[0].value, "it's");
    assert_eq!(tokens[1].value, "a\\b");
}

#[test]
fn test_multiline_string_advances_line() {
    let tokens = lex_tokens("\"one\ntwo\" next");
    assert_eq!(tokens[0].value, "one\ntwo");
    assert_eq!(tokens[1].location, Location::new(2, 6));
}

#[test]
fn test_unterminated_string() {
    let err = tokenize("\"unterminated").unwrap_err();
    assert_eq!(err.kind, LexErrorKind::UnterminatedString);
    assert_eq!(err.location, Location::new(1, 1));
    assert!(err.to_string().contains("unterminated string literal"));
}

#[test]
fn test_unterminated_string_location_points_at_quote() {
    let err = tokenize("x = \n  'abc").unwrap_err();
    assert_eq!(err.location, Location::new(2, 3));
    assert_eq!(err.span, TextSpan::new(7, 1));
}

#[test]
fn test_unknown_escape_warns_but_succeeds() {
    let mut lexer = Lexer::new(r#""\d""#);
    let tokens = lexer.tokenize().expect("tokenize");
    assert_eq!(tokens[0].value, "d");
    assert_eq!(lexer.diagnostics().warning_count(), 1);
}

// ============================================================================
// Comments
// ============================================================================

#[test]
fn test_comments_are_trivia_tokens() {
    assert_eq!(
        lex_all("a // line\n/* block\ncomment */ b"),
        vec![
            (SyntaxKind::Identifier, "a".to_string()),
            (SyntaxKind::CommentTrivia, "// line".to_string()),
            (SyntaxKind::CommentTrivia, "/* block\ncomment */".to_string()),
            (SyntaxKind::Identifier, "b".to_string()),
            (SyntaxKind::EndOfFileToken, String::new()),
        ]
    );
}

#[test]
fn test_block_comment_updates_line() {
    let tokens = lex_tokens("/* a\nb\n*/ x");
    assert_eq!(tokens[1].value, "x");
    assert_eq!(tokens[1].line(), 3);
    assert_eq!(tokens[1].column(), 4);
}

#[test]
fn test_unterminated_block_comment() {
    let err = tokenize("a /* never closed").unwrap_err();
    assert_eq!(err.kind, LexErrorKind::UnterminatedComment);
    assert_eq!(err.location, Location::new(1, 3));
    assert!(err.message().contains("unterminated block comment"));
}

// ============================================================================
// Operators and errors
// ============================================================================

#[test]
fn test_markup_tokens() {
    assert_eq!(
        lex_kinds("<div class=\"x\">{count}</div>"),
        vec![
            SyntaxKind::LessThanToken,
            SyntaxKind::Identifier,
            SyntaxKind::Identifier,
            SyntaxKind::EqualsToken,
            SyntaxKind::StringLiteral,
            SyntaxKind::GreaterThanToken,
            SyntaxKind::OpenBraceToken,
            SyntaxKind::Identifier,
            SyntaxKind::CloseBraceToken,
            SyntaxKind::LessThanSlashToken,
            SyntaxKind::Identifier,
            SyntaxKind::GreaterThanToken,
            SyntaxKind::EndOfFileToken,
        ]
    );
}

#[test]
fn test_unexpected_character() {
    let err = tokenize("valid @ invalid").unwrap_err();
    assert_eq!(err.kind, LexErrorKind::UnexpectedCharacter('@'));
    assert_eq!(err.location, Location::new(1, 7));
    assert!(err.to_string().contains("unexpected character"));
}

#[test]
fn test_lone_bar_is_unexpected() {
    let err = tokenize("a | b").unwrap_err();
    assert_eq!(err.kind, LexErrorKind::UnexpectedCharacter('|'));
}

// ============================================================================
// Positions
// ============================================================================

#[test]
fn test_line_numbers() {
    let tokens = lex_tokens("a\nb\n\nc");
    let lines: Vec<u32> = tokens.iter().map(Token::line).collect();
    assert_eq!(lines, vec![1, 2, 4, 4]);
    assert_eq!(tokens[3].column(), 2);
}

#[test]
fn test_columns_count_characters_and_spans_count_bytes() {
    let tokens = lex_tokens("héllo x");
    assert_eq!(tokens[1].value, "x");
    assert_eq!(tokens[1].location, Location::new(1, 7));
    assert_eq!(tokens[1].span, TextSpan::new(7, 1));
}

#[test]
fn test_tokenize_is_deterministic() {
    let source = "component Counter { state { count: number = 0 } render { <p>{count}</p> } }";
    assert_eq!(lex_tokens(source), lex_tokens(source));
}
