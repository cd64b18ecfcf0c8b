//! SyntaxKind enum - all token and node kinds in the TodoLang syntax tree.

use serde::Serialize;

/// The kind of a syntax token or node in the AST.
///
/// Token kinds come first; keywords are contiguous so `is_keyword` is a
/// discriminant range check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[repr(u16)]
pub enum SyntaxKind {
    // ========================================================================
    // Tokens
    // ========================================================================
    EndOfFileToken = 1,

    // Trivia
    CommentTrivia = 2,

    // Literals
    NumericLiteral = 3,
    StringLiteral = 4,

    // Punctuation
    OpenBraceToken = 5,
    CloseBraceToken = 6,
    OpenParenToken = 7,
    CloseParenToken = 8,
    OpenBracketToken = 9,
    CloseBracketToken = 10,
    DotToken = 11,
    SemicolonToken = 12,
    CommaToken = 13,
    ColonToken = 14,
    QuestionToken = 15,
    LessThanToken = 16,
    LessThanSlashToken = 17,
    SlashGreaterThanToken = 18,
    GreaterThanToken = 19,
    LessThanEqualsToken = 20,
    GreaterThanEqualsToken = 21,
    EqualsEqualsToken = 22,
    ExclamationEqualsToken = 23,
    PlusToken = 24,
    MinusToken = 25,
    AsteriskToken = 26,
    SlashToken = 27,
    PercentToken = 28,
    PlusPlusToken = 29,
    MinusMinusToken = 30,
    ExclamationToken = 31,
    AmpersandAmpersandToken = 32,
    BarBarToken = 33,

    // Assignment
    EqualsToken = 34,
    PlusEqualsToken = 35,
    MinusEqualsToken = 36,
    AsteriskEqualsToken = 37,
    SlashEqualsToken = 38,

    // Identifiers
    Identifier = 39,

    // Reserved words
    ComponentKeyword = 40,
    StateKeyword = 41,
    RenderKeyword = 42,
    ComputedKeyword = 43,
    ModelKeyword = 44,
    ServiceKeyword = 45,
    StaticKeyword = 46,
    IfKeyword = 47,
    ElseKeyword = 48,
    ForKeyword = 49,
    WhileKeyword = 50,
    ReturnKeyword = 51,
    ThisKeyword = 52,
    TrueKeyword = 53,
    FalseKeyword = 54,
    NullKeyword = 55,

    // ========================================================================
    // Nodes
    // ========================================================================

    // Top level
    Program = 100,
    ComponentDeclaration = 101,
    ModelDeclaration = 102,
    ServiceDeclaration = 103,

    // Members
    StateBlock = 110,
    PropertyDeclaration = 111,
    MethodDeclaration = 112,
    Parameter = 113,
    ComputedDeclaration = 114,
    RenderBlock = 115,
    TypeReference = 116,

    // Statements
    Block = 120,
    ExpressionStatement = 121,
    IfStatement = 122,
    ForStatement = 123,
    WhileStatement = 124,
    ReturnStatement = 125,

    // Expressions
    ArrayLiteralExpression = 130,
    ObjectLiteralExpression = 131,
    PropertyAssignment = 132,
    MemberExpression = 133,
    CallExpression = 134,
    PrefixUnaryExpression = 135,
    PostfixUnaryExpression = 136,
    BinaryExpression = 137,
    ConditionalExpression = 138,
    AssignmentExpression = 139,

    // Markup
    MarkupElement = 150,
    MarkupSelfClosingElement = 151,
    MarkupAttribute = 152,
    MarkupText = 153,
    MarkupExpression = 154,
}

impl SyntaxKind {
    pub const FIRST_KEYWORD: SyntaxKind = SyntaxKind::ComponentKeyword;
    pub const LAST_KEYWORD: SyntaxKind = SyntaxKind::NullKeyword;

    /// Every reserved word, in declaration order.
    pub const KEYWORDS: [SyntaxKind; 16] = [
        SyntaxKind::ComponentKeyword,
        SyntaxKind::StateKeyword,
        SyntaxKind::RenderKeyword,
        SyntaxKind::ComputedKeyword,
        SyntaxKind::ModelKeyword,
        SyntaxKind::ServiceKeyword,
        SyntaxKind::StaticKeyword,
        SyntaxKind::IfKeyword,
        SyntaxKind::ElseKeyword,
        SyntaxKind::ForKeyword,
        SyntaxKind::WhileKeyword,
        SyntaxKind::ReturnKeyword,
        SyntaxKind::ThisKeyword,
        SyntaxKind::TrueKeyword,
        SyntaxKind::FalseKeyword,
        SyntaxKind::NullKeyword,
    ];
}

impl SyntaxKind {
    /// Whether this kind represents a keyword.
    #[inline]
    pub fn is_keyword(self) -> bool {
        let v = self as u16;
        v >= SyntaxKind::FIRST_KEYWORD as u16 && v <= SyntaxKind::LAST_KEYWORD as u16
    }

    #[inline]
    pub fn is_trivia(self) -> bool {
        self == SyntaxKind::CommentTrivia
    }

    /// Get the text of a keyword kind, or None.
    pub fn keyword_text(self) -> Option<&'static str> {
        match self {
            SyntaxKind::ComponentKeyword => Some("component"),
            SyntaxKind::StateKeyword => Some("state"),
            SyntaxKind::RenderKeyword => Some("render"),
            SyntaxKind::ComputedKeyword => Some("computed"),
            SyntaxKind::ModelKeyword => Some("model"),
            SyntaxKind::ServiceKeyword => Some("service"),
            SyntaxKind::StaticKeyword => Some("static"),
            SyntaxKind::IfKeyword => Some("if"),
            SyntaxKind::ElseKeyword => Some("else"),
            SyntaxKind::ForKeyword => Some("for"),
            SyntaxKind::WhileKeyword => Some("while"),
            SyntaxKind::ReturnKeyword => Some("return"),
            SyntaxKind::ThisKeyword => Some("this"),
            SyntaxKind::TrueKeyword => Some("true"),
            SyntaxKind::FalseKeyword => Some("false"),
            SyntaxKind::NullKeyword => Some("null"),
            _ => None,
        }
    }

    /// Get the punctuation text for a punctuation kind, or None.
    pub fn punctuation_text(self) -> Option<&'static str> {
        match self {
            SyntaxKind::OpenBraceToken => Some("{"),
            SyntaxKind::CloseBraceToken => Some("}"),
            SyntaxKind::OpenParenToken => Some("("),
            SyntaxKind::CloseParenToken => Some(")"),
            SyntaxKind::OpenBracketToken => Some("["),
            SyntaxKind::CloseBracketToken => Some("]"),
            SyntaxKind::DotToken => Some("."),
            SyntaxKind::SemicolonToken => Some(";"),
            SyntaxKind::CommaToken => Some(","),
            SyntaxKind::ColonToken => Some(":"),
            SyntaxKind::QuestionToken => Some("?"),
            SyntaxKind::LessThanToken => Some("<"),
            SyntaxKind::LessThanSlashToken => Some("</"),
            SyntaxKind::SlashGreaterThanToken => Some("/>"),
            SyntaxKind::GreaterThanToken => Some(">"),
            SyntaxKind::LessThanEqualsToken => Some("<="),
            SyntaxKind::GreaterThanEqualsToken => Some(">="),
            SyntaxKind::EqualsEqualsToken => Some("=="),
            SyntaxKind::ExclamationEqualsToken => Some("!="),
            SyntaxKind::PlusToken => Some("+"),
            SyntaxKind::MinusToken => Some("-"),
            SyntaxKind::AsteriskToken => Some("*"),
            SyntaxKind::SlashToken => Some("/"),
            SyntaxKind::PercentToken => Some("%"),
            SyntaxKind::PlusPlusToken => Some("++"),
            SyntaxKind::MinusMinusToken => Some("--"),
            SyntaxKind::ExclamationToken => Some("!"),
            SyntaxKind::AmpersandAmpersandToken => Some("&&"),
            SyntaxKind::BarBarToken => Some("||"),
            SyntaxKind::EqualsToken => Some("="),
            SyntaxKind::PlusEqualsToken => Some("+="),
            SyntaxKind::MinusEqualsToken => Some("-="),
            SyntaxKind::AsteriskEqualsToken => Some("*="),
            SyntaxKind::SlashEqualsToken => Some("/="),
            _ => None,
        }
    }

    /// A short human-readable description used in diagnostics,
    /// e.g. `'{'`, `'return'`, `identifier`, `end of file`.
    pub fn describe(self) -> String {
        if let Some(text) = self.keyword_text().or_else(|| self.punctuation_text()) {
            return format!("'{}'", text);
        }
        match self {
            SyntaxKind::EndOfFileToken => "end of file".to_string(),
            SyntaxKind::Identifier => "identifier".to_string(),
            SyntaxKind::NumericLiteral => "number".to_string(),
            SyntaxKind::StringLiteral => "string".to_string(),
            SyntaxKind::CommentTrivia => "comment".to_string(),
            other => format!("{:?}", other),
        }
    }
}

impl std::fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
