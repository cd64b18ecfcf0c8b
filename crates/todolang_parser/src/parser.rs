//! The TodoLang parser implementation.
//!
//! A recursive descent parser with precedence climbing for binary
//! operators. It consumes the lexer's token stream and builds an
//! arena-allocated AST. Every production returns `Result<_, ParseError>`;
//! [`Parser::parse`] stops at the first error while
//! [`Parser::parse_with_recovery`] resynchronizes at the next declaration.

use bumpalo::Bump;
use todolang_ast::node::*;
use todolang_ast::syntax_kind::SyntaxKind;
use todolang_ast::types::*;
use todolang_core::text::{Location, TextSpan};
use todolang_diagnostics::{ParseError, ParseErrorKind};
use todolang_lexer::Token;
use tracing::trace;

use crate::precedence::{get_binary_operator_precedence, OperatorPrecedence};
use crate::utilities::*;

/// Maximum nesting of statements, expressions and markup elements. Each
/// level costs a chain of parser frames, so the limit is sized to fit in
/// about 1 MiB of stack in unoptimized builds.
pub const MAX_NESTING_DEPTH: u32 = 64;

type ParseResult<T> = Result<T, ParseError>;

/// Where a node began: the location and byte offset of its first token.
#[derive(Debug, Clone, Copy)]
struct NodeStart {
    location: Location,
    pos: u32,
}

impl From<&NodeData> for NodeStart {
    fn from(data: &NodeData) -> Self {
        Self {
            location: data.location,
            pos: data.span.start,
        }
    }
}

/// The parser produces a `Program` from a TodoLang token stream.
pub struct Parser<'a> {
    arena: &'a Bump,
    /// Significant tokens only, always ending with exactly one EOF token.
    tokens: Vec<Token>,
    /// Index of the current token.
    pos: usize,
    /// Tracks nesting depth to prevent stack overflow on deeply nested input.
    recursion_depth: u32,
    /// Source the tokens were scanned from, used for the raw text of markup.
    source: Option<&'a str>,
}

impl<'a> Parser<'a> {
    /// Create a parser over `tokens`. Comment tokens are dropped, anything
    /// after the first EOF is ignored, and a missing EOF is appended.
    pub fn new(arena: &'a Bump, tokens: Vec<Token>) -> Self {
        let mut significant: Vec<Token> = Vec::with_capacity(tokens.len() + 1);
        for token in tokens {
            if token.is_trivia() {
                continue;
            }
            let is_eof = token.is_eof();
            significant.push(token);
            if is_eof {
                break;
            }
        }
        if !significant.last().map_or(false, Token::is_eof) {
            let eof = match significant.last() {
                Some(last) => Token::eof(last.location, last.span.end()),
                None => Token::eof(Location::start(), 0),
            };
            significant.push(eof);
        }
        Self {
            arena,
            tokens: significant,
            pos: 0,
            recursion_depth: 0,
            source: None,
        }
    }

    /// Create a parser that also knows the text `tokens` were scanned from.
    /// Markup text then keeps each token exactly as written, quotes and
    /// escapes included, instead of its decoded value.
    pub fn with_source(arena: &'a Bump, tokens: Vec<Token>, source: &'a str) -> Self {
        Self {
            source: Some(source),
            ..Self::new(arena, tokens)
        }
    }

    /// Parse the whole token stream, stopping at the first syntax error.
    pub fn parse(mut self) -> Result<Program<'a>, ParseError> {
        let start = self.node_start();
        let mut declarations = Vec::new();
        while !self.is_eof() {
            declarations.push(self.parse_declaration()?);
        }
        Ok(Program {
            data: self.finish_node(SyntaxKind::Program, start),
            declarations: self.alloc_list(declarations),
        })
    }

    /// Parse the whole token stream, recording each syntax error and skipping
    /// to the next `component`, `model` or `service` keyword. Declarations
    /// that contained an error are dropped from the returned program.
    pub fn parse_with_recovery(mut self) -> (Program<'a>, Vec<ParseError>) {
        let start = self.node_start();
        let mut declarations = Vec::new();
        let mut errors = Vec::new();
        while !self.is_eof() {
            let declaration_start = self.pos;
            match self.parse_declaration() {
                Ok(declaration) => declarations.push(declaration),
                Err(error) => {
                    errors.push(error);
                    self.recursion_depth = 0;
                    self.synchronize(declaration_start);
                }
            }
        }
        let program = Program {
            data: self.finish_node(SyntaxKind::Program, start),
            declarations: self.alloc_list(declarations),
        };
        (program, errors)
    }

    /// Skip the rest of the broken declaration that began at token index
    /// `declaration_start`.
    ///
    /// Declaration keywords are also valid member names, object keys and
    /// attribute names, so braces are balanced from the start of the broken
    /// declaration and a keyword only resumes parsing outside its body. A
    /// keyword followed by `Name {` resumes even inside an unclosed body.
    fn synchronize(&mut self, declaration_start: usize) {
        let from = self.current().location;
        let mut depth: i32 = self.tokens[declaration_start..self.pos]
            .iter()
            .map(|t| brace_delta(t.kind))
            .sum();
        let mut skipped = 0usize;
        while !self.is_eof() {
            let kind = self.current_token();
            let made_progress = skipped > 0 || self.pos > declaration_start;
            if made_progress && is_declaration_start(kind) && (depth <= 0 || self.at_declaration_header()) {
                break;
            }
            depth += brace_delta(kind);
            self.next_token();
            skipped += 1;
        }
        trace!(
            line = from.line,
            column = from.column,
            skipped,
            "synchronized to next declaration"
        );
    }

    /// Whether the current keyword is followed by `Name {`.
    fn at_declaration_header(&self) -> bool {
        self.peek_token(1) == SyntaxKind::Identifier && self.peek_token(2) == SyntaxKind::OpenBraceToken
    }

    // ========================================================================
    // Token management
    // ========================================================================

    #[inline]
    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    #[inline]
    fn current_token(&self) -> SyntaxKind {
        self.current().kind
    }

    /// Kind of the token `offset` positions ahead, EOF past the end.
    #[inline]
    fn peek_token(&self, offset: usize) -> SyntaxKind {
        self.tokens
            .get(self.pos + offset)
            .map_or(SyntaxKind::EndOfFileToken, |t| t.kind)
    }

    #[inline]
    fn is_eof(&self) -> bool {
        self.current_token() == SyntaxKind::EndOfFileToken
    }

    /// Advance to the next token. The EOF token is never passed.
    #[inline]
    fn next_token(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn expect_token(&mut self, kind: SyntaxKind) -> ParseResult<&Token> {
        if self.current_token() == kind {
            let index = self.pos;
            self.next_token();
            Ok(&self.tokens[index])
        } else {
            Err(self.unexpected(&kind.describe()))
        }
    }

    fn optional_token(&mut self, kind: SyntaxKind) -> bool {
        if self.current_token() == kind {
            self.next_token();
            true
        } else {
            false
        }
    }

    // ========================================================================
    // Nodes and errors
    // ========================================================================

    fn node_start(&self) -> NodeStart {
        let token = self.current();
        NodeStart {
            location: token.location,
            pos: token.span.start,
        }
    }

    /// End offset of the last consumed token.
    fn prev_end(&self) -> u32 {
        // The EOF token is never consumed, so the previous token is real.
        match self.pos {
            0 => 0,
            pos => self.tokens[pos - 1].span.end(),
        }
    }

    fn finish_node(&self, kind: SyntaxKind, start: NodeStart) -> NodeData {
        let end = self.prev_end().max(start.pos);
        NodeData::new(kind, start.location, TextSpan::from_bounds(start.pos, end))
    }

    fn alloc<T>(&self, value: T) -> &'a T {
        self.arena.alloc(value)
    }

    fn alloc_list<T>(&self, items: Vec<T>) -> &'a [T] {
        if items.is_empty() {
            return &[];
        }
        self.arena.alloc_slice_fill_iter(items)
    }

    fn error_at_current(&self, kind: ParseErrorKind) -> ParseError {
        let token = self.current();
        ParseError::new(kind, token.location, token.span)
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        self.error_at_current(ParseErrorKind::UnexpectedToken {
            expected: expected.to_string(),
            found: self.current().describe(),
        })
    }

    fn enter(&mut self) -> ParseResult<()> {
        self.recursion_depth += 1;
        if self.recursion_depth > MAX_NESTING_DEPTH {
            self.recursion_depth -= 1;
            return Err(self.error_at_current(ParseErrorKind::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
            }));
        }
        Ok(())
    }

    #[inline]
    fn leave(&mut self) {
        self.recursion_depth -= 1;
    }

    fn parse_identifier(&mut self) -> ParseResult<Identifier<'a>> {
        if self.current_token() != SyntaxKind::Identifier {
            return Err(self.unexpected("identifier"));
        }
        let ident = self.make_identifier();
        self.next_token();
        Ok(ident)
    }

    /// Like `parse_identifier`, but reserved words are accepted as names.
    fn parse_identifier_name(&mut self) -> ParseResult<Identifier<'a>> {
        if !is_identifier_or_keyword(self.current_token()) {
            return Err(self.unexpected("identifier"));
        }
        let ident = self.make_identifier();
        self.next_token();
        Ok(ident)
    }

    fn make_identifier(&self) -> Identifier<'a> {
        let token = self.current();
        Identifier {
            data: NodeData::new(SyntaxKind::Identifier, token.location, token.span),
            name: self.arena.alloc_str(&token.value),
        }
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn parse_declaration(&mut self) -> ParseResult<Declaration<'a>> {
        match self.current_token() {
            SyntaxKind::ComponentKeyword => Ok(Declaration::Component(self.parse_component_declaration()?)),
            SyntaxKind::ModelKeyword => Ok(Declaration::Model(self.parse_model_declaration()?)),
            SyntaxKind::ServiceKeyword => Ok(Declaration::Service(self.parse_service_declaration()?)),
            _ => Err(self.error_at_current(ParseErrorKind::DeclarationExpected {
                found: self.current().describe(),
            })),
        }
    }

    fn member_expected(&self, container: &str, name: &Identifier<'a>) -> ParseError {
        self.error_at_current(ParseErrorKind::MemberExpected {
            container: format!("{} '{}'", container, name.name),
            found: self.current().describe(),
        })
    }

    fn parse_component_declaration(&mut self) -> ParseResult<ComponentDeclaration<'a>> {
        let start = self.node_start();
        self.expect_token(SyntaxKind::ComponentKeyword)?;
        let name = self.parse_identifier()?;
        self.expect_token(SyntaxKind::OpenBraceToken)?;

        let mut state = None;
        let mut methods = Vec::new();
        let mut computed = Vec::new();
        let mut render = None;

        while !matches!(self.current_token(), SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken) {
            match self.current_token() {
                SyntaxKind::StateKeyword => {
                    if state.is_some() {
                        return Err(self.error_at_current(ParseErrorKind::DuplicateState {
                            component: name.name.to_string(),
                        }));
                    }
                    let block = self.parse_state_block()?;
                    state = Some(self.alloc(block));
                }
                SyntaxKind::RenderKeyword => {
                    if render.is_some() {
                        return Err(self.error_at_current(ParseErrorKind::DuplicateRender {
                            component: name.name.to_string(),
                        }));
                    }
                    let block = self.parse_render_block()?;
                    render = Some(self.alloc(block));
                }
                SyntaxKind::ComputedKeyword => computed.push(self.parse_computed_declaration()?),
                SyntaxKind::StaticKeyword | SyntaxKind::Identifier => {
                    methods.push(self.parse_method_declaration()?)
                }
                SyntaxKind::SemicolonToken => self.next_token(),
                _ => return Err(self.member_expected("component", &name)),
            }
        }
        self.expect_token(SyntaxKind::CloseBraceToken)?;

        Ok(ComponentDeclaration {
            data: self.finish_node(SyntaxKind::ComponentDeclaration, start),
            name,
            state,
            methods: self.alloc_list(methods),
            computed: self.alloc_list(computed),
            render,
        })
    }

    fn parse_model_declaration(&mut self) -> ParseResult<ModelDeclaration<'a>> {
        let start = self.node_start();
        self.expect_token(SyntaxKind::ModelKeyword)?;
        let name = self.parse_identifier()?;
        self.expect_token(SyntaxKind::OpenBraceToken)?;

        let mut properties = Vec::new();
        let mut methods = Vec::new();
        while !matches!(self.current_token(), SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken) {
            match self.current_token() {
                SyntaxKind::Identifier if self.peek_token(1) == SyntaxKind::ColonToken => {
                    properties.push(self.parse_property_declaration()?)
                }
                SyntaxKind::StaticKeyword | SyntaxKind::Identifier => {
                    methods.push(self.parse_method_declaration()?)
                }
                SyntaxKind::SemicolonToken => self.next_token(),
                _ => return Err(self.member_expected("model", &name)),
            }
        }
        self.expect_token(SyntaxKind::CloseBraceToken)?;

        Ok(ModelDeclaration {
            data: self.finish_node(SyntaxKind::ModelDeclaration, start),
            name,
            properties: self.alloc_list(properties),
            methods: self.alloc_list(methods),
        })
    }

    fn parse_service_declaration(&mut self) -> ParseResult<ServiceDeclaration<'a>> {
        let start = self.node_start();
        self.expect_token(SyntaxKind::ServiceKeyword)?;
        let name = self.parse_identifier()?;
        self.expect_token(SyntaxKind::OpenBraceToken)?;

        let mut methods = Vec::new();
        while !matches!(self.current_token(), SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken) {
            match self.current_token() {
                SyntaxKind::StaticKeyword | SyntaxKind::Identifier => {
                    methods.push(self.parse_method_declaration()?)
                }
                SyntaxKind::SemicolonToken => self.next_token(),
                _ => return Err(self.member_expected("service", &name)),
            }
        }
        self.expect_token(SyntaxKind::CloseBraceToken)?;

        Ok(ServiceDeclaration {
            data: self.finish_node(SyntaxKind::ServiceDeclaration, start),
            name,
            methods: self.alloc_list(methods),
        })
    }

    // ========================================================================
    // Members
    // ========================================================================

    fn parse_state_block(&mut self) -> ParseResult<StateBlock<'a>> {
        let start = self.node_start();
        self.expect_token(SyntaxKind::StateKeyword)?;
        self.expect_token(SyntaxKind::OpenBraceToken)?;
        let mut properties = Vec::new();
        while !matches!(self.current_token(), SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken) {
            properties.push(self.parse_property_declaration()?);
        }
        self.expect_token(SyntaxKind::CloseBraceToken)?;
        Ok(StateBlock {
            data: self.finish_node(SyntaxKind::StateBlock, start),
            properties: self.alloc_list(properties),
        })
    }

    /// `name : Type [= expression] [; | ,]`
    fn parse_property_declaration(&mut self) -> ParseResult<PropertyDeclaration<'a>> {
        let start = self.node_start();
        let name = self.parse_identifier()?;
        self.expect_token(SyntaxKind::ColonToken)?;
        let type_annotation = self.parse_type()?;
        let default_value = if self.optional_token(SyntaxKind::EqualsToken) {
            let expr = self.parse_expression()?;
            Some(self.alloc(expr))
        } else {
            None
        };
        let data = self.finish_node(SyntaxKind::PropertyDeclaration, start);
        if !self.optional_token(SyntaxKind::SemicolonToken) {
            self.optional_token(SyntaxKind::CommaToken);
        }
        Ok(PropertyDeclaration {
            data,
            name,
            type_annotation,
            default_value,
        })
    }

    /// `TypeName [ '[' ']' ] [ '?' ]`
    fn parse_type(&mut self) -> ParseResult<TypeNode<'a>> {
        let start = self.node_start();
        if self.current_token() != SyntaxKind::Identifier {
            return Err(self.error_at_current(ParseErrorKind::TypeNameExpected {
                found: self.current().describe(),
            }));
        }
        let name = self.arena.alloc_str(&self.current().value);
        self.next_token();
        let is_array = if self.current_token() == SyntaxKind::OpenBracketToken {
            self.next_token();
            self.expect_token(SyntaxKind::CloseBracketToken)?;
            true
        } else {
            false
        };
        let is_optional = self.optional_token(SyntaxKind::QuestionToken);
        Ok(TypeNode {
            data: self.finish_node(SyntaxKind::TypeReference, start),
            name,
            is_array,
            is_optional,
        })
    }

    /// `[static] name ( params ) [: Type] { statements }`
    fn parse_method_declaration(&mut self) -> ParseResult<MethodDeclaration<'a>> {
        let start = self.node_start();
        let mut modifiers = ModifierFlags::NONE;
        while let Some(flag) = ModifierFlags::from_keyword(self.current_token()) {
            modifiers |= flag;
            self.next_token();
        }
        let name = self.parse_identifier()?;
        let parameters = self.parse_parameter_list()?;
        let return_type = self.parse_optional_type_annotation()?;
        let body = self.parse_block_body()?;
        Ok(MethodDeclaration {
            data: self.finish_node(SyntaxKind::MethodDeclaration, start),
            modifiers,
            name,
            parameters,
            return_type,
            body,
        })
    }

    fn parse_parameter_list(&mut self) -> ParseResult<&'a [Parameter<'a>]> {
        self.expect_token(SyntaxKind::OpenParenToken)?;
        let mut parameters = Vec::new();
        while self.current_token() != SyntaxKind::CloseParenToken {
            let start = self.node_start();
            let name = self.parse_identifier()?;
            let type_annotation = self.parse_optional_type_annotation()?;
            parameters.push(Parameter {
                data: self.finish_node(SyntaxKind::Parameter, start),
                name,
                type_annotation,
            });
            if !self.optional_token(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.expect_token(SyntaxKind::CloseParenToken)?;
        Ok(self.alloc_list(parameters))
    }

    fn parse_optional_type_annotation(&mut self) -> ParseResult<Option<TypeNode<'a>>> {
        if self.optional_token(SyntaxKind::ColonToken) {
            Ok(Some(self.parse_type()?))
        } else {
            Ok(None)
        }
    }

    /// Skip an optional empty `()` after `render` or a computed name.
    fn parse_optional_empty_parens(&mut self) -> ParseResult<()> {
        if self.optional_token(SyntaxKind::OpenParenToken) {
            self.expect_token(SyntaxKind::CloseParenToken)?;
        }
        Ok(())
    }

    fn parse_computed_declaration(&mut self) -> ParseResult<ComputedDeclaration<'a>> {
        let start = self.node_start();
        self.expect_token(SyntaxKind::ComputedKeyword)?;
        let name = self.parse_identifier()?;
        self.parse_optional_empty_parens()?;
        let return_type = self.parse_optional_type_annotation()?;
        let body = self.parse_block_body()?;
        Ok(ComputedDeclaration {
            data: self.finish_node(SyntaxKind::ComputedDeclaration, start),
            name,
            return_type,
            body,
        })
    }

    fn parse_render_block(&mut self) -> ParseResult<RenderBlock<'a>> {
        let start = self.node_start();
        self.expect_token(SyntaxKind::RenderKeyword)?;
        self.parse_optional_empty_parens()?;
        let body = self.parse_block_body()?;
        Ok(RenderBlock {
            data: self.finish_node(SyntaxKind::RenderBlock, start),
            body,
        })
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// `{ statement* }`
    fn parse_block_body(&mut self) -> ParseResult<&'a [Statement<'a>]> {
        self.expect_token(SyntaxKind::OpenBraceToken)?;
        let statements = self.parse_statements()?;
        self.expect_token(SyntaxKind::CloseBraceToken)?;
        Ok(statements)
    }

    /// Statements up to the closing `}` or EOF. Stray `;` are skipped.
    fn parse_statements(&mut self) -> ParseResult<&'a [Statement<'a>]> {
        let mut statements = Vec::new();
        while !matches!(self.current_token(), SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken) {
            if self.optional_token(SyntaxKind::SemicolonToken) {
                continue;
            }
            statements.push(self.parse_statement()?);
        }
        Ok(self.alloc_list(statements))
    }

    fn parse_statement(&mut self) -> ParseResult<Statement<'a>> {
        self.enter()?;
        let result = self.parse_statement_worker();
        self.leave();
        result
    }

    fn parse_statement_worker(&mut self) -> ParseResult<Statement<'a>> {
        match self.current_token() {
            SyntaxKind::OpenBraceToken => Ok(Statement::Block(self.parse_block()?)),
            SyntaxKind::IfKeyword => self.parse_if_statement(),
            SyntaxKind::ForKeyword => self.parse_for_statement(),
            SyntaxKind::WhileKeyword => self.parse_while_statement(),
            SyntaxKind::ReturnKeyword => self.parse_return_statement(),
            SyntaxKind::SemicolonToken => {
                // A lone `;` where a statement is required is an empty block.
                let start = self.node_start();
                self.next_token();
                Ok(Statement::Block(Block {
                    data: self.finish_node(SyntaxKind::Block, start),
                    statements: &[],
                }))
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_block(&mut self) -> ParseResult<Block<'a>> {
        let start = self.node_start();
        let statements = self.parse_block_body()?;
        Ok(Block {
            data: self.finish_node(SyntaxKind::Block, start),
            statements,
        })
    }

    fn parse_statement_and_alloc(&mut self) -> ParseResult<&'a Statement<'a>> {
        let stmt = self.parse_statement()?;
        Ok(self.alloc(stmt))
    }

    fn parse_if_statement(&mut self) -> ParseResult<Statement<'a>> {
        let start = self.node_start();
        self.expect_token(SyntaxKind::IfKeyword)?;
        self.expect_token(SyntaxKind::OpenParenToken)?;
        let condition = self.parse_expression_and_alloc()?;
        self.expect_token(SyntaxKind::CloseParenToken)?;
        let then_statement = self.parse_statement_and_alloc()?;
        let else_statement = if self.optional_token(SyntaxKind::ElseKeyword) {
            Some(self.parse_statement_and_alloc()?)
        } else {
            None
        };
        Ok(Statement::IfStatement(IfStatement {
            data: self.finish_node(SyntaxKind::IfStatement, start),
            condition,
            then_statement,
            else_statement,
        }))
    }

    fn parse_for_statement(&mut self) -> ParseResult<Statement<'a>> {
        let start = self.node_start();
        self.expect_token(SyntaxKind::ForKeyword)?;
        self.expect_token(SyntaxKind::OpenParenToken)?;
        let initializer = if self.current_token() != SyntaxKind::SemicolonToken {
            Some(self.parse_expression_and_alloc()?)
        } else {
            None
        };
        self.expect_token(SyntaxKind::SemicolonToken)?;
        let condition = if self.current_token() != SyntaxKind::SemicolonToken {
            Some(self.parse_expression_and_alloc()?)
        } else {
            None
        };
        self.expect_token(SyntaxKind::SemicolonToken)?;
        let update = if self.current_token() != SyntaxKind::CloseParenToken {
            Some(self.parse_expression_and_alloc()?)
        } else {
            None
        };
        self.expect_token(SyntaxKind::CloseParenToken)?;
        let body = self.parse_statement_and_alloc()?;
        Ok(Statement::ForStatement(ForStatement {
            data: self.finish_node(SyntaxKind::ForStatement, start),
            initializer,
            condition,
            update,
            body,
        }))
    }

    fn parse_while_statement(&mut self) -> ParseResult<Statement<'a>> {
        let start = self.node_start();
        self.expect_token(SyntaxKind::WhileKeyword)?;
        self.expect_token(SyntaxKind::OpenParenToken)?;
        let condition = self.parse_expression_and_alloc()?;
        self.expect_token(SyntaxKind::CloseParenToken)?;
        let body = self.parse_statement_and_alloc()?;
        Ok(Statement::WhileStatement(WhileStatement {
            data: self.finish_node(SyntaxKind::WhileStatement, start),
            condition,
            body,
        }))
    }

    fn parse_return_statement(&mut self) -> ParseResult<Statement<'a>> {
        let start = self.node_start();
        self.expect_token(SyntaxKind::ReturnKeyword)?;
        let expression = if ends_return_statement(self.current_token()) {
            None
        } else {
            Some(self.parse_expression_and_alloc()?)
        };
        self.optional_token(SyntaxKind::SemicolonToken);
        Ok(Statement::ReturnStatement(ReturnStatement {
            data: self.finish_node(SyntaxKind::ReturnStatement, start),
            expression,
        }))
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Statement<'a>> {
        let start = self.node_start();
        let expression = self.parse_expression_and_alloc()?;
        self.optional_token(SyntaxKind::SemicolonToken);
        Ok(Statement::ExpressionStatement(ExpressionStatement {
            data: self.finish_node(SyntaxKind::ExpressionStatement, start),
            expression,
        }))
    }

    // ========================================================================
    // Expression parsing
    // ========================================================================

    fn parse_expression_and_alloc(&mut self) -> ParseResult<&'a Expression<'a>> {
        let expr = self.parse_expression()?;
        Ok(self.alloc(expr))
    }

    fn parse_expression(&mut self) -> ParseResult<Expression<'a>> {
        self.enter()?;
        let result = self.parse_assignment_expression();
        self.leave();
        result
    }

    fn parse_assignment_expression(&mut self) -> ParseResult<Expression<'a>> {
        let expr = self.parse_conditional_expression()?;

        if let Some(operator) = AssignmentOperator::from_token(self.current_token()) {
            if !expr.is_assignment_target() {
                let data = expr.data();
                return Err(ParseError::new(
                    ParseErrorKind::InvalidAssignmentTarget,
                    data.location,
                    data.span,
                ));
            }
            let start = NodeStart::from(expr.data());
            self.next_token();
            // Right-associative: `a = b = c` is `a = (b = c)`.
            let right = self.parse_expression_and_alloc()?;
            let target = self.alloc(expr);
            return Ok(Expression::Assignment(AssignmentExpression {
                data: self.finish_node(SyntaxKind::AssignmentExpression, start),
                target,
                operator,
                right,
            }));
        }

        Ok(expr)
    }

    fn parse_conditional_expression(&mut self) -> ParseResult<Expression<'a>> {
        let expr = self.parse_binary_expression(OperatorPrecedence::Conditional)?;

        // Ternary: cond ? true : false
        if self.current_token() == SyntaxKind::QuestionToken {
            let start = NodeStart::from(expr.data());
            self.next_token();
            let true_expr = self.parse_expression_and_alloc()?;
            self.expect_token(SyntaxKind::ColonToken)?;
            let false_expr = self.parse_expression_and_alloc()?;
            let condition = self.alloc(expr);
            return Ok(Expression::Conditional(ConditionalExpression {
                data: self.finish_node(SyntaxKind::ConditionalExpression, start),
                condition,
                true_expr,
                false_expr,
            }));
        }

        Ok(expr)
    }

    fn parse_binary_expression(&mut self, min_precedence: OperatorPrecedence) -> ParseResult<Expression<'a>> {
        let mut left = self.parse_unary_expression()?;

        loop {
            let precedence = get_binary_operator_precedence(self.current_token());
            if precedence == OperatorPrecedence::Invalid || precedence <= min_precedence {
                break;
            }
            let operator = match BinaryOperator::from_token(self.current_token()) {
                Some(operator) => operator,
                None => break,
            };

            let start = NodeStart::from(left.data());
            self.next_token();
            let right = self.parse_binary_expression(precedence)?;
            let left_ref = self.alloc(left);
            let right_ref = self.alloc(right);
            left = Expression::Binary(BinaryExpression {
                data: self.finish_node(SyntaxKind::BinaryExpression, start),
                left: left_ref,
                operator,
                right: right_ref,
            });
        }

        Ok(left)
    }

    /// Prefix operators are collected in a loop so `!!!!x` does not recurse.
    fn parse_unary_expression(&mut self) -> ParseResult<Expression<'a>> {
        let mut prefixes = Vec::new();
        while let Some(operator) = UnaryOperator::from_token(self.current_token()) {
            prefixes.push((operator, self.node_start()));
            self.next_token();
        }

        let mut expr = self.parse_postfix_expression()?;
        while let Some((operator, start)) = prefixes.pop() {
            let operand = self.alloc(expr);
            expr = Expression::Unary(UnaryExpression {
                data: self.finish_node(SyntaxKind::PrefixUnaryExpression, start),
                operator,
                operand,
                is_prefix: true,
            });
        }
        Ok(expr)
    }

    fn parse_postfix_expression(&mut self) -> ParseResult<Expression<'a>> {
        let expr = self.parse_left_hand_side_expression()?;
        let operator = match UnaryOperator::from_token(self.current_token()) {
            Some(operator) if operator.is_update() => operator,
            _ => return Ok(expr),
        };
        let start = NodeStart::from(expr.data());
        self.next_token();
        let operand = self.alloc(expr);
        Ok(Expression::Unary(UnaryExpression {
            data: self.finish_node(SyntaxKind::PostfixUnaryExpression, start),
            operator,
            operand,
            is_prefix: false,
        }))
    }

    fn parse_left_hand_side_expression(&mut self) -> ParseResult<Expression<'a>> {
        let mut expr = self.parse_primary_expression()?;

        loop {
            match self.current_token() {
                SyntaxKind::DotToken => {
                    let start = NodeStart::from(expr.data());
                    self.next_token();
                    let name = self.parse_identifier_name()?;
                    let object = self.alloc(expr);
                    let property = self.alloc(Expression::Identifier(name));
                    expr = Expression::Member(MemberExpression {
                        data: self.finish_node(SyntaxKind::MemberExpression, start),
                        object,
                        property,
                        computed: false,
                    });
                }
                SyntaxKind::OpenBracketToken => {
                    let start = NodeStart::from(expr.data());
                    self.next_token();
                    let property = self.parse_expression_and_alloc()?;
                    self.expect_token(SyntaxKind::CloseBracketToken)?;
                    let object = self.alloc(expr);
                    expr = Expression::Member(MemberExpression {
                        data: self.finish_node(SyntaxKind::MemberExpression, start),
                        object,
                        property,
                        computed: true,
                    });
                }
                SyntaxKind::OpenParenToken => {
                    let start = NodeStart::from(expr.data());
                    let arguments = self.parse_argument_list()?;
                    let callee = self.alloc(expr);
                    expr = Expression::Call(CallExpression {
                        data: self.finish_node(SyntaxKind::CallExpression, start),
                        callee,
                        arguments,
                    });
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_argument_list(&mut self) -> ParseResult<&'a [Expression<'a>]> {
        self.expect_token(SyntaxKind::OpenParenToken)?;
        let mut args = Vec::new();
        while self.current_token() != SyntaxKind::CloseParenToken {
            args.push(self.parse_expression()?);
            if !self.optional_token(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.expect_token(SyntaxKind::CloseParenToken)?;
        Ok(self.alloc_list(args))
    }

    fn parse_primary_expression(&mut self) -> ParseResult<Expression<'a>> {
        let token = self.current();
        let data = NodeData::new(token.kind, token.location, token.span);
        match token.kind {
            SyntaxKind::Identifier => Ok(Expression::Identifier(self.parse_identifier()?)),
            SyntaxKind::NumericLiteral => {
                let text = self.arena.alloc_str(&token.value);
                let value = text.parse::<f64>().unwrap_or_default();
                self.next_token();
                Ok(Expression::NumericLiteral(NumericLiteral { data, text, value }))
            }
            SyntaxKind::StringLiteral => {
                let value = self.arena.alloc_str(&token.value);
                self.next_token();
                Ok(Expression::StringLiteral(StringLiteral { data, value }))
            }
            SyntaxKind::TrueKeyword | SyntaxKind::FalseKeyword => {
                let value = token.kind == SyntaxKind::TrueKeyword;
                self.next_token();
                Ok(Expression::BooleanLiteral(BooleanLiteral { data, value }))
            }
            SyntaxKind::NullKeyword => {
                self.next_token();
                Ok(Expression::NullLiteral(data))
            }
            SyntaxKind::ThisKeyword => {
                self.next_token();
                Ok(Expression::This(data))
            }
            SyntaxKind::OpenParenToken => {
                let start = self.node_start();
                self.next_token();
                let mut expr = self.parse_expression()?;
                self.expect_token(SyntaxKind::CloseParenToken)?;
                // No wrapper node: the inner node takes over the parentheses.
                let data = node_data_mut(&mut expr);
                data.location = start.location;
                data.span = TextSpan::from_bounds(start.pos, self.prev_end());
                Ok(expr)
            }
            SyntaxKind::OpenBracketToken => self.parse_array_literal(),
            SyntaxKind::OpenBraceToken => self.parse_object_literal(),
            SyntaxKind::LessThanToken if self.peek_token(1) == SyntaxKind::Identifier => {
                Ok(Expression::Markup(self.parse_markup_element()?))
            }
            _ => Err(self.error_at_current(ParseErrorKind::ExpressionExpected {
                found: self.current().describe(),
            })),
        }
    }

    /// `[a, b, c,]`
    fn parse_array_literal(&mut self) -> ParseResult<Expression<'a>> {
        let start = self.node_start();
        self.expect_token(SyntaxKind::OpenBracketToken)?;
        let mut elements = Vec::new();
        while self.current_token() != SyntaxKind::CloseBracketToken {
            elements.push(self.parse_expression()?);
            if !self.optional_token(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.expect_token(SyntaxKind::CloseBracketToken)?;
        Ok(Expression::ArrayLiteral(ArrayLiteralExpression {
            data: self.finish_node(SyntaxKind::ArrayLiteralExpression, start),
            elements: self.alloc_list(elements),
        }))
    }

    /// `{ key: value, shorthand, "quoted": value }`
    fn parse_object_literal(&mut self) -> ParseResult<Expression<'a>> {
        let start = self.node_start();
        self.expect_token(SyntaxKind::OpenBraceToken)?;
        let mut properties = Vec::new();
        while self.current_token() != SyntaxKind::CloseBraceToken {
            properties.push(self.parse_object_property()?);
            if !self.optional_token(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.expect_token(SyntaxKind::CloseBraceToken)?;
        Ok(Expression::ObjectLiteral(ObjectLiteralExpression {
            data: self.finish_node(SyntaxKind::ObjectLiteralExpression, start),
            properties: self.alloc_list(properties),
        }))
    }

    fn parse_object_property(&mut self) -> ParseResult<ObjectProperty<'a>> {
        let start = self.node_start();
        let kind = self.current_token();
        if kind == SyntaxKind::StringLiteral {
            let key = self.arena.alloc_str(&self.current().value);
            self.next_token();
            self.expect_token(SyntaxKind::ColonToken)?;
            let value = self.parse_expression_and_alloc()?;
            return Ok(ObjectProperty {
                data: self.finish_node(SyntaxKind::PropertyAssignment, start),
                key,
                value,
                shorthand: false,
            });
        }
        if !is_identifier_or_keyword(kind) {
            return Err(self.unexpected("property name"));
        }

        let name = self.parse_identifier_name()?;
        if self.optional_token(SyntaxKind::ColonToken) {
            let value = self.parse_expression_and_alloc()?;
            return Ok(ObjectProperty {
                data: self.finish_node(SyntaxKind::PropertyAssignment, start),
                key: name.name,
                value,
                shorthand: false,
            });
        }
        // Shorthand `{ count }` means `{ count: count }`; reserved words
        // cannot stand for a variable.
        if kind != SyntaxKind::Identifier {
            return Err(self.unexpected("':'"));
        }
        Ok(ObjectProperty {
            data: self.finish_node(SyntaxKind::PropertyAssignment, start),
            key: name.name,
            value: self.alloc(Expression::Identifier(name)),
            shorthand: true,
        })
    }

    // ========================================================================
    // Markup
    // ========================================================================

    fn parse_markup_element(&mut self) -> ParseResult<MarkupElement<'a>> {
        self.enter()?;
        let result = self.parse_markup_element_worker();
        self.leave();
        result
    }

    fn parse_markup_element_worker(&mut self) -> ParseResult<MarkupElement<'a>> {
        let start = self.node_start();
        self.expect_token(SyntaxKind::LessThanToken)?;
        let tag = self.parse_identifier()?;
        let unterminated = |tag: &Identifier<'a>| {
            ParseError::new(
                ParseErrorKind::UnterminatedElement {
                    tag: tag.name.to_string(),
                },
                start.location,
                TextSpan::from_bounds(start.pos, tag.data.span.end()),
            )
        };

        let mut attributes = Vec::new();
        while is_identifier_or_keyword(self.current_token()) {
            attributes.push(self.parse_markup_attribute()?);
        }

        match self.current_token() {
            SyntaxKind::SlashGreaterThanToken => {
                self.next_token();
                return Ok(MarkupElement {
                    data: self.finish_node(SyntaxKind::MarkupSelfClosingElement, start),
                    tag_name: tag.name,
                    attributes: self.alloc_list(attributes),
                    children: &[],
                    self_closing: true,
                });
            }
            SyntaxKind::GreaterThanToken => self.next_token(),
            SyntaxKind::EndOfFileToken => return Err(unterminated(&tag)),
            _ => return Err(self.unexpected("'>' or '/>'")),
        }

        let mut children = Vec::new();
        loop {
            match self.current_token() {
                SyntaxKind::EndOfFileToken => return Err(unterminated(&tag)),
                SyntaxKind::LessThanSlashToken => break,
                SyntaxKind::LessThanToken => {
                    let child = self.parse_markup_element()?;
                    children.push(MarkupChild::Element(child));
                }
                SyntaxKind::OpenBraceToken => {
                    if let Some(splice) = self.parse_markup_expression()? {
                        children.push(MarkupChild::Expression(splice));
                    }
                }
                _ => children.push(MarkupChild::Text(self.parse_markup_text())),
            }
        }

        // Closing tag
        self.expect_token(SyntaxKind::LessThanSlashToken)?;
        if self.is_eof() {
            return Err(unterminated(&tag));
        }
        let closing = self.parse_identifier()?;
        if closing.name != tag.name {
            return Err(ParseError::new(
                ParseErrorKind::MismatchedClosingTag {
                    expected: tag.name.to_string(),
                    found: closing.name.to_string(),
                },
                closing.data.location,
                closing.data.span,
            ));
        }
        if self.is_eof() {
            return Err(unterminated(&tag));
        }
        self.expect_token(SyntaxKind::GreaterThanToken)?;

        Ok(MarkupElement {
            data: self.finish_node(SyntaxKind::MarkupElement, start),
            tag_name: tag.name,
            attributes: self.alloc_list(attributes),
            children: self.alloc_list(children),
            self_closing: false,
        })
    }

    /// `name`, `name="string"` or `name={expression}`
    fn parse_markup_attribute(&mut self) -> ParseResult<MarkupAttribute<'a>> {
        let start = self.node_start();
        let name = self.parse_identifier_name()?;
        let value = if self.optional_token(SyntaxKind::EqualsToken) {
            match self.current_token() {
                SyntaxKind::StringLiteral => {
                    let token = self.current();
                    let literal = StringLiteral {
                        data: NodeData::new(SyntaxKind::StringLiteral, token.location, token.span),
                        value: self.arena.alloc_str(&token.value),
                    };
                    self.next_token();
                    Some(self.alloc(Expression::StringLiteral(literal)))
                }
                SyntaxKind::OpenBraceToken => {
                    self.next_token();
                    let expr = self.parse_expression_and_alloc()?;
                    self.expect_token(SyntaxKind::CloseBraceToken)?;
                    Some(expr)
                }
                _ => return Err(self.unexpected("attribute value")),
            }
        } else {
            None
        };
        Ok(MarkupAttribute {
            data: self.finish_node(SyntaxKind::MarkupAttribute, start),
            name: name.name,
            value,
        })
    }

    /// `{expression}` among children. An empty `{}` yields nothing.
    fn parse_markup_expression(&mut self) -> ParseResult<Option<MarkupExpression<'a>>> {
        let start = self.node_start();
        self.expect_token(SyntaxKind::OpenBraceToken)?;
        if self.optional_token(SyntaxKind::CloseBraceToken) {
            return Ok(None);
        }
        let expression = self.parse_expression_and_alloc()?;
        self.expect_token(SyntaxKind::CloseBraceToken)?;
        Ok(Some(MarkupExpression {
            data: self.finish_node(SyntaxKind::MarkupExpression, start),
            expression,
        }))
    }

    /// A maximal run of tokens that are not `<`, `</`, `{` or EOF. Tokens
    /// are joined with one space wherever the source had a gap. With the
    /// source at hand each token contributes its text as written, otherwise
    /// its value.
    fn parse_markup_text(&mut self) -> MarkupText<'a> {
        let start = self.node_start();
        let mut text = String::new();
        let mut prev_end: Option<u32> = None;
        while !ends_markup_text(self.current_token()) {
            let token = self.current();
            if let Some(end) = prev_end {
                if token.span.start > end {
                    text.push(' ');
                }
            }
            let raw = self.source.and_then(|source| source.get(token.span.to_range()));
            text.push_str(raw.unwrap_or(&token.value));
            prev_end = Some(token.span.end());
            self.next_token();
        }
        MarkupText {
            data: self.finish_node(SyntaxKind::MarkupText, start),
            text: self.arena.alloc_str(&text),
        }
    }
}

fn node_data_mut<'r>(expr: &'r mut Expression<'_>) -> &'r mut NodeData {
    match expr {
        Expression::Identifier(n) => &mut n.data,
        Expression::StringLiteral(n) => &mut n.data,
        Expression::NumericLiteral(n) => &mut n.data,
        Expression::BooleanLiteral(n) => &mut n.data,
        Expression::NullLiteral(d) => d,
        Expression::This(d) => d,
        Expression::ArrayLiteral(n) => &mut n.data,
        Expression::ObjectLiteral(n) => &mut n.data,
        Expression::Member(n) => &mut n.data,
        Expression::Call(n) => &mut n.data,
        Expression::Unary(n) => &mut n.data,
        Expression::Binary(n) => &mut n.data,
        Expression::Conditional(n) => &mut n.data,
        Expression::Assignment(n) => &mut n.data,
        Expression::Markup(n) => &mut n.data,
    }
}
