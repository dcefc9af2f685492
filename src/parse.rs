use std::collections::HashMap;

use miette::Report;
use tracing::{debug, trace};

use crate::{
    Lexer,
    ast::{BlockStatement, Expression, Identifier, Program, Statement},
    error::ParseError,
    token::{Token, TokenKind},
};

/// Binding strength of infix operators, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
}

impl Precedence {
    pub fn of(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
            TokenKind::Lt | TokenKind::Gt => Precedence::LessGreater,
            TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
            TokenKind::Asterisk | TokenKind::Slash => Precedence::Product,
            TokenKind::LParen => Precedence::Call,
            _ => Precedence::Lowest,
        }
    }
}

/// Deepest expression or block nesting accepted before the parser gives up on a
/// statement. Keeps hostile input from exhausting the stack.
pub const MAX_NESTING_DEPTH: usize = 256;

pub type PrefixParseFn<'de> = fn(&mut Parser<'de>) -> Option<Expression<'de>>;
pub type InfixParseFn<'de> = fn(&mut Parser<'de>, Expression<'de>) -> Option<Expression<'de>>;

pub struct Parser<'de> {
    lexer: Lexer<'de>,
    current: Token<'de>,
    peek: Token<'de>,
    errors: Vec<ParseError>,
    depth: usize,

    prefix_fns: HashMap<TokenKind, PrefixParseFn<'de>>,
    infix_fns: HashMap<TokenKind, InfixParseFn<'de>>,
}

impl<'de> Parser<'de> {
    pub fn new(lexer: Lexer<'de>) -> Self {
        let mut parser = Parser {
            lexer,
            current: Token::eof(0),
            peek: Token::eof(0),
            errors: Vec::new(),
            depth: 0,
            prefix_fns: HashMap::new(),
            infix_fns: HashMap::new(),
        };

        parser.register_prefix(TokenKind::Ident, Self::parse_identifier);
        parser.register_prefix(TokenKind::Int, Self::parse_integer_literal);
        parser.register_prefix(TokenKind::True, Self::parse_boolean);
        parser.register_prefix(TokenKind::False, Self::parse_boolean);
        parser.register_prefix(TokenKind::Bang, Self::parse_prefix_expression);
        parser.register_prefix(TokenKind::Minus, Self::parse_prefix_expression);
        parser.register_prefix(TokenKind::LParen, Self::parse_grouped_expression);
        parser.register_prefix(TokenKind::If, Self::parse_if_expression);
        parser.register_prefix(TokenKind::Function, Self::parse_function_literal);

        for kind in [
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Asterisk,
            TokenKind::Slash,
            TokenKind::Eq,
            TokenKind::NotEq,
            TokenKind::Lt,
            TokenKind::Gt,
        ] {
            parser.register_infix(kind, Self::parse_infix_expression);
        }
        parser.register_infix(TokenKind::LParen, Self::parse_call_expression);

        parser.next_token();
        parser.next_token();
        parser
    }

    /// Convenience constructor over a fresh lexer.
    pub fn from_source(filename: Option<&'de str>, whole: &'de str) -> Self {
        Self::new(Lexer::new(filename, whole))
    }

    pub fn register_prefix(&mut self, kind: TokenKind, f: PrefixParseFn<'de>) {
        self.prefix_fns.insert(kind, f);
    }

    pub fn register_infix(&mut self, kind: TokenKind, f: InfixParseFn<'de>) {
        self.infix_fns.insert(kind, f);
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Errors as reports carrying the named source, ready for fancy rendering.
    pub fn diagnostics(&self) -> Vec<Report> {
        let filename = self.lexer.filename();
        let source = self.lexer.source();
        self.errors
            .iter()
            .map(|e| e.to_report(filename, source))
            .collect()
    }

    pub fn parse_program(&mut self) -> Program<'de> {
        let mut program = Program::default();

        while !self.current_is(TokenKind::Eof) {
            match self.parse_statement() {
                Some(statement) => program.statements.push(statement),
                None => {
                    trace!(offset = self.current.offset, "dropping malformed statement");
                    self.synchronize();
                }
            }
            self.next_token();
        }

        debug!(
            statements = program.statements.len(),
            errors = self.errors.len(),
            "parsed program"
        );
        program
    }

    fn next_token(&mut self) {
        self.current = self.peek;
        self.peek = self.lexer.next_token();
    }

    fn current_is(&self, kind: TokenKind) -> bool {
        self.current.is(kind)
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.is(kind)
    }

    /// Advances onto `peek` if it has the expected kind, otherwise records an error.
    fn expect_peek(&mut self, kind: TokenKind) -> Option<Token<'de>> {
        if self.peek_is(kind) {
            self.next_token();
            Some(self.current)
        } else {
            self.peek_error(kind);
            None
        }
    }

    fn peek_error(&mut self, kind: TokenKind) {
        let error = ParseError::unexpected(kind, &self.peek);
        trace!(%error, "expectation failed");
        self.errors.push(error);
    }

    fn peek_precedence(&self) -> Precedence {
        Precedence::of(self.peek.kind)
    }

    fn current_precedence(&self) -> Precedence {
        Precedence::of(self.current.kind)
    }

    /// Skips the rest of a malformed statement, stepping over any balanced
    /// `{ ... }` it contains. Stops without consuming on a `;` outside those
    /// braces, on the `}` closing the enclosing block, or at end of input.
    fn synchronize(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.current.kind {
                TokenKind::Eof => return,
                TokenKind::Semicolon | TokenKind::RBrace if depth == 0 => return,
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth -= 1,
                _ => {}
            }
            self.next_token();
        }
    }

    /// Claims one level of nesting, recording an error once the limit is hit.
    fn enter_nesting(&mut self) -> bool {
        if self.depth >= MAX_NESTING_DEPTH {
            self.errors
                .push(ParseError::nesting_too_deep(MAX_NESTING_DEPTH, &self.current));
            return false;
        }
        self.depth += 1;
        true
    }

    fn parse_statement(&mut self) -> Option<Statement<'de>> {
        trace!(kind = %self.current.kind, literal = self.current.literal, "parse statement");
        match self.current.kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Statement<'de>> {
        let token = self.current;

        let ident = self.expect_peek(TokenKind::Ident)?;
        let name = Identifier {
            token: ident,
            value: ident.literal,
        };

        self.expect_peek(TokenKind::Assign)?;
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }

        Some(Statement::Let { token, name, value })
    }

    fn parse_return_statement(&mut self) -> Option<Statement<'de>> {
        let token = self.current;
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }

        Some(Statement::Return { token, value })
    }

    fn parse_expression_statement(&mut self) -> Option<Statement<'de>> {
        let token = self.current;
        let expression = self.parse_expression(Precedence::Lowest)?;

        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }

        Some(Statement::Expression { token, expression })
    }

    /// Parses `{ ... }` with the cursor on `{`, leaving it on the closing `}`.
    fn parse_block_statement(&mut self) -> Option<BlockStatement<'de>> {
        if !self.enter_nesting() {
            return None;
        }
        let block = self.parse_block_body();
        self.depth -= 1;
        block
    }

    fn parse_block_body(&mut self) -> Option<BlockStatement<'de>> {
        let token = self.current;
        let mut statements = Vec::new();

        self.next_token();

        while !self.current_is(TokenKind::RBrace) && !self.current_is(TokenKind::Eof) {
            match self.parse_statement() {
                Some(statement) => statements.push(statement),
                None => {
                    self.synchronize();
                    if self.current_is(TokenKind::RBrace) {
                        break;
                    }
                }
            }
            self.next_token();
        }

        if !self.current_is(TokenKind::RBrace) {
            self.errors
                .push(ParseError::unexpected(TokenKind::RBrace, &self.current));
            return None;
        }

        Some(BlockStatement { token, statements })
    }

    pub fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression<'de>> {
        if !self.enter_nesting() {
            return None;
        }
        let expression = self.parse_expression_within(precedence);
        self.depth -= 1;
        expression
    }

    fn parse_expression_within(&mut self, precedence: Precedence) -> Option<Expression<'de>> {
        let Some(prefix) = self.prefix_fns.get(&self.current.kind).copied() else {
            self.errors.push(ParseError::no_prefix(&self.current));
            return None;
        };
        let mut left = prefix(self)?;

        while !self.peek_is(TokenKind::Semicolon) && precedence < self.peek_precedence() {
            let Some(infix) = self.infix_fns.get(&self.peek.kind).copied() else {
                return Some(left);
            };
            self.next_token();
            left = infix(self, left)?;
        }

        Some(left)
    }

    fn parse_identifier(&mut self) -> Option<Expression<'de>> {
        Some(Expression::Identifier(Identifier {
            token: self.current,
            value: self.current.literal,
        }))
    }

    fn parse_integer_literal(&mut self) -> Option<Expression<'de>> {
        let token = self.current;
        match parse_int(token.literal) {
            Some(value) => Some(Expression::Integer { token, value }),
            None => {
                self.errors.push(ParseError::invalid_integer(&token));
                None
            }
        }
    }

    fn parse_boolean(&mut self) -> Option<Expression<'de>> {
        Some(Expression::Boolean {
            token: self.current,
            value: self.current_is(TokenKind::True),
        })
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression<'de>> {
        let token = self.current;
        self.next_token();

        let right = self.parse_expression(Precedence::Prefix)?;

        Some(Expression::Prefix {
            token,
            operator: token.literal,
            right: Box::new(right),
        })
    }

    fn parse_infix_expression(&mut self, left: Expression<'de>) -> Option<Expression<'de>> {
        let token = self.current;
        let precedence = self.current_precedence();
        self.next_token();

        let right = self.parse_expression(precedence)?;

        Some(Expression::Infix {
            token,
            left: Box::new(left),
            operator: token.literal,
            right: Box::new(right),
        })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression<'de>> {
        self.next_token();

        let expression = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RParen)?;

        Some(expression)
    }

    fn parse_if_expression(&mut self) -> Option<Expression<'de>> {
        let token = self.current;

        self.expect_peek(TokenKind::LParen)?;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RParen)?;

        self.expect_peek(TokenKind::LBrace)?;
        let consequence = self.parse_block_statement()?;

        let alternative = if self.peek_is(TokenKind::Else) {
            self.next_token();
            self.expect_peek(TokenKind::LBrace)?;
            Some(self.parse_block_statement()?)
        } else {
            None
        };

        Some(Expression::If {
            token,
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    fn parse_function_literal(&mut self) -> Option<Expression<'de>> {
        let token = self.current;

        self.expect_peek(TokenKind::LParen)?;
        let parameters = self.parse_function_parameters()?;

        self.expect_peek(TokenKind::LBrace)?;
        let body = self.parse_block_statement()?;

        Some(Expression::Function {
            token,
            parameters,
            body,
        })
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<Identifier<'de>>> {
        let mut identifiers = Vec::new();

        if self.peek_is(TokenKind::RParen) {
            self.next_token();
            return Some(identifiers);
        }

        loop {
            let token = self.expect_peek(TokenKind::Ident)?;
            identifiers.push(Identifier {
                token,
                value: token.literal,
            });
            if !self.peek_is(TokenKind::Comma) {
                break;
            }
            self.next_token();
        }

        self.expect_peek(TokenKind::RParen)?;
        Some(identifiers)
    }

    fn parse_call_expression(&mut self, function: Expression<'de>) -> Option<Expression<'de>> {
        let token = self.current;
        let arguments = self.parse_call_arguments()?;

        Some(Expression::Call {
            token,
            function: Box::new(function),
            arguments,
        })
    }

    fn parse_call_arguments(&mut self) -> Option<Vec<Expression<'de>>> {
        let mut arguments = Vec::new();

        if self.peek_is(TokenKind::RParen) {
            self.next_token();
            return Some(arguments);
        }

        self.next_token();
        arguments.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            arguments.push(self.parse_expression(Precedence::Lowest)?);
        }

        self.expect_peek(TokenKind::RParen)?;
        Some(arguments)
    }
}

/// Parses an unsigned integer literal the way Go's `strconv.ParseInt(s, 0, 64)`
/// does: `0x`, `0o`, `0b` and legacy leading-`0` octal prefixes, `_` separators.
pub fn parse_int(literal: &str) -> Option<i64> {
    let (digits, radix, prefixed) = match literal.get(..2) {
        Some("0x" | "0X") => (&literal[2..], 16, true),
        Some("0o" | "0O") => (&literal[2..], 8, true),
        Some("0b" | "0B") => (&literal[2..], 2, true),
        Some(_) if literal.starts_with('0') => (&literal[1..], 8, true),
        _ => (literal, 10, false),
    };

    if digits.is_empty()
        || digits.ends_with('_')
        || digits.contains("__")
        || (!prefixed && digits.starts_with('_'))
        || !digits.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
    {
        return None;
    }

    let cleaned: String = digits.chars().filter(|&c| c != '_').collect();
    i64::from_str_radix(&cleaned, radix).ok()
}
