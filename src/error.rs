use miette::{Diagnostic, NamedSource, Report, SourceSpan};
use thiserror::Error;

use crate::token::{Token, TokenKind, line_of};

/// A recoverable syntax error. The parser records these and keeps going.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected next token to be {expected}, got {found} instead")]
    #[diagnostic(code(monkey::parse::unexpected_token), help("use `{expected}` here instead"))]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("no prefix parse function for {kind} found")]
    #[diagnostic(
        code(monkey::parse::no_prefix),
        help("an expression cannot start with `{kind}`")
    )]
    NoPrefixParseFn {
        kind: TokenKind,
        #[label("this token")]
        span: SourceSpan,
    },

    #[error("could not parse {literal:?} as integer")]
    #[diagnostic(
        code(monkey::parse::invalid_integer),
        help("integers are 64-bit signed, optionally prefixed with 0x, 0o or 0b")
    )]
    InvalidInteger {
        literal: String,
        #[label("this numeric literal")]
        span: SourceSpan,
    },

    #[error("expression nested more than {limit} levels deep")]
    #[diagnostic(
        code(monkey::parse::nesting_too_deep),
        help("split the expression into smaller `let` bindings")
    )]
    NestingTooDeep {
        limit: usize,
        #[label("nesting limit reached here")]
        span: SourceSpan,
    },
}

impl ParseError {
    pub fn unexpected(expected: TokenKind, found: &Token<'_>) -> Self {
        ParseError::UnexpectedToken {
            expected,
            found: found.kind,
            span: found.span().into(),
        }
    }

    pub fn no_prefix(token: &Token<'_>) -> Self {
        ParseError::NoPrefixParseFn {
            kind: token.kind,
            span: token.span().into(),
        }
    }

    pub fn invalid_integer(token: &Token<'_>) -> Self {
        ParseError::InvalidInteger {
            literal: token.literal.to_string(),
            span: token.span().into(),
        }
    }

    pub fn nesting_too_deep(limit: usize, token: &Token<'_>) -> Self {
        ParseError::NestingTooDeep {
            limit,
            span: token.span().into(),
        }
    }

    pub fn span(&self) -> SourceSpan {
        match self {
            ParseError::UnexpectedToken { span, .. }
            | ParseError::NoPrefixParseFn { span, .. }
            | ParseError::InvalidInteger { span, .. }
            | ParseError::NestingTooDeep { span, .. } => *span,
        }
    }

    /// 1-based line the error points at.
    pub fn line(&self, source: &str) -> usize {
        line_of(source, self.span().offset())
    }

    /// Wraps the error in a report that renders the offending source.
    pub fn to_report(&self, filename: &str, source: &str) -> Report {
        Report::new(self.clone()).with_source_code(NamedSource::new(filename, source.to_string()))
    }
}
