pub mod ast;
pub mod error;
pub mod lex;
pub mod logger;
pub mod parse;
pub mod token;

pub use ast::{Expression, Program, Statement};
pub use error::ParseError;
pub use lex::Lexer;
pub use parse::Parser;
pub use token::{Token, TokenKind};

/// Parses `source` in one pass, returning the program and any recorded errors.
pub fn parse_source<'de>(
    filename: Option<&'de str>,
    source: &'de str,
) -> (Program<'de>, Vec<ParseError>) {
    let mut parser = Parser::new(Lexer::new(filename, source));
    let program = parser.parse_program();
    (program, parser.errors().to_vec())
}
