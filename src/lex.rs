use crate::token::{Token, TokenKind, lookup_ident};

pub struct Lexer<'de> {
    filename: Option<&'de str>,
    whole: &'de str,
    rest: &'de str,
    pub byte: usize,
    finished: bool,
}

impl<'de> Lexer<'de> {
    pub fn new(filename: Option<&'de str>, input: &'de str) -> Self {
        Lexer {
            filename,
            whole: input,
            rest: input,
            byte: 0,
            finished: false,
        }
    }

    pub fn filename(&self) -> &'de str {
        self.filename.unwrap_or("<input>")
    }

    pub fn source(&self) -> &'de str {
        self.whole
    }

    /// Returns the next token, or `Eof` on every call once the input is used up.
    pub fn next_token(&mut self) -> Token<'de> {
        loop {
            let mut chars = self.rest.chars();
            let Some(c) = chars.next() else {
                return Token::eof(self.byte);
            };
            let start = self.byte;
            let literal = &self.rest[..c.len_utf8()];
            let cur = self.rest;
            self.rest = chars.as_str();
            self.byte += c.len_utf8();

            enum Start {
                Ident,
                Number,
                IfEqualElse(TokenKind, TokenKind),
            }

            let process = |kind: TokenKind| Token::new(kind, literal, start);

            let started = match c {
                '(' => return process(TokenKind::LParen),
                ')' => return process(TokenKind::RParen),
                '{' => return process(TokenKind::LBrace),
                '}' => return process(TokenKind::RBrace),
                ',' => return process(TokenKind::Comma),
                ';' => return process(TokenKind::Semicolon),
                '+' => return process(TokenKind::Plus),
                '-' => return process(TokenKind::Minus),
                '*' => return process(TokenKind::Asterisk),
                '/' => return process(TokenKind::Slash),
                '<' => return process(TokenKind::Lt),
                '>' => return process(TokenKind::Gt),
                '=' => Start::IfEqualElse(TokenKind::Eq, TokenKind::Assign),
                '!' => Start::IfEqualElse(TokenKind::NotEq, TokenKind::Bang),
                'a'..='z' | 'A'..='Z' | '_' => Start::Ident,
                '0'..='9' => Start::Number,
                ' ' | '\r' | '\t' | '\n' => continue,
                _ => return process(TokenKind::Illegal),
            };

            match started {
                Start::Ident | Start::Number => {
                    let end = cur
                        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                        .unwrap_or(cur.len());
                    let literal = &cur[..end];

                    let extra_bytes = literal.len() - c.len_utf8();
                    self.byte += extra_bytes;
                    self.rest = &self.rest[extra_bytes..];

                    let kind = match started {
                        Start::Ident => lookup_ident(literal),
                        _ => TokenKind::Int,
                    };
                    return Token::new(kind, literal, start);
                }
                Start::IfEqualElse(yes, no) => {
                    if self.rest.starts_with('=') {
                        self.rest = &self.rest[1..];
                        self.byte += 1;
                        return Token::new(yes, &cur[..2], start);
                    } else {
                        return process(no);
                    }
                }
            }
        }
    }
}

/// Yields every token of the input followed by a single `Eof`.
impl<'de> Iterator for Lexer<'de> {
    type Item = Token<'de>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.is(TokenKind::Eof) {
            self.finished = true;
        }
        Some(token)
    }
}

impl std::iter::FusedIterator for Lexer<'_> {}
