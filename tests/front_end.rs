use monkey_front::parse::MAX_NESTING_DEPTH;
use monkey_front::{Expression, Lexer, Parser, Statement, TokenKind, parse_source};
use proptest::prelude::*;

#[test]
fn tokenizes_let_statement() {
    let tokens: Vec<_> = Lexer::new(None, "let x = 5;")
        .map(|token| (token.kind, token.literal))
        .collect();

    assert_eq!(
        tokens,
        [
            (TokenKind::Let, "let"),
            (TokenKind::Ident, "x"),
            (TokenKind::Assign, "="),
            (TokenKind::Int, "5"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::Eof, ""),
        ]
    );
}

#[test]
fn parses_a_small_program() {
    let source = "\
let five = 5;
let add = fn(x, y) {
  x + y;
};
let result = add(five, 10);
if (result > 10) { return true; } else { return false; }
";
    let (program, errors) = parse_source(Some("small.monkey"), source);
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(program.statements.len(), 4);

    let rendered: Vec<_> = program.statements.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        [
            "let five = 5;",
            "let add = fn(x, y) (x + y);",
            "let result = add(five, 10);",
            "if(result > 10) return true;else return false;",
        ]
    );

    let Statement::Let { value, .. } = &program.statements[1] else {
        panic!("expected let statement");
    };
    assert!(matches!(value, Expression::Function { parameters, .. } if parameters.len() == 2));
}

#[test]
fn nodes_keep_their_tokens() {
    let source = "let answer = 6 * 7;";
    let (program, _) = parse_source(None, source);
    let Statement::Let { token, name, value } = &program.statements[0] else {
        panic!("expected let statement");
    };
    assert_eq!(token.offset, 0);
    assert_eq!(name.token.offset, 4);
    assert_eq!(value.token().kind, TokenKind::Asterisk);
    assert_eq!(&source[value.token().span()], "*");
}

#[test]
fn reports_several_errors_in_one_pass() {
    let (program, errors) = parse_source(None, "let x 5;\nlet = 1;\nlet ok = 1;\n@");
    let messages: Vec<_> = errors.iter().map(ToString::to_string).collect();
    assert_eq!(
        messages,
        [
            "expected next token to be =, got INT instead",
            "expected next token to be IDENT, got = instead",
            "no prefix parse function for ILLEGAL found",
        ]
    );
    assert_eq!(program.statements.len(), 1);
}

#[test]
fn recovery_does_not_leak_block_contents() {
    let source = "let f = fn(1) { a; b; };\nlet g = fn() { if (x { a } b };\nc;";
    let (program, errors) = parse_source(None, source);
    let rendered: Vec<_> = program.statements.iter().map(ToString::to_string).collect();
    assert_eq!(rendered, ["let g = fn() ;", "c"]);
    assert_eq!(errors.len(), 2, "{errors:?}");
}

#[test]
fn deeply_nested_input_reports_instead_of_overflowing() {
    for source in [
        format!("{}x", "-".repeat(10_000)),
        format!("{}x{}", "(".repeat(10_000), ")".repeat(10_000)),
        format!("{}{}", "if (x) { ".repeat(10_000), "}".repeat(10_000)),
    ] {
        let (_, errors) = parse_source(None, &source);
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert_eq!(
            errors[0].to_string(),
            format!("expression nested more than {MAX_NESTING_DEPTH} levels deep")
        );
    }
}

/// Tokens that can begin a statement: `let`, `return`, or an expression start.
fn starts_statement(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Let
            | TokenKind::Return
            | TokenKind::Ident
            | TokenKind::Int
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Bang
            | TokenKind::Minus
            | TokenKind::LParen
            | TokenKind::If
            | TokenKind::Function
    )
}

fn nested_source() -> impl Strategy<Value = String> {
    let opener = prop::sample::select(vec!["(", "-", "!", "{", "fn() {", "if (x) {"]);
    let closer = prop::sample::select(vec![")", "}", ";", "1", "x"]);
    (
        prop::collection::vec(opener, 0..2_000),
        prop::collection::vec(closer, 0..2_000),
    )
        .prop_map(|(open, close)| format!("{} 1 {}", open.concat(), close.concat()))
}

fn monkey_source() -> impl Strategy<Value = String> {
    let piece = prop::sample::select(vec![
        "let", "return", "fn", "if", "else", "true", "false", "x", "y", "add", "0", "5", "0x1F",
        "12ab", "=", "==", "!=", "!", "+", "-", "*", "/", "<", ">", ",", ";", "(", ")", "{", "}",
        "@", " ", "\n",
    ]);
    prop::collection::vec(piece, 0..40).prop_map(|pieces| pieces.join(" "))
}

proptest! {
    #[test]
    fn parsing_terminates_and_is_bounded(source in monkey_source()) {
        let starts = Lexer::new(None, &source)
            .filter(|token| starts_statement(token.kind))
            .count();
        let (program, _) = parse_source(None, &source);
        prop_assert!(program.statements.len() <= starts);
    }

    #[test]
    fn nested_input_terminates(source in nested_source()) {
        let starts = Lexer::new(None, &source)
            .filter(|token| starts_statement(token.kind))
            .count();
        let (program, _) = parse_source(None, &source);
        prop_assert!(program.statements.len() <= starts);
    }

    #[test]
    fn grouping_depth_limit_is_exact(depth in 0usize..1_000) {
        let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        let (program, errors) = parse_source(None, &source);
        if depth < MAX_NESTING_DEPTH {
            prop_assert!(errors.is_empty(), "{:?}", errors);
            prop_assert_eq!(program.to_string(), "1");
        } else {
            prop_assert_eq!(errors.len(), 1);
            prop_assert!(program.statements.is_empty());
        }
    }

    #[test]
    fn parsing_is_deterministic(source in monkey_source()) {
        let mut first = Parser::new(Lexer::new(None, &source));
        let mut second = Parser::new(Lexer::new(None, &source));
        prop_assert_eq!(first.parse_program(), second.parse_program());
        prop_assert_eq!(first.errors(), second.errors());
    }

    #[test]
    fn lexer_ends_with_exactly_one_eof(source in "\\PC{0,64}") {
        let tokens: Vec<_> = Lexer::new(None, &source).collect();
        let eofs = tokens.iter().filter(|token| token.is(TokenKind::Eof)).count();
        prop_assert_eq!(eofs, 1);
        prop_assert_eq!(tokens.last().map(|token| token.kind), Some(TokenKind::Eof));
    }
}
