use super::*;
use tlc_common::DiagnosticBag;

fn lex_all(src: &str) -> (Vec<Token>, DiagnosticBag) {
    let mut lexer = Lexer::new(src);
    let mut diags = DiagnosticBag::new();
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.next_token(&mut diags);
        let is_eof = tok.is_eof();
        tokens.push(tok);
        if is_eof {
            break;
        }
    }
    (tokens, diags)
}

#[test]
fn lexes_keywords_and_identifiers() {
    let (tokens, diags) = lex_all("module foo import bar");
    assert!(diags.is_empty());
    assert_eq!(tokens[0].kind, TokenKind::Module);
    assert_eq!(tokens[1].kind, TokenKind::Id);
    assert_eq!(tokens[1].payload, Payload::Ident("foo".to_string()));
    assert_eq!(tokens[2].kind, TokenKind::Import);
}

#[test]
fn lexes_integer_literals_in_four_radices() {
    let (tokens, diags) = lex_all("0b101 017 0x1F 42 0");
    assert!(diags.is_empty());
    assert_eq!(tokens[0].payload, Payload::Int(5));
    assert_eq!(tokens[1].payload, Payload::Int(15)); // 017 octal = 15
    assert_eq!(tokens[2].payload, Payload::Int(31)); // 0x1F
    assert_eq!(tokens[3].payload, Payload::Int(42));
    assert_eq!(tokens[4].payload, Payload::Int(0));
}

#[test]
fn lexes_float_and_double_literals() {
    let (tokens, _diags) = lex_all("1.5 2.0e3 3.0f");
    assert_eq!(tokens[0].kind, TokenKind::LitDouble);
    assert_eq!(tokens[1].kind, TokenKind::LitDouble);
    assert_eq!(tokens[2].kind, TokenKind::LitFloat);
}

#[test]
fn lexes_string_with_escapes() {
    let (tokens, diags) = lex_all(r#""hi\n""#);
    assert!(diags.is_empty());
    assert_eq!(tokens[0].kind, TokenKind::LitString);
    assert_eq!(tokens[0].payload, Payload::Str(vec![b'h', b'i', b'\n']));
}

#[test]
fn unterminated_string_reports_error() {
    let (_tokens, diags) = lex_all("\"oops");
    assert!(diags.errored());
}

#[test]
fn lexes_operators_longest_match_first() {
    let (tokens, _) = lex_all("<=> << <<= >>= >> ::");
    assert_eq!(tokens[0].kind, TokenKind::Spaceship);
    assert_eq!(tokens[1].kind, TokenKind::Shl);
    assert_eq!(tokens[2].kind, TokenKind::ShlAssign);
    assert_eq!(tokens[3].kind, TokenKind::ShrAssign);
    assert_eq!(tokens[4].kind, TokenKind::Shr);
    assert_eq!(tokens[5].kind, TokenKind::ColonColon);
}

#[test]
fn unread_returns_the_same_token_once() {
    let mut lexer = Lexer::new("a b");
    let mut diags = DiagnosticBag::new();
    let first = lexer.next_token(&mut diags);
    lexer.unread(first.clone());
    let replayed = lexer.next_token(&mut diags);
    assert_eq!(first, replayed);
    let second = lexer.next_token(&mut diags);
    assert_eq!(second.payload, Payload::Ident("b".to_string()));
}

#[test]
fn skips_line_and_block_comments() {
    let (tokens, diags) = lex_all("a // comment\nb /* block */ c");
    assert!(diags.is_empty());
    assert_eq!(tokens.len(), 4); // a, b, c, eof
}
