//! The token source (spec.md §1, §3.1, §6.2).
//!
//! Out of scope for the design proper ("consumes a byte stream; emits a
//! sequence of typed tokens... supports a one-token pushback") but
//! implemented here in full so the pipeline is runnable end to end.

use crate::token::{Payload, Token, TokenKind};
use tlc_common::{DiagnosticBag, Span};

pub struct Lexer<'src> {
    src: &'src [u8],
    pos: usize,
    line: u32,
    column: u32,
    pushback: Option<Token>,
}

fn keyword(word: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match word {
        "module" => Module,
        "import" => Import,
        "void" => Void,
        "ubyte" => Ubyte,
        "byte" => Byte,
        "char" => Char,
        "ushort" => Ushort,
        "short" => Short,
        "uint" => Uint,
        "int" => Int,
        "wchar" => Wchar,
        "ulong" => Ulong,
        "long" => Long,
        "float" => Float,
        "double" => Double,
        "bool" => Bool,
        "const" => Const,
        "volatile" => Volatile,
        "opaque" => Opaque,
        "struct" => Struct,
        "union" => Union,
        "enum" => Enum,
        "typedef" => Typedef,
        "if" => If,
        "else" => Else,
        "while" => While,
        "do" => Do,
        "for" => For,
        "switch" => Switch,
        "case" => Case,
        "default" => Default,
        "break" => Break,
        "continue" => Continue,
        "return" => Return,
        "asm" => Asm,
        "cast" => Cast,
        "sizeof" => Sizeof,
        "true" => True,
        "false" => False,
        "null" => Null,
        _ => return None,
    })
}

impl<'src> Lexer<'src> {
    #[must_use]
    pub fn new(src: &'src str) -> Self {
        Lexer {
            src: src.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
            pushback: None,
        }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.peek_byte()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(b)
    }

    fn here(&self) -> Span {
        Span::new(self.line, self.column)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek_byte() {
                Some(b' ' | b'\t' | b'\r' | b'\n') => {
                    self.advance();
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while !matches!(self.peek_byte(), None | Some(b'\n')) {
                        self.advance();
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    self.advance();
                    self.advance();
                    while self.peek_byte().is_some()
                        && !(self.peek_byte() == Some(b'*') && self.peek_at(1) == Some(b'/'))
                    {
                        self.advance();
                    }
                    self.advance();
                    self.advance();
                }
                _ => break,
            }
        }
    }

    /// Push one token back. Only one level of pushback is supported.
    pub fn unread(&mut self, token: Token) {
        debug_assert!(self.pushback.is_none(), "lexer supports only one-token pushback");
        self.pushback = Some(token);
    }

    pub fn next_token(&mut self, diags: &mut DiagnosticBag) -> Token {
        if let Some(tok) = self.pushback.take() {
            return tok;
        }
        self.skip_trivia();
        let start = self.here();
        let Some(b) = self.peek_byte() else {
            return Token::simple(TokenKind::Eof, start);
        };

        if b.is_ascii_alphabetic() || b == b'_' {
            return self.lex_ident_or_keyword(start);
        }
        if b.is_ascii_digit() {
            return self.lex_number(start);
        }
        if b == b'\'' {
            return self.lex_char(start, diags, false);
        }
        if b == b'"' {
            return self.lex_string(start, diags, false);
        }
        if b == b'L' && matches!(self.peek_at(1), Some(b'\'')) {
            self.advance();
            return self.lex_char(start, diags, true);
        }
        if b == b'L' && matches!(self.peek_at(1), Some(b'"')) {
            self.advance();
            return self.lex_string(start, diags, true);
        }
        self.lex_operator(start, diags)
    }

    fn lex_ident_or_keyword(&mut self, start: Span) -> Token {
        let begin = self.pos;
        while matches!(self.peek_byte(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
            self.advance();
        }
        let text = std::str::from_utf8(&self.src[begin..self.pos]).unwrap_or("").to_string();
        if let Some(kw) = keyword(&text) {
            Token::simple(kw, start)
        } else {
            Token::new(TokenKind::Id, start, Payload::Ident(text))
        }
    }

    fn lex_number(&mut self, start: Span) -> Token {
        let begin = self.pos;
        if self.peek_byte() == Some(b'0') {
            match self.peek_at(1) {
                Some(b'b' | b'B') => {
                    self.advance();
                    self.advance();
                    let digits_start = self.pos;
                    while matches!(self.peek_byte(), Some(b'0' | b'1' | b'_')) {
                        self.advance();
                    }
                    let text: String = std::str::from_utf8(&self.src[digits_start..self.pos])
                        .unwrap_or("")
                        .chars()
                        .filter(|c| *c != '_')
                        .collect();
                    let value = u64::from_str_radix(&text, 2).unwrap_or(0);
                    return Token::new(TokenKind::LitInt, start, Payload::Int(value));
                }
                Some(b'x' | b'X') => {
                    self.advance();
                    self.advance();
                    let digits_start = self.pos;
                    while matches!(self.peek_byte(), Some(b) if b.is_ascii_hexdigit() || b == b'_') {
                        self.advance();
                    }
                    let text: String = std::str::from_utf8(&self.src[digits_start..self.pos])
                        .unwrap_or("")
                        .chars()
                        .filter(|c| *c != '_')
                        .collect();
                    let value = u64::from_str_radix(&text, 16).unwrap_or(0);
                    return Token::new(TokenKind::LitInt, start, Payload::Int(value));
                }
                Some(b'0'..=b'7') => {
                    self.advance();
                    let digits_start = self.pos;
                    while matches!(self.peek_byte(), Some(b'0'..=b'7' | b'_')) {
                        self.advance();
                    }
                    let text: String = std::str::from_utf8(&self.src[digits_start..self.pos])
                        .unwrap_or("")
                        .chars()
                        .filter(|c| *c != '_')
                        .collect();
                    let value = u64::from_str_radix(&text, 8).unwrap_or(0);
                    return Token::new(TokenKind::LitInt, start, Payload::Int(value));
                }
                _ => {
                    // standalone "0" handled by the decimal/float path below
                }
            }
        }
        while matches!(self.peek_byte(), Some(b) if b.is_ascii_digit() || b == b'_') {
            self.advance();
        }
        let mut is_float = false;
        if self.peek_byte() == Some(b'.') && matches!(self.peek_at(1), Some(b) if b.is_ascii_digit())
        {
            is_float = true;
            self.advance();
            while matches!(self.peek_byte(), Some(b) if b.is_ascii_digit() || b == b'_') {
                self.advance();
            }
        }
        if matches!(self.peek_byte(), Some(b'e' | b'E')) {
            let save = self.pos;
            self.advance();
            if matches!(self.peek_byte(), Some(b'+' | b'-')) {
                self.advance();
            }
            if matches!(self.peek_byte(), Some(b) if b.is_ascii_digit()) {
                is_float = true;
                while matches!(self.peek_byte(), Some(b) if b.is_ascii_digit()) {
                    self.advance();
                }
            } else {
                self.pos = save;
            }
        }
        let is_double = is_float && matches!(self.peek_byte(), Some(b'd' | b'D'));
        let is_float_suffix = is_float && matches!(self.peek_byte(), Some(b'f' | b'F'));
        if is_double || is_float_suffix {
            self.advance();
        }
        let text: String = std::str::from_utf8(&self.src[begin..self.pos])
            .unwrap_or("")
            .chars()
            .filter(|c| !matches!(c, '_' | 'f' | 'F' | 'd' | 'D'))
            .collect();
        if is_float {
            let value: f64 = text.parse().unwrap_or(0.0);
            let kind = if is_float_suffix {
                TokenKind::LitFloat
            } else {
                TokenKind::LitDouble
            };
            Token::new(kind, start, Payload::Float(value))
        } else {
            let value: u64 = text.parse().unwrap_or(0);
            Token::new(TokenKind::LitInt, start, Payload::Int(value))
        }
    }

    fn read_escape(&mut self, diags: &mut DiagnosticBag, wide: bool) -> u32 {
        match self.advance() {
            Some(b'n') => b'\n' as u32,
            Some(b't') => b'\t' as u32,
            Some(b'r') => b'\r' as u32,
            Some(b'0') => 0,
            Some(b'\\') => b'\\' as u32,
            Some(b'\'') => b'\'' as u32,
            Some(b'"') => b'"' as u32,
            Some(other) => {
                if !wide {
                    diags.warning(self.here(), format!("unrecognized escape '\\{}'", other as char));
                }
                other as u32
            }
            None => {
                diags.error(self.here(), "unterminated escape sequence");
                0
            }
        }
    }

    fn lex_char(&mut self, start: Span, diags: &mut DiagnosticBag, wide: bool) -> Token {
        self.advance(); // opening quote
        let value = if self.peek_byte() == Some(b'\\') {
            self.advance();
            self.read_escape(diags, wide)
        } else if let Some(b) = self.advance() {
            b as u32
        } else {
            diags.error(start, "unterminated character literal");
            0
        };
        if self.peek_byte() == Some(b'\'') {
            self.advance();
        } else {
            diags.error(self.here(), "unterminated character literal");
        }
        if wide {
            Token::new(TokenKind::LitWChar, start, Payload::WChar(value))
        } else {
            Token::new(
                TokenKind::LitChar,
                start,
                Payload::Char(char::from_u32(value).unwrap_or('\0')),
            )
        }
    }

    fn lex_string(&mut self, start: Span, diags: &mut DiagnosticBag, wide: bool) -> Token {
        self.advance(); // opening quote
        let mut narrow = Vec::new();
        let mut wide_buf = Vec::new();
        loop {
            match self.peek_byte() {
                Some(b'"') => {
                    self.advance();
                    break;
                }
                None | Some(b'\n') => {
                    diags.error(self.here(), "unterminated string literal");
                    break;
                }
                Some(b'\\') => {
                    self.advance();
                    let v = self.read_escape(diags, wide);
                    if wide {
                        wide_buf.push(v);
                    } else {
                        narrow.push(v as u8);
                    }
                }
                Some(b) => {
                    self.advance();
                    if wide {
                        wide_buf.push(b as u32);
                    } else {
                        narrow.push(b);
                    }
                }
            }
        }
        if wide {
            Token::new(TokenKind::LitWString, start, Payload::WStr(wide_buf))
        } else {
            Token::new(TokenKind::LitString, start, Payload::Str(narrow))
        }
    }

    fn lex_operator(&mut self, start: Span, diags: &mut DiagnosticBag) -> Token {
        use TokenKind::*;
        macro_rules! two {
            ($second:expr, $two_kind:expr, $one_kind:expr) => {{
                self.advance();
                if self.peek_byte() == Some($second) {
                    self.advance();
                    return Token::simple($two_kind, start);
                }
                return Token::simple($one_kind, start);
            }};
        }
        let b = self.advance().expect("checked by caller");
        match b {
            b'(' => Token::simple(LParen, start),
            b')' => Token::simple(RParen, start),
            b'{' => Token::simple(LBrace, start),
            b'}' => Token::simple(RBrace, start),
            b'[' => Token::simple(LBracket, start),
            b']' => Token::simple(RBracket, start),
            b';' => Token::simple(Semicolon, start),
            b',' => Token::simple(Comma, start),
            b'~' => Token::simple(Tilde, start),
            b'?' => Token::simple(Question, start),
            b':' => {
                if self.peek_byte() == Some(b':') {
                    self.advance();
                    Token::simple(ColonColon, start)
                } else {
                    Token::simple(Colon, start)
                }
            }
            b'.' => Token::simple(Dot, start),
            b'+' => {
                if self.peek_byte() == Some(b'+') {
                    self.advance();
                    Token::simple(PlusPlus, start)
                } else if self.peek_byte() == Some(b'=') {
                    self.advance();
                    Token::simple(AddAssign, start)
                } else {
                    Token::simple(Plus, start)
                }
            }
            b'-' => {
                if self.peek_byte() == Some(b'-') {
                    self.advance();
                    Token::simple(MinusMinus, start)
                } else if self.peek_byte() == Some(b'=') {
                    self.advance();
                    Token::simple(SubAssign, start)
                } else if self.peek_byte() == Some(b'>') {
                    self.advance();
                    Token::simple(Arrow, start)
                } else {
                    Token::simple(Minus, start)
                }
            }
            b'*' => {
                if self.peek_byte() == Some(b'=') {
                    self.advance();
                    Token::simple(MulAssign, start)
                } else {
                    Token::simple(Star, start)
                }
            }
            b'/' => {
                if self.peek_byte() == Some(b'=') {
                    self.advance();
                    Token::simple(DivAssign, start)
                } else {
                    Token::simple(Slash, start)
                }
            }
            b'%' => {
                if self.peek_byte() == Some(b'=') {
                    self.advance();
                    Token::simple(ModAssign, start)
                } else {
                    Token::simple(Percent, start)
                }
            }
            b'=' => {
                if self.peek_byte() == Some(b'=') {
                    self.advance();
                    Token::simple(Eq, start)
                } else {
                    Token::simple(Assign, start)
                }
            }
            b'!' => {
                if self.peek_byte() == Some(b'=') {
                    self.advance();
                    Token::simple(Neq, start)
                } else {
                    Token::simple(Bang, start)
                }
            }
            b'<' => {
                if self.peek_byte() == Some(b'=') {
                    self.advance();
                    if self.peek_byte() == Some(b'>') {
                        self.advance();
                        Token::simple(Spaceship, start)
                    } else {
                        Token::simple(Le, start)
                    }
                } else if self.peek_byte() == Some(b'<') {
                    self.advance();
                    if self.peek_byte() == Some(b'=') {
                        self.advance();
                        Token::simple(ShlAssign, start)
                    } else {
                        Token::simple(Shl, start)
                    }
                } else {
                    Token::simple(Lt, start)
                }
            }
            b'>' => {
                if self.peek_byte() == Some(b'=') {
                    self.advance();
                    Token::simple(Ge, start)
                } else if self.peek_byte() == Some(b'>') {
                    self.advance();
                    if self.peek_byte() == Some(b'=') {
                        self.advance();
                        Token::simple(ShrAssign, start)
                    } else {
                        Token::simple(Shr, start)
                    }
                } else {
                    Token::simple(Gt, start)
                }
            }
            b'&' => {
                if self.peek_byte() == Some(b'&') {
                    self.advance();
                    if self.peek_byte() == Some(b'=') {
                        self.advance();
                        Token::simple(LandAssign, start)
                    } else {
                        Token::simple(LogAnd, start)
                    }
                } else if self.peek_byte() == Some(b'=') {
                    self.advance();
                    Token::simple(AndAssign, start)
                } else {
                    Token::simple(Amp, start)
                }
            }
            b'|' => {
                if self.peek_byte() == Some(b'|') {
                    self.advance();
                    if self.peek_byte() == Some(b'=') {
                        self.advance();
                        Token::simple(LorAssign, start)
                    } else {
                        Token::simple(LogOr, start)
                    }
                } else if self.peek_byte() == Some(b'=') {
                    self.advance();
                    Token::simple(OrAssign, start)
                } else {
                    Token::simple(Pipe, start)
                }
            }
            b'^' => two!(b'=', XorAssign, Caret),
            other => {
                diags.error(start, format!("unrecognized character '{}'", other as char));
                Token::simple(Eof, start)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/lexer_tests.rs"]
mod tests;
