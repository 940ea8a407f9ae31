//! Type parsing (spec.md §3.2, §4.1).
//!
//! Grammar (design level):
//!
//! ```text
//! Type       = Qualifier* BaseType TypeSuffix*
//!            | Qualifier* BaseType '(' '*' ')' '(' TypeList? ')'   -- function pointer
//! Qualifier  = 'const' | 'volatile'
//! BaseType   = keyword-type | ScopedId
//! TypeSuffix = '*' | '[' IntLiteral ']'
//! ```

use super::Parser;
use crate::ast::{KeywordType, TypeExpr};
use tlc_lexer::{Payload, TokenKind};

impl<'src> Parser<'src> {
    /// Context-ignorant: on failure, unreads everything it peeked and
    /// returns `None` without reporting an error (the caller decides
    /// whether absence of a type is itself an error).
    pub(crate) fn try_parse_type(&mut self) -> Option<TypeExpr> {
        let start = self.span();
        let mut is_const = false;
        let mut is_volatile = false;
        loop {
            match self.peek().kind {
                TokenKind::Const => {
                    is_const = true;
                    self.bump();
                }
                TokenKind::Volatile => {
                    is_volatile = true;
                    self.bump();
                }
                _ => break,
            }
        }

        let base = self.try_parse_base_type()?;

        let base = if is_const || is_volatile {
            TypeExpr::Qualified {
                base: Box::new(base),
                is_const,
                is_volatile,
                span: start,
            }
        } else {
            base
        };

        // Function pointer: `(` `*` `)` `(` args? `)`
        if self.at(&TokenKind::LParen) {
            let saved = self.bump();
            if self.at(&TokenKind::Star) {
                self.bump();
                if self.expect(TokenKind::RParen, "')'").is_some()
                    && self.expect(TokenKind::LParen, "'('").is_some()
                {
                    let mut arg_types = Vec::new();
                    if !self.at(&TokenKind::RParen) {
                        loop {
                            let Some(arg_ty) = self.try_parse_type() else {
                                self.error(self.span(), "expected a type in function pointer argument list");
                                break;
                            };
                            arg_types.push(arg_ty);
                            if self.at(&TokenKind::Comma) {
                                self.bump();
                            } else {
                                break;
                            }
                        }
                    }
                    self.expect(TokenKind::RParen, "')'");
                    return Some(self.apply_suffixes(TypeExpr::FunPtr {
                        return_type: Box::new(base),
                        arg_types,
                        span: start,
                    }));
                }
                return Some(base);
            }
            // Not a function pointer after all: put the '(' back.
            self.unread(saved);
        }

        Some(self.apply_suffixes(base))
    }

    fn apply_suffixes(&mut self, mut ty: TypeExpr) -> TypeExpr {
        loop {
            match self.peek().kind {
                TokenKind::Star => {
                    let span = self.span();
                    self.bump();
                    ty = TypeExpr::Pointer {
                        base: Box::new(ty),
                        span,
                    };
                }
                TokenKind::LBracket => {
                    let span = self.span();
                    self.bump();
                    let length = match self.peek().payload.clone() {
                        Payload::Int(n) => {
                            self.bump();
                            n
                        }
                        _ => {
                            self.error(self.span(), "expected an array length");
                            0
                        }
                    };
                    self.expect(TokenKind::RBracket, "']'");
                    ty = TypeExpr::Array {
                        length,
                        element: Box::new(ty),
                        span,
                    };
                }
                _ => break,
            }
        }
        ty
    }

    fn try_parse_base_type(&mut self) -> Option<TypeExpr> {
        let span = self.span();
        let kind = match self.peek().kind {
            TokenKind::Void => KeywordType::Void,
            TokenKind::Ubyte => KeywordType::Ubyte,
            TokenKind::Byte => KeywordType::Byte,
            TokenKind::Char => KeywordType::Char,
            TokenKind::Ushort => KeywordType::Ushort,
            TokenKind::Short => KeywordType::Short,
            TokenKind::Uint => KeywordType::Uint,
            TokenKind::Int => KeywordType::Int,
            TokenKind::Wchar => KeywordType::Wchar,
            TokenKind::Ulong => KeywordType::Ulong,
            TokenKind::Long => KeywordType::Long,
            TokenKind::Float => KeywordType::Float,
            TokenKind::Double => KeywordType::Double,
            TokenKind::Bool => KeywordType::Bool,
            TokenKind::Id => {
                let scoped = self.try_parse_scoped_id()?;
                return Some(TypeExpr::Named(scoped));
            }
            _ => return None,
        };
        self.bump();
        Some(TypeExpr::Keyword { kind, span })
    }
}
