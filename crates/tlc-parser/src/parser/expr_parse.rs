//! Expression parsing: a precedence climber over the operators of
//! spec.md §6.3.

use super::Parser;
use crate::ast::{AssignOp, BinOp, CmpOp, Expr, ExprKind, Identifier, LiteralValue, ScopedId, UnOp};
use tlc_lexer::{Payload, TokenKind};

/// Binding power table. Higher binds tighter. Assignment and the ternary
/// are right-associative; everything else here is left-associative.
fn infix_binding_power(kind: &TokenKind) -> Option<(u8, u8)> {
    use TokenKind::*;
    Some(match kind {
        LogOr => (1, 2),
        LogAnd => (3, 4),
        Pipe => (5, 6),
        Caret => (7, 8),
        Amp => (9, 10),
        Eq | Neq => (11, 12),
        Lt | Gt | Le | Ge | Spaceship => (13, 14),
        Shl | Shr => (15, 16),
        Plus | Minus => (17, 18),
        Star | Slash | Percent => (19, 20),
        _ => return None,
    })
}

fn is_assign_op(kind: &TokenKind) -> Option<AssignOp> {
    use TokenKind::*;
    Some(match kind {
        Assign => AssignOp::Assign,
        MulAssign => AssignOp::Mul,
        DivAssign => AssignOp::Div,
        ModAssign => AssignOp::Mod,
        AddAssign => AssignOp::Add,
        SubAssign => AssignOp::Sub,
        ShlAssign => AssignOp::Shl,
        ShrAssign => AssignOp::Shr,
        AndAssign => AssignOp::BitAnd,
        XorAssign => AssignOp::BitXor,
        OrAssign => AssignOp::BitOr,
        _ => return None,
    })
}

impl<'src> Parser<'src> {
    /// Context-ignorant: a bare identifier, no `::`.
    pub(crate) fn try_parse_ident(&mut self) -> Option<Identifier> {
        if self.at(&TokenKind::Id) {
            let tok = self.bump();
            Some(Identifier::new(Self::ident_text(&tok), tok.span))
        } else {
            None
        }
    }

    pub(crate) fn parse_ident(&mut self, what: &str) -> Option<Identifier> {
        match self.try_parse_ident() {
            Some(id) => Some(id),
            None => {
                let found = self.peek().clone();
                self.error_expected(what, &found);
                None
            }
        }
    }

    /// Context-ignorant: `Id ('::' Id)*`. A stray `::` with no following
    /// identifier is a non-fatal error that discards the whole partial
    /// list (spec.md §4.1).
    pub(crate) fn try_parse_scoped_id(&mut self) -> Option<ScopedId> {
        let first = self.try_parse_ident()?;
        let mut segments = vec![first];
        loop {
            if self.at(&TokenKind::ColonColon) {
                let cc_span = self.span();
                self.bump();
                match self.try_parse_ident() {
                    Some(id) => segments.push(id),
                    None => {
                        self.error(cc_span, "expected an identifier after '::'");
                        return None;
                    }
                }
            } else {
                break;
            }
        }
        let span = segments[0].span;
        Some(ScopedId { segments, span })
    }

    pub(crate) fn parse_expr(&mut self) -> Option<Expr> {
        let first = self.parse_assignment()?;
        if self.at(&TokenKind::Comma) {
            let span = first.span;
            let mut items = vec![first];
            while self.at(&TokenKind::Comma) {
                self.bump();
                items.push(self.parse_assignment()?);
            }
            Some(Expr::new(ExprKind::Seq(items), span))
        } else {
            Some(first)
        }
    }

    pub(crate) fn parse_assignment(&mut self) -> Option<Expr> {
        let lhs = self.parse_ternary()?;
        if let Some(op) = is_assign_op(&self.peek().kind) {
            self.bump();
            let value = self.parse_assignment()?;
            if !lhs.is_assignable_shape() {
                self.error(lhs.span, "left side of assignment is not assignable");
            }
            let span = lhs.span;
            return Some(Expr::new(
                ExprKind::Assign {
                    op,
                    target: Box::new(lhs),
                    value: Box::new(value),
                },
                span,
            ));
        }
        if matches!(self.peek().kind, TokenKind::LandAssign | TokenKind::LorAssign) {
            let is_and = self.peek().kind == TokenKind::LandAssign;
            self.bump();
            let value = self.parse_assignment()?;
            if !lhs.is_assignable_shape() {
                self.error(lhs.span, "left side of assignment is not assignable");
            }
            let span = lhs.span;
            return Some(Expr::new(
                ExprKind::AssignLogical {
                    is_and,
                    target: Box::new(lhs),
                    value: Box::new(value),
                },
                span,
            ));
        }
        Some(lhs)
    }

    fn parse_ternary(&mut self) -> Option<Expr> {
        let cond = self.parse_binary(0)?;
        if self.at(&TokenKind::Question) {
            let span = cond.span;
            self.bump();
            let then_branch = self.parse_assignment()?;
            self.expect(TokenKind::Colon, "':'")?;
            let else_branch = self.parse_assignment()?;
            return Some(Expr::new(
                ExprKind::Ternary {
                    cond: Box::new(cond),
                    then_branch: Box::new(then_branch),
                    else_branch: Box::new(else_branch),
                },
                span,
            ));
        }
        Some(cond)
    }

    fn parse_binary(&mut self, min_bp: u8) -> Option<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let kind = self.peek().kind.clone();
            if matches!(kind, TokenKind::LogAnd) {
                let (lbp, rbp) = (3u8, 4u8);
                if lbp < min_bp {
                    break;
                }
                let span = lhs.span;
                self.bump();
                let rhs = self.parse_binary(rbp)?;
                lhs = Expr::new(
                    ExprKind::LogAnd {
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    },
                    span,
                );
                continue;
            }
            if matches!(kind, TokenKind::LogOr) {
                let (lbp, rbp) = (1u8, 2u8);
                if lbp < min_bp {
                    break;
                }
                let span = lhs.span;
                self.bump();
                let rhs = self.parse_binary(rbp)?;
                lhs = Expr::new(
                    ExprKind::LogOr {
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    },
                    span,
                );
                continue;
            }
            let Some((lbp, rbp)) = infix_binding_power(&kind) else {
                break;
            };
            if lbp < min_bp {
                break;
            }
            let span = lhs.span;
            self.bump();
            let rhs = self.parse_binary(rbp)?;
            lhs = Self::build_binary(kind, lhs, rhs, span);
        }
        Some(lhs)
    }

    fn build_binary(kind: TokenKind, lhs: Expr, rhs: Expr, span: tlc_common::Span) -> Expr {
        use TokenKind::*;
        let cmp_op = match kind {
            Eq => Some(CmpOp::Eq),
            Neq => Some(CmpOp::Ne),
            Lt => Some(CmpOp::Lt),
            Gt => Some(CmpOp::Gt),
            Le => Some(CmpOp::Le),
            Ge => Some(CmpOp::Ge),
            Spaceship => Some(CmpOp::Spaceship),
            _ => None,
        };
        if let Some(op) = cmp_op {
            return Expr::new(
                ExprKind::Compare {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
        let bin_op = match kind {
            Pipe => BinOp::BitOr,
            Caret => BinOp::BitXor,
            Amp => BinOp::BitAnd,
            Shl => BinOp::Shl,
            Shr => BinOp::Shr,
            Plus => BinOp::Add,
            Minus => BinOp::Sub,
            Star => BinOp::Mul,
            Slash => BinOp::Div,
            Percent => BinOp::Mod,
            other => unreachable!("not a binary operator token: {other:?}"),
        };
        Expr::new(
            ExprKind::Binary {
                op: bin_op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            span,
        )
    }

    fn parse_unary(&mut self) -> Option<Expr> {
        let span = self.span();
        let op = match self.peek().kind {
            TokenKind::Minus => Some(UnOp::Neg),
            TokenKind::Bang => Some(UnOp::LogNot),
            TokenKind::Tilde => Some(UnOp::BitNot),
            TokenKind::Star => Some(UnOp::Deref),
            TokenKind::Amp => Some(UnOp::AddrOf),
            TokenKind::PlusPlus => Some(UnOp::PreInc),
            TokenKind::MinusMinus => Some(UnOp::PreDec),
            _ => None,
        };
        if let Some(op) = op {
            self.bump();
            let operand = self.parse_unary()?;
            return Some(Expr::new(
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                span,
            ));
        }
        if self.at(&TokenKind::Cast) {
            self.bump();
            self.expect(TokenKind::LParen, "'('")?;
            let ty = self.try_parse_type()?;
            self.expect(TokenKind::RParen, "')'")?;
            let expr = self.parse_unary()?;
            return Some(Expr::new(
                ExprKind::Cast {
                    ty,
                    expr: Box::new(expr),
                },
                span,
            ));
        }
        if self.at(&TokenKind::Sizeof) {
            self.bump();
            self.expect(TokenKind::LParen, "'('")?;
            if let Some(ty) = self.try_parse_type() {
                self.expect(TokenKind::RParen, "')'")?;
                return Some(Expr::new(ExprKind::SizeofType { ty }, span));
            }
            let expr = self.parse_expr()?;
            self.expect(TokenKind::RParen, "')'")?;
            return Some(Expr::new(
                ExprKind::SizeofExpr {
                    expr: Box::new(expr),
                },
                span,
            ));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Option<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek().kind {
                TokenKind::Dot => {
                    self.bump();
                    let field = self.parse_ident("a field name")?;
                    let span = expr.span;
                    expr = Expr::new(
                        ExprKind::Member {
                            base: Box::new(expr),
                            field,
                            arrow: false,
                        },
                        span,
                    );
                }
                TokenKind::Arrow => {
                    self.bump();
                    let field = self.parse_ident("a field name")?;
                    let span = expr.span;
                    expr = Expr::new(
                        ExprKind::Member {
                            base: Box::new(expr),
                            field,
                            arrow: true,
                        },
                        span,
                    );
                }
                TokenKind::LBracket => {
                    self.bump();
                    let index = self.parse_expr()?;
                    self.expect(TokenKind::RBracket, "']'")?;
                    let span = expr.span;
                    expr = Expr::new(
                        ExprKind::Index {
                            base: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    );
                }
                TokenKind::LParen => {
                    self.bump();
                    let mut args = Vec::new();
                    if !self.at(&TokenKind::RParen) {
                        loop {
                            args.push(self.parse_assignment()?);
                            if self.at(&TokenKind::Comma) {
                                self.bump();
                            } else {
                                break;
                            }
                        }
                    }
                    self.expect(TokenKind::RParen, "')'")?;
                    let span = expr.span;
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    );
                }
                TokenKind::PlusPlus => {
                    let span = expr.span;
                    self.bump();
                    expr = Expr::new(
                        ExprKind::Unary {
                            op: UnOp::PostInc,
                            operand: Box::new(expr),
                        },
                        span,
                    );
                }
                TokenKind::MinusMinus => {
                    let span = expr.span;
                    self.bump();
                    expr = Expr::new(
                        ExprKind::Unary {
                            op: UnOp::PostDec,
                            operand: Box::new(expr),
                        },
                        span,
                    );
                }
                _ => break,
            }
        }
        Some(expr)
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        let span = self.span();
        match self.peek().kind.clone() {
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen, "')'")?;
                Some(inner)
            }
            TokenKind::LBrace => {
                self.bump();
                let mut elements = Vec::new();
                if !self.at(&TokenKind::RBrace) {
                    loop {
                        elements.push(self.parse_assignment()?);
                        if self.at(&TokenKind::Comma) {
                            self.bump();
                        } else {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RBrace, "'}'")?;
                Some(Expr::new(ExprKind::AggregateInit { elements }, span))
            }
            TokenKind::Id => {
                let scoped = self.try_parse_scoped_id()?;
                if scoped.segments.len() == 1 {
                    let ident = scoped.segments.into_iter().next().unwrap();
                    Some(Expr::new(ExprKind::Identifier(ident), span))
                } else {
                    Some(Expr::new(ExprKind::ScopedIdentifier(scoped), span))
                }
            }
            TokenKind::LitInt => {
                let tok = self.bump();
                let Payload::Int(n) = tok.payload else { unreachable!() };
                Some(Expr::new(ExprKind::Literal(LiteralValue::Int(n)), span))
            }
            TokenKind::LitFloat => {
                let tok = self.bump();
                let Payload::Float(v) = tok.payload else { unreachable!() };
                Some(Expr::new(ExprKind::Literal(LiteralValue::Float(v, true)), span))
            }
            TokenKind::LitDouble => {
                let tok = self.bump();
                let Payload::Float(v) = tok.payload else { unreachable!() };
                Some(Expr::new(ExprKind::Literal(LiteralValue::Float(v, false)), span))
            }
            TokenKind::LitChar => {
                let tok = self.bump();
                let Payload::Char(c) = tok.payload else { unreachable!() };
                Some(Expr::new(ExprKind::Literal(LiteralValue::Char(c)), span))
            }
            TokenKind::LitWChar => {
                let tok = self.bump();
                let Payload::WChar(c) = tok.payload else { unreachable!() };
                Some(Expr::new(ExprKind::Literal(LiteralValue::WChar(c)), span))
            }
            TokenKind::LitString => {
                let tok = self.bump();
                let Payload::Str(s) = tok.payload else { unreachable!() };
                Some(Expr::new(ExprKind::Literal(LiteralValue::Str(s)), span))
            }
            TokenKind::LitWString => {
                let tok = self.bump();
                let Payload::WStr(s) = tok.payload else { unreachable!() };
                Some(Expr::new(ExprKind::Literal(LiteralValue::WStr(s)), span))
            }
            TokenKind::True => {
                self.bump();
                Some(Expr::new(ExprKind::Literal(LiteralValue::Bool(true)), span))
            }
            TokenKind::False => {
                self.bump();
                Some(Expr::new(ExprKind::Literal(LiteralValue::Bool(false)), span))
            }
            TokenKind::Null => {
                self.bump();
                Some(Expr::new(ExprKind::Literal(LiteralValue::Null), span))
            }
            _ => {
                let found = self.peek().clone();
                self.error_expected("an expression", &found);
                None
            }
        }
    }
}
