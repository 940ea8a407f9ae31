//! Statement parsing (spec.md §3.2, §4.1).

use super::Parser;
use crate::ast::{Stmt, StmtKind, SwitchCase, SwitchDefault};
use std::cell::Cell;
use tlc_lexer::{Payload, TokenKind};

impl<'src> Parser<'src> {
    pub(crate) fn parse_stmt(&mut self) -> Option<Stmt> {
        let span = self.span();
        match self.peek().kind {
            TokenKind::LBrace => self.parse_compound(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Do => self.parse_do_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Switch => self.parse_switch(),
            TokenKind::Break => {
                self.bump();
                self.expect(TokenKind::Semicolon, "';'");
                Some(Stmt::new(StmtKind::Break, span))
            }
            TokenKind::Continue => {
                self.bump();
                self.expect(TokenKind::Semicolon, "';'");
                Some(Stmt::new(StmtKind::Continue, span))
            }
            TokenKind::Return => {
                self.bump();
                let value = if self.at(&TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.expect(TokenKind::Semicolon, "';'");
                Some(Stmt::new(StmtKind::Return { value }, span))
            }
            TokenKind::Asm => self.parse_asm(),
            TokenKind::Semicolon => {
                self.bump();
                Some(Stmt::new(StmtKind::Null, span))
            }
            _ if self.starts_type() => self.parse_var_decl_stmt(),
            _ => {
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Semicolon, "';'");
                Some(Stmt::new(StmtKind::Expr(expr), span))
            }
        }
    }

    fn parse_compound(&mut self) -> Option<Stmt> {
        let span = self.span();
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut stmts = Vec::new();
        while !self.at(&TokenKind::RBrace) && !self.at(&TokenKind::Eof) {
            match self.parse_stmt() {
                Some(stmt) => stmts.push(stmt),
                None => self.panic_top_level_in_compound(),
            }
        }
        self.expect(TokenKind::RBrace, "'}'");
        Some(Stmt::new(
            StmtKind::Compound {
                stmts,
                symbols: Cell::new(None),
            },
            span,
        ))
    }

    /// Statement-level recovery: skip to the next `;` or a token that could
    /// start a new statement, mirroring `panic_top_level` one level down
    /// (spec.md §4.1 only defines the top-level recovery point explicitly;
    /// this is its natural analogue for compound-statement bodies).
    fn panic_top_level_in_compound(&mut self) {
        loop {
            match self.peek().kind {
                TokenKind::Semicolon => {
                    self.bump();
                    return;
                }
                TokenKind::RBrace | TokenKind::Eof => return,
                _ => {
                    self.bump();
                }
            }
        }
    }

    fn parse_if(&mut self) -> Option<Stmt> {
        let span = self.span();
        self.bump();
        self.expect(TokenKind::LParen, "'('")?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen, "')'")?;
        let then_branch = Box::new(self.parse_stmt()?);
        let else_branch = if self.at(&TokenKind::Else) {
            self.bump();
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };
        Some(Stmt::new(
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            },
            span,
        ))
    }

    fn parse_while(&mut self) -> Option<Stmt> {
        let span = self.span();
        self.bump();
        self.expect(TokenKind::LParen, "'('")?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen, "')'")?;
        let body = Box::new(self.parse_stmt()?);
        Some(Stmt::new(StmtKind::While { cond, body }, span))
    }

    fn parse_do_while(&mut self) -> Option<Stmt> {
        let span = self.span();
        self.bump();
        let body = Box::new(self.parse_stmt()?);
        self.expect(TokenKind::While, "'while'")?;
        self.expect(TokenKind::LParen, "'('")?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen, "')'")?;
        self.expect(TokenKind::Semicolon, "';'")?;
        Some(Stmt::new(StmtKind::DoWhile { body, cond }, span))
    }

    fn parse_for(&mut self) -> Option<Stmt> {
        let span = self.span();
        self.bump();
        self.expect(TokenKind::LParen, "'('")?;

        let init = if self.at(&TokenKind::Semicolon) {
            self.bump();
            None
        } else if self.starts_type() {
            Some(Box::new(self.parse_var_decl_stmt()?))
        } else {
            let expr = self.parse_expr()?;
            self.expect(TokenKind::Semicolon, "';'");
            Some(Box::new(Stmt::new(StmtKind::Expr(expr), span)))
        };

        let cond = if self.at(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon, "';'");

        let update = if self.at(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::RParen, "')'")?;

        let body = Box::new(self.parse_stmt()?);
        Some(Stmt::new(
            StmtKind::For {
                init,
                cond,
                update,
                body,
                symbols: Cell::new(None),
            },
            span,
        ))
    }

    fn parse_switch(&mut self) -> Option<Stmt> {
        let span = self.span();
        self.bump();
        self.expect(TokenKind::LParen, "'('")?;
        let scrutinee = self.parse_expr()?;
        self.expect(TokenKind::RParen, "')'")?;
        self.expect(TokenKind::LBrace, "'{'")?;

        let mut cases = Vec::new();
        let mut default = None;
        while !self.at(&TokenKind::RBrace) && !self.at(&TokenKind::Eof) {
            if self.at(&TokenKind::Case) {
                let case_span = self.span();
                self.bump();
                let mut values = vec![self.parse_expr()?];
                self.expect(TokenKind::Colon, "':'");
                while self.at(&TokenKind::Case) {
                    self.bump();
                    values.push(self.parse_expr()?);
                    self.expect(TokenKind::Colon, "':'");
                }
                let body = self.parse_case_body();
                cases.push(SwitchCase {
                    values,
                    body,
                    span: case_span,
                });
            } else if self.at(&TokenKind::Default) {
                let default_span = self.span();
                self.bump();
                self.expect(TokenKind::Colon, "':'");
                if default.is_some() {
                    self.error(default_span, "duplicate 'default' clause in switch");
                }
                let body = self.parse_case_body();
                default = Some(SwitchDefault {
                    body,
                    span: default_span,
                });
            } else {
                let found = self.peek().clone();
                self.error_expected("'case' or 'default'", &found);
                self.panic_top_level_in_compound();
            }
        }
        self.expect(TokenKind::RBrace, "'}'");
        Some(Stmt::new(
            StmtKind::Switch {
                scrutinee,
                cases,
                default,
                symbols: Cell::new(None),
            },
            span,
        ))
    }

    fn parse_case_body(&mut self) -> Vec<Stmt> {
        let mut body = Vec::new();
        while !matches!(
            self.peek().kind,
            TokenKind::Case | TokenKind::Default | TokenKind::RBrace | TokenKind::Eof
        ) {
            match self.parse_stmt() {
                Some(stmt) => body.push(stmt),
                None => self.panic_top_level_in_compound(),
            }
        }
        body
    }

    fn parse_asm(&mut self) -> Option<Stmt> {
        let span = self.span();
        self.bump();
        self.expect(TokenKind::LParen, "'('")?;
        let code = match self.peek().payload.clone() {
            Payload::Str(bytes) => {
                self.bump();
                String::from_utf8_lossy(&bytes).into_owned()
            }
            _ => {
                let found = self.peek().clone();
                self.error_expected("a string literal", &found);
                String::new()
            }
        };
        self.expect(TokenKind::RParen, "')'");
        self.expect(TokenKind::Semicolon, "';'");
        Some(Stmt::new(StmtKind::Asm { code }, span))
    }

    /// `Type Ident ('=' Expr)? (',' Ident ('=' Expr)?)* ';'`, used both as a
    /// standalone statement and as a `for`-init clause.
    pub(crate) fn parse_var_decl_stmt(&mut self) -> Option<Stmt> {
        let span = self.span();
        let ty = self.try_parse_type()?;
        let mut names = Vec::new();
        let mut initializers = Vec::new();
        loop {
            let name = self.parse_ident("a variable name")?;
            let initializer = if self.at(&TokenKind::Assign) {
                self.bump();
                Some(self.parse_assignment()?)
            } else {
                None
            };
            names.push(name);
            initializers.push(initializer);
            if self.at(&TokenKind::Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(TokenKind::Semicolon, "';'");
        Some(Stmt::new(
            StmtKind::VarDecl {
                ty,
                names,
                initializers,
            },
            span,
        ))
    }
}
