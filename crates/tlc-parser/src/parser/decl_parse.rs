//! Top-level (module/import/declaration) parsing (spec.md §3.2, §4.1).

use super::Parser;
use crate::ast::{
    EnumConstant, FieldDecl, File, Import, ModulePath, Param, TopDecl, TopDeclKind,
};
use std::cell::Cell;
use tlc_lexer::TokenKind;

impl<'src> Parser<'src> {
    pub(crate) fn parse_file_inner(&mut self, filename: String) -> Option<File> {
        let module = self.parse_module_decl()?;
        let imports = self.parse_imports();
        let mut bodies = Vec::new();
        while !self.at(&TokenKind::Eof) {
            match self.parse_top_decl() {
                Some(decl) => bodies.push(decl),
                None => self.panic_top_level(),
            }
        }
        Some(File {
            module,
            imports,
            bodies,
            symbols: Cell::new(None),
            filename,
        })
    }

    fn parse_module_path(&mut self) -> Option<ModulePath> {
        let mut segments = vec![self.parse_ident("a module path")?.name];
        while self.at(&TokenKind::Dot) {
            self.bump();
            segments.push(self.parse_ident("a module path segment")?.name);
        }
        Some(ModulePath::new(segments))
    }

    fn parse_module_decl(&mut self) -> Option<ModulePath> {
        self.expect(TokenKind::Module, "'module'")?;
        let path = self.parse_module_path()?;
        self.expect(TokenKind::Semicolon, "';'");
        Some(path)
    }

    fn parse_imports(&mut self) -> Vec<Import> {
        let mut imports = Vec::new();
        while self.at(&TokenKind::Import) {
            let span = self.span();
            self.bump();
            if let Some(path) = self.parse_module_path() {
                self.expect(TokenKind::Semicolon, "';'");
                imports.push(Import { path, span });
            } else {
                self.panic_top_level();
            }
        }
        imports
    }

    fn parse_top_decl(&mut self) -> Option<TopDecl> {
        let span = self.span();
        match self.peek().kind {
            TokenKind::Opaque => self.parse_opaque_decl(span),
            TokenKind::Struct => self.parse_aggregate_decl(span, true),
            TokenKind::Union => self.parse_aggregate_decl(span, false),
            TokenKind::Enum => self.parse_enum_decl(span),
            TokenKind::Typedef => self.parse_typedef_decl(span),
            _ => self.parse_fun_or_var_decl(span),
        }
    }

    fn parse_opaque_decl(&mut self, span: tlc_common::Span) -> Option<TopDecl> {
        self.bump();
        let name = self.parse_ident("an opaque type name")?;
        self.expect(TokenKind::Semicolon, "';'");
        Some(TopDecl::new(TopDeclKind::Opaque { name }, span))
    }

    fn parse_field_list(&mut self) -> (tlc_common::Span, Vec<FieldDecl>) {
        let brace_span = self.span();
        let mut fields = Vec::new();
        self.expect(TokenKind::LBrace, "'{'");
        while !self.at(&TokenKind::RBrace) && !self.at(&TokenKind::Eof) {
            let Some(ty) = self.try_parse_type() else {
                let found = self.peek().clone();
                self.error_expected("a field type", &found);
                self.bump();
                continue;
            };
            let Some(name) = self.parse_ident("a field name") else {
                continue;
            };
            fields.push(FieldDecl { ty: ty.clone(), name });
            while self.at(&TokenKind::Comma) {
                self.bump();
                if let Some(name) = self.parse_ident("a field name") {
                    fields.push(FieldDecl { ty: ty.clone(), name });
                }
            }
            self.expect(TokenKind::Semicolon, "';'");
        }
        self.expect(TokenKind::RBrace, "'}'");
        (brace_span, fields)
    }

    fn parse_aggregate_decl(&mut self, span: tlc_common::Span, is_struct: bool) -> Option<TopDecl> {
        self.bump();
        let name = self.parse_ident("an aggregate name")?;
        let (brace_span, fields) = self.parse_field_list();
        self.expect(TokenKind::Semicolon, "';'");
        let kind = if is_struct {
            TopDeclKind::StructDecl { name, fields, brace_span }
        } else {
            TopDeclKind::UnionDecl { name, options: fields, brace_span }
        };
        Some(TopDecl::new(kind, span))
    }

    /// Enum constants default to `previous + 1` (starting at 0); an explicit
    /// initializer must be a constant integer literal and may not refer
    /// forward to a constant declared later in the same enum (spec.md's
    /// Open Questions, resolved in SPEC_FULL.md).
    fn parse_enum_decl(&mut self, span: tlc_common::Span) -> Option<TopDecl> {
        self.bump();
        let name = self.parse_ident("an enum name")?;
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut constants = Vec::new();
        while !self.at(&TokenKind::RBrace) && !self.at(&TokenKind::Eof) {
            let const_span = self.span();
            let Some(const_name) = self.parse_ident("an enum constant name") else {
                self.bump();
                continue;
            };
            let initializer = if self.at(&TokenKind::Assign) {
                self.bump();
                let lit_span = self.span();
                match self.expect(TokenKind::LitInt, "an integer literal") {
                    Some(tok) => match tok.payload {
                        tlc_lexer::Payload::Int(n) => Some(n as i64),
                        _ => None,
                    },
                    None => {
                        self.error(lit_span, "enum constant initializer must be an integer literal");
                        None
                    }
                }
            } else {
                None
            };
            constants.push(EnumConstant {
                name: const_name,
                initializer,
                span: const_span,
            });
            if self.at(&TokenKind::Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "'}'");
        self.expect(TokenKind::Semicolon, "';'");
        Some(TopDecl::new(TopDeclKind::EnumDecl { name, constants }, span))
    }

    fn parse_typedef_decl(&mut self, span: tlc_common::Span) -> Option<TopDecl> {
        self.bump();
        let target = self.try_parse_type()?;
        let name = self.parse_ident("a typedef name")?;
        self.expect(TokenKind::Semicolon, "';'");
        Some(TopDecl::new(TopDeclKind::TypedefDecl { target, name }, span))
    }

    fn parse_params(&mut self) -> Vec<Param> {
        let mut params = Vec::new();
        self.expect(TokenKind::LParen, "'('");
        if !self.at(&TokenKind::RParen) {
            loop {
                let span = self.span();
                let Some(ty) = self.try_parse_type() else {
                    let found = self.peek().clone();
                    self.error_expected("a parameter type", &found);
                    break;
                };
                let name = self.try_parse_ident();
                let default = if self.at(&TokenKind::Assign) {
                    self.bump();
                    self.parse_assignment()
                } else {
                    None
                };
                params.push(Param {
                    ty,
                    name,
                    default,
                    span,
                });
                if self.at(&TokenKind::Comma) {
                    self.bump();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'");
        params
    }

    /// `Type Ident '(' Params ')' (';' | CompoundStmt)` for functions, or
    /// `Type Ident ('=' Expr)? (',' Ident ('=' Expr)?)* ';'` for variables —
    /// the two share a type-and-name prefix and are disambiguated by
    /// whichever punctuation follows the first name (spec.md §4.1).
    fn parse_fun_or_var_decl(&mut self, span: tlc_common::Span) -> Option<TopDecl> {
        let ty = self.try_parse_type()?;
        let name = self.parse_ident("a declaration name")?;

        if self.at(&TokenKind::LParen) {
            let params = self.parse_params();
            if self.at(&TokenKind::LBrace) {
                let body = Box::new(self.parse_stmt()?);
                return Some(TopDecl::new(
                    TopDeclKind::FunctionDef {
                        return_type: ty,
                        name,
                        params,
                        body,
                        local_symbols: Cell::new(None),
                    },
                    span,
                ));
            }
            self.expect(TokenKind::Semicolon, "';'");
            return Some(TopDecl::new(
                TopDeclKind::FunctionDecl {
                    return_type: ty,
                    name,
                    params,
                },
                span,
            ));
        }

        let mut names = vec![name];
        let mut initializers = Vec::new();
        let first_init = if self.at(&TokenKind::Assign) {
            self.bump();
            self.parse_assignment()
        } else {
            None
        };
        initializers.push(first_init);
        while self.at(&TokenKind::Comma) {
            self.bump();
            let next_name = self.parse_ident("a variable name")?;
            let init = if self.at(&TokenKind::Assign) {
                self.bump();
                self.parse_assignment()
            } else {
                None
            };
            names.push(next_name);
            initializers.push(init);
        }
        self.expect(TokenKind::Semicolon, "';'");
        Some(TopDecl::new(
            TopDeclKind::VarDef {
                ty,
                names,
                initializers,
            },
            span,
        ))
    }
}
