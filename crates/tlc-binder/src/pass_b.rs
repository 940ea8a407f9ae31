//! Pass B (spec.md §4.2): resolve imports, then build per-scope tables
//! under function bodies, compound statements, `for` statements, and
//! switch statements, resolving every identifier occurrence along the way.

use crate::arena::SymbolTable;
use crate::entry::SymbolEntry;
use crate::resolve::{Binder, LookupContext};
use tlc_common::{DiagnosticBag, TableId};
use tlc_parser::ast::{self, Expr, ExprKind, Stmt, StmtKind, TypeExpr};

pub struct ImportResolution {
    pub tables: Vec<TableId>,
}

impl Binder {
    /// Resolves `file`'s imports to their target module tables. An unknown
    /// module name is a resolution error (spec.md §4.2).
    pub fn resolve_imports(&mut self, file: &ast::File, diags: &mut DiagnosticBag) -> ImportResolution {
        let mut tables = Vec::with_capacity(file.imports.len());
        for import in &file.imports {
            let dotted = import.path.as_dotted();
            match self.module_table(&dotted) {
                Some(table) => tables.push(table),
                None => diags.error(import.span, format!("unknown module '{dotted}' in import")),
            }
        }
        ImportResolution { tables }
    }

    /// Walks `file`'s bodies, attaching a scope table to every node that
    /// owns one and resolving every identifier reference found along the
    /// way.
    pub fn pass_b(&mut self, file: &ast::File, top_level: TableId, imports: &ImportResolution, diags: &mut DiagnosticBag) {
        let mut walker = BodyWalker {
            binder: self,
            module: top_level,
            imports: &imports.tables,
            diags,
        };
        for decl in &file.bodies {
            walker.walk_top_decl(decl);
        }
    }
}

struct BodyWalker<'a> {
    binder: &'a mut Binder,
    module: TableId,
    imports: &'a [TableId],
    diags: &'a mut DiagnosticBag,
}

impl<'a> BodyWalker<'a> {
    fn walk_top_decl(&mut self, decl: &ast::TopDecl) {
        if let ast::TopDeclKind::FunctionDef { params, body, local_symbols, .. } = &decl.kind {
            let fn_scope = self.binder.tables.alloc(SymbolTable::with_parent(None));
            for param in params {
                if let Some(name) = &param.name {
                    let ty = self.binder.resolve_type_expr(&param.ty, self.module, self.diags);
                    let id = self.binder.symbols.alloc(SymbolEntry::Variable { ty, escapes: false });
                    self.binder.tables.get_mut(fn_scope).insert(name.name.clone(), id);
                }
                if let Some(default) = &param.default {
                    self.walk_expr(default, &[fn_scope]);
                }
            }
            local_symbols.set(Some(fn_scope));
            self.walk_stmt(body, &[fn_scope]);
        }
        if let ast::TopDeclKind::VarDef { initializers, .. } = &decl.kind {
            for init in initializers.iter().flatten() {
                self.walk_expr(init, &[]);
            }
        }
    }

    fn walk_stmt(&mut self, stmt: &Stmt, scopes: &[TableId]) {
        match &stmt.kind {
            StmtKind::Compound { stmts, symbols } => {
                let scope = self.binder.tables.alloc(SymbolTable::with_parent(scopes.first().copied()));
                symbols.set(Some(scope));
                let mut nested = Vec::with_capacity(scopes.len() + 1);
                nested.push(scope);
                nested.extend_from_slice(scopes);
                for inner in stmts {
                    self.declare_if_var_decl(inner, scope);
                    self.walk_stmt(inner, &nested);
                }
            }
            StmtKind::If { cond, then_branch, else_branch } => {
                self.walk_expr(cond, scopes);
                self.walk_stmt(then_branch, scopes);
                if let Some(else_branch) = else_branch {
                    self.walk_stmt(else_branch, scopes);
                }
            }
            StmtKind::While { cond, body } | StmtKind::DoWhile { body, cond } => {
                self.walk_expr(cond, scopes);
                self.walk_stmt(body, scopes);
            }
            StmtKind::For { init, cond, update, body, symbols } => {
                let scope = self.binder.tables.alloc(SymbolTable::with_parent(scopes.first().copied()));
                symbols.set(Some(scope));
                let mut nested = Vec::with_capacity(scopes.len() + 1);
                nested.push(scope);
                nested.extend_from_slice(scopes);
                if let Some(init) = init {
                    self.declare_if_var_decl(init, scope);
                    self.walk_stmt(init, &nested);
                }
                if let Some(cond) = cond {
                    self.walk_expr(cond, &nested);
                }
                if let Some(update) = update {
                    self.walk_expr(update, &nested);
                }
                self.walk_stmt(body, &nested);
            }
            StmtKind::Switch { scrutinee, cases, default, symbols } => {
                self.walk_expr(scrutinee, scopes);
                let scope = self.binder.tables.alloc(SymbolTable::with_parent(scopes.first().copied()));
                symbols.set(Some(scope));
                let mut nested = Vec::with_capacity(scopes.len() + 1);
                nested.push(scope);
                nested.extend_from_slice(scopes);
                for case in cases {
                    for value in &case.values {
                        self.walk_expr(value, &nested);
                    }
                    for inner in &case.body {
                        self.declare_if_var_decl(inner, scope);
                        self.walk_stmt(inner, &nested);
                    }
                }
                if let Some(default) = default {
                    for inner in &default.body {
                        self.declare_if_var_decl(inner, scope);
                        self.walk_stmt(inner, &nested);
                    }
                }
            }
            StmtKind::Return { value: Some(value) } => self.walk_expr(value, scopes),
            StmtKind::Expr(expr) => self.walk_expr(expr, scopes),
            StmtKind::VarDecl { initializers, .. } => {
                for init in initializers.iter().flatten() {
                    self.walk_expr(init, scopes);
                }
            }
            StmtKind::Break
            | StmtKind::Continue
            | StmtKind::Return { value: None }
            | StmtKind::Asm { .. }
            | StmtKind::Null => {}
        }
    }

    /// `VarDecl` statements declare into the *enclosing* scope (already
    /// allocated before the body is walked), so names are visible to
    /// sibling statements that follow, matching ordinary block-scoping.
    fn declare_if_var_decl(&mut self, stmt: &Stmt, scope: TableId) {
        if let StmtKind::VarDecl { ty, names, .. } = &stmt.kind {
            let resolved = self.binder.resolve_type_expr(ty, self.module, self.diags);
            for name in names {
                if self.binder.tables.get(scope).get(&name.name).is_some() {
                    self.diags.error(name.span, format!("'{}' is already defined in this scope", name.name));
                    continue;
                }
                let id = self.binder.symbols.alloc(SymbolEntry::Variable { ty: resolved.clone(), escapes: false });
                self.binder.tables.get_mut(scope).insert(name.name.clone(), id);
            }
        }
    }

    fn walk_expr(&mut self, expr: &Expr, scopes: &[TableId]) {
        match &expr.kind {
            ExprKind::Seq(items) => items.iter().for_each(|e| self.walk_expr(e, scopes)),
            ExprKind::Binary { lhs, rhs, .. } | ExprKind::Compare { lhs, rhs, .. } | ExprKind::LogAnd { lhs, rhs } | ExprKind::LogOr { lhs, rhs } => {
                self.walk_expr(lhs, scopes);
                self.walk_expr(rhs, scopes);
            }
            ExprKind::Unary { operand, .. } => self.walk_expr(operand, scopes),
            ExprKind::Assign { target, value, .. } | ExprKind::AssignLogical { target, value, .. } => {
                self.walk_expr(target, scopes);
                self.walk_expr(value, scopes);
            }
            ExprKind::Ternary { cond, then_branch, else_branch } => {
                self.walk_expr(cond, scopes);
                self.walk_expr(then_branch, scopes);
                self.walk_expr(else_branch, scopes);
            }
            ExprKind::Member { base, .. } => self.walk_expr(base, scopes),
            ExprKind::Index { base, index } => {
                self.walk_expr(base, scopes);
                self.walk_expr(index, scopes);
            }
            ExprKind::Call { callee, args } => {
                self.walk_expr(callee, scopes);
                args.iter().for_each(|a| self.walk_expr(a, scopes));
            }
            ExprKind::AggregateInit { elements } => elements.iter().for_each(|e| self.walk_expr(e, scopes)),
            ExprKind::Cast { ty, expr } => {
                self.resolve_type_refs(ty);
                self.walk_expr(expr, scopes);
            }
            ExprKind::SizeofType { ty } => self.resolve_type_refs(ty),
            ExprKind::SizeofExpr { expr } => self.walk_expr(expr, scopes),
            ExprKind::Identifier(ident) => {
                let ctx = LookupContext {
                    scopes,
                    module: self.module,
                    imports: self.imports,
                };
                if let Some(symbol) = self.binder.resolve_identifier(&ident.name, &ctx, ident.span, self.diags) {
                    ident.resolved.set(Some(symbol));
                }
            }
            ExprKind::ScopedIdentifier(scoped) => {
                self.resolve_scoped_identifier(scoped, scopes);
            }
            ExprKind::Literal(_) => {}
        }
    }

    fn resolve_scoped_identifier(&mut self, scoped: &ast::ScopedId, scopes: &[TableId]) {
        // Two-segment prefix may name an enum type inside a module, in
        // which case the final segment must be one of that enum's
        // constants (spec.md §4.2).
        if scoped.segments.len() == 2 {
            let module_name = scoped.segments[0].name.clone();
            if let Some(table) = self.binder.module_table(&module_name) {
                let last = &scoped.segments[1];
                if let Some(symbol) = self.binder.tables.get(table).get(&last.name) {
                    last.resolved.set(Some(symbol));
                    return;
                }
                self.diags.error(scoped.span, format!("module '{module_name}' has no member '{}'", last.name));
                return;
            }
        }
        let last = scoped.last();
        let ctx = LookupContext {
            scopes,
            module: self.module,
            imports: self.imports,
        };
        if let Some(symbol) = self.binder.resolve_identifier(&last.name, &ctx, scoped.span, self.diags) {
            last.resolved.set(Some(symbol));
        }
    }

    fn resolve_type_refs(&mut self, ty: &TypeExpr) {
        let _ = self.binder.resolve_type_expr(ty, self.module, self.diags);
    }
}
