//! The type checker (spec.md §4.3): per-expression `resultType` annotation,
//! statement validation against the enclosing function's return type, and
//! call-site overload resolution.

use crate::arena::TypeArena;
use rustc_hash::FxHashMap;
use tlc_binder::{Binder, SymbolEntry};
use tlc_common::{ice, DiagnosticBag, KeywordType, Span, SymbolId, TableId};
use tlc_parser::ast::{self, AssignOp, BinOp, CmpOp, Expr, ExprKind, LiteralValue, Stmt, StmtKind, TypeExpr, UnOp};
use tlc_types::{common_type, explicitly_convertible, implicitly_convertible, Type};

/// One overload signature gathered from this file's own `TopDecl`s, kept
/// alongside the number of leading (non-defaulted) parameters so call sites
/// in the same file can fill trailing default arguments (spec.md §4.3).
/// Overloads reached only through an import are checked against
/// `tlc-binder`'s `Overload` list instead, which does not carry default
/// information — such calls must supply every argument explicitly. This is
/// a deliberate simplification, recorded in DESIGN.md.
struct LocalSignature {
    return_type: Type,
    arg_types: Vec<Type>,
    required: usize,
}

pub struct Checker<'a> {
    binder: &'a Binder,
    types: &'a mut TypeArena,
    diags: &'a mut DiagnosticBag,
    local_signatures: FxHashMap<String, Vec<LocalSignature>>,
    /// Fallback scope for resolving named types in a `cast`/`sizeof` that
    /// appears outside any lexical scope (a top-level variable initializer).
    module: TableId,
}

/// Checks every top-level body of `file` (spec.md §4.3), using `binder`'s
/// already-resolved symbol tables and identifier bindings. Expects pass A
/// and pass B to have already run for `file` and every module it imports.
pub fn check_file(file: &ast::File, binder: &Binder, types: &mut TypeArena, diags: &mut DiagnosticBag) {
    let module = binder
        .module_table(&file.module.as_dotted())
        .unwrap_or_else(|| ice!(Span::synthetic(), "module '{}' was never bound", file.module.as_dotted()));

    let mut local_signatures: FxHashMap<String, Vec<LocalSignature>> = FxHashMap::default();
    for decl in &file.bodies {
        collect_local_signature(decl, module, binder, &mut local_signatures);
    }

    let mut checker = Checker {
        binder,
        types,
        diags,
        local_signatures,
        module,
    };
    for decl in &file.bodies {
        checker.check_top_decl(decl, module);
    }
}

fn collect_local_signature(
    decl: &ast::TopDecl,
    module: TableId,
    binder: &Binder,
    out: &mut FxHashMap<String, Vec<LocalSignature>>,
) {
    let (name, return_type, params) = match &decl.kind {
        ast::TopDeclKind::FunctionDef { name, return_type, params, .. } => (name, return_type, params),
        ast::TopDeclKind::FunctionDecl { name, return_type, params } => (name, return_type, params),
        _ => return,
    };
    let required = params.iter().take_while(|p| p.default.is_none()).count();
    let arg_types = params.iter().map(|p| resolve_type_readonly(&p.ty, module, binder)).collect();
    let sig = LocalSignature {
        return_type: resolve_type_readonly(return_type, module, binder),
        arg_types,
        required,
    };
    out.entry(name.name.clone()).or_default().push(sig);
}

/// Resolves a syntactic type without mutating the binder; every named type
/// reachable from a declaration's signature or body was already entered
/// into a symbol table during binding, so failure to find one here is a
/// checker-invariant violation, not a user error.
fn resolve_type_readonly(ty: &TypeExpr, scope: TableId, binder: &Binder) -> Type {
    match ty {
        TypeExpr::Keyword { kind, .. } => Type::Keyword(*kind),
        TypeExpr::Qualified { base, is_const, is_volatile, .. } => {
            Type::qualified(resolve_type_readonly(base, scope, binder), *is_const, *is_volatile)
        }
        TypeExpr::Pointer { base, .. } => Type::pointer(resolve_type_readonly(base, scope, binder)),
        TypeExpr::Array { length, element, .. } => Type::Array {
            length: *length,
            element: Box::new(resolve_type_readonly(element, scope, binder)),
        },
        TypeExpr::FunPtr { return_type, arg_types, .. } => Type::FunPtr {
            return_type: Box::new(resolve_type_readonly(return_type, scope, binder)),
            arg_types: arg_types.iter().map(|a| resolve_type_readonly(a, scope, binder)).collect(),
        },
        TypeExpr::Named(scoped) => {
            let last = scoped.last();
            let symbol = if scoped.segments.len() == 1 {
                lookup_chain(binder, scope, &last.name)
            } else {
                let module_name = scoped.segments[..scoped.segments.len() - 1]
                    .iter()
                    .map(|s| s.name.as_str())
                    .collect::<Vec<_>>()
                    .join(".");
                binder.module_table(&module_name).and_then(|table| binder.tables.get(table).get(&last.name))
            };
            match symbol {
                Some(symbol) => Type::Reference { symbol, name: last.name.clone() },
                None => ice!(scoped.span, "unresolved named type '{}' survived binding", last.name),
            }
        }
    }
}

fn lookup_chain(binder: &Binder, scope: TableId, name: &str) -> Option<SymbolId> {
    let mut current = Some(scope);
    while let Some(id) = current {
        let table = binder.tables.get(id);
        if let Some(found) = table.get(name) {
            return Some(found);
        }
        current = table.parent;
    }
    None
}

/// The narrowest keyword type among spec.md §4.3's integer list that fits
/// `value`; `None` if it overflows even `ulong`/`long`, though the lexer's
/// own literal payload already can't exceed `u64`.
fn narrowest_integer_type(value: u64) -> Option<KeywordType> {
    KeywordType::integer_kinds().iter().copied().find(|kind| value <= max_for(*kind))
}

fn max_for(kind: KeywordType) -> u64 {
    use tlc_common::limits::*;
    match kind {
        KeywordType::Ubyte => UBYTE_MAX,
        KeywordType::Byte => BYTE_MAX as u64,
        KeywordType::Ushort => USHORT_MAX,
        KeywordType::Short => SHORT_MAX as u64,
        KeywordType::Uint => UINT_MAX,
        KeywordType::Int => INT_MAX as u64,
        KeywordType::Ulong => ULONG_MAX,
        KeywordType::Long => LONG_MAX as u64,
        _ => 0,
    }
}

/// Ranks how far `from` has to move to reach `to` at an overload call site.
/// Callers have already filtered to `implicitly_convertible` pairs; this
/// only breaks ties between several such pairs, so same-family widenings
/// (int-to-int, float-to-float, pointer-to-pointer) outrank a conversion
/// that crosses families (e.g. an integer literal into a `double` param).
fn conversion_cost(from: &Type, to: &Type) -> u32 {
    if from.equal(to) {
        0
    } else if (from.is_integer() && to.is_integer()) || (from.is_float() && to.is_float()) || (from.is_pointer() && to.is_pointer()) {
        1
    } else {
        2
    }
}

impl<'a> Checker<'a> {
    fn annotate(&mut self, expr: &Expr, ty: Type) -> Type {
        let id = self.types.alloc(ty.clone());
        expr.set_result_type(id);
        ty
    }

    fn error(&mut self, span: Span, message: impl Into<String>) {
        self.diags.error(span, message);
    }

    fn variable_type(&self, symbol: SymbolId) -> Option<Type> {
        match self.binder.symbols.get(symbol) {
            SymbolEntry::Variable { ty, .. } => Some(ty.clone()),
            _ => None,
        }
    }

    fn check_top_decl(&mut self, decl: &ast::TopDecl, module: TableId) {
        match &decl.kind {
            ast::TopDeclKind::FunctionDef { return_type, params, body, local_symbols, .. } => {
                let ret = resolve_type_readonly(return_type, module, self.binder);
                for param in params {
                    if let Some(default) = &param.default {
                        let expected = resolve_type_readonly(&param.ty, module, self.binder);
                        let actual = self.check_expr(default, &[]);
                        if !implicitly_convertible(&actual, &expected) {
                            self.error(default.span, "default argument is not convertible to the parameter type");
                        }
                    }
                }
                let fn_scope = local_symbols
                    .get()
                    .unwrap_or_else(|| ice!(decl.span, "function body has no attached scope"));
                self.check_stmt(body, &[fn_scope], &ret, module);
            }
            ast::TopDeclKind::VarDef { ty, initializers, .. } => {
                let declared = resolve_type_readonly(ty, module, self.binder);
                for init in initializers.iter().flatten() {
                    let actual = self.check_expr(init, &[]);
                    if !implicitly_convertible(&actual, &declared) {
                        self.error(init.span, "initializer is not convertible to the declared type");
                    }
                }
            }
            _ => {}
        }
    }

    fn check_stmt(&mut self, stmt: &Stmt, scopes: &[TableId], ret: &Type, module: TableId) {
        match &stmt.kind {
            StmtKind::Compound { stmts, symbols } => {
                let scope = symbols.get().unwrap_or_else(|| ice!(stmt.span, "compound statement has no attached scope"));
                let mut nested = Vec::with_capacity(scopes.len() + 1);
                nested.push(scope);
                nested.extend_from_slice(scopes);
                for inner in stmts {
                    self.check_stmt(inner, &nested, ret, module);
                }
            }
            StmtKind::If { cond, then_branch, else_branch } => {
                let cond_ty = self.check_expr(cond, scopes);
                self.require_bool(&cond_ty, cond.span);
                self.check_stmt(then_branch, scopes, ret, module);
                if let Some(else_branch) = else_branch {
                    self.check_stmt(else_branch, scopes, ret, module);
                }
            }
            StmtKind::While { cond, body } | StmtKind::DoWhile { body, cond } => {
                let cond_ty = self.check_expr(cond, scopes);
                self.require_bool(&cond_ty, cond.span);
                self.check_stmt(body, scopes, ret, module);
            }
            StmtKind::For { init, cond, update, body, symbols } => {
                let scope = symbols.get().unwrap_or_else(|| ice!(stmt.span, "for statement has no attached scope"));
                let mut nested = Vec::with_capacity(scopes.len() + 1);
                nested.push(scope);
                nested.extend_from_slice(scopes);
                if let Some(init) = init {
                    self.check_stmt(init, &nested, ret, module);
                }
                if let Some(cond) = cond {
                    let cond_ty = self.check_expr(cond, &nested);
                    self.require_bool(&cond_ty, cond.span);
                }
                if let Some(update) = update {
                    self.check_expr(update, &nested);
                }
                self.check_stmt(body, &nested, ret, module);
            }
            StmtKind::Switch { scrutinee, cases, default, symbols } => {
                let scrutinee_ty = self.check_expr(scrutinee, scopes);
                if !scrutinee_ty.is_integer() {
                    self.error(scrutinee.span, "switch scrutinee must have an integer type");
                }
                let scope = symbols.get().unwrap_or_else(|| ice!(stmt.span, "switch statement has no attached scope"));
                let mut nested = Vec::with_capacity(scopes.len() + 1);
                nested.push(scope);
                nested.extend_from_slice(scopes);
                for case in cases {
                    for value in &case.values {
                        let value_ty = self.check_expr(value, &nested);
                        if !implicitly_convertible(&value_ty, &scrutinee_ty) {
                            self.error(value.span, "case value is not convertible to the scrutinee's type");
                        }
                    }
                    for inner in &case.body {
                        self.check_stmt(inner, &nested, ret, module);
                    }
                }
                if let Some(default) = default {
                    for inner in &default.body {
                        self.check_stmt(inner, &nested, ret, module);
                    }
                }
            }
            StmtKind::Return { value } => {
                let is_void = matches!(ret.as_keyword(), Some(KeywordType::Void));
                match value {
                    Some(value) => {
                        let value_ty = self.check_expr(value, scopes);
                        if is_void {
                            self.error(value.span, "returning a value from a function declared void");
                        } else if !implicitly_convertible(&value_ty, ret) {
                            self.error(value.span, "return value is not convertible to the declared return type");
                        }
                    }
                    None => {
                        if !is_void {
                            self.error(stmt.span, "missing return value in a non-void function");
                        }
                    }
                }
            }
            StmtKind::Expr(expr) => {
                self.check_expr(expr, scopes);
            }
            StmtKind::VarDecl { ty, names, initializers } => {
                let declared = resolve_type_readonly(ty, module, self.binder);
                for (name, init) in names.iter().zip(initializers.iter()) {
                    if let Some(init) = init {
                        let actual = self.check_expr(init, scopes);
                        if !implicitly_convertible(&actual, &declared) {
                            self.error(name.span, "initializer is not convertible to the declared type");
                        }
                    }
                }
            }
            StmtKind::Break | StmtKind::Continue | StmtKind::Asm { .. } | StmtKind::Null => {}
        }
    }

    fn require_bool(&mut self, ty: &Type, span: Span) {
        if !ty.is_bool() {
            self.error(span, "condition must have type bool (no implicit integer-to-bool conversion)");
        }
    }

    fn check_expr(&mut self, expr: &Expr, scopes: &[TableId]) -> Type {
        match &expr.kind {
            ExprKind::Seq(items) => {
                let mut last = Type::Keyword(KeywordType::Void);
                for item in items {
                    last = self.check_expr(item, scopes);
                }
                self.annotate(expr, last)
            }
            ExprKind::Literal(lit) => {
                let ty = self.check_literal(lit, expr.span);
                self.annotate(expr, ty)
            }
            ExprKind::Identifier(ident) => {
                let ty = match ident.resolved.get() {
                    Some(symbol) => self.variable_type(symbol).unwrap_or_else(|| {
                        self.diags.error(ident.span, format!("'{}' does not denote a value", ident.name));
                        Type::Keyword(KeywordType::Int)
                    }),
                    None => Type::Keyword(KeywordType::Int),
                };
                self.annotate(expr, ty)
            }
            ExprKind::ScopedIdentifier(scoped) => {
                let last = scoped.last();
                let ty = match last.resolved.get() {
                    Some(symbol) => self.variable_type(symbol).unwrap_or_else(|| {
                        self.diags.error(scoped.span, format!("'{}' does not denote a value", last.name));
                        Type::Keyword(KeywordType::Int)
                    }),
                    None => Type::Keyword(KeywordType::Int),
                };
                self.annotate(expr, ty)
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let ty = self.check_binary(*op, lhs, rhs, scopes);
                self.annotate(expr, ty)
            }
            ExprKind::Compare { op, lhs, rhs } => {
                let ty = self.check_compare(*op, lhs, rhs, scopes);
                self.annotate(expr, ty)
            }
            ExprKind::LogAnd { lhs, rhs } | ExprKind::LogOr { lhs, rhs } => {
                let lhs_ty = self.check_expr(lhs, scopes);
                let rhs_ty = self.check_expr(rhs, scopes);
                self.require_bool(&lhs_ty, lhs.span);
                self.require_bool(&rhs_ty, rhs.span);
                self.annotate(expr, Type::Keyword(KeywordType::Bool))
            }
            ExprKind::Unary { op, operand } => {
                let ty = self.check_unary(*op, operand, scopes);
                self.annotate(expr, ty)
            }
            ExprKind::Assign { op, target, value } => {
                let ty = self.check_assign(*op, target, value, scopes);
                self.annotate(expr, ty)
            }
            ExprKind::AssignLogical { target, value, .. } => {
                let target_ty = self.check_expr(target, scopes);
                let value_ty = self.check_expr(value, scopes);
                if !target.is_assignable_shape() {
                    self.error(target.span, "left side of an assignment must be an assignable location");
                }
                self.require_bool(&target_ty, target.span);
                self.require_bool(&value_ty, value.span);
                self.annotate(expr, Type::Keyword(KeywordType::Bool))
            }
            ExprKind::Ternary { cond, then_branch, else_branch } => {
                let cond_ty = self.check_expr(cond, scopes);
                self.require_bool(&cond_ty, cond.span);
                let then_ty = self.check_expr(then_branch, scopes);
                let else_ty = self.check_expr(else_branch, scopes);
                let result = if then_ty == else_ty {
                    then_ty
                } else if let Some(common) = common_type(&then_ty, &else_ty) {
                    common
                } else if implicitly_convertible(&else_ty, &then_ty) {
                    then_ty
                } else if implicitly_convertible(&then_ty, &else_ty) {
                    else_ty
                } else {
                    self.error(expr.span, "branches of a ternary expression have incompatible types");
                    then_ty
                };
                self.annotate(expr, result)
            }
            ExprKind::Member { base, field, arrow } => {
                let ty = self.check_member(base, field, *arrow, scopes);
                self.annotate(expr, ty)
            }
            ExprKind::Index { base, index } => {
                let base_ty = self.check_expr(base, scopes);
                let index_ty = self.check_expr(index, scopes);
                if !index_ty.is_integer() {
                    self.error(index.span, "array subscript must have an integer type");
                }
                let element = match base_ty.unqualified() {
                    Type::Pointer(inner) => (**inner).clone(),
                    Type::Array { element, .. } => (**element).clone(),
                    _ => {
                        self.error(base.span, "subscript applied to a non-pointer, non-array expression");
                        Type::Keyword(KeywordType::Int)
                    }
                };
                self.annotate(expr, element)
            }
            ExprKind::Call { callee, args } => {
                let ty = self.check_call(callee, args, expr.span, scopes);
                self.annotate(expr, ty)
            }
            ExprKind::AggregateInit { elements } => {
                let element_types: Vec<Type> = elements.iter().map(|e| self.check_expr(e, scopes)).collect();
                self.annotate(expr, Type::AggregateInit(element_types))
            }
            ExprKind::Cast { ty, expr: inner } => {
                let inner_ty = self.check_expr(inner, scopes);
                let scope = scopes.first().copied().unwrap_or(self.module);
                let target = resolve_type_readonly(ty, scope, self.binder);
                if !explicitly_convertible(&inner_ty, &target) {
                    self.error(expr.span, "this cast is not a legal conversion");
                }
                self.annotate(expr, target)
            }
            ExprKind::SizeofType { ty } => {
                let scope = scopes.first().copied().unwrap_or(self.module);
                let _ = resolve_type_readonly(ty, scope, self.binder);
                self.annotate(expr, Type::Keyword(KeywordType::Ulong))
            }
            ExprKind::SizeofExpr { expr: inner } => {
                self.check_expr(inner, scopes);
                self.annotate(expr, Type::Keyword(KeywordType::Ulong))
            }
        }
    }

    fn check_literal(&mut self, lit: &LiteralValue, span: Span) -> Type {
        match lit {
            LiteralValue::Int(value) => match narrowest_integer_type(*value) {
                Some(kind) => Type::Keyword(kind),
                None => {
                    self.error(span, "integer literal is out of range for every integer type");
                    Type::Keyword(KeywordType::Long)
                }
            },
            LiteralValue::Char(_) => Type::Keyword(KeywordType::Char),
            LiteralValue::WChar(_) => Type::Keyword(KeywordType::Wchar),
            LiteralValue::Float(_, is_f32) => {
                Type::Keyword(if *is_f32 { KeywordType::Float } else { KeywordType::Double })
            }
            LiteralValue::Bool(_) => Type::Keyword(KeywordType::Bool),
            LiteralValue::Null => Type::NullPointer,
            LiteralValue::Str(bytes) => Type::Array {
                length: bytes.len() as u64 + 1,
                element: Box::new(Type::Keyword(KeywordType::Ubyte)),
            },
            LiteralValue::WStr(chars) => Type::Array {
                length: chars.len() as u64 + 1,
                element: Box::new(Type::Keyword(KeywordType::Wchar)),
            },
        }
    }

    fn check_binary(&mut self, op: BinOp, lhs: &Expr, rhs: &Expr, scopes: &[TableId]) -> Type {
        let lhs_ty = self.check_expr(lhs, scopes);
        let rhs_ty = self.check_expr(rhs, scopes);
        match op {
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
                match common_type(&lhs_ty, &rhs_ty) {
                    Some(ty) => ty,
                    None => {
                        self.error(lhs.span, "arithmetic operands must be numeric");
                        Type::Keyword(KeywordType::Int)
                    }
                }
            }
            BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor => {
                if !lhs_ty.is_integer() || !rhs_ty.is_integer() {
                    self.error(lhs.span, "bitwise operands must be integers");
                    return Type::Keyword(KeywordType::Int);
                }
                common_type(&lhs_ty, &rhs_ty).unwrap_or(Type::Keyword(KeywordType::Int))
            }
            BinOp::Shl | BinOp::Shr => {
                if !lhs_ty.is_integer() || !rhs_ty.is_integer() {
                    self.error(lhs.span, "shift operands must be integers");
                }
                lhs_ty.unqualified().clone()
            }
        }
    }

    fn check_compare(&mut self, op: CmpOp, lhs: &Expr, rhs: &Expr, scopes: &[TableId]) -> Type {
        let lhs_ty = self.check_expr(lhs, scopes);
        let rhs_ty = self.check_expr(rhs, scopes);
        let compatible = common_type(&lhs_ty, &rhs_ty).is_some()
            || implicitly_convertible(&lhs_ty, &rhs_ty)
            || implicitly_convertible(&rhs_ty, &lhs_ty);
        if !compatible {
            self.error(lhs.span, "comparison operands are not of compatible types");
        }
        if op == CmpOp::Spaceship {
            Type::Keyword(KeywordType::Byte)
        } else {
            Type::Keyword(KeywordType::Bool)
        }
    }

    fn check_unary(&mut self, op: UnOp, operand: &Expr, scopes: &[TableId]) -> Type {
        let operand_ty = self.check_expr(operand, scopes);
        match op {
            UnOp::Neg => {
                if !operand_ty.is_numeric() {
                    self.error(operand.span, "unary '-' requires a numeric operand");
                }
                operand_ty.unqualified().clone()
            }
            UnOp::LogNot => {
                self.require_bool(&operand_ty, operand.span);
                Type::Keyword(KeywordType::Bool)
            }
            UnOp::BitNot => {
                if !operand_ty.is_integer() {
                    self.error(operand.span, "unary '~' requires an integer operand");
                }
                operand_ty.unqualified().clone()
            }
            UnOp::Deref => match operand_ty.unqualified() {
                Type::Pointer(inner) => (**inner).clone(),
                _ => {
                    self.error(operand.span, "'*' applied to a non-pointer expression");
                    Type::Keyword(KeywordType::Int)
                }
            },
            UnOp::AddrOf => {
                if !operand.is_assignable_shape() {
                    self.error(operand.span, "'&' requires an addressable location");
                }
                Type::pointer(operand_ty)
            }
            UnOp::PreInc | UnOp::PreDec | UnOp::PostInc | UnOp::PostDec => {
                if !operand.is_assignable_shape() {
                    self.error(operand.span, "increment/decrement requires an assignable location");
                }
                if !operand_ty.is_numeric() && !operand_ty.is_pointer() {
                    self.error(operand.span, "increment/decrement requires a numeric or pointer operand");
                }
                operand_ty
            }
        }
    }

    fn check_assign(&mut self, op: AssignOp, target: &Expr, value: &Expr, scopes: &[TableId]) -> Type {
        let target_ty = self.check_expr(target, scopes);
        let value_ty = self.check_expr(value, scopes);
        if !target.is_assignable_shape() {
            self.error(target.span, "left side of an assignment must be an assignable location");
        }
        let required = if op == AssignOp::Assign {
            value_ty.clone()
        } else {
            match common_type(&target_ty, &value_ty) {
                Some(ty) => ty,
                None => {
                    self.error(value.span, "compound assignment operands must be numeric");
                    target_ty.clone()
                }
            }
        };
        if !implicitly_convertible(&required, &target_ty) {
            self.error(value.span, "right side of an assignment is not convertible to the left side's type");
        }
        target_ty
    }

    fn check_member(&mut self, base: &Expr, field: &ast::Identifier, arrow: bool, scopes: &[TableId]) -> Type {
        let base_ty = self.check_expr(base, scopes);
        let struct_ty = if arrow {
            match base_ty.unqualified() {
                Type::Pointer(inner) => (**inner).clone(),
                _ => {
                    self.error(base.span, "'->' applied to a non-pointer expression");
                    return Type::Keyword(KeywordType::Int);
                }
            }
        } else {
            base_ty.clone()
        };
        let symbol = match struct_ty.unqualified() {
            Type::Reference { symbol, .. } => *symbol,
            _ => {
                self.error(base.span, "member access applied to a non-aggregate expression");
                return Type::Keyword(KeywordType::Int);
            }
        };
        match self.binder.symbols.get(symbol).as_type_definition() {
            Some(tlc_binder::TypeDefKind::Struct { fields, .. }) => {
                match fields.iter().find(|f| f.name == field.name) {
                    Some(member) => member.ty.clone(),
                    None => {
                        self.error(field.span, format!("no field named '{}' on this struct", field.name));
                        Type::Keyword(KeywordType::Int)
                    }
                }
            }
            Some(tlc_binder::TypeDefKind::Union { options, .. }) => {
                match options.iter().find(|f| f.name == field.name) {
                    Some(member) => member.ty.clone(),
                    None => {
                        self.error(field.span, format!("no option named '{}' on this union", field.name));
                        Type::Keyword(KeywordType::Int)
                    }
                }
            }
            _ => {
                self.error(base.span, "member access applied to a non-struct, non-union type");
                Type::Keyword(KeywordType::Int)
            }
        }
    }

    fn check_call(&mut self, callee: &Expr, args: &[Expr], span: Span, scopes: &[TableId]) -> Type {
        let arg_types: Vec<Type> = args.iter().map(|a| self.check_expr(a, scopes)).collect();

        let name = match &callee.kind {
            ExprKind::Identifier(ident) => Some(&ident.name),
            ExprKind::ScopedIdentifier(scoped) => Some(&scoped.last().name),
            _ => None,
        };

        if let Some(name) = name {
            if let Some(sigs) = self.local_signatures.get(name) {
                let candidates: Vec<(u32, Type)> = sigs
                    .iter()
                    .filter(|sig| {
                        args.len() >= sig.required
                            && args.len() <= sig.arg_types.len()
                            && sig
                                .arg_types
                                .iter()
                                .zip(arg_types.iter())
                                .all(|(expected, actual)| implicitly_convertible(actual, expected))
                    })
                    .map(|sig| {
                        let cost = sig.arg_types.iter().zip(arg_types.iter()).map(|(e, a)| conversion_cost(a, e)).sum();
                        (cost, sig.return_type.clone())
                    })
                    .collect();
                return self.resolve_overload_matches(candidates, span, name);
            }
        }

        let symbol = match &callee.kind {
            ExprKind::Identifier(ident) => ident.resolved.get(),
            ExprKind::ScopedIdentifier(scoped) => scoped.last().resolved.get(),
            _ => None,
        };
        if let Some(symbol) = symbol {
            if let Some(overloads) = self.binder.symbols.get(symbol).as_function_group() {
                let candidates: Vec<(u32, Type)> = overloads
                    .iter()
                    .filter(|o| {
                        o.arg_types.len() == args.len()
                            && o.arg_types.iter().zip(arg_types.iter()).all(|(expected, actual)| implicitly_convertible(actual, expected))
                    })
                    .map(|o| {
                        let cost = o.arg_types.iter().zip(arg_types.iter()).map(|(e, a)| conversion_cost(a, e)).sum();
                        (cost, o.return_type.clone())
                    })
                    .collect();
                return self.resolve_overload_matches(candidates, span, name.map(String::as_str).unwrap_or("<callee>"));
            }
        }

        // Fall back to a function-pointer-valued callee.
        let callee_ty = self.check_expr(callee, scopes);
        let fun_ptr = match callee_ty.unqualified() {
            Type::FunPtr { return_type, arg_types } => Some((return_type.as_ref(), arg_types)),
            Type::Pointer(inner) => match inner.unqualified() {
                Type::FunPtr { return_type, arg_types } => Some((return_type.as_ref(), arg_types)),
                _ => None,
            },
            _ => None,
        };
        match fun_ptr {
            Some((return_type, expected)) => {
                if expected.len() != args.len() || !expected.iter().zip(arg_types.iter()).all(|(e, a)| implicitly_convertible(a, e)) {
                    self.error(span, "call arguments do not match the function pointer's signature");
                }
                return_type.clone()
            }
            None => {
                self.error(span, "callee does not resolve to a function or function pointer");
                Type::Keyword(KeywordType::Int)
            }
        }
    }

    /// Picks the viable overload with the lowest total per-argument
    /// conversion cost (spec.md §4.3's "unique element" rule, sharpened so
    /// an exact or same-family match beats a convertible-but-unrelated one —
    /// otherwise `f(1)` against `f(int)`/`f(double)` would be ambiguous,
    /// since an integer literal is implicitly convertible to both).
    fn resolve_overload_matches(&mut self, candidates: Vec<(u32, Type)>, span: Span, name: &str) -> Type {
        match candidates.iter().map(|(cost, _)| *cost).min() {
            None => {
                self.error(span, format!("no overload of '{name}' matches this call"));
                Type::Keyword(KeywordType::Int)
            }
            Some(best) => {
                let mut winners = candidates.into_iter().filter(|(cost, _)| *cost == best);
                let (_, ty) = winners.next().expect("min implies at least one candidate");
                if winners.next().is_some() {
                    self.error(span, format!("call to '{name}' is ambiguous among multiple equally-good overloads"));
                }
                ty
            }
        }
    }
}
