//! The translator (spec.md §4.4): lowers a checked file into a vector of
//! [`Fragment`]s. Walks the same shapes `tlc-checker`'s `checker.rs` walks,
//! reusing its scope-chain and overload-resolution technique since neither
//! is exported from that crate (see DESIGN.md).

use crate::entry::IrEntry;
use crate::frame::{Access, Frame, GlobalAccess, StackAccess, StackMachineFrame};
use crate::fragment::Fragment;
use crate::labels::LabelGenerator;
use crate::mangle::{mangle_function, mangle_variable};
use crate::op::IrOp;
use crate::operand::Operand;
use rustc_hash::{FxHashMap, FxHashSet};
use std::rc::Rc;
use tlc_binder::{Binder, Overload, SymbolEntry, TypeDefKind};
use tlc_checker::TypeArena;
use tlc_common::{ice, limits, DiagnosticBag, KeywordType, Span, SymbolId, TableId};
use tlc_parser::ast::{self, AssignOp, BinOp, CmpOp, Expr, ExprKind, LiteralValue, Param, Stmt, StmtKind, TypeExpr, UnOp};
use tlc_types::{implicitly_convertible, ReferenceLookup, Type, TypeKind};

/// Lowers every top-level body of `file` into fragments, in source order
/// (spec.md §4.4). Expects binding and checking to have already run.
pub fn translate_file(file: &ast::File, binder: &Binder, types: &TypeArena, diags: &mut DiagnosticBag) -> Vec<Fragment> {
    let module = binder
        .module_table(&file.module.as_dotted())
        .unwrap_or_else(|| ice!(Span::synthetic(), "module '{}' was never bound", file.module.as_dotted()));

    let mut translator = Translator {
        binder,
        types,
        diags,
        module_name: file.module.as_dotted(),
        module,
        labels: LabelGenerator::new(),
        frame: None,
        ret_access: None,
        accesses: FxHashMap::default(),
        escaping: FxHashSet::default(),
        break_labels: Vec::new(),
        continue_labels: Vec::new(),
    };

    let mut fragments = Vec::new();
    for decl in &file.bodies {
        translator.translate_top_decl(decl, &mut fragments);
    }
    fragments
}

/// Resolves a syntactic type without mutating the binder (every named type
/// reachable from here was already entered into a table during binding;
/// same technique as `tlc-checker`'s private `resolve_type_readonly`).
fn resolve_type(ty: &TypeExpr, scope: TableId, binder: &Binder) -> Type {
    match ty {
        TypeExpr::Keyword { kind, .. } => Type::Keyword(*kind),
        TypeExpr::Qualified { base, is_const, is_volatile, .. } => {
            Type::qualified(resolve_type(base, scope, binder), *is_const, *is_volatile)
        }
        TypeExpr::Pointer { base, .. } => Type::pointer(resolve_type(base, scope, binder)),
        TypeExpr::Array { length, element, .. } => Type::Array {
            length: *length,
            element: Box::new(resolve_type(element, scope, binder)),
        },
        TypeExpr::FunPtr { return_type, arg_types, .. } => Type::FunPtr {
            return_type: Box::new(resolve_type(return_type, scope, binder)),
            arg_types: arg_types.iter().map(|a| resolve_type(a, scope, binder)).collect(),
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

/// Same ranking `tlc-checker`'s private `conversion_cost` uses, duplicated
/// here so a call site's selected overload (needed to mangle the callee)
/// can be recovered independently — `tlc-checker` discards that identity
/// once it has the overload's return type (see DESIGN.md).
fn conversion_cost(from: &Type, to: &Type) -> u32 {
    if from.equal(to) {
        0
    } else if (from.is_integer() && to.is_integer()) || (from.is_float() && to.is_float()) || (from.is_pointer() && to.is_pointer()) {
        1
    } else {
        2
    }
}

fn select_overload<'o>(overloads: &'o [Overload], arg_types: &[Type]) -> Option<&'o Overload> {
    overloads
        .iter()
        .filter(|o| {
            o.arg_types.len() == arg_types.len()
                && o.arg_types.iter().zip(arg_types.iter()).all(|(expected, actual)| implicitly_convertible(actual, expected))
        })
        .map(|o| {
            let cost: u32 = o.arg_types.iter().zip(arg_types.iter()).map(|(e, a)| conversion_cost(a, e)).sum();
            (cost, o)
        })
        .min_by_key(|(cost, _)| *cost)
        .map(|(_, o)| o)
}

fn is_zero_literal(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Literal(LiteralValue::Int(0)) => true,
        ExprKind::Literal(LiteralValue::Float(v, _)) => *v == 0.0,
        ExprKind::Literal(LiteralValue::Bool(false)) => true,
        ExprKind::Literal(LiteralValue::Char(c)) => *c == '\0',
        ExprKind::Literal(LiteralValue::WChar(c)) => *c == 0,
        ExprKind::Literal(LiteralValue::Null) => true,
        ExprKind::AggregateInit { elements } => elements.iter().all(is_zero_literal),
        _ => false,
    }
}

fn literal_bits(lit: &LiteralValue) -> u64 {
    match lit {
        LiteralValue::Int(v) => *v,
        LiteralValue::Char(c) => *c as u64,
        LiteralValue::WChar(c) => *c as u64,
        LiteralValue::Float(v, true) => (*v as f32).to_bits() as u64,
        LiteralValue::Float(v, false) => v.to_bits(),
        LiteralValue::Bool(b) => *b as u64,
        LiteralValue::Null => 0,
        LiteralValue::Str(_) | LiteralValue::WStr(_) => {
            ice!(Span::synthetic(), "string literal bits requested through the scalar path")
        }
    }
}

/// Every identifier chain an `&` could root through: plain variable,
/// through a struct field, or into an array element. Stops at a
/// dereference, since the pointer's own pointee never needs a stack slot
/// just because something was addressed through it.
fn base_identifier(expr: &Expr) -> Option<SymbolId> {
    match &expr.kind {
        ExprKind::Identifier(ident) => ident.resolved.get(),
        ExprKind::ScopedIdentifier(scoped) => scoped.last().resolved.get(),
        ExprKind::Member { base, .. } => base_identifier(base),
        ExprKind::Index { base, .. } => base_identifier(base),
        _ => None,
    }
}

/// `tlc-binder`'s `escapes` flag is never set past its `false` default (see
/// DESIGN.md), so this translator recovers it itself with a pre-pass over
/// each function body looking for `&` applied to a variable, directly or
/// through a field/subscript chain.
fn collect_escaping(stmt: &Stmt) -> FxHashSet<SymbolId> {
    let mut set = FxHashSet::default();
    walk_stmt_for_escapes(stmt, &mut set);
    set
}

fn walk_stmt_for_escapes(stmt: &Stmt, set: &mut FxHashSet<SymbolId>) {
    match &stmt.kind {
        StmtKind::Compound { stmts, .. } => stmts.iter().for_each(|s| walk_stmt_for_escapes(s, set)),
        StmtKind::If { cond, then_branch, else_branch } => {
            walk_expr_for_escapes(cond, set);
            walk_stmt_for_escapes(then_branch, set);
            if let Some(else_branch) = else_branch {
                walk_stmt_for_escapes(else_branch, set);
            }
        }
        StmtKind::While { cond, body } | StmtKind::DoWhile { body, cond } => {
            walk_expr_for_escapes(cond, set);
            walk_stmt_for_escapes(body, set);
        }
        StmtKind::For { init, cond, update, body, .. } => {
            if let Some(init) = init {
                walk_stmt_for_escapes(init, set);
            }
            if let Some(cond) = cond {
                walk_expr_for_escapes(cond, set);
            }
            if let Some(update) = update {
                walk_expr_for_escapes(update, set);
            }
            walk_stmt_for_escapes(body, set);
        }
        StmtKind::Switch { scrutinee, cases, default, .. } => {
            walk_expr_for_escapes(scrutinee, set);
            for case in cases {
                case.values.iter().for_each(|v| walk_expr_for_escapes(v, set));
                case.body.iter().for_each(|s| walk_stmt_for_escapes(s, set));
            }
            if let Some(default) = default {
                default.body.iter().for_each(|s| walk_stmt_for_escapes(s, set));
            }
        }
        StmtKind::Return { value: Some(value) } => walk_expr_for_escapes(value, set),
        StmtKind::Expr(expr) => walk_expr_for_escapes(expr, set),
        StmtKind::VarDecl { initializers, .. } => initializers.iter().flatten().for_each(|e| walk_expr_for_escapes(e, set)),
        StmtKind::Break | StmtKind::Continue | StmtKind::Return { value: None } | StmtKind::Asm { .. } | StmtKind::Null => {}
    }
}

fn walk_expr_for_escapes(expr: &Expr, set: &mut FxHashSet<SymbolId>) {
    match &expr.kind {
        ExprKind::Unary { op: UnOp::AddrOf, operand } => {
            if let Some(symbol) = base_identifier(operand) {
                set.insert(symbol);
            }
            walk_expr_for_escapes(operand, set);
        }
        ExprKind::Seq(items) => items.iter().for_each(|e| walk_expr_for_escapes(e, set)),
        ExprKind::Binary { lhs, rhs, .. } | ExprKind::Compare { lhs, rhs, .. } | ExprKind::LogAnd { lhs, rhs } | ExprKind::LogOr { lhs, rhs } => {
            walk_expr_for_escapes(lhs, set);
            walk_expr_for_escapes(rhs, set);
        }
        ExprKind::Unary { operand, .. } => walk_expr_for_escapes(operand, set),
        ExprKind::Assign { target, value, .. } | ExprKind::AssignLogical { target, value, .. } => {
            walk_expr_for_escapes(target, set);
            walk_expr_for_escapes(value, set);
        }
        ExprKind::Ternary { cond, then_branch, else_branch } => {
            walk_expr_for_escapes(cond, set);
            walk_expr_for_escapes(then_branch, set);
            walk_expr_for_escapes(else_branch, set);
        }
        ExprKind::Member { base, .. } => walk_expr_for_escapes(base, set),
        ExprKind::Index { base, index } => {
            walk_expr_for_escapes(base, set);
            walk_expr_for_escapes(index, set);
        }
        ExprKind::Call { callee, args } => {
            walk_expr_for_escapes(callee, set);
            args.iter().for_each(|a| walk_expr_for_escapes(a, set));
        }
        ExprKind::AggregateInit { elements } => elements.iter().for_each(|e| walk_expr_for_escapes(e, set)),
        ExprKind::Cast { expr, .. } => walk_expr_for_escapes(expr, set),
        ExprKind::SizeofExpr { expr } => walk_expr_for_escapes(expr, set),
        ExprKind::SizeofType { .. } | ExprKind::Literal(_) | ExprKind::Identifier(_) | ExprKind::ScopedIdentifier(_) => {}
    }
}

/// The non-negated jump for a value comparison (spec.md §8 scenario 6: the
/// branching evaluator jumps straight off a `Compare` node rather than
/// materializing a bool first).
fn cmp_jump_op(op: CmpOp, negate: bool, is_float: bool, is_unsigned: bool) -> IrOp {
    let base = match (op, negate) {
        (CmpOp::Lt, false) | (CmpOp::Ge, true) => IrOp::Jl,
        (CmpOp::Le, false) | (CmpOp::Gt, true) => IrOp::Jle,
        (CmpOp::Eq, false) | (CmpOp::Ne, true) => IrOp::Je,
        (CmpOp::Ne, false) | (CmpOp::Eq, true) => IrOp::Jne,
        (CmpOp::Ge, false) | (CmpOp::Lt, true) => IrOp::Jge,
        (CmpOp::Gt, false) | (CmpOp::Le, true) => IrOp::Jg,
        (CmpOp::Spaceship, _) => ice!(Span::synthetic(), "spaceship is not a branch predicate"),
    };
    if is_float {
        base.float_jump()
    } else if is_unsigned {
        base.unsigned_jump()
    } else {
        base
    }
}

/// The value-producing compare opcode for a `Compare` node evaluated outside
/// branch position (e.g. `bool b = a < c;`): spec.md §6.4's opcode set
/// carries a dedicated instruction per relation, so this needs no branch at
/// all.
fn cmp_value_op(op: CmpOp, is_float: bool, is_unsigned: bool) -> IrOp {
    match (op, is_float, is_unsigned) {
        (CmpOp::Lt, true, _) => IrOp::FpL,
        (CmpOp::Le, true, _) => IrOp::FpLe,
        (CmpOp::Eq, true, _) => IrOp::FpE,
        (CmpOp::Ne, true, _) => IrOp::FpNe,
        (CmpOp::Ge, true, _) => IrOp::FpGe,
        (CmpOp::Gt, true, _) => IrOp::FpG,
        (CmpOp::Lt, false, true) => IrOp::B,
        (CmpOp::Le, false, true) => IrOp::Be,
        (CmpOp::Ge, false, true) => IrOp::Ae,
        (CmpOp::Gt, false, true) => IrOp::A,
        (CmpOp::Lt, false, false) => IrOp::L,
        (CmpOp::Le, false, false) => IrOp::Le,
        (CmpOp::Ge, false, false) => IrOp::Ge,
        (CmpOp::Gt, false, false) => IrOp::G,
        (CmpOp::Eq, false, _) => IrOp::E,
        (CmpOp::Ne, false, _) => IrOp::Ne,
        (CmpOp::Spaceship, ..) => ice!(Span::synthetic(), "spaceship has no single compare opcode"),
    }
}

fn is_signed_numeric(ty: &Type) -> bool {
    ty.as_keyword().map(KeywordType::is_signed).unwrap_or(true)
}

/// Picks the conversion opcode from `from` to `to`, or `None` when the two
/// share a representation and the value can just be reinterpreted (equal
/// types, qualifier-only changes, pointer recasts, same-width resignings).
fn conversion_op(from: &Type, to: &Type, lookup: &dyn ReferenceLookup) -> Option<IrOp> {
    let (Some(fk), Some(tk)) = (from.as_keyword(), to.as_keyword()) else {
        return None;
    };
    if fk == tk {
        return None;
    }
    if fk.is_integer() && tk.is_integer() {
        let fw = Type::Keyword(fk).size_of(lookup);
        let tw = Type::Keyword(tk).size_of(lookup);
        if tw > fw {
            Some(if fk.is_signed() { widen_signed(tw) } else { widen_unsigned(tw) })
        } else if tw < fw {
            Some(truncate_to(tw))
        } else {
            None
        }
    } else if fk.is_integer() && tk.is_float() {
        Some(match (fk.is_signed(), tk) {
            (true, KeywordType::Float) => IrOp::SToFloat,
            (true, KeywordType::Double) => IrOp::SToDouble,
            (false, KeywordType::Float) => IrOp::UToFloat,
            (false, KeywordType::Double) => IrOp::UToDouble,
            _ => ice!(Span::synthetic(), "non-float target in integer-to-float conversion"),
        })
    } else if fk.is_float() && tk.is_integer() {
        let tw = Type::Keyword(tk).size_of(lookup);
        Some(float_to_int(tw))
    } else if fk.is_float() && tk.is_float() {
        Some(if tk == KeywordType::Double { IrOp::FToDouble } else { IrOp::FToFloat })
    } else {
        None
    }
}

fn widen_signed(to_width: u64) -> IrOp {
    match to_width {
        2 => IrOp::SxShort,
        4 => IrOp::SxInt,
        _ => IrOp::SxLong,
    }
}

fn widen_unsigned(to_width: u64) -> IrOp {
    match to_width {
        2 => IrOp::ZxShort,
        4 => IrOp::ZxInt,
        _ => IrOp::ZxLong,
    }
}

fn truncate_to(to_width: u64) -> IrOp {
    match to_width {
        1 => IrOp::TruncByte,
        2 => IrOp::TruncShort,
        _ => IrOp::TruncInt,
    }
}

fn float_to_int(to_width: u64) -> IrOp {
    match to_width {
        1 => IrOp::FToByte,
        2 => IrOp::FToShort,
        4 => IrOp::FToInt,
        _ => IrOp::FToLong,
    }
}

struct Translator<'a> {
    binder: &'a Binder,
    types: &'a TypeArena,
    diags: &'a mut DiagnosticBag,
    module_name: String,
    module: TableId,
    labels: LabelGenerator,
    frame: Option<StackMachineFrame>,
    ret_access: Option<Rc<dyn Access>>,
    accesses: FxHashMap<SymbolId, Rc<dyn Access>>,
    escaping: FxHashSet<SymbolId>,
    break_labels: Vec<String>,
    continue_labels: Vec<String>,
}

impl<'a> Translator<'a> {
    fn lookup(&self) -> &dyn ReferenceLookup {
        &self.binder.symbols
    }

    fn result_type(&self, expr: &Expr) -> Type {
        let id = expr
            .result_type()
            .unwrap_or_else(|| ice!(expr.span, "expression reached translation with no checked type"));
        self.types.get(id).clone()
    }

    fn frame_mut(&mut self) -> &mut StackMachineFrame {
        self.frame.as_mut().unwrap_or_else(|| ice!(Span::synthetic(), "no active function frame"))
    }

    fn fresh(&mut self, ty: &Type) -> Operand {
        let size = ty.size_of(self.lookup());
        let hint = ty.kind_of(self.lookup());
        self.frame_mut().fresh_temp(size, hint)
    }

    fn translate_top_decl(&mut self, decl: &ast::TopDecl, out: &mut Vec<Fragment>) {
        match &decl.kind {
            ast::TopDeclKind::VarDef { ty, names, initializers } => {
                self.translate_global(ty, names, initializers, out);
            }
            ast::TopDeclKind::FunctionDef { return_type, name, params, body, local_symbols } => {
                let fragment = self.translate_function(return_type, &name.name, params, body, local_symbols, out);
                out.push(fragment);
            }
            ast::TopDeclKind::FunctionDecl { .. }
            | ast::TopDeclKind::Opaque { .. }
            | ast::TopDeclKind::StructDecl { .. }
            | ast::TopDeclKind::UnionDecl { .. }
            | ast::TopDeclKind::EnumDecl { .. }
            | ast::TopDeclKind::TypedefDecl { .. } => {}
        }
    }

    // -- Globals (spec.md §4.4 "Initializer lowering") --------------------

    fn translate_global(&mut self, ty: &TypeExpr, names: &[ast::Identifier], initializers: &[Option<Expr>], out: &mut Vec<Fragment>) {
        let declared = resolve_type(ty, self.module, self.binder);
        let lookup = self.lookup();
        let size = declared.size_of(lookup);
        let align = declared.align_of(lookup).max(1);
        let is_const = declared.is_const();

        for (name, init) in names.iter().zip(initializers.iter()) {
            let label = mangle_variable(&self.module_name, &name.name);
            match init {
                None => out.push(Fragment::Bss { label, size, alignment: align }),
                Some(expr) if is_zero_literal(expr) => out.push(Fragment::Bss { label, size, alignment: align }),
                Some(expr) => {
                    let entries = self.const_eval_global(expr, &declared, out);
                    if is_const {
                        out.push(Fragment::Rodata { label, alignment: align, entries });
                    } else {
                        out.push(Fragment::Data { label, alignment: align, entries });
                    }
                }
            }
        }
    }

    fn const_eval_global(&mut self, expr: &Expr, declared: &Type, out: &mut Vec<Fragment>) -> Vec<IrEntry> {
        let lookup = self.lookup();
        match &expr.kind {
            ExprKind::Literal(LiteralValue::Str(bytes)) => {
                let mut with_nul = bytes.clone();
                with_nul.push(0);
                let str_label = self.labels.data_label();
                let entry = IrEntry::constant(with_nul.len() as u64, Operand::Str { bytes: with_nul });
                out.push(Fragment::Rodata { label: str_label.clone(), alignment: 1, entries: vec![entry] });
                vec![IrEntry::constant(declared.size_of(lookup), Operand::name(str_label))]
            }
            ExprKind::Literal(LiteralValue::WStr(chars)) => {
                let mut with_nul = chars.clone();
                with_nul.push(0);
                let byte_len = with_nul.len() as u64 * limits::WCHAR_WIDTH;
                let str_label = self.labels.data_label();
                let entry = IrEntry::constant(byte_len, Operand::WStr { chars: with_nul });
                out.push(Fragment::Rodata { label: str_label.clone(), alignment: limits::WCHAR_WIDTH, entries: vec![entry] });
                vec![IrEntry::constant(declared.size_of(lookup), Operand::name(str_label))]
            }
            ExprKind::Literal(lit) => {
                let size = declared.size_of(lookup);
                vec![IrEntry::constant(size, Operand::constant(size, literal_bits(lit)))]
            }
            ExprKind::AggregateInit { elements } => {
                let field_types = self.aggregate_field_types(declared, elements.len());
                elements
                    .iter()
                    .zip(field_types.iter())
                    .flat_map(|(element, ty)| self.const_eval_global(element, ty, out))
                    .collect()
            }
            _ => {
                self.diags.error(expr.span, "global initializer must be a constant expression");
                Vec::new()
            }
        }
    }

    fn aggregate_field_types(&self, declared: &Type, n: usize) -> Vec<Type> {
        match declared.unqualified() {
            Type::Array { element, .. } => (0..n).map(|_| (**element).clone()).collect(),
            Type::Reference { symbol, .. } => match self.binder.symbols.get(*symbol).as_type_definition() {
                Some(TypeDefKind::Struct { fields, .. }) => fields.iter().map(|f| f.ty.clone()).collect(),
                _ => (0..n).map(|_| Type::Keyword(KeywordType::Int)).collect(),
            },
            _ => (0..n).map(|_| declared.clone()).collect(),
        }
    }

    // -- Functions (spec.md §4.4 "Function lowering") ----------------------

    fn translate_function(
        &mut self,
        return_type: &TypeExpr,
        name: &str,
        params: &[Param],
        body: &Stmt,
        local_symbols: &std::cell::Cell<Option<TableId>>,
        extra: &mut Vec<Fragment>,
    ) -> Fragment {
        let ret_ty = resolve_type(return_type, self.module, self.binder);
        let param_types: Vec<Type> = params.iter().map(|p| resolve_type(&p.ty, self.module, self.binder)).collect();
        let label = mangle_function(&self.module_name, name, &param_types);
        let fn_scope = local_symbols.get().unwrap_or_else(|| ice!(Span::synthetic(), "function body has no attached scope"));

        self.escaping = collect_escaping(body);
        self.frame = Some(StackMachineFrame::new(&mut self.labels));
        self.accesses.clear();
        self.break_labels.clear();
        self.continue_labels.clear();

        for param in params {
            let pty = resolve_type(&param.ty, self.module, self.binder);
            match &param.name {
                Some(pname) => {
                    let symbol = self
                        .binder
                        .tables
                        .get(fn_scope)
                        .get(&pname.name)
                        .unwrap_or_else(|| ice!(pname.span, "parameter '{}' has no bound symbol", pname.name));
                    let escapes = self.escaping.contains(&symbol);
                    let lookup = &self.binder.symbols;
                    let access: Rc<dyn Access> = self.frame_mut().alloc_arg(&pty, escapes, lookup).into();
                    self.accesses.insert(symbol, access);
                }
                None => {
                    let lookup = &self.binder.symbols;
                    self.frame_mut().alloc_arg(&pty, false, lookup);
                }
            }
        }
        let lookup = &self.binder.symbols;
        self.ret_access = self.frame_mut().alloc_ret_val(&ret_ty, lookup).map(Rc::from);

        let mut body_ir = Vec::new();
        self.translate_stmt(body, &[fn_scope], &ret_ty, &mut body_ir, extra);
        body_ir = self.frame_mut().generate_entry_exit(body_ir);
        let frame_info = self.frame_mut().info();

        Fragment::Text { label, frame: frame_info, entries: body_ir }
    }

    // -- Statements (spec.md §4.4 "Statement lowering") --------------------

    fn translate_stmt(&mut self, stmt: &Stmt, scopes: &[TableId], ret_ty: &Type, out: &mut Vec<IrEntry>, extra: &mut Vec<Fragment>) {
        match &stmt.kind {
            StmtKind::Compound { stmts, symbols } => {
                let scope = symbols.get().unwrap_or_else(|| ice!(stmt.span, "compound statement has no attached scope"));
                let mut nested = Vec::with_capacity(scopes.len() + 1);
                nested.push(scope);
                nested.extend_from_slice(scopes);
                self.frame_mut().scope_start();
                let mut body = Vec::new();
                for inner in stmts {
                    self.translate_stmt(inner, &nested, ret_ty, &mut body, extra);
                }
                body = self.frame_mut().scope_end(body);
                out.extend(body);
            }
            StmtKind::If { cond, then_branch, else_branch } => {
                let else_label = self.labels.code_label();
                self.translate_branch(cond, scopes, out, extra, &else_label, false);
                self.translate_stmt(then_branch, scopes, ret_ty, out, extra);
                match else_branch {
                    Some(else_branch) => {
                        let end_label = self.labels.code_label();
                        out.push(IrEntry::jump(Operand::name(end_label.clone())));
                        out.push(IrEntry::label(Operand::name(else_label)));
                        self.translate_stmt(else_branch, scopes, ret_ty, out, extra);
                        out.push(IrEntry::label(Operand::name(end_label)));
                    }
                    None => out.push(IrEntry::label(Operand::name(else_label))),
                }
            }
            StmtKind::While { cond, body } => {
                let top = self.labels.code_label();
                let end = self.labels.code_label();
                out.push(IrEntry::label(Operand::name(top.clone())));
                self.translate_branch(cond, scopes, out, extra, &end, false);
                self.break_labels.push(end.clone());
                self.continue_labels.push(top.clone());
                self.translate_stmt(body, scopes, ret_ty, out, extra);
                self.break_labels.pop();
                self.continue_labels.pop();
                out.push(IrEntry::jump(Operand::name(top)));
                out.push(IrEntry::label(Operand::name(end)));
            }
            StmtKind::DoWhile { body, cond } => {
                let top = self.labels.code_label();
                let cont = self.labels.code_label();
                let end = self.labels.code_label();
                out.push(IrEntry::label(Operand::name(top.clone())));
                self.break_labels.push(end.clone());
                self.continue_labels.push(cont.clone());
                self.translate_stmt(body, scopes, ret_ty, out, extra);
                self.break_labels.pop();
                self.continue_labels.pop();
                out.push(IrEntry::label(Operand::name(cont)));
                self.translate_branch(cond, scopes, out, extra, &top, true);
                out.push(IrEntry::label(Operand::name(end)));
            }
            StmtKind::For { init, cond, update, body, symbols } => {
                let scope = symbols.get().unwrap_or_else(|| ice!(stmt.span, "for statement has no attached scope"));
                let mut nested = Vec::with_capacity(scopes.len() + 1);
                nested.push(scope);
                nested.extend_from_slice(scopes);
                if let Some(init) = init {
                    self.translate_stmt(init, &nested, ret_ty, out, extra);
                }
                let top = self.labels.code_label();
                let update_label = self.labels.code_label();
                let end = self.labels.code_label();
                out.push(IrEntry::label(Operand::name(top.clone())));
                if let Some(cond) = cond {
                    self.translate_branch(cond, &nested, out, extra, &end, false);
                }
                self.break_labels.push(end.clone());
                self.continue_labels.push(update_label.clone());
                self.translate_stmt(body, &nested, ret_ty, out, extra);
                self.break_labels.pop();
                self.continue_labels.pop();
                out.push(IrEntry::label(Operand::name(update_label)));
                if let Some(update) = update {
                    self.translate_expr(update, &nested, out, extra);
                }
                out.push(IrEntry::jump(Operand::name(top)));
                out.push(IrEntry::label(Operand::name(end)));
            }
            StmtKind::Switch { scrutinee, cases, default, symbols } => {
                let scope = symbols.get().unwrap_or_else(|| ice!(stmt.span, "switch statement has no attached scope"));
                let mut nested = Vec::with_capacity(scopes.len() + 1);
                nested.push(scope);
                nested.extend_from_slice(scopes);

                let scrutinee_ty = self.result_type(scrutinee);
                let size = scrutinee_ty.size_of(self.lookup());
                let scrutinee_op = self.translate_expr(scrutinee, &nested, out, extra);
                let held = self.fresh(&scrutinee_ty);
                out.push(IrEntry::r#move(size, held.clone(), scrutinee_op));

                let end_label = self.labels.code_label();
                let default_label = if default.is_some() { self.labels.code_label() } else { end_label.clone() };
                let case_labels: Vec<String> = cases.iter().map(|_| self.labels.code_label()).collect();

                for (case, case_label) in cases.iter().zip(case_labels.iter()) {
                    for value in &case.values {
                        let value_op = self.translate_expr(value, &nested, out, extra);
                        out.push(IrEntry::cjump(IrOp::Je, size, Operand::name(case_label.clone()), held.clone(), value_op));
                    }
                }
                out.push(IrEntry::jump(Operand::name(default_label.clone())));

                self.break_labels.push(end_label.clone());
                for (case, case_label) in cases.iter().zip(case_labels.iter()) {
                    out.push(IrEntry::label(Operand::name(case_label.clone())));
                    for inner in &case.body {
                        self.translate_stmt(inner, &nested, ret_ty, out, extra);
                    }
                    out.push(IrEntry::jump(Operand::name(end_label.clone())));
                }
                if let Some(default) = default {
                    out.push(IrEntry::label(Operand::name(default_label)));
                    for inner in &default.body {
                        self.translate_stmt(inner, &nested, ret_ty, out, extra);
                    }
                    out.push(IrEntry::jump(Operand::name(end_label.clone())));
                }
                self.break_labels.pop();
                out.push(IrEntry::label(Operand::name(end_label)));
            }
            StmtKind::Break => {
                let target = self.break_labels.last().unwrap_or_else(|| ice!(stmt.span, "break outside a loop or switch")).clone();
                out.push(IrEntry::jump(Operand::name(target)));
            }
            StmtKind::Continue => {
                let target = self.continue_labels.last().unwrap_or_else(|| ice!(stmt.span, "continue outside a loop")).clone();
                out.push(IrEntry::jump(Operand::name(target)));
            }
            StmtKind::Return { value } => {
                if let Some(value) = value {
                    let value_ty = self.result_type(value);
                    let op = self.translate_expr(value, scopes, out, extra);
                    let converted = self.convert(op, &value_ty, ret_ty, out);
                    if let Some(access) = self.ret_access.clone() {
                        access.store(out, converted);
                    }
                }
                let exit = self.frame_mut().exit_label().to_string();
                out.push(IrEntry::jump(Operand::name(exit)));
            }
            StmtKind::Asm { code } => out.push(IrEntry::asm(Operand::Asm { code: code.clone() })),
            StmtKind::Expr(expr) => {
                self.translate_expr(expr, scopes, out, extra);
            }
            StmtKind::VarDecl { ty, names, initializers } => {
                let declared = resolve_type(ty, self.module, self.binder);
                let scope = scopes.first().copied().unwrap_or(self.module);
                for (name, init) in names.iter().zip(initializers.iter()) {
                    let symbol = self
                        .binder
                        .tables
                        .get(scope)
                        .get(&name.name)
                        .unwrap_or_else(|| ice!(name.span, "local '{}' has no bound symbol", name.name));
                    let escapes = self.escaping.contains(&symbol);
                    let lookup = &self.binder.symbols;
                    let access: Rc<dyn Access> = self.frame_mut().alloc_local(&declared, escapes, lookup).into();
                    self.accesses.insert(symbol, access.clone());
                    if let Some(init) = init {
                        let init_ty = self.result_type(init);
                        let value = self.translate_expr(init, scopes, out, extra);
                        let converted = self.convert(value, &init_ty, &declared, out);
                        access.store(out, converted);
                    }
                }
            }
            StmtKind::Null => {}
        }
    }

    /// Emits code so control falls through when `expr`'s boolean value is
    /// `!jump_when` and jumps to `target` when it is `jump_when` — the
    /// branching evaluator spec.md §8 scenario 6 requires: a `Compare` (or
    /// `&&`/`||`/`!` built from one) in condition position never
    /// materializes a bool, it drives a direct conditional jump.
    fn translate_branch(&mut self, expr: &Expr, scopes: &[TableId], out: &mut Vec<IrEntry>, extra: &mut Vec<Fragment>, target: &str, jump_when: bool) {
        match &expr.kind {
            ExprKind::Compare { op, lhs, rhs } if *op != CmpOp::Spaceship => {
                let lhs_ty = self.result_type(lhs);
                let size = lhs_ty.size_of(self.lookup());
                let is_float = lhs_ty.is_float();
                let is_unsigned = !is_signed_numeric(&lhs_ty);
                let lhs_op = self.translate_expr(lhs, scopes, out, extra);
                let rhs_op = self.translate_expr(rhs, scopes, out, extra);
                let jump_op = cmp_jump_op(*op, !jump_when, is_float, is_unsigned);
                out.push(IrEntry::cjump(jump_op, size, Operand::name(target), lhs_op, rhs_op));
            }
            ExprKind::LogAnd { lhs, rhs } => {
                if !jump_when {
                    self.translate_branch(lhs, scopes, out, extra, target, false);
                    self.translate_branch(rhs, scopes, out, extra, target, false);
                } else {
                    let skip = self.labels.code_label();
                    self.translate_branch(lhs, scopes, out, extra, &skip, false);
                    self.translate_branch(rhs, scopes, out, extra, target, true);
                    out.push(IrEntry::label(Operand::name(skip)));
                }
            }
            ExprKind::LogOr { lhs, rhs } => {
                if jump_when {
                    self.translate_branch(lhs, scopes, out, extra, target, true);
                    self.translate_branch(rhs, scopes, out, extra, target, true);
                } else {
                    let skip = self.labels.code_label();
                    self.translate_branch(lhs, scopes, out, extra, &skip, true);
                    self.translate_branch(rhs, scopes, out, extra, target, false);
                    out.push(IrEntry::label(Operand::name(skip)));
                }
            }
            ExprKind::Unary { op: UnOp::LogNot, operand } => {
                self.translate_branch(operand, scopes, out, extra, target, !jump_when);
            }
            _ => {
                let ty = self.result_type(expr);
                let size = ty.size_of(self.lookup());
                let op = self.translate_expr(expr, scopes, out, extra);
                let jump_op = if jump_when { IrOp::Jne } else { IrOp::Je };
                out.push(IrEntry::cjump(jump_op, size, Operand::name(target), op, Operand::constant(size, 0)));
            }
        }
    }

    // -- Expressions (spec.md §4.4 "Expression lowering") ------------------

    fn access_for(&mut self, symbol: SymbolId, name: &str, defining_module: &str) -> Rc<dyn Access> {
        if let Some(access) = self.accesses.get(&symbol) {
            return access.clone();
        }
        let entry = self.binder.symbols.get(symbol);
        let access: Rc<dyn Access> = match entry {
            SymbolEntry::Variable { ty, .. } => {
                let size = ty.size_of(self.lookup());
                Rc::new(GlobalAccess { label: mangle_variable(defining_module, name), size })
            }
            SymbolEntry::FunctionGroup(_) | SymbolEntry::TypeDefinition(_) => {
                ice!(Span::synthetic(), "'{name}' does not resolve to an addressable variable")
            }
        };
        self.accesses.insert(symbol, access.clone());
        access
    }

    fn translate_expr(&mut self, expr: &Expr, scopes: &[TableId], out: &mut Vec<IrEntry>, extra: &mut Vec<Fragment>) -> Operand {
        match &expr.kind {
            ExprKind::Seq(items) => {
                let mut last = Operand::constant(0, 0);
                for item in items {
                    last = self.translate_expr(item, scopes, out, extra);
                }
                last
            }
            ExprKind::Literal(LiteralValue::Str(bytes)) => {
                let mut with_nul = bytes.clone();
                with_nul.push(0);
                let label = self.labels.data_label();
                let entry = IrEntry::constant(with_nul.len() as u64, Operand::Str { bytes: with_nul });
                extra.push(Fragment::Rodata { label: label.clone(), alignment: 1, entries: vec![entry] });
                Operand::name(label)
            }
            ExprKind::Literal(LiteralValue::WStr(chars)) => {
                let mut with_nul = chars.clone();
                with_nul.push(0);
                let byte_len = with_nul.len() as u64 * limits::WCHAR_WIDTH;
                let label = self.labels.data_label();
                let entry = IrEntry::constant(byte_len, Operand::WStr { chars: with_nul });
                extra.push(Fragment::Rodata { label: label.clone(), alignment: limits::WCHAR_WIDTH, entries: vec![entry] });
                Operand::name(label)
            }
            ExprKind::Literal(lit) => {
                let ty = self.result_type(expr);
                let size = ty.size_of(self.lookup());
                Operand::constant(size, literal_bits(lit))
            }
            ExprKind::Identifier(ident) => {
                let symbol = ident
                    .resolved
                    .get()
                    .unwrap_or_else(|| ice!(ident.span, "'{}' reached translation unresolved", ident.name));
                self.load_symbol(symbol, &ident.name, &self.module_name.clone(), out)
            }
            ExprKind::ScopedIdentifier(scoped) => {
                let last = scoped.last();
                let symbol = last.resolved.get().unwrap_or_else(|| ice!(scoped.span, "'{}' reached translation unresolved", last.name));
                let defining_module = if scoped.segments.len() > 1 {
                    scoped.segments[..scoped.segments.len() - 1]
                        .iter()
                        .map(|s| s.name.as_str())
                        .collect::<Vec<_>>()
                        .join(".")
                } else {
                    self.module_name.clone()
                };
                self.load_symbol(symbol, &last.name, &defining_module, out)
            }
            ExprKind::Binary { op, lhs, rhs } => self.translate_binary(*op, lhs, rhs, expr, scopes, out, extra),
            ExprKind::Compare { op, lhs, rhs } => self.translate_compare(*op, lhs, rhs, scopes, out, extra),
            ExprKind::LogAnd { .. } | ExprKind::LogOr { .. } => self.translate_short_circuit_value(expr, scopes, out, extra),
            ExprKind::Unary { op, operand } => self.translate_unary(*op, operand, expr, scopes, out, extra),
            ExprKind::Assign { op, target, value } => self.translate_assign(*op, target, value, expr, scopes, out, extra),
            ExprKind::AssignLogical { is_and, target, value } => {
                self.translate_assign_logical(*is_and, target, value, scopes, out, extra)
            }
            ExprKind::Ternary { cond, then_branch, else_branch } => self.translate_ternary(cond, then_branch, else_branch, expr, scopes, out, extra),
            ExprKind::Member { .. } | ExprKind::Index { .. } => {
                let ty = self.result_type(expr);
                let size = ty.size_of(self.lookup());
                let addr = self.translate_lvalue_address(expr, scopes, out, extra);
                let dest = self.fresh(&ty);
                out.push(IrEntry { op: IrOp::MemLoad, op_size: size, dest: Some(dest.clone()), arg1: Some(addr), arg2: None });
                dest
            }
            ExprKind::Call { callee, args } => self.translate_call(callee, args, expr, scopes, out, extra),
            ExprKind::AggregateInit { .. } => {
                ice!(expr.span, "aggregate initializer reached general expression translation")
            }
            ExprKind::Cast { ty, expr: inner } => {
                let scope = scopes.first().copied().unwrap_or(self.module);
                let target = resolve_type(ty, scope, self.binder);
                let inner_ty = self.result_type(inner);
                let inner_op = self.translate_expr(inner, scopes, out, extra);
                self.convert(inner_op, &inner_ty, &target, out)
            }
            ExprKind::SizeofType { ty } => {
                let scope = scopes.first().copied().unwrap_or(self.module);
                let resolved = resolve_type(ty, scope, self.binder);
                Operand::constant(limits::LONG_WIDTH, resolved.size_of(self.lookup()))
            }
            ExprKind::SizeofExpr { expr: inner } => {
                let inner_ty = self.result_type(inner);
                Operand::constant(limits::LONG_WIDTH, inner_ty.size_of(self.lookup()))
            }
        }
    }

    fn load_symbol(&mut self, symbol: SymbolId, name: &str, defining_module: &str, out: &mut Vec<IrEntry>) -> Operand {
        if let Some(access) = self.accesses.get(&symbol).cloned() {
            return access.load(self.frame_mut().temps_mut(), out);
        }
        match self.binder.symbols.get(symbol) {
            SymbolEntry::Variable { .. } => {
                let access = self.access_for(symbol, name, defining_module);
                access.load(self.frame_mut().temps_mut(), out)
            }
            SymbolEntry::FunctionGroup(overloads) => match overloads.as_slice() {
                [single] => Operand::name(mangle_function(defining_module, name, &single.arg_types)),
                _ => ice!(Span::synthetic(), "'{name}' names an overload set and cannot be used as a bare value"),
            },
            SymbolEntry::TypeDefinition(_) => ice!(Span::synthetic(), "'{name}' names a type, not a value"),
        }
    }

    fn translate_binary(&mut self, op: BinOp, lhs: &Expr, rhs: &Expr, whole: &Expr, scopes: &[TableId], out: &mut Vec<IrEntry>, extra: &mut Vec<Fragment>) -> Operand {
        let result_ty = self.result_type(whole);
        let size = result_ty.size_of(self.lookup());
        let lhs_op = self.translate_expr(lhs, scopes, out, extra);
        let rhs_op = self.translate_expr(rhs, scopes, out, extra);
        let is_float = result_ty.is_float();
        let is_unsigned = !is_signed_numeric(&result_ty);
        let ir_op = match op {
            BinOp::Add if is_float => IrOp::FpAdd,
            BinOp::Add => IrOp::Add,
            BinOp::Sub if is_float => IrOp::FpSub,
            BinOp::Sub => IrOp::Sub,
            BinOp::Mul if is_float => IrOp::FpMul,
            BinOp::Mul if is_unsigned => IrOp::Umul,
            BinOp::Mul => IrOp::Smul,
            BinOp::Div if is_float => IrOp::FpDiv,
            BinOp::Div if is_unsigned => IrOp::Udiv,
            BinOp::Div => IrOp::Sdiv,
            BinOp::Mod if is_float => ice!(whole.span, "modulo applied to a floating operand"),
            BinOp::Mod if is_unsigned => IrOp::Umod,
            BinOp::Mod => IrOp::Smod,
            BinOp::BitAnd => IrOp::And,
            BinOp::BitOr => IrOp::Or,
            BinOp::BitXor => IrOp::Xor,
            BinOp::Shl => IrOp::Sll,
            BinOp::Shr if is_unsigned => IrOp::Slr,
            BinOp::Shr => IrOp::Sar,
        };
        let dest = self.fresh(&result_ty);
        out.push(IrEntry::binop(ir_op, size, dest.clone(), lhs_op, rhs_op));
        dest
    }

    fn translate_compare(&mut self, op: CmpOp, lhs: &Expr, rhs: &Expr, scopes: &[TableId], out: &mut Vec<IrEntry>, extra: &mut Vec<Fragment>) -> Operand {
        let lhs_ty = self.result_type(lhs);
        let operand_size = lhs_ty.size_of(self.lookup());
        let is_float = lhs_ty.is_float();
        let is_unsigned = !is_signed_numeric(&lhs_ty);

        if op == CmpOp::Spaceship {
            let lt_label = self.labels.code_label();
            let gt_label = self.labels.code_label();
            let end_label = self.labels.code_label();
            let dest = self.fresh(&Type::Keyword(KeywordType::Byte));
            let lhs_op = self.translate_expr(lhs, scopes, out, extra);
            let rhs_op = self.translate_expr(rhs, scopes, out, extra);
            out.push(IrEntry::cjump(
                cmp_jump_op(CmpOp::Lt, false, is_float, is_unsigned),
                operand_size,
                Operand::name(lt_label.clone()),
                lhs_op.clone(),
                rhs_op.clone(),
            ));
            out.push(IrEntry::cjump(
                cmp_jump_op(CmpOp::Gt, false, is_float, is_unsigned),
                operand_size,
                Operand::name(gt_label.clone()),
                lhs_op,
                rhs_op,
            ));
            out.push(IrEntry::r#move(1, dest.clone(), Operand::constant(1, 0)));
            out.push(IrEntry::jump(Operand::name(end_label.clone())));
            out.push(IrEntry::label(Operand::name(lt_label)));
            out.push(IrEntry::r#move(1, dest.clone(), Operand::constant(1, 0xFF)));
            out.push(IrEntry::jump(Operand::name(end_label.clone())));
            out.push(IrEntry::label(Operand::name(gt_label)));
            out.push(IrEntry::r#move(1, dest.clone(), Operand::constant(1, 1)));
            out.push(IrEntry::label(Operand::name(end_label)));
            return dest;
        }

        let ir_op = cmp_value_op(op, is_float, is_unsigned);
        let lhs_op = self.translate_expr(lhs, scopes, out, extra);
        let rhs_op = self.translate_expr(rhs, scopes, out, extra);
        let dest = self.fresh(&Type::Keyword(KeywordType::Bool));
        out.push(IrEntry::binop(ir_op, operand_size, dest.clone(), lhs_op, rhs_op));
        dest
    }

    fn translate_short_circuit_value(&mut self, expr: &Expr, scopes: &[TableId], out: &mut Vec<IrEntry>, extra: &mut Vec<Fragment>) -> Operand {
        let false_label = self.labels.code_label();
        let end_label = self.labels.code_label();
        let dest = self.fresh(&Type::Keyword(KeywordType::Bool));
        self.translate_branch(expr, scopes, out, extra, &false_label, false);
        out.push(IrEntry::r#move(1, dest.clone(), Operand::constant(1, 1)));
        out.push(IrEntry::jump(Operand::name(end_label.clone())));
        out.push(IrEntry::label(Operand::name(false_label)));
        out.push(IrEntry::r#move(1, dest.clone(), Operand::constant(1, 0)));
        out.push(IrEntry::label(Operand::name(end_label)));
        dest
    }

    fn translate_unary(&mut self, op: UnOp, operand: &Expr, whole: &Expr, scopes: &[TableId], out: &mut Vec<IrEntry>, extra: &mut Vec<Fragment>) -> Operand {
        match op {
            UnOp::AddrOf => self.translate_lvalue_address(operand, scopes, out, extra),
            UnOp::Deref => {
                let ty = self.result_type(whole);
                let size = ty.size_of(self.lookup());
                let addr = self.translate_expr(operand, scopes, out, extra);
                let dest = self.fresh(&ty);
                out.push(IrEntry { op: IrOp::MemLoad, op_size: size, dest: Some(dest.clone()), arg1: Some(addr), arg2: None });
                dest
            }
            UnOp::LogNot => {
                let ty = self.result_type(operand);
                let size = ty.size_of(self.lookup());
                let operand_op = self.translate_expr(operand, scopes, out, extra);
                let dest = self.fresh(&Type::Keyword(KeywordType::Bool));
                out.push(IrEntry::unop(IrOp::Lnot, size, dest.clone(), operand_op));
                dest
            }
            UnOp::Neg | UnOp::BitNot => {
                let ty = self.result_type(whole);
                let size = ty.size_of(self.lookup());
                let operand_op = self.translate_expr(operand, scopes, out, extra);
                let ir_op = match op {
                    UnOp::Neg if ty.is_float() => IrOp::FpNeg,
                    UnOp::Neg => IrOp::Neg,
                    _ => IrOp::Not,
                };
                let dest = self.fresh(&ty);
                out.push(IrEntry::unop(ir_op, size, dest.clone(), operand_op));
                dest
            }
            UnOp::PreInc | UnOp::PreDec | UnOp::PostInc | UnOp::PostDec => {
                let ty = self.result_type(operand);
                let size = ty.size_of(self.lookup());
                let old = self.translate_expr(operand, scopes, out, extra);
                let is_inc = matches!(op, UnOp::PreInc | UnOp::PostInc);
                let step = if ty.is_float() {
                    Operand::constant(size, if size == 4 { (1.0f32).to_bits() as u64 } else { (1.0f64).to_bits() })
                } else if ty.is_pointer() {
                    let elem = match ty.unqualified() {
                        Type::Pointer(inner) => inner.size_of(self.lookup()),
                        _ => 1,
                    };
                    Operand::constant(size, elem)
                } else {
                    Operand::constant(size, 1)
                };
                let ir_op = match (is_inc, ty.is_float()) {
                    (true, true) => IrOp::FpAdd,
                    (true, false) => IrOp::Add,
                    (false, true) => IrOp::FpSub,
                    (false, false) => IrOp::Sub,
                };
                let new = self.fresh(&ty);
                out.push(IrEntry::binop(ir_op, size, new.clone(), old.clone(), step));
                self.store_value(operand, new.clone(), scopes, out, extra);
                if matches!(op, UnOp::PreInc | UnOp::PreDec) {
                    new
                } else {
                    old
                }
            }
        }
    }

    fn translate_assign(&mut self, op: AssignOp, target: &Expr, value: &Expr, whole: &Expr, scopes: &[TableId], out: &mut Vec<IrEntry>, extra: &mut Vec<Fragment>) -> Operand {
        let target_ty = self.result_type(target);
        let value_op = self.translate_expr(value, scopes, out, extra);
        let final_value = if op == AssignOp::Assign {
            let value_ty = self.result_type(value);
            self.convert(value_op, &value_ty, &target_ty, out)
        } else {
            let combined_ty = self.result_type(whole);
            let size = combined_ty.size_of(self.lookup());
            let is_float = combined_ty.is_float();
            let is_unsigned = !is_signed_numeric(&combined_ty);
            let current = self.translate_expr(target, scopes, out, extra);
            let ir_op = match op {
                AssignOp::Add if is_float => IrOp::FpAdd,
                AssignOp::Add => IrOp::Add,
                AssignOp::Sub if is_float => IrOp::FpSub,
                AssignOp::Sub => IrOp::Sub,
                AssignOp::Mul if is_float => IrOp::FpMul,
                AssignOp::Mul if is_unsigned => IrOp::Umul,
                AssignOp::Mul => IrOp::Smul,
                AssignOp::Div if is_float => IrOp::FpDiv,
                AssignOp::Div if is_unsigned => IrOp::Udiv,
                AssignOp::Div => IrOp::Sdiv,
                AssignOp::Mod if is_unsigned => IrOp::Umod,
                AssignOp::Mod => IrOp::Smod,
                AssignOp::BitAnd => IrOp::And,
                AssignOp::BitOr => IrOp::Or,
                AssignOp::BitXor => IrOp::Xor,
                AssignOp::Shl => IrOp::Sll,
                AssignOp::Shr if is_unsigned => IrOp::Slr,
                AssignOp::Shr => IrOp::Sar,
                AssignOp::Assign => unreachable!("handled above"),
            };
            let dest = self.fresh(&combined_ty);
            out.push(IrEntry::binop(ir_op, size, dest.clone(), current, value_op));
            self.convert(dest, &combined_ty, &target_ty, out)
        };
        self.store_value(target, final_value.clone(), scopes, out, extra);
        final_value
    }

    fn translate_assign_logical(&mut self, is_and: bool, target: &Expr, value: &Expr, scopes: &[TableId], out: &mut Vec<IrEntry>, extra: &mut Vec<Fragment>) -> Operand {
        let false_label = self.labels.code_label();
        let end_label = self.labels.code_label();
        let dest = self.fresh(&Type::Keyword(KeywordType::Bool));
        if is_and {
            self.translate_branch(target, scopes, out, extra, &false_label, false);
            self.translate_branch(value, scopes, out, extra, &false_label, false);
        } else {
            self.translate_branch(target, scopes, out, extra, &false_label, false);
            let true_label = self.labels.code_label();
            out.push(IrEntry::jump(Operand::name(true_label.clone())));
            out.push(IrEntry::label(Operand::name(false_label.clone())));
            self.translate_branch(value, scopes, out, extra, &false_label, false);
            out.push(IrEntry::label(Operand::name(true_label)));
        }
        out.push(IrEntry::r#move(1, dest.clone(), Operand::constant(1, 1)));
        out.push(IrEntry::jump(Operand::name(end_label.clone())));
        out.push(IrEntry::label(Operand::name(false_label)));
        out.push(IrEntry::r#move(1, dest.clone(), Operand::constant(1, 0)));
        out.push(IrEntry::label(Operand::name(end_label)));
        self.store_value(target, dest.clone(), scopes, out, extra);
        dest
    }

    fn translate_ternary(&mut self, cond: &Expr, then_branch: &Expr, else_branch: &Expr, whole: &Expr, scopes: &[TableId], out: &mut Vec<IrEntry>, extra: &mut Vec<Fragment>) -> Operand {
        let result_ty = self.result_type(whole);
        let size = result_ty.size_of(self.lookup());
        let dest = self.fresh(&result_ty);
        let else_label = self.labels.code_label();
        let end_label = self.labels.code_label();
        self.translate_branch(cond, scopes, out, extra, &else_label, false);
        let then_ty = self.result_type(then_branch);
        let then_op = self.translate_expr(then_branch, scopes, out, extra);
        let then_converted = self.convert(then_op, &then_ty, &result_ty, out);
        out.push(IrEntry::r#move(size, dest.clone(), then_converted));
        out.push(IrEntry::jump(Operand::name(end_label.clone())));
        out.push(IrEntry::label(Operand::name(else_label)));
        let else_ty = self.result_type(else_branch);
        let else_op = self.translate_expr(else_branch, scopes, out, extra);
        let else_converted = self.convert(else_op, &else_ty, &result_ty, out);
        out.push(IrEntry::r#move(size, dest.clone(), else_converted));
        out.push(IrEntry::label(Operand::name(end_label)));
        dest
    }

    fn translate_call(&mut self, callee: &Expr, args: &[Expr], whole: &Expr, scopes: &[TableId], out: &mut Vec<IrEntry>, extra: &mut Vec<Fragment>) -> Operand {
        let arg_ops: Vec<(Operand, Type)> = args
            .iter()
            .map(|a| {
                let ty = self.result_type(a);
                let op = self.translate_expr(a, scopes, out, extra);
                (op, ty)
            })
            .collect();
        let arg_types: Vec<Type> = arg_ops.iter().map(|(_, ty)| ty.clone()).collect();

        let symbol = match &callee.kind {
            ExprKind::Identifier(ident) => ident.resolved.get(),
            ExprKind::ScopedIdentifier(scoped) => scoped.last().resolved.get(),
            _ => None,
        };
        let defining_module = match &callee.kind {
            ExprKind::ScopedIdentifier(scoped) if scoped.segments.len() > 1 => scoped.segments[..scoped.segments.len() - 1]
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>()
                .join("."),
            _ => self.module_name.clone(),
        };
        let callee_name = match &callee.kind {
            ExprKind::Identifier(ident) => Some(ident.name.as_str()),
            ExprKind::ScopedIdentifier(scoped) => Some(scoped.last().name.as_str()),
            _ => None,
        };

        let group = symbol.and_then(|s| self.binder.symbols.get(s).as_function_group().map(<[Overload]>::to_vec));
        let callee_operand = match (group, callee_name) {
            (Some(overloads), Some(name)) => {
                let selected = select_overload(&overloads, &arg_types)
                    .unwrap_or_else(|| ice!(whole.span, "no overload of '{name}' matches this call's argument types"));
                Operand::name(mangle_function(&defining_module, name, &selected.arg_types))
            }
            _ => self.translate_expr(callee, scopes, out, extra),
        };

        for (op, ty) in &arg_ops {
            let size = ty.size_of(self.lookup());
            let hint = ty.kind_of(self.lookup());
            let slot = self.frame_mut().fresh_temp(size, hint);
            out.push(IrEntry::r#move(size, slot, op.clone()));
        }
        out.push(IrEntry::call(callee_operand));

        let ret_ty = self.result_type(whole);
        if matches!(ret_ty.as_keyword(), Some(KeywordType::Void)) {
            Operand::constant(0, 0)
        } else {
            let size = ret_ty.size_of(self.lookup());
            let hint = ret_ty.kind_of(self.lookup());
            let dest = self.frame_mut().fresh_temp(size, hint);
            out.push(IrEntry::r#move(size, dest.clone(), Operand::Reg { n: 0 }));
            dest
        }
    }

    // -- Assignable locations -----------------------------------------------

    fn store_value(&mut self, target: &Expr, value: Operand, scopes: &[TableId], out: &mut Vec<IrEntry>, extra: &mut Vec<Fragment>) {
        match &target.kind {
            ExprKind::Identifier(ident) => {
                let symbol = ident.resolved.get().unwrap_or_else(|| ice!(ident.span, "assignment target unresolved"));
                let access = self.access_for(symbol, &ident.name, &self.module_name.clone());
                access.store(out, value);
            }
            ExprKind::ScopedIdentifier(scoped) => {
                let last = scoped.last();
                let symbol = last.resolved.get().unwrap_or_else(|| ice!(scoped.span, "assignment target unresolved"));
                let defining_module = if scoped.segments.len() > 1 {
                    scoped.segments[..scoped.segments.len() - 1]
                        .iter()
                        .map(|s| s.name.as_str())
                        .collect::<Vec<_>>()
                        .join(".")
                } else {
                    self.module_name.clone()
                };
                let access = self.access_for(symbol, &last.name, &defining_module);
                access.store(out, value);
            }
            _ => {
                let ty = self.result_type(target);
                let size = ty.size_of(self.lookup());
                let addr = self.translate_lvalue_address(target, scopes, out, extra);
                out.push(IrEntry { op: IrOp::MemStore, op_size: size, dest: Some(addr), arg1: Some(value), arg2: None });
            }
        }
    }

    fn translate_lvalue_address(&mut self, expr: &Expr, scopes: &[TableId], out: &mut Vec<IrEntry>, extra: &mut Vec<Fragment>) -> Operand {
        match &expr.kind {
            ExprKind::Identifier(ident) => {
                let symbol = ident.resolved.get().unwrap_or_else(|| ice!(ident.span, "address-of target unresolved"));
                self.access_address(symbol, &ident.name, &self.module_name.clone())
            }
            ExprKind::ScopedIdentifier(scoped) => {
                let last = scoped.last();
                let symbol = last.resolved.get().unwrap_or_else(|| ice!(scoped.span, "address-of target unresolved"));
                let defining_module = if scoped.segments.len() > 1 {
                    scoped.segments[..scoped.segments.len() - 1]
                        .iter()
                        .map(|s| s.name.as_str())
                        .collect::<Vec<_>>()
                        .join(".")
                } else {
                    self.module_name.clone()
                };
                self.access_address(symbol, &last.name, &defining_module)
            }
            ExprKind::Unary { op: UnOp::Deref, operand } => self.translate_expr(operand, scopes, out, extra),
            ExprKind::Member { base, field, arrow } => {
                let base_addr = if *arrow {
                    self.translate_expr(base, scopes, out, extra)
                } else {
                    self.translate_lvalue_address(base, scopes, out, extra)
                };
                let struct_ty = if *arrow {
                    match self.result_type(base).unqualified() {
                        Type::Pointer(inner) => (*inner).clone(),
                        other => other.clone(),
                    }
                } else {
                    self.result_type(base)
                };
                let offset = self.field_offset(&struct_ty, &field.name);
                if offset == 0 {
                    base_addr
                } else {
                    let ptr_width = limits::POINTER_WIDTH;
                    let dest = self.frame_mut().fresh_temp(ptr_width, TypeKind::GeneralPurpose);
                    out.push(IrEntry::binop(IrOp::Add, ptr_width, dest.clone(), base_addr, Operand::constant(ptr_width, offset)));
                    dest
                }
            }
            ExprKind::Index { base, index } => {
                let base_ty = self.result_type(base);
                let ptr_width = limits::POINTER_WIDTH;
                let base_addr = match base_ty.unqualified() {
                    Type::Array { .. } => self.translate_lvalue_address(base, scopes, out, extra),
                    _ => self.translate_expr(base, scopes, out, extra),
                };
                let element_ty = match base_ty.unqualified() {
                    Type::Array { element, .. } => (**element).clone(),
                    Type::Pointer(inner) => (**inner).clone(),
                    other => other.clone(),
                };
                let elem_size = element_ty.size_of(self.lookup());
                let index_op = self.translate_expr(index, scopes, out, extra);
                let scaled = self.frame_mut().fresh_temp(ptr_width, TypeKind::GeneralPurpose);
                out.push(IrEntry::binop(IrOp::Smul, ptr_width, scaled.clone(), index_op, Operand::constant(ptr_width, elem_size)));
                let dest = self.frame_mut().fresh_temp(ptr_width, TypeKind::GeneralPurpose);
                out.push(IrEntry::binop(IrOp::Add, ptr_width, dest.clone(), base_addr, scaled));
                dest
            }
            _ => ice!(expr.span, "expression is not an assignable location"),
        }
    }

    fn access_address(&mut self, symbol: SymbolId, name: &str, defining_module: &str) -> Operand {
        let access = self.access_for(symbol, name, defining_module);
        if let Some(label) = access.label() {
            return Operand::name(label.to_string());
        }
        ice!(Span::synthetic(), "'{name}' has no stable address (its frame slot does not escape)")
    }

    fn field_offset(&self, struct_ty: &Type, field_name: &str) -> u64 {
        let lookup = self.lookup();
        match struct_ty.unqualified() {
            Type::Reference { symbol, .. } => match self.binder.symbols.get(*symbol).as_type_definition() {
                Some(TypeDefKind::Struct { fields, .. }) => {
                    let mut total = 0u64;
                    for field in fields {
                        let align = field.ty.align_of(lookup).max(1);
                        total = total.div_ceil(align) * align;
                        if field.name == field_name {
                            return total;
                        }
                        total += field.ty.size_of(lookup);
                    }
                    ice!(Span::synthetic(), "no field named '{field_name}' on this struct")
                }
                Some(TypeDefKind::Union { .. }) => 0,
                _ => ice!(Span::synthetic(), "member access on a non-aggregate type"),
            },
            _ => ice!(Span::synthetic(), "member access on a non-aggregate type"),
        }
    }

    fn convert(&mut self, operand: Operand, from: &Type, to: &Type, out: &mut Vec<IrEntry>) -> Operand {
        if from.equal(to) {
            return operand;
        }
        let lookup = self.lookup();
        match conversion_op(from, to, lookup) {
            Some(op) => {
                let size = to.size_of(lookup);
                let hint = to.kind_of(lookup);
                let dest = self.frame_mut().fresh_temp(size, hint);
                out.push(IrEntry::unop(op, size, dest.clone(), operand));
                dest
            }
            None => operand,
        }
    }
}
