//! The two-pass name/scope resolver (spec.md §4.2).

use crate::arena::{SymbolArena, SymbolTable, TableArena};
use crate::entry::{Member, Overload, SymbolEntry, TypeDefKind};
use rustc_hash::FxHashMap;
use tlc_common::{DiagnosticBag, Span, SymbolId, TableId};
use tlc_parser::ast::{self, TypeExpr};
use tlc_types::Type;

/// Binds one program (a set of files reachable from each other through
/// `import`) to a shared symbol arena. Files must be bound in an order
/// where each file's imports have already completed Pass A (a simple
/// dependency-order walk; cyclic imports are legal in the language but the
/// driver is expected to run Pass A for *every* file before any file's
/// Pass B, per spec.md §4.2's "Pass A for all files, then Pass B for all
/// files").
#[derive(Default)]
pub struct Binder {
    pub symbols: SymbolArena,
    pub tables: TableArena,
    modules: FxHashMap<String, TableId>,
}

/// What Pass A produced for one file; threaded into that file's Pass B.
pub struct FileScope {
    pub top_level: TableId,
}

impl Binder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn module_table(&self, dotted: &str) -> Option<TableId> {
        self.modules.get(dotted).copied()
    }

    /// Pass A (spec.md §4.2): populate `file`'s top-level table. Forward
    /// references to not-yet-declared aggregates in the same file get an
    /// incomplete placeholder entry now, completed in place when their real
    /// declaration is visited (same pass, since `Bodies` is walked in
    /// source order and a placeholder may be created for a later name).
    pub fn pass_a(&mut self, file: &ast::File, diags: &mut DiagnosticBag) -> FileScope {
        let top_level = self.tables.alloc(SymbolTable::with_parent(None));
        self.modules.insert(file.module.as_dotted(), top_level);

        for decl in &file.bodies {
            self.bind_top_decl(decl, top_level, diags);
        }
        FileScope { top_level }
    }

    fn bind_top_decl(&mut self, decl: &ast::TopDecl, scope: TableId, diags: &mut DiagnosticBag) {
        use ast::TopDeclKind::*;
        match &decl.kind {
            FunctionDef { return_type, name, params, .. } | FunctionDecl { return_type, name, params } => {
                let has_body = matches!(decl.kind, FunctionDef { .. });
                let ret = self.resolve_type_expr(return_type, scope, diags);
                let arg_types: Vec<Type> = params.iter().map(|p| self.resolve_type_expr(&p.ty, scope, diags)).collect();
                self.bind_overload(name, ret, arg_types, has_body, scope, diags);
            }
            VarDef { ty, names, .. } => {
                let resolved = self.resolve_type_expr(ty, scope, diags);
                for name in names {
                    self.declare(name, scope, SymbolEntry::Variable { ty: resolved.clone(), escapes: false }, diags);
                }
            }
            Opaque { name } => {
                self.declare(name, scope, SymbolEntry::TypeDefinition(TypeDefKind::Opaque), diags);
            }
            StructDecl { name, fields, brace_span } => {
                if fields.is_empty() {
                    diags.error(*brace_span, "struct declaration must have at least one field");
                }
                let members = self.resolve_members(fields, scope, diags);
                self.complete_aggregate(name, scope, TypeDefKind::Struct { incomplete: false, fields: members }, diags);
            }
            UnionDecl { name, options, brace_span } => {
                if options.is_empty() {
                    diags.error(*brace_span, "union declaration must have at least one field");
                }
                let members = self.resolve_members(options, scope, diags);
                self.complete_aggregate(name, scope, TypeDefKind::Union { incomplete: false, options: members }, diags);
            }
            EnumDecl { name, constants } => {
                let (names, values) = self.resolve_enum_constants(constants, diags);
                self.complete_aggregate(
                    name,
                    scope,
                    TypeDefKind::Enum {
                        incomplete: false,
                        constant_names: names,
                        constant_values: values,
                    },
                    diags,
                );
            }
            TypedefDecl { target, name } => {
                let resolved = self.resolve_type_expr(target, scope, diags);
                self.declare(name, scope, SymbolEntry::TypeDefinition(TypeDefKind::Typedef { target: resolved }), diags);
            }
        }
    }

    fn resolve_members(&mut self, fields: &[ast::FieldDecl], scope: TableId, diags: &mut DiagnosticBag) -> Vec<Member> {
        fields
            .iter()
            .map(|f| Member {
                name: f.name.name.clone(),
                ty: self.resolve_type_expr(&f.ty, scope, diags),
            })
            .collect()
    }

    /// `prev + 1` when an initializer is omitted (0 for the first
    /// constant); explicit initializers are constant integer literals,
    /// already enforced by the parser, so no later-constant forward
    /// reference is even syntactically expressible (spec.md's Open
    /// Questions, resolved in SPEC_FULL.md).
    fn resolve_enum_constants(&mut self, constants: &[ast::EnumConstant], _diags: &mut DiagnosticBag) -> (Vec<String>, Vec<i64>) {
        let mut names = Vec::with_capacity(constants.len());
        let mut values = Vec::with_capacity(constants.len());
        let mut next = 0i64;
        for constant in constants {
            let value = constant.initializer.unwrap_or(next);
            names.push(constant.name.name.clone());
            values.push(value);
            next = value + 1;
        }
        (names, values)
    }

    fn declare(&mut self, name: &ast::Identifier, scope: TableId, entry: SymbolEntry, diags: &mut DiagnosticBag) {
        if self.tables.get(scope).get(&name.name).is_some() {
            diags.error(name.span, format!("'{}' is already defined in this scope", name.name));
            return;
        }
        let id = self.symbols.alloc(entry);
        self.tables.get_mut(scope).insert(name.name.clone(), id);
    }

    fn bind_overload(&mut self, name: &ast::Identifier, return_type: Type, arg_types: Vec<Type>, has_body: bool, scope: TableId, diags: &mut DiagnosticBag) {
        let overload = Overload { return_type, arg_types, has_body };
        match self.tables.get(scope).get(&name.name) {
            Some(existing) => match self.symbols.get_mut(existing) {
                SymbolEntry::FunctionGroup(overloads) => {
                    if overloads.iter().any(|o| o.arg_types == overload.arg_types) {
                        diags.error(name.span, format!("duplicate overload of '{}' with this argument list", name.name));
                    } else {
                        overloads.push(overload);
                    }
                }
                _ => diags.error(name.span, format!("'{}' is already defined as something other than a function", name.name)),
            },
            None => {
                let id = self.symbols.alloc(SymbolEntry::FunctionGroup(vec![overload]));
                self.tables.get_mut(scope).insert(name.name.clone(), id);
            }
        }
    }

    /// Completes a forward-declared (or freshly declares a new) aggregate
    /// in place, preserving the `SymbolId` so earlier `Reference` types
    /// that pointed at the placeholder remain valid (spec.md §4.2 Pass A).
    fn complete_aggregate(&mut self, name: &ast::Identifier, scope: TableId, finished: TypeDefKind, diags: &mut DiagnosticBag) {
        match self.tables.get(scope).get(&name.name) {
            Some(existing) => match self.symbols.get(existing) {
                SymbolEntry::TypeDefinition(kind) if kind.is_incomplete() => {
                    *self.symbols.get_mut(existing) = SymbolEntry::TypeDefinition(finished);
                }
                _ => diags.error(name.span, format!("'{}' is already defined", name.name)),
            },
            None => {
                let id = self.symbols.alloc(SymbolEntry::TypeDefinition(finished));
                self.tables.get_mut(scope).insert(name.name.clone(), id);
            }
        }
    }

    fn get_or_create_placeholder(&mut self, name: &str, scope: TableId) -> SymbolId {
        if let Some(id) = self.lookup_in_scope_chain(scope, name) {
            return id;
        }
        let id = self.symbols.alloc(SymbolEntry::TypeDefinition(TypeDefKind::Struct {
            incomplete: true,
            fields: Vec::new(),
        }));
        self.tables.get_mut(scope).insert(name.to_string(), id);
        id
    }

    fn lookup_in_scope_chain(&self, scope: TableId, name: &str) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let table = self.tables.get(id);
            if let Some(found) = table.get(name) {
                return Some(found);
            }
            current = table.parent;
        }
        None
    }

    /// Resolves a syntactic [`TypeExpr`] to a semantic [`Type`]. Single
    /// segment `Named` references are resolved (or forward-placeholdered)
    /// against `scope`'s chain; multi-segment references select a module
    /// from already-bound files.
    pub fn resolve_type_expr(&mut self, ty: &TypeExpr, scope: TableId, diags: &mut DiagnosticBag) -> Type {
        match ty {
            TypeExpr::Keyword { kind, .. } => Type::Keyword(*kind),
            TypeExpr::Qualified { base, is_const, is_volatile, .. } => {
                Type::qualified(self.resolve_type_expr(base, scope, diags), *is_const, *is_volatile)
            }
            TypeExpr::Pointer { base, .. } => Type::pointer(self.resolve_type_expr(base, scope, diags)),
            TypeExpr::Array { length, element, .. } => Type::Array {
                length: *length,
                element: Box::new(self.resolve_type_expr(element, scope, diags)),
            },
            TypeExpr::FunPtr { return_type, arg_types, .. } => Type::FunPtr {
                return_type: Box::new(self.resolve_type_expr(return_type, scope, diags)),
                arg_types: arg_types.iter().map(|a| self.resolve_type_expr(a, scope, diags)).collect(),
            },
            TypeExpr::Named(scoped) => self.resolve_named_type(scoped, scope, diags),
        }
    }

    fn resolve_named_type(&mut self, scoped: &ast::ScopedId, scope: TableId, diags: &mut DiagnosticBag) -> Type {
        if scoped.segments.len() == 1 {
            let name = &scoped.segments[0].name;
            let symbol = self.get_or_create_placeholder(name, scope);
            return Type::Reference { symbol, name: name.clone() };
        }
        let module_name = scoped.segments[..scoped.segments.len() - 1]
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(".");
        let last = scoped.last();
        match self.module_table(&module_name) {
            Some(table) => match self.tables.get(table).get(&last.name) {
                Some(symbol) => Type::Reference { symbol, name: last.name.clone() },
                None => {
                    diags.error(scoped.span, format!("module '{module_name}' has no member '{}'", last.name));
                    Type::Reference { symbol: self.get_or_create_placeholder(&last.name, scope), name: last.name.clone() }
                }
            },
            None => {
                diags.error(scoped.span, format!("unknown module '{module_name}' in scoped name"));
                Type::Reference { symbol: self.get_or_create_placeholder(&last.name, scope), name: last.name.clone() }
            }
        }
    }
}

/// One identifier occurrence's resolution context: the chain of enclosing
/// lexical scopes, innermost first, plus the current module and its
/// imports (spec.md §4.2's identifier resolution order).
pub struct LookupContext<'a> {
    pub scopes: &'a [TableId],
    pub module: TableId,
    pub imports: &'a [TableId],
}

#[derive(Debug)]
pub enum ResolveError {
    Undefined,
    Ambiguous(Vec<String>),
}

impl Binder {
    /// Identifier resolution order (spec.md §4.2): innermost lexical scope
    /// outward, then the current module, then the union of imported
    /// modules (ambiguous if more than one import provides a match).
    pub fn resolve_identifier(&self, name: &str, ctx: &LookupContext<'_>, span: Span, diags: &mut DiagnosticBag) -> Option<SymbolId> {
        for &scope in ctx.scopes {
            if let Some(id) = self.lookup_in_scope_chain(scope, name) {
                return Some(id);
            }
        }
        if let Some(id) = self.tables.get(ctx.module).get(name) {
            return Some(id);
        }
        let mut candidates = Vec::new();
        for &import in ctx.imports {
            if let Some(id) = self.tables.get(import).get(name) {
                candidates.push(id);
            }
        }
        match candidates.len() {
            0 => {
                diags.error(span, format!("undefined identifier '{name}'"));
                None
            }
            1 => Some(candidates[0]),
            _ => {
                diags.error(span, format!("'{name}' is ambiguous across {} imported modules", candidates.len()));
                None
            }
        }
    }
}
