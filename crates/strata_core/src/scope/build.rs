//! Pass 1: scope construction.
//!
//! One top-down traversal over the syntax tree that
//!
//! 1. creates a scope at every scope-introducing construct (the tree root,
//!    standalone blocks, function-likes, class-likes, loop heads, catch
//!    bodies),
//! 2. registers every binding in the scope it ultimately belongs to —
//!    function-scoped declarations hoist to the nearest enclosing function
//!    boundary, lexical ones stay put — and
//! 3. records, for every single node, the scope that encloses it.
//!
//! The traversal is an exhaustive match over the node kinds, so a node kind
//! added to [`crate::ast`] without a handler fails to compile instead of
//! being silently mis-scoped.  Each node is mapped to the scope current at
//! the moment it is visited; a scope-introducing node is mapped *before*
//! its scope is pushed, so it belongs to its containing scope while its
//! contents belong to the new one.
//!
//! No references are recorded here — that is pass 2 (`resolve`), which runs
//! only after this pass has seen the whole tree, so textual order never
//! affects resolution.

use std::collections::HashMap;

use crate::ast::*;
use crate::error::StrataResult;
use crate::scope::tree::{Mutability, ScopeId, ScopeKind, ScopeTree, SELF_REFERENCE_NAME};

/// The pass-1 traversal state.
///
/// The node→scope map is owned by one construction call and handed to the
/// caller when the pass finishes; there is no shared or global registry.
pub struct ScopeBuilder {
    tree: ScopeTree,
    node_scopes: HashMap<NodeId, ScopeId>,
    /// Stack of active scope ids (back = innermost).
    scope_stack: Vec<ScopeId>,
}

impl ScopeBuilder {
    /// Run pass 1 over `module`, producing the scope tree and the total
    /// node→scope mapping.
    pub fn build(module: &Module) -> StrataResult<(ScopeTree, HashMap<NodeId, ScopeId>)> {
        let tree = ScopeTree::new(module.id);
        let root = tree.root();
        let mut builder = Self {
            tree,
            node_scopes: HashMap::new(),
            scope_stack: vec![root],
        };
        builder.record(module.id);
        builder.visit_stmts(&module.body)?;
        Ok((builder.tree, builder.node_scopes))
    }

    // ── Scope management ─────────────────────────────────────────────────────

    fn current(&self) -> ScopeId {
        *self
            .scope_stack
            .last()
            .expect("scope stack is never empty during construction")
    }

    fn push_scope(&mut self, kind: ScopeKind, node: NodeId) -> ScopeId {
        let id = self.tree.new_child_scope(self.current(), kind, node);
        self.scope_stack.push(id);
        id
    }

    fn pop_scope(&mut self) {
        self.scope_stack.pop();
    }

    /// Map `node` to the current scope.
    fn record(&mut self, node: NodeId) {
        self.node_scopes.insert(node, self.current());
    }

    // ── Statements ───────────────────────────────────────────────────────────

    fn visit_stmts(&mut self, stmts: &[Stmt]) -> StrataResult<()> {
        for stmt in stmts {
            self.visit_stmt(stmt)?;
        }
        Ok(())
    }

    fn visit_stmt(&mut self, stmt: &Stmt) -> StrataResult<()> {
        match stmt {
            Stmt::Block(b) => self.visit_block(b),
            Stmt::VarDecl(v) => self.visit_var_decl(v),
            Stmt::FnDecl(f) => self.visit_func(f),
            Stmt::ClassDecl(c) => self.visit_class(c),
            Stmt::Expr(s) => {
                self.record(s.id);
                self.visit_expr(&s.expr)
            }
            Stmt::If(s) => {
                self.record(s.id);
                self.visit_expr(&s.test)?;
                self.visit_stmt(&s.consequent)?;
                if let Some(alt) = &s.alternate {
                    self.visit_stmt(alt)?;
                }
                Ok(())
            }
            Stmt::For(s) => {
                self.record(s.id);
                self.push_scope(ScopeKind::Lexical, s.id);
                match &s.init {
                    Some(ForInit::VarDecl(v)) => self.visit_var_decl(v)?,
                    Some(ForInit::Expr(e)) => self.visit_expr(e)?,
                    None => {}
                }
                if let Some(test) = &s.test {
                    self.visit_expr(test)?;
                }
                if let Some(update) = &s.update {
                    self.visit_expr(update)?;
                }
                self.visit_loop_body(&s.body)?;
                self.pop_scope();
                Ok(())
            }
            Stmt::ForIn(s) => {
                self.record(s.id);
                // The enumerated object is visited in the containing scope:
                // the loop binding is not visible from it.
                self.visit_expr(&s.right)?;
                self.push_scope(ScopeKind::Lexical, s.id);
                self.visit_for_head(&s.left)?;
                self.visit_loop_body(&s.body)?;
                self.pop_scope();
                Ok(())
            }
            Stmt::ForOf(s) => {
                self.record(s.id);
                self.visit_expr(&s.right)?;
                self.push_scope(ScopeKind::Lexical, s.id);
                self.visit_for_head(&s.left)?;
                self.visit_loop_body(&s.body)?;
                self.pop_scope();
                Ok(())
            }
            Stmt::While(s) => {
                self.record(s.id);
                self.visit_expr(&s.test)?;
                self.visit_stmt(&s.body)
            }
            Stmt::DoWhile(s) => {
                self.record(s.id);
                self.visit_stmt(&s.body)?;
                self.visit_expr(&s.test)
            }
            Stmt::Switch(s) => {
                self.record(s.id);
                self.visit_expr(&s.discriminant)?;
                for case in &s.cases {
                    self.record(case.id);
                    if let Some(test) = &case.test {
                        self.visit_expr(test)?;
                    }
                    self.visit_stmts(&case.body)?;
                }
                Ok(())
            }
            Stmt::Try(s) => {
                self.record(s.id);
                self.visit_block(&s.block)?;
                if let Some(handler) = &s.handler {
                    self.visit_catch_clause(handler)?;
                }
                if let Some(fin) = &s.finalizer {
                    self.visit_block(fin)?;
                }
                Ok(())
            }
            Stmt::Return(s) => {
                self.record(s.id);
                match &s.argument {
                    Some(arg) => self.visit_expr(arg),
                    None => Ok(()),
                }
            }
            Stmt::Throw(s) => {
                self.record(s.id);
                self.visit_expr(&s.argument)
            }
            Stmt::Break(s) => {
                self.record(s.id);
                Ok(())
            }
            Stmt::Continue(s) => {
                self.record(s.id);
                Ok(())
            }
            Stmt::Import(s) => self.visit_import(s),
            Stmt::Empty(s) => {
                self.record(s.id);
                Ok(())
            }
        }
    }

    /// A standalone `{ … }` block: a fresh lexical scope of its own.
    fn visit_block(&mut self, block: &BlockStmt) -> StrataResult<()> {
        self.record(block.id);
        self.push_scope(ScopeKind::Lexical, block.id);
        self.visit_stmts(&block.body)?;
        self.pop_scope();
        Ok(())
    }

    /// A loop body reuses the loop-head scope directly: a block gets no
    /// extra scope layer, any other statement is visited in place.
    fn visit_loop_body(&mut self, body: &Stmt) -> StrataResult<()> {
        if let Stmt::Block(b) = body {
            self.record(b.id);
            self.visit_stmts(&b.body)
        } else {
            self.visit_stmt(body)
        }
    }

    fn visit_for_head(&mut self, head: &ForHead) -> StrataResult<()> {
        match head {
            ForHead::VarDecl(v) => self.visit_var_decl(v),
            // A bare target re-binds an existing name; nothing to declare.
            ForHead::Pat(p) => self.visit_target_pat(p),
        }
    }

    /// The catch body is the scope: a lexical scope for the block, with the
    /// catch parameter's leaf identifiers bound Mutable/Lexical inside it.
    fn visit_catch_clause(&mut self, clause: &CatchClause) -> StrataResult<()> {
        self.record(clause.id);
        self.record(clause.body.id);
        self.push_scope(ScopeKind::Lexical, clause.body.id);
        if let Some(param) = &clause.param {
            self.bind_pat(param, ScopeKind::Lexical, Mutability::Mutable)?;
        }
        self.visit_stmts(&clause.body.body)?;
        self.pop_scope();
        Ok(())
    }

    // ── Declarations ─────────────────────────────────────────────────────────

    fn visit_var_decl(&mut self, decl: &VarDecl) -> StrataResult<()> {
        self.record(decl.id);
        let kind = if decl.kind.is_block_scoped() {
            ScopeKind::Lexical
        } else {
            ScopeKind::Function
        };
        let mutability = if decl.kind.is_immutable() {
            Mutability::Immutable
        } else {
            Mutability::Mutable
        };
        for declarator in &decl.declarators {
            self.record(declarator.id);
            self.bind_pat(&declarator.name, kind, mutability)?;
            if let Some(ty) = &declarator.ty {
                self.record(ty.id);
            }
            if let Some(init) = &declarator.init {
                self.visit_expr(init)?;
            }
        }
        Ok(())
    }

    /// Expand a binding pattern to one binding per leaf identifier, all
    /// sharing `kind` and `mutability`.  Property keys select, they do not
    /// bind; defaults are ordinary expressions.
    fn bind_pat(&mut self, pat: &Pat, kind: ScopeKind, mutability: Mutability) -> StrataResult<()> {
        match pat {
            Pat::Ident(ident) => {
                self.record(ident.id);
                self.tree
                    .add_binding(self.current(), &ident.name, ident.id, kind, mutability)?;
                Ok(())
            }
            Pat::Array(a) => {
                self.record(a.id);
                for element in a.elements.iter().flatten() {
                    self.bind_pat(element, kind, mutability)?;
                }
                Ok(())
            }
            Pat::Object(o) => {
                self.record(o.id);
                for prop in &o.props {
                    match prop {
                        ObjectPatProp::KeyValue(kv) => {
                            self.record(kv.id);
                            self.visit_prop_key(&kv.key)?;
                            self.bind_pat(&kv.value, kind, mutability)?;
                        }
                        ObjectPatProp::Shorthand(sh) => {
                            self.record(sh.id);
                            self.record(sh.name.id);
                            self.tree.add_binding(
                                self.current(),
                                &sh.name.name,
                                sh.name.id,
                                kind,
                                mutability,
                            )?;
                            if let Some(default) = &sh.default {
                                self.visit_expr(default)?;
                            }
                        }
                        ObjectPatProp::Rest(r) => {
                            self.record(r.id);
                            self.bind_pat(&r.pat, kind, mutability)?;
                        }
                    }
                }
                Ok(())
            }
            Pat::Rest(r) => {
                self.record(r.id);
                self.bind_pat(&r.pat, kind, mutability)
            }
            Pat::Assign(a) => {
                self.record(a.id);
                self.bind_pat(&a.pat, kind, mutability)?;
                self.visit_expr(&a.default)
            }
        }
    }

    /// Map a pattern used as an assignment target (no bindings introduced).
    fn visit_target_pat(&mut self, pat: &Pat) -> StrataResult<()> {
        match pat {
            Pat::Ident(ident) => {
                self.record(ident.id);
                Ok(())
            }
            Pat::Array(a) => {
                self.record(a.id);
                for element in a.elements.iter().flatten() {
                    self.visit_target_pat(element)?;
                }
                Ok(())
            }
            Pat::Object(o) => {
                self.record(o.id);
                for prop in &o.props {
                    match prop {
                        ObjectPatProp::KeyValue(kv) => {
                            self.record(kv.id);
                            self.visit_prop_key(&kv.key)?;
                            self.visit_target_pat(&kv.value)?;
                        }
                        ObjectPatProp::Shorthand(sh) => {
                            self.record(sh.id);
                            self.record(sh.name.id);
                            if let Some(default) = &sh.default {
                                self.visit_expr(default)?;
                            }
                        }
                        ObjectPatProp::Rest(r) => {
                            self.record(r.id);
                            self.visit_target_pat(&r.pat)?;
                        }
                    }
                }
                Ok(())
            }
            Pat::Rest(r) => {
                self.record(r.id);
                self.visit_target_pat(&r.pat)
            }
            Pat::Assign(a) => {
                self.record(a.id);
                self.visit_target_pat(&a.pat)?;
                self.visit_expr(&a.default)
            }
        }
    }

    /// A function-like node: declaration, expression, or arrow.
    ///
    /// The name (if any) binds Immutable/Lexical in the *containing* scope
    /// — note the asymmetry with class names, which bind Function-kind; the
    /// distinction is deliberate and covered by tests.  Parameters bind
    /// Mutable/Function in the new scope.  A block body reuses the new
    /// scope directly.
    fn visit_func(&mut self, func: &Func) -> StrataResult<()> {
        self.record(func.id);
        if let Some(name) = &func.name {
            self.record(name.id);
            self.tree.add_binding(
                self.current(),
                &name.name,
                name.id,
                ScopeKind::Lexical,
                Mutability::Immutable,
            )?;
        }
        self.push_scope(ScopeKind::Function, func.id);
        for param in &func.params {
            self.record(param.id);
            self.bind_pat(&param.pat, ScopeKind::Function, Mutability::Mutable)?;
            if let Some(ty) = &param.ty {
                self.record(ty.id);
            }
            if let Some(default) = &param.default {
                self.visit_expr(default)?;
            }
        }
        if let Some(return_ty) = &func.return_ty {
            self.record(return_ty.id);
        }
        match &func.body {
            FnBody::Block(b) => {
                self.record(b.id);
                self.visit_stmts(&b.body)?;
            }
            FnBody::Expr(e) => self.visit_expr(e)?,
        }
        self.pop_scope();
        Ok(())
    }

    /// A class-like node: declaration or expression.
    ///
    /// The name (if any) binds Immutable/Function in the containing scope.
    /// The body scope is Function-kind and carries the implicit
    /// self-reference binding under [`SELF_REFERENCE_NAME`]; methods are
    /// ordinary function-likes nested inside it, so their `this` resolves
    /// by plain upward lookup.
    fn visit_class(&mut self, class: &Class) -> StrataResult<()> {
        self.record(class.id);
        if let Some(name) = &class.name {
            self.record(name.id);
            self.tree.add_binding(
                self.current(),
                &name.name,
                name.id,
                ScopeKind::Function,
                Mutability::Immutable,
            )?;
        }
        if let Some(super_class) = &class.super_class {
            // The extends clause cannot see the class's own scope.
            self.visit_expr(super_class)?;
        }
        let scope = self.push_scope(ScopeKind::Function, class.id);
        self.tree.add_binding(
            scope,
            SELF_REFERENCE_NAME,
            class.id,
            ScopeKind::Lexical,
            Mutability::Immutable,
        )?;
        for member in &class.members {
            match member {
                ClassMember::Method(m) => {
                    self.record(m.id);
                    self.visit_prop_key(&m.key)?;
                    self.visit_func(&m.func)?;
                }
                ClassMember::Property(p) => {
                    self.record(p.id);
                    self.visit_prop_key(&p.key)?;
                    if let Some(ty) = &p.ty {
                        self.record(ty.id);
                    }
                    if let Some(value) = &p.value {
                        self.visit_expr(value)?;
                    }
                }
            }
        }
        self.pop_scope();
        Ok(())
    }

    fn visit_import(&mut self, import: &ImportDecl) -> StrataResult<()> {
        self.record(import.id);
        self.record(import.source.id);
        for specifier in &import.specifiers {
            self.record(specifier.id());
            if let ImportSpecifier::Named(named) = specifier {
                if let Some(imported) = &named.imported {
                    self.record(imported.id);
                }
            }
            let local = specifier.local();
            self.record(local.id);
            self.tree.add_binding(
                self.current(),
                &local.name,
                local.id,
                ScopeKind::Function,
                Mutability::Immutable,
            )?;
        }
        Ok(())
    }

    // ── Expressions ──────────────────────────────────────────────────────────

    fn visit_expr(&mut self, expr: &Expr) -> StrataResult<()> {
        match expr {
            Expr::Ident(e) => {
                self.record(e.id);
                Ok(())
            }
            Expr::This(e) => {
                self.record(e.id);
                Ok(())
            }
            Expr::Null(e) => {
                self.record(e.id);
                Ok(())
            }
            Expr::Bool(e) => {
                self.record(e.id);
                Ok(())
            }
            Expr::Num(e) => {
                self.record(e.id);
                Ok(())
            }
            Expr::Str(e) => {
                self.record(e.id);
                Ok(())
            }
            Expr::Template(e) => {
                self.record(e.id);
                for expr in &e.exprs {
                    self.visit_expr(expr)?;
                }
                Ok(())
            }
            Expr::Array(e) => {
                self.record(e.id);
                for element in e.elements.iter().flatten() {
                    self.visit_expr(element)?;
                }
                Ok(())
            }
            Expr::Object(e) => {
                self.record(e.id);
                for prop in &e.props {
                    match prop {
                        ObjectProp::KeyValue(kv) => {
                            self.record(kv.id);
                            self.visit_prop_key(&kv.key)?;
                            self.visit_expr(&kv.value)?;
                        }
                        ObjectProp::Shorthand(ident) => self.record(ident.id),
                        ObjectProp::Spread(s) => {
                            self.record(s.id);
                            self.visit_expr(&s.argument)?;
                        }
                    }
                }
                Ok(())
            }
            Expr::Fn(f) | Expr::Arrow(f) => self.visit_func(f),
            Expr::Class(c) => self.visit_class(c),
            Expr::Unary(e) => {
                self.record(e.id);
                self.visit_expr(&e.argument)
            }
            Expr::Update(e) => {
                self.record(e.id);
                self.visit_expr(&e.argument)
            }
            Expr::Binary(e) => {
                self.record(e.id);
                self.visit_expr(&e.left)?;
                self.visit_expr(&e.right)
            }
            Expr::Logical(e) => {
                self.record(e.id);
                self.visit_expr(&e.left)?;
                self.visit_expr(&e.right)
            }
            Expr::Cond(e) => {
                self.record(e.id);
                self.visit_expr(&e.test)?;
                self.visit_expr(&e.consequent)?;
                self.visit_expr(&e.alternate)
            }
            Expr::Assign(e) => {
                self.record(e.id);
                match &e.target {
                    AssignTarget::Pat(p) => self.visit_target_pat(p)?,
                    AssignTarget::Expr(target) => self.visit_expr(target)?,
                }
                self.visit_expr(&e.value)
            }
            Expr::Member(e) => {
                self.record(e.id);
                self.visit_expr(&e.object)?;
                match &e.property {
                    MemberProp::Ident(ident) => {
                        self.record(ident.id);
                        Ok(())
                    }
                    MemberProp::Computed(key) => self.visit_expr(key),
                }
            }
            Expr::Call(e) => {
                self.record(e.id);
                self.visit_expr(&e.callee)?;
                for arg in &e.args {
                    self.visit_expr(arg)?;
                }
                Ok(())
            }
            Expr::New(e) => {
                self.record(e.id);
                self.visit_expr(&e.callee)?;
                for arg in &e.args {
                    self.visit_expr(arg)?;
                }
                Ok(())
            }
            Expr::Spread(e) => {
                self.record(e.id);
                self.visit_expr(&e.argument)
            }
            Expr::Element(e) => self.visit_element(e),
        }
    }

    fn visit_element(&mut self, element: &ElementExpr) -> StrataResult<()> {
        self.record(element.id);
        self.record(element.tag.id);
        for attr in &element.attrs {
            self.record(attr.id);
            self.record(attr.name.id);
            if let Some(value) = &attr.value {
                self.visit_expr(value)?;
            }
        }
        for child in &element.children {
            match child {
                ElementChild::Element(el) => self.visit_element(el)?,
                ElementChild::Expr(e) => self.visit_expr(e)?,
                ElementChild::Text(text) => self.record(text.id),
            }
        }
        Ok(())
    }

    fn visit_prop_key(&mut self, key: &PropKey) -> StrataResult<()> {
        match key {
            PropKey::Ident(i) => {
                self.record(i.id);
                Ok(())
            }
            PropKey::Str(s) => {
                self.record(s.id);
                Ok(())
            }
            PropKey::Num(n) => {
                self.record(n.id);
                Ok(())
            }
            PropKey::Computed(e) => self.visit_expr(e),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;
    use crate::fixtures::Fx;
    use crate::scope::tree::{Mutability, ScopeKind};

    #[test]
    fn test_every_node_is_mapped() {
        let mut fx = Fx::new();
        // A tree touching most constructs: declaration with initializer,
        // block, function with destructured parameter, loop, assignment.
        let b = fx.read("b");
        let decl = fx.var_stmt(DeclKind::Const, "a", Some(b));
        let inner_var = fx.var_stmt(DeclKind::Var, "v", None);
        let block = fx.block_stmt(vec![inner_var]);
        let shorthand = ObjectPatProp::Shorthand(ObjectPatShorthand {
            id: fx.ids.alloc(),
            loc: Span::default(),
            name: fx.ident("x"),
            default: None,
        });
        let obj_pat = Pat::Object(ObjectPat {
            id: fx.ids.alloc(),
            loc: Span::default(),
            props: vec![shorthand],
        });
        let ret_x = {
            let x = fx.read("x");
            fx.ret(Some(x))
        };
        let func = fx.fn_decl("f", vec![obj_pat], vec![ret_x]);
        let loop_stmt = {
            let i = fx.pat("i");
            let head = ForHead::VarDecl(fx.var_decl(DeclKind::Let, i, None));
            let xs = fx.read("xs");
            let i_read = fx.read("i");
            let body_stmt = fx.expr_stmt(i_read);
            let body = fx.block_stmt(vec![body_stmt]);
            fx.for_of(head, xs, body)
        };
        let assignment = {
            let y = fx.read("y");
            let assign = fx.assign("a", y);
            fx.expr_stmt(assign)
        };
        let module = fx.module(vec![decl, block, func, loop_stmt, assignment]);

        let (_, node_scopes) = ScopeBuilder::build(&module).unwrap();
        for raw in 0..fx.ids.count() {
            assert!(
                node_scopes.contains_key(&NodeId(raw)),
                "node {} has no scope",
                NodeId(raw)
            );
        }
        assert_eq!(node_scopes.len() as u32, fx.ids.count());
    }

    #[test]
    fn test_var_hoists_out_of_block() {
        let mut fx = Fx::new();
        let decl = fx.var_stmt(DeclKind::Var, "x", None);
        let block = fx.block_stmt(vec![decl]);
        let module = fx.module(vec![block]);

        let (tree, _) = ScopeBuilder::build(&module).unwrap();
        let root = tree.root();
        let binding = tree.own_binding(root, "x").expect("x hoisted to root");
        assert_eq!(tree.binding(binding).kind, ScopeKind::Function);
        assert_eq!(tree.binding(binding).mutability, Mutability::Mutable);
        // The block scope itself holds nothing.
        let block_scope = tree.scope(root).children[0];
        assert!(tree.own_binding(block_scope, "x").is_none());
    }

    #[test]
    fn test_let_stays_in_block() {
        let mut fx = Fx::new();
        let decl = fx.var_stmt(DeclKind::Let, "y", None);
        let block = fx.block_stmt(vec![decl]);
        let module = fx.module(vec![block]);

        let (tree, _) = ScopeBuilder::build(&module).unwrap();
        let root = tree.root();
        assert!(tree.own_binding(root, "y").is_none());
        let block_scope = tree.scope(root).children[0];
        let binding = tree.own_binding(block_scope, "y").expect("y in block");
        assert_eq!(tree.binding(binding).kind, ScopeKind::Lexical);
    }

    #[test]
    fn test_const_binding_is_immutable() {
        let mut fx = Fx::new();
        let one = fx.num(1.0);
        let decl = fx.var_stmt(DeclKind::Const, "c", Some(one));
        let module = fx.module(vec![decl]);

        let (tree, _) = ScopeBuilder::build(&module).unwrap();
        let binding = tree.own_binding(tree.root(), "c").unwrap();
        assert_eq!(tree.binding(binding).mutability, Mutability::Immutable);
    }

    #[test]
    fn test_fn_name_binds_lexical_in_containing_scope() {
        // A function declared inside a block stays local to the block.
        let mut fx = Fx::new();
        let func = fx.fn_decl("f", vec![], vec![]);
        let block = fx.block_stmt(vec![func]);
        let module = fx.module(vec![block]);

        let (tree, _) = ScopeBuilder::build(&module).unwrap();
        let root = tree.root();
        assert!(tree.own_binding(root, "f").is_none());
        let block_scope = tree.scope(root).children[0];
        let binding = tree.own_binding(block_scope, "f").expect("f in block");
        assert_eq!(tree.binding(binding).kind, ScopeKind::Lexical);
        assert_eq!(tree.binding(binding).mutability, Mutability::Immutable);
    }

    #[test]
    fn test_class_name_hoists_out_of_block() {
        // Unlike a function name, a class name is function-scoped and lands
        // at the enclosing function boundary.
        let mut fx = Fx::new();
        let name = fx.ident("C");
        let class = Stmt::ClassDecl(Box::new(Class {
            id: fx.ids.alloc(),
            loc: Span::default(),
            name: Some(name),
            super_class: None,
            members: vec![],
        }));
        let block = fx.block_stmt(vec![class]);
        let module = fx.module(vec![block]);

        let (tree, _) = ScopeBuilder::build(&module).unwrap();
        let root = tree.root();
        let binding = tree.own_binding(root, "C").expect("C hoisted to root");
        assert_eq!(tree.binding(binding).kind, ScopeKind::Function);
        assert_eq!(tree.binding(binding).mutability, Mutability::Immutable);
    }

    #[test]
    fn test_class_scope_owns_self_reference_binding() {
        let mut fx = Fx::new();
        let name = fx.ident("C");
        let class_id = fx.ids.alloc();
        let class = Stmt::ClassDecl(Box::new(Class {
            id: class_id,
            loc: Span::default(),
            name: Some(name),
            super_class: None,
            members: vec![],
        }));
        let module = fx.module(vec![class]);

        let (tree, _) = ScopeBuilder::build(&module).unwrap();
        let class_scope = tree.scope(tree.root()).children[0];
        assert_eq!(tree.scope(class_scope).kind, ScopeKind::Function);
        assert_eq!(tree.scope(class_scope).node, class_id);
        let this = tree
            .own_binding(class_scope, SELF_REFERENCE_NAME)
            .expect("implicit self-reference binding");
        assert_eq!(tree.binding(this).mutability, Mutability::Immutable);
    }

    #[test]
    fn test_destructured_params_bind_leaves_only() {
        // function f({a, b: [c]}) {} — binds a and c, Mutable, in f's
        // scope; no binding named b.
        let mut fx = Fx::new();
        let a = ObjectPatProp::Shorthand(ObjectPatShorthand {
            id: fx.ids.alloc(),
            loc: Span::default(),
            name: fx.ident("a"),
            default: None,
        });
        let c = fx.pat("c");
        let b_key = PropKey::Ident(fx.ident("b"));
        let b = ObjectPatProp::KeyValue(ObjectPatKeyValue {
            id: fx.ids.alloc(),
            loc: Span::default(),
            key: b_key,
            value: Box::new(Pat::Array(ArrayPat {
                id: fx.ids.alloc(),
                loc: Span::default(),
                elements: vec![Some(c)],
            })),
        });
        let param = Pat::Object(ObjectPat {
            id: fx.ids.alloc(),
            loc: Span::default(),
            props: vec![a, b],
        });
        let func = fx.fn_decl("f", vec![param], vec![]);
        let module = fx.module(vec![func]);

        let (tree, _) = ScopeBuilder::build(&module).unwrap();
        let fn_scope = tree.scope(tree.root()).children[0];
        for name in ["a", "c"] {
            let binding = tree
                .own_binding(fn_scope, name)
                .unwrap_or_else(|| panic!("{name} not bound in fn scope"));
            assert_eq!(tree.binding(binding).mutability, Mutability::Mutable);
            assert_eq!(tree.binding(binding).kind, ScopeKind::Function);
        }
        assert!(tree.resolve(fn_scope, "b").is_none(), "b must not bind");
    }

    #[test]
    fn test_fn_block_body_reuses_fn_scope() {
        let mut fx = Fx::new();
        let inner = fx.var_stmt(DeclKind::Let, "local", None);
        let func = fx.fn_decl("f", vec![], vec![inner]);
        let body_id = match &func {
            Stmt::FnDecl(f) => match &f.body {
                FnBody::Block(b) => b.id,
                FnBody::Expr(_) => unreachable!(),
            },
            _ => unreachable!(),
        };
        let module = fx.module(vec![func]);

        let (tree, node_scopes) = ScopeBuilder::build(&module).unwrap();
        let fn_scope = tree.scope(tree.root()).children[0];
        // The body block introduced no extra layer: it maps to the function
        // scope, and `local` lives directly there.
        assert_eq!(node_scopes[&body_id], fn_scope);
        assert!(tree.own_binding(fn_scope, "local").is_some());
        assert_eq!(tree.scope_count(), 2);
    }

    #[test]
    fn test_loop_head_scope_and_body_reuse() {
        let mut fx = Fx::new();
        let i = fx.pat("i");
        let head = ForHead::VarDecl(fx.var_decl(DeclKind::Let, i, None));
        let xs = fx.read("xs");
        let i_read = fx.read("i");
        let body_stmt = fx.expr_stmt(i_read);
        let body = fx.block_stmt(vec![body_stmt]);
        let body_id = body.id();
        let loop_stmt = fx.for_of(head, xs, body);
        let module = fx.module(vec![loop_stmt]);

        let (tree, node_scopes) = ScopeBuilder::build(&module).unwrap();
        let root = tree.root();
        let loop_scope = tree.scope(root).children[0];
        assert_eq!(tree.scope(loop_scope).kind, ScopeKind::Lexical);
        assert!(tree.own_binding(loop_scope, "i").is_some());
        assert!(tree.own_binding(root, "i").is_none());
        // Body block reuses the loop scope.
        assert_eq!(node_scopes[&body_id], loop_scope);
        assert_eq!(tree.scope_count(), 2);
    }

    #[test]
    fn test_for_var_still_hoists_out_of_loop_scope() {
        let mut fx = Fx::new();
        let i = fx.pat("i");
        let head = ForHead::VarDecl(fx.var_decl(DeclKind::Var, i, None));
        let xs = fx.read("xs");
        let body = fx.block_stmt(vec![]);
        let loop_stmt = fx.for_of(head, xs, body);
        let module = fx.module(vec![loop_stmt]);

        let (tree, _) = ScopeBuilder::build(&module).unwrap();
        let root = tree.root();
        assert!(tree.own_binding(root, "i").is_some());
        let loop_scope = tree.scope(root).children[0];
        assert!(tree.own_binding(loop_scope, "i").is_none());
    }

    #[test]
    fn test_for_of_source_visited_in_containing_scope() {
        let mut fx = Fx::new();
        let i = fx.pat("i");
        let head = ForHead::VarDecl(fx.var_decl(DeclKind::Let, i, None));
        let xs = fx.read("xs");
        let xs_id = xs.id();
        let body = fx.block_stmt(vec![]);
        let loop_stmt = fx.for_of(head, xs, body);
        let module = fx.module(vec![loop_stmt]);

        let (tree, node_scopes) = ScopeBuilder::build(&module).unwrap();
        assert_eq!(node_scopes[&xs_id], tree.root());
    }

    #[test]
    fn test_catch_param_bound_in_catch_body_scope() {
        let mut fx = Fx::new();
        let try_block = fx.block(vec![]);
        let param = fx.pat("err");
        let catch_body = fx.block(vec![]);
        let try_stmt = Stmt::Try(TryStmt {
            id: fx.ids.alloc(),
            loc: Span::default(),
            block: try_block,
            handler: Some(CatchClause {
                id: fx.ids.alloc(),
                loc: Span::default(),
                param: Some(param),
                body: catch_body,
            }),
            finalizer: None,
        });
        let module = fx.module(vec![try_stmt]);

        let (tree, _) = ScopeBuilder::build(&module).unwrap();
        let root = tree.root();
        assert!(tree.own_binding(root, "err").is_none());
        // children[0] = try block scope, children[1] = catch body scope.
        let catch_scope = tree.scope(root).children[1];
        let binding = tree.own_binding(catch_scope, "err").expect("err bound");
        assert_eq!(tree.binding(binding).kind, ScopeKind::Lexical);
        assert_eq!(tree.binding(binding).mutability, Mutability::Mutable);
    }

    #[test]
    fn test_import_bindings_are_immutable_function_scoped() {
        let mut fx = Fx::new();
        let default = ImportSpecifier::Default(ImportDefaultSpecifier {
            id: fx.ids.alloc(),
            loc: Span::default(),
            local: fx.ident("dflt"),
        });
        let ns = ImportSpecifier::Namespace(ImportNamespaceSpecifier {
            id: fx.ids.alloc(),
            loc: Span::default(),
            local: fx.ident("ns"),
        });
        let named = ImportSpecifier::Named(ImportNamedSpecifier {
            id: fx.ids.alloc(),
            loc: Span::default(),
            local: fx.ident("renamed"),
            imported: Some(fx.ident("orig")),
        });
        let source = fx.str_lit("./mod");
        let import = Stmt::Import(ImportDecl {
            id: fx.ids.alloc(),
            loc: Span::default(),
            specifiers: vec![default, ns, named],
            source,
        });
        let module = fx.module(vec![import]);

        let (tree, _) = ScopeBuilder::build(&module).unwrap();
        let root = tree.root();
        for name in ["dflt", "ns", "renamed"] {
            let binding = tree
                .own_binding(root, name)
                .unwrap_or_else(|| panic!("{name} not bound"));
            assert_eq!(tree.binding(binding).kind, ScopeKind::Function);
            assert_eq!(tree.binding(binding).mutability, Mutability::Immutable);
        }
        // The exported-name side of an aliased import binds nothing.
        assert!(tree.own_binding(root, "orig").is_none());
    }

    #[test]
    fn test_block_node_maps_to_containing_scope() {
        let mut fx = Fx::new();
        let block = fx.block_stmt(vec![]);
        let block_id = block.id();
        let module = fx.module(vec![block]);

        let (tree, node_scopes) = ScopeBuilder::build(&module).unwrap();
        let root = tree.root();
        // The block node sits in the root scope; its contents would sit in
        // the new lexical scope.
        assert_eq!(node_scopes[&block_id], root);
        assert_eq!(tree.scope(root).children.len(), 1);
    }

    #[test]
    fn test_named_function_expression_binds_in_containing_scope() {
        let mut fx = Fx::new();
        let func = fx.func(Some("helper"), vec![], vec![]);
        let stmt = fx.expr_stmt(Expr::Fn(Box::new(func)));
        let module = fx.module(vec![stmt]);

        let (tree, _) = ScopeBuilder::build(&module).unwrap();
        assert!(tree.own_binding(tree.root(), "helper").is_some());
    }
}
