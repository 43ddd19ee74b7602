//! Pass 2: reference resolution.
//!
//! A second top-down traversal that classifies every identifier occurrence
//! — read, write, or declaration-time initialization — and records it
//! through [`crate::scope::tree::ScopeTree::add_reference`], which resolves
//! it against the scope chain built in pass 1.
//!
//! The resolver never tracks scopes itself: the encountering scope of
//! every occurrence is the pass-1 node→scope mapping.  That mapping also
//! realizes the placement rules pass 1 decided — for example, a
//! `for-of` source expression was mapped to the loop's *containing* scope,
//! so its references resolve from there without any special case here.
//!
//! Positions that are not variable references emit nothing: member-access
//! property names, object/class property keys (unless computed), element
//! attribute names, destructuring targets of assignments, and everything
//! inside type annotations.  Value positions are reached structurally, so
//! statement-level expressions (conditions, discriminants, return/throw
//! arguments) are always resolved as reads no matter how deeply the
//! statement is nested.
//!
//! Because this pass starts only after pass 1 has finished the entire
//! tree, forward references and mutual recursion resolve with no extra
//! machinery: every binding already exists.

use std::collections::HashMap;

use crate::ast::*;
use crate::error::{StrataError, StrataResult};
use crate::scope::tree::{ScopeId, ScopeTree, SELF_REFERENCE_NAME};

/// The pass-2 traversal state.
pub struct ReferenceResolver<'a> {
    tree: &'a mut ScopeTree,
    node_scopes: &'a HashMap<NodeId, ScopeId>,
}

impl<'a> ReferenceResolver<'a> {
    /// Run pass 2 over `module`, recording every reference into `tree`.
    ///
    /// `node_scopes` must be the mapping produced by pass 1 over the same
    /// tree; a node missing from it is an invariant violation.
    pub fn run(
        tree: &'a mut ScopeTree,
        node_scopes: &'a HashMap<NodeId, ScopeId>,
        module: &Module,
    ) -> StrataResult<()> {
        let mut resolver = Self { tree, node_scopes };
        resolver.visit_stmts(&module.body)
    }

    fn scope_of(&self, node: NodeId) -> StrataResult<ScopeId> {
        self.node_scopes.get(&node).copied().ok_or_else(|| {
            StrataError::Internal(format!(
                "node {node} reached resolution without a registered scope"
            ))
        })
    }

    /// Record one occurrence of `ident`.
    fn record(
        &mut self,
        ident: &Ident,
        write_expr: Option<NodeId>,
        is_initializer: bool,
    ) -> StrataResult<()> {
        let scope = self.scope_of(ident.id)?;
        self.tree
            .add_reference(scope, ident.id, &ident.name, write_expr, is_initializer);
        Ok(())
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
            Stmt::Block(b) => self.visit_stmts(&b.body),
            Stmt::VarDecl(v) => self.visit_var_decl(v),
            Stmt::FnDecl(f) => self.visit_func(f),
            Stmt::ClassDecl(c) => self.visit_class(c),
            Stmt::Expr(s) => self.visit_expr(&s.expr),
            Stmt::If(s) => {
                self.visit_expr(&s.test)?;
                self.visit_stmt(&s.consequent)?;
                if let Some(alt) = &s.alternate {
                    self.visit_stmt(alt)?;
                }
                Ok(())
            }
            Stmt::For(s) => {
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
                self.visit_stmt(&s.body)
            }
            Stmt::ForIn(s) => self.visit_for_in_of(&s.left, &s.right, &s.body),
            Stmt::ForOf(s) => self.visit_for_in_of(&s.left, &s.right, &s.body),
            Stmt::While(s) => {
                self.visit_expr(&s.test)?;
                self.visit_stmt(&s.body)
            }
            Stmt::DoWhile(s) => {
                self.visit_stmt(&s.body)?;
                self.visit_expr(&s.test)
            }
            Stmt::Switch(s) => {
                self.visit_expr(&s.discriminant)?;
                for case in &s.cases {
                    if let Some(test) = &case.test {
                        self.visit_expr(test)?;
                    }
                    self.visit_stmts(&case.body)?;
                }
                Ok(())
            }
            Stmt::Try(s) => {
                self.visit_stmts(&s.block.body)?;
                if let Some(handler) = &s.handler {
                    // The parameter is a declaration without initializer:
                    // no references, but pattern defaults are still reads.
                    if let Some(param) = &handler.param {
                        self.visit_silent_pat(param)?;
                    }
                    self.visit_stmts(&handler.body.body)?;
                }
                if let Some(fin) = &s.finalizer {
                    self.visit_stmts(&fin.body)?;
                }
                Ok(())
            }
            Stmt::Return(s) => match &s.argument {
                Some(arg) => self.visit_expr(arg),
                None => Ok(()),
            },
            Stmt::Throw(s) => self.visit_expr(&s.argument),
            Stmt::Break(_) | Stmt::Continue(_) | Stmt::Empty(_) => Ok(()),
            // Imports only introduce bindings; they contain no references.
            Stmt::Import(_) => Ok(()),
        }
    }

    fn visit_for_in_of(&mut self, left: &ForHead, right: &Expr, body: &Stmt) -> StrataResult<()> {
        match left {
            // A declared bound name initializes from the source expression.
            ForHead::VarDecl(v) => {
                for declarator in &v.declarators {
                    self.declare_pat(&declarator.name, right.id())?;
                }
            }
            // A bare pre-bound identifier is written each iteration.
            ForHead::Pat(Pat::Ident(ident)) => self.record(ident, Some(right.id()), false)?,
            // Destructuring targets emit nothing.
            ForHead::Pat(p) => self.visit_silent_pat(p)?,
        }
        self.visit_expr(right)?;
        self.visit_stmt(body)
    }

    fn visit_var_decl(&mut self, decl: &VarDecl) -> StrataResult<()> {
        for declarator in &decl.declarators {
            match &declarator.init {
                Some(init) => {
                    self.declare_pat(&declarator.name, init.id())?;
                    self.visit_expr(init)?;
                }
                // Without an initializer the declared names produce no
                // references at all.
                None => self.visit_silent_pat(&declarator.name)?,
            }
        }
        Ok(())
    }

    /// Record a declare-with-initializer reference for every leaf
    /// identifier of `pat`, all sharing `write_expr`.
    fn declare_pat(&mut self, pat: &Pat, write_expr: NodeId) -> StrataResult<()> {
        match pat {
            Pat::Ident(ident) => self.record(ident, Some(write_expr), true),
            Pat::Array(a) => {
                for element in a.elements.iter().flatten() {
                    self.declare_pat(element, write_expr)?;
                }
                Ok(())
            }
            Pat::Object(o) => {
                for prop in &o.props {
                    match prop {
                        ObjectPatProp::KeyValue(kv) => {
                            self.visit_prop_key(&kv.key)?;
                            self.declare_pat(&kv.value, write_expr)?;
                        }
                        ObjectPatProp::Shorthand(sh) => {
                            self.record(&sh.name, Some(write_expr), true)?;
                            if let Some(default) = &sh.default {
                                self.visit_expr(default)?;
                            }
                        }
                        ObjectPatProp::Rest(r) => self.declare_pat(&r.pat, write_expr)?,
                    }
                }
                Ok(())
            }
            Pat::Rest(r) => self.declare_pat(&r.pat, write_expr),
            Pat::Assign(a) => {
                self.declare_pat(&a.pat, write_expr)?;
                self.visit_expr(&a.default)
            }
        }
    }

    /// Walk a pattern whose identifiers emit no references (uninitialized
    /// declarations, catch parameters, destructuring assignment targets).
    /// Defaults and computed keys inside it are still value reads.
    fn visit_silent_pat(&mut self, pat: &Pat) -> StrataResult<()> {
        match pat {
            Pat::Ident(_) => Ok(()),
            Pat::Array(a) => {
                for element in a.elements.iter().flatten() {
                    self.visit_silent_pat(element)?;
                }
                Ok(())
            }
            Pat::Object(o) => {
                for prop in &o.props {
                    match prop {
                        ObjectPatProp::KeyValue(kv) => {
                            self.visit_prop_key(&kv.key)?;
                            self.visit_silent_pat(&kv.value)?;
                        }
                        ObjectPatProp::Shorthand(sh) => {
                            if let Some(default) = &sh.default {
                                self.visit_expr(default)?;
                            }
                        }
                        ObjectPatProp::Rest(r) => self.visit_silent_pat(&r.pat)?,
                    }
                }
                Ok(())
            }
            Pat::Rest(r) => self.visit_silent_pat(&r.pat),
            Pat::Assign(a) => {
                self.visit_silent_pat(&a.pat)?;
                self.visit_expr(&a.default)
            }
        }
    }

    fn visit_func(&mut self, func: &Func) -> StrataResult<()> {
        // The name is a binding, not a reference.
        for param in &func.params {
            self.visit_silent_pat(&param.pat)?;
            if let Some(default) = &param.default {
                self.visit_expr(default)?;
            }
        }
        match &func.body {
            FnBody::Block(b) => self.visit_stmts(&b.body),
            FnBody::Expr(e) => self.visit_expr(e),
        }
    }

    fn visit_class(&mut self, class: &Class) -> StrataResult<()> {
        if let Some(super_class) = &class.super_class {
            self.visit_expr(super_class)?;
        }
        for member in &class.members {
            match member {
                ClassMember::Method(m) => {
                    self.visit_prop_key(&m.key)?;
                    self.visit_func(&m.func)?;
                }
                ClassMember::Property(p) => {
                    self.visit_prop_key(&p.key)?;
                    if let Some(value) = &p.value {
                        self.visit_expr(value)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Property names select members; only computed keys evaluate.
    fn visit_prop_key(&mut self, key: &PropKey) -> StrataResult<()> {
        match key {
            PropKey::Ident(_) | PropKey::Str(_) | PropKey::Num(_) => Ok(()),
            PropKey::Computed(e) => self.visit_expr(e),
        }
    }

    // ── Expressions ──────────────────────────────────────────────────────────

    /// Visit an expression in value position: every identifier reached
    /// through here is a read.
    fn visit_expr(&mut self, expr: &Expr) -> StrataResult<()> {
        match expr {
            Expr::Ident(ident) => self.record(ident, None, false),
            Expr::This(this) => {
                let scope = self.scope_of(this.id)?;
                self.tree
                    .add_reference(scope, this.id, SELF_REFERENCE_NAME, None, false);
                Ok(())
            }
            Expr::Null(_) | Expr::Bool(_) | Expr::Num(_) | Expr::Str(_) => Ok(()),
            Expr::Template(t) => {
                for e in &t.exprs {
                    self.visit_expr(e)?;
                }
                Ok(())
            }
            Expr::Array(a) => {
                for element in a.elements.iter().flatten() {
                    self.visit_expr(element)?;
                }
                Ok(())
            }
            Expr::Object(o) => {
                for prop in &o.props {
                    match prop {
                        ObjectProp::KeyValue(kv) => {
                            self.visit_prop_key(&kv.key)?;
                            self.visit_expr(&kv.value)?;
                        }
                        // Shorthand `{ x }` reads `x`.
                        ObjectProp::Shorthand(ident) => self.record(ident, None, false)?,
                        ObjectProp::Spread(s) => self.visit_expr(&s.argument)?,
                    }
                }
                Ok(())
            }
            Expr::Fn(f) | Expr::Arrow(f) => self.visit_func(f),
            Expr::Class(c) => self.visit_class(c),
            Expr::Unary(u) => self.visit_expr(&u.argument),
            Expr::Update(u) => self.visit_expr(&u.argument),
            Expr::Binary(b) => {
                self.visit_expr(&b.left)?;
                self.visit_expr(&b.right)
            }
            Expr::Logical(l) => {
                self.visit_expr(&l.left)?;
                self.visit_expr(&l.right)
            }
            Expr::Cond(c) => {
                self.visit_expr(&c.test)?;
                self.visit_expr(&c.consequent)?;
                self.visit_expr(&c.alternate)
            }
            Expr::Assign(a) => {
                match &a.target {
                    // Only a simple assignment to a bare identifier is a
                    // write; a compound target reads its old value first.
                    AssignTarget::Expr(Expr::Ident(ident)) if a.op.is_simple() => {
                        self.record(ident, Some(a.value.id()), false)?;
                    }
                    AssignTarget::Expr(target) => self.visit_expr(target)?,
                    AssignTarget::Pat(p) => self.visit_silent_pat(p)?,
                }
                self.visit_expr(&a.value)
            }
            Expr::Member(m) => {
                // Only the base is a reference; the property name selects.
                self.visit_expr(&m.object)?;
                if let MemberProp::Computed(key) = &m.property {
                    self.visit_expr(key)?;
                }
                Ok(())
            }
            Expr::Call(c) => {
                self.visit_expr(&c.callee)?;
                for arg in &c.args {
                    self.visit_expr(arg)?;
                }
                Ok(())
            }
            Expr::New(n) => {
                self.visit_expr(&n.callee)?;
                for arg in &n.args {
                    self.visit_expr(arg)?;
                }
                Ok(())
            }
            Expr::Spread(s) => self.visit_expr(&s.argument),
            Expr::Element(e) => self.visit_element(e),
        }
    }

    fn visit_element(&mut self, element: &ElementExpr) -> StrataResult<()> {
        // The tag resolves as a read; attribute names never do.
        self.record(&element.tag, None, false)?;
        for attr in &element.attrs {
            if let Some(value) = &attr.value {
                self.visit_expr(value)?;
            }
        }
        for child in &element.children {
            match child {
                ElementChild::Element(el) => self.visit_element(el)?,
                ElementChild::Expr(e) => self.visit_expr(e)?,
                ElementChild::Text(_) => {}
            }
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
