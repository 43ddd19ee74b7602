//! Hand-built syntax-tree fixtures for tests.
//!
//! Stands in for the external parser: a [`Fx`] owns the [`NodeIdGen`] of one
//! tree under construction, so every node a test builds gets a unique id —
//! which is exactly what the totality checks rely on.

use crate::ast::*;

/// Fixture factory for one syntax tree.
pub struct Fx {
    /// The id generator; `ids.count()` after building is the node count.
    pub ids: NodeIdGen,
}

impl Fx {
    pub fn new() -> Self {
        Self { ids: NodeIdGen::new() }
    }

    fn loc() -> Span {
        Span::default()
    }

    pub fn ident(&mut self, name: &str) -> Ident {
        Ident { id: self.ids.alloc(), loc: Self::loc(), name: name.to_owned() }
    }

    /// An identifier in expression position.
    pub fn read(&mut self, name: &str) -> Expr {
        Expr::Ident(self.ident(name))
    }

    pub fn num(&mut self, value: f64) -> Expr {
        Expr::Num(NumLit { id: self.ids.alloc(), loc: Self::loc(), value })
    }

    pub fn str_lit(&mut self, value: &str) -> StrLit {
        StrLit { id: self.ids.alloc(), loc: Self::loc(), value: value.to_owned() }
    }

    pub fn this(&mut self) -> Expr {
        Expr::This(ThisExpr { id: self.ids.alloc(), loc: Self::loc() })
    }

    pub fn pat(&mut self, name: &str) -> Pat {
        Pat::Ident(self.ident(name))
    }

    pub fn param(&mut self, pat: Pat) -> Param {
        Param { id: self.ids.alloc(), loc: Self::loc(), pat, ty: None, default: None }
    }

    pub fn block(&mut self, body: Vec<Stmt>) -> BlockStmt {
        BlockStmt { id: self.ids.alloc(), loc: Self::loc(), body }
    }

    pub fn block_stmt(&mut self, body: Vec<Stmt>) -> Stmt {
        Stmt::Block(self.block(body))
    }

    pub fn expr_stmt(&mut self, expr: Expr) -> Stmt {
        Stmt::Expr(ExprStmt { id: self.ids.alloc(), loc: Self::loc(), expr })
    }

    pub fn ret(&mut self, argument: Option<Expr>) -> Stmt {
        Stmt::Return(ReturnStmt { id: self.ids.alloc(), loc: Self::loc(), argument })
    }

    pub fn var_declarator(&mut self, name: Pat, init: Option<Expr>) -> VarDeclarator {
        VarDeclarator { id: self.ids.alloc(), loc: Self::loc(), name, ty: None, init }
    }

    pub fn var_decl(&mut self, kind: DeclKind, name: Pat, init: Option<Expr>) -> VarDecl {
        let declarator = self.var_declarator(name, init);
        VarDecl { id: self.ids.alloc(), loc: Self::loc(), kind, declarators: vec![declarator] }
    }

    /// `kind name = init;` with a plain identifier pattern.
    pub fn var_stmt(&mut self, kind: DeclKind, name: &str, init: Option<Expr>) -> Stmt {
        let pat = self.pat(name);
        Stmt::VarDecl(self.var_decl(kind, pat, init))
    }

    pub fn func(&mut self, name: Option<&str>, params: Vec<Pat>, body: Vec<Stmt>) -> Func {
        let name = name.map(|n| self.ident(n));
        let params = params.into_iter().map(|p| self.param(p)).collect();
        let body = FnBody::Block(self.block(body));
        Func { id: self.ids.alloc(), loc: Self::loc(), name, params, return_ty: None, body }
    }

    pub fn fn_decl(&mut self, name: &str, params: Vec<Pat>, body: Vec<Stmt>) -> Stmt {
        Stmt::FnDecl(Box::new(self.func(Some(name), params, body)))
    }

    pub fn arrow(&mut self, params: Vec<Pat>, body: Expr) -> Expr {
        let params = params.into_iter().map(|p| self.param(p)).collect();
        Expr::Arrow(Box::new(Func {
            id: self.ids.alloc(),
            loc: Self::loc(),
            name: None,
            params,
            return_ty: None,
            body: FnBody::Expr(Box::new(body)),
        }))
    }

    pub fn call(&mut self, callee: Expr, args: Vec<Expr>) -> Expr {
        Expr::Call(Box::new(CallExpr { id: self.ids.alloc(), loc: Self::loc(), callee, args }))
    }

    /// `name = value` simple assignment expression.
    pub fn assign(&mut self, name: &str, value: Expr) -> Expr {
        let target = AssignTarget::Expr(self.read(name));
        Expr::Assign(Box::new(AssignExpr {
            id: self.ids.alloc(),
            loc: Self::loc(),
            op: AssignOp::Assign,
            target,
            value,
        }))
    }

    pub fn member(&mut self, object: Expr, name: &str) -> Expr {
        let property = MemberProp::Ident(self.ident(name));
        Expr::Member(Box::new(MemberExpr { id: self.ids.alloc(), loc: Self::loc(), object, property }))
    }

    pub fn for_of(&mut self, left: ForHead, right: Expr, body: Stmt) -> Stmt {
        Stmt::ForOf(ForOfStmt {
            id: self.ids.alloc(),
            loc: Self::loc(),
            left,
            right,
            body: Box::new(body),
        })
    }

    pub fn module(&mut self, body: Vec<Stmt>) -> Module {
        Module { id: self.ids.alloc(), loc: Self::loc(), body }
    }
}
