//! `strata_dump` — scope snapshot inspection shell.
//!
//! Analyzes a built-in sample tree (the kind of structure a host parser
//! would hand to `strata_core`) and prints the resulting scope snapshot.
//! Useful for eyeballing scope construction and reference classification
//! without wiring up a real parser.

use strata_core::ast::*;
use strata_core::scope::build_scopes;

/// Builds the sample tree for:
///
/// ```text
/// const base = start;
/// function scale(factor) {
///     let result = base;
///     result = result * factor;
///     return result;
/// }
/// ```
fn ident(ids: &mut NodeIdGen, name: &str) -> Ident {
    Ident { id: ids.alloc(), loc: Span::default(), name: name.to_owned() }
}

fn sample_module() -> Module {
    let mut ids = NodeIdGen::new();
    let loc = Span::default();

    let start = Expr::Ident(ident(&mut ids, "start"));
    let base_decl = Stmt::VarDecl(VarDecl {
        id: ids.alloc(),
        loc,
        kind: DeclKind::Const,
        declarators: vec![VarDeclarator {
            id: ids.alloc(),
            loc,
            name: Pat::Ident(ident(&mut ids, "base")),
            ty: None,
            init: Some(start),
        }],
    });

    let base_read = Expr::Ident(ident(&mut ids, "base"));
    let result_decl = Stmt::VarDecl(VarDecl {
        id: ids.alloc(),
        loc,
        kind: DeclKind::Let,
        declarators: vec![VarDeclarator {
            id: ids.alloc(),
            loc,
            name: Pat::Ident(ident(&mut ids, "result")),
            ty: None,
            init: Some(base_read),
        }],
    });

    let product = Expr::Binary(Box::new(BinaryExpr {
        id: ids.alloc(),
        loc,
        op: BinaryOp::Mul,
        left: Expr::Ident(ident(&mut ids, "result")),
        right: Expr::Ident(ident(&mut ids, "factor")),
    }));
    let update = Stmt::Expr(ExprStmt {
        id: ids.alloc(),
        loc,
        expr: Expr::Assign(Box::new(AssignExpr {
            id: ids.alloc(),
            loc,
            op: AssignOp::Assign,
            target: AssignTarget::Expr(Expr::Ident(ident(&mut ids, "result"))),
            value: product,
        })),
    });

    let ret = Stmt::Return(ReturnStmt {
        id: ids.alloc(),
        loc,
        argument: Some(Expr::Ident(ident(&mut ids, "result"))),
    });

    let factor_param = Param {
        id: ids.alloc(),
        loc,
        pat: Pat::Ident(ident(&mut ids, "factor")),
        ty: None,
        default: None,
    };
    let scale = Stmt::FnDecl(Box::new(Func {
        id: ids.alloc(),
        loc,
        name: Some(ident(&mut ids, "scale")),
        params: vec![factor_param],
        return_ty: None,
        body: FnBody::Block(BlockStmt {
            id: ids.alloc(),
            loc,
            body: vec![result_decl, update, ret],
        }),
    }));

    Module {
        id: ids.alloc(),
        loc,
        body: vec![base_decl, scale],
    }
}

fn main() {
    let module = sample_module();
    match build_scopes(&module) {
        Ok(scopes) => print!("{}", scopes.into_printable()),
        Err(err) => {
            eprintln!("strata_dump: {err}");
            std::process::exit(1);
        }
    }
}
