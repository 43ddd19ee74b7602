//! `strata_core` — static scope and binding analysis for syntax trees.
//!
//! Strata takes a syntax tree produced by an external parser and computes,
//! without executing the program: the enclosing scope of every node, the
//! bindings visible there, and for each identifier occurrence whether it is
//! a read, a write, or a declaration-time initialization, resolved to the
//! binding that introduces it (or left unresolved).  Consumers are linters,
//! rename/refactor tools, and closure-capture or dead-binding analyses.
//!
//! # Crate layout
//!
//! - [`ast`] — the syntax tree contract with the external parser.
//! - [`scope`] — the two-pass analysis engine and its query API.
//! - [`error`] — error types.
//!
//! # Example
//!
//! ```
//! use strata_core::ast::*;
//! use strata_core::scope::build_scopes;
//!
//! // const a = b;   (as a parser would hand it over)
//! let mut ids = NodeIdGen::new();
//! let loc = Span::default();
//! let module = Module {
//!     id: ids.alloc(),
//!     loc,
//!     body: vec![Stmt::VarDecl(VarDecl {
//!         id: ids.alloc(),
//!         loc,
//!         kind: DeclKind::Const,
//!         declarators: vec![VarDeclarator {
//!             id: ids.alloc(),
//!             loc,
//!             name: Pat::Ident(Ident { id: ids.alloc(), loc, name: "a".into() }),
//!             ty: None,
//!             init: Some(Expr::Ident(Ident { id: ids.alloc(), loc, name: "b".into() })),
//!         }],
//!     })],
//! };
//!
//! let scopes = build_scopes(&module).unwrap();
//! let root = scopes.tree().root();
//! assert!(scopes.tree().resolve(root, "a").is_some());
//! assert!(scopes.tree().resolve(root, "b").is_none()); // free variable
//! ```

/// Syntax tree node definitions (the external parser contract).
pub mod ast;
/// Error types.
pub mod error;
/// Scope construction, reference resolution, and the query API.
pub mod scope;

#[cfg(test)]
mod fixtures;

pub use error::{StrataError, StrataResult};
