//! Static scope and binding analysis.
//!
//! # Overview
//!
//! Call [`build_scopes`] with a parsed [`crate::ast::Module`] to run the
//! two analysis passes and obtain a [`ScopeContainer`]:
//!
//! 1. **Scope construction** ([`build`]) — one top-down traversal creates a
//!    [`Scope`] at every scope-introducing construct, registers every
//!    [`Binding`] (hoisting function-scoped declarations to the nearest
//!    enclosing function boundary), and records which scope encloses every
//!    single node of the tree.
//! 2. **Reference resolution** ([`resolve`]) — a second top-down traversal
//!    classifies each identifier occurrence as a read, a write, or a
//!    declaration-time initialization and resolves it against the finished
//!    scope chain, so forward references and mutual recursion need no
//!    special handling.
//!
//! The resulting structure is read-only and safe to share; all queries go
//! through the [`ScopeContainer`] and [`ScopeTree`] APIs.  For snapshot
//! tests, [`ScopeContainer::into_printable`] consumes the container into a
//! back-link-free [`print::ScopeSnapshot`].

/// Pass 1: scope construction.
pub mod build;
/// The facade tying both passes together.
pub mod container;
/// The debug snapshot transform.
pub mod print;
/// Pass 2: reference resolution.
pub mod resolve;
/// The scope tree data structure and its query API.
pub mod tree;

pub use build::ScopeBuilder;
pub use container::{build_scopes, ScopeContainer};
pub use print::ScopeSnapshot;
pub use tree::{
    Binding, BindingId, Mutability, Reference, ReferenceId, ResolvedTarget, Scope, ScopeId,
    ScopeKind, ScopeTree, SELF_REFERENCE_NAME,
};
