//! The scope tree: scopes, bindings, references, and their query API.
//!
//! The tree is an arena: [`Scope`]s, [`Binding`]s, and [`Reference`]s live
//! in three flat vectors inside [`ScopeTree`], addressed by index handles.
//! Parent/child edges and binding↔reference back-links are indices too, so
//! the structure has no ownership cycles — dropping the tree frees
//! everything.
//!
//! This module knows nothing about syntax-tree traversal; it only offers
//! the mutation API the two passes use ([`ScopeTree::new_child_scope`],
//! [`ScopeTree::add_binding`], [`ScopeTree::add_reference`]) and the query
//! API consumers use afterwards.

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::ast::NodeId;
use crate::error::{StrataError, StrataResult};

// ─────────────────────────────────────────────────────────────────────────────
// Handles
// ─────────────────────────────────────────────────────────────────────────────

/// Opaque index of a [`Scope`] in a [`ScopeTree`].
pub type ScopeId = usize;

/// Opaque index of a [`Binding`] in a [`ScopeTree`].
pub type BindingId = usize;

/// Opaque index of a [`Reference`] in a [`ScopeTree`].
pub type ReferenceId = usize;

/// The reserved name under which a class scope's implicit self-reference
/// binding is stored, and under which `this` expressions resolve.
pub const SELF_REFERENCE_NAME: &str = "this";

// ─────────────────────────────────────────────────────────────────────────────
// Scope kind and mutability
// ─────────────────────────────────────────────────────────────────────────────

/// The kind of a scope — and, on a [`Binding`], the kind of scope the
/// binding is hoisted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// A block-local scope; never a hoisting target.
    Lexical,
    /// A function-boundary scope; hoisting target for function-scoped
    /// declarations, and owner of `this` self-reference bindings.
    Function,
}

impl ScopeKind {
    /// Returns `true` if scopes of this kind receive hoisted
    /// function-scoped bindings.
    pub fn is_hoist_target(self) -> bool {
        matches!(self, ScopeKind::Function)
    }
}

impl std::fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ScopeKind::Lexical => "lexical",
            ScopeKind::Function => "function",
        })
    }
}

/// Whether a binding may be reassigned.  Assigned at declaration time;
/// informational only, never enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    /// Reassignable (`var`, `let`, parameters, catch parameters).
    Mutable,
    /// Not reassignable (`const`, names of functions/classes, imports).
    Immutable,
}

impl std::fmt::Display for Mutability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Mutability::Mutable => "mutable",
            Mutability::Immutable => "immutable",
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Binding
// ─────────────────────────────────────────────────────────────────────────────

/// A single declared name, owned by the scope it ultimately lives in.
///
/// Because of hoisting, the owning scope may be an ancestor of the scope
/// enclosing the syntactic declaration site.
#[derive(Debug)]
pub struct Binding {
    /// The identifier text.
    pub name: String,
    /// The declaration/parameter/import/catch node that introduced it.
    pub node: NodeId,
    /// The kind of scope this binding targets (its hoisting behavior).
    pub kind: ScopeKind,
    /// Declared mutability.
    pub mutability: Mutability,
    /// The scope that stores this binding.
    pub scope: ScopeId,
    /// References resolved to this binding, in resolution order.
    /// Non-owning: the references themselves live in their scopes' lists.
    references: Vec<ReferenceId>,
}

impl Binding {
    /// References resolved to this binding, in resolution order.
    pub fn references(&self) -> &[ReferenceId] {
        &self.references
    }

    /// Returns `true` if nothing in the tree refers to this binding.
    pub fn is_unused(&self) -> bool {
        self.references.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reference
// ─────────────────────────────────────────────────────────────────────────────

/// The resolution result carried by a resolved [`Reference`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// The binding the reference resolved to.
    pub binding: BindingId,
    /// The scope that owns that binding.
    pub scope: ScopeId,
}

/// One identifier occurrence, classified and (possibly) resolved.
///
/// A reference with `write_expr` absent is a plain read.  A reference with
/// a `write_expr` is a write; if `is_initializer` is also set, it is the
/// declaration-time initialization of the binding itself (`const a = b`)
/// rather than a reassignment.
#[derive(Debug)]
pub struct Reference {
    /// The identifier node.
    pub node: NodeId,
    /// The identifier text.
    pub name: String,
    /// The scope the occurrence was encountered from.
    pub scope: ScopeId,
    /// For writes and initializations: the node of the written expression.
    pub write_expr: Option<NodeId>,
    /// `true` when this is a declaration-time initialization.
    pub is_initializer: bool,
    /// The resolved binding, or `None` for a free variable.
    pub target: Option<ResolvedTarget>,
}

impl Reference {
    /// Returns `true` for a plain value read.
    pub fn is_read(&self) -> bool {
        self.write_expr.is_none()
    }

    /// Returns `true` for a reassignment write (not an initialization).
    pub fn is_write(&self) -> bool {
        self.write_expr.is_some() && !self.is_initializer
    }

    /// Returns `true` if the reference did not resolve to any binding.
    pub fn is_unresolved(&self) -> bool {
        self.target.is_none()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scope
// ─────────────────────────────────────────────────────────────────────────────

/// A single scope node in the [`ScopeTree`].
#[derive(Debug)]
pub struct Scope {
    /// Unique identifier within the tree.
    pub id: ScopeId,
    /// The kind of this scope.
    pub kind: ScopeKind,
    /// The syntax-tree node that introduced this scope.
    pub node: NodeId,
    /// The parent scope, or `None` for the root.
    pub parent: Option<ScopeId>,
    /// Direct child scopes, in creation order.
    pub children: SmallVec<[ScopeId; 4]>,
    /// Name → binding table.  Unique names per scope.
    names: HashMap<String, BindingId>,
    /// Bindings in insertion order, for deterministic iteration.
    binding_order: Vec<BindingId>,
    /// References encountered from this scope, in traversal order.
    references: Vec<ReferenceId>,
}

impl Scope {
    fn new(id: ScopeId, kind: ScopeKind, node: NodeId, parent: Option<ScopeId>) -> Self {
        Self {
            id,
            kind,
            node,
            parent,
            children: SmallVec::new(),
            names: HashMap::new(),
            binding_order: Vec::new(),
            references: Vec::new(),
        }
    }

    /// Bindings stored directly in this scope, in insertion order.
    pub fn bindings(&self) -> &[BindingId] {
        &self.binding_order
    }

    /// The binding stored in this scope under `name`, if any.
    pub fn binding_named(&self, name: &str) -> Option<BindingId> {
        self.names.get(name).copied()
    }

    /// References encountered from this scope, in traversal order.
    pub fn references(&self) -> &[ReferenceId] {
        &self.references
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ScopeTree
// ─────────────────────────────────────────────────────────────────────────────

/// The arena holding every scope, binding, and reference of one analysis.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    bindings: Vec<Binding>,
    references: Vec<Reference>,
    root: ScopeId,
}

impl ScopeTree {
    /// Create a tree containing only the root scope.
    ///
    /// The root is always [`ScopeKind::Function`]; this is what guarantees
    /// that the hoisting walk always finds a target.
    pub fn new(root_node: NodeId) -> Self {
        let root = Scope::new(0, ScopeKind::Function, root_node, None);
        Self {
            scopes: vec![root],
            bindings: Vec::new(),
            references: Vec::new(),
            root: 0,
        }
    }

    /// The root scope.
    pub fn root(&self) -> ScopeId {
        self.root
    }

    /// Returns a reference to the scope with the given id.
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id]
    }

    /// Returns a reference to the binding with the given id.
    pub fn binding(&self, id: BindingId) -> &Binding {
        &self.bindings[id]
    }

    /// Returns a reference to the reference with the given id.
    pub fn reference(&self, id: ReferenceId) -> &Reference {
        &self.references[id]
    }

    /// Number of scopes in the tree.
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Number of bindings in the tree.
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Number of references in the tree.
    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    // ── Construction API ─────────────────────────────────────────────────────

    /// Create a new scope as the last child of `parent` and return its id.
    pub fn new_child_scope(&mut self, parent: ScopeId, kind: ScopeKind, node: NodeId) -> ScopeId {
        let id = self.scopes.len();
        self.scopes.push(Scope::new(id, kind, node, Some(parent)));
        self.scopes[parent].children.push(id);
        id
    }

    /// Register a binding declared from `scope`.
    ///
    /// Lexical bindings are stored in `scope` itself; function-scoped
    /// bindings are stored in the nearest hoist-target ancestor (inclusive).
    /// If a same-named binding already exists in the kind-appropriate
    /// narrow-lookup range, the first declaration wins and its id is
    /// returned.
    pub fn add_binding(
        &mut self,
        scope: ScopeId,
        name: &str,
        node: NodeId,
        kind: ScopeKind,
        mutability: Mutability,
    ) -> StrataResult<BindingId> {
        let (target, existing) = match kind {
            ScopeKind::Lexical => (scope, self.own_binding(scope, name)),
            ScopeKind::Function => {
                (self.hoist_target(scope)?, self.own_function_binding(scope, name))
            }
        };
        if let Some(id) = existing {
            return Ok(id);
        }

        let id = self.bindings.len();
        self.bindings.push(Binding {
            name: name.to_owned(),
            node,
            kind,
            mutability,
            scope: target,
            references: Vec::new(),
        });
        let s = &mut self.scopes[target];
        s.names.insert(name.to_owned(), id);
        s.binding_order.push(id);
        Ok(id)
    }

    /// Record one identifier occurrence encountered from `scope`.
    ///
    /// The occurrence is resolved against the scope chain; resolved or not,
    /// it is appended to `scope`'s reference list.  When resolved it is
    /// also linked from the target binding.
    pub fn add_reference(
        &mut self,
        scope: ScopeId,
        node: NodeId,
        name: &str,
        write_expr: Option<NodeId>,
        is_initializer: bool,
    ) -> ReferenceId {
        let target = self
            .resolve(scope, name)
            .map(|(binding, owner)| ResolvedTarget { binding, scope: owner });

        let id = self.references.len();
        if let Some(t) = &target {
            self.bindings[t.binding].references.push(id);
        }
        self.references.push(Reference {
            node,
            name: name.to_owned(),
            scope,
            write_expr,
            is_initializer,
            target,
        });
        self.scopes[scope].references.push(id);
        id
    }

    // ── Lookup API ───────────────────────────────────────────────────────────

    /// Resolve `name` from `scope`, walking the parent chain strictly
    /// upward.  Returns the binding and the scope that owns it, or `None`
    /// when the walk terminates unresolved at the root — which is how free
    /// variables arise.
    pub fn resolve(&self, scope: ScopeId, name: &str) -> Option<(BindingId, ScopeId)> {
        let mut cur = Some(scope);
        while let Some(id) = cur {
            if let Some(binding) = self.scopes[id].binding_named(name) {
                return Some((binding, id));
            }
            cur = self.scopes[id].parent;
        }
        None
    }

    /// Look `name` up in `scope` only, ignoring the chain.
    pub fn own_binding(&self, scope: ScopeId, name: &str) -> Option<BindingId> {
        self.scopes[scope].binding_named(name)
    }

    /// Look `name` up from `scope` walking only through Lexical ancestors,
    /// stopping at (and including) the first function boundary.
    ///
    /// This is the range a hoisted declaration from `scope` can land in —
    /// a narrower lookup than [`ScopeTree::resolve`], which continues past
    /// function boundaries.
    pub fn own_function_binding(&self, scope: ScopeId, name: &str) -> Option<BindingId> {
        let mut cur = scope;
        loop {
            if let Some(binding) = self.scopes[cur].binding_named(name) {
                return Some(binding);
            }
            if self.scopes[cur].kind.is_hoist_target() {
                return None;
            }
            cur = self.scopes[cur].parent?;
        }
    }

    /// The nearest hoist-target scope at or above `scope`.
    ///
    /// The root is always a hoist target, so failure indicates a corrupted
    /// tree and is surfaced as an invariant violation.
    pub fn hoist_target(&self, scope: ScopeId) -> StrataResult<ScopeId> {
        let mut cur = Some(scope);
        while let Some(id) = cur {
            if self.scopes[id].kind.is_hoist_target() {
                return Ok(id);
            }
            cur = self.scopes[id].parent;
        }
        Err(StrataError::Internal(format!(
            "no function scope at or above scope {scope}"
        )))
    }

    // ── Iteration API ────────────────────────────────────────────────────────

    /// Bindings stored directly in `scope`, in insertion order.
    pub fn bindings_in(&self, scope: ScopeId) -> impl Iterator<Item = (BindingId, &Binding)> {
        self.scopes[scope]
            .binding_order
            .iter()
            .map(move |&id| (id, &self.bindings[id]))
    }

    /// References encountered from `scope` itself, in traversal order.
    pub fn own_references(&self, scope: ScopeId) -> impl Iterator<Item = &Reference> {
        self.scopes[scope]
            .references
            .iter()
            .map(move |&id| &self.references[id])
    }

    /// A lazy pre-order walk over the references of `scope` and all of its
    /// descendants.  Each call starts a fresh walk.
    pub fn all_references(&self, scope: ScopeId) -> AllReferences<'_> {
        AllReferences {
            tree: self,
            stack: vec![scope],
            current: &[],
        }
    }

    /// References across the whole tree that did not resolve to any
    /// binding (free variables).
    pub fn unresolved_references(&self) -> impl Iterator<Item = &Reference> {
        self.references.iter().filter(|r| r.is_unresolved())
    }

    // ── Derived queries ──────────────────────────────────────────────────────

    /// Returns `true` when some reference to `binding` occurs under a
    /// different function boundary than the binding's owning scope — i.e.
    /// the binding is captured by a closure.
    pub fn is_captured(&self, binding: BindingId) -> bool {
        let b = &self.bindings[binding];
        let home = self.function_boundary(b.scope);
        b.references
            .iter()
            .any(|&r| self.function_boundary(self.references[r].scope) != home)
    }

    /// The nearest function-kind scope at or above `scope`.  The root is
    /// function-kind, so the walk always terminates there at the latest.
    pub fn function_boundary(&self, scope: ScopeId) -> ScopeId {
        let mut cur = scope;
        loop {
            if self.scopes[cur].kind.is_hoist_target() {
                return cur;
            }
            match self.scopes[cur].parent {
                Some(p) => cur = p,
                None => return cur,
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AllReferences iterator
// ─────────────────────────────────────────────────────────────────────────────

/// Lazy pre-order iterator over a scope's and its descendants' references.
///
/// Created by [`ScopeTree::all_references`]; finite and restartable (each
/// call to `all_references` yields an independent walk).
pub struct AllReferences<'a> {
    tree: &'a ScopeTree,
    /// Scopes not yet entered, top of stack next.
    stack: Vec<ScopeId>,
    /// Remaining references of the scope currently being drained.
    current: &'a [ReferenceId],
}

impl<'a> Iterator for AllReferences<'a> {
    type Item = &'a Reference;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((&id, rest)) = self.current.split_first() {
                self.current = rest;
                return Some(&self.tree.references[id]);
            }
            let scope = self.stack.pop()?;
            // Reverse so the leftmost child is entered first.
            for &child in self.tree.scopes[scope].children.iter().rev() {
                self.stack.push(child);
            }
            self.current = &self.tree.scopes[scope].references;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
