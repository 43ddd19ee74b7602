//! The debug snapshot transform.
//!
//! [`ScopeSnapshot`] is a plain nested value with every back-link stripped:
//! bindings keep only their declared facts, references collapse their
//! resolution to a yes/no, and child scopes are owned inline.  It exists
//! for snapshot comparison in tests — [`ScopeSnapshot`]'s `Display` output
//! is a stable indented outline.  Obtained one-way through
//! [`crate::scope::ScopeContainer::into_printable`], which consumes the
//! analysis.

use std::fmt;

use crate::scope::tree::{Mutability, Reference, ScopeId, ScopeKind, ScopeTree};

/// How a reference accesses its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// A plain value read.
    Read,
    /// A reassignment write.
    Write,
    /// A declaration-time initialization.
    Init,
}

impl Access {
    fn of(reference: &Reference) -> Self {
        if reference.is_initializer {
            Access::Init
        } else if reference.is_write() {
            Access::Write
        } else {
            Access::Read
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Access::Read => "read",
            Access::Write => "write",
            Access::Init => "init",
        })
    }
}

/// One binding, reduced to its declared facts.
#[derive(Debug)]
pub struct BindingSnapshot {
    /// The identifier text.
    pub name: String,
    /// Hoisting kind.
    pub kind: ScopeKind,
    /// Declared mutability.
    pub mutability: Mutability,
    /// Whether anything referred to it.
    pub used: bool,
}

/// One reference, with its resolution collapsed to a flag.
#[derive(Debug)]
pub struct ReferenceSnapshot {
    /// The identifier text.
    pub name: String,
    /// Access classification.
    pub access: Access,
    /// `false` for free variables.
    pub resolved: bool,
}

/// A back-link-free copy of one scope and its descendants.
#[derive(Debug)]
pub struct ScopeSnapshot {
    /// The scope kind.
    pub kind: ScopeKind,
    /// Bindings stored in the scope, in insertion order.
    pub bindings: Vec<BindingSnapshot>,
    /// References encountered from the scope, in traversal order.
    pub references: Vec<ReferenceSnapshot>,
    /// Child scopes, in creation order.
    pub children: Vec<ScopeSnapshot>,
}

impl ScopeSnapshot {
    /// Copy the whole tree out of `tree`, starting at the root.
    pub(crate) fn capture(tree: &ScopeTree) -> Self {
        Self::capture_scope(tree, tree.root())
    }

    fn capture_scope(tree: &ScopeTree, scope: ScopeId) -> Self {
        let bindings = tree
            .bindings_in(scope)
            .map(|(_, binding)| BindingSnapshot {
                name: binding.name.clone(),
                kind: binding.kind,
                mutability: binding.mutability,
                used: !binding.is_unused(),
            })
            .collect();
        let references = tree
            .own_references(scope)
            .map(|reference| ReferenceSnapshot {
                name: reference.name.clone(),
                access: Access::of(reference),
                resolved: reference.target.is_some(),
            })
            .collect();
        let children = tree
            .scope(scope)
            .children
            .iter()
            .map(|&child| Self::capture_scope(tree, child))
            .collect();
        Self {
            kind: tree.scope(scope).kind,
            bindings,
            references,
            children,
        }
    }

    fn write(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        writeln!(f, "{pad}{} scope", self.kind)?;
        for binding in &self.bindings {
            let unused = if binding.used { "" } else { " (unused)" };
            writeln!(
                f,
                "{pad}  binding {} [{} {}]{unused}",
                binding.name, binding.kind, binding.mutability
            )?;
        }
        for reference in &self.references {
            let free = if reference.resolved { "" } else { ", free" };
            writeln!(f, "{pad}  ref {} ({}{free})", reference.name, reference.access)?;
        }
        for child in &self.children {
            child.write(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for ScopeSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, 0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
