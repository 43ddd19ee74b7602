//! The Scope Container: both passes behind one entry point.

use std::collections::HashMap;

use log::debug;

use crate::ast::{Module, NodeId};
use crate::error::{StrataError, StrataResult};
use crate::scope::build::ScopeBuilder;
use crate::scope::print::ScopeSnapshot;
use crate::scope::resolve::ReferenceResolver;
use crate::scope::tree::{ScopeId, ScopeTree};

/// Run scope construction and reference resolution over `module`.
///
/// Construction either completes the whole tree or fails with an invariant
/// violation; there is no partial result.  The returned container is
/// read-only and safe to share between threads.
pub fn build_scopes(module: &Module) -> StrataResult<ScopeContainer> {
    let (mut tree, node_scopes) = ScopeBuilder::build(module)?;
    debug!(
        "scope construction: {} scopes, {} bindings over {} nodes",
        tree.scope_count(),
        tree.binding_count(),
        node_scopes.len()
    );

    ReferenceResolver::run(&mut tree, &node_scopes, module)?;
    debug!(
        "reference resolution: {} references, {} unresolved",
        tree.reference_count(),
        tree.unresolved_references().count()
    );

    Ok(ScopeContainer { tree, node_scopes })
}

/// The finished analysis: the scope tree plus the total node→scope map.
///
/// The map is owned by this container — it exists per analyzed tree, not
/// as any kind of shared registry.
#[derive(Debug)]
pub struct ScopeContainer {
    tree: ScopeTree,
    node_scopes: HashMap<NodeId, ScopeId>,
}

impl ScopeContainer {
    /// The scope enclosing `node`.
    ///
    /// Fails with [`StrataError::UnknownNode`] when `node` was not part of
    /// the analyzed tree — never silently answers with a wrong scope.
    pub fn scope_of(&self, node: NodeId) -> StrataResult<ScopeId> {
        self.node_scopes
            .get(&node)
            .copied()
            .ok_or(StrataError::UnknownNode(node))
    }

    /// The underlying scope tree, for resolution and iteration queries.
    pub fn tree(&self) -> &ScopeTree {
        &self.tree
    }

    /// Number of nodes the analysis mapped.
    pub fn node_count(&self) -> usize {
        self.node_scopes.len()
    }

    /// One-way debug transform: consume the container into a plain nested
    /// snapshot with all back-links stripped, for test inspection.
    ///
    /// Taking `self` by value is what makes this safe: a structure still
    /// in use cannot be handed over.
    pub fn into_printable(self) -> ScopeSnapshot {
        ScopeSnapshot::capture(&self.tree)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
