//! Best-effort switching across every SpaceNode in a scope.
//!
//! Per-node failures are caught, logged with the offending node's name, and
//! recorded; one bad node never aborts the batch. Expected mismatches
//! (unknown label, locked channel) log at warn; structural corruption
//! (no/foreign constraint wiring) logs at error. The distinction travels in
//! the report so callers need not re-classify.

use serde::{Deserialize, Serialize};

use rigspace_graph_core::{NodeId, TransformGraph};

use crate::error::SpaceError;
use crate::registry;
use crate::switch::{switch, SwitchOptions};

/// Which SpaceNodes a batch touches. Selections arrive as explicit node
/// lists; `Under` walks the hierarchy from a root (inclusive).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ScopeFilter {
    All,
    Under(NodeId),
    Nodes(Vec<NodeId>),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub node: String,
    pub structural: bool,
    pub error: SpaceError,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Names of the SpaceNodes that switched.
    pub switched: Vec<String>,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Attempt `switch(label)` on every SpaceNode in scope. Cross-node ordering
/// is unspecified and must not be relied on.
pub fn switch_all_to(
    graph: &mut dyn TransformGraph,
    label: &str,
    scope: &ScopeFilter,
    opts: &SwitchOptions,
) -> BatchReport {
    let candidates: Vec<NodeId> = match scope {
        ScopeFilter::All => registry::all_space_nodes(graph)
            .into_iter()
            .map(|s| s.id())
            .collect(),
        ScopeFilter::Under(root) => registry::all_space_nodes(graph)
            .into_iter()
            .map(|s| s.id())
            .filter(|&n| graph.is_descendant_of(n, *root))
            .collect(),
        ScopeFilter::Nodes(nodes) => nodes.clone(),
    };

    let mut report = BatchReport::default();
    for node in candidates {
        let name = graph
            .node_name(node)
            .unwrap_or_else(|_| format!("{node:?}"));
        match switch(graph, node, label, opts) {
            Ok(()) => report.switched.push(name),
            Err(error) => {
                let structural = error.is_structural();
                if structural {
                    log::error!("batch switch to '{label}' skipped {name}: {error}");
                } else {
                    log::warn!("batch switch to '{label}' skipped {name}: {error}");
                }
                report.failures.push(BatchFailure {
                    node: name,
                    structural,
                    error,
                });
            }
        }
    }
    report
}
