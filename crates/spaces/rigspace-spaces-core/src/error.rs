//! Error taxonomy for space operations.
//!
//! Everything is synchronous and caller-recoverable, raised at the
//! operation boundary. There is no rollback: recovery from a partially
//! committed switch is to re-invoke `switch` toward any valid target,
//! which re-derives a fully consistent state.

use serde::{Deserialize, Serialize};

use rigspace_graph_core::GraphError;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SpaceError {
    /// A referenced target transform does not exist (checked before mutation).
    #[error("space target does not exist: {name}")]
    TargetDoesNotExist { name: String },

    /// The transform neither is nor belongs to a SpaceNode.
    #[error("{node} is not under space control")]
    NotASpaceChild { node: String },

    /// No constraint drives the SpaceNode's channels.
    #[error("no constraint found on {node}")]
    NoConstraint { node: String },

    /// Translate and rotate channels resolve to different constraints.
    #[error("translate and rotate of {node} are driven by different constraints")]
    ConstraintMismatch { node: String },

    /// The label is absent from the node's enum (checked before mutation).
    #[error("unknown space '{label}' on {node}")]
    UnknownTarget { label: String, node: String },

    /// Argument-shape or label/target conflicts (checked before mutation).
    #[error("label mismatch: {reason}")]
    LabelMismatch { reason: String },

    /// A required weight/offset/enum write target is locked or driven.
    #[error("locked channel: {attr} on {node}")]
    LockedChannel { node: String, attr: String },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl SpaceError {
    /// Structural errors indicate a corrupted or foreign node layout rather
    /// than an expected per-node mismatch; the batch controller logs them at
    /// error level while still isolating them per node.
    #[inline]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::NotASpaceChild { .. }
                | Self::NoConstraint { .. }
                | Self::ConstraintMismatch { .. }
        )
    }

    /// Coarse category for logging and reports.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::TargetDoesNotExist { .. } => "validation",
            Self::NotASpaceChild { .. }
            | Self::NoConstraint { .. }
            | Self::ConstraintMismatch { .. } => "structure",
            Self::UnknownTarget { .. } | Self::LabelMismatch { .. } => "label",
            Self::LockedChannel { .. } => "lock",
            Self::Graph(_) => "graph",
        }
    }
}

/// Map a graph-level write failure to the loud `LockedChannel` error the
/// switch contract requires; everything else passes through unchanged.
pub(crate) fn lock_aware(err: GraphError, node: &str) -> SpaceError {
    match err {
        GraphError::LockedAttribute { attr, .. } => SpaceError::LockedChannel {
            node: node.to_string(),
            attr,
        },
        other => SpaceError::Graph(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_classification() {
        assert!(SpaceError::NoConstraint {
            node: "x".into()
        }
        .is_structural());
        assert!(!SpaceError::UnknownTarget {
            label: "Head".into(),
            node: "x".into()
        }
        .is_structural());
        assert!(!SpaceError::LockedChannel {
            node: "x".into(),
            attr: "spaceWeight0".into()
        }
        .is_structural());
    }

    #[test]
    fn categories() {
        assert_eq!(
            SpaceError::TargetDoesNotExist { name: "x".into() }.category(),
            "validation"
        );
        assert_eq!(
            SpaceError::ConstraintMismatch { node: "x".into() }.category(),
            "structure"
        );
        assert_eq!(
            SpaceError::UnknownTarget {
                label: "Head".into(),
                node: "x".into()
            }
            .category(),
            "label"
        );
    }

    #[test]
    fn lock_mapping() {
        let err = lock_aware(
            GraphError::LockedAttribute {
                node: "n".into(),
                attr: "spaceWeight1".into(),
            },
            "ctl_space",
        );
        assert_eq!(
            err,
            SpaceError::LockedChannel {
                node: "ctl_space".into(),
                attr: "spaceWeight1".into()
            }
        );
    }
}
