//! Error types for the host graph.

use serde::{Deserialize, Serialize};

use crate::ids::{ConstraintId, NodeId};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum GraphError {
    #[error("node not found: {id:?}")]
    NodeNotFound { id: NodeId },

    #[error("attribute not found: {attr} on {node}")]
    AttributeNotFound { node: String, attr: String },

    #[error("attribute already exists: {attr} on {node}")]
    AttributeExists { node: String, attr: String },

    #[error("attribute is locked: {attr} on {node}")]
    LockedAttribute { node: String, attr: String },

    #[error("attribute is not keyable: {attr} on {node}")]
    NotKeyable { node: String, attr: String },

    #[error("attribute is not an enum: {attr} on {node}")]
    NotAnEnum { node: String, attr: String },

    #[error("enum index {index} out of range ({len} labels) for {attr} on {node}")]
    EnumIndexOutOfRange {
        node: String,
        attr: String,
        index: u32,
        len: usize,
    },

    #[error("value type mismatch for {attr} on {node}: expected {expected}, got {actual}")]
    TypeMismatch {
        node: String,
        attr: String,
        expected: String,
        actual: String,
    },

    #[error("constraint not found: {id:?}")]
    ConstraintNotFound { id: ConstraintId },

    #[error("constraint target index {index} out of range ({len} targets)")]
    TargetOutOfRange { index: usize, len: usize },

    #[error("re-parenting {node} under {parent} would create a cycle")]
    ReparentCycle { node: String, parent: String },
}
