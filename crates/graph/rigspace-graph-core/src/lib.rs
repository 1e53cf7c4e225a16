//! rigspace-graph-core (engine-agnostic)
//!
//! The host-graph side of rigspace: attribute values, rigid poses, weighted
//! multi-parent constraints, the `TransformGraph` capability trait the
//! spaces system is written against, and the in-memory `SceneGraph`
//! reference host used by tests and embeddings.

pub mod attribute;
pub mod constraint;
pub mod error;
pub mod graph;
pub mod ids;
pub mod transform;
pub mod value;

// Re-exports for consumers.
pub use attribute::{Attribute, Interpolation, Keyframe};
pub use constraint::{blend_poses, ConstraintTarget, Plug, WeightedConstraint};
pub use error::GraphError;
pub use graph::{Channel, SceneGraph, TransformGraph};
pub use ids::{ConstraintId, IdAllocator, NodeId};
pub use transform::RigidPose;
pub use value::{Value, ValueKind};
