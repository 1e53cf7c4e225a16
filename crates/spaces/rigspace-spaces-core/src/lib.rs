//! rigspace-spaces-core (engine-agnostic)
//!
//! The space-switching constraint controller: a control transform is driven
//! by a weighted blend of parent coordinate frames ("spaces"), switches
//! between them while preserving world pose, keys the switch state
//! atomically with zero-order hold, and resets transient offsets to their
//! authored defaults. All operations are pure functions over explicit node
//! handles and a `TransformGraph` capability object.
//!
//! Entry points:
//! - `create` / `add`: build or grow a SpaceNode (mutually idempotent)
//! - `switch`: activate a space, optionally solving the continuity offset
//! - `key` / `reset`: atomic step keying; authored-default restore
//! - `switch_all_to`: best-effort batch with per-node failure isolation
//! - `locate` / `locate_constraint`: structural lookup

pub mod batch;
pub mod builder;
pub mod error;
pub mod keyer;
pub mod mutator;
pub mod registry;
pub mod resetter;
pub mod schema;
pub mod space_node;
pub mod switch;

// Re-exports for consumers.
pub use batch::{switch_all_to, BatchFailure, BatchReport, ScopeFilter};
pub use builder::create;
pub use error::SpaceError;
pub use keyer::key;
pub use mutator::add;
pub use registry::{all_space_nodes, locate, locate_constraint};
pub use resetter::{reset, ResetOptions};
pub use space_node::SpaceNode;
pub use switch::{switch, SwitchOptions};
