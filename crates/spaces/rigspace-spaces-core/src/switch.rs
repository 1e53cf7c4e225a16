//! The core switch algorithm.
//!
//! Order matters: the label resolves before any mutation; the pre-switch
//! state keys one frame earlier before any write; the continuity offset is
//! solved against the pre-switch world pose; only then do the weight vector
//! and the enum change, and an optional key lands at the current time.
//!
//! The continuity solve is closed-form:
//! `offset = target.world⁻¹ · space_node.world`, decomposed into the
//! constraint's translation + XYZ-euler convention.

use serde::{Deserialize, Serialize};

use rigspace_graph_core::{NodeId, TransformGraph, Value};

use crate::error::SpaceError;
use crate::keyer;
use crate::registry;
use crate::resetter;
use crate::schema;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SwitchOptions {
    /// Key all changed channels at the current time after the switch.
    pub key: bool,
    /// Key the pre-switch state one frame earlier, before any write.
    pub key_previous_frame: bool,
    /// Solve the continuity offset; when false, snap to the authored default.
    pub maintain_position: bool,
}

impl Default for SwitchOptions {
    fn default() -> Self {
        Self {
            key: false,
            key_previous_frame: false,
            maintain_position: true,
        }
    }
}

/// Activate the space named `label` on the SpaceNode governing `transform`.
///
/// Postconditions: exactly one weight is 1.0 and it sits at the enum index;
/// the live offset holds either the continuity solve or the authored
/// default. Switching to the already-active space is idempotent but still
/// re-solves. A locked or driven state channel fails `LockedChannel` rather
/// than silently desynchronizing the enum from the visible pose.
pub fn switch(
    graph: &mut dyn TransformGraph,
    transform: NodeId,
    label: &str,
    opts: &SwitchOptions,
) -> Result<(), SpaceError> {
    let space = registry::locate(graph, transform)?;
    let constraint = registry::locate_constraint(graph, space)?;
    let index = space.target_index(graph, label)?;

    if opts.key_previous_frame {
        let previous = graph.current_time() - 1.0;
        keyer::key_space_at(graph, space, previous)?;
    }

    if opts.maintain_position {
        // Solved against the pre-switch pose: the world pose read here is
        // what the post-switch pose must equal.
        let target = graph.constraint_target_node(constraint, index)?;
        let target_world = graph.world_pose(target)?;
        let node_world = graph.world_pose(space.id())?;
        let (t, r) = node_world.relative_to(&target_world).offset_parts();
        space.write_channel(graph, schema::OFFSET_TRANSLATE, Value::Vec3(t))?;
        space.write_channel(graph, schema::OFFSET_ROTATE, Value::Vec3(r))?;
    } else {
        resetter::apply_default(graph, space, index)?;
    }

    // Hard cut to one-hot; continuity comes from the offset, never blending.
    let count = space.targets(graph)?.len();
    for i in 0..count {
        let weight = if i == index { 1.0 } else { 0.0 };
        space.write_channel(graph, &schema::weight_attr(i), Value::Float(weight))?;
    }

    space.write_channel(graph, schema::SPACE, Value::Enum(index as u32))?;

    if opts.key {
        let now = graph.current_time();
        keyer::key_space_at(graph, space, now)?;
    }

    log::debug!(
        "switched {node} to '{label}' (index {index})",
        node = graph.node_name(space.id())?,
    );
    Ok(())
}
