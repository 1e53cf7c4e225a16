//! Atomic keying of a SpaceNode's discrete state.
//!
//! Every weight, both offset components, and the enum key together at one
//! time with zero-order-hold interpolation: these are discrete-state
//! channels, and smoothing any of them would expose an invalid intermediate
//! blend on the timeline. The whole set lands in one synchronous call, so
//! no partial-update state is ever observable.

use rigspace_graph_core::{Interpolation, NodeId, TransformGraph};

use crate::error::SpaceError;
use crate::registry;
use crate::schema;
use crate::space_node::SpaceNode;

/// Key the full switch state of the SpaceNode governing `transform` at
/// `at_time`, or at the current time when `None`.
pub fn key(
    graph: &mut dyn TransformGraph,
    transform: NodeId,
    at_time: Option<f32>,
) -> Result<(), SpaceError> {
    let space = registry::locate(graph, transform)?;
    let time = at_time.unwrap_or_else(|| graph.current_time());
    key_space_at(graph, space, time)
}

pub(crate) fn key_space_at(
    graph: &mut dyn TransformGraph,
    space: SpaceNode,
    time: f32,
) -> Result<(), SpaceError> {
    let count = space.targets(graph)?.len();
    for i in 0..count {
        graph.set_keyframe(space.id(), &schema::weight_attr(i), time, Interpolation::Step)?;
    }
    graph.set_keyframe(space.id(), schema::OFFSET_TRANSLATE, time, Interpolation::Step)?;
    graph.set_keyframe(space.id(), schema::OFFSET_ROTATE, time, Interpolation::Step)?;
    graph.set_keyframe(space.id(), schema::SPACE, time, Interpolation::Step)?;
    Ok(())
}
