//! Restoring the authored default offset of the active space.

use serde::{Deserialize, Serialize};

use rigspace_graph_core::{NodeId, TransformGraph, Value};

use crate::error::SpaceError;
use crate::keyer;
use crate::registry;
use crate::schema;
use crate::space_node::SpaceNode;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResetOptions {
    pub key: bool,
    pub key_previous_frame: bool,
}

/// Write the authored default offset for the currently active space into the
/// live offset: the value captured at build/add time, not zero and not the
/// last continuity solve.
pub fn reset(
    graph: &mut dyn TransformGraph,
    transform: NodeId,
    opts: &ResetOptions,
) -> Result<(), SpaceError> {
    let space = registry::locate(graph, transform)?;
    if opts.key_previous_frame {
        let previous = graph.current_time() - 1.0;
        keyer::key_space_at(graph, space, previous)?;
    }
    let index = space.current_index(graph)?;
    apply_default(graph, space, index)?;
    if opts.key {
        let now = graph.current_time();
        keyer::key_space_at(graph, space, now)?;
    }
    Ok(())
}

pub(crate) fn apply_default(
    graph: &mut dyn TransformGraph,
    space: SpaceNode,
    index: usize,
) -> Result<(), SpaceError> {
    let (t, r) = space.default_offset(graph, index)?;
    space.write_channel(graph, schema::OFFSET_TRANSLATE, Value::Vec3(t))?;
    space.write_channel(graph, schema::OFFSET_ROTATE, Value::Vec3(r))?;
    Ok(())
}
