//! Locating SpaceNodes and their constraints.
//!
//! Identity is explicit: a controlled transform carries a locked
//! back-reference attribute to its SpaceNode, and SpaceNodes are marked by
//! their target-list attribute. Names are never consulted.

use rigspace_graph_core::{Channel, ConstraintId, NodeId, TransformGraph};

use crate::error::SpaceError;
use crate::schema;
use crate::space_node::SpaceNode;

/// Resolve the SpaceNode governing `transform`.
///
/// Order: the transform itself if it carries the markers; else its
/// back-reference; else its parent. Anything else is `NotASpaceChild`.
pub fn locate(graph: &dyn TransformGraph, transform: NodeId) -> Result<SpaceNode, SpaceError> {
    let name = graph.node_name(transform)?;

    if SpaceNode::is_marked(graph, transform) {
        return Ok(SpaceNode(transform));
    }

    if graph.has_attribute(transform, schema::SPACE_NODE) {
        if let Some(space) = graph
            .attribute(transform, schema::SPACE_NODE)?
            .as_node()
            .filter(|&n| graph.node_exists(n) && SpaceNode::is_marked(graph, n))
        {
            return Ok(SpaceNode(space));
        }
    }

    if let Some(parent) = graph.parent_of(transform)? {
        if SpaceNode::is_marked(graph, parent) {
            return Ok(SpaceNode(parent));
        }
    }

    Err(SpaceError::NotASpaceChild { node: name })
}

/// Resolve the weighted constraint bound to a SpaceNode via its incoming
/// channel drivers. Translate and rotate must agree on one constraint.
pub fn locate_constraint(
    graph: &dyn TransformGraph,
    space: SpaceNode,
) -> Result<ConstraintId, SpaceError> {
    let name = graph.node_name(space.0)?;
    let translate = graph.channel_driver(space.0, Channel::Translate)?;
    let rotate = graph.channel_driver(space.0, Channel::Rotate)?;
    match (translate, rotate) {
        (Some(t), Some(r)) if t == r => Ok(t),
        (None, None) => Err(SpaceError::NoConstraint { node: name }),
        _ => Err(SpaceError::ConstraintMismatch { node: name }),
    }
}

/// Every SpaceNode in the graph, in node order.
pub fn all_space_nodes(graph: &dyn TransformGraph) -> Vec<SpaceNode> {
    graph
        .nodes_with_attribute(schema::TARGETS)
        .into_iter()
        .map(SpaceNode)
        .collect()
}
