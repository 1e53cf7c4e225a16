//! First-time construction of a SpaceNode for a controlled transform.
//!
//! Construction inserts the SpaceNode between the control and its parent
//! without moving anything: the parent is duplicated (no children), the
//! duplicate is re-inserted under the original parent (world-pose-preserving
//! re-parenting makes its local identity), and the control moves under it
//! with its local values untouched. The constraint then binds the SpaceNode
//! one-hot to Default/World/user targets.

use rigspace_graph_core::{Channel, NodeId, TransformGraph, Value};

use crate::error::SpaceError;
use crate::mutator;
use crate::registry;
use crate::schema;
use crate::space_node::SpaceNode;
use crate::switch::{self, SwitchOptions};

/// Put `transform` under space control over `targets`, labelled `labels`.
///
/// Default (the original parent) and World (the per-graph anchor singleton)
/// are prepended at fixed indices 0 and 1. `world_parent` is honored only
/// when the World anchor is first created. Idempotent: an existing
/// SpaceNode degrades to `mutator::add`.
pub fn create(
    graph: &mut dyn TransformGraph,
    transform: NodeId,
    targets: &[NodeId],
    labels: &[&str],
    name_tag: &str,
    world_parent: Option<NodeId>,
) -> Result<SpaceNode, SpaceError> {
    validate_args(graph, targets, labels)?;

    if registry::locate(graph, transform).is_ok() {
        return mutator::add(graph, transform, targets, labels, name_tag);
    }

    let control_name = graph.node_name(transform)?;

    // Default space: the current parent, or a fresh identity parent for roots.
    let parent = match graph.parent_of(transform)? {
        Some(p) => p,
        None => {
            let p = graph.create_transform(&format!("{control_name}_parent"));
            graph.reparent(transform, Some(p))?;
            p
        }
    };
    let world = ensure_world_anchor(graph, world_parent)?;

    let mut full_targets = Vec::with_capacity(targets.len() + 2);
    full_targets.push(parent);
    full_targets.push(world);
    full_targets.extend_from_slice(targets);

    let mut full_labels: Vec<String> = Vec::with_capacity(labels.len() + 2);
    full_labels.push(schema::LABEL_DEFAULT.to_string());
    full_labels.push(schema::LABEL_WORLD.to_string());
    full_labels.extend(labels.iter().map(|l| l.to_string()));

    // Insert the SpaceNode between parent and control.
    let space_id =
        graph.duplicate_without_children(parent, &format!("{control_name}_space"))?;
    graph.reparent(space_id, Some(parent))?;
    graph.reparent(transform, Some(space_id))?;
    graph.set_channel_locked(space_id, Channel::Translate, false)?;
    graph.set_channel_locked(space_id, Channel::Rotate, false)?;
    let space = SpaceNode(space_id);

    graph.add_attribute(
        space_id,
        schema::TARGETS,
        Value::NodeList(full_targets.clone()),
        false,
    )?;
    graph.add_enum_attribute(space_id, schema::SPACE, &full_labels, true)?;
    graph.add_attribute(
        space_id,
        schema::NAME_TAG,
        Value::Text(name_tag.to_string()),
        false,
    )?;
    graph.add_attribute(
        space_id,
        schema::OFFSET_TRANSLATE,
        Value::Vec3([0.0; 3]),
        true,
    )?;
    graph.add_attribute(space_id, schema::OFFSET_ROTATE, Value::Vec3([0.0; 3]), true)?;

    // Back-reference: the explicit control → SpaceNode relation.
    graph.add_attribute(transform, schema::SPACE_NODE, Value::Node(space_id), false)?;
    graph.set_attribute_locked(transform, schema::SPACE_NODE, true)?;

    // One constraint over all targets, maintain-offset, weights zero.
    let constraint = graph.create_constraint(space_id, &full_targets, true)?;
    for i in 0..full_targets.len() {
        wire_target(graph, space, constraint, i)?;
    }

    // Activate Default; the pose is already correct by construction.
    switch::switch(
        graph,
        transform,
        schema::LABEL_DEFAULT,
        &SwitchOptions {
            key: false,
            key_previous_frame: false,
            maintain_position: false,
        },
    )?;

    log::debug!(
        "created space node {space_name} over {count} targets for {control_name}",
        space_name = graph.node_name(space_id)?,
        count = full_targets.len(),
    );
    Ok(space)
}

/// Validate argument shape and target existence before any mutation.
pub(crate) fn validate_args(
    graph: &dyn TransformGraph,
    targets: &[NodeId],
    labels: &[&str],
) -> Result<(), SpaceError> {
    if targets.len() != labels.len() {
        return Err(SpaceError::LabelMismatch {
            reason: format!(
                "{} targets but {} labels",
                targets.len(),
                labels.len()
            ),
        });
    }
    for label in labels {
        if *label == schema::LABEL_DEFAULT || *label == schema::LABEL_WORLD {
            return Err(SpaceError::LabelMismatch {
                reason: format!("'{label}' is reserved for an implicit space"),
            });
        }
    }
    for (i, label) in labels.iter().enumerate() {
        if labels[..i].contains(label) {
            return Err(SpaceError::LabelMismatch {
                reason: format!("duplicate label '{label}'"),
            });
        }
    }
    for &target in targets {
        if !graph.node_exists(target) {
            return Err(SpaceError::TargetDoesNotExist {
                name: format!("{target:?}"),
            });
        }
    }
    Ok(())
}

/// Snapshot the maintain-offset into the locked default-offset pair, then
/// wire the shared live offset and a fresh weight attribute for target `i`.
pub(crate) fn wire_target(
    graph: &mut dyn TransformGraph,
    space: SpaceNode,
    constraint: rigspace_graph_core::ConstraintId,
    index: usize,
) -> Result<(), SpaceError> {
    let (dt, dr) = graph.constraint_target_offset(constraint, index)?;

    let t_attr = schema::default_translate_attr(index);
    graph.add_attribute(space.id(), &t_attr, Value::Vec3(dt), false)?;
    graph.set_attribute_locked(space.id(), &t_attr, true)?;

    let r_attr = schema::default_rotate_attr(index);
    graph.add_attribute(space.id(), &r_attr, Value::Vec3(dr), false)?;
    graph.set_attribute_locked(space.id(), &r_attr, true)?;

    graph.connect_constraint_offset(
        constraint,
        index,
        space.id(),
        schema::OFFSET_TRANSLATE,
        schema::OFFSET_ROTATE,
    )?;

    let w_attr = schema::weight_attr(index);
    graph.add_attribute(space.id(), &w_attr, Value::Float(0.0), true)?;
    graph.connect_constraint_weight(constraint, index, space.id(), &w_attr)?;
    Ok(())
}

/// Find or lazily create the per-graph World anchor. `world_parent` applies
/// only on first creation; an existing anchor is returned untouched.
fn ensure_world_anchor(
    graph: &mut dyn TransformGraph,
    world_parent: Option<NodeId>,
) -> Result<NodeId, SpaceError> {
    if let Some(&existing) = graph.nodes_with_attribute(schema::WORLD_MARKER).first() {
        return Ok(existing);
    }
    let world = graph.create_transform("worldSpace");
    graph.add_attribute(world, schema::WORLD_MARKER, Value::Bool(true), false)?;
    graph.set_attribute_locked(world, schema::WORLD_MARKER, true)?;
    if let Some(parent) = world_parent {
        // World-pose-preserving: the anchor still sits at the origin.
        graph.reparent(world, Some(parent))?;
    }
    Ok(world)
}
