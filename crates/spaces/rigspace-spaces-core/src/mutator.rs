//! Append-only growth of an existing SpaceNode.
//!
//! Appending never renumbers: prior keyframes reference enum indices by
//! position, so labels concatenate onto the enum and targets push onto the
//! end of the constraint. A (target, label) pair already present is skipped,
//! which is what keeps repeated `create` calls from duplicating targets; a
//! label bound to a different node is a hard error.

use rigspace_graph_core::{NodeId, TransformGraph};

use crate::builder;
use crate::error::SpaceError;
use crate::registry;
use crate::space_node::SpaceNode;

/// Append `targets`/`labels` to the SpaceNode governing `transform`,
/// creating the whole setup via `builder::create` when none exists yet.
pub fn add(
    graph: &mut dyn TransformGraph,
    transform: NodeId,
    targets: &[NodeId],
    labels: &[&str],
    name_tag: &str,
) -> Result<SpaceNode, SpaceError> {
    let space = match registry::locate(graph, transform) {
        Ok(space) => space,
        Err(SpaceError::NotASpaceChild { .. }) => {
            return builder::create(graph, transform, targets, labels, name_tag, None);
        }
        Err(err) => return Err(err),
    };
    builder::validate_args(graph, targets, labels)?;
    let constraint = registry::locate_constraint(graph, space)?;

    let mut existing_targets = space.targets(graph)?;
    let mut existing_labels = space.labels(graph)?;

    for (&target, &label) in targets.iter().zip(labels.iter()) {
        if let Some(pos) = existing_labels.iter().position(|l| l == label) {
            if existing_targets[pos] == target {
                log::debug!(
                    "space '{label}' already present on {node}, skipping",
                    node = graph.node_name(space.id())?,
                );
                continue;
            }
            return Err(SpaceError::LabelMismatch {
                reason: format!("label '{label}' is already bound to a different target"),
            });
        }

        let index = graph.append_constraint_target(constraint, target, true)?;
        debug_assert_eq!(index, existing_targets.len());
        builder::wire_target(graph, space, constraint, index)?;
        space.append_target(graph, target)?;
        graph.append_enum_labels(space.id(), crate::schema::SPACE, &[label.to_string()])?;

        existing_targets.push(target);
        existing_labels.push(label.to_string());
        log::debug!(
            "appended space '{label}' at index {index} on {node}",
            node = graph.node_name(space.id())?,
        );
    }

    Ok(space)
}
