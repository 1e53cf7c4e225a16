//! The SpaceNode handle: a typed view over the schema module's attribute set.

use serde::{Deserialize, Serialize};

use rigspace_graph_core::{GraphError, NodeId, TransformGraph, Value};

use crate::error::SpaceError;
use crate::schema;

/// Handle to the transform mediating between a control and its spaces.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceNode(pub NodeId);

fn kind_mismatch(graph: &dyn TransformGraph, node: NodeId, attr: &str, expected: &str) -> SpaceError {
    SpaceError::Graph(GraphError::TypeMismatch {
        node: graph.node_name(node).unwrap_or_else(|_| format!("{node:?}")),
        attr: attr.to_string(),
        expected: expected.to_string(),
        actual: String::from("other"),
    })
}

impl SpaceNode {
    pub fn id(&self) -> NodeId {
        self.0
    }

    /// True when `node` carries the SpaceNode marker attributes.
    pub fn is_marked(graph: &dyn TransformGraph, node: NodeId) -> bool {
        graph.has_attribute(node, schema::TARGETS)
    }

    /// Ordered target list (positionally keyed, append-only).
    pub fn targets(&self, graph: &dyn TransformGraph) -> Result<Vec<NodeId>, SpaceError> {
        let value = graph.attribute(self.0, schema::TARGETS)?;
        value
            .as_node_list()
            .map(|s| s.to_vec())
            .ok_or_else(|| kind_mismatch(graph, self.0, schema::TARGETS, "NodeList"))
    }

    /// Display labels, 1:1 with the target list.
    pub fn labels(&self, graph: &dyn TransformGraph) -> Result<Vec<String>, SpaceError> {
        Ok(graph.enum_labels(self.0, schema::SPACE)?)
    }

    /// Resolve a label to its index. The enum is the single source of truth
    /// for name→index, so this fails `UnknownTarget` for anything absent.
    pub fn target_index(
        &self,
        graph: &dyn TransformGraph,
        label: &str,
    ) -> Result<usize, SpaceError> {
        self.labels(graph)?
            .iter()
            .position(|l| l == label)
            .ok_or_else(|| SpaceError::UnknownTarget {
                label: label.to_string(),
                node: graph
                    .node_name(self.0)
                    .unwrap_or_else(|_| format!("{:?}", self.0)),
            })
    }

    /// Index of the active space, read from the enum attribute.
    pub fn current_index(&self, graph: &dyn TransformGraph) -> Result<usize, SpaceError> {
        let value = graph.attribute(self.0, schema::SPACE)?;
        value
            .as_enum_index()
            .map(|i| i as usize)
            .ok_or_else(|| kind_mismatch(graph, self.0, schema::SPACE, "Enum"))
    }

    /// The weight vector, one entry per target.
    pub fn weights(&self, graph: &dyn TransformGraph) -> Result<Vec<f32>, SpaceError> {
        let count = self.targets(graph)?.len();
        let mut out = Vec::with_capacity(count);
        for i in 0..count {
            let attr = schema::weight_attr(i);
            let value = graph.attribute(self.0, &attr)?;
            out.push(
                value
                    .as_float()
                    .ok_or_else(|| kind_mismatch(graph, self.0, &attr, "Float"))?,
            );
        }
        Ok(out)
    }

    /// The live continuity offset (translation, XYZ euler radians).
    pub fn offset(&self, graph: &dyn TransformGraph) -> Result<([f32; 3], [f32; 3]), SpaceError> {
        let t = graph.attribute(self.0, schema::OFFSET_TRANSLATE)?;
        let r = graph.attribute(self.0, schema::OFFSET_ROTATE)?;
        match (t.as_vec3(), r.as_vec3()) {
            (Some(t), Some(r)) => Ok((t, r)),
            _ => Err(kind_mismatch(graph, self.0, schema::OFFSET_TRANSLATE, "Vec3")),
        }
    }

    /// The authored default offset captured when target `index` was added.
    pub fn default_offset(
        &self,
        graph: &dyn TransformGraph,
        index: usize,
    ) -> Result<([f32; 3], [f32; 3]), SpaceError> {
        let t_attr = schema::default_translate_attr(index);
        let r_attr = schema::default_rotate_attr(index);
        let t = graph.attribute(self.0, &t_attr)?;
        let r = graph.attribute(self.0, &r_attr)?;
        match (t.as_vec3(), r.as_vec3()) {
            (Some(t), Some(r)) => Ok((t, r)),
            _ => Err(kind_mismatch(graph, self.0, &t_attr, "Vec3")),
        }
    }

    pub fn name_tag(&self, graph: &dyn TransformGraph) -> Result<String, SpaceError> {
        let value = graph.attribute(self.0, schema::NAME_TAG)?;
        value
            .as_text()
            .map(|s| s.to_string())
            .ok_or_else(|| kind_mismatch(graph, self.0, schema::NAME_TAG, "Text"))
    }

    /// Write a state channel, mapping graph lock failures to the loud
    /// `LockedChannel` contract.
    pub(crate) fn write_channel(
        &self,
        graph: &mut dyn TransformGraph,
        attr: &str,
        value: Value,
    ) -> Result<(), SpaceError> {
        let name = graph
            .node_name(self.0)
            .unwrap_or_else(|_| format!("{:?}", self.0));
        graph
            .set_attribute(self.0, attr, value)
            .map_err(|e| crate::error::lock_aware(e, &name))
    }

    pub(crate) fn append_target(
        &self,
        graph: &mut dyn TransformGraph,
        target: NodeId,
    ) -> Result<(), SpaceError> {
        let mut list = self.targets(graph)?;
        list.push(target);
        graph.set_attribute(self.0, schema::TARGETS, Value::NodeList(list))?;
        Ok(())
    }
}
