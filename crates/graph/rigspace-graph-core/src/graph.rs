//! The TransformGraph capability trait and the in-memory reference host.
//!
//! The trait is the exact surface the spaces system consumes: node
//! creation/duplication, world-pose-preserving re-parenting, attribute CRUD
//! with locks and enums, weighted multi-parent constraints with per-target
//! maintain-offset, world poses, time, and step keyframes. Hosts embed the
//! system by implementing it; `SceneGraph` is the reference implementation.
//!
//! `SceneGraph` pose evaluation: a node whose translate and rotate channels
//! are driven by the same constraint takes the constraint's blended world
//! pose; at zero total weight the constraint is inert and the node's own
//! local pose applies. Constraint target chains are assumed acyclic.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::attribute::{Attribute, Interpolation};
use crate::constraint::{blend_poses, ConstraintTarget, Plug, WeightedConstraint};
use crate::error::GraphError;
use crate::ids::{ConstraintId, IdAllocator, NodeId};
use crate::transform::RigidPose;
use crate::value::{Value, ValueKind};

/// A transform node's standard channels, as seen by constraints and locks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    Translate,
    Rotate,
}

/// Host capability object consumed by the spaces system.
///
/// Implementations must preserve world pose across `reparent` (the local
/// pose is recomputed against the new parent frame) and must treat
/// `create_constraint` as "maintain-offset snapshots now, all weights zero".
pub trait TransformGraph {
    fn create_transform(&mut self, name: &str) -> NodeId;
    fn node_exists(&self, node: NodeId) -> bool;
    fn node_name(&self, node: NodeId) -> Result<String, GraphError>;
    fn parent_of(&self, node: NodeId) -> Result<Option<NodeId>, GraphError>;
    /// Duplicate a node's transform and attributes (keys cleared, channel
    /// drivers cleared, no children) under the same parent.
    fn duplicate_without_children(&mut self, node: NodeId, name: &str)
        -> Result<NodeId, GraphError>;
    /// Re-parent preserving world pose: the node's local pose is recomputed
    /// so the node does not move.
    fn reparent(&mut self, node: NodeId, parent: Option<NodeId>) -> Result<(), GraphError>;
    fn world_pose(&self, node: NodeId) -> Result<RigidPose, GraphError>;

    fn set_channel_locked(
        &mut self,
        node: NodeId,
        channel: Channel,
        locked: bool,
    ) -> Result<(), GraphError>;
    fn channel_driver(
        &self,
        node: NodeId,
        channel: Channel,
    ) -> Result<Option<ConstraintId>, GraphError>;

    fn add_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: Value,
        keyable: bool,
    ) -> Result<(), GraphError>;
    fn add_enum_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        labels: &[String],
        keyable: bool,
    ) -> Result<(), GraphError>;
    /// Append labels to an enum attribute. Existing indices never renumber.
    fn append_enum_labels(
        &mut self,
        node: NodeId,
        attr: &str,
        labels: &[String],
    ) -> Result<(), GraphError>;
    fn enum_labels(&self, node: NodeId, attr: &str) -> Result<Vec<String>, GraphError>;
    fn has_attribute(&self, node: NodeId, attr: &str) -> bool;
    fn attribute(&self, node: NodeId, attr: &str) -> Result<Value, GraphError>;
    fn set_attribute(&mut self, node: NodeId, attr: &str, value: Value) -> Result<(), GraphError>;
    fn set_attribute_locked(
        &mut self,
        node: NodeId,
        attr: &str,
        locked: bool,
    ) -> Result<(), GraphError>;

    /// Create a weighted multi-parent constraint over `targets` driving
    /// `driven`'s translate and rotate channels. With `maintain_offset`,
    /// each target's offset is snapshotted so the driven node would not move
    /// were that target fully active. All weights start at zero.
    fn create_constraint(
        &mut self,
        driven: NodeId,
        targets: &[NodeId],
        maintain_offset: bool,
    ) -> Result<ConstraintId, GraphError>;
    /// Append one target; returns its index. Never renumbers existing targets.
    fn append_constraint_target(
        &mut self,
        constraint: ConstraintId,
        target: NodeId,
        maintain_offset: bool,
    ) -> Result<usize, GraphError>;
    fn constraint_target_count(&self, constraint: ConstraintId) -> Result<usize, GraphError>;
    fn constraint_target_node(
        &self,
        constraint: ConstraintId,
        index: usize,
    ) -> Result<NodeId, GraphError>;
    /// Read a target's effective offset (translation, XYZ euler radians),
    /// resolving plug connections.
    fn constraint_target_offset(
        &self,
        constraint: ConstraintId,
        index: usize,
    ) -> Result<([f32; 3], [f32; 3]), GraphError>;
    fn connect_constraint_offset(
        &mut self,
        constraint: ConstraintId,
        index: usize,
        node: NodeId,
        translate_attr: &str,
        rotate_attr: &str,
    ) -> Result<(), GraphError>;
    fn connect_constraint_weight(
        &mut self,
        constraint: ConstraintId,
        index: usize,
        node: NodeId,
        attr: &str,
    ) -> Result<(), GraphError>;

    fn current_time(&self) -> f32;
    /// Record a key on `attr` holding its current value at `time`.
    fn set_keyframe(
        &mut self,
        node: NodeId,
        attr: &str,
        time: f32,
        interp: Interpolation,
    ) -> Result<(), GraphError>;

    fn nodes(&self) -> Vec<NodeId>;
    fn nodes_with_attribute(&self, attr: &str) -> Vec<NodeId>;
    /// True when `node` lies in the subtree rooted at `ancestor` (inclusive).
    fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
struct ChannelState {
    locked: bool,
    driver: Option<ConstraintId>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct NodeData {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    local: RigidPose,
    attributes: HashMap<String, Attribute>,
    translate: ChannelState,
    rotate: ChannelState,
}

impl NodeData {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            children: Vec::new(),
            local: RigidPose::identity(),
            attributes: HashMap::new(),
            translate: ChannelState::default(),
            rotate: ChannelState::default(),
        }
    }

    fn channel(&self, channel: Channel) -> &ChannelState {
        match channel {
            Channel::Translate => &self.translate,
            Channel::Rotate => &self.rotate,
        }
    }

    fn channel_mut(&mut self, channel: Channel) -> &mut ChannelState {
        match channel {
            Channel::Translate => &mut self.translate,
            Channel::Rotate => &mut self.rotate,
        }
    }
}

/// In-memory reference host.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct SceneGraph {
    nodes: Vec<Option<NodeData>>,
    constraints: Vec<Option<WeightedConstraint>>,
    ids: IdAllocator,
    time: f32,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scene time and re-sample every animated attribute at it.
    pub fn set_current_time(&mut self, time: f32) {
        self.time = time;
        for slot in self.nodes.iter_mut().flatten() {
            for attr in slot.attributes.values_mut() {
                if let Some(value) = attr.sample(time) {
                    attr.value = value;
                }
            }
        }
    }

    pub fn local_pose(&self, node: NodeId) -> Result<RigidPose, GraphError> {
        Ok(self.node(node)?.local)
    }

    pub fn set_local_pose(&mut self, node: NodeId, pose: RigidPose) -> Result<(), GraphError> {
        self.node_mut(node)?.local = pose;
        Ok(())
    }

    /// Remove a node and its subtree. Constraints driving a removed node are
    /// dropped; constraints targeting one keep a dangling reference and fail
    /// on evaluation (callers retire constraints before deleting targets).
    pub fn delete_node(&mut self, node: NodeId) -> Result<(), GraphError> {
        let children = self.node(node)?.children.clone();
        for child in children {
            self.delete_node(child)?;
        }
        self.detach_from_parent(node)?;
        for slot in self.constraints.iter_mut() {
            if slot.as_ref().is_some_and(|c| c.driven == node) {
                *slot = None;
            }
        }
        self.nodes[node.0 as usize] = None;
        Ok(())
    }

    /// Rewire or sever a channel's driver directly. Exists for host-side
    /// surgery and for exercising structural-corruption paths in tests.
    pub fn set_channel_driver(
        &mut self,
        node: NodeId,
        channel: Channel,
        driver: Option<ConstraintId>,
    ) -> Result<(), GraphError> {
        self.node_mut(node)?.channel_mut(channel).driver = driver;
        Ok(())
    }

    fn node(&self, id: NodeId) -> Result<&NodeData, GraphError> {
        self.nodes
            .get(id.0 as usize)
            .and_then(|slot| slot.as_ref())
            .ok_or(GraphError::NodeNotFound { id })
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData, GraphError> {
        self.nodes
            .get_mut(id.0 as usize)
            .and_then(|slot| slot.as_mut())
            .ok_or(GraphError::NodeNotFound { id })
    }

    fn name_of(&self, id: NodeId) -> String {
        self.node(id)
            .map(|n| n.name.clone())
            .unwrap_or_else(|_| format!("{id:?}"))
    }

    fn constraint(&self, id: ConstraintId) -> Result<&WeightedConstraint, GraphError> {
        self.constraints
            .get(id.0 as usize)
            .and_then(|slot| slot.as_ref())
            .ok_or(GraphError::ConstraintNotFound { id })
    }

    fn constraint_mut(&mut self, id: ConstraintId) -> Result<&mut WeightedConstraint, GraphError> {
        self.constraints
            .get_mut(id.0 as usize)
            .and_then(|slot| slot.as_mut())
            .ok_or(GraphError::ConstraintNotFound { id })
    }

    fn target(
        &self,
        constraint: ConstraintId,
        index: usize,
    ) -> Result<&ConstraintTarget, GraphError> {
        let c = self.constraint(constraint)?;
        c.targets.get(index).ok_or(GraphError::TargetOutOfRange {
            index,
            len: c.targets.len(),
        })
    }

    fn detach_from_parent(&mut self, node: NodeId) -> Result<(), GraphError> {
        let parent = self.node(node)?.parent;
        if let Some(p) = parent {
            let siblings = &mut self.node_mut(p)?.children;
            siblings.retain(|&c| c != node);
        }
        Ok(())
    }

    fn read_plug_f32(&self, plug: &Plug) -> Result<f32, GraphError> {
        let value = match plug {
            Plug::Value(v) => v.clone(),
            Plug::Attr { node, attr } => self.attribute(*node, attr)?,
        };
        value.as_float().ok_or_else(|| GraphError::TypeMismatch {
            node: String::from("<plug>"),
            attr: String::from("<plug>"),
            expected: format!("{:?}", ValueKind::Float),
            actual: format!("{:?}", value.kind()),
        })
    }

    fn read_plug_vec3(&self, plug: &Plug) -> Result<[f32; 3], GraphError> {
        let value = match plug {
            Plug::Value(v) => v.clone(),
            Plug::Attr { node, attr } => self.attribute(*node, attr)?,
        };
        value.as_vec3().ok_or_else(|| GraphError::TypeMismatch {
            node: String::from("<plug>"),
            attr: String::from("<plug>"),
            expected: format!("{:?}", ValueKind::Vec3),
            actual: format!("{:?}", value.kind()),
        })
    }

    /// Blended world pose of a constraint, or None at zero total weight.
    fn eval_constraint(&self, id: ConstraintId) -> Result<Option<RigidPose>, GraphError> {
        let c = self.constraint(id)?;
        let mut entries = Vec::with_capacity(c.targets.len());
        for target in &c.targets {
            let weight = self.read_plug_f32(&target.weight)?;
            if weight <= 0.0 {
                continue;
            }
            let target_world = self.world_pose(target.node)?;
            let offset = RigidPose::from_offset_parts(
                self.read_plug_vec3(&target.offset_translate)?,
                self.read_plug_vec3(&target.offset_rotate)?,
            );
            entries.push((target_world.transform(&offset), weight));
        }
        Ok(blend_poses(&entries))
    }

    fn maintain_offset_for(
        &self,
        driven_world: &RigidPose,
        target: NodeId,
    ) -> Result<(Plug, Plug), GraphError> {
        let target_world = self.world_pose(target)?;
        let (t, e) = driven_world.relative_to(&target_world).offset_parts();
        Ok((Plug::Value(Value::Vec3(t)), Plug::Value(Value::Vec3(e))))
    }
}

impl TransformGraph for SceneGraph {
    fn create_transform(&mut self, name: &str) -> NodeId {
        let id = self.ids.alloc_node();
        debug_assert_eq!(id.0 as usize, self.nodes.len());
        self.nodes.push(Some(NodeData::new(name)));
        id
    }

    fn node_exists(&self, node: NodeId) -> bool {
        self.node(node).is_ok()
    }

    fn node_name(&self, node: NodeId) -> Result<String, GraphError> {
        Ok(self.node(node)?.name.clone())
    }

    fn parent_of(&self, node: NodeId) -> Result<Option<NodeId>, GraphError> {
        Ok(self.node(node)?.parent)
    }

    fn duplicate_without_children(
        &mut self,
        node: NodeId,
        name: &str,
    ) -> Result<NodeId, GraphError> {
        let src = self.node(node)?;
        let mut copy = NodeData::new(name);
        copy.parent = src.parent;
        copy.local = src.local;
        copy.attributes = src.attributes.clone();
        for attr in copy.attributes.values_mut() {
            attr.keys.clear();
        }
        copy.translate.locked = src.translate.locked;
        copy.rotate.locked = src.rotate.locked;

        let id = self.ids.alloc_node();
        debug_assert_eq!(id.0 as usize, self.nodes.len());
        self.nodes.push(Some(copy));
        if let Some(parent) = self.node(id)?.parent {
            self.node_mut(parent)?.children.push(id);
        }
        Ok(id)
    }

    fn reparent(&mut self, node: NodeId, parent: Option<NodeId>) -> Result<(), GraphError> {
        if let Some(p) = parent {
            if self.is_descendant_of(p, node) {
                return Err(GraphError::ReparentCycle {
                    node: self.name_of(node),
                    parent: self.name_of(p),
                });
            }
        }
        let world = self.world_pose(node)?;
        let parent_world = match parent {
            Some(p) => self.world_pose(p)?,
            None => RigidPose::identity(),
        };
        self.detach_from_parent(node)?;
        if let Some(p) = parent {
            self.node_mut(p)?.children.push(node);
        }
        let data = self.node_mut(node)?;
        data.parent = parent;
        data.local = world.relative_to(&parent_world);
        Ok(())
    }

    fn world_pose(&self, node: NodeId) -> Result<RigidPose, GraphError> {
        let data = self.node(node)?;
        if let (Some(ct), Some(cr)) = (data.translate.driver, data.rotate.driver) {
            if ct == cr {
                if let Some(pose) = self.eval_constraint(ct)? {
                    return Ok(pose);
                }
            }
        }
        let parent = match data.parent {
            Some(p) => self.world_pose(p)?,
            None => RigidPose::identity(),
        };
        Ok(parent.transform(&data.local))
    }

    fn set_channel_locked(
        &mut self,
        node: NodeId,
        channel: Channel,
        locked: bool,
    ) -> Result<(), GraphError> {
        self.node_mut(node)?.channel_mut(channel).locked = locked;
        Ok(())
    }

    fn channel_driver(
        &self,
        node: NodeId,
        channel: Channel,
    ) -> Result<Option<ConstraintId>, GraphError> {
        Ok(self.node(node)?.channel(channel).driver)
    }

    fn add_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: Value,
        keyable: bool,
    ) -> Result<(), GraphError> {
        let node_name = self.name_of(node);
        let data = self.node_mut(node)?;
        if data.attributes.contains_key(name) {
            return Err(GraphError::AttributeExists {
                node: node_name,
                attr: name.to_string(),
            });
        }
        data.attributes
            .insert(name.to_string(), Attribute::new(value, keyable));
        Ok(())
    }

    fn add_enum_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        labels: &[String],
        keyable: bool,
    ) -> Result<(), GraphError> {
        let node_name = self.name_of(node);
        let data = self.node_mut(node)?;
        if data.attributes.contains_key(name) {
            return Err(GraphError::AttributeExists {
                node: node_name,
                attr: name.to_string(),
            });
        }
        data.attributes.insert(
            name.to_string(),
            Attribute::new_enum(0, labels.to_vec(), keyable),
        );
        Ok(())
    }

    fn append_enum_labels(
        &mut self,
        node: NodeId,
        attr: &str,
        labels: &[String],
    ) -> Result<(), GraphError> {
        let node_name = self.name_of(node);
        let data = self.node_mut(node)?;
        let attribute = data
            .attributes
            .get_mut(attr)
            .ok_or_else(|| GraphError::AttributeNotFound {
                node: node_name.clone(),
                attr: attr.to_string(),
            })?;
        match attribute.enum_labels.as_mut() {
            Some(existing) => {
                existing.extend(labels.iter().cloned());
                Ok(())
            }
            None => Err(GraphError::NotAnEnum {
                node: node_name,
                attr: attr.to_string(),
            }),
        }
    }

    fn enum_labels(&self, node: NodeId, attr: &str) -> Result<Vec<String>, GraphError> {
        let node_name = self.name_of(node);
        let attribute =
            self.node(node)?
                .attributes
                .get(attr)
                .ok_or_else(|| GraphError::AttributeNotFound {
                    node: node_name.clone(),
                    attr: attr.to_string(),
                })?;
        attribute
            .enum_labels
            .clone()
            .ok_or(GraphError::NotAnEnum {
                node: node_name,
                attr: attr.to_string(),
            })
    }

    fn has_attribute(&self, node: NodeId, attr: &str) -> bool {
        self.node(node)
            .map(|n| n.attributes.contains_key(attr))
            .unwrap_or(false)
    }

    fn attribute(&self, node: NodeId, attr: &str) -> Result<Value, GraphError> {
        self.node(node)?
            .attributes
            .get(attr)
            .map(|a| a.value.clone())
            .ok_or_else(|| GraphError::AttributeNotFound {
                node: self.name_of(node),
                attr: attr.to_string(),
            })
    }

    fn set_attribute(&mut self, node: NodeId, attr: &str, value: Value) -> Result<(), GraphError> {
        let node_name = self.name_of(node);
        let data = self.node_mut(node)?;
        let attribute = data
            .attributes
            .get_mut(attr)
            .ok_or_else(|| GraphError::AttributeNotFound {
                node: node_name.clone(),
                attr: attr.to_string(),
            })?;
        if attribute.locked {
            return Err(GraphError::LockedAttribute {
                node: node_name,
                attr: attr.to_string(),
            });
        }
        if attribute.value.kind() != value.kind() {
            return Err(GraphError::TypeMismatch {
                node: node_name,
                attr: attr.to_string(),
                expected: format!("{:?}", attribute.value.kind()),
                actual: format!("{:?}", value.kind()),
            });
        }
        if let (Some(labels), Value::Enum(index)) = (&attribute.enum_labels, &value) {
            if *index as usize >= labels.len() {
                return Err(GraphError::EnumIndexOutOfRange {
                    node: node_name,
                    attr: attr.to_string(),
                    index: *index,
                    len: labels.len(),
                });
            }
        }
        attribute.value = value;
        Ok(())
    }

    fn set_attribute_locked(
        &mut self,
        node: NodeId,
        attr: &str,
        locked: bool,
    ) -> Result<(), GraphError> {
        let node_name = self.name_of(node);
        let data = self.node_mut(node)?;
        let attribute = data
            .attributes
            .get_mut(attr)
            .ok_or(GraphError::AttributeNotFound {
                node: node_name,
                attr: attr.to_string(),
            })?;
        attribute.locked = locked;
        Ok(())
    }

    fn create_constraint(
        &mut self,
        driven: NodeId,
        targets: &[NodeId],
        maintain_offset: bool,
    ) -> Result<ConstraintId, GraphError> {
        let data = self.node(driven)?;
        if data.translate.locked || data.rotate.locked {
            return Err(GraphError::LockedAttribute {
                node: data.name.clone(),
                attr: String::from("translate/rotate"),
            });
        }
        let driven_world = self.world_pose(driven)?;
        let mut built = Vec::with_capacity(targets.len());
        for &target in targets {
            self.node(target)?;
            let (offset_translate, offset_rotate) = if maintain_offset {
                self.maintain_offset_for(&driven_world, target)?
            } else {
                (
                    Plug::Value(Value::Vec3([0.0; 3])),
                    Plug::Value(Value::Vec3([0.0; 3])),
                )
            };
            built.push(ConstraintTarget {
                node: target,
                offset_translate,
                offset_rotate,
                weight: Plug::Value(Value::Float(0.0)),
            });
        }

        let id = self.ids.alloc_constraint();
        debug_assert_eq!(id.0 as usize, self.constraints.len());
        self.constraints.push(Some(WeightedConstraint {
            id,
            driven,
            targets: built,
        }));
        let data = self.node_mut(driven)?;
        data.translate.driver = Some(id);
        data.rotate.driver = Some(id);
        Ok(id)
    }

    fn append_constraint_target(
        &mut self,
        constraint: ConstraintId,
        target: NodeId,
        maintain_offset: bool,
    ) -> Result<usize, GraphError> {
        self.node(target)?;
        let driven = self.constraint(constraint)?.driven;
        let driven_world = self.world_pose(driven)?;
        let (offset_translate, offset_rotate) = if maintain_offset {
            self.maintain_offset_for(&driven_world, target)?
        } else {
            (
                Plug::Value(Value::Vec3([0.0; 3])),
                Plug::Value(Value::Vec3([0.0; 3])),
            )
        };
        let c = self.constraint_mut(constraint)?;
        c.targets.push(ConstraintTarget {
            node: target,
            offset_translate,
            offset_rotate,
            weight: Plug::Value(Value::Float(0.0)),
        });
        Ok(c.targets.len() - 1)
    }

    fn constraint_target_count(&self, constraint: ConstraintId) -> Result<usize, GraphError> {
        Ok(self.constraint(constraint)?.targets.len())
    }

    fn constraint_target_node(
        &self,
        constraint: ConstraintId,
        index: usize,
    ) -> Result<NodeId, GraphError> {
        Ok(self.target(constraint, index)?.node)
    }

    fn constraint_target_offset(
        &self,
        constraint: ConstraintId,
        index: usize,
    ) -> Result<([f32; 3], [f32; 3]), GraphError> {
        let target = self.target(constraint, index)?;
        Ok((
            self.read_plug_vec3(&target.offset_translate)?,
            self.read_plug_vec3(&target.offset_rotate)?,
        ))
    }

    fn connect_constraint_offset(
        &mut self,
        constraint: ConstraintId,
        index: usize,
        node: NodeId,
        translate_attr: &str,
        rotate_attr: &str,
    ) -> Result<(), GraphError> {
        for attr in [translate_attr, rotate_attr] {
            let value = self.attribute(node, attr)?;
            if value.kind() != ValueKind::Vec3 {
                return Err(GraphError::TypeMismatch {
                    node: self.name_of(node),
                    attr: attr.to_string(),
                    expected: format!("{:?}", ValueKind::Vec3),
                    actual: format!("{:?}", value.kind()),
                });
            }
        }
        let len = self.constraint(constraint)?.targets.len();
        let target = self
            .constraint_mut(constraint)?
            .targets
            .get_mut(index)
            .ok_or(GraphError::TargetOutOfRange { index, len })?;
        target.offset_translate = Plug::Attr {
            node,
            attr: translate_attr.to_string(),
        };
        target.offset_rotate = Plug::Attr {
            node,
            attr: rotate_attr.to_string(),
        };
        Ok(())
    }

    fn connect_constraint_weight(
        &mut self,
        constraint: ConstraintId,
        index: usize,
        node: NodeId,
        attr: &str,
    ) -> Result<(), GraphError> {
        let value = self.attribute(node, attr)?;
        if value.kind() != ValueKind::Float {
            return Err(GraphError::TypeMismatch {
                node: self.name_of(node),
                attr: attr.to_string(),
                expected: format!("{:?}", ValueKind::Float),
                actual: format!("{:?}", value.kind()),
            });
        }
        let len = self.constraint(constraint)?.targets.len();
        let target = self
            .constraint_mut(constraint)?
            .targets
            .get_mut(index)
            .ok_or(GraphError::TargetOutOfRange { index, len })?;
        target.weight = Plug::Attr {
            node,
            attr: attr.to_string(),
        };
        Ok(())
    }

    fn current_time(&self) -> f32 {
        self.time
    }

    fn set_keyframe(
        &mut self,
        node: NodeId,
        attr: &str,
        time: f32,
        interp: Interpolation,
    ) -> Result<(), GraphError> {
        let node_name = self.name_of(node);
        let data = self.node_mut(node)?;
        let attribute = data
            .attributes
            .get_mut(attr)
            .ok_or_else(|| GraphError::AttributeNotFound {
                node: node_name.clone(),
                attr: attr.to_string(),
            })?;
        if !attribute.keyable {
            return Err(GraphError::NotKeyable {
                node: node_name,
                attr: attr.to_string(),
            });
        }
        let value = attribute.value.clone();
        attribute.insert_key(time, value, interp);
        Ok(())
    }

    fn nodes(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|_| NodeId(i as u32)))
            .collect()
    }

    fn nodes_with_attribute(&self, attr: &str) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| {
                slot.as_ref()
                    .filter(|n| n.attributes.contains_key(attr))
                    .map(|_| NodeId(i as u32))
            })
            .collect()
    }

    fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.node(id).ok().and_then(|n| n.parent);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn pose(t: [f32; 3], e: [f32; 3]) -> RigidPose {
        RigidPose::from_offset_parts(t, e)
    }

    fn assert_pose_eq(a: &RigidPose, b: &RigidPose) {
        assert_relative_eq!(a.translation, b.translation, epsilon = 1e-4);
        assert_relative_eq!(a.rotation.angle_to(&b.rotation), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn hierarchy_composes_world_poses() {
        let mut g = SceneGraph::new();
        let root = g.create_transform("root");
        let child = g.create_transform("child");
        g.reparent(child, Some(root)).unwrap();
        g.set_local_pose(root, pose([1.0, 0.0, 0.0], [0.0; 3])).unwrap();
        g.set_local_pose(child, pose([0.0, 2.0, 0.0], [0.0; 3]))
            .unwrap();

        let world = g.world_pose(child).unwrap();
        assert_relative_eq!(
            world.translation,
            Vector3::new(1.0, 2.0, 0.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn reparent_preserves_world_pose() {
        let mut g = SceneGraph::new();
        let a = g.create_transform("a");
        let b = g.create_transform("b");
        g.set_local_pose(a, pose([3.0, 1.0, -2.0], [0.4, 0.0, 0.9]))
            .unwrap();
        g.set_local_pose(b, pose([-1.0, 5.0, 2.0], [0.0, 0.7, 0.0]))
            .unwrap();

        let before = g.world_pose(b).unwrap();
        g.reparent(b, Some(a)).unwrap();
        let after = g.world_pose(b).unwrap();
        assert_pose_eq(&before, &after);
        assert_eq!(g.parent_of(b).unwrap(), Some(a));
    }

    #[test]
    fn reparent_rejects_cycles() {
        let mut g = SceneGraph::new();
        let a = g.create_transform("a");
        let b = g.create_transform("b");
        g.reparent(b, Some(a)).unwrap();
        let err = g.reparent(a, Some(b)).unwrap_err();
        assert!(matches!(err, GraphError::ReparentCycle { .. }));
    }

    #[test]
    fn duplicate_copies_pose_and_attributes_without_children() {
        let mut g = SceneGraph::new();
        let parent = g.create_transform("parent");
        let child = g.create_transform("child");
        g.reparent(child, Some(parent)).unwrap();
        g.set_local_pose(parent, pose([1.0, 2.0, 3.0], [0.1, 0.2, 0.3]))
            .unwrap();
        g.add_attribute(parent, "tag", Value::Text("x".into()), false)
            .unwrap();

        let copy = g.duplicate_without_children(parent, "parent_copy").unwrap();
        assert_eq!(g.node_name(copy).unwrap(), "parent_copy");
        assert_eq!(g.parent_of(copy).unwrap(), None);
        assert!(g.has_attribute(copy, "tag"));
        let src_world = g.world_pose(parent).unwrap();
        let copy_world = g.world_pose(copy).unwrap();
        assert_pose_eq(&src_world, &copy_world);
    }

    #[test]
    fn locked_attribute_rejects_writes() {
        let mut g = SceneGraph::new();
        let n = g.create_transform("n");
        g.add_attribute(n, "w", Value::Float(0.0), true).unwrap();
        g.set_attribute_locked(n, "w", true).unwrap();
        let err = g.set_attribute(n, "w", Value::Float(1.0)).unwrap_err();
        assert!(matches!(err, GraphError::LockedAttribute { .. }));
    }

    #[test]
    fn set_attribute_enforces_kind() {
        let mut g = SceneGraph::new();
        let n = g.create_transform("n");
        g.add_attribute(n, "w", Value::Float(0.0), true).unwrap();
        let err = g
            .set_attribute(n, "w", Value::Vec3([0.0; 3]))
            .unwrap_err();
        assert!(matches!(err, GraphError::TypeMismatch { .. }));
    }

    #[test]
    fn enum_labels_append_without_renumbering() {
        let mut g = SceneGraph::new();
        let n = g.create_transform("n");
        g.add_enum_attribute(n, "space", &["A".into(), "B".into()], true)
            .unwrap();
        g.set_attribute(n, "space", Value::Enum(1)).unwrap();
        g.append_enum_labels(n, "space", &["C".into()]).unwrap();
        assert_eq!(
            g.enum_labels(n, "space").unwrap(),
            vec!["A".to_string(), "B".to_string(), "C".to_string()]
        );
        assert_eq!(g.attribute(n, "space").unwrap(), Value::Enum(1));
        let err = g.set_attribute(n, "space", Value::Enum(3)).unwrap_err();
        assert!(matches!(err, GraphError::EnumIndexOutOfRange { .. }));
    }

    #[test]
    fn constraint_maintain_offset_keeps_pose_when_activated() {
        let mut g = SceneGraph::new();
        let driven = g.create_transform("driven");
        let target = g.create_transform("target");
        g.set_local_pose(driven, pose([2.0, 0.0, 1.0], [0.0, 0.3, 0.0]))
            .unwrap();
        g.set_local_pose(target, pose([-4.0, 2.0, 0.0], [0.5, 0.0, 0.2]))
            .unwrap();

        let before = g.world_pose(driven).unwrap();
        let c = g.create_constraint(driven, &[target], true).unwrap();
        // Weight zero: constraint inert, pose unchanged.
        assert_pose_eq(&before, &g.world_pose(driven).unwrap());

        g.add_attribute(driven, "w0", Value::Float(1.0), true).unwrap();
        g.connect_constraint_weight(c, 0, driven, "w0").unwrap();
        // Fully active with the snapshot offset: still the same pose.
        assert_pose_eq(&before, &g.world_pose(driven).unwrap());
    }

    #[test]
    fn one_hot_constraint_follows_active_target() {
        let mut g = SceneGraph::new();
        let driven = g.create_transform("driven");
        let a = g.create_transform("a");
        let b = g.create_transform("b");
        g.set_local_pose(a, pose([1.0, 0.0, 0.0], [0.0; 3])).unwrap();
        g.set_local_pose(b, pose([0.0, 5.0, 0.0], [0.0; 3])).unwrap();

        let c = g.create_constraint(driven, &[a, b], false).unwrap();
        g.add_attribute(driven, "w0", Value::Float(0.0), true).unwrap();
        g.add_attribute(driven, "w1", Value::Float(1.0), true).unwrap();
        g.connect_constraint_weight(c, 0, driven, "w0").unwrap();
        g.connect_constraint_weight(c, 1, driven, "w1").unwrap();

        let world = g.world_pose(driven).unwrap();
        assert_relative_eq!(world.translation, Vector3::new(0.0, 5.0, 0.0), epsilon = 1e-5);

        // Move the active target: the driven node follows.
        g.set_local_pose(b, pose([0.0, 7.0, 0.0], [0.0; 3])).unwrap();
        let world = g.world_pose(driven).unwrap();
        assert_relative_eq!(world.translation, Vector3::new(0.0, 7.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn shared_offset_connection_feeds_every_target() {
        let mut g = SceneGraph::new();
        let driven = g.create_transform("driven");
        let a = g.create_transform("a");
        let b = g.create_transform("b");
        let c = g.create_constraint(driven, &[a, b], false).unwrap();
        g.add_attribute(driven, "ot", Value::Vec3([1.0, 2.0, 3.0]), true)
            .unwrap();
        g.add_attribute(driven, "or", Value::Vec3([0.0; 3]), true)
            .unwrap();
        g.connect_constraint_offset(c, 0, driven, "ot", "or").unwrap();
        g.connect_constraint_offset(c, 1, driven, "ot", "or").unwrap();

        assert_eq!(
            g.constraint_target_offset(c, 0).unwrap().0,
            [1.0, 2.0, 3.0]
        );
        assert_eq!(
            g.constraint_target_offset(c, 1).unwrap().0,
            [1.0, 2.0, 3.0]
        );
    }

    #[test]
    fn keyframe_readback_is_zero_order_hold() {
        let mut g = SceneGraph::new();
        let n = g.create_transform("n");
        g.add_attribute(n, "w", Value::Float(0.0), true).unwrap();

        g.set_attribute(n, "w", Value::Float(0.0)).unwrap();
        g.set_keyframe(n, "w", 1.0, Interpolation::Step).unwrap();
        g.set_attribute(n, "w", Value::Float(1.0)).unwrap();
        g.set_keyframe(n, "w", 10.0, Interpolation::Step).unwrap();

        g.set_current_time(5.0);
        assert_eq!(g.attribute(n, "w").unwrap(), Value::Float(0.0));
        g.set_current_time(10.0);
        assert_eq!(g.attribute(n, "w").unwrap(), Value::Float(1.0));
        g.set_current_time(0.0);
        assert_eq!(g.attribute(n, "w").unwrap(), Value::Float(0.0));
    }

    #[test]
    fn delete_node_removes_subtree_and_driving_constraints() {
        let mut g = SceneGraph::new();
        let parent = g.create_transform("parent");
        let child = g.create_transform("child");
        let target = g.create_transform("target");
        g.reparent(child, Some(parent)).unwrap();
        g.create_constraint(child, &[target], false).unwrap();

        g.delete_node(parent).unwrap();
        assert!(!g.node_exists(parent));
        assert!(!g.node_exists(child));
        assert!(g.node_exists(target));
        assert_eq!(g.nodes().len(), 1);
    }
}
