//! Attribute values held by the host graph.
//! Numeric components are f32; node references are first-class values so
//! relations between nodes are explicit attributes, never name conventions.

use serde::{Deserialize, Serialize};

use crate::ids::NodeId;

/// Lightweight kind enum for pattern-matching and error reporting.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Float,
    Bool,
    Vec3,
    Enum,
    Text,
    Node,
    NodeList,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum Value {
    /// Scalar float
    Float(f32),

    /// Boolean (step-only)
    Bool(bool),

    /// 3D vector (translation, or XYZ euler radians for rotation channels)
    Vec3([f32; 3]),

    /// Index into an enum attribute's label list
    Enum(u32),

    /// Text / string; step-only for interpolation
    Text(String),

    /// Reference to another node
    Node(NodeId),

    /// Ordered list of node references (positionally keyed)
    NodeList(Vec<NodeId>),
}

impl Value {
    /// Return the coarse kind of this value.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Float(_) => ValueKind::Float,
            Value::Bool(_) => ValueKind::Bool,
            Value::Vec3(_) => ValueKind::Vec3,
            Value::Enum(_) => ValueKind::Enum,
            Value::Text(_) => ValueKind::Text,
            Value::Node(_) => ValueKind::Node,
            Value::NodeList(_) => ValueKind::NodeList,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<[f32; 3]> {
        match self {
            Value::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_enum_index(&self) -> Option<u32> {
        match self {
            Value::Enum(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Value::Node(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_node_list(&self) -> Option<&[NodeId]> {
        match self {
            Value::NodeList(v) => Some(v.as_slice()),
            _ => None,
        }
    }
}
