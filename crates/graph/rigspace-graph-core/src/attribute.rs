//! Node attributes and their keyframe tracks.
//!
//! Model:
//! - An attribute holds a live `Value`, lock/keyable flags, optional enum
//!   labels, and an ordered keyframe track.
//! - Sampling at time t: Step holds the value of the last key at or before
//!   t (zero-order hold); Linear interpolates Float/Vec3 toward the next
//!   key. Before the first key, the first key's value applies.

use serde::{Deserialize, Serialize};

use crate::value::Value;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interpolation {
    /// Zero-order hold: the keyed value holds until the next key, then steps.
    Step,
    /// Componentwise lerp for Float/Vec3; other kinds fall back to Step.
    Linear,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: Value,
    pub interp: Interpolation,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub value: Value,
    pub keyable: bool,
    pub locked: bool,
    /// Present only on enum attributes; append-only, indices never renumber.
    pub enum_labels: Option<Vec<String>>,
    pub keys: Vec<Keyframe>,
}

impl Attribute {
    pub fn new(value: Value, keyable: bool) -> Self {
        Self {
            value,
            keyable,
            locked: false,
            enum_labels: None,
            keys: Vec::new(),
        }
    }

    pub fn new_enum(index: u32, labels: Vec<String>, keyable: bool) -> Self {
        Self {
            value: Value::Enum(index),
            keyable,
            locked: false,
            enum_labels: Some(labels),
            keys: Vec::new(),
        }
    }

    /// Insert a key at `time`, replacing an existing key at the same time.
    pub fn insert_key(&mut self, time: f32, value: Value, interp: Interpolation) {
        let key = Keyframe {
            time,
            value,
            interp,
        };
        match self.keys.binary_search_by(|k| k.time.total_cmp(&time)) {
            Ok(i) => self.keys[i] = key,
            Err(i) => self.keys.insert(i, key),
        }
    }

    /// Sample the track at time t; None when the attribute has no keys.
    pub fn sample(&self, t: f32) -> Option<Value> {
        if self.keys.is_empty() {
            return None;
        }
        // Index of the last key at or before t.
        let idx = match self.keys.binary_search_by(|k| k.time.total_cmp(&t)) {
            Ok(i) => i,
            Err(0) => return Some(self.keys[0].value.clone()),
            Err(i) => i - 1,
        };
        let left = &self.keys[idx];
        match left.interp {
            Interpolation::Step => Some(left.value.clone()),
            Interpolation::Linear => {
                let right = match self.keys.get(idx + 1) {
                    Some(k) => k,
                    None => return Some(left.value.clone()),
                };
                let denom = (right.time - left.time).max(f32::EPSILON);
                let lt = ((t - left.time) / denom).clamp(0.0, 1.0);
                Some(lerp_value(&left.value, &right.value, lt))
            }
        }
    }
}

fn lerp_value(a: &Value, b: &Value, t: f32) -> Value {
    match (a, b) {
        (Value::Float(x), Value::Float(y)) => Value::Float(x + (y - x) * t),
        (Value::Vec3(x), Value::Vec3(y)) => Value::Vec3([
            x[0] + (y[0] - x[0]) * t,
            x[1] + (y[1] - x[1]) * t,
            x[2] + (y[2] - x[2]) * t,
        ]),
        // Discrete kinds hold left.
        _ => a.clone(),
    }
}
