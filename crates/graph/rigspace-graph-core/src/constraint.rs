//! Weighted multi-parent constraints.
//!
//! A constraint drives one node's translate and rotate channels from a
//! weighted blend of (target pose ⊕ offset). Per-target offset and weight
//! inputs are plugs: either constants or connections reading a node
//! attribute, so several plugs can share one driving attribute.

use serde::{Deserialize, Serialize};

use crate::ids::{ConstraintId, NodeId};
use crate::transform::RigidPose;
use crate::value::Value;

/// A constraint input: a constant, or a connection to a node attribute.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Plug {
    Value(Value),
    Attr { node: NodeId, attr: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConstraintTarget {
    pub node: NodeId,
    pub offset_translate: Plug,
    pub offset_rotate: Plug,
    pub weight: Plug,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightedConstraint {
    pub id: ConstraintId,
    pub driven: NodeId,
    pub targets: Vec<ConstraintTarget>,
}

const MIN_TOTAL_WEIGHT: f32 = 1e-6;

/// Blend weighted poses: translation as a normalized weighted sum, rotation
/// as a weighted quaternion accumulate (hemisphere-aligned to the first
/// contribution) normalized at the end. Exact for one-hot weights. Returns
/// None when the total weight is effectively zero.
pub fn blend_poses(entries: &[(RigidPose, f32)]) -> Option<RigidPose> {
    let mut t_sum = [0.0f32; 3];
    let mut r_sum = [0.0f32; 4];
    let mut total = 0.0f32;
    let mut first_q: Option<[f32; 4]> = None;

    for (pose, w) in entries {
        if *w <= 0.0 {
            continue;
        }
        t_sum[0] += pose.translation.x * w;
        t_sum[1] += pose.translation.y * w;
        t_sum[2] += pose.translation.z * w;

        let q = pose.rotation.quaternion();
        let mut qv = [q.i, q.j, q.k, q.w];
        if let Some(anchor) = first_q {
            let dot =
                qv[0] * anchor[0] + qv[1] * anchor[1] + qv[2] * anchor[2] + qv[3] * anchor[3];
            if dot < 0.0 {
                qv = [-qv[0], -qv[1], -qv[2], -qv[3]];
            }
        } else {
            first_q = Some(qv);
        }
        r_sum[0] += qv[0] * w;
        r_sum[1] += qv[1] * w;
        r_sum[2] += qv[2] * w;
        r_sum[3] += qv[3] * w;

        total += w;
    }

    if total < MIN_TOTAL_WEIGHT {
        return None;
    }

    let translation =
        nalgebra::Vector3::new(t_sum[0] / total, t_sum[1] / total, t_sum[2] / total);
    let rotation = nalgebra::UnitQuaternion::new_normalize(nalgebra::Quaternion::new(
        r_sum[3], r_sum[0], r_sum[1], r_sum[2],
    ));
    Some(RigidPose::new(translation, rotation))
}
