//! Rigid poses: the translation + rotation pairs the host graph computes
//! and the constraint offsets are expressed in.
//!
//! The wire form of an offset is a pair of Vec3 attributes (translation,
//! XYZ euler radians); internally everything composes through
//! `nalgebra::Isometry3`.

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RigidPose {
    pub translation: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
}

impl Default for RigidPose {
    fn default() -> Self {
        Self::identity()
    }
}

impl RigidPose {
    pub fn identity() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
        }
    }

    pub fn new(translation: Vector3<f32>, rotation: UnitQuaternion<f32>) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Build from the attribute wire form: translation + XYZ euler radians.
    pub fn from_offset_parts(translation: [f32; 3], euler: [f32; 3]) -> Self {
        Self {
            translation: Vector3::from(translation),
            rotation: UnitQuaternion::from_euler_angles(euler[0], euler[1], euler[2]),
        }
    }

    /// Decompose into the attribute wire form: translation + XYZ euler radians.
    pub fn offset_parts(&self) -> ([f32; 3], [f32; 3]) {
        let (r, p, y) = self.rotation.euler_angles();
        (self.translation.into(), [r, p, y])
    }

    pub fn to_isometry(&self) -> Isometry3<f32> {
        Isometry3::from_parts(Translation3::from(self.translation), self.rotation)
    }

    pub fn from_isometry(iso: &Isometry3<f32>) -> Self {
        Self {
            translation: iso.translation.vector,
            rotation: iso.rotation,
        }
    }

    /// Compose: the pose of `local` expressed in this frame (`self * local`).
    pub fn transform(&self, local: &RigidPose) -> RigidPose {
        RigidPose::from_isometry(&(self.to_isometry() * local.to_isometry()))
    }

    pub fn inverse(&self) -> RigidPose {
        RigidPose::from_isometry(&self.to_isometry().inverse())
    }

    /// Express this pose relative to `frame`: `frame⁻¹ * self`.
    ///
    /// This is the continuity solve: with `self` a node's world pose and
    /// `frame` a target's world pose, the result is the offset that keeps
    /// the node's world pose invariant once the target drives it.
    pub fn relative_to(&self, frame: &RigidPose) -> RigidPose {
        RigidPose::from_isometry(&(frame.to_isometry().inverse() * self.to_isometry()))
    }
}
