//! Math utilities and types
//!
//! Provides the local pose type carried by every scene node, together with
//! the tolerant comparisons the bone-merge qualifier relies on.

use serde::{Deserialize, Serialize};

pub use nalgebra::{Quaternion, Unit, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Squared distance below which two vectors compare equal
pub const VECTOR_EPSILON_SQUARED: f32 = 1e-10;

/// Quaternions whose dot product exceeds this value compare equal
pub const QUATERNION_DOT_THRESHOLD: f32 = 0.999_999;

/// Local transform representing position, rotation, and scale relative to the parent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Position relative to the parent node
    pub position: Vec3,
    
    /// Rotation relative to the parent node
    pub rotation: Quat,
    
    /// Scale factors relative to the parent node
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }
    
    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }
    
    /// Builder pattern: Set rotation
    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }
    
    /// Builder pattern: Set scale (non-uniform)
    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }
    
    /// Whether this transform leaves its children exactly where they are
    ///
    /// Components are compared with a small tolerance, and rotations are
    /// compared by their dot product so `q` and `-q` count as the same.
    pub fn is_identity(&self) -> bool {
        approximately_equal(&self.position, &Vec3::zeros())
            && approximately_equal(&self.scale, &Vec3::new(1.0, 1.0, 1.0))
            && self.rotation.coords.dot(&Quat::identity().coords).abs() > QUATERNION_DOT_THRESHOLD
    }
}

/// Tolerant vector equality
pub fn approximately_equal(a: &Vec3, b: &Vec3) -> bool {
    (a - b).magnitude_squared() < VECTOR_EPSILON_SQUARED
}

/// Whether a scale can be pushed down into child translations without shear
///
/// Every pairwise axis ratio must sit within half a percent of one. Mirrored
/// axes produce negative ratios and are rejected.
pub fn scaled_evenly(scale: &Vec3) -> bool {
    fn check_ratio(ratio: f32) -> bool {
        0.995 < ratio && ratio < 1.005
    }
    
    check_ratio(scale.x / scale.y) && check_ratio(scale.x / scale.z) && check_ratio(scale.y / scale.z)
}
