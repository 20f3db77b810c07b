//! Deformation tolerance settings.
//!
//! Upstream pose sampling may report numerically-nonzero but semantically
//! identity transforms for bones that are not actually animated. These
//! tolerances decide when a submesh counts as deformed and when a re-blend
//! can be skipped. They are plain configuration passed in at model load, not
//! process-global state.

/// Epsilon policy for deformation detection and change gating.
///
/// The translation tolerance is relative to the submesh bounding-box radius;
/// the rotation tolerance is an absolute bound on the vector part of the
/// sampled unit quaternion. The two are deliberately kept independent:
/// the rotation bound papers over precision loss in upstream skeleton
/// evaluation and does not scale with any model unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeformSettings {
    /// Translation magnitude threshold, as a fraction of the submesh
    /// bounding-box radius. A bone whose bone-space translation exceeds
    /// `radius * translation_epsilon` marks the submesh deformed.
    pub translation_epsilon: f32,

    /// Absolute threshold on the quaternion vector-part magnitude. A bone
    /// whose rotation exceeds it marks the submesh deformed.
    pub rotation_epsilon: f32,

    /// Squared-distance threshold between the current and previous bone
    /// transform tables below which the per-vertex blend is skipped.
    pub reblend_epsilon: f32,
}

impl Default for DeformSettings {
    fn default() -> Self {
        Self {
            translation_epsilon: 1e-5,
            rotation_epsilon: 1e-6,
            reblend_epsilon: 1e-7,
        }
    }
}
