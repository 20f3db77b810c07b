//! Consumed interfaces: skeleton pose sampling and the animation mixer.
//!
//! The runtime never evaluates keyframes itself. A [`PoseProvider`] hands it
//! per-bone rotations and translations in bone space for the current skeleton
//! evaluation, and an [`AnimationMixer`] advances that evaluation each tick.

use glam::{Quat, Vec3};

/// Source of per-bone transforms for the current skeleton evaluation.
///
/// Providers are stateful per submesh: [`select_mesh`](Self::select_mesh)
/// must be called before querying bones for that submesh, and the whole
/// select-then-query sequence is not assumed reentrant. The update driver
/// serializes access with a mutex, so implementations do not need internal
/// locking.
pub trait PoseProvider {
    /// Switches the provider's bone-query context to the given submesh.
    fn select_mesh(&mut self, mesh_id: usize);

    /// Number of bones influencing the selected submesh.
    fn bones_count(&self) -> usize;

    /// Global skeleton bone id for a submesh-local bone index.
    fn bone_id(&self, local_index: usize) -> usize;

    /// Bone-space rotation of a submesh-local bone, as a unit quaternion.
    fn bone_rotation(&self, local_index: usize) -> Quat;

    /// Bone-space translation of a submesh-local bone.
    fn bone_translation(&self, local_index: usize) -> Vec3;
}

/// External animation mixer driving the skeleton evaluation.
pub trait AnimationMixer {
    /// Advances active animations and re-evaluates the skeleton.
    fn advance(&mut self, dt: f32);

    /// Whether any action or cycle is currently playing. When nothing is
    /// active the whole tick is skipped; per-submesh updates are several
    /// times more expensive than the mixer advance alone.
    fn has_active_animations(&self) -> bool;
}
