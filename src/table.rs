//! Per-submesh bone transform table.
//!
//! Each deformable submesh rebuilds a fixed-size table of bone-space
//! rotation/translation pairs every tick, indexed by the submesh-local bone
//! indices stored per vertex. The last slot is pinned to identity so that
//! unused bone-index components resolve to a no-op without branching in the
//! blend kernels.

use glam::{Mat3, Vec3};

use crate::pose::PoseProvider;
use crate::settings::DeformSettings;

/// Table capacity, matching the uniform array size of the skinning shader.
pub const MAX_TABLE_BONES: usize = 31;

/// Slot that always holds the identity transform.
pub const SENTINEL_SLOT: usize = MAX_TABLE_BONES - 1;

/// A single bone's transform in bone space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BonePose {
    pub rotation: Mat3,
    pub translation: Vec3,
}

impl BonePose {
    pub const IDENTITY: Self = Self {
        rotation: Mat3::IDENTITY,
        translation: Vec3::ZERO,
    };
}

/// Bone transform table for one submesh, rebuilt every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneTable {
    poses: [BonePose; MAX_TABLE_BONES],
    used: usize,
}

impl BoneTable {
    #[must_use]
    pub fn identity() -> Self {
        Self {
            poses: [BonePose::IDENTITY; MAX_TABLE_BONES],
            used: 0,
        }
    }

    /// Number of sampled (non-sentinel) entries.
    #[inline]
    pub fn used(&self) -> usize {
        self.used
    }

    #[inline]
    pub fn pose(&self, slot: usize) -> &BonePose {
        &self.poses[slot]
    }

    /// All slots, sentinel included, in shader-uniform order.
    #[inline]
    pub fn poses(&self) -> &[BonePose; MAX_TABLE_BONES] {
        &self.poses
    }

    /// Resamples the table from the provider's currently selected submesh.
    ///
    /// Returns `true` when any sampled bone deviates from identity beyond the
    /// configured tolerances: translation magnitude above
    /// `bounds_radius * translation_epsilon`, or quaternion vector part above
    /// `rotation_epsilon`. Slots past the sampled count are reset to
    /// identity, which keeps the sentinel invariant after every rebuild.
    ///
    /// The caller must hold exclusive access to the provider and have called
    /// `select_mesh` for this submesh.
    pub fn rebuild<P: PoseProvider + ?Sized>(
        &mut self,
        provider: &P,
        bounds_radius: f32,
        settings: &DeformSettings,
    ) -> bool {
        let count = provider.bones_count().min(SENTINEL_SLOT);
        let translation_limit = bounds_radius * settings.translation_epsilon;
        let rotation_limit = settings.rotation_epsilon;

        let mut deformed = false;

        for local in 0..count {
            let rotation = provider.bone_rotation(local);
            let translation = provider.bone_translation(local);

            if translation.length_squared() > translation_limit * translation_limit
                || rotation.xyz().length_squared() > rotation_limit * rotation_limit
            {
                deformed = true;
            }

            self.poses[local] = BonePose {
                rotation: Mat3::from_quat(rotation),
                translation,
            };
        }

        for slot in count..MAX_TABLE_BONES {
            self.poses[slot] = BonePose::IDENTITY;
        }

        self.used = count;
        deformed
    }

    /// Scalar distance to another table, restricted to the sampled entries:
    /// sum of squared component-wise rotation differences plus squared
    /// translation distances. Used to gate the per-vertex re-blend.
    #[must_use]
    pub fn delta(&self, other: &BoneTable) -> f32 {
        let used = self.used.max(other.used);
        let mut total = 0.0;

        for slot in 0..used {
            let a = &self.poses[slot];
            let b = &other.poses[slot];

            let dr = a.rotation - b.rotation;
            total += dr.x_axis.length_squared()
                + dr.y_axis.length_squared()
                + dr.z_axis.length_squared();
            total += a.translation.distance_squared(b.translation);
        }

        total
    }
}

impl Default for BoneTable {
    fn default() -> Self {
        Self::identity()
    }
}
