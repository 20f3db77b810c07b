//! Shared test fixtures: a scriptable skeleton, a counting mixer and a
//! recording render-state sink.

#![allow(dead_code)]

use glam::{Affine3A, Quat, Vec3, Vec4};
use parking_lot::Mutex;

use marrow::{
    AnimationMixer, MarrowError, PoseProvider, RenderPath, RenderStateSink, Result, SubmeshDesc,
    SubmeshKind, VertexRange, VertexStore,
};

/// Bones of one submesh on the fake skeleton.
#[derive(Clone, Default)]
pub struct MeshBones {
    pub ids: Vec<usize>,
    pub poses: Vec<(Quat, Vec3)>,
}

/// Pose provider with scriptable per-submesh bone transforms.
#[derive(Default)]
pub struct TestSkeleton {
    pub meshes: Vec<MeshBones>,
    pub selected: usize,
}

impl TestSkeleton {
    pub fn single_bone(rotation: Quat, translation: Vec3) -> Self {
        Self {
            meshes: vec![MeshBones {
                ids: vec![0],
                poses: vec![(rotation, translation)],
            }],
            selected: 0,
        }
    }

    pub fn set_pose(&mut self, mesh: usize, local: usize, rotation: Quat, translation: Vec3) {
        self.meshes[mesh].poses[local] = (rotation, translation);
    }
}

impl PoseProvider for TestSkeleton {
    fn select_mesh(&mut self, mesh_id: usize) {
        self.selected = mesh_id;
    }

    fn bones_count(&self) -> usize {
        self.meshes[self.selected].poses.len()
    }

    fn bone_id(&self, local_index: usize) -> usize {
        self.meshes[self.selected].ids[local_index]
    }

    fn bone_rotation(&self, local_index: usize) -> Quat {
        self.meshes[self.selected].poses[local_index].0
    }

    fn bone_translation(&self, local_index: usize) -> Vec3 {
        self.meshes[self.selected].poses[local_index].1
    }
}

/// Mixer that counts advances and can be switched off.
pub struct TestMixer {
    pub active: bool,
    pub advanced: u32,
}

impl TestMixer {
    pub fn active() -> Self {
        Self {
            active: true,
            advanced: 0,
        }
    }

    pub fn idle() -> Self {
        Self {
            active: false,
            advanced: 0,
        }
    }
}

impl AnimationMixer for TestMixer {
    fn advance(&mut self, _dt: f32) {
        self.advanced += 1;
    }

    fn has_active_animations(&self) -> bool {
        self.active
    }
}

/// Sink recording every state-set and rigid-transform call.
#[derive(Default)]
pub struct RecordingSink {
    pub states: Mutex<Vec<(usize, RenderPath)>>,
    pub rigid: Mutex<Vec<(usize, Affine3A)>>,
}

impl RecordingSink {
    pub fn state_events(&self) -> Vec<(usize, RenderPath)> {
        self.states.lock().clone()
    }

    pub fn rigid_events(&self) -> Vec<(usize, Affine3A)> {
        self.rigid.lock().clone()
    }
}

impl RenderStateSink for RecordingSink {
    fn set_active_state(&self, submesh: usize, path: RenderPath) -> Result<()> {
        self.states.lock().push((submesh, path));
        Ok(())
    }

    fn set_rigid_transform(&self, submesh: usize, transform: Affine3A) -> Result<()> {
        self.rigid.lock().push((submesh, transform));
        Ok(())
    }
}

/// Sink standing in for a substrate whose state sets failed to build; every
/// call fails.
pub struct FailingSink;

impl RenderStateSink for FailingSink {
    fn set_active_state(&self, _submesh: usize, _path: RenderPath) -> Result<()> {
        Err(MarrowError::StateUnavailable(
            "state set not built".to_string(),
        ))
    }

    fn set_rigid_transform(&self, _submesh: usize, _transform: Affine3A) -> Result<()> {
        Err(MarrowError::StateUnavailable(
            "state set not built".to_string(),
        ))
    }
}

/// Store with two vertices at (-1,0,0) and (1,0,0), rest bounding-box radius
/// exactly 1, single bone influence on table slot 0.
pub fn two_point_store() -> VertexStore {
    VertexStore {
        positions: vec![Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)],
        normals: vec![Vec3::Z, Vec3::Z],
        weights: vec![Vec4::new(1.0, 0.0, 0.0, 0.0); 2],
        bone_indices: vec![[0, 30, 30, 30]; 2],
        indices: vec![0, 1, 0],
    }
}

/// Description of a single deformable submesh covering a whole store.
pub fn whole_store_desc(kind: SubmeshKind, influence: usize, store: &VertexStore) -> SubmeshDesc {
    SubmeshDesc {
        id: 0,
        name: "submesh0".to_string(),
        mesh_id: 0,
        kind,
        max_bones_influence: influence,
        rigid: false,
        index_offset: 0,
        index_count: store.indices.len(),
        range: VertexRange::Contiguous {
            base: 0,
            count: store.vertex_count(),
        },
    }
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

pub fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    approx(a.x, b.x) && approx(a.y, b.y) && approx(a.z, b.z)
}
