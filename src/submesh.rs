//! Per-submesh deformation unit.
//!
//! Each deformable submesh owns its bone transform table, the previous
//! tick's table for change gating, and a static/deformed render-path
//! selector. Hardware submeshes keep their table exposed as shader-uniform
//! data and re-blend positions CPU-side so picking and culling keep working;
//! software submeshes additionally blend normals.

use glam::Affine3A;
use log::trace;
use parking_lot::Mutex;

use crate::blend::blend_indexed;
use crate::bounds::BoundingBox;
use crate::errors::Result;
use crate::pose::PoseProvider;
use crate::settings::DeformSettings;
use crate::store::{DeformedView, VertexRange, VertexStore};
use crate::table::BoneTable;

/// Which render path a submesh is currently on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPath {
    /// Resting pose: the undeformed state set / shader variant.
    Static,
    /// Actively deformed: the skinning state set / shader variant.
    Deformed,
}

/// Where the final vertex transform happens for a submesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmeshKind {
    /// GPU skinning via shader uniforms; the CPU re-blend only maintains
    /// positions and the bounding box.
    Hardware,
    /// Full CPU skinning: positions and normals written every re-blend.
    Software,
}

/// Render substrate callbacks, invoked on observed changes only.
///
/// Both calls may fail when the substrate cannot provide the requested state
/// (e.g. a shader program failed to build); such errors abort the tick.
pub trait RenderStateSink {
    /// Binds the state set / shader variant matching the submesh's current
    /// deformation verdict. Called only on `Static`/`Deformed` transitions.
    fn set_active_state(&self, submesh: usize, path: RenderPath) -> Result<()>;

    /// Applies the whole-submesh transform of a rigid submesh. Called only
    /// when its governing bone has moved since the last tick.
    fn set_rigid_transform(&self, submesh: usize, transform: Affine3A) -> Result<()>;
}

/// Static description of one submesh, handed to [`Model::load`].
///
/// [`Model::load`]: crate::model::Model::load
#[derive(Debug, Clone)]
pub struct SubmeshDesc {
    /// Caller-assigned handle, echoed back through [`RenderStateSink`].
    pub id: usize,
    pub name: String,
    /// Provider-side id passed to `select_mesh` before bone queries.
    pub mesh_id: usize,
    pub kind: SubmeshKind,
    /// Number of meaningful weight/bone-index slots per vertex, 1..=4.
    /// Zero means the submesh has no bone influence and takes the rigid path.
    pub max_bones_influence: usize,
    /// Rigid submeshes are never blended per vertex; they move as a whole
    /// under at most one bone.
    pub rigid: bool,
    /// Span of this submesh's triangles within the store's index buffer.
    pub index_offset: usize,
    pub index_count: usize,
    pub range: VertexRange,
}

/// Runtime state of one deformable submesh.
#[derive(Debug)]
pub struct Submesh {
    desc: SubmeshDesc,
    table: BoneTable,
    previous: BoneTable,
    path: RenderPath,
    bounds: BoundingBox,
}

impl Submesh {
    pub(crate) fn new(desc: SubmeshDesc, rest_bounds: BoundingBox) -> Self {
        Self {
            desc,
            table: BoneTable::identity(),
            previous: BoneTable::identity(),
            path: RenderPath::Static,
            bounds: rest_bounds,
        }
    }

    #[inline]
    pub fn desc(&self) -> &SubmeshDesc {
        &self.desc
    }

    #[inline]
    pub fn is_deformed(&self) -> bool {
        self.path == RenderPath::Deformed
    }

    /// Current bounding box: the rest box until the first blend, then the
    /// box accumulated by the latest blend.
    #[inline]
    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounds
    }

    /// Current bone transform table. For hardware submeshes this is the
    /// uniform data (`rotationMatrices` / `translationVectors`) the renderer
    /// binds for the skinning shader, sentinel slot included.
    #[inline]
    pub fn bone_table(&self) -> &BoneTable {
        &self.table
    }

    /// Runs one tick for this submesh: resample bones, reselect the render
    /// path, and re-blend vertices unless the pose barely changed.
    ///
    /// Returns the number of vertices written, or `None` when the change
    /// gate skipped the blend (output buffer and bounding box untouched).
    pub(crate) fn update<P, S>(
        &mut self,
        provider: &Mutex<&mut P>,
        store: &VertexStore,
        settings: &DeformSettings,
        sink: &S,
        out: &mut DeformedView<'_>,
    ) -> Result<Option<usize>>
    where
        P: PoseProvider + ?Sized,
        S: RenderStateSink + ?Sized,
    {
        let bounds_radius = self.bounds.radius();

        // The provider is stateful per submesh: keep select_mesh and the
        // bone queries inside one critical section.
        let deformed = {
            let mut provider = provider.lock();
            provider.select_mesh(self.desc.mesh_id);
            self.table.rebuild(&**provider, bounds_radius, settings)
        };

        let path = if deformed {
            RenderPath::Deformed
        } else {
            RenderPath::Static
        };
        if path != self.path {
            trace!(
                "submesh {} ({}): {:?} -> {:?}",
                self.desc.id, self.desc.name, self.path, path
            );
            sink.set_active_state(self.desc.id, path)?;
            self.path = path;
        }

        if self.table.delta(&self.previous) < settings.reblend_epsilon {
            return Ok(None); // pose barely moved since last blend
        }
        self.previous = self.table.clone();

        // Contiguous submeshes deform every vertex their triangles reference;
        // an explicit range is the touched set itself.
        let indices: &[u32] = match &self.desc.range {
            VertexRange::Contiguous { .. } => {
                &store.indices
                    [self.desc.index_offset..self.desc.index_offset + self.desc.index_count]
            }
            VertexRange::Indexed(list) => list,
        };
        let with_normals = self.desc.kind == SubmeshKind::Software;

        let result = blend_indexed(
            &self.table,
            store,
            indices,
            self.desc.max_bones_influence,
            with_normals,
            out,
        );

        if result.bounds.is_valid() {
            self.bounds = result.bounds;
        }

        Ok(Some(result.vertices_written))
    }
}