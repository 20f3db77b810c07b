//! Per-model update driver.
//!
//! A [`Model`] owns the mutable deformation output for one instance of a
//! shared vertex store and drives all of its submeshes once per simulation
//! tick. When every deformable submesh owns a disjoint contiguous vertex
//! range, the per-submesh updates fan out across the rayon pool; otherwise
//! they run sequentially and deduplicate shared vertices through the visited
//! markers.

use std::sync::Arc;

use glam::{Affine3A, Quat, Vec3};
use log::{debug, trace};
use parking_lot::Mutex;
use rayon::prelude::*;

use crate::bounds::BoundingBox;
use crate::errors::{MarrowError, Result};
use crate::pose::{AnimationMixer, PoseProvider};
use crate::settings::DeformSettings;
use crate::store::{DeformedBuffer, VertexRange, VertexStore};
use crate::submesh::{RenderStateSink, Submesh, SubmeshDesc};
use crate::table::MAX_TABLE_BONES;

/// Instrumentation for one tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickStats {
    /// Vertices written across all submeshes (visited skips excluded).
    pub vertices_written: usize,
    /// Submeshes that passed the change gate and re-blended.
    pub submeshes_blended: usize,
}

#[derive(Debug)]
struct RigidSubmesh {
    id: usize,
    name: String,
    mesh_id: usize,
    /// False for unrigged submeshes (zero bones), which are never updated.
    rigged: bool,
    /// Governing skeleton bone as of the last update. A change of bone
    /// invalidates `previous`.
    bone: Option<usize>,
    previous: Option<(Quat, Vec3)>,
}

/// One animated model instance over a shared vertex store.
#[derive(Debug)]
pub struct Model {
    store: Arc<VertexStore>,
    buffer: DeformedBuffer,
    submeshes: Vec<Submesh>,
    rigid: Vec<RigidSubmesh>,
    settings: DeformSettings,
    /// All deformable ranges are contiguous and pairwise disjoint, so
    /// updates may run in parallel over split buffer windows.
    disjoint: bool,
}

impl Model {
    /// Builds a model instance from submesh descriptions.
    ///
    /// Validates the asset up front: influence counts, rigid bone limits,
    /// index ranges and per-vertex bone indices. Any violation is a fatal
    /// configuration error, never silently clamped.
    pub fn load(
        store: Arc<VertexStore>,
        descs: Vec<SubmeshDesc>,
        settings: DeformSettings,
    ) -> Result<Self> {
        let mut submeshes = Vec::new();
        let mut rigid = Vec::new();

        for desc in descs {
            if desc.rigid || desc.max_bones_influence == 0 {
                if desc.max_bones_influence > 1 {
                    return Err(MarrowError::RigidBoneCount {
                        submesh: desc.id,
                        count: desc.max_bones_influence,
                    });
                }
                rigid.push(RigidSubmesh {
                    id: desc.id,
                    name: desc.name,
                    mesh_id: desc.mesh_id,
                    rigged: desc.max_bones_influence == 1,
                    bone: None,
                    previous: None,
                });
                continue;
            }

            if !(1..=4).contains(&desc.max_bones_influence) {
                return Err(MarrowError::InvalidBoneInfluence {
                    submesh: desc.id,
                    count: desc.max_bones_influence,
                });
            }

            validate_desc(&store, &desc)?;
            let rest_bounds = rest_bounds(&store, &desc);
            submeshes.push(Submesh::new(desc, rest_bounds));
        }

        // Sort by range base so the parallel path can split the output
        // buffer front to back.
        submeshes.sort_by_key(|submesh| match submesh.desc().range {
            VertexRange::Contiguous { base, .. } => base,
            VertexRange::Indexed(_) => usize::MAX,
        });
        let disjoint = ranges_disjoint(&submeshes);

        debug!(
            "model loaded: {} deformable + {} rigid submeshes, {} vertices, parallel={}",
            submeshes.len(),
            rigid.len(),
            store.vertex_count(),
            disjoint
        );

        let buffer = DeformedBuffer::new(&store);

        Ok(Self {
            store,
            buffer,
            submeshes,
            rigid,
            settings,
            disjoint,
        })
    }

    #[inline]
    pub fn settings(&self) -> &DeformSettings {
        &self.settings
    }

    /// Deformable submeshes, in update order.
    #[inline]
    pub fn submeshes(&self) -> &[Submesh] {
        &self.submeshes
    }

    /// Looks up a deformable submesh by name.
    pub fn submesh(&self, name: &str) -> Result<&Submesh> {
        self.submeshes
            .iter()
            .find(|submesh| submesh.desc().name == name)
            .ok_or_else(|| MarrowError::SubmeshNotFound(name.to_string()))
    }

    /// Currently deformed vertex positions, indexed by global vertex index.
    #[inline]
    pub fn deformed_positions(&self) -> &[Vec3] {
        &self.buffer.positions
    }

    /// Currently deformed vertex normals, indexed by global vertex index.
    #[inline]
    pub fn deformed_normals(&self) -> &[Vec3] {
        &self.buffer.normals
    }

    /// Advances the mixer and updates every submesh for one tick.
    ///
    /// Does nothing when the mixer has no active animations. A returned
    /// error means the frame was not rendered; ticks are not resumable.
    pub fn tick<M, P, S>(
        &mut self,
        dt: f32,
        mixer: &mut M,
        provider: &mut P,
        sink: &S,
    ) -> Result<TickStats>
    where
        M: AnimationMixer + ?Sized,
        P: PoseProvider + Send + ?Sized,
        S: RenderStateSink + Sync + ?Sized,
    {
        if !mixer.has_active_animations() {
            trace!("tick skipped: no active animations");
            return Ok(TickStats::default());
        }
        mixer.advance(dt);

        self.buffer.clear_visited();

        let provider = Mutex::new(provider);
        let mut stats = TickStats::default();

        if self.disjoint {
            let ranges: Vec<(usize, usize)> = self
                .submeshes
                .iter()
                .map(|submesh| match submesh.desc().range {
                    VertexRange::Contiguous { base, count } => (base, count),
                    VertexRange::Indexed(_) => unreachable!("disjoint implies contiguous"),
                })
                .collect();
            let views = self.buffer.split_views(&ranges);

            let store = &*self.store;
            let settings = self.settings;
            let provider = &provider;

            let written: Result<Vec<Option<usize>>> = self
                .submeshes
                .par_iter_mut()
                .zip(views)
                .map(|(submesh, mut view)| {
                    submesh.update(provider, store, &settings, sink, &mut view)
                })
                .collect();

            for blended in written? {
                if let Some(count) = blended {
                    stats.vertices_written += count;
                    stats.submeshes_blended += 1;
                }
            }
        } else {
            for submesh in &mut self.submeshes {
                let mut view = self.buffer.full_view();
                if let Some(count) =
                    submesh.update(&provider, &self.store, &self.settings, sink, &mut view)?
                {
                    stats.vertices_written += count;
                    stats.submeshes_blended += 1;
                }
            }
        }

        self.update_rigid(&provider, sink)?;

        Ok(stats)
    }

    /// Rigid fast path: one whole-submesh transform per governing bone,
    /// pushed to the sink only when that bone moved.
    fn update_rigid<P, S>(&mut self, provider: &Mutex<&mut P>, sink: &S) -> Result<()>
    where
        P: PoseProvider + ?Sized,
        S: RenderStateSink + ?Sized,
    {
        for submesh in &mut self.rigid {
            if !submesh.rigged {
                continue; // unrigged: stays at its load-time placement
            }

            let sample = {
                let mut provider = provider.lock();
                provider.select_mesh(submesh.mesh_id);

                let count = provider.bones_count();
                if count > 1 {
                    return Err(MarrowError::RigidBoneCount {
                        submesh: submesh.id,
                        count,
                    });
                }
                if count == 0 {
                    None
                } else {
                    Some((
                        provider.bone_id(0),
                        provider.bone_rotation(0),
                        provider.bone_translation(0),
                    ))
                }
            };

            let Some((bone, rotation, translation)) = sample else {
                continue;
            };
            if submesh.bone != Some(bone) {
                // A different governing bone invalidates the cached pose even
                // when the transform happens to match.
                submesh.bone = Some(bone);
                submesh.previous = None;
            }
            if submesh.previous == Some((rotation, translation)) {
                continue; // governing bone did not move
            }
            submesh.previous = Some((rotation, translation));

            trace!(
                "rigid submesh {} ({}) follows bone {:?}",
                submesh.id, submesh.name, submesh.bone
            );
            sink.set_rigid_transform(
                submesh.id,
                Affine3A::from_rotation_translation(rotation, translation),
            )?;
        }

        Ok(())
    }
}

fn validate_desc(store: &VertexStore, desc: &SubmeshDesc) -> Result<()> {
    let end = desc.index_offset + desc.index_count;
    if end > store.indices.len() {
        return Err(MarrowError::VertexIndexOutOfRange {
            submesh: desc.id,
            index: end as u32,
        });
    }

    match &desc.range {
        VertexRange::Contiguous { base, count } => {
            if base + count > store.vertex_count() {
                return Err(MarrowError::VertexIndexOutOfRange {
                    submesh: desc.id,
                    index: (base + count) as u32,
                });
            }
            for &index in &store.indices[desc.index_offset..end] {
                if (index as usize) < *base || (index as usize) >= base + count {
                    return Err(MarrowError::VertexIndexOutOfRange {
                        submesh: desc.id,
                        index,
                    });
                }
                validate_bone_slots(store, desc, index)?;
            }
        }
        VertexRange::Indexed(list) => {
            // The triangle span may reference vertices outside the touched
            // set; it still has to stay within the store.
            for &index in &store.indices[desc.index_offset..end] {
                if (index as usize) >= store.vertex_count() {
                    return Err(MarrowError::VertexIndexOutOfRange {
                        submesh: desc.id,
                        index,
                    });
                }
            }
            for &index in list {
                if (index as usize) >= store.vertex_count() {
                    return Err(MarrowError::VertexIndexOutOfRange {
                        submesh: desc.id,
                        index,
                    });
                }
                validate_bone_slots(store, desc, index)?;
            }
        }
    }

    Ok(())
}

fn validate_bone_slots(store: &VertexStore, desc: &SubmeshDesc, index: u32) -> Result<()> {
    let slots = store.bone_indices[index as usize];
    for slot in 0..desc.max_bones_influence {
        if slots[slot] as usize >= MAX_TABLE_BONES {
            return Err(MarrowError::BoneIndexOutOfRange {
                submesh: desc.id,
                index: slots[slot],
            });
        }
    }
    Ok(())
}

/// Rest-pose bounding box over the vertices a submesh references.
fn rest_bounds(store: &VertexStore, desc: &SubmeshDesc) -> BoundingBox {
    let mut bounds = BoundingBox::EMPTY;
    let end = desc.index_offset + desc.index_count;
    for &index in &store.indices[desc.index_offset..end] {
        bounds.expand_by(store.positions[index as usize]);
    }
    bounds
}

fn ranges_disjoint(submeshes: &[Submesh]) -> bool {
    if submeshes.is_empty() {
        return false;
    }

    let mut cursor = 0usize;
    for submesh in submeshes {
        match submesh.desc().range {
            VertexRange::Contiguous { base, count } => {
                if base < cursor {
                    return false; // overlaps the previous range
                }
                cursor = base + count;
            }
            VertexRange::Indexed(_) => return false,
        }
    }
    true
}
