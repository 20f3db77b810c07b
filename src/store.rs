//! Shared vertex store and per-model deformation output.
//!
//! Rest-pose vertex data is deduplicated across all submeshes of a model and
//! shared read-only. Each model instance owns one mutable output buffer the
//! size of the full store; submeshes write their deformed vertices into it
//! every tick, with a per-vertex visited marker preventing duplicate work
//! where submesh index ranges touch the same vertices.

use glam::{Vec3, Vec4};

/// Deduplicated, read-only rest-pose data shared by all submeshes of a model.
///
/// All arrays are indexed by global vertex index. `weights` and
/// `bone_indices` carry four slots per vertex; only the first
/// `max_bones_influence` slots of a submesh are meaningful, the rest may hold
/// arbitrary values and must not be read.
#[derive(Debug, Clone, Default)]
pub struct VertexStore {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub weights: Vec<Vec4>,
    pub bone_indices: Vec<[u16; 4]>,
    /// Triangle list, as global vertex indices. Each submesh owns a
    /// contiguous span of this buffer.
    pub indices: Vec<u32>,
}

impl VertexStore {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// The vertices a submesh touches within the shared store.
#[derive(Debug, Clone)]
pub enum VertexRange {
    /// The store guarantees the submesh's vertices form one contiguous run.
    /// Disjoint contiguous ranges allow per-submesh parallel updates.
    Contiguous { base: usize, count: usize },
    /// Explicit list of the vertices the submesh touches, for stores without
    /// contiguity. The blend walks this list instead of the triangle span;
    /// updates for such submeshes are serialized and deduplicated through
    /// visited markers.
    Indexed(Vec<u32>),
}

/// Mutable per-model output of the deformation units.
///
/// Positions and normals start as a copy of the rest pose and are overwritten
/// by every tick that passes the change gate. Visited markers are cleared at
/// the start of each tick, before any submesh writes.
#[derive(Debug)]
pub struct DeformedBuffer {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    visited: Vec<bool>,
}

/// A mutable window into a [`DeformedBuffer`], offset by `base`.
///
/// The full buffer is one window with `base == 0`; parallel updates split it
/// into disjoint windows, one per submesh.
pub struct DeformedView<'a> {
    pub base: usize,
    pub positions: &'a mut [Vec3],
    pub normals: &'a mut [Vec3],
    pub visited: &'a mut [bool],
}

impl DeformedBuffer {
    #[must_use]
    pub fn new(store: &VertexStore) -> Self {
        Self {
            positions: store.positions.clone(),
            normals: store.normals.clone(),
            visited: vec![false; store.vertex_count()],
        }
    }

    /// Clears the per-tick visited markers.
    pub fn clear_visited(&mut self) {
        self.visited.fill(false);
    }

    /// Single window over the whole buffer.
    pub fn full_view(&mut self) -> DeformedView<'_> {
        DeformedView {
            base: 0,
            positions: &mut self.positions,
            normals: &mut self.normals,
            visited: &mut self.visited,
        }
    }

    /// Splits the buffer into one window per range.
    ///
    /// Ranges must be sorted by base and pairwise disjoint; the caller
    /// (model load) validates this before enabling the parallel path.
    pub fn split_views(&mut self, ranges: &[(usize, usize)]) -> Vec<DeformedView<'_>> {
        let mut views = Vec::with_capacity(ranges.len());

        let mut positions = self.positions.as_mut_slice();
        let mut normals = self.normals.as_mut_slice();
        let mut visited = self.visited.as_mut_slice();
        let mut cursor = 0usize;

        for &(base, count) in ranges {
            debug_assert!(base >= cursor, "ranges must be sorted and disjoint");
            let skip = base - cursor;

            let (_, rest) = std::mem::take(&mut positions).split_at_mut(skip);
            let (window, rest) = rest.split_at_mut(count);
            positions = rest;
            let view_positions = window;

            let (_, rest) = std::mem::take(&mut normals).split_at_mut(skip);
            let (window, rest) = rest.split_at_mut(count);
            normals = rest;
            let view_normals = window;

            let (_, rest) = std::mem::take(&mut visited).split_at_mut(skip);
            let (window, rest) = rest.split_at_mut(count);
            visited = rest;
            let view_visited = window;

            views.push(DeformedView {
                base,
                positions: view_positions,
                normals: view_normals,
                visited: view_visited,
            });

            cursor = base + count;
        }

        views
    }
}
