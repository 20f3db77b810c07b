//! Weighted multi-bone vertex blend kernels.
//!
//! The influence count is a per-submesh constant between 1 and 4, so the
//! kernel is monomorphized per count instead of inspecting weights per
//! vertex. Slot 0 initializes the output directly; there is no rest-position
//! fallback, because a zero weight contributes exactly zero and unused
//! bone-index components land on the identity sentinel of the table.

use crate::bounds::BoundingBox;
use crate::store::{DeformedView, VertexStore};
use crate::table::BoneTable;

/// Result of one blend pass: the freshly accumulated bounding box and the
/// number of vertices actually written (visited-marker skips excluded).
pub(crate) struct BlendResult {
    pub bounds: BoundingBox,
    pub vertices_written: usize,
}

/// Blends every vertex referenced by `indices` into the output window.
///
/// Vertices already marked visited this tick are skipped; every written
/// vertex marks itself and expands the running bounding box.
pub(crate) fn blend_indexed(
    table: &BoneTable,
    store: &VertexStore,
    indices: &[u32],
    influence: usize,
    with_normals: bool,
    out: &mut DeformedView<'_>,
) -> BlendResult {
    match (influence, with_normals) {
        (1, false) => blend_span::<1, false>(table, store, indices, out),
        (2, false) => blend_span::<2, false>(table, store, indices, out),
        (3, false) => blend_span::<3, false>(table, store, indices, out),
        (4, false) => blend_span::<4, false>(table, store, indices, out),
        (1, true) => blend_span::<1, true>(table, store, indices, out),
        (2, true) => blend_span::<2, true>(table, store, indices, out),
        (3, true) => blend_span::<3, true>(table, store, indices, out),
        (4, true) => blend_span::<4, true>(table, store, indices, out),
        _ => unreachable!("influence count validated at model load"),
    }
}

fn blend_span<const INFLUENCE: usize, const NORMALS: bool>(
    table: &BoneTable,
    store: &VertexStore,
    indices: &[u32],
    out: &mut DeformedView<'_>,
) -> BlendResult {
    let mut bounds = BoundingBox::EMPTY;
    let mut written = 0;

    for &index in indices {
        let index = index as usize;
        let local = index - out.base;

        if out.visited[local] {
            continue; // another index already deformed this vertex this tick
        }
        out.visited[local] = true;

        let rest_position = store.positions[index];
        let weights = store.weights[index];
        let slots = store.bone_indices[index];

        let first = table.pose(slots[0] as usize);
        let mut position = (first.rotation * rest_position + first.translation) * weights.x;

        for slot in 1..INFLUENCE {
            let pose = table.pose(slots[slot] as usize);
            position += (pose.rotation * rest_position + pose.translation) * weights[slot];
        }

        out.positions[local] = position;

        if NORMALS {
            let rest_normal = store.normals[index];
            let mut normal = (first.rotation * rest_normal) * weights.x;
            for slot in 1..INFLUENCE {
                let pose = table.pose(slots[slot] as usize);
                normal += (pose.rotation * rest_normal) * weights[slot];
            }
            out.normals[local] = normal;
        }

        bounds.expand_by(position);
        written += 1;
    }

    BlendResult {
        bounds,
        vertices_written: written,
    }
}
