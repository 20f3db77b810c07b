//! Runtime skeletal deformation engine.
//!
//! marrow turns a time-varying skeleton pose into deformed mesh vertices and
//! render-state decisions, once per simulation tick:
//!
//! - samples per-bone rotation/translation through a [`PoseProvider`] into a
//!   fixed-size bone transform table with an identity sentinel slot,
//! - classifies each submesh as static or deformed with scale-aware epsilon
//!   tolerances ([`DeformSettings`]) and tells the render substrate only on
//!   transitions ([`RenderStateSink`]),
//! - skips the per-vertex blend when the pose barely changed since the last
//!   tick, and otherwise runs a branch-free weighted blend specialized per
//!   bone-influence count (1–4) over shared, deduplicated vertex buffers,
//! - moves rigid submeshes as a whole under their single governing bone.
//!
//! Keyframe evaluation, scene graph, materials and file formats live outside
//! this crate and are consumed through the traits in [`pose`].

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod blend;

pub mod bounds;
pub mod errors;
pub mod model;
pub mod pose;
pub mod settings;
pub mod store;
pub mod submesh;
pub mod table;

pub use bounds::BoundingBox;
pub use errors::{MarrowError, Result};
pub use model::{Model, TickStats};
pub use pose::{AnimationMixer, PoseProvider};
pub use settings::DeformSettings;
pub use store::{DeformedBuffer, DeformedView, VertexRange, VertexStore};
pub use submesh::{RenderPath, RenderStateSink, Submesh, SubmeshDesc, SubmeshKind};
pub use table::{BonePose, BoneTable, MAX_TABLE_BONES, SENTINEL_SLOT};
