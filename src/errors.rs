//! Error Types
//!
//! The main error type [`MarrowError`] covers the failure modes of the
//! deformation runtime. Configuration errors indicate a corrupt asset and are
//! never recoverable; render-substrate errors are propagated as-is so the
//! caller can treat the frame as not rendered.

use thiserror::Error;

/// The main error type for the marrow runtime.
#[derive(Error, Debug)]
pub enum MarrowError {
    // ========================================================================
    // Configuration Errors (corrupt asset, fail fast)
    // ========================================================================
    /// A deformable submesh declares a bone influence count outside 1..=4.
    #[error("submesh {submesh} has {count} bone influences (expected 1-4)")]
    InvalidBoneInfluence {
        /// Caller-assigned submesh id
        submesh: usize,
        /// The declared influence count
        count: usize,
    },

    /// A rigid submesh is driven by more than one bone.
    #[error("more than one bone ({count}) in rigid submesh {submesh}")]
    RigidBoneCount {
        /// Caller-assigned submesh id
        submesh: usize,
        /// Bone count reported for the submesh
        count: usize,
    },

    /// A triangle index references a vertex outside the submesh's range.
    #[error("vertex index {index} out of range for submesh {submesh}")]
    VertexIndexOutOfRange {
        /// Caller-assigned submesh id
        submesh: usize,
        /// The offending global vertex index
        index: u32,
    },

    /// A per-vertex bone index does not fit the bone transform table.
    #[error("bone index {index} out of table range for submesh {submesh}")]
    BoneIndexOutOfRange {
        /// Caller-assigned submesh id
        submesh: usize,
        /// The offending table slot
        index: u16,
    },

    // ========================================================================
    // Render Substrate Errors
    // ========================================================================
    /// The render substrate could not provide the requested state
    /// (e.g. a shader program failed to link upstream). Fatal for the
    /// current tick, not retried.
    #[error("render state unavailable: {0}")]
    StateUnavailable(String),

    // ========================================================================
    // Lookup Errors
    // ========================================================================
    /// The named submesh does not exist in the model.
    #[error("submesh not found: \"{0}\"")]
    SubmeshNotFound(String),
}

/// Alias for `Result<T, MarrowError>`.
pub type Result<T> = std::result::Result<T, MarrowError>;
