//! Error taxonomy for scene operations.

use thiserror::Error;

use crate::id::{ObjectId, TemplateId, ViewId};

/// Errors surfaced by scene operations.
///
/// Most lookups in this crate are tolerant: acting on a missing object is a
/// silent no-op, and resolving structurally broken data yields `None` plus a
/// logged warning. Only caller bugs and missing precondition entities reach
/// this enum.
#[derive(Debug, Error)]
pub enum SceneError {
    /// A type tag no object kind recognizes.
    #[error("unknown object type tag: {0:?}")]
    UnknownObjectType(String),

    /// The operation requires the view to exist.
    #[error("view not found: {0}")]
    ViewNotFound(ViewId),

    /// The operation requires the template to exist.
    #[error("template not found: {0}")]
    TemplateNotFound(TemplateId),

    /// An instance cannot serve as a prototype for other instances.
    #[error("object {0} is an instance and cannot become a prototype")]
    PrototypeFromInstance(ObjectId),

    /// Error bubbled up from the CRDT layer.
    #[error(transparent)]
    Crdt(#[from] loro::LoroError),
}

pub type SceneResult<T> = Result<T, SceneError>;
