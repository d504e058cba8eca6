//! Serialized entity schema for MRET collaboration.
//!
//! Defines the typed object model every persisted or transmitted entity uses:
//! - [`IdentifiableType`] and the scene-object family built on top of it
//!   ([`SceneObjectType`], [`InteractableSceneObjectType`], [`PhysicalSceneObjectType`])
//! - domain types: [`PartType`], [`NoteType`], [`Drawing2dType`], [`Drawing3dType`],
//!   [`TextAnnotationType`], [`SourceAnnotationType`], [`UserType`]
//! - [`Category`]: the concrete type name and its attribute key root
//! - [`SerializedEntity`]: the closed set of concrete types
//!
//! Derived types hold their parent type in a `base` field. The [`Identifiable`]
//! and [`SceneObject`] traits reach the shared layers without walking `base`
//! chains by hand.

mod annotation;
mod category;
mod drawing;
mod entity;
mod note;
mod part;
mod scene;
mod user;

pub use annotation::{AnnotationType, SourceAnnotationType, SourceType, TextAnnotationType};
pub use category::Category;
pub use drawing::{Drawing2dType, Drawing3dType, DrawingRenderType, LengthUnit};
pub use entity::SerializedEntity;
pub use note::{NoteState, NoteType};
pub use part::{ModelFormat, ModelType, PartType};
pub use scene::{
    IdentifiableType, InteractableSceneObjectType, PhysicalSceneObjectType, PhysicsType,
    SceneObjectType, TouchBehavior,
};
pub use user::UserType;

/// Error returned when enum text from the wire names no known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value:?}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Access to the identity layer shared by every serialized type.
pub trait Identifiable {
    fn identifiable(&self) -> &IdentifiableType;
    fn identifiable_mut(&mut self) -> &mut IdentifiableType;
}

/// Access to the scene-object layer (transform, visibility).
pub trait SceneObject: Identifiable {
    fn scene_object(&self) -> &SceneObjectType;
    fn scene_object_mut(&mut self) -> &mut SceneObjectType;
}
