use crate::{
    Category, Drawing2dType, Drawing3dType, Identifiable, IdentifiableType,
    InteractableSceneObjectType, NoteType, PartType, PhysicalSceneObjectType, SceneObject,
    SceneObjectType, SourceAnnotationType, TextAnnotationType, UserType,
};
use mret_types::EntityType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Any concrete serialized entity.
///
/// The JSON form is tagged by category name, e.g.
/// `{"category": "PartType", "id": "wheel", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category")]
pub enum SerializedEntity {
    #[serde(rename = "IdentifiableType")]
    Identifiable(IdentifiableType),
    #[serde(rename = "SceneObjectType")]
    SceneObject(SceneObjectType),
    #[serde(rename = "InteractableSceneObjectType")]
    InteractableSceneObject(InteractableSceneObjectType),
    #[serde(rename = "PhysicalSceneObjectType")]
    PhysicalSceneObject(PhysicalSceneObjectType),
    #[serde(rename = "PartType")]
    Part(PartType),
    #[serde(rename = "NoteType")]
    Note(NoteType),
    #[serde(rename = "Drawing2dType")]
    Drawing2d(Drawing2dType),
    #[serde(rename = "Drawing3dType")]
    Drawing3d(Drawing3dType),
    #[serde(rename = "TextAnnotationType")]
    TextAnnotation(TextAnnotationType),
    #[serde(rename = "SourceAnnotationType")]
    SourceAnnotation(SourceAnnotationType),
    #[serde(rename = "UserType")]
    User(UserType),
}

impl SerializedEntity {
    #[must_use]
    pub fn category(&self) -> Category {
        match self {
            Self::Identifiable(_) => Category::Identifiable,
            Self::SceneObject(_) => Category::SceneObject,
            Self::InteractableSceneObject(_) => Category::InteractableSceneObject,
            Self::PhysicalSceneObject(_) => Category::PhysicalSceneObject,
            Self::Part(_) => Category::Part,
            Self::Note(_) => Category::Note,
            Self::Drawing2d(_) => Category::Drawing2d,
            Self::Drawing3d(_) => Category::Drawing3d,
            Self::TextAnnotation(_) => Category::TextAnnotation,
            Self::SourceAnnotation(_) => Category::SourceAnnotation,
            Self::User(_) => Category::User,
        }
    }

    #[must_use]
    pub fn entity_type(&self) -> EntityType {
        self.category().entity_type()
    }

    #[must_use]
    pub fn uuid(&self) -> Option<Uuid> {
        self.identifiable().uuid
    }

    /// The scene layer, for categories that have one.
    #[must_use]
    pub fn scene_object(&self) -> Option<&SceneObjectType> {
        match self {
            Self::SceneObject(v) => Some(v.scene_object()),
            Self::InteractableSceneObject(v) => Some(v.scene_object()),
            Self::PhysicalSceneObject(v) => Some(v.scene_object()),
            Self::Part(v) => Some(v.scene_object()),
            Self::Note(v) => Some(v.scene_object()),
            Self::Drawing3d(v) => Some(v.scene_object()),
            Self::Identifiable(_)
            | Self::Drawing2d(_)
            | Self::TextAnnotation(_)
            | Self::SourceAnnotation(_)
            | Self::User(_) => None,
        }
    }

    pub fn scene_object_mut(&mut self) -> Option<&mut SceneObjectType> {
        match self {
            Self::SceneObject(v) => Some(v.scene_object_mut()),
            Self::InteractableSceneObject(v) => Some(v.scene_object_mut()),
            Self::PhysicalSceneObject(v) => Some(v.scene_object_mut()),
            Self::Part(v) => Some(v.scene_object_mut()),
            Self::Note(v) => Some(v.scene_object_mut()),
            Self::Drawing3d(v) => Some(v.scene_object_mut()),
            Self::Identifiable(_)
            | Self::Drawing2d(_)
            | Self::TextAnnotation(_)
            | Self::SourceAnnotation(_)
            | Self::User(_) => None,
        }
    }

    #[must_use]
    pub fn as_user(&self) -> Option<&UserType> {
        match self {
            Self::User(user) => Some(user),
            _ => None,
        }
    }
}

impl Identifiable for SerializedEntity {
    fn identifiable(&self) -> &IdentifiableType {
        match self {
            Self::Identifiable(v) => v,
            Self::SceneObject(v) => v.identifiable(),
            Self::InteractableSceneObject(v) => v.identifiable(),
            Self::PhysicalSceneObject(v) => v.identifiable(),
            Self::Part(v) => v.identifiable(),
            Self::Note(v) => v.identifiable(),
            Self::Drawing2d(v) => v.identifiable(),
            Self::Drawing3d(v) => v.identifiable(),
            Self::TextAnnotation(v) => v.identifiable(),
            Self::SourceAnnotation(v) => v.identifiable(),
            Self::User(v) => v.identifiable(),
        }
    }

    fn identifiable_mut(&mut self) -> &mut IdentifiableType {
        match self {
            Self::Identifiable(v) => v,
            Self::SceneObject(v) => v.identifiable_mut(),
            Self::InteractableSceneObject(v) => v.identifiable_mut(),
            Self::PhysicalSceneObject(v) => v.identifiable_mut(),
            Self::Part(v) => v.identifiable_mut(),
            Self::Note(v) => v.identifiable_mut(),
            Self::Drawing2d(v) => v.identifiable_mut(),
            Self::Drawing3d(v) => v.identifiable_mut(),
            Self::TextAnnotation(v) => v.identifiable_mut(),
            Self::SourceAnnotation(v) => v.identifiable_mut(),
            Self::User(v) => v.identifiable_mut(),
        }
    }
}

impl From<IdentifiableType> for SerializedEntity {
    fn from(v: IdentifiableType) -> Self {
        Self::Identifiable(v)
    }
}

impl From<SceneObjectType> for SerializedEntity {
    fn from(v: SceneObjectType) -> Self {
        Self::SceneObject(v)
    }
}

impl From<InteractableSceneObjectType> for SerializedEntity {
    fn from(v: InteractableSceneObjectType) -> Self {
        Self::InteractableSceneObject(v)
    }
}

impl From<PhysicalSceneObjectType> for SerializedEntity {
    fn from(v: PhysicalSceneObjectType) -> Self {
        Self::PhysicalSceneObject(v)
    }
}

impl From<PartType> for SerializedEntity {
    fn from(v: PartType) -> Self {
        Self::Part(v)
    }
}

impl From<NoteType> for SerializedEntity {
    fn from(v: NoteType) -> Self {
        Self::Note(v)
    }
}

impl From<Drawing2dType> for SerializedEntity {
    fn from(v: Drawing2dType) -> Self {
        Self::Drawing2d(v)
    }
}

impl From<Drawing3dType> for SerializedEntity {
    fn from(v: Drawing3dType) -> Self {
        Self::Drawing3d(v)
    }
}

impl From<TextAnnotationType> for SerializedEntity {
    fn from(v: TextAnnotationType) -> Self {
        Self::TextAnnotation(v)
    }
}

impl From<SourceAnnotationType> for SerializedEntity {
    fn from(v: SourceAnnotationType) -> Self {
        Self::SourceAnnotation(v)
    }
}

impl From<UserType> for SerializedEntity {
    fn from(v: UserType) -> Self {
        Self::User(v)
    }
}
