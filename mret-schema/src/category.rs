use crate::ParseEnumError;
use mret_types::EntityType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The concrete serialized type of an entity.
///
/// The category fixes both the type name exchanged with the native engine and
/// the root under which the entity's attributes are staged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Identifiable,
    SceneObject,
    InteractableSceneObject,
    PhysicalSceneObject,
    Part,
    Note,
    Drawing2d,
    Drawing3d,
    TextAnnotation,
    SourceAnnotation,
    User,
}

impl Category {
    pub const ALL: [Self; 11] = [
        Self::Identifiable,
        Self::SceneObject,
        Self::InteractableSceneObject,
        Self::PhysicalSceneObject,
        Self::Part,
        Self::Note,
        Self::Drawing2d,
        Self::Drawing3d,
        Self::TextAnnotation,
        Self::SourceAnnotation,
        Self::User,
    ];

    /// Serialized type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Identifiable => "IdentifiableType",
            Self::SceneObject => "SceneObjectType",
            Self::InteractableSceneObject => "InteractableSceneObjectType",
            Self::PhysicalSceneObject => "PhysicalSceneObjectType",
            Self::Part => "PartType",
            Self::Note => "NoteType",
            Self::Drawing2d => "Drawing2dType",
            Self::Drawing3d => "Drawing3dType",
            Self::TextAnnotation => "TextAnnotationType",
            Self::SourceAnnotation => "SourceAnnotationType",
            Self::User => "UserType",
        }
    }

    /// Root segment of every attribute path staged for this category.
    #[must_use]
    pub const fn key_root(&self) -> &'static str {
        match self {
            Self::Identifiable => "IDENTIFIABLE",
            Self::SceneObject => "OBJECT",
            Self::InteractableSceneObject => "INTERACTABLE",
            Self::PhysicalSceneObject => "PHYSICAL",
            Self::Part => "PART",
            Self::Note => "NOTE",
            Self::Drawing2d => "DRAWING2D",
            Self::Drawing3d => "DRAWING3D",
            Self::TextAnnotation => "TEXT_ANNOTATION",
            Self::SourceAnnotation => "SOURCE_ANNOTATION",
            Self::User => "USER",
        }
    }

    /// Whether entities of this category carry a scene transform.
    #[must_use]
    pub const fn has_transform(&self) -> bool {
        matches!(
            self,
            Self::SceneObject
                | Self::InteractableSceneObject
                | Self::PhysicalSceneObject
                | Self::Part
                | Self::Note
                | Self::Drawing3d
        )
    }

    #[must_use]
    pub const fn entity_type(&self) -> EntityType {
        match self {
            Self::User => EntityType::User,
            _ => EntityType::Entity,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s)
            .ok_or_else(|| ParseEnumError::new("category", s))
    }
}
