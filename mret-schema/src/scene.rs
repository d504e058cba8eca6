//! The identity layer and the scene-object family built on it.

use crate::{Identifiable, ParseEnumError, SceneObject};
use mret_types::Transform;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identity shared by every serialized entity.
///
/// `uuid`, `id` and `name` are required on the wire; the type still allows
/// them to be absent so that incomplete data can be represented and rejected
/// by the codec rather than by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifiableType {
    #[serde(default)]
    pub uuid: Option<Uuid>,
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl IdentifiableType {
    /// New identity with a freshly generated UUID.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uuid: Some(Uuid::new_v4()),
            id: id.into(),
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// An identifiable with a place in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObjectType {
    #[serde(flatten)]
    pub base: IdentifiableType,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default = "visible_default")]
    pub visible: bool,
}

fn visible_default() -> bool {
    true
}

impl SceneObjectType {
    pub fn new(base: IdentifiableType) -> Self {
        Self {
            base,
            transform: Transform::IDENTITY,
            visible: true,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}

/// How an interactable responds to touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TouchBehavior {
    #[default]
    Highlight,
    Hold,
    Custom,
}

impl TouchBehavior {
    pub const ALL: [Self; 3] = [Self::Highlight, Self::Hold, Self::Custom];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Highlight => "Highlight",
            Self::Hold => "Hold",
            Self::Custom => "Custom",
        }
    }
}

impl fmt::Display for TouchBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TouchBehavior {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("touch behavior", s))
    }
}

/// A scene object users can grab, use and touch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractableSceneObjectType {
    #[serde(flatten)]
    pub base: SceneObjectType,
    #[serde(default)]
    pub grabbable: bool,
    #[serde(default)]
    pub usable: bool,
    #[serde(default)]
    pub touch_behavior: TouchBehavior,
    /// 0 = transparent, 255 = opaque.
    #[serde(default = "opacity_default")]
    pub opacity: u8,
}

fn opacity_default() -> u8 {
    u8::MAX
}

impl InteractableSceneObjectType {
    pub fn new(base: SceneObjectType) -> Self {
        Self {
            base,
            grabbable: false,
            usable: false,
            touch_behavior: TouchBehavior::Highlight,
            opacity: u8::MAX,
        }
    }
}

/// Rigid-body settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsType {
    /// Kilograms.
    pub mass: f32,
    #[serde(default)]
    pub is_kinematic: bool,
}

/// An interactable that participates in physics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalSceneObjectType {
    #[serde(flatten)]
    pub base: InteractableSceneObjectType,
    #[serde(default)]
    pub enable_collisions: bool,
    #[serde(default)]
    pub enable_gravity: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physics: Option<PhysicsType>,
}

impl PhysicalSceneObjectType {
    pub fn new(base: InteractableSceneObjectType) -> Self {
        Self {
            base,
            enable_collisions: false,
            enable_gravity: false,
            physics: None,
        }
    }
}

impl Identifiable for IdentifiableType {
    fn identifiable(&self) -> &IdentifiableType {
        self
    }

    fn identifiable_mut(&mut self) -> &mut IdentifiableType {
        self
    }
}

impl Identifiable for SceneObjectType {
    fn identifiable(&self) -> &IdentifiableType {
        &self.base
    }

    fn identifiable_mut(&mut self) -> &mut IdentifiableType {
        &mut self.base
    }
}

impl SceneObject for SceneObjectType {
    fn scene_object(&self) -> &SceneObjectType {
        self
    }

    fn scene_object_mut(&mut self) -> &mut SceneObjectType {
        self
    }
}

impl Identifiable for InteractableSceneObjectType {
    fn identifiable(&self) -> &IdentifiableType {
        self.base.identifiable()
    }

    fn identifiable_mut(&mut self) -> &mut IdentifiableType {
        self.base.identifiable_mut()
    }
}

impl SceneObject for InteractableSceneObjectType {
    fn scene_object(&self) -> &SceneObjectType {
        &self.base
    }

    fn scene_object_mut(&mut self) -> &mut SceneObjectType {
        &mut self.base
    }
}

impl Identifiable for PhysicalSceneObjectType {
    fn identifiable(&self) -> &IdentifiableType {
        self.base.identifiable()
    }

    fn identifiable_mut(&mut self) -> &mut IdentifiableType {
        self.base.identifiable_mut()
    }
}

impl SceneObject for PhysicalSceneObjectType {
    fn scene_object(&self) -> &SceneObjectType {
        self.base.scene_object()
    }

    fn scene_object_mut(&mut self) -> &mut SceneObjectType {
        self.base.scene_object_mut()
    }
}
