use crate::{
    Identifiable, IdentifiableType, ParseEnumError, PhysicalSceneObjectType, SceneObject,
    SceneObjectType,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// File format of a part's model asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelFormat {
    Gltf,
    Fbx,
    Obj,
    AssetBundle,
}

impl ModelFormat {
    pub const ALL: [Self; 4] = [Self::Gltf, Self::Fbx, Self::Obj, Self::AssetBundle];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Gltf => "Gltf",
            Self::Fbx => "Fbx",
            Self::Obj => "Obj",
            Self::AssetBundle => "AssetBundle",
        }
    }
}

impl fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelFormat {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("model format", s))
    }
}

/// Reference to the asset a part is rendered from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelType {
    pub file: String,
    pub format: ModelFormat,
}

/// A physical component of an assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartType {
    #[serde(flatten)]
    pub base: PhysicalSceneObjectType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelType>,
}

impl PartType {
    pub fn new(base: PhysicalSceneObjectType) -> Self {
        Self {
            base,
            vendor: None,
            version: None,
            model: None,
        }
    }
}

impl Identifiable for PartType {
    fn identifiable(&self) -> &IdentifiableType {
        self.base.identifiable()
    }

    fn identifiable_mut(&mut self) -> &mut IdentifiableType {
        self.base.identifiable_mut()
    }
}

impl SceneObject for PartType {
    fn scene_object(&self) -> &SceneObjectType {
        self.base.scene_object()
    }

    fn scene_object_mut(&mut self) -> &mut SceneObjectType {
        self.base.scene_object_mut()
    }
}
