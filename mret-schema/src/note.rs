use crate::{
    Identifiable, IdentifiableType, InteractableSceneObjectType, ParseEnumError, SceneObject,
    SceneObjectType,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display state of a note panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NoteState {
    #[default]
    Maximized,
    Minimized,
}

impl NoteState {
    pub const ALL: [Self; 2] = [Self::Maximized, Self::Minimized];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Maximized => "Maximized",
            Self::Minimized => "Minimized",
        }
    }
}

impl fmt::Display for NoteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteState {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("note state", s))
    }
}

/// A floating text note placed in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteType {
    #[serde(flatten)]
    pub base: InteractableSceneObjectType,
    pub title: String,
    #[serde(default)]
    pub content: Vec<String>,
    #[serde(default)]
    pub state: NoteState,
}

impl NoteType {
    pub fn new(base: InteractableSceneObjectType, title: impl Into<String>) -> Self {
        Self {
            base,
            title: title.into(),
            content: Vec::new(),
            state: NoteState::Maximized,
        }
    }
}

impl Identifiable for NoteType {
    fn identifiable(&self) -> &IdentifiableType {
        self.base.identifiable()
    }

    fn identifiable_mut(&mut self) -> &mut IdentifiableType {
        self.base.identifiable_mut()
    }
}

impl SceneObject for NoteType {
    fn scene_object(&self) -> &SceneObjectType {
        self.base.scene_object()
    }

    fn scene_object_mut(&mut self) -> &mut SceneObjectType {
        self.base.scene_object_mut()
    }
}
