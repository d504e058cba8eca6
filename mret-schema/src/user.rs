use crate::{Identifiable, IdentifiableType};
use mret_types::{Color, Transform};
use serde::{Deserialize, Serialize};

/// A session participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserType {
    #[serde(flatten)]
    pub base: IdentifiableType,
    pub alias: String,
    #[serde(default)]
    pub color: Color,
    /// Last known head pose, if the participant is tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pose: Option<Transform>,
}

impl UserType {
    pub fn new(base: IdentifiableType, alias: impl Into<String>) -> Self {
        Self {
            base,
            alias: alias.into(),
            color: Color::WHITE,
            pose: None,
        }
    }
}

impl Identifiable for UserType {
    fn identifiable(&self) -> &IdentifiableType {
        &self.base
    }

    fn identifiable_mut(&mut self) -> &mut IdentifiableType {
        &mut self.base
    }
}
