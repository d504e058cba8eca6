//! Identifier types used throughout the collaboration layer.
//!
//! Entities are addressed by a string key. Keys minted locally come from the
//! entity's UUID; keys arriving from the native engine are taken verbatim.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique key for an entity in a collaboration session.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(String);

impl EntityKey {
    /// Creates a key from a non-empty string.
    pub fn new(key: impl Into<String>) -> crate::Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(Error::EmptyKey);
        }
        Ok(Self(key))
    }

    /// Derives the key for an entity from its UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid.to_string())
    }

    /// Mints a key for a brand-new entity.
    #[must_use]
    pub fn generate() -> Self {
        Self::from_uuid(Uuid::now_v7())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the key back into the UUID it was derived from.
    pub fn to_uuid(&self) -> crate::Result<Uuid> {
        Ok(Uuid::parse_str(&self.0)?)
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for EntityKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Distinguishes ordinary session entities from participant (user) entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    #[default]
    Entity,
    User,
}

impl EntityType {
    /// Wire name used at the native boundary.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Entity => "ENTITY",
            Self::User => "USER",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ENTITY" => Ok(Self::Entity),
            "USER" => Ok(Self::User),
            other => Err(Error::UnknownEntityType(other.to_string())),
        }
    }
}
