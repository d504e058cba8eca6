//! Timed annotations attached to scene content.

use crate::{Identifiable, IdentifiableType, ParseEnumError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fields shared by all annotation kinds. Never staged on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationType {
    #[serde(flatten)]
    pub base: IdentifiableType,
    /// Id of the scene entity the annotation is attached to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attach_to: Option<String>,
    /// Seconds.
    #[serde(default)]
    pub start_delay: f32,
    /// Seconds.
    #[serde(default)]
    pub duration: f32,
}

impl AnnotationType {
    pub fn new(base: IdentifiableType) -> Self {
        Self {
            base,
            attach_to: None,
            start_delay: 0.0,
            duration: 0.0,
        }
    }
}

/// A sequence of text snippets shown one after another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnnotationType {
    #[serde(flatten)]
    pub base: AnnotationType,
    #[serde(default)]
    pub texts: Vec<String>,
    #[serde(default)]
    pub time_per_text: f32,
}

/// Media kind behind a source annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceType {
    Audio,
    Video,
    Image,
    Text,
}

impl SourceType {
    pub const ALL: [Self; 4] = [Self::Audio, Self::Video, Self::Image, Self::Text];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Audio => "Audio",
            Self::Video => "Video",
            Self::Image => "Image",
            Self::Text => "Text",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("source type", s))
    }
}

/// An annotation that plays back an external media source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceAnnotationType {
    #[serde(flatten)]
    pub base: AnnotationType,
    pub source: String,
    pub source_type: SourceType,
}

impl Identifiable for AnnotationType {
    fn identifiable(&self) -> &IdentifiableType {
        &self.base
    }

    fn identifiable_mut(&mut self) -> &mut IdentifiableType {
        &mut self.base
    }
}

impl Identifiable for TextAnnotationType {
    fn identifiable(&self) -> &IdentifiableType {
        &self.base.base
    }

    fn identifiable_mut(&mut self) -> &mut IdentifiableType {
        &mut self.base.base
    }
}

impl Identifiable for SourceAnnotationType {
    fn identifiable(&self) -> &IdentifiableType {
        &self.base.base
    }

    fn identifiable_mut(&mut self) -> &mut IdentifiableType {
        &mut self.base.base
    }
}
