//! Free-hand drawings, flat (2D canvas) and in the scene (3D).

use crate::{Identifiable, IdentifiableType, ParseEnumError, SceneObject, SceneObjectType};
use mret_types::{Color, Vector2, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a 3D drawing's points are joined when rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DrawingRenderType {
    #[default]
    Free,
    StraightLine,
    Polyline,
}

impl DrawingRenderType {
    pub const ALL: [Self; 3] = [Self::Free, Self::StraightLine, Self::Polyline];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::StraightLine => "StraightLine",
            Self::Polyline => "Polyline",
        }
    }
}

impl fmt::Display for DrawingRenderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DrawingRenderType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("drawing render type", s))
    }
}

/// Length unit a drawing's measurements are displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LengthUnit {
    #[default]
    Meter,
    Centimeter,
    Millimeter,
    Foot,
    Inch,
}

impl LengthUnit {
    pub const ALL: [Self; 5] = [
        Self::Meter,
        Self::Centimeter,
        Self::Millimeter,
        Self::Foot,
        Self::Inch,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Meter => "Meter",
            Self::Centimeter => "Centimeter",
            Self::Millimeter => "Millimeter",
            Self::Foot => "Foot",
            Self::Inch => "Inch",
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LengthUnit {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("length unit", s))
    }
}

/// A stroke on a flat drawing canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawing2dType {
    #[serde(flatten)]
    pub base: IdentifiableType,
    pub width: f32,
    #[serde(default)]
    pub color: Color,
    #[serde(default)]
    pub points: Vec<Vector2>,
}

/// A stroke drawn in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawing3dType {
    #[serde(flatten)]
    pub base: SceneObjectType,
    #[serde(default)]
    pub render_type: DrawingRenderType,
    #[serde(default)]
    pub units: LengthUnit,
    pub width: f32,
    #[serde(default)]
    pub color: Color,
    #[serde(default)]
    pub points: Vec<Vector3>,
}

impl Identifiable for Drawing2dType {
    fn identifiable(&self) -> &IdentifiableType {
        &self.base
    }

    fn identifiable_mut(&mut self) -> &mut IdentifiableType {
        &mut self.base
    }
}

impl Identifiable for Drawing3dType {
    fn identifiable(&self) -> &IdentifiableType {
        self.base.identifiable()
    }

    fn identifiable_mut(&mut self) -> &mut IdentifiableType {
        self.base.identifiable_mut()
    }
}

impl SceneObject for Drawing3dType {
    fn scene_object(&self) -> &SceneObjectType {
        &self.base
    }

    fn scene_object_mut(&mut self) -> &mut SceneObjectType {
        &mut self.base
    }
}
