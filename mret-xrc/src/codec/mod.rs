//! Conversion between typed entities and staged attribute bags.
//!
//! Every serialized type implements [`XrcCodec`]. A type writes its own
//! fields below the key it is given and then hands the same key to its
//! `base`, so the identity layer is always written last and read first.
//!
//! Conventions shared by all converters:
//! - required text (UUID, ID, Name, ...) fails with [`CodecError::MissingField`]
//! - optional text is written only when present and non-empty
//! - optional substructures get a boolean presence attribute at their own path
//! - enums travel as their string form; unknown text fails with
//!   [`CodecError::InvalidEnum`]
//! - string lists use `<path>.COUNT` plus `<path>.<index>`
//! - point lists are packed little-endian `f32` blobs

mod annotation;
mod drawing;
mod math;
mod note;
mod part;
mod scene;
mod user;

pub use drawing::{decode_points2, decode_points3, encode_points2, encode_points3};

use crate::error::{CodecError, CodecResult};
use crate::interface::{AttributeStore, AttributeValue, StagedSource};
use crate::path::AttributePath;
use mret_schema::{
    Category, Drawing2dType, Drawing3dType, IdentifiableType, InteractableSceneObjectType,
    NoteType, PartType, PhysicalSceneObjectType, SceneObjectType, SerializedEntity,
    SourceAnnotationType, TextAnnotationType, UserType,
};
use mret_types::Transform;
use std::fmt::Display;
use std::str::FromStr;
use tracing::warn;

/// A type that can be staged as attributes and read back.
pub trait XrcCodec: Sized {
    /// Writes this value's attributes below `key`.
    fn to_xrc(&self, writer: &AttributeWriter<'_>, key: &AttributePath) -> CodecResult<()>;

    /// Reads a value from the attributes below `key`.
    fn from_xrc(reader: &AttributeReader<'_>, key: &AttributePath) -> CodecResult<Self>;
}

/// Writes a serialized entity below its category root.
pub fn serialized_to_xrc(
    entity: &SerializedEntity,
    writer: &AttributeWriter<'_>,
) -> CodecResult<()> {
    let key = AttributePath::root(entity.category());
    match entity {
        SerializedEntity::Identifiable(v) => v.to_xrc(writer, &key),
        SerializedEntity::SceneObject(v) => v.to_xrc(writer, &key),
        SerializedEntity::InteractableSceneObject(v) => v.to_xrc(writer, &key),
        SerializedEntity::PhysicalSceneObject(v) => v.to_xrc(writer, &key),
        SerializedEntity::Part(v) => v.to_xrc(writer, &key),
        SerializedEntity::Note(v) => v.to_xrc(writer, &key),
        SerializedEntity::Drawing2d(v) => v.to_xrc(writer, &key),
        SerializedEntity::Drawing3d(v) => v.to_xrc(writer, &key),
        SerializedEntity::TextAnnotation(v) => v.to_xrc(writer, &key),
        SerializedEntity::SourceAnnotation(v) => v.to_xrc(writer, &key),
        SerializedEntity::User(v) => v.to_xrc(writer, &key),
    }
}

/// Reads a serialized entity of `category` from below its category root.
pub fn xrc_to_serialized(
    category: Category,
    reader: &AttributeReader<'_>,
) -> CodecResult<SerializedEntity> {
    let key = AttributePath::root(category);
    let entity = match category {
        Category::Identifiable => IdentifiableType::from_xrc(reader, &key)?.into(),
        Category::SceneObject => SceneObjectType::from_xrc(reader, &key)?.into(),
        Category::InteractableSceneObject => {
            InteractableSceneObjectType::from_xrc(reader, &key)?.into()
        }
        Category::PhysicalSceneObject => PhysicalSceneObjectType::from_xrc(reader, &key)?.into(),
        Category::Part => PartType::from_xrc(reader, &key)?.into(),
        Category::Note => NoteType::from_xrc(reader, &key)?.into(),
        Category::Drawing2d => Drawing2dType::from_xrc(reader, &key)?.into(),
        Category::Drawing3d => Drawing3dType::from_xrc(reader, &key)?.into(),
        Category::TextAnnotation => TextAnnotationType::from_xrc(reader, &key)?.into(),
        Category::SourceAnnotation => SourceAnnotationType::from_xrc(reader, &key)?.into(),
        Category::User => UserType::from_xrc(reader, &key)?.into(),
    };
    Ok(entity)
}

/// Path of the transform subtree for a transform-bearing category.
#[must_use]
pub fn transform_path(category: Category) -> AttributePath {
    AttributePath::root(category).child(scene::TRANSFORM)
}

pub(crate) fn missing(path: &AttributePath) -> CodecError {
    warn!("Missing required attribute {}", path);
    CodecError::MissingField {
        path: path.to_string(),
    }
}

/// Typed writes into one staged entity.
pub struct AttributeWriter<'a> {
    store: &'a dyn AttributeStore,
    entity_id: &'a str,
}

impl<'a> AttributeWriter<'a> {
    pub fn new(store: &'a dyn AttributeStore, entity_id: &'a str) -> Self {
        Self { store, entity_id }
    }

    pub fn entity_id(&self) -> &str {
        self.entity_id
    }

    pub fn set(&self, path: &AttributePath, value: AttributeValue) -> CodecResult<()> {
        if self.store.set_attribute(self.entity_id, path.as_str(), value) {
            Ok(())
        } else {
            warn!("Native store rejected {} on entity {}", path, self.entity_id);
            Err(CodecError::Rejected {
                path: path.to_string(),
            })
        }
    }

    pub fn set_bool(&self, path: &AttributePath, value: bool) -> CodecResult<()> {
        self.set(path, AttributeValue::Bool(value))
    }

    pub fn set_int(&self, path: &AttributePath, value: i64) -> CodecResult<()> {
        self.set(path, AttributeValue::Int(value))
    }

    pub fn set_float(&self, path: &AttributePath, value: f32) -> CodecResult<()> {
        self.set(path, AttributeValue::Float(f64::from(value)))
    }

    pub fn set_string(&self, path: &AttributePath, value: &str) -> CodecResult<()> {
        self.set(path, AttributeValue::String(value.to_string()))
    }

    pub fn set_blob(&self, path: &AttributePath, value: Vec<u8>) -> CodecResult<()> {
        self.set(path, AttributeValue::Blob(value))
    }

    pub fn set_transform(&self, path: &AttributePath, value: &Transform) -> CodecResult<()> {
        self.set(path, AttributeValue::Transform(*value))
    }

    pub fn set_enum(&self, path: &AttributePath, value: impl Display) -> CodecResult<()> {
        self.set_string(path, &value.to_string())
    }

    /// Writes text that must not be empty.
    pub fn set_required_text(&self, path: &AttributePath, value: &str) -> CodecResult<()> {
        if value.is_empty() {
            return Err(missing(path));
        }
        self.set_string(path, value)
    }

    /// Writes text only when present and non-empty.
    pub fn set_optional_text(&self, path: &AttributePath, value: Option<&str>) -> CodecResult<()> {
        match value {
            Some(text) if !text.is_empty() => self.set_string(path, text),
            _ => Ok(()),
        }
    }

    pub fn set_string_list(&self, path: &AttributePath, items: &[String]) -> CodecResult<()> {
        self.set_int(&path.child(COUNT), items.len() as i64)?;
        for (index, item) in items.iter().enumerate() {
            self.set_string(&path.child(index), item)?;
        }
        Ok(())
    }
}

pub(crate) const COUNT: &str = "COUNT";

/// Typed reads from a staged entity or the current event.
pub struct AttributeReader<'a> {
    store: &'a dyn AttributeStore,
    source: StagedSource<'a>,
}

impl<'a> AttributeReader<'a> {
    pub fn new(store: &'a dyn AttributeStore, source: StagedSource<'a>) -> Self {
        Self { store, source }
    }

    pub fn source(&self) -> StagedSource<'a> {
        self.source
    }

    pub fn get(&self, path: &AttributePath) -> Option<AttributeValue> {
        self.store.get_attribute(self.source, path.as_str())
    }

    fn typed<T>(
        &self,
        path: &AttributePath,
        expected: &'static str,
        extract: impl FnOnce(AttributeValue) -> Result<T, AttributeValue>,
    ) -> CodecResult<Option<T>> {
        match self.get(path) {
            None => Ok(None),
            Some(value) => extract(value).map(Some).map_err(|other| CodecError::TypeMismatch {
                path: path.to_string(),
                expected,
                found: other.kind_name(),
            }),
        }
    }

    pub fn bool(&self, path: &AttributePath) -> CodecResult<Option<bool>> {
        self.typed(path, "bool", |v| match v {
            AttributeValue::Bool(b) => Ok(b),
            other => Err(other),
        })
    }

    pub fn int(&self, path: &AttributePath) -> CodecResult<Option<i64>> {
        self.typed(path, "int", |v| match v {
            AttributeValue::Int(i) => Ok(i),
            other => Err(other),
        })
    }

    pub fn float(&self, path: &AttributePath) -> CodecResult<Option<f32>> {
        self.typed(path, "float", |v| match v {
            AttributeValue::Float(f) => Ok(f as f32),
            other => Err(other),
        })
    }

    pub fn string(&self, path: &AttributePath) -> CodecResult<Option<String>> {
        self.typed(path, "string", |v| match v {
            AttributeValue::String(s) => Ok(s),
            other => Err(other),
        })
    }

    pub fn blob(&self, path: &AttributePath) -> CodecResult<Option<Vec<u8>>> {
        self.typed(path, "blob", |v| match v {
            AttributeValue::Blob(b) => Ok(b),
            other => Err(other),
        })
    }

    pub fn transform(&self, path: &AttributePath) -> CodecResult<Option<Transform>> {
        self.typed(path, "transform", |v| match v {
            AttributeValue::Transform(t) => Ok(t),
            other => Err(other),
        })
    }

    pub fn required_bool(&self, path: &AttributePath) -> CodecResult<bool> {
        self.bool(path)?.ok_or_else(|| missing(path))
    }

    pub fn required_float(&self, path: &AttributePath) -> CodecResult<f32> {
        self.float(path)?.ok_or_else(|| missing(path))
    }

    pub fn required_string(&self, path: &AttributePath) -> CodecResult<String> {
        self.string(path)?.ok_or_else(|| missing(path))
    }

    /// Reads text that must be present and non-empty.
    pub fn required_text(&self, path: &AttributePath) -> CodecResult<String> {
        match self.string(path)? {
            Some(text) if !text.is_empty() => Ok(text),
            _ => Err(missing(path)),
        }
    }

    /// Reads optional text; empty text reads as absent.
    pub fn optional_text(&self, path: &AttributePath) -> CodecResult<Option<String>> {
        Ok(self.string(path)?.filter(|text| !text.is_empty()))
    }

    pub fn optional_enum<E: FromStr>(&self, path: &AttributePath) -> CodecResult<Option<E>> {
        match self.string(path)? {
            None => Ok(None),
            Some(text) => match text.parse::<E>() {
                Ok(value) => Ok(Some(value)),
                Err(_) => {
                    warn!("Unable to parse {:?} at {}", text, path);
                    Err(CodecError::InvalidEnum {
                        path: path.to_string(),
                        value: text,
                    })
                }
            },
        }
    }

    pub fn required_enum<E: FromStr>(&self, path: &AttributePath) -> CodecResult<E> {
        self.optional_enum(path)?.ok_or_else(|| missing(path))
    }

    /// Reads a string list; an absent count reads as empty.
    pub fn string_list(&self, path: &AttributePath) -> CodecResult<Vec<String>> {
        let count_path = path.child(COUNT);
        let count = match self.int(&count_path)? {
            None => return Ok(Vec::new()),
            Some(count) => usize::try_from(count).map_err(|_| CodecError::OutOfRange {
                path: count_path.to_string(),
                value: count,
            })?,
        };
        (0..count)
            .map(|index| self.required_string(&path.child(index)))
            .collect()
    }
}
