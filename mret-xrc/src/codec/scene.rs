//! Converters for the identity layer and the scene-object family.

use super::{AttributeReader, AttributeWriter, XrcCodec, missing};
use crate::error::{CodecError, CodecResult};
use crate::path::AttributePath;
use mret_schema::{
    IdentifiableType, InteractableSceneObjectType, PhysicalSceneObjectType, PhysicsType,
    SceneObjectType, TouchBehavior,
};
use mret_types::Transform;
use tracing::warn;
use uuid::Uuid;

const UUID: &str = "UUID";
const ID: &str = "ID";
const NAME: &str = "NAME";
const DESCRIPTION: &str = "DESCRIPTION";
pub(super) const TRANSFORM: &str = "TRANSFORM";
const VISIBLE: &str = "VISIBLE";
const GRABBABLE: &str = "GRABBABLE";
const USABLE: &str = "USABLE";
const TOUCH_BEHAVIOR: &str = "TOUCH_BEHAVIOR";
const OPACITY: &str = "OPACITY";
const ENABLE_COLLISIONS: &str = "ENABLE_COLLISIONS";
const ENABLE_GRAVITY: &str = "ENABLE_GRAVITY";
const PHYSICS: &str = "PHYSICS";
const MASS: &str = "MASS";
const KINEMATIC: &str = "KINEMATIC";

impl XrcCodec for IdentifiableType {
    fn to_xrc(&self, writer: &AttributeWriter<'_>, key: &AttributePath) -> CodecResult<()> {
        let uuid_path = key.child(UUID);
        let uuid = self.uuid.ok_or_else(|| missing(&uuid_path))?;
        writer.set_string(&uuid_path, &uuid.to_string())?;
        writer.set_required_text(&key.child(ID), &self.id)?;
        writer.set_required_text(&key.child(NAME), &self.name)?;
        writer.set_optional_text(&key.child(DESCRIPTION), self.description.as_deref())
    }

    fn from_xrc(reader: &AttributeReader<'_>, key: &AttributePath) -> CodecResult<Self> {
        let uuid_path = key.child(UUID);
        let uuid_text = reader.required_text(&uuid_path)?;
        let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
            warn!("Unable to parse UUID {:?} at {}", uuid_text, uuid_path);
            CodecError::InvalidUuid {
                path: uuid_path.to_string(),
                value: uuid_text.clone(),
            }
        })?;

        Ok(Self {
            uuid: Some(uuid),
            id: reader.required_text(&key.child(ID))?,
            name: reader.required_text(&key.child(NAME))?,
            description: reader.optional_text(&key.child(DESCRIPTION))?,
        })
    }
}

impl XrcCodec for SceneObjectType {
    fn to_xrc(&self, writer: &AttributeWriter<'_>, key: &AttributePath) -> CodecResult<()> {
        self.transform.to_xrc(writer, &key.child(TRANSFORM))?;
        writer.set_bool(&key.child(VISIBLE), self.visible)?;

        self.base.to_xrc(writer, key)
    }

    fn from_xrc(reader: &AttributeReader<'_>, key: &AttributePath) -> CodecResult<Self> {
        let base = IdentifiableType::from_xrc(reader, key)?;

        Ok(Self {
            base,
            transform: Transform::from_xrc(reader, &key.child(TRANSFORM))?,
            visible: reader.bool(&key.child(VISIBLE))?.unwrap_or(true),
        })
    }
}

impl XrcCodec for InteractableSceneObjectType {
    fn to_xrc(&self, writer: &AttributeWriter<'_>, key: &AttributePath) -> CodecResult<()> {
        writer.set_bool(&key.child(GRABBABLE), self.grabbable)?;
        writer.set_bool(&key.child(USABLE), self.usable)?;
        writer.set_enum(&key.child(TOUCH_BEHAVIOR), self.touch_behavior)?;
        if self.opacity != u8::MAX {
            writer.set_int(&key.child(OPACITY), i64::from(self.opacity))?;
        }

        self.base.to_xrc(writer, key)
    }

    fn from_xrc(reader: &AttributeReader<'_>, key: &AttributePath) -> CodecResult<Self> {
        let base = SceneObjectType::from_xrc(reader, key)?;

        let opacity_path = key.child(OPACITY);
        let opacity = match reader.int(&opacity_path)? {
            None => u8::MAX,
            Some(value) => u8::try_from(value).map_err(|_| CodecError::OutOfRange {
                path: opacity_path.to_string(),
                value,
            })?,
        };

        Ok(Self {
            base,
            grabbable: reader.bool(&key.child(GRABBABLE))?.unwrap_or(false),
            usable: reader.bool(&key.child(USABLE))?.unwrap_or(false),
            touch_behavior: reader
                .optional_enum::<TouchBehavior>(&key.child(TOUCH_BEHAVIOR))?
                .unwrap_or_default(),
            opacity,
        })
    }
}

impl XrcCodec for PhysicsType {
    fn to_xrc(&self, writer: &AttributeWriter<'_>, key: &AttributePath) -> CodecResult<()> {
        writer.set_float(&key.child(MASS), self.mass)?;
        writer.set_bool(&key.child(KINEMATIC), self.is_kinematic)
    }

    fn from_xrc(reader: &AttributeReader<'_>, key: &AttributePath) -> CodecResult<Self> {
        Ok(Self {
            mass: reader.required_float(&key.child(MASS))?,
            is_kinematic: reader.bool(&key.child(KINEMATIC))?.unwrap_or(false),
        })
    }
}

impl XrcCodec for PhysicalSceneObjectType {
    fn to_xrc(&self, writer: &AttributeWriter<'_>, key: &AttributePath) -> CodecResult<()> {
        writer.set_bool(&key.child(ENABLE_COLLISIONS), self.enable_collisions)?;
        writer.set_bool(&key.child(ENABLE_GRAVITY), self.enable_gravity)?;

        let physics_path = key.child(PHYSICS);
        writer.set_bool(&physics_path, self.physics.is_some())?;
        if let Some(physics) = &self.physics {
            physics.to_xrc(writer, &physics_path)?;
        }

        self.base.to_xrc(writer, key)
    }

    fn from_xrc(reader: &AttributeReader<'_>, key: &AttributePath) -> CodecResult<Self> {
        let base = InteractableSceneObjectType::from_xrc(reader, key)?;

        let physics_path = key.child(PHYSICS);
        let physics = if reader.bool(&physics_path)?.unwrap_or(false) {
            Some(PhysicsType::from_xrc(reader, &physics_path)?)
        } else {
            None
        };

        Ok(Self {
            base,
            enable_collisions: reader.bool(&key.child(ENABLE_COLLISIONS))?.unwrap_or(false),
            enable_gravity: reader.bool(&key.child(ENABLE_GRAVITY))?.unwrap_or(false),
            physics,
        })
    }
}
