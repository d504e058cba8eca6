//! Entity parameter envelopes.
//!
//! [`EntityParameters`] is what the manager stages and publishes: the payload
//! plus the entity type and the parent the entity hangs off in the scene.

use crate::interface::EntityDescriptor;
use mret_schema::{
    Category, Drawing2dType, Drawing3dType, IdentifiableType, InteractableSceneObjectType,
    NoteType, PartType, PhysicalSceneObjectType, SceneObjectType, SerializedEntity,
    SourceAnnotationType, TextAnnotationType, UserType,
};
use mret_types::{EntityKey, EntityType};
use std::any::Any;
use tracing::warn;

/// A serialized entity ready to be staged, with its placement in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityParameters {
    pub entity_type: EntityType,
    pub parent_id: Option<EntityKey>,
    pub payload: SerializedEntity,
}

impl EntityParameters {
    pub fn new(payload: impl Into<SerializedEntity>, parent_id: Option<EntityKey>) -> Self {
        let payload = payload.into();
        Self {
            entity_type: payload.entity_type(),
            parent_id,
            payload,
        }
    }

    /// Builds parameters from a value of unknown serialized type.
    ///
    /// The most derived types are tried first so that, for example, a
    /// `PartType` is never taken for the physical object it extends. Returns
    /// `None` for anything that is not a serialized entity type.
    pub fn from_value(value: &dyn Any, parent_id: Option<EntityKey>) -> Option<Self> {
        let payload = downcast_payload(value);
        if payload.is_none() {
            warn!("Unsupported serialized type; no entity parameters created");
        }
        payload.map(|payload| Self::new(payload, parent_id))
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.payload.category()
    }

    /// Key of the payload, derived from its UUID.
    #[must_use]
    pub fn entity_id(&self) -> Option<EntityKey> {
        self.payload.uuid().map(EntityKey::from_uuid)
    }

    /// Native descriptor for this entity. `None` without a UUID.
    #[must_use]
    pub fn descriptor(&self) -> Option<EntityDescriptor> {
        let entity_id = self.entity_id()?;
        Some(EntityDescriptor {
            entity_id: entity_id.to_string(),
            category: self.category().name().to_string(),
            entity_type: self.entity_type,
            parent_id: self.parent_id.as_ref().map(ToString::to_string),
        })
    }
}

fn downcast_payload(value: &dyn Any) -> Option<SerializedEntity> {
    macro_rules! try_as {
        ($($ty:ty),+ $(,)?) => {
            $(
                if let Some(v) = value.downcast_ref::<$ty>() {
                    return Some(v.clone().into());
                }
            )+
        };
    }

    if let Some(entity) = value.downcast_ref::<SerializedEntity>() {
        return Some(entity.clone());
    }
    try_as!(
        TextAnnotationType,
        SourceAnnotationType,
        PartType,
        NoteType,
        Drawing3dType,
        Drawing2dType,
        UserType,
        PhysicalSceneObjectType,
        InteractableSceneObjectType,
        SceneObjectType,
        IdentifiableType,
    );
    None
}
