//! Native callback entry points.

use crate::codec::{AttributeReader, XrcCodec, transform_path, xrc_to_serialized};
use crate::error::{XrcError, XrcResult};
use crate::events::{
    EntityRemoval, EventQueues, RemoteEntity, RemoteParticipant, TransformEdit, XrcEvent,
};
use crate::interface::{
    AttributeStore, EntityDescriptor, EntityEventKind, ParticipantEventKind, RemoteSession,
    RemoteSessionEventKind, StagedSource, XrcCallbacks,
};
use crate::parameters::EntityParameters;
use crate::path::AttributePath;
use mret_schema::{Category, UserType};
use mret_types::{EntityKey, Transform};
use std::sync::Arc;
use tracing::{debug, warn};

/// Turns native callbacks into queued [`XrcEvent`]s.
///
/// Payloads are decoded inside the callback, while the current-event context
/// is still valid. Events that cannot be decoded are logged and dropped.
pub struct EventBridge {
    queues: Arc<EventQueues>,
}

impl EventBridge {
    pub fn new(queues: Arc<EventQueues>) -> Self {
        Self { queues }
    }

    fn post(&self, event: XrcEvent) {
        debug!("Queued {:?}", event.kind());
        self.queues.post(event);
    }

    fn decode_entity(
        entity: &EntityDescriptor,
        context: &dyn AttributeStore,
    ) -> XrcResult<RemoteEntity> {
        let entity_id = EntityKey::new(entity.entity_id.as_str())
            .map_err(|_| XrcError::MissingEntityId(entity.category.clone()))?;
        let category = parse_category(&entity.category)?;
        let reader = AttributeReader::new(context, StagedSource::CurrentEvent);
        let payload = xrc_to_serialized(category, &reader)?;
        let parent_id = entity
            .parent_id
            .as_deref()
            .and_then(|id| EntityKey::new(id).ok());

        Ok(RemoteEntity {
            entity_id,
            parameters: EntityParameters {
                entity_type: entity.entity_type,
                parent_id,
                payload,
            },
        })
    }

    fn decode_edit(
        entity: &EntityDescriptor,
        context: &dyn AttributeStore,
    ) -> XrcResult<TransformEdit> {
        let entity_id = EntityKey::new(entity.entity_id.as_str())
            .map_err(|_| XrcError::MissingEntityId(entity.category.clone()))?;
        let category = parse_category(&entity.category)?;
        if !category.has_transform() {
            return Err(XrcError::NoTransform(category));
        }
        let reader = AttributeReader::new(context, StagedSource::CurrentEvent);
        let transform = Transform::from_xrc(&reader, &transform_path(category))?;

        Ok(TransformEdit {
            entity_id,
            category,
            transform,
        })
    }

    fn decode_participant(
        user: &EntityDescriptor,
        context: &dyn AttributeStore,
    ) -> XrcResult<RemoteParticipant> {
        let user_id = EntityKey::new(user.entity_id.as_str())
            .map_err(|_| XrcError::MissingEntityId(user.category.clone()))?;
        let reader = AttributeReader::new(context, StagedSource::CurrentEvent);
        let user = UserType::from_xrc(&reader, &AttributePath::root(Category::User))?;
        Ok(RemoteParticipant { user_id, user })
    }
}

fn parse_category(name: &str) -> XrcResult<Category> {
    name.parse::<Category>()
        .map_err(|e| XrcError::Native(e.to_string()))
}

impl XrcCallbacks for EventBridge {
    fn on_entity_event(
        &self,
        kind: EntityEventKind,
        entity: &EntityDescriptor,
        context: &dyn AttributeStore,
    ) {
        let event = match kind {
            EntityEventKind::Edited => {
                Self::decode_edit(entity, context).map(XrcEvent::EntityEdited)
            }
            EntityEventKind::Created => {
                Self::decode_entity(entity, context).map(XrcEvent::EntityCreated)
            }
            EntityEventKind::Reinitialized => {
                Self::decode_entity(entity, context).map(XrcEvent::EntityReinitialized)
            }
            EntityEventKind::Updated => {
                Self::decode_entity(entity, context).map(XrcEvent::EntityUpdated)
            }
        };
        match event {
            Ok(event) => self.post(event),
            Err(e) => warn!("Dropping {:?} for entity {}: {}", kind, entity.entity_id, e),
        }
    }

    fn on_entity_destroyed(&self, entity: &EntityDescriptor) {
        let removal = EntityKey::new(entity.entity_id.as_str())
            .ok()
            .zip(entity.category.parse::<Category>().ok());
        match removal {
            Some((entity_id, category)) => {
                self.post(XrcEvent::EntityDestroyed(EntityRemoval {
                    entity_id,
                    category,
                }));
            }
            None => warn!(
                "Dropping destroy for {:?} ({:?}): bad id or category",
                entity.entity_id, entity.category
            ),
        }
    }

    fn on_participant_event(
        &self,
        kind: ParticipantEventKind,
        user: &EntityDescriptor,
        context: &dyn AttributeStore,
    ) {
        match Self::decode_participant(user, context) {
            Ok(participant) => self.post(match kind {
                ParticipantEventKind::Added => XrcEvent::ParticipantAdded(participant),
                ParticipantEventKind::Resynced => XrcEvent::ParticipantResynced(participant),
            }),
            Err(e) => warn!("Dropping {:?} for user {}: {}", kind, user.entity_id, e),
        }
    }

    fn on_participant_deleted(&self, user_id: &str) {
        match EntityKey::new(user_id) {
            Ok(key) => self.post(XrcEvent::ParticipantDeleted(key)),
            Err(_) => warn!("Dropping participant delete with empty id"),
        }
    }

    fn on_remote_session(&self, kind: RemoteSessionEventKind, session: &RemoteSession) {
        self.post(match kind {
            RemoteSessionEventKind::Added => XrcEvent::RemoteSessionAdded(session.clone()),
            RemoteSessionEventKind::Updated => XrcEvent::RemoteSessionUpdated(session.clone()),
        });
    }

    fn on_remote_session_deleted(&self, session_id: &str) {
        self.post(XrcEvent::RemoteSessionDeleted(session_id.to_string()));
    }
}
