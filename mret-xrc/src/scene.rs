//! Local mirror of the shared session.

use crate::events::{EventDispatcher, EventKind, RemoteEntity, RemoteParticipant, XrcEvent};
use crate::interface::RemoteSession;
use crate::parameters::EntityParameters;
use mret_schema::UserType;
use mret_types::EntityKey;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Entities, participants and advertised sessions as remote events have
/// described them.
#[derive(Debug, Default)]
pub struct SceneMirror {
    entities: BTreeMap<EntityKey, EntityParameters>,
    participants: BTreeMap<EntityKey, UserType>,
    sessions: BTreeMap<String, RemoteSession>,
    applied: usize,
}

impl SceneMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a shared mirror as listener for every event kind.
    pub fn attach(dispatcher: &mut EventDispatcher) -> Arc<Mutex<SceneMirror>> {
        let mirror = Arc::new(Mutex::new(SceneMirror::new()));
        for kind in EventKind::ALL {
            let mirror = Arc::clone(&mirror);
            dispatcher.add_listener(
                kind,
                Box::new(move |event| {
                    mirror
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .apply(event);
                }),
            );
        }
        mirror
    }

    /// Applies one remote event.
    pub fn apply(&mut self, event: &XrcEvent) {
        self.applied += 1;
        match event {
            XrcEvent::EntityCreated(entity) | XrcEvent::EntityReinitialized(entity) => {
                self.upsert_entity(entity);
            }
            XrcEvent::EntityUpdated(entity) => {
                if !self.entities.contains_key(&entity.entity_id) {
                    debug!("Update for unknown entity {}; inserting", entity.entity_id);
                }
                self.upsert_entity(entity);
            }
            XrcEvent::EntityEdited(edit) => {
                let Some(params) = self.entities.get_mut(&edit.entity_id) else {
                    warn!("Transform edit for unknown entity {}", edit.entity_id);
                    return;
                };
                match params.payload.scene_object_mut() {
                    Some(object) => object.transform = edit.transform,
                    None => warn!(
                        "Transform edit for {} which has no transform ({})",
                        edit.entity_id, edit.category
                    ),
                }
            }
            XrcEvent::EntityDestroyed(removal) => {
                let removed = self.remove_subtree(&removal.entity_id);
                debug!("Removed {} entities under {}", removed, removal.entity_id);
            }
            XrcEvent::ParticipantAdded(participant)
            | XrcEvent::ParticipantResynced(participant) => self.upsert_participant(participant),
            XrcEvent::ParticipantDeleted(user_id) => {
                if self.participants.remove(user_id).is_none() {
                    debug!("Delete for unknown participant {}", user_id);
                }
            }
            XrcEvent::RemoteSessionAdded(session) | XrcEvent::RemoteSessionUpdated(session) => {
                self.sessions.insert(session.id.clone(), session.clone());
            }
            XrcEvent::RemoteSessionDeleted(session_id) => {
                self.sessions.remove(session_id);
            }
        }
    }

    fn upsert_entity(&mut self, entity: &RemoteEntity) {
        self.entities
            .insert(entity.entity_id.clone(), entity.parameters.clone());
    }

    fn upsert_participant(&mut self, participant: &RemoteParticipant) {
        self.participants
            .insert(participant.user_id.clone(), participant.user.clone());
    }

    /// Removes an entity and everything parented below it. Returns the count.
    fn remove_subtree(&mut self, root: &EntityKey) -> usize {
        let mut doomed = BTreeSet::new();
        if self.entities.contains_key(root) {
            doomed.insert(root.clone());
        }
        loop {
            let children: Vec<EntityKey> = self
                .entities
                .iter()
                .filter(|(key, params)| {
                    !doomed.contains(*key)
                        && params
                            .parent_id
                            .as_ref()
                            .is_some_and(|parent| doomed.contains(parent) || parent == root)
                })
                .map(|(key, _)| key.clone())
                .collect();
            if children.is_empty() {
                break;
            }
            doomed.extend(children);
        }
        for key in &doomed {
            self.entities.remove(key);
        }
        doomed.len()
    }

    pub fn entity(&self, entity_id: &EntityKey) -> Option<&EntityParameters> {
        self.entities.get(entity_id)
    }

    pub fn entities(&self) -> impl Iterator<Item = (&EntityKey, &EntityParameters)> {
        self.entities.iter()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn participant(&self, user_id: &EntityKey) -> Option<&UserType> {
        self.participants.get(user_id)
    }

    pub fn participants(&self) -> impl Iterator<Item = (&EntityKey, &UserType)> {
        self.participants.iter()
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn session(&self, session_id: &str) -> Option<&RemoteSession> {
        self.sessions.get(session_id)
    }

    pub fn sessions(&self) -> impl Iterator<Item = &RemoteSession> {
        self.sessions.values()
    }

    /// Total events applied since creation.
    pub fn applied(&self) -> usize {
        self.applied
    }
}
