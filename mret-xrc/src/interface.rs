//! The native engine boundary.
//!
//! XRC is an opaque engine reached through a flat, C-style API: staged
//! entities are attribute bags addressed by `(entity id, attribute path)`,
//! session commands return plain success flags, and remote activity arrives
//! through registered callbacks on a thread the engine chooses.
//!
//! These traits describe that API so the rest of the crate can be driven by
//! any implementation, including [`crate::loopback`].

use mret_types::{EntityType, Transform};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A single staged attribute value, typed by primitive kind.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Blob(Vec<u8>),
    /// The engine's packed position/rotation/scale kind.
    Transform(Transform),
}

impl AttributeValue {
    /// Name of the primitive kind, for diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Blob(_) => "blob",
            Self::Transform(_) => "transform",
        }
    }
}

/// Where an attribute read is served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagedSource<'a> {
    /// A named staged entity.
    Entity(&'a str),
    /// The entity carried by the native callback currently executing.
    CurrentEvent,
}

impl<'a> From<&'a str> for StagedSource<'a> {
    /// The native API selects the current-event context with an empty id.
    fn from(entity_id: &'a str) -> Self {
        if entity_id.is_empty() {
            Self::CurrentEvent
        } else {
            Self::Entity(entity_id)
        }
    }
}

/// Flat get/set access to staged attributes.
pub trait AttributeStore: Send + Sync {
    /// Reads one attribute. `None` when it is not staged.
    fn get_attribute(&self, source: StagedSource<'_>, path: &str) -> Option<AttributeValue>;

    /// Writes one attribute of a staged entity. Returns false if refused.
    fn set_attribute(&self, entity_id: &str, path: &str, value: AttributeValue) -> bool;
}

/// Identity of a session entity as the engine sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    pub entity_id: String,
    /// Serialized type name, e.g. `"PartType"`.
    pub category: String,
    pub entity_type: EntityType,
    pub parent_id: Option<String>,
}

/// A session advertised by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSession {
    pub id: String,
    pub name: String,
    pub group: String,
    pub master_alias: String,
    pub participants: usize,
}

/// Remote entity activity that carries attribute data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityEventKind {
    Created,
    Reinitialized,
    Updated,
    Edited,
}

/// Remote participant activity that carries attribute data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticipantEventKind {
    Added,
    Resynced,
}

/// Changes to the set of advertised sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteSessionEventKind {
    Added,
    Updated,
}

/// Entry points the engine calls back into.
///
/// Implementations must be callable from any thread. The `context` store is
/// only valid for the duration of the call; read it with
/// [`StagedSource::CurrentEvent`] before returning.
pub trait XrcCallbacks: Send + Sync {
    fn on_entity_event(
        &self,
        kind: EntityEventKind,
        entity: &EntityDescriptor,
        context: &dyn AttributeStore,
    );

    fn on_entity_destroyed(&self, entity: &EntityDescriptor);

    fn on_participant_event(
        &self,
        kind: ParticipantEventKind,
        user: &EntityDescriptor,
        context: &dyn AttributeStore,
    );

    fn on_participant_deleted(&self, user_id: &str);

    fn on_remote_session(&self, kind: RemoteSessionEventKind, session: &RemoteSession);

    fn on_remote_session_deleted(&self, session_id: &str);
}

/// Connection settings handed to the engine at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub server: String,
    pub port: u16,
    pub group: String,
}

/// The engine's session and entity lifecycle API.
pub trait XrcInterface: AttributeStore {
    fn start_up(&self, settings: &EngineSettings, callbacks: Arc<dyn XrcCallbacks>) -> bool;
    fn shut_down(&self) -> bool;
    fn is_started(&self) -> bool;

    /// Starts a session mastered by the staged user. Returns the session id.
    fn start_session(&self, user_id: &str, name: &str) -> Option<String>;
    fn join_session(&self, session_id: &str, user_id: &str) -> bool;
    fn end_session(&self) -> bool;
    fn leave_session(&self) -> bool;
    /// Id of the session this client is in, if any.
    fn active_session(&self) -> Option<String>;

    /// Creates (or clears) the staging area for an entity.
    fn stage_entity(&self, entity_id: &str) -> bool;
    fn unstage_entity(&self, entity_id: &str) -> bool;

    fn add_session_entity(&self, entity: &EntityDescriptor) -> bool;
    fn update_session_entity(&self, entity_id: &str) -> bool;
    /// Publishes only the staged attributes under `attribute_path`.
    fn edit_session_entity(&self, entity_id: &str, attribute_path: &str) -> bool;
    fn remove_session_entity(&self, entity_id: &str) -> bool;

    fn remote_sessions(&self) -> Vec<RemoteSession>;
}
