//! In-process engine.
//!
//! [`LoopbackHub`] plays the session server; each [`LoopbackXrc`] connected to
//! it is one client with its own staging area. Session commands from one
//! client reach the callbacks of the others synchronously, on the calling
//! thread, after the hub lock has been released.

use crate::interface::{
    AttributeStore, AttributeValue, EngineSettings, EntityDescriptor, EntityEventKind,
    ParticipantEventKind, RemoteSession, RemoteSessionEventKind, StagedSource, XrcCallbacks,
    XrcInterface,
};
use crate::path::AttributePath;
use mret_schema::Category;
use mret_types::EntityType;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};
use uuid::Uuid;

type AttributeBag = BTreeMap<String, AttributeValue>;
type ClientId = u64;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn user_descriptor(user_id: &str) -> EntityDescriptor {
    EntityDescriptor {
        entity_id: user_id.to_string(),
        category: Category::User.name().to_string(),
        entity_type: EntityType::User,
        parent_id: None,
    }
}

/// True if `key` is `prefix` or lies below it.
fn is_under(prefix: &str, key: &str) -> bool {
    key == prefix
        || key
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with(AttributePath::SEPARATOR))
}

#[derive(Debug, Clone)]
struct HubEntity {
    descriptor: EntityDescriptor,
    attributes: AttributeBag,
}

#[derive(Debug)]
struct Member {
    client: ClientId,
    user: HubEntity,
}

#[derive(Debug)]
struct HubSession {
    id: String,
    name: String,
    group: String,
    master: ClientId,
    master_alias: String,
    members: Vec<Member>,
    entities: Vec<HubEntity>,
}

impl HubSession {
    fn summary(&self) -> RemoteSession {
        RemoteSession {
            id: self.id.clone(),
            name: self.name.clone(),
            group: self.group.clone(),
            master_alias: self.master_alias.clone(),
            participants: self.members.len(),
        }
    }

    fn peers(&self, except: ClientId) -> Vec<ClientId> {
        self.members
            .iter()
            .map(|m| m.client)
            .filter(|c| *c != except)
            .collect()
    }

    fn entity_mut(&mut self, entity_id: &str) -> Option<&mut HubEntity> {
        self.entities
            .iter_mut()
            .find(|e| e.descriptor.entity_id == entity_id)
    }

    /// Removes `entity_id` and everything parented below it. Returns the
    /// root's descriptor, or `None` if the session does not hold it.
    fn remove_subtree(&mut self, entity_id: &str) -> Option<EntityDescriptor> {
        let root = self
            .entities
            .iter()
            .find(|e| e.descriptor.entity_id == entity_id)?
            .descriptor
            .clone();
        let mut doomed = vec![entity_id.to_string()];
        let mut frontier = 0;
        while frontier < doomed.len() {
            let parent = doomed[frontier].clone();
            doomed.extend(
                self.entities
                    .iter()
                    .filter(|e| e.descriptor.parent_id.as_deref() == Some(parent.as_str()))
                    .map(|e| e.descriptor.entity_id.clone())
                    .filter(|id| !doomed.contains(id))
                    .collect::<Vec<_>>(),
            );
            frontier += 1;
        }
        self.entities
            .retain(|e| !doomed.contains(&e.descriptor.entity_id));
        if doomed.len() > 1 {
            debug!("Removed {} with {} descendants", entity_id, doomed.len() - 1);
        }
        Some(root)
    }
}

#[derive(Default)]
struct ClientState {
    callbacks: Option<Arc<dyn XrcCallbacks>>,
    group: String,
    session: Option<String>,
}

#[derive(Default)]
struct HubState {
    next_client: ClientId,
    clients: HashMap<ClientId, ClientState>,
    sessions: BTreeMap<String, HubSession>,
}

impl HubState {
    fn callbacks(&self, client: ClientId) -> Option<Arc<dyn XrcCallbacks>> {
        self.clients.get(&client).and_then(|c| c.callbacks.clone())
    }

    fn notify(
        &self,
        out: &mut Vec<Delivery>,
        targets: impl IntoIterator<Item = ClientId>,
        notice: impl Fn() -> Notice,
    ) {
        for target in targets {
            if let Some(callbacks) = self.callbacks(target) {
                out.push(Delivery {
                    callbacks,
                    notice: notice(),
                });
            }
        }
    }

    /// Started clients in `group` that are not in `session_id`.
    fn outsiders(&self, group: &str, session_id: &str, except: ClientId) -> Vec<ClientId> {
        self.clients
            .iter()
            .filter(|(id, c)| {
                **id != except
                    && c.callbacks.is_some()
                    && c.group == group
                    && c.session.as_deref() != Some(session_id)
            })
            .map(|(id, _)| *id)
            .collect()
    }

    fn started(&self, client: ClientId) -> bool {
        self.clients
            .get(&client)
            .is_some_and(|c| c.callbacks.is_some())
    }

    fn session_of(&self, client: ClientId) -> Option<String> {
        self.clients.get(&client).and_then(|c| c.session.clone())
    }
}

enum Notice {
    Entity(EntityEventKind, EntityDescriptor, AttributeBag),
    EntityDestroyed(EntityDescriptor),
    Participant(ParticipantEventKind, EntityDescriptor, AttributeBag),
    ParticipantDeleted(String),
    Session(RemoteSessionEventKind, RemoteSession),
    SessionDeleted(String),
}

struct Delivery {
    callbacks: Arc<dyn XrcCallbacks>,
    notice: Notice,
}

impl Delivery {
    fn send(self) {
        let callbacks = self.callbacks.as_ref();
        match self.notice {
            Notice::Entity(kind, descriptor, attributes) => {
                let context = EventContext {
                    attributes: &attributes,
                };
                callbacks.on_entity_event(kind, &descriptor, &context);
            }
            Notice::EntityDestroyed(descriptor) => callbacks.on_entity_destroyed(&descriptor),
            Notice::Participant(kind, descriptor, attributes) => {
                let context = EventContext {
                    attributes: &attributes,
                };
                callbacks.on_participant_event(kind, &descriptor, &context);
            }
            Notice::ParticipantDeleted(user_id) => callbacks.on_participant_deleted(&user_id),
            Notice::Session(kind, session) => callbacks.on_remote_session(kind, &session),
            Notice::SessionDeleted(session_id) => callbacks.on_remote_session_deleted(&session_id),
        }
    }
}

/// Read-only view of the entity a callback is about.
struct EventContext<'a> {
    attributes: &'a AttributeBag,
}

impl AttributeStore for EventContext<'_> {
    fn get_attribute(&self, source: StagedSource<'_>, path: &str) -> Option<AttributeValue> {
        match source {
            StagedSource::CurrentEvent => self.attributes.get(path).cloned(),
            StagedSource::Entity(_) => None,
        }
    }

    fn set_attribute(&self, _entity_id: &str, _path: &str, _value: AttributeValue) -> bool {
        false
    }
}

/// The shared session server.
#[derive(Default)]
pub struct LoopbackHub {
    state: Mutex<HubState>,
}

impl LoopbackHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new client.
    pub fn connect(self: &Arc<Self>) -> LoopbackXrc {
        let mut state = lock(&self.state);
        let client = state.next_client;
        state.next_client += 1;
        state.clients.insert(client, ClientState::default());
        debug!("Loopback client {} connected", client);
        LoopbackXrc {
            hub: Arc::clone(self),
            client,
            staged: Mutex::new(HashMap::new()),
        }
    }

    /// Every session on the hub, regardless of group.
    pub fn sessions(&self) -> Vec<RemoteSession> {
        lock(&self.state)
            .sessions
            .values()
            .map(HubSession::summary)
            .collect()
    }

    /// Number of entities published to a session.
    pub fn entity_count(&self, session_id: &str) -> Option<usize> {
        lock(&self.state)
            .sessions
            .get(session_id)
            .map(|s| s.entities.len())
    }

    /// Number of connected clients, started or not.
    pub fn client_count(&self) -> usize {
        lock(&self.state).clients.len()
    }
}

/// One client of a [`LoopbackHub`].
pub struct LoopbackXrc {
    hub: Arc<LoopbackHub>,
    client: ClientId,
    staged: Mutex<HashMap<String, AttributeBag>>,
}

impl LoopbackXrc {
    /// Runs `f` under the hub lock, then delivers what it queued.
    fn with_hub<R>(&self, f: impl FnOnce(&mut HubState, &mut Vec<Delivery>) -> R) -> R {
        let mut deliveries = Vec::new();
        let result = {
            let mut state = lock(&self.hub.state);
            f(&mut state, &mut deliveries)
        };
        for delivery in deliveries {
            delivery.send();
        }
        result
    }

    fn staged_bag(&self, entity_id: &str) -> Option<AttributeBag> {
        lock(&self.staged).get(entity_id).cloned()
    }

    fn staged_alias(bag: &AttributeBag) -> String {
        let alias_path = AttributePath::root(Category::User).child("ALIAS");
        match bag.get(alias_path.as_str()) {
            Some(AttributeValue::String(alias)) => alias.clone(),
            _ => String::new(),
        }
    }
}

impl AttributeStore for LoopbackXrc {
    fn get_attribute(&self, source: StagedSource<'_>, path: &str) -> Option<AttributeValue> {
        match source {
            StagedSource::Entity(entity_id) => lock(&self.staged)
                .get(entity_id)
                .and_then(|bag| bag.get(path).cloned()),
            StagedSource::CurrentEvent => None,
        }
    }

    fn set_attribute(&self, entity_id: &str, path: &str, value: AttributeValue) -> bool {
        match lock(&self.staged).get_mut(entity_id) {
            Some(bag) => {
                bag.insert(path.to_string(), value);
                true
            }
            None => false,
        }
    }
}

impl XrcInterface for LoopbackXrc {
    fn start_up(&self, settings: &EngineSettings, callbacks: Arc<dyn XrcCallbacks>) -> bool {
        self.with_hub(|hub, out| {
            let Some(client) = hub.clients.get_mut(&self.client) else {
                return false;
            };
            if client.callbacks.is_some() {
                return false;
            }
            client.callbacks = Some(Arc::clone(&callbacks));
            client.group = settings.group.clone();

            for session in hub.sessions.values().filter(|s| s.group == settings.group) {
                out.push(Delivery {
                    callbacks: Arc::clone(&callbacks),
                    notice: Notice::Session(RemoteSessionEventKind::Added, session.summary()),
                });
            }
            info!("Loopback client {} started in group {:?}", self.client, settings.group);
            true
        })
    }

    fn shut_down(&self) -> bool {
        if !self.is_started() {
            return false;
        }
        if self.active_session().is_some() && !self.end_session() {
            self.leave_session();
        }
        self.with_hub(|hub, _| {
            if let Some(client) = hub.clients.get_mut(&self.client) {
                *client = ClientState::default();
            }
        });
        lock(&self.staged).clear();
        true
    }

    fn is_started(&self) -> bool {
        lock(&self.hub.state).started(self.client)
    }

    fn start_session(&self, user_id: &str, name: &str) -> Option<String> {
        let user = self.staged_bag(user_id)?;
        self.with_hub(|hub, out| {
            let client = hub.clients.get(&self.client)?;
            if client.callbacks.is_none() || client.session.is_some() {
                return None;
            }
            let group = client.group.clone();
            let session_id = Uuid::now_v7().to_string();
            let session = HubSession {
                id: session_id.clone(),
                name: name.to_string(),
                group: group.clone(),
                master: self.client,
                master_alias: Self::staged_alias(&user),
                members: vec![Member {
                    client: self.client,
                    user: HubEntity {
                        descriptor: user_descriptor(user_id),
                        attributes: user,
                    },
                }],
                entities: Vec::new(),
            };
            let summary = session.summary();
            hub.sessions.insert(session_id.clone(), session);
            if let Some(client) = hub.clients.get_mut(&self.client) {
                client.session = Some(session_id.clone());
            }

            let outsiders = hub.outsiders(&group, &session_id, self.client);
            hub.notify(out, outsiders, || {
                Notice::Session(RemoteSessionEventKind::Added, summary.clone())
            });
            Some(session_id)
        })
    }

    fn join_session(&self, session_id: &str, user_id: &str) -> bool {
        let Some(user) = self.staged_bag(user_id) else {
            return false;
        };
        self.with_hub(|hub, out| {
            if !hub.started(self.client) || hub.session_of(self.client).is_some() {
                return false;
            }
            let Some(session) = hub.sessions.get_mut(session_id) else {
                return false;
            };
            if session
                .members
                .iter()
                .any(|m| m.user.descriptor.entity_id == user_id)
            {
                return false;
            }

            let existing = session.peers(self.client);
            let mut resync: Vec<Notice> = session
                .entities
                .iter()
                .map(|e| {
                    Notice::Entity(
                        EntityEventKind::Reinitialized,
                        e.descriptor.clone(),
                        e.attributes.clone(),
                    )
                })
                .collect();
            resync.extend(session.members.iter().map(|m| {
                Notice::Participant(
                    ParticipantEventKind::Resynced,
                    m.user.descriptor.clone(),
                    m.user.attributes.clone(),
                )
            }));
            session.members.push(Member {
                client: self.client,
                user: HubEntity {
                    descriptor: user_descriptor(user_id),
                    attributes: user.clone(),
                },
            });
            let summary = session.summary();
            let group = session.group.clone();
            if let Some(client) = hub.clients.get_mut(&self.client) {
                client.session = Some(session_id.to_string());
            }

            if let Some(callbacks) = hub.callbacks(self.client) {
                out.extend(resync.into_iter().map(|notice| Delivery {
                    callbacks: Arc::clone(&callbacks),
                    notice,
                }));
            }
            hub.notify(out, existing, || {
                Notice::Participant(
                    ParticipantEventKind::Added,
                    user_descriptor(user_id),
                    user.clone(),
                )
            });
            let outsiders = hub.outsiders(&group, session_id, self.client);
            hub.notify(out, outsiders, || {
                Notice::Session(RemoteSessionEventKind::Updated, summary.clone())
            });
            true
        })
    }

    fn end_session(&self) -> bool {
        self.with_hub(|hub, out| {
            let Some(session_id) = hub.session_of(self.client) else {
                return false;
            };
            match hub.sessions.get(&session_id) {
                Some(session) if session.master == self.client => {}
                _ => return false,
            }
            let Some(session) = hub.sessions.remove(&session_id) else {
                return false;
            };
            for member in &session.members {
                if let Some(client) = hub.clients.get_mut(&member.client) {
                    client.session = None;
                }
            }

            let others: Vec<ClientId> = hub
                .clients
                .iter()
                .filter(|(id, c)| **id != self.client && c.callbacks.is_some())
                .map(|(id, _)| *id)
                .collect();
            hub.notify(out, others, || Notice::SessionDeleted(session_id.clone()));
            info!("Loopback session {} ended", session_id);
            true
        })
    }

    fn leave_session(&self) -> bool {
        self.with_hub(|hub, out| {
            let Some(session_id) = hub.session_of(self.client) else {
                return false;
            };
            let Some(session) = hub.sessions.get_mut(&session_id) else {
                return false;
            };
            if session.master == self.client {
                return false;
            }
            let Some(index) = session.members.iter().position(|m| m.client == self.client)
            else {
                return false;
            };
            let member = session.members.remove(index);
            let remaining = session.peers(self.client);
            let summary = session.summary();
            let group = session.group.clone();
            if let Some(client) = hub.clients.get_mut(&self.client) {
                client.session = None;
            }

            let user_id = member.user.descriptor.entity_id;
            hub.notify(out, remaining, || Notice::ParticipantDeleted(user_id.clone()));
            let outsiders = hub.outsiders(&group, &session_id, self.client);
            hub.notify(out, outsiders, || {
                Notice::Session(RemoteSessionEventKind::Updated, summary.clone())
            });
            true
        })
    }

    fn active_session(&self) -> Option<String> {
        lock(&self.hub.state).session_of(self.client)
    }

    fn stage_entity(&self, entity_id: &str) -> bool {
        if entity_id.is_empty() {
            return false;
        }
        lock(&self.staged).insert(entity_id.to_string(), AttributeBag::new());
        true
    }

    fn unstage_entity(&self, entity_id: &str) -> bool {
        lock(&self.staged).remove(entity_id).is_some()
    }

    fn add_session_entity(&self, entity: &EntityDescriptor) -> bool {
        let Some(attributes) = self.staged_bag(&entity.entity_id) else {
            return false;
        };
        self.with_hub(|hub, out| {
            let Some(session_id) = hub.session_of(self.client) else {
                return false;
            };
            let Some(session) = hub.sessions.get_mut(&session_id) else {
                return false;
            };
            if session.entity_mut(&entity.entity_id).is_some() {
                return false;
            }
            session.entities.push(HubEntity {
                descriptor: entity.clone(),
                attributes: attributes.clone(),
            });
            let peers = session.peers(self.client);
            hub.notify(out, peers, || {
                Notice::Entity(EntityEventKind::Created, entity.clone(), attributes.clone())
            });
            true
        })
    }

    fn update_session_entity(&self, entity_id: &str) -> bool {
        let Some(attributes) = self.staged_bag(entity_id) else {
            return false;
        };
        self.with_hub(|hub, out| {
            let Some(session_id) = hub.session_of(self.client) else {
                return false;
            };
            let Some(session) = hub.sessions.get_mut(&session_id) else {
                return false;
            };
            let Some(stored) = session.entity_mut(entity_id) else {
                return false;
            };
            stored.attributes = attributes;
            let descriptor = stored.descriptor.clone();
            let published = stored.attributes.clone();
            let peers = session.peers(self.client);
            hub.notify(out, peers, || {
                Notice::Entity(EntityEventKind::Updated, descriptor.clone(), published.clone())
            });
            true
        })
    }

    fn edit_session_entity(&self, entity_id: &str, attribute_path: &str) -> bool {
        let Some(staged) = self.staged_bag(entity_id) else {
            return false;
        };
        let edits: AttributeBag = staged
            .into_iter()
            .filter(|(key, _)| is_under(attribute_path, key))
            .collect();
        if edits.is_empty() {
            return false;
        }
        self.with_hub(|hub, out| {
            let Some(session_id) = hub.session_of(self.client) else {
                return false;
            };
            let Some(session) = hub.sessions.get_mut(&session_id) else {
                return false;
            };
            let Some(stored) = session.entity_mut(entity_id) else {
                return false;
            };
            stored.attributes.extend(edits);
            let descriptor = stored.descriptor.clone();
            let published = stored.attributes.clone();
            let peers = session.peers(self.client);
            hub.notify(out, peers, || {
                Notice::Entity(EntityEventKind::Edited, descriptor.clone(), published.clone())
            });
            true
        })
    }

    fn remove_session_entity(&self, entity_id: &str) -> bool {
        self.with_hub(|hub, out| {
            let Some(session_id) = hub.session_of(self.client) else {
                return false;
            };
            let Some(session) = hub.sessions.get_mut(&session_id) else {
                return false;
            };
            // Peers drop the subtree on their own when told about its root.
            let Some(removed) = session.remove_subtree(entity_id) else {
                return false;
            };
            let peers = session.peers(self.client);
            hub.notify(out, peers, || Notice::EntityDestroyed(removed.clone()));
            true
        })
    }

    fn remote_sessions(&self) -> Vec<RemoteSession> {
        let state = lock(&self.hub.state);
        let Some(client) = state.clients.get(&self.client) else {
            return Vec::new();
        };
        if client.callbacks.is_none() {
            return Vec::new();
        }
        state
            .sessions
            .values()
            .filter(|s| s.group == client.group)
            .map(HubSession::summary)
            .collect()
    }
}

impl Drop for LoopbackXrc {
    fn drop(&mut self) {
        // A dropped client leaves its session the way a disconnect would.
        self.shut_down();
        lock(&self.hub.state).clients.remove(&self.client);
        debug!("Loopback client {} disconnected", self.client);
    }
}
