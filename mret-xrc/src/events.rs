//! Remote events, their queues, and the per-tick dispatcher.
//!
//! Native callbacks run on whatever thread the engine picks. They decode their
//! payload on the spot and [`EventQueues::post`] it: the payload goes into the
//! FIFO for its kind and a handle naming the kind goes into the shared handle
//! queue. The owner thread drains handles with [`EventDispatcher::tick`], at
//! most a few per call, so a burst of remote activity is spread over frames.

use crate::interface::RemoteSession;
use crate::parameters::EntityParameters;
use mret_schema::{Category, UserType};
use mret_types::{EntityKey, Transform};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Handles dispatched per tick unless configured otherwise.
pub const DEFAULT_MAX_EVENTS_PER_TICK: usize = 3;

/// The kinds of remote activity the engine reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    EntityCreated,
    EntityDestroyed,
    EntityReinitialized,
    EntityUpdated,
    EntityEdited,
    ParticipantAdded,
    ParticipantResynced,
    ParticipantDeleted,
    RemoteSessionAdded,
    RemoteSessionUpdated,
    RemoteSessionDeleted,
}

impl EventKind {
    pub const ALL: [Self; 11] = [
        Self::EntityCreated,
        Self::EntityDestroyed,
        Self::EntityReinitialized,
        Self::EntityUpdated,
        Self::EntityEdited,
        Self::ParticipantAdded,
        Self::ParticipantResynced,
        Self::ParticipantDeleted,
        Self::RemoteSessionAdded,
        Self::RemoteSessionUpdated,
        Self::RemoteSessionDeleted,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

/// An entity as it arrived from the session.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteEntity {
    /// Key the engine knows the entity by.
    pub entity_id: EntityKey,
    pub parameters: EntityParameters,
}

/// A participant as it arrived from the session.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteParticipant {
    pub user_id: EntityKey,
    pub user: UserType,
}

/// Payload of an entity-destroyed event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRemoval {
    pub entity_id: EntityKey,
    pub category: Category,
}

/// Payload of an entity-edited event. Only the transform is edited in place.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformEdit {
    pub entity_id: EntityKey,
    pub category: Category,
    pub transform: Transform,
}

/// A decoded remote event.
#[derive(Debug, Clone, PartialEq)]
pub enum XrcEvent {
    EntityCreated(RemoteEntity),
    EntityDestroyed(EntityRemoval),
    EntityReinitialized(RemoteEntity),
    EntityUpdated(RemoteEntity),
    EntityEdited(TransformEdit),
    ParticipantAdded(RemoteParticipant),
    ParticipantResynced(RemoteParticipant),
    ParticipantDeleted(EntityKey),
    RemoteSessionAdded(RemoteSession),
    RemoteSessionUpdated(RemoteSession),
    RemoteSessionDeleted(String),
}

impl XrcEvent {
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::EntityCreated(_) => EventKind::EntityCreated,
            Self::EntityDestroyed(_) => EventKind::EntityDestroyed,
            Self::EntityReinitialized(_) => EventKind::EntityReinitialized,
            Self::EntityUpdated(_) => EventKind::EntityUpdated,
            Self::EntityEdited(_) => EventKind::EntityEdited,
            Self::ParticipantAdded(_) => EventKind::ParticipantAdded,
            Self::ParticipantResynced(_) => EventKind::ParticipantResynced,
            Self::ParticipantDeleted(_) => EventKind::ParticipantDeleted,
            Self::RemoteSessionAdded(_) => EventKind::RemoteSessionAdded,
            Self::RemoteSessionUpdated(_) => EventKind::RemoteSessionUpdated,
            Self::RemoteSessionDeleted(_) => EventKind::RemoteSessionDeleted,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// A thread-safe FIFO.
#[derive(Debug)]
pub struct PayloadQueue<T> {
    items: Mutex<VecDeque<T>>,
}

impl<T> Default for PayloadQueue<T> {
    fn default() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
        }
    }
}

impl<T> PayloadQueue<T> {
    pub fn push(&self, item: T) {
        lock(&self.items).push_back(item);
    }

    pub fn pop(&self) -> Option<T> {
        lock(&self.items).pop_front()
    }

    pub fn len(&self) -> usize {
        lock(&self.items).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.items).is_empty()
    }
}

/// One payload queue per event kind plus the handle queue that orders them.
#[derive(Debug)]
pub struct EventQueues {
    payloads: [PayloadQueue<XrcEvent>; EventKind::ALL.len()],
    handles: PayloadQueue<EventKind>,
}

impl Default for EventQueues {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueues {
    pub fn new() -> Self {
        Self {
            payloads: std::array::from_fn(|_| PayloadQueue::default()),
            handles: PayloadQueue::default(),
        }
    }

    /// Enqueues an event. Payload first, then its handle.
    pub fn post(&self, event: XrcEvent) {
        let kind = event.kind();
        self.payloads[kind.index()].push(event);
        self.handles.push(kind);
    }

    /// Pops the oldest payload of `kind`.
    pub(crate) fn take(&self, kind: EventKind) -> Option<XrcEvent> {
        self.payloads[kind.index()].pop()
    }

    /// Pops the oldest handle.
    pub(crate) fn next_handle(&self) -> Option<EventKind> {
        self.handles.pop()
    }

    pub fn pending_handles(&self) -> usize {
        self.handles.len()
    }

    /// Number of payloads waiting for `kind`.
    pub fn pending(&self, kind: EventKind) -> usize {
        self.payloads[kind.index()].len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Receives every dispatched event of the kinds it is registered for.
pub type Listener = Box<dyn FnMut(&XrcEvent) + Send>;

/// Drains the handle queue on the owner thread.
pub struct EventDispatcher {
    queues: Arc<EventQueues>,
    listeners: HashMap<EventKind, Vec<Listener>>,
    max_per_tick: usize,
}

impl EventDispatcher {
    /// A `max_per_tick` of zero is raised to one.
    pub fn new(queues: Arc<EventQueues>, max_per_tick: usize) -> Self {
        Self {
            queues,
            listeners: HashMap::new(),
            max_per_tick: max_per_tick.max(1),
        }
    }

    pub fn queues(&self) -> &Arc<EventQueues> {
        &self.queues
    }

    pub fn max_per_tick(&self) -> usize {
        self.max_per_tick
    }

    pub fn add_listener(&mut self, kind: EventKind, listener: Listener) {
        self.listeners.entry(kind).or_default().push(listener);
    }

    pub fn has_listener(&self, kind: EventKind) -> bool {
        self.listeners.get(&kind).is_some_and(|l| !l.is_empty())
    }

    /// Dispatches up to `max_per_tick` handles. Returns how many were handled.
    ///
    /// Each handle releases exactly one payload of its kind, whether or not a
    /// listener is registered for it.
    pub fn tick(&mut self) -> usize {
        let mut handled = 0;
        while handled < self.max_per_tick {
            let Some(kind) = self.queues.next_handle() else {
                break;
            };
            handled += 1;

            let Some(event) = self.queues.take(kind) else {
                warn!("Handle for {:?} without a payload", kind);
                continue;
            };
            match self.listeners.get_mut(&kind) {
                Some(listeners) if !listeners.is_empty() => {
                    for listener in listeners.iter_mut() {
                        listener(&event);
                    }
                }
                _ => debug!("No listener for {:?}; payload discarded", kind),
            }
        }
        handled
    }
}
