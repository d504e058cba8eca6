//! Session lifecycle and the two-phase entity mutation protocol.
//!
//! Every mutation first stages the entity's attributes with the engine
//! ([`stage_entity`]) and only then issues the session command that
//! publishes them. When staging fails the command is never sent and the
//! partial stage is dropped.

use crate::bridge::EventBridge;
use crate::codec::{AttributeWriter, XrcCodec, serialized_to_xrc, transform_path};
use crate::config::XrcConfig;
use crate::error::{XrcError, XrcResult};
use crate::events::{EventDispatcher, EventQueues};
use crate::interface::{RemoteSession, XrcInterface};
use crate::parameters::EntityParameters;
use mret_schema::{Category, Identifiable, UserType};
use mret_types::{EntityKey, Transform};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where the manager is in the session lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    NoSession,
    Active { session_id: String, is_master: bool },
}

/// Stages `params` with the engine and writes all of its attributes.
///
/// Returns the key the entity is staged under. A stage that fails part way
/// is removed again.
pub fn stage_entity<X: XrcInterface>(
    xrc: &X,
    params: &EntityParameters,
) -> XrcResult<EntityKey> {
    let Some(entity_id) = params.entity_id() else {
        let name = params.payload.identifiable().name.clone();
        warn!("Cannot stage {:?}: entity has no UUID", name);
        return Err(XrcError::MissingEntityId(name));
    };

    if !xrc.stage_entity(entity_id.as_str()) {
        warn!("Engine refused to stage entity {}", entity_id);
        return Err(XrcError::Native(format!("stage_entity({entity_id})")));
    }

    let writer = AttributeWriter::new(xrc, entity_id.as_str());
    if let Err(e) = serialized_to_xrc(&params.payload, &writer) {
        warn!("Staging {} failed: {}", entity_id, e);
        xrc.unstage_entity(entity_id.as_str());
        return Err(e.into());
    }

    debug!("Staged {} {}", params.category(), entity_id);
    Ok(entity_id)
}

/// Owns the engine connection, the session state and the event dispatcher.
pub struct XrcManager<X: XrcInterface> {
    xrc: Arc<X>,
    config: XrcConfig,
    state: SessionState,
    dispatcher: EventDispatcher,
}

impl<X: XrcInterface> XrcManager<X> {
    pub fn new(xrc: Arc<X>, config: XrcConfig) -> Self {
        let queues = Arc::new(EventQueues::new());
        let dispatcher = EventDispatcher::new(queues, config.max_events_per_tick);
        Self {
            xrc,
            config,
            state: SessionState::NotStarted,
            dispatcher,
        }
    }

    pub fn xrc(&self) -> &Arc<X> {
        &self.xrc
    }

    pub fn config(&self) -> &XrcConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_started(&self) -> bool {
        self.state != SessionState::NotStarted
    }

    /// Id of the active session, if any.
    pub fn session_id(&self) -> Option<&str> {
        match &self.state {
            SessionState::Active { session_id, .. } => Some(session_id),
            _ => None,
        }
    }

    pub fn is_master(&self) -> bool {
        matches!(self.state, SessionState::Active { is_master: true, .. })
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// Register listeners here before calling [`update`](Self::update).
    pub fn dispatcher_mut(&mut self) -> &mut EventDispatcher {
        &mut self.dispatcher
    }

    // ── Preconditions ────────────────────────────────────────────

    fn require_started(&self, op: &str) -> XrcResult<()> {
        if self.is_started() {
            Ok(())
        } else {
            warn!("{}: XRC is not started", op);
            Err(XrcError::NotStarted)
        }
    }

    fn require_no_session(&self, op: &str) -> XrcResult<()> {
        self.require_started(op)?;
        match self.session_id() {
            Some(id) => {
                warn!("{}: session {} is already active", op, id);
                Err(XrcError::SessionActive(id.to_string()))
            }
            None => Ok(()),
        }
    }

    fn require_session(&self, op: &str) -> XrcResult<bool> {
        self.require_started(op)?;
        match &self.state {
            SessionState::Active { is_master, .. } => Ok(*is_master),
            _ => {
                warn!("{}: no active session", op);
                Err(XrcError::NoActiveSession)
            }
        }
    }

    fn native(&self, ok: bool, call: &str) -> XrcResult<()> {
        if ok {
            Ok(())
        } else {
            warn!("Engine call {} failed", call);
            Err(XrcError::Native(call.to_string()))
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Starts the engine with callbacks routed into this manager's queues.
    pub fn start_up(&mut self) -> XrcResult<()> {
        if self.is_started() {
            warn!("start_up: XRC is already started");
            return Err(XrcError::AlreadyStarted);
        }
        let bridge = Arc::new(EventBridge::new(Arc::clone(self.dispatcher.queues())));
        let settings = self.config.engine_settings();
        self.native(self.xrc.start_up(&settings, bridge), "start_up")?;
        self.state = SessionState::NoSession;
        info!("XRC started ({}:{})", settings.server, settings.port);
        Ok(())
    }

    /// Ends or leaves any active session, then stops the engine.
    pub fn shut_down(&mut self) -> XrcResult<()> {
        self.require_started("shut_down")?;
        let session_result = match self.state {
            SessionState::Active { is_master: true, .. } => self.end_session(),
            SessionState::Active { is_master: false, .. } => self.leave_session(),
            _ => Ok(()),
        };
        if let Err(e) = session_result {
            warn!("shut_down: closing the session failed: {}", e);
        }
        self.native(self.xrc.shut_down(), "shut_down")?;
        self.state = SessionState::NotStarted;
        info!("XRC shut down");
        Ok(())
    }

    // ── Sessions ─────────────────────────────────────────────────

    /// Starts a new session mastered by `user`. Returns the session id.
    pub fn start_session(&mut self, user: &UserType, name: &str) -> XrcResult<String> {
        self.require_no_session("start_session")?;
        let user_params = EntityParameters::new(user.clone(), None);
        let user_id = stage_entity(&*self.xrc, &user_params)?;
        let session_id = self
            .xrc
            .start_session(user_id.as_str(), name)
            .ok_or_else(|| {
                warn!("Engine could not start session {:?}", name);
                XrcError::Native("start_session".to_string())
            })?;
        info!("Started session {} ({:?}) as master", session_id, name);
        self.state = SessionState::Active {
            session_id: session_id.clone(),
            is_master: true,
        };
        Ok(session_id)
    }

    /// Joins an existing session as `user`.
    pub fn join_session(&mut self, session_id: &str, user: &UserType) -> XrcResult<()> {
        self.require_no_session("join_session")?;
        let user_params = EntityParameters::new(user.clone(), None);
        let user_id = stage_entity(&*self.xrc, &user_params)?;
        self.native(
            self.xrc.join_session(session_id, user_id.as_str()),
            "join_session",
        )?;
        info!("Joined session {}", session_id);
        self.state = SessionState::Active {
            session_id: session_id.to_string(),
            is_master: false,
        };
        Ok(())
    }

    /// Ends the active session. Only the master may.
    pub fn end_session(&mut self) -> XrcResult<()> {
        if !self.require_session("end_session")? {
            warn!("end_session: only the master may end the session");
            return Err(XrcError::NotMaster("end the session"));
        }
        self.native(self.xrc.end_session(), "end_session")?;
        info!("Ended session {}", self.session_id().unwrap_or_default());
        self.state = SessionState::NoSession;
        Ok(())
    }

    /// Leaves the active session. The master must end it instead.
    pub fn leave_session(&mut self) -> XrcResult<()> {
        if self.require_session("leave_session")? {
            warn!("leave_session: the master must end the session");
            return Err(XrcError::IsMaster("leave the session"));
        }
        self.native(self.xrc.leave_session(), "leave_session")?;
        info!("Left session {}", self.session_id().unwrap_or_default());
        self.state = SessionState::NoSession;
        Ok(())
    }

    /// Sessions the engine currently advertises.
    pub fn remote_sessions(&self) -> XrcResult<Vec<RemoteSession>> {
        self.require_started("remote_sessions")?;
        Ok(self.xrc.remote_sessions())
    }

    // ── Entities ─────────────────────────────────────────────────

    /// Publishes a new entity to the session.
    pub fn add_session_entity(&self, params: &EntityParameters) -> XrcResult<EntityKey> {
        self.require_session("add_session_entity")?;
        let entity_id = stage_entity(&*self.xrc, params)?;
        let descriptor = params
            .descriptor()
            .ok_or_else(|| XrcError::MissingEntityId(entity_id.to_string()))?;
        self.native(self.xrc.add_session_entity(&descriptor), "add_session_entity")?;
        debug!("Added {} {}", params.category(), entity_id);
        Ok(entity_id)
    }

    /// Republishes every attribute of an existing entity.
    pub fn update_session_entity(&self, params: &EntityParameters) -> XrcResult<EntityKey> {
        self.require_session("update_session_entity")?;
        let entity_id = stage_entity(&*self.xrc, params)?;
        self.native(
            self.xrc.update_session_entity(entity_id.as_str()),
            "update_session_entity",
        )?;
        debug!("Updated {} {}", params.category(), entity_id);
        Ok(entity_id)
    }

    /// Publishes only the transform of an existing entity.
    pub fn update_session_entity_transform(
        &self,
        entity_id: &EntityKey,
        category: Category,
        transform: &Transform,
    ) -> XrcResult<()> {
        self.require_session("update_session_entity_transform")?;
        if !category.has_transform() {
            warn!("{} entities carry no transform", category);
            return Err(XrcError::NoTransform(category));
        }

        let id = entity_id.as_str();
        self.native(self.xrc.stage_entity(id), "stage_entity")?;
        let path = transform_path(category);
        let writer = AttributeWriter::new(&*self.xrc, id);
        if let Err(e) = transform.to_xrc(&writer, &path) {
            warn!("Staging transform of {} failed: {}", id, e);
            self.xrc.unstage_entity(id);
            return Err(e.into());
        }
        self.native(
            self.xrc.edit_session_entity(id, path.as_str()),
            "edit_session_entity",
        )
    }

    /// Removes an entity from the session.
    pub fn remove_session_entity(&self, entity_id: &EntityKey) -> XrcResult<()> {
        self.require_session("remove_session_entity")?;
        self.native(
            self.xrc.remove_session_entity(entity_id.as_str()),
            "remove_session_entity",
        )?;
        self.xrc.unstage_entity(entity_id.as_str());
        debug!("Removed {}", entity_id);
        Ok(())
    }

    // ── Frame update ─────────────────────────────────────────────

    /// Runs one tick: dispatches queued events, then reconciles the session
    /// state with the engine. Returns the number of events dispatched.
    pub fn update(&mut self) -> usize {
        let dispatched = self.dispatcher.tick();
        self.reconcile_session();
        dispatched
    }

    fn reconcile_session(&mut self) {
        if self.state == SessionState::NotStarted {
            return;
        }
        if !self.xrc.is_started() {
            match self.session_id() {
                Some(id) => warn!("Engine stopped underneath session {}", id),
                None => warn!("Engine stopped"),
            }
            self.state = SessionState::NotStarted;
            return;
        }
        let SessionState::Active { session_id, .. } = &self.state else {
            return;
        };
        match self.xrc.active_session() {
            Some(active) if active == *session_id => {}
            other => {
                info!(
                    "Session {} is no longer active (engine reports {:?})",
                    session_id, other
                );
                self.state = SessionState::NoSession;
            }
        }
    }
}
