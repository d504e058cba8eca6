mod common;

use common::{MemoryStore, make_part, make_scene_object, make_user};
use mret_schema::{Category, IdentifiableType, SceneObjectType};
use mret_types::{EntityKey, Transform, Vector3};
use mret_xrc::{
    AttributeStore, AttributeValue, EngineSettings, EntityDescriptor, EntityParameters,
    RemoteSession, SessionState, StagedSource, XrcCallbacks, XrcConfig, XrcError, XrcInterface,
    XrcManager,
};
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};

/// Engine double that records every native call.
#[derive(Default)]
struct RecordingXrc {
    store: MemoryStore,
    calls: Mutex<Vec<String>>,
    started: Mutex<bool>,
    session: Mutex<Option<String>>,
    refuse_stage: bool,
}

impl RecordingXrc {
    fn refusing_stage() -> Self {
        Self {
            refuse_stage: true,
            ..Self::default()
        }
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn called(&self, name: &str) -> bool {
        self.calls().iter().any(|c| c.starts_with(name))
    }

    fn drop_session(&self) {
        *self.session.lock().unwrap() = None;
    }
}

impl AttributeStore for RecordingXrc {
    fn get_attribute(&self, source: StagedSource<'_>, path: &str) -> Option<AttributeValue> {
        self.store.get_attribute(source, path)
    }

    fn set_attribute(&self, entity_id: &str, path: &str, value: AttributeValue) -> bool {
        self.store.set_attribute(entity_id, path, value)
    }
}

impl XrcInterface for RecordingXrc {
    fn start_up(&self, _settings: &EngineSettings, _callbacks: Arc<dyn XrcCallbacks>) -> bool {
        self.record("start_up");
        *self.started.lock().unwrap() = true;
        true
    }

    fn shut_down(&self) -> bool {
        self.record("shut_down");
        *self.started.lock().unwrap() = false;
        true
    }

    fn is_started(&self) -> bool {
        *self.started.lock().unwrap()
    }

    fn start_session(&self, user_id: &str, _name: &str) -> Option<String> {
        self.record(format!("start_session {user_id}"));
        *self.session.lock().unwrap() = Some("s-1".into());
        Some("s-1".into())
    }

    fn join_session(&self, session_id: &str, _user_id: &str) -> bool {
        self.record("join_session");
        *self.session.lock().unwrap() = Some(session_id.into());
        true
    }

    fn end_session(&self) -> bool {
        self.record("end_session");
        self.drop_session();
        true
    }

    fn leave_session(&self) -> bool {
        self.record("leave_session");
        self.drop_session();
        true
    }

    fn active_session(&self) -> Option<String> {
        self.session.lock().unwrap().clone()
    }

    fn stage_entity(&self, entity_id: &str) -> bool {
        self.record("stage_entity");
        if self.refuse_stage {
            return false;
        }
        self.store.stage(entity_id);
        true
    }

    fn unstage_entity(&self, _entity_id: &str) -> bool {
        self.record("unstage_entity");
        true
    }

    fn add_session_entity(&self, entity: &EntityDescriptor) -> bool {
        self.record(format!("add_session_entity {}", entity.category));
        true
    }

    fn update_session_entity(&self, _entity_id: &str) -> bool {
        self.record("update_session_entity");
        true
    }

    fn edit_session_entity(&self, _entity_id: &str, attribute_path: &str) -> bool {
        self.record(format!("edit_session_entity {attribute_path}"));
        true
    }

    fn remove_session_entity(&self, _entity_id: &str) -> bool {
        self.record("remove_session_entity");
        true
    }

    fn remote_sessions(&self) -> Vec<RemoteSession> {
        self.record("remote_sessions");
        Vec::new()
    }
}

fn manager_with(xrc: RecordingXrc) -> (XrcManager<RecordingXrc>, Arc<RecordingXrc>) {
    let xrc = Arc::new(xrc);
    (XrcManager::new(Arc::clone(&xrc), XrcConfig::default()), xrc)
}

fn started() -> (XrcManager<RecordingXrc>, Arc<RecordingXrc>) {
    let (mut manager, xrc) = manager_with(RecordingXrc::default());
    manager.start_up().unwrap();
    (manager, xrc)
}

fn in_session_as_master() -> (XrcManager<RecordingXrc>, Arc<RecordingXrc>) {
    let (mut manager, xrc) = started();
    manager
        .start_session(&make_user("u1", "ada"), "Review")
        .unwrap();
    (manager, xrc)
}

fn in_session_as_participant() -> (XrcManager<RecordingXrc>, Arc<RecordingXrc>) {
    let (mut manager, xrc) = started();
    manager
        .join_session("s-1", &make_user("u2", "grace"))
        .unwrap();
    (manager, xrc)
}

// ── Lifecycle ────────────────────────────────────────────────────

#[test]
fn starts_in_not_started() {
    let (manager, _) = manager_with(RecordingXrc::default());
    assert_eq!(manager.state(), &SessionState::NotStarted);
    assert!(!manager.is_started());
}

#[test]
fn start_up_twice_fails() {
    let (mut manager, _) = started();
    assert!(matches!(manager.start_up(), Err(XrcError::AlreadyStarted)));
    assert_eq!(manager.state(), &SessionState::NoSession);
}

#[test]
fn operations_before_start_up_fail() {
    let (mut manager, xrc) = manager_with(RecordingXrc::default());
    assert!(matches!(
        manager.start_session(&make_user("u", "ada"), "S"),
        Err(XrcError::NotStarted)
    ));
    assert!(matches!(manager.remote_sessions(), Err(XrcError::NotStarted)));
    assert!(matches!(manager.shut_down(), Err(XrcError::NotStarted)));
    assert!(xrc.calls().is_empty());
}

#[test]
fn shut_down_ends_session_as_master() {
    let (mut manager, xrc) = in_session_as_master();
    manager.shut_down().unwrap();
    assert_eq!(manager.state(), &SessionState::NotStarted);
    let calls = xrc.calls();
    assert_eq!(&calls[calls.len() - 2..], ["end_session", "shut_down"]);
}

#[test]
fn shut_down_leaves_session_as_participant() {
    let (mut manager, xrc) = in_session_as_participant();
    manager.shut_down().unwrap();
    assert!(xrc.called("leave_session"));
    assert!(!xrc.called("end_session"));
}

// ── Sessions ─────────────────────────────────────────────────────

#[test]
fn start_session_stages_user_then_starts() {
    let (manager, xrc) = in_session_as_master();
    assert!(manager.is_master());
    assert_eq!(manager.session_id(), Some("s-1"));

    let calls = xrc.calls();
    assert_eq!(calls[0], "start_up");
    assert_eq!(calls[1], "stage_entity");
    assert!(calls[2].starts_with("start_session "));
    // The staged user carries the alias under the user root.
    let staged_id = calls[2].trim_start_matches("start_session ").to_string();
    assert_eq!(
        xrc.store.value(&staged_id, "USER.ALIAS"),
        Some(AttributeValue::String("ada".into()))
    );
}

#[test]
fn second_session_is_refused() {
    let (mut manager, _) = in_session_as_master();
    assert!(matches!(
        manager.start_session(&make_user("u1", "ada"), "Again"),
        Err(XrcError::SessionActive(id)) if id == "s-1"
    ));
    assert!(matches!(
        manager.join_session("s-2", &make_user("u1", "ada")),
        Err(XrcError::SessionActive(_))
    ));
}

#[test]
fn participant_cannot_end_session() {
    let (mut manager, xrc) = in_session_as_participant();
    assert!(matches!(manager.end_session(), Err(XrcError::NotMaster(_))));
    assert!(!xrc.called("end_session"));
    assert_eq!(manager.session_id(), Some("s-1"));
}

#[test]
fn master_cannot_leave_session() {
    let (mut manager, xrc) = in_session_as_master();
    assert!(matches!(manager.leave_session(), Err(XrcError::IsMaster(_))));
    assert!(!xrc.called("leave_session"));
}

#[test]
fn end_and_leave_need_a_session() {
    let (mut manager, _) = started();
    assert!(matches!(manager.end_session(), Err(XrcError::NoActiveSession)));
    assert!(matches!(manager.leave_session(), Err(XrcError::NoActiveSession)));
}

#[test]
fn update_notices_session_ended_elsewhere() {
    let (mut manager, xrc) = in_session_as_participant();
    xrc.drop_session();
    manager.update();
    assert_eq!(manager.state(), &SessionState::NoSession);
}

#[test]
fn update_notices_engine_stopped_without_session() {
    let (mut manager, xrc) = started();
    *xrc.started.lock().unwrap() = false;
    manager.update();
    assert_eq!(manager.state(), &SessionState::NotStarted);
    assert!(!manager.is_started());
}

#[test]
fn update_notices_engine_stopped_during_session() {
    let (mut manager, xrc) = in_session_as_master();
    *xrc.started.lock().unwrap() = false;
    manager.update();
    assert_eq!(manager.state(), &SessionState::NotStarted);
}

// ── Two-phase entity protocol ────────────────────────────────────

#[test]
fn add_entity_stages_then_publishes() {
    let (manager, xrc) = in_session_as_master();
    let params = EntityParameters::new(make_part("wheel"), None);
    let key = manager.add_session_entity(&params).unwrap();

    assert_eq!(Some(key.clone()), params.entity_id());
    let calls = xrc.calls();
    assert_eq!(
        &calls[calls.len() - 2..],
        ["stage_entity", "add_session_entity PartType"]
    );
    assert_eq!(
        xrc.store.value(key.as_str(), "PART.NAME"),
        Some(AttributeValue::String("Wheel".into()))
    );
}

#[test]
fn entity_operations_need_a_session() {
    let (manager, xrc) = started();
    let params = EntityParameters::new(make_part("wheel"), None);
    assert!(matches!(
        manager.add_session_entity(&params),
        Err(XrcError::NoActiveSession)
    ));
    assert!(matches!(
        manager.remove_session_entity(&EntityKey::generate()),
        Err(XrcError::NoActiveSession)
    ));
    assert!(!xrc.called("stage_entity"));
}

#[test]
fn publish_skipped_without_uuid() {
    let (manager, xrc) = in_session_as_master();
    let mut object = make_scene_object("o", "Crate");
    object.base.uuid = None;
    let result = manager.add_session_entity(&EntityParameters::new(object, None));
    assert!(matches!(result, Err(XrcError::MissingEntityId(_))));
    assert!(!xrc.called("add_session_entity"));
}

#[test]
fn publish_skipped_when_stage_refused() {
    let (mut manager, xrc) = manager_with(RecordingXrc::refusing_stage());
    manager.start_up().unwrap();
    assert!(matches!(
        manager.start_session(&make_user("u1", "ada"), "S"),
        Err(XrcError::Native(_))
    ));
    assert!(!xrc.called("start_session"));
    assert_eq!(manager.state(), &SessionState::NoSession);
}

#[test]
fn publish_skipped_when_encoding_fails() {
    let (manager, xrc) = in_session_as_master();
    let nameless = SceneObjectType::new(IdentifiableType::new("o", ""));
    let result = manager.update_session_entity(&EntityParameters::new(nameless, None));
    assert!(matches!(result, Err(XrcError::Codec(_))));
    assert!(xrc.called("unstage_entity"));
    assert!(!xrc.called("update_session_entity"));
}

#[test]
fn transform_edit_publishes_transform_subtree() {
    let (manager, xrc) = in_session_as_master();
    let key = EntityKey::generate();
    let transform = Transform::at(Vector3::new(4.0, 5.0, 6.0));
    manager
        .update_session_entity_transform(&key, Category::Part, &transform)
        .unwrap();

    let calls = xrc.calls();
    assert_eq!(calls.last().unwrap(), "edit_session_entity PART.TRANSFORM");
    assert_eq!(
        xrc.store.value(key.as_str(), "PART.TRANSFORM.POSITION.Y"),
        Some(AttributeValue::Float(5.0))
    );
    assert!(xrc.store.value(key.as_str(), "PART.UUID").is_none());
}

#[test]
fn transform_edit_needs_transform_category() {
    let (manager, xrc) = in_session_as_master();
    let result = manager.update_session_entity_transform(
        &EntityKey::generate(),
        Category::Drawing2d,
        &Transform::IDENTITY,
    );
    assert!(matches!(result, Err(XrcError::NoTransform(Category::Drawing2d))));
    assert!(!xrc.called("edit_session_entity"));
}

#[test]
fn remove_entity_publishes() {
    let (manager, xrc) = in_session_as_master();
    manager.remove_session_entity(&EntityKey::generate()).unwrap();
    assert!(xrc.called("remove_session_entity"));
}
