#![allow(dead_code)]

use mret_schema::{
    Drawing3dType, IdentifiableType, InteractableSceneObjectType, ModelFormat, ModelType,
    NoteType, PartType, PhysicalSceneObjectType, PhysicsType, SceneObjectType, UserType,
};
use mret_types::{Color, Transform, Vector3};
use mret_xrc::{AttributeStore, AttributeValue, StagedSource};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// Staging area backed by plain maps. `CurrentEvent` reads are served from
/// the entity named by `current`.
#[derive(Default)]
pub struct MemoryStore {
    pub bags: Mutex<HashMap<String, BTreeMap<String, AttributeValue>>>,
    pub current: Mutex<Option<String>>,
    pub reject: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub fn stage(&self, entity_id: &str) {
        self.bags
            .lock()
            .unwrap()
            .insert(entity_id.to_string(), BTreeMap::new());
    }

    pub fn set_current(&self, entity_id: &str) {
        *self.current.lock().unwrap() = Some(entity_id.to_string());
    }

    pub fn keys(&self, entity_id: &str) -> Vec<String> {
        self.bags
            .lock()
            .unwrap()
            .get(entity_id)
            .map(|bag| bag.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn value(&self, entity_id: &str, path: &str) -> Option<AttributeValue> {
        self.get_attribute(StagedSource::Entity(entity_id), path)
    }

    pub fn put(&self, entity_id: &str, path: &str, value: AttributeValue) {
        self.bags
            .lock()
            .unwrap()
            .entry(entity_id.to_string())
            .or_default()
            .insert(path.to_string(), value);
    }

    pub fn remove(&self, entity_id: &str, path: &str) {
        if let Some(bag) = self.bags.lock().unwrap().get_mut(entity_id) {
            bag.remove(path);
        }
    }
}

impl AttributeStore for MemoryStore {
    fn get_attribute(&self, source: StagedSource<'_>, path: &str) -> Option<AttributeValue> {
        let entity_id = match source {
            StagedSource::Entity(id) => id.to_string(),
            StagedSource::CurrentEvent => self.current.lock().unwrap().clone()?,
        };
        self.bags
            .lock()
            .unwrap()
            .get(&entity_id)
            .and_then(|bag| bag.get(path).cloned())
    }

    fn set_attribute(&self, entity_id: &str, path: &str, value: AttributeValue) -> bool {
        if self.reject {
            return false;
        }
        match self.bags.lock().unwrap().get_mut(entity_id) {
            Some(bag) => {
                bag.insert(path.to_string(), value);
                true
            }
            None => false,
        }
    }
}

pub fn make_scene_object(id: &str, name: &str) -> SceneObjectType {
    SceneObjectType::new(IdentifiableType::new(id, name))
        .with_transform(Transform::at(Vector3::new(1.0, 2.0, 3.0)))
}

pub fn make_part(id: &str) -> PartType {
    let mut physical = PhysicalSceneObjectType::new(InteractableSceneObjectType::new(
        make_scene_object(id, "Wheel"),
    ));
    physical.enable_gravity = true;
    physical.physics = Some(PhysicsType {
        mass: 12.5,
        is_kinematic: true,
    });
    let mut part = PartType::new(physical);
    part.vendor = Some("ACME".into());
    part.model = Some(ModelType {
        file: "wheel.glb".into(),
        format: ModelFormat::Gltf,
    });
    part
}

pub fn make_note(id: &str) -> NoteType {
    let mut note = NoteType::new(
        InteractableSceneObjectType::new(make_scene_object(id, "Note")),
        "Checklist",
    );
    note.content = vec!["bolt A".into(), "bolt B".into()];
    note
}

pub fn make_drawing(id: &str) -> Drawing3dType {
    Drawing3dType {
        base: make_scene_object(id, "Stroke"),
        render_type: Default::default(),
        units: Default::default(),
        width: 0.01,
        color: Color::rgba(1.0, 0.0, 0.0, 1.0),
        points: vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.5, 1.0, -0.5)],
    }
}

pub fn make_user(id: &str, alias: &str) -> UserType {
    let mut user = UserType::new(IdentifiableType::new(id, alias), alias);
    user.color = Color::rgba(0.2, 0.4, 0.6, 1.0);
    user
}
