//! Scene files and the built-in demo scene.
//!
//! A scene file is a JSON array of entries:
//!
//! ```json
//! [
//!   { "entity": { "category": "PartType", "id": "chassis", "name": "Chassis" } },
//!   {
//!     "parent": "chassis",
//!     "entity": { "category": "NoteType", "id": "n1", "name": "Note", "title": "Check" }
//!   }
//! ]
//! ```
//!
//! `parent` names the `id` of an earlier entry. Entries without a `uuid` get a
//! fresh one.

use anyhow::{Context, Result, bail};
use mret_schema::{
    AnnotationType, Category, Drawing3dType, Identifiable, IdentifiableType,
    InteractableSceneObjectType, ModelFormat, ModelType, NoteType, PartType,
    PhysicalSceneObjectType, PhysicsType, SceneObjectType, SerializedEntity, SourceAnnotationType,
    SourceType, TextAnnotationType,
};
use mret_types::{Color, EntityKey, Transform, Vector3};
use mret_xrc::EntityParameters;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;
use uuid::Uuid;

/// One entry of a scene file.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneEntry {
    #[serde(default)]
    pub parent: Option<String>,
    pub entity: SerializedEntity,
}

/// Reads and resolves a scene file.
pub fn load_scene(path: &Path) -> Result<Vec<EntityParameters>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scene {}", path.display()))?;
    parse_scene(&text).with_context(|| format!("Failed to load scene {}", path.display()))
}

/// Parses scene JSON and resolves parent references.
pub fn parse_scene(text: &str) -> Result<Vec<EntityParameters>> {
    let entries: Vec<SceneEntry> = serde_json::from_str(text)?;
    resolve(entries)
}

fn resolve(entries: Vec<SceneEntry>) -> Result<Vec<EntityParameters>> {
    let mut keys: HashMap<String, EntityKey> = HashMap::new();
    let mut scene = Vec::with_capacity(entries.len());

    for SceneEntry { parent, mut entity } in entries {
        let id = entity.identifiable().id.clone();
        if entity_is_user(&entity) {
            bail!("Entry {id:?} is a user; participants join sessions, they are not published");
        }

        let uuid = *entity.identifiable_mut().uuid.get_or_insert_with(Uuid::new_v4);
        let parent_id = match parent {
            Some(parent) => Some(
                keys.get(&parent)
                    .cloned()
                    .with_context(|| format!("Entry {id:?} names unknown parent {parent:?}"))?,
            ),
            None => None,
        };
        if keys.insert(id.clone(), EntityKey::from_uuid(uuid)).is_some() {
            bail!("Duplicate scene id {id:?}");
        }

        debug!("Scene entry {} ({})", id, entity.category());
        scene.push(EntityParameters::new(entity, parent_id));
    }
    Ok(scene)
}

fn entity_is_user(entity: &SerializedEntity) -> bool {
    entity.category() == Category::User
}

/// A small assembly: a chassis with a wheel and a note below it, a stroke
/// and two annotations.
pub fn demo_scene() -> Vec<EntityParameters> {
    let chassis = part(
        "chassis",
        "Chassis",
        Vector3::ZERO,
        Some(ModelType {
            file: "chassis.glb".into(),
            format: ModelFormat::Gltf,
        }),
    );
    let chassis_key = key_of(&chassis);
    let wheel = part("wheel", "Front wheel", Vector3::new(0.8, -0.3, 0.0), None);

    let mut note = NoteType::new(
        InteractableSceneObjectType::new(scene_object(
            "note",
            "Inspection",
            Vector3::new(0.0, 1.2, 0.0),
        )),
        "Inspection",
    );
    note.content = vec!["Torque wheel bolts".into(), "Check harness".into()];

    let stroke = Drawing3dType {
        base: scene_object("stroke", "Marker", Vector3::new(0.0, 0.5, 0.5)),
        render_type: Default::default(),
        units: Default::default(),
        width: 0.01,
        color: Color::rgba(1.0, 0.2, 0.2, 1.0),
        points: vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.1, 0.05, 0.0),
            Vector3::new(0.2, 0.0, 0.0),
        ],
    };

    let mut caption = AnnotationType::new(IdentifiableType::new("caption", "Caption"));
    caption.attach_to = Some("chassis".into());
    caption.duration = 6.0;
    let caption = TextAnnotationType {
        base: caption,
        texts: vec!["Step 1: remove cover".into(), "Step 2: inspect".into()],
        time_per_text: 3.0,
    };

    let mut narration = AnnotationType::new(IdentifiableType::new("narration", "Narration"));
    narration.start_delay = 1.0;
    narration.duration = 12.0;
    let narration = SourceAnnotationType {
        base: narration,
        source: "narration.ogg".into(),
        source_type: SourceType::Audio,
    };

    vec![
        EntityParameters::new(chassis, None),
        EntityParameters::new(wheel, Some(chassis_key.clone())),
        EntityParameters::new(note, Some(chassis_key)),
        EntityParameters::new(stroke, None),
        EntityParameters::new(caption, None),
        EntityParameters::new(narration, None),
    ]
}

fn scene_object(id: &str, name: &str, position: Vector3) -> SceneObjectType {
    SceneObjectType::new(IdentifiableType::new(id, name)).with_transform(Transform::at(position))
}

fn part(id: &str, name: &str, position: Vector3, model: Option<ModelType>) -> PartType {
    let mut physical = PhysicalSceneObjectType::new(InteractableSceneObjectType::new(
        scene_object(id, name, position),
    ));
    physical.enable_collisions = true;
    physical.physics = Some(PhysicsType {
        mass: 4.0,
        is_kinematic: true,
    });
    let mut part = PartType::new(physical);
    part.vendor = Some("ACME".into());
    part.model = model;
    part
}

fn key_of(entity: &impl Identifiable) -> EntityKey {
    entity
        .identifiable()
        .uuid
        .map(EntityKey::from_uuid)
        .unwrap_or_else(EntityKey::generate)
}
