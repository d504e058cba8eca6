mod common;

use common::{MemoryStore, make_drawing, make_note, make_part, make_scene_object, make_user};
use mret_schema::{
    AnnotationType, Category, Drawing2dType, IdentifiableType, InteractableSceneObjectType,
    ModelFormat, ModelType, NoteState, NoteType, PhysicsType, SceneObjectType, SerializedEntity,
    SourceAnnotationType, SourceType, TextAnnotationType,
};
use mret_types::{Color, Quaternion, Transform, Vector2, Vector3};
use mret_xrc::codec::{
    decode_points3, encode_points3, serialized_to_xrc, transform_path, xrc_to_serialized,
};
use mret_xrc::{
    AttributeReader, AttributeValue, AttributeWriter, CodecError, CodecResult, StagedSource,
    XrcCodec,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const ID: &str = "entity-1";

fn stage(entity: &SerializedEntity) -> MemoryStore {
    let store = MemoryStore::new();
    store.stage(ID);
    serialized_to_xrc(entity, &AttributeWriter::new(&store, ID)).unwrap();
    store
}

fn read_back(store: &MemoryStore, category: Category) -> CodecResult<SerializedEntity> {
    xrc_to_serialized(category, &AttributeReader::new(store, StagedSource::Entity(ID)))
}

fn roundtrip(entity: impl Into<SerializedEntity>) -> (SerializedEntity, SerializedEntity) {
    let entity = entity.into();
    let store = stage(&entity);
    let back = read_back(&store, entity.category()).unwrap();
    (entity, back)
}

// ── Round trips ──────────────────────────────────────────────────

#[test]
fn identifiable_roundtrip() {
    let (sent, back) =
        roundtrip(IdentifiableType::new("id-1", "Thing").with_description("a thing"));
    assert_eq!(sent, back);
}

#[test]
fn scene_object_roundtrip() {
    let mut object = make_scene_object("obj", "Crate");
    object.visible = false;
    object.transform.rotation = Quaternion::new(0.0, 0.707, 0.0, 0.707);
    let (sent, back) = roundtrip(object);
    assert_eq!(sent, back);
}

#[test]
fn part_roundtrip_with_model_and_physics() {
    let (sent, back) = roundtrip(make_part("wheel"));
    assert_eq!(sent, back);
}

#[test]
fn part_roundtrip_without_optionals() {
    let mut part = make_part("bare");
    part.vendor = None;
    part.model = None;
    part.base.physics = None;
    let (sent, back) = roundtrip(part);
    assert_eq!(sent, back);
}

#[test]
fn note_roundtrip() {
    let mut note = make_note("note");
    note.state = NoteState::Minimized;
    note.base.opacity = 128;
    let (sent, back) = roundtrip(note);
    assert_eq!(sent, back);
}

#[test]
fn note_with_empty_title_roundtrips() {
    let note = NoteType::new(
        InteractableSceneObjectType::new(make_scene_object("n", "Note")),
        "",
    );
    let (sent, back) = roundtrip(note);
    assert_eq!(sent, back);
}

#[test]
fn drawings_roundtrip() {
    let (sent, back) = roundtrip(make_drawing("stroke"));
    assert_eq!(sent, back);

    let flat = Drawing2dType {
        base: IdentifiableType::new("flat", "Sketch"),
        width: 2.0,
        color: Color::rgba(0.0, 0.0, 1.0, 0.5),
        points: vec![Vector2::new(1.0, 2.0), Vector2::new(3.0, 4.0)],
    };
    let (sent, back) = roundtrip(flat);
    assert_eq!(sent, back);
}

#[test]
fn annotations_roundtrip() {
    let mut base = AnnotationType::new(IdentifiableType::new("a1", "Hint"));
    base.attach_to = Some("wheel".into());
    base.start_delay = 1.5;
    base.duration = 10.0;

    let text = TextAnnotationType {
        base: base.clone(),
        texts: vec!["Loosen".into(), "Remove".into()],
        time_per_text: 2.5,
    };
    let (sent, back) = roundtrip(text);
    assert_eq!(sent, back);

    let source = SourceAnnotationType {
        base,
        source: "https://example.org/clip.mp4".into(),
        source_type: SourceType::Video,
    };
    let (sent, back) = roundtrip(source);
    assert_eq!(sent, back);
}

#[test]
fn user_roundtrip_with_and_without_pose() {
    let (sent, back) = roundtrip(make_user("u1", "ada"));
    assert_eq!(sent, back);

    let mut posed = make_user("u2", "grace");
    posed.pose = Some(Transform::at(Vector3::new(0.0, 1.7, 0.0)));
    let (sent, back) = roundtrip(posed);
    assert_eq!(sent, back);
}

#[test]
fn empty_optional_text_reads_back_as_none() {
    let mut object = IdentifiableType::new("x", "X");
    object.description = Some(String::new());
    let (_, back) = roundtrip(object);
    assert!(back.uuid().is_some());
    match back {
        SerializedEntity::Identifiable(v) => assert_eq!(v.description, None),
        other => panic!("unexpected {other:?}"),
    }
}

// ── Attribute layout ─────────────────────────────────────────────

#[test]
fn part_attributes_live_under_part_root() {
    let store = stage(&make_part("wheel").into());
    let keys = store.keys(ID);
    assert!(keys.iter().all(|k| k.starts_with("PART.")), "{keys:?}");
    for expected in [
        "PART.UUID",
        "PART.ID",
        "PART.NAME",
        "PART.VENDOR",
        "PART.MODEL",
        "PART.MODEL.FILE",
        "PART.MODEL.FORMAT",
        "PART.PHYSICS",
        "PART.PHYSICS.MASS",
        "PART.TRANSFORM.POSITION.X",
        "PART.TRANSFORM.ROTATION.W",
        "PART.TRANSFORM.SCALE.Z",
    ] {
        assert!(keys.iter().any(|k| k == expected), "missing {expected}");
    }
    assert!(!keys.iter().any(|k| k == "PART.VERSION"));
}

#[test]
fn presence_flags_written_for_absent_substructures() {
    let mut part = make_part("bare");
    part.model = None;
    let store = stage(&part.into());
    assert_eq!(store.value(ID, "PART.MODEL"), Some(AttributeValue::Bool(false)));
    assert!(store.value(ID, "PART.MODEL.FILE").is_none());
}

#[test]
fn opaque_opacity_is_not_written() {
    let store = stage(&make_note("n").into());
    assert!(store.value(ID, "NOTE.OPACITY").is_none());

    let mut note = make_note("n");
    note.base.opacity = 64;
    let store = stage(&note.into());
    assert_eq!(store.value(ID, "NOTE.OPACITY"), Some(AttributeValue::Int(64)));
}

#[test]
fn string_lists_use_count_and_index() {
    let store = stage(&make_note("n").into());
    assert_eq!(store.value(ID, "NOTE.CONTENT.COUNT"), Some(AttributeValue::Int(2)));
    assert_eq!(
        store.value(ID, "NOTE.CONTENT.1"),
        Some(AttributeValue::String("bolt B".into()))
    );
}

#[test]
fn enums_travel_as_text() {
    let store = stage(&make_part("p").into());
    assert_eq!(
        store.value(ID, "PART.MODEL.FORMAT"),
        Some(AttributeValue::String("Gltf".into()))
    );
}

#[test]
fn points_are_a_single_blob() {
    let drawing = make_drawing("s");
    let store = stage(&drawing.clone().into());
    assert_eq!(
        store.value(ID, "DRAWING3D.POINTS"),
        Some(AttributeValue::Blob(encode_points3(&drawing.points)))
    );
    assert_eq!(decode_points3(&encode_points3(&drawing.points)), Some(drawing.points));
}

#[test]
fn user_pose_uses_native_transform_kind() {
    let mut user = make_user("u", "ada");
    let pose = Transform::at(Vector3::new(0.0, 1.6, 0.0));
    user.pose = Some(pose);
    let store = stage(&user.into());
    assert_eq!(store.value(ID, "USER.POSE"), Some(AttributeValue::Transform(pose)));
}

#[test]
fn transform_path_follows_category_root() {
    assert_eq!(transform_path(Category::Part).as_str(), "PART.TRANSFORM");
    assert_eq!(transform_path(Category::SceneObject).as_str(), "OBJECT.TRANSFORM");
}

// ── Write failures ───────────────────────────────────────────────

#[test]
fn missing_uuid_fails() {
    let mut object = make_scene_object("obj", "Crate");
    object.base.uuid = None;
    let store = MemoryStore::new();
    store.stage(ID);
    let err = serialized_to_xrc(&object.into(), &AttributeWriter::new(&store, ID)).unwrap_err();
    assert_eq!(
        err,
        CodecError::MissingField {
            path: "OBJECT.UUID".into()
        }
    );
}

#[test]
fn empty_name_fails() {
    let object = SceneObjectType::new(IdentifiableType::new("obj", ""));
    let store = MemoryStore::new();
    store.stage(ID);
    let err = serialized_to_xrc(&object.into(), &AttributeWriter::new(&store, ID)).unwrap_err();
    assert_eq!(
        err,
        CodecError::MissingField {
            path: "OBJECT.NAME".into()
        }
    );
}

#[test]
fn rejected_write_fails() {
    let store = MemoryStore::rejecting();
    store.stage(ID);
    let err = serialized_to_xrc(&make_part("p").into(), &AttributeWriter::new(&store, ID))
        .unwrap_err();
    assert!(matches!(err, CodecError::Rejected { .. }));
}

// ── Read failures ────────────────────────────────────────────────

#[test]
fn missing_required_field_fails() {
    let store = stage(&make_part("p").into());
    store.remove(ID, "PART.ID");
    assert_eq!(
        read_back(&store, Category::Part).unwrap_err(),
        CodecError::MissingField {
            path: "PART.ID".into()
        }
    );
}

#[test]
fn invalid_uuid_fails() {
    let store = stage(&make_part("p").into());
    store.put(ID, "PART.UUID", AttributeValue::String("not-a-uuid".into()));
    assert!(matches!(
        read_back(&store, Category::Part).unwrap_err(),
        CodecError::InvalidUuid { .. }
    ));
}

#[test]
fn unknown_enum_text_fails() {
    let store = stage(&make_note("n").into());
    store.put(ID, "NOTE.STATE", AttributeValue::String("Sideways".into()));
    assert_eq!(
        read_back(&store, Category::Note).unwrap_err(),
        CodecError::InvalidEnum {
            path: "NOTE.STATE".into(),
            value: "Sideways".into()
        }
    );
}

#[test]
fn wrong_kind_fails() {
    let store = stage(&make_note("n").into());
    store.put(ID, "NOTE.TITLE", AttributeValue::Int(7));
    assert_eq!(
        read_back(&store, Category::Note).unwrap_err(),
        CodecError::TypeMismatch {
            path: "NOTE.TITLE".into(),
            expected: "string",
            found: "int"
        }
    );
}

#[test]
fn malformed_points_fail() {
    let store = stage(&make_drawing("s").into());
    store.put(ID, "DRAWING3D.POINTS", AttributeValue::Blob(vec![0; 5]));
    assert_eq!(
        read_back(&store, Category::Drawing3d).unwrap_err(),
        CodecError::InvalidBlob {
            path: "DRAWING3D.POINTS".into(),
            len: 5
        }
    );
}

#[test]
fn opacity_out_of_range_fails() {
    let store = stage(&make_note("n").into());
    store.put(ID, "NOTE.OPACITY", AttributeValue::Int(300));
    assert!(matches!(
        read_back(&store, Category::Note).unwrap_err(),
        CodecError::OutOfRange { value: 300, .. }
    ));
}

#[test]
fn absent_optionals_take_defaults() {
    let store = stage(&make_note("n").into());
    store.remove(ID, "NOTE.STATE");
    store.remove(ID, "NOTE.VISIBLE");
    store.remove(ID, "NOTE.CONTENT.COUNT");
    let SerializedEntity::Note(note) = read_back(&store, Category::Note).unwrap() else {
        panic!("expected a note");
    };
    assert_eq!(note.state, NoteState::Maximized);
    assert!(note.base.base.visible);
    assert!(note.content.is_empty());
}

// ── Current-event reads ──────────────────────────────────────────

#[test]
fn current_event_source_reads_callback_context() {
    let store = stage(&make_part("wheel").into());
    store.set_current(ID);
    let reader = AttributeReader::new(&store, StagedSource::from(""));
    let transform = Transform::from_xrc(&reader, &transform_path(Category::Part)).unwrap();
    assert_eq!(transform.position, Vector3::new(1.0, 2.0, 3.0));
}

// ── Properties ───────────────────────────────────────────────────

fn finite() -> impl Strategy<Value = f32> {
    -1000.0f32..1000.0
}

fn vector3() -> impl Strategy<Value = Vector3> {
    (finite(), finite(), finite()).prop_map(|(x, y, z)| Vector3::new(x, y, z))
}

fn transform() -> impl Strategy<Value = Transform> {
    (vector3(), vector3(), finite(), finite(), finite(), finite()).prop_map(
        |(position, scale, x, y, z, w)| Transform {
            position,
            rotation: Quaternion::new(x, y, z, w),
            scale,
        },
    )
}

fn text() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9 ]{0,20}"
}

proptest! {
    #[test]
    fn scene_object_roundtrips(
        id in text(),
        name in text(),
        t in transform(),
        visible in any::<bool>(),
    ) {
        let mut object = SceneObjectType::new(IdentifiableType::new(id, name)).with_transform(t);
        object.visible = visible;
        let (sent, back) = roundtrip(object);
        prop_assert_eq!(sent, back);
    }

    #[test]
    fn note_content_roundtrips(
        title in "[a-z ]{0,12}",
        content in prop::collection::vec("[a-z ]{0,12}", 0..6),
        opacity in any::<u8>(),
    ) {
        let mut note = make_note("n");
        note.title = title;
        note.content = content;
        note.base.opacity = opacity;
        let (sent, back) = roundtrip(note);
        prop_assert_eq!(sent, back);
    }

    #[test]
    fn drawing_points_roundtrip(points in prop::collection::vec(vector3(), 0..32)) {
        let mut drawing = make_drawing("s");
        drawing.points = points;
        let (sent, back) = roundtrip(drawing);
        prop_assert_eq!(sent, back);
    }

    #[test]
    fn part_roundtrips(
        vendor in prop::option::of(text()),
        version in prop::option::of(text()),
        model in prop::option::of((text(), prop::sample::select(ModelFormat::ALL.to_vec()))),
        physics in prop::option::of((0.0f32..500.0, any::<bool>())),
        gravity in any::<bool>(),
        collisions in any::<bool>(),
    ) {
        let mut part = make_part("p");
        part.vendor = vendor;
        part.version = version;
        part.model = model.map(|(file, format)| ModelType { file, format });
        part.base.physics = physics.map(|(mass, is_kinematic)| PhysicsType { mass, is_kinematic });
        part.base.enable_gravity = gravity;
        part.base.enable_collisions = collisions;
        let (sent, back) = roundtrip(part);
        prop_assert_eq!(sent, back);
    }

    #[test]
    fn user_roundtrips(alias in text(), pose in prop::option::of(transform())) {
        let mut user = make_user("u", "placeholder");
        user.alias = alias;
        user.pose = pose;
        let (sent, back) = roundtrip(user);
        prop_assert_eq!(sent, back);
    }
}
