//! Two-participant simulation of an MRET collaboration session.
//!
//! An author starts a session on the loopback engine and publishes a scene
//! one entity per frame, then nudges scene objects with transform edits. An
//! observer joins the session and ticks on its own task, mirroring every
//! event it hears. When the author is done the observer's mirror is compared
//! with what was published.

mod scene;

pub use scene::{SceneEntry, demo_scene, load_scene, parse_scene};

use anyhow::{Context, Result};
use mret_schema::{IdentifiableType, UserType};
use mret_types::{Color, EntityKey};
use mret_xrc::{
    EntityParameters, LoopbackHub, LoopbackXrc, SceneMirror, XrcConfig, XrcManager, XrcResult,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time;
use tracing::{debug, info, warn};

/// Distance a scene object is moved along x by one edit.
const NUDGE: f32 = 0.1;

/// Simulation settings.
#[derive(Debug, Clone)]
pub struct SimOptions {
    pub config: XrcConfig,
    /// JSON scene file; the demo scene when absent.
    pub scene: Option<PathBuf>,
    /// Author frames. Entities still unpublished afterwards go out in one burst.
    pub frames: usize,
    pub frame_interval: Duration,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            config: XrcConfig::default(),
            scene: None,
            frames: 12,
            frame_interval: Duration::from_millis(50),
        }
    }
}

/// Outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimReport {
    pub session_id: String,
    pub frames: usize,
    pub published: usize,
    pub edits: usize,
    pub observed_entities: usize,
    pub observed_participants: usize,
    pub events_applied: usize,
    /// Published entities the observer holds differently or not at all.
    pub mismatched: Vec<EntityKey>,
}

impl SimReport {
    /// Whether the observer ended up with exactly the published scene.
    pub fn converged(&self) -> bool {
        self.mismatched.is_empty() && self.observed_entities == self.published
    }
}

/// A manager with a mirror attached to its dispatcher.
struct Participant {
    manager: XrcManager<LoopbackXrc>,
    mirror: Arc<Mutex<SceneMirror>>,
}

impl Participant {
    fn connect(hub: &Arc<LoopbackHub>, config: &XrcConfig) -> XrcResult<Self> {
        let mut manager = XrcManager::new(Arc::new(hub.connect()), config.clone());
        let mirror = SceneMirror::attach(manager.dispatcher_mut());
        manager.start_up()?;
        Ok(Self { manager, mirror })
    }

    fn mirror(&self) -> MutexGuard<'_, SceneMirror> {
        self.mirror.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn participant_user(id: &str, alias: &str, color: Color) -> UserType {
    let mut user = UserType::new(IdentifiableType::new(id, alias), alias);
    user.color = color;
    user
}

/// Runs the simulation to completion.
pub async fn run(options: SimOptions) -> Result<SimReport> {
    options.config.validate()?;
    let scene = match &options.scene {
        Some(path) => load_scene(path)?,
        None => demo_scene(),
    };
    info!("Simulating {} scene entities over {} frames", scene.len(), options.frames);

    let hub = Arc::new(LoopbackHub::new());
    let mut author = Participant::connect(&hub, &options.config).context("author start-up")?;
    let mut observer =
        Participant::connect(&hub, &options.config).context("observer start-up")?;

    let session_id = author.manager.start_session(
        &participant_user("author", "Ada", Color::rgba(0.9, 0.4, 0.1, 1.0)),
        "Simulated review",
    )?;
    observer.manager.join_session(
        &session_id,
        &participant_user("observer", "Grace", Color::rgba(0.1, 0.5, 0.9, 1.0)),
    )?;
    info!("Session {} running", session_id);

    let period = options.frame_interval.max(Duration::from_millis(1));
    let (done_tx, done_rx) = watch::channel(false);
    let observer_task = tokio::spawn(observe(observer, period / 2, done_rx));

    let mut published: BTreeMap<EntityKey, EntityParameters> = BTreeMap::new();
    let mut pending = scene.into_iter();
    let mut edits = 0;
    let mut interval = time::interval(period);

    for frame in 0..options.frames {
        interval.tick().await;
        match pending.next() {
            Some(params) => {
                let key = author.manager.add_session_entity(&params)?;
                debug!("Frame {}: published {} ({})", frame, key, params.category());
                published.insert(key, params);
            }
            None => {
                if let Some(key) = nudge(&author, &mut published, frame)? {
                    debug!("Frame {}: moved {}", frame, key);
                    edits += 1;
                }
            }
        }
        author.manager.update();
    }

    let remaining: Vec<EntityParameters> = pending.collect();
    if !remaining.is_empty() {
        info!("Publishing {} remaining entities in one burst", remaining.len());
    }
    for params in remaining {
        let key = author.manager.add_session_entity(&params)?;
        published.insert(key, params);
    }

    done_tx.send(true).context("observer task ended early")?;
    let mut observer = observer_task.await.context("observer task failed")?;

    let report = {
        let mirror = observer.mirror();
        let mismatched: Vec<EntityKey> = published
            .iter()
            .filter(|(key, params)| mirror.entity(key) != Some(*params))
            .map(|(key, _)| key.clone())
            .collect();
        SimReport {
            session_id: session_id.clone(),
            frames: options.frames,
            published: published.len(),
            edits,
            observed_entities: mirror.entity_count(),
            observed_participants: mirror.participant_count(),
            events_applied: mirror.applied(),
            mismatched,
        }
    };
    for key in &report.mismatched {
        warn!("Observer diverged on {}", key);
    }

    observer.manager.leave_session()?;
    author.manager.update();
    debug!("Author sees {} participants", author.mirror().participant_count());
    author.manager.shut_down()?;
    observer.manager.shut_down()?;
    info!(
        "Session {} closed: {} published, {} edits, {} events applied",
        session_id, report.published, report.edits, report.events_applied
    );
    Ok(report)
}

/// Moves one published scene object, cycling through them by frame.
/// Returns `None` when nothing published carries a transform.
fn nudge(
    author: &Participant,
    published: &mut BTreeMap<EntityKey, EntityParameters>,
    frame: usize,
) -> Result<Option<EntityKey>> {
    let movable: Vec<EntityKey> = published
        .iter()
        .filter(|(_, params)| params.payload.scene_object().is_some())
        .map(|(key, _)| key.clone())
        .collect();
    if movable.is_empty() {
        return Ok(None);
    }
    let key = movable[frame % movable.len()].clone();
    let Some(params) = published.get_mut(&key) else {
        return Ok(None);
    };
    let category = params.category();
    let Some(object) = params.payload.scene_object_mut() else {
        return Ok(None);
    };

    object.transform.position.x += NUDGE;
    author
        .manager
        .update_session_entity_transform(&key, category, &object.transform)?;
    Ok(Some(key))
}

/// Ticks the observer until the author is done and its queues are empty.
async fn observe(
    mut observer: Participant,
    period: Duration,
    done: watch::Receiver<bool>,
) -> Participant {
    let mut interval = time::interval(period.max(Duration::from_millis(1)));
    let mut ticks = 0usize;
    loop {
        interval.tick().await;
        observer.manager.update();
        ticks += 1;
        if *done.borrow() && observer.manager.dispatcher().queues().is_empty() {
            break;
        }
    }
    debug!("Observer drained after {} ticks", ticks);
    observer
}
