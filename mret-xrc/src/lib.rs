//! XRC entity synchronization for MRET.
//!
//! Shares scene entities between participants of a collaborative session
//! through the XRC engine, an opaque native library with a flat attribute API.
//!
//! # Architecture
//!
//! - **Interface**: the native boundary as traits ([`XrcInterface`],
//!   [`AttributeStore`], [`XrcCallbacks`])
//! - **Codec**: typed entities to and from dot-path attribute bags
//! - **Parameters**: the envelope an entity is published in
//! - **Manager**: session lifecycle and the stage-then-publish protocol
//! - **Events**: callback payload queues and the capped per-tick dispatcher
//! - **Scene**: a local mirror fed by dispatched events
//! - **Loopback**: an in-process engine for tests and simulation
//!
//! ## Data flow
//!
//! 1. **Stage**: the manager writes an entity's attributes into the engine's
//!    staging area
//! 2. **Publish**: a session command (add, update, edit, remove) shares them
//! 3. **Callback**: peers' engines invoke their callbacks, which decode and
//!    queue the event
//! 4. **Dispatch**: each frame `update()` hands a few queued events to
//!    listeners such as [`SceneMirror`]
//!
//! # Example
//!
//! ```
//! use mret_xrc::{LoopbackHub, XrcConfig, XrcManager};
//! use std::sync::Arc;
//!
//! let hub = Arc::new(LoopbackHub::new());
//! let mut manager = XrcManager::new(Arc::new(hub.connect()), XrcConfig::default());
//! manager.start_up().unwrap();
//! assert!(manager.is_started());
//! ```

mod bridge;
pub mod codec;
mod config;
mod error;
pub mod events;
pub mod interface;
mod loader;
pub mod loopback;
mod manager;
mod parameters;
mod path;
mod scene;

pub use bridge::EventBridge;
pub use codec::{AttributeReader, AttributeWriter, XrcCodec};
pub use config::XrcConfig;
pub use error::{CodecError, CodecResult, XrcError, XrcResult};
pub use events::{
    DEFAULT_MAX_EVENTS_PER_TICK, EntityRemoval, EventDispatcher, EventKind, EventQueues,
    RemoteEntity, RemoteParticipant, TransformEdit, XrcEvent,
};
pub use interface::{
    AttributeStore, AttributeValue, EngineSettings, EntityDescriptor, RemoteSession,
    StagedSource, XrcCallbacks, XrcInterface,
};
pub use loader::{ENGINE_LIBRARY, PackageLoader};
pub use loopback::{LoopbackHub, LoopbackXrc};
pub use manager::{SessionState, XrcManager, stage_entity};
pub use parameters::EntityParameters;
pub use path::AttributePath;
pub use scene::SceneMirror;
