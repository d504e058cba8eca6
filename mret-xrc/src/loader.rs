//! Engine library discovery.
//!
//! The engine ships as a platform shared library named by the usual
//! convention (`libxrc_engine.so`, `xrc_engine.dll`, `libxrc_engine.dylib`)
//! and is looked for in an `XRCEngine` directory below the package root, then
//! in the root itself.

use crate::error::{XrcError, XrcResult};
use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Base name of the engine library, without platform prefix or suffix.
pub const ENGINE_LIBRARY: &str = "xrc_engine";

/// Locates the engine library below a package root.
#[derive(Debug, Clone)]
pub struct PackageLoader {
    root: PathBuf,
}

impl PackageLoader {
    /// Directory below the root the engine is normally installed into.
    pub const ENGINE_DIR: &'static str = "XRCEngine";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Platform file name of the engine library.
    #[must_use]
    pub fn library_file_name() -> String {
        format!("{DLL_PREFIX}{ENGINE_LIBRARY}{DLL_SUFFIX}")
    }

    /// Paths searched, in order.
    #[must_use]
    pub fn candidates(&self) -> Vec<PathBuf> {
        let file = Self::library_file_name();
        vec![
            self.root.join(Self::ENGINE_DIR).join(&file),
            self.root.join(&file),
        ]
    }

    /// Returns the first candidate that exists as a file.
    pub fn locate(&self) -> XrcResult<PathBuf> {
        let candidates = self.candidates();
        for candidate in &candidates {
            debug!("Looking for XRC engine at {}", candidate.display());
            if candidate.is_file() {
                info!("Found XRC engine at {}", candidate.display());
                return Ok(candidate.clone());
            }
        }
        warn!("XRC engine not found under {}", self.root.display());
        Err(XrcError::EngineNotFound {
            searched: candidates,
        })
    }
}
