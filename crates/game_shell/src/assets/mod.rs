//! Asset loading seam
//!
//! Windows are instantiated from prefabs that live in named bundles. Loading is
//! owned by the host engine and may complete later; the shell only sees the
//! [`AssetLoader`] trait and `FnOnce` completions, so every load resolves at
//! most once by construction.

pub mod memory_loader;
mod res_manager;

use crate::ui::WindowComponent;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

pub use memory_loader::{LoadMode, MemoryAssetLoader};
pub use res_manager::{ResKind, ResManager};

/// Asset errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssetError {
    /// Nothing is registered at this path
    #[error("Asset not found: {bundle}/{path}")]
    NotFound {
        /// Bundle name
        bundle: String,
        /// Asset path inside the bundle
        path: String,
    },

    /// The bundle itself could not be loaded
    #[error("Bundle not available: {0}")]
    BundleUnavailable(String),

    /// The load started but failed (network, decoding, ...)
    #[error("Load failed for {path}: {reason}")]
    LoadFailed {
        /// Asset path inside the bundle
        path: String,
        /// Host supplied reason
        reason: String,
    },
}

/// Factory producing the components attached to a freshly instantiated window
pub type ComponentFactory = Rc<dyn Fn() -> Vec<Box<dyn WindowComponent>>>;

/// A loaded window template
///
/// Every instantiation gets its own set of components from the factory.
#[derive(Clone)]
pub struct Prefab {
    name: String,
    factory: Option<ComponentFactory>,
}

impl Prefab {
    /// Prefab without components
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            factory: None,
        }
    }

    /// Prefab whose instances carry the components built by `factory`
    pub fn with_components<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Vec<Box<dyn WindowComponent>> + 'static,
    {
        Self {
            name: name.into(),
            factory: Some(Rc::new(factory)),
        }
    }

    /// Name given to instantiated root nodes
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build a fresh component list for one instance
    pub fn instantiate_components(&self) -> Vec<Box<dyn WindowComponent>> {
        self.factory.as_ref().map(|factory| factory()).unwrap_or_default()
    }
}

impl fmt::Debug for Prefab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prefab")
            .field("name", &self.name)
            .field("has_components", &self.factory.is_some())
            .finish()
    }
}

/// Handle to a loaded non-prefab asset (sprite frame, texture, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetHandle {
    /// Bundle the asset came from
    pub bundle: String,
    /// Path inside the bundle
    pub path: String,
}

/// Completion of a prefab load
pub type PrefabCallback = Box<dyn FnOnce(Result<Prefab, AssetError>)>;

/// Completion of a plain asset load
pub type AssetCallback = Box<dyn FnOnce(Result<AssetHandle, AssetError>)>;

/// Completion of a directory load; handles are sorted by path
pub type DirCallback = Box<dyn FnOnce(Result<Vec<AssetHandle>, AssetError>)>;

/// Host asset pipeline
///
/// Implementations may call `done` synchronously or at any later point; callers
/// must not hold borrows across the call.
pub trait AssetLoader {
    /// Load a prefab from `bundle`
    fn load_prefab(&self, bundle: &str, path: &str, done: PrefabCallback);

    /// Load any other asset from `bundle`
    fn load_asset(&self, bundle: &str, path: &str, done: AssetCallback);

    /// Load every asset under `dir` in `bundle`
    fn load_dir(&self, bundle: &str, dir: &str, done: DirCallback);

    /// Release an asset previously loaded from `bundle`
    fn release(&self, path: &str, bundle: &str);
}

/// Loader shared by layers and localized renderers
pub type SharedAssets = Rc<dyn AssetLoader>;
