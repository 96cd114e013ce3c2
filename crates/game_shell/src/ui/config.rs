//! Window configuration table

use crate::config::Config;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

/// Static description of one window
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Name of the layer the window opens in
    pub layer: String,
    /// Prefab path inside the bundle
    pub path: String,
    /// Owning bundle; the UI default bundle when absent
    pub bundle: Option<String>,
    /// Overrides the `destroy` argument of `remove` when set
    pub destroy: Option<bool>,
    /// Close when the area outside the window is tapped (popups)
    pub vacancy: bool,
    /// Show a modal mask under the window (popups)
    pub mask: bool,
    /// Fit the window to the device safe area
    pub safe_area: bool,
    /// Sibling index inside the layer node
    pub sibling_index: Option<usize>,
    /// Generated by `open_path`; deleted once the window is destroyed
    #[serde(skip)]
    pub auto: bool,
}

impl WindowConfig {
    /// Window in `layer` loaded from `path`
    pub fn new(layer: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            layer: layer.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    /// Load from `bundle` instead of the default bundle
    #[must_use]
    pub fn with_bundle(mut self, bundle: impl Into<String>) -> Self {
        self.bundle = Some(bundle.into());
        self
    }

    /// Force destroy (or keep) on remove
    #[must_use]
    pub const fn with_destroy(mut self, destroy: bool) -> Self {
        self.destroy = Some(destroy);
        self
    }

    /// Show a modal mask
    #[must_use]
    pub const fn with_mask(mut self) -> Self {
        self.mask = true;
        self
    }

    /// Close on outside tap
    #[must_use]
    pub const fn with_vacancy(mut self) -> Self {
        self.vacancy = true;
        self
    }

    /// Fixed sibling index
    #[must_use]
    pub const fn with_sibling_index(mut self, index: usize) -> Self {
        self.sibling_index = Some(index);
        self
    }
}

/// Window id to configuration map, loadable from TOML, RON or JSON
///
/// ```toml
/// [shop]
/// layer = "LayerUI"
/// path = "gui/shop"
///
/// [reward]
/// layer = "LayerPopUp"
/// path = "gui/reward"
/// mask = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowConfigTable {
    windows: BTreeMap<String, WindowConfig>,
}

impl WindowConfigTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder style insert
    #[must_use]
    pub fn with(mut self, id: impl Into<String>, config: WindowConfig) -> Self {
        self.insert(id, config);
        self
    }

    /// Insert or replace a window
    pub fn insert(&mut self, id: impl Into<String>, config: WindowConfig) {
        self.windows.insert(id.into(), config);
    }

    /// Window configuration by id
    pub fn get(&self, id: &str) -> Option<&WindowConfig> {
        self.windows.get(id)
    }

    /// Number of windows
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// True when the table is empty
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Iterate in id order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &WindowConfig)> {
        self.windows.iter()
    }

    /// Overlay `other` on top of this table
    pub fn extend(&mut self, other: &Self) {
        for (id, config) in other.iter() {
            self.windows.insert(id.clone(), config.clone());
        }
    }
}

impl Config for WindowConfigTable {}

#[derive(Default)]
struct Registry {
    configs: HashMap<String, WindowConfig>,
    next_auto: u64,
}

/// Live configuration shared by the manager and its layers
#[derive(Clone, Default)]
pub(crate) struct ConfigRegistry {
    inner: Rc<RefCell<Registry>>,
}

impl ConfigRegistry {
    pub(crate) fn get(&self, id: &str) -> Option<WindowConfig> {
        self.inner.borrow().configs.get(id).cloned()
    }

    pub(crate) fn set(&self, id: &str, config: WindowConfig) {
        self.inner.borrow_mut().configs.insert(id.to_string(), config);
    }

    pub(crate) fn remove(&self, id: &str) -> Option<WindowConfig> {
        self.inner.borrow_mut().configs.remove(id)
    }

    pub(crate) fn replace_all(&self, table: &WindowConfigTable) {
        let mut registry = self.inner.borrow_mut();
        registry.configs.retain(|_, config| config.auto);
        for (id, config) in table.iter() {
            registry.configs.insert(id.clone(), config.clone());
        }
    }

    pub(crate) fn merge(&self, table: &WindowConfigTable) {
        let mut registry = self.inner.borrow_mut();
        for (id, config) in table.iter() {
            registry.configs.insert(id.clone(), config.clone());
        }
    }

    /// Register a generated config and return its id
    pub(crate) fn insert_auto(&self, mut config: WindowConfig) -> String {
        let mut registry = self.inner.borrow_mut();
        registry.next_auto += 1;
        let id = format!("auto_{}_{}", registry.next_auto, config.path);
        config.auto = true;
        registry.configs.insert(id.clone(), config);
        id
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.borrow().configs.len()
    }
}
