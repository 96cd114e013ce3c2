//! In-memory asset loader
//!
//! Registered prefabs and assets resolve either immediately or when the owner
//! calls [`MemoryAssetLoader::complete_next`]. Deferred mode is what lets tests
//! interleave loads with other window operations.

use super::{AssetCallback, AssetError, AssetHandle, AssetLoader, DirCallback, Prefab, PrefabCallback};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

/// When load completions are delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Completion runs inside the `load_*` call
    #[default]
    Immediate,
    /// Completion waits for `complete_next` / `complete_all` / `fail_next`
    Deferred,
}

type AssetKey = (String, String);

enum PendingLoad {
    Prefab { key: AssetKey, done: PrefabCallback },
    Asset { key: AssetKey, done: AssetCallback },
    Dir { key: AssetKey, done: DirCallback },
}

#[derive(Default)]
struct LoaderState {
    mode: LoadMode,
    prefabs: HashMap<AssetKey, Prefab>,
    assets: HashSet<AssetKey>,
    pending: VecDeque<PendingLoad>,
    load_counts: HashMap<AssetKey, usize>,
    released: Vec<AssetKey>,
}

/// Asset loader backed by registered in-memory entries
#[derive(Default)]
pub struct MemoryAssetLoader {
    state: RefCell<LoaderState>,
}

impl MemoryAssetLoader {
    /// Create a loader in the given mode
    pub fn new(mode: LoadMode) -> Self {
        let loader = Self::default();
        loader.state.borrow_mut().mode = mode;
        loader
    }

    /// Create a shared loader in the given mode
    pub fn shared(mode: LoadMode) -> Rc<Self> {
        Rc::new(Self::new(mode))
    }

    /// Switch completion mode; already pending loads stay pending
    pub fn set_mode(&self, mode: LoadMode) {
        self.state.borrow_mut().mode = mode;
    }

    /// Register a prefab under `bundle`/`path`
    pub fn register_prefab(&self, bundle: &str, path: &str, prefab: Prefab) {
        self.state
            .borrow_mut()
            .prefabs
            .insert((bundle.to_string(), path.to_string()), prefab);
    }

    /// Register a plain asset under `bundle`/`path`
    pub fn register_asset(&self, bundle: &str, path: &str) {
        self.state
            .borrow_mut()
            .assets
            .insert((bundle.to_string(), path.to_string()));
    }

    /// Number of loads waiting for completion
    pub fn pending_count(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// How many times `bundle`/`path` was requested
    pub fn load_count(&self, bundle: &str, path: &str) -> usize {
        self.state
            .borrow()
            .load_counts
            .get(&(bundle.to_string(), path.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// How many times `bundle`/`path` was released
    pub fn release_count(&self, bundle: &str, path: &str) -> usize {
        self.state
            .borrow()
            .released
            .iter()
            .filter(|(b, p)| b == bundle && p == path)
            .count()
    }

    /// Resolve the oldest pending load; returns false when nothing was pending
    pub fn complete_next(&self) -> bool {
        let next = self.state.borrow_mut().pending.pop_front();
        match next {
            Some(load) => {
                self.resolve(load);
                true
            }
            None => false,
        }
    }

    /// Resolve pending loads until none are left, including loads queued by completions
    pub fn complete_all(&self) -> usize {
        let mut completed = 0;
        while self.complete_next() {
            completed += 1;
        }
        completed
    }

    /// Fail the oldest pending load with `reason`
    pub fn fail_next(&self, reason: &str) -> bool {
        let next = self.state.borrow_mut().pending.pop_front();
        match next {
            Some(PendingLoad::Prefab { key, done }) => {
                done(Err(AssetError::LoadFailed {
                    path: key.1,
                    reason: reason.to_string(),
                }));
                true
            }
            Some(PendingLoad::Asset { key, done }) => {
                done(Err(AssetError::LoadFailed {
                    path: key.1,
                    reason: reason.to_string(),
                }));
                true
            }
            Some(PendingLoad::Dir { key, done }) => {
                done(Err(AssetError::LoadFailed {
                    path: key.1,
                    reason: reason.to_string(),
                }));
                true
            }
            None => false,
        }
    }

    fn resolve(&self, load: PendingLoad) {
        match load {
            PendingLoad::Prefab { key, done } => {
                let found = self.state.borrow().prefabs.get(&key).cloned();
                done(found.ok_or(AssetError::NotFound {
                    bundle: key.0,
                    path: key.1,
                }));
            }
            PendingLoad::Dir { key, done } => {
                let prefix = format!("{}/", key.1.trim_end_matches('/'));
                let mut found: Vec<AssetHandle> = self
                    .state
                    .borrow()
                    .assets
                    .iter()
                    .filter(|(bundle, path)| *bundle == key.0 && path.starts_with(&prefix))
                    .map(|(bundle, path)| AssetHandle {
                        bundle: bundle.clone(),
                        path: path.clone(),
                    })
                    .collect();
                found.sort_by(|a, b| a.path.cmp(&b.path));
                if found.is_empty() {
                    done(Err(AssetError::NotFound {
                        bundle: key.0,
                        path: key.1,
                    }));
                } else {
                    done(Ok(found));
                }
            }
            PendingLoad::Asset { key, done } => {
                let found = self.state.borrow().assets.contains(&key);
                if found {
                    done(Ok(AssetHandle {
                        bundle: key.0,
                        path: key.1,
                    }));
                } else {
                    done(Err(AssetError::NotFound {
                        bundle: key.0,
                        path: key.1,
                    }));
                }
            }
        }
    }

    fn submit(&self, key: &AssetKey, load: PendingLoad) {
        let mode = {
            let mut state = self.state.borrow_mut();
            *state.load_counts.entry(key.clone()).or_insert(0) += 1;
            state.mode
        };
        match mode {
            LoadMode::Immediate => self.resolve(load),
            LoadMode::Deferred => self.state.borrow_mut().pending.push_back(load),
        }
    }
}

impl AssetLoader for MemoryAssetLoader {
    fn load_prefab(&self, bundle: &str, path: &str, done: PrefabCallback) {
        let key = (bundle.to_string(), path.to_string());
        self.submit(&key.clone(), PendingLoad::Prefab { key, done });
    }

    fn load_asset(&self, bundle: &str, path: &str, done: AssetCallback) {
        let key = (bundle.to_string(), path.to_string());
        self.submit(&key.clone(), PendingLoad::Asset { key, done });
    }

    fn load_dir(&self, bundle: &str, dir: &str, done: DirCallback) {
        let key = (bundle.to_string(), dir.to_string());
        self.submit(&key.clone(), PendingLoad::Dir { key, done });
    }

    fn release(&self, path: &str, bundle: &str) {
        log::debug!("Releasing asset {bundle}/{path}");
        self.state
            .borrow_mut()
            .released
            .push((bundle.to_string(), path.to_string()));
    }
}
