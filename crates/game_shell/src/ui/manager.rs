//! UI Manager
//!
//! Single entry point for opening, replacing and removing windows. Requests are
//! routed to the layer named by the window's configuration.

use super::config::ConfigRegistry;
use super::layer::{Layer, LayerContext};
use super::notify::NotifyPrompts;
use super::open_handle::OpenHandle;
use super::{LayerKind, UiArgs, UiCallbacks, ViewParams, WindowConfig, WindowConfigTable};
use crate::assets::SharedAssets;
use crate::core::config::{LayerSpec, UiSettings};
use crate::foundation::collections::NodeId;
use crate::foundation::logging::TARGET_VIEW;
use crate::scene::SharedScene;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Text lookup used for localized toasts
pub type Translate = Rc<dyn Fn(&str) -> String>;

struct UiInner {
    ctx: Rc<LayerContext>,
    settings: UiSettings,
    specs: RefCell<Vec<LayerSpec>>,
    root: Cell<Option<NodeId>>,
    layers: RefCell<HashMap<String, Rc<Layer>>>,
    notify: RefCell<Option<Rc<NotifyPrompts>>>,
    translate: RefCell<Option<Translate>>,
}

/// Central window manager
///
/// Cheap to clone; clones share the same layers and configuration.
#[derive(Clone)]
pub struct UiManager {
    inner: Rc<UiInner>,
}

/// Non-owning [`UiManager`] handle for components living inside windows
#[derive(Clone, Default)]
pub struct WeakUiManager {
    inner: Weak<UiInner>,
}

impl WeakUiManager {
    /// The manager, unless it was dropped
    pub fn upgrade(&self) -> Option<UiManager> {
        self.inner.upgrade().map(|inner| UiManager { inner })
    }
}

impl UiManager {
    /// Create a manager; no layer exists until [`init`](Self::init)
    pub fn new(settings: UiSettings, scene: SharedScene, assets: SharedAssets) -> Self {
        let ctx = Rc::new(LayerContext {
            scene,
            assets,
            configs: ConfigRegistry::default(),
            default_bundle: settings.default_bundle.clone(),
            mask_prefab: settings.mask_prefab.clone(),
            open_failure: RefCell::new(None),
        });
        Self {
            inner: Rc::new(UiInner {
                ctx,
                specs: RefCell::new(settings.layers.clone()),
                settings,
                root: Cell::new(None),
                layers: RefCell::new(HashMap::new()),
                notify: RefCell::new(None),
                translate: RefCell::new(None),
            }),
        }
    }

    /// Handle that does not keep the manager alive
    pub fn downgrade(&self) -> WeakUiManager {
        WeakUiManager {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Add a custom layer type before [`init`](Self::init); duplicates are ignored
    pub fn register_layer_kind(&self, name: &str, kind: LayerKind) {
        if self.inner.root.get().is_some() {
            log::error!(target: TARGET_VIEW, "Layer {name} registered after init, ignored");
            return;
        }
        let mut specs = self.inner.specs.borrow_mut();
        if specs.iter().any(|spec| spec.name == name) {
            log::error!(target: TARGET_VIEW, "Layer type {name} already registered");
            return;
        }
        specs.push(LayerSpec::new(name, kind));
    }

    /// Build the layer stack under `root`, bottom layer first
    pub fn init(&self, root: NodeId) {
        if self.inner.root.get().is_some() {
            log::warn!(target: TARGET_VIEW, "UiManager already initialized");
            return;
        }
        self.inner.root.set(Some(root));

        let specs = self.inner.specs.borrow().clone();
        for spec in specs {
            let node = {
                let mut scene = self.inner.ctx.scene.borrow_mut();
                let node = scene.create_node(&spec.name);
                scene.add_child(root, node);
                node
            };

            if spec.kind == LayerKind::Notify {
                let settings = &self.inner.settings;
                *self.inner.notify.borrow_mut() = Some(NotifyPrompts::new(
                    node,
                    self.inner.ctx.clone(),
                    &settings.toast_prefab,
                    &settings.wait_prefab,
                    settings.toast_duration,
                ));
            }
            let layer = Layer::new(&spec.name, spec.kind, node, self.inner.ctx.clone());
            self.inner.layers.borrow_mut().insert(spec.name.clone(), layer);
        }
        log::info!(target: TARGET_VIEW, "UI initialized with {} layers", self.inner.layers.borrow().len());
    }

    /// Root node passed to [`init`](Self::init)
    pub fn root(&self) -> Option<NodeId> {
        self.inner.root.get()
    }

    /// Layer by name
    pub fn layer(&self, name: &str) -> Option<Rc<Layer>> {
        self.inner.layers.borrow().get(name).cloned()
    }

    /// Toast and waiting prompts, once a notify layer exists
    pub fn notify(&self) -> Option<Rc<NotifyPrompts>> {
        self.inner.notify.borrow().clone()
    }

    /// Replace the window configuration; generated `open_path` entries survive
    pub fn init_config(&self, table: &WindowConfigTable) {
        self.inner.ctx.configs.replace_all(table);
    }

    /// Overlay more window configurations
    pub fn add_config(&self, table: &WindowConfigTable) {
        self.inner.ctx.configs.merge(table);
    }

    /// Set or (with `None`) delete one window configuration
    pub fn set_config(&self, id: &str, config: Option<WindowConfig>) {
        match config {
            Some(config) => self.inner.ctx.configs.set(id, config),
            None => {
                self.inner.ctx.configs.remove(id);
            }
        }
    }

    /// Current configuration of a window
    pub fn config(&self, id: &str) -> Option<WindowConfig> {
        self.inner.ctx.configs.get(id)
    }

    /// Hook called with the window id whenever an open fails
    pub fn set_open_failure(&self, hook: impl Fn(&str) + 'static) {
        *self.inner.ctx.open_failure.borrow_mut() = Some(Rc::new(hook));
    }

    /// Text lookup for `toast(.., true)`
    pub fn set_translator(&self, translate: Translate) {
        *self.inner.translate.borrow_mut() = Some(translate);
    }

    fn resolve(&self, id: &str) -> Option<(WindowConfig, Rc<Layer>)> {
        let Some(config) = self.inner.ctx.configs.get(id) else {
            log::warn!(target: TARGET_VIEW, "No window config for {id}");
            return None;
        };
        let Some(layer) = self.layer(&config.layer) else {
            log::error!(target: TARGET_VIEW, "Layer {} of window {id} does not exist", config.layer);
            return None;
        };
        Some((config, layer))
    }

    /// Open a window
    pub fn open(&self, id: &str, args: UiArgs, callbacks: UiCallbacks) {
        if let Some((config, layer)) = self.resolve(id) {
            layer.add(ViewParams::new(id, config, args), callbacks);
        }
    }

    /// Open a window and observe the outcome through a one-shot handle
    pub fn open_async(&self, id: &str, args: UiArgs) -> OpenHandle {
        let (sender, handle) = OpenHandle::channel();
        self.open(
            id,
            args,
            UiCallbacks::new().on_added(move |node, _| {
                let _ = sender.send(node);
            }),
        );
        handle
    }

    /// Open a window from a prefab path under a generated id; returns the id
    ///
    /// The generated configuration is deleted once the window is destroyed.
    pub fn open_path(
        &self,
        layer: &str,
        path: &str,
        bundle: Option<&str>,
        args: UiArgs,
        callbacks: UiCallbacks,
    ) -> String {
        let mut config = WindowConfig::new(layer, path);
        config.bundle = bundle.map(str::to_string);
        let id = self.inner.ctx.configs.insert_auto(config);
        if self.layer(layer).is_none() {
            log::error!(target: TARGET_VIEW, "Layer {layer} of window {path} does not exist");
            self.inner.ctx.configs.remove(&id);
            return id;
        }
        self.open(&id, args, callbacks);
        id
    }

    /// Open `open_id`, removing `remove_id` only once the new window is added
    pub fn replace(&self, remove_id: &str, open_id: &str, args: UiArgs, callbacks: UiCallbacks) {
        let mut callbacks = callbacks;
        let user_added = callbacks.added.take();
        let gui = self.downgrade();
        let old_id = remove_id.to_string();
        callbacks.added = Some(Box::new(move |node: NodeId, args: &UiArgs| {
            if let Some(gui) = gui.upgrade() {
                gui.remove(&old_id, true);
            }
            if let Some(added) = user_added {
                added(node, args);
            }
        }));
        if let Some((config, layer)) = self.resolve(open_id) {
            layer.add_replacing(ViewParams::new(open_id, config, args), callbacks, Some(remove_id));
        }
    }

    /// [`replace`](Self::replace) observed through a one-shot handle
    pub fn replace_async(&self, remove_id: &str, open_id: &str, args: UiArgs) -> OpenHandle {
        let (sender, handle) = OpenHandle::channel();
        self.replace(
            remove_id,
            open_id,
            args,
            UiCallbacks::new().on_added(move |node, _| {
                let _ = sender.send(node);
            }),
        );
        handle
    }

    /// Whether the window is loading or on stage
    pub fn has(&self, id: &str) -> bool {
        self.resolve(id).is_some_and(|(_, layer)| layer.has(id))
    }

    /// Root node of an on-stage window
    pub fn get(&self, id: &str) -> Option<NodeId> {
        self.resolve(id).and_then(|(_, layer)| layer.get(id))
    }

    /// Remove a window; `destroy = false` keeps it detached for reuse
    pub fn remove(&self, id: &str, destroy: bool) {
        if let Some((_, layer)) = self.resolve(id) {
            layer.remove(id, destroy);
        }
    }

    /// Remove the window rooted at `node`
    pub fn remove_by_node(&self, node: NodeId, destroy: bool) {
        let found = self
            .inner
            .layers
            .borrow()
            .values()
            .find_map(|layer| layer.id_of(node).map(|id| (layer.clone(), id)));
        match found {
            Some((layer, id)) => layer.remove(&id, destroy),
            None => log::warn!(target: TARGET_VIEW, "Node is not the root of an open window"),
        }
    }

    /// Drop a detached cached window without running its hooks
    pub fn remove_cache(&self, id: &str) -> bool {
        self.resolve(id).is_some_and(|(_, layer)| layer.remove_cache(id))
    }

    /// Remove every window of every layer
    pub fn clear(&self, destroy: bool) {
        let layers: Vec<Rc<Layer>> = self.inner.layers.borrow().values().cloned().collect();
        for layer in layers {
            layer.clear(destroy);
        }
    }

    /// Outside tap on `layer`: closes its top-most `vacancy` window
    pub fn touch_outside(&self, layer: &str) -> bool {
        self.layer(layer).is_some_and(|layer| layer.touch_outside())
    }

    /// Show a toast, optionally treating `content` as a localization key
    pub fn toast(&self, content: &str, use_i18n: bool) {
        let Some(notify) = self.notify() else {
            log::warn!(target: TARGET_VIEW, "No notify layer, toast dropped: {content}");
            return;
        };
        let translate = self.inner.translate.borrow().clone();
        let text = match translate {
            Some(translate) if use_i18n => translate(content),
            _ => content.to_string(),
        };
        notify.toast(&text);
    }

    /// Show the waiting prompt
    pub fn wait_open(&self) {
        if let Some(notify) = self.notify() {
            notify.wait_open();
        }
    }

    /// Hide the waiting prompt
    pub fn wait_close(&self) {
        if let Some(notify) = self.notify() {
            notify.wait_close();
        }
    }

    /// Advance prompt timers to `now` (seconds)
    pub fn update(&self, now: f64) {
        if let Some(notify) = self.notify() {
            notify.update(now);
        }
    }
}
