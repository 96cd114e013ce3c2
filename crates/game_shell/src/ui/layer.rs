//! Layer: on/off-stage lifecycle of the windows assigned to it

use super::config::ConfigRegistry;
use super::delegate::{RemoveContinuation, WindowComponent, WindowDelegate};
use super::{BeforeRemoveHook, LayerKind, UiCallbacks, ViewParams};
use crate::assets::{AssetError, Prefab, SharedAssets};
use crate::foundation::collections::NodeId;
use crate::foundation::logging::TARGET_VIEW;
use crate::scene::SharedScene;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::{Rc, Weak};

/// Called with the window id whenever an open fails
pub(crate) type OpenFailureHook = Rc<dyn Fn(&str)>;

/// Host services and settings shared by every layer of one manager
pub(crate) struct LayerContext {
    pub(crate) scene: SharedScene,
    pub(crate) assets: SharedAssets,
    pub(crate) configs: ConfigRegistry,
    pub(crate) default_bundle: String,
    pub(crate) mask_prefab: String,
    pub(crate) open_failure: RefCell<Option<OpenFailureHook>>,
}

impl LayerContext {
    pub(crate) fn bundle_of(&self, params: &ViewParams) -> String {
        params
            .config
            .bundle
            .clone()
            .unwrap_or_else(|| self.default_bundle.clone())
    }
}

enum Slot {
    Loading {
        ticket: u64,
        params: ViewParams,
        callbacks: UiCallbacks,
    },
    Open(WindowDelegate),
}

struct PendingOpen {
    params: ViewParams,
    callbacks: UiCallbacks,
}

#[derive(Debug, Clone, Copy, Default)]
enum MaskState {
    #[default]
    Absent,
    Loading,
    Ready(NodeId),
}

#[derive(Default)]
struct LayerState {
    /// Windows loading or on stage
    active: HashMap<String, Slot>,
    /// Detached windows kept for reuse
    cache: HashMap<String, WindowDelegate>,
    nodes: HashMap<NodeId, String>,
    /// On-stage ids, oldest first
    order: Vec<String>,
    /// Dialogs waiting for the current one to close
    queue: VecDeque<PendingOpen>,
    mask: MaskState,
    next_serial: u64,
}

impl LayerState {
    fn next_serial(&mut self) -> u64 {
        self.next_serial += 1;
        self.next_serial
    }

    fn open_delegate_mut(&mut self, id: &str, serial: u64) -> Option<&mut WindowDelegate> {
        match self.active.get_mut(id) {
            Some(Slot::Open(delegate)) if delegate.serial == serial => Some(delegate),
            _ => None,
        }
    }

    fn delegate_mut(&mut self, id: &str, serial: u64) -> Option<&mut WindowDelegate> {
        if let Some(Slot::Open(delegate)) = self.active.get_mut(id) {
            if delegate.serial == serial {
                return Some(delegate);
            }
        }
        self.cache.get_mut(id).filter(|d| d.serial == serial)
    }

    fn take_open(&mut self, id: &str) -> Option<WindowDelegate> {
        if !matches!(self.active.get(id), Some(Slot::Open(_))) {
            return None;
        }
        let Some(Slot::Open(delegate)) = self.active.remove(id) else {
            return None;
        };
        self.order.retain(|open| open != id);
        if let Some(node) = delegate.params.node {
            self.nodes.remove(&node);
        }
        Some(delegate)
    }
}

enum RemoveStep {
    CancelLoad,
    PurgeCache,
    Finish {
        serial: u64,
        destroy: bool,
    },
    Begin {
        params: ViewParams,
        serial: u64,
        destroy: bool,
        components: Vec<Box<dyn WindowComponent>>,
        before_remove: Option<BeforeRemoveHook>,
    },
}

struct LoadRequest {
    id: String,
    ticket: u64,
    bundle: String,
    path: String,
}

/// A named stacking context for windows of one [`LayerKind`]
pub struct Layer {
    name: String,
    kind: LayerKind,
    node: NodeId,
    ctx: Rc<LayerContext>,
    state: RefCell<LayerState>,
    this: Weak<Self>,
}

impl Layer {
    pub(crate) fn new(name: &str, kind: LayerKind, node: NodeId, ctx: Rc<LayerContext>) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            name: name.to_string(),
            kind,
            node,
            ctx,
            state: RefCell::new(LayerState::default()),
            this: this.clone(),
        })
    }

    /// Layer name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Layer behavior
    pub const fn kind(&self) -> LayerKind {
        self.kind
    }

    /// Layer root node
    pub const fn node(&self) -> NodeId {
        self.node
    }

    /// Whether `id` is loading or on stage
    pub fn has(&self, id: &str) -> bool {
        self.state.borrow().active.contains_key(id)
    }

    /// Whether `id` is still loading
    pub fn is_loading(&self, id: &str) -> bool {
        matches!(self.state.borrow().active.get(id), Some(Slot::Loading { .. }))
    }

    /// Root node of an on-stage window
    pub fn get(&self, id: &str) -> Option<NodeId> {
        match self.state.borrow().active.get(id) {
            Some(Slot::Open(delegate)) => delegate.params.node,
            _ => None,
        }
    }

    /// Whether a detached instance of `id` is kept for reuse
    pub fn is_cached(&self, id: &str) -> bool {
        self.state.borrow().cache.contains_key(id)
    }

    /// Ids of on-stage windows, oldest first
    pub fn open_ids(&self) -> Vec<String> {
        self.state.borrow().order.clone()
    }

    /// Number of dialogs waiting for their turn
    pub fn queued_count(&self) -> usize {
        self.state.borrow().queue.len()
    }

    /// Modal mask node while it is shown
    pub fn mask_node(&self) -> Option<NodeId> {
        match self.state.borrow().mask {
            MaskState::Ready(node) => {
                let shown = self.ctx.scene.borrow().parent(node) == Some(self.node);
                shown.then_some(node)
            }
            _ => None,
        }
    }

    /// Id of the window rooted at `node`, on stage or cached
    pub fn id_of(&self, node: NodeId) -> Option<String> {
        let state = self.state.borrow();
        state.nodes.get(&node).cloned().or_else(|| {
            state
                .cache
                .iter()
                .find(|(_, cached)| cached.params.node == Some(node))
                .map(|(id, _)| id.clone())
        })
    }

    pub(crate) fn add(&self, params: ViewParams, callbacks: UiCallbacks) {
        self.add_replacing(params, callbacks, None);
    }

    /// Open a window that will take the place of `replacing` once added
    ///
    /// On a dialog layer the window being replaced does not hold back the
    /// new one.
    pub(crate) fn add_replacing(&self, params: ViewParams, callbacks: UiCallbacks, replacing: Option<&str>) {
        let id = params.id.clone();
        let (cached, serial) = {
            let mut state = self.state.borrow_mut();
            if state.active.contains_key(&id) {
                log::warn!(
                    target: TARGET_VIEW,
                    "Window {id} is already open or loading in {}, request ignored",
                    self.name
                );
                return;
            }
            let busy = state.active.keys().any(|open| Some(open.as_str()) != replacing);
            if self.kind == LayerKind::Dialog && busy {
                log::debug!(target: TARGET_VIEW, "Dialog {id} queued in {}", self.name);
                state.queue.push_back(PendingOpen { params, callbacks });
                return;
            }
            (state.cache.remove(&id), state.next_serial())
        };

        match cached {
            Some(mut delegate) => {
                log::debug!(target: TARGET_VIEW, "Window {id} reused from cache");
                delegate.serial = serial;
                delegate.params.config = params.config;
                delegate.params.args = params.args;
                delegate.callbacks = callbacks;
                self.attach(delegate);
            }
            None => self.load(params, callbacks),
        }
    }

    fn load(&self, params: ViewParams, callbacks: UiCallbacks) {
        let request = {
            let mut state = self.state.borrow_mut();
            let request = LoadRequest {
                id: params.id.clone(),
                ticket: state.next_serial(),
                bundle: self.ctx.bundle_of(&params),
                path: params.config.path.clone(),
            };
            state.active.insert(
                params.id.clone(),
                Slot::Loading {
                    ticket: request.ticket,
                    params,
                    callbacks,
                },
            );
            request
        };

        log::debug!(target: TARGET_VIEW, "Loading window {} from {}/{}", request.id, request.bundle, request.path);
        let bundle = request.bundle.clone();
        let path = request.path.clone();
        let layer = self.this.clone();
        self.ctx.assets.load_prefab(
            &bundle,
            &path,
            Box::new(move |result| {
                if let Some(layer) = layer.upgrade() {
                    layer.on_loaded(&request, result);
                }
            }),
        );
    }

    fn on_loaded(&self, request: &LoadRequest, result: Result<Prefab, AssetError>) {
        let slot = {
            let mut state = self.state.borrow_mut();
            let current = matches!(
                state.active.get(&request.id),
                Some(Slot::Loading { ticket, .. }) if *ticket == request.ticket
            );
            if current {
                state.active.remove(&request.id)
            } else {
                None
            }
        };

        let Some(Slot::Loading { mut params, callbacks, .. }) = slot else {
            if result.is_ok() {
                log::debug!(
                    target: TARGET_VIEW,
                    "Window {} was removed while loading, releasing {}",
                    request.id,
                    request.path
                );
                self.ctx.assets.release(&request.path, &request.bundle);
            }
            return;
        };

        match result {
            Ok(prefab) => {
                let node = self.ctx.scene.borrow_mut().instantiate(&prefab);
                params.node = Some(node);
                let components = prefab.instantiate_components();
                let serial = self.state.borrow_mut().next_serial();
                self.attach(WindowDelegate {
                    params,
                    callbacks,
                    components,
                    serial,
                });
            }
            Err(error) => {
                log::error!(target: TARGET_VIEW, "Failed to open window {}: {error}", request.id);
                self.fail_open(&params, callbacks);
            }
        }
    }

    fn attach(&self, mut delegate: WindowDelegate) {
        let Some(node) = delegate.params.node else {
            log::error!(target: TARGET_VIEW, "Window {} has no root node", delegate.params.id);
            return;
        };
        delegate.params.valid = true;
        {
            let mut scene = self.ctx.scene.borrow_mut();
            scene.add_child(self.node, node);
            if let Some(index) = delegate.params.config.sibling_index {
                scene.set_sibling_index(node, index);
            }
        }

        let id = delegate.params.id.clone();
        let serial = delegate.serial;
        let params = delegate.params.clone();
        let mut components = std::mem::take(&mut delegate.components);
        {
            let mut state = self.state.borrow_mut();
            state.nodes.insert(node, id.clone());
            state.order.push(id.clone());
            state.active.insert(id.clone(), Slot::Open(delegate));
        }

        let accepted = WindowDelegate::notify_added(&params, &mut components);
        self.restore_components(&id, serial, components);

        if !accepted {
            self.reject(&id, serial);
            return;
        }

        log::info!(target: TARGET_VIEW, "Window {id} opened in {}", self.name);
        self.refresh_mask();
        let added = self
            .state
            .borrow_mut()
            .open_delegate_mut(&id, serial)
            .and_then(|delegate| delegate.callbacks.added.take());
        if let Some(added) = added {
            added(node, &params.args);
        }
    }

    /// A component refused the window: tear it down without remove hooks
    fn reject(&self, id: &str, serial: u64) {
        let delegate = {
            let mut state = self.state.borrow_mut();
            if state.open_delegate_mut(id, serial).is_none() {
                return;
            }
            state.take_open(id)
        };
        let Some(delegate) = delegate else {
            return;
        };

        self.destroy_window(&delegate.params);
        self.fail_open(&delegate.params, delegate.callbacks);
    }

    fn fail_open(&self, params: &ViewParams, callbacks: UiCallbacks) {
        let UiCallbacks { load_failure, .. } = callbacks;
        if params.config.auto {
            self.ctx.configs.remove(&params.id);
        }
        if let Some(load_failure) = load_failure {
            load_failure();
        }
        let hook = self.ctx.open_failure.borrow().clone();
        if let Some(hook) = hook {
            hook(&params.id);
        }
        self.after_close();
    }

    fn restore_components(&self, id: &str, serial: u64, components: Vec<Box<dyn WindowComponent>>) {
        if let Some(delegate) = self.state.borrow_mut().delegate_mut(id, serial) {
            delegate.components = components;
        }
    }

    pub(crate) fn remove(&self, id: &str, destroy: bool) {
        let step = {
            let mut guard = self.state.borrow_mut();
            let state = &mut *guard;
            match state.active.get_mut(id) {
                None => {
                    let queued = state.queue.len();
                    state.queue.retain(|pending| pending.params.id != id);
                    if state.queue.len() != queued {
                        log::debug!(target: TARGET_VIEW, "Queued dialog {id} dropped");
                        return;
                    }
                    let purge = state
                        .cache
                        .get(id)
                        .is_some_and(|cached| cached.params.config.destroy.unwrap_or(destroy));
                    if !purge {
                        log::debug!(target: TARGET_VIEW, "Window {id} is not open in {}", self.name);
                        return;
                    }
                    RemoveStep::PurgeCache
                }
                Some(Slot::Loading { .. }) => RemoveStep::CancelLoad,
                Some(Slot::Open(delegate)) => {
                    let destroy = delegate.params.config.destroy.unwrap_or(destroy);
                    if delegate.params.valid {
                        delegate.params.valid = false;
                        RemoveStep::Begin {
                            params: delegate.params.clone(),
                            serial: delegate.serial,
                            destroy,
                            components: std::mem::take(&mut delegate.components),
                            before_remove: delegate.callbacks.before_remove.take(),
                        }
                    } else {
                        RemoveStep::Finish {
                            serial: delegate.serial,
                            destroy,
                        }
                    }
                }
            }
        };

        match step {
            RemoveStep::CancelLoad => {
                let cancelled = self.state.borrow_mut().active.remove(id);
                log::info!(target: TARGET_VIEW, "Window {id} removed while loading, load cancelled");
                if let Some(Slot::Loading { params, .. }) = cancelled {
                    if params.config.auto {
                        self.ctx.configs.remove(id);
                    }
                }
                self.after_close();
            }
            RemoveStep::PurgeCache => {
                log::info!(target: TARGET_VIEW, "Cached window {id} destroyed");
                self.remove_cache(id);
            }
            RemoveStep::Finish { serial, destroy } => self.finish_remove(id, serial, destroy),
            RemoveStep::Begin {
                params,
                serial,
                destroy,
                mut components,
                before_remove,
            } => {
                WindowDelegate::notify_before_remove(&params, &mut components);
                self.restore_components(id, serial, components);

                let continuation = RemoveContinuation {
                    layer: self.this.clone(),
                    id: id.to_string(),
                    serial,
                    destroy,
                };
                match (before_remove, params.node) {
                    (Some(hook), Some(node)) => hook(node, continuation),
                    _ => continuation.proceed(),
                }
            }
        }
    }

    pub(crate) fn finish_remove(&self, id: &str, serial: u64, destroy: bool) {
        let delegate = {
            let mut state = self.state.borrow_mut();
            if state.open_delegate_mut(id, serial).is_none() {
                log::debug!(target: TARGET_VIEW, "Window {id} already torn down");
                return;
            }
            state.take_open(id)
        };
        let Some(mut delegate) = delegate else {
            return;
        };

        let params = delegate.params.clone();
        let mut components = std::mem::take(&mut delegate.components);
        let removed = delegate.callbacks.removed.take();

        if destroy {
            self.destroy_window(&params);
        } else if let Some(node) = params.node {
            self.ctx.scene.borrow_mut().remove_from_parent(node);
            delegate.callbacks = UiCallbacks::default();
            self.state.borrow_mut().cache.insert(id.to_string(), delegate);
        }
        log::info!(target: TARGET_VIEW, "Window {id} removed from {} (destroy: {destroy})", self.name);

        WindowDelegate::notify_removed(&params, &mut components);
        if !destroy {
            self.restore_components(id, serial, components);
        }

        if let Some(removed) = removed {
            removed(if destroy { None } else { params.node }, &params.args);
        }
        self.after_close();
    }

    fn destroy_window(&self, params: &ViewParams) {
        if let Some(node) = params.node {
            self.ctx.scene.borrow_mut().destroy(node);
        }
        self.ctx
            .assets
            .release(&params.config.path, &self.ctx.bundle_of(params));
        if params.config.auto {
            self.ctx.configs.remove(&params.id);
        }
    }

    /// Drop a cached instance without running any hook
    pub(crate) fn remove_cache(&self, id: &str) -> bool {
        let cached = self.state.borrow_mut().cache.remove(id);
        match cached {
            Some(delegate) => {
                self.destroy_window(&delegate.params);
                true
            }
            None => false,
        }
    }

    /// Remove every window; with `destroy` the reuse cache is purged too
    pub(crate) fn clear(&self, destroy: bool) {
        let ids: Vec<String> = {
            let mut state = self.state.borrow_mut();
            state.queue.clear();
            state.active.keys().cloned().collect()
        };
        for id in &ids {
            self.remove(id, destroy);
        }

        if destroy {
            let cached: Vec<String> = self.state.borrow().cache.keys().cloned().collect();
            for id in &cached {
                self.remove_cache(id);
            }
        }
    }

    /// Close the top-most window configured with `vacancy`
    pub(crate) fn touch_outside(&self) -> bool {
        let target = {
            let state = self.state.borrow();
            state.order.iter().rev().find_map(|id| match state.active.get(id) {
                Some(Slot::Open(delegate))
                    if delegate.params.valid && delegate.params.config.vacancy =>
                {
                    Some(id.clone())
                }
                _ => None,
            })
        };
        match target {
            Some(id) => {
                self.remove(&id, true);
                true
            }
            None => false,
        }
    }

    fn after_close(&self) {
        match self.kind {
            LayerKind::PopUp => self.refresh_mask(),
            LayerKind::Dialog => {
                let next = {
                    let mut state = self.state.borrow_mut();
                    if state.active.is_empty() {
                        state.queue.pop_front()
                    } else {
                        None
                    }
                };
                if let Some(PendingOpen { params, callbacks }) = next {
                    log::debug!(target: TARGET_VIEW, "Opening queued dialog {}", params.id);
                    self.add(params, callbacks);
                }
            }
            _ => {}
        }
    }

    fn refresh_mask(&self) {
        if self.kind != LayerKind::PopUp {
            return;
        }
        let (target, mask) = {
            let state = self.state.borrow();
            let target = state.order.iter().rev().find_map(|id| match state.active.get(id) {
                Some(Slot::Open(delegate)) if delegate.params.config.mask => delegate.params.node,
                _ => None,
            });
            (target, state.mask)
        };

        match (target, mask) {
            (Some(target), MaskState::Ready(mask)) => {
                let mut scene = self.ctx.scene.borrow_mut();
                scene.add_child(self.node, mask);
                if let Some(index) = scene.children(self.node).iter().position(|c| *c == target) {
                    scene.set_sibling_index(mask, index);
                }
            }
            (Some(_), MaskState::Absent) => self.load_mask(),
            (None, MaskState::Ready(mask)) => self.ctx.scene.borrow_mut().remove_from_parent(mask),
            _ => {}
        }
    }

    fn load_mask(&self) {
        self.state.borrow_mut().mask = MaskState::Loading;
        let layer = self.this.clone();
        self.ctx.assets.load_prefab(
            &self.ctx.default_bundle,
            &self.ctx.mask_prefab,
            Box::new(move |result| {
                if let Some(layer) = layer.upgrade() {
                    layer.on_mask_loaded(result);
                }
            }),
        );
    }

    fn on_mask_loaded(&self, result: Result<Prefab, AssetError>) {
        match result {
            Ok(prefab) => {
                let node = self.ctx.scene.borrow_mut().instantiate(&prefab);
                self.state.borrow_mut().mask = MaskState::Ready(node);
                self.refresh_mask();
            }
            Err(error) => {
                log::error!(target: TARGET_VIEW, "Mask for {} failed to load: {error}", self.name);
                self.state.borrow_mut().mask = MaskState::Absent;
            }
        }
    }
}
