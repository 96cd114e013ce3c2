//! Toast and waiting prompts of the notify layer

use super::layer::LayerContext;
use crate::assets::{AssetError, Prefab};
use crate::foundation::collections::{NodeId, TimerId};
use crate::foundation::logging::TARGET_VIEW;
use crate::foundation::time::TimerQueue;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

struct Toast {
    id: u64,
    content: String,
    node: Option<NodeId>,
    timer: TimerId,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum WaitState {
    #[default]
    Hidden,
    Loading,
    Shown(NodeId),
}

#[derive(Default)]
struct NotifyState {
    toasts: Vec<Toast>,
    timers: TimerQueue<u64>,
    next_id: u64,
    wait: WaitState,
}

/// Transient prompts shown above every window
///
/// Toasts expire after the configured duration as the manager's clock advances.
pub struct NotifyPrompts {
    node: NodeId,
    ctx: Rc<LayerContext>,
    toast_prefab: String,
    wait_prefab: String,
    duration: f64,
    state: RefCell<NotifyState>,
    this: Weak<Self>,
}

impl NotifyPrompts {
    pub(crate) fn new(
        node: NodeId,
        ctx: Rc<LayerContext>,
        toast_prefab: &str,
        wait_prefab: &str,
        duration: f64,
    ) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            node,
            ctx,
            toast_prefab: toast_prefab.to_string(),
            wait_prefab: wait_prefab.to_string(),
            duration,
            state: RefCell::new(NotifyState::default()),
            this: this.clone(),
        })
    }

    /// Show a toast; returns its id
    pub fn toast(&self, content: &str) -> u64 {
        let id = {
            let mut state = self.state.borrow_mut();
            state.next_id += 1;
            let id = state.next_id;
            let timer = state.timers.schedule(self.duration, id);
            state.toasts.push(Toast {
                id,
                content: content.to_string(),
                node: None,
                timer,
            });
            id
        };
        log::debug!(target: TARGET_VIEW, "Toast {id}: {content}");

        let prompts = self.this.clone();
        self.ctx.assets.load_prefab(
            &self.ctx.default_bundle,
            &self.toast_prefab,
            Box::new(move |result| {
                if let Some(prompts) = prompts.upgrade() {
                    prompts.on_toast_loaded(id, result);
                }
            }),
        );
        id
    }

    fn on_toast_loaded(&self, id: u64, result: Result<Prefab, AssetError>) {
        let prefab = match result {
            Ok(prefab) => prefab,
            Err(error) => {
                log::warn!(target: TARGET_VIEW, "Toast prefab unavailable: {error}");
                return;
            }
        };
        if !self.state.borrow().toasts.iter().any(|t| t.id == id) {
            self.ctx.assets.release(&self.toast_prefab, &self.ctx.default_bundle);
            return;
        }

        let node = {
            let mut scene = self.ctx.scene.borrow_mut();
            let node = scene.instantiate(&prefab);
            scene.add_child(self.node, node);
            node
        };
        if let Some(toast) = self.state.borrow_mut().toasts.iter_mut().find(|t| t.id == id) {
            toast.node = Some(node);
        }
    }

    /// Contents of the toasts currently shown, oldest first
    pub fn toasts(&self) -> Vec<String> {
        self.state.borrow().toasts.iter().map(|t| t.content.clone()).collect()
    }

    /// Dismiss a toast before it expires
    pub fn dismiss(&self, id: u64) -> bool {
        let toast = {
            let mut state = self.state.borrow_mut();
            let Some(index) = state.toasts.iter().position(|t| t.id == id) else {
                return false;
            };
            let toast = state.toasts.remove(index);
            state.timers.cancel(toast.timer);
            toast
        };
        self.destroy_toast(&toast);
        true
    }

    fn destroy_toast(&self, toast: &Toast) {
        if let Some(node) = toast.node {
            self.ctx.scene.borrow_mut().destroy(node);
            self.ctx.assets.release(&self.toast_prefab, &self.ctx.default_bundle);
        }
    }

    /// Show the waiting prompt; repeated calls keep a single prompt
    pub fn wait_open(&self) {
        {
            let mut state = self.state.borrow_mut();
            if state.wait != WaitState::Hidden {
                return;
            }
            state.wait = WaitState::Loading;
        }

        let prompts = self.this.clone();
        self.ctx.assets.load_prefab(
            &self.ctx.default_bundle,
            &self.wait_prefab,
            Box::new(move |result| {
                if let Some(prompts) = prompts.upgrade() {
                    prompts.on_wait_loaded(result);
                }
            }),
        );
    }

    fn on_wait_loaded(&self, result: Result<Prefab, AssetError>) {
        if self.state.borrow().wait != WaitState::Loading {
            if result.is_ok() {
                self.ctx.assets.release(&self.wait_prefab, &self.ctx.default_bundle);
            }
            return;
        }
        match result {
            Ok(prefab) => {
                let node = {
                    let mut scene = self.ctx.scene.borrow_mut();
                    let node = scene.instantiate(&prefab);
                    scene.add_child(self.node, node);
                    node
                };
                self.state.borrow_mut().wait = WaitState::Shown(node);
            }
            Err(error) => {
                log::warn!(target: TARGET_VIEW, "Waiting prompt unavailable: {error}");
                self.state.borrow_mut().wait = WaitState::Hidden;
            }
        }
    }

    /// Hide the waiting prompt
    pub fn wait_close(&self) {
        let previous = std::mem::take(&mut self.state.borrow_mut().wait);
        if let WaitState::Shown(node) = previous {
            self.ctx.scene.borrow_mut().destroy(node);
            self.ctx.assets.release(&self.wait_prefab, &self.ctx.default_bundle);
        }
    }

    /// Whether the waiting prompt is shown or loading
    pub fn is_waiting(&self) -> bool {
        self.state.borrow().wait != WaitState::Hidden
    }

    /// Advance the prompt clock to `now` (seconds), expiring due toasts
    pub fn update(&self, now: f64) {
        let expired: Vec<Toast> = {
            let mut state = self.state.borrow_mut();
            let due = state.timers.advance(now);
            let (expired, kept): (Vec<Toast>, Vec<Toast>) = std::mem::take(&mut state.toasts)
                .into_iter()
                .partition(|t| due.contains(&t.id));
            state.toasts = kept;
            expired
        };
        for toast in &expired {
            self.destroy_toast(toast);
        }
    }
}
