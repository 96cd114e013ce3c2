//! Per-window lifecycle fan-out

use super::layer::Layer;
use super::{UiCallbacks, ViewParams};
use crate::foundation::logging::TARGET_VIEW;
use std::rc::Weak;

/// Optional lifecycle hooks of a component attached to a window root
///
/// Every method has a no-op default, so a component implements only the hooks
/// it cares about.
pub trait WindowComponent {
    /// Window was attached; returning `false` aborts the open
    fn on_added(&mut self, _params: &ViewParams) -> bool {
        true
    }

    /// Window is about to be torn down
    fn on_before_remove(&mut self, _params: &ViewParams) {}

    /// Window was torn down
    fn on_removed(&mut self, _params: &ViewParams) {}
}

/// Controller bound to one window root for the lifetime of the node
pub(crate) struct WindowDelegate {
    pub(crate) params: ViewParams,
    pub(crate) callbacks: UiCallbacks,
    pub(crate) components: Vec<Box<dyn WindowComponent>>,
    pub(crate) serial: u64,
}

impl WindowDelegate {
    /// Run every component's `on_added` in attach order, stopping at the first refusal
    pub(crate) fn notify_added(
        params: &ViewParams,
        components: &mut [Box<dyn WindowComponent>],
    ) -> bool {
        for (index, component) in components.iter_mut().enumerate() {
            if !component.on_added(params) {
                log::warn!(
                    target: TARGET_VIEW,
                    "Component {index} of window {} refused to open",
                    params.id
                );
                return false;
            }
        }
        true
    }

    pub(crate) fn notify_before_remove(
        params: &ViewParams,
        components: &mut [Box<dyn WindowComponent>],
    ) {
        for component in components.iter_mut() {
            component.on_before_remove(params);
        }
    }

    pub(crate) fn notify_removed(params: &ViewParams, components: &mut [Box<dyn WindowComponent>]) {
        for component in components.iter_mut() {
            component.on_removed(params);
        }
    }
}

/// Permission to finish tearing down a window
///
/// Handed to the `on_before_remove` hook. The window stays half-closed until
/// [`proceed`](Self::proceed) is called; dropping the continuation leaves it
/// that way until another `remove` for the same id forces teardown.
#[derive(Debug)]
#[must_use = "the window is not torn down until `proceed` is called"]
pub struct RemoveContinuation {
    pub(crate) layer: Weak<Layer>,
    pub(crate) id: String,
    pub(crate) serial: u64,
    pub(crate) destroy: bool,
}

impl RemoveContinuation {
    /// Finish the removal
    pub fn proceed(self) {
        match self.layer.upgrade() {
            Some(layer) => layer.finish_remove(&self.id, self.serial, self.destroy),
            None => log::debug!(target: TARGET_VIEW, "Layer gone before window {} finished closing", self.id),
        }
    }

    /// Id of the window being removed
    pub fn window_id(&self) -> &str {
        &self.id
    }
}
