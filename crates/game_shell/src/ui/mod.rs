//! Layered window management
//!
//! A [`UiManager`] owns one [`Layer`] per configured layer name. Windows are
//! described by [`WindowConfig`] entries and opened by id; each open window is
//! driven by a delegate that fans lifecycle events out to the window's
//! [`WindowComponent`]s and to the caller's [`UiCallbacks`].
//!
//! Key behaviors:
//! - At most one load per window id is in flight; duplicate opens are ignored
//! - Removing a window still loading cancels it; the late asset is released
//! - `replace` removes the old window only after the new one reported added
//! - Dialog layers show one window at a time and queue the rest

pub mod config;
mod delegate;
mod layer;
mod manager;
mod notify;
mod open_handle;
mod prompt;

#[cfg(test)]
mod tests;

use crate::foundation::collections::NodeId;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::rc::Rc;

pub use config::{WindowConfig, WindowConfigTable};
pub use delegate::{RemoveContinuation, WindowComponent};
pub use layer::Layer;
pub use manager::{Translate, UiManager, WeakUiManager};
pub use notify::NotifyPrompts;
pub use open_handle::{OpenHandle, OpenResult};
pub use prompt::{CommonPrompt, PromptAction, PromptOptions};

/// Names of the default layers
pub mod layer_type {
    /// Game content
    pub const GAME: &str = "LayerGame";
    /// Main interface
    pub const UI: &str = "LayerUI";
    /// Popups
    pub const POPUP: &str = "LayerPopUp";
    /// Modal dialogs
    pub const DIALOG: &str = "LayerDialog";
    /// System dialogs (disconnect, errors)
    pub const SYSTEM: &str = "LayerSystem";
    /// Toasts and waiting prompts
    pub const NOTIFY: &str = "LayerNotify";
    /// Tutorial overlays
    pub const GUIDE: &str = "LayerGuide";
}

/// Lifecycle behavior of a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerKind {
    /// Plain container node
    Node,
    /// One instance per window id
    Ui,
    /// Windows with optional modal mask and outside-tap close
    PopUp,
    /// One window at a time, further opens queue
    Dialog,
    /// Windows plus toast and waiting prompts
    Notify,
}

/// Type-erased caller arguments handed to window hooks
#[derive(Clone, Default)]
pub struct UiArgs(Option<Rc<dyn Any>>);

impl UiArgs {
    /// Wrap a value
    pub fn new<T: Any>(value: T) -> Self {
        Self(Some(Rc::new(value)))
    }

    /// No arguments
    pub const fn none() -> Self {
        Self(None)
    }

    /// Typed view of the arguments
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.0.as_ref()?.downcast_ref()
    }

    /// True when no arguments were supplied
    pub const fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

impl fmt::Debug for UiArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("UiArgs(..)"),
            None => f.write_str("UiArgs(None)"),
        }
    }
}

/// Called once the window is attached and every component accepted it
pub type AddedHook = Box<dyn FnOnce(NodeId, &UiArgs)>;

/// Called after teardown; the node is `None` when it was destroyed
pub type RemovedHook = Box<dyn FnOnce(Option<NodeId>, &UiArgs)>;

/// Called before teardown; teardown waits until the continuation proceeds
pub type BeforeRemoveHook = Box<dyn FnOnce(NodeId, RemoveContinuation)>;

/// Called when the window could not be opened
pub type LoadFailureHook = Box<dyn FnOnce()>;

/// Caller supplied lifecycle hooks
///
/// Every hook runs at most once. Dropping an unfired `on_added` hook is how a
/// rejected or failed open becomes visible to [`OpenHandle`].
#[derive(Default)]
pub struct UiCallbacks {
    pub(crate) added: Option<AddedHook>,
    pub(crate) removed: Option<RemovedHook>,
    pub(crate) before_remove: Option<BeforeRemoveHook>,
    pub(crate) load_failure: Option<LoadFailureHook>,
}

impl UiCallbacks {
    /// No hooks
    pub fn new() -> Self {
        Self::default()
    }

    /// Window became visible
    #[must_use]
    pub fn on_added(mut self, hook: impl FnOnce(NodeId, &UiArgs) + 'static) -> Self {
        self.added = Some(Box::new(hook));
        self
    }

    /// Window was torn down
    #[must_use]
    pub fn on_removed(mut self, hook: impl FnOnce(Option<NodeId>, &UiArgs) + 'static) -> Self {
        self.removed = Some(Box::new(hook));
        self
    }

    /// Window is about to be torn down; call [`RemoveContinuation::proceed`] when ready
    #[must_use]
    pub fn on_before_remove(
        mut self,
        hook: impl FnOnce(NodeId, RemoveContinuation) + 'static,
    ) -> Self {
        self.before_remove = Some(Box::new(hook));
        self
    }

    /// Window could not be loaded or a component rejected it
    #[must_use]
    pub fn on_load_failure(mut self, hook: impl FnOnce() + 'static) -> Self {
        self.load_failure = Some(Box::new(hook));
        self
    }
}

impl fmt::Debug for UiCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiCallbacks")
            .field("added", &self.added.is_some())
            .field("removed", &self.removed.is_some())
            .field("before_remove", &self.before_remove.is_some())
            .field("load_failure", &self.load_failure.is_some())
            .finish()
    }
}

/// State of one open request
///
/// Created when the open is requested and dropped when the window is fully torn
/// down. `valid` turns false as soon as removal starts.
#[derive(Debug, Clone)]
pub struct ViewParams {
    /// Window id
    pub id: String,
    /// Resolved window configuration
    pub config: WindowConfig,
    /// Caller arguments
    pub args: UiArgs,
    /// False once removal has started
    pub valid: bool,
    /// Root node, once instantiated
    pub node: Option<NodeId>,
}

impl ViewParams {
    pub(crate) fn new(id: &str, config: WindowConfig, args: UiArgs) -> Self {
        Self {
            id: id.to_string(),
            config,
            args,
            valid: true,
            node: None,
        }
    }
}
