//! Game module entries
//!
//! Each asset bundle that hosts a game module registers one [`Entry`]. The
//! [`EntryManager`] runs them at startup and switches between them.

mod manager;

use crate::events::MessageManager;
use crate::ui::{UiManager, WindowConfigTable};
use std::fmt;
use thiserror::Error;

pub use manager::EntryManager;

/// Entry errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EntryError {
    /// No entry registered under this id or bundle
    #[error("Entry not found: {0}")]
    NotFound(String),

    /// `enter_game` called before `init`
    #[error("Entry manager not initialized")]
    NotInitialized,

    /// The entry names no window to open on enter
    #[error("Entry {0} has no launch window")]
    NoLaunchWindow(String),
}

/// Services handed to entries
#[derive(Clone)]
pub struct EntryContext {
    /// Window manager
    pub gui: UiManager,
    /// Event bus
    pub message: MessageManager,
}

/// Bootstrap object of one game module
pub trait Entry {
    /// Bundle hosting the module; also the registration key
    fn bundle(&self) -> &str;

    /// Numeric game id
    fn game_id(&self) -> u32;

    /// The main entry's window configs override every other entry's
    fn is_main(&self) -> bool {
        false
    }

    /// Window opened by `enter_game`
    fn launch_ui(&self) -> Option<&str> {
        None
    }

    /// Windows this module contributes
    fn window_configs(&self) -> WindowConfigTable {
        WindowConfigTable::new()
    }

    /// Called once during `EntryManager::init`
    fn run(&mut self, _ctx: &EntryContext) {}

    /// Called whenever the module is loaded or entered
    fn on_load(&mut self, _ctx: &EntryContext) {}

    /// Called when the shell shuts down
    fn on_destroy(&mut self) {}
}

/// Lookup key for [`EntryManager::enter_game`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKey {
    /// By game id
    Id(u32),
    /// By bundle name
    Bundle(String),
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{id}"),
            Self::Bundle(bundle) => f.write_str(bundle),
        }
    }
}

impl From<u32> for EntryKey {
    fn from(id: u32) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for EntryKey {
    fn from(bundle: &str) -> Self {
        Self::Bundle(bundle.to_string())
    }
}

impl From<String> for EntryKey {
    fn from(bundle: String) -> Self {
        Self::Bundle(bundle)
    }
}
