//! Entry registry and game switching

use super::{Entry, EntryContext, EntryError, EntryKey};
use crate::events::{EventArg, EventMessage};
use crate::ui::{UiArgs, UiCallbacks};
use std::collections::HashSet;

/// Registry of game module entries
#[derive(Default)]
pub struct EntryManager {
    entries: Vec<Box<dyn Entry>>,
    running: HashSet<String>,
    main: Option<String>,
    current: Option<String>,
    ctx: Option<EntryContext>,
}

impl EntryManager {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry; an entry already registered for the same bundle is replaced
    pub fn register(&mut self, entry: Box<dyn Entry>) {
        let bundle = entry.bundle().to_string();
        if let Some(index) = self.index_of_bundle(&bundle) {
            log::info!("Entry {bundle} replaced");
            self.entries[index] = entry;
            self.running.remove(&bundle);
        } else {
            self.entries.push(entry);
        }

        if let Some(ctx) = self.ctx.clone() {
            self.start(&bundle, &ctx);
        }
    }

    /// Run every entry once and load the main entry
    pub fn init(&mut self, ctx: EntryContext) {
        let bundles: Vec<String> = self.entries.iter().map(|e| e.bundle().to_string()).collect();
        for bundle in &bundles {
            self.start(bundle, &ctx);
        }
        self.ctx = Some(ctx);
    }

    fn start(&mut self, bundle: &str, ctx: &EntryContext) {
        let Some(index) = self.index_of_bundle(bundle) else {
            return;
        };
        let entry = &mut self.entries[index];
        if self.running.insert(bundle.to_string()) {
            entry.run(ctx);
        }
        if entry.is_main() {
            self.main = Some(bundle.to_string());
            entry.on_load(ctx);
            ctx.gui.add_config(&entry.window_configs());
        }
    }

    fn index_of_bundle(&self, bundle: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.bundle() == bundle)
    }

    fn index_of(&self, key: &EntryKey) -> Option<usize> {
        match key {
            EntryKey::Id(id) => self.entries.iter().position(|e| e.game_id() == *id),
            EntryKey::Bundle(bundle) => self.index_of_bundle(bundle),
        }
    }

    /// Switch to a game module
    ///
    /// Loads the entry, installs its window configs overlaid by the main
    /// entry's, opens its launch window and announces it with `ENTRY_ENTER`.
    pub fn enter_game(&mut self, key: impl Into<EntryKey>) -> Result<(), EntryError> {
        let key = key.into();
        let ctx = self.ctx.clone().ok_or(EntryError::NotInitialized)?;
        let Some(index) = self.index_of(&key) else {
            log::error!("Entry {key} not found");
            return Err(EntryError::NotFound(key.to_string()));
        };

        let bundle = self.entries[index].bundle().to_string();
        let launch = self.entries[index]
            .launch_ui()
            .map(str::to_string)
            .ok_or_else(|| EntryError::NoLaunchWindow(bundle.clone()))?;

        self.entries[index].on_load(&ctx);

        let mut configs = self.entries[index].window_configs();
        if let Some(main) = self.main.as_deref().and_then(|main| self.index_of_bundle(main)) {
            if main != index {
                configs.extend(&self.entries[main].window_configs());
            }
        }
        ctx.gui.init_config(&configs);

        log::info!("Entering game {bundle}");
        self.current = Some(bundle.clone());
        ctx.gui.open(&launch, UiArgs::none(), UiCallbacks::new());
        ctx.message
            .dispatch_event(EventMessage::ENTRY_ENTER, &[EventArg::Str(bundle)]);
        Ok(())
    }

    /// Entry by id or bundle
    pub fn get_entry(&self, key: impl Into<EntryKey>) -> Option<&dyn Entry> {
        self.index_of(&key.into()).map(|index| self.entries[index].as_ref())
    }

    /// Bundle of the entry entered last
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Bundle of the main entry, once initialized
    pub fn main(&self) -> Option<&str> {
        self.main.as_deref()
    }

    /// Registered bundles in registration order
    pub fn bundles(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.bundle()).collect()
    }

    /// Notify every entry of shutdown
    pub fn on_destroy(&mut self) {
        for entry in &mut self.entries {
            entry.on_destroy();
        }
    }

    /// Log the registered bundles
    pub fn debug(&self) {
        log::info!("------- Entry manager -------");
        for entry in &self.entries {
            log::info!("bundle: {} (game id {})", entry.bundle(), entry.game_id());
        }
    }
}
