//! Application facade
//!
//! Owns one instance of every manager and wires them together: the window
//! manager translates toasts through [`I18n`], entries receive the window
//! manager and event bus, and language changes are broadcast on the bus.

use crate::assets::{ResManager, SharedAssets};
use crate::core::config::ShellConfig;
use crate::entry::{Entry, EntryContext, EntryError, EntryKey, EntryManager};
use crate::events::{EventArg, EventMessage, MessageManager};
use crate::foundation::collections::NodeId;
use crate::foundation::logging;
use crate::i18n::I18n;
use crate::network::WebSocketManager;
use crate::query::Query;
use crate::scene::SharedScene;
use crate::ui::UiManager;
use std::rc::Rc;

/// Top-level application services
pub struct Framework {
    config: ShellConfig,
    gui: UiManager,
    message: MessageManager,
    entries: EntryManager,
    net: WebSocketManager,
    i18n: I18n,
    res: ResManager,
    query: Query,
}

impl Framework {
    /// Build every manager from `config`
    pub fn new(config: ShellConfig, scene: SharedScene, assets: SharedAssets) -> Self {
        let res = ResManager::new(assets.clone(), config.ui.default_bundle.clone());
        let gui = UiManager::new(config.ui.clone(), scene, assets);
        let i18n = I18n::new(config.i18n.clone());
        let net = WebSocketManager::new(config.net.clone());

        let translator = i18n.clone();
        gui.set_translator(Rc::new(move |key: &str| translator.t(key)));

        Self {
            config,
            gui,
            message: MessageManager::new(),
            entries: EntryManager::new(),
            net,
            i18n,
            res,
            query: Query::default(),
        }
    }

    /// Install the global logger with the configured filter
    pub fn init_logging(&self) {
        logging::init_with_filter(&self.config.log.filter);
    }

    /// Configuration the shell was built from
    pub const fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Window manager
    pub const fn gui(&self) -> &UiManager {
        &self.gui
    }

    /// Event bus
    pub const fn message(&self) -> &MessageManager {
        &self.message
    }

    /// Entry registry
    pub const fn entries(&self) -> &EntryManager {
        &self.entries
    }

    /// Entry registry, mutable
    pub fn entries_mut(&mut self) -> &mut EntryManager {
        &mut self.entries
    }

    /// Websocket connection
    pub const fn net(&self) -> &WebSocketManager {
        &self.net
    }

    /// Websocket connection, mutable
    pub fn net_mut(&mut self) -> &mut WebSocketManager {
        &mut self.net
    }

    /// Localization
    pub const fn i18n(&self) -> &I18n {
        &self.i18n
    }

    /// Resource loads against the current game bundle
    pub const fn res(&self) -> &ResManager {
        &self.res
    }

    /// Launch parameters
    pub const fn query(&self) -> &Query {
        &self.query
    }

    /// Parse launch parameters from the page URL
    pub fn set_launch_url(&mut self, url: &str) {
        self.query = Query::parse(url);
        log::debug!("Launch parameters: {:?}", self.query.data());
    }

    /// Register a game module entry
    pub fn register_entry(&mut self, entry: Box<dyn Entry>) {
        self.entries.register(entry);
    }

    /// Build the layer stack under `root` and start every entry
    pub fn on_load(&mut self, root: NodeId) {
        self.gui.init(root);
        if !self.i18n.is_ready() {
            let language = self
                .query
                .get("lang")
                .unwrap_or(&self.config.i18n.default_language)
                .to_string();
            self.i18n.init(&language);
        }
        self.entries.init(EntryContext {
            gui: self.gui.clone(),
            message: self.message.clone(),
        });
        log::info!("Framework loaded, language {}", self.i18n.language());
    }

    /// Switch to a game module; its bundle becomes the active string and resource bundle
    pub fn enter_game(&mut self, key: impl Into<EntryKey>) -> Result<(), EntryError> {
        self.entries.enter_game(key)?;
        self.i18n.set_bundle(self.entries.current());
        if let Some(bundle) = self.entries.current() {
            self.res.init_bundle(bundle);
        }
        Ok(())
    }

    /// Advance network timers and prompt expiry to `now` (seconds)
    pub fn update(&mut self, now: f64) {
        self.net.update(now);
        self.gui.update(now);
    }

    /// Switch language, re-render localized renderers and broadcast `LANGUAGE_CHANGED`
    pub fn change_language(&self, language: &str) -> bool {
        if !self.i18n.change_language(language) {
            return false;
        }
        let language = self.i18n.language();
        self.message
            .dispatch_event(EventMessage::LANGUAGE_CHANGED, &[EventArg::from(language)]);
        true
    }

    /// Shut down every entry and close the connection
    pub fn on_destroy(&mut self) {
        self.entries.on_destroy();
        self.net.close(None, Some("shutdown"));
    }
}
