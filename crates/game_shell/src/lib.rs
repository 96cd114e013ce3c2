//! # Game Shell
//!
//! Reusable application shell for games built on a retained scene graph.
//!
//! ## Features
//!
//! - **UI Layers**: Stacked window layers with popup masks, queued dialogs and toasts
//! - **Window Lifecycle**: Async prefab loading with ordered added/remove hooks and caching
//! - **Entries**: Per-bundle game modules with launch windows and config overlays
//! - **Event Bus**: Scoped synchronous events with snapshot dispatch
//! - **Network**: Websocket state machine with heartbeat, timeouts and reconnects
//! - **I18n**: Bundle-aware string lookup and re-rendering on language change
//! - **Resources**: Loads scoped to the current game bundle and language bundles
//!
//! The host engine is abstracted behind [`scene::SceneHost`] and
//! [`assets::AssetLoader`]; in-memory implementations of both ship with the
//! crate for tests and headless tools.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use game_shell::prelude::*;
//!
//! let scene = MemoryScene::shared();
//! let assets = MemoryAssetLoader::shared(LoadMode::Immediate);
//! let root = scene.borrow_mut().create_node("Canvas");
//!
//! let mut app = Framework::new(ShellConfig::default(), scene, assets);
//! app.on_load(root);
//! app.gui().init_config(
//!     &WindowConfigTable::new().with("shop", WindowConfig::new(layer_type::UI, "gui/shop")),
//! );
//! app.gui().open("shop", UiArgs::none(), UiCallbacks::new());
//! app.update(0.016);
//! ```

pub mod assets;
pub mod config;
pub mod core;
pub mod entry;
pub mod events;
pub mod foundation;
pub mod i18n;
pub mod network;
pub mod query;
pub mod scene;
pub mod ui;

mod framework;

pub use framework::Framework;

/// Common imports for shell users
pub mod prelude {
    pub use crate::{
        assets::{AssetLoader, LoadMode, MemoryAssetLoader, Prefab, ResKind, ResManager, SharedAssets},
        config::Config,
        core::config::{I18nSettings, NetSettings, ShellConfig, UiSettings},
        entry::{Entry, EntryContext, EntryError, EntryManager},
        events::{EventArg, EventMessage, MessageEventData, MessageManager, ScopeId},
        foundation::collections::NodeId,
        i18n::{I18n, Localized, LocalizedLabel, LocalizedSpine, LocalizedSprite},
        network::{
            LoopbackSocket, NetConnectOptions, NetData, NetNodeState, Socket, WebSocketManager,
        },
        query::Query,
        scene::{MemoryScene, SceneHost, SharedScene},
        ui::{
            layer_type, CommonPrompt, LayerKind, OpenHandle, OpenResult, PromptOptions, UiArgs,
            UiCallbacks, UiManager, ViewParams, WindowComponent, WindowConfig, WindowConfigTable,
        },
        Framework,
    };
}
