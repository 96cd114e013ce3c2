//! # Unified Configuration System
//!
//! All shell settings in one serializable tree. Every section has defaults so a
//! partial file (or none at all) still produces a working configuration.
//!
//! ```toml
//! [ui]
//! default_bundle = "resources"
//! toast_duration = 1.5
//!
//! [net]
//! heartbeat_interval = 5.0
//!
//! [i18n]
//! default_language = "en"
//! ```

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};
use crate::ui::{layer_type, LayerKind};

/// One entry of the layer stack built by [`UiManager::init`](crate::ui::UiManager::init)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSpec {
    /// Layer name, also the value of `WindowConfig::layer`
    pub name: String,
    /// Layer behavior
    pub kind: LayerKind,
}

impl LayerSpec {
    /// Create a layer spec
    pub fn new(name: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// # UI Settings
///
/// Layer stack, default asset bundle and prompt resources.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Layers in stacking order (first is bottom-most)
    pub layers: Vec<LayerSpec>,
    /// Bundle used when a window config names none
    pub default_bundle: String,
    /// Seconds a toast stays on screen
    pub toast_duration: f64,
    /// Prefab path of the toast prompt
    pub toast_prefab: String,
    /// Prefab path of the waiting prompt
    pub wait_prefab: String,
    /// Prefab path of the popup mask
    pub mask_prefab: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            layers: vec![
                LayerSpec::new(layer_type::GAME, LayerKind::Node),
                LayerSpec::new(layer_type::UI, LayerKind::Ui),
                LayerSpec::new(layer_type::POPUP, LayerKind::PopUp),
                LayerSpec::new(layer_type::DIALOG, LayerKind::Dialog),
                LayerSpec::new(layer_type::SYSTEM, LayerKind::Dialog),
                LayerSpec::new(layer_type::NOTIFY, LayerKind::Notify),
                LayerSpec::new(layer_type::GUIDE, LayerKind::Node),
            ],
            default_bundle: "resources".to_string(),
            toast_duration: 2.0,
            toast_prefab: "common/prefab/notify".to_string(),
            wait_prefab: "common/prefab/wait".to_string(),
            mask_prefab: "common/prefab/mask".to_string(),
        }
    }
}

/// # Network Settings
///
/// Timer intervals of the websocket state machine, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetSettings {
    /// Interval between keep-alive frames
    pub heartbeat_interval: f64,
    /// Silence after which the connection is presumed dead and force-closed
    pub receive_timeout: f64,
    /// Delay before a reconnect attempt
    pub reconnect_delay: f64,
}

impl Default for NetSettings {
    fn default() -> Self {
        Self {
            heartbeat_interval: 10.0,
            receive_timeout: 6000.0,
            reconnect_delay: 8.0,
        }
    }
}

/// # Localization Settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct I18nSettings {
    /// Language used when none (or an empty one) is requested
    pub default_language: String,
    /// Bundle consulted when the active bundle lacks a key
    pub fallback_bundle: String,
}

impl Default for I18nSettings {
    fn default() -> Self {
        Self {
            default_language: "zh".to_string(),
            fallback_bundle: "main".to_string(),
        }
    }
}

/// # Logging Settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `env_logger` filter used when `RUST_LOG` is not set
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// # Shell Configuration
///
/// Top-level configuration handed to [`Framework::new`](crate::Framework::new).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// UI layer settings
    pub ui: UiSettings,
    /// Network timer settings
    pub net: NetSettings,
    /// Localization defaults
    pub i18n: I18nSettings,
    /// Logging defaults
    pub log: LogSettings,
}

impl Config for ShellConfig {}
