//! # Core Shell Module
//!
//! Shared configuration for every subsystem of the shell.
//!
//! ## Organization
//!
//! - **Config**: Unified configuration (UI layers, network timing, i18n defaults, logging)
//! - **Foundation**: Low-level utilities re-exported for convenience

pub mod config;

pub use crate::foundation;

pub use config::{I18nSettings, LayerSpec, LogSettings, NetSettings, ShellConfig, UiSettings};
pub use crate::config::{Config, ConfigError};
