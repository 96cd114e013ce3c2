//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the shell:
//! - Logging setup and log targets
//! - Deterministic timers driven by the host clock
//! - Slot-map backed handle types

pub mod collections;
pub mod logging;
pub mod time;
