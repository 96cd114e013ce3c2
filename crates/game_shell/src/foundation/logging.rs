//! Logging utilities and log targets
//!
//! The shell logs through the `log` facade. Network traffic and window
//! lifecycle messages use dedicated targets so they can be filtered with
//! `RUST_LOG=net=debug,view=info`.

pub use log::{debug, error, info, trace, warn};

/// Target for connection state and traffic messages
pub const TARGET_NET: &str = "net";

/// Target for window lifecycle messages
pub const TARGET_VIEW: &str = "view";

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system with a default filter
///
/// `RUST_LOG` still takes precedence when it is set.
pub fn init_with_filter(filter: &str) {
    let env = env_logger::Env::default().default_filter_or(filter);
    if let Err(err) = env_logger::Builder::from_env(env)
        .format_timestamp_secs()
        .try_init()
    {
        eprintln!("logger already initialized: {err}");
    }
}

/// Initialize a test logger; repeated calls are ignored
pub fn try_init_for_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
}
