// Server module entry
// Listener setup, connection serving and shutdown handling

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module is exposed as server_loop
#[path = "loop.rs"]
pub mod server_loop;

use std::time::Duration;

use crate::config::Config;

pub use listener::create_reusable_listener;
pub use server_loop::serve;
pub use signal::shutdown_signal;

/// Transport settings derived from the configuration
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub keep_alive: bool,
    pub request_timeout: Duration,
    pub max_connections: Option<usize>,
    pub access_log: bool,
    pub access_log_format: String,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self {
            keep_alive: true,
            request_timeout: Duration::from_secs(30),
            max_connections: None,
            access_log: false,
            access_log_format: "combined".to_string(),
        }
    }
}

impl From<&Config> for ServeOptions {
    fn from(config: &Config) -> Self {
        Self {
            keep_alive: config.performance.keep_alive,
            request_timeout: Duration::from_secs(config.performance.request_timeout),
            max_connections: config
                .performance
                .max_connections
                .map(|n| usize::try_from(n).unwrap_or(usize::MAX)),
            access_log: config.logging.access_log,
            access_log_format: config.logging.access_log_format.clone(),
        }
    }
}
