//! Configuration management for script-http.
//!
//! Configuration is stored in TOML format. The search order is:
//! 1. `./script-http.toml` (next to the host executable's working directory)
//! 2. `~/.config/script-http/config.toml` (XDG config)
//!
//! Every field is optional; a missing file means defaults.
//!
//! # Example Configuration
//!
//! ```toml
//! default_timeout_ms = 8000
//! worker_threads = 4
//! user_agent = "MyMod/1.2"
//!
//! [logging]
//! level = "debug"
//! rotation = "daily"
//! ```

mod file;
mod types;

pub use file::{from_path, from_str, load, search_paths, xdg_config_dir};
pub use types::BridgeConfig;
