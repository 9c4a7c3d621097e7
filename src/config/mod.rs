//! Settings loading and parsing for embedfix.
//!
//! This module handles:
//! - TOML settings parsing
//! - Settings file discovery
//! - Per-platform conversion toggles

pub mod cascade;
pub mod parser;
pub mod types;

pub use cascade::{
	LOCAL_SETTINGS_FILE, default_store_dir, discover_settings, find_local_settings,
	user_config_dir, user_settings_path,
};
pub use parser::{generate_init_template, parse_settings_file, parse_settings_str};
pub use types::{LoadedSettings, Platform, PlatformToggles, Settings};
