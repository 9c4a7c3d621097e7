use crate::config::types::Settings;
use crate::error::{EmbedError, Result};
use std::path::Path;

/// Parse a settings file from the given path.
pub fn parse_settings_file(path: &Path) -> Result<Settings> {
	let content =
		std::fs::read_to_string(path).map_err(|source| EmbedError::SettingsReadError {
			path: path.to_path_buf(),
			source,
		})?;

	parse_settings_str(&content, path)
}

/// Parse settings from a string (useful for testing).
pub fn parse_settings_str(content: &str, path: &Path) -> Result<Settings> {
	toml::from_str(content).map_err(|source| EmbedError::SettingsParseError {
		path: path.to_path_buf(),
		source,
	})
}

/// Template written by `embedfix --init`.
pub fn generate_init_template() -> String {
	r#"# embedfix settings

# Also run your find/replace rules when a message is sent or edited.
# When false, rules are only applied by `embedfix preview`.
apply-rules-on-send = false

# Where the rule lists are stored. Defaults to the user config directory.
# store-dir = "/path/to/store"

# Link conversion per platform. Every platform is enabled by default.
[platforms]
twitter = true
tiktok = true
instagram = true
bsky = true
threads = true
reddit = true
pixiv = true
deviantart = true
"#
	.to_string()
}
