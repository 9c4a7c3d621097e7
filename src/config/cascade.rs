use crate::config::parser::parse_settings_file;
use crate::config::types::LoadedSettings;
use crate::error::{EmbedError, Result};
use std::path::{Path, PathBuf};

/// Name of a project-local settings file.
pub const LOCAL_SETTINGS_FILE: &str = ".embedfix.toml";

/// Find and load the effective settings.
///
/// Lookup order:
/// 1. `explicit`, if given (it must exist)
/// 2. The nearest `.embedfix.toml` walking up from `start_dir`
/// 3. `<config dir>/embedfix/config.toml`
/// 4. Built-in defaults
pub fn discover_settings(start_dir: &Path, explicit: Option<&Path>) -> Result<LoadedSettings> {
	if let Some(path) = explicit {
		if !path.exists() {
			return Err(EmbedError::SettingsNotFound {
				path: path.to_path_buf(),
			});
		}
		return load_from(path);
	}

	if let Some(path) = find_local_settings(start_dir) {
		return load_from(&path);
	}

	// A missing config dir is not fatal; there is just no user settings file.
	if let Ok(user_path) = user_settings_path()
		&& user_path.exists()
	{
		return load_from(&user_path);
	}

	tracing::debug!("no settings file found, using defaults");
	Ok(LoadedSettings::default())
}

/// Walk up from `start_dir` looking for a `.embedfix.toml`.
pub fn find_local_settings(start_dir: &Path) -> Option<PathBuf> {
	start_dir
		.ancestors()
		.map(|dir| dir.join(LOCAL_SETTINGS_FILE))
		.find(|candidate| candidate.exists())
}

fn load_from(path: &Path) -> Result<LoadedSettings> {
	let settings = parse_settings_file(path)?;
	tracing::debug!(path = %path.display(), "loaded settings");
	Ok(LoadedSettings {
		settings,
		path: Some(path.to_path_buf()),
	})
}

/// Directory holding embedfix's user-level files.
pub fn user_config_dir() -> Result<PathBuf> {
	let config_dir = dirs::config_dir().ok_or(EmbedError::ConfigDirectoryNotFound)?;
	Ok(config_dir.join("embedfix"))
}

/// Get the path to the user's settings file.
pub fn user_settings_path() -> Result<PathBuf> {
	Ok(user_config_dir()?.join("config.toml"))
}

/// Default location of the persisted rule lists.
pub fn default_store_dir() -> Result<PathBuf> {
	Ok(user_config_dir()?.join("store"))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::types::Platform;

	#[test]
	fn test_explicit_path_missing() {
		let temp_dir = tempfile::tempdir().unwrap();
		let missing = temp_dir.path().join("nope.toml");

		let result = discover_settings(temp_dir.path(), Some(&missing));
		match result.unwrap_err() {
			EmbedError::SettingsNotFound { path } => assert_eq!(path, missing),
			other => panic!("Expected SettingsNotFound, got {other:?}"),
		}
	}

	#[test]
	fn test_local_settings_found_in_parent() {
		let temp_dir = tempfile::tempdir().unwrap();
		let nested = temp_dir.path().join("a").join("b");
		std::fs::create_dir_all(&nested).unwrap();
		std::fs::write(
			temp_dir.path().join(LOCAL_SETTINGS_FILE),
			"[platforms]\npixiv = false\n",
		)
		.unwrap();

		let loaded = discover_settings(&nested, None).unwrap();
		assert_eq!(
			loaded.path,
			Some(temp_dir.path().join(LOCAL_SETTINGS_FILE))
		);
		assert!(!loaded.settings.platforms.is_enabled(Platform::Pixiv));
	}

	#[test]
	fn test_explicit_path_wins_over_local() {
		let temp_dir = tempfile::tempdir().unwrap();
		std::fs::write(
			temp_dir.path().join(LOCAL_SETTINGS_FILE),
			"[platforms]\npixiv = false\n",
		)
		.unwrap();
		let explicit = temp_dir.path().join("other.toml");
		std::fs::write(&explicit, "apply-rules-on-send = true\n").unwrap();

		let loaded = discover_settings(temp_dir.path(), Some(&explicit)).unwrap();
		assert!(loaded.settings.apply_rules_on_send);
		assert!(loaded.settings.platforms.is_enabled(Platform::Pixiv));
	}

	#[test]
	fn test_user_settings_path() {
		if let Ok(path) = user_settings_path() {
			assert!(path.ends_with("embedfix/config.toml"));
		}
	}
}
