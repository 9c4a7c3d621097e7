use crate::error::{EmbedError, Result};
use crate::rules::types::UserRule;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Persistent key-value storage for rule lists.
///
/// Every write replaces the whole list stored under the key.
pub trait KeyValueStore {
	/// Read the list stored under `key`. `None` when nothing was ever stored.
	fn get(&self, key: &str) -> Result<Option<Vec<UserRule>>>;

	/// Overwrite the list stored under `key`.
	fn set(&mut self, key: &str, rules: &[UserRule]) -> Result<()>;
}

/// On-disk layout of one stored list.
#[derive(Debug, Default, Serialize, Deserialize)]
struct RuleDocument {
	#[serde(default)]
	rules: Vec<UserRule>,
}

/// Stores each key as `<dir>/<key>.toml`.
#[derive(Debug, Clone)]
pub struct FileStore {
	dir: PathBuf,
}

impl FileStore {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		FileStore { dir: dir.into() }
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	/// Path of the file backing `key`.
	pub fn path_for(&self, key: &str) -> PathBuf {
		self.dir.join(format!("{key}.toml"))
	}
}

impl KeyValueStore for FileStore {
	fn get(&self, key: &str) -> Result<Option<Vec<UserRule>>> {
		let path = self.path_for(key);
		if !path.exists() {
			return Ok(None);
		}

		let content = std::fs::read_to_string(&path).map_err(|source| {
			EmbedError::StoreReadError {
				path: path.clone(),
				source,
			}
		})?;
		let document: RuleDocument =
			toml::from_str(&content).map_err(|source| EmbedError::StoreParseError {
				path: path.clone(),
				source,
			})?;

		Ok(Some(document.rules))
	}

	fn set(&mut self, key: &str, rules: &[UserRule]) -> Result<()> {
		let path = self.path_for(key);
		let document = RuleDocument {
			rules: rules.to_vec(),
		};
		let content =
			toml::to_string(&document).map_err(|source| EmbedError::StoreSerializeError {
				key: key.to_string(),
				source,
			})?;

		std::fs::create_dir_all(&self.dir).map_err(|source| EmbedError::StoreWriteError {
			path: self.dir.clone(),
			source,
		})?;
		std::fs::write(&path, content)
			.map_err(|source| EmbedError::StoreWriteError { path, source })
	}
}

/// Keeps lists in memory only.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
	entries: HashMap<String, Vec<UserRule>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

impl KeyValueStore for MemoryStore {
	fn get(&self, key: &str) -> Result<Option<Vec<UserRule>>> {
		Ok(self.entries.get(key).cloned())
	}

	fn set(&mut self, key: &str, rules: &[UserRule]) -> Result<()> {
		self.entries.insert(key.to_string(), rules.to_vec());
		Ok(())
	}
}
