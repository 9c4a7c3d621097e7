use std::path::PathBuf;
use std::sync::Arc;

/// Library-level structured errors for embedfix.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
	#[error("Settings file not found: {path}")]
	SettingsNotFound { path: PathBuf },

	#[error("Failed to read settings file: {path}")]
	SettingsReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse settings file: {path}")]
	SettingsParseError {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Invalid pattern rule: {pattern}")]
	InvalidPattern {
		pattern: String,
		#[source]
		source: PatternError,
	},

	#[error("Failed to read rule store entry: {path}")]
	StoreReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse rule store entry: {path}")]
	StoreParseError {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Failed to write rule store entry: {path}")]
	StoreWriteError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to serialize rules for key: {key}")]
	StoreSerializeError {
		key: String,
		#[source]
		source: toml::ser::Error,
	},

	#[error("Rule index {index} is out of range (list has {len} rules)")]
	RuleIndexOutOfRange { index: usize, len: usize },

	#[error("Rule store is already borrowed for editing")]
	StoreBusy,

	#[error("Failed to resolve config directory")]
	ConfigDirectoryNotFound,
}

/// Why a pattern rule's find string could not be compiled.
///
/// Kept separate from [`EmbedError`] and `Clone` so compiled rule sets can hold
/// the failure next to the rule it belongs to.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PatternError {
	#[error("unsupported flag '{flag}'")]
	UnsupportedFlag { flag: char },

	/// A user pattern that does not parse, or that the matcher gave up on.
	#[error(transparent)]
	Syntax(Arc<fancy_regex::Error>),

	/// A built-in conversion pattern that does not parse.
	#[error(transparent)]
	Builtin(#[from] regex::Error),
}

impl From<fancy_regex::Error> for PatternError {
	fn from(error: fancy_regex::Error) -> Self {
		PatternError::Syntax(Arc::new(error))
	}
}

/// Result type alias using EmbedError.
pub type Result<T> = std::result::Result<T, EmbedError>;
