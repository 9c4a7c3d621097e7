use serde::Deserialize;
use std::path::PathBuf;

/// A social platform whose links can be rewritten to an embed-friendly mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
	Twitter,
	TikTok,
	Instagram,
	Bsky,
	Threads,
	Reddit,
	Pixiv,
	DeviantArt,
}

impl Platform {
	/// All platforms, in conversion table order.
	pub const ALL: [Platform; 8] = [
		Platform::Twitter,
		Platform::TikTok,
		Platform::Instagram,
		Platform::Bsky,
		Platform::Threads,
		Platform::Reddit,
		Platform::Pixiv,
		Platform::DeviantArt,
	];

	/// The settings key for this platform's toggle.
	pub fn as_str(&self) -> &'static str {
		match self {
			Platform::Twitter => "twitter",
			Platform::TikTok => "tiktok",
			Platform::Instagram => "instagram",
			Platform::Bsky => "bsky",
			Platform::Threads => "threads",
			Platform::Reddit => "reddit",
			Platform::Pixiv => "pixiv",
			Platform::DeviantArt => "deviantart",
		}
	}
}

fn enabled() -> bool {
	true
}

/// Per-platform conversion toggles. Every platform is enabled unless turned off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformToggles {
	#[serde(default = "enabled")]
	pub twitter: bool,
	#[serde(default = "enabled")]
	pub tiktok: bool,
	#[serde(default = "enabled")]
	pub instagram: bool,
	#[serde(default = "enabled")]
	pub bsky: bool,
	#[serde(default = "enabled")]
	pub threads: bool,
	#[serde(default = "enabled")]
	pub reddit: bool,
	#[serde(default = "enabled")]
	pub pixiv: bool,
	#[serde(default = "enabled")]
	pub deviantart: bool,
}

impl Default for PlatformToggles {
	fn default() -> Self {
		PlatformToggles {
			twitter: true,
			tiktok: true,
			instagram: true,
			bsky: true,
			threads: true,
			reddit: true,
			pixiv: true,
			deviantart: true,
		}
	}
}

impl PlatformToggles {
	/// Whether conversion is enabled for the given platform.
	pub fn is_enabled(&self, platform: Platform) -> bool {
		match platform {
			Platform::Twitter => self.twitter,
			Platform::TikTok => self.tiktok,
			Platform::Instagram => self.instagram,
			Platform::Bsky => self.bsky,
			Platform::Threads => self.threads,
			Platform::Reddit => self.reddit,
			Platform::Pixiv => self.pixiv,
			Platform::DeviantArt => self.deviantart,
		}
	}

	/// Turn a single platform's conversion on or off.
	pub fn set(&mut self, platform: Platform, value: bool) {
		let slot = match platform {
			Platform::Twitter => &mut self.twitter,
			Platform::TikTok => &mut self.tiktok,
			Platform::Instagram => &mut self.instagram,
			Platform::Bsky => &mut self.bsky,
			Platform::Threads => &mut self.threads,
			Platform::Reddit => &mut self.reddit,
			Platform::Pixiv => &mut self.pixiv,
			Platform::DeviantArt => &mut self.deviantart,
		};
		*slot = value;
	}
}

/// Top-level settings from an `embedfix` TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Settings {
	/// Which platforms get their links converted.
	#[serde(default)]
	pub platforms: PlatformToggles,

	/// Also run the user's find/replace rules on every sent or edited message.
	/// Off by default: rules only drive the preview.
	#[serde(default)]
	pub apply_rules_on_send: bool,

	/// Directory holding the persisted rule lists.
	#[serde(default)]
	pub store_dir: Option<PathBuf>,
}

/// Settings together with the file they came from, if any.
#[derive(Debug, Clone, Default)]
pub struct LoadedSettings {
	/// The parsed settings.
	pub settings: Settings,

	/// The path these settings were loaded from. `None` means built-in defaults.
	pub path: Option<PathBuf>,
}
