use crate::config::types::{Platform, PlatformToggles};
use crate::error::{EmbedError, PatternError, Result};
use regex::Regex;
use std::sync::OnceLock;

/// Source domain pattern and mirror domain, per platform, in table order.
static CONVERSIONS: &[(Platform, &str, &str)] = &[
	(
		Platform::Twitter,
		r"https://(?:www\.)?(?:twitter|x)\.com\b",
		"https://fxtwitter.com",
	),
	(
		Platform::TikTok,
		r"https://www\.tiktok\.com\b",
		"https://www.vxtiktok.com",
	),
	(
		Platform::Instagram,
		r"https://www\.instagram\.com\b",
		"https://www.ddinstagram.com",
	),
	(Platform::Bsky, r"https://bsky\.app\b", "https://bsyy.app"),
	(
		Platform::Threads,
		r"https://(?:www\.)?threads\.net\b",
		"https://www.vxthreads.net",
	),
	(
		Platform::Reddit,
		r"https://(?:www\.|new\.)?reddit\.com\b",
		"https://www.rxddit.com",
	),
	(
		Platform::Pixiv,
		r"https://(?:www\.)?pixiv\.net\b",
		"https://phixiv.net",
	),
	(
		Platform::DeviantArt,
		r"https://(?:www\.)?deviantart\.com\b",
		"https://www.fxdeviantart.com",
	),
];

/// A URL starting with a scheme, running over non-space and non-`<`
/// characters, not ending in closing punctuation.
const URL_TOKEN_PATTERN: &str = r#"https?://[^\s<]*[^<.,:;"')\]\s]"#;

static URL_TOKEN_REGEX: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();

fn url_token_regex() -> Result<&'static Regex> {
	URL_TOKEN_REGEX
		.get_or_init(|| Regex::new(URL_TOKEN_PATTERN))
		.as_ref()
		.map_err(|source| EmbedError::InvalidPattern {
			pattern: URL_TOKEN_PATTERN.to_string(),
			source: PatternError::Builtin(source.clone()),
		})
}

/// One row of the conversion table.
#[derive(Debug, Clone)]
pub struct ConversionRule {
	/// The platform whose toggle gates this rule.
	pub platform: Platform,

	/// Matches the source domain, scheme included.
	pub pattern: Regex,

	/// Scheme and mirror domain substituted for each match.
	pub replacement: String,
}

impl ConversionRule {
	/// Compile a conversion rule.
	pub fn new(platform: Platform, pattern: &str, replacement: &str) -> Result<Self> {
		let pattern = Regex::new(pattern).map_err(|source| EmbedError::InvalidPattern {
			pattern: pattern.to_string(),
			source: PatternError::Builtin(source),
		})?;

		Ok(ConversionRule {
			platform,
			pattern,
			replacement: replacement.to_string(),
		})
	}
}

/// Rewrites social-media links to their embed-friendly mirrors.
#[derive(Debug, Clone)]
pub struct DomainRewriter {
	rules: Vec<ConversionRule>,
}

impl DomainRewriter {
	/// Build the rewriter from the built-in conversion table.
	pub fn new() -> Result<Self> {
		let rules = CONVERSIONS
			.iter()
			.map(|(platform, pattern, replacement)| {
				ConversionRule::new(*platform, pattern, replacement)
			})
			.collect::<Result<Vec<_>>>()?;
		Ok(DomainRewriter { rules })
	}

	/// Build a rewriter from a custom table. Order decides which rule wins.
	pub fn with_rules(rules: Vec<ConversionRule>) -> Self {
		DomainRewriter { rules }
	}

	pub fn rules(&self) -> &[ConversionRule] {
		&self.rules
	}

	/// Find the first enabled rule matching `token`.
	pub fn find_rule<'a>(
		&'a self,
		token: &str,
		toggles: &PlatformToggles,
	) -> Option<&'a ConversionRule> {
		self.rules
			.iter()
			.filter(|rule| toggles.is_enabled(rule.platform))
			.find(|rule| rule.pattern.is_match(token))
	}

	/// Rewrite a single URL token. Only the first enabled matching rule fires.
	pub fn rewrite_url(&self, token: &str, toggles: &PlatformToggles) -> String {
		match self.find_rule(token, toggles) {
			Some(rule) => {
				let rewritten = rule
					.pattern
					.replace_all(token, rule.replacement.as_str())
					.into_owned();
				tracing::debug!(
					platform = rule.platform.as_str(),
					from = token,
					to = %rewritten,
					"rewrote link"
				);
				rewritten
			}
			None => token.to_string(),
		}
	}

	/// Rewrite every URL in `content`, leaving all other text untouched.
	pub fn rewrite_message(&self, content: &str, toggles: &PlatformToggles) -> Result<String> {
		if !content.contains("http://") && !content.contains("https://") {
			return Ok(content.to_string());
		}

		let regex = url_token_regex()?;
		Ok(regex
			.replace_all(content, |caps: &regex::Captures| {
				caps.get(0)
					.map(|m| self.rewrite_url(m.as_str(), toggles))
					.unwrap_or_default()
			})
			.into_owned())
	}
}
