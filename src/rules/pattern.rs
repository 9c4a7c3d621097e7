use crate::error::PatternError;
use fancy_regex::{Captures, Regex};

/// Flag characters recognised in the `/body/flags` form.
const KNOWN_FLAGS: &str = "dgimsuvy";

/// A pattern rule's find string split into body and flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSource {
	/// The pattern itself.
	pub body: String,

	/// Deduplicated flag characters, in first-seen order.
	pub flags: String,
}

impl PatternSource {
	/// Split a find string written either as `/body/flags` or as a bare body.
	///
	/// A bare body gets the `g` flag.
	pub fn parse(find: &str) -> Self {
		if let Some(rest) = find.strip_prefix('/')
			&& let Some(end) = rest.rfind('/')
			&& end > 0
		{
			let flags = &rest[end + 1..];
			if flags.chars().all(|c| KNOWN_FLAGS.contains(c)) {
				return PatternSource {
					body: rest[..end].to_string(),
					flags: dedup_flags(flags),
				};
			}
		}

		PatternSource {
			body: find.to_string(),
			flags: "g".to_string(),
		}
	}

	/// Whether the given flag is set.
	pub fn has_flag(&self, flag: char) -> bool {
		self.flags.contains(flag)
	}
}

/// Collapse repeated flags. The first occurrence wins and order is kept.
pub fn dedup_flags(flags: &str) -> String {
	let mut seen = String::with_capacity(flags.len());
	for flag in flags.chars() {
		if !seen.contains(flag) {
			seen.push(flag);
		}
	}
	seen
}

/// A compiled pattern rule.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
	/// The compiled regex.
	pub regex: Regex,

	/// Replace every match rather than only the first.
	pub global: bool,
}

impl CompiledPattern {
	/// Compile a parsed find string.
	///
	/// `i`, `m` and `s` become inline flags. `d`, `g`, `u` and `v` do not
	/// change what a replace produces, so they are accepted and ignored.
	pub fn compile(source: &PatternSource) -> Result<Self, PatternError> {
		let mut inline = String::new();
		for flag in source.flags.chars() {
			match flag {
				'd' | 'g' | 'u' | 'v' => {}
				'i' | 'm' | 's' => inline.push(flag),
				other => return Err(PatternError::UnsupportedFlag { flag: other }),
			}
		}

		let pattern = if inline.is_empty() {
			source.body.clone()
		} else {
			format!("(?{inline}){}", source.body)
		};

		Ok(CompiledPattern {
			regex: Regex::new(&pattern)?,
			global: source.has_flag('g'),
		})
	}

	/// Parse and compile a find string in one step.
	pub fn from_find(find: &str) -> Result<Self, PatternError> {
		Self::compile(&PatternSource::parse(find))
	}

	/// Replace matches in `content` using `template`.
	///
	/// Fails only when the backtracking matcher gives up on the input.
	pub fn replace(&self, content: &str, template: &Template) -> Result<String, PatternError> {
		let limit = if self.global { 0 } else { 1 };
		let replaced = self.regex.try_replacen(content, limit, |caps: &Captures| {
			template.expand(caps, content)
		})?;
		Ok(replaced.into_owned())
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TemplatePart {
	Literal(String),
	Match,
	Before,
	After,
	Group(usize),
	Named(String),
}

/// A replacement string parsed against the pattern it will be used with.
///
/// Understands `$$`, `$&`, `` $` ``, `$'`, `$1`..`$99` and `$<name>`.
/// Anything else after a `$` is kept literally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
	parts: Vec<TemplatePart>,
}

impl Template {
	/// Parse `template` for use with `regex`.
	pub fn parse(template: &str, regex: &Regex) -> Self {
		let groups = regex.captures_len() - 1;
		let has_names = regex.capture_names().flatten().next().is_some();

		let mut parts = Vec::new();
		let mut literal = String::new();
		let mut rest = template;

		while let Some(pos) = rest.find('$') {
			literal.push_str(&rest[..pos]);
			let after = &rest[pos + 1..];

			if let Some(stripped) = after.strip_prefix('$') {
				literal.push('$');
				rest = stripped;
				continue;
			}

			match parse_reference(after, groups, has_names) {
				Some((part, consumed)) => {
					if !literal.is_empty() {
						parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
					}
					parts.push(part);
					rest = &after[consumed..];
				}
				None => {
					literal.push('$');
					rest = after;
				}
			}
		}

		literal.push_str(rest);
		if !literal.is_empty() {
			parts.push(TemplatePart::Literal(literal));
		}

		Template { parts }
	}

	/// Build the replacement for one match found in `haystack`.
	pub fn expand(&self, caps: &Captures, haystack: &str) -> String {
		let (start, end) = caps.get(0).map_or((0, 0), |m| (m.start(), m.end()));
		let mut out = String::new();
		for part in &self.parts {
			match part {
				TemplatePart::Literal(text) => out.push_str(text),
				TemplatePart::Match => out.push_str(&haystack[start..end]),
				TemplatePart::Before => out.push_str(&haystack[..start]),
				TemplatePart::After => out.push_str(&haystack[end..]),
				TemplatePart::Group(index) => {
					if let Some(m) = caps.get(*index) {
						out.push_str(m.as_str());
					}
				}
				TemplatePart::Named(name) => {
					if let Some(m) = caps.name(name) {
						out.push_str(m.as_str());
					}
				}
			}
		}
		out
	}
}

/// Parse the reference following a `$`. Returns the part and how many bytes it used.
fn parse_reference(after: &str, groups: usize, has_names: bool) -> Option<(TemplatePart, usize)> {
	let bytes = after.as_bytes();
	match *bytes.first()? {
		b'&' => Some((TemplatePart::Match, 1)),
		b'`' => Some((TemplatePart::Before, 1)),
		b'\'' => Some((TemplatePart::After, 1)),
		b'<' if has_names => {
			let end = after[1..].find('>')?;
			Some((TemplatePart::Named(after[1..1 + end].to_string()), end + 2))
		}
		digit if digit.is_ascii_digit() => {
			let first = usize::from(digit - b'0');
			if let Some(second) = bytes.get(1).filter(|b| b.is_ascii_digit()) {
				let both = first * 10 + usize::from(second - b'0');
				if (1..=groups).contains(&both) {
					return Some((TemplatePart::Group(both), 2));
				}
			}
			(1..=groups)
				.contains(&first)
				.then_some((TemplatePart::Group(first), 1))
		}
		_ => None,
	}
}
