use crate::error::{EmbedError, PatternError};
use crate::rules::pattern::{CompiledPattern, Template};
use crate::rules::types::{RuleKind, UserRule};

/// Turn the two-character escape `\n` into a real newline.
pub fn expand_newlines(replace: &str) -> String {
	replace.replace("\\n", "\n")
}

/// A user rule compiled into the form the engine applies.
#[derive(Debug, Clone)]
pub enum CompiledRule {
	/// Literal substring replacement. `replace` is inserted verbatim, with no
	/// `$` template expansion.
	Literal { find: String, replace: String },

	/// Regex replacement.
	Pattern {
		pattern: CompiledPattern,
		template: Template,
	},
}

impl CompiledRule {
	/// Compile a rule from the given list. Only pattern rules can fail.
	pub fn compile(kind: RuleKind, rule: &UserRule) -> Result<Self, PatternError> {
		let replace = expand_newlines(&rule.replace);
		match kind {
			RuleKind::String => Ok(CompiledRule::Literal {
				find: rule.find.clone(),
				replace,
			}),
			RuleKind::Pattern => {
				let pattern = CompiledPattern::from_find(&rule.find)?;
				let template = Template::parse(&replace, &pattern.regex);
				Ok(CompiledRule::Pattern { pattern, template })
			}
		}
	}

	/// Apply this rule to `content`.
	pub fn apply(&self, content: &str) -> Result<String, PatternError> {
		match self {
			CompiledRule::Literal { find, replace } => {
				// Padding lets a find string with a leading or trailing space
				// match at the very start or end of the message.
				let padded = format!(" {content} ");
				Ok(strip_single_whitespace(&padded.replace(find.as_str(), replace)).to_string())
			}
			CompiledRule::Pattern { pattern, template } => pattern.replace(content, template),
		}
	}
}

/// Remove at most one whitespace character from each end.
fn strip_single_whitespace(s: &str) -> &str {
	let mut chars = s.chars();
	let s = match chars.next() {
		Some(c) if c.is_whitespace() => chars.as_str(),
		_ => s,
	};
	let mut chars = s.chars();
	match chars.next_back() {
		Some(c) if c.is_whitespace() => chars.as_str(),
		_ => s,
	}
}

/// One rule of a [`RuleSet`], with its compile result.
#[derive(Debug, Clone)]
pub struct RuleEntry {
	/// The list the rule came from.
	pub kind: RuleKind,

	/// Position in that list.
	pub index: usize,

	/// The original find string, for error reporting.
	pub find: String,

	/// Guard substring; the rule is skipped when content lacks it.
	pub guard: Option<String>,

	/// The compiled rule, or why it could not be compiled.
	pub compiled: Result<CompiledRule, PatternError>,
}

/// Both rule lists compiled and flattened into application order:
/// every string rule, then every pattern rule.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
	entries: Vec<RuleEntry>,
}

impl RuleSet {
	/// Compile both lists. Rules with an empty find string are left out.
	pub fn compile(string_rules: &[UserRule], pattern_rules: &[UserRule]) -> Self {
		let lists = [
			(RuleKind::String, string_rules),
			(RuleKind::Pattern, pattern_rules),
		];

		let entries = lists
			.into_iter()
			.flat_map(|(kind, rules)| {
				rules
					.iter()
					.enumerate()
					.filter(|(_, rule)| !rule.find.is_empty())
					.map(move |(index, rule)| RuleEntry {
						kind,
						index,
						find: rule.find.clone(),
						guard: rule.guard().map(str::to_string),
						compiled: CompiledRule::compile(kind, rule),
					})
			})
			.collect();

		RuleSet { entries }
	}

	pub fn entries(&self) -> &[RuleEntry] {
		&self.entries
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Compile errors for one list, keyed by position in that list.
	pub fn errors(&self, kind: RuleKind) -> Vec<(usize, &PatternError)> {
		self.entries
			.iter()
			.filter(|entry| entry.kind == kind)
			.filter_map(|entry| match &entry.compiled {
				Ok(_) => None,
				Err(error) => Some((entry.index, error)),
			})
			.collect()
	}
}

/// Result of running the rule engine over a message.
#[derive(Debug)]
pub struct Transformed {
	/// The transformed content. Partial when `error` is set.
	pub content: String,

	/// The error that stopped rule application, if any.
	pub error: Option<EmbedError>,
}

/// Apply every rule in `rules` to `content`, in order.
///
/// The first rule that cannot be applied stops processing. The content as
/// transformed up to that point is returned together with the error, and the
/// final trim is skipped.
pub fn apply_rules(content: &str, rules: &RuleSet) -> Transformed {
	if content.is_empty() {
		return Transformed {
			content: String::new(),
			error: None,
		};
	}

	let mut current = content.to_string();
	for entry in &rules.entries {
		if let Some(guard) = entry.guard.as_deref()
			&& !current.contains(guard)
		{
			continue;
		}

		let applied = match &entry.compiled {
			Ok(rule) => rule.apply(&current),
			Err(source) => Err(source.clone()),
		};

		match applied {
			Ok(next) => current = next,
			Err(source) => {
				tracing::error!(
					kind = entry.kind.as_str(),
					index = entry.index,
					reason = %source,
					"Invalid pattern rule: {}, skipping remaining rules",
					entry.find
				);
				let error = EmbedError::InvalidPattern {
					pattern: entry.find.clone(),
					source,
				};
				return Transformed {
					content: current,
					error: Some(error),
				};
			}
		}
	}

	Transformed {
		content: current.trim().to_string(),
		error: None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn run(string_rules: &[UserRule], pattern_rules: &[UserRule], content: &str) -> Transformed {
		apply_rules(content, &RuleSet::compile(string_rules, pattern_rules))
	}

	#[test]
	fn test_literal_whole_message() {
		let out = run(&[UserRule::new("cat", "dog", "")], &[], "cat");
		assert_eq!(out.content, "dog");
		assert!(out.error.is_none());
	}

	#[test]
	fn test_literal_is_global() {
		let out = run(&[UserRule::new("cat", "dog", "")], &[], "cat and cat");
		assert_eq!(out.content, "dog and dog");
	}

	#[test]
	fn test_literal_matches_message_boundaries() {
		let rules = [UserRule::new(" hi", " hello", "")];
		assert_eq!(run(&rules, &[], "hi there").content, "hello there");
		// No space before "hi" mid-word, so no match.
		assert_eq!(run(&rules, &[], "chi").content, "chi");

		let rules = [UserRule::new("bye ", "goodbye ", "")];
		assert_eq!(run(&rules, &[], "ok bye").content, "ok goodbye");
	}

	#[test]
	fn test_literal_strips_only_one_padding_char() {
		// The pass itself keeps inner spacing; the final trim removes the rest.
		let rule = CompiledRule::compile(RuleKind::String, &UserRule::new("x", "y", "")).unwrap();
		assert_eq!(rule.apply("  x  ").unwrap(), "  y  ");
	}

	#[test]
	fn test_literal_does_not_interpret_regex() {
		let out = run(&[UserRule::new("a.c", "X", "")], &[], "abc a.c");
		assert_eq!(out.content, "abc X");
	}

	#[test]
	fn test_newline_escape() {
		let out = run(&[UserRule::new("|", "\\n", "")], &[], "a|b");
		assert_eq!(out.content, "a\nb");

		let out = run(&[], &[UserRule::new("/,/g", "\\n", "")], "a,b");
		assert_eq!(out.content, "a\nb");
	}

	#[test]
	fn test_guard_blocks_and_allows() {
		let rules = [UserRule::new("cat", "dog", "X")];
		assert_eq!(run(&rules, &[], "cat").content, "cat");
		assert_eq!(run(&rules, &[], "cat X").content, "dog X");
	}

	#[test]
	fn test_guard_sees_cumulative_content() {
		let rules = [
			UserRule::new("a", "X", ""),
			UserRule::new("b", "c", "X"),
		];
		assert_eq!(run(&rules, &[], "a b").content, "X c");
	}

	#[test]
	fn test_empty_find_skipped() {
		let rules = [UserRule::new("", "oops", ""), UserRule::default()];
		assert_eq!(run(&rules, &rules, "hello").content, "hello");
	}

	#[test]
	fn test_pattern_case_insensitive_global() {
		let out = run(&[], &[UserRule::new("/foo/gi", "bar", "")], "Foo fOO");
		assert_eq!(out.content, "bar bar");
	}

	#[test]
	fn test_pattern_rules_see_string_rule_output() {
		let out = run(
			&[UserRule::new("cat", "dog", "")],
			&[UserRule::new("d(o)g", "d$1$1g", "")],
			"cat",
		);
		assert_eq!(out.content, "doog");
	}

	#[test]
	fn test_final_trim() {
		let out = run(&[], &[UserRule::new("x", "", "")], "  x hi x  ");
		assert_eq!(out.content, "hi");
	}

	#[test]
	fn test_invalid_pattern_returns_partial() {
		let out = run(
			&[UserRule::new("cat", "dog", "")],
			&[
				UserRule::new("dog", "wolf", ""),
				UserRule::new("[broken", "x", ""),
				UserRule::new("wolf", "fox", ""),
			],
			"cat",
		);
		assert_eq!(out.content, "wolf");
		match out.error {
			Some(EmbedError::InvalidPattern { pattern, .. }) => assert_eq!(pattern, "[broken"),
			other => panic!("Expected InvalidPattern, got {other:?}"),
		}
	}

	#[test]
	fn test_invalid_pattern_behind_unmet_guard_is_skipped() {
		let out = run(&[], &[UserRule::new("[broken", "x", "never")], "cat");
		assert_eq!(out.content, "cat");
		assert!(out.error.is_none());
	}

	#[test]
	fn test_empty_content_short_circuits() {
		let out = run(&[UserRule::new(" ", "x", "")], &[], "");
		assert_eq!(out.content, "");
		assert!(out.error.is_none());
	}

	#[test]
	fn test_literal_replace_is_verbatim() {
		let out = run(&[UserRule::new("cost", "$& $$1", "")], &[], "cost");
		assert_eq!(out.content, "$& $$1");
	}

	#[test]
	fn test_flags_without_replace_effect_do_not_abort() {
		let out = run(
			&[],
			&[UserRule::new("/foo/gd", "x", ""), UserRule::new("bar", "y", "")],
			"foo bar",
		);
		assert_eq!(out.content, "x y");
		assert!(out.error.is_none());

		let out = run(&[], &[UserRule::new("/[a-z]+/v", "w", "")], "ab cd");
		assert_eq!(out.content, "w cd");
	}

	#[test]
	fn test_sticky_flag_aborts() {
		let out = run(
			&[],
			&[UserRule::new("/foo/y", "x", ""), UserRule::new("bar", "y", "")],
			"foo bar",
		);
		assert_eq!(out.content, "foo bar");
		assert!(matches!(
			out.error,
			Some(EmbedError::InvalidPattern {
				source: PatternError::UnsupportedFlag { flag: 'y' },
				..
			})
		));
	}

	#[test]
	fn test_backreference_rule() {
		let out = run(&[], &[UserRule::new(r"\b(\w+) \1\b", "$1", "")], "the the cat");
		assert_eq!(out.content, "the cat");
		assert!(out.error.is_none());
	}

	#[test]
	fn test_lookahead_rule() {
		let out = run(&[], &[UserRule::new(r"\d+(?=usd)", "N", "")], "price 5usd");
		assert_eq!(out.content, "price Nusd");
		assert!(out.error.is_none());
	}

	#[test]
	fn test_errors_by_kind() {
		let set = RuleSet::compile(
			&[UserRule::new("[", "x", "")],
			&[UserRule::new("ok", "x", ""), UserRule::new("[", "x", "")],
		);
		assert!(set.errors(RuleKind::String).is_empty());
		let errors = set.errors(RuleKind::Pattern);
		assert_eq!(errors.len(), 1);
		assert_eq!(errors[0].0, 1);
	}
}
