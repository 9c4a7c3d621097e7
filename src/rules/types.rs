use serde::{Deserialize, Serialize};

/// A user-authored find/replace rule as stored and edited.
///
/// `find` is a literal substring for string rules and a pattern source for
/// pattern rules. An empty `only_if_includes` means the rule always applies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UserRule {
	#[serde(default)]
	pub find: String,

	/// Replacement text. The two characters `\n` stand for a newline.
	#[serde(default)]
	pub replace: String,

	#[serde(default)]
	pub only_if_includes: String,
}

impl UserRule {
	pub fn new(find: &str, replace: &str, only_if_includes: &str) -> Self {
		UserRule {
			find: find.to_string(),
			replace: replace.to_string(),
			only_if_includes: only_if_includes.to_string(),
		}
	}

	/// True when all three fields are empty (the editing sentinel).
	pub fn is_empty(&self) -> bool {
		self.find.is_empty() && self.replace.is_empty() && self.only_if_includes.is_empty()
	}

	/// The guard substring, if one is set.
	pub fn guard(&self) -> Option<&str> {
		(!self.only_if_includes.is_empty()).then_some(self.only_if_includes.as_str())
	}

	/// Set one field.
	pub fn set(&mut self, field: RuleField, value: &str) {
		let slot = match field {
			RuleField::Find => &mut self.find,
			RuleField::Replace => &mut self.replace,
			RuleField::OnlyIfIncludes => &mut self.only_if_includes,
		};
		*slot = value.to_string();
	}
}

/// Which of the two rule lists a rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
	/// Literal substring rules.
	String,
	/// Regular-expression rules.
	Pattern,
}

impl RuleKind {
	/// Storage key the list is persisted under.
	pub fn storage_key(&self) -> &'static str {
		match self {
			RuleKind::String => "string-rules",
			RuleKind::Pattern => "pattern-rules",
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			RuleKind::String => "string",
			RuleKind::Pattern => "pattern",
		}
	}
}

/// Which field of a rule an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleField {
	Find,
	Replace,
	OnlyIfIncludes,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_empty_rule() {
		assert!(UserRule::default().is_empty());
		assert!(!UserRule::new("", "", "x").is_empty());
	}

	#[test]
	fn test_guard() {
		assert_eq!(UserRule::new("a", "b", "").guard(), None);
		assert_eq!(UserRule::new("a", "b", "c").guard(), Some("c"));
	}

	#[test]
	fn test_set_field() {
		let mut rule = UserRule::default();
		rule.set(RuleField::Find, "cat");
		rule.set(RuleField::OnlyIfIncludes, "pets");
		assert_eq!(rule, UserRule::new("cat", "", "pets"));
	}

	#[test]
	fn test_storage_keys_differ() {
		assert_ne!(
			RuleKind::String.storage_key(),
			RuleKind::Pattern.storage_key()
		);
	}
}
