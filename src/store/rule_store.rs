use crate::error::{EmbedError, PatternError, Result};
use crate::rules::engine::RuleSet;
use crate::rules::types::{RuleField, RuleKind, UserRule};
use crate::store::backend::{KeyValueStore, MemoryStore};

/// Drop empty rules and end the list with exactly one empty sentinel,
/// the slot the editor appends into.
pub fn normalize(rules: &mut Vec<UserRule>) {
	rules.retain(|rule| !rule.is_empty());
	rules.push(UserRule::default());
}

/// Owns both rule lists for a session.
///
/// Every edit keeps the sentinel invariant, recompiles the rule set, and
/// writes the changed list back through the backend.
pub struct RuleStore {
	backend: Box<dyn KeyValueStore>,
	string_rules: Vec<UserRule>,
	pattern_rules: Vec<UserRule>,
	compiled: RuleSet,
}

impl std::fmt::Debug for RuleStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RuleStore")
			.field("string_rules", &self.string_rules)
			.field("pattern_rules", &self.pattern_rules)
			.finish_non_exhaustive()
	}
}

impl RuleStore {
	/// Load both lists. A missing or unreadable list starts out empty.
	pub fn load(backend: Box<dyn KeyValueStore>) -> Self {
		let string_rules = load_list(backend.as_ref(), RuleKind::String);
		let pattern_rules = load_list(backend.as_ref(), RuleKind::Pattern);
		let compiled = RuleSet::compile(&string_rules, &pattern_rules);

		RuleStore {
			backend,
			string_rules,
			pattern_rules,
			compiled,
		}
	}

	/// A store that never touches disk.
	pub fn in_memory() -> Self {
		Self::load(Box::new(MemoryStore::new()))
	}

	/// The rules of one list, sentinel included.
	pub fn rules(&self, kind: RuleKind) -> &[UserRule] {
		match kind {
			RuleKind::String => &self.string_rules,
			RuleKind::Pattern => &self.pattern_rules,
		}
	}

	/// The compiled form of both lists.
	pub fn rule_set(&self) -> &RuleSet {
		&self.compiled
	}

	/// Pattern compile errors by rule index, for showing next to the rule.
	pub fn errors(&self, kind: RuleKind) -> Vec<(usize, &PatternError)> {
		self.compiled.errors(kind)
	}

	/// Set one field of a rule. `index == len` appends a new rule.
	pub fn update(
		&mut self,
		kind: RuleKind,
		index: usize,
		field: RuleField,
		value: &str,
	) -> Result<()> {
		let mut rule = self.rules(kind).get(index).cloned().unwrap_or_default();
		rule.set(field, value);
		self.set_rule(kind, index, rule)
	}

	/// Replace a whole rule. `index == len` appends it.
	pub fn set_rule(&mut self, kind: RuleKind, index: usize, rule: UserRule) -> Result<()> {
		let list = self.list_mut(kind);
		if index > list.len() {
			return Err(EmbedError::RuleIndexOutOfRange {
				index,
				len: list.len(),
			});
		}
		if index == list.len() {
			list.push(rule);
		} else {
			list[index] = rule;
		}

		self.commit(kind)
	}

	/// Delete a rule and return it.
	pub fn remove(&mut self, kind: RuleKind, index: usize) -> Result<UserRule> {
		let list = self.list_mut(kind);
		if index >= list.len() {
			return Err(EmbedError::RuleIndexOutOfRange {
				index,
				len: list.len(),
			});
		}
		let removed = list.remove(index);

		self.commit(kind)?;
		Ok(removed)
	}

	/// Write one list back to storage.
	pub fn save(&mut self, kind: RuleKind) -> Result<()> {
		let rules = match kind {
			RuleKind::String => &self.string_rules,
			RuleKind::Pattern => &self.pattern_rules,
		};
		self.backend
			.set(kind.storage_key(), rules)
			.inspect_err(|e| tracing::error!(kind = kind.as_str(), "failed to save rules: {e}"))
	}

	fn list_mut(&mut self, kind: RuleKind) -> &mut Vec<UserRule> {
		match kind {
			RuleKind::String => &mut self.string_rules,
			RuleKind::Pattern => &mut self.pattern_rules,
		}
	}

	fn commit(&mut self, kind: RuleKind) -> Result<()> {
		normalize(self.list_mut(kind));
		self.compiled = RuleSet::compile(&self.string_rules, &self.pattern_rules);
		self.save(kind)
	}
}

fn load_list(backend: &dyn KeyValueStore, kind: RuleKind) -> Vec<UserRule> {
	let mut rules = match backend.get(kind.storage_key()) {
		Ok(Some(rules)) => rules,
		Ok(None) => Vec::new(),
		Err(e) => {
			tracing::warn!(kind = kind.as_str(), "failed to load rules, starting empty: {e}");
			Vec::new()
		}
	};
	normalize(&mut rules);
	rules
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::rules::engine::apply_rules;
	use crate::store::backend::FileStore;

	struct FailingStore;

	impl KeyValueStore for FailingStore {
		fn get(&self, _key: &str) -> Result<Option<Vec<UserRule>>> {
			Err(EmbedError::StoreBusy)
		}

		fn set(&mut self, _key: &str, _rules: &[UserRule]) -> Result<()> {
			Err(EmbedError::StoreBusy)
		}
	}

	#[test]
	fn test_normalize() {
		let mut rules = vec![
			UserRule::default(),
			UserRule::new("a", "b", ""),
			UserRule::default(),
			UserRule::new("c", "", ""),
		];
		normalize(&mut rules);
		assert_eq!(
			rules,
			vec![
				UserRule::new("a", "b", ""),
				UserRule::new("c", "", ""),
				UserRule::default(),
			]
		);
	}

	#[test]
	fn test_fresh_store_has_single_sentinel() {
		let store = RuleStore::in_memory();
		assert_eq!(store.rules(RuleKind::String), &[UserRule::default()]);
		assert_eq!(store.rules(RuleKind::Pattern), &[UserRule::default()]);
		assert!(store.rule_set().is_empty());
	}

	#[test]
	fn test_editing_sentinel_appends_new_sentinel() {
		let mut store = RuleStore::in_memory();
		store
			.update(RuleKind::String, 0, RuleField::Find, "cat")
			.unwrap();
		store
			.update(RuleKind::String, 0, RuleField::Replace, "dog")
			.unwrap();

		assert_eq!(
			store.rules(RuleKind::String),
			&[UserRule::new("cat", "dog", ""), UserRule::default()]
		);
		assert_eq!(apply_rules("cat", store.rule_set()).content, "dog");
	}

	#[test]
	fn test_clearing_rule_prunes_it() {
		let mut store = RuleStore::in_memory();
		store.update(RuleKind::String, 0, RuleField::Find, "a").unwrap();
		store.update(RuleKind::String, 1, RuleField::Find, "b").unwrap();
		store.update(RuleKind::String, 0, RuleField::Find, "").unwrap();

		assert_eq!(
			store.rules(RuleKind::String),
			&[UserRule::new("b", "", ""), UserRule::default()]
		);
	}

	#[test]
	fn test_set_rule_replaces_all_fields() {
		let mut store = RuleStore::in_memory();
		store
			.set_rule(RuleKind::String, 0, UserRule::new("a", "b", "c"))
			.unwrap();
		store
			.set_rule(RuleKind::String, 0, UserRule::new("x", "", ""))
			.unwrap();
		assert_eq!(
			store.rules(RuleKind::String),
			&[UserRule::new("x", "", ""), UserRule::default()]
		);
	}

	#[test]
	fn test_update_out_of_range() {
		let mut store = RuleStore::in_memory();
		let result = store.update(RuleKind::Pattern, 5, RuleField::Find, "x");
		match result.unwrap_err() {
			EmbedError::RuleIndexOutOfRange { index, len } => {
				assert_eq!(index, 5);
				assert_eq!(len, 1);
			}
			other => panic!("Expected RuleIndexOutOfRange, got {other:?}"),
		}
	}

	#[test]
	fn test_remove_rule() {
		let mut store = RuleStore::in_memory();
		store.update(RuleKind::Pattern, 0, RuleField::Find, "a").unwrap();
		store.update(RuleKind::Pattern, 1, RuleField::Find, "b").unwrap();

		let removed = store.remove(RuleKind::Pattern, 0).unwrap();
		assert_eq!(removed.find, "a");
		assert_eq!(
			store.rules(RuleKind::Pattern),
			&[UserRule::new("b", "", ""), UserRule::default()]
		);

		// Removing the sentinel just puts it back.
		store.remove(RuleKind::Pattern, 1).unwrap();
		assert_eq!(store.rules(RuleKind::Pattern).len(), 2);
	}

	#[test]
	fn test_compile_errors_reported_per_rule() {
		let mut store = RuleStore::in_memory();
		store.update(RuleKind::Pattern, 0, RuleField::Find, "ok").unwrap();
		store
			.update(RuleKind::Pattern, 1, RuleField::Find, "[bad")
			.unwrap();

		let errors = store.errors(RuleKind::Pattern);
		assert_eq!(errors.len(), 1);
		assert_eq!(errors[0].0, 1);
	}

	#[test]
	fn test_edits_persist_through_file_store() {
		let temp_dir = tempfile::tempdir().unwrap();
		{
			let mut store = RuleStore::load(Box::new(FileStore::new(temp_dir.path())));
			store
				.update(RuleKind::String, 0, RuleField::Find, "teh")
				.unwrap();
			store
				.update(RuleKind::String, 0, RuleField::Replace, "the")
				.unwrap();
		}

		let store = RuleStore::load(Box::new(FileStore::new(temp_dir.path())));
		assert_eq!(
			store.rules(RuleKind::String),
			&[UserRule::new("teh", "the", ""), UserRule::default()]
		);
	}

	#[test]
	fn test_unreadable_backend_falls_back_to_defaults() {
		let mut store = RuleStore::load(Box::new(FailingStore));
		assert_eq!(store.rules(RuleKind::String), &[UserRule::default()]);

		// The edit stays in memory even though saving fails.
		let result = store.update(RuleKind::String, 0, RuleField::Find, "x");
		assert!(result.is_err());
		assert_eq!(store.rules(RuleKind::String)[0].find, "x");
	}
}
