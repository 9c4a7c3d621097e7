//! Message transformation for embedfix.
//!
//! This module handles:
//! - Rewriting social-media links to embed-friendly mirrors
//! - Compiling user find strings into patterns
//! - Applying user find/replace rules in order

pub mod domains;
pub mod engine;
pub mod pattern;
pub mod types;

pub use domains::{ConversionRule, DomainRewriter};
pub use engine::{CompiledRule, RuleEntry, RuleSet, Transformed, apply_rules, expand_newlines};
pub use pattern::{CompiledPattern, PatternSource, Template, dedup_flags};
pub use types::{RuleField, RuleKind, UserRule};
