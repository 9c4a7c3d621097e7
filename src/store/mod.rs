//! Rule persistence for embedfix.
//!
//! This module handles:
//! - The key-value storage contract and its file and in-memory backends
//! - The rule editing workflow and its trailing-sentinel invariant

pub mod backend;
pub mod rule_store;

pub use backend::{FileStore, KeyValueStore, MemoryStore};
pub use rule_store::{RuleStore, normalize};
