//! Embedfix - rewrites social-media links in outgoing messages to embed-friendly
//! mirrors and applies personal find/replace rules.
//!
//! This library provides the core functionality for embedfix, including:
//! - Settings parsing and discovery
//! - Link conversion and user rule application
//! - Rule persistence with the editing invariants
//! - Send and edit hooks for a host application
//!
//! # Example
//!
//! ```
//! use embedfix_cli::config::PlatformToggles;
//! use embedfix_cli::rules::DomainRewriter;
//!
//! let rewriter = DomainRewriter::new().unwrap();
//! let out = rewriter
//!     .rewrite_message("check https://x.com/foo/bar?x=1 out", &PlatformToggles::default())
//!     .unwrap();
//! assert_eq!(out, "check https://fxtwitter.com/foo/bar?x=1 out");
//! ```

pub mod config;
pub mod error;
pub mod hooks;
pub mod rules;
pub mod store;

pub use error::{EmbedError, PatternError, Result};
