//! Message interception for embedfix.
//!
//! This module handles:
//! - The host's send and edit hooks
//! - Registering and unregistering the rewrite listeners
//! - Running link conversion (and optionally user rules) on each message

pub mod host;
pub mod interceptor;

pub use host::{HookKind, Listener, ListenerId, LocalHost, Message, MessageHost};
pub use interceptor::{Interceptor, MessagePipeline};
