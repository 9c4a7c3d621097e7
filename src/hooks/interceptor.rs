use crate::config::types::Settings;
use crate::error::{EmbedError, Result};
use crate::hooks::host::{HookKind, ListenerId, Message, MessageHost};
use crate::rules::domains::DomainRewriter;
use crate::rules::engine::{Transformed, apply_rules};
use crate::store::rule_store::RuleStore;
use std::cell::RefCell;
use std::rc::Rc;

/// The transformation run on each outgoing message.
#[derive(Debug)]
pub struct MessagePipeline {
	rewriter: DomainRewriter,
	settings: Settings,
	store: Rc<RefCell<RuleStore>>,
}

impl MessagePipeline {
	pub fn new(settings: Settings, store: Rc<RefCell<RuleStore>>) -> Result<Self> {
		Ok(MessagePipeline {
			rewriter: DomainRewriter::new()?,
			settings,
			store,
		})
	}

	pub fn settings(&self) -> &Settings {
		&self.settings
	}

	/// Rewrite a message in place.
	///
	/// Links are always converted. User rules run too when
	/// `apply-rules-on-send` is set; a failing rule leaves the partially
	/// rewritten content in the message.
	pub fn process(&self, message: &mut Message) -> Result<()> {
		message.content = self
			.rewriter
			.rewrite_message(&message.content, &self.settings.platforms)?;

		if self.settings.apply_rules_on_send {
			let transformed = self.preview(&message.content)?;
			message.content = transformed.content;
		}

		Ok(())
	}

	/// Run only the user rules over `content`, as the live preview does.
	pub fn preview(&self, content: &str) -> Result<Transformed> {
		let store = self.store.try_borrow().map_err(|_| EmbedError::StoreBusy)?;
		Ok(apply_rules(content, store.rule_set()))
	}
}

/// Hooks a [`MessagePipeline`] into a host's send and edit events.
#[derive(Debug)]
pub struct Interceptor {
	pipeline: Rc<MessagePipeline>,
	listeners: Vec<ListenerId>,
}

impl Interceptor {
	pub fn new(pipeline: MessagePipeline) -> Self {
		Interceptor {
			pipeline: Rc::new(pipeline),
			listeners: Vec::new(),
		}
	}

	pub fn pipeline(&self) -> &MessagePipeline {
		&self.pipeline
	}

	pub fn is_running(&self) -> bool {
		!self.listeners.is_empty()
	}

	/// Register the send and edit listeners. Does nothing if already started.
	///
	/// Listener errors are logged and swallowed so a message is never held back.
	pub fn start(&mut self, host: &mut dyn MessageHost) {
		if self.is_running() {
			return;
		}

		for kind in [HookKind::Send, HookKind::Edit] {
			let pipeline = Rc::clone(&self.pipeline);
			let id = host.add_listener(
				kind,
				Box::new(move |message: &mut Message| {
					if let Err(e) = pipeline.process(message) {
						tracing::error!(hook = kind.as_str(), "failed to transform message: {e}");
					}
				}),
			);
			self.listeners.push(id);
		}
		tracing::debug!("interceptor started");
	}

	/// Remove every listener registered by [`Interceptor::start`].
	pub fn stop(&mut self, host: &mut dyn MessageHost) {
		for id in self.listeners.drain(..) {
			if !host.remove_listener(id) {
				tracing::warn!(?id, "listener was already removed");
			}
		}
		tracing::debug!("interceptor stopped");
	}
}
