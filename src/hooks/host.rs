/// An outgoing chat message as handed to listeners.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
	/// The text content. Listeners rewrite it in place.
	pub content: String,
}

impl Message {
	pub fn new(content: impl Into<String>) -> Self {
		Message {
			content: content.into(),
		}
	}
}

/// The point at which a listener is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
	/// Before a new message is sent.
	Send,
	/// Before an edited message is saved.
	Edit,
}

impl HookKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			HookKind::Send => "send",
			HookKind::Edit => "edit",
		}
	}
}

/// A callback run on every outgoing message of one [`HookKind`].
pub type Listener = Box<dyn FnMut(&mut Message)>;

/// Handle returned when a listener is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// The message hooks a host application offers.
pub trait MessageHost {
	/// Register a listener. It runs until removed.
	fn add_listener(&mut self, kind: HookKind, listener: Listener) -> ListenerId;

	/// Remove a listener. Returns false when `id` was not registered.
	fn remove_listener(&mut self, id: ListenerId) -> bool;
}

/// An in-process host that runs listeners in registration order.
#[derive(Default)]
pub struct LocalHost {
	next_id: u64,
	listeners: Vec<(ListenerId, HookKind, Listener)>,
}

impl LocalHost {
	pub fn new() -> Self {
		Self::default()
	}

	/// Run every listener registered for `kind` over `message`.
	pub fn dispatch(&mut self, kind: HookKind, message: &mut Message) {
		for (_, _, listener) in self
			.listeners
			.iter_mut()
			.filter(|(_, listener_kind, _)| *listener_kind == kind)
		{
			listener(&mut *message);
		}
	}

	/// Number of registered listeners, across all kinds.
	pub fn listener_count(&self) -> usize {
		self.listeners.len()
	}
}

impl MessageHost for LocalHost {
	fn add_listener(&mut self, kind: HookKind, listener: Listener) -> ListenerId {
		let id = ListenerId(self.next_id);
		self.next_id += 1;
		self.listeners.push((id, kind, listener));
		id
	}

	fn remove_listener(&mut self, id: ListenerId) -> bool {
		let before = self.listeners.len();
		self.listeners.retain(|(listener_id, _, _)| *listener_id != id);
		self.listeners.len() != before
	}
}
