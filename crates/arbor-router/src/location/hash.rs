//! Hash-fragment location adaptor.

use super::{ChangeListener, LocationAction, LocationAdaptor, LocationChange};
use parking_lot::Mutex;
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Characters escaped when writing a path into the hash. `%` is kept so
/// already encoded query components survive unchanged.
const FRAGMENT: &AsciiSet = &CONTROLS
	.add(b' ')
	.add(b'"')
	.add(b'<')
	.add(b'>')
	.add(b'[')
	.add(b'\\')
	.add(b']')
	.add(b'^')
	.add(b'`')
	.add(b'{')
	.add(b'|')
	.add(b'}');

fn encode_fragment(path: &str) -> String {
	utf8_percent_encode(path, FRAGMENT).to_string()
}

/// Decodes the path part of a raw fragment; the query keeps its escapes.
fn decode_fragment(raw: &str) -> String {
	let (path, query) = match raw.split_once('?') {
		Some((path, query)) => (path, Some(query)),
		None => (raw, None),
	};
	let mut decoded = percent_decode_str(path).decode_utf8_lossy().into_owned();
	if let Some(query) = query {
		decoded.push('?');
		decoded.push_str(query);
	}
	decoded
}

/// Platform access to the URL fragment, without the leading `#`.
pub trait HashPrimitive: Send {
	fn hash(&self) -> String;

	/// Sets the fragment, adding a history entry.
	fn set_hash(&mut self, hash: &str);

	/// Sets the fragment in place.
	fn replace_hash(&mut self, hash: &str);

	/// Steps back one history entry. Returns `false` at the start of history.
	fn back(&mut self) -> bool;

	/// Whether mutating the fragment makes the platform call
	/// [`LocationAdaptor::handle_platform_change`] on its own.
	fn emits_change_events(&self) -> bool {
		true
	}
}

/// [`LocationAdaptor`] that stores the path in the URL hash.
pub struct HashLocation<P> {
	primitive: P,
	pending_action: Option<LocationAction>,
	listener: Option<ChangeListener>,
}

impl<P: HashPrimitive> HashLocation<P> {
	pub fn new(primitive: P) -> Self {
		Self {
			primitive,
			pending_action: None,
			listener: None,
		}
	}

	pub fn primitive(&self) -> &P {
		&self.primitive
	}

	/// Rewrites a fragment without a leading `/` in place.
	///
	/// Returns `true` when the fragment was already normalized.
	pub fn ensure_slash(&mut self) -> bool {
		let raw = self.primitive.hash();
		if raw.starts_with('/') {
			return true;
		}
		trace!(hash = %raw, "normalizing hash without leading slash");
		self.primitive.replace_hash(&format!("/{}", raw));
		false
	}

	/// Reports the current fragment to the listener.
	pub fn handle_hash_change(&mut self) {
		if !self.ensure_slash() && self.primitive.emits_change_events() {
			// The normalizing replace raises its own change.
			return;
		}

		let change = LocationChange {
			path: self.current_path(),
			action: self.pending_action.take().unwrap_or(LocationAction::Pop),
		};
		trace!(path = %change.path, action = ?change.action, "hash changed");
		if let Some(listener) = &self.listener {
			listener(&change);
		}
	}

	fn write(&mut self, path: &str, action: LocationAction) {
		let encoded = encode_fragment(path);
		if encoded == self.primitive.hash() {
			return;
		}

		self.pending_action = Some(action);
		match action {
			LocationAction::Replace => self.primitive.replace_hash(&encoded),
			_ => self.primitive.set_hash(&encoded),
		}
		self.after_mutation();
	}

	fn after_mutation(&mut self) {
		if !self.primitive.emits_change_events() {
			self.handle_hash_change();
		}
	}
}

impl<P: HashPrimitive> LocationAdaptor for HashLocation<P> {
	fn push(&mut self, path: &str) {
		self.write(path, LocationAction::Push);
	}

	fn replace(&mut self, path: &str) {
		self.write(path, LocationAction::Replace);
	}

	fn pop(&mut self) -> bool {
		self.pending_action = Some(LocationAction::Pop);
		if self.primitive.back() {
			self.after_mutation();
			true
		} else {
			self.pending_action = None;
			false
		}
	}

	fn current_path(&self) -> String {
		decode_fragment(&self.primitive.hash())
	}

	fn set_change_listener(&mut self, listener: ChangeListener) {
		self.listener = Some(listener);
	}

	fn setup(&mut self) {
		self.ensure_slash();
	}

	fn handle_platform_change(&mut self) {
		self.handle_hash_change();
	}
}

impl<P: fmt::Debug> fmt::Debug for HashLocation<P> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HashLocation")
			.field("primitive", &self.primitive)
			.field("pending_action", &self.pending_action)
			.field("has_listener", &self.listener.is_some())
			.finish()
	}
}

#[derive(Debug)]
struct HistoryState {
	entries: Vec<String>,
	index: usize,
}

/// In-memory fragment history: an entry stack with a cursor.
///
/// Clones share the same history, so a test or native shell can keep a handle
/// to simulate user actions while the adaptor owns another. Mutations do not
/// raise change events on their own; after simulating a user action, call
/// [`Location::handle_platform_change`](crate::Location::handle_platform_change).
#[derive(Debug, Clone)]
pub struct MemoryHistory {
	state: Arc<Mutex<HistoryState>>,
}

impl Default for MemoryHistory {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryHistory {
	/// A history with a single empty fragment.
	pub fn new() -> Self {
		Self::with_hash("")
	}

	pub fn with_hash(hash: impl Into<String>) -> Self {
		Self {
			state: Arc::new(Mutex::new(HistoryState {
				entries: vec![hash.into()],
				index: 0,
			})),
		}
	}

	/// The raw current fragment.
	pub fn current(&self) -> String {
		let state = self.state.lock();
		state.entries[state.index].clone()
	}

	pub fn entries(&self) -> Vec<String> {
		self.state.lock().entries.clone()
	}

	/// Cursor position in [`entries`](Self::entries).
	pub fn index(&self) -> usize {
		self.state.lock().index
	}

	/// Simulates the user typing a new fragment into the address bar.
	pub fn edit_url(&self, hash: impl Into<String>) {
		let mut state = self.state.lock();
		let next = state.index + 1;
		state.entries.truncate(next);
		state.entries.push(hash.into());
		state.index = next;
	}

	/// Simulates the back button.
	pub fn navigate_back(&self) -> bool {
		let mut state = self.state.lock();
		if state.index == 0 {
			return false;
		}
		state.index -= 1;
		true
	}

	/// Simulates the forward button.
	pub fn navigate_forward(&self) -> bool {
		let mut state = self.state.lock();
		if state.index + 1 >= state.entries.len() {
			return false;
		}
		state.index += 1;
		true
	}
}

impl HashPrimitive for MemoryHistory {
	fn hash(&self) -> String {
		self.current()
	}

	fn set_hash(&mut self, hash: &str) {
		self.edit_url(hash);
	}

	fn replace_hash(&mut self, hash: &str) {
		let mut state = self.state.lock();
		let index = state.index;
		state.entries[index] = hash.to_string();
	}

	fn back(&mut self) -> bool {
		self.navigate_back()
	}

	fn emits_change_events(&self) -> bool {
		false
	}
}
