//! Location adaptors and the navigation facade.
//!
//! A [`LocationAdaptor`] maps the platform's notion of "current path" (the URL
//! hash in a browser, an in-memory stack elsewhere) onto push, replace, and
//! pop operations plus a change listener. [`Location`] owns one adaptor and
//! the root [`Router`](crate::Router) and turns every change into a dispatch.

mod facade;
mod hash;

pub use facade::Location;
pub(crate) use facade::WeakLocation;
pub use hash::{HashLocation, HashPrimitive, MemoryHistory};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How the current path changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationAction {
	Push,
	Replace,
	/// History traversal, or any change the adaptor did not initiate.
	Pop,
}

/// Notification sent to the change listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationChange {
	pub path: String,
	pub action: LocationAction,
}

/// Receives every location change.
pub type ChangeListener = Arc<dyn Fn(&LocationChange) + Send + Sync>;

/// Platform binding for the current path.
///
/// Paths handed to and returned from an adaptor start with `/`.
pub trait LocationAdaptor: Send {
	/// Adds a history entry for `path`.
	fn push(&mut self, path: &str);

	/// Overwrites the current history entry with `path`.
	fn replace(&mut self, path: &str);

	/// Steps back one entry. Returns `false` when there is nothing to go back to.
	fn pop(&mut self) -> bool;

	fn current_path(&self) -> String;

	fn set_change_listener(&mut self, listener: ChangeListener);

	/// Normalizes the initial location before the first dispatch.
	fn setup(&mut self) {}

	/// Entry point for change notifications raised by the platform itself.
	fn handle_platform_change(&mut self) {}
}
