//! Navigation notifications.

use std::sync::Arc;

/// Emitted each time a router follows a matching route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEvent {
	/// Matched portion of the path, relative to the router that matched it.
	pub path: String,
	/// Whether unmatched path remains for a nested router.
	pub has_remainder: bool,
}

impl NavigationEvent {
	pub fn new(path: impl Into<String>, has_remainder: bool) -> Self {
		Self {
			path: path.into(),
			has_remainder,
		}
	}
}

/// Callback registered through [`Location::on_navigate`](crate::Location::on_navigate).
///
/// Observers run after the router locks are released, so they may navigate.
pub type NavigationObserver = Arc<dyn Fn(&NavigationEvent) + Send + Sync>;
