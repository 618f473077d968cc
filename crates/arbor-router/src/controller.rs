//! Controller contract and asynchronous load completion.
//!
//! A [`Route`](crate::Route) owns a lazily constructed [`Controller`]. Entering
//! the route hands the controller a [`LoadRequest`]; the controller signals
//! that it finished loading by calling [`LoadCompletion::complete`], which
//! lets the parent router forward the rest of the path to the route's child
//! router. Completion may happen inside `load` or at any later point.
//!
//! Each load is tied to a [`LoadTicket`]. Leaving the route cancels the
//! ticket, so a completion that arrives after the user navigated elsewhere is
//! ignored.

use crate::location::WeakLocation;
use crate::router::{Router, WeakRouter};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use tracing::{debug, warn};

/// Configuration data passed to a controller on load.
pub type ControllerData = serde_json::Map<String, serde_json::Value>;

/// Builds a fresh controller each time a route becomes active.
pub type ControllerFactory = Arc<dyn Fn() -> Box<dyn Controller> + Send + Sync>;

/// Identifier of the region a controller renders into.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderTarget(String);

impl RenderTarget {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn id(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for RenderTarget {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// The per-route unit of behavior.
///
/// While `load` runs, navigation through the [`Location`](crate::Location) or
/// [`Router::go`] is queued and runs after the current job, so the old route
/// is always exited before the new one is entered. Other router mutations,
/// such as [`Router::exit_active_route`], must not be called from `load` or
/// `unload` on the router that owns the route.
pub trait Controller: Send {
	/// Called when the owning route becomes active.
	fn load(&mut self, request: LoadRequest);

	/// Called when the owning route stops being active.
	fn unload(&mut self);
}

/// Everything a controller receives when its route is entered.
pub struct LoadRequest {
	/// Route data overlaid with the matched path and query parameters.
	pub data: ControllerData,
	pub render_target: Option<RenderTarget>,
	/// Router for routes nested below this one.
	pub child_router: Router,
	/// Must be completed once loading is done.
	pub done: LoadCompletion,
}

impl fmt::Debug for LoadRequest {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LoadRequest")
			.field("data", &self.data)
			.field("render_target", &self.render_target)
			.field("done", &self.done)
			.finish_non_exhaustive()
	}
}

const PENDING: u8 = 0;
const COMPLETED: u8 = 1;
const CANCELLED: u8 = 2;

#[derive(Debug)]
struct TicketState {
	generation: u64,
	state: AtomicU8,
}

/// Identity of one load of one route.
///
/// Clones share state; two tickets are the same load only if they are clones
/// of each other.
#[derive(Debug, Clone)]
pub struct LoadTicket {
	inner: Arc<TicketState>,
}

impl LoadTicket {
	pub(crate) fn new(generation: u64) -> Self {
		Self {
			inner: Arc::new(TicketState {
				generation,
				state: AtomicU8::new(PENDING),
			}),
		}
	}

	/// Monotonic per-router counter of loads.
	pub fn generation(&self) -> u64 {
		self.inner.generation
	}

	pub fn is_pending(&self) -> bool {
		self.inner.state.load(Ordering::Acquire) == PENDING
	}

	pub fn is_completed(&self) -> bool {
		self.inner.state.load(Ordering::Acquire) == COMPLETED
	}

	pub fn is_cancelled(&self) -> bool {
		self.inner.state.load(Ordering::Acquire) == CANCELLED
	}

	pub(crate) fn cancel(&self) {
		self.inner.state.store(CANCELLED, Ordering::Release);
	}

	fn try_complete(&self) -> bool {
		self.inner
			.state
			.compare_exchange(PENDING, COMPLETED, Ordering::AcqRel, Ordering::Acquire)
			.is_ok()
	}

	pub(crate) fn same_load(&self, other: &LoadTicket) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}
}

/// One-shot continuation handed to [`Controller::load`].
pub struct LoadCompletion {
	ticket: LoadTicket,
	router: Option<WeakRouter>,
	location: Option<WeakLocation>,
	consumed: bool,
}

impl LoadCompletion {
	pub(crate) fn new(ticket: LoadTicket, router: WeakRouter, location: WeakLocation) -> Self {
		Self {
			ticket,
			router: Some(router),
			location: Some(location),
			consumed: false,
		}
	}

	/// A completion bound to no router. Completing it only marks its ticket.
	///
	/// Useful for driving a controller outside a router.
	pub fn detached() -> Self {
		Self {
			ticket: LoadTicket::new(0),
			router: None,
			location: None,
			consumed: false,
		}
	}

	pub fn ticket(&self) -> &LoadTicket {
		&self.ticket
	}

	/// Whether the route was left before this load finished.
	pub fn is_cancelled(&self) -> bool {
		self.ticket.is_cancelled()
	}

	/// Signals that loading finished.
	///
	/// Returns `false` when the load was superseded and the signal was
	/// discarded.
	pub fn complete(mut self) -> bool {
		self.consumed = true;

		if !self.ticket.try_complete() {
			debug!(
				generation = self.ticket.generation(),
				"ignoring completion of superseded load"
			);
			return false;
		}

		let router = self.router.take();
		let location = self.location.as_ref().and_then(WeakLocation::upgrade);
		match (router, location) {
			(Some(router), Some(location)) => {
				location.resume(router, self.ticket.clone());
				true
			}
			(None, _) => true,
			(Some(_), None) => {
				debug!(
					generation = self.ticket.generation(),
					"location dropped before load completed"
				);
				false
			}
		}
	}
}

impl fmt::Debug for LoadCompletion {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LoadCompletion")
			.field("ticket", &self.ticket)
			.field("detached", &self.router.is_none())
			.finish()
	}
}

impl Drop for LoadCompletion {
	fn drop(&mut self) {
		if self.consumed || !self.ticket.is_pending() {
			return;
		}
		let Some(location) = self.location.as_ref().and_then(WeakLocation::upgrade) else {
			return;
		};
		if location.settings().warn_on_dropped_completion {
			warn!(
				generation = self.ticket.generation(),
				"load completion dropped without being completed; nested routes will not load"
			);
		}
	}
}
