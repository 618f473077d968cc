//! Ordered route lists with one active route each.
//!
//! A [`Router`] is a cheap handle; clones share the same routes and state.
//! Routers nest through [`Route::with_child`], forming a tree that mirrors
//! the path: each level consumes its route's segments and forwards the rest
//! to the active route's child router once the controller finished loading.
//!
//! # Locking
//!
//! Routers lock top-down only. A router holds its own lock while it calls
//! into its routes and their child routers, and never locks its parent. The
//! child's base path is pushed down on entry instead.

use crate::controller::{LoadCompletion, LoadTicket};
use crate::events::NavigationEvent;
use crate::location::Location;
use crate::route::{Route, RouteMatch};
use arbor_urls::{ensure_leading_slash, join_segments, without_query};
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// A load that has started but whose controller has not completed yet.
#[derive(Debug)]
struct PendingLoad {
	ticket: LoadTicket,
	remainder: String,
}

#[derive(Default)]
struct RouterState {
	routes: Vec<Route>,
	active: Option<usize>,
	last_matched_path: String,
	default_route: Option<String>,
	/// Path consumed by ancestor routers, without leading slash.
	base_path: String,
	pending: Option<PendingLoad>,
	generation: u64,
}

impl RouterState {
	fn exit_active_route(&mut self) {
		if let Some(pending) = self.pending.take() {
			pending.ticket.cancel();
		}
		if let Some(index) = self.active.take() {
			self.routes[index].exit_route();
		}
		self.last_matched_path.clear();
	}

	fn default_target(&self) -> Option<String> {
		let default = self.default_route.as_deref()?;
		Some(ensure_leading_slash(&join_segments([
			self.base_path.as_str(),
			default.trim_start_matches('/'),
		])))
	}
}

/// An ordered list of routes, at most one of them active.
#[derive(Clone, Default)]
pub struct Router {
	inner: Arc<Mutex<RouterState>>,
}

/// Non-owning reference to a [`Router`].
#[derive(Clone)]
pub(crate) struct WeakRouter(Weak<Mutex<RouterState>>);

impl WeakRouter {
	pub(crate) fn upgrade(&self) -> Option<Router> {
		self.0.upgrade().map(|inner| Router { inner })
	}
}

impl Router {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a route. Earlier routes win when several match.
	pub fn route(self, route: Route) -> Self {
		self.inner.lock().routes.push(route);
		self
	}

	/// Sets the route navigated to when no route matches, or when a parent
	/// route is reached with nothing left for this router.
	///
	/// The value is a path relative to this router.
	pub fn with_default_route(self, default: impl Into<String>) -> Self {
		self.inner.lock().default_route = Some(default.into());
		self
	}

	pub(crate) fn downgrade(&self) -> WeakRouter {
		WeakRouter(Arc::downgrade(&self.inner))
	}

	/// Routes `path` to the first matching route.
	///
	/// A single leading `/` is ignored. Returns `false` when nothing matched
	/// and no default route could be used; router state is then unchanged.
	///
	/// The routing runs inside `location`'s job pump, so controllers that
	/// complete inside `load` resume their child routers before this returns.
	/// While `location` is already dispatching (from a controller, an
	/// observer, or another thread), the request is queued behind the running
	/// dispatch and `true` is returned.
	pub fn go(&self, path: &str, location: &Location) -> bool {
		location.route_with(self, path)
	}

	/// Routes `path` with the caller already inside the job pump.
	pub(crate) fn route_to(&self, path: &str, location: &Location) -> bool {
		let path = path.strip_prefix('/').unwrap_or(path);
		let mut state = self.inner.lock();

		let found = state
			.routes
			.iter()
			.enumerate()
			.find_map(|(index, route)| route.matches_path(path).map(|found| (index, found)));

		if let Some((index, found)) = found {
			self.follow_route(&mut state, index, found, location);
			return true;
		}

		// Guard against redirecting to the path that just failed to match.
		let target = match state.default_route.as_deref() {
			Some(default) if default.trim_start_matches('/') != path => state.default_target(),
			_ => None,
		};
		drop(state);

		match target {
			Some(target) => {
				debug!(path, target = %target, "no route matched, redirecting to default");
				location.redirect(&target);
				true
			}
			None => {
				trace!(path, "no route matched");
				false
			}
		}
	}

	fn follow_route(
		&self,
		state: &mut RouterState,
		index: usize,
		found: RouteMatch,
		location: &Location,
	) {
		let RouteMatch {
			path,
			params,
			next_hop_path,
		} = found;
		location.record_event(NavigationEvent::new(&path, !next_hop_path.is_empty()));

		let already_active = state.active == Some(index) && state.last_matched_path == path;
		if !already_active {
			state.exit_active_route();

			state.generation += 1;
			let ticket = LoadTicket::new(state.generation);
			let child_base = join_segments([state.base_path.as_str(), without_query(&path)]);
			debug!(
				route = %state.routes[index].name(),
				path = %path,
				generation = state.generation,
				"entering route"
			);

			state.active = Some(index);
			state.last_matched_path = path;
			state.pending = Some(PendingLoad {
				ticket: ticket.clone(),
				remainder: next_hop_path,
			});

			let route = &mut state.routes[index];
			route.child_router().set_base_path(child_base);
			let done = LoadCompletion::new(ticket, self.downgrade(), location.downgrade());
			route.enter_route(&params, done);
			return;
		}

		// Same route, same matched path: the controller stays, only the tail
		// of the path is re-routed.
		if let Some(pending) = state.pending.as_mut() {
			trace!(remainder = %next_hop_path, "load in progress, replacing pending remainder");
			pending.remainder = next_hop_path;
			return;
		}

		let child = state.routes[index].child_router().clone();
		if !next_hop_path.is_empty() {
			child.route_to(&next_hop_path, location);
		} else if !child.go_to_default_route(location) {
			child.exit_active_route();
		}
	}

	/// Continues a navigation once the active route's controller completed.
	pub(crate) fn resume(&self, ticket: &LoadTicket, location: &Location) {
		let mut state = self.inner.lock();

		let is_current = state
			.pending
			.as_ref()
			.is_some_and(|pending| pending.ticket.same_load(ticket));
		if !is_current {
			debug!(
				generation = ticket.generation(),
				"discarding stale load continuation"
			);
			return;
		}
		let (Some(pending), Some(index)) = (state.pending.take(), state.active) else {
			return;
		};
		let child = state.routes[index].child_router().clone();
		drop(state);

		if pending.remainder.is_empty() {
			child.go_to_default_route(location);
		} else {
			child.route_to(&pending.remainder, location);
		}
	}

	/// Navigates to this router's default route, if it has one.
	///
	/// The target is prefixed with the path consumed by ancestor routers.
	/// Returns whether a navigation was issued.
	pub fn go_to_default_route(&self, location: &Location) -> bool {
		let target = self.inner.lock().default_target();
		match target {
			Some(target) => {
				location.redirect(&target);
				true
			}
			None => false,
		}
	}

	/// Deactivates the active route and everything below it.
	pub fn exit_active_route(&self) {
		self.inner.lock().exit_active_route();
	}

	pub(crate) fn set_base_path(&self, base_path: String) {
		self.inner.lock().base_path = base_path;
	}

	/// Pattern of the active route.
	pub fn active_route(&self) -> Option<String> {
		let state = self.inner.lock();
		state.active.map(|index| state.routes[index].name().to_string())
	}

	/// Matched path of the active route; empty when idle.
	pub fn last_matched_path(&self) -> String {
		self.inner.lock().last_matched_path.clone()
	}

	pub fn is_idle(&self) -> bool {
		self.inner.lock().active.is_none()
	}

	/// Whether the active route's controller has not completed its load.
	pub fn has_pending_load(&self) -> bool {
		self.inner.lock().pending.is_some()
	}

	pub fn default_route(&self) -> Option<String> {
		self.inner.lock().default_route.clone()
	}

	/// Path consumed by ancestor routers, without leading slash.
	pub fn base_path(&self) -> String {
		self.inner.lock().base_path.clone()
	}

	pub fn route_count(&self) -> usize {
		self.inner.lock().routes.len()
	}

	/// Route patterns in match order.
	pub fn route_names(&self) -> Vec<String> {
		self.inner
			.lock()
			.routes
			.iter()
			.map(|route| route.name().to_string())
			.collect()
	}

	/// Child router of the route with the given pattern.
	pub fn child(&self, pattern: &str) -> Option<Router> {
		self.inner
			.lock()
			.routes
			.iter()
			.find(|route| route.name() == pattern)
			.map(|route| route.child_router().clone())
	}

	/// Whether both handles refer to the same router.
	pub fn ptr_eq(&self, other: &Router) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}
}

impl fmt::Debug for Router {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.inner.try_lock() {
			Some(state) => f
				.debug_struct("Router")
				.field("routes", &state.routes.len())
				.field("active", &state.active)
				.field("last_matched_path", &state.last_matched_path)
				.field("default_route", &state.default_route)
				.field("base_path", &state.base_path)
				.finish(),
			None => f.write_str("Router { <locked> }"),
		}
	}
}
