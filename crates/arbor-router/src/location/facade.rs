//! The navigation facade: one adaptor, one root router, one job queue.

use super::{ChangeListener, LocationAction, LocationAdaptor, LocationChange};
use crate::controller::LoadTicket;
use crate::error::RouterResult;
use crate::events::{NavigationEvent, NavigationObserver};
use crate::router::{Router, WeakRouter};
use crate::settings::{RedirectMode, RouterSettings};
use arbor_urls::{Params, ensure_leading_slash, inject_params, with_query};
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, error, trace, warn};

/// Queued unit of routing work.
enum Job {
	Dispatch(String),
	Resume { router: WeakRouter, ticket: LoadTicket },
	Route { router: WeakRouter, path: String },
}

struct LocationShared {
	adaptor: Mutex<Box<dyn LocationAdaptor>>,
	root: Router,
	settings: RouterSettings,
	jobs: Mutex<VecDeque<Job>>,
	events: Mutex<Vec<NavigationEvent>>,
	observers: RwLock<Vec<NavigationObserver>>,
	dispatching: AtomicBool,
}

impl LocationShared {
	fn enqueue(&self, job: Job) {
		self.jobs.lock().push_back(job);
	}
}

/// Resets the dispatching flag even if a controller panics mid-dispatch.
struct DispatchGuard<'a>(&'a AtomicBool);

impl Drop for DispatchGuard<'_> {
	fn drop(&mut self) {
		// A read-modify-write, so a job queued by a thread that saw the flag
		// still set is visible to the re-check after the reset.
		self.0.swap(false, Ordering::AcqRel);
	}
}

/// Navigation context: owns a [`LocationAdaptor`] and the root [`Router`].
///
/// Every change reported by the adaptor is dispatched to the root router.
/// Work triggered while a dispatch is running (controller navigation, load
/// completions, default-route redirects, observer callbacks) is queued and
/// processed in order before the outermost call returns, so routers are never
/// re-entered.
///
/// Dispatch is driven from one thread at a time. Calls made on another thread
/// while a dispatch runs, such as a [`LoadCompletion`](crate::LoadCompletion)
/// completed from a worker, are queued; the dispatching thread re-checks the
/// queue after it releases the dispatch and drains anything that arrived late.
///
/// # Examples
///
/// ```
/// use arbor_router::{HashLocation, Location, MemoryHistory, Router, params_from};
///
/// let history = MemoryHistory::new();
/// let location = Location::new(HashLocation::new(history.clone()), Router::new());
/// location.start();
///
/// location.go("/inbox", None);
/// assert_eq!(location.current_path(), "/inbox");
///
/// let href = location.make_href("inbox/:id", &params_from([("id", "7")]), None);
/// assert_eq!(href.unwrap(), "#/inbox/7");
/// ```
#[derive(Clone)]
pub struct Location {
	shared: Arc<LocationShared>,
}

/// Non-owning reference to a [`Location`], held by load completions.
#[derive(Clone)]
pub(crate) struct WeakLocation(Weak<LocationShared>);

impl WeakLocation {
	pub(crate) fn upgrade(&self) -> Option<Location> {
		self.0.upgrade().map(|shared| Location { shared })
	}
}

impl Location {
	pub fn new<A>(adaptor: A, root: Router) -> Self
	where
		A: LocationAdaptor + 'static,
	{
		Self::with_settings(adaptor, root, RouterSettings::default())
	}

	pub fn with_settings<A>(adaptor: A, root: Router, settings: RouterSettings) -> Self
	where
		A: LocationAdaptor + 'static,
	{
		let shared = Arc::new_cyclic(|weak: &Weak<LocationShared>| {
			let mut adaptor: Box<dyn LocationAdaptor> = Box::new(adaptor);
			let weak = weak.clone();
			let listener: ChangeListener = Arc::new(move |change: &LocationChange| {
				trace!(path = %change.path, action = ?change.action, "location changed");
				if let Some(shared) = weak.upgrade() {
					shared.enqueue(Job::Dispatch(change.path.clone()));
				}
			});
			adaptor.set_change_listener(listener);

			LocationShared {
				adaptor: Mutex::new(adaptor),
				root,
				settings,
				jobs: Mutex::new(VecDeque::new()),
				events: Mutex::new(Vec::new()),
				observers: RwLock::new(Vec::new()),
				dispatching: AtomicBool::new(false),
			}
		});
		Self { shared }
	}

	pub fn root(&self) -> &Router {
		&self.shared.root
	}

	pub fn settings(&self) -> &RouterSettings {
		&self.shared.settings
	}

	pub fn current_path(&self) -> String {
		self.shared.adaptor.lock().current_path()
	}

	/// Normalizes the initial location and dispatches it.
	pub fn start(&self) {
		self.pump(|| {
			let path = {
				let mut adaptor = self.shared.adaptor.lock();
				adaptor.setup();
				adaptor.current_path()
			};
			debug!(path = %path, "starting navigation");
			self.shared.enqueue(Job::Dispatch(path));
		});
	}

	/// Navigates to `path`, merging `query` into its query string, and adds a
	/// history entry.
	pub fn go(&self, path: &str, query: Option<&Params>) {
		self.navigate(path, query, LocationAction::Push);
	}

	/// Like [`go`](Self::go) but overwrites the current history entry.
	pub fn replace(&self, path: &str, query: Option<&Params>) {
		self.navigate(path, query, LocationAction::Replace);
	}

	/// Steps back in history. Returns `false` at the start of history.
	pub fn go_back(&self) -> bool {
		self.pump(|| self.shared.adaptor.lock().pop())
	}

	/// Forwards a change raised by the platform (a browser `hashchange`, a
	/// simulated user edit) to the adaptor.
	pub fn handle_platform_change(&self) {
		self.pump(|| self.shared.adaptor.lock().handle_platform_change());
	}

	/// Routes `path` without touching history.
	pub fn dispatch(&self, path: &str) {
		self.pump(|| self.shared.enqueue(Job::Dispatch(path.to_string())));
	}

	/// Builds a path from `pattern`, `params`, and an optional query.
	pub fn make_path(
		&self,
		pattern: &str,
		params: &Params,
		query: Option<&Params>,
	) -> RouterResult<String> {
		let path = inject_params(pattern, params)?;
		let path = match query {
			Some(query) => with_query(&path, query),
			None => path,
		};
		Ok(ensure_leading_slash(&path))
	}

	/// Like [`make_path`](Self::make_path), as an `href` for a hash link.
	pub fn make_href(
		&self,
		pattern: &str,
		params: &Params,
		query: Option<&Params>,
	) -> RouterResult<String> {
		Ok(format!("#{}", self.make_path(pattern, params, query)?))
	}

	/// Registers a callback for every route a router follows.
	pub fn on_navigate<F>(&self, observer: F)
	where
		F: Fn(&NavigationEvent) + Send + Sync + 'static,
	{
		self.shared.observers.write().push(Arc::new(observer));
	}

	pub(crate) fn downgrade(&self) -> WeakLocation {
		WeakLocation(Arc::downgrade(&self.shared))
	}

	pub(crate) fn redirect(&self, target: &str) {
		let action = match self.shared.settings.redirect_mode {
			RedirectMode::Push => LocationAction::Push,
			RedirectMode::Replace => LocationAction::Replace,
		};
		self.navigate(target, None, action);
	}

	pub(crate) fn resume(&self, router: WeakRouter, ticket: LoadTicket) {
		self.pump(|| self.shared.enqueue(Job::Resume { router, ticket }));
	}

	pub(crate) fn record_event(&self, event: NavigationEvent) {
		self.shared.events.lock().push(event);
	}

	fn navigate(&self, path: &str, query: Option<&Params>, action: LocationAction) {
		let target = match query {
			Some(query) => with_query(path, query),
			None => path.to_string(),
		};
		let target = ensure_leading_slash(&target);

		self.pump(|| {
			let mut adaptor = self.shared.adaptor.lock();
			if adaptor.current_path() == target {
				// The adaptor raises no change for the current path.
				drop(adaptor);
				self.shared.enqueue(Job::Dispatch(target));
				return;
			}
			match action {
				LocationAction::Replace => adaptor.replace(&target),
				_ => adaptor.push(&target),
			}
		});
	}

	/// Routes `path` through `router`, queueing it behind a running dispatch.
	pub(crate) fn route_with(&self, router: &Router, path: &str) -> bool {
		if self.shared.dispatching.swap(true, Ordering::AcqRel) {
			trace!(path, "dispatch running, queueing route request");
			self.shared.enqueue(Job::Route {
				router: router.downgrade(),
				path: path.to_string(),
			});
			return true;
		}
		self.run_dispatch(|| router.route_to(path, self))
	}

	/// Runs `f`, then drains the job queue unless a dispatch is already
	/// running further up the stack.
	fn pump<R>(&self, f: impl FnOnce() -> R) -> R {
		if self.shared.dispatching.swap(true, Ordering::AcqRel) {
			return f();
		}
		self.run_dispatch(f)
	}

	/// Body of a dispatch; the caller has set the dispatching flag.
	fn run_dispatch<R>(&self, f: impl FnOnce() -> R) -> R {
		let output = {
			let _guard = DispatchGuard(&self.shared.dispatching);
			let output = f();
			self.drain();
			output
		};
		self.drain_stranded();
		output
	}

	/// Drains jobs queued by other threads between the last pop and the flag
	/// reset.
	fn drain_stranded(&self) {
		while !self.shared.jobs.lock().is_empty() {
			if self.shared.dispatching.swap(true, Ordering::AcqRel) {
				// The thread that took the flag drains them.
				return;
			}
			let _guard = DispatchGuard(&self.shared.dispatching);
			self.drain();
		}
	}

	fn drain(&self) {
		let limit = self.shared.settings.max_jobs_per_dispatch;
		let mut processed = 0usize;

		loop {
			let Some(job) = self.shared.jobs.lock().pop_front() else {
				break;
			};
			if processed >= limit {
				let dropped = {
					let mut jobs = self.shared.jobs.lock();
					let dropped = jobs.len() + 1;
					jobs.clear();
					dropped
				};
				error!(
					limit,
					dropped, "navigation job limit reached, possible redirect loop"
				);
				break;
			}
			processed += 1;
			self.run_job(job);
			self.flush_events();
		}
	}

	fn run_job(&self, job: Job) {
		match job {
			Job::Dispatch(path) => {
				debug!(path = %path, "dispatching");
				if !self.shared.root.route_to(&path, self) {
					warn!(path = %path, "no route matches path and no default route is configured");
				}
			}
			Job::Resume { router, ticket } => match router.upgrade() {
				Some(router) => router.resume(&ticket, self),
				None => trace!(
					generation = ticket.generation(),
					"router dropped before load completed"
				),
			},
			Job::Route { router, path } => match router.upgrade() {
				Some(router) => {
					if !router.route_to(&path, self) {
						debug!(path = %path, "queued route request matched nothing");
					}
				}
				None => trace!(path = %path, "router dropped before queued route ran"),
			},
		}
	}

	fn flush_events(&self) {
		let events = std::mem::take(&mut *self.shared.events.lock());
		if events.is_empty() {
			return;
		}
		let observers = self.shared.observers.read().clone();
		for event in &events {
			for observer in &observers {
				observer(event);
			}
		}
	}
}

impl fmt::Debug for Location {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Location")
			.field("root", &self.shared.root)
			.field("settings", &self.shared.settings)
			.field("queued_jobs", &self.shared.jobs.lock().len())
			.field(
				"dispatching",
				&self.shared.dispatching.load(Ordering::Acquire),
			)
			.finish_non_exhaustive()
	}
}
