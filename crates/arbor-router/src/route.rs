//! A single routing rule: pattern, controller factory, data, and child router.

use crate::controller::{
	Controller, ControllerData, ControllerFactory, LoadCompletion, LoadRequest, RenderTarget,
};
use crate::error::RouterResult;
use crate::router::Router;
use arbor_urls::{
	CompiledPattern, ParamValue, Params, compile, extract_query, merge_params, split_segments,
	without_query,
};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Result of matching a path against one route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
	/// The consumed leading segments, query string included.
	pub path: String,
	/// Path parameters merged over query parameters.
	pub params: Params,
	/// Unconsumed path for the child router; empty when fully consumed.
	pub next_hop_path: String,
}

/// A routing rule.
///
/// A route is active while its controller exists. Controllers are built on
/// entry and dropped on exit, so each visit starts with fresh state.
pub struct Route {
	name: String,
	pattern: Arc<CompiledPattern>,
	factory: ControllerFactory,
	controller: Option<Box<dyn Controller>>,
	data: ControllerData,
	render_target: Option<RenderTarget>,
	child: Router,
}

impl Route {
	/// Creates a route for `pattern` whose controllers come from `factory`.
	///
	/// # Panics
	///
	/// Panics if the pattern cannot be compiled. Use [`Route::try_new`] for
	/// patterns that are not known at build time.
	///
	/// # Examples
	///
	/// ```
	/// use arbor_router::{Controller, LoadRequest, Route};
	///
	/// #[derive(Default)]
	/// struct Inbox;
	///
	/// impl Controller for Inbox {
	///     fn load(&mut self, request: LoadRequest) {
	///         request.done.complete();
	///     }
	///     fn unload(&mut self) {}
	/// }
	///
	/// let route = Route::new("inbox/:folder", Inbox::default);
	/// assert_eq!(route.segment_count(), 2);
	/// ```
	pub fn new<F, C>(pattern: &str, factory: F) -> Self
	where
		F: Fn() -> C + Send + Sync + 'static,
		C: Controller + 'static,
	{
		match Self::try_new(pattern, factory) {
			Ok(route) => route,
			Err(err) => panic!("Invalid route pattern '{}': {}", pattern, err),
		}
	}

	/// Fallible variant of [`Route::new`].
	pub fn try_new<F, C>(pattern: &str, factory: F) -> RouterResult<Self>
	where
		F: Fn() -> C + Send + Sync + 'static,
		C: Controller + 'static,
	{
		let factory: ControllerFactory =
			Arc::new(move || Box::new(factory()) as Box<dyn Controller>);
		Self::with_factory(pattern, factory)
	}

	/// Creates a route from an already boxed factory.
	///
	/// A leading `/` is dropped, since routers match paths without it; the
	/// root pattern `/` is kept as is.
	pub fn with_factory(pattern: &str, factory: ControllerFactory) -> RouterResult<Self> {
		let pattern = match pattern.strip_prefix('/') {
			Some(relative) if !relative.is_empty() => relative,
			_ => pattern,
		};
		let compiled = compile(pattern)?;
		Ok(Self {
			name: pattern.to_string(),
			pattern: compiled,
			factory,
			controller: None,
			data: ControllerData::new(),
			render_target: None,
			child: Router::new(),
		})
	}

	/// Replaces the data handed to the controller on load.
	pub fn with_data(mut self, data: ControllerData) -> Self {
		self.data = data;
		self
	}

	/// Adds one data entry.
	pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.data.insert(key.into(), value.into());
		self
	}

	pub fn with_render_target(mut self, target: RenderTarget) -> Self {
		self.render_target = Some(target);
		self
	}

	/// Nests `child` below this route.
	pub fn with_child(mut self, child: Router) -> Self {
		self.child = child;
		self
	}

	/// The pattern text this route was built from.
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn pattern(&self) -> &Arc<CompiledPattern> {
		&self.pattern
	}

	/// Number of path segments this route consumes.
	pub fn segment_count(&self) -> usize {
		self.pattern.segment_count()
	}

	pub fn data(&self) -> &ControllerData {
		&self.data
	}

	pub fn render_target(&self) -> Option<&RenderTarget> {
		self.render_target.as_ref()
	}

	pub fn child_router(&self) -> &Router {
		&self.child
	}

	/// Whether a controller currently exists for this route.
	pub fn is_active(&self) -> bool {
		self.controller.is_some()
	}

	/// Tests whether the leading segments of `path` satisfy this route.
	pub fn matches_path(&self, path: &str) -> Option<RouteMatch> {
		if path == self.name || (path.is_empty() && self.name == "/") {
			return Some(RouteMatch {
				path: path.to_string(),
				params: Params::new(),
				next_hop_path: String::new(),
			});
		}

		let (target, remainder) = split_segments(path, self.segment_count())?;
		let path_params = self.pattern.extract(without_query(target))?;
		trace!(route = %self.name, target, remainder, "route matched");

		Some(RouteMatch {
			path: target.to_string(),
			params: merge_params(path_params, extract_query(target)),
			next_hop_path: remainder.to_string(),
		})
	}

	/// Activates the route: builds the controller if needed and loads it with
	/// route data overlaid by `params`.
	pub(crate) fn enter_route(&mut self, params: &Params, done: LoadCompletion) {
		let controller = self.controller.get_or_insert_with(|| {
			debug!(route = %self.name, "constructing controller");
			(self.factory)()
		});

		let mut data = self.data.clone();
		for (name, value) in params {
			data.insert(name.clone(), param_to_json(value));
		}

		controller.load(LoadRequest {
			data,
			render_target: self.render_target.clone(),
			child_router: self.child.clone(),
			done,
		});
	}

	/// Deactivates the route, leaves first.
	pub(crate) fn exit_route(&mut self) {
		let Some(mut controller) = self.controller.take() else {
			return;
		};
		self.child.exit_active_route();
		controller.unload();
		debug!(route = %self.name, "controller unloaded");
	}
}

fn param_to_json(value: &ParamValue) -> Value {
	match value {
		ParamValue::Single(value) => Value::String(value.clone()),
		ParamValue::Multiple(values) => {
			Value::Array(values.iter().cloned().map(Value::String).collect())
		}
	}
}

impl fmt::Debug for Route {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Route")
			.field("name", &self.name)
			.field("active", &self.is_active())
			.field("data", &self.data)
			.field("render_target", &self.render_target)
			.field("child", &self.child)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{ControllerLog, RecordingController};
	use arbor_urls::params_from;
	use rstest::rstest;
	use serde_json::json;

	fn route(pattern: &str, log: &ControllerLog) -> Route {
		Route::new(pattern, RecordingController::factory(pattern, log))
	}

	#[rstest]
	#[case("inbox", "inbox", "inbox", "")]
	#[case("inbox", "inbox/42", "inbox", "42")]
	#[case("inbox", "INBOX/42", "INBOX", "42")]
	#[case("/", "", "", "")]
	#[case("item/:id", "item/5/notes", "item/5", "notes")]
	#[case("item/:id", "item/5?tab=a", "item/5?tab=a", "")]
	fn test_matches_path(
		#[case] pattern: &str,
		#[case] path: &str,
		#[case] matched: &str,
		#[case] remainder: &str,
	) {
		let route = route(pattern, &ControllerLog::new());

		let result = route.matches_path(path).unwrap();

		assert_eq!(result.path, matched);
		assert_eq!(result.next_hop_path, remainder);
	}

	#[rstest]
	#[case("/inbox", "inbox")]
	#[case("/item/:id", "item/:id")]
	#[case("/", "/")]
	fn test_leading_slash_is_dropped(#[case] pattern: &str, #[case] name: &str) {
		let route = route(pattern, &ControllerLog::new());

		assert_eq!(route.name(), name);
		assert_eq!(route.segment_count(), name.split('/').count());
	}

	#[rstest]
	fn test_leading_slash_pattern_matches() {
		let route = route("/item/:id", &ControllerLog::new());

		let result = route.matches_path("item/5/notes").unwrap();

		assert_eq!(result.path, "item/5");
		assert_eq!(result.params, params_from([("id", "5")]));
	}

	#[rstest]
	#[case("inbox", "sent")]
	#[case("item/:id", "item")]
	#[case("item/:id", "items/5")]
	#[case("/", "inbox")]
	fn test_rejects_path(#[case] pattern: &str, #[case] path: &str) {
		let route = route(pattern, &ControllerLog::new());

		assert_eq!(route.matches_path(path), None);
	}

	#[rstest]
	fn test_path_params_take_precedence_over_query() {
		let route = route("item/:id", &ControllerLog::new());

		let result = route.matches_path("item/5?id=9&tab=notes").unwrap();

		assert_eq!(result.params, params_from([("id", "5"), ("tab", "notes")]));
	}

	#[rstest]
	fn test_enter_overlays_params_on_data() {
		// Arrange
		let log = ControllerLog::new();
		let mut route = route("item/:id", &log)
			.with_value("title", "Item")
			.with_value("id", "default");
		let params = params_from([
			("id", ParamValue::from("5")),
			("tags", ParamValue::from(vec!["a", "b"])),
		]);

		// Act
		route.enter_route(&params, LoadCompletion::detached());

		// Assert
		assert!(route.is_active());
		let data = log.last_data("item/:id").unwrap();
		assert_eq!(data["title"], json!("Item"));
		assert_eq!(data["id"], json!("5"));
		assert_eq!(data["tags"], json!(["a", "b"]));
		assert_eq!(route.data()["id"], json!("default"));
	}

	#[rstest]
	fn test_controller_is_reused_while_active() {
		let log = ControllerLog::new();
		let mut route = route("inbox", &log);

		route.enter_route(&Params::new(), LoadCompletion::detached());
		route.enter_route(&Params::new(), LoadCompletion::detached());

		assert_eq!(
			log.entries(),
			vec!["construct:inbox", "load:inbox", "load:inbox"]
		);
	}

	#[rstest]
	fn test_exit_builds_fresh_controller_next_time() {
		let log = ControllerLog::new();
		let mut route = route("inbox", &log);

		route.enter_route(&Params::new(), LoadCompletion::detached());
		route.exit_route();
		route.exit_route();
		route.enter_route(&Params::new(), LoadCompletion::detached());

		assert!(!route.is_active());
		assert_eq!(
			log.entries(),
			vec![
				"construct:inbox",
				"load:inbox",
				"unload:inbox",
				"construct:inbox",
				"load:inbox",
			]
		);
	}

	#[rstest]
	fn test_try_new_rejects_oversized_pattern() {
		let pattern = "a/".repeat(40);

		let result = Route::try_new(&pattern, RecordingController::factory("x", &ControllerLog::new()));

		assert!(result.is_err());
	}

	#[rstest]
	#[should_panic(expected = "Invalid route pattern")]
	fn test_new_panics_on_invalid_pattern() {
		let pattern = "a/".repeat(40);
		let _ = Route::new(&pattern, RecordingController::factory("x", &ControllerLog::new()));
	}

	#[rstest]
	fn test_render_target_forwarded() {
		let log = ControllerLog::new();
		let mut route = route("inbox", &log).with_render_target(RenderTarget::new("main"));

		route.enter_route(&Params::new(), LoadCompletion::detached());

		assert_eq!(log.last_render_target("inbox"), Some(RenderTarget::new("main")));
	}
}
