//! Integration tests for nested navigation
//!
//! These tests drive a small mail client route tree through a `Location`
//! backed by an in-memory hash history:
//! 1. Default routes on start and on partial paths
//! 2. Controller reuse across sibling navigation
//! 3. Leaves-first teardown
//! 4. History traversal and user edits
//! 5. Deferred loads and superseded completions
//! 6. Settings loaded from TOML
//! 7. Controllers that navigate while loading

mod utils;

use arbor_router::{
	Controller, HashLocation, LoadRequest, Location, MemoryHistory, Route, Router,
	RouterSettings, params_from,
};
use arbor_router::testing::{ControllerLog, RecordingController};
use parking_lot::Mutex;
use rstest::rstest;
use serde_json::json;
use std::sync::Arc;
use utils::fixtures::{fixtures_dir, mail_app};
use utils::logs::capture_logs;

#[rstest]
fn test_start_follows_default_routes() {
	// Arrange
	let app = mail_app(false, RouterSettings::default());

	// Act
	app.location.start();

	// Assert
	assert_eq!(app.history.entries(), vec!["/mail/inbox"]);
	assert_eq!(app.root.active_route().as_deref(), Some("mail"));
	assert_eq!(app.mail.active_route().as_deref(), Some("inbox"));
	assert!(app.inbox.is_idle());
	assert_eq!(
		app.log.entries(),
		vec!["construct:mail", "load:mail", "construct:inbox", "load:inbox"]
	);
}

#[rstest]
fn test_deep_link_carries_params_and_query() {
	// Arrange
	let app = mail_app(false, RouterSettings::default());
	app.history.edit_url("/mail/inbox/42?highlight=yes&tag=a&tag=b");

	// Act
	app.location.start();

	// Assert
	let data = app.log.last_data("message").unwrap();
	assert_eq!(data["id"], json!("42"));
	assert_eq!(data["highlight"], json!("yes"));
	assert_eq!(data["tag"], json!(["a", "b"]));
	assert_eq!(app.inbox.last_matched_path(), "42?highlight=yes&tag=a&tag=b");
}

#[rstest]
fn test_sibling_navigation_keeps_parent_controller() {
	// Arrange
	let app = mail_app(false, RouterSettings::default());
	app.location.start();
	app.log.take();

	// Act
	app.location.go("/mail/sent", None);

	// Assert
	assert_eq!(
		app.log.entries(),
		vec!["unload:inbox", "construct:sent", "load:sent"]
	);
	assert_eq!(app.mail.active_route().as_deref(), Some("sent"));
}

#[rstest]
fn test_deeper_segment_does_not_reload_ancestors() {
	// Arrange
	let app = mail_app(false, RouterSettings::default());
	app.location.start();

	// Act
	app.location.go("/mail/inbox/42", None);
	app.location.go("/mail/inbox/43", None);

	// Assert
	assert_eq!(app.log.count("load:mail"), 1);
	assert_eq!(app.log.count("load:inbox"), 1);
	assert_eq!(app.log.count("unload:inbox"), 0);
	assert_eq!(app.log.count("construct:message"), 2);
	assert_eq!(app.log.last_data("message").unwrap()["id"], json!("43"));
}

#[rstest]
fn test_leaving_subtree_unloads_leaves_first() {
	// Arrange
	let app = mail_app(false, RouterSettings::default());
	app.location.start();
	app.location.go("/mail/inbox/42", None);
	app.log.take();

	// Act
	app.location.go("/settings/profile", None);

	// Assert
	assert_eq!(
		app.log.entries(),
		vec![
			"unload:message",
			"unload:inbox",
			"unload:mail",
			"construct:settings",
			"load:settings",
		]
	);
	assert!(app.mail.is_idle());
	assert!(app.inbox.is_idle());
	let data = app.log.last_data("settings").unwrap();
	assert_eq!(data["section"], json!("profile"));
	assert_eq!(data["title"], json!("Settings"));
}

#[rstest]
fn test_parent_path_reapplies_child_state() {
	// Arrange
	let app = mail_app(false, RouterSettings::default());
	app.location.start();
	app.location.go("/mail/inbox/42", None);

	// Act: inbox has no default, so its active child is exited
	app.location.go("/mail/inbox", None);

	// Assert
	assert!(app.inbox.is_idle());
	assert_eq!(app.log.count("unload:message"), 1);
	assert_eq!(app.log.count("load:inbox"), 1);

	// Act: mail has a default, so the path is rewritten
	app.location.go("/mail/sent", None);
	app.location.go("/mail", None);

	// Assert
	assert_eq!(app.history.current(), "/mail/inbox");
	assert_eq!(app.mail.active_route().as_deref(), Some("inbox"));
}

#[rstest]
fn test_back_navigation() {
	// Arrange
	let app = mail_app(false, RouterSettings::default());
	app.location.start();
	app.location.go("/mail/sent", None);

	// Act
	let went_back = app.location.go_back();

	// Assert
	assert!(went_back);
	assert_eq!(app.history.current(), "/mail/inbox");
	assert_eq!(app.mail.active_route().as_deref(), Some("inbox"));

	// Act: the forward button goes through the platform change path
	app.history.navigate_forward();
	app.location.handle_platform_change();

	// Assert
	assert_eq!(app.mail.active_route().as_deref(), Some("sent"));
}

#[rstest]
fn test_user_edit_without_leading_slash() {
	let app = mail_app(false, RouterSettings::default());
	app.location.start();

	app.history.edit_url("mail/sent");
	app.location.handle_platform_change();

	assert_eq!(app.history.current(), "/mail/sent");
	assert_eq!(app.mail.active_route().as_deref(), Some("sent"));
}

#[rstest]
fn test_unknown_path_falls_back_to_default() {
	let app = mail_app(false, RouterSettings::default());
	app.location.start();

	app.location.go("/nowhere/at/all", None);

	assert_eq!(app.history.current(), "/mail/inbox");
	assert_eq!(app.root.active_route().as_deref(), Some("mail"));
}

#[rstest]
fn test_deferred_load_holds_nested_routes() {
	// Arrange
	let app = mail_app(true, RouterSettings::default());

	// Act
	app.location.start();

	// Assert: mail is loading, nothing below it yet
	assert_eq!(app.history.current(), "/mail");
	assert!(app.root.has_pending_load());
	assert!(app.mail.is_idle());

	// Act
	assert!(app.slots.complete("mail"));

	// Assert
	assert!(!app.root.has_pending_load());
	assert_eq!(app.history.current(), "/mail/inbox");
	assert_eq!(app.mail.active_route().as_deref(), Some("inbox"));
}

#[rstest]
fn test_superseded_completion_is_ignored() {
	// Arrange
	let app = mail_app(true, RouterSettings::default());
	app.location.start();
	app.location.go("/settings/profile", None);
	let logs = capture_logs();

	// Act
	let completed = app.slots.complete("mail");

	// Assert
	assert!(!completed);
	assert!(app.mail.is_idle());
	assert_eq!(app.root.active_route().as_deref(), Some("settings/:section"));
	assert!(logs.contains("[DEBUG] ignoring completion of superseded load"));
}

#[rstest]
fn test_navigation_during_load_replaces_remainder() {
	// Arrange
	let app = mail_app(true, RouterSettings::default());
	app.location.start();

	// Act
	app.location.go("/mail/sent", None);
	app.slots.complete("mail");

	// Assert
	assert_eq!(app.mail.active_route().as_deref(), Some("sent"));
	assert_eq!(app.log.count("load:inbox"), 0);
	assert_eq!(app.log.count("load:mail"), 1);
}

/// Drops its completion without calling it.
struct Forgetful;

impl Controller for Forgetful {
	fn load(&mut self, request: LoadRequest) {
		drop(request);
	}

	fn unload(&mut self) {}
}

#[rstest]
#[case(true, true)]
#[case(false, false)]
fn test_dropped_completion_warning(#[case] warn: bool, #[case] expect_warning: bool) {
	// Arrange
	let root = Router::new().route(Route::new("lost", || Forgetful));
	let settings = RouterSettings::default().with_warn_on_dropped_completion(warn);
	let location =
		Location::with_settings(HashLocation::new(MemoryHistory::new()), root, settings);
	location.start();
	let logs = capture_logs();

	// Act
	location.go("/lost", None);

	// Assert
	let warned = logs.contains(
		"[WARN] load completion dropped without being completed; nested routes will not load",
	);
	assert_eq!(warned, expect_warning);
}

#[derive(Debug, Clone, Copy)]
enum Redirect {
	Location,
	Router,
}

/// Sends every visitor to `login` from inside `load`.
struct Gatekeeper {
	log: ControllerLog,
	location: Arc<Mutex<Option<Location>>>,
	redirect: Redirect,
}

impl Controller for Gatekeeper {
	fn load(&mut self, request: LoadRequest) {
		self.log.record("load:admin");
		let location = self.location.lock().clone();
		if let Some(location) = location {
			match self.redirect {
				Redirect::Location => location.replace("/login", None),
				Redirect::Router => {
					location.root().go("login", &location);
				}
			}
		}
		request.done.complete();
	}

	fn unload(&mut self) {
		self.log.record("unload:admin");
	}
}

#[rstest]
#[case(Redirect::Location)]
#[case(Redirect::Router)]
fn test_navigation_from_load_exits_before_entering(#[case] redirect: Redirect) {
	// Arrange
	let log = ControllerLog::new();
	let slot: Arc<Mutex<Option<Location>>> = Arc::new(Mutex::new(None));
	let gate_log = log.clone();
	let gate_slot = Arc::clone(&slot);
	let root = Router::new()
		.route(Route::new(
			"login",
			RecordingController::factory("login", &log),
		))
		.route(Route::new("admin", move || {
			gate_log.record("construct:admin");
			Gatekeeper {
				log: gate_log.clone(),
				location: Arc::clone(&gate_slot),
				redirect,
			}
		}));
	let location = Location::new(HashLocation::new(MemoryHistory::new()), root.clone());
	*slot.lock() = Some(location.clone());
	location.start();

	// Act
	location.go("/admin", None);

	// Assert
	assert_eq!(
		log.entries(),
		vec![
			"construct:admin",
			"load:admin",
			"unload:admin",
			"construct:login",
			"load:login",
		]
	);
	assert_eq!(root.active_route().as_deref(), Some("login"));
	assert!(!root.has_pending_load());
	slot.lock().take();
}

#[rstest]
fn test_completion_from_worker_thread_loads_nested_routes() {
	// Arrange
	let app = mail_app(true, RouterSettings::default());
	app.location.start();
	let slots = app.slots.clone();

	// Act
	let completed = std::thread::spawn(move || slots.complete("mail"))
		.join()
		.unwrap();

	// Assert
	assert!(completed);
	assert_eq!(app.history.current(), "/mail/inbox");
	assert_eq!(app.mail.active_route().as_deref(), Some("inbox"));
}

#[rstest]
fn test_job_limit_logs_error() {
	// Arrange
	let app = mail_app(false, RouterSettings::default().with_max_jobs_per_dispatch(8));
	app.location.start();
	let bouncer = app.location.clone();
	app.location.on_navigate(move |event| {
		if event.path == "inbox" {
			bouncer.go("/mail/sent", None);
		} else if event.path == "sent" {
			bouncer.go("/mail/inbox", None);
		}
	});
	let logs = capture_logs();

	// Act
	app.location.go("/mail/sent", None);

	// Assert
	assert!(logs.contains("[ERROR] navigation job limit reached, possible redirect loop"));
}

#[rstest]
fn test_settings_fixture_pushes_redirects() {
	// Arrange
	let settings = RouterSettings::from_file(fixtures_dir().join("push_redirects.toml")).unwrap();
	let app = mail_app(false, settings);

	// Act
	app.location.start();

	// Assert
	assert_eq!(app.location.settings().max_jobs_per_dispatch, 32);
	assert_eq!(app.history.entries(), vec!["/", "/mail", "/mail/inbox"]);
}

#[rstest]
fn test_href_round_trip() {
	// Arrange
	let app = mail_app(false, RouterSettings::default());
	app.location.start();
	let href = app
		.location
		.make_href(
			"mail/inbox/:id",
			&params_from([("id", "9")]),
			Some(&params_from([("note", "a&b")])),
		)
		.unwrap();

	// Act
	app.location.go(href.trim_start_matches('#'), None);

	// Assert
	assert_eq!(href, "#/mail/inbox/9?note=a%26b");
	let data = app.log.last_data("message").unwrap();
	assert_eq!(data["id"], json!("9"));
	assert_eq!(data["note"], json!("a&b"));
}

#[rstest]
fn test_independent_locations_do_not_share_state() {
	let first = mail_app(false, RouterSettings::default());
	let second = mail_app(false, RouterSettings::default());

	first.location.start();
	first.location.go("/mail/sent", None);

	assert!(second.root.is_idle());
	assert!(second.log.entries().is_empty());
}
