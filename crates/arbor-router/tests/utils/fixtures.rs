//! Route trees shared by the integration tests.

use arbor_router::testing::{ControllerLog, DeferredCompletions, RecordingController};
use arbor_router::{HashLocation, Location, MemoryHistory, Route, Router, RouterSettings};
use std::path::PathBuf;

/// Base path for fixture files.
pub fn fixtures_dir() -> PathBuf {
	PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Handles into a mail client route tree.
///
/// ```text
/// /                      (root, default "mail")
/// ├── mail               (deferred when `slots` is given)
/// │   ├── inbox          (default)
/// │   │   └── :id
/// │   └── sent
/// └── settings/:section
/// ```
pub struct MailApp {
	pub root: Router,
	pub mail: Router,
	pub inbox: Router,
	pub location: Location,
	pub history: MemoryHistory,
	pub log: ControllerLog,
	pub slots: DeferredCompletions,
}

fn mail_route(log: &ControllerLog, slots: Option<&DeferredCompletions>) -> Route {
	match slots {
		Some(slots) => Route::new(
			"mail",
			RecordingController::deferred_factory("mail", log, slots),
		),
		None => Route::new("mail", RecordingController::factory("mail", log)),
	}
}

pub fn mail_app(deferred_mail: bool, settings: RouterSettings) -> MailApp {
	let log = ControllerLog::new();
	let slots = DeferredCompletions::new();

	let inbox = Router::new().route(Route::new(
		":id",
		RecordingController::factory("message", &log),
	));
	let mail = Router::new()
		.route(
			Route::new("inbox", RecordingController::factory("inbox", &log))
				.with_child(inbox.clone()),
		)
		.route(Route::new("sent", RecordingController::factory("sent", &log)))
		.with_default_route("inbox");
	let root = Router::new()
		.route(mail_route(&log, deferred_mail.then_some(&slots)).with_child(mail.clone()))
		.route(
			Route::new(
				"settings/:section",
				RecordingController::factory("settings", &log),
			)
			.with_value("title", "Settings"),
		)
		.with_default_route("mail");

	let history = MemoryHistory::new();
	let location =
		Location::with_settings(HashLocation::new(history.clone()), root.clone(), settings);

	MailApp {
		root,
		mail,
		inbox,
		location,
		history,
		log,
		slots,
	}
}
