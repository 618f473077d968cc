//! Test doubles for driving routers without a UI.
//!
//! Enabled for this crate's tests and, for downstream crates, through the
//! `testing` feature.

use crate::controller::{Controller, ControllerData, LoadCompletion, LoadRequest, RenderTarget};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct LogState {
	entries: Vec<String>,
	loads: Vec<(String, ControllerData, Option<RenderTarget>)>,
}

/// Shared, ordered record of controller lifecycle calls.
///
/// Entries read `construct:<name>`, `load:<name>` and `unload:<name>`.
#[derive(Debug, Clone, Default)]
pub struct ControllerLog {
	state: Arc<Mutex<LogState>>,
}

impl ControllerLog {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn record(&self, entry: impl Into<String>) {
		self.state.lock().entries.push(entry.into());
	}

	pub fn entries(&self) -> Vec<String> {
		self.state.lock().entries.clone()
	}

	/// Returns and clears the recorded entries.
	pub fn take(&self) -> Vec<String> {
		std::mem::take(&mut self.state.lock().entries)
	}

	/// Number of entries equal to `entry`.
	pub fn count(&self, entry: &str) -> usize {
		self.state
			.lock()
			.entries
			.iter()
			.filter(|recorded| recorded.as_str() == entry)
			.count()
	}

	/// Data passed to the most recent load of the named controller.
	pub fn last_data(&self, name: &str) -> Option<ControllerData> {
		self.state
			.lock()
			.loads
			.iter()
			.rev()
			.find(|(loaded, _, _)| loaded == name)
			.map(|(_, data, _)| data.clone())
	}

	pub fn last_render_target(&self, name: &str) -> Option<RenderTarget> {
		self.state
			.lock()
			.loads
			.iter()
			.rev()
			.find(|(loaded, _, _)| loaded == name)
			.and_then(|(_, _, target)| target.clone())
	}

	fn record_load(&self, name: &str, data: ControllerData, target: Option<RenderTarget>) {
		let mut state = self.state.lock();
		state.entries.push(format!("load:{}", name));
		state.loads.push((name.to_string(), data, target));
	}
}

/// Load completions parked by deferred controllers, keyed by controller name.
#[derive(Debug, Clone, Default)]
pub struct DeferredCompletions {
	slots: Arc<Mutex<Vec<(String, LoadCompletion)>>>,
}

impl DeferredCompletions {
	pub fn new() -> Self {
		Self::default()
	}

	fn park(&self, name: &str, done: LoadCompletion) {
		self.slots.lock().push((name.to_string(), done));
	}

	/// Removes the oldest parked completion for `name`.
	pub fn take(&self, name: &str) -> Option<LoadCompletion> {
		let mut slots = self.slots.lock();
		let index = slots.iter().position(|(parked, _)| parked == name)?;
		Some(slots.remove(index).1)
	}

	/// Completes the oldest parked load of `name`.
	///
	/// Returns `false` if nothing was parked or the load was superseded. The
	/// slot lock is released before completing, so the completion may run
	/// nested loads that park again.
	pub fn complete(&self, name: &str) -> bool {
		match self.take(name) {
			Some(done) => done.complete(),
			None => false,
		}
	}

	pub fn len(&self) -> usize {
		self.slots.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.slots.lock().is_empty()
	}
}

#[derive(Debug, Clone)]
enum Completion {
	Immediate,
	Deferred(DeferredCompletions),
}

/// Controller that records its lifecycle into a [`ControllerLog`].
#[derive(Debug)]
pub struct RecordingController {
	name: String,
	log: ControllerLog,
	completion: Completion,
}

impl RecordingController {
	/// Factory for controllers that complete inside `load`.
	pub fn factory(
		name: &str,
		log: &ControllerLog,
	) -> impl Fn() -> RecordingController + Send + Sync + use<> {
		Self::factory_with(name.to_string(), log.clone(), Completion::Immediate)
	}

	/// Factory for controllers that park their completion in `slots`.
	pub fn deferred_factory(
		name: &str,
		log: &ControllerLog,
		slots: &DeferredCompletions,
	) -> impl Fn() -> RecordingController + Send + Sync + use<> {
		Self::factory_with(
			name.to_string(),
			log.clone(),
			Completion::Deferred(slots.clone()),
		)
	}

	fn factory_with(
		name: String,
		log: ControllerLog,
		completion: Completion,
	) -> impl Fn() -> RecordingController + Send + Sync + 'static {
		move || {
			log.record(format!("construct:{}", name));
			RecordingController {
				name: name.clone(),
				log: log.clone(),
				completion: completion.clone(),
			}
		}
	}
}

impl Controller for RecordingController {
	fn load(&mut self, request: LoadRequest) {
		let LoadRequest {
			data,
			render_target,
			done,
			..
		} = request;
		self.log.record_load(&self.name, data, render_target);

		match &self.completion {
			Completion::Immediate => {
				done.complete();
			}
			Completion::Deferred(slots) => slots.park(&self.name, done),
		}
	}

	fn unload(&mut self) {
		self.log.record(format!("unload:{}", self.name));
	}
}
