//! Captures tracing output for assertions.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::layer::SubscriberExt;

/// A tracing layer that captures log messages as `[LEVEL] message`.
struct LogCapture {
	logs: Arc<Mutex<Vec<String>>>,
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for LogCapture {
	fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
		struct MessageVisitor {
			message: String,
		}

		impl tracing::field::Visit for MessageVisitor {
			fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
				if field.name() == "message" {
					self.message = format!("{:?}", value);
				}
			}
		}

		let mut visitor = MessageVisitor {
			message: String::new(),
		};
		event.record(&mut visitor);

		self.logs
			.lock()
			.push(format!("[{}] {}", event.metadata().level(), visitor.message));
	}
}

/// Captured logs of the current thread while the guard lives.
pub struct CapturedLogs {
	logs: Arc<Mutex<Vec<String>>>,
	_guard: DefaultGuard,
}

impl CapturedLogs {
	pub fn lines(&self) -> Vec<String> {
		self.logs.lock().clone()
	}

	pub fn contains(&self, line: &str) -> bool {
		self.logs.lock().iter().any(|logged| logged == line)
	}
}

pub fn capture_logs() -> CapturedLogs {
	let logs = Arc::new(Mutex::new(Vec::new()));
	let capture = LogCapture {
		logs: Arc::clone(&logs),
	};
	let guard = tracing::subscriber::set_default(tracing_subscriber::registry().with(capture));
	CapturedLogs {
		logs,
		_guard: guard,
	}
}
