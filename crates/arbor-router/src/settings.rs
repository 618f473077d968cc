//! Router settings.
//!
//! Settings are plain data with serde defaults, so a partial TOML document
//! only overrides the keys it names:
//!
//! ```toml
//! redirect_mode = "push"
//! max_jobs_per_dispatch = 64
//! ```

use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How the router writes default-route redirects into history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedirectMode {
	/// Add a history entry for the redirect target.
	Push,
	/// Overwrite the current history entry.
	#[default]
	Replace,
}

/// Behavior knobs for a [`Location`](crate::Location) and the routers it drives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterSettings {
	/// History mode for redirects to a default route.
	pub redirect_mode: RedirectMode,
	/// Upper bound on queued navigation jobs processed by one dispatch.
	/// Exceeding it drops the remaining queue and logs an error, which breaks
	/// redirect loops between default routes.
	pub max_jobs_per_dispatch: usize,
	/// Log a warning when a load completion is dropped without being called.
	pub warn_on_dropped_completion: bool,
}

impl Default for RouterSettings {
	fn default() -> Self {
		Self {
			redirect_mode: RedirectMode::default(),
			max_jobs_per_dispatch: 256,
			warn_on_dropped_completion: true,
		}
	}
}

impl RouterSettings {
	/// Parses settings from a TOML document.
	pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
		Ok(toml::from_str(content)?)
	}

	/// Reads settings from a TOML file.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
		let path = path.as_ref();
		let content = fs::read_to_string(path)?;
		let settings = Self::from_toml_str(&content)?;
		tracing::debug!(path = %path.display(), ?settings, "loaded router settings");
		Ok(settings)
	}

	pub fn with_redirect_mode(mut self, mode: RedirectMode) -> Self {
		self.redirect_mode = mode;
		self
	}

	pub fn with_max_jobs_per_dispatch(mut self, limit: usize) -> Self {
		self.max_jobs_per_dispatch = limit;
		self
	}

	pub fn with_warn_on_dropped_completion(mut self, warn: bool) -> Self {
		self.warn_on_dropped_completion = warn;
		self
	}
}
