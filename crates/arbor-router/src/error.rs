//! Error types for routing and settings.

use arbor_urls::PathError;
use thiserror::Error;

/// Result type for router operations.
pub type RouterResult<T> = Result<T, RouterError>;

/// Errors raised while assembling routes or building navigation targets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RouterError {
	/// A route pattern could not be compiled or expanded.
	#[error("invalid route pattern: {0}")]
	InvalidPattern(#[from] PathError),
}

/// Errors raised while loading [`RouterSettings`](crate::RouterSettings).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),
}
