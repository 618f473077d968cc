//! Error types for the path pattern engine.

use thiserror::Error;

/// Result type for pattern operations.
pub type PathResult<T> = Result<T, PathError>;

/// Errors raised while compiling patterns or building paths from them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PathError {
	/// The pattern string exceeds the maximum allowed length.
	#[error("pattern length {length} exceeds maximum allowed length of {max} bytes")]
	PatternTooLong {
		/// Length of the rejected pattern in bytes.
		length: usize,
		/// Maximum allowed length in bytes.
		max: usize,
	},

	/// The pattern has more path segments than allowed.
	#[error("pattern has {count} path segments, exceeding maximum of {max}")]
	TooManySegments {
		/// Number of segments in the rejected pattern.
		count: usize,
		/// Maximum allowed number of segments.
		max: usize,
	},

	/// The generated regular expression could not be built.
	#[error("failed to compile pattern '{pattern}': {message}")]
	InvalidRegex {
		/// The offending pattern.
		pattern: String,
		/// Message reported by the regex engine.
		message: String,
	},

	/// A required parameter was not supplied when building a path.
	#[error("missing \"{name}\" parameter for path \"{pattern}\"")]
	MissingParameter {
		/// Name of the missing parameter.
		name: String,
		/// Pattern being expanded.
		pattern: String,
	},

	/// A splat token had no corresponding entry in the splat sequence.
	#[error("missing splat #{index} for path \"{pattern}\"")]
	MissingSplat {
		/// One-based index of the splat token.
		index: usize,
		/// Pattern being expanded.
		pattern: String,
	},
}
