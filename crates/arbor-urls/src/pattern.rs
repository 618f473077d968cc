//! Path pattern compilation and matching.
//!
//! Patterns are `/`-separated strings with three kinds of tokens:
//!
//! - `:name` - captures one path segment (no `/`, `?` or `#`)
//! - `:name?` - same as `:name`, but the segment may be absent
//! - `*` - captures any character sequence, including `/`, under the
//!   reserved name [`SPLAT`]
//!
//! Everything else is matched literally (case-insensitive, anchored at both
//! ends).
//!
//! # Caching
//!
//! [`compile`] memoizes compiled patterns in a process-wide, insert-only table
//! keyed by the literal pattern text. Compiling the same literal twice returns
//! the same [`Arc`], so callers may compare results with [`Arc::ptr_eq`].
//!
//! # Splat Behavior
//!
//! Splats compile to the non-greedy group `(.*?)`. With several splats in one
//! pattern, earlier splats take the shortest text that still lets the whole
//! path match, and the last one takes the rest:
//!
//! ```
//! use arbor_urls::{ParamValue, extract_params};
//!
//! let params = extract_params("files/*/*", "files/a/b/c").unwrap().unwrap();
//! assert_eq!(params["splat"], ParamValue::from(vec!["a", "b/c"]));
//! ```
//!
//! # Optional Tokens
//!
//! An absent optional token matches an empty segment, so its separators stay
//! in the path. Injection instead drops the token together with the separator
//! that would double up. For a token in the middle of a pattern the two forms
//! differ, and the injected path does not match its own pattern:
//!
//! ```
//! use arbor_urls::{Params, compile, inject_params};
//!
//! let path = inject_params("users/:id?/posts", &Params::new()).unwrap();
//! assert_eq!(path, "users/posts");
//!
//! let compiled = compile("users/:id?/posts").unwrap();
//! assert!(!compiled.is_match(&path));
//! assert!(compiled.is_match("users//posts"));
//! ```
//!
//! A trailing optional token (`search/:term?`) round-trips: injection keeps
//! the separator in front of it.

use crate::error::{PathError, PathResult};
use crate::params::{ParamValue, Params};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::sync::Arc;

/// Parameter name reserved for `*` tokens.
pub const SPLAT: &str = "splat";

/// Maximum allowed length for a pattern string in bytes.
const MAX_PATTERN_LENGTH: usize = 1024;

/// Maximum allowed number of path segments in a pattern.
const MAX_PATH_SEGMENTS: usize = 32;

/// Maximum allowed size for a compiled pattern regex (in bytes).
const MAX_REGEX_SIZE: usize = 1 << 20; // 1 MiB

/// Capture group for a named token.
const NAMED_GROUP: &str = "([^/?#]+)";

/// Capture group for a splat token.
const SPLAT_GROUP: &str = "(.*?)";

static COMPILED_PATTERNS: Lazy<RwLock<HashMap<String, Arc<CompiledPattern>>>> =
	Lazy::new(|| RwLock::new(HashMap::new()));

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
	Literal(String),
	Named { name: String, optional: bool },
	Splat,
}

fn is_ident_start(c: char) -> bool {
	c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
	c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn tokenize(pattern: &str) -> Vec<Token> {
	let mut tokens = Vec::new();
	let mut literal = String::new();
	let mut chars = pattern.chars().peekable();

	while let Some(c) = chars.next() {
		match c {
			':' if chars.peek().is_some_and(|next| is_ident_start(*next)) => {
				if !literal.is_empty() {
					tokens.push(Token::Literal(std::mem::take(&mut literal)));
				}
				let mut name = String::new();
				while let Some(next) = chars.next_if(|next| is_ident_continue(*next)) {
					name.push(next);
				}
				let optional = chars.next_if_eq(&'?').is_some();
				tokens.push(Token::Named { name, optional });
			}
			'*' => {
				if !literal.is_empty() {
					tokens.push(Token::Literal(std::mem::take(&mut literal)));
				}
				tokens.push(Token::Splat);
			}
			_ => literal.push(c),
		}
	}

	if !literal.is_empty() {
		tokens.push(Token::Literal(literal));
	}
	tokens
}

/// A compiled path pattern: the anchored matcher and its ordered parameter
/// names.
#[derive(Debug)]
pub struct CompiledPattern {
	pattern: String,
	matcher: Regex,
	param_names: Vec<String>,
	tokens: Vec<Token>,
}

impl CompiledPattern {
	fn build(pattern: &str) -> PathResult<Self> {
		if pattern.len() > MAX_PATTERN_LENGTH {
			return Err(PathError::PatternTooLong {
				length: pattern.len(),
				max: MAX_PATTERN_LENGTH,
			});
		}

		let segment_count = pattern.split('/').count();
		if segment_count > MAX_PATH_SEGMENTS {
			return Err(PathError::TooManySegments {
				count: segment_count,
				max: MAX_PATH_SEGMENTS,
			});
		}

		let tokens = tokenize(pattern);
		let mut source = String::from("(?i)^");
		let mut param_names = Vec::new();

		for token in &tokens {
			match token {
				Token::Literal(text) => source.push_str(&regex::escape(text)),
				Token::Named { name, optional } => {
					param_names.push(name.clone());
					source.push_str(NAMED_GROUP);
					if *optional {
						source.push('?');
					}
				}
				Token::Splat => {
					param_names.push(SPLAT.to_string());
					source.push_str(SPLAT_GROUP);
				}
			}
		}
		source.push('$');

		let matcher = RegexBuilder::new(&source)
			.size_limit(MAX_REGEX_SIZE)
			.build()
			.map_err(|e| PathError::InvalidRegex {
				pattern: pattern.to_string(),
				message: e.to_string(),
			})?;

		tracing::trace!(pattern, regex = %source, "compiled path pattern");

		Ok(Self {
			pattern: pattern.to_string(),
			matcher,
			param_names,
			tokens,
		})
	}

	/// Returns the literal pattern string.
	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	/// Returns the compiled matcher.
	pub fn matcher(&self) -> &Regex {
		&self.matcher
	}

	/// Returns the parameter names in declaration order.
	///
	/// Splat tokens appear as [`SPLAT`], once per token.
	pub fn param_names(&self) -> &[String] {
		&self.param_names
	}

	/// Returns whether the pattern has no parameter tokens.
	pub fn is_exact(&self) -> bool {
		self.param_names.is_empty()
	}

	/// Number of `/`-separated segments in the pattern.
	pub fn segment_count(&self) -> usize {
		self.pattern.split('/').count()
	}

	/// Checks if `path` satisfies this pattern.
	pub fn is_match(&self, path: &str) -> bool {
		self.matcher.is_match(path)
	}

	/// Extracts parameters from `path`.
	///
	/// Returns `None` if `path` does not satisfy the pattern. Absent optional
	/// tokens are left out of the result; several splats fill a sequence in
	/// declaration order.
	pub fn extract(&self, path: &str) -> Option<Params> {
		let captures = self.matcher.captures(path)?;
		let mut params = Params::with_capacity(self.param_names.len());

		for (index, name) in self.param_names.iter().enumerate() {
			let Some(capture) = captures.get(index + 1) else {
				continue;
			};
			let value = capture.as_str().to_string();

			if name == SPLAT {
				match params.get_mut(SPLAT) {
					Some(existing) => existing.push(value),
					None => {
						params.insert(SPLAT.to_string(), ParamValue::Single(value));
					}
				}
			} else {
				params.insert(name.clone(), ParamValue::Single(value));
			}
		}

		Some(params)
	}

	/// Builds a path from this pattern, the inverse of [`extract`](Self::extract).
	///
	/// # Errors
	///
	/// Returns [`PathError::MissingParameter`] if a required token has no
	/// entry in `params`, and [`PathError::MissingSplat`] if a splat sequence
	/// runs out of entries.
	pub fn inject(&self, params: &Params) -> PathResult<String> {
		let mut path = String::with_capacity(self.pattern.len());
		let mut splat_index = 0;
		let mut omitted = false;

		for token in &self.tokens {
			match token {
				Token::Literal(text) => {
					// Drop the separator that would double up after an omitted token.
					let text = if omitted && (path.is_empty() || path.ends_with('/')) {
						text.strip_prefix('/').unwrap_or(text.as_str())
					} else {
						text.as_str()
					};
					path.push_str(text);
					omitted = false;
				}
				Token::Named { name, optional } => match params.get(name) {
					Some(value) => {
						path.push_str(&value.to_string());
						omitted = false;
					}
					None if *optional => omitted = true,
					None => {
						return Err(PathError::MissingParameter {
							name: name.clone(),
							pattern: self.pattern.clone(),
						});
					}
				},
				Token::Splat => {
					let value = params
						.get(SPLAT)
						.ok_or_else(|| PathError::MissingParameter {
							name: SPLAT.to_string(),
							pattern: self.pattern.clone(),
						})?;
					let segment = match value {
						ParamValue::Single(segment) => segment,
						ParamValue::Multiple(segments) => {
							splat_index += 1;
							segments
								.get(splat_index - 1)
								.ok_or_else(|| PathError::MissingSplat {
									index: splat_index,
									pattern: self.pattern.clone(),
								})?
						}
					};
					path.push_str(segment);
					omitted = false;
				}
			}
		}

		Ok(path)
	}
}

impl PartialEq for CompiledPattern {
	fn eq(&self, other: &Self) -> bool {
		self.pattern == other.pattern
	}
}

impl Eq for CompiledPattern {}

impl std::fmt::Display for CompiledPattern {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.pattern)
	}
}

/// Compiles `pattern`, returning the cached entry when it was compiled before.
///
/// # Errors
///
/// Returns [`PathError::PatternTooLong`] or [`PathError::TooManySegments`]
/// for patterns over the size limits, and [`PathError::InvalidRegex`] if the
/// matcher cannot be built.
pub fn compile(pattern: &str) -> PathResult<Arc<CompiledPattern>> {
	if let Some(compiled) = COMPILED_PATTERNS.read().get(pattern) {
		return Ok(Arc::clone(compiled));
	}

	let compiled = Arc::new(CompiledPattern::build(pattern)?);
	let mut cache = COMPILED_PATTERNS.write();
	// Another caller may have won the race; keep the first entry.
	Ok(Arc::clone(
		cache.entry(pattern.to_string()).or_insert(compiled),
	))
}

/// Returns whether `pattern` is already in the compiled-pattern table.
pub fn is_compiled(pattern: &str) -> bool {
	COMPILED_PATTERNS.read().contains_key(pattern)
}

/// Extracts parameters from `path` using `pattern`.
///
/// Returns `Ok(None)` when `path` does not satisfy the pattern.
pub fn extract_params(pattern: &str, path: &str) -> PathResult<Option<Params>> {
	Ok(compile(pattern)?.extract(path))
}

/// Builds a path by substituting `params` into `pattern`.
pub fn inject_params(pattern: &str, params: &Params) -> PathResult<String> {
	compile(pattern)?.inject(params)
}
