//! Route parameter values.
//!
//! Parameters come from two places: tokens in a path pattern and the query
//! string. Both produce [`Params`], an insertion-ordered map whose values are
//! either a single string or an ordered sequence (repeated query keys,
//! multiple splats).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered mapping from parameter name to value.
pub type Params = IndexMap<String, ParamValue>;

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
	/// A scalar value.
	Single(String),
	/// An ordered sequence of values.
	Multiple(Vec<String>),
}

impl ParamValue {
	/// Appends `value`, turning a scalar into a two-element sequence.
	pub fn push(&mut self, value: impl Into<String>) {
		let value = value.into();
		match self {
			Self::Single(existing) => {
				let first = std::mem::take(existing);
				*self = Self::Multiple(vec![first, value]);
			}
			Self::Multiple(values) => values.push(value),
		}
	}

	/// Returns the scalar value, or the first element of a sequence.
	pub fn first(&self) -> Option<&str> {
		match self {
			Self::Single(value) => Some(value),
			Self::Multiple(values) => values.first().map(String::as_str),
		}
	}

	/// Returns the scalar value, `None` for sequences.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Single(value) => Some(value),
			Self::Multiple(_) => None,
		}
	}

	/// Returns every value in order.
	pub fn values(&self) -> &[String] {
		match self {
			Self::Single(value) => std::slice::from_ref(value),
			Self::Multiple(values) => values,
		}
	}

	/// Returns `true` for sequences.
	pub fn is_multiple(&self) -> bool {
		matches!(self, Self::Multiple(_))
	}
}

impl fmt::Display for ParamValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Single(value) => f.write_str(value),
			Self::Multiple(values) => f.write_str(&values.join(",")),
		}
	}
}

impl From<String> for ParamValue {
	fn from(value: String) -> Self {
		Self::Single(value)
	}
}

impl From<&str> for ParamValue {
	fn from(value: &str) -> Self {
		Self::Single(value.to_string())
	}
}

impl From<Vec<String>> for ParamValue {
	fn from(values: Vec<String>) -> Self {
		Self::Multiple(values)
	}
}

impl From<Vec<&str>> for ParamValue {
	fn from(values: Vec<&str>) -> Self {
		Self::Multiple(values.into_iter().map(str::to_string).collect())
	}
}

impl PartialEq<&str> for ParamValue {
	fn eq(&self, other: &&str) -> bool {
		self.as_str() == Some(*other)
	}
}

/// Builds [`Params`] from `(name, value)` pairs.
pub fn params_from<I, K, V>(pairs: I) -> Params
where
	I: IntoIterator<Item = (K, V)>,
	K: Into<String>,
	V: Into<ParamValue>,
{
	pairs
		.into_iter()
		.map(|(name, value)| (name.into(), value.into()))
		.collect()
}

/// Merges query parameters into path parameters.
///
/// Path parameters keep their position and win on key collision; query-only
/// keys are appended in query order.
pub fn merge_params(path_params: Params, query_params: Option<Params>) -> Params {
	let mut merged = path_params;
	if let Some(query) = query_params {
		for (name, value) in query {
			merged.entry(name).or_insert(value);
		}
	}
	merged
}
