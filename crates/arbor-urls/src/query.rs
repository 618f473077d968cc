//! Query string parsing and serialization.
//!
//! The accepted format is `key=value&key2=value2`. Keys and values are
//! percent-decoded (`+` reads as a space). Repeated keys fold into a sequence,
//! and `key[]` always produces a sequence under `key`. Sequences serialize back
//! as repeated `key[]=value` pairs.

use crate::params::{ParamValue, Params};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Characters escaped in query keys and values (everything except the
/// unreserved set kept by `encodeURIComponent`).
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
	.remove(b'-')
	.remove(b'_')
	.remove(b'.')
	.remove(b'!')
	.remove(b'~')
	.remove(b'*')
	.remove(b'\'')
	.remove(b'(')
	.remove(b')');

const ARRAY_SUFFIX: &str = "[]";

fn encode_component(raw: &str) -> String {
	utf8_percent_encode(raw, COMPONENT).to_string()
}

fn decode_component(raw: &str) -> String {
	let spaced = raw.replace('+', " ");
	percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// Returns `path` without its query string.
pub fn without_query(path: &str) -> &str {
	path.split_once('?').map_or(path, |(base, _)| base)
}

/// Parses a raw query string (without the leading `?`).
pub fn parse_query(query: &str) -> Params {
	let mut params = Params::new();

	for pair in query.split('&') {
		if pair.is_empty() {
			continue;
		}
		let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
		let mut key = decode_component(raw_key);
		let value = decode_component(raw_value);

		let is_array = key.ends_with(ARRAY_SUFFIX);
		if is_array {
			key.truncate(key.len() - ARRAY_SUFFIX.len());
		}
		if key.is_empty() {
			continue;
		}

		match params.get_mut(&key) {
			Some(existing) => existing.push(value),
			None => {
				let value = if is_array {
					ParamValue::Multiple(vec![value])
				} else {
					ParamValue::Single(value)
				};
				params.insert(key, value);
			}
		}
	}

	params
}

/// Extracts the query parameters of `path`.
///
/// Returns `None` when `path` has no `?` or nothing follows it.
pub fn extract_query(path: &str) -> Option<Params> {
	let (_, query) = path.split_once('?')?;
	if query.is_empty() {
		return None;
	}
	Some(parse_query(query))
}

/// Serializes `params` into a query string (without the leading `?`).
pub fn stringify_query(params: &Params) -> String {
	let mut pairs = Vec::with_capacity(params.len());

	for (key, value) in params {
		let key = encode_component(key);
		match value {
			ParamValue::Single(value) => {
				pairs.push(format!("{}={}", key, encode_component(value)));
			}
			ParamValue::Multiple(values) => {
				for value in values {
					pairs.push(format!(
						"{}{}={}",
						key,
						ARRAY_SUFFIX,
						encode_component(value)
					));
				}
			}
		}
	}

	pairs.join("&")
}

/// Merges `query` into the query string already on `path`.
///
/// Keys in `query` replace existing keys of the same name in place; new keys
/// are appended. If the merged query is empty the `?` is dropped.
pub fn with_query(path: &str, query: &Params) -> String {
	let mut merged = extract_query(path).unwrap_or_default();
	for (key, value) in query {
		merged.insert(key.clone(), value.clone());
	}

	let base = without_query(path);
	let query_string = stringify_query(&merged);
	if query_string.is_empty() {
		base.to_string()
	} else {
		format!("{}?{}", base, query_string)
	}
}
