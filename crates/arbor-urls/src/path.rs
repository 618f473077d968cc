//! Segment-level path helpers.

/// Splits `path` after its first `count` `/`-separated segments.
///
/// Returns `(target, remainder)` without the separator between them, or
/// `None` when `path` has fewer than `count` segments. An empty path counts
/// as one (empty) segment.
///
/// ```
/// use arbor_urls::split_segments;
///
/// assert_eq!(split_segments("module/inbox/42", 1), Some(("module", "inbox/42")));
/// assert_eq!(split_segments("module/inbox", 2), Some(("module/inbox", "")));
/// assert_eq!(split_segments("module", 2), None);
/// ```
pub fn split_segments(path: &str, count: usize) -> Option<(&str, &str)> {
	if count == 0 {
		return Some(("", path));
	}

	let mut separators = path.match_indices('/').map(|(index, _)| index);
	match separators.nth(count - 1) {
		Some(index) => Some((&path[..index], &path[index + 1..])),
		None => {
			let segments = path.matches('/').count() + 1;
			(segments == count).then_some((path, ""))
		}
	}
}

/// Joins non-empty path parts with `/`.
pub fn join_segments<'a, I>(parts: I) -> String
where
	I: IntoIterator<Item = &'a str>,
{
	parts
		.into_iter()
		.filter(|part| !part.is_empty())
		.collect::<Vec<_>>()
		.join("/")
}

/// Prefixes `path` with `/` unless it already starts with one.
pub fn ensure_leading_slash(path: &str) -> String {
	if path.starts_with('/') {
		path.to_string()
	} else {
		format!("/{}", path)
	}
}
