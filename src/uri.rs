/*!
# Reference resolution for base URIs

Minimal RFC 3986 reference resolution, sufficient for resolving href
attributes against `xml:base` chains. Only the string transformation is
implemented; no validation of the URI contents is attempted beyond what
resolution itself requires.
*/
use crate::source::Text;

/// Check whether a reference starts with a scheme, i.e. is absolute.
pub fn is_absolute(uri: &str) -> bool {
	let mut chars = uri.char_indices();
	match chars.next() {
		Some((_, c)) if c.is_ascii_alphabetic() => (),
		_ => return false,
	}
	for (_, c) in chars {
		match c {
			'a'..='z' | 'A'..='Z' | '0'..='9' | '+' | '-' | '.' => (),
			':' => return true,
			_ => return false,
		}
	}
	false
}

fn split_scheme(uri: &str) -> (&str, &str) {
	match uri.find(':') {
		Some(i) if is_absolute(uri) => (&uri[..i + 1], &uri[i + 1..]),
		_ => ("", uri),
	}
}

fn split_authority(rest: &str) -> (&str, &str) {
	if let Some(tail) = rest.strip_prefix("//") {
		let end = tail
			.find(|c| c == '/' || c == '?' || c == '#')
			.unwrap_or(tail.len());
		(&rest[..2 + end], &tail[end..])
	} else {
		("", rest)
	}
}

fn strip_fragment(uri: &str) -> &str {
	match uri.find('#') {
		Some(i) => &uri[..i],
		None => uri,
	}
}

fn strip_query(uri: &str) -> &str {
	match uri.find('?') {
		Some(i) => &uri[..i],
		None => uri,
	}
}

fn remove_dot_segments(path: &str) -> Text {
	let mut out: Vec<&str> = Vec::new();
	let absolute = path.starts_with('/');
	let trailing_slash = path.ends_with('/')
		|| path == "."
		|| path == ".."
		|| path.ends_with("/.")
		|| path.ends_with("/..");
	for seg in path.split('/') {
		match seg {
			"" | "." => (),
			".." => {
				out.pop();
			}
			_ => out.push(seg),
		}
	}
	let mut result = Text::new();
	if absolute {
		result.push('/');
	}
	result.push_str(&out.join("/"));
	if trailing_slash && !result.ends_with('/') {
		result.push('/');
	}
	result
}

fn merge_paths(base: &str, reference: &str) -> Text {
	let base_path = strip_query(strip_fragment(base));
	let (_, rest) = split_scheme(base_path);
	let (authority, path) = split_authority(rest);
	let mut merged = Text::new();
	if path.is_empty() && !authority.is_empty() {
		merged.push('/');
	} else {
		match path.rfind('/') {
			Some(i) => merged.push_str(&path[..i + 1]),
			None => (),
		}
	}
	merged.push_str(reference);
	merged
}

/// Resolve `reference` against `base`.
///
/// `base` is assumed to be an absolute URI; `reference` may be any URI
/// reference. Absolute references pass through untouched.
pub fn resolve(base: &str, reference: &str) -> Text {
	if is_absolute(reference) {
		return Text::from(reference);
	}
	let (scheme, rest) = split_scheme(base);
	let (authority, base_tail) = split_authority(rest);
	let mut out = Text::from(scheme);
	if reference.starts_with("//") {
		out.push_str(reference);
		return out;
	}
	out.push_str(authority);
	if reference.is_empty() {
		out.push_str(strip_fragment(base_tail));
		return out;
	}
	if reference.starts_with('#') {
		out.push_str(strip_fragment(base_tail));
		out.push_str(reference);
		return out;
	}
	if reference.starts_with('?') {
		out.push_str(strip_query(strip_fragment(base_tail)));
		out.push_str(reference);
		return out;
	}
	// path reference; split off its query/fragment before dot-segment
	// removal
	let path_end = reference
		.find(|c| c == '?' || c == '#')
		.unwrap_or(reference.len());
	let (ref_path, ref_tail) = reference.split_at(path_end);
	let merged = if ref_path.starts_with('/') {
		Text::from(ref_path)
	} else {
		merge_paths(base, ref_path)
	};
	out.push_str(&remove_dot_segments(&merged));
	out.push_str(ref_tail);
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn detects_absolute_references() {
		assert!(is_absolute("http://example.com/"));
		assert!(is_absolute("urn:foo"));
		assert!(is_absolute("a+b-c.d:rest"));
		assert!(!is_absolute("relative/path"));
		assert!(!is_absolute("/rooted/path"));
		assert!(!is_absolute("//host/path"));
		assert!(!is_absolute(""));
		assert!(!is_absolute("1http:x"));
		assert!(!is_absolute("http//x"));
	}

	#[test]
	fn absolute_reference_passes_through() {
		assert_eq!(
			resolve("http://a/b/c", "https://x/y").as_str(),
			"https://x/y"
		);
	}

	#[test]
	fn relative_paths() {
		let base = "http://a/b/c/d;p?q";
		assert_eq!(resolve(base, "g").as_str(), "http://a/b/c/g");
		assert_eq!(resolve(base, "g/").as_str(), "http://a/b/c/g/");
		assert_eq!(resolve(base, "/g").as_str(), "http://a/g");
		assert_eq!(resolve(base, "//g").as_str(), "http://g");
		assert_eq!(resolve(base, "g?y").as_str(), "http://a/b/c/g?y");
		assert_eq!(resolve(base, "?y").as_str(), "http://a/b/c/d;p?y");
		assert_eq!(resolve(base, "").as_str(), "http://a/b/c/d;p?q");
	}

	#[test]
	fn dot_segments() {
		let base = "http://a/b/c/d;p?q";
		assert_eq!(resolve(base, "./g").as_str(), "http://a/b/c/g");
		assert_eq!(resolve(base, ".").as_str(), "http://a/b/c/");
		assert_eq!(resolve(base, "..").as_str(), "http://a/b/");
		assert_eq!(resolve(base, "../g").as_str(), "http://a/b/g");
		assert_eq!(resolve(base, "../../g").as_str(), "http://a/g");
	}

	#[test]
	fn fragments() {
		let base = "http://a/b/c?q#f";
		assert_eq!(resolve(base, "#s").as_str(), "http://a/b/c?q#s");
		assert_eq!(resolve(base, "g#s").as_str(), "http://a/b/g#s");
		assert_eq!(resolve(base, "").as_str(), "http://a/b/c?q");
	}

	#[test]
	fn base_without_path() {
		assert_eq!(resolve("http://a", "g").as_str(), "http://a/g");
	}
}
