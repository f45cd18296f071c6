/*!
# Structural results

Plain value types accumulated by the reader while it walks a payload.
These carry only what the structural pass itself extracts; property
contents are not materialized here.
*/
use std::collections::HashSet;

use crate::source::Text;

/// Bookkeeping for an `atom:feed` element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feed {
	/// Value of the `atom:id` child, if one was seen.
	pub id: Option<Text>,
	/// Value of the `m:count` child, if one was seen.
	pub count: Option<i64>,
	/// Resolved href of the `atom:link` with `rel="next"`, if any.
	pub next_page_link: Option<Text>,
}

/// A syndication text element captured from an entry (title, summary,
/// updated, published, rights).
#[derive(Debug, Clone, PartialEq)]
pub struct SyndicationElement {
	pub local_name: Text,
	pub value: Text,
}

/// Default-stream information of a media link entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaResource {
	/// Resolved `src` of the `atom:content` element.
	pub source_url: Option<Text>,
	/// Resolved href of the `edit-media` link.
	pub edit_url: Option<Text>,
	/// Content type announced on `atom:content`.
	pub content_type: Option<Text>,
	/// Value of `m:etag` on the `edit-media` link.
	pub etag: Option<Text>,
}

/// An association link (`rel` under the related-links prefix).
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationLink {
	pub name: Text,
	pub url: Text,
}

/// A named stream of an entry, merged from its `edit-media` and
/// `mediaresource` links.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamProperty {
	pub name: Text,
	pub edit_url: Option<Text>,
	pub read_url: Option<Text>,
	pub content_type: Option<Text>,
	pub etag: Option<Text>,
}

/// Bookkeeping for an `atom:entry` element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entry {
	/// Value of the `atom:id` child, if one was seen.
	pub id: Option<Text>,
	/// Type name from the discriminating `atom:category`, if any.
	pub type_name: Option<Text>,
	/// Value of `m:etag` on the entry element.
	pub etag: Option<Text>,
	/// Resolved href of the `edit` link.
	pub edit_link: Option<Text>,
	/// Resolved href of the `self` link.
	pub read_link: Option<Text>,
	/// Default-stream information; present iff media-typed markup was
	/// seen.
	pub media_resource: Option<MediaResource>,
	/// Final media-link-entry verdict, fixed when the entry completes.
	pub media_link_entry: bool,
	pub association_links: Vec<AssociationLink>,
	pub stream_properties: Vec<StreamProperty>,
	pub syndication: Vec<SyndicationElement>,
}

/// Bookkeeping for a navigation link while its scope is open.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationLink {
	/// Link name, i.e. the rel suffix after the related prefix.
	pub name: Text,
	/// Resolved href, if present.
	pub url: Option<Text>,
	/// Multiplicity of the link target. Sticky once known: set from
	/// metadata, from the content type, or from the expanded payload.
	pub is_collection: Option<bool>,
	/// Raw `type` attribute of the link element.
	pub content_type: Option<Text>,
}

impl NavigationLink {
	pub fn named(name: &str) -> NavigationLink {
		NavigationLink {
			name: Text::from(name),
			url: None,
			is_collection: None,
			content_type: None,
		}
	}
}

/// Tracks names seen so far to reject duplicates.
#[derive(Debug, Clone, Default)]
pub struct DuplicateChecker(HashSet<Text>);

impl DuplicateChecker {
	pub fn new() -> DuplicateChecker {
		DuplicateChecker(HashSet::new())
	}

	/// Record a name. Returns false if it was already present.
	pub fn insert(&mut self, name: &str) -> bool {
		self.0.insert(Text::from(name))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn duplicate_checker() {
		let mut seen = DuplicateChecker::new();
		assert!(seen.insert("Orders"));
		assert!(seen.insert("Customer"));
		assert!(!seen.insert("Orders"));
	}
}
