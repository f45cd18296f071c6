/*!
# Wire-format names

Namespace URIs, element and attribute names, link relations and content
types of the Atom data-service payload format, plus the link-relation
classifier.
*/

/// Atom 1.0 namespace.
pub const NS_ATOM: &'static str = "http://www.w3.org/2005/Atom";
/// Data-service metadata namespace (`m:` constructs).
pub const NS_METADATA: &'static str =
	"http://schemas.microsoft.com/ado/2007/08/dataservices/metadata";
/// Data-service data namespace (property payloads).
pub const NS_DATA: &'static str = "http://schemas.microsoft.com/ado/2007/08/dataservices";
/// XML core namespace (for `xml:base`).
pub const NS_XML: &'static str = "http://www.w3.org/XML/1998/namespace";

pub const EL_FEED: &'static str = "feed";
pub const EL_ENTRY: &'static str = "entry";
pub const EL_ID: &'static str = "id";
pub const EL_LINK: &'static str = "link";
pub const EL_CATEGORY: &'static str = "category";
pub const EL_CONTENT: &'static str = "content";
pub const EL_AUTHOR: &'static str = "author";
pub const EL_INLINE: &'static str = "inline";
pub const EL_COUNT: &'static str = "count";
pub const EL_PROPERTIES: &'static str = "properties";
pub const EL_ERROR: &'static str = "error";
pub const EL_CODE: &'static str = "code";
pub const EL_MESSAGE: &'static str = "message";
pub const EL_INNER_ERROR: &'static str = "innererror";
pub const EL_INTERNAL_EXCEPTION: &'static str = "internalexception";
pub const EL_TYPE: &'static str = "type";
pub const EL_STACK_TRACE: &'static str = "stacktrace";

pub const ATTR_BASE: &'static str = "base";
pub const ATTR_ETAG: &'static str = "etag";
pub const ATTR_REL: &'static str = "rel";
pub const ATTR_HREF: &'static str = "href";
pub const ATTR_SRC: &'static str = "src";
pub const ATTR_TYPE: &'static str = "type";
pub const ATTR_SCHEME: &'static str = "scheme";
pub const ATTR_TERM: &'static str = "term";

/// Category scheme marking the entity-type discriminator.
pub const SCHEME_TYPE: &'static str = "http://schemas.microsoft.com/ado/2007/08/dataservices/scheme";

pub const REL_EDIT: &'static str = "edit";
pub const REL_SELF: &'static str = "self";
pub const REL_EDIT_MEDIA: &'static str = "edit-media";
pub const REL_NEXT: &'static str = "next";

/// Relation prefix marking navigation links; the suffix is the link name.
pub const REL_NAVIGATION_PREFIX: &'static str =
	"http://schemas.microsoft.com/ado/2007/08/dataservices/related/";
/// Relation prefix marking association links.
pub const REL_ASSOCIATION_PREFIX: &'static str =
	"http://schemas.microsoft.com/ado/2007/08/dataservices/relatedlinks/";
/// Relation prefix marking named-stream edit links.
pub const REL_STREAM_EDIT_PREFIX: &'static str =
	"http://schemas.microsoft.com/ado/2007/08/dataservices/edit-media/";
/// Relation prefix marking named-stream read links.
pub const REL_STREAM_READ_PREFIX: &'static str =
	"http://schemas.microsoft.com/ado/2007/08/dataservices/mediaresource/";

pub const MIME_FEED: &'static str = "application/atom+xml;type=feed";
pub const MIME_ENTRY: &'static str = "application/atom+xml;type=entry";

/// Classified relation of an `atom:link` inside an entry.
///
/// The name-carrying variants borrow the suffix of the relation value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRelation<'a> {
	/// `rel="edit"`
	Edit,
	/// `rel="self"`
	SelfRead,
	/// `rel="edit-media"`
	EditMedia,
	/// Navigation link; carries the navigation property name.
	Navigation(&'a str),
	/// Association link; carries the navigation property name.
	Association(&'a str),
	/// Named-stream edit link; carries the stream property name.
	StreamEdit(&'a str),
	/// Named-stream read link; carries the stream property name.
	StreamRead(&'a str),
	/// Anything else (`alternate`, extension relations, ...).
	Unrecognized,
}

/// Classify a link relation value.
///
/// Standard relations are matched exactly, prefixed relations by prefix, in
/// one ordered pass. A prefixed relation with an empty suffix is
/// unrecognized rather than a nameless link.
pub fn classify_relation<'a>(rel: &'a str) -> LinkRelation<'a> {
	match rel {
		REL_EDIT => return LinkRelation::Edit,
		REL_SELF => return LinkRelation::SelfRead,
		REL_EDIT_MEDIA => return LinkRelation::EditMedia,
		_ => (),
	}
	for (prefix, wrap) in [
		(
			REL_NAVIGATION_PREFIX,
			LinkRelation::Navigation as fn(&'a str) -> LinkRelation<'a>,
		),
		(REL_ASSOCIATION_PREFIX, LinkRelation::Association),
		(REL_STREAM_EDIT_PREFIX, LinkRelation::StreamEdit),
		(REL_STREAM_READ_PREFIX, LinkRelation::StreamRead),
	]
	.iter()
	{
		if rel.len() > prefix.len() && rel.starts_with(prefix) {
			return wrap(&rel[prefix.len()..]);
		}
	}
	LinkRelation::Unrecognized
}

/// Derive collection multiplicity from a link `type` attribute.
///
/// Returns `Some(true)` for the feed content type, `Some(false)` for the
/// entry content type and `None` for anything else. Whitespace around the
/// `;` separator and ASCII case differences are tolerated.
pub fn collection_from_content_type(value: &str) -> Option<bool> {
	let mut normalized = String::with_capacity(value.len());
	for ch in value.chars() {
		if !ch.is_ascii_whitespace() {
			normalized.extend(ch.to_lowercase());
		}
	}
	if normalized == MIME_FEED {
		Some(true)
	} else if normalized == MIME_ENTRY {
		Some(false)
	} else {
		None
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn classify_standard_relations() {
		assert_eq!(classify_relation("edit"), LinkRelation::Edit);
		assert_eq!(classify_relation("self"), LinkRelation::SelfRead);
		assert_eq!(classify_relation("edit-media"), LinkRelation::EditMedia);
		assert_eq!(classify_relation("alternate"), LinkRelation::Unrecognized);
	}

	#[test]
	fn classify_prefixed_relations() {
		let rel = format!("{}Orders", REL_NAVIGATION_PREFIX);
		assert_eq!(classify_relation(&rel), LinkRelation::Navigation("Orders"));
		let rel = format!("{}Orders", REL_ASSOCIATION_PREFIX);
		assert_eq!(classify_relation(&rel), LinkRelation::Association("Orders"));
		let rel = format!("{}Thumbnail", REL_STREAM_EDIT_PREFIX);
		assert_eq!(classify_relation(&rel), LinkRelation::StreamEdit("Thumbnail"));
		let rel = format!("{}Thumbnail", REL_STREAM_READ_PREFIX);
		assert_eq!(classify_relation(&rel), LinkRelation::StreamRead("Thumbnail"));
	}

	#[test]
	fn classify_empty_suffix_is_unrecognized() {
		assert_eq!(
			classify_relation(REL_NAVIGATION_PREFIX),
			LinkRelation::Unrecognized
		);
	}

	#[test]
	fn collection_from_content_type_variants() {
		assert_eq!(
			collection_from_content_type("application/atom+xml;type=feed"),
			Some(true)
		);
		assert_eq!(
			collection_from_content_type("application/atom+xml; type=entry"),
			Some(false)
		);
		assert_eq!(
			collection_from_content_type("APPLICATION/ATOM+XML;TYPE=FEED"),
			Some(true)
		);
		assert_eq!(collection_from_content_type("text/plain"), None);
	}
}
