/*!
# Content scanners

The functions in this module walk the child tokens of one open scope
(feed, entry or navigation link) and harvest its bookkeeping, stopping at
the first token which requires a state transition. They never touch the
scope stack themselves; the [`DataReader`](super::DataReader) drives them
and interprets their verdicts.

The type-discriminator sniff lives here as well; it is the only consumer
of the lookahead buffering machinery.
*/
use tracing::trace;

use crate::atom::{
	classify_relation, EL_AUTHOR, EL_CATEGORY, EL_CONTENT, EL_ENTRY, EL_FEED, EL_ID, EL_INLINE,
	EL_LINK, LinkRelation, ATTR_HREF, ATTR_REL, ATTR_SCHEME, ATTR_SRC, ATTR_TERM, ATTR_TYPE,
	EL_COUNT, EL_PROPERTIES, NS_ATOM, NS_METADATA, REL_NEXT, SCHEME_TYPE,
};
use crate::error::{
	Error, Result, SyntaxError, ERRCTX_ENTRY, ERRCTX_FEED, ERRCTX_INLINE, ERRCTX_LINK,
};
use crate::lookahead::LookaheadReader;
use crate::model::{AssociationLink, NavigationLink, SyndicationElement};
use crate::source::{NodeKind, Text, TokenSource};

use super::{EntryScope, FeedScope};

/// Verdict of one round of entry-content scanning.
pub(crate) enum EntryContent {
	/// A navigation link opens; the cursor sits on its element.
	NavigationLink(NavigationLink),
	/// The entry's end token was reached (and not consumed).
	End,
}

/// Verdict of one round of feed-content scanning.
pub(crate) enum FeedContent {
	/// A child entry opens; the cursor sits on its element.
	Entry,
	/// The feed's end token was reached (and not consumed).
	End,
}

/// Verdict of scanning into a navigation link element.
pub(crate) enum LinkContent {
	/// No expansion wrapper; the cursor sits on the link element or its
	/// end token.
	Deferred,
	/// An expansion wrapper without a payload; the cursor sits on the
	/// wrapper element or its end token.
	Empty,
	/// An expanded entry; the cursor sits on its element.
	Entry,
	/// An expanded feed; the cursor sits on its element.
	Feed,
}

/// Read the text content of the current element, consuming it entirely.
///
/// The cursor ends up on the token following the element. Child elements
/// are rejected.
pub(crate) fn read_text_element<S: TokenSource>(
	la: &mut LookaheadReader<S>,
	ctx: &'static str,
) -> Result<Text> {
	debug_assert!(la.kind() == NodeKind::Element);
	let mut buf = Text::new();
	if la.is_empty_element() {
		la.advance()?;
		return Ok(buf);
	}
	let depth = la.depth();
	loop {
		if !la.advance()? {
			return Err(Error::eof(ctx));
		}
		match la.kind() {
			NodeKind::Text => buf.push_str(la.value()),
			NodeKind::EndElement if la.depth() == depth => break,
			NodeKind::Element => {
				return Err(Error::Syntax(SyntaxError::UnexpectedElement(
					ctx,
					Text::from(la.local_name()),
				)))
			}
			_ => (),
		}
	}
	la.advance()?;
	Ok(buf)
}

/**
  Look ahead for the entity-type discriminator of the entry the cursor
  sits on.

  Buffers tokens up to the first type-scheme category child (or the end
  of the entry) and rewinds, so the entry can afterwards be read as if
  nothing had been consumed. Later type-scheme categories are ignored;
  the first one wins.
*/
pub(crate) fn sniff_type_name<S: TokenSource>(
	la: &mut LookaheadReader<S>,
) -> Result<Option<Text>> {
	debug_assert!(la.kind() == NodeKind::Element);
	if la.is_empty_element() {
		return Ok(None);
	}
	let entry_depth = la.depth();
	la.start_buffering();
	let result = sniff_type_name_inner(la, entry_depth);
	la.stop_buffering();
	if let Ok(Some(name)) = result.as_ref() {
		trace!(type_name = name.as_str(), "discriminator found");
	}
	result
}

fn sniff_type_name_inner<S: TokenSource>(
	la: &mut LookaheadReader<S>,
	entry_depth: usize,
) -> Result<Option<Text>> {
	loop {
		if !la.advance()? {
			return Err(Error::eof(ERRCTX_ENTRY));
		}
		match la.kind() {
			NodeKind::EndElement if la.depth() == entry_depth => return Ok(None),
			NodeKind::Element
				if la.depth() == entry_depth + 1
					&& la.namespace() == NS_ATOM
					&& la.local_name() == EL_CATEGORY =>
			{
				if la.attribute_value("", ATTR_SCHEME).as_deref() == Some(SCHEME_TYPE) {
					return match la.attribute_value("", ATTR_TERM) {
						Some(term) => Ok(Some(term)),
						None => Err(Error::Syntax(SyntaxError::MissingAttribute(
							EL_CATEGORY,
							ATTR_TERM,
						))),
					};
				}
			}
			_ => (),
		}
	}
}

/// Scan entry children until a navigation link opens or the entry ends.
pub(crate) fn scan_entry_content<S: TokenSource, P>(
	la: &mut LookaheadReader<S>,
	scope: &mut EntryScope<P>,
) -> Result<EntryContent> {
	loop {
		match la.kind() {
			NodeKind::EndOfInput => return Err(Error::eof(ERRCTX_ENTRY)),
			NodeKind::EndElement if la.depth() == scope.element_depth => {
				return Ok(EntryContent::End)
			}
			NodeKind::Element if la.depth() == scope.element_depth + 1 => {
				if let Some(link) = scan_entry_child(la, scope)? {
					return Ok(EntryContent::NavigationLink(link));
				}
			}
			_ => {
				la.advance()?;
			}
		}
	}
}

fn is_syndication_element(name: &str) -> bool {
	match name {
		"title" | "summary" | "updated" | "published" | "rights" => true,
		_ => false,
	}
}

fn scan_entry_child<S: TokenSource, P>(
	la: &mut LookaheadReader<S>,
	scope: &mut EntryScope<P>,
) -> Result<Option<NavigationLink>> {
	let namespace = Text::from(la.namespace());
	let name = Text::from(la.local_name());
	if namespace == NS_ATOM {
		match name.as_str() {
			EL_ID => {
				if scope.entry_mut().id.is_some() {
					return Err(Error::Syntax(SyntaxError::DuplicateElement(EL_ID)));
				}
				let id = read_text_element(la, ERRCTX_ENTRY)?;
				scope.entry_mut().id = Some(id);
			}
			EL_CONTENT => scan_content_element(la, scope)?,
			EL_LINK => return scan_entry_link(la, scope),
			EL_CATEGORY | EL_AUTHOR => {
				la.skip()?;
			}
			other if is_syndication_element(other) => {
				let value = read_text_element(la, ERRCTX_ENTRY)?;
				scope.entry_mut().syndication.push(SyndicationElement {
					local_name: name,
					value,
				});
			}
			_ => {
				la.skip()?;
			}
		}
	} else if namespace == NS_METADATA && name == EL_PROPERTIES {
		// properties outside content only occur on media link entries
		scope.set_media(true, "a properties element outside content")?;
		la.skip()?;
	} else {
		la.skip()?;
	}
	Ok(None)
}

/// Handle an `atom:content` child of an entry.
///
/// A content element referencing an external source marks the entry as a
/// media link entry and must itself stay empty.
fn scan_content_element<S: TokenSource, P>(
	la: &mut LookaheadReader<S>,
	scope: &mut EntryScope<P>,
) -> Result<()> {
	if scope.content_seen {
		return Err(Error::Syntax(SyntaxError::DuplicateElement(EL_CONTENT)));
	}
	scope.content_seen = true;
	let content_type = la.attribute_value("", ATTR_TYPE);
	let src = match la.attribute_value("", ATTR_SRC) {
		Some(src) => src,
		None => {
			scope.set_media(false, "a content element without a source")?;
			la.skip()?;
			return Ok(());
		}
	};
	scope.set_media(true, "a content element with a source")?;
	let resolved = la.resolve_uri(&src);
	let media = scope.media_mut();
	media.source_url = Some(resolved);
	media.content_type = content_type;
	if la.is_empty_element() {
		la.advance()?;
		return Ok(());
	}
	let depth = la.depth();
	loop {
		if !la.advance()? {
			return Err(Error::eof(ERRCTX_ENTRY));
		}
		match la.kind() {
			NodeKind::EndElement if la.depth() == depth => break,
			NodeKind::Text if la.value().trim().is_empty() => (),
			NodeKind::Element => {
				return Err(Error::Syntax(SyntaxError::UnexpectedElement(
					ERRCTX_ENTRY,
					Text::from(la.local_name()),
				)))
			}
			_ => {
				return Err(Error::Syntax(SyntaxError::UnexpectedElement(
					ERRCTX_ENTRY,
					Text::from("#text"),
				)))
			}
		}
	}
	la.advance()?;
	Ok(())
}

fn scan_entry_link<S: TokenSource, P>(
	la: &mut LookaheadReader<S>,
	scope: &mut EntryScope<P>,
) -> Result<Option<NavigationLink>> {
	let rel = match la.attribute_value("", ATTR_REL) {
		Some(rel) => rel,
		None => {
			la.skip()?;
			return Ok(None);
		}
	};
	let resolved = match la.attribute_value("", ATTR_HREF) {
		Some(href) => Some(la.resolve_uri(&href)),
		None => None,
	};
	match classify_relation(&rel) {
		LinkRelation::Navigation(link_name) => {
			if !scope.seen_links.insert(link_name) {
				return Err(Error::Syntax(SyntaxError::DuplicateName(
					EL_LINK,
					Text::from(link_name),
				)));
			}
			let mut link = NavigationLink::named(link_name);
			link.url = resolved;
			link.content_type = la.attribute_value("", ATTR_TYPE);
			return Ok(Some(link));
		}
		LinkRelation::Edit => {
			if scope.entry_mut().edit_link.is_some() {
				return Err(Error::Syntax(SyntaxError::DuplicateName(
					EL_LINK,
					rel.clone(),
				)));
			}
			scope.entry_mut().edit_link = resolved;
		}
		LinkRelation::SelfRead => {
			if scope.entry_mut().read_link.is_some() {
				return Err(Error::Syntax(SyntaxError::DuplicateName(
					EL_LINK,
					rel.clone(),
				)));
			}
			scope.entry_mut().read_link = resolved;
		}
		LinkRelation::EditMedia => {
			scope.set_media(true, "an edit-media link")?;
			let etag = la.attribute_value(NS_METADATA, crate::atom::ATTR_ETAG);
			let media = scope.media_mut();
			if media.edit_url.is_some() {
				return Err(Error::Syntax(SyntaxError::DuplicateName(
					EL_LINK,
					rel.clone(),
				)));
			}
			media.edit_url = resolved;
			media.etag = etag;
		}
		LinkRelation::Association(link_name) => {
			let url = match resolved {
				Some(url) => url,
				None => {
					return Err(Error::Syntax(SyntaxError::MissingAttribute(
						EL_LINK, ATTR_HREF,
					)))
				}
			};
			let entry = scope.entry_mut();
			if entry.association_links.iter().any(|l| l.name == link_name) {
				return Err(Error::Syntax(SyntaxError::DuplicateName(
					EL_LINK,
					Text::from(link_name),
				)));
			}
			entry.association_links.push(AssociationLink {
				name: Text::from(link_name),
				url,
			});
		}
		LinkRelation::StreamEdit(stream_name) => {
			let etag = la.attribute_value(NS_METADATA, crate::atom::ATTR_ETAG);
			let content_type = la.attribute_value("", ATTR_TYPE);
			let stream = scope.stream_property_mut(stream_name);
			if stream.edit_url.is_some() {
				return Err(Error::Syntax(SyntaxError::DuplicateName(
					EL_LINK,
					Text::from(stream_name),
				)));
			}
			stream.edit_url = resolved;
			stream.etag = etag;
			if stream.content_type.is_none() {
				stream.content_type = content_type;
			}
		}
		LinkRelation::StreamRead(stream_name) => {
			let content_type = la.attribute_value("", ATTR_TYPE);
			let stream = scope.stream_property_mut(stream_name);
			if stream.read_url.is_some() {
				return Err(Error::Syntax(SyntaxError::DuplicateName(
					EL_LINK,
					Text::from(stream_name),
				)));
			}
			stream.read_url = resolved;
			if stream.content_type.is_none() {
				stream.content_type = content_type;
			}
		}
		LinkRelation::Unrecognized => (),
	}
	la.skip()?;
	Ok(None)
}

/// Scan feed children until a child entry opens or the feed ends.
pub(crate) fn scan_feed_content<S: TokenSource>(
	la: &mut LookaheadReader<S>,
	scope: &mut FeedScope,
) -> Result<FeedContent> {
	loop {
		match la.kind() {
			NodeKind::EndOfInput => return Err(Error::eof(ERRCTX_FEED)),
			NodeKind::EndElement if la.depth() == scope.element_depth => {
				return Ok(FeedContent::End)
			}
			NodeKind::Element if la.depth() == scope.element_depth + 1 => {
				if scan_feed_child(la, scope)? {
					return Ok(FeedContent::Entry);
				}
			}
			_ => {
				la.advance()?;
			}
		}
	}
}

fn scan_feed_child<S: TokenSource>(
	la: &mut LookaheadReader<S>,
	scope: &mut FeedScope,
) -> Result<bool> {
	let namespace = Text::from(la.namespace());
	let name = Text::from(la.local_name());
	if namespace == NS_ATOM {
		match name.as_str() {
			EL_ENTRY => return Ok(true),
			EL_ID => {
				if scope.item.id.is_some() {
					return Err(Error::Syntax(SyntaxError::DuplicateElement(EL_ID)));
				}
				scope.item.id = Some(read_text_element(la, ERRCTX_FEED)?);
			}
			EL_LINK => {
				if la.attribute_value("", ATTR_REL).as_deref() == Some(REL_NEXT) {
					if scope.item.next_page_link.is_some() {
						return Err(Error::Syntax(SyntaxError::DuplicateName(
							EL_LINK,
							Text::from(REL_NEXT),
						)));
					}
					let href = match la.attribute_value("", ATTR_HREF) {
						Some(href) => href,
						None => {
							return Err(Error::Syntax(SyntaxError::MissingAttribute(
								EL_LINK, ATTR_HREF,
							)))
						}
					};
					scope.item.next_page_link = Some(la.resolve_uri(&href));
				}
				la.skip()?;
			}
			EL_AUTHOR => {
				scope.author_seen = true;
				la.skip()?;
			}
			_ => {
				la.skip()?;
			}
		}
	} else if namespace == NS_METADATA && name == EL_COUNT {
		if scope.item.count.is_some() {
			return Err(Error::Syntax(SyntaxError::DuplicateElement(EL_COUNT)));
		}
		let value = read_text_element(la, ERRCTX_FEED)?;
		scope.item.count = Some(match value.trim().parse::<i64>() {
			Ok(count) => count,
			Err(_) => return Err(Error::Syntax(SyntaxError::InvalidCount(value))),
		});
	} else {
		la.skip()?;
	}
	Ok(false)
}

/// Look into a navigation link element for an expansion wrapper and its
/// payload.
///
/// On [`LinkContent::Entry`] and [`LinkContent::Feed`] the cursor sits on
/// the payload's root element; on the other verdicts it sits where the
/// variant documentation says.
pub(crate) fn scan_link_content<S: TokenSource>(
	la: &mut LookaheadReader<S>,
	link_depth: usize,
) -> Result<LinkContent> {
	debug_assert!(la.kind() == NodeKind::Element);
	if la.is_empty_element() {
		return Ok(LinkContent::Deferred);
	}
	loop {
		if !la.advance()? {
			return Err(Error::eof(ERRCTX_LINK));
		}
		match la.kind() {
			NodeKind::EndElement if la.depth() == link_depth => return Ok(LinkContent::Deferred),
			NodeKind::Element
				if la.depth() == link_depth + 1
					&& la.namespace() == NS_METADATA
					&& la.local_name() == EL_INLINE =>
			{
				return scan_inline_content(la, link_depth);
			}
			NodeKind::Element if la.depth() == link_depth + 1 => {
				la.skip()?;
				// skip leaves the cursor past the child already; avoid
				// advancing over the following token
				return scan_link_content_resumed(la, link_depth);
			}
			_ => (),
		}
	}
}

fn scan_link_content_resumed<S: TokenSource>(
	la: &mut LookaheadReader<S>,
	link_depth: usize,
) -> Result<LinkContent> {
	loop {
		match la.kind() {
			NodeKind::EndOfInput => return Err(Error::eof(ERRCTX_LINK)),
			NodeKind::EndElement if la.depth() == link_depth => return Ok(LinkContent::Deferred),
			NodeKind::Element
				if la.depth() == link_depth + 1
					&& la.namespace() == NS_METADATA
					&& la.local_name() == EL_INLINE =>
			{
				return scan_inline_content(la, link_depth);
			}
			NodeKind::Element if la.depth() == link_depth + 1 => {
				la.skip()?;
			}
			_ => {
				la.advance()?;
			}
		}
	}
}

fn scan_inline_content<S: TokenSource>(
	la: &mut LookaheadReader<S>,
	link_depth: usize,
) -> Result<LinkContent> {
	if la.is_empty_element() {
		return Ok(LinkContent::Empty);
	}
	loop {
		if !la.advance()? {
			return Err(Error::eof(ERRCTX_INLINE));
		}
		match la.kind() {
			NodeKind::EndElement if la.depth() == link_depth + 1 => {
				return Ok(LinkContent::Empty)
			}
			NodeKind::Element if la.namespace() == NS_ATOM && la.local_name() == EL_ENTRY => {
				return Ok(LinkContent::Entry)
			}
			NodeKind::Element if la.namespace() == NS_ATOM && la.local_name() == EL_FEED => {
				return Ok(LinkContent::Feed)
			}
			NodeKind::Element => {
				return Err(Error::Syntax(SyntaxError::UnexpectedElement(
					ERRCTX_INLINE,
					Text::from(la.local_name()),
				)))
			}
			_ => (),
		}
	}
}

/// Consume the rest of a navigation link after its expanded payload was
/// fully read, rejecting further payloads and wrappers.
///
/// Entered with the cursor inside the expansion wrapper, just past the
/// payload's end token; leaves it on the link's end token.
pub(crate) fn read_link_tail_after_expansion<S: TokenSource>(
	la: &mut LookaheadReader<S>,
	link_depth: usize,
) -> Result<()> {
	loop {
		match la.kind() {
			NodeKind::EndOfInput => return Err(Error::eof(ERRCTX_INLINE)),
			NodeKind::EndElement if la.depth() == link_depth + 1 => {
				la.advance()?;
				break;
			}
			NodeKind::Element => {
				return Err(Error::Syntax(SyntaxError::DuplicateExpandedContent))
			}
			_ => {
				la.advance()?;
			}
		}
	}
	read_link_remainder(la, link_depth)
}

/// Consume the rest of a navigation link after an empty expansion
/// wrapper; leaves the cursor on the link's end token.
pub(crate) fn read_link_tail_after_empty<S: TokenSource>(
	la: &mut LookaheadReader<S>,
	link_depth: usize,
) -> Result<()> {
	// step past the wrapper element or its end token
	la.advance()?;
	read_link_remainder(la, link_depth)
}

fn read_link_remainder<S: TokenSource>(
	la: &mut LookaheadReader<S>,
	link_depth: usize,
) -> Result<()> {
	loop {
		match la.kind() {
			NodeKind::EndOfInput => return Err(Error::eof(ERRCTX_LINK)),
			NodeKind::EndElement if la.depth() == link_depth => return Ok(()),
			NodeKind::Element
				if la.namespace() == NS_METADATA && la.local_name() == EL_INLINE =>
			{
				return Err(Error::Syntax(SyntaxError::DuplicateExpansion))
			}
			NodeKind::Element => {
				la.skip()?;
			}
			_ => {
				la.advance()?;
			}
		}
	}
}
