/*!
# Structural pull reader

[`DataReader`] is the crate's main interface: it turns the token stream
of a data-service payload into a sequence of structural states. Each call
to [`DataReader::read`] performs one transition; between calls the
current scope's bookkeeping is available through the accessors.

The grammar recognized is

```text
Payload        := Entry | Feed
Feed           := FeedStart Entry* FeedEnd
Entry          := EntryStart NavigationLink* EntryEnd
NavigationLink := NavigationLinkStart (Feed | Entry | nothing) NavigationLinkEnd
```

with a full payload walk visiting `Start` before the root and `Completed`
after it. The reader keeps a stack of open scopes mirroring the grammar;
the stack depth is bounded by the payload's nesting, while each `read`
call uses constant stack space regardless of how deep the markup nests.

An expansion inside a navigation link which carries no payload is
surfaced as a *null entry*: an entry scope whose entry value is absent.
This keeps the caller's walk uniform, one entry-shaped hole per
single-valued expansion.
*/
use tracing::{debug, trace};

use crate::atom::{collection_from_content_type, ATTR_ETAG, EL_ENTRY, EL_FEED, NS_ATOM, NS_METADATA};
use crate::error::{Error, Result, SyntaxError, ERRCTX_POSTAMBLE, ERRCTX_PREAMBLE};
use crate::lookahead::LookaheadReader;
use crate::meta::{EntityType, Model, NullModel, ProtocolVersion, RcPtr, ReaderOptions};
use crate::model::{DuplicateChecker, Entry, Feed, MediaResource, NavigationLink};
use crate::source::{NodeKind, Text, TokenSource};

mod content;

use content::{
	read_link_tail_after_empty, read_link_tail_after_expansion, scan_entry_content,
	scan_feed_content, scan_link_content, sniff_type_name, EntryContent, FeedContent, LinkContent,
};

/// Kind of payload a reader expects at the document root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
	Feed,
	Entry,
}

/// Structural state a reader can rest in between [`DataReader::read`]
/// calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
	/// Before the payload root was read.
	Start,
	/// A feed scope has opened; its metadata up to the first entry is
	/// available.
	FeedStart,
	/// A feed scope has been fully read.
	FeedEnd,
	/// An entry scope has opened; everything up to its first navigation
	/// link is available.
	EntryStart,
	/// An entry scope has been fully read.
	EntryEnd,
	/// A navigation link scope has opened.
	NavigationLinkStart,
	/// A navigation link scope has been fully read.
	NavigationLinkEnd,
	/// The whole payload has been read.
	Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
	Start,
	End,
}

pub(crate) struct FeedScope {
	pub(crate) item: Feed,
	phase: Phase,
	expected_type: Option<RcPtr<EntityType>>,
	pub(crate) element_depth: usize,
	at_end: bool,
	pub(crate) author_seen: bool,
}

pub(crate) struct EntryScope<P> {
	/// None for the placeholder entry of an empty expansion.
	pub(crate) item: Option<Entry>,
	phase: Phase,
	entity_type: Option<RcPtr<EntityType>>,
	projection: Option<P>,
	pub(crate) element_depth: usize,
	pub(crate) seen_links: DuplicateChecker,
	pub(crate) content_seen: bool,
	media_decided: Option<bool>,
	first_link: Option<NavigationLink>,
}

impl<P> EntryScope<P> {
	fn null() -> EntryScope<P> {
		EntryScope {
			item: None,
			phase: Phase::Start,
			entity_type: None,
			projection: None,
			element_depth: 0,
			seen_links: DuplicateChecker::new(),
			content_seen: false,
			media_decided: None,
			first_link: None,
		}
	}

	pub(crate) fn entry_mut(&mut self) -> &mut Entry {
		match self.item.as_mut() {
			Some(entry) => entry,
			None => unreachable!("content scanned for a placeholder entry"),
		}
	}

	/// Record a media-link-entry signal. The first signal decides; a
	/// later contradicting one is an error.
	pub(crate) fn set_media(&mut self, is_mle: bool, signal: &'static str) -> Result<()> {
		match self.media_decided {
			Some(decided) if decided != is_mle => Err(Error::Syntax(
				SyntaxError::MediaResourceContradiction(signal),
			)),
			_ => {
				self.media_decided = Some(is_mle);
				if is_mle && self.entry_mut().media_resource.is_none() {
					self.entry_mut().media_resource = Some(MediaResource::default());
				}
				Ok(())
			}
		}
	}

	pub(crate) fn media_mut(&mut self) -> &mut MediaResource {
		let entry = self.entry_mut();
		if entry.media_resource.is_none() {
			entry.media_resource = Some(MediaResource::default());
		}
		match entry.media_resource.as_mut() {
			Some(media) => media,
			None => unreachable!(),
		}
	}

	pub(crate) fn stream_property_mut(
		&mut self,
		name: &str,
	) -> &mut crate::model::StreamProperty {
		let entry = self.entry_mut();
		if let Some(i) = entry
			.stream_properties
			.iter()
			.position(|s| s.name == name)
		{
			return &mut entry.stream_properties[i];
		}
		entry.stream_properties.push(crate::model::StreamProperty {
			name: Text::from(name),
			..crate::model::StreamProperty::default()
		});
		let last = entry.stream_properties.len() - 1;
		&mut entry.stream_properties[last]
	}
}

struct NavScope {
	item: NavigationLink,
	phase: Phase,
	element_depth: usize,
	target_type: Option<RcPtr<EntityType>>,
}

enum Scope<P> {
	Start,
	Completed,
	Feed(FeedScope),
	Entry(EntryScope<P>),
	NavigationLink(NavScope),
}

/// Fix the entry's media verdict, run the model's post-processing and
/// move the scope into its end phase.
fn finish_entry<M: Model>(
	model: &M,
	version: ProtocolVersion,
	scope: &mut EntryScope<M::Projection>,
) -> Result<()> {
	if let Some(entry) = scope.item.as_mut() {
		entry.media_link_entry = scope.media_decided.unwrap_or(false);
		if let Some(projection) = scope.projection.as_ref() {
			model.apply_mappings(projection, entry, version)?;
		}
		model.validate_entry(entry, scope.entity_type.as_ref())?;
	}
	scope.phase = Phase::End;
	Ok(())
}

/**
# Pull reader for data-service payloads

Create one over a [`TokenSource`] positioned at the start of a document,
then drive it with [`Self::read`] until it reports no further
transitions:

```no_run
# use ratom::reader::{DataReader, PayloadKind, State};
# use ratom::source::VecSource;
# fn example(source: VecSource) -> Result<(), ratom::error::Error> {
let mut reader = DataReader::new(source, PayloadKind::Feed);
while reader.read()? {
	match reader.state() {
		State::EntryEnd => {
			if let Some(entry) = reader.current_entry() {
				println!("entry {:?}", entry.id);
			}
		}
		_ => (),
	}
}
# Ok(())
# }
```

Any error other than an I/O error poisons the reader; subsequent `read`
calls return the same error again. I/O errors pass through without
poisoning, so a caller may retry after feeding the source more data.
*/
pub struct DataReader<S: TokenSource, M: Model = NullModel> {
	lookahead: LookaheadReader<S>,
	model: M,
	version: ProtocolVersion,
	payload_kind: PayloadKind,
	expected_type: Option<RcPtr<EntityType>>,
	scopes: Vec<Scope<M::Projection>>,
	err: Option<Box<Error>>,
}

impl<S: TokenSource> DataReader<S, NullModel> {
	/// Create a reader with default options and no schema knowledge.
	pub fn new(source: S, payload_kind: PayloadKind) -> DataReader<S, NullModel> {
		DataReader::wrap(source, payload_kind, ReaderOptions::default(), NullModel)
	}

	/// Create a reader with the given options and no schema knowledge.
	pub fn with_options(
		source: S,
		payload_kind: PayloadKind,
		options: ReaderOptions,
	) -> DataReader<S, NullModel> {
		DataReader::wrap(source, payload_kind, options, NullModel)
	}
}

impl<S: TokenSource, M: Model> DataReader<S, M> {
	/// Create a reader backed by a metadata model.
	pub fn wrap(
		source: S,
		payload_kind: PayloadKind,
		options: ReaderOptions,
		model: M,
	) -> DataReader<S, M> {
		let mut lookahead = LookaheadReader::new(source);
		lookahead.set_document_base(options.base_uri.clone());
		if let Some(enabled) = options.detect_in_stream_errors {
			lookahead.set_detect_in_stream_errors(enabled);
		}
		DataReader {
			lookahead,
			model,
			version: options.version.unwrap_or_default(),
			payload_kind,
			expected_type: options.expected_type,
			scopes: vec![Scope::Start],
			err: None,
		}
	}

	pub fn get_ref(&self) -> &S {
		self.lookahead.get_ref()
	}

	pub fn get_mut(&mut self) -> &mut S {
		self.lookahead.get_mut()
	}

	pub fn version(&self) -> ProtocolVersion {
		self.version
	}

	/// Innermost base URI currently in scope.
	pub fn base_uri(&self) -> Option<&str> {
		self.lookahead.base_uri()
	}

	/// Current structural state.
	pub fn state(&self) -> State {
		match self.scopes.last() {
			None | Some(Scope::Start) => State::Start,
			Some(Scope::Completed) => State::Completed,
			Some(Scope::Feed(scope)) => match scope.phase {
				Phase::Start => State::FeedStart,
				Phase::End => State::FeedEnd,
			},
			Some(Scope::Entry(scope)) => match scope.phase {
				Phase::Start => State::EntryStart,
				Phase::End => State::EntryEnd,
			},
			Some(Scope::NavigationLink(scope)) => match scope.phase {
				Phase::Start => State::NavigationLinkStart,
				Phase::End => State::NavigationLinkEnd,
			},
		}
	}

	/// The entry of the innermost scope, if it is an entry scope.
	///
	/// None in an entry scope means the placeholder of an empty
	/// expansion.
	pub fn current_entry(&self) -> Option<&Entry> {
		match self.scopes.last() {
			Some(Scope::Entry(scope)) => scope.item.as_ref(),
			_ => None,
		}
	}

	/// The feed of the innermost scope, if it is a feed scope.
	pub fn current_feed(&self) -> Option<&Feed> {
		match self.scopes.last() {
			Some(Scope::Feed(scope)) => Some(&scope.item),
			_ => None,
		}
	}

	/// The navigation link of the innermost scope, if it is a link scope.
	pub fn current_link(&self) -> Option<&NavigationLink> {
		match self.scopes.last() {
			Some(Scope::NavigationLink(scope)) => Some(&scope.item),
			_ => None,
		}
	}

	/// Entity type resolved for the innermost entry scope.
	pub fn current_entity_type(&self) -> Option<&RcPtr<EntityType>> {
		match self.scopes.last() {
			Some(Scope::Entry(scope)) => scope.entity_type.as_ref(),
			_ => None,
		}
	}

	/// Whether the innermost feed scope has seen an author element so
	/// far.
	pub fn feed_author_seen(&self) -> bool {
		match self.scopes.last() {
			Some(Scope::Feed(scope)) => scope.author_seen,
			_ => false,
		}
	}

	fn check_poison(&self) -> Result<()> {
		match self.err.as_ref() {
			Some(err) => Err((**err).clone()),
			None => Ok(()),
		}
	}

	/**
	  Perform one structural transition.

	  Returns false once [`State::Completed`] is reached. The state
	  reached by a transition, and the bookkeeping of the scope it
	  belongs to, are available through the accessors until the next
	  call.
	*/
	pub fn read(&mut self) -> Result<bool> {
		self.check_poison()?;
		match self.step() {
			Ok(more) => Ok(more),
			Err(Error::IO(e)) => Err(Error::IO(e)),
			Err(other) => {
				self.err = Some(Box::new(other.clone()));
				Err(other)
			}
		}
	}

	fn step(&mut self) -> Result<bool> {
		let state = self.state();
		trace!(?state, "reader transition");
		match state {
			State::Start => {
				self.read_payload_start()?;
				Ok(true)
			}
			State::FeedStart => self.read_at_feed_start(),
			State::FeedEnd => self.read_at_feed_end(),
			State::EntryStart => self.read_at_entry_start(),
			State::EntryEnd => self.read_at_entry_end(),
			State::NavigationLinkStart => self.read_at_link_start(),
			State::NavigationLinkEnd => self.read_at_link_end(),
			State::Completed => Ok(false),
		}
	}

	fn read_payload_start(&mut self) -> Result<()> {
		self.lookahead.prime()?;
		loop {
			match self.lookahead.kind() {
				NodeKind::Element => break,
				NodeKind::EndOfInput => return Err(Error::eof(ERRCTX_PREAMBLE)),
				_ => {
					self.lookahead.advance()?;
				}
			}
		}
		let ns_ok = self.lookahead.namespace() == NS_ATOM;
		let name = Text::from(self.lookahead.local_name());
		let expected = self.expected_type.clone();
		match self.payload_kind {
			PayloadKind::Feed => {
				if !ns_ok || name != EL_FEED {
					return Err(Error::Syntax(SyntaxError::UnexpectedRootElement(
						EL_FEED, name,
					)));
				}
				self.push_feed(expected)
			}
			PayloadKind::Entry => {
				if !ns_ok || name != EL_ENTRY {
					return Err(Error::Syntax(SyntaxError::UnexpectedRootElement(
						EL_ENTRY, name,
					)));
				}
				self.push_entry(expected)
			}
		}
	}

	/// Open a feed scope for the feed element the cursor sits on and scan
	/// up to its first entry.
	fn push_feed(&mut self, expected_type: Option<RcPtr<EntityType>>) -> Result<()> {
		debug_assert!(self.lookahead.kind() == NodeKind::Element);
		let mut scope = FeedScope {
			item: Feed::default(),
			phase: Phase::Start,
			expected_type,
			element_depth: self.lookahead.depth(),
			at_end: false,
			author_seen: false,
		};
		if self.lookahead.is_empty_element() {
			scope.at_end = true;
		} else {
			self.lookahead.advance()?;
			match scan_feed_content(&mut self.lookahead, &mut scope)? {
				FeedContent::Entry => (),
				FeedContent::End => scope.at_end = true,
			}
		}
		debug!(id = ?scope.item.id, "feed opened");
		self.scopes.push(Scope::Feed(scope));
		Ok(())
	}

	/// Open an entry scope for the entry element the cursor sits on:
	/// sniff its type discriminator, resolve the entity type and scan up
	/// to the first navigation link.
	fn push_entry(&mut self, expected_type: Option<RcPtr<EntityType>>) -> Result<()> {
		debug_assert!(self.lookahead.kind() == NodeKind::Element);
		let element_depth = self.lookahead.depth();
		let empty = self.lookahead.is_empty_element();
		let etag = self.lookahead.attribute_value(NS_METADATA, ATTR_ETAG);
		let type_name = sniff_type_name(&mut self.lookahead)?;
		let entity_type = self
			.model
			.resolve_entity_type(type_name.as_deref(), expected_type.as_ref())?;
		let projection = self.model.projection(entity_type.as_ref());
		let mut entry = Entry::default();
		entry.etag = etag;
		entry.type_name = type_name;
		let mut scope = EntryScope {
			item: Some(entry),
			phase: Phase::Start,
			entity_type: entity_type.clone(),
			projection,
			element_depth,
			seen_links: DuplicateChecker::new(),
			content_seen: false,
			media_decided: None,
			first_link: None,
		};
		if let Some(ty) = entity_type.as_ref() {
			if ty.is_media_link_entry {
				scope.media_decided = Some(true);
				scope.entry_mut().media_resource = Some(MediaResource::default());
			}
		}
		if !empty {
			self.lookahead.advance()?;
			match scan_entry_content(&mut self.lookahead, &mut scope)? {
				EntryContent::NavigationLink(link) => scope.first_link = Some(link),
				EntryContent::End => (),
			}
		}
		debug!(type_name = ?scope.item.as_ref().and_then(|e| e.type_name.as_deref()), "entry opened");
		self.scopes.push(Scope::Entry(scope));
		Ok(())
	}

	/// Open a navigation link scope for the link element the cursor sits
	/// on, consulting the model for the declared target.
	fn push_nav(
		&mut self,
		mut link: NavigationLink,
		enclosing: Option<RcPtr<EntityType>>,
	) -> Result<()> {
		debug_assert!(self.lookahead.kind() == NodeKind::Element);
		let element_depth = self.lookahead.depth();
		let target = self
			.model
			.resolve_navigation_target(enclosing.as_ref(), &link.name)?;
		// metadata first, the announced content type second; the payload
		// shape may still fill it in later
		link.is_collection = target.is_collection.or_else(|| {
			link.content_type
				.as_deref()
				.and_then(collection_from_content_type)
		});
		debug!(name = link.name.as_str(), "navigation link opened");
		self.scopes.push(Scope::NavigationLink(NavScope {
			item: link,
			phase: Phase::Start,
			element_depth,
			target_type: target.entity_type,
		}));
		Ok(())
	}

	fn read_at_feed_start(&mut self) -> Result<bool> {
		let (at_end, expected) = match self.scopes.last_mut() {
			Some(Scope::Feed(scope)) => {
				if scope.at_end {
					scope.phase = Phase::End;
					(true, None)
				} else {
					(false, scope.expected_type.clone())
				}
			}
			_ => unreachable!("feed state without feed scope"),
		};
		if !at_end {
			self.push_entry(expected)?;
		}
		Ok(true)
	}

	fn read_at_feed_end(&mut self) -> Result<bool> {
		match self.scopes.pop() {
			Some(Scope::Feed(_)) => (),
			_ => unreachable!("feed state without feed scope"),
		}
		// past the feed's end token or its empty element
		self.lookahead.advance()?;
		match self.scopes.last_mut() {
			Some(Scope::Start) => {
				self.finish_payload()?;
				Ok(false)
			}
			Some(Scope::NavigationLink(nav)) => {
				read_link_tail_after_expansion(&mut self.lookahead, nav.element_depth)?;
				nav.phase = Phase::End;
				Ok(true)
			}
			_ => unreachable!("feed scope under neither root nor link"),
		}
	}

	fn read_at_entry_start(&mut self) -> Result<bool> {
		let model = &self.model;
		let version = self.version;
		let next_link = match self.scopes.last_mut() {
			Some(Scope::Entry(scope)) => match scope.first_link.take() {
				Some(link) => Some((link, scope.entity_type.clone())),
				None => {
					finish_entry(model, version, scope)?;
					None
				}
			},
			_ => unreachable!("entry state without entry scope"),
		};
		if let Some((link, enclosing)) = next_link {
			self.push_nav(link, enclosing)?;
		}
		Ok(true)
	}

	fn read_at_entry_end(&mut self) -> Result<bool> {
		let scope = match self.scopes.pop() {
			Some(Scope::Entry(scope)) => scope,
			_ => unreachable!("entry state without entry scope"),
		};
		let real = scope.item.is_some();
		if real {
			// past the entry's end token or its empty element; a
			// placeholder entry owns no markup of its own
			self.lookahead.advance()?;
		}
		let next_entry = match self.scopes.last_mut() {
			Some(Scope::Start) => {
				self.finish_payload()?;
				return Ok(false);
			}
			Some(Scope::Feed(feed)) => match scan_feed_content(&mut self.lookahead, feed)? {
				FeedContent::Entry => Some(feed.expected_type.clone()),
				FeedContent::End => {
					feed.phase = Phase::End;
					None
				}
			},
			Some(Scope::NavigationLink(nav)) => {
				if real {
					read_link_tail_after_expansion(&mut self.lookahead, nav.element_depth)?;
				} else {
					read_link_tail_after_empty(&mut self.lookahead, nav.element_depth)?;
				}
				nav.phase = Phase::End;
				None
			}
			_ => unreachable!("entry scope under an entry scope"),
		};
		if let Some(expected) = next_entry {
			self.push_entry(expected)?;
		}
		Ok(true)
	}

	fn read_at_link_start(&mut self) -> Result<bool> {
		let (element_depth, target_type, is_collection, link_name) = match self.scopes.last() {
			Some(Scope::NavigationLink(scope)) => (
				scope.element_depth,
				scope.target_type.clone(),
				scope.item.is_collection,
				scope.item.name.clone(),
			),
			_ => unreachable!("link state without link scope"),
		};
		match scan_link_content(&mut self.lookahead, element_depth)? {
			LinkContent::Deferred => {
				self.set_link_phase_end();
			}
			LinkContent::Empty => {
				if is_collection == Some(true) {
					return Err(Error::Syntax(SyntaxError::MultiplicityMismatch(
						"an empty expansion",
						link_name,
					)));
				}
				self.set_link_collection(false);
				self.scopes.push(Scope::Entry(EntryScope::null()));
			}
			LinkContent::Entry => {
				if is_collection == Some(true) {
					return Err(Error::Syntax(SyntaxError::MultiplicityMismatch(
						"an expanded entry",
						link_name,
					)));
				}
				self.set_link_collection(false);
				self.push_entry(target_type)?;
			}
			LinkContent::Feed => {
				if is_collection == Some(false) {
					return Err(Error::Syntax(SyntaxError::MultiplicityMismatch(
						"an expanded feed",
						link_name,
					)));
				}
				self.set_link_collection(true);
				self.push_feed(target_type)?;
			}
		}
		Ok(true)
	}

	fn read_at_link_end(&mut self) -> Result<bool> {
		match self.scopes.pop() {
			Some(Scope::NavigationLink(_)) => (),
			_ => unreachable!("link state without link scope"),
		}
		// past the link's end token or its empty element
		self.lookahead.advance()?;
		let model = &self.model;
		let version = self.version;
		let next_link = match self.scopes.last_mut() {
			Some(Scope::Entry(scope)) => {
				match scan_entry_content(&mut self.lookahead, scope)? {
					EntryContent::NavigationLink(link) => {
						Some((link, scope.entity_type.clone()))
					}
					EntryContent::End => {
						finish_entry(model, version, scope)?;
						None
					}
				}
			}
			_ => unreachable!("link scope outside an entry scope"),
		};
		if let Some((link, enclosing)) = next_link {
			self.push_nav(link, enclosing)?;
		}
		Ok(true)
	}

	fn set_link_phase_end(&mut self) {
		match self.scopes.last_mut() {
			Some(Scope::NavigationLink(scope)) => scope.phase = Phase::End,
			_ => unreachable!("link state without link scope"),
		}
	}

	fn set_link_collection(&mut self, is_collection: bool) {
		match self.scopes.last_mut() {
			Some(Scope::NavigationLink(scope)) => {
				scope.item.is_collection = Some(is_collection)
			}
			_ => unreachable!("link state without link scope"),
		}
	}

	/// Consume trailing non-element tokens after the payload root and
	/// seal the reader.
	fn finish_payload(&mut self) -> Result<()> {
		loop {
			match self.lookahead.kind() {
				NodeKind::EndOfInput => break,
				NodeKind::Element => {
					return Err(Error::Syntax(SyntaxError::UnexpectedElement(
						ERRCTX_POSTAMBLE,
						Text::from(self.lookahead.local_name()),
					)))
				}
				_ => {
					self.lookahead.advance()?;
				}
			}
		}
		self.scopes.clear();
		self.scopes.push(Scope::Completed);
		Ok(())
	}
}
