/*!
# Payload walk tests

End-to-end tests driving a [`DataReader`] over hand-built token streams.
*/
use crate::atom::{
	MIME_ENTRY, NS_ATOM, NS_METADATA, NS_XML, REL_ASSOCIATION_PREFIX, REL_NAVIGATION_PREFIX,
	REL_STREAM_EDIT_PREFIX, REL_STREAM_READ_PREFIX, SCHEME_TYPE,
};
use crate::error::{Error, SyntaxError};
use crate::meta::{Model, NavigationTarget, NullModel, ProtocolVersion, RcPtr, ReaderOptions};
use crate::model::Entry;
use crate::reader::{DataReader, PayloadKind, State};
use crate::source::{BufferedNode, VecSource};

fn atom(name: &'static str, depth: usize) -> BufferedNode {
	BufferedNode::element(NS_ATOM, name, depth)
}

fn atom_end(name: &'static str, depth: usize) -> BufferedNode {
	BufferedNode::end(NS_ATOM, name, depth)
}

fn meta(name: &'static str, depth: usize) -> BufferedNode {
	BufferedNode::element(NS_METADATA, name, depth)
}

fn meta_end(name: &'static str, depth: usize) -> BufferedNode {
	BufferedNode::end(NS_METADATA, name, depth)
}

fn text(value: &'static str, depth: usize) -> BufferedNode {
	BufferedNode::text(value, depth)
}

fn type_category(term: &'static str, depth: usize) -> BufferedNode {
	atom("category", depth)
		.with_attribute("", "scheme", SCHEME_TYPE)
		.with_attribute("", "term", term)
		.empty()
}

fn nav_link(name: &str, depth: usize) -> BufferedNode {
	let rel = format!("{}{}", REL_NAVIGATION_PREFIX, name);
	atom("link", depth).with_attribute("", "rel", &rel)
}

fn reader(nodes: Vec<BufferedNode>, kind: PayloadKind) -> DataReader<VecSource> {
	DataReader::new(VecSource::new(nodes), kind)
}

fn expect_state<M: Model>(reader: &mut DataReader<VecSource, M>, state: State) {
	assert_eq!(reader.read().unwrap(), true);
	assert_eq!(reader.state(), state);
}

#[test]
fn minimal_entry_payload() {
	let mut r = reader(
		vec![
			atom("entry", 0).with_attribute(NS_METADATA, "etag", "W/\"1\""),
			type_category("NS.Customer", 1),
			atom("id", 1),
			text("urn:e1", 2),
			atom_end("id", 1),
			atom("title", 1),
			text("First", 2),
			atom_end("title", 1),
			atom_end("entry", 0),
		],
		PayloadKind::Entry,
	);
	assert_eq!(r.state(), State::Start);
	expect_state(&mut r, State::EntryStart);
	let entry = r.current_entry().unwrap();
	assert_eq!(entry.id.as_deref(), Some("urn:e1"));
	assert_eq!(entry.type_name.as_deref(), Some("NS.Customer"));
	assert_eq!(entry.etag.as_deref(), Some("W/\"1\""));
	assert_eq!(r.current_entity_type().unwrap().name, "NS.Customer");
	expect_state(&mut r, State::EntryEnd);
	let entry = r.current_entry().unwrap();
	assert_eq!(entry.media_link_entry, false);
	assert_eq!(entry.syndication.len(), 1);
	assert_eq!(entry.syndication[0].local_name, "title");
	assert_eq!(entry.syndication[0].value, "First");
	assert_eq!(r.read().unwrap(), false);
	assert_eq!(r.state(), State::Completed);
	// further reads keep reporting completion
	assert_eq!(r.read().unwrap(), false);
}

#[test]
fn empty_entry_element() {
	let mut r = reader(vec![atom("entry", 0).empty()], PayloadKind::Entry);
	expect_state(&mut r, State::EntryStart);
	assert!(r.current_entry().unwrap().id.is_none());
	expect_state(&mut r, State::EntryEnd);
	assert_eq!(r.read().unwrap(), false);
}

#[test]
fn wrong_root_element() {
	let mut r = reader(vec![atom("feed", 0).empty()], PayloadKind::Entry);
	match r.read() {
		Err(Error::Syntax(SyntaxError::UnexpectedRootElement(expected, found))) => {
			assert_eq!(expected, "entry");
			assert_eq!(found, "feed");
		}
		other => panic!("unexpected result: {:?}", other),
	}
	// the reader is poisoned now
	match r.read() {
		Err(Error::Syntax(SyntaxError::UnexpectedRootElement(..))) => (),
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn feed_with_entries_and_paging() {
	let mut r = reader(
		vec![
			atom("feed", 0),
			atom("id", 1),
			text("urn:feed", 2),
			atom_end("id", 1),
			meta("count", 1),
			text(" 3 ", 2),
			meta_end("count", 1),
			atom("author", 1),
			atom("name", 2),
			text("svc", 3),
			atom_end("name", 2),
			atom_end("author", 1),
			atom("entry", 1),
			atom("id", 2),
			text("urn:e1", 3),
			atom_end("id", 2),
			atom_end("entry", 1),
			atom("entry", 1).empty(),
			atom("link", 1)
				.with_attribute("", "rel", "next")
				.with_attribute("", "href", "http://host/svc/Orders?page=2")
				.empty(),
			atom_end("feed", 0),
		],
		PayloadKind::Feed,
	);
	expect_state(&mut r, State::FeedStart);
	let feed = r.current_feed().unwrap();
	assert_eq!(feed.id.as_deref(), Some("urn:feed"));
	assert_eq!(feed.count, Some(3));
	assert!(r.feed_author_seen());
	expect_state(&mut r, State::EntryStart);
	assert_eq!(r.current_entry().unwrap().id.as_deref(), Some("urn:e1"));
	expect_state(&mut r, State::EntryEnd);
	expect_state(&mut r, State::EntryStart);
	assert!(r.current_entry().unwrap().id.is_none());
	expect_state(&mut r, State::EntryEnd);
	expect_state(&mut r, State::FeedEnd);
	let feed = r.current_feed().unwrap();
	assert_eq!(
		feed.next_page_link.as_deref(),
		Some("http://host/svc/Orders?page=2")
	);
	assert_eq!(r.read().unwrap(), false);
	assert_eq!(r.state(), State::Completed);
}

#[test]
fn empty_feed() {
	let mut r = reader(
		vec![atom("feed", 0), atom_end("feed", 0)],
		PayloadKind::Feed,
	);
	expect_state(&mut r, State::FeedStart);
	expect_state(&mut r, State::FeedEnd);
	assert_eq!(r.read().unwrap(), false);
}

#[test]
fn invalid_count_value() {
	let mut r = reader(
		vec![
			atom("feed", 0),
			meta("count", 1),
			text("lots", 2),
			meta_end("count", 1),
			atom_end("feed", 0),
		],
		PayloadKind::Feed,
	);
	match r.read() {
		Err(Error::Syntax(SyntaxError::InvalidCount(v))) => assert_eq!(v, "lots"),
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn deferred_navigation_link() {
	let mut r = reader(
		vec![
			atom("entry", 0),
			nav_link("Orders", 1)
				.with_attribute("", "href", "http://host/svc/Customers(1)/Orders")
				.empty(),
			atom_end("entry", 0),
		],
		PayloadKind::Entry,
	);
	expect_state(&mut r, State::EntryStart);
	expect_state(&mut r, State::NavigationLinkStart);
	let link = r.current_link().unwrap();
	assert_eq!(link.name, "Orders");
	assert_eq!(
		link.url.as_deref(),
		Some("http://host/svc/Customers(1)/Orders")
	);
	assert_eq!(link.is_collection, None);
	expect_state(&mut r, State::NavigationLinkEnd);
	assert_eq!(r.current_link().unwrap().is_collection, None);
	expect_state(&mut r, State::EntryEnd);
	assert_eq!(r.read().unwrap(), false);
}

#[test]
fn expanded_entry_link() {
	let mut r = reader(
		vec![
			atom("entry", 0),
			atom("id", 1),
			text("urn:parent", 2),
			atom_end("id", 1),
			nav_link("Customer", 1).with_attribute("", "type", MIME_ENTRY),
			meta("inline", 2),
			atom("entry", 3),
			atom("id", 4),
			text("urn:child", 5),
			atom_end("id", 4),
			atom_end("entry", 3),
			meta_end("inline", 2),
			atom_end("link", 1),
			atom_end("entry", 0),
		],
		PayloadKind::Entry,
	);
	expect_state(&mut r, State::EntryStart);
	assert_eq!(r.current_entry().unwrap().id.as_deref(), Some("urn:parent"));
	expect_state(&mut r, State::NavigationLinkStart);
	// announced content type already settles the multiplicity
	assert_eq!(r.current_link().unwrap().is_collection, Some(false));
	expect_state(&mut r, State::EntryStart);
	assert_eq!(r.current_entry().unwrap().id.as_deref(), Some("urn:child"));
	expect_state(&mut r, State::EntryEnd);
	expect_state(&mut r, State::NavigationLinkEnd);
	expect_state(&mut r, State::EntryEnd);
	assert_eq!(r.current_entry().unwrap().id.as_deref(), Some("urn:parent"));
	assert_eq!(r.read().unwrap(), false);
}

#[test]
fn expanded_feed_link() {
	let mut r = reader(
		vec![
			atom("entry", 0),
			nav_link("Orders", 1),
			meta("inline", 2),
			atom("feed", 3),
			atom("entry", 4),
			atom("id", 5),
			text("urn:o1", 6),
			atom_end("id", 5),
			atom_end("entry", 4),
			atom("entry", 4).empty(),
			atom_end("feed", 3),
			meta_end("inline", 2),
			atom_end("link", 1),
			atom_end("entry", 0),
		],
		PayloadKind::Entry,
	);
	expect_state(&mut r, State::EntryStart);
	expect_state(&mut r, State::NavigationLinkStart);
	expect_state(&mut r, State::FeedStart);
	expect_state(&mut r, State::EntryStart);
	assert_eq!(r.current_entry().unwrap().id.as_deref(), Some("urn:o1"));
	expect_state(&mut r, State::EntryEnd);
	expect_state(&mut r, State::EntryStart);
	expect_state(&mut r, State::EntryEnd);
	expect_state(&mut r, State::FeedEnd);
	expect_state(&mut r, State::NavigationLinkEnd);
	assert_eq!(r.current_link().unwrap().is_collection, Some(true));
	expect_state(&mut r, State::EntryEnd);
	assert_eq!(r.read().unwrap(), false);
}

#[test]
fn empty_expansion_yields_placeholder_entry() {
	let mut r = reader(
		vec![
			atom("entry", 0),
			nav_link("Customer", 1),
			meta("inline", 2).empty(),
			atom_end("link", 1),
			atom_end("entry", 0),
		],
		PayloadKind::Entry,
	);
	expect_state(&mut r, State::EntryStart);
	expect_state(&mut r, State::NavigationLinkStart);
	expect_state(&mut r, State::EntryStart);
	assert!(r.current_entry().is_none());
	expect_state(&mut r, State::EntryEnd);
	assert!(r.current_entry().is_none());
	expect_state(&mut r, State::NavigationLinkEnd);
	assert_eq!(r.current_link().unwrap().is_collection, Some(false));
	expect_state(&mut r, State::EntryEnd);
	assert_eq!(r.read().unwrap(), false);
}

#[test]
fn double_expansion_wrapper_rejected() {
	let mut r = reader(
		vec![
			atom("entry", 0),
			nav_link("Customer", 1),
			meta("inline", 2).empty(),
			meta("inline", 2).empty(),
			atom_end("link", 1),
			atom_end("entry", 0),
		],
		PayloadKind::Entry,
	);
	expect_state(&mut r, State::EntryStart);
	expect_state(&mut r, State::NavigationLinkStart);
	expect_state(&mut r, State::EntryStart);
	expect_state(&mut r, State::EntryEnd);
	match r.read() {
		Err(Error::Syntax(SyntaxError::DuplicateExpansion)) => (),
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn duplicate_navigation_link_name_rejected() {
	let mut r = reader(
		vec![
			atom("entry", 0),
			nav_link("Orders", 1).empty(),
			nav_link("Orders", 1).empty(),
			atom_end("entry", 0),
		],
		PayloadKind::Entry,
	);
	expect_state(&mut r, State::EntryStart);
	expect_state(&mut r, State::NavigationLinkStart);
	expect_state(&mut r, State::NavigationLinkEnd);
	match r.read() {
		Err(Error::Syntax(SyntaxError::DuplicateName(el, name))) => {
			assert_eq!(el, "link");
			assert_eq!(name, "Orders");
		}
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn discriminator_first_category_wins() {
	let mut r = reader(
		vec![
			atom("entry", 0),
			type_category("NS.First", 1),
			type_category("NS.Second", 1),
			atom_end("entry", 0),
		],
		PayloadKind::Entry,
	);
	expect_state(&mut r, State::EntryStart);
	assert_eq!(
		r.current_entry().unwrap().type_name.as_deref(),
		Some("NS.First")
	);
}

#[test]
fn media_link_entry_from_content_source() {
	let mut r = reader(
		vec![
			atom("entry", 0),
			atom("content", 1)
				.with_attribute("", "type", "image/png")
				.with_attribute("", "src", "http://host/svc/Photos(1)/$value")
				.empty(),
			atom("link", 1)
				.with_attribute("", "rel", "edit-media")
				.with_attribute("", "href", "http://host/svc/Photos(1)/$value")
				.with_attribute(NS_METADATA, "etag", "W/\"media\"")
				.empty(),
			atom_end("entry", 0),
		],
		PayloadKind::Entry,
	);
	expect_state(&mut r, State::EntryStart);
	expect_state(&mut r, State::EntryEnd);
	let entry = r.current_entry().unwrap();
	assert!(entry.media_link_entry);
	let media = entry.media_resource.as_ref().unwrap();
	assert_eq!(
		media.source_url.as_deref(),
		Some("http://host/svc/Photos(1)/$value")
	);
	assert_eq!(media.content_type.as_deref(), Some("image/png"));
	assert_eq!(
		media.edit_url.as_deref(),
		Some("http://host/svc/Photos(1)/$value")
	);
	assert_eq!(media.etag.as_deref(), Some("W/\"media\""));
}

#[test]
fn media_resource_contradiction_rejected() {
	let mut r = reader(
		vec![
			atom("entry", 0),
			atom("link", 1)
				.with_attribute("", "rel", "edit-media")
				.with_attribute("", "href", "http://host/m")
				.empty(),
			atom("content", 1)
				.with_attribute("", "type", "application/xml"),
			atom_end("content", 1),
			atom_end("entry", 0),
		],
		PayloadKind::Entry,
	);
	match r.read() {
		Err(Error::Syntax(SyntaxError::MediaResourceContradiction(_))) => (),
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn edit_and_self_links_and_streams() {
	let stream_edit = format!("{}Thumbnail", REL_STREAM_EDIT_PREFIX);
	let stream_read = format!("{}Thumbnail", REL_STREAM_READ_PREFIX);
	let association = format!("{}Customer", REL_ASSOCIATION_PREFIX);
	let mut r = reader(
		vec![
			atom("entry", 0),
			atom("link", 1)
				.with_attribute("", "rel", "edit")
				.with_attribute("", "href", "http://host/svc/Orders(1)")
				.empty(),
			atom("link", 1)
				.with_attribute("", "rel", "self")
				.with_attribute("", "href", "http://host/svc/Orders(1)/read")
				.empty(),
			atom("link", 1)
				.with_attribute("", "rel", &stream_edit)
				.with_attribute("", "href", "http://host/svc/Orders(1)/Thumbnail")
				.with_attribute(NS_METADATA, "etag", "W/\"t\"")
				.empty(),
			atom("link", 1)
				.with_attribute("", "rel", &stream_read)
				.with_attribute("", "href", "http://host/svc/Orders(1)/Thumbnail/read")
				.with_attribute("", "type", "image/jpeg")
				.empty(),
			atom("link", 1)
				.with_attribute("", "rel", &association)
				.with_attribute("", "href", "http://host/svc/Orders(1)/$links/Customer")
				.empty(),
			atom_end("entry", 0),
		],
		PayloadKind::Entry,
	);
	expect_state(&mut r, State::EntryStart);
	let entry = r.current_entry().unwrap();
	assert_eq!(entry.edit_link.as_deref(), Some("http://host/svc/Orders(1)"));
	assert_eq!(
		entry.read_link.as_deref(),
		Some("http://host/svc/Orders(1)/read")
	);
	assert_eq!(entry.stream_properties.len(), 1);
	let stream = &entry.stream_properties[0];
	assert_eq!(stream.name, "Thumbnail");
	assert_eq!(
		stream.edit_url.as_deref(),
		Some("http://host/svc/Orders(1)/Thumbnail")
	);
	assert_eq!(
		stream.read_url.as_deref(),
		Some("http://host/svc/Orders(1)/Thumbnail/read")
	);
	assert_eq!(stream.etag.as_deref(), Some("W/\"t\""));
	assert_eq!(stream.content_type.as_deref(), Some("image/jpeg"));
	assert_eq!(entry.association_links.len(), 1);
	assert_eq!(entry.association_links[0].name, "Customer");
	assert_eq!(
		entry.association_links[0].url,
		"http://host/svc/Orders(1)/$links/Customer"
	);
}

#[test]
fn base_uri_applied_to_link_targets() {
	let mut r = reader(
		vec![
			atom("feed", 0).with_attribute(NS_XML, "base", "http://host/svc/"),
			atom("entry", 1).with_attribute(NS_XML, "base", "Orders/"),
			atom("link", 2)
				.with_attribute("", "rel", "edit")
				.with_attribute("", "href", "1")
				.empty(),
			atom_end("entry", 1),
			atom_end("feed", 0),
		],
		PayloadKind::Feed,
	);
	expect_state(&mut r, State::FeedStart);
	expect_state(&mut r, State::EntryStart);
	assert_eq!(
		r.current_entry().unwrap().edit_link.as_deref(),
		Some("http://host/svc/Orders/1")
	);
}

#[test]
fn document_base_from_options() {
	let mut r = DataReader::with_options(
		VecSource::new(vec![
			atom("entry", 0),
			atom("link", 1)
				.with_attribute("", "rel", "edit")
				.with_attribute("", "href", "Orders(1)")
				.empty(),
			atom_end("entry", 0),
		]),
		PayloadKind::Entry,
		ReaderOptions::new().base_uri("http://host/svc/"),
	);
	expect_state(&mut r, State::EntryStart);
	assert_eq!(
		r.current_entry().unwrap().edit_link.as_deref(),
		Some("http://host/svc/Orders(1)")
	);
}

#[test]
fn in_stream_error_replaces_payload() {
	let mut r = reader(
		vec![
			meta("error", 0),
			meta("code", 1),
			text("500", 2),
			meta_end("code", 1),
			meta("message", 1),
			text("broken", 2),
			meta_end("message", 1),
			meta_end("error", 0),
		],
		PayloadKind::Feed,
	);
	match r.read() {
		Err(Error::InStream(err)) => {
			assert_eq!(err.code.as_deref(), Some("500"));
			assert_eq!(err.message.as_deref(), Some("broken"));
		}
		other => panic!("unexpected result: {:?}", other),
	}
	// terminal; the error sticks
	match r.read() {
		Err(Error::InStream(_)) => (),
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn in_stream_error_inside_feed() {
	let mut r = reader(
		vec![
			atom("feed", 0),
			atom("entry", 1).empty(),
			meta("error", 1),
			meta("message", 2),
			text("gone", 3),
			meta_end("message", 2),
			meta_end("error", 1),
			atom_end("feed", 0),
		],
		PayloadKind::Feed,
	);
	expect_state(&mut r, State::FeedStart);
	expect_state(&mut r, State::EntryStart);
	expect_state(&mut r, State::EntryEnd);
	match r.read() {
		Err(Error::InStream(err)) => assert_eq!(err.message.as_deref(), Some("gone")),
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn in_stream_error_detection_can_be_disabled() {
	let mut r = DataReader::with_options(
		VecSource::new(vec![
			atom("entry", 0),
			meta("error", 1),
			meta_end("error", 1),
			atom_end("entry", 0),
		]),
		PayloadKind::Entry,
		ReaderOptions::new().detect_in_stream_errors(false),
	);
	expect_state(&mut r, State::EntryStart);
	expect_state(&mut r, State::EntryEnd);
	assert_eq!(r.read().unwrap(), false);
}

struct OrdersAreCollections;

impl Model for OrdersAreCollections {
	type Projection = ();

	fn resolve_entity_type(
		&self,
		payload_name: Option<&str>,
		expected: Option<&RcPtr<crate::meta::EntityType>>,
	) -> crate::error::Result<Option<RcPtr<crate::meta::EntityType>>> {
		NullModel.resolve_entity_type(payload_name, expected)
	}

	fn resolve_navigation_target(
		&self,
		_enclosing: Option<&RcPtr<crate::meta::EntityType>>,
		name: &str,
	) -> crate::error::Result<NavigationTarget> {
		Ok(NavigationTarget {
			entity_type: None,
			is_collection: Some(name == "Orders"),
		})
	}

	fn projection(&self, _ty: Option<&RcPtr<crate::meta::EntityType>>) -> Option<()> {
		None
	}

	fn apply_mappings(
		&self,
		_projection: &(),
		_entry: &mut Entry,
		_version: ProtocolVersion,
	) -> crate::error::Result<()> {
		Ok(())
	}

	fn validate_entry(
		&self,
		entry: &Entry,
		_entity_type: Option<&RcPtr<crate::meta::EntityType>>,
	) -> crate::error::Result<()> {
		if entry.id.is_none() {
			return Err(Error::model("entry without an id"));
		}
		Ok(())
	}
}

#[test]
fn metadata_multiplicity_contradicted_by_entry() {
	let mut r = DataReader::wrap(
		VecSource::new(vec![
			atom("entry", 0),
			atom("id", 1),
			text("urn:parent", 2),
			atom_end("id", 1),
			nav_link("Orders", 1),
			meta("inline", 2),
			atom("entry", 3).empty(),
			meta_end("inline", 2),
			atom_end("link", 1),
			atom_end("entry", 0),
		]),
		PayloadKind::Entry,
		ReaderOptions::new(),
		OrdersAreCollections,
	);
	expect_state(&mut r, State::EntryStart);
	expect_state(&mut r, State::NavigationLinkStart);
	assert_eq!(r.current_link().unwrap().is_collection, Some(true));
	match r.read() {
		Err(Error::Syntax(SyntaxError::MultiplicityMismatch(_, name))) => {
			assert_eq!(name, "Orders");
		}
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn metadata_multiplicity_contradicted_by_empty_expansion() {
	let mut r = DataReader::wrap(
		VecSource::new(vec![
			atom("entry", 0),
			atom("id", 1),
			text("urn:parent", 2),
			atom_end("id", 1),
			nav_link("Orders", 1),
			meta("inline", 2).empty(),
			atom_end("link", 1),
			atom_end("entry", 0),
		]),
		PayloadKind::Entry,
		ReaderOptions::new(),
		OrdersAreCollections,
	);
	expect_state(&mut r, State::EntryStart);
	expect_state(&mut r, State::NavigationLinkStart);
	assert_eq!(r.current_link().unwrap().is_collection, Some(true));
	match r.read() {
		Err(Error::Syntax(SyntaxError::MultiplicityMismatch(_, name))) => {
			assert_eq!(name, "Orders");
		}
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn content_type_multiplicity_contradicted_by_feed() {
	let mut r = reader(
		vec![
			atom("entry", 0),
			nav_link("Customer", 1).with_attribute("", "type", MIME_ENTRY),
			meta("inline", 2),
			atom("feed", 3),
			atom_end("feed", 3),
			meta_end("inline", 2),
			atom_end("link", 1),
			atom_end("entry", 0),
		],
		PayloadKind::Entry,
	);
	expect_state(&mut r, State::EntryStart);
	expect_state(&mut r, State::NavigationLinkStart);
	match r.read() {
		Err(Error::Syntax(SyntaxError::MultiplicityMismatch(_, name))) => {
			assert_eq!(name, "Customer");
		}
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn model_validation_failure_surfaces() {
	let mut r = DataReader::wrap(
		VecSource::new(vec![atom("entry", 0), atom_end("entry", 0)]),
		PayloadKind::Entry,
		ReaderOptions::new(),
		OrdersAreCollections,
	);
	expect_state(&mut r, State::EntryStart);
	match r.read() {
		Err(Error::Model(msg)) => assert_eq!(msg, "entry without an id"),
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn expected_type_flows_into_feed_entries() {
	let expected = RcPtr::new(crate::meta::EntityType::named("NS.Order"));
	let mut r = DataReader::with_options(
		VecSource::new(vec![
			atom("feed", 0),
			atom("entry", 1).empty(),
			atom_end("feed", 0),
		]),
		PayloadKind::Feed,
		ReaderOptions::new().expected_type(expected),
	);
	expect_state(&mut r, State::FeedStart);
	expect_state(&mut r, State::EntryStart);
	assert_eq!(r.current_entity_type().unwrap().name, "NS.Order");
}
