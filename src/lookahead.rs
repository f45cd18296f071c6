/*!
# Buffering lookahead over a token source

[`LookaheadReader`] wraps a [`TokenSource`] and adds the three services
the structural reader needs on top of raw tokens:

- **Replayable lookahead.** Between [`LookaheadReader::start_buffering`]
  and [`LookaheadReader::stop_buffering`] every consumed token is
  retained; stopping rewinds the cursor to where buffering started and
  subsequent reads replay the retained tokens before touching the source
  again. Replayed tokens are evicted as they are passed, so the buffer
  never outlives its single replay.

- **Base URI tracking.** `xml:base` attributes push scope frames which
  are popped when their element closes; [`LookaheadReader::base_uri`]
  reports the innermost one. The frame stack is snapshotted when
  buffering starts and restored on rewind, so replay observes the same
  bases as the first pass did.

- **In-stream error sniffing.** Whenever a fresh token is pulled from the
  source and turns out to open an error document, the whole error subtree
  is decoded and surfaced as [`Error::InStream`]; the cursor never
  reports the error markup as ordinary content.

The wrapper itself implements [`TokenSource`], so code which only needs
plain cursor access can stay generic.
*/
use std::collections::VecDeque;

use tracing::trace;

use crate::atom::{ATTR_BASE, EL_ERROR, NS_METADATA, NS_XML};
use crate::error::{Error, Result, SyntaxError, ERRCTX_SKIP};
use crate::errorpayload::read_error_payload;
use crate::source::{BufferedNode, NodeKind, Text, TokenSource};
use crate::uri;

#[derive(Debug, Clone)]
struct BaseFrame {
	uri: Text,
	depth: usize,
}

/**
# Lookahead cursor

See the [module documentation](self) for the services provided on top of
the wrapped source.

## Cursor model

When no buffered tokens are pending, all accessors pass straight through
to the source. While buffering or replaying, the cursor is a position
into the retained token list and the source is only consulted to extend
it; attribute navigation then walks the attribute snapshots captured
with each element.
*/
pub struct LookaheadReader<S: TokenSource> {
	source: S,
	buffer: VecDeque<BufferedNode>,
	buffering: bool,
	/// Read position while buffering; always valid then.
	primary: usize,
	/// Externally visible position: buffer index plus optional attribute
	/// index. None means the source position is visible directly.
	reported: Option<(usize, Option<usize>)>,
	base_stack: Vec<BaseFrame>,
	base_snapshot: Option<Vec<BaseFrame>>,
	document_base: Option<Text>,
	detect_in_stream_errors: bool,
}

impl<S: TokenSource> LookaheadReader<S> {
	pub fn new(source: S) -> LookaheadReader<S> {
		LookaheadReader {
			source,
			buffer: VecDeque::new(),
			buffering: false,
			primary: 0,
			reported: None,
			base_stack: Vec::new(),
			base_snapshot: None,
			document_base: None,
			detect_in_stream_errors: true,
		}
	}

	pub fn get_ref(&self) -> &S {
		&self.source
	}

	pub fn get_mut(&mut self) -> &mut S {
		&mut self.source
	}

	pub(crate) fn set_document_base(&mut self, base: Option<Text>) {
		self.document_base = base;
	}

	pub(crate) fn set_detect_in_stream_errors(&mut self, enabled: bool) {
		self.detect_in_stream_errors = enabled;
	}

	fn reported_node(&self) -> Option<&BufferedNode> {
		match self.reported {
			Some((n, attr)) => {
				let node = &self.buffer[n];
				Some(match attr {
					Some(i) => &node.attributes[i],
					None => node,
				})
			}
			None => None,
		}
	}

	/// Innermost base URI in scope, if any.
	pub fn base_uri(&self) -> Option<&str> {
		self.base_stack
			.last()
			.map(|f| f.uri.as_str())
			.or_else(|| self.document_base.as_deref())
	}

	/// Resolve a reference against the base URI in scope. Without any
	/// base the reference is passed through unchanged.
	pub fn resolve_uri(&self, reference: &str) -> Text {
		match self.base_uri() {
			Some(base) if !uri::is_absolute(reference) => uri::resolve(base, reference),
			_ => Text::from(reference),
		}
	}

	/// Pop the base frame of the element the cursor is about to move
	/// beyond, if it owns one.
	fn leave_current(&mut self) {
		let leaving = match self.kind() {
			NodeKind::EndElement => true,
			NodeKind::Element => self.is_empty_element(),
			_ => false,
		};
		if !leaving {
			return;
		}
		let depth = self.depth();
		if self
			.base_stack
			.last()
			.map(|f| f.depth == depth)
			.unwrap_or(false)
		{
			self.base_stack.pop();
		}
	}

	/// Push a base frame if the element the cursor just moved onto
	/// declares one.
	fn enter_current(&mut self) -> Result<()> {
		if self.kind() != NodeKind::Element {
			return Ok(());
		}
		let declared = match self.attribute_value(NS_XML, ATTR_BASE) {
			Some(v) => v,
			None => return Ok(()),
		};
		let resolved = if uri::is_absolute(&declared) {
			declared
		} else {
			match self.base_uri() {
				Some(base) => uri::resolve(base, &declared),
				None => return Err(Error::Syntax(SyntaxError::RelativeBaseUri(declared))),
			}
		};
		trace!(base = resolved.as_str(), "entering base scope");
		self.base_stack.push(BaseFrame {
			uri: resolved,
			depth: self.depth(),
		});
		Ok(())
	}

	/// Apply base tracking and error sniffing to the token the source is
	/// initially positioned on. Called once before the first read.
	pub(crate) fn prime(&mut self) -> Result<()> {
		self.sniff_current()?;
		self.enter_current()
	}

	/// Check whether the current token opens an error document and, if
	/// so, decode and surface it. Only meaningful while the cursor passes
	/// through to the source.
	pub(crate) fn sniff_current(&mut self) -> Result<()> {
		if self.detect_in_stream_errors
			&& self.reported.is_none()
			&& self.source.kind() == NodeKind::Element
			&& self.source.namespace() == NS_METADATA
			&& self.source.local_name() == EL_ERROR
		{
			return Err(Error::InStream(read_error_payload(&mut self.source)?));
		}
		Ok(())
	}

	/// Advance the underlying source by one token, sniffing for error
	/// documents.
	fn read_from_source(&mut self) -> Result<()> {
		self.source.advance()?;
		if self.detect_in_stream_errors
			&& self.source.kind() == NodeKind::Element
			&& self.source.namespace() == NS_METADATA
			&& self.source.local_name() == EL_ERROR
		{
			return Err(Error::InStream(read_error_payload(&mut self.source)?));
		}
		Ok(())
	}

	fn snapshot_source(&mut self) -> BufferedNode {
		if self.source.kind() == NodeKind::EndOfInput {
			BufferedNode::end_of_input()
		} else {
			BufferedNode::snapshot(&mut self.source)
		}
	}

	/**
	  Begin retaining tokens for later replay.

	  The current token becomes the rewind target of the matching
	  [`Self::stop_buffering`]. May be called while earlier buffered
	  tokens are still being replayed; the retained region then extends
	  the existing one.

	  # Panics

	  Panics if buffering is already active or if the cursor sits on an
	  attribute.
	*/
	pub fn start_buffering(&mut self) {
		assert!(!self.buffering, "lookahead buffering already active");
		assert!(
			self.kind() != NodeKind::Attribute,
			"cannot start buffering on an attribute"
		);
		if self.buffer.is_empty() {
			let node = self.snapshot_source();
			self.buffer.push_back(node);
		}
		self.primary = 0;
		self.reported = Some((0, None));
		self.base_snapshot = Some(self.base_stack.clone());
		self.buffering = true;
		trace!(retained = self.buffer.len(), "lookahead buffering started");
	}

	/**
	  Stop retaining tokens and rewind to where buffering started.

	  The base URI scope is restored alongside the cursor; the retained
	  tokens are replayed by subsequent [`Self::advance`] calls and
	  evicted as they are passed.

	  # Panics

	  Panics if buffering is not active.
	*/
	pub fn stop_buffering(&mut self) {
		assert!(self.buffering, "lookahead buffering not active");
		self.buffering = false;
		self.primary = 0;
		self.reported = Some((0, None));
		if let Some(snapshot) = self.base_snapshot.take() {
			self.base_stack = snapshot;
		}
		trace!(retained = self.buffer.len(), "lookahead buffering stopped");
	}

	/// Skip the current element including its whole subtree, leaving the
	/// cursor on the following token. On non-element tokens this is a
	/// plain advance.
	pub fn skip(&mut self) -> Result<bool> {
		if self.kind() == NodeKind::Element && !self.is_empty_element() {
			let depth = self.depth();
			loop {
				if !self.advance()? {
					return Err(Error::eof(ERRCTX_SKIP));
				}
				if self.kind() == NodeKind::EndElement && self.depth() == depth {
					break;
				}
			}
		}
		self.advance()
	}
}

impl<S: TokenSource> TokenSource for LookaheadReader<S> {
	fn kind(&self) -> NodeKind {
		match self.reported_node() {
			Some(node) => node.kind,
			None => self.source.kind(),
		}
	}

	fn namespace(&self) -> &str {
		match self.reported_node() {
			Some(node) => node.namespace.as_str(),
			None => self.source.namespace(),
		}
	}

	fn local_name(&self) -> &str {
		match self.reported_node() {
			Some(node) => node.local_name.as_str(),
			None => self.source.local_name(),
		}
	}

	fn value(&self) -> &str {
		match self.reported_node() {
			Some(node) => node.value.as_str(),
			None => self.source.value(),
		}
	}

	fn depth(&self) -> usize {
		match self.reported_node() {
			Some(node) => node.depth,
			None => self.source.depth(),
		}
	}

	fn is_empty_element(&self) -> bool {
		match self.reported_node() {
			Some(node) => node.empty_element,
			None => self.source.is_empty_element(),
		}
	}

	fn advance(&mut self) -> Result<bool> {
		// normalize away an attribute position first
		match self.reported {
			Some((n, Some(_))) => self.reported = Some((n, None)),
			Some(_) => (),
			None => {
				self.source.move_to_element();
			}
		}
		self.leave_current();
		if self.buffering {
			if self.primary + 1 < self.buffer.len() {
				// replaying inside an already retained region
				self.primary += 1;
			} else {
				self.read_from_source()?;
				let node = self.snapshot_source();
				self.buffer.push_back(node);
				self.primary = self.buffer.len() - 1;
			}
			self.reported = Some((self.primary, None));
		} else if !self.buffer.is_empty() {
			// replaying after a rewind; evict as we go
			self.buffer.pop_front();
			if self.buffer.is_empty() {
				self.reported = None;
				self.read_from_source()?;
			} else {
				self.reported = Some((0, None));
			}
		} else {
			self.read_from_source()?;
		}
		self.enter_current()?;
		Ok(self.kind() != NodeKind::EndOfInput)
	}

	fn move_to_element(&mut self) -> bool {
		match self.reported {
			Some((n, Some(_))) => {
				self.reported = Some((n, None));
				true
			}
			Some(_) => false,
			None => self.source.move_to_element(),
		}
	}

	fn move_to_first_attribute(&mut self) -> bool {
		match self.reported {
			Some((n, _)) => {
				if !self.buffer[n].attributes.is_empty() {
					self.reported = Some((n, Some(0)));
					true
				} else {
					false
				}
			}
			None => self.source.move_to_first_attribute(),
		}
	}

	fn move_to_next_attribute(&mut self) -> bool {
		match self.reported {
			Some((n, attr)) => {
				let next = match attr {
					Some(i) => i + 1,
					None => 0,
				};
				if next < self.buffer[n].attributes.len() {
					self.reported = Some((n, Some(next)));
					true
				} else {
					false
				}
			}
			None => self.source.move_to_next_attribute(),
		}
	}

	fn attribute_value(&self, namespace: &str, local_name: &str) -> Option<Text> {
		match self.reported {
			Some((n, _)) => self.buffer[n]
				.attribute_value(namespace, local_name)
				.map(Text::from),
			None => self.source.attribute_value(namespace, local_name),
		}
	}
}
