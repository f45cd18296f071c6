/*!
# Structural token sources

This module defines the seam between the reader and whatever tokenizer
produces the markup token stream: the [`TokenSource`] trait, the value
snapshot of a single token ([`BufferedNode`]), and [`VecSource`], an
in-memory source over a materialized token sequence.

A token source is a cursor: it is always positioned on exactly one token
(possibly the end-of-input token), and [`TokenSource::advance`] moves the
cursor forward. Sources must report well-formed nesting: matching
element-start/end pairs and depths which grow by exactly one per open
element.
*/
use smartstring::alias::String as SmartString;

use crate::error::Result;

/// Short-string type used for names, values and URIs throughout this crate.
///
/// Most of these are short enough to benefit from inline storage.
pub type Text = SmartString;

/// Kind of a structural token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
	/// Start of an element (possibly an empty element).
	Element,
	/// End of a non-empty element.
	EndElement,
	/// Character data.
	Text,
	/// An attribute of an element; only reachable through attribute
	/// navigation.
	Attribute,
	/// The position past the last token of the document.
	EndOfInput,
}

/**
# Forward-only provider of structural tokens

Implemented by tokenizer adapters; consumed by
[`LookaheadReader`](crate::lookahead::LookaheadReader), which takes
exclusive ownership of the source. The cursor starts positioned on the
first token of the document.

Attribute navigation mirrors the usual markup-cursor convention: while
positioned on an element, `move_to_first_attribute` /
`move_to_next_attribute` move onto its attribute tokens (reported at the
element's depth plus one), and `move_to_element` moves back. `advance` from
an attribute position behaves as if called from the owning element.
*/
pub trait TokenSource {
	/// Kind of the current token.
	fn kind(&self) -> NodeKind;
	/// Namespace URI of the current token, or the empty string.
	fn namespace(&self) -> &str;
	/// Local name of the current token, or the empty string.
	fn local_name(&self) -> &str;
	/// Text value of the current token (text content or attribute value).
	fn value(&self) -> &str;
	/// Nesting depth of the current token. The root element has depth 0.
	fn depth(&self) -> usize;
	/// True if the current token is an element without separate end token.
	fn is_empty_element(&self) -> bool;

	/// Move to the next token.
	///
	/// Returns false once the end of input is reached; the cursor then
	/// stays on the end-of-input token indefinitely.
	fn advance(&mut self) -> Result<bool>;

	/// Move from an attribute back to its owning element.
	///
	/// Returns false (without moving) if not positioned on an attribute.
	fn move_to_element(&mut self) -> bool;
	/// Move to the first attribute of the current element, if any.
	fn move_to_first_attribute(&mut self) -> bool;
	/// Move to the next attribute of the current element, if any.
	///
	/// From the element itself this moves to the first attribute.
	fn move_to_next_attribute(&mut self) -> bool;

	/// Look up an attribute value on the current element without moving
	/// the cursor.
	fn attribute_value(&self, namespace: &str, local_name: &str) -> Option<Text>;
}

/// Value snapshot of one token.
///
/// Nodes are created whenever a token must be retained past its natural
/// read position, i.e. while lookahead buffering is active or while
/// previously buffered tokens are replayed. Element nodes carry their
/// attributes as an ordered list of attribute nodes, so that attribute
/// access never needs to re-enter the token source once an element has
/// been buffered.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferedNode {
	pub kind: NodeKind,
	pub namespace: Text,
	pub local_name: Text,
	pub value: Text,
	pub depth: usize,
	pub empty_element: bool,
	pub attributes: Vec<BufferedNode>,
}

impl BufferedNode {
	/// Create an element node. Attributes and the empty-element flag are
	/// added via [`Self::with_attribute`] and [`Self::empty`].
	pub fn element(namespace: &str, local_name: &str, depth: usize) -> BufferedNode {
		BufferedNode {
			kind: NodeKind::Element,
			namespace: Text::from(namespace),
			local_name: Text::from(local_name),
			value: Text::new(),
			depth,
			empty_element: false,
			attributes: Vec::new(),
		}
	}

	/// Create an end-element node.
	pub fn end(namespace: &str, local_name: &str, depth: usize) -> BufferedNode {
		BufferedNode {
			kind: NodeKind::EndElement,
			namespace: Text::from(namespace),
			local_name: Text::from(local_name),
			value: Text::new(),
			depth,
			empty_element: false,
			attributes: Vec::new(),
		}
	}

	/// Create a text node.
	pub fn text(value: &str, depth: usize) -> BufferedNode {
		BufferedNode {
			kind: NodeKind::Text,
			namespace: Text::new(),
			local_name: Text::new(),
			value: Text::from(value),
			depth,
			empty_element: false,
			attributes: Vec::new(),
		}
	}

	/// Create the end-of-input node.
	pub fn end_of_input() -> BufferedNode {
		BufferedNode {
			kind: NodeKind::EndOfInput,
			namespace: Text::new(),
			local_name: Text::new(),
			value: Text::new(),
			depth: 0,
			empty_element: false,
			attributes: Vec::new(),
		}
	}

	/// Add an attribute to an element node (builder style).
	pub fn with_attribute(mut self, namespace: &str, local_name: &str, value: &str) -> BufferedNode {
		debug_assert!(self.kind == NodeKind::Element);
		self.attributes.push(BufferedNode {
			kind: NodeKind::Attribute,
			namespace: Text::from(namespace),
			local_name: Text::from(local_name),
			value: Text::from(value),
			depth: self.depth + 1,
			empty_element: false,
			attributes: Vec::new(),
		});
		self
	}

	/// Mark an element node as an empty element (builder style).
	pub fn empty(mut self) -> BufferedNode {
		debug_assert!(self.kind == NodeKind::Element);
		self.empty_element = true;
		self
	}

	/// Look up an attribute value among this element node's attributes.
	pub fn attribute_value(&self, namespace: &str, local_name: &str) -> Option<&str> {
		self.attributes
			.iter()
			.find(|a| a.local_name == local_name && a.namespace == namespace)
			.map(|a| a.value.as_str())
	}

	/// Snapshot the current token of a source, including all attributes of
	/// an element token.
	///
	/// The source must not be positioned on an attribute; its cursor is
	/// left on the snapshotted token.
	pub(crate) fn snapshot<S: TokenSource>(src: &mut S) -> BufferedNode {
		debug_assert!(src.kind() != NodeKind::Attribute);
		let mut node = BufferedNode {
			kind: src.kind(),
			namespace: Text::from(src.namespace()),
			local_name: Text::from(src.local_name()),
			value: Text::from(src.value()),
			depth: src.depth(),
			empty_element: src.is_empty_element(),
			attributes: Vec::new(),
		};
		if node.kind == NodeKind::Element && src.move_to_first_attribute() {
			loop {
				node.attributes.push(BufferedNode {
					kind: NodeKind::Attribute,
					namespace: Text::from(src.namespace()),
					local_name: Text::from(src.local_name()),
					value: Text::from(src.value()),
					depth: node.depth + 1,
					empty_element: false,
					attributes: Vec::new(),
				});
				if !src.move_to_next_attribute() {
					break;
				}
			}
			src.move_to_element();
		}
		node
	}
}

/**
# In-memory token source

Serves a materialized token sequence. This is the driver used by the test
suite and by callers which already hold a token stream in memory; real
documents are fed through a tokenizer adapter implementing
[`TokenSource`].

The sequence must be well-formed (see the trait documentation). The
end-of-input token is implicit and does not need to be part of the
sequence.
*/
pub struct VecSource {
	nodes: Vec<BufferedNode>,
	pos: usize,
	attr: Option<usize>,
	eoi: BufferedNode,
}

impl VecSource {
	pub fn new(nodes: Vec<BufferedNode>) -> VecSource {
		VecSource {
			nodes,
			pos: 0,
			attr: None,
			eoi: BufferedNode::end_of_input(),
		}
	}

	fn node(&self) -> &BufferedNode {
		self.nodes.get(self.pos).unwrap_or(&self.eoi)
	}

	fn current(&self) -> &BufferedNode {
		let node = self.node();
		match self.attr {
			Some(i) => &node.attributes[i],
			None => node,
		}
	}
}

impl TokenSource for VecSource {
	fn kind(&self) -> NodeKind {
		self.current().kind
	}

	fn namespace(&self) -> &str {
		self.current().namespace.as_str()
	}

	fn local_name(&self) -> &str {
		self.current().local_name.as_str()
	}

	fn value(&self) -> &str {
		self.current().value.as_str()
	}

	fn depth(&self) -> usize {
		self.current().depth
	}

	fn is_empty_element(&self) -> bool {
		self.current().empty_element
	}

	fn advance(&mut self) -> Result<bool> {
		self.attr = None;
		if self.pos < self.nodes.len() {
			self.pos += 1;
		}
		Ok(self.pos < self.nodes.len())
	}

	fn move_to_element(&mut self) -> bool {
		self.attr.take().is_some()
	}

	fn move_to_first_attribute(&mut self) -> bool {
		if !self.node().attributes.is_empty() {
			self.attr = Some(0);
			true
		} else {
			false
		}
	}

	fn move_to_next_attribute(&mut self) -> bool {
		let next = match self.attr {
			Some(i) => i + 1,
			None => 0,
		};
		if next < self.node().attributes.len() {
			self.attr = Some(next);
			true
		} else {
			false
		}
	}

	fn attribute_value(&self, namespace: &str, local_name: &str) -> Option<Text> {
		self.node()
			.attribute_value(namespace, local_name)
			.map(Text::from)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample() -> VecSource {
		VecSource::new(vec![
			BufferedNode::element("urn:x", "root", 0).with_attribute("", "a", "1"),
			BufferedNode::text("hello", 1),
			BufferedNode::end("urn:x", "root", 0),
		])
	}

	#[test]
	fn cursor_walks_sequence() {
		let mut src = sample();
		assert_eq!(src.kind(), NodeKind::Element);
		assert_eq!(src.local_name(), "root");
		assert_eq!(src.depth(), 0);
		assert_eq!(src.advance().unwrap(), true);
		assert_eq!(src.kind(), NodeKind::Text);
		assert_eq!(src.value(), "hello");
		assert_eq!(src.advance().unwrap(), true);
		assert_eq!(src.kind(), NodeKind::EndElement);
		assert_eq!(src.advance().unwrap(), false);
		assert_eq!(src.kind(), NodeKind::EndOfInput);
		// stays on end of input
		assert_eq!(src.advance().unwrap(), false);
		assert_eq!(src.kind(), NodeKind::EndOfInput);
	}

	#[test]
	fn attribute_navigation() {
		let mut src = sample();
		assert!(src.move_to_first_attribute());
		assert_eq!(src.kind(), NodeKind::Attribute);
		assert_eq!(src.local_name(), "a");
		assert_eq!(src.value(), "1");
		assert_eq!(src.depth(), 1);
		assert!(!src.move_to_next_attribute());
		assert!(src.move_to_element());
		assert_eq!(src.kind(), NodeKind::Element);
		assert!(!src.move_to_element());
	}

	#[test]
	fn move_to_next_attribute_from_element() {
		let mut src = sample();
		assert!(src.move_to_next_attribute());
		assert_eq!(src.local_name(), "a");
	}

	#[test]
	fn attribute_lookup_without_moving() {
		let src = sample();
		assert_eq!(src.attribute_value("", "a").as_deref(), Some("1"));
		assert_eq!(src.attribute_value("", "b"), None);
		assert_eq!(src.kind(), NodeKind::Element);
	}

	#[test]
	fn advance_resets_attribute_position() {
		let mut src = sample();
		assert!(src.move_to_first_attribute());
		assert_eq!(src.advance().unwrap(), true);
		assert_eq!(src.kind(), NodeKind::Text);
	}

	#[test]
	fn snapshot_captures_attributes() {
		let mut src = sample();
		let node = BufferedNode::snapshot(&mut src);
		assert_eq!(node.kind, NodeKind::Element);
		assert_eq!(node.attributes.len(), 1);
		assert_eq!(node.attribute_value("", "a"), Some("1"));
		// cursor restored to the element
		assert_eq!(src.kind(), NodeKind::Element);
	}
}
