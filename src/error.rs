/*!
# Error types

This module holds the error types returned by the various functions of this
crate, as well as the structured in-stream error payload.
*/
use std::error;
use std::fmt;
use std::io;
use std::ops::Deref;
use std::result::Result as StdResult;
use std::sync::Arc;

use crate::source::Text;

pub const ERRCTX_PREAMBLE: &'static str = "in payload preamble";
pub const ERRCTX_POSTAMBLE: &'static str = "after the payload root element";
pub const ERRCTX_FEED: &'static str = "in feed content";
pub const ERRCTX_ENTRY: &'static str = "in entry content";
pub const ERRCTX_LINK: &'static str = "in navigation link content";
pub const ERRCTX_INLINE: &'static str = "in expansion wrapper content";
pub const ERRCTX_ERROR_PAYLOAD: &'static str = "in error payload";
pub const ERRCTX_SKIP: &'static str = "while skipping an element";

/// Violation of the payload grammar or of one of its consistency rules.
///
/// All of these are malformed-input conditions: the token stream was
/// well-formed markup, but it does not describe a valid feed/entry payload.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxError {
	/// The document root element does not match the requested payload kind.
	///
	/// Carries the expected element description and the local name found.
	UnexpectedRootElement(&'static str, Text),

	/// An element appeared at a position where only a fixed set of elements
	/// is legal.
	///
	/// Carries the context and the local name of the offending element.
	UnexpectedElement(&'static str, Text),

	/// End of input encountered during a construct where more tokens were
	/// expected.
	UnexpectedEof(&'static str),

	/// A relative base-URI override was found while no absolute base URI is
	/// in scope.
	RelativeBaseUri(Text),

	/// An element or attribute which may occur at most once occurred again.
	///
	/// The content names the duplicated construct.
	DuplicateElement(&'static str),

	/// A link or stream property name occurred more than once within one
	/// entry.
	DuplicateName(&'static str, Text),

	/// A second expansion wrapper was found on a single navigation link.
	DuplicateExpansion,

	/// A second expanded payload was found under one expansion wrapper.
	DuplicateExpandedContent,

	/// The value of a result-count marker is not a valid count.
	InvalidCount(Text),

	/// An attribute required on this element is missing.
	///
	/// Carries the element description and the attribute name.
	MissingAttribute(&'static str, &'static str),

	/// The payload shape of an expanded navigation link contradicts the
	/// multiplicity which is already established for it.
	///
	/// Carries a description of the offending shape and the link name.
	MultiplicityMismatch(&'static str, Text),

	/// The payload contradicts the media-resource decision which is already
	/// established for the entry.
	MediaResourceContradiction(&'static str),
}

impl error::Error for SyntaxError {}

impl fmt::Display for SyntaxError {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::UnexpectedRootElement(expected, found) => write!(
				f,
				"unexpected root element '{}' (expected {})",
				found, expected
			),
			Self::UnexpectedElement(ctx, found) => {
				write!(f, "element '{}' not allowed {}", found, ctx)
			}
			Self::UnexpectedEof(ctx) => write!(f, "unexpected end of input {}", ctx),
			Self::RelativeBaseUri(v) => write!(
				f,
				"relative base URI '{}' without an absolute base URI in scope",
				v
			),
			Self::DuplicateElement(what) => write!(f, "duplicate {}", what),
			Self::DuplicateName(what, name) => write!(f, "duplicate {} '{}'", what, name),
			Self::DuplicateExpansion => {
				f.write_str("more than one expansion wrapper on a navigation link")
			}
			Self::DuplicateExpandedContent => {
				f.write_str("more than one expanded payload in an expansion wrapper")
			}
			Self::InvalidCount(v) => write!(f, "invalid result count value '{}'", v),
			Self::MissingAttribute(el, attr) => {
				write!(f, "missing attribute '{}' on {}", attr, el)
			}
			Self::MultiplicityMismatch(shape, name) => write!(
				f,
				"{} contradicts the multiplicity of navigation link '{}'",
				shape, name
			),
			Self::MediaResourceContradiction(what) => write!(
				f,
				"{} contradicts the media-resource decision for this entry",
				what
			),
		}
	}
}

/// Nested inner error of an in-stream error payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InnerError {
	pub message: Option<Text>,
	pub type_name: Option<Text>,
	pub stack_trace: Option<Text>,
	pub nested: Option<Box<InnerError>>,
}

/// Structured error payload embedded in place of ordinary content.
///
/// The envelope carrying the payload was well-formed; semantically the
/// payload is an error response, which terminates the parse.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InStreamError {
	pub code: Option<Text>,
	pub message: Option<Text>,
	pub inner: Option<InnerError>,
}

impl error::Error for InStreamError {}

impl fmt::Display for InStreamError {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		f.write_str("in-stream error")?;
		if let Some(code) = self.code.as_ref() {
			write!(f, " [{}]", code)?;
		}
		if let Some(message) = self.message.as_ref() {
			write!(f, ": {}", message)?;
		}
		Ok(())
	}
}

/// [`std::sync::Arc`]-based wrapper around [`std::io::Error`] to allow
/// cloning.
#[derive(Clone)]
pub struct IOErrorWrapper(Arc<io::Error>);

impl IOErrorWrapper {
	fn wrap(e: io::Error) -> IOErrorWrapper {
		IOErrorWrapper(Arc::new(e))
	}
}

impl fmt::Debug for IOErrorWrapper {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		fmt::Debug::fmt(&**self, f)
	}
}

impl fmt::Display for IOErrorWrapper {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		fmt::Display::fmt(&**self, f)
	}
}

impl PartialEq for IOErrorWrapper {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl AsRef<io::Error> for IOErrorWrapper {
	fn as_ref(&self) -> &io::Error {
		&*self.0
	}
}

impl Deref for IOErrorWrapper {
	type Target = io::Error;

	fn deref(&self) -> &io::Error {
		&*self.0
	}
}

/// Error types which may be returned from the reader.
///
/// With the exception of [`Error::IO`], all errors are fatal and will be
/// returned indefinitely from the reader after the first encounter.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
	/// An I/O error was encountered by the token source.
	///
	/// I/O errors are not fatal and may be retried. This is especially
	/// important for (but not limited to)
	/// [`std::io::ErrorKind::WouldBlock`] errors.
	IO(IOErrorWrapper),

	/// A violation of the payload grammar or of one of its consistency
	/// rules was encountered.
	Syntax(SyntaxError),

	/// A structured error payload appeared in place of ordinary content.
	///
	/// This is distinct from [`Error::Syntax`]: the stream was well-formed,
	/// but it is semantically an error response.
	InStream(InStreamError),

	/// A model collaborator (type resolution, mapping projection or entry
	/// validation) reported a failure.
	Model(String),
}

pub type Result<T> = StdResult<T, Error>;

impl Error {
	pub fn io(e: io::Error) -> Error {
		Error::IO(IOErrorWrapper::wrap(e))
	}

	pub fn model<T: Into<String>>(msg: T) -> Error {
		Error::Model(msg.into())
	}

	pub(crate) fn eof(ctx: &'static str) -> Error {
		Error::Syntax(SyntaxError::UnexpectedEof(ctx))
	}
}

impl From<io::Error> for Error {
	fn from(e: io::Error) -> Error {
		Error::io(e)
	}
}

impl From<SyntaxError> for Error {
	fn from(e: SyntaxError) -> Error {
		Error::Syntax(e)
	}
}

impl From<InStreamError> for Error {
	fn from(e: InStreamError) -> Error {
		Error::InStream(e)
	}
}

impl fmt::Display for Error {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Error::IO(e) => write!(f, "I/O error: {}", e),
			Error::Syntax(e) => write!(f, "malformed payload: {}", e),
			Error::InStream(e) => fmt::Display::fmt(e, f),
			Error::Model(msg) => write!(f, "model error: {}", msg),
		}
	}
}

impl error::Error for Error {
	fn source(&self) -> Option<&(dyn error::Error + 'static)> {
		match self {
			Error::IO(e) => Some(&**e),
			Error::Syntax(e) => Some(e),
			Error::InStream(e) => Some(e),
			Error::Model(_) => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn syntax_error_display_contains_context() {
		let e = SyntaxError::UnexpectedElement(ERRCTX_INLINE, Text::from("properties"));
		let s = format!("{}", e);
		assert!(s.contains("properties"));
		assert!(s.contains(ERRCTX_INLINE));
	}

	#[test]
	fn in_stream_error_display() {
		let e = InStreamError {
			code: Some(Text::from("404")),
			message: Some(Text::from("no such set")),
			inner: None,
		};
		assert_eq!(format!("{}", e), "in-stream error [404]: no such set");
	}

	#[test]
	fn io_errors_compare_by_identity() {
		let a = Error::io(io::Error::new(io::ErrorKind::WouldBlock, "a"));
		let b = Error::io(io::Error::new(io::ErrorKind::WouldBlock, "a"));
		assert_ne!(a, b);
		assert_eq!(a.clone(), a);
	}
}
