/*!
# In-stream error payload reader

Decodes the structured error document a service may emit in place of a
regular payload (or in the middle of one). The entry point is positioned
on the error root element and reads the complete error subtree, including
arbitrarily nested internal-exception records.
*/
use crate::atom::{
	EL_CODE, EL_ERROR, EL_INNER_ERROR, EL_INTERNAL_EXCEPTION, EL_MESSAGE, EL_STACK_TRACE,
	EL_TYPE, NS_METADATA,
};
use crate::error::{Error, InStreamError, InnerError, Result, SyntaxError, ERRCTX_ERROR_PAYLOAD};
use crate::source::{NodeKind, Text, TokenSource};

fn next<S: TokenSource>(src: &mut S) -> Result<()> {
	if !src.advance()? {
		return Err(Error::eof(ERRCTX_ERROR_PAYLOAD));
	}
	Ok(())
}

/// Read the text content of the current element and consume it up to and
/// including its end token. Child elements are not allowed.
fn read_element_text<S: TokenSource>(src: &mut S) -> Result<Text> {
	debug_assert!(src.kind() == NodeKind::Element);
	let mut buf = Text::new();
	if src.is_empty_element() {
		return Ok(buf);
	}
	let depth = src.depth();
	loop {
		next(src)?;
		match src.kind() {
			NodeKind::Text => buf.push_str(src.value()),
			NodeKind::EndElement if src.depth() == depth => return Ok(buf),
			NodeKind::Element => {
				return Err(Error::Syntax(SyntaxError::UnexpectedElement(
					ERRCTX_ERROR_PAYLOAD,
					Text::from(src.local_name()),
				)))
			}
			_ => (),
		}
	}
}

/// Read an inner-error record, positioned on its element, consuming it up
/// to and including its end token.
fn read_inner_error<S: TokenSource>(src: &mut S) -> Result<InnerError> {
	debug_assert!(src.kind() == NodeKind::Element);
	let mut result = InnerError::default();
	if src.is_empty_element() {
		return Ok(result);
	}
	let depth = src.depth();
	loop {
		next(src)?;
		match src.kind() {
			NodeKind::EndElement if src.depth() == depth => return Ok(result),
			NodeKind::Element if src.namespace() == NS_METADATA => {
				let (slot, name) = match src.local_name() {
					EL_MESSAGE => (&mut result.message, EL_MESSAGE),
					EL_TYPE => (&mut result.type_name, EL_TYPE),
					EL_STACK_TRACE => (&mut result.stack_trace, EL_STACK_TRACE),
					EL_INTERNAL_EXCEPTION => {
						if result.nested.is_some() {
							return Err(Error::Syntax(SyntaxError::DuplicateElement(
								EL_INTERNAL_EXCEPTION,
							)));
						}
						result.nested = Some(Box::new(read_inner_error(src)?));
						continue;
					}
					other => {
						return Err(Error::Syntax(SyntaxError::UnexpectedElement(
							ERRCTX_ERROR_PAYLOAD,
							Text::from(other),
						)))
					}
				};
				if slot.is_some() {
					return Err(Error::Syntax(SyntaxError::DuplicateElement(name)));
				}
				*slot = Some(read_element_text(src)?);
			}
			NodeKind::Element => {
				return Err(Error::Syntax(SyntaxError::UnexpectedElement(
					ERRCTX_ERROR_PAYLOAD,
					Text::from(src.local_name()),
				)))
			}
			_ => (),
		}
	}
}

/// Read a complete in-stream error document, positioned on its root
/// element.
pub(crate) fn read_error_payload<S: TokenSource>(src: &mut S) -> Result<InStreamError> {
	debug_assert!(
		src.kind() == NodeKind::Element
			&& src.namespace() == NS_METADATA
			&& src.local_name() == EL_ERROR
	);
	let mut result = InStreamError::default();
	if src.is_empty_element() {
		return Ok(result);
	}
	let depth = src.depth();
	loop {
		next(src)?;
		match src.kind() {
			NodeKind::EndElement if src.depth() == depth => return Ok(result),
			NodeKind::Element if src.namespace() == NS_METADATA => match src.local_name() {
				EL_CODE => {
					if result.code.is_some() {
						return Err(Error::Syntax(SyntaxError::DuplicateElement(EL_CODE)));
					}
					result.code = Some(read_element_text(src)?);
				}
				EL_MESSAGE => {
					if result.message.is_some() {
						return Err(Error::Syntax(SyntaxError::DuplicateElement(EL_MESSAGE)));
					}
					result.message = Some(read_element_text(src)?);
				}
				EL_INNER_ERROR => {
					if result.inner.is_some() {
						return Err(Error::Syntax(SyntaxError::DuplicateElement(
							EL_INNER_ERROR,
						)));
					}
					result.inner = Some(read_inner_error(src)?);
				}
				other => {
					return Err(Error::Syntax(SyntaxError::UnexpectedElement(
						ERRCTX_ERROR_PAYLOAD,
						Text::from(other),
					)))
				}
			},
			NodeKind::Element => {
				return Err(Error::Syntax(SyntaxError::UnexpectedElement(
					ERRCTX_ERROR_PAYLOAD,
					Text::from(src.local_name()),
				)))
			}
			_ => (),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::source::{BufferedNode, VecSource};

	fn m(name: &'static str, depth: usize) -> BufferedNode {
		BufferedNode::element(NS_METADATA, name, depth)
	}

	fn m_end(name: &'static str, depth: usize) -> BufferedNode {
		BufferedNode::end(NS_METADATA, name, depth)
	}

	#[test]
	fn full_payload() {
		let mut src = VecSource::new(vec![
			m(EL_ERROR, 0),
			m(EL_CODE, 1),
			BufferedNode::text("404", 2),
			m_end(EL_CODE, 1),
			m(EL_MESSAGE, 1).with_attribute(crate::atom::NS_XML, "lang", "en-US"),
			BufferedNode::text("not found", 2),
			m_end(EL_MESSAGE, 1),
			m(EL_INNER_ERROR, 1),
			m(EL_MESSAGE, 2),
			BufferedNode::text("deep", 3),
			m_end(EL_MESSAGE, 2),
			m(EL_INTERNAL_EXCEPTION, 2),
			m(EL_TYPE, 3),
			BufferedNode::text("System.Exception", 4),
			m_end(EL_TYPE, 3),
			m_end(EL_INTERNAL_EXCEPTION, 2),
			m_end(EL_INNER_ERROR, 1),
			m_end(EL_ERROR, 0),
		]);
		let err = read_error_payload(&mut src).unwrap();
		assert_eq!(err.code.as_deref(), Some("404"));
		assert_eq!(err.message.as_deref(), Some("not found"));
		let inner = err.inner.unwrap();
		assert_eq!(inner.message.as_deref(), Some("deep"));
		let nested = inner.nested.unwrap();
		assert_eq!(nested.type_name.as_deref(), Some("System.Exception"));
	}

	#[test]
	fn empty_error_element() {
		let mut src = VecSource::new(vec![m(EL_ERROR, 0).empty()]);
		let err = read_error_payload(&mut src).unwrap();
		assert_eq!(err, InStreamError::default());
	}

	#[test]
	fn duplicate_code_rejected() {
		let mut src = VecSource::new(vec![
			m(EL_ERROR, 0),
			m(EL_CODE, 1).empty(),
			m(EL_CODE, 1).empty(),
			m_end(EL_ERROR, 0),
		]);
		match read_error_payload(&mut src) {
			Err(Error::Syntax(SyntaxError::DuplicateElement(EL_CODE))) => (),
			other => panic!("unexpected result: {:?}", other),
		}
	}

	#[test]
	fn foreign_element_rejected() {
		let mut src = VecSource::new(vec![
			m(EL_ERROR, 0),
			BufferedNode::element("urn:x", "surprise", 1).empty(),
			m_end(EL_ERROR, 0),
		]);
		match read_error_payload(&mut src) {
			Err(Error::Syntax(SyntaxError::UnexpectedElement(ctx, name))) => {
				assert_eq!(ctx, ERRCTX_ERROR_PAYLOAD);
				assert_eq!(name, "surprise");
			}
			other => panic!("unexpected result: {:?}", other),
		}
	}

	#[test]
	fn truncated_payload_is_eof() {
		let mut src = VecSource::new(vec![m(EL_ERROR, 0), m(EL_MESSAGE, 1)]);
		match read_error_payload(&mut src) {
			Err(Error::Syntax(SyntaxError::UnexpectedEof(_))) => (),
			other => panic!("unexpected result: {:?}", other),
		}
	}
}
