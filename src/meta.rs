/*!
# Reader configuration and metadata binding

Holds [`ReaderOptions`] and the [`Model`] trait through which a caller can
plug schema knowledge into the structural pass: resolving entity types
from discriminators, answering multiplicity questions for navigation
links, and post-processing completed entries.

Without schema knowledge, [`NullModel`] answers everything permissively.
*/
use crate::error::Result;
use crate::model::Entry;
use crate::source::Text;

#[cfg(feature = "mt")]
pub type RcPtr<T> = std::sync::Arc<T>;
#[cfg(not(feature = "mt"))]
pub type RcPtr<T> = std::rc::Rc<T>;

/// Reference to an entity type known to the metadata model.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityType {
	pub name: Text,
	/// True if instances of this type carry a default media stream.
	pub is_media_link_entry: bool,
}

impl EntityType {
	pub fn named(name: &str) -> EntityType {
		EntityType {
			name: Text::from(name),
			is_media_link_entry: false,
		}
	}
}

/// What the metadata model knows about the target of a navigation link.
#[derive(Debug, Clone, Default)]
pub struct NavigationTarget {
	/// Declared target entity type, if known.
	pub entity_type: Option<RcPtr<EntityType>>,
	/// Declared multiplicity, if known.
	pub is_collection: Option<bool>,
}

/// Protocol version the payload is interpreted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolVersion {
	V1,
	V2,
	V3,
}

impl Default for ProtocolVersion {
	fn default() -> ProtocolVersion {
		ProtocolVersion::V2
	}
}

/**
# Options for constructing a reader

Use the builder-style setters to deviate from the defaults:

- no document base URI,
- in-stream error detection enabled,
- protocol version 2,
- no expected entity type for the root payload.
*/
#[derive(Debug, Clone, Default)]
pub struct ReaderOptions {
	pub(crate) base_uri: Option<Text>,
	pub(crate) detect_in_stream_errors: Option<bool>,
	pub(crate) version: Option<ProtocolVersion>,
	pub(crate) expected_type: Option<RcPtr<EntityType>>,
}

impl ReaderOptions {
	pub fn new() -> ReaderOptions {
		ReaderOptions::default()
	}

	/// Set the base URI used to resolve references outside any
	/// `xml:base` scope.
	pub fn base_uri(mut self, uri: &str) -> ReaderOptions {
		self.base_uri = Some(Text::from(uri));
		self
	}

	/// Enable or disable sniffing for in-stream error documents.
	pub fn detect_in_stream_errors(mut self, enabled: bool) -> ReaderOptions {
		self.detect_in_stream_errors = Some(enabled);
		self
	}

	/// Set the protocol version the payload is interpreted under.
	pub fn version(mut self, version: ProtocolVersion) -> ReaderOptions {
		self.version = Some(version);
		self
	}

	/// Declare the entity type the root payload is expected to carry.
	pub fn expected_type(mut self, ty: RcPtr<EntityType>) -> ReaderOptions {
		self.expected_type = Some(ty);
		self
	}
}

/**
# Schema knowledge for the structural pass

The reader consults its model at well-defined points; a model never sees
raw tokens. All hooks are infallible-by-default in [`NullModel`]; a real
model may return [`Error::Model`](crate::error::Error::Model) from any of
them to fail the read.
*/
pub trait Model {
	/// Carrier for per-type projection state, threaded from
	/// [`Self::projection`] into [`Self::apply_mappings`].
	type Projection;

	/// Resolve the entity type of an entry from its discriminator.
	///
	/// `payload_name` is the type name found in the payload, if any;
	/// `expected` is the type the enclosing scope predicts.
	fn resolve_entity_type(
		&self,
		payload_name: Option<&str>,
		expected: Option<&RcPtr<EntityType>>,
	) -> Result<Option<RcPtr<EntityType>>>;

	/// Answer what is known about a navigation link of the given name on
	/// the enclosing entity type.
	fn resolve_navigation_target(
		&self,
		enclosing: Option<&RcPtr<EntityType>>,
		name: &str,
	) -> Result<NavigationTarget>;

	/// Produce the projection state for an entity type, if the type has
	/// any mappings to apply.
	fn projection(&self, ty: Option<&RcPtr<EntityType>>) -> Option<Self::Projection>;

	/// Post-process a completed entry (e.g. fold mapped syndication
	/// values into properties).
	fn apply_mappings(
		&self,
		projection: &Self::Projection,
		entry: &mut Entry,
		version: ProtocolVersion,
	) -> Result<()>;

	/// Final validation hook for a completed entry.
	fn validate_entry(&self, entry: &Entry, entity_type: Option<&RcPtr<EntityType>>)
		-> Result<()>;
}

/// Model without schema knowledge. Types are taken at face value from
/// the payload and every structural question is answered with "unknown".
#[derive(Debug, Clone, Copy, Default)]
pub struct NullModel;

impl Model for NullModel {
	type Projection = ();

	fn resolve_entity_type(
		&self,
		payload_name: Option<&str>,
		expected: Option<&RcPtr<EntityType>>,
	) -> Result<Option<RcPtr<EntityType>>> {
		Ok(match payload_name {
			Some(name) => Some(RcPtr::new(EntityType::named(name))),
			None => expected.cloned(),
		})
	}

	fn resolve_navigation_target(
		&self,
		_enclosing: Option<&RcPtr<EntityType>>,
		_name: &str,
	) -> Result<NavigationTarget> {
		Ok(NavigationTarget::default())
	}

	fn projection(&self, _ty: Option<&RcPtr<EntityType>>) -> Option<()> {
		None
	}

	fn apply_mappings(
		&self,
		_projection: &(),
		_entry: &mut Entry,
		_version: ProtocolVersion,
	) -> Result<()> {
		Ok(())
	}

	fn validate_entry(
		&self,
		_entry: &Entry,
		_entity_type: Option<&RcPtr<EntityType>>,
	) -> Result<()> {
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn null_model_prefers_payload_name() {
		let expected = RcPtr::new(EntityType::named("NS.Base"));
		let ty = NullModel
			.resolve_entity_type(Some("NS.Derived"), Some(&expected))
			.unwrap()
			.unwrap();
		assert_eq!(ty.name, "NS.Derived");
		let ty = NullModel
			.resolve_entity_type(None, Some(&expected))
			.unwrap()
			.unwrap();
		assert_eq!(ty.name, "NS.Base");
		assert!(NullModel.resolve_entity_type(None, None).unwrap().is_none());
	}

	#[test]
	fn options_builder() {
		let opts = ReaderOptions::new()
			.base_uri("http://example.com/svc/")
			.detect_in_stream_errors(false)
			.version(ProtocolVersion::V3);
		assert_eq!(opts.base_uri.as_deref(), Some("http://example.com/svc/"));
		assert_eq!(opts.detect_in_stream_errors, Some(false));
		assert_eq!(opts.version, Some(ProtocolVersion::V3));
	}
}
