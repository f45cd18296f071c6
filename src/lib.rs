/*!
# Streaming pull reader for Atom data-service payloads

This crate decodes the Atom rendition of data-service payloads (feeds,
entries and their expanded navigation links) from a stream of structural
markup tokens, without ever materializing a document tree and with memory
usage bounded by the payload's nesting depth plus a small lookahead
window.

It deliberately stops at the structural layer: it tells you where
entries, feeds and navigation links begin and end, which URIs and tags
belong to them, and which entries carry media resources; it does not
decode property values.

## Quick start

Wrap a [`TokenSource`](source::TokenSource) in a
[`DataReader`](reader::DataReader) and pull:

```no_run
use ratom::reader::{DataReader, PayloadKind, State};
use ratom::source::VecSource;

fn dump(source: VecSource) -> Result<(), ratom::error::Error> {
	let mut reader = DataReader::new(source, PayloadKind::Feed);
	while reader.read()? {
		if reader.state() == State::EntryEnd {
			if let Some(entry) = reader.current_entry() {
				println!("{:?}", entry.id);
			}
		}
	}
	Ok(())
}
```

## Features

- `mt`: build the crate for multithreaded use; shared metadata handles
  are then `Arc` instead of `Rc`.
*/
pub mod atom;
pub mod error;
mod errorpayload;
pub mod lookahead;
pub mod meta;
pub mod model;
pub mod reader;
pub mod source;
pub mod uri;

#[cfg(test)]
mod tests;

#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use meta::{EntityType, Model, NullModel, ProtocolVersion, RcPtr, ReaderOptions};
#[doc(inline)]
pub use model::{Entry, Feed, NavigationLink};
#[doc(inline)]
pub use reader::{DataReader, PayloadKind, State};
#[doc(inline)]
pub use source::{BufferedNode, NodeKind, Text, TokenSource, VecSource};

/// XML namespace URIs and element names recognized by this crate, for
/// use by token source implementations.
pub use atom::{NS_ATOM, NS_DATA, NS_METADATA};

/// The version of this crate.
pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");
