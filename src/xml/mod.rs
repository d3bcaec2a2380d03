//! In-memory XML tree and serializer.
//!
//! - [`Element`] wraps one node and offers the three building operations used
//!   by every feed entity: add a (namespaced) child, add a CDATA child, and set
//!   an attribute. [`Element::import`] splices a finished fragment into a
//!   parent by deep copy.
//! - The writer serializes a tree through `quick-xml` with human-readable
//!   indentation, declaring namespaces where they are first needed.

mod element;
mod writer;

use thiserror::Error;

pub use element::{Element, Node};

/// Errors that can occur while turning a feed into XML.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The underlying XML writer rejected an event.
    #[error("XML write error: {0}")]
    Write(String),

    /// Serialized bytes were not UTF-8.
    #[error("Rendered document is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The date formatter could not represent a timestamp.
    #[error("Timestamp {0} is outside the representable date range")]
    TimestampOutOfRange(i64),
}
