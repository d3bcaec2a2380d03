//! Text safety helpers applied to user-supplied strings before they become XML.
//!
//! - **Ampersand escaping**: `&` becomes `&amp;` ahead of the writer
//! - **Character stripping**: NUL and the other characters XML 1.0 forbids
//!   are dropped, never reported
//!
//! # Examples
//!
//! ```
//! use rss_writer::util::{escape_ampersand, strip_invalid_chars};
//!
//! let stripped = strip_invalid_chars("Tom\0 & Jerry");
//! let safe = escape_ampersand(&stripped);
//! assert_eq!(safe, "Tom &amp; Jerry");
//! ```

mod text;

pub use text::{escape_ampersand, strip_invalid_chars};
