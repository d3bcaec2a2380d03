//! RSS 2.0 document builder.
//!
//! Populate [`Item`]s, attach them to [`Channel`]s, attach channels to a
//! [`Feed`] and call [`Feed::render`] for a pretty-printed UTF-8 document.
//! [`Validator`] checks rendered output against the bundled RSS 2.0 schema.
//!
//! ```
//! use rss_writer::{Channel, Enclosure, Feed, Item, Validator};
//!
//! let mut feed = Feed::new();
//!
//! let mut channel = Channel::new();
//! channel
//!     .title("Channel Title")
//!     .url("http://blog.example.com")
//!     .description("Channel Description")
//!     .ttl(60);
//!
//! let mut item = Item::new();
//! item.title("Some Podcast Entry")
//!     .enclosure(Enclosure::new("http://podcast.example.com/podcast.mp3").length(4889));
//! item.append_to(&mut channel);
//! channel.append_to(&mut feed);
//!
//! let xml = feed.render().unwrap();
//! assert!(Validator::new().unwrap().validate(&xml));
//! ```

pub mod config;
pub mod feed;
pub mod util;
pub mod validation;
pub mod xml;

pub use config::{Config, ConfigError};
pub use feed::{Category, Channel, Enclosure, Feed, FeedDefinition, Guid, Item, Xmlable};
pub use validation::{Severity, ValidationError, Validator};
pub use xml::RenderError;
