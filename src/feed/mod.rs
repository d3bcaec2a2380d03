//! RSS 2.0 document assembly.
//!
//! - [`Item`] builds one `<item>` fragment from entry fields
//! - [`Channel`] builds `<channel>` metadata and splices in its items
//! - [`Feed`] wraps channels in the `<rss>` root and serializes the document
//! - [`Xmlable`] is the seam between them: channels take any item type and
//!   feeds any channel type that renders to a fragment
//! - [`DateFormatter`] is the injected collaborator for RFC-822 dates
//! - [`FeedDefinition`] reads a whole feed from a TOML description
//!
//! # Example
//!
//! ```
//! use rss_writer::feed::{Channel, Feed, Item};
//!
//! let mut feed = Feed::new();
//! let mut channel = Channel::new();
//! channel
//!     .title("Channel Title")
//!     .url("http://blog.example.com")
//!     .description("Channel Description");
//!
//! let mut item = Item::new();
//! item.title("Blog Entry Title").url("http://blog.example.com/2012/08/21/blog-entry/");
//! item.append_to(&mut channel);
//! channel.append_to(&mut feed);
//!
//! let xml = feed.render().unwrap();
//! assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
//! ```

mod channel;
mod date;
mod definition;
mod item;

use std::fmt;
use std::sync::Arc;

use crate::xml::{Element, RenderError};

pub use channel::{Channel, Hub};
pub use date::{DateFormatter, Rfc822};
pub use definition::{
    CategoryDefinition, ChannelDefinition, DateValue, DefinitionError, EnclosureDefinition,
    FeedDefinition, HubDefinition, ItemDefinition,
};
pub use item::{Category, Enclosure, Guid, Item};

/// `content:encoded` namespace.
pub const CONTENT_NS: &str = "http://purl.org/rss/1.0/modules/content/";
/// `atom:link` namespace.
pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
/// Dublin Core namespace for `dc:creator`.
pub const DC_NS: &str = "http://purl.org/dc/elements/1.1/";

const DEFAULT_INDENT: usize = 2;

/// Renders to one detached fragment that a parent deep-copies into its own
/// tree.
pub trait Xmlable: fmt::Debug + Send + Sync {
    fn as_xml(&self, dates: &dyn DateFormatter) -> Result<Element, RenderError>;
}

/// The document root: owns channels in insertion order and renders them
/// under `<rss version="2.0">`.
///
/// Rendering walks the current state every time; nothing is cached, so two
/// renders of an unchanged feed produce identical strings.
#[derive(Debug, Clone)]
pub struct Feed {
    channels: Vec<Arc<dyn Xmlable>>,
    dates: Arc<dyn DateFormatter>,
    indent: Option<usize>,
}

impl Default for Feed {
    fn default() -> Self {
        Self {
            channels: Vec::new(),
            dates: Arc::new(Rfc822::utc()),
            indent: Some(DEFAULT_INDENT),
        }
    }
}

impl Feed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a channel. Any [`Xmlable`] renders as one, so custom channel
    /// types sit alongside [`Channel`].
    pub fn add_channel(&mut self, channel: impl Xmlable + 'static) -> &mut Self {
        self.channels.push(Arc::new(channel));
        self
    }

    pub fn channels(&self) -> &[Arc<dyn Xmlable>] {
        &self.channels
    }

    /// Replaces the formatter used for every `pubDate` and `lastBuildDate`.
    pub fn date_formatter(&mut self, dates: impl DateFormatter + 'static) -> &mut Self {
        self.dates = Arc::new(dates);
        self
    }

    /// Spaces per nesting level in rendered output; `None` writes the tree
    /// on a single line.
    pub fn indent(&mut self, width: Option<usize>) -> &mut Self {
        self.indent = width;
        self
    }

    /// Builds the `<rss>` tree with the `content` and `atom` namespaces
    /// declared on the root.
    pub fn as_xml(&self) -> Result<Element, RenderError> {
        let mut rss = Element::new("rss");
        rss.declare_namespace("content", CONTENT_NS)
            .declare_namespace("atom", ATOM_NS)
            .add_attribute("version", "2.0");

        for channel in &self.channels {
            let fragment = channel.as_xml(self.dates.as_ref())?;
            rss.import(&fragment);
        }

        Ok(rss)
    }

    /// Serializes the whole feed to a pretty-printed UTF-8 document.
    pub fn render(&self) -> Result<String, RenderError> {
        let xml = self.as_xml()?.to_xml(self.indent)?;
        tracing::debug!(
            channels = self.channels.len(),
            bytes = xml.len(),
            "Rendered feed"
        );
        Ok(xml)
    }
}

/// Same output as [`Feed::render`]. A render failure surfaces as
/// `fmt::Error`, so `to_string()` panics on it; call `render` to handle the
/// error instead.
impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render() {
            Ok(xml) => f.write_str(&xml),
            Err(e) => {
                tracing::error!(error = %e, "Failed to render feed");
                Err(fmt::Error)
            }
        }
    }
}
