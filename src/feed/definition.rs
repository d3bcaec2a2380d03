//! TOML description of a whole feed, converted into the builder types.
//!
//! ```toml
//! [[channels]]
//! title = "Channel Title"
//! url = "http://blog.example.com"
//! description = "Channel Description"
//! pub_date = "Tue, 21 Aug 2012 19:50:37 +0900"
//! pubsubhubbub = { feed_url = "http://example.com/feed.xml", hub_url = "http://pubsubhubbub.appspot.com" }
//!
//! [[channels.items]]
//! title = "Blog Entry Title"
//! categories = ["news", ["MSFT", "http://www.fool.com/cusips"], { name = "misc" }]
//! enclosure = { url = "http://example.com/a.mp3", length = 4889, type = "audio/mpeg" }
//! ```
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use super::{Category, Channel, Enclosure, Feed, Item};

/// Errors that can occur while loading a feed definition.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("Failed to read feed definition: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in feed definition: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC-014: Definition file exceeds maximum allowed size.
    #[error("Feed definition too large: {0}")]
    TooLarge(String),

    /// A category array was empty, had an empty name, or had more than two entries.
    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    #[error("Invalid date '{value}': {reason}")]
    InvalidDate { value: String, reason: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedDefinition {
    pub channels: Vec<ChannelDefinition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChannelDefinition {
    pub title: Option<String>,
    pub url: Option<String>,
    pub feed_url: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub copyright: Option<String>,
    pub pub_date: Option<DateValue>,
    pub last_build_date: Option<DateValue>,
    pub ttl: Option<u32>,
    pub pubsubhubbub: Option<HubDefinition>,
    pub items: Vec<ItemDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HubDefinition {
    pub feed_url: String,
    pub hub_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ItemDefinition {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub content_encoded: Option<String>,
    pub categories: Vec<CategoryDefinition>,
    pub guid: Option<String>,
    pub guid_is_permalink: Option<bool>,
    pub pub_date: Option<DateValue>,
    pub enclosure: Option<EnclosureDefinition>,
    pub author: Option<String>,
    pub creator: Option<String>,
    pub prefer_cdata: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnclosureDefinition {
    pub url: String,
    #[serde(default)]
    pub length: u64,
    #[serde(rename = "type", default = "default_enclosure_type")]
    pub mime_type: String,
}

fn default_enclosure_type() -> String {
    "audio/mpeg".to_string()
}

/// A category as written in TOML: `"name"`, `["name"]`, `["name", "domain"]`
/// or `{ name = "...", domain = "..." }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CategoryDefinition {
    Name(String),
    List(Vec<String>),
    Table {
        name: String,
        #[serde(default)]
        domain: Option<String>,
    },
}

/// Unix seconds or an RFC 2822 date string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    Timestamp(i64),
    Text(String),
}

impl DateValue {
    pub fn timestamp(&self) -> Result<i64, DefinitionError> {
        match self {
            Self::Timestamp(ts) => Ok(*ts),
            Self::Text(text) => chrono::DateTime::parse_from_rfc2822(text.trim())
                .map(|dt| dt.timestamp())
                .map_err(|e| DefinitionError::InvalidDate {
                    value: text.clone(),
                    reason: e.to_string(),
                }),
        }
    }
}

impl CategoryDefinition {
    fn into_category(self) -> Result<Category, DefinitionError> {
        let category = match self {
            Self::Name(name) => Category::new(name),
            Self::Table { name, domain } => Category { name, domain },
            Self::List(parts) => {
                let mut parts = parts.into_iter();
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(name), None, None) => Category::new(name),
                    (Some(name), Some(domain), None) => Category::with_domain(name, domain),
                    (None, _, _) => {
                        return Err(DefinitionError::InvalidCategory(
                            "empty category array".to_string(),
                        ))
                    }
                    (Some(name), Some(_), Some(_)) => {
                        return Err(DefinitionError::InvalidCategory(format!(
                            "category '{name}' has more than a name and a domain"
                        )))
                    }
                    (Some(name), None, Some(_)) => {
                        return Err(DefinitionError::InvalidCategory(format!(
                            "category '{name}' is malformed"
                        )))
                    }
                }
            }
        };

        if category.name.trim().is_empty() {
            return Err(DefinitionError::InvalidCategory(
                "category name is empty".to_string(),
            ));
        }
        Ok(category)
    }
}

impl FeedDefinition {
    /// SEC-014: Maximum definition file size (8 MB).
    const MAX_FILE_SIZE: u64 = 8 * 1_048_576;

    pub fn from_toml(content: &str) -> Result<Self, DefinitionError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, DefinitionError> {
        let meta = std::fs::metadata(path)?;
        if meta.len() > Self::MAX_FILE_SIZE {
            return Err(DefinitionError::TooLarge(format!(
                "Feed definition is {} bytes (max {} bytes)",
                meta.len(),
                Self::MAX_FILE_SIZE
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let definition = Self::from_toml(&content)?;
        tracing::info!(
            path = %path.display(),
            channels = definition.channels.len(),
            "Loaded feed definition"
        );
        Ok(definition)
    }

    pub fn into_feed(self) -> Result<Feed, DefinitionError> {
        let mut feed = Feed::new();
        for channel in self.channels {
            feed.add_channel(channel.into_channel()?);
        }
        Ok(feed)
    }
}

impl ChannelDefinition {
    pub fn into_channel(self) -> Result<Channel, DefinitionError> {
        let mut channel = Channel::new();
        if let Some(title) = self.title {
            channel.title(title);
        }
        if let Some(url) = self.url {
            channel.url(url);
        }
        if let Some(feed_url) = self.feed_url {
            channel.feed_url(feed_url);
        }
        if let Some(description) = self.description {
            channel.description(description);
        }
        if let Some(language) = self.language {
            channel.language(language);
        }
        if let Some(copyright) = self.copyright {
            channel.copyright(copyright);
        }
        if let Some(date) = self.pub_date {
            channel.pub_date(date.timestamp()?);
        }
        if let Some(date) = self.last_build_date {
            channel.last_build_date(date.timestamp()?);
        }
        if let Some(ttl) = self.ttl {
            channel.ttl(ttl);
        }
        if let Some(hub) = self.pubsubhubbub {
            channel.pubsubhubbub(hub.feed_url, hub.hub_url);
        }
        for item in self.items {
            channel.add_item(item.into_item()?);
        }
        Ok(channel)
    }
}

impl ItemDefinition {
    pub fn into_item(self) -> Result<Item, DefinitionError> {
        let mut item = Item::new();
        if let Some(title) = self.title {
            item.title(title);
        }
        if let Some(url) = self.url {
            item.url(url);
        }
        if let Some(description) = self.description {
            item.description(description);
        }
        if let Some(content) = self.content_encoded {
            item.content_encoded(content);
        }
        let categories = self
            .categories
            .into_iter()
            .map(CategoryDefinition::into_category)
            .collect::<Result<Vec<_>, _>>()?;
        item.categories(categories);
        if let Some(guid) = self.guid {
            item.guid_permalink(guid, self.guid_is_permalink.unwrap_or(true));
        }
        if let Some(date) = self.pub_date {
            item.pub_date(date.timestamp()?);
        }
        if let Some(enclosure) = self.enclosure {
            item.enclosure(
                Enclosure::new(enclosure.url)
                    .length(enclosure.length)
                    .mime_type(enclosure.mime_type),
            );
        }
        if let Some(author) = self.author {
            item.author(author);
        }
        if let Some(creator) = self.creator {
            item.creator(creator);
        }
        item.prefer_cdata(self.prefer_cdata);
        Ok(item)
    }
}
