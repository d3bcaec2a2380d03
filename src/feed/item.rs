use crate::xml::{Element, RenderError};

use super::channel::Channel;
use super::date::{format_timestamp, DateFormatter};
use super::{Xmlable, CONTENT_NS, DC_NS};

/// An item category: a name plus an optional taxonomy domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub domain: Option<String>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: None,
        }
    }

    pub fn with_domain(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: Some(domain.into()),
        }
    }
}

impl From<&str> for Category {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Category {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl<N: Into<String>, D: Into<String>> From<(N, D)> for Category {
    fn from((name, domain): (N, D)) -> Self {
        Self::with_domain(name, domain)
    }
}

/// Item identifier. RSS presumes a guid is a dereferenceable permalink
/// unless told otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guid {
    pub value: String,
    pub is_permalink: bool,
}

/// A media attachment. Always carries all three parts, so a partial
/// enclosure cannot exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enclosure {
    url: String,
    length: u64,
    mime_type: String,
}

impl Enclosure {
    /// Length defaults to 0 and type to `audio/mpeg`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            length: 0,
            mime_type: "audio/mpeg".to_string(),
        }
    }

    /// Size in bytes.
    pub fn length(mut self, length: u64) -> Self {
        self.length = length;
        self
    }

    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn byte_length(&self) -> u64 {
        self.length
    }

    pub fn media_type(&self) -> &str {
        &self.mime_type
    }
}

/// Builder for one `<item>`.
///
/// Every field is optional. Setters return `&mut Self` so calls chain on a
/// single owned value:
///
/// ```
/// use rss_writer::feed::{Enclosure, Item, Rfc822};
///
/// let mut item = Item::new();
/// item.title("Some Podcast Entry")
///     .url("http://podcast.example.com/2012/08/21/podcast-entry/")
///     .enclosure(Enclosure::new("http://podcast.example.com/podcast.mp3").length(4889));
///
/// let xml = item.as_xml(&Rfc822::utc()).unwrap();
/// assert_eq!(xml.name(), "item");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Item {
    title: Option<String>,
    url: Option<String>,
    description: Option<String>,
    content_encoded: Option<String>,
    categories: Vec<Category>,
    guid: Option<Guid>,
    pub_date: Option<i64>,
    enclosure: Option<Enclosure>,
    author: Option<String>,
    creator: Option<String>,
    prefer_cdata: bool,
}

impl Item {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    pub fn url(&mut self, url: impl Into<String>) -> &mut Self {
        self.url = Some(url.into());
        self
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    /// Full content, written raw inside `<content:encoded>` CDATA.
    pub fn content_encoded(&mut self, content: impl Into<String>) -> &mut Self {
        self.content_encoded = Some(content.into());
        self
    }

    pub fn category(&mut self, name: impl Into<String>) -> &mut Self {
        self.push_category(Category::new(name))
    }

    pub fn category_with_domain(
        &mut self,
        name: impl Into<String>,
        domain: impl Into<String>,
    ) -> &mut Self {
        self.push_category(Category::with_domain(name, domain))
    }

    /// Appends categories in order. Accepts bare names and `(name, domain)`
    /// pairs; entries with an empty name are dropped.
    pub fn categories<I, C>(&mut self, categories: I) -> &mut Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Category>,
    {
        for category in categories {
            self.push_category(category.into());
        }
        self
    }

    fn push_category(&mut self, category: Category) -> &mut Self {
        if category.name.is_empty() {
            tracing::debug!(domain = ?category.domain, "Dropping category with empty name");
        } else {
            self.categories.push(category);
        }
        self
    }

    /// Sets a permalink guid.
    pub fn guid(&mut self, guid: impl Into<String>) -> &mut Self {
        self.guid_permalink(guid, true)
    }

    /// Sets a guid, marking whether it is a permalink. Non-permalinks render
    /// with `isPermaLink="false"`.
    pub fn guid_permalink(&mut self, guid: impl Into<String>, is_permalink: bool) -> &mut Self {
        self.guid = Some(Guid {
            value: guid.into(),
            is_permalink,
        });
        self
    }

    /// Unix-epoch seconds.
    pub fn pub_date(&mut self, timestamp: i64) -> &mut Self {
        self.pub_date = Some(timestamp);
        self
    }

    pub fn enclosure(&mut self, enclosure: Enclosure) -> &mut Self {
        self.enclosure = Some(enclosure);
        self
    }

    pub fn author(&mut self, author: impl Into<String>) -> &mut Self {
        self.author = Some(author.into());
        self
    }

    /// Written as `<dc:creator>`.
    pub fn creator(&mut self, creator: impl Into<String>) -> &mut Self {
        self.creator = Some(creator.into());
        self
    }

    /// Wraps title and description in CDATA so embedded HTML survives as-is.
    pub fn prefer_cdata(&mut self, prefer_cdata: bool) -> &mut Self {
        self.prefer_cdata = prefer_cdata;
        self
    }

    /// Moves this item to the end of `channel`'s item list.
    pub fn append_to(self, channel: &mut Channel) {
        channel.add_item(self);
    }

    pub fn get_categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn get_guid(&self) -> Option<&Guid> {
        self.guid.as_ref()
    }

    pub fn get_enclosure(&self) -> Option<&Enclosure> {
        self.enclosure.as_ref()
    }

    /// Builds the `<item>` fragment. Element order follows the RSS schema;
    /// each element is emitted only when its field is set, except that a
    /// missing title forces a (possibly empty) `<description>` so an item
    /// always carries one of the two. With `prefer_cdata` that description
    /// is an empty CDATA section.
    pub fn as_xml(&self, dates: &dyn DateFormatter) -> Result<Element, RenderError> {
        let mut xml = Element::new("item");
        let title = non_empty(&self.title);
        let description = non_empty(&self.description);

        if let Some(title) = title {
            self.add_text(&mut xml, "title", Some(title));
        }

        if let Some(url) = non_empty(&self.url) {
            xml.add_child("link", Some(url), None);
        }

        if description.is_some() || title.is_none() {
            self.add_text(&mut xml, "description", description);
        }

        if let Some(content) = non_empty(&self.content_encoded) {
            xml.add_cdata_child("content:encoded", Some(content), Some(CONTENT_NS));
        }

        for category in &self.categories {
            let element = xml.add_child("category", Some(&category.name), None);
            if let Some(domain) = &category.domain {
                element.add_attribute("domain", domain);
            }
        }

        if let Some(guid) = self.guid.as_ref().filter(|g| !g.value.is_empty()) {
            let element = xml.add_child("guid", Some(&guid.value), None);
            if !guid.is_permalink {
                element.add_attribute("isPermaLink", "false");
            }
        }

        if let Some(timestamp) = self.pub_date {
            let date = format_timestamp(dates, timestamp)?;
            xml.add_child("pubDate", Some(&date), None);
        }

        if let Some(enclosure) = &self.enclosure {
            xml.add_child("enclosure", None, None)
                .add_attribute("url", &enclosure.url)
                .add_attribute("type", &enclosure.mime_type)
                .add_attribute("length", &enclosure.length.to_string());
        }

        if let Some(author) = non_empty(&self.author) {
            xml.add_child("author", Some(author), None);
        }

        if let Some(creator) = non_empty(&self.creator) {
            xml.add_child("dc:creator", Some(creator), Some(DC_NS));
        }

        Ok(xml)
    }

    /// CDATA mode always writes a section, even an empty one.
    fn add_text(&self, xml: &mut Element, name: &str, value: Option<&str>) {
        if self.prefer_cdata {
            xml.add_cdata_child(name, Some(value.unwrap_or_default()), None);
        } else {
            xml.add_child(name, value, None);
        }
    }
}

impl Xmlable for Item {
    fn as_xml(&self, dates: &dyn DateFormatter) -> Result<Element, RenderError> {
        Item::as_xml(self, dates)
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
