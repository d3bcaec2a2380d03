use std::sync::Arc;

use crate::xml::{Element, RenderError};

use super::date::{format_timestamp, DateFormatter};
use super::{Feed, Xmlable, ATOM_NS};

const RSS_MEDIA_TYPE: &str = "application/rss+xml";

/// PubSubHubbub discovery: the topic URL and the hub that pushes updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hub {
    pub feed_url: String,
    pub hub_url: String,
}

/// Builder for one `<channel>` and the items it owns.
#[derive(Debug, Clone, Default)]
pub struct Channel {
    title: Option<String>,
    url: Option<String>,
    feed_url: Option<String>,
    description: Option<String>,
    language: Option<String>,
    copyright: Option<String>,
    pub_date: Option<i64>,
    last_build_date: Option<i64>,
    ttl: Option<u32>,
    pubsubhubbub: Option<Hub>,
    items: Vec<Arc<dyn Xmlable>>,
}

impl Channel {
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

    /// URL this feed is served from, advertised as an `atom:link rel="self"`.
    pub fn feed_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.feed_url = Some(url.into());
        self
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    /// Language code the channel is written in, e.g. `en-us`. Values from
    /// RFC 1766 or the W3C language tags are accepted by aggregators.
    pub fn language(&mut self, language: impl Into<String>) -> &mut Self {
        self.language = Some(language.into());
        self
    }

    pub fn copyright(&mut self, copyright: impl Into<String>) -> &mut Self {
        self.copyright = Some(copyright.into());
        self
    }

    pub fn pub_date(&mut self, timestamp: i64) -> &mut Self {
        self.pub_date = Some(timestamp);
        self
    }

    pub fn last_build_date(&mut self, timestamp: i64) -> &mut Self {
        self.last_build_date = Some(timestamp);
        self
    }

    /// Minutes a reader may cache the channel before refreshing.
    pub fn ttl(&mut self, ttl: u32) -> &mut Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn pubsubhubbub(
        &mut self,
        feed_url: impl Into<String>,
        hub_url: impl Into<String>,
    ) -> &mut Self {
        self.pubsubhubbub = Some(Hub {
            feed_url: feed_url.into(),
            hub_url: hub_url.into(),
        });
        self
    }

    /// Appends an item. Nothing is rendered until the channel is. Any
    /// [`Xmlable`] is accepted, so custom item types render alongside
    /// [`Item`](super::Item).
    pub fn add_item(&mut self, item: impl Xmlable + 'static) -> &mut Self {
        self.items.push(Arc::new(item));
        self
    }

    /// Moves this channel to the end of `feed`'s channel list.
    pub fn append_to(self, feed: &mut Feed) {
        feed.add_channel(self);
    }

    pub fn items(&self) -> &[Arc<dyn Xmlable>] {
        &self.items
    }

    /// Builds the `<channel>` fragment followed by every item in insertion
    /// order. Title, link and description are always present; description
    /// is always CDATA.
    pub fn as_xml(&self, dates: &dyn DateFormatter) -> Result<Element, RenderError> {
        let mut xml = Element::new("channel");
        xml.add_child("title", self.title.as_deref(), None);
        xml.add_child("link", self.url.as_deref(), None);
        xml.add_cdata_child(
            "description",
            Some(self.description.as_deref().unwrap_or_default()),
            None,
        );

        if let Some(feed_url) = &self.feed_url {
            xml.add_child("atom:link", None, Some(ATOM_NS))
                .add_attribute("href", feed_url)
                .add_attribute("type", RSS_MEDIA_TYPE)
                .add_attribute("rel", "self");
        }

        if let Some(language) = &self.language {
            xml.add_child("language", Some(language), None);
        }

        if let Some(copyright) = &self.copyright {
            xml.add_child("copyright", Some(copyright), None);
        }

        if let Some(timestamp) = self.pub_date {
            let date = format_timestamp(dates, timestamp)?;
            xml.add_child("pubDate", Some(&date), None);
        }

        if let Some(timestamp) = self.last_build_date {
            let date = format_timestamp(dates, timestamp)?;
            xml.add_child("lastBuildDate", Some(&date), None);
        }

        if let Some(ttl) = self.ttl {
            xml.add_child("ttl", Some(&ttl.to_string()), None);
        }

        if let Some(hub) = &self.pubsubhubbub {
            xml.add_child("atom:link", None, Some(ATOM_NS))
                .add_attribute("rel", "self")
                .add_attribute("href", &hub.feed_url)
                .add_attribute("type", RSS_MEDIA_TYPE);
            xml.add_child("atom:link", None, Some(ATOM_NS))
                .add_attribute("rel", "hub")
                .add_attribute("href", &hub.hub_url);
        }

        for item in &self.items {
            let fragment = item.as_xml(dates)?;
            xml.import(&fragment);
        }

        Ok(xml)
    }
}

impl Xmlable for Channel {
    fn as_xml(&self, dates: &dyn DateFormatter) -> Result<Element, RenderError> {
        Channel::as_xml(self, dates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{Item, Rfc822};
    use pretty_assertions::assert_eq;

    const NOW: i64 = 1_345_546_237;

    fn goupstate() -> Channel {
        let mut channel = Channel::new();
        channel
            .title("GoUpstate.com News Headlines")
            .url("http://www.goupstate.com/")
            .description("The latest news from GoUpstate.com, a Spartanburg Herald-Journal Web site.");
        channel
    }

    fn render(channel: &Channel) -> String {
        channel
            .as_xml(&Rfc822::utc())
            .and_then(|xml| xml.to_xml(None))
            .expect("channel renders")
    }

    fn child_names(channel: &Channel) -> Vec<String> {
        let xml = channel.as_xml(&Rfc822::utc()).unwrap();
        xml.child_elements().map(|e| e.name().to_string()).collect()
    }

    #[test]
    fn test_minimal_channel() {
        assert_eq!(
            render(&goupstate()),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<channel>\
<title>GoUpstate.com News Headlines</title>\
<link>http://www.goupstate.com/</link>\
<description><![CDATA[The latest news from GoUpstate.com, a Spartanburg Herald-Journal Web site.]]></description>\
</channel>\n"
        );
    }

    #[test]
    fn test_empty_channel_keeps_required_elements() {
        let xml = render(&Channel::new());
        assert!(xml.contains("<channel><title/><link/><description><![CDATA[]]></description></channel>"));
    }

    #[test]
    fn test_title_is_escaped_never_cdata() {
        let mut channel = Channel::new();
        channel.title("News & <Views>");
        assert!(render(&channel).contains("<title>News &amp; &lt;Views&gt;</title>"));
    }

    #[test]
    fn test_optional_elements() {
        let mut channel = goupstate();
        channel.language("en-us");
        assert!(render(&channel).contains("<language>en-us</language>"));

        let mut channel = goupstate();
        channel.copyright("Copyright 2002, Spartanburg Herald-Journal");
        assert!(render(&channel)
            .contains("<copyright>Copyright 2002, Spartanburg Herald-Journal</copyright>"));

        let mut channel = goupstate();
        channel.pub_date(NOW);
        assert!(render(&channel).contains("<pubDate>Tue, 21 Aug 2012 10:50:37 +0000</pubDate>"));

        let mut channel = goupstate();
        channel.last_build_date(NOW);
        assert!(render(&channel)
            .contains("<lastBuildDate>Tue, 21 Aug 2012 10:50:37 +0000</lastBuildDate>"));

        let mut channel = goupstate();
        channel.ttl(60);
        assert!(render(&channel).contains("<ttl>60</ttl>"));
    }

    #[test]
    fn test_feed_url_self_link() {
        let mut channel = Channel::new();
        channel.feed_url("http://example.com/feed.xml");
        assert!(render(&channel).contains(
            "<atom:link xmlns:atom=\"http://www.w3.org/2005/Atom\" href=\"http://example.com/feed.xml\" type=\"application/rss+xml\" rel=\"self\"/>"
        ));
    }

    #[test]
    fn test_pubsubhubbub_emits_two_links() {
        let mut channel = Channel::new();
        channel.pubsubhubbub("http://example.com/feed.xml", "http://pubsubhubbub.appspot.com");

        let xml = channel.as_xml(&Rfc822::utc()).unwrap();
        let links: Vec<&Element> = xml
            .child_elements()
            .filter(|e| e.name() == "atom:link")
            .collect();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].attribute("rel"), Some("self"));
        assert_eq!(links[0].attribute("href"), Some("http://example.com/feed.xml"));
        assert_eq!(links[1].attribute("rel"), Some("hub"));
        assert_eq!(links[1].attribute("href"), Some("http://pubsubhubbub.appspot.com"));

        let rendered = render(&channel);
        assert!(rendered.contains(
            "rel=\"self\" href=\"http://example.com/feed.xml\" type=\"application/rss+xml\"/>"
        ));
        assert!(rendered.contains("rel=\"hub\" href=\"http://pubsubhubbub.appspot.com\"/>"));
    }

    #[test]
    fn test_full_channel_element_order() {
        let mut channel = goupstate();
        channel
            .feed_url("http://example.com/rss")
            .language("en-US")
            .copyright("c")
            .pub_date(NOW)
            .last_build_date(NOW)
            .ttl(60)
            .pubsubhubbub("http://example.com/feed.xml", "http://pubsubhubbub.appspot.com");
        let mut item = Item::new();
        item.title("entry");
        channel.add_item(item);

        assert_eq!(
            child_names(&channel),
            [
                "title",
                "link",
                "description",
                "atom:link",
                "language",
                "copyright",
                "pubDate",
                "lastBuildDate",
                "ttl",
                "atom:link",
                "atom:link",
                "item"
            ]
        );
    }

    #[test]
    fn test_items_keep_insertion_order() {
        let mut channel = goupstate();
        for title in ["item1", "item2", "item3"] {
            let mut item = Item::new();
            item.title(title);
            channel.add_item(item);
        }

        let xml = channel.as_xml(&Rfc822::utc()).unwrap();
        let titles: Vec<String> = xml
            .child_elements()
            .filter(|e| e.name() == "item")
            .map(|item| item.find("title").map(Element::text).unwrap_or_default())
            .collect();
        assert_eq!(titles, ["item1", "item2", "item3"]);
    }

    #[test]
    fn test_duplicate_items_allowed() {
        let mut item = Item::new();
        item.title("same");
        let mut channel = Channel::new();
        channel.add_item(item.clone()).add_item(item);
        assert_eq!(render(&channel).matches("<item>").count(), 2);
    }

    #[test]
    fn test_rendering_does_not_change_the_channel() {
        let mut channel = goupstate();
        channel.add_item(Item::new());
        let before = channel.clone();
        let first = render(&channel);
        let second = render(&channel);
        assert_eq!(first, second);
        assert_eq!(render(&before), first);
        assert_eq!(channel.items().len(), 1);
    }

    #[test]
    fn test_custom_item_type() {
        #[derive(Debug)]
        struct Headline(&'static str);
        impl Xmlable for Headline {
            fn as_xml(&self, _dates: &dyn DateFormatter) -> Result<Element, RenderError> {
                let mut xml = Element::new("item");
                xml.add_child("title", Some(self.0), None);
                Ok(xml)
            }
        }

        let mut item = Item::new();
        item.title("built-in");
        let mut channel = Channel::new();
        channel.add_item(Headline("custom")).add_item(item);

        let xml = render(&channel);
        assert!(xml.contains("<item><title>custom</title></item><item><title>built-in</title></item>"));
    }

    #[test]
    fn test_item_date_failure_propagates() {
        let mut item = Item::new();
        item.pub_date(i64::MIN);
        let mut channel = Channel::new();
        channel.add_item(item);
        assert!(matches!(
            channel.as_xml(&Rfc822::utc()),
            Err(RenderError::TimestampOutOfRange(i64::MIN))
        ));
    }
}
