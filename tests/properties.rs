//! Property tests: whatever text goes into an item, the rendered feed stays
//! well-formed, valid against the RSS schema, and reads back to the input
//! (minus characters XML cannot carry).

use std::cell::RefCell;

use proptest::prelude::*;
use quick_xml::events::Event;
use quick_xml::Reader;
use rss_writer::{Channel, Feed, Item, Validator};

thread_local! {
    static VALIDATOR: RefCell<Validator> = RefCell::new(Validator::new().unwrap());
}

/// Text with markup characters, CDATA terminators and control characters
/// mixed in.
fn arb_text() -> impl Strategy<Value = String> {
    prop::string::string_regex(r"[a-zA-Z0-9 &<>'\x22;#\]\x00\x01\x07\x1Fé日]{0,40}").unwrap()
}

fn is_xml_illegal(c: char) -> bool {
    matches!(c, '\0' | '\x01' | '\x07' | '\x1F')
}

fn render_item(title: &str, description: &str, prefer_cdata: bool) -> String {
    let mut channel = Channel::new();
    channel.title("T").url("http://example.com").description(description);

    let mut item = Item::new();
    item.title(title).description(description).prefer_cdata(prefer_cdata);
    item.append_to(&mut channel);

    let mut feed = Feed::new();
    feed.add_channel(channel);
    feed.render().unwrap()
}

/// Text of every `<title>` in document order, entities resolved and
/// adjacent CDATA sections joined.
fn titles(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut titles = Vec::new();
    let mut current: Option<String> = None;
    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) if e.name().as_ref() == b"title" => current = Some(String::new()),
            Event::Text(t) => {
                if let Some(text) = current.as_mut() {
                    text.push_str(&t.unescape().unwrap());
                }
            }
            Event::CData(c) => {
                if let Some(text) = current.as_mut() {
                    text.push_str(std::str::from_utf8(&c).unwrap());
                }
            }
            Event::End(e) if e.name().as_ref() == b"title" => {
                titles.extend(current.take());
            }
            Event::Eof => break,
            _ => {}
        }
    }
    titles
}

proptest! {
    #[test]
    fn prop_rendered_feed_validates(
        title in arb_text(),
        description in arb_text(),
        prefer_cdata in any::<bool>(),
    ) {
        let xml = render_item(&title, &description, prefer_cdata);
        let (valid, errors) = VALIDATOR.with(|validator| {
            let mut validator = validator.borrow_mut();
            let valid = validator.validate(&xml);
            (valid, validator.last_errors().to_vec())
        });
        prop_assert!(valid, "{:?}\n{}", errors, xml);
    }

    #[test]
    fn prop_title_reads_back(
        title in arb_text().prop_filter("non-empty after stripping", |t| t.chars().any(|c| !is_xml_illegal(c))),
        prefer_cdata in any::<bool>(),
    ) {
        let xml = render_item(&title, "", prefer_cdata);
        let expected: String = title.chars().filter(|&c| !is_xml_illegal(c)).collect();
        prop_assert_eq!(titles(&xml), vec!["T".to_string(), expected]);
    }

    #[test]
    fn prop_output_has_no_illegal_chars(title in arb_text(), description in arb_text()) {
        let xml = render_item(&title, &description, false);
        prop_assert!(!xml.chars().any(is_xml_illegal));
    }
}
