use quick_xml::events::Event;
use quick_xml::Reader;

use super::models::{RawFeedItem, RssChannel, RssDocument};
use crate::{Error, Result};

const CHANNEL_PATH: &[&str] = &["rss", "channel"];
const ITEM_PATH: &[&str] = &["rss", "channel", "item"];

/// An open element and the text collected inside it so far
struct OpenElement {
    name: String,
    text: String,
}

fn at_path(stack: &[OpenElement], path: &[&str]) -> bool {
    stack.len() == path.len() && stack.iter().zip(path).all(|(el, name)| el.name == *name)
}

/// Keep the first non-empty value when an element is repeated
fn set_once(field: &mut String, value: String) {
    if field.is_empty() {
        *field = value;
    }
}

/// Parse an RSS 2.0 document into its channel and raw items
///
/// Only the plain `title`, `link`, `description` and `pubDate` children are
/// read; namespaced extensions such as `atom:link` or `content:encoded` are
/// skipped. Item values are kept verbatim (after XML unescaping and trimming)
/// so the ingestion step decides how to interpret them.
pub fn parse_rss(content: &[u8]) -> Result<RssDocument> {
    let mut reader = Reader::from_reader(content);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut channel: Option<RssChannel> = None;
    let mut current_item: Option<RawFeedItem> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();

                if name == "channel" && at_path(&stack, &["rss"]) && channel.is_none() {
                    channel = Some(RssChannel::default());
                } else if name == "item" && at_path(&stack, CHANNEL_PATH) {
                    current_item = Some(RawFeedItem::default());
                }

                stack.push(OpenElement {
                    name,
                    text: String::new(),
                });
            }
            Ok(Event::Empty(e)) => {
                // <item/> still counts as an item, it just has nothing to ingest
                if e.name().as_ref() == b"item" && at_path(&stack, CHANNEL_PATH) {
                    if let Some(ref mut channel) = channel {
                        channel.items.push(RawFeedItem::default());
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(top) = stack.last_mut() {
                    let text = match e.unescape() {
                        Ok(text) => text.to_string(),
                        // Undeclared HTML entities (&nbsp; and friends) are common in feeds
                        Err(_) => String::from_utf8_lossy(&e).to_string(),
                    };
                    top.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::End(_)) => {
                let Some(closed) = stack.pop() else {
                    continue;
                };
                let value = closed.text.trim().to_string();

                if at_path(&stack, ITEM_PATH) {
                    if let Some(ref mut item) = current_item {
                        match closed.name.as_str() {
                            "title" => set_once(&mut item.title, value),
                            "link" => set_once(&mut item.link, value),
                            "description" => set_once(&mut item.description, value),
                            "pubDate" => set_once(&mut item.pub_date, value),
                            _ => {}
                        }
                    }
                } else if at_path(&stack, CHANNEL_PATH) {
                    if let Some(ref mut channel) = channel {
                        match closed.name.as_str() {
                            "item" => {
                                if let Some(item) = current_item.take() {
                                    channel.items.push(item);
                                }
                            }
                            "title" => set_once(&mut channel.title, value),
                            "link" => set_once(&mut channel.link, value),
                            "description" => set_once(&mut channel.description, value),
                            _ => {}
                        }
                    }
                }
            }
            Ok(Event::Eof) => {
                if let Some(open) = stack.last() {
                    return Err(Error::FeedParse(format!(
                        "unexpected end of document inside <{}>",
                        open.name
                    )));
                }
                break;
            }
            Err(e) => {
                return Err(Error::FeedParse(format!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    let channel = channel
        .ok_or_else(|| Error::FeedParse("document has no <rss><channel> element".to_string()))?;

    Ok(RssDocument { channel })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom" xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>Boot.dev Blog</title>
    <link>https://blog.boot.dev/</link>
    <description>Recent content on Boot.dev Blog</description>
    <atom:link href="https://blog.boot.dev/index.xml" rel="self" type="application/rss+xml"/>
    <item>
      <title>The Zen of Proverbs</title>
      <link>https://blog.boot.dev/news/zen-of-proverbs/</link>
      <pubDate>Mon, 02 Jan 2006 15:04:05 -0700</pubDate>
      <description>Twenty rules &amp; then some</description>
    </item>
    <item>
      <title><![CDATA[Learn <Go> in 2024]]></title>
      <link>
        https://blog.boot.dev/golang/learn-go/
      </link>
      <description><![CDATA[<p>Hello</p>]]></description>
      <content:encoded><![CDATA[<p>Full body</p>]]></content:encoded>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_channel_and_items() {
        let doc = parse_rss(SAMPLE.as_bytes()).unwrap();

        assert_eq!(doc.channel.title, "Boot.dev Blog");
        assert_eq!(doc.channel.link, "https://blog.boot.dev/");
        assert_eq!(doc.channel.description, "Recent content on Boot.dev Blog");
        assert_eq!(doc.channel.items.len(), 2);

        let first = &doc.channel.items[0];
        assert_eq!(first.title, "The Zen of Proverbs");
        assert_eq!(first.link, "https://blog.boot.dev/news/zen-of-proverbs/");
        assert_eq!(first.pub_date, "Mon, 02 Jan 2006 15:04:05 -0700");
        assert_eq!(first.description, "Twenty rules & then some");
    }

    #[test]
    fn test_cdata_and_whitespace() {
        let doc = parse_rss(SAMPLE.as_bytes()).unwrap();
        let second = &doc.channel.items[1];

        assert_eq!(second.title, "Learn <Go> in 2024");
        assert_eq!(second.link, "https://blog.boot.dev/golang/learn-go/");
        assert_eq!(second.description, "<p>Hello</p>");
        assert_eq!(second.pub_date, "");
    }

    #[test]
    fn test_empty_channel() {
        let doc = parse_rss(b"<rss><channel><title>Quiet</title></channel></rss>").unwrap();
        assert_eq!(doc.channel.title, "Quiet");
        assert!(doc.channel.items.is_empty());
    }

    #[test]
    fn test_mismatched_tags_are_rejected() {
        let result = parse_rss(b"<rss><channel><item><title>x</item></channel></rss>");
        assert!(matches!(result, Err(Error::FeedParse(_))));
    }

    #[test]
    fn test_truncated_document_is_rejected() {
        let result = parse_rss(b"<rss><channel><item><title>x</title>");
        assert!(matches!(result, Err(Error::FeedParse(_))));
    }

    #[test]
    fn test_non_rss_document_is_rejected() {
        let result = parse_rss(b"<html><body>Just a moment...</body></html>");
        assert!(matches!(result, Err(Error::FeedParse(_))));
    }
}
