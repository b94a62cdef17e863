use std::{sync::LazyLock, time::Duration};

use async_trait::async_trait;
use regex::Regex;
use reqwest::{header, StatusCode};
use tokio::time::timeout;
use url::Url;

use crate::{fetch::Fetcher, Instance, LookoutError, PostRecord, Result};

static ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<item>(.*?)</item>").unwrap());
static CHANNEL_TITLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<title>(.*?)</title>").unwrap());
static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"<img[^>]*\ssrc="([^"]+)""#).unwrap());
static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

const UNKNOWN_AUTHOR: &str = "Unknown";
const UNKNOWN_HANDLE: &str = "@unknown";
const NO_TEXT: &str = "Post content unavailable";

/// Reads the newest post from a mirror's `/{handle}/rss` feed.
pub struct RssFetcher {
    timeout_duration: Duration,
    scheme: String,
    user_agent: String,
    client: reqwest::Client,
}

impl RssFetcher {
    pub fn new(timeout_duration: Duration, scheme: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            timeout_duration,
            scheme: scheme.into(),
            user_agent: user_agent.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn feed_url(&self, instance: &Instance, handle: &str) -> Result<Url> {
        Ok(Url::parse(&format!("{}://{}/{}/rss", self.scheme, instance, handle))?)
    }

    async fn download(&self, instance: &Instance, handle: &str) -> Result<String> {
        let url = self.feed_url(instance, handle)?;
        let response = self
            .client
            .get(url)
            .header(header::USER_AGENT, &self.user_agent)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(LookoutError::Fetch {
                instance: instance.clone(),
                cause: format!("feed returned HTTP {}", response.status().as_u16()),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl Fetcher for RssFetcher {
    async fn fetch(&self, instance: &Instance, handle: &str) -> Result<PostRecord> {
        tracing::debug!(instance = %instance, handle, "Reading feed");
        let feed = timeout(self.timeout_duration, self.download(instance, handle)).await??;
        parse_latest_post(&feed, instance, &self.scheme)
    }
}

/// Pull the first `<item>` out of a mirror feed.
pub fn parse_latest_post(feed: &str, instance: &Instance, scheme: &str) -> Result<PostRecord> {
    let fail = |cause: &str| LookoutError::Fetch {
        instance: instance.clone(),
        cause: cause.to_string(),
    };

    let item_match = ITEM.captures(feed).ok_or_else(|| fail("no posts found in feed"))?;
    let item = item_match.get(1).map_or("", |m| m.as_str());

    let link = tag_text(item, "link")
        .filter(|link| !link.is_empty())
        .ok_or_else(|| fail("post has no link"))?;
    // Kept exactly as served, fragment included.
    let content_url = link;

    // The channel title looks like "Display Name / @handle".
    let head = &feed[..item_match.get(0).map_or(0, |m| m.start())];
    let channel_title = CHANNEL_TITLE
        .captures(head)
        .and_then(|c| c.get(1))
        .map(|m| decode(m.as_str()).trim().to_string());
    let author_name = channel_title
        .as_deref()
        .and_then(|title| title.split(" / @").next())
        .filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_AUTHOR)
        .to_string();

    let author_handle = tag_text(item, "dc:creator")
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| UNKNOWN_HANDLE.to_string());

    // Description markup is HTML; its entities are decoded once, after tags go.
    let description = tag_raw(item, "description").map(decode);
    let media_url = description
        .as_deref()
        .and_then(|d| IMG_SRC.captures(d))
        .and_then(|c| c.get(1))
        .map(|m| absolutize(&unescape(m.as_str()), scheme, instance));

    let text = description
        .as_deref()
        .map(|d| unescape(&HTML_TAG.replace_all(d, "")).trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| tag_text(item, "title").filter(|t| !t.is_empty()))
        .unwrap_or_else(|| NO_TEXT.to_string());

    let timestamp = tag_text(item, "pubDate")
        .and_then(|date| chrono::DateTime::parse_from_rfc2822(&date).ok())
        .map(|date| date.with_timezone(&chrono::Utc))
        .unwrap_or_else(chrono::Utc::now)
        .to_rfc3339();

    Ok(PostRecord {
        content_url,
        author_name,
        author_handle,
        text,
        timestamp,
        media_url,
        source_instance: instance.clone(),
    })
}

fn tag_raw<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = xml.find(&open)? + open.len();
    let len = xml[start..].find(&close)?;
    Some(&xml[start..start + len])
}

fn tag_text(xml: &str, tag: &str) -> Option<String> {
    tag_raw(xml, tag).map(|raw| decode(raw).trim().to_string())
}

/// XML-level decoding: CDATA is literal, anything else is entity-escaped.
fn decode(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed
        .strip_prefix("<![CDATA[")
        .and_then(|inner| inner.strip_suffix("]]>"))
    {
        Some(literal) => literal.to_string(),
        None => unescape(trimmed),
    }
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn absolutize(src: &str, scheme: &str, instance: &Instance) -> String {
    if src.starts_with('/') {
        format!("{scheme}://{instance}{src}")
    } else {
        src.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss xmlns:dc="http://purl.org/dc/elements/1.1/" version="2.0">
  <channel>
    <title>Jane Doe / @janedoe</title>
    <link>https://nitter.net/janedoe</link>
    <item>
      <title>Hello &amp; welcome</title>
      <dc:creator>@janedoe</dc:creator>
      <description><![CDATA[<p>Hello &amp; welcome</p><img src="/pic/media%2Fabc.jpg" style="max-width:250px;" />]]></description>
      <pubDate>Tue, 14 Nov 2023 08:30:00 GMT</pubDate>
      <guid>https://nitter.net/janedoe/status/1724#m</guid>
      <link>https://nitter.net/janedoe/status/1724#m</link>
    </item>
    <item>
      <title>older</title>
      <link>https://nitter.net/janedoe/status/1000#m</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_newest_item() {
        let instance = Instance::new("nitter.net");
        let post = parse_latest_post(FEED, &instance, "https").unwrap();

        assert_eq!(post.content_url, "https://nitter.net/janedoe/status/1724#m");
        assert_eq!(post.author_name, "Jane Doe");
        assert_eq!(post.author_handle, "@janedoe");
        assert_eq!(post.text, "Hello & welcome");
        assert_eq!(post.timestamp, "2023-11-14T08:30:00+00:00");
        assert_eq!(post.media_url.as_deref(), Some("https://nitter.net/pic/media%2Fabc.jpg"));
        assert_eq!(post.source_instance, instance);
    }

    #[test]
    fn description_entities_are_decoded_once() {
        let cdata = "<rss><channel><item><link>https://nitter.net/a/status/1#m</link>\
            <description><![CDATA[<p>a &amp;lt; b</p>]]></description></item></channel></rss>";
        let post = parse_latest_post(cdata, &Instance::new("nitter.net"), "https").unwrap();
        assert_eq!(post.text, "a &lt; b");

        let escaped = "<rss><channel><item><link>https://nitter.net/a/status/1#m</link>\
            <description>&lt;p&gt;a &amp;amp;lt; b&lt;/p&gt;</description></item></channel></rss>";
        let post = parse_latest_post(escaped, &Instance::new("nitter.net"), "https").unwrap();
        assert_eq!(post.text, "a &lt; b");
    }

    #[test]
    fn feed_without_items_is_a_fetch_error() {
        let feed = "<rss><channel><title>x</title></channel></rss>";
        let err = parse_latest_post(feed, &Instance::new("nitter.net"), "https").unwrap_err();
        assert!(matches!(err, LookoutError::Fetch { .. }));
    }

    #[test]
    fn item_without_link_is_a_fetch_error() {
        let feed = "<rss><channel><item><title>no link</title></item></channel></rss>";
        let err = parse_latest_post(feed, &Instance::new("nitter.net"), "https").unwrap_err();
        assert!(err.to_string().contains("post has no link"));
    }
}
