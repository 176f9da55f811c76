//! Strict `urlset` sitemap parsing.
//!
//! Accepts only documents shaped as `urlset > url > loc`. A missing `urlset`
//! root, a `urlset` without any `url`, or a `url` without a `loc` is an error,
//! as is any XML the reader rejects.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::SitemapError;

/// Extract the `<loc>` value of every `<url>` entry, in document order.
///
/// Namespace prefixes are ignored, so `<sm:urlset>` parses like `<urlset>`.
/// Only the first `<loc>` of an entry is used.
pub fn parse_sitemap(xml: &str) -> Result<Vec<String>, SitemapError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut saw_root = false;
    let mut urls = Vec::new();

    // State for the <url> entry currently open.
    let mut in_url = false;
    let mut current_loc: Option<String> = None;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| {
                SitemapError::MalformedXml(format!("{e} at byte {}", reader.buffer_position()))
            })?;

        match event {
            Event::Start(ref e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if stack.is_empty() {
                    check_root(&name, saw_root)?;
                    saw_root = true;
                }
                if name == "url" && stack.len() == 1 {
                    in_url = true;
                    current_loc = None;
                }
                stack.push(name);
            }
            Event::Empty(ref e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if stack.is_empty() {
                    // A self-closing root can never hold entries.
                    check_root(&name, saw_root)?;
                    return Err(SitemapError::MissingElement("url"));
                }
                if name == "url" && stack.len() == 1 {
                    return Err(SitemapError::MissingElement("loc"));
                }
                if name == "loc" && in_url && stack.len() == 2 && current_loc.is_none() {
                    current_loc = Some(String::new());
                }
            }
            Event::Text(ref e) => {
                if in_loc(&stack, in_url) && current_loc.is_none() {
                    let text = e
                        .unescape()
                        .map_err(|err| SitemapError::MalformedXml(err.to_string()))?;
                    current_loc = Some(text.trim().to_string());
                }
            }
            Event::CData(e) => {
                if in_loc(&stack, in_url) && current_loc.is_none() {
                    let text = String::from_utf8_lossy(&e.into_inner()).trim().to_string();
                    current_loc = Some(text);
                }
            }
            Event::End(_) => {
                let Some(name) = stack.pop() else {
                    return Err(SitemapError::MalformedXml(
                        "closing tag without matching opening tag".to_string(),
                    ));
                };
                if name == "loc" && in_url && stack.len() == 2 && current_loc.is_none() {
                    // <loc></loc> with no text
                    current_loc = Some(String::new());
                }
                if name == "url" && stack.len() == 1 && in_url {
                    match current_loc.take() {
                        Some(loc) => urls.push(loc),
                        None => return Err(SitemapError::MissingElement("loc")),
                    }
                    in_url = false;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(SitemapError::MalformedXml(format!(
            "document ended inside <{}>",
            stack.join("><")
        )));
    }
    if !saw_root {
        return Err(SitemapError::MissingElement("urlset"));
    }
    if urls.is_empty() {
        return Err(SitemapError::MissingElement("url"));
    }

    Ok(urls)
}

fn check_root(name: &str, saw_root: bool) -> Result<(), SitemapError> {
    if saw_root {
        return Err(SitemapError::MalformedXml(
            "multiple root elements".to_string(),
        ));
    }
    if name != "urlset" {
        return Err(SitemapError::UnexpectedRoot(name.to_string()));
    }
    Ok(())
}

fn in_loc(stack: &[String], in_url: bool) -> bool {
    in_url && stack.len() == 3 && stack[2] == "loc"
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITEMAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc>https://example.com/plumbing-repair-nj</loc>
    <lastmod>2024-01-01</lastmod>
  </url>
  <url>
    <loc> https://example.com/about-us </loc>
  </url>
  <url><loc><![CDATA[https://example.com/drain-cleaning-ny]]></loc></url>
  <url><loc>https://example.com/search?a=1&amp;b=2</loc></url>
</urlset>"#;

    #[test]
    fn test_parse_valid_sitemap() {
        let urls = parse_sitemap(SITEMAP).unwrap();
        assert_eq!(
            urls,
            vec![
                "https://example.com/plumbing-repair-nj",
                "https://example.com/about-us",
                "https://example.com/drain-cleaning-ny",
                "https://example.com/search?a=1&b=2",
            ]
        );
    }

    #[test]
    fn test_parse_prefixed_namespace() {
        let xml = r#"<sm:urlset xmlns:sm="http://www.sitemaps.org/schemas/sitemap/0.9">
            <sm:url><sm:loc>https://example.com/a-b</sm:loc></sm:url>
        </sm:urlset>"#;
        assert_eq!(parse_sitemap(xml).unwrap(), vec!["https://example.com/a-b"]);
    }

    #[test]
    fn test_only_first_loc_is_used() {
        let xml = "<urlset><url><loc>https://a.com/one-two</loc><loc>https://a.com/three</loc></url></urlset>";
        assert_eq!(parse_sitemap(xml).unwrap(), vec!["https://a.com/one-two"]);
    }

    #[test]
    fn test_empty_loc_is_kept_as_empty_string() {
        let xml = "<urlset><url><loc></loc></url><url><loc/></url></urlset>";
        assert_eq!(parse_sitemap(xml).unwrap(), vec!["", ""]);
    }

    #[test]
    fn test_missing_urlset_root() {
        let err = parse_sitemap("<html><body>Not found</body></html>").unwrap_err();
        assert!(matches!(err, SitemapError::UnexpectedRoot(ref root) if root == "html"));
    }

    #[test]
    fn test_sitemap_index_is_rejected() {
        let xml = "<sitemapindex><sitemap><loc>https://a.com/s.xml</loc></sitemap></sitemapindex>";
        assert!(matches!(
            parse_sitemap(xml),
            Err(SitemapError::UnexpectedRoot(_))
        ));
    }

    #[test]
    fn test_urlset_without_urls() {
        assert!(matches!(
            parse_sitemap("<urlset></urlset>"),
            Err(SitemapError::MissingElement("url"))
        ));
        assert!(matches!(
            parse_sitemap("<urlset/>"),
            Err(SitemapError::MissingElement("url"))
        ));
    }

    #[test]
    fn test_url_without_loc() {
        let xml = "<urlset><url><lastmod>2024-01-01</lastmod></url></urlset>";
        assert!(matches!(
            parse_sitemap(xml),
            Err(SitemapError::MissingElement("loc"))
        ));
    }

    #[test]
    fn test_empty_document() {
        assert!(matches!(
            parse_sitemap(""),
            Err(SitemapError::MissingElement("urlset"))
        ));
    }

    #[test]
    fn test_truncated_document() {
        let xml = "<urlset><url><loc>https://a.com/x-y</loc></url>";
        assert!(matches!(
            parse_sitemap(xml),
            Err(SitemapError::MalformedXml(_))
        ));
    }

    #[test]
    fn test_mismatched_tags() {
        let xml = "<urlset><url><loc>https://a.com/x-y</url></loc></urlset>";
        assert!(matches!(
            parse_sitemap(xml),
            Err(SitemapError::MalformedXml(_))
        ));
    }
}
