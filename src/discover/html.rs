//! # HTML Discovery
//!
//! Head scanners for HTML-based discovery: the `openid2.provider` and
//! `openid2.local_id` link relations (OpenID 2.0 §7.3.3), and the
//! `X-XRDS-Location` meta tag Yadis uses when an HTML document is
//! returned instead of an XRDS one. Scanning stops at `</head>`; a
//! malformed document tail is tolerated once a provider link was found.

use super::scan;
use crate::error::Error;
use crate::Result;

/// Discovery links found in a document head.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProviderLinks {
    /// The provider endpoint from `rel="openid2.provider"`.
    pub provider: String,

    /// The local identifier from `rel="openid2.local_id"`, or empty.
    pub local_id: String,
}

/// Scan a document head for the OpenID 2.0 provider and local-id links.
///
/// # Errors
///
/// [`Error::ProviderLinkNotFound`] when no `openid2.provider` link with
/// an `href` appears before the head closes or the document ends.
pub fn find_provider_links(body: &[u8]) -> Result<ProviderLinks> {
    let doc = String::from_utf8_lossy(body);
    let mut links = ProviderLinks::default();
    let mut in_head = false;

    for tag in Tags::new(&doc) {
        match tag.name.to_ascii_lowercase().as_str() {
            "head" if !tag.closing => in_head = true,
            "head" => break,
            "link" if in_head && !tag.closing => {
                let attrs = scan::attributes(tag.attrs);
                let Some(href) = scan::attr(&attrs, "href").filter(|href| !href.is_empty())
                else {
                    continue;
                };
                match scan::attr(&attrs, "rel") {
                    Some("openid2.provider") => links.provider = href.to_string(),
                    Some("openid2.local_id") => links.local_id = href.to_string(),
                    _ => {}
                }
            }
            _ => {}
        }
    }

    if links.provider.is_empty() {
        return Err(Error::ProviderLinkNotFound(
            "no link with rel=openid2.provider in document head".to_string(),
        ));
    }
    Ok(links)
}

/// Scan a document head for `<meta http-equiv="X-XRDS-Location">` and
/// return its content, if any.
#[must_use]
pub fn find_meta_xrds_location(body: &[u8]) -> Option<String> {
    let doc = String::from_utf8_lossy(body);
    let mut in_head = false;

    for tag in Tags::new(&doc) {
        match tag.name.to_ascii_lowercase().as_str() {
            "head" if !tag.closing => in_head = true,
            "head" => return None,
            "meta" if in_head && !tag.closing => {
                let attrs = scan::attributes(tag.attrs);
                if scan::attr(&attrs, "http-equiv") == Some("X-XRDS-Location") {
                    if let Some(content) =
                        scan::attr(&attrs, "content").filter(|content| !content.is_empty())
                    {
                        return Some(content.to_string());
                    }
                }
            }
            _ => {}
        }
    }
    None
}

/// Iterator over the element tags of an HTML document. Comments and
/// doctype declarations are skipped, and the contents of `script` and
/// `style` elements are passed over wholesale so stray `<` characters in
/// inline code cannot derail the scan.
struct Tags<'a> {
    rest: &'a str,
}

impl<'a> Tags<'a> {
    fn new(doc: &'a str) -> Self {
        Self { rest: doc }
    }
}

impl<'a> Iterator for Tags<'a> {
    type Item = scan::Tag<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let lt = self.rest.find('<')?;
            self.rest = &self.rest[lt..];

            if let Some(after) = self.rest.strip_prefix("<!--") {
                let end = after.find("-->")?;
                self.rest = &after[end + 3..];
                continue;
            }
            if self.rest.starts_with("<!") || self.rest.starts_with("<?") {
                let end = self.rest.find('>')?;
                self.rest = &self.rest[end + 1..];
                continue;
            }

            let Some(tag) = scan::read_tag(self.rest) else {
                self.rest = "";
                return None;
            };
            self.rest = &self.rest[tag.len..];

            let name = tag.name.to_ascii_lowercase();
            if !tag.closing && !tag.self_closing && matches!(name.as_str(), "script" | "style") {
                let closer = format!("</{name}");
                match self.rest.to_ascii_lowercase().find(&closer) {
                    Some(pos) => self.rest = &self.rest[pos..],
                    None => self.rest = "",
                }
                continue;
            }

            return Some(tag);
        }
    }
}
