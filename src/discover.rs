//! # Discovery
//!
//! Resolution of a user-supplied identifier to its OpenID Provider
//! (OpenID 2.0 §7.3): Yadis discovery first — the XRDS document may be
//! served directly, referenced by an `X-XRDS-Location` header, or
//! referenced by an equivalent meta tag in an HTML page — falling back to
//! HTML `<link>` discovery when no XRDS document can be obtained.

pub mod html;
mod scan;
pub mod xrds;

use anyhow::anyhow;
use tracing::{debug, instrument};

use crate::cache::DiscoveredInfo;
use crate::error::Error;
use crate::identifier;
use crate::provider::{HttpFetch, HttpResponse};
use crate::Result;

const XRDS_ACCEPT: (&str, &str) = ("Accept", "application/xrds+xml");

/// Resolve an identifier to its provider endpoint, local identifier, and
/// claimed identifier.
///
/// On the Yadis path the claimed identifier is the normalized identifier
/// itself, or empty when an OP Identifier service was selected
/// (identifier-select mode). On the HTML path it is the URL that finally
/// served the document, so an identifier that redirects claims the
/// redirect target.
///
/// # Errors
///
/// Normalization errors are returned as-is. A transport failure surfaces
/// as [`Error::Transport`]; an unusable document as
/// [`Error::NoServiceFound`], [`Error::ProviderLinkNotFound`] or
/// [`Error::MalformedDocument`].
#[instrument(skip(http))]
pub async fn discover(http: &impl HttpFetch, id: &str) -> Result<DiscoveredInfo> {
    let id = identifier::normalize(id)?;

    match yadis(http, &id).await {
        Ok(service) => {
            let claimed_id = if service.op_identifier { String::new() } else { id };
            Ok(DiscoveredInfo {
                op_endpoint: service.uri,
                op_local_id: service.local_id,
                claimed_id,
            })
        }
        Err(e) => {
            debug!("yadis discovery failed, falling back to HTML: {e}");
            html_discover(http, &id).await
        }
    }
}

/// Yadis discovery (Yadis 1.0 §6.2.5): the response may carry the XRDS
/// document itself, or point at it via header or meta tag.
async fn yadis(http: &impl HttpFetch, id: &str) -> Result<xrds::Service> {
    let resp = get(http, id, &[XRDS_ACCEPT]).await?;

    if let Some(location) = resp.header("X-XRDS-Location") {
        return fetch_xrds(http, location).await;
    }

    let content_type = resp.header("Content-Type").unwrap_or_default();
    if content_type.contains("text/html") {
        let Some(location) = html::find_meta_xrds_location(&resp.body) else {
            return Err(Error::NoServiceFound(
                "HTML response carries no X-XRDS-Location meta tag".to_string(),
            ));
        };
        return fetch_xrds(http, &location).await;
    }
    if content_type.contains("application/xrds+xml") {
        return xrds::parse(&resp.body);
    }

    Err(Error::NoServiceFound("response carries no XRDS location or document".to_string()))
}

async fn fetch_xrds(http: &impl HttpFetch, url: &str) -> Result<xrds::Service> {
    let resp = get(http, url, &[XRDS_ACCEPT]).await?;
    xrds::parse(&resp.body)
}

/// HTML discovery fallback. The final URL that served the document, not
/// the supplied identifier, becomes the claimed identifier.
async fn html_discover(http: &impl HttpFetch, id: &str) -> Result<DiscoveredInfo> {
    let resp = get(http, id, &[]).await?;
    let links = html::find_provider_links(&resp.body)?;

    Ok(DiscoveredInfo {
        op_endpoint: links.provider,
        op_local_id: links.local_id,
        claimed_id: resp.final_url,
    })
}

async fn get(http: &impl HttpFetch, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
    let resp = http.get(url, headers).await.map_err(Error::Transport)?;
    if !resp.is_success() {
        return Err(Error::Transport(anyhow!("GET {url} returned status {}", resp.status)));
    }
    Ok(resp)
}
