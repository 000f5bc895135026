//! # Authentication Request
//!
//! Builds the URL the end user is redirected to so their provider can
//! authenticate them (OpenID 2.0 §9.1). The full flow discovers the
//! identifier, records the result in the discovery cache for the
//! verification that follows, and composes the checkid_setup request.

use tracing::instrument;
use url::form_urlencoded;

use crate::discover;
use crate::error::Error;
use crate::provider::{DiscoveryCache, HttpFetch};
use crate::{Result, IDENTIFIER_SELECT, OPENID2_NS};

/// Discover `id` and build the authentication redirect for it.
///
/// The discovered information is stored in `cache`, keyed by the provider
/// endpoint, so the later assertion verification does not need to repeat
/// discovery.
///
/// # Errors
///
/// Propagates normalization and discovery errors; see
/// [`discover::discover`].
#[instrument(skip(http, cache))]
pub async fn redirect_url(
    http: &impl HttpFetch, cache: &impl DiscoveryCache, id: &str, return_to: &str, realm: &str,
) -> Result<String> {
    let info = discover::discover(http, id).await?;
    cache.put(&info.op_endpoint, info.clone()).await;
    build_redirect_url(&info.op_endpoint, &info.op_local_id, &info.claimed_id, return_to, realm)
}

/// Compose the provider authentication-request URL from discovered
/// information plus the caller's return-to URL and realm.
///
/// An empty claimed identifier requests identifier-select mode: the
/// provider chooses the identifier and `openid.claimed_id` is omitted.
/// The realm is only added when non-empty.
///
/// # Errors
///
/// [`Error::MissingParameter`] when `op_endpoint` is empty.
pub fn build_redirect_url(
    op_endpoint: &str, op_local_id: &str, claimed_id: &str, return_to: &str, realm: &str,
) -> Result<String> {
    if op_endpoint.is_empty() {
        return Err(Error::MissingParameter("op_endpoint".to_string()));
    }

    let mut params = form_urlencoded::Serializer::new(String::new());
    params.append_pair("openid.ns", OPENID2_NS);
    params.append_pair("openid.mode", "checkid_setup");
    params.append_pair("openid.return_to", return_to);

    if claimed_id.is_empty() {
        params.append_pair("openid.identity", IDENTIFIER_SELECT);
    } else {
        params.append_pair("openid.claimed_id", claimed_id);
        if op_local_id.is_empty() {
            params.append_pair("openid.identity", IDENTIFIER_SELECT);
        } else {
            params.append_pair("openid.identity", op_local_id);
        }
    }
    if !realm.is_empty() {
        params.append_pair("openid.realm", realm);
    }

    let query = params.finish();
    let sep = if op_endpoint.contains('?') { '&' } else { '?' };
    Ok(format!("{op_endpoint}{sep}{query}"))
}
