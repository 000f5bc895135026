//! # Assertion Verification
//!
//! Callback-side validation of a positive assertion (OpenID 2.0 §11).
//! Four checks run in order — the return URL, the discovered
//! information, the response nonce, and finally the signature via a
//! direct request to the provider — and any failure rejects the
//! assertion outright. There is no partial-success state.

use tracing::{instrument, trace};
use url::Url;

use crate::discover;
use crate::error::Error;
use crate::provider::{DiscoveryCache, HttpFetch, NonceStore};
use crate::{Result, IDENTIFIER_SELECT, OPENID2_NS};

/// Verify the positive assertion carried by `callback_url`.
///
/// `callback_url` is the full URL of the request the provider redirected
/// the user agent to, query string included. On success the assertion's
/// claimed identifier is returned and the user is authenticated as that
/// identifier.
///
/// # Errors
///
/// Each verification stage surfaces its own error kind:
/// [`Error::ReturnToMismatch`], [`Error::BadProtocolVersion`],
/// [`Error::MissingParameter`], [`Error::IdentityMismatch`],
/// [`Error::UnverifiedClaimedId`], the nonce-store rejections, and
/// [`Error::SignatureInvalid`]. Any of them means the assertion must not
/// be trusted.
#[instrument(skip(http, cache, nonces))]
pub async fn verify(
    http: &impl HttpFetch, cache: &impl DiscoveryCache, nonces: &impl NonceStore,
    callback_url: &str,
) -> Result<String> {
    let callback = Url::parse(callback_url)
        .map_err(|e| Error::ReturnToMismatch(format!("unparseable callback URL: {e}")))?;
    let params = Params::from_url(&callback);

    verify_return_to(&callback, &params)?;
    trace!("return_to matches");
    verify_discovered(http, cache, &params).await?;
    trace!("discovered information matches");
    verify_nonce(nonces, &params).await?;
    trace!("nonce accepted");
    verify_signature(http, &params).await?;
    trace!("signature confirmed");

    params.require("openid.claimed_id").map(ToString::to_string)
}

/// Decoded query parameters of the assertion, in document order.
struct Params(Vec<(String, String)>);

impl Params {
    fn from_url(url: &Url) -> Self {
        Self(url.query_pairs().map(|(key, value)| (key.into_owned(), value.into_owned())).collect())
    }

    /// First value for `key`, like a form lookup.
    fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, value)| value.as_str())
    }

    fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| Error::MissingParameter(key.to_string()))
    }
}

/// §11.1 — the `openid.return_to` URL must match the URL the assertion
/// arrived on: scheme, host and path exactly, and every query parameter
/// of the return-to URL present with the same value in the callback
/// query. Extra callback parameters are fine.
fn verify_return_to(callback: &Url, params: &Params) -> Result<()> {
    let return_to = params.require("openid.return_to")?;
    let rt = Url::parse(return_to)
        .map_err(|e| Error::ReturnToMismatch(format!("unparseable return_to: {e}")))?;

    if callback.scheme() != rt.scheme()
        || callback.host_str() != rt.host_str()
        || callback.port_or_known_default() != rt.port_or_known_default()
        || callback.path() != rt.path()
    {
        return Err(Error::ReturnToMismatch(format!(
            "scheme, host or path differ from {return_to}"
        )));
    }

    for (key, value) in rt.query_pairs() {
        let actual = params.get(&key).unwrap_or_default();
        if actual != value {
            return Err(Error::ReturnToMismatch(format!(
                "parameter {key} differs: {value} vs {actual}"
            )));
        }
    }
    Ok(())
}

/// §11.2 — the information in the assertion must match discovered
/// information for the claimed identifier.
async fn verify_discovered(
    http: &impl HttpFetch, cache: &impl DiscoveryCache, params: &Params,
) -> Result<()> {
    let ns = params.get("openid.ns").unwrap_or_default();
    if ns != OPENID2_NS {
        return Err(Error::BadProtocolVersion(ns.to_string()));
    }

    let endpoint = params.require("openid.op_endpoint")?;
    let identity = params.require("openid.identity")?;
    // An assertion without a claimed identifier is not about an
    // identifier; that case is not supported.
    let claimed_id = params.require("openid.claimed_id")?;

    // The fragment plays no part in verifying discovered information.
    let claimed_bare = claimed_id.split('#').next().unwrap_or(claimed_id);

    if let Some(info) = cache.get(endpoint).await {
        if info.claimed_id != IDENTIFIER_SELECT && info.claimed_id == claimed_bare {
            if identity == info.op_local_id {
                return Ok(());
            }
            return Err(Error::IdentityMismatch(identity.to_string()));
        }
    }

    // Not previously discovered, identifier-select, or an unexpected
    // claimed id: discovery on the asserted claimed id must lead back to
    // the asserting endpoint before the assertion can be trusted. A
    // provider may publish several equally valid endpoints for one
    // claimed id; only equality with the asserting endpoint is checked
    // here.
    if let Ok(fresh) = discover::discover(http, claimed_id).await {
        if fresh.op_endpoint == endpoint {
            cache.put(endpoint, fresh).await;
            return Ok(());
        }
    }
    Err(Error::UnverifiedClaimedId(claimed_id.to_string()))
}

/// §11.3 — the response nonce must not have been accepted from this
/// provider before.
async fn verify_nonce(nonces: &impl NonceStore, params: &Params) -> Result<()> {
    let endpoint = params.require("openid.op_endpoint")?;
    let nonce = params.require("openid.response_nonce")?;
    nonces.accept(endpoint, nonce).await
}

/// §11.4 — have the provider confirm the signature: a direct request
/// carrying every `openid.*` assertion field except `openid.mode`, which
/// becomes `check_authentication`.
async fn verify_signature(http: &impl HttpFetch, params: &Params) -> Result<()> {
    let endpoint = params.require("openid.op_endpoint")?;

    let mut form: Vec<(String, String)> =
        vec![("openid.mode".to_string(), "check_authentication".to_string())];
    for (key, value) in &params.0 {
        if key.starts_with("openid.") && key != "openid.mode" {
            form.push((key.clone(), value.clone()));
        }
    }

    let resp = http.post(endpoint, &form).await.map_err(Error::Transport)?;
    let body = String::from_utf8_lossy(&resp.body);

    let ns_line = format!("ns:{OPENID2_NS}");
    let mut is_valid = false;
    let mut ns_valid = false;
    for line in body.lines() {
        let line = line.trim_end();
        if line == "is_valid:true" {
            is_valid = true;
        } else if line == ns_line {
            ns_valid = true;
        }
    }

    if is_valid && ns_valid {
        Ok(())
    } else {
        Err(Error::SignatureInvalid("provider did not confirm the assertion".to_string()))
    }
}
