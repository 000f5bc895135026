//! # Providers
//!
//! Capability traits the relying-party core depends on, injected by the
//! application: the HTTP transport used for discovery and signature
//! checks, the discovery cache consulted during verification, and the
//! nonce store enforcing replay protection. Any conforming implementation
//! — in-memory, distributed, or mocked — is substitutable, which is how
//! the protocol tests run against a canned-response transport.
//!
//! [`HttpFetch`] is implemented for [`reqwest::Client`], the default
//! transport. Redirect following (and with it the final-URL normalization
//! the protocol relies on) is the transport's responsibility.

use std::future::Future;

use crate::cache::DiscoveredInfo;

/// Result used for provider-sourced failures.
pub type Result<T> = anyhow::Result<T>;

/// An HTTP response as seen by the core: status, headers, the URL that
/// ultimately served the response, and the body.
#[derive(Clone, Debug, Default)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,

    /// Response headers. Use [`HttpResponse::header`] for lookup.
    pub headers: Vec<(String, String)>,

    /// The URL that served the response, after any redirects.
    pub final_url: String,

    /// Response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// The first header value matching `name`, case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// True when the status code is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// The HTTP fetch capability used for discovery and for the direct
/// signature-verification request.
pub trait HttpFetch: Send + Sync {
    /// Issue a GET request with the given additional headers, following
    /// redirects.
    fn get(
        &self, url: &str, headers: &[(&str, &str)],
    ) -> impl Future<Output = Result<HttpResponse>> + Send;

    /// POST a form-urlencoded body.
    fn post(
        &self, url: &str, form: &[(String, String)],
    ) -> impl Future<Output = Result<HttpResponse>> + Send;
}

impl HttpFetch for reqwest::Client {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
        let mut request = reqwest::Client::get(self, url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        into_response(request.send().await?).await
    }

    async fn post(&self, url: &str, form: &[(String, String)]) -> Result<HttpResponse> {
        let request = reqwest::Client::post(self, url).form(form);
        into_response(request.send().await?).await
    }
}

async fn into_response(resp: reqwest::Response) -> Result<HttpResponse> {
    let status = resp.status().as_u16();
    let final_url = resp.url().to_string();
    let headers = resp
        .headers()
        .iter()
        .map(|(key, value)| {
            (key.as_str().to_string(), String::from_utf8_lossy(value.as_bytes()).into_owned())
        })
        .collect();
    let body = resp.bytes().await?.to_vec();

    Ok(HttpResponse { status, headers, final_url, body })
}

/// The discovery cache capability: previously discovered provider
/// information keyed by OP endpoint. Consulted during verification to
/// avoid re-discovery.
pub trait DiscoveryCache: Send + Sync {
    /// Store discovered information under the endpoint key.
    fn put(&self, endpoint: &str, info: DiscoveredInfo) -> impl Future<Output = ()> + Send;

    /// Previously discovered information for the endpoint, if any.
    fn get(&self, endpoint: &str) -> impl Future<Output = Option<DiscoveredInfo>> + Send;
}

/// The nonce store capability: accepts each `(endpoint, nonce)` pair at
/// most once within the configured time window.
pub trait NonceStore: Send + Sync {
    /// Accept or reject a response nonce for the endpoint.
    fn accept(
        &self, endpoint: &str, nonce: &str,
    ) -> impl Future<Output = crate::Result<()>> + Send;
}
