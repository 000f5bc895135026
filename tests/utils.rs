#![allow(missing_docs)]
#![allow(dead_code)]

//! Canned-response HTTP transports for protocol tests. Responses are
//! keyed by URL plus any extra request headers, so a Yadis fetch and a
//! plain fetch of the same URL can be served different documents.

use std::collections::HashMap;
use std::sync::Mutex;

use openid_rp::{HttpFetch, HttpResponse};

/// Key for a GET carrying the Yadis Accept header.
pub fn yadis(url: &str) -> String {
    format!("{url}#Accept#application/xrds+xml")
}

/// Key for a POST.
pub fn posted(url: &str) -> String {
    format!("POST@{url}")
}

#[derive(Clone, Debug)]
pub struct CannedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CannedResponse {
    pub fn ok(body: &str) -> Self {
        Self { status: 200, headers: Vec::new(), body: body.to_string() }
    }

    #[must_use]
    pub fn content_type(self, value: &str) -> Self {
        self.header("Content-Type", value)
    }

    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// Transport serving canned responses, with a redirect map consulted the
/// way a real client follows redirects: the final URL is reported on the
/// response.
#[derive(Debug, Default)]
pub struct FakeFetcher {
    responses: HashMap<String, CannedResponse>,
    redirects: HashMap<String, String>,
    /// Every POST issued, in order: (url, form).
    pub posts: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn respond(mut self, key: &str, resp: CannedResponse) -> Self {
        self.responses.insert(key.to_string(), resp);
        self
    }

    #[must_use]
    pub fn redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }

    fn lookup(&self, key: &str, final_url: &str) -> Option<HttpResponse> {
        self.responses.get(key).map(|resp| HttpResponse {
            status: resp.status,
            headers: resp.headers.clone(),
            final_url: final_url.to_string(),
            body: resp.body.clone().into_bytes(),
        })
    }
}

impl HttpFetch for FakeFetcher {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> anyhow::Result<HttpResponse> {
        let mut url = url.to_string();
        loop {
            let mut key = url.clone();
            for (name, value) in headers {
                key.push('#');
                key.push_str(name);
                key.push('#');
                key.push_str(value);
            }
            if let Some(resp) = self.lookup(&key, &url) {
                return Ok(resp);
            }
            match self.redirects.get(&key) {
                Some(next) => url = next.clone(),
                None => anyhow::bail!("no canned response for {key}"),
            }
        }
    }

    async fn post(&self, url: &str, form: &[(String, String)]) -> anyhow::Result<HttpResponse> {
        self.posts.lock().expect("lock poisoned").push((url.to_string(), form.to_vec()));
        self.lookup(&posted(url), url)
            .ok_or_else(|| anyhow::anyhow!("no canned response for POST {url}"))
    }
}

/// Transport that must never be reached. Used to prove a verification
/// stage rejects before any network call is made.
#[derive(Debug, Default)]
pub struct PanicFetcher;

impl HttpFetch for PanicFetcher {
    async fn get(&self, url: &str, _headers: &[(&str, &str)]) -> anyhow::Result<HttpResponse> {
        panic!("unexpected GET {url}");
    }

    async fn post(
        &self, url: &str, _form: &[(String, String)],
    ) -> anyhow::Result<HttpResponse> {
        panic!("unexpected POST {url}");
    }
}
