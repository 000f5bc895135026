//! Tests for the discovery engine: Yadis precedence, the HTML fallback,
//! and the discover-then-redirect flow.

mod utils;

use openid_rp::{discover, redirect_url, DiscoveredInfo, DiscoveryCache, InMemoryDiscoveryCache};
use url::Url;
use utils::{yadis, CannedResponse, FakeFetcher};

const ID: &str = "http://example.com/id";
const XRDS_URL: &str = "http://example.com/xrds";

const XRDS_SIGNON: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xrds:XRDS xmlns:xrds="xri://$xrds" xmlns="xri://$xrd*($v*2.0)">
  <XRD>
    <Service xmlns="xri://$xrd*($v*2.0)">
      <Type>http://specs.openid.net/auth/2.0/signon</Type>
      <URI>http://op.example.com/auth</URI>
      <LocalID>http://user.example.com/id</LocalID>
    </Service>
  </XRD>
</xrds:XRDS>"#;

const XRDS_SERVER_AND_SIGNON: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xrds:XRDS xmlns:xrds="xri://$xrds" xmlns="xri://$xrd*($v*2.0)">
  <XRD>
    <Service priority="0">
      <Type>http://specs.openid.net/auth/2.0/signon</Type>
      <URI>http://op.example.com/signon</URI>
    </Service>
    <Service>
      <Type>http://specs.openid.net/auth/2.0/server</Type>
      <URI>http://op.example.com/server</URI>
    </Service>
  </XRD>
</xrds:XRDS>"#;

const HTML_LINKS: &str = r#"<html>
<head>
<link rel="openid2.provider" href="http://op.example.com/openid">
<link rel="openid2.local_id" href="http://user.example.com/name">
</head>
</html>"#;

fn signon_info() -> DiscoveredInfo {
    DiscoveredInfo {
        op_endpoint: "http://op.example.com/auth".to_string(),
        op_local_id: "http://user.example.com/id".to_string(),
        claimed_id: ID.to_string(),
    }
}

#[tokio::test]
async fn yadis_direct_xrds() {
    let http = FakeFetcher::new().respond(
        &yadis(ID),
        CannedResponse::ok(XRDS_SIGNON).content_type("application/xrds+xml; charset=UTF-8"),
    );

    assert_eq!(discover(&http, ID).await.expect("should discover"), signon_info());
}

#[tokio::test]
async fn yadis_xrds_location_header() {
    let http = FakeFetcher::new()
        .respond(
            &yadis(ID),
            CannedResponse::ok("nothing interesting here").header("X-XRDS-Location", XRDS_URL),
        )
        .respond(
            &yadis(XRDS_URL),
            CannedResponse::ok(XRDS_SIGNON).content_type("application/xrds+xml"),
        );

    assert_eq!(discover(&http, ID).await.expect("should discover"), signon_info());
}

#[tokio::test]
async fn yadis_html_meta() {
    let meta = format!(
        r#"<html>
<head>
<meta http-equiv="X-XRDS-Location" content="{XRDS_URL}">
</head>
</html>"#
    );
    let http = FakeFetcher::new()
        .respond(&yadis(ID), CannedResponse::ok(&meta).content_type("text/html"))
        .respond(
            &yadis(XRDS_URL),
            CannedResponse::ok(XRDS_SIGNON).content_type("application/xrds+xml"),
        );

    assert_eq!(discover(&http, ID).await.expect("should discover"), signon_info());
}

#[tokio::test]
async fn op_identifier_selects_server_service() {
    let http = FakeFetcher::new().respond(
        &yadis(ID),
        CannedResponse::ok(XRDS_SERVER_AND_SIGNON).content_type("application/xrds+xml"),
    );

    let info = discover(&http, ID).await.expect("should discover");
    assert_eq!(
        info,
        DiscoveredInfo {
            op_endpoint: "http://op.example.com/server".to_string(),
            op_local_id: String::new(),
            claimed_id: String::new(),
        }
    );
}

#[tokio::test]
async fn html_fallback() {
    let http = FakeFetcher::new()
        .respond("http://example.com/html", CannedResponse::ok(HTML_LINKS));

    let info = discover(&http, "http://example.com/html").await.expect("should discover");
    assert_eq!(
        info,
        DiscoveredInfo {
            op_endpoint: "http://op.example.com/openid".to_string(),
            op_local_id: "http://user.example.com/name".to_string(),
            claimed_id: "http://example.com/html".to_string(),
        }
    );
}

#[tokio::test]
async fn html_fallback_claims_final_url() {
    // The identifier redirects; the redirect target, not the supplied
    // identifier, becomes the claimed identifier.
    let http = FakeFetcher::new()
        .redirect("http://example.com/html-redirect", "http://example.com/html")
        .respond("http://example.com/html", CannedResponse::ok(HTML_LINKS));

    let info =
        discover(&http, "http://example.com/html-redirect").await.expect("should discover");
    assert_eq!(info.claimed_id, "http://example.com/html");
    assert_eq!(info.op_endpoint, "http://op.example.com/openid");
}

#[tokio::test]
async fn unnormalized_identifier_is_discovered() {
    let http = FakeFetcher::new().respond(
        &yadis(ID),
        CannedResponse::ok(XRDS_SIGNON).content_type("application/xrds+xml"),
    );

    assert_eq!(discover(&http, "example.com/id").await.expect("should discover"), signon_info());
}

#[tokio::test]
async fn unreachable_identifier_fails() {
    let http = FakeFetcher::new();
    assert!(discover(&http, "http://example.com/404").await.is_err());
}

#[tokio::test]
async fn redirect_flow_fills_cache() {
    let http = FakeFetcher::new().respond(
        &yadis(ID),
        CannedResponse::ok(XRDS_SIGNON).content_type("application/xrds+xml"),
    );
    let cache = InMemoryDiscoveryCache::new();

    let redirect = redirect_url(&http, &cache, "example.com/id", "http://rp.example.com/cb", "")
        .await
        .expect("should build redirect");

    assert_eq!(cache.get("http://op.example.com/auth").await, Some(signon_info()));

    let url = Url::parse(&redirect).expect("should parse");
    assert!(redirect.starts_with("http://op.example.com/auth?"));
    let get = |key: &str| {
        url.query_pairs().find(|(k, _)| k == key).map(|(_, value)| value.into_owned())
    };
    assert_eq!(get("openid.mode").as_deref(), Some("checkid_setup"));
    assert_eq!(get("openid.claimed_id").as_deref(), Some(ID));
    assert_eq!(get("openid.identity").as_deref(), Some("http://user.example.com/id"));
    assert_eq!(get("openid.return_to").as_deref(), Some("http://rp.example.com/cb"));
}
