//! An implementation of the Relying Party side of the
//! [OpenID Authentication 2.0](https://openid.net/specs/openid-authentication-2_0.html)
//! protocol: resolve a user-supplied identifier to its OpenID Provider,
//! build the authentication redirect, and verify the provider's signed
//! assertion on callback.
//!
//! The HTTP transport, the discovery cache, and the nonce store are
//! capability traits (see [`provider`]); in-memory reference
//! implementations ship with the crate and any conforming implementation
//! can be substituted. The crate performs no retries and installs no
//! global state — every knob is constructor configuration.
//!
//! ```rust,ignore
//! let http = reqwest::Client::new();
//! let cache = InMemoryDiscoveryCache::new();
//! let nonces = InMemoryNonceStore::new();
//!
//! // Send the user to their provider...
//! let url = redirect_url(
//!     &http, &cache, "user.example.com", "https://rp.example.com/cb", "https://rp.example.com",
//! )
//! .await?;
//!
//! // ...and later verify the assertion arriving on the callback URL.
//! let claimed_id = verify(&http, &cache, &nonces, callback_url).await?;
//! ```
//!
//! XRI identifiers are not supported and are rejected during
//! normalization. OpenID 1.x and extension namespaces are out of scope.

pub mod cache;
pub mod discover;
pub mod error;
pub mod identifier;
pub mod nonce;
pub mod provider;
pub mod redirect;
pub mod verify;

pub use crate::cache::{DiscoveredInfo, InMemoryDiscoveryCache, TimedDiscoveryCache};
pub use crate::discover::discover;
pub use crate::error::Error;
pub use crate::identifier::normalize;
pub use crate::nonce::InMemoryNonceStore;
pub use crate::provider::{DiscoveryCache, HttpFetch, HttpResponse, NonceStore};
pub use crate::redirect::{build_redirect_url, redirect_url};
pub use crate::verify::verify;

/// Result type for relying-party operations.
pub type Result<T, E = error::Error> = core::result::Result<T, E>;

/// The OpenID Authentication 2.0 namespace.
pub const OPENID2_NS: &str = "http://specs.openid.net/auth/2.0";

/// Sentinel identifier used when the provider chooses the identifier
/// ("identifier select" mode).
pub const IDENTIFIER_SELECT: &str = "http://specs.openid.net/auth/2.0/identifier_select";
