//! # Errors
//!
//! Error types for relying-party operations. Every distinct failure mode
//! surfaces as its own variant so callers can react to normalization,
//! discovery, nonce and verification failures separately. Verification
//! failures are fatal to the assertion being checked and are never
//! downgraded.

use thiserror::Error;

/// Errors returned by relying-party operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The supplied identifier is empty or not a usable URL.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// The supplied identifier is an XRI. XRI resolution is not implemented.
    #[error("XRI identifiers are not supported: {0}")]
    UnsupportedXri(String),

    /// The HTTP transport failed during discovery or verification.
    #[error("transport error: {0}")]
    Transport(#[from] anyhow::Error),

    /// An XRDS document was retrieved but holds no usable OpenID service.
    #[error("no service found: {0}")]
    NoServiceFound(String),

    /// An HTML document was retrieved but carries no `openid2.provider`
    /// link in its head.
    #[error("provider link not found: {0}")]
    ProviderLinkNotFound(String),

    /// A discovery document could not be parsed at all.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// The response nonce is structurally invalid.
    #[error("invalid nonce: {0}")]
    InvalidNonce(String),

    /// The response nonce timestamp is outside the acceptance window.
    #[error("nonce too old: {0}")]
    NonceTooOld(String),

    /// The response nonce has already been accepted for this endpoint.
    #[error("nonce already used: {0}")]
    NonceReused(String),

    /// `openid.return_to` does not match the URL the assertion arrived on.
    #[error("return_to does not match the callback URL: {0}")]
    ReturnToMismatch(String),

    /// A required assertion parameter is absent or empty.
    #[error("missing parameter: {0}")]
    MissingParameter(String),

    /// The asserted identity does not match the discovered local
    /// identifier.
    #[error("identity does not match the discovered local identifier: {0}")]
    IdentityMismatch(String),

    /// No discovered endpoint authorizes assertions about the claimed
    /// identifier.
    #[error("could not verify the claimed identifier: {0}")]
    UnverifiedClaimedId(String),

    /// The provider did not confirm the assertion signature.
    #[error("signature verification failed: {0}")]
    SignatureInvalid(String),

    /// `openid.ns` is not the OpenID 2.0 namespace.
    #[error("unsupported protocol version: {0}")]
    BadProtocolVersion(String),
}
