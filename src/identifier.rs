//! # Identifier Normalization
//!
//! Turns a raw user-entered identifier into a canonical absolute URL
//! (OpenID 2.0 §7.2 and Appendix A.1). XRIs are rejected outright. No
//! network access happens here — redirect-following normalization is a
//! side effect of the discovery fetch.

use url::Url;

use crate::error::Error;
use crate::Result;

const XRI_SIGILS: [char; 6] = ['=', '@', '+', '$', '!', '('];

/// Normalize a user-supplied identifier.
///
/// Whitespace is trimmed, a missing `http://` scheme is prepended, and any
/// `#fragment` is stripped. Normalization is idempotent.
///
/// # Errors
///
/// Returns [`Error::InvalidIdentifier`] when the input is empty or reduces
/// to a bare scheme, and [`Error::UnsupportedXri`] when the input is an
/// XRI (an `xri://` prefix or a leading global-context symbol).
pub fn normalize(id: &str) -> Result<String> {
    let id = id.trim();
    if id.is_empty() || matches!(id, "http://" | "https://" | "xri://") {
        return Err(Error::InvalidIdentifier(id.to_string()));
    }

    if id.starts_with("xri://") || id.starts_with(&XRI_SIGILS[..]) {
        return Err(Error::UnsupportedXri(id.to_string()));
    }

    let id = if id.starts_with("http://") || id.starts_with("https://") {
        id.to_string()
    } else {
        format!("http://{id}")
    };

    // The fragment plays no part in identifying the user.
    let id = id.split('#').next().unwrap_or(&id);

    let url = Url::parse(id).map_err(|e| Error::InvalidIdentifier(format!("{id}: {e}")))?;
    Ok(url.to_string())
}
