//! # XRDS Service Documents
//!
//! Parser for the XRDS (Extensible Resource Descriptor Sequence)
//! documents returned by Yadis discovery, and selection of the OpenID
//! service to use (OpenID 2.0 §7.3.2).

use super::scan;
use crate::error::Error;
use crate::Result;

/// Service type of an OP Identifier element. Assertions from such a
/// service carry no claimed or local identifier; the provider selects
/// the identifier.
pub const OP_IDENTIFIER_SERVICE: &str = "http://specs.openid.net/auth/2.0/server";

/// Service type of a Claimed Identifier element.
pub const CLAIMED_IDENTIFIER_SERVICE: &str = "http://specs.openid.net/auth/2.0/signon";

/// The OpenID service selected from an XRDS document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Service {
    /// Provider endpoint URI.
    pub uri: String,

    /// OP-Local Identifier, empty when the service declares none.
    pub local_id: String,

    /// Whether this is an OP Identifier (identifier-select) service.
    pub op_identifier: bool,
}

#[derive(Debug, Default)]
struct RawService {
    priority: Option<u32>,
    types: Vec<String>,
    uri: String,
    local_id: String,
}

/// Select the OpenID provider service from an XRDS document.
///
/// An OP Identifier (`…/server`) service always beats Claimed Identifier
/// (`…/signon`) services, whatever priorities are declared — its
/// assertions carry no identifier for the relying party to pin. Among
/// signon services the lowest numeric `priority` wins, and a service
/// without a `priority` attribute is preferred over all prioritized
/// ones; document order breaks ties. A malformed document tail is
/// tolerated: services read before the damage still count.
///
/// # Errors
///
/// [`Error::MalformedDocument`] when the body holds no XRD element at
/// all, [`Error::NoServiceFound`] when no OpenID 2.0 service with a URI
/// is present.
pub fn parse(body: &[u8]) -> Result<Service> {
    let doc = String::from_utf8_lossy(body);
    let services = collect_services(&doc)?;
    select(services)
}

fn collect_services(doc: &str) -> Result<Vec<RawService>> {
    let mut services = Vec::new();
    let mut saw_xrd = false;
    let mut in_xrd = false;
    let mut current: Option<RawService> = None;
    let mut in_field = false;
    let mut text = String::new();

    let mut rest = doc;
    loop {
        let Some(lt) = rest.find('<') else { break };
        if in_field {
            text.push_str(&rest[..lt]);
        }
        rest = &rest[lt..];

        if let Some(after) = rest.strip_prefix("<!--") {
            let Some(end) = after.find("-->") else { break };
            rest = &after[end + 3..];
            continue;
        }
        if rest.starts_with("<?") || rest.starts_with("<!") {
            let Some(end) = rest.find('>') else { break };
            rest = &rest[end + 1..];
            continue;
        }
        let Some(tag) = scan::read_tag(rest) else { break };
        rest = &rest[tag.len..];

        match local_name(tag.name) {
            "XRD" => {
                saw_xrd = true;
                in_xrd = !tag.closing;
            }
            "Service" if in_xrd => {
                if tag.closing {
                    if let Some(service) = current.take() {
                        services.push(service);
                    }
                } else if !tag.self_closing {
                    let attrs = scan::attributes(tag.attrs);
                    let priority =
                        scan::attr(&attrs, "priority").and_then(|p| p.trim().parse().ok());
                    current = Some(RawService { priority, ..RawService::default() });
                }
                in_field = false;
                text.clear();
            }
            name @ ("Type" | "URI" | "LocalID") => {
                if let Some(service) = current.as_mut() {
                    if tag.closing {
                        let value = scan::unescape(text.trim());
                        match name {
                            "Type" => service.types.push(value),
                            "URI" if service.uri.is_empty() => service.uri = value,
                            "LocalID" if service.local_id.is_empty() => service.local_id = value,
                            _ => {}
                        }
                        in_field = false;
                        text.clear();
                    } else if !tag.self_closing {
                        in_field = true;
                        text.clear();
                    }
                }
            }
            _ => {}
        }
    }

    if !saw_xrd {
        return Err(Error::MalformedDocument("no XRD element in document".to_string()));
    }
    Ok(services)
}

fn select(services: Vec<RawService>) -> Result<Service> {
    if let Some(server) = services
        .iter()
        .find(|s| !s.uri.is_empty() && s.types.iter().any(|t| t == OP_IDENTIFIER_SERVICE))
    {
        return Ok(Service {
            uri: server.uri.clone(),
            local_id: String::new(),
            op_identifier: true,
        });
    }

    let signon = services
        .into_iter()
        .filter(|s| !s.uri.is_empty() && s.types.iter().any(|t| t == CLAIMED_IDENTIFIER_SERVICE))
        .min_by_key(|s| s.priority.map_or((0, 0), |p| (1, p)));

    signon.map_or_else(
        || Err(Error::NoServiceFound("no OpenID 2.0 service in XRDS document".to_string())),
        |s| Ok(Service { uri: s.uri, local_id: s.local_id, op_identifier: false }),
    )
}

fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}
