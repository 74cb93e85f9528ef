use axum::http::{HeaderMap, header};

/// Request metadata captured alongside a click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip_address: String,
    pub user_agent: String,
    pub referrer: String,
}

impl ClientInfo {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            ip_address: client_ip(headers),
            user_agent: header_str(headers, header::USER_AGENT.as_str())
                .unwrap_or("unknown")
                .to_string(),
            referrer: header_str(headers, header::REFERER.as_str())
                .unwrap_or("direct")
                .to_string(),
        }
    }
}

/// First `x-forwarded-for` entry, then `x-real-ip`, else `unknown`.
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = header_str(headers, "x-forwarded-for")
        && let Some(first) = forwarded.split(',').map(str::trim).find(|s| !s.is_empty())
    {
        return first.to_string();
    }

    header_str(headers, "x-real-ip")
        .unwrap_or("unknown")
        .to_string()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
