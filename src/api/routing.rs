//! Endpoint selection for the three dispatchers.
//!
//! Each dispatcher is mounted once and receives the rest of the path. The
//! first segment names the endpoint; the remainder is handed to the handler
//! (only `media/image/<path>` uses it).

use axum::http::Method;

use super::error::ApiError;

pub trait Endpoint: Sized + Copy + PartialEq + 'static {
    /// Every endpoint of this dispatcher, in documentation order.
    const ALL: &'static [Self];
    /// Label used in the 404 message.
    const SCOPE: &'static str;

    fn name(self) -> &'static str;

    /// HTTP methods this endpoint answers to.
    fn methods(self) -> &'static [&'static str];

    fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|e| e.name()).collect()
    }

    fn parse(segment: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|e| e.name() == segment)
    }

    fn allows(self, method: &Method) -> bool {
        self.methods().contains(&method.as_str())
    }
}

/// Split `path` into endpoint and remainder and check the method.
pub fn resolve<E: Endpoint>(method: &Method, path: &str) -> Result<(E, String), ApiError> {
    let path = path.trim_start_matches('/');
    let (head, rest) = path.split_once('/').unwrap_or((path, ""));

    let endpoint = E::parse(head).ok_or_else(|| ApiError::NotFound {
        message: if head.is_empty() {
            format!("No {} endpoint given", E::SCOPE)
        } else {
            format!("Unknown {} endpoint '{}'", E::SCOPE, head)
        },
        available: E::names(),
    })?;

    if !endpoint.allows(method) {
        return Err(ApiError::MethodNotAllowed {
            allowed: endpoint.methods().to_vec(),
        });
    }

    Ok((endpoint, rest.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreEndpoint {
    Products,
    Settings,
    TrackClick,
    PurchaseRequest,
    Gamification,
    Convert,
    Actions,
}

impl Endpoint for CoreEndpoint {
    const ALL: &'static [Self] = &[
        CoreEndpoint::Products,
        CoreEndpoint::Settings,
        CoreEndpoint::TrackClick,
        CoreEndpoint::PurchaseRequest,
        CoreEndpoint::Gamification,
        CoreEndpoint::Convert,
        CoreEndpoint::Actions,
    ];
    const SCOPE: &'static str = "core";

    fn name(self) -> &'static str {
        match self {
            CoreEndpoint::Products => "products",
            CoreEndpoint::Settings => "settings",
            CoreEndpoint::TrackClick => "track-click",
            CoreEndpoint::PurchaseRequest => "purchase-request",
            CoreEndpoint::Gamification => "gamification",
            CoreEndpoint::Convert => "convert",
            CoreEndpoint::Actions => "actions",
        }
    }

    fn methods(self) -> &'static [&'static str] {
        match self {
            CoreEndpoint::Products
            | CoreEndpoint::Settings
            | CoreEndpoint::Gamification
            | CoreEndpoint::Convert => &["GET"],
            CoreEndpoint::TrackClick | CoreEndpoint::PurchaseRequest | CoreEndpoint::Actions => {
                &["POST"]
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminEndpoint {
    Analytics,
    Settings,
    CatalogOrder,
    PurchaseRequests,
    Actions,
}

impl Endpoint for AdminEndpoint {
    const ALL: &'static [Self] = &[
        AdminEndpoint::Analytics,
        AdminEndpoint::Settings,
        AdminEndpoint::CatalogOrder,
        AdminEndpoint::PurchaseRequests,
        AdminEndpoint::Actions,
    ];
    const SCOPE: &'static str = "admin";

    fn name(self) -> &'static str {
        match self {
            AdminEndpoint::Analytics => "analytics",
            AdminEndpoint::Settings => "settings",
            AdminEndpoint::CatalogOrder => "catalog-order",
            AdminEndpoint::PurchaseRequests => "purchase-requests",
            AdminEndpoint::Actions => "actions",
        }
    }

    fn methods(self) -> &'static [&'static str] {
        match self {
            AdminEndpoint::Analytics | AdminEndpoint::PurchaseRequests => &["GET"],
            AdminEndpoint::Settings => &["GET", "PUT"],
            AdminEndpoint::CatalogOrder => &["PUT", "POST"],
            AdminEndpoint::Actions => &["POST"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEndpoint {
    Upload,
    UploadRemote,
    Image,
    Proxy,
}

impl Endpoint for MediaEndpoint {
    const ALL: &'static [Self] = &[
        MediaEndpoint::Upload,
        MediaEndpoint::UploadRemote,
        MediaEndpoint::Image,
        MediaEndpoint::Proxy,
    ];
    const SCOPE: &'static str = "media";

    fn name(self) -> &'static str {
        match self {
            MediaEndpoint::Upload => "upload",
            MediaEndpoint::UploadRemote => "upload-remote",
            MediaEndpoint::Image => "image",
            MediaEndpoint::Proxy => "proxy",
        }
    }

    fn methods(self) -> &'static [&'static str] {
        match self {
            MediaEndpoint::Upload | MediaEndpoint::UploadRemote => &["POST"],
            MediaEndpoint::Image | MediaEndpoint::Proxy => &["GET", "HEAD"],
        }
    }
}
