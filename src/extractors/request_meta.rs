//! Request metadata handed to dependency providers (method, uri, headers).

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, Method, Uri},
};

/// Conventional header carrying the calling user in simple deployments.
pub const USER_HEADER: &str = "X-User";

#[derive(Clone, Debug)]
pub struct RequestMeta {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
}

impl RequestMeta {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        RequestMeta { method, uri, headers }
    }

    /// Trimmed header value; `None` when missing, not UTF-8, or blank.
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Token from `Authorization: Bearer <token>`.
    pub fn bearer_token(&self) -> Option<String> {
        let value = self.header(axum::http::header::AUTHORIZATION.as_str())?;
        let (scheme, token) = value.split_once(' ')?;
        let token = token.trim();
        (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
    }
}

impl Default for RequestMeta {
    fn default() -> Self {
        RequestMeta::new(Method::GET, Uri::from_static("/"), HeaderMap::new())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestMeta
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(RequestMeta::new(parts.method.clone(), parts.uri.clone(), parts.headers.clone()))
    }
}
