//! Request identity.
//!
//! The authentication provider in front of the server forwards the signed-in
//! user's ID in the `x-user-id` header. A request without it is anonymous;
//! services refuse to act for anonymous callers.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

use crate::domain::user_context::UserContext;

pub const USER_ID_HEADER: &str = "x-user-id";

#[async_trait]
impl<S> FromRequestParts<S> for UserContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty());

        Ok(match user_id {
            Some(id) => UserContext::authenticated(id),
            None => UserContext::anonymous(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> UserContext {
        let (mut parts, _) = request.into_parts();
        UserContext::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_header_becomes_authenticated_context() {
        let request = Request::builder().header(USER_ID_HEADER, " driver-7 ").body(()).unwrap();
        assert_eq!(extract(request).await, UserContext::authenticated("driver-7"));
    }

    #[tokio::test]
    async fn test_missing_or_blank_header_is_anonymous() {
        assert_eq!(extract(Request::builder().body(()).unwrap()).await, UserContext::anonymous());
        let blank = Request::builder().header(USER_ID_HEADER, "  ").body(()).unwrap();
        assert_eq!(extract(blank).await.owner_id(), None);
    }
}
