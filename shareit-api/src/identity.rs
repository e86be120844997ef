use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::{request::Parts, HeaderName, HeaderValue};
use axum_extra::headers::{self, Header};
use axum_extra::TypedHeader;
use shareit_core::UserId;

use crate::error::AppError;

static X_SHARER_USER_ID: HeaderName = HeaderName::from_static("x-sharer-user-id");

/// Caller identity, resolved upstream and forwarded as `X-Sharer-User-Id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharerUserId(pub UserId);

impl Header for SharerUserId {
    fn name() -> &'static HeaderName {
        &X_SHARER_USER_ID
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        I: Iterator<Item = &'i HeaderValue>,
    {
        values
            .next()
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<UserId>().ok())
            .map(SharerUserId)
            .ok_or_else(headers::Error::invalid)
    }

    fn encode<E>(&self, values: &mut E)
    where
        E: Extend<HeaderValue>,
    {
        values.extend(std::iter::once(HeaderValue::from(self.0)));
    }
}

/// The calling user, taken from `X-Sharer-User-Id`.
///
/// A missing or malformed header is rejected through [`AppError`] so the
/// client gets the same JSON error body as any other failure. Use
/// `Option<Caller>` where anonymous access is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub UserId);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(SharerUserId(id)) =
            <TypedHeader<SharerUserId> as FromRequestParts<S>>::from_request_parts(parts, state).await?;
        Ok(Caller(id))
    }
}

impl<S> OptionalFromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Option<Self>, Self::Rejection> {
        if !parts.headers.contains_key(SharerUserId::name()) {
            return Ok(None);
        }
        <Caller as FromRequestParts<S>>::from_request_parts(parts, state)
            .await
            .map(Some)
    }
}
