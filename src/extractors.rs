use std::convert::Infallible;

use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Query, Request},
    http::{header, request::Parts, HeaderMap},
    Json,
};
use serde::de::DeserializeOwned;

use crate::{names, rejections::AppError, services::responses::ClientMeta, AppState};

/// Guard extractor that verifies the `Authorization: Bearer` token.
/// Carries the authenticated user's id.
pub struct AuthGuard(pub i64);

impl FromRequestParts<AppState> for AuthGuard {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::Unauthorized("No token provided"))?;

        state
            .tokens
            .verify(token)
            .map(AuthGuard)
            .ok_or(AppError::Unauthorized("Invalid token"))
    }
}

/// Origin address and user agent of the request.
pub struct ClientInfo(pub ClientMeta);

impl<S: Send + Sync> FromRequestParts<S> for ClientInfo {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientInfo(client_meta(&parts.headers)))
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// First `X-Forwarded-For` hop, else `X-Real-IP`.
fn client_meta(headers: &HeaderMap) -> ClientMeta {
    let ip_address = header_str(headers, names::FORWARDED_FOR_HEADER)
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| header_str(headers, names::REAL_IP_HEADER))
        .map(str::to_string);

    ClientMeta {
        ip_address,
        user_agent: header_str(headers, header::USER_AGENT.as_str()).map(str::to_string),
    }
}

/// `Json` whose rejections answer in the API's error format.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                tracing::debug!("rejected request body: {rejection}");
                Err(AppError::input(body_message(&rejection)))
            }
        }
    }
}

fn body_message(rejection: &JsonRejection) -> &'static str {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => "Expected a JSON request body",
        _ => "Invalid request body",
    }
}

/// `Query` whose rejections answer in the API's error format.
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(QueryParams(value)),
            Err(rejection) => {
                tracing::debug!("rejected query string: {rejection}");
                Err(AppError::input("Invalid query parameters"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn forwarded_for_wins_over_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert(
            names::FORWARDED_FOR_HEADER,
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        headers.insert(names::REAL_IP_HEADER, HeaderValue::from_static("10.0.0.2"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));

        let meta = client_meta(&headers);
        assert_eq!(meta.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(meta.user_agent.as_deref(), Some("Mozilla/5.0"));
    }

    #[test]
    fn real_ip_is_the_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(names::REAL_IP_HEADER, HeaderValue::from_static("10.0.0.2"));

        let meta = client_meta(&headers);
        assert_eq!(meta.ip_address.as_deref(), Some("10.0.0.2"));
        assert_eq!(meta.user_agent, None);
    }

    #[test]
    fn no_headers_means_no_metadata() {
        assert_eq!(client_meta(&HeaderMap::new()), ClientMeta::default());
    }
}
