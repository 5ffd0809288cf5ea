//! Request authentication middleware.
//!
//! Per request: UNVERIFIED -> credential extraction -> VERIFYING ->
//! AUTHENTICATED (identity attached) or REJECTED (uniform 401, handler never
//! runs). For the API-key scheme the usage-ledger row is written after the
//! handler so it carries the real response status; a request dropped before
//! authentication leaves no trace.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use percent_encoding::percent_decode_str;
use std::sync::Arc;
use tracing::{error, warn};

use crate::auth::{AuthError, CurrentUser};
use crate::AppState;

const API_KEY_HEADER: &str = "x-api-key";
const API_KEY_SCHEME: &str = "ApiKey ";
const API_KEY_QUERY_PARAM: &str = "api_key";

/// Requires a valid session token; attaches [`CurrentUser`] on success.
pub async fn session_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let user = match resolve_session(&state, request.headers()) {
        Ok(user) => user,
        Err(err) => return err.into_response(),
    };

    request.extensions_mut().insert(user);
    next.run(request).await
}

/// Accepts either credential scheme. A supplied API key must validate; a bad
/// key is rejected even when a valid session token is also present. Without a
/// key the session scheme applies. Only the API-key scheme produces a
/// usage-ledger row.
pub async fn api_key_or_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(key) = supplied_api_key(request.headers(), request.uri()) else {
        let user = match resolve_session(&state, request.headers()) {
            Ok(user) => user,
            Err(err) => return err.into_response(),
        };
        request.extensions_mut().insert(user);
        return next.run(request).await;
    };

    let (user, api_key_id) = match resolve_api_key(&state, &key).await {
        Ok(resolved) => resolved,
        Err(err) => return err.into_response(),
    };

    // Caller metadata is captured before the handler consumes the request.
    let endpoint = request.uri().path().to_string();
    let method = request.method().to_string();
    let ip_address = client_ip(request.headers());
    let user_agent = header_value(request.headers(), header::USER_AGENT.as_str());

    request.extensions_mut().insert(user);
    let response = next.run(request).await;

    // Accounting is best-effort relative to the request: a ledger failure is
    // reported in the logs but the handler's outcome stands.
    let status_code = i32::from(response.status().as_u16());
    if let Err(err) = state
        .usage
        .record(
            api_key_id,
            &endpoint,
            &method,
            ip_address,
            user_agent,
            Some(status_code),
        )
        .await
    {
        error!(api_key_id, endpoint, "failed to record API key usage: {}", err);
    }

    response
}

fn resolve_session(state: &AppState, headers: &HeaderMap) -> Result<CurrentUser, AuthError> {
    let token = bearer_token(headers).ok_or(AuthError::MissingCredentials)?;
    let claims = state.auth.verify_token(&token)?;
    let user_id: i64 = claims.sub.parse().map_err(|_| AuthError::InvalidToken)?;

    Ok(CurrentUser {
        id: user_id,
        email: Some(claims.email),
        api_key_id: None,
    })
}

async fn resolve_api_key(state: &AppState, key: &str) -> Result<(CurrentUser, i64), AuthError> {
    let key_info = state
        .api_keys
        .find_by_key(key)
        .await
        .map_err(|e| AuthError::InternalError(e.to_string()))?
        .ok_or(AuthError::InvalidApiKey)?;

    if let Err(err) = state.api_keys.touch_last_used(key_info.id).await {
        warn!(key_id = key_info.id, "failed to update last-used timestamp: {}", err);
    }

    let user = CurrentUser {
        id: key_info.user_id,
        email: None,
        api_key_id: Some(key_info.id),
    };
    Ok((user, key_info.id))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Extracts an API key in order of precedence: `X-API-Key` header,
/// `Authorization: ApiKey` scheme, `api_key` query parameter.
fn supplied_api_key(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    if let Some(key) = header_value(headers, API_KEY_HEADER) {
        return Some(key);
    }

    if let Some(value) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(key) = value.strip_prefix(API_KEY_SCHEME) {
            let key = key.trim();
            if !key.is_empty() {
                return Some(key.to_string());
            }
        }
    }

    uri.query()
        .and_then(|query| query_param(query, API_KEY_QUERY_PARAM))
}

fn query_param(query: &str, name: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        if k != name || v.is_empty() {
            return None;
        }
        // Form decoding: '+' means space, then percent-escapes.
        let decoded = percent_decode_str(&v.replace('+', " "))
            .decode_utf8()
            .ok()?
            .into_owned();
        (!decoded.is_empty()).then_some(decoded)
    })
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
        .filter(|v| !v.is_empty())
}

/// First hop of `X-Forwarded-For` when present; otherwise unknown. The
/// server sits behind a reverse proxy in every deployed configuration.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    header_value(headers, "x-forwarded-for")
        .map(|raw| raw.split(',').next().unwrap_or(&raw).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc".to_string()));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("ApiKey abc"));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn api_key_precedence_header_over_query() {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static("from_header"));
        let uri: Uri = "/api/user/data?api_key=from_query".parse().unwrap();
        assert_eq!(
            supplied_api_key(&headers, &uri),
            Some("from_header".to_string())
        );
    }

    #[test]
    fn api_key_from_authorization_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("ApiKey sk_test"),
        );
        let uri: Uri = "/api/user/data".parse().unwrap();
        assert_eq!(supplied_api_key(&headers, &uri), Some("sk_test".to_string()));
    }

    #[test]
    fn api_key_from_query_parameter() {
        let headers = HeaderMap::new();
        let uri: Uri = "/api/user/data?other=1&api_key=sk_q".parse().unwrap();
        assert_eq!(supplied_api_key(&headers, &uri), Some("sk_q".to_string()));
    }

    #[test]
    fn api_key_query_value_is_percent_decoded() {
        let headers = HeaderMap::new();
        let uri: Uri = "/api/user/data?api_key=sk%5Fabc123".parse().unwrap();
        assert_eq!(
            supplied_api_key(&headers, &uri),
            Some("sk_abc123".to_string())
        );
    }

    #[test]
    fn no_api_key_supplied() {
        let headers = HeaderMap::new();
        let uri: Uri = "/api/user/data".parse().unwrap();
        assert_eq!(supplied_api_key(&headers, &uri), None);
    }

    #[test]
    fn forwarded_ip_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers), Some("203.0.113.9".to_string()));
    }
}
