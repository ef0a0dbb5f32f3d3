/**
 * Session Gate Middleware
 *
 * Applies the single-session gate to every request:
 * 1. Reads the session cookie (`SESSION-<port>`)
 * 2. Binds the session on the very first request and sets both cookies
 * 3. Rejects requests without the bound session cookie
 * 4. For anything but GET/HEAD, requires the XSRF cookie and the
 *    `X-XSRF-TOKEN` header to carry the issued token
 *
 * Rejections are 401 with a generic message; the reason is only logged.
 */

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue, Method,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use cookie::{Cookie, SameSite};

use crate::backend::auth::gate::{Admission, Binding, SessionGate};
use crate::backend::error::BackendError;

/// Cookie carrying the XSRF token; readable by page scripts
pub const XSRF_COOKIE: &str = "XSRF-TOKEN";

/// Header the page echoes the XSRF token in
pub const XSRF_HEADER: &str = "X-XSRF-TOKEN";

/// Value of cookie `name` from the request's `Cookie` headers
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().trim_matches('"').to_string())
}

fn is_read_only(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD
}

fn binding_cookies<'a>(cookie_name: &'a str, binding: &'a Binding) -> [Cookie<'a>; 2] {
    [
        Cookie::build((cookie_name, binding.session.as_str()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .build(),
        Cookie::build((XSRF_COOKIE, binding.xsrf.as_str()))
            .path("/")
            .same_site(SameSite::Strict)
            .build(),
    ]
}

fn set_binding_cookies(response: &mut Response, cookie_name: &str, binding: &Binding) {
    for cookie in binding_cookies(cookie_name, binding) {
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Failed to build session cookie: {:?}", e),
        }
    }
}

/// Gate every request on the bound session
pub async fn session_gate(
    State(gate): State<Arc<SessionGate>>,
    request: Request,
    next: Next,
) -> Response {
    let session = cookie_value(request.headers(), gate.cookie_name());
    let binding = match gate.admit(session.as_deref()) {
        Admission::Bound(binding) => {
            tracing::info!(uri = %request.uri(), "Session bound");
            Some(binding)
        }
        Admission::Admitted => None,
        Admission::Rejected => {
            tracing::warn!(
                method = %request.method(),
                uri = %request.uri(),
                has_cookie = session.is_some(),
                "Rejected request without the bound session"
            );
            return BackendError::Unauthorized.into_response();
        }
    };

    let mut response = if is_read_only(request.method()) {
        next.run(request).await
    } else {
        let cookie = cookie_value(request.headers(), XSRF_COOKIE);
        let header = request
            .headers()
            .get(XSRF_HEADER)
            .and_then(|value| value.to_str().ok());
        if gate.validate_xsrf(cookie.as_deref(), header) {
            next.run(request).await
        } else {
            tracing::warn!(
                method = %request.method(),
                uri = %request.uri(),
                "Rejected mutating request without a valid XSRF token"
            );
            BackendError::Unauthorized.into_response()
        }
    };

    // The establishing client gets its cookies even when the request itself was refused.
    if let Some(binding) = binding {
        set_binding_cookies(&mut response, gate.cookie_name(), &binding);
    }
    response
}
