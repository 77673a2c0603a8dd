use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose, Engine as _};
use rand::Rng;

pub const CSRF_COOKIE_NAME: &str = "csrf_token";
pub const CSRF_HEADER_NAME: &str = "x-csrf-token";

/// CSRF middleware using the double-submit cookie pattern.
///
/// State-changing requests must carry the `csrf_token` cookie and an
/// identical `X-CSRF-Token` header. Safe methods pass through.
pub async fn csrf_middleware(request: Request, next: Next) -> Result<Response, StatusCode> {
    let method = request.method();

    // Skip CSRF check for safe methods
    if method == "GET" || method == "HEAD" || method == "OPTIONS" {
        return Ok(next.run(request).await);
    }

    // Extract CSRF token from cookie
    let jar = CookieJar::from_headers(request.headers());
    let cookie_token = jar.get(CSRF_COOKIE_NAME).map(|c| c.value().to_string());

    // Extract CSRF token from header
    let header_token = request
        .headers()
        .get(CSRF_HEADER_NAME)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    // Validate tokens match
    match (cookie_token, header_token) {
        (Some(cookie), Some(header)) if cookie == header => {
            tracing::debug!("CSRF validation passed");
            Ok(next.run(request).await)
        }
        (None, _) => {
            tracing::warn!("CSRF validation failed: missing cookie token");
            Err(StatusCode::FORBIDDEN)
        }
        (_, None) => {
            tracing::warn!("CSRF validation failed: missing header token");
            Err(StatusCode::FORBIDDEN)
        }
        _ => {
            tracing::warn!("CSRF validation failed: token mismatch");
            Err(StatusCode::FORBIDDEN)
        }
    }
}

pub fn generate_csrf_token() -> String {
    // 32 random bytes, URL-safe so the token fits a header and a cookie as-is
    let random_bytes: [u8; 32] = rand::rng().random();
    general_purpose::URL_SAFE_NO_PAD.encode(random_bytes)
}

pub fn csrf_cookie(token: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((CSRF_COOKIE_NAME, token.to_string()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_csrf_token() {
        let token1 = generate_csrf_token();
        let token2 = generate_csrf_token();

        assert!(!token1.is_empty());
        assert_ne!(token1, token2);
        assert!(general_purpose::URL_SAFE_NO_PAD.decode(&token1).is_ok());
    }

    #[test]
    fn cookie_follows_the_secure_flag() {
        let cookie = csrf_cookie("abc", false);
        assert_eq!(cookie.name(), CSRF_COOKIE_NAME);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    }
}
