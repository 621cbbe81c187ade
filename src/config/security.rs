use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;

const NOSNIFF: &str = "nosniff";
const DENY: &str = "DENY";
const XSS_BLOCK: &str = "1; mode=block";
const HSTS_VALUE: &str = "max-age=31536000; includeSubDomains";
const CSP_API_VALUE: &str = "default-src 'none'; frame-ancestors 'none'";
const REFERRER_POLICY_VALUE: &str = "strict-origin-when-cross-origin";
const PERMISSIONS_POLICY_VALUE: &str = "geolocation=(), microphone=(), camera=()";

/// Middleware adding the standard API security headers to every response.
/// HSTS only makes sense behind HTTPS, so it is gated on the configuration
/// flag read at startup.
pub async fn security_headers(hsts_enabled: bool, request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert("X-Content-Type-Options", HeaderValue::from_static(NOSNIFF));
    headers.insert("X-Frame-Options", HeaderValue::from_static(DENY));
    headers.insert("X-XSS-Protection", HeaderValue::from_static(XSS_BLOCK));
    headers.insert(
        "Content-Security-Policy",
        HeaderValue::from_static(CSP_API_VALUE),
    );
    headers.insert(
        "Referrer-Policy",
        HeaderValue::from_static(REFERRER_POLICY_VALUE),
    );
    headers.insert(
        "Permissions-Policy",
        HeaderValue::from_static(PERMISSIONS_POLICY_VALUE),
    );

    if hsts_enabled {
        headers.insert(
            "Strict-Transport-Security",
            HeaderValue::from_static(HSTS_VALUE),
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_values_are_valid() {
        for value in [
            NOSNIFF,
            DENY,
            XSS_BLOCK,
            HSTS_VALUE,
            CSP_API_VALUE,
            REFERRER_POLICY_VALUE,
            PERMISSIONS_POLICY_VALUE,
        ] {
            assert!(
                value.parse::<HeaderValue>().is_ok(),
                "'{}' should be a valid HeaderValue",
                value
            );
        }
    }
}
