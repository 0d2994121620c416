use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Prefix the device puts in front of the token value in its `Set-Cookie` header.
pub const CSRF_COOKIE_PREFIX: &str = "CSRF-Token=";

/// Builds an RFC 7617 `Authorization` header value for the Basic scheme.
pub fn basic_auth_header(username: &str, password: &str) -> String {
    let credentials = format!("{username}:{password}");
    format!("Basic {}", STANDARD.encode(credentials.as_bytes()))
}

/// Turns the raw `Set-Cookie` value into what the portal expects in `X-CSRF-Token`.
///
/// This is a literal substring removal, not a cookie parse: attributes such as
/// `; Path=/` are forwarded untouched.
pub fn strip_csrf_prefix(raw: &str) -> String {
    raw.replace(CSRF_COOKIE_PREFIX, "")
}
