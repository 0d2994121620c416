#[derive(Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    // The portal control endpoints take no payload; kept explicit so POSTs carry
    // `Content-Length: 0`.
    pub body: Vec<u8>,
}

fn is_sensitive(name: &str) -> bool {
    name.eq_ignore_ascii_case("authorization")
        || name.eq_ignore_ascii_case("x-csrf-token")
        || name.eq_ignore_ascii_case("cookie")
        || name.eq_ignore_ascii_case("set-cookie")
}

impl std::fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redacted_headers: Vec<(String, String)> = self
            .headers
            .iter()
            .map(|(k, v)| {
                let v = if is_sensitive(k) { "[REDACTED]".into() } else { v.clone() };
                (k.clone(), v)
            })
            .collect();

        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &redacted_headers)
            .field("body_len", &self.body.len())
            .finish()
    }
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".into(),
            url: url.into(),
            headers: vec![],
            body: vec![],
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: "POST".into(),
            url: url.into(),
            headers: vec![],
            body: vec![],
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.headers.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("header_names", &names)
            .field("body_len", &self.body.len())
            .finish()
    }
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    /// First value of `name`, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = HttpRequest::get("https://example.com").with_header("Accept", "*/*");
        assert_eq!(req.header("accept"), Some("*/*"));
        assert_eq!(req.header("content-type"), None);
    }

    #[test]
    fn debug_redacts_sensitive_headers() {
        let req = HttpRequest::post("http://10.0.0.5/api")
            .with_header("Authorization", "Basic dTpw")
            .with_header("X-CSRF-Token", "tok-123")
            .with_header("Accept", "*/*");

        let s = format!("{req:?}");
        assert!(!s.contains("dTpw"));
        assert!(!s.contains("tok-123"));
        assert!(s.contains("[REDACTED]"));
        assert!(s.contains("*/*"));
    }

    #[test]
    fn response_debug_hides_header_values() {
        let resp = HttpResponse {
            status: 200,
            headers: vec![("Set-Cookie".into(), "CSRF-Token=secret".into())],
            body: vec![],
        };
        assert!(resp.is_success());
        assert_eq!(resp.header("set-cookie"), Some("CSRF-Token=secret"));
        assert!(!format!("{resp:?}").contains("secret"));
    }
}
