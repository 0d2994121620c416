//! Request builders for the Device Portal Mixed Reality Capture endpoints.

use crate::request::{HttpRequest, HttpResponse};
use holorec_core::auth::{basic_auth_header, strip_csrf_prefix};
use holorec_core::config::{CaptureOptions, DeviceConfig};
use url::Url;

pub const START_PATH: &str = "/api/holographic/mrc/video/control/start";
pub const STOP_PATH: &str = "/api/holographic/mrc/video/control/stop";

/// Scheme + authority prefixes for the two kinds of portal calls.
///
/// The device hands out the CSRF cookie on its HTTPS root, while the MRC control
/// endpoints are reached over plain HTTP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalEndpoints {
    pub auth_base: String,
    pub control_base: String,
}

impl PortalEndpoints {
    pub fn for_host(host: &str) -> Self {
        let host = host.trim().trim_end_matches('/');
        Self {
            auth_base: format!("https://{host}"),
            control_base: format!("http://{host}"),
        }
    }

    /// Same base for everything; used against local mock servers.
    pub fn with_base(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            auth_base: base.clone(),
            control_base: base,
        }
    }
}

pub fn build_auth_request(endpoints: &PortalEndpoints, cfg: &DeviceConfig) -> HttpRequest {
    HttpRequest::get(join_url(&endpoints.auth_base, "/"))
        .with_header("Authorization", basic_auth_header(&cfg.username, &cfg.password))
}

pub fn build_start_request(
    endpoints: &PortalEndpoints,
    cfg: &DeviceConfig,
    csrf_token: Option<&str>,
) -> HttpRequest {
    let url = join_url(&endpoints.control_base, START_PATH);
    let url = append_capture_query(&url, &cfg.capture);
    control_request(url, cfg, csrf_token)
}

pub fn build_stop_request(
    endpoints: &PortalEndpoints,
    cfg: &DeviceConfig,
    csrf_token: Option<&str>,
) -> HttpRequest {
    let url = join_url(&endpoints.control_base, STOP_PATH);
    control_request(url, cfg, csrf_token)
}

/// The raw `Set-Cookie` value of an auth response, verbatim.
pub fn extract_csrf_cookie(resp: &HttpResponse) -> Option<String> {
    resp.header("set-cookie").map(str::to_string)
}

fn control_request(url: String, cfg: &DeviceConfig, csrf_token: Option<&str>) -> HttpRequest {
    // A missing token is still sent (as an empty header); the portal rejects it.
    let token = csrf_token.map(strip_csrf_prefix).unwrap_or_default();
    HttpRequest::post(url)
        .with_header("Authorization", basic_auth_header(&cfg.username, &cfg.password))
        .with_header("X-CSRF-Token", token)
}

fn append_capture_query(url: &str, capture: &CaptureOptions) -> String {
    let flag = |b: bool| if b { "true" } else { "false" };
    let pairs = [
        ("holo", flag(capture.hologram)),
        ("pv", flag(capture.camera)),
        ("mic", flag(capture.microphone)),
        ("loopback", flag(capture.loopback)),
    ];

    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.query_pairs_mut().extend_pairs(pairs);
            parsed.to_string()
        }
        Err(_) => {
            // Leave odd hosts to the transport to reject with a proper error.
            let query: Vec<String> = pairs.iter().map(|(k, v)| format!("{k}={v}")).collect();
            format!("{url}?{}", query.join("&"))
        }
    }
}

fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{}/{}", base, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> DeviceConfig {
        DeviceConfig::new("10.0.0.5").with_credentials("u", "p")
    }

    #[test]
    fn join_url_handles_trailing_slash() {
        assert_eq!(join_url("https://10.0.0.5/", "/"), "https://10.0.0.5/");
        assert_eq!(
            join_url("http://10.0.0.5", START_PATH),
            "http://10.0.0.5/api/holographic/mrc/video/control/start"
        );
    }

    #[test]
    fn endpoints_use_https_for_auth_and_http_for_control() {
        let ep = PortalEndpoints::for_host("10.0.0.5");
        assert_eq!(ep.auth_base, "https://10.0.0.5");
        assert_eq!(ep.control_base, "http://10.0.0.5");
    }

    #[test]
    fn builds_auth_request() {
        let req = build_auth_request(&PortalEndpoints::for_host("10.0.0.5"), &cfg());
        assert_eq!(req.method, "GET");
        assert_eq!(req.url, "https://10.0.0.5/");
        assert_eq!(req.header("authorization"), Some("Basic dTpw"));
        assert_eq!(req.header("x-csrf-token"), None);
    }

    #[test]
    fn builds_start_request_with_capture_flags() {
        let cfg = cfg().with_capture(CaptureOptions {
            hologram: true,
            camera: false,
            microphone: true,
            loopback: false,
        });
        let req = build_start_request(
            &PortalEndpoints::for_host("10.0.0.5"),
            &cfg,
            Some("CSRF-Token=abc123; Path=/"),
        );

        assert_eq!(req.method, "POST");
        assert_eq!(
            req.url,
            "http://10.0.0.5/api/holographic/mrc/video/control/start?holo=true&pv=false&mic=true&loopback=false"
        );
        assert_eq!(req.header("authorization"), Some("Basic dTpw"));
        assert_eq!(req.header("x-csrf-token"), Some("abc123; Path=/"));
        assert!(req.body.is_empty());
    }

    #[test]
    fn builds_stop_request_without_query() {
        let req = build_stop_request(
            &PortalEndpoints::for_host("127.0.0.1:10080"),
            &cfg(),
            Some("CSRF-Token=XYZ"),
        );
        assert_eq!(
            req.url,
            "http://127.0.0.1:10080/api/holographic/mrc/video/control/stop"
        );
        assert_eq!(req.header("x-csrf-token"), Some("XYZ"));
    }

    #[test]
    fn missing_token_is_sent_empty() {
        let req = build_stop_request(&PortalEndpoints::for_host("h"), &cfg(), None);
        assert_eq!(req.header("x-csrf-token"), Some(""));
    }

    #[test]
    fn extracts_cookie_verbatim() {
        let resp = HttpResponse {
            status: 200,
            headers: vec![("set-cookie".into(), "CSRF-Token=XYZ; Path=/".into())],
            body: vec![],
        };
        assert_eq!(
            extract_csrf_cookie(&resp).as_deref(),
            Some("CSRF-Token=XYZ; Path=/")
        );
    }
}
