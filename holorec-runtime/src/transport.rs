use holorec_engine::traits::PortalTransport;
use holorec_providers::request::{HttpRequest, HttpResponse};
use holorec_providers::runtime::{ClientOptions, build_client, execute};

/// `PortalTransport` backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(opts: &ClientOptions) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_client(opts)?,
        })
    }
}

#[async_trait::async_trait]
impl PortalTransport for ReqwestTransport {
    async fn send(&self, req: &HttpRequest) -> anyhow::Result<HttpResponse> {
        let resp = execute(&self.client, req).await?;
        log::debug!("{} {} -> {}", req.method, req.url, resp.status);
        Ok(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn forwards_request_to_portal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/holographic/mrc/video/control/stop"))
            .and(header("x-csrf-token", "XYZ"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(&ClientOptions::default()).unwrap();
        let req = HttpRequest::post(format!(
            "{}/api/holographic/mrc/video/control/stop",
            server.uri()
        ))
        .with_header("X-CSRF-Token", "XYZ");

        let resp = transport.send(&req).await.unwrap();
        assert_eq!(resp.status, 200);
    }
}
