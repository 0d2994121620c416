use async_trait::async_trait;
use holorec_providers::request::{HttpRequest, HttpResponse};

/// Sends one Device Portal request and returns whatever the device answered.
///
/// Implementations only fail for transport problems; HTTP error statuses come back as
/// a normal `HttpResponse` and are classified by the session client.
#[async_trait]
pub trait PortalTransport: Send + Sync {
    async fn send(&self, req: &HttpRequest) -> anyhow::Result<HttpResponse>;
}
