use crate::request::{HttpRequest, HttpResponse};
use anyhow::{Context, anyhow};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    pub connect_timeout: Duration,
    pub timeout: Duration,
    // The Device Portal serves a self-signed certificate on its HTTPS endpoint.
    pub accept_invalid_certs: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
            accept_invalid_certs: true,
        }
    }
}

pub fn build_client(opts: &ClientOptions) -> anyhow::Result<reqwest::Client> {
    // Important: without an explicit timeout, an unreachable device keeps the request
    // slot pending forever and the host can never issue another one of that kind.
    reqwest::Client::builder()
        .connect_timeout(opts.connect_timeout)
        .timeout(opts.timeout)
        .danger_accept_invalid_certs(opts.accept_invalid_certs)
        .build()
        .context("build http client")
}

pub async fn execute(
    client: &reqwest::Client,
    req: &HttpRequest,
) -> anyhow::Result<HttpResponse> {
    let mut headers = HeaderMap::new();
    for (k, v) in &req.headers {
        let name = HeaderName::from_bytes(k.as_bytes())
            .with_context(|| format!("invalid header name: {k}"))?;
        let value =
            HeaderValue::from_str(v).with_context(|| format!("invalid header value for {k}"))?;
        headers.insert(name, value);
    }

    let builder = match req.method.as_str() {
        "GET" => client.get(&req.url),
        "POST" => client.post(&req.url).body(req.body.clone()),
        other => return Err(anyhow!("unsupported method: {other}")),
    }
    .headers(headers);

    let resp = builder.send().await.context("http request failed")?;
    let status = resp.status().as_u16();
    let headers = resp
        .headers()
        .iter()
        .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
        .collect();
    let body = resp
        .bytes()
        .await
        .context("failed reading response body")?
        .to_vec();

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}
