use gloo_net::http::Request;
use streaming::transport::{HttpResponse, Transport, TransportError};

/// Browser `fetch` through gloo-net.
#[derive(Debug, Default, Copy, Clone)]
pub struct GlooTransport;

impl Transport for GlooTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let resp = Request::get(url)
            .send()
            .await
            .map_err(|e| TransportError::network(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .binary()
            .await
            .map_err(|e| TransportError::network(e.to_string()))?;
        Ok(HttpResponse::new(status, body))
    }
}
