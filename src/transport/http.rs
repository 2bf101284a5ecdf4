//! HTTP transport for the detection service

use super::{DetectionRequest, DetectionResponse, DetectionTransport, ServiceStatus, TransportError};
use crate::config::ClientConfig;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};

const API_KEY_HEADER: &str = "X-API-Key";

/// reqwest-backed transport posting to `{api_url}/detect`
pub struct HttpTransport {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    detect_url: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::unknown(format!("Failed to create HTTP client: {e}")))?;

        let base_url = config.api_url.trim_end_matches('/').to_string();
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            detect_url: format!("{base_url}/detect"),
            base_url,
        })
    }

    /// Probe `GET /` on the service root
    pub async fn status(&self) -> Result<ServiceStatus, TransportError> {
        let request = self.authorize(self.client.get(format!("{}/", self.base_url)));
        let body = send(request).await?;
        serde_json::from_str(&body)
            .map_err(|e| TransportError::malformed(format!("Failed to parse status: {e}")))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }
}

#[async_trait]
impl DetectionTransport for HttpTransport {
    async fn detect(&self, request: &DetectionRequest) -> Result<DetectionResponse, TransportError> {
        let builder = self.authorize(self.client.post(&self.detect_url).json(request));
        let body = send(builder).await?;

        serde_json::from_str(&body).map_err(|e| {
            TransportError::malformed(format!("Failed to parse response: {e} - body: {body}"))
        })
    }

    fn endpoint(&self) -> &str {
        &self.detect_url
    }
}

/// Send a request and return the body of a 2xx response
async fn send(request: RequestBuilder) -> Result<String, TransportError> {
    let response = request.send().await.map_err(classify_reqwest_error)?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        if e.is_timeout() {
            TransportError::timeout(format!("Timed out reading response: {e}"))
        } else {
            TransportError::network(format!("Failed to read response: {e}"))
        }
    })?;

    if !status.is_success() {
        return Err(TransportError::from_status(status.as_u16(), &body));
    }
    Ok(body)
}

#[allow(clippy::needless_pass_by_value)] // used as a map_err callback
fn classify_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::timeout(format!("Request timeout: {e}"))
    } else if e.is_connect() {
        TransportError::network(format!("Connection failed: {e}"))
    } else {
        TransportError::unknown(format!("Request failed: {e}"))
    }
}
