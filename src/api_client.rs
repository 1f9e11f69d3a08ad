use async_trait::async_trait;
use dashboard::{ApiRequest, ApiResponse, DashboardError, Result, Transport};
use gloo_net::http::Request;

/// Same-origin requests through the browser's `fetch`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

#[async_trait(?Send)]
impl Transport for FetchTransport {
    async fn get(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut builder = Request::get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let response = builder.send().await.map_err(|e| {
            let error_msg = format!("{}", e);
            log::error!("GET {} - Request failed: {}", request.url, error_msg);
            DashboardError::Network(error_msg)
        })?;

        let status = response.status();
        log::trace!("GET {} - HTTP {}, reading body", request.url, status);

        let body = response.text().await.map_err(|e| {
            let error_msg = format!("Failed to read response body: {}", e);
            log::error!("GET {} - {}", request.url, error_msg);
            DashboardError::Network(error_msg)
        })?;

        Ok(ApiResponse::new(status, body))
    }
}
