use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::base::{ApiRequest, HttpMethod, Transport, TransportFailure};

/// reqwest-backed transport.
#[derive(Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportFailure> {
        debug!(method = %request.method, url = %request.url, "sending API request");

        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(*name, *value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportFailure::new(format!("Error sending request: {}", e)))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportFailure::new(format!("Error reading response body: {}", e)))?;

        serde_json::from_str(&body).map_err(|e| {
            TransportFailure::new(format!("Error parsing JSON (status {}): {}", status, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::base::{ACCEPT_JSON, CONTENT_TYPE_FORM};
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn test_post_sends_form_body_and_headers() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/user/new")
            .match_header("accept", "application/json")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body("auth_token=&language=en")
            .with_status(200)
            .with_body(r#"{"success": true, "data": {"auth_token": "t"}}"#)
            .create_async()
            .await;

        let request = ApiRequest {
            method: HttpMethod::Post,
            url: format!("{}/user/new", server.url()),
            headers: vec![ACCEPT_JSON, CONTENT_TYPE_FORM],
            body: Some("auth_token=&language=en".to_string()),
        };
        let body = HttpTransport::new().send(request).await.unwrap();

        m.assert_async().await;
        assert_eq!(body["data"]["auth_token"], json!("t"));
    }

    #[tokio::test]
    async fn test_error_status_with_json_body_is_returned() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/user/me")
            .match_query(Matcher::UrlEncoded("auth_token".into(), "x".into()))
            .with_status(403)
            .with_body(r#"{"success": false, "error": "forbidden"}"#)
            .create_async()
            .await;

        let request = ApiRequest {
            method: HttpMethod::Get,
            url: format!("{}/user/me?auth_token=x", server.url()),
            headers: vec![ACCEPT_JSON],
            body: None,
        };
        let body = HttpTransport::new().send(request).await.unwrap();
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn test_non_json_body_is_a_transport_failure() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/lbc/exchange_rate")
            .with_status(502)
            .with_body("Bad Gateway")
            .create_async()
            .await;

        let request = ApiRequest {
            method: HttpMethod::Get,
            url: format!("{}/lbc/exchange_rate", server.url()),
            headers: vec![ACCEPT_JSON],
            body: None,
        };
        let err = HttpTransport::new().send(request).await.unwrap_err();
        assert!(err.detail.contains("Error parsing JSON"));
    }
}
