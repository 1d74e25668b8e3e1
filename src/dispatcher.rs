//! Builds, sends and classifies a single authenticated API call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::error::{ApiError, ApiResult};
use crate::token_store::TokenStore;
use crate::transport::base::{ACCEPT_JSON, CONTENT_TYPE_FORM, CONTENT_TYPE_JSON};
use crate::transport::{ApiRequest, HttpMethod, Transport, TransportFailure};
use crate::utils::log_throttle::LogThrottle;
use crate::utils::value::params_to_pairs;

/// Calls that still go out while the API is disabled.
const ALLOWED_WHILE_DISABLED: &[(&str, &str)] = &[("discover", "list")];

const DISABLED_LOG_WINDOW: Duration = Duration::from_secs(30);

/// One call to `{base}{resource}/{action}`. Built per call, never stored.
#[derive(Debug, Clone)]
pub struct ApiCall {
    pub resource: String,
    pub action: String,
    pub params: Map<String, Value>,
    pub method: String,
    /// Internal calls that must work even while the API is disabled.
    pub bypass_disabled: bool,
}

impl ApiCall {
    pub fn new(resource: impl Into<String>, action: impl Into<String>) -> Self {
        ApiCall {
            resource: resource.into(),
            action: action.into(),
            params: Map::new(),
            method: "get".to_string(),
            bypass_disabled: false,
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn params(mut self, params: Map<String, Value>) -> Self {
        self.params.extend(params);
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn bypass_disabled(mut self) -> Self {
        self.bypass_disabled = true;
        self
    }

    fn is_allowed_while_disabled(&self) -> bool {
        self.bypass_disabled
            || ALLOWED_WHILE_DISABLED
                .iter()
                .any(|(r, a)| *r == self.resource && *a == self.action)
    }
}

/// Outcome of one request, produced once and consumed immediately.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifiedResponse {
    Success(Value),
    ApplicationError { message: String, data: Option<Value> },
    TransportError(String),
}

impl ClassifiedResponse {
    /// Interpret the `{success, data, error}` envelope.
    pub fn classify(response: Result<Value, TransportFailure>) -> Self {
        let body = match response {
            Ok(body) => body,
            Err(failure) => return ClassifiedResponse::TransportError(failure.detail),
        };
        let envelope = match Envelope::deserialize(body) {
            Ok(envelope) => envelope,
            Err(e) => {
                return ClassifiedResponse::TransportError(format!("Malformed envelope: {}", e))
            }
        };

        if envelope.succeeded() {
            return ClassifiedResponse::Success(envelope.data);
        }
        match envelope.error {
            Some(ErrorBody::Detailed { message, data }) => {
                ClassifiedResponse::ApplicationError { message, data }
            }
            Some(ErrorBody::Message(message)) => ClassifiedResponse::ApplicationError {
                message,
                data: None,
            },
            Some(ErrorBody::Other(other)) => ClassifiedResponse::ApplicationError {
                message: other.to_string(),
                data: Some(other),
            },
            None => ClassifiedResponse::ApplicationError {
                message: "Unknown API error".to_string(),
                data: None,
            },
        }
    }

    /// Collapse into the caller-facing result. Transport detail stops here.
    pub fn into_result(self) -> ApiResult<Value> {
        match self {
            ClassifiedResponse::Success(data) => Ok(data),
            ClassifiedResponse::ApplicationError { message, data } => {
                Err(ApiError::application(message, data))
            }
            ClassifiedResponse::TransportError(detail) => {
                warn!(detail = detail.as_str(), "internal API call failed");
                Err(ApiError::Transport)
            }
        }
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    success: Value,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Message(String),
    Detailed {
        message: String,
        #[serde(default)]
        data: Option<Value>,
    },    /// Any other shape, reported as its JSON text.
    Other(Value),
}

impl Envelope {
    /// `success` read by truthiness: absent, `null`, `false`, `0` and `""`
    /// all count as failure.
    fn succeeded(&self) -> bool {
        match &self.success {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }
}

struct Inner {
    base_url: String,
    enabled: AtomicBool,
    tokens: TokenStore,
    transport: Arc<dyn Transport>,
    throttle: LogThrottle,
}

/// Sends API calls with the current auth token. Cheap to clone.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl Dispatcher {
    /// `base_url` must already end with a single slash.
    pub fn new(
        base_url: impl Into<String>,
        enabled: bool,
        tokens: TokenStore,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Dispatcher {
            inner: Arc::new(Inner {
                base_url: base_url.into(),
                enabled: AtomicBool::new(enabled),
                tokens,
                transport,
                throttle: LogThrottle::new(DISABLED_LOG_WINDOW),
            }),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.inner.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.inner.tokens
    }

    /// Send `call` and return the `data` payload of a successful response.
    pub async fn call(&self, call: ApiCall) -> ApiResult<Value> {
        if !self.is_enabled() && !call.is_allowed_while_disabled() {
            if let Some(suppressed_count) = self.inner.throttle.should_emit("api.disabled") {
                warn!(
                    resource = call.resource.as_str(),
                    action = call.action.as_str(),
                    suppressed_count,
                    "Internal API disabled"
                );
            }
            return Err(ApiError::Disabled);
        }
        let method: HttpMethod = call.method.parse()?;

        let token = self.inner.tokens.get_token().await?;

        // Token first, caller params spread over it: a caller-supplied
        // `auth_token` replaces the real one.
        let mut params = Map::new();
        params.insert(
            "auth_token".to_string(),
            Value::from(token.as_ref().map(|t| t.as_str()).unwrap_or_default()),
        );
        params.extend(call.params);

        let request = self.build_request(method, &call.resource, &call.action, &params);
        debug!(
            resource = call.resource.as_str(),
            action = call.action.as_str(),
            method = %method,
            "dispatching API call"
        );
        let response = self.inner.transport.send(request).await;
        ClassifiedResponse::classify(response).into_result()
    }

    /// Like [`Dispatcher::call`], decoding `data` into `T`. A payload that
    /// does not decode counts as a transport failure.
    pub async fn call_as<T: DeserializeOwned>(&self, call: ApiCall) -> ApiResult<T> {
        let data = self.call(call).await?;
        serde_json::from_value(data).map_err(|e| {
            warn!(error = %e, "unexpected API payload");
            ApiError::Transport
        })
    }

    fn build_request(
        &self,
        method: HttpMethod,
        resource: &str,
        action: &str,
        params: &Map<String, Value>,
    ) -> ApiRequest {
        let endpoint = format!("{}{}/{}", self.inner.base_url, resource, action);
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params_to_pairs(params))
            .finish();

        match method {
            HttpMethod::Get => ApiRequest {
                method,
                url: format!("{}?{}", endpoint, encoded),
                headers: vec![ACCEPT_JSON, CONTENT_TYPE_JSON],
                body: None,
            },
            HttpMethod::Post => ApiRequest {
                method,
                url: endpoint,
                headers: vec![ACCEPT_JSON, CONTENT_TYPE_FORM],
                body: Some(encoded),
            },
        }
    }
}
