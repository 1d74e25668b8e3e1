//! In-crate doubles for the network boundary.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::status::{DaemonStatus, StatusProvider};
use crate::transport::{ApiRequest, Transport, TransportFailure};

type Route = (String, Result<Value, TransportFailure>);

/// Transport answering from a script of `(path suffix, response)` pairs and
/// recording every request. A scripted route is consumed when used unless it
/// is the last one left for that path.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<VecDeque<Route>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, path: &str, body: Value) {
        self.routes
            .lock()
            .unwrap()
            .push_back((path.to_string(), Ok(body)));
    }

    pub fn succeed(&self, path: &str, data: Value) {
        self.respond(path, json!({"success": true, "data": data}));
    }

    pub fn fail(&self, path: &str, message: &str) {
        self.respond(path, json!({"success": false, "error": {"message": message}}));
    }

    pub fn break_transport(&self, path: &str) {
        self.routes.lock().unwrap().push_back((
            path.to_string(),
            Err(TransportFailure::new("connection refused")),
        ));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests whose URL path ends with `path`.
    pub fn count(&self, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| path_of(&r.url).ends_with(path))
            .count()
    }
}

fn path_of(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportFailure> {
        let path = path_of(&request.url).to_string();
        self.requests.lock().unwrap().push(request);
        tokio::task::yield_now().await;

        let mut routes = self.routes.lock().unwrap();
        let matching: Vec<usize> = routes
            .iter()
            .enumerate()
            .filter(|(_, (p, _))| path.ends_with(p.as_str()))
            .map(|(i, _)| i)
            .collect();
        match matching.as_slice() {
            [] => Err(TransportFailure::new(format!("no scripted response for {}", path))),
            [only] => routes[*only].1.clone(),
            [first, ..] => routes.remove(*first).map(|(_, r)| r).unwrap(),
        }
    }
}

/// Status provider returning a fixed installation id, or failing.
pub struct FixedStatus(pub Option<&'static str>);

#[async_trait]
impl StatusProvider for FixedStatus {
    async fn status(&self) -> ApiResult<DaemonStatus> {
        match self.0 {
            Some(id) => Ok(DaemonStatus {
                installation_id: id.to_string(),
                extra: Default::default(),
            }),
            None => Err(ApiError::Status("daemon not running".to_string())),
        }
    }
}
