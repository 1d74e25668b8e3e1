use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiResult;

/// What the local daemon reports about this installation. Only the
/// installation id is needed to register.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DaemonStatus {
    pub installation_id: String,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Source of the local installation status.
#[async_trait]
pub trait StatusProvider: Send + Sync {
    async fn status(&self) -> ApiResult<DaemonStatus>;
}
