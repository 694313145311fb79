//! DSM Web API wire format
//!
//! Every response is wrapped in the same envelope:
//!
//! ```json
//! { "success": true, "data": { ... } }
//! { "success": false, "error": { "code": 105 } }
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use sf_error::{Result, SynofanError};

pub const AUTH_PATH: &str = "/webapi/auth.cgi";
pub const ENTRY_PATH: &str = "/webapi/entry.cgi";

pub const AUTH_VERSION: &str = "7";
pub const CORE_VERSION: &str = "1";

/// Maximum response body accepted from the appliance (64KB)
pub const MAX_RESPONSE_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope {
    pub success: bool,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub code: i64,
}

/// `SYNO.API.Auth login` payload
#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    pub sid: String,
}

/// `SYNO.Core.Hardware.FanSpeed get` payload (only the token is used)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenData {
    #[serde(default, rename = "SynoToken")]
    pub syno_token: Option<String>,
}

impl ApiEnvelope {
    /// Parse a raw response body
    pub fn parse(api: &str, body: &[u8]) -> Result<Self> {
        if body.len() > MAX_RESPONSE_SIZE {
            return Err(SynofanError::malformed(
                api,
                format!("response too large ({} bytes)", body.len()),
            ));
        }
        serde_json::from_slice(body).map_err(|e| SynofanError::malformed(api, e.to_string()))
    }

    /// Fail unless `success` is set
    pub fn check(self, api: &str) -> Result<Self> {
        if self.success {
            return Ok(self);
        }
        match self.error {
            Some(err) => Err(SynofanError::ApiStatus {
                api: api.to_string(),
                code: err.code,
            }),
            None => Err(SynofanError::malformed(api, "success=false without error code")),
        }
    }

    /// Decode `data` into `T`
    pub fn data<T: DeserializeOwned>(self, api: &str) -> Result<T> {
        let data = self
            .data
            .ok_or_else(|| SynofanError::malformed(api, "missing data"))?;
        serde_json::from_value(data).map_err(|e| SynofanError::malformed(api, e.to_string()))
    }
}
