//! The request/response command surface used by the application shell.
//!
//! 应用外壳使用的请求/响应命令接口。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A command invocation from the shell, e.g. `makeCall {"number": "..."}`.
///
/// 来自应用外壳的命令调用，例如 `makeCall {"number": "..."}`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    /// A call without arguments.
    pub fn bare(method: impl Into<String>) -> Self {
        Self::new(method, Value::Null)
    }

    /// Reads a string argument by name.
    pub fn argument_str(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(Value::as_str)
    }
}

/// The single reply to a [`MethodCall`].
///
/// 对 [`MethodCall`] 的唯一回复。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MethodResponse {
    Success { value: Value },
    Error { code: String, message: String },
    NotImplemented,
}

impl MethodResponse {
    pub fn success(value: impl Into<Value>) -> Self {
        MethodResponse::Success {
            value: value.into(),
        }
    }

    /// The boolean result, when this is a boolean success.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MethodResponse::Success { value } => value.as_bool(),
            _ => None,
        }
    }

    /// The error code, when this is an error.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            MethodResponse::Error { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<Error> for MethodResponse {
    fn from(err: Error) -> Self {
        MethodResponse::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<Result<bool>> for MethodResponse {
    fn from(result: Result<bool>) -> Self {
        match result {
            Ok(value) => MethodResponse::success(value),
            Err(e) => e.into(),
        }
    }
}
