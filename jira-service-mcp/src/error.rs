//! Error types and handling for the Jira service MCP server
//!
//! Errors fall into three groups: configuration problems (fatal at startup),
//! dispatch faults (unknown tool or malformed arguments, rejected before any
//! remote call) and remote operation failures reported by the Jira API.

use pulseengine_mcp_protocol::{Error as McpError, ErrorCode};
use serde_json::Value;
use thiserror::Error;

/// Custom error types for the Jira service MCP server
#[derive(Debug, Error)]
pub enum JiraMcpError {
    /// Missing or invalid configuration (-32001)
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Authentication failures (-32002)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Network errors, including request timeouts (-32003)
    #[error("Network error: {message}")]
    Network { message: String },

    /// Permission denied errors (-32004)
    #[error("Permission denied: {message}")]
    Permission { message: String },

    /// Resource not found errors (-32005)
    #[error("Not found: {resource} '{key}' not found{}", remote_detail(.detail))]
    NotFound {
        resource: String,
        key: String,
        detail: Option<String>,
    },

    /// Invalid tool argument errors (-32602)
    #[error("Invalid parameter: {parameter} - {message}")]
    InvalidParameter { parameter: String, message: String },

    /// Tool name not present in the registry (-32601)
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    /// Rate limit exceeded errors (-32007)
    #[error("Rate limit exceeded: {message}")]
    RateLimit { message: String },

    /// Any other failure surfaced by the Jira API (-32008)
    #[error("JIRA API error: {message}")]
    Remote { message: String },
}

impl JiraMcpError {
    /// Get the MCP JSON-RPC error code for this error
    pub fn error_code(&self) -> i32 {
        match self {
            JiraMcpError::Configuration { .. } => -32001,
            JiraMcpError::Authentication { .. } => -32002,
            JiraMcpError::Network { .. } => -32003,
            JiraMcpError::Permission { .. } => -32004,
            JiraMcpError::NotFound { .. } => -32005,
            JiraMcpError::InvalidParameter { .. } => -32602,
            JiraMcpError::UnknownTool { .. } => -32601,
            JiraMcpError::RateLimit { .. } => -32007,
            JiraMcpError::Remote { .. } => -32008,
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            JiraMcpError::Configuration { .. } => "configuration",
            JiraMcpError::Authentication { .. } => "authentication",
            JiraMcpError::Network { .. } => "network",
            JiraMcpError::Permission { .. } => "permission",
            JiraMcpError::NotFound { .. } => "not_found",
            JiraMcpError::InvalidParameter { .. } => "invalid_parameter",
            JiraMcpError::UnknownTool { .. } => "unknown_tool",
            JiraMcpError::RateLimit { .. } => "rate_limit",
            JiraMcpError::Remote { .. } => "remote",
        }
    }

    /// True for failures reported by (or while talking to) the Jira API.
    ///
    /// These are converted into error-flagged tool results instead of being
    /// raised to the transport.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            JiraMcpError::Authentication { .. }
                | JiraMcpError::Network { .. }
                | JiraMcpError::Permission { .. }
                | JiraMcpError::NotFound { .. }
                | JiraMcpError::RateLimit { .. }
                | JiraMcpError::Remote { .. }
        )
    }

    /// Get additional error data for MCP error responses
    pub fn error_data(&self) -> Option<Value> {
        let mut data = serde_json::Map::new();
        data.insert(
            "category".to_string(),
            Value::String(self.category().to_string()),
        );

        match self {
            JiraMcpError::NotFound { resource, key, .. } => {
                data.insert("resource".to_string(), Value::String(resource.clone()));
                data.insert("key".to_string(), Value::String(key.clone()));
            }
            JiraMcpError::InvalidParameter { parameter, .. } => {
                data.insert("parameter".to_string(), Value::String(parameter.clone()));
            }
            JiraMcpError::UnknownTool { name } => {
                data.insert("tool".to_string(), Value::String(name.clone()));
            }
            _ => {}
        }

        Some(Value::Object(data))
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        JiraMcpError::Configuration {
            message: message.into(),
        }
    }

    /// Create an authentication error
    pub fn auth(message: impl Into<String>) -> Self {
        JiraMcpError::Authentication {
            message: message.into(),
        }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        JiraMcpError::Network {
            message: message.into(),
        }
    }

    /// Create a permission error
    pub fn permission(message: impl Into<String>) -> Self {
        JiraMcpError::Permission {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>, key: impl Into<String>) -> Self {
        JiraMcpError::NotFound {
            resource: resource.into(),
            key: key.into(),
            detail: None,
        }
    }

    /// Create a not found error that keeps the text Jira sent back
    pub fn not_found_with(
        resource: impl Into<String>,
        key: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        JiraMcpError::NotFound {
            resource: resource.into(),
            key: key.into(),
            detail: Some(detail.into()),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_param(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        JiraMcpError::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create an unknown tool error
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        JiraMcpError::UnknownTool { name: name.into() }
    }

    /// Create a rate limit error
    pub fn rate_limit(message: impl Into<String>) -> Self {
        JiraMcpError::RateLimit {
            message: message.into(),
        }
    }

    /// Create a generic remote error
    pub fn remote(message: impl Into<String>) -> Self {
        JiraMcpError::Remote {
            message: message.into(),
        }
    }

    /// Map a gouqi error raised while operating on a named resource.
    ///
    /// Keeps the resource key in not-found and permission messages so the
    /// caller can tell which project or issue was rejected.
    pub fn from_gouqi(err: gouqi::Error, resource: &str, key: &str) -> Self {
        match err {
            gouqi::Error::NotFound => {
                JiraMcpError::not_found_with(resource, key, gouqi::Error::NotFound.to_string())
            }
            other => {
                let text = other.to_string();
                if text.contains("404") || text.contains("Not Found") {
                    JiraMcpError::not_found_with(resource, key, text)
                } else if text.contains("403") || text.contains("Forbidden") {
                    JiraMcpError::permission(format!(
                        "access to {} '{}' denied: {}",
                        resource, key, text
                    ))
                } else {
                    JiraMcpError::from(other)
                }
            }
        }
    }
}

fn remote_detail(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|text| format!(": {}", text))
        .unwrap_or_default()
}

/// Convert from gouqi errors to JiraMcpError
impl From<gouqi::Error> for JiraMcpError {
    fn from(err: gouqi::Error) -> Self {
        match err {
            gouqi::Error::Http(_) => JiraMcpError::network(format!("HTTP error: {}", err)),
            gouqi::Error::IO(_) => JiraMcpError::network(format!("IO error: {}", err)),
            gouqi::Error::Serde(_) => {
                JiraMcpError::remote(format!("Unexpected response payload: {}", err))
            }
            gouqi::Error::Unauthorized => JiraMcpError::auth("JIRA rejected the credentials"),
            gouqi::Error::NotFound => JiraMcpError::not_found("resource", "unknown"),
            other => {
                let text = other.to_string();
                if text.contains("429") || text.to_lowercase().contains("rate limit") {
                    JiraMcpError::rate_limit(text)
                } else {
                    JiraMcpError::remote(text)
                }
            }
        }
    }
}

/// Convert to the protocol error returned to MCP hosts
impl From<JiraMcpError> for McpError {
    fn from(err: JiraMcpError) -> Self {
        let code = match err {
            JiraMcpError::UnknownTool { .. } => ErrorCode::MethodNotFound,
            JiraMcpError::InvalidParameter { .. } | JiraMcpError::Configuration { .. } => {
                ErrorCode::InvalidParams
            }
            _ => ErrorCode::InternalError,
        };

        match err.error_data() {
            Some(data) => McpError::with_data(code, err.to_string(), data),
            None => McpError::new(code, err.to_string()),
        }
    }
}

/// Convert from serde_json errors
impl From<serde_json::Error> for JiraMcpError {
    fn from(err: serde_json::Error) -> Self {
        JiraMcpError::remote(format!("JSON error: {}", err))
    }
}

/// Result type alias for Jira service operations
pub type JiraMcpResult<T> = Result<T, JiraMcpError>;
