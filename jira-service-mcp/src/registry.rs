//! Tool registry and dispatcher
//!
//! Declares the four Jira tools and routes `(name, arguments)` pairs to them.
//! Remote failures come back as error-flagged [`ToolResult`]s; unknown tools
//! and malformed arguments are returned as `Err` before any client is opened.

use crate::config::JiraConfig;
use crate::error::{JiraMcpError, JiraMcpResult};
use crate::jira_client::ClientFactory;
use crate::tools::{
    AddIssueCommentParams, AddIssueCommentTool, GetProjectDetailsParams, GetProjectDetailsTool,
    ListProjectsParams, ListProjectsTool, SearchIssuesParams, SearchIssuesTool,
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MAX_PROJECTS,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

pub const LIST_PROJECTS: &str = "jira_list_projects";
pub const GET_PROJECT_DETAILS: &str = "jira_get_project_details";
pub const SEARCH_ISSUES: &str = "jira_search_issues";
pub const ADD_ISSUE_COMMENT: &str = "jira_add_issue_comment";

/// Name, description and argument schema of a callable tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// One block of tool output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    Text { text: String },
}

/// Response envelope for a tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub is_error: bool,
    pub content: Vec<ToolContent>,
}

impl ToolResult {
    /// Successful result carrying `value` as pretty-printed JSON
    pub fn json<T: Serialize>(value: &T) -> JiraMcpResult<Self> {
        Ok(Self {
            is_error: false,
            content: vec![ToolContent::Text {
                text: serde_json::to_string_pretty(value)?,
            }],
        })
    }

    /// Error-flagged result with a human-readable message
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            is_error: true,
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
        }
    }

    /// All text blocks joined by newlines
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(|ToolContent::Text { text }| text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn environment_schema(description: &str) -> Value {
    json!({
        "type": "string",
        "enum": ["personal", "work"],
        "description": description,
    })
}

/// The static tool list, in a fixed order
fn tool_descriptors() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: LIST_PROJECTS.to_string(),
            description: "List all Jira projects".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "environment": environment_schema(
                        "Jira environment to query (defaults to the server's default environment)"
                    ),
                    "number": {
                        "type": "integer",
                        "description": "Maximum number of projects to list (default: all)",
                        "minimum": 1,
                        "maximum": MAX_PROJECTS,
                    },
                },
                "additionalProperties": false,
            }),
        },
        ToolDescriptor {
            name: GET_PROJECT_DETAILS.to_string(),
            description: "Get details of a Jira project".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "project_id": {
                        "type": "string",
                        "description": "The key or ID of the Jira project",
                    },
                    "environment": environment_schema(
                        "Jira environment to query (defaults to the server's default environment)"
                    ),
                },
                "required": ["project_id"],
                "additionalProperties": false,
            }),
        },
        ToolDescriptor {
            name: SEARCH_ISSUES.to_string(),
            description: "Search Jira issues by project and/or issue key".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "issue_id": {
                        "type": "string",
                        "description": "The key of the Jira issue, e.g. SID-1",
                    },
                    "project_id": {
                        "type": "string",
                        "description": "The key of the Jira project, e.g. SID",
                    },
                    "number": {
                        "type": "integer",
                        "description": "Maximum number of issues to return",
                        "minimum": 1,
                        "maximum": MAX_PAGE_SIZE,
                        "default": DEFAULT_PAGE_SIZE,
                    },
                    "cursor": {
                        "type": "integer",
                        "description": "Zero-based offset of the first issue to return",
                        "minimum": 0,
                        "default": 0,
                    },
                    "environment": environment_schema(
                        "Jira environment to query (defaults to the server's default environment)"
                    ),
                },
                "anyOf": [
                    {"required": ["issue_id"]},
                    {"required": ["project_id"]},
                ],
                "additionalProperties": false,
            }),
        },
        ToolDescriptor {
            name: ADD_ISSUE_COMMENT.to_string(),
            description: "Add a comment to a Jira issue".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "environment": environment_schema("Jira environment that holds the issue"),
                    "issue_id": {
                        "type": "string",
                        "description": "The key of the Jira issue, e.g. SID-1",
                    },
                    "comment": {
                        "type": "string",
                        "description": "The comment text to add",
                    },
                },
                "required": ["environment", "issue_id", "comment"],
                "additionalProperties": false,
            }),
        },
    ]
}

/// Decode tool arguments, treating `null` as an empty object
fn parse_arguments<T: DeserializeOwned>(arguments: Value) -> JiraMcpResult<T> {
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        Value::Object(map) => Value::Object(map),
        other => {
            return Err(JiraMcpError::invalid_param(
                "arguments",
                format!("expected a JSON object, got {}", other),
            ))
        }
    };

    serde_json::from_value(arguments)
        .map_err(|e| JiraMcpError::invalid_param("arguments", e.to_string()))
}

/// Routes tool calls to the Jira tools
pub struct ToolRegistry {
    list_projects: ListProjectsTool,
    project_details: GetProjectDetailsTool,
    search_issues: SearchIssuesTool,
    add_comment: AddIssueCommentTool,
}

impl ToolRegistry {
    pub fn new(clients: Arc<dyn ClientFactory>, config: Arc<JiraConfig>) -> Self {
        Self {
            list_projects: ListProjectsTool::new(Arc::clone(&clients), Arc::clone(&config)),
            project_details: GetProjectDetailsTool::new(Arc::clone(&clients), Arc::clone(&config)),
            search_issues: SearchIssuesTool::new(Arc::clone(&clients), config),
            add_comment: AddIssueCommentTool::new(clients),
        }
    }

    /// Descriptors of every tool this registry can dispatch
    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        tool_descriptors()
    }

    /// Run the tool called `name` with `arguments`
    #[instrument(skip(self, arguments))]
    pub async fn call_tool(&self, name: &str, arguments: Value) -> JiraMcpResult<ToolResult> {
        debug!("Dispatching tool call");

        match name {
            LIST_PROJECTS => {
                let params: ListProjectsParams = parse_arguments(arguments)?;
                self.list_projects.validate_params(&params)?;
                Self::finish("listing projects", self.list_projects.execute(params).await)
            }
            GET_PROJECT_DETAILS => {
                let params: GetProjectDetailsParams = parse_arguments(arguments)?;
                self.project_details.validate_params(&params)?;
                Self::finish(
                    "getting project details",
                    self.project_details.execute(params).await,
                )
            }
            SEARCH_ISSUES => {
                let params: SearchIssuesParams = parse_arguments(arguments)?;
                self.search_issues.validate_params(&params)?;
                Self::finish("searching issues", self.search_issues.execute(params).await)
            }
            ADD_ISSUE_COMMENT => {
                let params: AddIssueCommentParams = parse_arguments(arguments)?;
                self.add_comment.validate_params(&params)?;
                Self::finish("adding comment", self.add_comment.execute(params).await)
            }
            unknown => {
                warn!("Rejected call to unknown tool '{}'", unknown);
                Err(JiraMcpError::unknown_tool(unknown))
            }
        }
    }

    /// Wrap an operation outcome in the tool result envelope
    fn finish<T: Serialize>(action: &str, outcome: JiraMcpResult<T>) -> JiraMcpResult<ToolResult> {
        match outcome {
            Ok(value) => ToolResult::json(&value),
            Err(e) if e.is_remote() || matches!(e, JiraMcpError::Configuration { .. }) => {
                error!(category = e.category(), "Error {}: {}", action, e);
                Ok(ToolResult::error(format!("Error {}: {}", action, e)))
            }
            Err(e) => Err(e),
        }
    }
}
