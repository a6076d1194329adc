//! Jira Service MCP Server Library
//!
//! Exposes a small set of Jira operations as Model Context Protocol tools:
//!
//! - `jira_list_projects`: projects visible to the configured account
//! - `jira_get_project_details`: the raw payload of one project
//! - `jira_search_issues`: issues by project and/or issue key, paginated
//! - `jira_add_issue_comment`: append a comment to an issue
//!
//! Two Jira deployments can be configured side by side (`personal` and
//! `work`). Each call opens its own short-lived client for the environment it
//! targets; there is no caching and no retry.

use crate::config::JiraConfig;
use crate::error::JiraMcpResult;
use crate::jira_client::{ClientFactory, JiraClientFactory};
use crate::registry::{ToolContent, ToolDescriptor, ToolRegistry, ToolResult};

use async_trait::async_trait;
use pulseengine_mcp_protocol::{
    CallToolRequestParam, CallToolResult, Content, Error as McpError, Implementation,
    ListToolsResult, PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo,
    Tool, ToolsCapability,
};
use pulseengine_mcp_server::backend::SimpleBackend;
use pulseengine_mcp_server::{AuthConfig, McpServer, McpServerBuilder, ServerConfig, ServerError};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub mod config;
pub mod error;
pub mod jira_client;
pub mod registry;
pub mod tools;

pub const SERVER_NAME: &str = "Jira Service MCP Server";

const SERVER_INSTRUCTIONS: &str =
    "List Jira projects, search issues and add comments on personal and work Jira sites";

/// Jira Service MCP Server
///
/// MCP backend for the tool registry. Tool listings and calls are answered
/// by [`ToolRegistry`]; this type only converts to and from protocol types.
#[derive(Clone)]
pub struct JiraServiceServer {
    /// Loaded once at startup, read-only afterwards
    config: Arc<JiraConfig>,

    /// Dispatcher shared by every tool call
    registry: Arc<ToolRegistry>,
}

impl JiraServiceServer {
    /// Create the server from `.env`, the TOML file and environment variables
    #[instrument]
    pub async fn new() -> JiraMcpResult<Self> {
        info!("Initializing Jira Service MCP Server");

        let config = JiraConfig::load()?;
        info!(
            "Configuration loaded for environments: {:?} (default: {})",
            config.configured_environments(),
            config.default_environment
        );

        Ok(Self::with_config(config))
    }

    /// Create server with an already validated configuration
    pub fn with_config(config: JiraConfig) -> Self {
        let config = Arc::new(config);
        let clients: Arc<dyn ClientFactory> =
            Arc::new(JiraClientFactory::new(Arc::clone(&config)));
        Self::with_client_factory(config, clients)
    }

    /// Create server with a custom client factory (for testing)
    pub fn with_client_factory(config: Arc<JiraConfig>, clients: Arc<dyn ClientFactory>) -> Self {
        let registry = Arc::new(ToolRegistry::new(clients, Arc::clone(&config)));
        Self { config, registry }
    }

    /// The dispatcher behind the MCP tools
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// The static tool list announced to hosts
    pub fn tool_descriptors(&self) -> Vec<ToolDescriptor> {
        self.registry.list_tools()
    }

    /// Number of configured environments (for startup diagnostics)
    pub fn environment_count(&self) -> usize {
        self.config.configured_environments().len()
    }

    /// Serve using the STDIO transport
    pub async fn serve_stdio(self) -> Result<McpServer<Self>, ServerError> {
        let mut config = ServerConfig {
            server_info: <Self as SimpleBackend>::get_server_info(&self),
            ..Default::default()
        };

        // Local stdio process; the host owns the pipe
        let mut auth_config = AuthConfig::memory();
        auth_config.enabled = false;
        config.auth_config = auth_config;

        McpServer::new(self, config).await
    }
}

fn to_mcp_tool(descriptor: ToolDescriptor) -> Tool {
    Tool {
        name: descriptor.name,
        title: None,
        description: descriptor.description,
        input_schema: descriptor.input_schema,
        output_schema: None,
        annotations: None,
        icons: None,
    }
}

fn to_call_result(result: ToolResult) -> CallToolResult {
    let content = result
        .content
        .into_iter()
        .map(|ToolContent::Text { text }| Content::text(text))
        .collect();

    if result.is_error {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}

#[async_trait]
impl SimpleBackend for JiraServiceServer {
    type Error = McpError;
    type Config = JiraConfig;

    async fn initialize(config: Self::Config) -> Result<Self, Self::Error> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    fn get_server_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
                ..Default::default()
            },
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
        }
    }

    async fn health_check(&self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn list_tools(
        &self,
        _request: PaginatedRequestParam,
    ) -> Result<ListToolsResult, Self::Error> {
        Ok(ListToolsResult {
            tools: self
                .registry
                .list_tools()
                .into_iter()
                .map(to_mcp_tool)
                .collect(),
            next_cursor: None,
        })
    }

    /// Error-flagged results stay results; only unknown tools and malformed
    /// arguments become protocol errors.
    #[instrument(skip(self, request), fields(tool = %request.name))]
    async fn call_tool(&self, request: CallToolRequestParam) -> Result<CallToolResult, Self::Error> {
        let arguments = request.arguments.unwrap_or(Value::Null);

        match self.registry.call_tool(&request.name, arguments).await {
            Ok(result) => Ok(to_call_result(result)),
            Err(e) => {
                warn!(
                    code = e.error_code(),
                    data = ?e.error_data(),
                    "{} rejected: {}",
                    request.name,
                    e
                );
                Err(e.into())
            }
        }
    }
}

impl McpServerBuilder for JiraServiceServer {}
