//! Project details tool
//!
//! Fetches a single project by key or id and returns Jira's payload as-is.

use crate::config::{Environment, JiraConfig};
use crate::error::{JiraMcpError, JiraMcpResult};
use crate::jira_client::{ClientFactory, ProjectDetail};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// Parameters for the jira_get_project_details tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetProjectDetailsParams {
    /// Project key or numeric id (required)
    /// Examples: "SID", "10000"
    pub project_id: String,

    /// Jira environment to query: "personal" or "work" (optional, server default)
    pub environment: Option<Environment>,
}

/// Implementation of the jira_get_project_details tool
pub struct GetProjectDetailsTool {
    clients: Arc<dyn ClientFactory>,
    config: Arc<JiraConfig>,
}

impl GetProjectDetailsTool {
    pub fn new(clients: Arc<dyn ClientFactory>, config: Arc<JiraConfig>) -> Self {
        Self { clients, config }
    }

    pub fn validate_params(&self, params: &GetProjectDetailsParams) -> JiraMcpResult<()> {
        if params.project_id.trim().is_empty() {
            return Err(JiraMcpError::invalid_param(
                "project_id",
                "project_id is required",
            ));
        }
        Ok(())
    }

    /// Execute the jira_get_project_details tool
    #[instrument(skip(self), fields(project_id = params.project_id.as_str()))]
    pub async fn execute(&self, params: GetProjectDetailsParams) -> JiraMcpResult<ProjectDetail> {
        self.validate_params(&params)?;

        let environment = params
            .environment
            .unwrap_or(self.config.default_environment);
        let client = self.clients.make_client(environment)?;

        let detail = client.project(params.project_id.trim()).await?;

        info!(
            "Fetched project {} from {} ({} fields)",
            params.project_id,
            environment,
            detail.len()
        );
        Ok(detail)
    }
}
