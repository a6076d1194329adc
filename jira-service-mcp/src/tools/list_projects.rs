//! List projects tool
//!
//! Returns the id, key and name of every project visible to the configured
//! account, in the order Jira reports them.

use crate::config::{Environment, JiraConfig};
use crate::error::{JiraMcpError, JiraMcpResult};
use crate::jira_client::{ClientFactory, ProjectSummary};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// Upper bound for the optional `number` argument
pub const MAX_PROJECTS: u32 = 100;

/// Parameters for the jira_list_projects tool
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListProjectsParams {
    /// Jira environment to query: "personal" or "work" (optional, server default)
    pub environment: Option<Environment>,

    /// Maximum number of projects to return (optional, 1-100, default: all)
    pub number: Option<u32>,
}

/// Implementation of the jira_list_projects tool
pub struct ListProjectsTool {
    clients: Arc<dyn ClientFactory>,
    config: Arc<JiraConfig>,
}

impl ListProjectsTool {
    pub fn new(clients: Arc<dyn ClientFactory>, config: Arc<JiraConfig>) -> Self {
        Self { clients, config }
    }

    /// Reject out-of-range limits before any client is opened
    pub fn validate_params(&self, params: &ListProjectsParams) -> JiraMcpResult<()> {
        if let Some(number) = params.number {
            if number == 0 || number > MAX_PROJECTS {
                return Err(JiraMcpError::invalid_param(
                    "number",
                    format!("number must be between 1 and {}", MAX_PROJECTS),
                ));
            }
        }
        Ok(())
    }

    /// Execute the jira_list_projects tool
    #[instrument(skip(self))]
    pub async fn execute(&self, params: ListProjectsParams) -> JiraMcpResult<Vec<ProjectSummary>> {
        self.validate_params(&params)?;

        let environment = params
            .environment
            .unwrap_or(self.config.default_environment);
        let client = self.clients.make_client(environment)?;

        let mut projects = client.projects().await?;
        if let Some(number) = params.number {
            projects.truncate(number as usize);
        }

        info!("Listing {} projects from {}", projects.len(), environment);
        Ok(projects)
    }
}
