//! Search issues tool
//!
//! Looks issues up by project and/or issue key. The two filters are turned
//! into a single JQL expression; pagination is a plain offset the caller
//! advances between calls.

use crate::config::{Environment, JiraConfig};
use crate::error::{JiraMcpError, JiraMcpResult};
use crate::jira_client::{ClientFactory, IssueSummary};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// Page size used when the caller does not pass `number`
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page a caller may request
pub const MAX_PAGE_SIZE: u32 = 50;

/// Parameters for the jira_search_issues tool
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SearchIssuesParams {
    /// Issue key to look up (optional, but one of issue_id/project_id is required)
    /// Examples: "SID-1"
    pub issue_id: Option<String>,

    /// Project key to search in (optional, but one of issue_id/project_id is required)
    /// Examples: "SID"
    pub project_id: Option<String>,

    /// Maximum issues to return (optional, 1-50, default: 10)
    pub number: Option<u32>,

    /// Zero-based offset into the result set (optional, default: 0)
    pub cursor: Option<u32>,

    /// Jira environment to query: "personal" or "work" (optional, server default)
    pub environment: Option<Environment>,
}

/// Build the JQL filter for a project and/or issue lookup.
///
/// Blank values count as absent. At least one filter must remain.
pub fn build_filter(issue_id: Option<&str>, project_id: Option<&str>) -> JiraMcpResult<String> {
    let clauses: Vec<String> = [("project", project_id), ("issue", issue_id)]
        .into_iter()
        .filter_map(|(field, value)| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| format!("{} = {}", field, v))
        })
        .collect();

    if clauses.is_empty() {
        return Err(JiraMcpError::invalid_param(
            "issue_id",
            "Either project_id or issue_id must be provided",
        ));
    }

    Ok(clauses.join(" AND "))
}

/// Implementation of the jira_search_issues tool
pub struct SearchIssuesTool {
    clients: Arc<dyn ClientFactory>,
    config: Arc<JiraConfig>,
}

impl SearchIssuesTool {
    pub fn new(clients: Arc<dyn ClientFactory>, config: Arc<JiraConfig>) -> Self {
        Self { clients, config }
    }

    /// Validate search parameters, returning the JQL they describe
    pub fn validate_params(&self, params: &SearchIssuesParams) -> JiraMcpResult<String> {
        if let Some(number) = params.number {
            if number == 0 || number > MAX_PAGE_SIZE {
                return Err(JiraMcpError::invalid_param(
                    "number",
                    format!("number must be between 1 and {}", MAX_PAGE_SIZE),
                ));
            }
        }

        build_filter(params.issue_id.as_deref(), params.project_id.as_deref())
    }

    /// Execute the jira_search_issues tool
    #[instrument(skip(self), fields(
        issue_id = params.issue_id.as_deref(),
        project_id = params.project_id.as_deref(),
    ))]
    pub async fn execute(&self, params: SearchIssuesParams) -> JiraMcpResult<Vec<IssueSummary>> {
        let jql = self.validate_params(&params)?;
        let max_results = params.number.unwrap_or(DEFAULT_PAGE_SIZE);
        let start_at = params.cursor.unwrap_or(0);

        let environment = params
            .environment
            .unwrap_or(self.config.default_environment);
        let client = self.clients.make_client(environment)?;

        let issues = client.search(&jql, start_at, max_results).await?;

        info!(
            "Search '{}' on {} returned {} issues",
            jql,
            environment,
            issues.len()
        );
        Ok(issues)
    }
}
