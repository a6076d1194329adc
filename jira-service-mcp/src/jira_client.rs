//! JIRA client wrapper around gouqi
//!
//! Exposes the four remote calls the tools need behind the [`JiraApi`] trait
//! and builds a fresh, short-lived authenticated client per operation through
//! a [`ClientFactory`].

use crate::config::{Environment, JiraConfig};
use crate::error::{JiraMcpError, JiraMcpResult};
use async_trait::async_trait;
use gouqi::issues::AddComment;
use gouqi::r#async::Jira;
use gouqi::{Credentials, Issue, SearchOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, instrument};

/// Issue fields requested from search; everything else is left on the server
pub const ISSUE_SUMMARY_FIELDS: [&str; 5] = ["id", "key", "summary", "assignee", "reporter"];

/// Projection of a Jira project resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: String,
    pub key: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProjectSummary {
    fn is_complete(&self) -> bool {
        !self.id.trim().is_empty() && !self.key.trim().is_empty() && !self.name.trim().is_empty()
    }
}

/// Full project payload as returned by Jira, passed through untouched
pub type ProjectDetail = serde_json::Map<String, Value>;

/// Issue fields returned by a search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub id: String,
    pub key: String,
    pub summary: Option<String>,
    pub assignee: Option<String>,
    pub reporter: Option<String>,
}

/// Outcome of appending a comment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentResult {
    pub comment_id: String,
}

/// Remote Jira operations used by the tools, one method per REST call
#[async_trait]
pub trait JiraApi: Send + Sync {
    /// All projects visible to the authenticated account, in remote order
    async fn projects(&self) -> JiraMcpResult<Vec<ProjectSummary>>;

    /// A single project by key or id
    async fn project(&self, project_id: &str) -> JiraMcpResult<ProjectDetail>;

    /// Issues matching a JQL filter, `max_results` starting at `start_at`
    async fn search(
        &self,
        jql: &str,
        start_at: u32,
        max_results: u32,
    ) -> JiraMcpResult<Vec<IssueSummary>>;

    /// Append a plain-text comment to an issue
    async fn add_comment(&self, issue_id: &str, body: &str) -> JiraMcpResult<CommentResult>;
}

/// Builds an authenticated client for one environment
pub trait ClientFactory: Send + Sync {
    fn make_client(&self, environment: Environment) -> JiraMcpResult<Box<dyn JiraApi>>;
}

/// Factory producing gouqi-backed clients from the startup configuration
#[derive(Debug, Clone)]
pub struct JiraClientFactory {
    config: Arc<JiraConfig>,
}

impl JiraClientFactory {
    pub fn new(config: Arc<JiraConfig>) -> Self {
        Self { config }
    }
}

impl ClientFactory for JiraClientFactory {
    #[instrument(skip(self))]
    fn make_client(&self, environment: Environment) -> JiraMcpResult<Box<dyn JiraApi>> {
        let settings = self.config.environment(environment).ok_or_else(|| {
            JiraMcpError::config(format!(
                "Jira environment '{}' is not configured",
                environment
            ))
        })?;

        debug!(
            "Opening JIRA client for {} at {}",
            environment, settings.base_url
        );

        let credentials =
            Credentials::Basic(settings.account_id.clone(), settings.api_token.clone());
        let client = Jira::new(&settings.base_url, credentials).map_err(JiraMcpError::from)?;

        Ok(Box::new(JiraClient {
            client,
            environment,
            request_timeout: self.config.request_timeout_seconds.map(Duration::from_secs),
        }))
    }
}

/// JIRA client bound to one environment for the duration of a call
pub struct JiraClient {
    client: Jira,
    environment: Environment,
    request_timeout: Option<Duration>,
}

impl JiraClient {
    /// Await a remote call, honouring the configured deadline if there is one
    async fn send<T, F>(&self, what: &str, call: F) -> JiraMcpResult<T>
    where
        F: Future<Output = JiraMcpResult<T>>,
    {
        match self.request_timeout {
            Some(deadline) => timeout(deadline, call).await.map_err(|_| {
                JiraMcpError::network(format!(
                    "Timeout after {:?} while {} on {} Jira",
                    deadline,
                    what,
                    self.environment
                ))
            })?,
            None => call.await,
        }
    }

    /// Convert gouqi Issue to our IssueSummary format
    fn convert_issue_summary(issue: &Issue) -> IssueSummary {
        IssueSummary {
            id: issue.id.clone(),
            key: issue.key.clone(),
            summary: issue.summary(),
            assignee: issue.assignee().map(|u| u.display_name.clone()),
            reporter: issue.reporter().map(|u| u.display_name.clone()),
        }
    }
}

#[async_trait]
impl JiraApi for JiraClient {
    #[instrument(skip(self), fields(environment = %self.environment))]
    async fn projects(&self) -> JiraMcpResult<Vec<ProjectSummary>> {
        let projects: Vec<ProjectSummary> = self
            .send("listing projects", async {
                self.client
                    .get::<Vec<ProjectSummary>>("api", "/project")
                    .await
                    .map_err(JiraMcpError::from)
            })
            .await?;

        if let Some(bad) = projects.iter().find(|p| !p.is_complete()) {
            return Err(JiraMcpError::remote(format!(
                "Project payload is missing id, key or name (id '{}')",
                bad.id
            )));
        }

        info!("Fetched {} projects", projects.len());
        Ok(projects)
    }

    #[instrument(skip(self), fields(environment = %self.environment))]
    async fn project(&self, project_id: &str) -> JiraMcpResult<ProjectDetail> {
        let endpoint = format!("/project/{}", project_id);

        let payload: Value = self
            .send("fetching a project", async {
                self.client
                    .get::<Value>("api", &endpoint)
                    .await
                    .map_err(|e| JiraMcpError::from_gouqi(e, "project", project_id))
            })
            .await?;

        match payload {
            Value::Object(detail) => Ok(detail),
            other => Err(JiraMcpError::remote(format!(
                "Expected a project object for '{}', got {}",
                project_id, other
            ))),
        }
    }

    #[instrument(skip(self), fields(environment = %self.environment))]
    async fn search(
        &self,
        jql: &str,
        start_at: u32,
        max_results: u32,
    ) -> JiraMcpResult<Vec<IssueSummary>> {
        debug!(
            "Searching issues with JQL: '{}', start: {}, max: {}",
            jql, start_at, max_results
        );

        let search_options = SearchOptions::builder()
            .start_at(u64::from(start_at))
            .max_results(u64::from(max_results))
            .fields(ISSUE_SUMMARY_FIELDS.to_vec())
            .build();

        let results = self
            .send("searching issues", async {
                self.client
                    .search()
                    .list(jql, &search_options)
                    .await
                    .map_err(JiraMcpError::from)
            })
            .await?;

        let issues: Vec<IssueSummary> = results
            .issues
            .iter()
            .map(Self::convert_issue_summary)
            .collect();

        info!(
            "Found {} issues starting at {} (total: {})",
            issues.len(),
            start_at,
            results.total
        );

        Ok(issues)
    }

    #[instrument(skip(self, body), fields(environment = %self.environment, body_len = body.len()))]
    async fn add_comment(&self, issue_id: &str, body: &str) -> JiraMcpResult<CommentResult> {
        let add_comment = AddComment::new(body);

        let comment = self
            .send("adding a comment", async {
                self.client
                    .issues()
                    .comment(issue_id, add_comment)
                    .await
                    .map_err(|e| JiraMcpError::from_gouqi(e, "issue", issue_id))
            })
            .await?;

        let comment_id = comment.id.ok_or_else(|| {
            JiraMcpError::remote(format!(
                "Jira accepted the comment on {} but returned no comment id",
                issue_id
            ))
        })?;

        info!("Added comment {} to issue {}", comment_id, issue_id);
        Ok(CommentResult { comment_id })
    }
}
