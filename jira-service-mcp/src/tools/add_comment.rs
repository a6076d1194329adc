//! Add comment tool for appending comments to JIRA issues
//!
//! The target environment has to be named explicitly: a comment is a write,
//! so it never falls back to the server's default environment.

use crate::config::Environment;
use crate::error::{JiraMcpError, JiraMcpResult};
use crate::jira_client::{ClientFactory, CommentResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// Jira rejects comment bodies longer than this
pub const MAX_COMMENT_LEN: usize = 32_767;

/// Parameters for the jira_add_issue_comment tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AddIssueCommentParams {
    /// Jira environment holding the issue: "personal" or "work" (required)
    pub environment: Environment,

    /// Issue key (required)
    /// Examples: "SID-1", "OPS-42"
    pub issue_id: String,

    /// Comment text (required)
    pub comment: String,
}

/// Implementation of the jira_add_issue_comment tool
pub struct AddIssueCommentTool {
    clients: Arc<dyn ClientFactory>,
}

impl AddIssueCommentTool {
    pub fn new(clients: Arc<dyn ClientFactory>) -> Self {
        Self { clients }
    }

    pub fn validate_params(&self, params: &AddIssueCommentParams) -> JiraMcpResult<()> {
        if params.issue_id.trim().is_empty() {
            return Err(JiraMcpError::invalid_param(
                "issue_id",
                "issue_id is required",
            ));
        }

        if params.comment.trim().is_empty() {
            return Err(JiraMcpError::invalid_param(
                "comment",
                "comment is required",
            ));
        }

        if params.comment.chars().count() > MAX_COMMENT_LEN {
            return Err(JiraMcpError::invalid_param(
                "comment",
                format!("comment cannot exceed {} characters", MAX_COMMENT_LEN),
            ));
        }

        Ok(())
    }

    /// Execute the jira_add_issue_comment tool
    #[instrument(skip(self), fields(
        environment = %params.environment,
        issue_id = params.issue_id.as_str(),
        comment_length = params.comment.len(),
    ))]
    pub async fn execute(&self, params: AddIssueCommentParams) -> JiraMcpResult<CommentResult> {
        self.validate_params(&params)?;

        let client = self.clients.make_client(params.environment)?;
        let result = client
            .add_comment(params.issue_id.trim(), &params.comment)
            .await?;

        info!(
            "Comment {} added to {} on {}",
            result.comment_id, params.issue_id, params.environment
        );
        Ok(result)
    }
}
