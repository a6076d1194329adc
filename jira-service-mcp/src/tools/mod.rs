//! Tools module for the Jira service MCP server
//!
//! One module per callable tool. Each tool validates its own parameters and
//! opens a fresh client for the environment it targets.

pub mod add_comment;
pub mod list_projects;
pub mod project_details;
pub mod search_issues;

pub use add_comment::*;
pub use list_projects::*;
pub use project_details::*;
pub use search_issues::*;
