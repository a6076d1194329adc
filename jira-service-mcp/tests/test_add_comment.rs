/// Tests for the jira_add_issue_comment tool
mod common;

use assert_matches::assert_matches;
use common::{both_environments, fake_registry, result_json, FakeJira, RecordedCall};
use jira_service_mcp::config::Environment;
use jira_service_mcp::error::JiraMcpError;
use serde_json::json;

#[tokio::test]
async fn test_comment_missing_body() {
    let (registry, jira) = fake_registry(FakeJira::default(), both_environments());

    let err = registry
        .call_tool("jira_add_issue_comment", json!({"issue_id": "X"}))
        .await
        .unwrap_err();

    assert_matches!(err, JiraMcpError::InvalidParameter { .. });
    assert!(jira.calls().is_empty());
}

#[tokio::test]
async fn test_comment_requires_environment() {
    let (registry, jira) = fake_registry(FakeJira::default(), both_environments());

    let err = registry
        .call_tool(
            "jira_add_issue_comment",
            json!({"issue_id": "SID-1", "comment": "Looks good"}),
        )
        .await
        .unwrap_err();

    assert_matches!(err, JiraMcpError::InvalidParameter { .. });
    assert!(err.to_string().contains("environment"));
    assert!(jira.calls().is_empty());
}

#[tokio::test]
async fn test_comment_rejects_blank_values() {
    let (registry, jira) = fake_registry(FakeJira::default(), both_environments());

    let cases = [
        json!({"environment": "work", "issue_id": "", "comment": "text"}),
        json!({"environment": "work", "issue_id": "SID-1", "comment": "   "}),
    ];
    for args in cases {
        let err = registry
            .call_tool("jira_add_issue_comment", args)
            .await
            .unwrap_err();
        assert_matches!(err, JiraMcpError::InvalidParameter { .. });
    }
    assert!(jira.calls().is_empty());
}

#[tokio::test]
async fn test_comment_goes_to_named_environment() {
    let (registry, jira) = fake_registry(FakeJira::default(), both_environments());

    let result = registry
        .call_tool(
            "jira_add_issue_comment",
            json!({"environment": "personal", "issue_id": "BTS-1", "comment": "This is a test comment"}),
        )
        .await
        .unwrap();

    assert_eq!(result_json(&result), json!({"comment_id": "30001"}));
    assert_eq!(
        jira.calls(),
        vec![RecordedCall::Comment {
            environment: Environment::Personal,
            issue_id: "BTS-1".to_string(),
            body: "This is a test comment".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_comment_remote_failure() {
    let (registry, _jira) = fake_registry(
        FakeJira::failing("Issue does not exist or you do not have permission to see it."),
        both_environments(),
    );

    let result = registry
        .call_tool(
            "jira_add_issue_comment",
            json!({"environment": "work", "issue_id": "NOPE-9", "comment": "hello"}),
        )
        .await
        .unwrap();

    assert!(result.is_error);
    assert!(result.text().contains("do not have permission"));
}
