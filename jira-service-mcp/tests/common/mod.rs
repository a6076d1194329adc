/// Common utilities for Jira service MCP server tests
use async_trait::async_trait;
use jira_service_mcp::config::{Environment, EnvironmentConfig, JiraConfig};
use jira_service_mcp::error::{JiraMcpError, JiraMcpResult};
use jira_service_mcp::jira_client::{
    ClientFactory, CommentResult, IssueSummary, JiraApi, ProjectDetail, ProjectSummary,
};
use jira_service_mcp::registry::{ToolRegistry, ToolResult};
use jira_service_mcp::JiraServiceServer;
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

static REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// A remote call observed by [`FakeJira`]
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Projects(Environment),
    Project(Environment, String),
    Search {
        environment: Environment,
        jql: String,
        start_at: u32,
        max_results: u32,
    },
    Comment {
        environment: Environment,
        issue_id: String,
        body: String,
    },
}

/// In-memory stand-in for a Jira site
#[allow(dead_code)]
#[derive(Default)]
pub struct FakeJira {
    pub projects: Vec<ProjectSummary>,
    pub issues: Vec<IssueSummary>,
    /// When set, every remote call fails with this error text
    pub failure: Option<String>,
    calls: Mutex<Vec<RecordedCall>>,
}

#[allow(dead_code)]
impl FakeJira {
    pub fn with_projects(keys: &[&str]) -> Self {
        Self {
            projects: keys
                .iter()
                .enumerate()
                .map(|(i, key)| project(&format!("{}", 10000 + i), key))
                .collect(),
            ..Default::default()
        }
    }

    pub fn with_issues(project_key: &str, count: usize) -> Self {
        Self {
            issues: (1..=count)
                .map(|n| IssueSummary {
                    id: format!("{}", 20000 + n),
                    key: format!("{}-{}", project_key, n),
                    summary: Some(format!("Issue number {}", n)),
                    assignee: Some("Alex Doe".to_string()),
                    reporter: None,
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: RecordedCall) -> JiraMcpResult<()> {
        self.calls.lock().unwrap().push(call);
        match &self.failure {
            Some(message) => Err(JiraMcpError::remote(message.clone())),
            None => Ok(()),
        }
    }
}

#[allow(dead_code)]
pub fn project(id: &str, key: &str) -> ProjectSummary {
    ProjectSummary {
        id: id.to_string(),
        key: key.to_string(),
        name: format!("{} project", key),
        description: None,
    }
}

struct FakeClient {
    jira: Arc<FakeJira>,
    environment: Environment,
}

#[async_trait]
impl JiraApi for FakeClient {
    async fn projects(&self) -> JiraMcpResult<Vec<ProjectSummary>> {
        self.jira.record(RecordedCall::Projects(self.environment))?;
        Ok(self.jira.projects.clone())
    }

    async fn project(&self, project_id: &str) -> JiraMcpResult<ProjectDetail> {
        self.jira.record(RecordedCall::Project(
            self.environment,
            project_id.to_string(),
        ))?;

        let found = self
            .jira
            .projects
            .iter()
            .find(|p| p.key == project_id || p.id == project_id)
            .ok_or_else(|| JiraMcpError::not_found("project", project_id))?;

        match json!({
            "id": found.id,
            "key": found.key,
            "name": found.name,
            "projectTypeKey": "software",
            "lead": {"displayName": "Alex Doe"},
        }) {
            Value::Object(detail) => Ok(detail),
            _ => unreachable!(),
        }
    }

    async fn search(
        &self,
        jql: &str,
        start_at: u32,
        max_results: u32,
    ) -> JiraMcpResult<Vec<IssueSummary>> {
        self.jira.record(RecordedCall::Search {
            environment: self.environment,
            jql: jql.to_string(),
            start_at,
            max_results,
        })?;

        Ok(self
            .jira
            .issues
            .iter()
            .skip(start_at as usize)
            .take(max_results as usize)
            .cloned()
            .collect())
    }

    async fn add_comment(&self, issue_id: &str, body: &str) -> JiraMcpResult<CommentResult> {
        self.jira.record(RecordedCall::Comment {
            environment: self.environment,
            issue_id: issue_id.to_string(),
            body: body.to_string(),
        })?;

        Ok(CommentResult {
            comment_id: "30001".to_string(),
        })
    }
}

/// Hands out [`FakeClient`]s that all share one [`FakeJira`]
pub struct FakeClientFactory {
    jira: Arc<FakeJira>,
    config: Arc<JiraConfig>,
}

impl ClientFactory for FakeClientFactory {
    fn make_client(&self, environment: Environment) -> JiraMcpResult<Box<dyn JiraApi>> {
        if self.config.environment(environment).is_none() {
            return Err(JiraMcpError::config(format!(
                "Jira environment '{}' is not configured",
                environment
            )));
        }
        Ok(Box::new(FakeClient {
            jira: Arc::clone(&self.jira),
            environment,
        }))
    }
}

#[allow(dead_code)]
pub fn environment(host: &str) -> EnvironmentConfig {
    EnvironmentConfig {
        base_url: format!("https://{}.atlassian.net", host),
        account_id: format!("tester@{}.example", host),
        api_token: format!("{}-token", host),
    }
}

/// Configuration with both environments, defaulting to `work`
#[allow(dead_code)]
pub fn both_environments() -> JiraConfig {
    JiraConfig {
        personal: Some(environment("me")),
        work: Some(environment("corp")),
        ..Default::default()
    }
}

/// Registry wired to a fake Jira; the returned handle exposes recorded calls
#[allow(dead_code)]
pub fn fake_registry(jira: FakeJira, config: JiraConfig) -> (ToolRegistry, Arc<FakeJira>) {
    let jira = Arc::new(jira);
    let config = Arc::new(config);
    let factory = FakeClientFactory {
        jira: Arc::clone(&jira),
        config: Arc::clone(&config),
    };
    (ToolRegistry::new(Arc::new(factory), config), jira)
}

/// MCP server wired to a fake Jira; the returned handle exposes recorded calls
#[allow(dead_code)]
pub fn fake_server(jira: FakeJira, config: JiraConfig) -> (JiraServiceServer, Arc<FakeJira>) {
    let jira = Arc::new(jira);
    let config = Arc::new(config);
    let factory = FakeClientFactory {
        jira: Arc::clone(&jira),
        config: Arc::clone(&config),
    };
    (
        JiraServiceServer::with_client_factory(config, Arc::new(factory)),
        jira,
    )
}

/// Parse the single JSON text block of a successful result
#[allow(dead_code)]
pub fn result_json(result: &ToolResult) -> Value {
    assert!(!result.is_error, "unexpected error result: {}", result.text());
    serde_json::from_str(&result.text()).expect("tool output is not JSON")
}

/// MCP Test Client for sending JSON-RPC requests to the server binary
#[allow(dead_code)]
pub struct McpTestClient {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

#[allow(dead_code)]
impl McpTestClient {
    /// Create a new test client by spawning the server
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        // Credentials come from .env in the workspace root
        dotenv::from_filename(".env").ok();

        let binary_path = [
            "target/debug/jira-service-mcp",
            "target/release/jira-service-mcp",
            "../target/debug/jira-service-mcp",
            "../target/release/jira-service-mcp",
        ]
        .into_iter()
        .find(|path| std::path::Path::new(path).exists())
        .ok_or_else(|| {
            let cwd = std::env::current_dir().unwrap_or_default();
            format!(
                "Server binary not found. Current dir: {:?}. Looked in target/debug and target/release",
                cwd
            )
        })?;

        let mut child = Command::new(binary_path)
            .env("RUST_LOG", "error")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let stdin = child.stdin.take().expect("Failed to open stdin");
        let stdout = BufReader::new(child.stdout.take().expect("Failed to open stdout"));

        let mut client = Self {
            child,
            stdin,
            stdout,
        };
        client.initialize()?;

        Ok(client)
    }

    /// Initialize the MCP session
    fn initialize(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 0,
            "method": "initialize",
            "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {
                    "name": "rust-test-client",
                    "version": "1.0.0"
                }
            }
        });

        self.send_request(&request)?;
        let response = self.read_response()?;

        if response.get("error").is_some() {
            return Err(format!("Initialization failed: {:?}", response["error"]).into());
        }

        Ok(())
    }

    /// List the tools announced by the server
    pub fn list_tools(&mut self) -> Result<Value, Box<dyn std::error::Error>> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": REQUEST_ID.fetch_add(1, Ordering::SeqCst),
            "method": "tools/list",
            "params": {}
        });

        self.send_request(&request)?;
        self.read_response()
    }

    /// Call an MCP tool
    pub fn call_tool(
        &mut self,
        tool_name: &str,
        arguments: Value,
    ) -> Result<Value, Box<dyn std::error::Error>> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": REQUEST_ID.fetch_add(1, Ordering::SeqCst),
            "method": "tools/call",
            "params": {
                "name": tool_name,
                "arguments": arguments
            }
        });

        self.send_request(&request)?;
        self.read_response()
    }

    fn send_request(&mut self, request: &Value) -> Result<(), Box<dyn std::error::Error>> {
        writeln!(self.stdin, "{}", serde_json::to_string(request)?)?;
        self.stdin.flush()?;
        Ok(())
    }

    fn read_response(&mut self) -> Result<Value, Box<dyn std::error::Error>> {
        let mut line = String::new();
        self.stdout.read_line(&mut line)?;

        if line.is_empty() {
            return Err("Server closed connection".into());
        }

        Ok(serde_json::from_str(&line)?)
    }

    /// Extract the first text block of a tool response
    pub fn extract_text(response: &Value) -> Result<String, String> {
        if let Some(error) = response.get("error") {
            return Err(format!("Tool call failed: {:?}", error));
        }

        response["result"]["content"]
            .as_array()
            .and_then(|content| {
                content
                    .iter()
                    .find(|item| item["type"] == "text")
                    .and_then(|item| item["text"].as_str())
            })
            .map(str::to_string)
            .ok_or_else(|| format!("No text content in {}", response))
    }
}

impl Drop for McpTestClient {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Project key used by the live tests
#[allow(dead_code)]
pub fn test_project_key() -> String {
    std::env::var("TEST_PROJECT_KEY").unwrap_or_else(|_| "SCRUM".to_string())
}
