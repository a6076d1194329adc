//! Jira Service MCP Server - Jira projects, issues and comments via MCP
//!
//! Serves four tools over STDIO to an MCP host.

use jira_service_mcp::JiraServiceServer;
use pulseengine_mcp_server::McpServerBuilder;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configure logging for STDIO transport
    JiraServiceServer::configure_stdio_logging();

    info!("Starting Jira Service MCP Server...");

    let jira_server = match JiraServiceServer::new().await {
        Ok(server) => {
            info!(
                "Jira Service MCP Server created with {} environment(s)",
                server.environment_count()
            );
            server
        }
        Err(e) => {
            error!("Failed to create Jira Service MCP Server: {}", e);
            eprintln!("❌ Failed to start Jira Service MCP Server: {}", e);
            eprintln!("\nPlease check:");
            eprintln!("  - PERSONAL_JIRA_URL / PERSONAL_JIRA_USER / PERSONAL_JIRA_API_KEY");
            eprintln!("  - WORK_JIRA_URL / WORK_JIRA_USER / WORK_JIRA_API_KEY");
            eprintln!("  - JIRA_API_KEY can stand in for either API key");
            std::process::exit(1);
        }
    };

    info!("Starting MCP server with STDIO transport...");

    let mut server = jira_server.serve_stdio().await?;

    info!("🚀 Jira Service MCP Server is running and ready to serve requests");

    server.run().await?;

    Ok(())
}
