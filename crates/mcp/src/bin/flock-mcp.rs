// Standalone MCP server binary

use anyhow::Result;
use flock_mcp::server::McpServer;
use flock_mcp::tools::*;
use flock_sdk::{FlockClient, DEFAULT_MAX_PAGES};
use std::sync::Arc;

const DEFAULT_API_URL: &str = "https://api.planningcenteronline.com/people/v2";

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout belongs to the protocol.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::info!("Flock MCP server starting...");

    let base_url =
        std::env::var("FLOCK_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let client_id = std::env::var("FLOCK_CLIENT_ID").ok();
    let secret = std::env::var("FLOCK_CLIENT_SECRET").ok();
    let max_pages = std::env::var("FLOCK_MAX_PAGES")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_MAX_PAGES);

    let mut builder = FlockClient::builder().base_url(&base_url);
    if let (Some(client_id), Some(secret)) = (client_id, secret) {
        builder = builder.basic_auth(client_id, secret);
    }
    let client = Arc::new(builder.build()?);
    if !client.is_authenticated() {
        tracing::warn!(
            "FLOCK_CLIENT_ID / FLOCK_CLIENT_SECRET not set; \
             running in demo mode, every tool call will fail unauthenticated"
        );
    }
    let ctx = ToolContext::new(client, max_pages);

    let mut registry = ToolRegistry::new();

    // People search and filters
    registry.register(Arc::new(SearchPeopleTool::new(ctx.clone())));
    registry.register(Arc::new(GetPersonDetailsTool::new(ctx.clone())));
    registry.register(Arc::new(ListPeopleByAgeRangeTool::new(ctx.clone())));
    registry.register(Arc::new(ListPeopleByGenderTool::new(ctx.clone())));
    registry.register(Arc::new(ListPeopleByMembershipTool::new(ctx.clone())));
    registry.register(Arc::new(ListPeopleInFamilyTool::new(ctx.clone())));
    registry.register(Arc::new(ListPeopleWithHouseholdTool::new(ctx.clone())));

    // Contact information
    registry.register(Arc::new(ContactCollectionTool::phone_numbers(ctx.clone())));
    registry.register(Arc::new(ContactCollectionTool::emails(ctx.clone())));
    registry.register(Arc::new(ContactCollectionTool::addresses(ctx.clone())));
    registry.register(Arc::new(GetPersonContactInfoTool::new(ctx.clone())));

    // Background checks
    registry.register(Arc::new(ListBackgroundChecksTool::new(ctx.clone())));
    registry.register(Arc::new(ListPeopleWithApprovedChecksTool::new(ctx)));

    tracing::info!(base_url = %base_url, "Registered {} tools", registry.len());

    let server = McpServer::new(registry);
    server.run().await
}
