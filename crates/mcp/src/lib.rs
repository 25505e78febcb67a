// MCP (Model Context Protocol) server exposing people-directory tools
// to agent clients over JSON-RPC 2.0 on stdio.

pub mod protocol;
pub mod server;
pub mod tools;

pub use server::McpServer;
