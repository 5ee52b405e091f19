// MCP (Model Context Protocol) server for Redash
// Exposes queries, dashboards and visualizations as tools and resources to agent clients

pub mod error;
pub mod protocol;
pub mod resources;
pub mod server;
pub mod tools;

pub use error::{McpError, McpResult};
pub use resources::ResourceExposer;
pub use server::McpServer;
