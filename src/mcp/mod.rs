//! MCP server implementation for shelfdex.
//!
//! Exposes catalog search as MCP tools for AI editors. The catalog is indexed
//! once when the server starts and every tool call reads the same snapshot.

use std::borrow::Cow;
use std::fmt::Write;
use std::sync::Arc;

use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, ErrorCode, ErrorData as McpError, ServerCapabilities, ServerInfo,
    },
    schemars, tool, tool_handler, tool_router,
    transport::stdio,
};
use serde::Deserialize;

use crate::commands::{self, LoadedEngine};
use crate::config::Config;
use crate::search::SearchError;

/// Parameters for `search_catalog` tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchParams {
    #[schemars(description = "The search pattern")]
    pub pattern: String,
    #[schemars(description = "Maximum number of results (default: 20)")]
    pub limit: Option<usize>,
    #[schemars(description = "Fields to search (default: every field)")]
    pub fields: Option<Vec<String>>,
}

/// Parameters for `get_record` tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetParams {
    #[schemars(description = "Value of the record's id field")]
    pub id: String,
}

/// MCP server exposing shelfdex tools.
#[derive(Clone)]
pub struct ShelfdexServer {
    loaded: Arc<LoadedEngine>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ShelfdexServer {
    #[must_use]
    pub fn new(loaded: LoadedEngine) -> Self {
        Self {
            loaded: Arc::new(loaded),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Search the record catalog with exact, wildcard and fuzzy matching")]
    async fn search_catalog(
        &self,
        Parameters(params): Parameters<SearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let fields = params.fields.unwrap_or_default();
        let result = self.loaded.search(&params.pattern, &fields, params.limit);

        if let Some(error @ SearchError::InvalidQueryPattern { .. }) = &result.error
            && !params.pattern.trim().is_empty()
        {
            return Err(McpError {
                code: ErrorCode::INVALID_PARAMS,
                message: Cow::from(format!("Search failed: {error}")),
                data: None,
            });
        }

        Ok(CallToolResult::success(vec![Content::text(
            commands::format_result(&params.pattern, &result),
        )]))
    }

    #[tool(description = "Get every stored field of a record by its id")]
    async fn get_record(
        &self,
        Parameters(params): Parameters<GetParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.loaded.get(&params.id) {
            Some(document) => Ok(CallToolResult::success(vec![Content::text(
                commands::format_document(&document),
            )])),
            None => Err(McpError {
                code: ErrorCode::INVALID_PARAMS,
                message: Cow::from(format!("Record not found: {}", params.id)),
                data: None,
            }),
        }
    }
}

#[tool_handler]
impl ServerHandler for ShelfdexServer {
    fn get_info(&self) -> ServerInfo {
        let mut instructions = String::from(
            "shelfdex provides ranked search over a record catalog. \
            Use search_catalog to find records and get_record to read one in full.",
        );
        match &self.loaded.summary {
            Some(summary) => {
                let _ = write!(instructions, " {} record(s) are indexed.", summary.indexed);
            }
            None => instructions.push_str(" The index is not ready: no records were indexed."),
        }

        ServerInfo {
            instructions: Some(instructions),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Index the configured catalogs and start the MCP server with stdio transport.
///
/// # Errors
///
/// Returns an error if catalogs cannot be loaded or the server fails.
pub async fn serve() -> anyhow::Result<()> {
    let config = Config::load()?;
    let server = ShelfdexServer::new(commands::load_engine(&config)?);
    let service = server.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}
