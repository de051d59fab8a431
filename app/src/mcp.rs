use std::error::Error;
use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router,
    transport::stdio,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use search_intel_core::{IntelError, Position};
use tracing::{error, info};

use crate::cli::{HttpProvider, Remote, build_provider};

#[derive(Clone)]
pub struct IntelServer {
    provider: Arc<HttpProvider>,
    tool_router: ToolRouter<IntelServer>,
}

impl IntelServer {
    fn internal_error(code: &str, message: impl Into<String>) -> McpError {
        let full = format!("{code}: {}", message.into());
        McpError::internal_error(full, None)
    }

    fn map_error(code: &str, err: IntelError) -> McpError {
        match err {
            IntelError::MalformedUri(_) => McpError::invalid_params(err.to_string(), None),
            other => Self::internal_error(code, other.to_string()),
        }
    }

    fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
        let text = serde_json::to_string_pretty(value)
            .map_err(|e| Self::internal_error("encode_failed", e.to_string()))?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

#[derive(Deserialize, JsonSchema)]
pub struct SearchArgs {
    pub query: String,
}

#[derive(Deserialize, JsonSchema)]
pub struct FileContentArgs {
    /// Location token: git://<repo>?<rev>#<path>
    pub uri: String,
}

#[derive(Deserialize, JsonSchema)]
pub struct PositionArgs {
    /// Location token: git://<repo>?<rev>#<path>
    pub uri: String,
    /// Zero-based line
    pub line: u32,
    /// Zero-based character offset within the line
    pub character: u32,
}

#[tool_router]
impl IntelServer {
    pub fn new(provider: Arc<HttpProvider>) -> Self {
        Self {
            provider,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Run a code-search query and return every symbol and text match as JSON (repo, rev, file, start, end, and either symbol fields or a preview line)."
    )]
    pub async fn search(
        &self,
        Parameters(args): Parameters<SearchArgs>,
    ) -> Result<CallToolResult, McpError> {
        let results = self
            .provider
            .client()
            .search(&args.query)
            .await
            .map_err(|e| Self::map_error("search_failed", e))?;
        Self::json_result(&results)
    }

    #[tool(
        description = "Return the full text of a file at an exact revision, addressed by a git://<repo>?<rev>#<path> token."
    )]
    pub async fn file_content(
        &self,
        Parameters(args): Parameters<FileContentArgs>,
    ) -> Result<CallToolResult, McpError> {
        let content = self
            .provider
            .client()
            .file_content(&args.uri)
            .await
            .map_err(|e| Self::map_error("file_content_failed", e))?;

        match content {
            Some(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            None => Err(Self::internal_error(
                "not_found",
                format!("{} does not resolve", args.uri),
            )),
        }
    }

    #[tool(
        description = "Find definitions of the identifier at a zero-based line/character in a git://<repo>?<rev>#<path> document. Returns JSON locations."
    )]
    pub async fn find_definition(
        &self,
        Parameters(args): Parameters<PositionArgs>,
    ) -> Result<CallToolResult, McpError> {
        let pos = Position::new(args.line, args.character);
        let locations = self
            .provider
            .definition(&args.uri, pos)
            .await
            .map_err(|e| Self::map_error("definition_failed", e))?;
        Self::json_result(&locations)
    }

    #[tool(
        description = "Find references to the identifier at a zero-based line/character in a git://<repo>?<rev>#<path> document. Returns JSON locations."
    )]
    pub async fn find_references(
        &self,
        Parameters(args): Parameters<PositionArgs>,
    ) -> Result<CallToolResult, McpError> {
        let pos = Position::new(args.line, args.character);
        let locations = self
            .provider
            .references(&args.uri, pos)
            .await
            .map_err(|e| Self::map_error("references_failed", e))?;
        Self::json_result(&locations)
    }
}

#[tool_handler]
impl ServerHandler for IntelServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Code intelligence backed by a remote code-search API. Use `find_definition` and `find_references` with a git://<repo>?<rev>#<path> document token and a zero-based position; `search` runs raw queries and `file_content` fetches file text."
                    .to_string(),
            ),
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
        }
    }
}

pub async fn run_server(remote: Remote) -> Result<(), Box<dyn Error>> {
    info!("search_intel MCP server starting");

    let provider = Arc::new(build_provider(&remote)?);
    let server = IntelServer::new(provider);

    let service = server
        .serve(stdio())
        .await
        .inspect_err(|e| error!("search_intel MCP serve error: {e:?}"))?;

    service.waiting().await?;

    Ok(())
}
