/// MCP server implementation that handles JSON-RPC communication
///
/// This module implements the actual MCP server that:
/// 1. Reads line-delimited JSON-RPC requests from stdin
/// 2. Routes tool calls to the stats tools
/// 3. Writes JSON-RPC responses to stdout

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::mcp::protocol::*;
use crate::tools;
use crate::{HabitStatsServer, ServerError};

/// MCP server that handles communication with the client
pub struct McpServer {
    stats_server: HabitStatsServer,
    initialized: bool,
}

impl McpServer {
    pub fn new(stats_server: HabitStatsServer) -> Self {
        Self {
            stats_server,
            initialized: false,
        }
    }

    /// Whether the client has sent its `initialized` notification
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the MCP server, handling JSON-RPC over stdin/stdout
    pub async fn run(&mut self) -> Result<(), ServerError> {
        info!("Starting MCP server, waiting for JSON-RPC requests...");

        let stdin = tokio::io::stdin();
        let mut reader = BufReader::new(stdin);
        let mut stdout = tokio::io::stdout();

        let mut line = String::new();

        loop {
            line.clear();

            match reader.read_line(&mut line).await {
                Ok(0) => {
                    info!("MCP server shutting down (stdin closed)");
                    break;
                }
                Ok(_) => {
                    if let Some(response) = self.process_line(&line).await {
                        let response_str = serde_json::to_string(&response)?;

                        stdout.write_all(response_str.as_bytes()).await?;
                        stdout.write_all(b"\n").await?;
                        stdout.flush().await?;

                        debug!("Sent response: {}", response_str);
                    }
                }
                Err(e) => {
                    error!("Failed to read from stdin: {}", e);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Process a single line of JSON-RPC input
    ///
    /// Returns `None` for blank lines and notifications, which get no reply.
    pub async fn process_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        debug!("Processing request: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Invalid JSON: {}", e),
                    None,
                ));
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                request.id,
                error_codes::INVALID_REQUEST,
                format!("Unsupported JSON-RPC version '{}'", request.jsonrpc),
                None,
            ));
        }

        if matches!(request.method.as_str(), "initialized" | "notifications/initialized") {
            self.initialized = true;
            return None;
        }
        if request.method.starts_with("notifications/") {
            debug!("Ignoring notification: {}", request.method);
            return None;
        }

        Some(self.handle_request(request).await)
    }

    async fn handle_request(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => self.handle_tools_list(request),
            "tools/call" => self.handle_tools_call(request).await,
            _ => JsonRpcResponse::error(
                request.id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method '{}' not found", request.method),
                None,
            ),
        }
    }

    fn handle_initialize(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        info!("MCP client connected");

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
            },
            server_info: ServerInfo {
                name: "Habit Stats MCP".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        JsonRpcResponse::from_serializable(request.id, &result)
    }

    fn handle_tools_list(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let tools = vec![
            tool_definition::<tools::ToggleCompletionParams>(
                "completion_toggle",
                "Mark a habit done (or undo it) for today or a specific date, \
                 then recompute points, streaks and achievements",
            ),
            tool_definition::<tools::CompletionStatusParams>(
                "completion_status",
                "Check whether a habit is marked done for today or a specific date",
            ),
            tool_definition::<tools::DeleteHabitParams>(
                "habit_delete",
                "Remove all completions of a deleted habit and recompute stats",
            ),
            tool_definition::<tools::StatsParams>(
                "stats_get",
                "Get total points, current and longest streak, and achievement count",
            ),
            tool_definition::<tools::ListAchievementsParams>(
                "achievements_list",
                "List achievements with their progress and unlock dates",
            ),
            tool_definition::<tools::ProgressParams>(
                "progress_month",
                "Monthly completion summary, weekday distribution, \
                 per-habit breakdown and calendar heatmap",
            ),
        ];

        JsonRpcResponse::success(request.id, json!({ "tools": tools }))
    }

    async fn handle_tools_call(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        let tool_params: ToolCallParams = match request.params.map(serde_json::from_value) {
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    request.id,
                    error_codes::INVALID_PARAMS,
                    format!("Invalid parameters: {}", e),
                    None,
                );
            }
            None => {
                return JsonRpcResponse::error(
                    request.id,
                    error_codes::INVALID_PARAMS,
                    "Missing parameters".to_string(),
                    None,
                );
            }
        };

        let result = self.call_tool(&tool_params.name, tool_params.arguments).await;
        JsonRpcResponse::from_serializable(request.id, &result)
    }

    /// Dispatch a tool call and render its text result
    async fn call_tool(&self, name: &str, args: Map<String, Value>) -> ToolCallResult {
        let orchestrator = self.stats_server.orchestrator();

        let outcome = match name {
            "completion_toggle" => match parse_args(args) {
                Ok(params) => tools::toggle_completion(orchestrator, params)
                    .await
                    .map(|r| r.message),
                Err(e) => return e,
            },
            "completion_status" => match parse_args(args) {
                Ok(params) => tools::get_completion_status(orchestrator, params)
                    .await
                    .map(|r| r.message),
                Err(e) => return e,
            },
            "habit_delete" => match parse_args(args) {
                Ok(params) => tools::delete_habit(orchestrator, params).await.map(|r| r.message),
                Err(e) => return e,
            },
            "stats_get" => match parse_args(args) {
                Ok(params) => tools::get_stats(orchestrator, params).await.map(|r| r.message),
                Err(e) => return e,
            },
            "achievements_list" => match parse_args(args) {
                Ok(params) => tools::list_achievements(orchestrator, params)
                    .await
                    .map(|r| r.message),
                Err(e) => return e,
            },
            "progress_month" => match parse_args(args) {
                Ok(params) => tools::get_month_progress(orchestrator, params)
                    .await
                    .map(|r| r.message),
                Err(e) => return e,
            },
            _ => return ToolCallResult::error(format!("Unknown tool: {}", name)),
        };

        match outcome {
            Ok(message) => ToolCallResult::success(message),
            Err(e) => {
                warn!("Tool {} failed: {}", name, e);
                ToolCallResult::error(e.to_string())
            }
        }
    }
}

/// Describe a tool, generating its input schema from the parameter type
fn tool_definition<P: JsonSchema>(name: &str, description: &str) -> ToolDefinition {
    let input_schema = serde_json::to_value(schema_for!(P))
        .unwrap_or_else(|_| json!({ "type": "object" }));

    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

fn parse_args<P: DeserializeOwned>(args: Map<String, Value>) -> Result<P, ToolCallResult> {
    serde_json::from_value(Value::Object(args))
        .map_err(|e| ToolCallResult::error(format!("Invalid arguments: {}", e)))
}
