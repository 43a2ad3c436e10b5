//! Tools carrying hint annotations, and content carrying audience/priority
//! annotations

use rmcp::{model::*, service::RequestContext, ErrorData as McpError, RoleServer, ServerHandler};
use serde_json::{json, Value};

use super::{from_wire, GIF_BASE64, WAV_BASE64};

/// (name, readOnly, destructive, idempotent, openWorld)
const HINTED_TOOLS: [(&str, bool, bool, bool, bool); 5] = [
    ("AllHints", true, true, true, true),
    ("DestructiveOnly", false, true, false, false),
    ("ReadOnlyOnly", true, false, false, false),
    ("IdempotentOnly", false, false, true, false),
    ("OpenWorldOnly", false, false, false, true),
];

#[derive(Clone)]
pub struct AnnotationsServer;

impl ServerHandler for AnnotationsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder()
                .enable_tools_with(ToolsCapability {
                    list_changed: Some(false),
                })
                .build(),
            server_info: Implementation {
                name: "test-annotations".to_string(),
                version: "1.0.0".to_string(),
                ..Default::default()
            },
            instructions: None,
        }
    }

    async fn list_tools(
        &self,
        _params: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        let tools = HINTED_TOOLS
            .iter()
            .map(|(name, read_only, destructive, idempotent, open_world)| {
                let mut annotations = json!({
                    "readOnlyHint": read_only,
                    "destructiveHint": destructive,
                    "idempotentHint": idempotent,
                    "openWorldHint": open_world,
                });
                if *name == "AllHints" {
                    annotations["title"] = Value::from("Human Readable Title");
                }
                from_wire::<Tool>(json!({
                    "name": name,
                    "description": format!("Annotated tool {}", name),
                    "inputSchema": { "type": "object", "properties": {} },
                    "annotations": annotations,
                }))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ListToolsResult::with_all_items(tools))
    }

    async fn call_tool(
        &self,
        params: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        if !HINTED_TOOLS.iter().any(|(name, ..)| *name == params.name) {
            return Err(McpError::invalid_params(
                format!("Tool {} not found.", params.name),
                None,
            ));
        }

        let for_user = json!({ "audience": ["user"], "priority": 0.1 });
        from_wire(json!({
            "content": [
                {
                    "type": "text",
                    "text": format!("{} was called", params.name),
                    "annotations": { "audience": ["assistant"] }
                },
                {
                    "type": "audio",
                    "data": WAV_BASE64,
                    "mimeType": "audio/wav",
                    "annotations": for_user
                },
                {
                    "type": "image",
                    "data": GIF_BASE64,
                    "mimeType": "image/gif",
                    "annotations": for_user
                },
                {
                    "type": "resource",
                    "resource": { "uri": "file://annotated.txt", "mimeType": "text/plain", "text": "annotated" },
                    "annotations": for_user
                },
                {
                    "type": "resource",
                    "resource": { "uri": "file://annotated.gif", "mimeType": "image/gif", "blob": GIF_BASE64 },
                    "annotations": for_user
                }
            ],
            "isError": false
        }))
    }
}
