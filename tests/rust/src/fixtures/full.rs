//! Tools, prompts, resources and instructions
//!
//! Results are written as wire JSON and decoded into rmcp's model types, the
//! way a proxy would forward them. `prompts/get` is answered in front of this
//! handler, see [`super::prompts`].

use rmcp::{model::*, service::RequestContext, ErrorData as McpError, RoleServer, ServerHandler};
use serde_json::{json, Map, Value};

use super::prompts::resource_link;
use super::{from_wire, GIF_BASE64, WAV_BASE64};

pub const INSTRUCTIONS: &str = "Use this server to test the implementation";

const TEXT_JSON: &str = r#"{ "key": "value" }"#;
const INPUT_MAX_LEN: usize = 100;

#[derive(Clone)]
pub struct FullServer;

impl ServerHandler for FullServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder()
                .enable_tools_with(ToolsCapability {
                    list_changed: Some(false),
                })
                .enable_prompts_with(PromptsCapability {
                    list_changed: Some(false),
                })
                .enable_resources_with(ResourcesCapability {
                    subscribe: Some(false),
                    list_changed: Some(false),
                })
                .build(),
            server_info: Implementation {
                name: "test-full".to_string(),
                version: "1.0.0".to_string(),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }

    async fn list_tools(
        &self,
        _params: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        let tools: Vec<Tool> = from_wire(json!([
            {
                "name": "All Content Types",
                "description": "A test tool that returns all content types",
                "inputSchema": { "type": "object", "properties": {} }
            },
            {
                "name": "Input Test",
                "description": "A test tool with a complex input",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "TextInput": { "type": "string", "maxLength": INPUT_MAX_LEN },
                        "TestInputArray": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "Line": { "type": "integer" },
                                    "Text": { "type": "string" }
                                }
                            }
                        }
                    },
                    "required": ["TextInput", "TestInputArray"]
                }
            },
            {
                "name": "Error Test",
                "description": "A test tool that always reports an error",
                "inputSchema": { "type": "object", "properties": {} }
            },
            {
                "name": "Structured Output Test",
                "description": "A test tool with structured output",
                "inputSchema": { "type": "object", "properties": {} },
                "outputSchema": {
                    "type": "object",
                    "properties": {
                        "test_string": { "type": "string" },
                        "test_object": {
                            "type": "object",
                            "properties": {
                                "test_object_string": { "type": "string" },
                                "test_object_integer": { "type": "integer" }
                            }
                        }
                    }
                }
            }
        ]))?;
        Ok(ListToolsResult::with_all_items(tools))
    }

    async fn call_tool(
        &self,
        params: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        match &*params.name {
            "All Content Types" => from_wire(json!({
                "content": [
                    { "type": "text", "text": "Text Message" },
                    { "type": "image", "data": GIF_BASE64, "mimeType": "image/gif" },
                    {
                        "type": "resource",
                        "resource": {
                            "uri": "file://testfile.md",
                            "mimeType": "text/markdown",
                            "text": "# Test File"
                        }
                    },
                    {
                        "type": "resource",
                        "resource": {
                            "uri": "file://okay-.gif",
                            "mimeType": "image/gif",
                            "blob": GIF_BASE64
                        }
                    },
                    { "type": "audio", "data": WAV_BASE64, "mimeType": "audio/wav" },
                    resource_link()
                ],
                "isError": false,
                "_meta": { "abapai/toolTest": "This is a test meta information" }
            })),
            "Input Test" => input_test(params.arguments.unwrap_or_default()),
            "Error Test" => Ok(CallToolResult::error(vec![Content::text(
                "This is an error test",
            )])),
            "Structured Output Test" => {
                let structured = json!({
                    "test_string": "This is a test string",
                    "test_object": {
                        "test_object_string": "This is a test string in an object",
                        "test_object_integer": 42
                    }
                });
                from_wire(json!({
                    "content": [{ "type": "text", "text": structured.to_string() }],
                    "structuredContent": structured,
                    "isError": false
                }))
            }
            other => Err(McpError::invalid_params(
                format!("Tool {} not found.", other),
                None,
            )),
        }
    }

    async fn list_prompts(
        &self,
        _params: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        let prompts: Vec<Prompt> = from_wire(json!([
            { "name": "simple", "description": "Simple test prompt" },
            {
                "name": "complex",
                "description": "A more complex test prompt with two arguments",
                "arguments": [
                    { "name": "optional", "description": "Optional argument", "required": false },
                    { "name": "required", "description": "Required argument", "required": true }
                ]
            },
            { "name": "all_content_types", "description": "Returns every message content type" },
            { "name": "ordered", "description": "Messages in a fixed order" },
            {
                "name": "test_meta",
                "title": "Test Meta Tile",
                "description": "Adding Meta Information",
                "_meta": {
                    "abapai/test1": "This is a test meta information",
                    "abapai/test2": "This is another test meta information"
                },
                "arguments": [
                    { "name": "testArg", "title": "Test Arg Title", "description": "Test Arg Description" }
                ]
            }
        ]))?;
        Ok(ListPromptsResult::with_all_items(prompts))
    }

    async fn list_resources(
        &self,
        _params: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let resources: Vec<Resource> = from_wire(json!([
            {
                "uri": "file://sap/okay.gif",
                "name": "OK",
                "description": "Okay Gif",
                "mimeType": "image/gif"
            },
            {
                "uri": "file://sap/text.json",
                "name": "TextFile",
                "description": "Same Json Text",
                "mimeType": "text/json"
            },
            {
                "uri": "file://sap/readme.md",
                "name": "Readme",
                "description": "Markdown readme",
                "mimeType": "text/markdown"
            }
        ]))?;
        Ok(ListResourcesResult::with_all_items(resources))
    }

    async fn list_resource_templates(
        &self,
        _params: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        let templates: Vec<ResourceTemplate> = from_wire(json!([
            {
                "uriTemplate": "file://{path}",
                "name": "Gif",
                "description": "Gifs ...",
                "mimeType": "image/gif"
            }
        ]))?;
        Ok(ListResourceTemplatesResult::with_all_items(templates))
    }

    async fn read_resource(
        &self,
        params: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let uri = params.uri;
        let contents = match uri.as_str() {
            "file://sap/okay.gif" => json!([
                { "uri": &uri, "mimeType": "image/gif", "blob": GIF_BASE64 }
            ]),
            "file://sap/text.json" => json!([
                { "uri": &uri, "mimeType": "text/json", "text": TEXT_JSON }
            ]),
            "file://sap/readme.md" => json!([
                { "uri": &uri, "mimeType": "text/markdown", "text": "# Readme" }
            ]),
            other => {
                return Err(McpError::resource_not_found(
                    format!("Resource {} not found.", other),
                    None,
                ))
            }
        };
        Ok(ReadResourceResult {
            contents: from_wire(contents)?,
        })
    }
}

fn string_arg(arguments: &Map<String, Value>, name: &str) -> Option<String> {
    arguments
        .get(name)
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

fn input_test(arguments: Map<String, Value>) -> Result<CallToolResult, McpError> {
    let text_input = string_arg(&arguments, "TextInput")
        .ok_or_else(|| McpError::invalid_params("TextInput is required", None))?;
    let len = text_input.chars().count();
    if len > INPUT_MAX_LEN {
        return Err(McpError::invalid_params(
            format!(
                "String must have maximum length {}, but has {}",
                INPUT_MAX_LEN, len
            ),
            None,
        ));
    }

    let lines = arguments
        .get("TestInputArray")
        .and_then(|v| v.as_array())
        .ok_or_else(|| McpError::invalid_params("TestInputArray is required", None))?;

    let content = lines
        .iter()
        .map(|line| {
            let number = line.get("Line").and_then(|v| v.as_i64()).unwrap_or_default();
            let text = line.get("Text").and_then(|v| v.as_str()).unwrap_or_default();
            Content::text(format!("Line {} : {}", number, text))
        })
        .collect();

    Ok(CallToolResult::success(content))
}
