//! Tool schemas and dispatch for the agent loop.
//!
//! The five tools map onto the shared [`Toolkit`] collaborators. A tool never
//! fails the task: errors come back to the model as `{"error": "..."}` so it
//! can see what went wrong and adjust.

use genai::chat::{Tool, ToolCall};
use serde_json::{Value, json};

use crate::ops::Toolkit;

const DEFAULT_SEARCH_RESULTS: usize = 5;

/// What a tool call produced, as fed back to the model.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub content: String,
    pub is_error: bool,
}

impl ToolOutput {
    fn ok(content: String) -> Self {
        Self {
            content,
            is_error: false,
        }
    }

    fn error(message: String) -> Self {
        Self {
            content: json!({ "error": message }).to_string(),
            is_error: true,
        }
    }

    /// Web tools already speak the `{"error": ...}` convention; classify
    /// their payloads after the fact.
    fn from_payload(content: String) -> Self {
        let is_error = serde_json::from_str::<Value>(&content)
            .ok()
            .is_some_and(|v| v.get("error").is_some());
        Self { content, is_error }
    }
}

pub fn define_tools() -> Vec<Tool> {
    vec![
        Tool::new("shell_exec")
            .with_description(
                "Execute a shell command in the workspace directory via `sh -c`. \
                 Returns JSON with success, stdout, stderr, exit_code, timed_out and blocked.",
            )
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "command": { "type": "string", "description": "The shell command to execute" }
                },
                "required": ["command"]
            })),
        Tool::new("file_read")
            .with_description(
                "Read a file. Relative paths resolve against the workspace; \
                 absolute paths are read as-is.",
            )
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "File path, relative to workspace or absolute" }
                },
                "required": ["path"]
            })),
        Tool::new("file_write")
            .with_description(
                "Create or overwrite a file inside the workspace. Parent directories \
                 are created. Paths outside the workspace are rejected.",
            )
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "File path relative to the workspace root" },
                    "content": { "type": "string", "description": "Content to write to the file" }
                },
                "required": ["path", "content"]
            })),
        Tool::new("web_fetch")
            .with_description(
                "Fetch a URL over HTTP GET. HTML is converted to markdown unless format is \"html\".",
            )
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "url": { "type": "string", "description": "The URL to fetch" },
                    "format": { "type": "string", "enum": ["markdown", "html"] },
                    "max_length": { "type": "integer", "description": "Truncate the result to this many characters" }
                },
                "required": ["url"]
            })),
        Tool::new("web_search")
            .with_description("Search the web (DuckDuckGo). Returns a JSON array of title/url/snippet.")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Search query" },
                    "count": { "type": "integer", "description": "Maximum number of results (default 5)" }
                },
                "required": ["query"]
            })),
    ]
}

/// Human-readable tool listing for the system prompt.
pub fn tool_descriptions() -> String {
    "\
### shell_exec
Run a shell command in the workspace.
- **command** (string, required)

### file_read
Read a file.
- **path** (string, required): relative to the workspace, or absolute

### file_write
Create or overwrite a file inside the workspace.
- **path** (string, required): relative to the workspace root
- **content** (string, required)

### web_fetch
Fetch a web page.
- **url** (string, required)
- **format** (string, optional): \"markdown\" (default) or \"html\"
- **max_length** (integer, optional)

### web_search
Search the web.
- **query** (string, required)
- **count** (integer, optional, default 5)"
        .to_string()
}

/// Route a tool call to its collaborator.
pub async fn dispatch_tool_call(call: &ToolCall, toolkit: &Toolkit) -> ToolOutput {
    let args = &call.fn_arguments;
    match call.fn_name.as_str() {
        "shell_exec" => {
            let Some(command) = str_arg(args, "command") else {
                return missing("shell_exec", "command");
            };
            match toolkit.cli.execute_command(command).await {
                Ok(result) => match serde_json::to_string(&result) {
                    Ok(json) => ToolOutput {
                        content: json,
                        is_error: !result.success,
                    },
                    Err(e) => ToolOutput::error(format!("shell_exec: failed to serialize result: {e}")),
                },
                Err(e) => ToolOutput::error(format!("shell_exec failed: {e}")),
            }
        }
        "file_read" => {
            let Some(path) = str_arg(args, "path") else {
                return missing("file_read", "path");
            };
            match toolkit.files.read_file(path).await {
                Ok(content) => ToolOutput::ok(content),
                Err(e) => ToolOutput::error(format!("file_read: {e}")),
            }
        }
        "file_write" => {
            let Some(path) = str_arg(args, "path") else {
                return missing("file_write", "path");
            };
            let Some(content) = str_arg(args, "content") else {
                return missing("file_write", "content");
            };
            match toolkit.files.create_file(path, content).await {
                Ok(_) => ToolOutput::ok(
                    json!({ "written_bytes": content.len(), "path": path }).to_string(),
                ),
                Err(e) => ToolOutput::error(format!("file_write: {e}")),
            }
        }
        "web_fetch" => {
            let Some(url) = str_arg(args, "url") else {
                return missing("web_fetch", "url");
            };
            let format = str_arg(args, "format").unwrap_or("markdown");
            let max_length = args
                .get("max_length")
                .and_then(Value::as_u64)
                .map(|n| n as usize);
            ToolOutput::from_payload(toolkit.web.fetch(url, format, max_length).await)
        }
        "web_search" => {
            let Some(query) = str_arg(args, "query") else {
                return missing("web_search", "query");
            };
            let count = args
                .get("count")
                .and_then(Value::as_u64)
                .map_or(DEFAULT_SEARCH_RESULTS, |n| n as usize);
            ToolOutput::from_payload(toolkit.web.search(query, count).await)
        }
        unknown => ToolOutput::error(format!("Unknown tool: {unknown}")),
    }
}

fn str_arg<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

fn missing(tool: &str, arg: &str) -> ToolOutput {
    ToolOutput::error(format!("{tool}: missing or invalid '{arg}' argument"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use tempfile::TempDir;

    #[test]
    fn define_tools_has_correct_names() {
        let tools = define_tools();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["shell_exec", "file_read", "file_write", "web_fetch", "web_search"]
        );
    }

    #[test]
    fn every_tool_has_description_and_schema() {
        for tool in define_tools() {
            assert!(tool.description.is_some(), "{} lacks a description", tool.name);
            assert!(tool.schema.is_some(), "{} lacks a schema", tool.name);
        }
    }

    #[test]
    fn tool_descriptions_mention_every_tool() {
        let desc = tool_descriptions();
        for tool in define_tools() {
            assert!(desc.contains(&format!("### {}", tool.name)));
        }
    }

    fn make_toolkit(tmp: &TempDir) -> Toolkit {
        let config = AppConfig {
            model: "test-model".to_string(),
            workspace: tmp.path().join("workspace"),
            shell_timeout_secs: 10,
            max_steps: 5,
            blocked_patterns: vec![],
            security_log_path: tmp.path().join("security.log"),
        };
        Toolkit::new(&config).unwrap()
    }

    fn make_tool_call(fn_name: &str, args: Value) -> ToolCall {
        ToolCall {
            call_id: "test-call-1".to_string(),
            fn_name: fn_name.to_string(),
            fn_arguments: args,
            thought_signatures: None,
        }
    }

    #[tokio::test]
    async fn shell_exec_runs_in_workspace() {
        let tmp = TempDir::new().unwrap();
        let toolkit = make_toolkit(&tmp);

        let call = make_tool_call("shell_exec", json!({"command": "echo hello"}));
        let out = dispatch_tool_call(&call, &toolkit).await;

        assert!(!out.is_error);
        let parsed: Value = serde_json::from_str(&out.content).unwrap();
        assert_eq!(parsed["stdout"].as_str().unwrap().trim(), "hello");
        assert_eq!(parsed["success"], true);
    }

    #[tokio::test]
    async fn shell_exec_nonzero_exit_is_error() {
        let tmp = TempDir::new().unwrap();
        let toolkit = make_toolkit(&tmp);

        let call = make_tool_call("shell_exec", json!({"command": "exit 2"}));
        let out = dispatch_tool_call(&call, &toolkit).await;

        assert!(out.is_error);
        let parsed: Value = serde_json::from_str(&out.content).unwrap();
        assert_eq!(parsed["exit_code"], 2);
    }

    #[tokio::test]
    async fn missing_argument_is_reported() {
        let tmp = TempDir::new().unwrap();
        let toolkit = make_toolkit(&tmp);

        let call = make_tool_call("file_write", json!({"path": "file.txt"}));
        let out = dispatch_tool_call(&call, &toolkit).await;

        assert!(out.is_error);
        assert!(out.content.contains("'content'"));
    }

    #[tokio::test]
    async fn file_write_then_read() {
        let tmp = TempDir::new().unwrap();
        let toolkit = make_toolkit(&tmp);

        let write = make_tool_call(
            "file_write",
            json!({"path": "notes/out.txt", "content": "written content"}),
        );
        let out = dispatch_tool_call(&write, &toolkit).await;
        let parsed: Value = serde_json::from_str(&out.content).unwrap();
        assert_eq!(parsed["written_bytes"], 15);

        let read = make_tool_call("file_read", json!({"path": "notes/out.txt"}));
        let out = dispatch_tool_call(&read, &toolkit).await;
        assert!(!out.is_error);
        assert_eq!(out.content, "written content");
    }

    #[tokio::test]
    async fn file_write_outside_workspace_rejected() {
        let tmp = TempDir::new().unwrap();
        let toolkit = make_toolkit(&tmp);

        let call = make_tool_call("file_write", json!({"path": "../escape.txt", "content": "x"}));
        let out = dispatch_tool_call(&call, &toolkit).await;

        assert!(out.is_error);
        assert!(out.content.contains("outside workspace"));
        assert!(!tmp.path().join("escape.txt").exists());
    }

    #[tokio::test]
    async fn unknown_tool_is_reported() {
        let tmp = TempDir::new().unwrap();
        let toolkit = make_toolkit(&tmp);

        let call = make_tool_call("nonexistent_tool", json!({}));
        let out = dispatch_tool_call(&call, &toolkit).await;

        assert!(out.is_error);
        assert!(out.content.contains("Unknown tool: nonexistent_tool"));
    }

    #[test]
    fn payload_classification() {
        assert!(ToolOutput::from_payload(r#"{"error":"web_fetch: HTTP 404"}"#.into()).is_error);
        assert!(!ToolOutput::from_payload("# Heading\n\nbody".into()).is_error);
        assert!(!ToolOutput::from_payload("[]".into()).is_error);
    }
}
