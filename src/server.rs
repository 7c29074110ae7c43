use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, instrument};

use crate::platform::ActivePlatforms;
use crate::prompt::{self, PromptSpec, PROMPTS};
use crate::tools::{self, ToolResult, ToolSpec};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("stdio transport failed: {0}")]
    Io(#[from] std::io::Error),
}

/// One request frame from the calling framework, newline-delimited JSON.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Request {
    ListTools,
    CallTool {
        name: String,
        #[serde(default)]
        arguments: Value,
    },
    ListPrompts,
    GetPrompt {
        name: String,
        #[serde(default)]
        arguments: Value,
    },
}

/// Holds the active adapters and answers tool/prompt requests. A failed
/// invocation produces an error-flagged response frame, never a crash.
pub struct ToolServer {
    platforms: ActivePlatforms,
    guidelines: Option<String>,
}

impl ToolServer {
    pub fn new(platforms: ActivePlatforms, guidelines: Option<String>) -> Self {
        Self {
            platforms,
            guidelines,
        }
    }

    /// The tool sets of every active provider.
    pub fn tool_specs(&self) -> Vec<&'static ToolSpec> {
        let mut specs = Vec::new();
        if self.platforms.gitlab.is_some() {
            specs.extend(tools::gitlab::SPECS);
        }
        if self.platforms.github.is_some() {
            specs.extend(tools::github::SPECS);
        }
        specs
    }

    /// Prompts are registered regardless of which providers are active.
    pub fn prompt_specs(&self) -> &'static [PromptSpec] {
        PROMPTS
    }

    #[instrument(skip(self, args), fields(tool = %name))]
    pub async fn invoke_tool(&self, name: &str, args: &Value) -> ToolResult {
        if name.starts_with("gitlab_") {
            return match &self.platforms.gitlab {
                Some(adapter) => match tools::gitlab::dispatch(adapter, name, args).await {
                    Some(result) => result,
                    None => ToolResult::error(format!("unknown tool: {name}")),
                },
                None => ToolResult::error("GitLab is not configured (set GITLAB_TOKEN)"),
            };
        }
        if name.starts_with("github_") {
            return match &self.platforms.github {
                Some(adapter) => match tools::github::dispatch(adapter, name, args).await {
                    Some(result) => result,
                    None => ToolResult::error(format!("unknown tool: {name}")),
                },
                None => ToolResult::error("GitHub is not configured (set GITHUB_TOKEN)"),
            };
        }
        ToolResult::error(format!("unknown tool: {name}"))
    }

    pub fn render_prompt(&self, name: &str, args: &Value) -> Result<String, String> {
        let arg = |key: &str| {
            args.get(key)
                .and_then(Value::as_str)
                .ok_or_else(|| format!("missing required argument: {key}"))
        };
        match name {
            "review_merge_request" => Ok(prompt::review_merge_request(
                arg("repoId")?,
                arg("mrId")?,
                self.guidelines.as_deref(),
            )),
            "review_pull_request" => Ok(prompt::review_pull_request(
                arg("repoId")?,
                arg("prId")?,
                self.guidelines.as_deref(),
            )),
            _ => Err(format!("unknown prompt: {name}")),
        }
    }

    /// Handle one request frame; always produces a response object.
    pub async fn handle_request(&self, line: &str) -> Value {
        let request: Request = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => return json!({ "ok": false, "error": format!("malformed request: {e}") }),
        };

        match request {
            Request::ListTools => json!({ "ok": true, "tools": self.tool_specs() }),
            Request::CallTool { name, arguments } => {
                let result = self.invoke_tool(&name, &arguments).await;
                json!({ "ok": true, "content": result.text, "isError": result.is_error })
            }
            Request::ListPrompts => json!({ "ok": true, "prompts": self.prompt_specs() }),
            Request::GetPrompt { name, arguments } => {
                match self.render_prompt(&name, &arguments) {
                    Ok(text) => json!({
                        "ok": true,
                        "messages": [{
                            "role": "user",
                            "content": { "type": "text", "text": text },
                        }],
                    }),
                    Err(e) => json!({ "ok": false, "error": e }),
                }
            }
        }
    }

    /// Serve newline-delimited JSON over stdio until stdin closes.
    /// Logging stays on stderr; stdout carries only response frames.
    pub async fn run(&self) -> Result<(), ServerError> {
        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let mut lines = BufReader::new(stdin).lines();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            debug!(bytes = line.len(), "request frame");
            let mut response = self.handle_request(line).await.to_string();
            response.push('\n');
            stdout.write_all(response.as_bytes()).await?;
            stdout.flush().await?;
        }
        Ok(())
    }
}
