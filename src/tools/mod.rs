pub mod github;
pub mod gitlab;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::platform::{GitPlatform, PlatformError};

/// Declared shape of a tool: name, description, and named string parameters.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
}

#[derive(Debug, Clone, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
}

/// Outcome of one tool invocation: a single text block, flagged when the
/// underlying call failed. A failure never produces partial data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub text: String,
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        let message = message.into();
        let text = if message.is_empty() {
            "tool invocation failed".to_string()
        } else {
            message
        };
        Self {
            text,
            is_error: true,
        }
    }

    /// Render a structured result as pretty-printed JSON (2-space indent).
    pub fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_string_pretty(value) {
            Ok(text) => Self::success(text),
            Err(e) => Self::error(format!("failed to serialize result: {e}")),
        }
    }

    fn from_platform_error(err: PlatformError) -> Self {
        debug!(error = %err, "tool invocation failed");
        Self::error(err.to_string())
    }
}

fn require_str<'a>(args: &'a Value, name: &str) -> Result<&'a str, ToolResult> {
    args.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolResult::error(format!("missing required parameter: {name}")))
}

fn optional_str<'a>(args: &'a Value, name: &str, default: &'a str) -> &'a str {
    args.get(name).and_then(Value::as_str).unwrap_or(default)
}

// The five operations are identical across providers up to the name of the
// id parameter (mrId vs prId); both tool sets route into these handlers.

pub(crate) async fn list_requests(platform: &dyn GitPlatform, args: &Value) -> ToolResult {
    let repo_id = match require_str(args, "repoId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let status = optional_str(args, "status", "opened");
    match platform.list_merge_requests(repo_id, status).await {
        Ok(mrs) => ToolResult::json(&mrs),
        Err(e) => ToolResult::from_platform_error(e),
    }
}

pub(crate) async fn request_details(
    platform: &dyn GitPlatform,
    args: &Value,
    id_param: &str,
) -> ToolResult {
    let (repo_id, id) = match (require_str(args, "repoId"), require_str(args, id_param)) {
        (Ok(r), Ok(i)) => (r, i),
        (Err(e), _) | (_, Err(e)) => return e,
    };
    match platform.merge_request_details(repo_id, id).await {
        Ok(mr) => ToolResult::json(&mr),
        Err(e) => ToolResult::from_platform_error(e),
    }
}

pub(crate) async fn request_diff(
    platform: &dyn GitPlatform,
    args: &Value,
    id_param: &str,
) -> ToolResult {
    let (repo_id, id) = match (require_str(args, "repoId"), require_str(args, id_param)) {
        (Ok(r), Ok(i)) => (r, i),
        (Err(e), _) | (_, Err(e)) => return e,
    };
    match platform.merge_request_diff(repo_id, id).await {
        Ok(diffs) => ToolResult::json(&diffs),
        Err(e) => ToolResult::from_platform_error(e),
    }
}

pub(crate) async fn read_file(platform: &dyn GitPlatform, args: &Value) -> ToolResult {
    let (repo_id, file_path) = match (require_str(args, "repoId"), require_str(args, "filePath")) {
        (Ok(r), Ok(p)) => (r, p),
        (Err(e), _) | (_, Err(e)) => return e,
    };
    let reference = optional_str(args, "ref", "main");
    match platform.read_file_content(repo_id, file_path, reference).await {
        // Raw file text, not JSON-wrapped.
        Ok(content) => ToolResult::success(content),
        Err(e) => ToolResult::from_platform_error(e),
    }
}

pub(crate) async fn project_metadata(platform: &dyn GitPlatform, args: &Value) -> ToolResult {
    let repo_id = match require_str(args, "repoId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match platform.project_metadata(repo_id).await {
        Ok(meta) => ToolResult::json(&meta),
        Err(e) => ToolResult::from_platform_error(e),
    }
}
