//! The `gitlab_*` tool set.

use serde_json::Value;

use super::{ParamSpec, ToolResult, ToolSpec};
use crate::platform::GitPlatform;

const REPO_ID: ParamSpec = ParamSpec {
    name: "repoId",
    description: "Project ID or URL-encoded path",
    required: true,
    default: None,
};

const MR_ID: ParamSpec = ParamSpec {
    name: "mrId",
    description: "Internal ID of the merge request",
    required: true,
    default: None,
};

pub const SPECS: &[ToolSpec] = &[
    ToolSpec {
        name: "gitlab_list_mrs",
        description: "List merge requests for a given GitLab project",
        params: &[
            REPO_ID,
            ParamSpec {
                name: "status",
                description: "Filter by state: opened, closed, merged",
                required: false,
                default: Some("opened"),
            },
        ],
    },
    ToolSpec {
        name: "gitlab_get_mr_details",
        description: "Get details of a specific merge request",
        params: &[REPO_ID, MR_ID],
    },
    ToolSpec {
        name: "gitlab_get_mr_diff",
        description: "Get the diff of a specific merge request",
        params: &[REPO_ID, MR_ID],
    },
    ToolSpec {
        name: "gitlab_read_file",
        description: "Read the content of a file at a specific ref",
        params: &[
            REPO_ID,
            ParamSpec {
                name: "filePath",
                description: "Path to the file",
                required: true,
                default: None,
            },
            ParamSpec {
                name: "ref",
                description: "Commit SHA, branch, or tag name",
                required: false,
                default: Some("main"),
            },
        ],
    },
    ToolSpec {
        name: "gitlab_get_project_metadata",
        description: "Fetch project metadata (README and manifests)",
        params: &[REPO_ID],
    },
];

/// Route a `gitlab_*` tool invocation to the adapter. Returns `None` for
/// names outside this tool set.
pub async fn dispatch(
    platform: &dyn GitPlatform,
    name: &str,
    args: &Value,
) -> Option<ToolResult> {
    let result = match name {
        "gitlab_list_mrs" => super::list_requests(platform, args).await,
        "gitlab_get_mr_details" => super::request_details(platform, args, "mrId").await,
        "gitlab_get_mr_diff" => super::request_diff(platform, args, "mrId").await,
        "gitlab_read_file" => super::read_file(platform, args).await,
        "gitlab_get_project_metadata" => super::project_metadata(platform, args).await,
        _ => return None,
    };
    Some(result)
}
