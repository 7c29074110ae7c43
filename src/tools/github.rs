//! The `github_*` tool set. Identical semantics to the GitLab set, with the
//! id parameter named `prId`.

use serde_json::Value;

use super::{ParamSpec, ToolResult, ToolSpec};
use crate::platform::GitPlatform;

const REPO_ID: ParamSpec = ParamSpec {
    name: "repoId",
    description: "Repository name in format owner/repo",
    required: true,
    default: None,
};

const PR_ID: ParamSpec = ParamSpec {
    name: "prId",
    description: "Pull Request number",
    required: true,
    default: None,
};

pub const SPECS: &[ToolSpec] = &[
    ToolSpec {
        name: "github_list_prs",
        description: "List pull requests for a given GitHub repository",
        params: &[
            REPO_ID,
            ParamSpec {
                name: "status",
                description: "Filter by state: opened, closed, merged, all",
                required: false,
                default: Some("opened"),
            },
        ],
    },
    ToolSpec {
        name: "github_get_pr_details",
        description: "Get details of a specific pull request",
        params: &[REPO_ID, PR_ID],
    },
    ToolSpec {
        name: "github_get_pr_diff",
        description: "Get the diff of a specific pull request",
        params: &[REPO_ID, PR_ID],
    },
    ToolSpec {
        name: "github_read_file",
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
        name: "github_get_project_metadata",
        description: "Fetch project metadata (README and manifests)",
        params: &[REPO_ID],
    },
];

/// Route a `github_*` tool invocation to the adapter. Returns `None` for
/// names outside this tool set.
pub async fn dispatch(
    platform: &dyn GitPlatform,
    name: &str,
    args: &Value,
) -> Option<ToolResult> {
    let result = match name {
        "github_list_prs" => super::list_requests(platform, args).await,
        "github_get_pr_details" => super::request_details(platform, args, "prId").await,
        "github_get_pr_diff" => super::request_diff(platform, args, "prId").await,
        "github_read_file" => super::read_file(platform, args).await,
        "github_get_project_metadata" => super::project_metadata(platform, args).await,
        _ => return None,
    };
    Some(result)
}
