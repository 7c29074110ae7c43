pub mod factory;
pub mod github;
pub mod gitlab;
pub mod types;

pub use factory::ActivePlatforms;
pub use github::GitHubAdapter;
pub use gitlab::GitLabAdapter;
pub use types::{FileDiff, MergeRequestDetails, ProjectMetadata};

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} is not a file")]
    InvalidTarget(String),

    #[error("unauthorized: {0} (check the access token)")]
    Unauthorized(String),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("failed to decode file content: {0}")]
    Decode(String),
}

/// Capability contract implemented by every hosting provider adapter.
///
/// Adapters are stateless aside from the held credential and HTTP client, so
/// concurrent calls are safe by construction. Every operation maps one vendor
/// response shape onto the normalized types; none of them cache, retry, or
/// paginate.
#[async_trait]
pub trait GitPlatform: Send + Sync {
    /// List merge requests for a repository, filtered by state.
    ///
    /// `status` is one of `opened`, `closed`, `merged`, `all`. How values
    /// outside that set behave is provider-specific: GitLab receives them
    /// verbatim, GitHub falls back to its open state. Result ordering is
    /// whatever the vendor returns.
    async fn list_merge_requests(
        &self,
        repo_id: &str,
        status: &str,
    ) -> Result<Vec<MergeRequestDetails>, PlatformError>;

    /// Fetch one merge request; `NotFound` when `id` does not exist in `repo_id`.
    async fn merge_request_details(
        &self,
        repo_id: &str,
        id: &str,
    ) -> Result<MergeRequestDetails, PlatformError>;

    /// Fetch the per-file changes of a merge request, in vendor order.
    async fn merge_request_diff(
        &self,
        repo_id: &str,
        id: &str,
    ) -> Result<Vec<FileDiff>, PlatformError>;

    /// Read a file's decoded text content at `reference` (branch, tag, or SHA).
    ///
    /// Fails `NotFound` for a missing path and `InvalidTarget` when the path
    /// resolves to a directory rather than a file.
    async fn read_file_content(
        &self,
        repo_id: &str,
        file_path: &str,
        reference: &str,
    ) -> Result<String, PlatformError>;

    /// Best-effort README + manifest lookup. Individual candidate failures are
    /// swallowed; only total absence is observable as a `None` field.
    async fn project_metadata(&self, repo_id: &str) -> Result<ProjectMetadata, PlatformError>;
}

/// Map an HTTP response status onto the error taxonomy.
///
/// 401/403 become `Unauthorized`, 404 becomes `NotFound` for `what`, any other
/// error status becomes `Upstream`. Success passes the response through.
pub(crate) fn classify_status(response: Response, what: &str) -> Result<Response, PlatformError> {
    match response.status() {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(PlatformError::Unauthorized(what.to_string()))
        }
        StatusCode::NOT_FOUND => Err(PlatformError::NotFound(what.to_string())),
        _ => response
            .error_for_status()
            .map_err(PlatformError::Upstream),
    }
}

/// Decode a base64 content payload as produced by both vendors' file APIs.
/// GitHub wraps the encoding with newlines, so ASCII whitespace is stripped
/// before decoding.
pub(crate) fn decode_content(encoded: &str, what: &str) -> Result<String, PlatformError> {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| PlatformError::Decode(format!("{what}: {e}")))?;
    String::from_utf8(bytes).map_err(|e| PlatformError::Decode(format!("{what}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    #[test]
    fn test_decode_content_round_trip() {
        let original = "fn main() {\n    println!(\"hello\");\n}\n";
        let encoded = STANDARD.encode(original);
        assert_eq!(decode_content(&encoded, "test").unwrap(), original);
    }

    #[test]
    fn test_decode_content_with_embedded_newlines() {
        // GitHub inserts line breaks into the base64 stream.
        let original = "line one\nline two\n";
        let mut encoded = STANDARD.encode(original);
        encoded.insert(8, '\n');
        assert_eq!(decode_content(&encoded, "test").unwrap(), original);
    }

    #[test]
    fn test_decode_content_rejects_garbage() {
        let err = decode_content("!!not base64!!", "README.md").unwrap_err();
        assert!(matches!(err, PlatformError::Decode(_)));
        assert!(err.to_string().contains("README.md"));
    }
}
