use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::types::MANIFEST_CANDIDATES;
use super::{
    classify_status, decode_content, FileDiff, GitPlatform, MergeRequestDetails, PlatformError,
    ProjectMetadata,
};

const DEFAULT_HOST: &str = "https://gitlab.com";

/// GitLab implementation of [`GitPlatform`], speaking REST API v4.
///
/// `repo_id` is the numeric project ID or the full path (`group/project`); it
/// is forwarded as a single percent-encoded path segment, so the path form
/// needs no pre-encoding by the caller.
#[derive(Debug)]
pub struct GitLabAdapter {
    client: Client,
    base_url: Url,
    token: String,
}

#[derive(Debug, Deserialize)]
struct GitLabUser {
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitLabMergeRequest {
    iid: u64,
    title: Option<String>,
    description: Option<String>,
    author: Option<GitLabUser>,
    source_branch: Option<String>,
    target_branch: Option<String>,
    web_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitLabDiff {
    new_path: String,
    old_path: String,
    diff: Option<String>,
    #[serde(default)]
    new_file: bool,
    #[serde(default)]
    deleted_file: bool,
    #[serde(default)]
    renamed_file: bool,
}

#[derive(Debug, Deserialize)]
struct GitLabFile {
    content: String,
}

impl GitLabMergeRequest {
    fn normalize(self) -> MergeRequestDetails {
        MergeRequestDetails {
            id: self.iid.to_string(),
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            author: self
                .author
                .and_then(|a| a.username)
                .unwrap_or_else(|| "unknown".to_string()),
            source_branch: self.source_branch.unwrap_or_default(),
            target_branch: self.target_branch.unwrap_or_default(),
            web_url: self.web_url.unwrap_or_default(),
        }
    }
}

impl GitLabAdapter {
    /// Create an adapter for the given personal access token. `base_url`
    /// overrides the public host for self-managed instances.
    pub fn new(token: &str, base_url: Option<&str>) -> Result<Self, PlatformError> {
        let host = base_url.unwrap_or(DEFAULT_HOST);
        let base_url = Url::parse(host)
            .map_err(|e| PlatformError::InvalidArgument(format!("invalid GitLab URL {host}: {e}")))?;
        Ok(Self {
            client: Client::new(),
            base_url,
            token: token.to_string(),
        })
    }

    /// Build `{base}/api/v4/{segments...}` with each segment percent-encoded,
    /// so a `group/project` repo id or a nested file path travels as one
    /// segment (`/` becomes `%2F`).
    fn endpoint(&self, segments: &[&str]) -> Result<Url, PlatformError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                PlatformError::InvalidArgument(format!("GitLab URL {} cannot be a base", self.base_url))
            })?;
            path.pop_if_empty();
            path.push("api");
            path.push("v4");
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    async fn get(&self, url: Url, what: &str) -> Result<reqwest::Response, PlatformError> {
        let response = self
            .client
            .get(url)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?;
        classify_status(response, what)
    }
}

#[async_trait]
impl GitPlatform for GitLabAdapter {
    #[instrument(skip(self), fields(repo = %repo_id, status = %status))]
    async fn list_merge_requests(
        &self,
        repo_id: &str,
        status: &str,
    ) -> Result<Vec<MergeRequestDetails>, PlatformError> {
        // GitLab's state vocabulary already matches ours, so the filter is
        // forwarded verbatim.
        let mut url = self.endpoint(&["projects", repo_id, "merge_requests"])?;
        url.query_pairs_mut().append_pair("state", status);

        let mrs: Vec<GitLabMergeRequest> = self
            .get(url, &format!("merge requests of {repo_id}"))
            .await?
            .json()
            .await?;
        debug!(count = mrs.len(), "listed merge requests");
        Ok(mrs.into_iter().map(GitLabMergeRequest::normalize).collect())
    }

    #[instrument(skip(self), fields(repo = %repo_id, mr = %id))]
    async fn merge_request_details(
        &self,
        repo_id: &str,
        id: &str,
    ) -> Result<MergeRequestDetails, PlatformError> {
        let url = self.endpoint(&["projects", repo_id, "merge_requests", id])?;
        let mr: GitLabMergeRequest = self
            .get(url, &format!("merge request {id} in {repo_id}"))
            .await?
            .json()
            .await?;
        Ok(mr.normalize())
    }

    #[instrument(skip(self), fields(repo = %repo_id, mr = %id))]
    async fn merge_request_diff(
        &self,
        repo_id: &str,
        id: &str,
    ) -> Result<Vec<FileDiff>, PlatformError> {
        let url = self.endpoint(&["projects", repo_id, "merge_requests", id, "diffs"])?;
        let diffs: Vec<GitLabDiff> = self
            .get(url, &format!("diff of merge request {id} in {repo_id}"))
            .await?
            .json()
            .await?;
        debug!(files = diffs.len(), "fetched merge request diff");
        Ok(diffs
            .into_iter()
            .map(|d| FileDiff {
                new_path: d.new_path,
                old_path: d.old_path,
                diff: d.diff.unwrap_or_default(),
                new_file: d.new_file,
                deleted_file: d.deleted_file,
                renamed_file: d.renamed_file,
            })
            .collect())
    }

    #[instrument(skip(self), fields(repo = %repo_id, path = %file_path, reference = %reference))]
    async fn read_file_content(
        &self,
        repo_id: &str,
        file_path: &str,
        reference: &str,
    ) -> Result<String, PlatformError> {
        let mut url = self.endpoint(&["projects", repo_id, "repository", "files", file_path])?;
        url.query_pairs_mut().append_pair("ref", reference);

        let what = format!("{file_path} at {reference} in {repo_id}");
        let file: GitLabFile = self.get(url, &what).await?.json().await?;
        decode_content(&file.content, &what)
    }

    #[instrument(skip(self), fields(repo = %repo_id))]
    async fn project_metadata(&self, repo_id: &str) -> Result<ProjectMetadata, PlatformError> {
        let readme = self.read_file_content(repo_id, "README.md", "main").await.ok();

        let mut manifest = None;
        for candidate in MANIFEST_CANDIDATES {
            match self.read_file_content(repo_id, candidate, "main").await {
                Ok(content) if !content.is_empty() => {
                    debug!(manifest = candidate, "found manifest");
                    manifest = Some(content);
                    break;
                }
                // Empty file or lookup failure: try the next candidate.
                Ok(_) | Err(_) => continue,
            }
        }

        Ok(ProjectMetadata { readme, manifest })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use mockito::{Matcher, Server, ServerGuard};

    fn adapter(server: &ServerGuard) -> GitLabAdapter {
        GitLabAdapter::new("test-token", Some(&server.url())).unwrap()
    }

    fn mr_json(iid: u64) -> serde_json::Value {
        serde_json::json!({
            "iid": iid,
            "title": "Fix login",
            "description": "Fixes the login flow",
            "author": { "username": "alice" },
            "source_branch": "fix-login",
            "target_branch": "main",
            "web_url": format!("https://gitlab.com/group/proj/-/merge_requests/{iid}"),
        })
    }

    #[tokio::test]
    async fn test_list_passes_state_through_verbatim() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v4/projects/42/merge_requests")
            .match_query(Matcher::UrlEncoded("state".into(), "opened".into()))
            .match_header("PRIVATE-TOKEN", "test-token")
            .with_body(serde_json::json!([mr_json(7)]).to_string())
            .create_async()
            .await;

        let mrs = adapter(&server).list_merge_requests("42", "opened").await.unwrap();
        mock.assert_async().await;
        assert_eq!(mrs.len(), 1);
        assert_eq!(mrs[0].id, "7");
        assert_eq!(mrs[0].author, "alice");
    }

    #[tokio::test]
    async fn test_list_encodes_project_path() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v4/projects/group%2Fproj/merge_requests")
            .match_query(Matcher::UrlEncoded("state".into(), "merged".into()))
            .with_body("[]")
            .create_async()
            .await;

        let mrs = adapter(&server)
            .list_merge_requests("group/proj", "merged")
            .await
            .unwrap();
        mock.assert_async().await;
        assert!(mrs.is_empty());
    }

    #[tokio::test]
    async fn test_details_normalizes_absent_fields() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/v4/projects/42/merge_requests/7")
            .with_body(
                serde_json::json!({
                    "iid": 7,
                    "title": "Untitled",
                    "description": null,
                    "author": null,
                    "source_branch": "src",
                    "target_branch": "tgt",
                    "web_url": "url",
                })
                .to_string(),
            )
            .create_async()
            .await;

        let mr = adapter(&server).merge_request_details("42", "7").await.unwrap();
        assert_eq!(mr.description, "");
        assert_eq!(mr.author, "unknown");
    }

    #[tokio::test]
    async fn test_details_not_found() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/v4/projects/42/merge_requests/999")
            .with_status(404)
            .create_async()
            .await;

        let err = adapter(&server).merge_request_details("42", "999").await.unwrap_err();
        assert!(matches!(err, PlatformError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_unauthorized_surfaces_from_vendor() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/v4/projects/42/merge_requests")
            .match_query(Matcher::Any)
            .with_status(401)
            .create_async()
            .await;

        let err = adapter(&server).list_merge_requests("42", "opened").await.unwrap_err();
        assert!(matches!(err, PlatformError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_diff_maps_all_flags() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/v4/projects/42/merge_requests/7/diffs")
            .with_body(
                serde_json::json!([{
                    "new_path": "src/new.rs",
                    "old_path": "src/old.rs",
                    "diff": "@@ -1 +1 @@\n-a\n+b\n",
                    "new_file": false,
                    "deleted_file": false,
                    "renamed_file": true,
                }, {
                    "new_path": "added.rs",
                    "old_path": "added.rs",
                    "diff": null,
                    "new_file": true,
                    "deleted_file": false,
                    "renamed_file": false,
                }])
                .to_string(),
            )
            .create_async()
            .await;

        let diffs = adapter(&server).merge_request_diff("42", "7").await.unwrap();
        assert_eq!(diffs.len(), 2);
        assert!(diffs[0].renamed_file);
        assert_eq!(diffs[0].old_path, "src/old.rs");
        assert!(diffs[1].new_file);
        assert_eq!(diffs[1].diff, "");
    }

    #[tokio::test]
    async fn test_read_file_decodes_base64_round_trip() {
        let original = "fn main() {}\n// ünïcode comment\n";
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v4/projects/42/repository/files/src%2Fmain.rs")
            .match_query(Matcher::UrlEncoded("ref".into(), "develop".into()))
            .with_body(
                serde_json::json!({ "content": STANDARD.encode(original) }).to_string(),
            )
            .create_async()
            .await;

        let content = adapter(&server)
            .read_file_content("42", "src/main.rs", "develop")
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(content, original);
    }

    #[tokio::test]
    async fn test_read_file_missing_passes_not_found_through() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/api/v4/projects/42/repository/files/nope.txt")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let err = adapter(&server)
            .read_file_content("42", "nope.txt", "main")
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_metadata_takes_second_manifest_candidate() {
        let mut server = Server::new_async().await;
        // README and package.json are missing; go.mod resolves.
        let _m = server
            .mock("GET", Matcher::Regex(r"^/api/v4/projects/42/repository/files/.*$".into()))
            .match_query(Matcher::Any)
            .with_status(404)
            .expect_at_least(1)
            .create_async()
            .await;
        let _m = server
            .mock("GET", "/api/v4/projects/42/repository/files/go.mod")
            .match_query(Matcher::Any)
            .with_body(serde_json::json!({ "content": STANDARD.encode("module example.com/m\n") }).to_string())
            .create_async()
            .await;

        let meta = adapter(&server).project_metadata("42").await.unwrap();
        assert!(meta.readme.is_none());
        assert_eq!(meta.manifest.as_deref(), Some("module example.com/m\n"));
    }

    #[tokio::test]
    async fn test_metadata_all_lookups_fail_yields_empty() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", Matcher::Regex(r"^/api/v4/projects/42/repository/files/.*$".into()))
            .match_query(Matcher::Any)
            .with_status(404)
            .expect_at_least(7)
            .create_async()
            .await;

        let meta = adapter(&server).project_metadata("42").await.unwrap();
        assert_eq!(meta, ProjectMetadata::default());
        // Serialized form omits both keys.
        assert_eq!(serde_json::to_string(&meta).unwrap(), "{}");
    }

    #[test]
    fn test_new_rejects_malformed_base_url() {
        let err = GitLabAdapter::new("t", Some("not a url")).unwrap_err();
        assert!(matches!(err, PlatformError::InvalidArgument(_)));
    }
}
