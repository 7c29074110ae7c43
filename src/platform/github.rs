use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::types::MANIFEST_CANDIDATES;
use super::{
    classify_status, decode_content, FileDiff, GitPlatform, MergeRequestDetails, PlatformError,
    ProjectMetadata,
};

const API_HOST: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("review-bridge/", env!("CARGO_PKG_VERSION"));

/// GitHub implementation of [`GitPlatform`], speaking the v3 REST API.
///
/// `repo_id` must be `owner/repo`. GitHub's pull request state vocabulary is
/// narrower than the shared one, so `merged` is requested as `closed` and
/// filtered client-side on the merge timestamp.
pub struct GitHubAdapter {
    client: Client,
    base_url: Url,
    token: String,
}

#[derive(Debug, Deserialize)]
struct GitHubUser {
    login: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubBranchRef {
    #[serde(rename = "ref")]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubPull {
    number: u64,
    title: Option<String>,
    body: Option<String>,
    user: Option<GitHubUser>,
    head: Option<GitHubBranchRef>,
    base: Option<GitHubBranchRef>,
    html_url: Option<String>,
    merged_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubDiffEntry {
    filename: String,
    previous_filename: Option<String>,
    patch: Option<String>,
    status: Option<String>,
}

/// The contents endpoint returns an object for a file and an array for a
/// directory listing.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GitHubContents {
    Directory(Vec<serde_json::Value>),
    File { content: String },
}

impl GitHubPull {
    fn normalize(self) -> MergeRequestDetails {
        MergeRequestDetails {
            id: self.number.to_string(),
            title: self.title.unwrap_or_default(),
            description: self.body.unwrap_or_default(),
            author: self
                .user
                .and_then(|u| u.login)
                .unwrap_or_else(|| "unknown".to_string()),
            source_branch: self.head.and_then(|b| b.name).unwrap_or_default(),
            target_branch: self.base.and_then(|b| b.name).unwrap_or_default(),
            web_url: self.html_url.unwrap_or_default(),
        }
    }
}

/// Map the shared status vocabulary onto GitHub's `state` filter.
/// `merged` becomes `closed` (the caller filters on the merge timestamp);
/// anything unrecognized falls back to `open`.
fn translate_status(status: &str) -> &'static str {
    match status {
        "closed" | "merged" => "closed",
        "all" => "all",
        _ => "open",
    }
}

impl GitHubAdapter {
    /// Create an adapter for the given personal access token.
    pub fn new(token: &str) -> Result<Self, PlatformError> {
        Self::with_base_url(token, API_HOST)
    }

    fn with_base_url(token: &str, host: &str) -> Result<Self, PlatformError> {
        let base_url = Url::parse(host)
            .map_err(|e| PlatformError::InvalidArgument(format!("invalid GitHub URL {host}: {e}")))?;
        Ok(Self {
            client: Client::new(),
            base_url,
            token: token.to_string(),
        })
    }

    /// Split `owner/repo` on the first `/`; both halves must be non-empty.
    fn parse_repo_id(repo_id: &str) -> Result<(&str, &str), PlatformError> {
        match repo_id.split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() => Ok((owner, repo)),
            _ => Err(PlatformError::InvalidArgument(format!(
                "Invalid repoId: {repo_id}. Expected format: owner/repo"
            ))),
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, PlatformError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                PlatformError::InvalidArgument(format!("GitHub URL {} cannot be a base", self.base_url))
            })?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    /// Contents paths keep their `/` separators in the URL, unlike GitLab's
    /// single-segment file paths.
    fn contents_endpoint(
        &self,
        owner: &str,
        repo: &str,
        file_path: &str,
    ) -> Result<Url, PlatformError> {
        let mut segments = vec!["repos", owner, repo, "contents"];
        segments.extend(file_path.split('/').filter(|s| !s.is_empty()));
        self.endpoint(&segments)
    }

    async fn get(&self, url: Url, what: &str) -> Result<reqwest::Response, PlatformError> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
            .bearer_auth(&self.token)
            .send()
            .await?;
        classify_status(response, what)
    }
}

#[async_trait]
impl GitPlatform for GitHubAdapter {
    #[instrument(skip(self), fields(repo = %repo_id, status = %status))]
    async fn list_merge_requests(
        &self,
        repo_id: &str,
        status: &str,
    ) -> Result<Vec<MergeRequestDetails>, PlatformError> {
        let (owner, repo) = Self::parse_repo_id(repo_id)?;
        let mut url = self.endpoint(&["repos", owner, repo, "pulls"])?;
        url.query_pairs_mut()
            .append_pair("state", translate_status(status));

        let mut pulls: Vec<GitHubPull> = self
            .get(url, &format!("pull requests of {repo_id}"))
            .await?
            .json()
            .await?;

        if status == "merged" {
            pulls.retain(|pr| pr.merged_at.is_some());
        }
        debug!(count = pulls.len(), "listed pull requests");
        Ok(pulls.into_iter().map(GitHubPull::normalize).collect())
    }

    #[instrument(skip(self), fields(repo = %repo_id, pr = %id))]
    async fn merge_request_details(
        &self,
        repo_id: &str,
        id: &str,
    ) -> Result<MergeRequestDetails, PlatformError> {
        let (owner, repo) = Self::parse_repo_id(repo_id)?;
        let url = self.endpoint(&["repos", owner, repo, "pulls", id])?;
        let pr: GitHubPull = self
            .get(url, &format!("pull request {id} in {repo_id}"))
            .await?
            .json()
            .await?;
        Ok(pr.normalize())
    }

    #[instrument(skip(self), fields(repo = %repo_id, pr = %id))]
    async fn merge_request_diff(
        &self,
        repo_id: &str,
        id: &str,
    ) -> Result<Vec<FileDiff>, PlatformError> {
        let (owner, repo) = Self::parse_repo_id(repo_id)?;
        let url = self.endpoint(&["repos", owner, repo, "pulls", id, "files"])?;
        let files: Vec<GitHubDiffEntry> = self
            .get(url, &format!("diff of pull request {id} in {repo_id}"))
            .await?
            .json()
            .await?;
        debug!(files = files.len(), "fetched pull request diff");
        Ok(files
            .into_iter()
            .map(|f| {
                let status = f.status.as_deref().unwrap_or_default();
                FileDiff {
                    old_path: f
                        .previous_filename
                        .unwrap_or_else(|| f.filename.clone()),
                    new_path: f.filename,
                    diff: f.patch.unwrap_or_default(),
                    new_file: status == "added",
                    deleted_file: status == "removed",
                    renamed_file: status == "renamed",
                }
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
        let (owner, repo) = Self::parse_repo_id(repo_id)?;
        let mut url = self.contents_endpoint(owner, repo, file_path)?;
        url.query_pairs_mut().append_pair("ref", reference);

        let what = format!("{file_path} at {reference} in {repo_id}");
        match self.get(url, &what).await?.json().await? {
            GitHubContents::File { content } => decode_content(&content, &what),
            GitHubContents::Directory(_) => {
                Err(PlatformError::InvalidTarget(format!("{file_path} in {repo_id}")))
            }
        }
    }

    #[instrument(skip(self), fields(repo = %repo_id))]
    async fn project_metadata(&self, repo_id: &str) -> Result<ProjectMetadata, PlatformError> {
        let mut readme = self.read_file_content(repo_id, "README.md", "main").await.ok();
        if readme.is_none() {
            // The dedicated endpoint resolves other casings and locations.
            readme = self.readme_via_api(repo_id).await.ok();
        }

        let mut manifest = None;
        for candidate in MANIFEST_CANDIDATES {
            match self.read_file_content(repo_id, candidate, "main").await {
                Ok(content) if !content.is_empty() => {
                    debug!(manifest = candidate, "found manifest");
                    manifest = Some(content);
                    break;
                }
                Ok(_) | Err(_) => continue,
            }
        }

        Ok(ProjectMetadata { readme, manifest })
    }
}

impl GitHubAdapter {
    async fn readme_via_api(&self, repo_id: &str) -> Result<String, PlatformError> {
        #[derive(Deserialize)]
        struct Readme {
            content: String,
        }

        let (owner, repo) = Self::parse_repo_id(repo_id)?;
        let url = self.endpoint(&["repos", owner, repo, "readme"])?;
        let what = format!("README of {repo_id}");
        let readme: Readme = self.get(url, &what).await?.json().await?;
        decode_content(&readme.content, &what)
    }
}
