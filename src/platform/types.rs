use serde::Serialize;

/// Normalized view of a merge/pull request, shared across providers.
///
/// Every field is always present: values the provider omits are normalized to
/// the empty string, and a missing author becomes the `"unknown"` sentinel.
/// Serialized field names match the wire shape agents see (camelCase).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRequestDetails {
    /// Provider-native number (GitLab IID / GitHub PR number) as a string.
    pub id: String,
    pub title: String,
    /// Full description body; empty string when the provider has none.
    pub description: String,
    /// Author's username; `"unknown"` when the provider omits it.
    pub author: String,
    /// Branch being merged.
    pub source_branch: String,
    /// Branch being merged into.
    pub target_branch: String,
    /// Browser URL of the merge request.
    pub web_url: String,
}

/// One changed file within a merge request diff.
///
/// The three flags are reported by providers independently, not as an enum;
/// normalization preserves that independence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDiff {
    /// Path after the change (new path if renamed).
    pub new_path: String,
    /// Path before the change; equal to `new_path` when not renamed.
    pub old_path: String,
    /// Unified patch text; empty string when the provider omits it.
    pub diff: String,
    pub new_file: bool,
    pub deleted_file: bool,
    pub renamed_file: bool,
}

/// Best-effort project context: README and a dependency manifest.
///
/// `None` means the lookup found nothing; the key is omitted from serialized
/// output entirely rather than set to an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,
}

/// Manifest filenames probed by `project_metadata`, in lookup order.
/// The first candidate that reads back non-empty wins.
pub(crate) const MANIFEST_CANDIDATES: &[&str] = &[
    "package.json",
    "go.mod",
    "Cargo.toml",
    "requirements.txt",
    "pom.xml",
    "composer.json",
];
