pub mod templates;

use serde::Serialize;

/// String accumulator for assembling instruction prompts.
///
/// Substitution is sequential and single-occurrence: each
/// `replace_wildcard` rewrites only the first match of its wildcard.
pub struct PromptBuilder {
    prompt: String,
}

impl PromptBuilder {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            prompt: template.into(),
        }
    }

    /// Replace the first occurrence of `wildcard` with `value`.
    pub fn replace_wildcard(mut self, wildcard: &str, value: &str) -> Self {
        self.prompt = self.prompt.replacen(wildcard, value, 1);
        self
    }

    /// Append `text` as a new paragraph, separated by a blank line.
    pub fn add_paragraph(mut self, text: &str) -> Self {
        self.prompt.push_str("\n\n");
        self.prompt.push_str(text);
        self
    }

    pub fn build(self) -> String {
        self.prompt
    }
}

/// Declared shape of a prompt: name, description, and its named arguments.
#[derive(Debug, Clone, Serialize)]
pub struct PromptSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub args: &'static [PromptArg],
}

#[derive(Debug, Clone, Serialize)]
pub struct PromptArg {
    pub name: &'static str,
    pub description: &'static str,
}

pub const PROMPTS: &[PromptSpec] = &[
    PromptSpec {
        name: "review_merge_request",
        description: "Guided code review for a GitLab Merge Request",
        args: &[
            PromptArg {
                name: "repoId",
                description: "Project ID or path",
            },
            PromptArg {
                name: "mrId",
                description: "Merge Request ID",
            },
        ],
    },
    PromptSpec {
        name: "review_pull_request",
        description: "Guided code review for a GitHub Pull Request",
        args: &[
            PromptArg {
                name: "repoId",
                description: "Repository name in format owner/repo",
            },
            PromptArg {
                name: "prId",
                description: "Pull Request number",
            },
        ],
    },
];

/// Assemble the GitLab review prompt: substitute both placeholders, then
/// append the guidelines block. `guidelines` overrides the built-in block.
pub fn review_merge_request(repo_id: &str, mr_id: &str, guidelines: Option<&str>) -> String {
    PromptBuilder::new(templates::GITLAB_TEMPLATE)
        .replace_wildcard("{{MR_ID}}", mr_id)
        .replace_wildcard("{{REPO_ID}}", repo_id)
        .add_paragraph(guidelines.unwrap_or(templates::CODE_REVIEW_GUIDELINES))
        .build()
}

/// Assemble the GitHub review prompt; same shape as the GitLab one.
pub fn review_pull_request(repo_id: &str, pr_id: &str, guidelines: Option<&str>) -> String {
    PromptBuilder::new(templates::GITHUB_TEMPLATE)
        .replace_wildcard("{{PR_ID}}", pr_id)
        .replace_wildcard("{{REPO_ID}}", repo_id)
        .add_paragraph(guidelines.unwrap_or(templates::CODE_REVIEW_GUIDELINES))
        .build()
}
