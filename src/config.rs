use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .review-bridge.toml.
///
/// All fields are optional; the environment fills in anything the file leaves
/// unset (`GITLAB_TOKEN`, `GITLAB_URL`, `GITHUB_TOKEN`, `REVIEW_GUIDELINES`).
/// Which providers end up active is decided purely by which tokens are present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gitlab: GitLabConfig,

    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub review: ReviewConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitLabConfig {
    /// GitLab personal access token.
    pub token: Option<String>,
    /// Base URL for self-managed instances; public gitlab.com when unset.
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// GitHub personal access token.
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewConfig {
    /// Override for the review guidelines block appended to prompts.
    /// Either literal text or a path to a file containing it.
    pub guidelines: Option<String>,
}

impl Config {
    /// Load configuration. An explicit `path` must exist and parse; without
    /// one, .review-bridge.toml in the current directory is used if present.
    /// Environment variables fill values the file leaves unset.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let mut config = match path {
            Some(p) => Self::load_from(p)?,
            None => {
                let default = Path::new(".review-bridge.toml");
                if default.exists() {
                    Self::load_from(default)?
                } else {
                    Config::default()
                }
            }
        };
        config.apply_env();
        Ok(config)
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if self.gitlab.token.is_none() {
            self.gitlab.token = std::env::var("GITLAB_TOKEN").ok();
        }
        if self.gitlab.url.is_none() {
            self.gitlab.url = std::env::var("GITLAB_URL").ok();
        }
        if self.github.token.is_none() {
            self.github.token = std::env::var("GITHUB_TOKEN").ok();
        }
        if self.review.guidelines.is_none() {
            self.review.guidelines = std::env::var("REVIEW_GUIDELINES").ok();
        }
    }

    /// Resolve the guidelines override, if any. A value naming a readable file
    /// is read from disk; anything else is taken as literal guideline text.
    /// `None` means the built-in guidelines block applies.
    pub fn guidelines_override(&self) -> Option<String> {
        let value = self.review.guidelines.as_ref()?;
        let path = Path::new(value);
        if path.is_file() {
            match fs::read_to_string(path) {
                Ok(text) => Some(text),
                Err(_) => Some(value.clone()),
            }
        } else {
            Some(value.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_no_credentials() {
        let config = Config::default();
        assert!(config.gitlab.token.is_none());
        assert!(config.gitlab.url.is_none());
        assert!(config.github.token.is_none());
        assert!(config.review.guidelines.is_none());
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
[gitlab]
token = "glpat-abc"
url = "https://gitlab.example.com"

[github]
token = "ghp-def"

[review]
guidelines = "Keep it short."
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.gitlab.token.as_deref(), Some("glpat-abc"));
        assert_eq!(config.gitlab.url.as_deref(), Some("https://gitlab.example.com"));
        assert_eq!(config.github.token.as_deref(), Some("ghp-def"));
        assert_eq!(config.review.guidelines.as_deref(), Some("Keep it short."));
    }

    #[test]
    fn test_partial_config_parses() {
        let config: Config = toml::from_str("[github]\ntoken = \"ghp\"\n").unwrap();
        assert!(config.gitlab.token.is_none());
        assert_eq!(config.github.token.as_deref(), Some("ghp"));
    }

    #[test]
    fn test_guidelines_override_literal() {
        let config = Config {
            review: ReviewConfig {
                guidelines: Some("Only flag correctness bugs.".to_string()),
            },
            ..Config::default()
        };
        assert_eq!(
            config.guidelines_override().as_deref(),
            Some("Only flag correctness bugs.")
        );
    }

    #[test]
    fn test_guidelines_override_from_file() {
        let path = std::env::temp_dir().join("review-bridge-guidelines-test.md");
        fs::write(&path, "File-based guidelines.\n").unwrap();

        let config = Config {
            review: ReviewConfig {
                guidelines: Some(path.to_string_lossy().into_owned()),
            },
            ..Config::default()
        };
        assert_eq!(
            config.guidelines_override().as_deref(),
            Some("File-based guidelines.\n")
        );
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_guidelines_override_absent() {
        assert!(Config::default().guidelines_override().is_none());
    }
}
