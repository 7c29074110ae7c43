use super::{GitHubAdapter, GitLabAdapter, PlatformError};
use crate::config::Config;

/// The adapters activated by the credentials present in the configuration:
/// zero, one, or both providers.
pub struct ActivePlatforms {
    pub gitlab: Option<GitLabAdapter>,
    pub github: Option<GitHubAdapter>,
}

impl ActivePlatforms {
    pub fn is_empty(&self) -> bool {
        self.gitlab.is_none() && self.github.is_none()
    }
}

/// Construct an adapter for each provider whose token is configured.
///
/// Pure function of the configuration value: no network call is made, so bad
/// credentials only surface as `Unauthorized` on the first API call.
pub fn from_config(config: &Config) -> Result<ActivePlatforms, PlatformError> {
    let gitlab = match &config.gitlab.token {
        Some(token) => Some(GitLabAdapter::new(token, config.gitlab.url.as_deref())?),
        None => None,
    };

    let github = match &config.github.token {
        Some(token) => Some(GitHubAdapter::new(token)?),
        None => None,
    };

    Ok(ActivePlatforms { gitlab, github })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GitHubConfig, GitLabConfig};

    fn config(gitlab_token: Option<&str>, github_token: Option<&str>) -> Config {
        Config {
            gitlab: GitLabConfig {
                token: gitlab_token.map(String::from),
                url: None,
            },
            github: GitHubConfig {
                token: github_token.map(String::from),
            },
            ..Config::default()
        }
    }

    #[test]
    fn test_no_tokens_yields_no_platforms() {
        let platforms = from_config(&config(None, None)).unwrap();
        assert!(platforms.is_empty());
    }

    #[test]
    fn test_gitlab_only() {
        let platforms = from_config(&config(Some("glpat"), None)).unwrap();
        assert!(platforms.gitlab.is_some());
        assert!(platforms.github.is_none());
        assert!(!platforms.is_empty());
    }

    #[test]
    fn test_github_only() {
        let platforms = from_config(&config(None, Some("ghp"))).unwrap();
        assert!(platforms.gitlab.is_none());
        assert!(platforms.github.is_some());
    }

    #[test]
    fn test_both_providers() {
        let platforms = from_config(&config(Some("glpat"), Some("ghp"))).unwrap();
        assert!(platforms.gitlab.is_some());
        assert!(platforms.github.is_some());
    }

    #[test]
    fn test_custom_gitlab_url_propagates() {
        let mut cfg = config(Some("glpat"), None);
        cfg.gitlab.url = Some("https://gitlab.example.com".to_string());
        assert!(from_config(&cfg).unwrap().gitlab.is_some());

        cfg.gitlab.url = Some("::garbage::".to_string());
        assert!(from_config(&cfg).is_err());
    }
}
