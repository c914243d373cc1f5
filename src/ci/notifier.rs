//! Reporting build outcomes to the origin host's commit-status API.
use super::outcome::Outcome;
use super::push::PushEvent;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_derive::Serialize;

/// Environment variable holding the commit-status token.
pub const TOKEN_ENV_VAR: &str = "GITHUB_COMMIT_STATUS_TOKEN";
/// Default commit-status API base url.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Something that can publish the status of the commit being built.
#[async_trait]
pub trait Notify: Send + Sync {
    /// Publish `outcome`. Returns whether the origin host accepted the status.
    ///
    /// Failures are logged, never raised: a build goes on whether or not its status
    /// could be published.
    async fn report(&self, outcome: Outcome, description: &str, details_url: &str) -> bool;
}

/// Body of a commit-status request.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct StatusPayload<'status> {
    /// Outcome of the build.
    pub state: Outcome,
    /// Short human readable summary.
    pub description: &'status str,
    /// Link to the build's page.
    pub target_url: &'status str,
}

/// Settings shared by every push's notifier.
#[derive(Debug, Clone)]
pub struct NotifierSettings {
    /// Shared HTTP client.
    pub client: Client,
    /// Base url of the commit-status API.
    pub api_url: String,
    /// Credential for the API. Without it no status is ever sent.
    pub token: Option<String>,
}

impl NotifierSettings {
    /// Settings with the token read from [`TOKEN_ENV_VAR`].
    #[must_use]
    pub fn from_env(api_url: &str) -> Self {
        let token = std::env::var(TOKEN_ENV_VAR).ok().filter(|token| !token.is_empty());
        if token.is_none() {
            tracing::warn!("{TOKEN_ENV_VAR} is not set, commit statuses will not be reported");
        }
        Self {
            client: Client::new(),
            api_url: api_url.to_owned(),
            token,
        }
    }

    /// Notifier for the head commit of `push`.
    #[must_use]
    pub fn for_push(&self, push: &PushEvent) -> StatusNotifier {
        StatusNotifier {
            settings: self.clone(),
            repository_full_name: push.repository_full_name.clone(),
            sha: push.head_commit().map(|commit| commit.sha.clone()),
        }
    }
}

/// Publishes commit statuses for the last commit of one push.
#[derive(Debug, Clone)]
pub struct StatusNotifier {
    /// Client, API location and credential.
    settings: NotifierSettings,
    /// `owner/name` of the repository.
    repository_full_name: String,
    /// Commit the statuses are attached to, `None` for a push without commits.
    sha: Option<String>,
}

impl StatusNotifier {
    /// Commit-status endpoint for `sha`.
    #[must_use]
    pub fn status_url(&self, sha: &str) -> String {
        format!(
            "{}/repos/{}/statuses/{sha}",
            self.settings.api_url.trim_end_matches('/'),
            self.repository_full_name
        )
    }
}

#[async_trait]
impl Notify for StatusNotifier {
    #[tracing::instrument(skip(self, description, details_url), fields(sha = ?self.sha))]
    async fn report(&self, outcome: Outcome, description: &str, details_url: &str) -> bool {
        let Some(sha) = self.sha.as_deref() else {
            tracing::warn!("Push has no commits, no status to report");
            return false;
        };
        let Some(token) = self.settings.token.as_deref() else {
            tracing::warn!("No commit status token, skipping status report");
            return false;
        };
        let payload = StatusPayload {
            state: outcome,
            description,
            target_url: details_url,
        };
        let response = self
            .settings
            .client
            .post(self.status_url(sha))
            .bearer_auth(token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", concat!("hookci/", env!("CARGO_PKG_VERSION")))
            .json(&payload)
            .send()
            .await;
        match response {
            Ok(response) if response.status() == StatusCode::CREATED => {
                tracing::info!("Commit status updated to {outcome}");
                true
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                tracing::error!(%status, "Commit status update was unsuccessful: {body}");
                false
            }
            Err(err) => {
                tracing::error!("Commit status request failed: {err}");
                false
            }
        }
    }
}
