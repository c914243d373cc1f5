//! Push events received from the origin host's webhook.
use crate::db::models::{commit::NewCommit, person::NewPerson};
use chrono::{DateTime, Utc};
use serde_derive::Deserialize;

/// Prefix of branch refs.
const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// A set of commits newly pushed to a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushEvent {
    /// URL to clone the repository from.
    pub repository_clone_url: String,
    /// `owner/name` of the repository on the origin host.
    pub repository_full_name: String,
    /// Branch the commits were pushed to.
    pub branch: String,
    /// When the push happened.
    pub pushed_at: DateTime<Utc>,
    /// Who pushed.
    pub sender: NewPerson,
    /// Pushed commits, oldest first.
    pub commits: Vec<NewCommit>,
}

impl PushEvent {
    /// Decode a GitHub `push` webhook payload.
    ///
    /// # Errors
    /// Errors if the body is not JSON or misses one of the consumed fields.
    pub fn from_json(body: &[u8]) -> anyhow::Result<Self> {
        let payload: Payload = serde_json::from_slice(body)?;
        let pushed_at = DateTime::<Utc>::from_timestamp(payload.repository.pushed_at, 0)
            .ok_or_else(|| anyhow::anyhow!("Invalid push timestamp"))?;
        let branch = payload
            .git_ref
            .strip_prefix(BRANCH_REF_PREFIX)
            .unwrap_or(&payload.git_ref)
            .to_owned();
        let sender = NewPerson::sender(
            payload.sender.login,
            payload.sender.html_url.unwrap_or(payload.sender.url),
            payload.sender.avatar_url,
        );
        let commits = payload
            .commits
            .into_iter()
            .map(|commit| NewCommit {
                sha: commit.id,
                message: commit.message,
                url: commit.url,
                modified_files: commit.modified,
                author: NewPerson::author(
                    commit.author.name,
                    commit.author.username,
                    commit.author.email,
                ),
            })
            .collect();
        Ok(Self {
            repository_clone_url: payload.repository.clone_url,
            repository_full_name: payload.repository.full_name,
            branch,
            pushed_at,
            sender,
            commits,
        })
    }

    /// Last commit of the push, the one commit statuses are attached to.
    #[must_use]
    pub fn head_commit(&self) -> Option<&NewCommit> {
        self.commits.last()
    }
}

/// Consumed subset of the webhook payload.
#[derive(Deserialize)]
struct Payload {
    /// Full ref that was pushed.
    #[serde(rename = "ref")]
    git_ref: String,
    /// Repository that was pushed to.
    repository: PayloadRepository,
    /// Who pushed.
    sender: PayloadSender,
    /// Pushed commits.
    #[serde(default)]
    commits: Vec<PayloadCommit>,
}

///
#[derive(Deserialize)]
struct PayloadRepository {
    /// URL to clone from.
    clone_url: String,
    /// `owner/name`.
    full_name: String,
    /// Unix timestamp of the push.
    pushed_at: i64,
}

///
#[derive(Deserialize)]
struct PayloadSender {
    /// Login of the sender.
    login: String,
    /// API url of the sender.
    url: String,
    /// Profile page of the sender.
    html_url: Option<String>,
    /// Avatar of the sender.
    avatar_url: String,
}

///
#[derive(Deserialize)]
struct PayloadCommit {
    /// Commit sha.
    id: String,
    /// Commit message.
    message: String,
    /// Link to the commit.
    url: String,
    /// Commit author.
    author: PayloadAuthor,
    /// Paths modified by the commit.
    #[serde(default)]
    modified: Vec<String>,
}

///
#[derive(Deserialize)]
struct PayloadAuthor {
    /// Author name.
    name: String,
    /// Author e-mail.
    email: String,
    /// Author login, missing when the e-mail is not tied to an account.
    #[serde(default)]
    username: String,
}
