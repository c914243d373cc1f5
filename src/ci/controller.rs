//! Sequencing one push through workspace, pipeline, notifier and history.
use super::build_tool::BuildTool;
use super::notifier::Notify;
use super::outcome::Outcome;
use super::pipeline::{build_and_test, BuildResults};
use super::push::PushEvent;
use super::workspace::Workspace;
use crate::errors::{PersistenceError, SourceControlError};
use crate::history::HistoryStore;
use crate::utils::git::clone_branch;
use actix_web::web;
use std::path::PathBuf;
use std::sync::Arc;

/// Longest commit status description the status API accepts, in characters.
pub const MAX_STATUS_DESCRIPTION: usize = 140;

/// Everything a build attempt needs besides the push itself.
#[derive(Clone)]
pub struct BuildContext {
    /// Where build records are kept.
    pub history: HistoryStore,
    /// Tool used to assemble and test checkouts.
    pub build_tool: Arc<dyn BuildTool>,
    /// Parent directory of all workspaces.
    pub workspace_root: PathBuf,
}

/// How the handling of a push ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// The pipeline ran and its result was recorded.
    Recorded {
        /// Id of the new build record.
        build_id: i64,
        /// Terminal outcome of the build.
        outcome: Outcome,
    },
    /// The pipeline could not start, nothing was recorded.
    Aborted {
        /// What went wrong, as reported in the commit status.
        reason: String,
    },
}

/// Build the pushed branch, report its status and record the attempt.
///
/// The commit status goes to `pending` first, then to the terminal outcome. When the
/// branch cannot be cloned the status goes to `failure` with the error as description
/// and no build record is written. The workspace is removed on every path.
///
/// # Errors
/// Errors if the build record cannot be stored.
#[tracing::instrument(skip_all, fields(repository = %push.repository_full_name, branch = %push.branch))]
pub async fn handle_push(
    ctx: &BuildContext,
    notifier: &dyn Notify,
    push: &PushEvent,
    details_url: &str,
) -> Result<PushOutcome, PersistenceError> {
    tracing::info!(commits = push.commits.len(), "CI job started");
    notifier
        .report(Outcome::Pending, Outcome::Pending.description(), details_url)
        .await;

    let mut workspace = match Workspace::allocate(&ctx.workspace_root, &ctx.build_tool.cache_dirs()) {
        Ok(workspace) => workspace,
        Err(err) => {
            let reason = format!("Could not allocate a workspace: {err}");
            return Ok(abort(notifier, reason, details_url).await);
        }
    };

    if let Err(err) = clone(push, &workspace).await {
        workspace.release();
        return Ok(abort(notifier, err.to_string(), details_url).await);
    }

    let results = build(Arc::clone(&ctx.build_tool), &workspace).await;
    notifier
        .report(results.outcome, results.outcome.description(), details_url)
        .await;

    let build_id = ctx
        .history
        .add_build_record(
            &push.sender,
            &push.commits,
            &results.build_details(),
            &results.test_details(),
            &push.branch,
            push.pushed_at,
        )
        .await?;
    workspace.release();
    Ok(PushOutcome::Recorded {
        build_id,
        outcome: results.outcome,
    })
}

/// Report a `failure` status for a push that could not be built.
///
/// The status carries a shortened description; the full reason is logged and returned.
async fn abort(notifier: &dyn Notify, reason: String, details_url: &str) -> PushOutcome {
    tracing::error!("Build aborted: {reason}");
    notifier
        .report(Outcome::Failure, &status_description(&reason), details_url)
        .await;
    PushOutcome::Aborted { reason }
}

/// Cut `text` down to [`MAX_STATUS_DESCRIPTION`] characters, ending a cut text with `…`.
#[must_use]
pub fn status_description(text: &str) -> String {
    if text.chars().count() <= MAX_STATUS_DESCRIPTION {
        return text.to_owned();
    }
    let mut description: String = text.chars().take(MAX_STATUS_DESCRIPTION - 1).collect();
    description.push('…');
    description
}

/// Clone the pushed branch into the workspace on the blocking thread pool.
async fn clone(push: &PushEvent, workspace: &Workspace) -> Result<(), SourceControlError> {
    let url = push.repository_clone_url.clone();
    let branch = push.branch.clone();
    let work_dir = workspace.path().to_path_buf();
    web::block(move || clone_branch(&url, &branch, &work_dir))
        .await
        .map_err(|err| SourceControlError::Task(err.to_string()))?
}

/// Run the pipeline on the blocking thread pool.
async fn build(tool: Arc<dyn BuildTool>, workspace: &Workspace) -> BuildResults {
    let work_dir = workspace.path().to_path_buf();
    web::block(move || build_and_test(tool.as_ref(), &work_dir))
        .await
        .unwrap_or_else(|err| {
            tracing::error!("Build task failed: {err}");
            BuildResults {
                outcome: Outcome::Failure,
                total_tests: 0,
                passed_tests: 0,
                build_log: err.to_string(),
                test_log: String::new(),
            }
        })
}
