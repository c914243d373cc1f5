//! The git module clones pushed branches into build workspaces.
use crate::errors::SourceControlError;
use git2::{build::CheckoutBuilder, BranchType, ErrorCode, Repository};
use std::path::Path;

/// Name of the remote created by a clone.
const ORIGIN: &str = "origin";

/// Clone `remote_url` into `work_dir` and check out `branch`.
///
/// Performs a full clone, then creates a local `branch` tracking `origin/<branch>`
/// (reusing the local branch when the clone already created it, as it does for the
/// remote's default branch) and checks it out, so that the working tree matches the
/// tip of the pushed branch.
///
/// # Errors
///
/// Will return `Err` if the remote cannot be cloned, if `branch` does not exist on the
/// remote, or if the branch cannot be created or checked out. The partially populated
/// `work_dir` is left for the caller to release.
pub fn clone_branch(
    remote_url: &str,
    branch: &str,
    work_dir: &Path,
) -> Result<(), SourceControlError> {
    tracing::info!(branch, "Cloning {remote_url} into {}", work_dir.display());
    let repo = Repository::clone(remote_url, work_dir).map_err(|source| SourceControlError::Clone {
        url: remote_url.to_owned(),
        source,
    })?;
    tracing::debug!("Completed cloning");
    checkout_tracking_branch(&repo, branch)?;
    tracing::info!(branch, "Checked out branch");
    Ok(())
}

/// Create or reuse the local `branch`, point it at `origin/<branch>` and check it out.
fn checkout_tracking_branch(repo: &Repository, branch: &str) -> Result<(), SourceControlError> {
    let checkout_error = |source| SourceControlError::Checkout {
        branch: branch.to_owned(),
        source,
    };
    let upstream = format!("{ORIGIN}/{branch}");
    let remote_branch = match repo.find_branch(&upstream, BranchType::Remote) {
        Ok(remote_branch) => remote_branch,
        Err(err) if err.code() == ErrorCode::NotFound => {
            return Err(SourceControlError::BranchNotFound {
                branch: branch.to_owned(),
            })
        }
        Err(err) => return Err(checkout_error(err)),
    };
    let tip = remote_branch.get().peel_to_commit().map_err(checkout_error)?;

    let mut local_branch = match repo.find_branch(branch, BranchType::Local) {
        Ok(local_branch) => local_branch,
        Err(err) if err.code() == ErrorCode::NotFound => {
            repo.branch(branch, &tip, false).map_err(checkout_error)?
        }
        Err(err) => return Err(checkout_error(err)),
    };
    local_branch
        .set_upstream(Some(&upstream))
        .map_err(checkout_error)?;

    let mut checkout = CheckoutBuilder::new();
    checkout.force();
    repo.checkout_tree(tip.as_object(), Some(&mut checkout))
        .map_err(checkout_error)?;
    repo.set_head(&format!("refs/heads/{branch}"))
        .map_err(checkout_error)?;
    Ok(())
}
