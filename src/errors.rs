//! Error taxonomy of a build attempt.
//!
//! Only [`SourceControlError`] and [`PersistenceError`] ever reach the request handler.
//! Build tool and report failures are folded into the build's [`Outcome`](crate::ci::outcome::Outcome).
use std::path::PathBuf;
use thiserror::Error;

/// Cloning or checking out the pushed branch failed.
#[derive(Debug, Error)]
pub enum SourceControlError {
    /// The remote could not be cloned.
    #[error("could not clone {url}: {source}")]
    Clone {
        /// Remote that was being cloned.
        url: String,
        /// Underlying git error.
        source: git2::Error,
    },
    /// The pushed branch does not exist on the remote.
    #[error("branch '{branch}' does not exist on the remote")]
    BranchNotFound {
        /// Name of the missing branch.
        branch: String,
    },
    /// Creating or checking out the local branch failed.
    #[error("could not check out branch '{branch}': {source}")]
    Checkout {
        /// Branch that was being checked out.
        branch: String,
        /// Underlying git error.
        source: git2::Error,
    },
    /// The blocking clone task did not complete.
    #[error("clone task failed: {0}")]
    Task(String),
}

/// A phase of the external build tool did not succeed.
#[derive(Debug, Error)]
pub enum BuildToolError {
    /// The tool could not be started at all.
    #[error("could not start `{program}`: {source}")]
    Spawn {
        /// Program that was invoked.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The tool ran and reported failure.
    #[error("`{phase}` phase exited with status {code:?}")]
    Failed {
        /// Name of the phase.
        phase: String,
        /// Exit code, `None` when the process was killed by a signal.
        code: Option<i32>,
    },
}

/// The generated test report could not be scraped.
#[derive(Debug, Error)]
pub enum ReportParseError {
    /// No report was generated.
    #[error("test report {} could not be read: {source}", path.display())]
    Unreadable {
        /// Expected location of the report.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// A counter was not found in the report.
    #[error("test report is missing the {0} counter")]
    MissingCounter(&'static str),
    /// A counter did not hold a number.
    #[error("test report counter '{value}' is not a number")]
    InvalidCounter {
        /// Text found inside the counter.
        value: String,
    },
}

/// The history store could not be reached or written to.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Writing to the store failed. Nothing of the write is kept.
    #[error("history write failed: {0:#}")]
    Write(anyhow::Error),
    /// Reading from the store failed.
    #[error("history read failed: {0:#}")]
    Read(anyhow::Error),
}
