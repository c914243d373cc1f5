//! Build-and-test pipeline.
use super::build_tool::{BuildTool, Phase};
use super::outcome::Outcome;
use super::report::{self, TestCounts};
use crate::db::models::build_record::{BuildDetails, TestDetails};
use std::path::Path;

/// Classified result of one build attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResults {
    /// Terminal outcome of the attempt.
    pub outcome: Outcome,
    /// Number of tests found in the test report.
    pub total_tests: i64,
    /// Number of tests that passed.
    pub passed_tests: i64,
    /// Captured output of the assemble phase.
    pub build_log: String,
    /// Captured output of the test phase, empty when tests never ran.
    pub test_log: String,
}

impl BuildResults {
    /// Assemble part of the results, as stored in the history.
    #[must_use]
    pub fn build_details(&self) -> BuildDetails {
        BuildDetails {
            outcome: self.outcome,
            log: self.build_log.clone(),
        }
    }

    /// Test part of the results, as stored in the history.
    #[must_use]
    pub fn test_details(&self) -> TestDetails {
        TestDetails {
            total: self.total_tests,
            passed: self.passed_tests,
            log: self.test_log.clone(),
        }
    }
}

/// Assemble then test the project checked out in `work_dir`.
///
/// A failed assemble phase ends the attempt with [`Outcome::Failure`] and no test counts.
/// Otherwise the test phase decides between [`Outcome::Success`] and [`Outcome::Error`],
/// and the counts are scraped from the test report whatever the test result. A missing
/// or malformed report leaves the counts at zero without changing the outcome.
///
/// Build tool failures are part of the returned outcome; this never fails.
pub fn build_and_test(tool: &dyn BuildTool, work_dir: &Path) -> BuildResults {
    let assemble = tool.run(Phase::Assemble, work_dir);
    if let Err(err) = &assemble.result {
        tracing::info!("Assemble phase failed: {err}");
        return BuildResults {
            outcome: Outcome::classify(false, false),
            total_tests: 0,
            passed_tests: 0,
            build_log: assemble.log,
            test_log: String::new(),
        };
    }

    let test = tool.run(Phase::Test, work_dir);
    if let Err(err) = &test.result {
        tracing::info!("Test phase failed: {err}");
    }
    let outcome = Outcome::classify(true, test.succeeded());
    let counts = report::scrape(&tool.report_path(work_dir)).unwrap_or_else(|err| {
        tracing::warn!(%outcome, "Could not read test counts: {err}");
        TestCounts::default()
    });
    tracing::info!(%outcome, total = counts.total, passed = counts.passed, "Build finished");

    BuildResults {
        outcome,
        total_tests: counts.total,
        passed_tests: counts.passed,
        build_log: assemble.log,
        test_log: test.log,
    }
}
