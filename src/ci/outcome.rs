//! Outcome of a build attempt, the state machine driven by the pipeline.
//!
//! ```text
//! pending --assemble fails--> failure
//! pending --assemble ok, test fails--> error
//! pending --assemble ok, test ok--> success
//! ```
use serde_derive::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Commit status of a build attempt.
///
/// The names match the states accepted by the commit-status API of the origin host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The build has been accepted but has not finished yet.
    Pending,
    /// Assemble and test phases both succeeded.
    Success,
    /// The project assembled but its tests failed.
    Error,
    /// The project failed to assemble.
    Failure,
}

impl Outcome {
    /// Terminal outcome for the given phase results.
    ///
    /// `test_ok` is ignored when assembly failed, since the test phase never runs then.
    #[must_use]
    pub const fn classify(assemble_ok: bool, test_ok: bool) -> Self {
        match (assemble_ok, test_ok) {
            (false, _) => Self::Failure,
            (true, false) => Self::Error,
            (true, true) => Self::Success,
        }
    }

    /// Wire/storage name of the outcome.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Error => "error",
            Self::Failure => "failure",
        }
    }

    /// Whether the outcome is final.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(*self, Self::Pending)
    }

    /// Short human readable summary, used as the commit-status description.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match *self {
            Self::Pending => "Working",
            Self::Success => "Build successful",
            Self::Error => "Tests failed",
            Self::Failure => "Build failed",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> anyhow::Result<Self> {
        match value {
            "pending" => Ok(Self::Pending),
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            "failure" => Ok(Self::Failure),
            _ => Err(anyhow::anyhow!("Invalid outcome value: {value}")),
        }
    }
}

#[cfg(test)]
mod test {
    use super::Outcome;

    #[test]
    fn test_classify_when_assemble_fails_expect_failure() {
        assert_eq!(Outcome::classify(false, true), Outcome::Failure);
        assert_eq!(Outcome::classify(false, false), Outcome::Failure);
    }

    #[test]
    fn test_classify_when_tests_fail_expect_error() {
        assert_eq!(Outcome::classify(true, false), Outcome::Error);
    }

    #[test]
    fn test_classify_when_everything_passes_expect_success() {
        assert_eq!(Outcome::classify(true, true), Outcome::Success);
    }

    #[test]
    fn test_from_str_when_unknown_value_expect_error() {
        assert!("running".parse::<Outcome>().is_err());
    }

    #[test]
    fn test_serialize_expect_lowercase_state() {
        let actual = serde_json::to_string(&Outcome::Failure).unwrap();
        assert_eq!(actual, "\"failure\"");
    }
}
