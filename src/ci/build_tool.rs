//! Driving the external build tool.
use crate::config::BuildToolConfig;
use crate::errors::BuildToolError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// The two phases a build attempt goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Compile and package the project.
    Assemble,
    /// Run the project's tests.
    Test,
}

impl fmt::Display for Phase {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::Assemble => formatter.write_str("assemble"),
            Self::Test => formatter.write_str("test"),
        }
    }
}

/// Output of one phase.
#[derive(Debug)]
pub struct PhaseRun {
    /// Everything the tool wrote: all of stdout, then all of stderr.
    ///
    /// The two streams are captured separately, so their lines are not interleaved.
    pub log: String,
    /// Whether the tool reported success.
    pub result: Result<(), BuildToolError>,
}

impl PhaseRun {
    /// Whether the phase succeeded.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// An external build tool able to assemble and test a checked out project.
pub trait BuildTool: Send + Sync {
    /// Run `phase` inside `work_dir`, blocking until the tool exits.
    fn run(&self, phase: Phase, work_dir: &Path) -> PhaseRun;

    /// Where the tool writes its test report inside `work_dir`.
    fn report_path(&self, work_dir: &Path) -> PathBuf;

    /// Cache and state directories the tool leaves in a workspace, relative to it.
    fn cache_dirs(&self) -> Vec<PathBuf>;
}

/// A build tool invoked as an external command.
#[derive(Debug, Clone)]
pub struct CommandBuildTool {
    /// Command line settings.
    config: BuildToolConfig,
}

impl CommandBuildTool {
    /// Create a new tool from its settings.
    #[must_use]
    pub const fn new(config: BuildToolConfig) -> Self {
        Self { config }
    }

    /// Arguments for `phase`.
    fn args(&self, phase: Phase) -> &[String] {
        match phase {
            Phase::Assemble => &self.config.assemble_args,
            Phase::Test => &self.config.test_args,
        }
    }
}

impl BuildTool for CommandBuildTool {
    fn run(&self, phase: Phase, work_dir: &Path) -> PhaseRun {
        let program = &self.config.program;
        tracing::info!(%phase, program = %program, "Running build tool");
        let output = match Command::new(program)
            .args(self.args(phase))
            .current_dir(work_dir)
            .output()
        {
            Ok(output) => output,
            Err(source) => {
                let error = BuildToolError::Spawn {
                    program: program.clone(),
                    source,
                };
                tracing::warn!(%phase, "{error}");
                return PhaseRun {
                    log: error.to_string(),
                    result: Err(error),
                };
            }
        };

        let mut log = String::from_utf8_lossy(&output.stdout).into_owned();
        log.push_str(&String::from_utf8_lossy(&output.stderr));
        tracing::debug!(%phase, "Build tool output:\n{log}");

        let result = if output.status.success() {
            Ok(())
        } else {
            Err(BuildToolError::Failed {
                phase: phase.to_string(),
                code: output.status.code(),
            })
        };
        PhaseRun { log, result }
    }

    fn report_path(&self, work_dir: &Path) -> PathBuf {
        work_dir.join(&self.config.report_path)
    }

    fn cache_dirs(&self) -> Vec<PathBuf> {
        self.config.cache_dirs.clone()
    }
}
