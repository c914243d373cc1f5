//! Configuration file for the build tool.
//!
//! ```toml
//! [build]
//! program = "./gradlew"
//! assemble_args = ["--console=plain", "assemble"]
//! test_args = ["--console=plain", "test"]
//! report_path = "build/reports/tests/test/index.html"
//! cache_dirs = [".gradle", "build"]
//! ```
use serde_derive::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

/// Top level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// External build tool settings.
    #[serde(default)]
    pub build: BuildToolConfig,
}

/// How to drive the external build tool.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BuildToolConfig {
    /// Program to run, resolved through `PATH` or relative to the workspace.
    pub program: String,
    /// Arguments of the assemble phase.
    pub assemble_args: Vec<String>,
    /// Arguments of the test phase.
    pub test_args: Vec<String>,
    /// Location of the generated test report, relative to the workspace.
    pub report_path: PathBuf,
    /// Cache and state directories the tool leaves in the workspace.
    pub cache_dirs: Vec<PathBuf>,
}

impl Default for BuildToolConfig {
    fn default() -> Self {
        Self {
            program: "gradle".to_owned(),
            assemble_args: vec!["--console=plain".to_owned(), "assemble".to_owned()],
            test_args: vec!["--console=plain".to_owned(), "test".to_owned()],
            report_path: PathBuf::from("build/reports/tests/test/index.html"),
            cache_dirs: vec![PathBuf::from(".gradle"), PathBuf::from("build")],
        }
    }
}

impl Config {
    /// Load a config file.
    ///
    /// # Errors
    /// Will error if unable to read or parse the file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let config_str = read_to_string(path)?;
        let conf: Self = toml::from_str(&config_str)?;
        Ok(conf)
    }

    /// Load `path` when given, otherwise use the defaults.
    ///
    /// # Errors
    /// Will error if `path` is given but cannot be loaded.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}
