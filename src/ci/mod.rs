//! The ci module runs build attempts: workspace, clone, build, test, report.
pub mod build_tool;
pub mod controller;
pub mod notifier;
pub mod outcome;
pub mod pipeline;
pub mod push;
pub mod report;
pub mod workspace;
