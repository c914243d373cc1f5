//! Centralized state management for the Actix web server
use crate::ci::controller::BuildContext;
use crate::ci::notifier::NotifierSettings;
use crate::history::HistoryStore;

/// Global, read-only state
pub trait Global {
    /// Build history
    fn history(&self) -> &HistoryStore;
    /// What a webhook delivery needs to run a build
    fn build_context(&self) -> &BuildContext;
    /// How commit statuses are reported
    fn notifier(&self) -> &NotifierSettings;
}

/// Application state
#[derive(Clone)]
pub struct App {
    /// Build tool, workspace root and history
    pub context: BuildContext,
    /// Commit status settings
    pub notifier: NotifierSettings,
}

impl Global for App {
    fn history(&self) -> &HistoryStore {
        &self.context.history
    }

    fn build_context(&self) -> &BuildContext {
        &self.context
    }

    fn notifier(&self) -> &NotifierSettings {
        &self.notifier
    }
}
