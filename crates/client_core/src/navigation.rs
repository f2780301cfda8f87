//! Top-level view routing between the dashboard and the onboarding wizard.

use tracing::debug;

use crate::onboarding::CommitOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppView {
    #[default]
    Dashboard,
    Onboarding,
}

#[derive(Debug, Clone, Default)]
pub struct Navigator {
    view: AppView,
}

impl Navigator {
    pub fn view(&self) -> AppView {
        self.view
    }

    pub fn show_dashboard(&mut self) {
        self.view = AppView::Dashboard;
    }

    pub fn show_onboarding(&mut self) {
        self.view = AppView::Onboarding;
    }

    /// An aborted commit keeps the wizard on screen.
    pub fn onboarding_finished(&mut self, outcome: &CommitOutcome) -> AppView {
        if outcome.is_completed() && self.view == AppView::Onboarding {
            self.view = AppView::Dashboard;
        }
        debug!(view = ?self.view, completed = outcome.is_completed(), "onboarding finished");
        self.view
    }
}
