//! Two-step onboarding wizard: project details, then the team roster.
//!
//! [`OnboardingWizard::commit`] creates the project and then each named
//! roster entry, in order, one request at a time. The sequence is not
//! atomic. The first failure stops it, and whatever was created before
//! stays created on the server; nothing is rolled back.

use chrono::{DateTime, Utc};
use shared::{
    domain::{ProjectId, ProjectStatus, Role, Skills, UserId},
    protocol::{CreateProjectRequest, CreateUserRequest},
};
use thiserror::Error;
use tracing::{error, info};

use crate::{ids, ProjectService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingStep {
    ProjectInfo,
    Roster,
}

impl OnboardingStep {
    pub fn number(self) -> u8 {
        match self {
            OnboardingStep::ProjectInfo => 1,
            OnboardingStep::Roster => 2,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterEntry {
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterUpdate {
    Name(String),
    Role(Role),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingForm {
    pub project_name: String,
    pub deadline: String,
    pub roster: Vec<RosterEntry>,
}

impl Default for OnboardingForm {
    fn default() -> Self {
        Self {
            project_name: String::new(),
            deadline: String::new(),
            roster: vec![RosterEntry::default()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OnboardingError {
    #[error("operation requires step {expected} but wizard is on step {actual}")]
    InvalidStep { expected: u8, actual: u8 },
    #[error("roster index {index} out of bounds for {len} entries")]
    RosterIndexOutOfBounds { index: usize, len: usize },
}

/// Requests a commit will issue, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitPlan {
    pub project: CreateProjectRequest,
    pub users: Vec<CreateUserRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReport {
    pub project_id: ProjectId,
    pub user_ids: Vec<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Completed(CommitReport),
    Aborted,
}

impl CommitOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, CommitOutcome::Completed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingWizard {
    step: OnboardingStep,
    form: OnboardingForm,
}

impl Default for OnboardingWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl OnboardingWizard {
    pub fn new() -> Self {
        Self {
            step: OnboardingStep::ProjectInfo,
            form: OnboardingForm::default(),
        }
    }

    pub fn step(&self) -> OnboardingStep {
        self.step
    }

    pub fn form(&self) -> &OnboardingForm {
        &self.form
    }

    pub fn set_project_name(&mut self, name: impl Into<String>) {
        self.form.project_name = name.into();
    }

    pub fn set_deadline(&mut self, deadline: impl Into<String>) {
        self.form.deadline = deadline.into();
    }

    /// Project name and deadline are not validated here; the server decides.
    pub fn advance_to_roster(&mut self) -> Result<(), OnboardingError> {
        self.require(OnboardingStep::ProjectInfo)?;
        self.step = OnboardingStep::Roster;
        Ok(())
    }

    pub fn return_to_project_info(&mut self) -> Result<(), OnboardingError> {
        self.require(OnboardingStep::Roster)?;
        self.step = OnboardingStep::ProjectInfo;
        Ok(())
    }

    /// Appends an empty member entry and returns its index.
    pub fn add_roster_entry(&mut self) -> usize {
        self.form.roster.push(RosterEntry::default());
        self.form.roster.len() - 1
    }

    pub fn update_roster_entry(
        &mut self,
        index: usize,
        update: RosterUpdate,
    ) -> Result<(), OnboardingError> {
        let len = self.form.roster.len();
        let entry = self
            .form
            .roster
            .get_mut(index)
            .ok_or(OnboardingError::RosterIndexOutOfBounds { index, len })?;
        match update {
            RosterUpdate::Name(name) => entry.name = name,
            RosterUpdate::Role(role) => entry.role = role,
        }
        Ok(())
    }

    /// Entries with an empty name are left out.
    pub fn plan_commit(&self, submitted_at: DateTime<Utc>) -> CommitPlan {
        let project = CreateProjectRequest {
            id: ids::project_id(submitted_at),
            name: self.form.project_name.clone(),
            deadline: self.form.deadline.clone(),
            status: ProjectStatus::Active,
            created_at: submitted_at,
        };
        let users = self
            .form
            .roster
            .iter()
            .filter(|entry| !entry.name.is_empty())
            .map(|entry| CreateUserRequest {
                id: ids::user_id(submitted_at),
                name: entry.name.clone(),
                role: entry.role,
                skills: Skills::new(),
            })
            .collect();
        CommitPlan { project, users }
    }

    pub async fn commit(
        &self,
        service: &dyn ProjectService,
    ) -> Result<CommitOutcome, OnboardingError> {
        self.commit_at(service, Utc::now()).await
    }

    pub async fn commit_at(
        &self,
        service: &dyn ProjectService,
        submitted_at: DateTime<Utc>,
    ) -> Result<CommitOutcome, OnboardingError> {
        self.require(OnboardingStep::Roster)?;
        let plan = self.plan_commit(submitted_at);

        if let Err(err) = service.create_project(&plan.project).await {
            error!(project_id = %plan.project.id, error = %err, "onboarding failed: project not created");
            return Ok(CommitOutcome::Aborted);
        }

        let mut user_ids = Vec::with_capacity(plan.users.len());
        for user in &plan.users {
            if let Err(err) = service.create_user(user).await {
                error!(
                    project_id = %plan.project.id,
                    user_name = %user.name,
                    created_users = user_ids.len(),
                    error = %err,
                    "onboarding failed: roster partially created"
                );
                return Ok(CommitOutcome::Aborted);
            }
            user_ids.push(user.id.clone());
        }

        info!(
            project_id = %plan.project.id,
            users = user_ids.len(),
            "onboarding committed"
        );
        Ok(CommitOutcome::Completed(CommitReport {
            project_id: plan.project.id,
            user_ids,
        }))
    }

    fn require(&self, expected: OnboardingStep) -> Result<(), OnboardingError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(OnboardingError::InvalidStep {
                expected: expected.number(),
                actual: self.step.number(),
            })
        }
    }
}

#[cfg(test)]
#[path = "tests/onboarding_tests.rs"]
mod tests;
