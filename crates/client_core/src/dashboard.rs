//! Dashboard synchronization: snapshot loads, milestone completion and the
//! small read models the presentation layer renders.
//!
//! Failures are logged and leave state untouched. No request is retried.

use std::{collections::HashSet, mem, ops::RangeInclusive, sync::Arc};

use chrono::Utc;
use shared::{
    domain::{Milestone, MilestoneId, MilestoneStatus, Project, ProjectId, TaskType, UserId},
    protocol::{CreateMilestoneRequest, DashboardSnapshot, TaskHistoryRequest},
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    ids,
    state::{self, reduce, SyncEvent, SyncState},
    ProjectService,
};

pub const SUCCESS_RATINGS: RangeInclusive<u8> = 1..=5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { version: u64 },
    Superseded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    Completed,
    AlreadyCompleted,
    InFlight,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneRow {
    pub id: MilestoneId,
    pub title: String,
    pub status: MilestoneStatus,
    pub progress_percent: u8,
    pub assignee: String,
    pub due_date: Option<String>,
}

pub fn milestone_rows(snapshot: &DashboardSnapshot) -> Vec<MilestoneRow> {
    snapshot
        .milestones
        .iter()
        .map(|milestone| MilestoneRow {
            id: milestone.id.clone(),
            title: milestone.title.clone(),
            status: milestone.status,
            progress_percent: milestone.status.progress_percent(),
            assignee: state::assignee_name(snapshot, milestone).to_string(),
            due_date: milestone.due_date.clone(),
        })
        .collect()
}

pub(crate) struct DashboardState {
    pub(crate) sync: SyncState,
    sequence: u64,
    inflight_completions: HashSet<MilestoneId>,
}

impl DashboardState {
    fn next_ticket(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    pub(crate) fn apply(&mut self, event: SyncEvent) -> u64 {
        let current = mem::take(&mut self.sync);
        self.sync = reduce(current, event);
        self.sync.version
    }
}

pub struct DashboardController {
    pub(crate) service: Arc<dyn ProjectService>,
    pub(crate) inner: Mutex<DashboardState>,
}

impl DashboardController {
    pub fn new(service: Arc<dyn ProjectService>) -> Arc<Self> {
        Arc::new(Self {
            service,
            inner: Mutex::new(DashboardState {
                sync: SyncState::default(),
                sequence: 0,
                inflight_completions: HashSet::new(),
            }),
        })
    }

    pub async fn state(&self) -> SyncState {
        self.inner.lock().await.sync.clone()
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        self.inner.lock().await.sync.snapshot.clone()
    }

    pub async fn version(&self) -> u64 {
        self.inner.lock().await.sync.version
    }

    /// Derived from the snapshot on every call.
    pub async fn current_project(&self) -> Option<Project> {
        self.inner
            .lock()
            .await
            .sync
            .snapshot
            .current_project()
            .cloned()
    }

    /// Replaces the whole snapshot with the server's aggregate.
    pub async fn load_snapshot(&self) -> LoadOutcome {
        let ticket = self.inner.lock().await.next_ticket();

        let snapshot = match self.service.fetch_dashboard().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(ticket, error = %err, "dashboard load failed");
                return LoadOutcome::Failed;
            }
        };

        let mut guard = self.inner.lock().await;
        if guard.sync.applied_load().is_some_and(|applied| applied > ticket) {
            debug!(ticket, "discarding dashboard load superseded by a newer one");
            return LoadOutcome::Superseded;
        }
        let version = guard.apply(SyncEvent::SnapshotLoaded { ticket, snapshot });
        info!(
            ticket,
            version,
            projects = guard.sync.snapshot.projects.len(),
            milestones = guard.sync.snapshot.milestones.len(),
            "dashboard loaded"
        );
        LoadOutcome::Applied { version }
    }

    /// Marks a milestone completed on the server, then locally.
    ///
    /// The local patch is applied only after the server confirms, so a
    /// failed request leaves nothing to undo.
    pub async fn complete_milestone(&self, milestone_id: &MilestoneId) -> CompletionOutcome {
        {
            let mut guard = self.inner.lock().await;
            if guard.sync.is_completed(milestone_id) {
                return CompletionOutcome::AlreadyCompleted;
            }
            if !guard.inflight_completions.insert(milestone_id.clone()) {
                return CompletionOutcome::InFlight;
            }
        }

        let result = self.service.complete_milestone(milestone_id).await;

        let mut guard = self.inner.lock().await;
        guard.inflight_completions.remove(milestone_id);
        match result {
            Ok(()) => {
                let confirmed_at = guard.next_ticket();
                let version = guard.apply(SyncEvent::MilestoneCompleted {
                    milestone_id: milestone_id.clone(),
                    confirmed_at,
                });
                info!(%milestone_id, version, "milestone completed");
                CompletionOutcome::Completed
            }
            Err(err) => {
                warn!(%milestone_id, error = %err, "milestone completion failed");
                CompletionOutcome::Failed
            }
        }
    }

    pub async fn resolve_assignee_name(&self, milestone: &Milestone) -> String {
        let guard = self.inner.lock().await;
        state::assignee_name(&guard.sync.snapshot, milestone).to_string()
    }

    pub async fn milestone_rows(&self) -> Vec<MilestoneRow> {
        milestone_rows(&self.inner.lock().await.sync.snapshot)
    }

    /// Creates a not-started milestone and appends it locally once accepted.
    pub async fn add_milestone(
        &self,
        project_id: &ProjectId,
        title: impl Into<String>,
        assigned_to: Option<UserId>,
        due_date: Option<String>,
    ) -> Option<MilestoneId> {
        let request = CreateMilestoneRequest {
            id: ids::milestone_id(),
            project_id: project_id.clone(),
            title: title.into(),
            status: MilestoneStatus::NotStarted,
            assigned_to,
            due_date,
            completed_at: None,
        };

        if let Err(err) = self.service.create_milestone(&request).await {
            warn!(%project_id, milestone_id = %request.id, error = %err, "milestone creation failed");
            return None;
        }

        let milestone_id = request.id.clone();
        let version = {
            let mut guard = self.inner.lock().await;
            let confirmed_at = guard.next_ticket();
            guard.apply(SyncEvent::MilestoneAdded {
                milestone: request.into(),
                confirmed_at,
            })
        };
        info!(%project_id, %milestone_id, version, "milestone added");
        Some(milestone_id)
    }

    /// Feeds the recommendation service. Does not touch local state.
    ///
    /// Ratings outside 1..=5 are rejected without a request.
    pub async fn record_task_history(
        &self,
        user_id: &UserId,
        task_type: TaskType,
        duration_minutes: u32,
        success_rating: u8,
    ) -> bool {
        if !SUCCESS_RATINGS.contains(&success_rating) {
            warn!(
                %user_id,
                %task_type,
                success_rating,
                "task history rating out of range"
            );
            return false;
        }
        let request = TaskHistoryRequest {
            id: ids::history_id(),
            user_id: user_id.clone(),
            task_type,
            duration_minutes,
            success_rating,
            timestamp: Utc::now(),
        };
        match self.service.log_task_history(&request).await {
            Ok(()) => {
                debug!(%user_id, %task_type, "task history recorded");
                true
            }
            Err(err) => {
                warn!(%user_id, %task_type, error = %err, "task history not recorded");
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/dashboard_tests.rs"]
mod tests;
