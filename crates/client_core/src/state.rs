//! Versioned dashboard state and the reducer that evolves it.
//!
//! Every mutation the dashboard makes is a [`SyncEvent`] folded into a
//! [`SyncState`] by [`reduce`]. The reducer never performs I/O, so any
//! interleaving of network completions can be replayed deterministically.
//!
//! Snapshot loads carry a ticket drawn from a monotonic request sequence at
//! the moment they are issued. Confirmed milestone additions and completions
//! record the sequence value at confirmation. When a load resolves, mutations
//! confirmed after it was issued are re-applied on top of the fresh snapshot,
//! and a load older than one already applied is dropped.

use shared::{
    domain::{Milestone, MilestoneId, MilestoneStatus, TaskType, UserId},
    protocol::DashboardSnapshot,
};

pub const UNASSIGNED: &str = "Unassigned";
pub const NEEDS_ONBOARDING: &str = "Needs Onboarding";

/// Latest answer from the recommendation query. Lives until replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub user_id: Option<UserId>,
    pub task_type: TaskType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ConfirmedCompletion {
    milestone_id: MilestoneId,
    confirmed_at: u64,
}

#[derive(Debug, Clone, PartialEq)]
struct ConfirmedAddition {
    milestone: Milestone,
    confirmed_at: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncState {
    pub snapshot: DashboardSnapshot,
    pub version: u64,
    pub selected_task_type: TaskType,
    pub recommendation: Option<Recommendation>,
    applied_load: Option<u64>,
    // Both pruned on each applied load. In between, completions hold at most
    // one entry per milestone and additions one per confirmed create.
    confirmed_completions: Vec<ConfirmedCompletion>,
    confirmed_additions: Vec<ConfirmedAddition>,
}

impl SyncState {
    pub fn is_completed(&self, milestone_id: &MilestoneId) -> bool {
        self.snapshot
            .milestone(milestone_id)
            .is_some_and(|milestone| milestone.status.is_completed())
    }

    /// Ticket of the newest snapshot load folded into this state.
    pub fn applied_load(&self) -> Option<u64> {
        self.applied_load
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    SnapshotLoaded {
        ticket: u64,
        snapshot: DashboardSnapshot,
    },
    MilestoneCompleted {
        milestone_id: MilestoneId,
        confirmed_at: u64,
    },
    MilestoneAdded {
        milestone: Milestone,
        confirmed_at: u64,
    },
    TaskTypeSelected(TaskType),
    RecommendationReceived(Recommendation),
}

pub fn reduce(mut state: SyncState, event: SyncEvent) -> SyncState {
    match event {
        SyncEvent::SnapshotLoaded { ticket, snapshot } => {
            if state.applied_load.is_some_and(|applied| applied > ticket) {
                return state;
            }
            state.snapshot = snapshot;
            state
                .confirmed_additions
                .retain(|addition| addition.confirmed_at > ticket);
            state
                .confirmed_completions
                .retain(|completion| completion.confirmed_at > ticket);
            for addition in &state.confirmed_additions {
                if state.snapshot.milestone(&addition.milestone.id).is_none() {
                    state.snapshot.milestones.push(addition.milestone.clone());
                }
            }
            for completion in &state.confirmed_completions {
                mark_completed(&mut state.snapshot.milestones, &completion.milestone_id);
            }
            state.applied_load = Some(ticket);
        }
        SyncEvent::MilestoneCompleted {
            milestone_id,
            confirmed_at,
        } => {
            mark_completed(&mut state.snapshot.milestones, &milestone_id);
            state.confirmed_completions.push(ConfirmedCompletion {
                milestone_id,
                confirmed_at,
            });
        }
        SyncEvent::MilestoneAdded {
            milestone,
            confirmed_at,
        } => {
            state.snapshot.milestones.push(milestone.clone());
            state.confirmed_additions.push(ConfirmedAddition {
                milestone,
                confirmed_at,
            });
        }
        SyncEvent::TaskTypeSelected(task_type) => {
            state.selected_task_type = task_type;
        }
        SyncEvent::RecommendationReceived(recommendation) => {
            state.recommendation = Some(recommendation);
        }
    }
    state.version += 1;
    state
}

// Only the status field changes; order and every other entry are untouched.
fn mark_completed(milestones: &mut [Milestone], milestone_id: &MilestoneId) {
    for milestone in milestones.iter_mut().filter(|m| &m.id == milestone_id) {
        if milestone.status.can_transition_to(MilestoneStatus::Completed) {
            milestone.status = MilestoneStatus::Completed;
        }
    }
}

pub fn assignee_name<'a>(snapshot: &'a DashboardSnapshot, milestone: &Milestone) -> &'a str {
    milestone
        .assigned_to
        .as_ref()
        .and_then(|user_id| snapshot.user(user_id))
        .map_or(UNASSIGNED, |user| user.name.as_str())
}

/// `None` until a recommendation has been received at all.
pub fn recommended_name<'a>(
    snapshot: &'a DashboardSnapshot,
    recommendation: Option<&Recommendation>,
) -> Option<&'a str> {
    let recommendation = recommendation?;
    Some(
        recommendation
            .user_id
            .as_ref()
            .and_then(|user_id| snapshot.user(user_id))
            .map_or(NEEDS_ONBOARDING, |user| user.name.as_str()),
    )
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
