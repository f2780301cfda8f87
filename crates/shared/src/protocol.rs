use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    HistoryId, Milestone, MilestoneId, MilestoneStatus, Project, ProjectId, ProjectStatus, Role,
    Skills, TaskType, User, UserId,
};

/// Aggregate returned by `GET /dashboard`, in server order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
}

impl DashboardSnapshot {
    /// The last project in received order. There is no explicit selection:
    /// the server lists projects in creation order, so the tail is the most
    /// recently onboarded one.
    pub fn current_project(&self) -> Option<&Project> {
        self.projects.last()
    }

    pub fn user(&self, user_id: &UserId) -> Option<&User> {
        self.users.iter().find(|user| &user.id == user_id)
    }

    pub fn milestone(&self, milestone_id: &MilestoneId) -> Option<&Milestone> {
        self.milestones
            .iter()
            .find(|milestone| &milestone.id == milestone_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    pub id: ProjectId,
    pub name: String,
    pub deadline: String,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub id: UserId,
    pub name: String,
    pub role: Role,
    pub skills: Skills,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMilestoneRequest {
    pub id: MilestoneId,
    pub project_id: ProjectId,
    pub title: String,
    pub status: MilestoneStatus,
    pub assigned_to: Option<UserId>,
    pub due_date: Option<String>,
    pub completed_at: Option<String>,
}

impl From<CreateMilestoneRequest> for Milestone {
    fn from(value: CreateMilestoneRequest) -> Self {
        Self {
            id: value.id,
            title: value.title,
            status: value.status,
            assigned_to: value.assigned_to,
            due_date: value.due_date,
            project_id: Some(value.project_id),
            completed_at: value.completed_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskHistoryRequest {
    pub id: HistoryId,
    pub user_id: UserId,
    pub task_type: TaskType,
    pub duration_minutes: u32,
    pub success_rating: u8,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    #[serde(default)]
    pub recommended_user_id: Option<UserId>,
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
