use std::{
    collections::VecDeque,
    sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use shared::{
    domain::{
        Milestone, MilestoneId, MilestoneStatus, Project, ProjectId, Role, TaskType, User, UserId,
    },
    protocol::{
        CreateMilestoneRequest, CreateProjectRequest, CreateUserRequest, DashboardSnapshot,
        RecommendationResponse, TaskHistoryRequest,
    },
};
use tokio::sync::{oneshot, Mutex, Notify};

use crate::{ProjectService, ServiceError};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    FetchDashboard,
    Recommend(ProjectId, TaskType),
    CompleteMilestone(MilestoneId),
    CreateProject(CreateProjectRequest),
    CreateUser(CreateUserRequest),
    CreateMilestone(CreateMilestoneRequest),
    LogTaskHistory(TaskHistoryRequest),
}

/// Scriptable in-memory service that records every call it receives.
#[derive(Default)]
pub(crate) struct FakeProjectService {
    pub dashboard: Mutex<Option<DashboardSnapshot>>,
    pub recommended: Mutex<Option<Option<UserId>>>,
    pub fail_completions: AtomicBool,
    pub fail_projects: AtomicBool,
    pub fail_user_named: Mutex<Option<String>>,
    pub fail_milestones: AtomicBool,
    pub fail_history: AtomicBool,
    /// Each fetch takes the next gate, if any, and waits for it to open.
    pub dashboard_gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    pub fetch_started: Notify,
    pub completion_gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    pub completion_started: Notify,
    calls: Mutex<Vec<Call>>,
}

impl FakeProjectService {
    pub fn with_snapshot(snapshot: DashboardSnapshot) -> Self {
        Self {
            dashboard: Mutex::new(Some(snapshot)),
            ..Self::default()
        }
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    pub async fn completion_calls(&self) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| matches!(call, Call::CompleteMilestone(_)))
            .count()
    }

    pub async fn created_users(&self) -> Vec<CreateUserRequest> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                Call::CreateUser(user) => Some(user.clone()),
                _ => None,
            })
            .collect()
    }

    async fn record(&self, call: Call) {
        self.calls.lock().await.push(call);
    }
}

fn transport(path: &str) -> ServiceError {
    ServiceError::Transport {
        path: path.to_string(),
        message: "connection refused".to_string(),
    }
}

#[async_trait]
impl ProjectService for FakeProjectService {
    async fn fetch_dashboard(&self) -> Result<DashboardSnapshot, ServiceError> {
        self.record(Call::FetchDashboard).await;
        let gate = self.dashboard_gates.lock().await.pop_front();
        if let Some(gate) = gate {
            self.fetch_started.notify_one();
            let _ = gate.await;
        }
        self.dashboard
            .lock()
            .await
            .clone()
            .ok_or_else(|| transport("/dashboard"))
    }

    async fn recommend(
        &self,
        project_id: &ProjectId,
        task_type: TaskType,
    ) -> Result<RecommendationResponse, ServiceError> {
        self.record(Call::Recommend(project_id.clone(), task_type))
            .await;
        match self.recommended.lock().await.clone() {
            Some(recommended_user_id) => Ok(RecommendationResponse {
                recommended_user_id,
            }),
            None => Err(ServiceError::Status {
                path: format!("/recommend/{project_id}/{task_type}"),
                status: 500,
            }),
        }
    }

    async fn complete_milestone(&self, milestone_id: &MilestoneId) -> Result<(), ServiceError> {
        self.record(Call::CompleteMilestone(milestone_id.clone()))
            .await;
        let gate = self.completion_gates.lock().await.pop_front();
        if let Some(gate) = gate {
            self.completion_started.notify_one();
            let _ = gate.await;
        }
        if self.fail_completions.load(Ordering::SeqCst) {
            return Err(transport(&format!("/milestones/{milestone_id}/complete")));
        }
        Ok(())
    }

    async fn create_project(&self, request: &CreateProjectRequest) -> Result<(), ServiceError> {
        self.record(Call::CreateProject(request.clone())).await;
        if self.fail_projects.load(Ordering::SeqCst) {
            return Err(transport("/projects"));
        }
        Ok(())
    }

    async fn create_user(&self, request: &CreateUserRequest) -> Result<(), ServiceError> {
        self.record(Call::CreateUser(request.clone())).await;
        if self.fail_user_named.lock().await.as_deref() == Some(request.name.as_str()) {
            return Err(ServiceError::Status {
                path: "/users".to_string(),
                status: 422,
            });
        }
        Ok(())
    }

    async fn create_milestone(
        &self,
        request: &CreateMilestoneRequest,
    ) -> Result<(), ServiceError> {
        self.record(Call::CreateMilestone(request.clone())).await;
        if self.fail_milestones.load(Ordering::SeqCst) {
            return Err(transport("/milestones"));
        }
        Ok(())
    }

    async fn log_task_history(&self, request: &TaskHistoryRequest) -> Result<(), ServiceError> {
        self.record(Call::LogTaskHistory(request.clone())).await;
        if self.fail_history.load(Ordering::SeqCst) {
            return Err(transport("/history"));
        }
        Ok(())
    }
}

pub(crate) fn project(id: &str, name: &str) -> Project {
    Project {
        id: ProjectId::new(id),
        name: name.to_string(),
        deadline: "2024-06-01".to_string(),
        status: Default::default(),
        created_at: None,
    }
}

pub(crate) fn user(id: &str, name: &str, role: Role) -> User {
    User {
        id: UserId::new(id),
        name: name.to_string(),
        role,
        skills: Default::default(),
    }
}

pub(crate) fn milestone(
    id: &str,
    title: &str,
    status: MilestoneStatus,
    assigned_to: Option<&str>,
) -> Milestone {
    Milestone {
        id: MilestoneId::new(id),
        title: title.to_string(),
        status,
        assigned_to: assigned_to.map(UserId::new),
        due_date: None,
        project_id: Some(ProjectId::new("p1")),
        completed_at: None,
    }
}

/// One project, one lead, one unstarted milestone assigned to the lead.
pub(crate) fn launch_snapshot() -> DashboardSnapshot {
    DashboardSnapshot {
        projects: vec![project("p1", "Launch")],
        users: vec![user("u1", "Ann", Role::Lead)],
        milestones: vec![milestone("m1", "Design", MilestoneStatus::NotStarted, Some("u1"))],
    }
}
