use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{MilestoneId, ProjectId, TaskType},
    protocol::{
        CreateMilestoneRequest, CreateProjectRequest, CreateUserRequest, DashboardSnapshot,
        RecommendationResponse, TaskHistoryRequest,
    },
};
use tracing::debug;
use url::Url;

pub mod dashboard;
pub mod error;
pub mod ids;
pub mod navigation;
pub mod onboarding;
mod recommendation;
pub mod state;

pub use dashboard::{CompletionOutcome, DashboardController, LoadOutcome, MilestoneRow};
pub use error::ServiceError;
pub use navigation::{AppView, Navigator};
pub use onboarding::{
    CommitOutcome, CommitReport, OnboardingError, OnboardingStep, OnboardingWizard, RosterEntry,
    RosterUpdate,
};
pub use recommendation::RecommendationOutcome;
pub use state::{Recommendation, SyncEvent, SyncState, NEEDS_ONBOARDING, UNASSIGNED};

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8001";

/// Remote project service consumed by the onboarding and dashboard flows.
///
/// Request bodies on success are ignored; any 2xx counts as success.
#[async_trait]
pub trait ProjectService: Send + Sync {
    async fn fetch_dashboard(&self) -> Result<DashboardSnapshot, ServiceError>;
    async fn recommend(
        &self,
        project_id: &ProjectId,
        task_type: TaskType,
    ) -> Result<RecommendationResponse, ServiceError>;
    async fn complete_milestone(&self, milestone_id: &MilestoneId) -> Result<(), ServiceError>;
    async fn create_project(&self, request: &CreateProjectRequest) -> Result<(), ServiceError>;
    async fn create_user(&self, request: &CreateUserRequest) -> Result<(), ServiceError>;
    async fn create_milestone(&self, request: &CreateMilestoneRequest)
        -> Result<(), ServiceError>;
    async fn log_task_history(&self, request: &TaskHistoryRequest) -> Result<(), ServiceError>;
}

pub struct HttpProjectService {
    http: Client,
    base_url: Url,
}

impl HttpProjectService {
    pub fn new(base_url: &str) -> Result<Self, ServiceError> {
        let invalid = |reason: String| ServiceError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let parsed = Url::parse(base_url).map_err(|err| invalid(err.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(invalid("url cannot carry a path".to_string()));
        }
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
        }
        Ok(Self {
            http: Client::new(),
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ServiceError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "url cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ServiceError> {
        let url = self.endpoint(segments)?;
        let path = url.path().to_string();
        debug!(%path, "GET");
        self.http
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| ServiceError::from_reqwest(&path, err))?
            .json::<T>()
            .await
            .map_err(|err| ServiceError::from_reqwest(&path, err))
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<(), ServiceError> {
        let url = self.endpoint(segments)?;
        let path = url.path().to_string();
        debug!(%path, "POST");
        let mut request = self.http.post(url);
        if let Some(body) = body {
            request = request.json(body);
        }
        request
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| ServiceError::from_reqwest(&path, err))?;
        Ok(())
    }
}

#[async_trait]
impl ProjectService for HttpProjectService {
    async fn fetch_dashboard(&self) -> Result<DashboardSnapshot, ServiceError> {
        self.get_json(&["dashboard"]).await
    }

    async fn recommend(
        &self,
        project_id: &ProjectId,
        task_type: TaskType,
    ) -> Result<RecommendationResponse, ServiceError> {
        self.get_json(&["recommend", project_id.as_str(), task_type.as_str()])
            .await
    }

    async fn complete_milestone(&self, milestone_id: &MilestoneId) -> Result<(), ServiceError> {
        self.post::<()>(&["milestones", milestone_id.as_str(), "complete"], None)
            .await
    }

    async fn create_project(&self, request: &CreateProjectRequest) -> Result<(), ServiceError> {
        self.post(&["projects"], Some(request)).await
    }

    async fn create_user(&self, request: &CreateUserRequest) -> Result<(), ServiceError> {
        self.post(&["users"], Some(request)).await
    }

    async fn create_milestone(
        &self,
        request: &CreateMilestoneRequest,
    ) -> Result<(), ServiceError> {
        self.post(&["milestones"], Some(request)).await
    }

    async fn log_task_history(&self, request: &TaskHistoryRequest) -> Result<(), ServiceError> {
        self.post(&["history"], Some(request)).await
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
