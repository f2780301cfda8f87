use shared::domain::{ProjectId, TaskType};
use tracing::{info, warn};

use crate::{
    dashboard::DashboardController,
    state::{self, Recommendation, SyncEvent},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecommendationOutcome {
    Received(Recommendation),
    NoCurrentProject,
    NotCurrentProject,
    Failed,
}

impl DashboardController {
    pub async fn select_task_type(&self, task_type: TaskType) {
        self.inner
            .lock()
            .await
            .apply(SyncEvent::TaskTypeSelected(task_type));
    }

    pub async fn selected_task_type(&self) -> TaskType {
        self.inner.lock().await.sync.selected_task_type
    }

    pub async fn recommendation(&self) -> Option<Recommendation> {
        self.inner.lock().await.sync.recommendation.clone()
    }

    /// Only the current project can be queried. On failure the previously
    /// held recommendation, if any, is kept.
    pub async fn request_recommendation(
        &self,
        project_id: &ProjectId,
        task_type: TaskType,
    ) -> RecommendationOutcome {
        {
            let guard = self.inner.lock().await;
            match guard.sync.snapshot.current_project() {
                None => return RecommendationOutcome::NoCurrentProject,
                Some(current) if &current.id != project_id => {
                    warn!(
                        %project_id,
                        current = %current.id,
                        "recommendation requested for a project that is not current"
                    );
                    return RecommendationOutcome::NotCurrentProject;
                }
                Some(_) => {}
            }
        }

        let response = match self.service.recommend(project_id, task_type).await {
            Ok(response) => response,
            Err(err) => {
                warn!(%project_id, %task_type, error = %err, "recommendation request failed");
                return RecommendationOutcome::Failed;
            }
        };

        let recommendation = Recommendation {
            user_id: response.recommended_user_id,
            task_type,
        };
        let version = self
            .inner
            .lock()
            .await
            .apply(SyncEvent::RecommendationReceived(recommendation.clone()));
        info!(
            %project_id,
            %task_type,
            user_id = ?recommendation.user_id,
            version,
            "recommendation received"
        );
        RecommendationOutcome::Received(recommendation)
    }

    /// Queries for the current project with the selected task type.
    pub async fn recommend_for_current_project(&self) -> RecommendationOutcome {
        let (project_id, task_type) = {
            let guard = self.inner.lock().await;
            let Some(project) = guard.sync.snapshot.current_project() else {
                return RecommendationOutcome::NoCurrentProject;
            };
            (project.id.clone(), guard.sync.selected_task_type)
        };
        self.request_recommendation(&project_id, task_type).await
    }

    /// `None` when nothing has been requested yet; the onboarding sentinel
    /// when the recommended user is not in the local snapshot.
    pub async fn resolve_recommended_name(&self) -> Option<String> {
        let guard = self.inner.lock().await;
        state::recommended_name(&guard.sync.snapshot, guard.sync.recommendation.as_ref())
            .map(str::to_string)
    }
}
