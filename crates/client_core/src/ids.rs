use chrono::{DateTime, Utc};
use shared::domain::{HistoryId, MilestoneId, ProjectId, UserId};
use uuid::Uuid;

/// Project ids are derived from the submission instant, one per commit attempt.
pub fn project_id(submitted_at: DateTime<Utc>) -> ProjectId {
    ProjectId(format!("proj-{}", submitted_at.timestamp_millis()))
}

pub fn user_id(submitted_at: DateTime<Utc>) -> UserId {
    UserId(format!(
        "user-{}-{}",
        submitted_at.timestamp_millis(),
        Uuid::new_v4().simple()
    ))
}

pub fn milestone_id() -> MilestoneId {
    MilestoneId(format!("milestone_{}", Uuid::new_v4().simple()))
}

pub fn history_id() -> HistoryId {
    HistoryId(format!("history_{}", Uuid::new_v4().simple()))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn project_id_tracks_submission_millis() {
        let at = Utc.timestamp_millis_opt(1_717_200_000_123).unwrap();
        assert_eq!(project_id(at).as_str(), "proj-1717200000123");
    }

    #[test]
    fn user_ids_differ_within_the_same_instant() {
        let at = Utc::now();
        let first = user_id(at);
        let second = user_id(at);
        assert_ne!(first, second);
        assert!(first
            .as_str()
            .starts_with(&format!("user-{}-", at.timestamp_millis())));
    }
}
