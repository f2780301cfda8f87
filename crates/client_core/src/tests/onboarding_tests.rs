use super::*;
use crate::test_support::{Call, FakeProjectService};
use chrono::TimeZone;
use std::sync::atomic::Ordering;

fn wizard_on_roster(entries: &[(&str, Role)]) -> OnboardingWizard {
    let mut wizard = OnboardingWizard::new();
    wizard.set_project_name("Launch");
    wizard.set_deadline("2024-06-01");
    wizard.advance_to_roster().expect("advance");
    for (index, (name, role)) in entries.iter().enumerate() {
        if index > 0 {
            wizard.add_roster_entry();
        }
        wizard
            .update_roster_entry(index, RosterUpdate::Name(name.to_string()))
            .expect("name");
        wizard
            .update_roster_entry(index, RosterUpdate::Role(*role))
            .expect("role");
    }
    wizard
}

#[test]
fn starts_on_project_info_with_one_empty_entry() {
    let wizard = OnboardingWizard::new();
    assert_eq!(wizard.step(), OnboardingStep::ProjectInfo);
    assert_eq!(wizard.form().roster, vec![RosterEntry::default()]);
    assert_eq!(wizard.form().roster[0].role, Role::Member);
}

#[test]
fn step_transitions_require_the_right_step() {
    let mut wizard = OnboardingWizard::new();
    assert_eq!(
        wizard.return_to_project_info(),
        Err(OnboardingError::InvalidStep {
            expected: 2,
            actual: 1
        })
    );

    wizard.advance_to_roster().expect("advance without validation");
    assert_eq!(wizard.step(), OnboardingStep::Roster);
    assert!(wizard.advance_to_roster().is_err());
}

#[test]
fn back_navigation_keeps_form_data() {
    let mut wizard = wizard_on_roster(&[("Ann", Role::Lead)]);
    let before = wizard.form().clone();

    wizard.return_to_project_info().expect("back");

    assert_eq!(wizard.step(), OnboardingStep::ProjectInfo);
    assert_eq!(wizard.form(), &before);
}

#[test]
fn appended_entry_update_leaves_prior_entries_in_place() {
    let mut wizard = wizard_on_roster(&[("Zed", Role::Lead), ("Yu", Role::Member)]);
    let prior = wizard.form().roster.clone();

    let index = wizard.add_roster_entry();
    wizard
        .update_roster_entry(index, RosterUpdate::Name("Ann".to_string()))
        .expect("update");

    let roster = &wizard.form().roster;
    assert_eq!(index, 2);
    assert_eq!(&roster[..2], prior.as_slice());
    assert_eq!(
        roster[2],
        RosterEntry {
            name: "Ann".to_string(),
            role: Role::Member
        }
    );
}

#[test]
fn out_of_bounds_update_is_rejected() {
    let mut wizard = OnboardingWizard::new();
    assert_eq!(
        wizard.update_roster_entry(3, RosterUpdate::Name("x".to_string())),
        Err(OnboardingError::RosterIndexOutOfBounds { index: 3, len: 1 })
    );
}

#[test]
fn plan_uses_submission_time_and_active_status() {
    let wizard = wizard_on_roster(&[("Ann", Role::Lead)]);
    let at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();

    let plan = wizard.plan_commit(at);

    assert_eq!(plan.project.id.as_str(), "proj-1700000000000");
    assert_eq!(plan.project.status, ProjectStatus::Active);
    assert_eq!(plan.project.created_at, at);
    assert_eq!(plan.project.name, "Launch");
    assert!(plan.users[0].skills.is_empty());
}

#[tokio::test]
async fn commit_skips_unnamed_entries() {
    let mut wizard = OnboardingWizard::new();
    wizard.advance_to_roster().expect("advance");
    let index = wizard.add_roster_entry();
    wizard
        .update_roster_entry(index, RosterUpdate::Name("Bo".to_string()))
        .expect("name");
    wizard
        .update_roster_entry(index, RosterUpdate::Role(Role::Lead))
        .expect("role");
    let service = FakeProjectService::default();

    let outcome = wizard.commit(&service).await.expect("commit");

    let users = service.created_users().await;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].name, "Bo");
    assert_eq!(users[0].role, Role::Lead);
    assert!(outcome.is_completed());
}

#[tokio::test]
async fn commit_creates_project_before_users_in_roster_order() {
    let wizard = wizard_on_roster(&[("Ann", Role::Lead), ("Bo", Role::Member), ("Cy", Role::Member)]);
    let service = FakeProjectService::default();

    let outcome = wizard.commit(&service).await.expect("commit");

    let calls = service.calls().await;
    assert!(matches!(calls[0], Call::CreateProject(_)));
    let names: Vec<_> = service
        .created_users()
        .await
        .into_iter()
        .map(|user| user.name)
        .collect();
    assert_eq!(names, ["Ann", "Bo", "Cy"]);

    let CommitOutcome::Completed(report) = outcome else {
        panic!("expected completion");
    };
    assert_eq!(report.user_ids.len(), 3);
    let mut unique = report.user_ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 3);
}

#[tokio::test]
async fn failed_project_creation_aborts_before_users() {
    let wizard = wizard_on_roster(&[("Ann", Role::Lead)]);
    let service = FakeProjectService::default();
    service.fail_projects.store(true, Ordering::SeqCst);

    let outcome = wizard.commit(&service).await.expect("commit");

    assert_eq!(outcome, CommitOutcome::Aborted);
    assert!(service.created_users().await.is_empty());
}

#[tokio::test]
async fn failed_user_creation_stops_without_rollback() {
    let wizard = wizard_on_roster(&[("Ann", Role::Lead), ("Bo", Role::Member), ("Cy", Role::Member)]);
    let service = FakeProjectService::default();
    *service.fail_user_named.lock().await = Some("Bo".to_string());

    let outcome = wizard.commit(&service).await.expect("commit");

    assert_eq!(outcome, CommitOutcome::Aborted);
    let calls = service.calls().await;
    // project + Ann + the failing Bo; Cy is never attempted and nothing is undone
    assert_eq!(calls.len(), 3);
    assert!(matches!(calls[0], Call::CreateProject(_)));
    let names: Vec<_> = service
        .created_users()
        .await
        .into_iter()
        .map(|user| user.name)
        .collect();
    assert_eq!(names, ["Ann", "Bo"]);
}

#[tokio::test]
async fn commit_from_project_info_is_rejected() {
    let wizard = OnboardingWizard::new();
    let service = FakeProjectService::default();

    let err = wizard.commit(&service).await.expect_err("wrong step");

    assert_eq!(
        err,
        OnboardingError::InvalidStep {
            expected: 2,
            actual: 1
        }
    );
    assert!(service.calls().await.is_empty());
}
