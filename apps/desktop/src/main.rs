use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    dashboard::milestone_rows, AppView, CommitOutcome, CompletionOutcome, DashboardController,
    HttpProjectService, LoadOutcome, Navigator, OnboardingWizard, ProjectService,
    RecommendationOutcome, RosterUpdate,
};
use futures::future::join_all;
use shared::domain::{MilestoneId, Role, TaskType, UserId};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, normalize_api_url};

#[derive(Parser, Debug)]
#[command(name = "north", about = "Workflow hub client")]
struct Cli {
    /// Base address of the project service.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the current project, roster and milestones.
    Dashboard,
    /// Create a project and its team.
    Onboard {
        #[arg(long)]
        project_name: String,
        #[arg(long)]
        deadline: String,
        /// `name` or `name:role`, repeatable, in roster order.
        #[arg(long = "member")]
        members: Vec<String>,
    },
    /// Mark milestones completed.
    Complete {
        #[arg(required = true)]
        milestone_ids: Vec<String>,
    },
    /// Ask for the best assignee on the current project.
    Recommend {
        #[arg(long, default_value_t = TaskType::Analytics)]
        task_type: TaskType,
    },
    /// Add a milestone to the current project.
    AddMilestone {
        #[arg(long)]
        title: String,
        #[arg(long)]
        assign: Option<String>,
        #[arg(long)]
        due: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings();
    if let Some(api_url) = cli.api_url {
        settings.api_url = api_url;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let api_url = normalize_api_url(&settings.api_url)?;
    let service: Arc<dyn ProjectService> = Arc::new(
        HttpProjectService::new(&api_url)
            .with_context(|| format!("failed to configure project service at '{api_url}'"))?,
    );
    debug!(%api_url, "project service configured");
    let dashboard = DashboardController::new(Arc::clone(&service));

    match cli.command {
        Command::Dashboard => {
            load(&dashboard).await?;
            print_dashboard(&dashboard).await;
        }
        Command::Onboard {
            project_name,
            deadline,
            members,
        } => {
            let mut navigator = Navigator::default();
            navigator.show_onboarding();
            let wizard = build_wizard(project_name, deadline, &members)?;
            let outcome = wizard.commit(service.as_ref()).await?;
            if let CommitOutcome::Completed(report) = &outcome {
                println!(
                    "created project {} with {} member(s)",
                    report.project_id,
                    report.user_ids.len()
                );
            }
            if navigator.onboarding_finished(&outcome) != AppView::Dashboard {
                bail!("onboarding did not complete; see log for the failing request");
            }
            load(&dashboard).await?;
            print_dashboard(&dashboard).await;
        }
        Command::Complete { milestone_ids } => {
            load(&dashboard).await?;
            let ids: Vec<MilestoneId> = milestone_ids.into_iter().map(MilestoneId).collect();
            let outcomes = join_all(ids.iter().map(|id| dashboard.complete_milestone(id))).await;
            for (id, outcome) in ids.iter().zip(outcomes) {
                let label = match outcome {
                    CompletionOutcome::Completed => "completed",
                    CompletionOutcome::AlreadyCompleted => "already completed",
                    CompletionOutcome::InFlight => "already in progress",
                    CompletionOutcome::Failed => "failed",
                };
                println!("{id}: {label}");
            }
            print_dashboard(&dashboard).await;
        }
        Command::Recommend { task_type } => {
            load(&dashboard).await?;
            dashboard.select_task_type(task_type).await;
            match dashboard.recommend_for_current_project().await {
                RecommendationOutcome::Received(recommendation) => {
                    let name = dashboard
                        .resolve_recommended_name()
                        .await
                        .unwrap_or_default();
                    println!(
                        "Recommended for {}: {name}",
                        recommendation.task_type.label()
                    );
                }
                RecommendationOutcome::NoCurrentProject
                | RecommendationOutcome::NotCurrentProject => {
                    println!("Ready for onboarding: no project yet.");
                }
                RecommendationOutcome::Failed => {
                    bail!("recommendation request failed; see log");
                }
            }
        }
        Command::AddMilestone { title, assign, due } => {
            load(&dashboard).await?;
            let Some(project) = dashboard.current_project().await else {
                bail!("no current project; run `north onboard` first");
            };
            match dashboard
                .add_milestone(&project.id, title, assign.map(UserId), due)
                .await
            {
                Some(id) => println!("added milestone {id} to {}", project.name),
                None => bail!("milestone was not created; see log"),
            }
        }
    }

    Ok(())
}

async fn load(dashboard: &DashboardController) -> Result<()> {
    match dashboard.load_snapshot().await {
        LoadOutcome::Applied { .. } | LoadOutcome::Superseded => Ok(()),
        LoadOutcome::Failed => bail!("could not load the dashboard; see log"),
    }
}

fn build_wizard(
    project_name: String,
    deadline: String,
    members: &[String],
) -> Result<OnboardingWizard> {
    let mut wizard = OnboardingWizard::new();
    wizard.set_project_name(project_name);
    wizard.set_deadline(deadline);
    wizard.advance_to_roster()?;

    for (position, member) in members.iter().enumerate() {
        let (name, role) = match member.split_once(':') {
            Some((name, role)) => (name, role.parse::<Role>()?),
            None => (member.as_str(), Role::Member),
        };
        // the wizard starts with one blank entry
        let index = if position == 0 {
            0
        } else {
            wizard.add_roster_entry()
        };
        wizard.update_roster_entry(index, RosterUpdate::Name(name.to_string()))?;
        wizard.update_roster_entry(index, RosterUpdate::Role(role))?;
    }
    Ok(wizard)
}

async fn print_dashboard(dashboard: &DashboardController) {
    let snapshot = dashboard.snapshot().await;
    let Some(project) = snapshot.current_project() else {
        println!("Ready for onboarding: no project yet.");
        return;
    };

    println!("{} (due {})", project.name, project.deadline);
    let team: Vec<String> = snapshot.users.iter().map(|user| user.initials()).collect();
    println!("Team: {}", team.join(" "));
    for row in milestone_rows(&snapshot) {
        println!(
            "  [{:>3}%] {:<12} {}  assignee: {}  due: {}",
            row.progress_percent,
            row.status.label(),
            row.title,
            row.assignee,
            row.due_date.as_deref().unwrap_or("No date"),
        );
    }
}
