use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(ProjectId);
id_newtype!(UserId);
id_newtype!(MilestoneId);
id_newtype!(HistoryId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Active,
    Completed,
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Member,
    Lead,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Lead => "lead",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "member" => Ok(Role::Member),
            "lead" => Ok(Role::Lead),
            other => Err(UnknownVariant::new("role", other)),
        }
    }
}

/// Milestone lifecycle. `completed` is terminal.
///
/// Older servers report `pending` for milestones that have not started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    #[default]
    #[serde(alias = "pending")]
    NotStarted,
    InProgress,
    Completed,
}

impl MilestoneStatus {
    pub fn is_completed(self) -> bool {
        self == MilestoneStatus::Completed
    }

    /// Whether `next` is reachable from `self`. Completion is the only
    /// forward move this client makes and nothing leaves `completed`.
    pub fn can_transition_to(self, next: MilestoneStatus) -> bool {
        match (self, next) {
            (MilestoneStatus::Completed, _) => false,
            (_, MilestoneStatus::Completed) => true,
            (MilestoneStatus::NotStarted, MilestoneStatus::InProgress) => true,
            _ => false,
        }
    }

    pub fn progress_percent(self) -> u8 {
        match self {
            MilestoneStatus::NotStarted => 0,
            MilestoneStatus::InProgress => 50,
            MilestoneStatus::Completed => 100,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MilestoneStatus::NotStarted => "NOT STARTED",
            MilestoneStatus::InProgress => "IN PROGRESS",
            MilestoneStatus::Completed => "COMPLETED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    #[default]
    Analytics,
    Writing,
    Coding,
}

impl TaskType {
    pub const ALL: [TaskType; 3] = [TaskType::Analytics, TaskType::Writing, TaskType::Coding];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::Analytics => "analytics",
            TaskType::Writing => "writing",
            TaskType::Coding => "coding",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskType::Analytics => "Data Analytics",
            TaskType::Writing => "Content Writing",
            TaskType::Coding => "Software Development",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "analytics" => Ok(TaskType::Analytics),
            "writing" => Ok(TaskType::Writing),
            "coding" => Ok(TaskType::Coding),
            other => Err(UnknownVariant::new("task type", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

pub type Skills = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub deadline: String,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(
        default,
        alias = "skills_json",
        deserialize_with = "skills_from_map_or_json"
    )]
    pub skills: Skills,
}

impl User {
    /// First two characters of the name, upper-cased.
    pub fn initials(&self) -> String {
        self.name
            .chars()
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: MilestoneId,
    pub title: String,
    #[serde(default)]
    pub status: MilestoneStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

/// Skills arrive either as a JSON object or, from servers that store them
/// verbatim, as a JSON-encoded string.
fn skills_from_map_or_json<'de, D>(deserializer: D) -> Result<Skills, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawSkills {
        Map(Skills),
        Encoded(String),
        Null(()),
    }

    match RawSkills::deserialize(deserializer)? {
        RawSkills::Map(skills) => Ok(skills),
        RawSkills::Encoded(raw) if raw.trim().is_empty() => Ok(Skills::new()),
        RawSkills::Encoded(raw) => serde_json::from_str(&raw).map_err(serde::de::Error::custom),
        RawSkills::Null(()) => Ok(Skills::new()),
    }
}
