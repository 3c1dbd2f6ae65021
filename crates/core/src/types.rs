//! Wire types exchanged with the platform API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamps as emitted by the API.
///
/// The backend serializes naive datetimes without an offset for most
/// resources and RFC 3339 for others, so both are accepted and treated as UTC.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    #[must_use]
    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => super::parse(&raw).map(Some).ok_or_else(|| {
                    serde::de::Error::custom(format!("invalid timestamp: {raw}"))
                }),
                None => Ok(None),
            }
        }
    }
}

// ── Auth ────────────────────────────────────────────

/// Access/refresh credential pair returned by login and refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl TokenPair {
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            token_type: default_token_type(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub role: Role,
}

impl RegisterRequest {
    /// Credentials to log in with once registration succeeds
    #[must_use]
    pub fn credentials(&self) -> LoginRequest {
        LoginRequest {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

// ── Users ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Company,
    Committee,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Company => "company",
            Self::Committee => "committee",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Self::Student),
            "company" => Ok(Self::Company),
            "committee" => Ok(Self::Committee),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub role: Role,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_blocked: bool,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl User {
    /// Name to show for the user
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.username)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

// ── Projects ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Open,
    InProgress,
    Closed,
}

impl ProjectStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Closed => "closed",
        }
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "closed" => Ok(Self::Closed),
            other => Err(format!("unknown project status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Attachment,
    Submission,
}

impl FileKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Attachment => "attachment",
            Self::Submission => "submission",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub id: i64,
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub uploader_id: Option<i64>,
    pub filename: String,
    pub object_name: String,
    pub file_size: Option<i64>,
    pub content_type: Option<String>,
    pub file_type: FileKind,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Presigned download link issued for a stored file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDownload {
    pub download_url: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub owner_id: i64,
    pub status: ProjectStatus,
    pub max_participants: i64,
    #[serde(default, with = "timestamp::option")]
    pub deadline: Option<DateTime<Utc>>,
    pub is_student_project: bool,
    #[serde(default)]
    pub required_skills: Vec<Skill>,
    #[serde(default)]
    pub attachments: Vec<ProjectFile>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectPage {
    pub items: Vec<Project>,
    pub total: i64,
    pub page: i64,
    pub size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectCreate {
    pub title: String,
    pub description: String,
    pub max_participants: i64,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timestamp::option")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub skill_ids: Vec<i64>,
    #[serde(default)]
    pub is_student_project: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_participants: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timestamp::option")]
    pub deadline: Option<DateTime<Utc>>,
}

/// Query parameters accepted by the project listing
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_student_project: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

// ── Applications ────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
    InProgress,
    Submitted,
    RevisionRequested,
    Approved,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationCreate {
    pub project_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationStatusUpdate {
    pub status: ApplicationStatus,
    /// Submission or revision note depending on the target status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: i64,
    pub project_id: i64,
    pub applicant_id: i64,
    pub cover_letter: Option<String>,
    pub status: ApplicationStatus,
    pub submission_note: Option<String>,
    pub revision_note: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

// ── Chat ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRoom {
    pub id: String,
    pub project_id: i64,
    pub project_title: String,
    pub participants: Vec<i64>,
    pub last_message: Option<String>,
    #[serde(default, with = "timestamp::option")]
    pub last_message_at: Option<DateTime<Utc>>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub room_id: String,
    pub sender_id: i64,
    pub sender_name: String,
    pub content: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessage {
    pub content: String,
}

// ── Notifications ───────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: Option<String>,
    pub is_read: bool,
    #[serde(default = "default_notification_type")]
    pub notification_type: String,
    pub link: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

fn default_notification_type() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCount {
    pub count: i64,
}

// ── Portfolio ───────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioItemCreate {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioItem {
    pub id: i64,
    pub student_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub project_url: Option<String>,
    pub image_url: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

// ── Reviews ─────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewCreate {
    pub reviewee_id: i64,
    pub project_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<i64>,
    pub rating: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub reviewer_id: i64,
    pub reviewee_id: i64,
    pub project_id: i64,
    pub application_id: Option<i64>,
    pub rating: f64,
    pub comment: Option<String>,
    pub review_type: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRating {
    pub user_id: i64,
    pub average_rating: f64,
    pub total_reviews: i64,
}

// ── Admin ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_users: i64,
    pub total_students: i64,
    pub total_companies: i64,
    pub total_projects: i64,
    pub total_applications: i64,
    pub active_projects: i64,
    #[serde(default)]
    pub total_chat_messages: i64,
    #[serde(default)]
    pub total_notifications: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminUserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_blocked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_accepts_naive_timestamps() {
        let user: User = serde_json::from_value(json!({
            "id": 7,
            "email": "ann@example.com",
            "username": "ann",
            "role": "committee",
            "full_name": null,
            "bio": null,
            "avatar_url": null,
            "is_active": true,
            "is_blocked": false,
            "skills": [{"id": 1, "name": "Rust", "category": null}],
            "created_at": "2024-03-01T10:20:30.123456"
        }))
        .unwrap();

        assert_eq!(user.role, Role::Committee);
        assert_eq!(user.display_name(), "ann");
        assert_eq!(user.created_at.to_rfc3339(), "2024-03-01T10:20:30.123456+00:00");
    }

    #[test]
    fn test_token_pair_defaults_token_type() {
        let pair: TokenPair =
            serde_json::from_value(json!({"access_token": "a", "refresh_token": "r"})).unwrap();
        assert_eq!(pair, TokenPair::new("a", "r"));
        assert_eq!(pair.token_type, "bearer");
    }

    #[test]
    fn test_project_query_skips_unset_fields() {
        let query = ProjectQuery {
            page: Some(2),
            status: Some(ProjectStatus::InProgress),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({"page": 2, "status": "in_progress"})
        );
    }

    #[test]
    fn test_role_round_trips_through_str() {
        for role in [Role::Student, Role::Company, Role::Committee, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("owner".parse::<Role>().is_err());
    }
}
