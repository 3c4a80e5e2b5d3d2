use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::now_unix_millis;

/// The asset's identity record. Presence in storage is the "logged in" signal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub full_name: String,
    pub dob: String,
    #[serde(default)]
    pub birth_time: String,
    #[serde(default)]
    pub birth_location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub life_path_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_premium: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Screens of the application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppView {
    Landing,
    Auth,
    Intake,
    Cinematic,
    Dashboard,
}

impl AppView {
    pub const ALL: [AppView; 5] = [
        AppView::Landing,
        AppView::Auth,
        AppView::Intake,
        AppView::Cinematic,
        AppView::Dashboard,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AppView::Landing => "LANDING",
            AppView::Auth => "AUTH",
            AppView::Intake => "INTAKE",
            AppView::Cinematic => "CINEMATIC",
            AppView::Dashboard => "DASHBOARD",
        }
    }
}

impl fmt::Display for AppView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppView::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown view '{s}'"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub text: String,
    /// Unix epoch milliseconds.
    pub timestamp: u64,
}

impl ChatMessage {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            timestamp: now_unix_millis(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllyType {
    Family,
    Friend,
    Work,
    Partner,
    #[default]
    Other,
}

/// A saved comparison target ("ally") in the asset's network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircleMember {
    pub id: String,
    pub name: String,
    pub dob: String,
    #[serde(rename = "type", default)]
    pub kind: AllyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatibility: Option<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogType {
    Lie,
    Fear,
    Clarity,
    Impact,
}

impl LogType {
    pub fn as_str(self) -> &'static str {
        match self {
            LogType::Lie => "LIE",
            LogType::Fear => "FEAR",
            LogType::Clarity => "CLARITY",
            LogType::Impact => "IMPACT",
        }
    }
}

/// A user-submitted field report plus the Handler's commentary on it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TacticalLog {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: LogType,
    pub content: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MissionStatus {
    #[default]
    Active,
    Completed,
    Redacted,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    Critical,
}

impl Priority {
    /// Lenient parse for model output; anything unrecognized is MEDIUM.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Priority::Low,
            "CRITICAL" | "HIGH" => Priority::Critical,
            _ => Priority::Medium,
        }
    }
}

/// Generated per session; never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TacticalMission {
    pub id: String,
    pub title: String,
    pub objective: String,
    #[serde(default)]
    pub status: MissionStatus,
    #[serde(default)]
    pub priority: Priority,
}

/// Partially completed intake form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeDraft {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub dob: String,
    #[serde(default)]
    pub birth_time: String,
    #[serde(default)]
    pub birth_location: String,
}

impl IntakeDraft {
    pub fn is_blank(&self) -> bool {
        self.full_name.is_empty()
            && self.dob.is_empty()
            && self.birth_time.is_empty()
            && self.birth_location.is_empty()
    }
}

/// Fields recovered from a scanned birth document. Any may be missing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedProfile {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub birth_time: Option<String>,
    #[serde(default)]
    pub birth_location: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(format!("unknown theme '{other}'")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityReport {
    pub score: u8,
    pub summary: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyFrequency {
    pub month: String,
    pub freq: u8,
    pub directive: String,
}

/// A (name, dob) pair fed to the compatibility analysis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subject {
    pub name: String,
    pub dob: String,
}

impl Subject {
    pub fn new(name: impl Into<String>, dob: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dob: dob.into(),
        }
    }
}

impl From<&UserProfile> for Subject {
    fn from(p: &UserProfile) -> Self {
        Subject::new(p.full_name.clone(), p.dob.clone())
    }
}
