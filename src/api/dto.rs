//! Data Transfer Objects
//!
//! Request and response types for the dashboard backend.
//! Field names follow the backend's JSON contract (French for session data).

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

use crate::status::PauseKind;

// ============================================
// Identifiers
// ============================================

/// Backend user identifier
///
/// Numeric ids are sent back as JSON numbers, anything else as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty id is treated like a missing one
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for UserId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl Serialize for UserId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.parse::<u64>() {
            Ok(n) => serializer.serialize_u64(n),
            Err(_) => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => Ok(UserId(s)),
            serde_json::Value::Number(n) => Ok(UserId(n.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "expected string or number for user id, got {}",
                other
            ))),
        }
    }
}

// ============================================
// Session tracking
// ============================================

/// Authoritative live-session snapshot for one agent
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SessionSnapshot {
    /// Display label of the current status ("Disponible", "Hors ligne", ...)
    #[serde(rename = "statut_actuel", alias = "current_status", default)]
    pub current_status: Option<String>,

    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub session_start_time: Option<DateTime<Utc>>,

    /// Seconds spent per status label today
    #[serde(
        rename = "cumul_statuts",
        alias = "cumulative_durations",
        default,
        deserialize_with = "lenient_durations"
    )]
    pub cumulative_durations: HashMap<String, u64>,
}

/// Body for `POST /session_agents/close`
#[derive(Debug, Clone, Serialize)]
pub struct CloseSessionRequest {
    pub user_id: UserId,
}

/// Body for `POST /session_agents/start`
#[derive(Debug, Clone, Serialize)]
pub struct StartSessionRequest {
    pub user_id: UserId,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pause_type: Option<PauseKind>,
}

/// Parse a timestamp without failing the whole snapshot on a bad value
///
/// Strings go through [`parse_timestamp`], numbers are epoch milliseconds,
/// anything else is `None`.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => parse_timestamp(&s),
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(DateTime::from_timestamp_millis),
        _ => None,
    })
}

/// RFC 3339 first, then the naive SQL form the backend sometimes emits (read as UTC)
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Accept integer or float seconds; floats truncate, negatives clamp to zero
fn lenient_durations<'de, D>(deserializer: D) -> Result<HashMap<String, u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    let entries = match raw {
        Some(serde_json::Value::Object(map)) => map,
        Some(other) => {
            tracing::debug!(value = %other, "Ignoring non-object durations");
            return Ok(HashMap::new());
        }
        None => return Ok(HashMap::new()),
    };
    let mut out = HashMap::new();
    for (label, value) in entries {
        let secs = match &value {
            serde_json::Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().map(|f| if f > 0.0 { f as u64 } else { 0 })),
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.max(0.0) as u64),
            _ => None,
        };
        match secs {
            Some(secs) => {
                out.insert(label, secs);
            }
            None => tracing::debug!(label = %label, value = %value, "Ignoring non-numeric duration"),
        }
    }
    Ok(out)
}

// ============================================
// Sales
// ============================================

/// Raw monthly sales: agent → week → day → count, in server order
pub type RawWeeklySales = serde_json::Map<String, serde_json::Value>;

// ============================================
// Users
// ============================================

/// Role of an authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Agent,
    Admin,
    SuperAdmin,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Agent => "Agent",
            Role::Admin => "Admin",
            Role::SuperAdmin => "SuperAdmin",
            Role::Other(s) => s,
        }
    }

    pub fn is_admin_or_super_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Agent" => Role::Agent,
            "Admin" => Role::Admin,
            "SuperAdmin" => Role::SuperAdmin,
            _ => Role::Other(s),
        }
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?
            .map(Role::from)
            .unwrap_or_default())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A user record (profile or agent list entry)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub site_id: Option<serde_json::Value>,
    #[serde(default)]
    pub site_name: Option<String>,
    #[serde(default)]
    pub profil: Option<String>,
    /// Account unlocked; missing means active
    #[serde(default, alias = "is_active")]
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// "Firstname Lastname", falling back to the email
    pub fn display_name(&self) -> Option<String> {
        match (&self.firstname, &self.lastname) {
            (Some(f), Some(l)) if !f.is_empty() && !l.is_empty() => Some(format!("{} {}", f, l)),
            _ => self.email.clone().filter(|e| !e.is_empty()),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(true)
    }

    /// Two-letter avatar initials
    pub fn initials(&self) -> String {
        let first = self.firstname.as_deref().and_then(|s| s.chars().next());
        let last = self.lastname.as_deref().and_then(|s| s.chars().next());
        first.into_iter().chain(last).collect()
    }
}

/// Filters for the user list
#[derive(Debug, Clone, Serialize)]
pub struct UserQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub role: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub profil: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub q: String,
}

impl Default for UserQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 1000,
            role: String::new(),
            profil: String::new(),
            status: String::new(),
            q: String::new(),
        }
    }
}

/// The user list comes back either bare or wrapped with pagination info
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UsersResponse {
    Paged {
        users: Vec<User>,
        #[serde(default)]
        total: Option<u64>,
    },
    Bare(Vec<User>),
}

impl UsersResponse {
    pub fn into_users(self) -> Vec<User> {
        match self {
            UsersResponse::Paged { users, .. } => users,
            UsersResponse::Bare(users) => users,
        }
    }
}

/// Response of `DELETE /users/{id}/delete-users`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Body for `PUT /users/{id}/toggle-active`
#[derive(Debug, Clone, Serialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

/// Error body the backend returns on failure
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// ============================================
// Sites
// ============================================

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Site {
    pub id: serde_json::Value,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
}

impl Site {
    /// Path segment for this site's id
    pub fn id_segment(&self) -> String {
        match &self.id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Create / edit payload for a site
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteInput {
    pub code: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_snapshot_from_backend_names() {
        let json = r#"{
            "statut_actuel": "Disponible",
            "session_start_time": "2024-01-01T09:00:00Z",
            "cumul_statuts": {"Disponible": 120, "Pause": 30.7}
        }"#;
        let snap: SessionSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snap.current_status.as_deref(), Some("Disponible"));
        assert_eq!(
            snap.session_start_time,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap())
        );
        assert_eq!(snap.cumulative_durations["Disponible"], 120);
        assert_eq!(snap.cumulative_durations["Pause"], 30);
    }

    #[test]
    fn test_snapshot_aliases_and_missing_fields() {
        let json = r#"{"current_status": null, "cumulative_durations": null}"#;
        let snap: SessionSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snap.current_status, None);
        assert_eq!(snap.session_start_time, None);
        assert!(snap.cumulative_durations.is_empty());

        let snap: SessionSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(snap, SessionSnapshot::default());
    }

    #[test]
    fn test_bad_start_time_does_not_fail_snapshot() {
        let json = r#"{"statut_actuel": "Pause", "session_start_time": "garbage"}"#;
        let snap: SessionSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snap.current_status.as_deref(), Some("Pause"));
        assert_eq!(snap.session_start_time, None);
    }

    #[test]
    fn test_numeric_start_time_is_epoch_millis() {
        let json = r#"{
            "statut_actuel": "Disponible",
            "session_start_time": 1704099600000,
            "cumul_statuts": {"Disponible": 5}
        }"#;
        let snap: SessionSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snap.current_status.as_deref(), Some("Disponible"));
        assert_eq!(
            snap.session_start_time,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap())
        );

        let json = r#"{"statut_actuel": "Pause", "session_start_time": {"at": 1}}"#;
        let snap: SessionSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snap.current_status.as_deref(), Some("Pause"));
        assert_eq!(snap.session_start_time, None);
    }

    #[test]
    fn test_non_object_durations_are_empty() {
        for raw in [r#""n/a""#, "42", "[1, 2]", "true"] {
            let json = format!(r#"{{"statut_actuel": "Pause", "cumul_statuts": {}}}"#, raw);
            let snap: SessionSnapshot = serde_json::from_str(&json).unwrap();
            assert_eq!(snap.current_status.as_deref(), Some("Pause"));
            assert!(snap.cumulative_durations.is_empty());
        }
    }

    #[test]
    fn test_parse_naive_timestamp() {
        let dt = parse_timestamp("2024-03-05 14:30:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_negative_and_text_durations() {
        let json = r#"{"cumul_statuts": {"A": -5, "B": "42", "C": true}}"#;
        let snap: SessionSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snap.cumulative_durations["A"], 0);
        assert_eq!(snap.cumulative_durations["B"], 42);
        assert!(!snap.cumulative_durations.contains_key("C"));
    }

    #[test]
    fn test_user_id_serializes_numbers_as_numbers() {
        let body = CloseSessionRequest {
            user_id: UserId::from(42u64),
        };
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"user_id":42}"#);

        let body = CloseSessionRequest {
            user_id: UserId::from("a-7"),
        };
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"user_id":"a-7"}"#);
    }

    #[test]
    fn test_start_request_skips_missing_pause() {
        let body = StartSessionRequest {
            user_id: UserId::from(1u64),
            status: "Disponible".to_string(),
            pause_type: None,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"user_id":1,"status":"Disponible"}"#
        );
    }

    #[test]
    fn test_role_parsing() {
        let user: User =
            serde_json::from_str(r#"{"id": 3, "role": "SuperAdmin", "email": "a@b.c"}"#).unwrap();
        assert_eq!(user.role, Role::SuperAdmin);
        assert!(user.role.is_admin_or_super_admin());

        let user: User = serde_json::from_str(r#"{"id": 4, "role": "Manager"}"#).unwrap();
        assert_eq!(user.role, Role::Other("Manager".to_string()));
        assert!(!user.role.is_admin_or_super_admin());

        let user: User = serde_json::from_str(r#"{"id": 5, "role": null}"#).unwrap();
        assert_eq!(user.role, Role::Agent);
    }

    #[test]
    fn test_user_display_name() {
        let mut user: User = serde_json::from_str(
            r#"{"id": 1, "firstname": "Awa", "lastname": "Diallo", "email": "awa@ex.fr"}"#,
        )
        .unwrap();
        assert_eq!(user.display_name().as_deref(), Some("Awa Diallo"));
        assert_eq!(user.initials(), "AD");

        user.lastname = None;
        assert_eq!(user.display_name().as_deref(), Some("awa@ex.fr"));

        user.email = None;
        assert_eq!(user.display_name(), None);
    }

    #[test]
    fn test_user_profile_fields() {
        let user: User = serde_json::from_str(
            r#"{
                "id": 8,
                "site_name": "Dakar",
                "profil": "Vendeur",
                "active": false,
                "created_at": "2023-09-01T10:00:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(user.site_name.as_deref(), Some("Dakar"));
        assert_eq!(user.profil.as_deref(), Some("Vendeur"));
        assert!(!user.is_active());
        assert_eq!(
            user.created_at,
            Some(Utc.with_ymd_and_hms(2023, 9, 1, 10, 0, 0).unwrap())
        );

        let user: User = serde_json::from_str(r#"{"id": 9, "is_active": false}"#).unwrap();
        assert!(!user.is_active());

        let user: User = serde_json::from_str(r#"{"id": 10, "created_at": "??"}"#).unwrap();
        assert!(user.is_active());
        assert_eq!(user.created_at, None);
    }

    #[test]
    fn test_users_response_shapes() {
        let bare: UsersResponse = serde_json::from_str(r#"[{"id": 1}]"#).unwrap();
        assert_eq!(bare.into_users().len(), 1);

        let paged: UsersResponse =
            serde_json::from_str(r#"{"users": [{"id": 1}, {"id": 2}], "total": 2}"#).unwrap();
        assert_eq!(paged.into_users().len(), 2);
    }

    #[test]
    fn test_site_id_segment() {
        let site: Site = serde_json::from_str(r#"{"id": 12, "code": "PAR", "name": "Paris"}"#).unwrap();
        assert_eq!(site.id_segment(), "12");
        let site: Site = serde_json::from_str(r#"{"id": "x1", "code": "LYS"}"#).unwrap();
        assert_eq!(site.id_segment(), "x1");
        assert_eq!(site.name, "");
    }
}
