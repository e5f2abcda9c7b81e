//! Core data type definitions

use crate::error::LmsResult;
use serde::{Deserialize, Serialize};

/// Account role, as issued by the authentication service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Teacher, Role::Student];

    /// The view every user of this role lands on
    pub fn dashboard(&self) -> View {
        match self {
            Role::Admin => View::AdminDashboard,
            Role::Teacher => View::TeacherDashboard,
            Role::Student => View::StudentDashboard,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
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
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// Routable screens of the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Login,
    AdminDashboard,
    TeacherDashboard,
    StudentDashboard,
}

impl View {
    pub const ALL: [View; 4] = [
        View::Login,
        View::AdminDashboard,
        View::TeacherDashboard,
        View::StudentDashboard,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            View::Login => "/login",
            View::AdminDashboard => "/admin-dashboard",
            View::TeacherDashboard => "/teacher-dashboard",
            View::StudentDashboard => "/student-dashboard",
        }
    }

    /// Roles allowed to see this view; `None` means the view is public.
    pub fn allowed_roles(&self) -> Option<&'static [Role]> {
        match self {
            View::Login => None,
            View::AdminDashboard => Some(&[Role::Admin]),
            View::TeacherDashboard => Some(&[Role::Admin, Role::Teacher]),
            View::StudentDashboard => Some(&[Role::Admin, Role::Teacher, Role::Student]),
        }
    }

    pub fn from_path(path: &str) -> Option<View> {
        let trimmed = path.trim_end_matches('/');
        View::ALL.into_iter().find(|view| view.path() == trimmed)
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Persisted identity part of a session, stored without the token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
}

/// An authenticated session. Only constructible fully populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: String,
    username: String,
    email: String,
    role: Role,
    token: String,
}

impl Session {
    /// Build a session, rejecting empty fields
    pub fn new(
        id: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
        role: Role,
        token: impl Into<String>,
    ) -> LmsResult<Self> {
        let session = Self {
            id: id.into(),
            username: username.into(),
            email: email.into(),
            role,
            token: token.into(),
        };

        for (field, value) in [
            ("id", &session.id),
            ("username", &session.username),
            ("email", &session.email),
            ("token", &session.token),
        ] {
            if value.trim().is_empty() {
                return Err(crate::validation_error!(
                    format!("Session field '{}' must not be empty", field),
                    field,
                    "session"
                ));
            }
        }

        Ok(session)
    }

    /// Rebuild a session from its persisted parts
    pub fn from_snapshot(snapshot: SessionSnapshot, token: impl Into<String>) -> LmsResult<Self> {
        Self::new(
            snapshot.id,
            snapshot.username,
            snapshot.email,
            snapshot.role,
            token,
        )
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_strings() {
        for role in Role::ALL {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert!("principal".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Teacher).unwrap(), "\"teacher\"");
        assert!(serde_json::from_str::<Role>("\"janitor\"").is_err());
    }

    #[test]
    fn test_dashboards_and_paths() {
        assert_eq!(Role::Student.dashboard().path(), "/student-dashboard");
        assert_eq!(View::from_path("/admin-dashboard/"), Some(View::AdminDashboard));
        assert_eq!(View::from_path("/nowhere"), None);
        assert!(View::Login.allowed_roles().is_none());
        assert_eq!(
            View::TeacherDashboard.allowed_roles(),
            Some(&[Role::Admin, Role::Teacher][..])
        );
    }

    #[test]
    fn test_session_rejects_partial_data() {
        assert!(Session::new("1", "a", "a@x.com", Role::Teacher, "").is_err());
        assert!(Session::new("", "a", "a@x.com", Role::Teacher, "tok").is_err());

        let session = Session::new("1", "a", "a@x.com", Role::Teacher, "tok").unwrap();
        let restored = Session::from_snapshot(session.snapshot(), "tok").unwrap();
        assert_eq!(restored, session);
    }
}
