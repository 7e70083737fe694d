use std::fmt;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_NAME_HEADER: &str = "x-actor-name";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Platform roles recognised by the back office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Admin,
    Guide,
    Organizer,
    Tourist,
    Security,
    Local,
}

impl ActorRole {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Admin,
            Self::Guide,
            Self::Organizer,
            Self::Tourist,
            Self::Security,
            Self::Local,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Guide => "guide",
            Self::Organizer => "organizer",
            Self::Tourist => "tourist",
            Self::Security => "security",
            Self::Local => "local",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ordered()
            .into_iter()
            .find(|role| role.label() == normalized)
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The user on whose behalf an action runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: ActorRole) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ActorRole::Admin
    }

    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ActorRejection> {
        let header = |name: &'static str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };

        let id = header(ACTOR_ID_HEADER).ok_or(ActorRejection::Missing(ACTOR_ID_HEADER))?;
        let raw_role =
            header(ACTOR_ROLE_HEADER).ok_or(ActorRejection::Missing(ACTOR_ROLE_HEADER))?;
        let role = ActorRole::parse(raw_role)
            .ok_or_else(|| ActorRejection::UnknownRole(raw_role.to_string()))?;
        let name = header(ACTOR_NAME_HEADER).unwrap_or(id);

        Ok(Self::new(id, name, role))
    }
}

/// Reasons a request carries no usable acting user.
#[derive(Debug, thiserror::Error)]
pub enum ActorRejection {
    #[error("missing {0} header")]
    Missing(&'static str),
    #[error("unknown actor role '{0}'")]
    UnknownRole(String),
}

impl IntoResponse for ActorRejection {
    fn into_response(self) -> Response {
        let payload = json!({ "error": self.to_string() });
        (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ActorRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Actor::from_headers(&parts.headers)
    }
}
