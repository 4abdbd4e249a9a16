use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::user;
use crate::user::Role;

type Result<T> = std::result::Result<T, Error>;

/// Headers populated by the upstream auth middleware. Everything behind the
/// router trusts these; the service itself never validates credentials.
pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

#[derive(Clone, Debug)]
pub struct Identity {
    pub id: user::Id,
    pub role: Role,
}

impl Identity {
    pub fn new(id: user::Id, role: Role) -> Self {
        Self { id, role }
    }

    pub fn parse(id: &str, role: &str) -> Result<Self> {
        let id = user::Id::parse_str(id).map_err(|_| Error::Unauthorized)?;
        let role = role.parse::<Role>().map_err(|_| Error::Unauthorized)?;

        Ok(Self { id, role })
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = crate::error::Error;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(Error::Unauthorized)?;

        let role = parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(Error::Unauthorized)?;

        Ok(Identity::parse(id, role)?)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("missing or invalid identity")]
    Unauthorized,
}
