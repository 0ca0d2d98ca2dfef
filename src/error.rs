use argon2::Error as Argon2Error;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use mongodb::error::Error as DbError;
use rocket::{
    http::Status,
    response::{status::Custom, Responder},
    serde::json::Json,
    Request,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::election::{ElectionError, ErrorKind};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    Argon2(#[from] Argon2Error),
    #[error(transparent)]
    Election(#[from] ElectionError),
    #[error("{1}")]
    Status(Status, String),
}

impl Error {
    /// Shorthand for a 404 about the given thing.
    pub fn not_found(what: String) -> Self {
        Self::Status(Status::NotFound, format!("{what} not found"))
    }

    pub fn bad_request(message: String) -> Self {
        Self::Status(Status::BadRequest, message)
    }

    /// Shorthand for a 401 on a failed login.
    pub fn bad_login() -> Self {
        Self::Status(
            Status::Unauthorized,
            "No account found with the provided credentials".to_string(),
        )
    }

    fn status(&self) -> Status {
        match self {
            Self::Db(_) | Self::Argon2(_) => Status::InternalServerError,
            Self::Jwt(err) => match err.kind() {
                JwtErrorKind::ExpiredSignature | JwtErrorKind::ImmatureSignature => {
                    Status::Unauthorized
                }
                _ => Status::BadRequest,
            },
            Self::Election(err) => match err {
                ElectionError::UnknownVoter(_) | ElectionError::UnknownCandidate(_) => {
                    Status::NotFound
                }
                ElectionError::ResultsNotAvailable => Status::Forbidden,
                _ => match err.kind() {
                    ErrorKind::Validation => Status::BadRequest,
                    ErrorKind::StateConflict => Status::Conflict,
                },
            },
            Self::Status(status, _) => *status,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Election(err) => err.code(),
            Self::Db(_) => "Database",
            Self::Jwt(_) => "Token",
            Self::Argon2(_) => "Credential",
            Self::Status(..) => "Request",
        }
    }
}

/// JSON body sent with every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        if status.class().is_server_error() {
            error!("{self}");
        } else {
            debug!("{self}");
        }
        // Don't leak internals to the client.
        let message = if status.class().is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        let body = ErrorBody {
            code: self.code().to_string(),
            message,
        };
        Custom(status, Json(body)).respond_to(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn election_errors_map_to_statuses() {
        let status = |e: ElectionError| Error::from(e).status();
        assert_eq!(
            status(ElectionError::DuplicateId("a".into())),
            Status::BadRequest
        );
        assert_eq!(
            status(ElectionError::UnknownCandidate("a".into())),
            Status::NotFound
        );
        assert_eq!(
            status(ElectionError::AlreadyVoted("a".into())),
            Status::Conflict
        );
        assert_eq!(status(ElectionError::ElectionNotActive), Status::Conflict);
        assert_eq!(
            status(ElectionError::ResultsNotAvailable),
            Status::Forbidden
        );
    }
}
