use mongodb::error::Error as DbError;
use rocket::{
    http::{Status, StatusClass},
    response::Responder,
    serde::json::Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::RequestId;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure a caller can observe. None of these are fatal: each is
/// rendered as a notification and the user may retry once the cause is fixed.
#[derive(Debug, Error)]
pub enum Error {
    #[error("You must be a verified voter to cast votes")]
    NotEligible,
    #[error("You have already voted for this position")]
    AlreadyVoted,
    #[error("You have already registered for this position")]
    AlreadyCandidate,
    #[error("You have already submitted a voter registration")]
    AlreadyRegistered,
    #[error("This election is not open for voting")]
    ElectionNotOpen,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Storage unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Assistant unavailable: {0}")]
    AssistantUnavailable(String),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn bad_request(why: impl Into<String>) -> Self {
        Self::BadRequest(why.into())
    }

    /// The HTTP status this error is reported with.
    pub fn status(&self) -> Status {
        match self {
            Self::NotEligible => Status::Forbidden,
            Self::AlreadyVoted | Self::AlreadyCandidate | Self::AlreadyRegistered => {
                Status::Conflict
            }
            Self::ElectionNotOpen => Status::UnprocessableEntity,
            Self::NotFound(_) => Status::NotFound,
            Self::BadRequest(_) => Status::BadRequest,
            Self::StoreUnavailable(_) | Self::AssistantUnavailable(_) => {
                Status::ServiceUnavailable
            }
        }
    }
}

impl From<DbError> for Error {
    fn from(err: DbError) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    /// Request URLs are stripped, since they name the upstream endpoint.
    fn from(err: reqwest::Error) -> Self {
        Self::AssistantUnavailable(err.without_url().to_string())
    }
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    /// Matches the `X-Request-Id` header and the server log.
    pub request_id: usize,
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        let request_id = RequestId::of(req);
        if matches!(status.class(), StatusClass::ServerError) {
            error!("req{request_id} failed: {self}");
        }
        let body = Json(ErrorBody {
            error: self.to_string(),
            request_id: request_id.0,
        });
        (status, body).respond_to(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_rejections_are_client_errors() {
        assert_eq!(Error::NotEligible.status(), Status::Forbidden);
        assert_eq!(Error::AlreadyVoted.status(), Status::Conflict);
        assert_eq!(Error::ElectionNotOpen.status(), Status::UnprocessableEntity);
        assert_eq!(
            Error::StoreUnavailable("timeout".to_string()).status(),
            Status::ServiceUnavailable
        );
    }

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(
            Error::AlreadyVoted.to_string(),
            "You have already voted for this position"
        );
        assert_eq!(
            Error::not_found("Election 42").to_string(),
            "Not found: Election 42"
        );
    }
}
