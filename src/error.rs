use jsonwebtoken::errors::Error as JwtError;
use log::{error, warn};
use mongodb::error::{Error as DbError, TRANSIENT_TRANSACTION_ERROR};
use rocket::{
    http::Status,
    response::{self, Responder},
    serde::json::Json,
    Request,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::election::{ElectionError, EligibilityError, RangeError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Election(#[from] ElectionError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error("{1}")]
    Status(Status, String),
}

impl Error {
    /// The HTTP status this error is reported with.
    pub fn status(&self) -> Status {
        match self {
            Self::Election(err) => match err {
                ElectionError::Unauthorized => Status::Forbidden,
                ElectionError::Validation(_) => Status::BadRequest,
                ElectionError::Temporal(_) => Status::Conflict,
                ElectionError::Eligibility(EligibilityError::NotRegistered) => Status::Forbidden,
                ElectionError::Eligibility(EligibilityError::AlreadyVoted) => Status::Conflict,
                ElectionError::Range(RangeError::NoSuchElection(_)) => Status::NotFound,
                ElectionError::Range(RangeError::InvalidCandidate(_)) => Status::UnprocessableEntity,
                ElectionError::Range(RangeError::IdsExhausted) => Status::InsufficientStorage,
            },
            Self::Db(err) if err.contains_label(TRANSIENT_TRANSACTION_ERROR) => Status::Conflict,
            Self::Db(_) | Self::Jwt(_) => Status::InternalServerError,
            Self::Status(status, _) => *status,
        }
    }

    fn body(&self) -> ErrorBody {
        let (error, reason) = match self {
            Self::Election(err) => (err.category().to_string(), err.reason().to_string()),
            Self::Db(err) if err.contains_label(TRANSIENT_TRANSACTION_ERROR) => {
                ("ConflictError".to_string(), "TransactionConflict".to_string())
            }
            Self::Db(_) => ("InternalError".to_string(), "Database".to_string()),
            Self::Jwt(_) => ("InternalError".to_string(), "Token".to_string()),
            Self::Status(status, _) => ErrorBody::http_labels(*status),
        };
        ErrorBody {
            error,
            reason,
            message: self.to_string(),
        }
    }
}

/// The JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error category, e.g. `EligibilityError`.
    pub error: String,
    /// Specific reason within the category, e.g. `AlreadyVoted`.
    pub reason: String,
    /// Human-readable description.
    pub message: String,
}

impl ErrorBody {
    /// Body for a failure that only has an HTTP status, e.g. one caught by a catcher.
    pub fn for_status(status: Status) -> Self {
        let (error, reason) = Self::http_labels(status);
        Self {
            error,
            reason,
            message: status.reason_lossy().to_string(),
        }
    }

    fn http_labels(status: Status) -> (String, String) {
        let error = match status.code {
            401 => "AuthenticationError",
            400..=499 => "RequestError",
            _ => "InternalError",
        };
        (error.to_string(), status.reason_lossy().replace(' ', ""))
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let status = self.status();
        if status.code >= 500 {
            error!("{} {}: {self}", req.method(), req.uri());
        } else {
            warn!("{} {}: {self}", req.method(), req.uri());
        }
        (status, Json(self.body())).respond_to(req)
    }
}
