use axum::http::StatusCode;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::CondType;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("failed to read data file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: unparseable date '{value}'")]
    InvalidDate { row: u64, value: String },

    #[error("row {row}: value '{value}' is not a non-negative count")]
    InvalidValue { row: u64, value: String },

    #[error("unknown condition type '{0}'")]
    UnknownCondType(String),

    #[error("no {cond_type} aggregate for {date}")]
    MissingAggregate { date: NaiveDate, cond_type: CondType },

    #[error("no {0} rows in snapshot")]
    EmptySnapshot(CondType),

    #[error("{0}")]
    InvalidFilter(String),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<DashboardError> for AppError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::InvalidFilter(message) => Self::bad_request(message),
            other => Self::internal(other),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_filter_maps_to_bad_request() {
        let err: AppError = DashboardError::InvalidFilter("bad population".into()).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "bad population");
    }

    #[test]
    fn recoverable_errors_map_to_internal() {
        let err: AppError = DashboardError::EmptySnapshot(CondType::StudIso).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
