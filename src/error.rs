//! Error types for the tour planner.

use thiserror::Error;

/// Failure talking to an external routing service.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// The request never completed: connection refused, DNS, timeout.
    #[error("transport failure: {message}")]
    Transport { message: String },

    /// The provider answered with a non-success status.
    #[error("provider returned status {status}")]
    Status { status: u16, body: String },

    /// The provider answered with success but the payload is unusable.
    #[error("malformed provider payload: {reason}")]
    Malformed {
        reason: String,
        status: u16,
        body: String,
    },
}

impl RoutingError {
    pub fn status(&self) -> Option<u16> {
        match self {
            RoutingError::Transport { .. } => None,
            RoutingError::Status { status, .. } | RoutingError::Malformed { status, .. } => {
                Some(*status)
            }
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            RoutingError::Transport { .. } => None,
            RoutingError::Status { body, .. } | RoutingError::Malformed { body, .. } => {
                Some(body)
            }
        }
    }

    /// True when the provider accepted and answered the request, so it
    /// counts against the monthly budget.
    pub fn consumed_quota(&self) -> bool {
        matches!(self, RoutingError::Malformed { .. })
    }
}

impl From<reqwest::Error> for RoutingError {
    fn from(err: reqwest::Error) -> Self {
        // Request URLs can carry access tokens.
        let err = err.without_url();
        let message = if err.is_timeout() {
            format!("request timed out: {err}")
        } else {
            err.to_string()
        };
        RoutingError::Transport { message }
    }
}

/// Failure reading or updating the quota datastore.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error(
        "monthly routing quota exhausted ({count}/{limit} requests used); try again next month"
    )]
    QuotaExceeded { count: u64, limit: u64 },

    #[error("routing provider error: {0}")]
    RoutingProvider(#[from] RoutingError),

    #[error("quota store error: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("failed to store tour order: {0}")]
    Membership(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl PlannerError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        PlannerError::InvalidArgument {
            message: message.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        PlannerError::Config {
            message: message.into(),
        }
    }

    /// Message safe to show an end user. Provider diagnostics stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            PlannerError::InvalidArgument { .. } | PlannerError::QuotaExceeded { .. } => {
                self.to_string()
            }
            PlannerError::RoutingProvider(_) => {
                "The routing service is unavailable right now. Please try again.".to_string()
            }
            PlannerError::Store(_) | PlannerError::Config { .. } | PlannerError::Membership(_) => {
                "Tour optimization is temporarily unavailable.".to_string()
            }
        }
    }
}

/// Alias for `Result<T, PlannerError>`.
pub type Result<T> = std::result::Result<T, PlannerError>;
