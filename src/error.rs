use std::fmt;

use crate::report::ExitStatus;

#[derive(Debug)]
pub enum AppError {
    /// No usable email addresses, or an unreadable email source
    Input(String),
    /// Missing or malformed platform host/token
    AuthConfig(String),
    Configuration(String),
    NotFound {
        email: String,
    },
    TeamNotFound {
        team: String,
        organization: String,
    },
    NotMember {
        email: String,
        team: String,
    },
    /// Whole batch rejected; `status` is `None` when no response arrived
    BulkRemoval {
        status: Option<u16>,
        detail: String,
    },
    Api {
        status: u16,
        url: String,
        body: String,
    },
    Http(reqwest::Error),
    Serialization(serde_json::Error),
    Io(std::io::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Input(e) => write!(f, "Input error: {}", e),
            AppError::AuthConfig(e) => write!(f, "Authentication configuration error: {}", e),
            AppError::Configuration(e) => write!(f, "Configuration error: {}", e),
            AppError::NotFound { email } => {
                write!(f, "No organization membership found for '{}'", email)
            }
            AppError::TeamNotFound { team, organization } => {
                write!(f, "Team '{}' not found in organization '{}'", team, organization)
            }
            AppError::NotMember { email, team } => {
                write!(f, "User '{}' is not a member of team '{}'", email, team)
            }
            AppError::BulkRemoval {
                status: Some(status),
                detail,
            } => write!(f, "Bulk removal failed (HTTP {}): {}", status, detail),
            AppError::BulkRemoval {
                status: None,
                detail,
            } => write!(f, "Bulk removal failed: {}", detail),
            AppError::Api { status, url, body } => {
                write!(f, "API request to {} failed (HTTP {}): {}", url, status, body)
            }
            AppError::Http(e) => write!(f, "HTTP error: {}", e),
            AppError::Serialization(e) => write!(f, "Serialization error: {}", e),
            AppError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Http(e) => Some(e),
            AppError::Serialization(e) => Some(e),
            AppError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Http(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err)
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::Configuration(format!("Invalid URL: {}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;

// Process exit code mapping
impl AppError {
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            AppError::TeamNotFound { .. } => ExitStatus::TeamNotFound,
            AppError::NotMember { .. } => ExitStatus::NotMember,
            AppError::BulkRemoval { .. } => ExitStatus::RemovalFailed,
            AppError::Input(_)
            | AppError::AuthConfig(_)
            | AppError::Configuration(_)
            | AppError::NotFound { .. }
            | AppError::Api { .. }
            | AppError::Http(_)
            | AppError::Serialization(_)
            | AppError::Io(_) => ExitStatus::EmailNotFound,
        }
    }
}
