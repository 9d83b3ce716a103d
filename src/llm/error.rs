use std::fmt;

/// Everything the completion client can surface. Nothing is retried
/// internally; each failure goes straight to the caller.
#[derive(Debug)]
pub enum LlmError {
    Authentication(String),
    RateLimit(String),
    Connectivity(String),
    RemoteService { status: u16, message: String },
    Initialization(String),
    Unknown(String),
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication(msg) => write!(f, "Authentication error: {}", msg),
            Self::RateLimit(msg) => write!(f, "Rate limit error: {}", msg),
            Self::Connectivity(msg) => write!(f, "Connection error: {}", msg),
            Self::RemoteService { status, message } => {
                write!(f, "API error ({}): {}", status, message)
            }
            Self::Initialization(msg) => write!(f, "Initialization error: {}", msg),
            Self::Unknown(msg) => write!(f, "Unexpected error: {}", msg),
        }
    }
}

impl std::error::Error for LlmError {}

impl From<reqwest::Error> for LlmError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            LlmError::Unknown(format!("Could not read response: {}", error))
        } else {
            LlmError::Connectivity(error.to_string())
        }
    }
}
