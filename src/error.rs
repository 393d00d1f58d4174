use crate::data::SourceKind;

/// Exit code for usage, configuration, and local IO errors.
pub const EXIT_USAGE: u8 = 2;
/// Exit code for upstream feed and runtime failures.
pub const EXIT_UPSTREAM: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(EXIT_UPSTREAM, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Classified failure of a single upstream feed.
///
/// Whether one of these aborts a run or degrades the source to an empty list
/// is decided by [`crate::config::FailurePolicy`], never by the fetch code.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("{source_kind}: request failed: {message}")]
    Network {
        source_kind: SourceKind,
        message: String,
    },
    #[error("{source_kind}: request timed out after {timeout_secs}s")]
    Timeout {
        source_kind: SourceKind,
        timeout_secs: u64,
    },
    #[error("{source_kind}: malformed JSON: {message}")]
    Malformed {
        source_kind: SourceKind,
        message: String,
    },
    #[error("{source_kind}: unexpected response shape: {message}")]
    UnexpectedShape {
        source_kind: SourceKind,
        message: String,
    },
}

impl FetchError {
    pub fn source_kind(&self) -> SourceKind {
        match self {
            FetchError::Network { source_kind, .. }
            | FetchError::Timeout { source_kind, .. }
            | FetchError::Malformed { source_kind, .. }
            | FetchError::UnexpectedShape { source_kind, .. } => *source_kind,
        }
    }

    /// Short label used in summaries and logs.
    pub fn class(&self) -> &'static str {
        match self {
            FetchError::Network { .. } => "network",
            FetchError::Timeout { .. } => "timeout",
            FetchError::Malformed { .. } => "malformed",
            FetchError::UnexpectedShape { .. } => "shape",
        }
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        AppError::upstream(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_maps_to_upstream_exit_code() {
        let err = FetchError::Timeout {
            source_kind: SourceKind::Vast,
            timeout_secs: 5,
        };
        assert_eq!(err.class(), "timeout");
        assert_eq!(err.source_kind(), SourceKind::Vast);

        let app: AppError = err.into();
        assert_eq!(app.exit_code(), EXIT_UPSTREAM);
        assert_eq!(app.to_string(), "vast: request timed out after 5s");
    }
}
