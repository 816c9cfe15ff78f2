//! Remote error types.
//!
//! [`RemoteError`] carries a semantic [`RemoteErrorKind`], retry guidance and
//! optional path/backend context so callers can decide between "absent",
//! "retry later" and "give up" without knowing which backend produced it.

/// Semantic error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum RemoteErrorKind {
    /// Path does not exist at the requested ref.
    NotFound,
    /// Path exists but is not a file (directory, submodule, symlink).
    NotAFile,
    /// Credentials missing or insufficient.
    PermissionDenied,
    /// API quota exhausted.
    RateLimited,
    /// Remote host is temporarily unavailable.
    Unavailable,
    /// Request timed out.
    Timeout,
    /// Response could not be decoded (bad JSON, bad base64, non UTF-8 text).
    InvalidContent,
    /// Other/unknown error category.
    Other,
}

/// Retry guidance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorStatus {
    /// Don't retry (not found, permission, invalid content).
    #[default]
    Permanent,
    /// Retry immediately (timeout, connection reset).
    Temporary,
    /// Retry with backoff (rate limited, service unavailable).
    Persistent,
}

/// Remote error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct RemoteError {
    /// Semantic error category.
    pub kind: RemoteErrorKind,
    /// Retry guidance.
    pub status: ErrorStatus,
    /// Repository path context (if applicable).
    pub path: Option<String>,
    /// Backend identifier (e.g., "GitHub", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl RemoteError {
    /// Create a new remote error.
    #[must_use]
    pub fn new(kind: RemoteErrorKind) -> Self {
        Self {
            kind,
            status: ErrorStatus::Permanent,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set retry status.
    #[must_use]
    pub fn with_status(mut self, status: ErrorStatus) -> Self {
        self.status = status;
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Attach a plain message as the source.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        let message: String = message.into();
        self.source = Some(message.into());
        self
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::NotFound).with_path(path)
    }

    /// Create a "not a file" error with path.
    #[must_use]
    pub fn not_a_file(path: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::NotAFile).with_path(path)
    }

    /// Classify an HTTP error status.
    ///
    /// `rate_limited` reflects the response's rate-limit headers, which turn an
    /// otherwise plain 403 into [`RemoteErrorKind::RateLimited`].
    #[must_use]
    pub fn from_http_status(status: u16, rate_limited: bool) -> Self {
        match status {
            429 => Self::new(RemoteErrorKind::RateLimited).with_status(ErrorStatus::Persistent),
            403 if rate_limited => {
                Self::new(RemoteErrorKind::RateLimited).with_status(ErrorStatus::Persistent)
            }
            401 | 403 => Self::new(RemoteErrorKind::PermissionDenied),
            404 => Self::new(RemoteErrorKind::NotFound),
            408 => Self::new(RemoteErrorKind::Timeout).with_status(ErrorStatus::Temporary),
            500..=599 => {
                Self::new(RemoteErrorKind::Unavailable).with_status(ErrorStatus::Persistent)
            }
            _ => Self::new(RemoteErrorKind::Other),
        }
    }

    /// True if the error means the path simply isn't there as a file.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(
            self.kind,
            RemoteErrorKind::NotFound | RemoteErrorKind::NotAFile
        )
    }
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (path: foo/bar)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            RemoteErrorKind::NotFound => "Not found",
            RemoteErrorKind::NotAFile => "Not a file",
            RemoteErrorKind::PermissionDenied => "Permission denied",
            RemoteErrorKind::RateLimited => "Rate limited",
            RemoteErrorKind::Unavailable => "Unavailable",
            RemoteErrorKind::Timeout => "Timeout",
            RemoteErrorKind::InvalidContent => "Invalid content",
            RemoteErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {path})")?;
        }

        Ok(())
    }
}

impl std::error::Error for RemoteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}
