use std::fmt;

/// Coarse classification of runtime failures, stable across executor layers.
///
/// Handlers and executors construct [`GencError`] directly; callers who only
/// care about the taxonomy (not the message) match on [`GencError::kind`]
/// rather than downcasting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    Unimplemented,
    Internal,
    FailedPrecondition,
    Unavailable,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Unimplemented => "unimplemented",
            ErrorKind::Internal => "internal",
            ErrorKind::FailedPrecondition => "failed_precondition",
            ErrorKind::Unavailable => "unavailable",
        };
        f.write_str(s)
    }
}

/// The runtime's structured error type.
///
/// Every executor and handler operation returns `genc_value::Result<T>`
/// (an alias for `Result<T, GencError>`) rather than a boxed/dynamic error,
/// so callers can match on `kind()` to distinguish e.g. a missing handler
/// from a malformed static parameter without downcasting.
#[derive(Debug)]
pub struct GencError {
    kind: ErrorKind,
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl GencError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        GencError { kind, message: message.into(), source: None }
    }

    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        GencError { kind, message: message.into(), source: Some(Box::new(source)) }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn unimplemented(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unimplemented, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn failed_precondition(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FailedPrecondition, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unavailable, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Prefixes the message with diagnostic context, preserving kind and source.
    ///
    /// Used by the control-flow executor to annotate scope-lookup and
    /// block-local failures without losing the original taxonomy — unlike
    /// wrapping in a boxed `dyn Error`, `kind()` stays intact for callers
    /// matching on it after the annotation.
    pub fn annotate(mut self, context: impl fmt::Display) -> Self {
        self.message = format!("{}: {}", context, self.message);
        self
    }

    /// Clones kind and message, dropping any chained source. Used where an
    /// error lives behind a shared future (`Arc<GencError>`, per
    /// `genc_runtime::GencFuture`) and a call site needs an owned
    /// `GencError` it can return from its own fallible signature.
    pub fn duplicate(&self) -> GencError {
        GencError { kind: self.kind, message: self.message.clone(), source: None }
    }
}

impl fmt::Display for GencError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for GencError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_deref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

pub type Result<T> = std::result::Result<T, GencError>;
