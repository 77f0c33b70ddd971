//! Authentication and session error types.
//!
//! Every failure a request can hit on the login or protected-read path maps
//! to exactly one variant here. The HTTP mapping lives in
//! [`crate::middleware::error`].

/// Errors that can occur while issuing or verifying credentials and
/// resolving profiles.
///
/// Credential-verification variants carry distinct messages for
/// debuggability, but none of them reveal whether a given *username* exists.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The request body is missing required fields or a field is malformed.
    #[error("Validation error: {message}")]
    Validation {
        /// Description of the invalid input.
        message: String,
    },

    /// Login credentials were rejected. Intentionally generic: the same
    /// message is produced for an unknown username and a wrong password.
    #[error("{message}")]
    Unauthorized {
        /// Generic rejection message.
        message: String,
    },

    /// No authorization material was supplied at all.
    #[error("No credential provided")]
    MissingCredential,

    /// An Authorization header is present but carries no bearer token.
    #[error("Malformed credential format")]
    MalformedCredential,

    /// Signature verification failed or the credential has expired.
    #[error("Invalid or expired credential: {message}")]
    InvalidToken {
        /// Description of the verification failure.
        message: String,
    },

    /// The session tier is enabled but holds no record for the subject.
    #[error("Session not found or expired")]
    SessionNotFound,

    /// The stored session record could not be parsed.
    #[error("Stored session data is corrupt: {message}")]
    CorruptSession {
        /// Description of the parse failure.
        message: String,
    },

    /// The stored session holds a different token than the one presented.
    /// Only the most recent login's credential is valid for a subject.
    #[error("Credential does not match the recorded session")]
    SessionMismatch,

    /// The credential is valid but the backing identity record is gone.
    #[error("User profile not found")]
    ProfileNotFound,

    /// The durable or fast store failed or is unreachable.
    #[error("Upstream store error: {message}")]
    Upstream {
        /// Description of the store failure.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `Validation` error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates the generic login rejection.
    ///
    /// Always use this for failed logins so unknown-user and wrong-password
    /// outcomes are indistinguishable to the caller.
    #[must_use]
    pub fn bad_credentials() -> Self {
        Self::Unauthorized {
            message: "Invalid username or password".to_string(),
        }
    }

    /// Creates a new `InvalidToken` error.
    #[must_use]
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    /// Creates a new `CorruptSession` error.
    #[must_use]
    pub fn corrupt_session(message: impl Into<String>) -> Self {
        Self::CorruptSession {
            message: message.into(),
        }
    }

    /// Creates a new `Upstream` error.
    #[must_use]
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Upstream { .. })
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }

    /// Returns `true` if this error arose from credential verification.
    #[must_use]
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential
                | Self::MalformedCredential
                | Self::InvalidToken { .. }
                | Self::SessionNotFound
                | Self::CorruptSession { .. }
                | Self::SessionMismatch
        )
    }

    /// Returns a short machine-readable code for logging and the
    /// `WWW-Authenticate` header.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "invalid_request",
            Self::Unauthorized { .. } => "unauthorized",
            Self::MissingCredential => "missing_credential",
            Self::MalformedCredential => "malformed_credential",
            Self::InvalidToken { .. } => "invalid_token",
            Self::SessionNotFound => "session_not_found",
            Self::CorruptSession { .. } => "corrupt_session",
            Self::SessionMismatch => "session_mismatch",
            Self::ProfileNotFound => "profile_not_found",
            Self::Upstream { .. } => "upstream_error",
        }
    }
}
