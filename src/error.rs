//! # Error Handling
//!
//! This module defines the crate-wide error taxonomy. Every failure a ceremony,
//! status query, or session mutation can produce is translated into one of
//! these variants before it reaches a caller - the UI controller never sees a
//! raw transport or authenticator error.
//!
//! Note that "needs registration" is deliberately *not* an error variant. It is
//! a distinguished outcome arm on [`AuthenticationOutcome`] because the UI must
//! offer a "register now" affordance, not a retry.
//!
//! [`AuthenticationOutcome`]: crate::ceremony::AuthenticationOutcome

use thiserror::Error;

/// Subsystem-wide error type
///
/// Each variant corresponds to a different recovery path for the caller:
///
/// - `UnsupportedCapability`: fatal to the ceremony, not the app; the feature
///   is disabled entirely.
/// - `InvalidInput`: the user must correct their input (e.g. empty email).
/// - `ServerRejected` / `ServerUnavailable`: recoverable - offer a retry.
/// - `VerificationRejected`: the relying party declined the authenticator
///   response; safe to retry.
/// - `UserCancelled`: silent - no error banner, just return to idle.
/// - `Unauthorized`: status/revoke calls with a stale or missing proof token -
///   prompt a re-login.
/// - `Internal`: invariant violations that should not occur in normal use.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The host platform exposes no biometric/security-key capability,
    /// or is not running in a secure context
    #[error("biometric authentication is not supported on this platform")]
    UnsupportedCapability,

    /// The caller supplied input the ceremony cannot proceed with
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The relying party rejected the request with an explicit message
    #[error("server rejected the request: {0}")]
    ServerRejected(String),

    /// The relying party could not be reached, or answered with a 5xx
    #[error("server unavailable: {0}")]
    ServerUnavailable(String),

    /// The relying party processed the authenticator response but did not
    /// accept it (`verified: false` or a malformed response)
    #[error("verification was rejected by the server")]
    VerificationRejected,

    /// The user dismissed the platform authenticator prompt
    #[error("the user cancelled the ceremony")]
    UserCancelled,

    /// A bearer-authenticated call was made without a valid proof token
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Unexpected internal failures (serialization, invariant violations)
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for AuthError {
    fn from(e: serde_json::Error) -> Self {
        AuthError::Internal(format!("serialization error: {}", e))
    }
}

/// Convenience type alias for Results using AuthError
pub type AuthResult<T> = Result<T, AuthError>;
