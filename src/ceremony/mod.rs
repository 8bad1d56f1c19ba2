//! # Ceremony Client
//!
//! Drives one registration or authentication ceremony end to end: request a
//! challenge from the relying party, invoke the platform authenticator, submit
//! the response, interpret the verdict.
//!
//! ## Ceremony Flow
//! Every ceremony follows the same five-step shape:
//! 1. Preconditions (capability probe, input validation) - before any I/O
//! 2. Request challenge options from the relying party (`ChallengeRequested`)
//! 3. Invoke the platform authenticator (`AwaitingAuthenticator`) - the only
//!    step with unbounded, user-controlled duration
//! 4. Submit the authenticator's response for verification (`Verifying`)
//! 5. Interpret the verdict (`Success` / `Failure` / `NeedsRegistration`)
//!
//! A ceremony instance is single-use: each call constructs a fresh `Ceremony`
//! and consumes it on the way to exactly one terminal outcome. Calls never
//! return `Err` - every failure, including user cancellation at the
//! authenticator prompt, settles into the outcome enum.
//!
//! Steps execute strictly in sequence; no two boundary calls for the same
//! ceremony are ever in flight concurrently. Running two *ceremonies* at once
//! is undefined platform behavior and is prevented by the controller's
//! synchronous busy gate, not by queueing here.

mod authentication;
mod registration;
pub mod types;

use crate::authenticator::PlatformAuthenticator;
use crate::boundary::RelyingParty;
use crate::capability::CapabilityProbe;
use crate::error::AuthError;
use std::sync::Arc;
use types::ResolvedIdentity;

/// Which ceremony a [`Ceremony`] instance is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CeremonyKind {
    Register,
    Authenticate,
}

/// Protocol phase of one ceremony instance
///
/// `Idle` is initial; `Success`, `Failure`, and `NeedsRegistration` are
/// terminal. A new ceremony is a fresh instance starting back at `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CeremonyPhase {
    Idle,
    ChallengeRequested,
    AwaitingAuthenticator,
    Verifying,
    Success,
    Failure,
    NeedsRegistration,
}

/// One transient ceremony run - created per user action, discarded once
/// terminal, never stored
#[derive(Debug)]
pub(crate) struct Ceremony {
    kind: CeremonyKind,
    email: String,
    phase: CeremonyPhase,
}

impl Ceremony {
    pub(crate) fn new(kind: CeremonyKind, email: &str) -> Self {
        Ceremony {
            kind,
            email: email.to_string(),
            phase: CeremonyPhase::Idle,
        }
    }

    pub(crate) fn email(&self) -> &str {
        &self.email
    }

    /// Move to the next protocol phase.
    pub(crate) fn advance(&mut self, phase: CeremonyPhase) {
        tracing::debug!(
            kind = ?self.kind,
            email = %self.email,
            from = ?self.phase,
            to = ?phase,
            "ceremony phase transition"
        );
        self.phase = phase;
    }
}

/// Terminal outcome of a registration ceremony
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// The credential is now provisioned for this email
    Success { email: String },
    Failure(AuthError),
}

/// Terminal outcome of an authentication ceremony
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationOutcome {
    /// The relying party verified the assertion and resolved the identity it
    /// belongs to
    Success(ResolvedIdentity),
    /// No credential exists for this email - the caller should offer
    /// registration, not a retry
    NeedsRegistration { email: String },
    Failure(AuthError),
}

/// Drives registration and authentication ceremonies against the relying-party
/// boundary and the platform authenticator
///
/// Shared, cheaply clonable handles - the same client serves every ceremony
/// for the lifetime of the process.
#[derive(Clone)]
pub struct CeremonyClient {
    pub(crate) probe: Arc<dyn CapabilityProbe>,
    pub(crate) boundary: Arc<dyn RelyingParty>,
    pub(crate) authenticator: Arc<dyn PlatformAuthenticator>,
}

impl CeremonyClient {
    pub fn new(
        probe: Arc<dyn CapabilityProbe>,
        boundary: Arc<dyn RelyingParty>,
        authenticator: Arc<dyn PlatformAuthenticator>,
    ) -> Self {
        CeremonyClient {
            probe,
            boundary,
            authenticator,
        }
    }

    /// Run one registration ceremony for `email`.
    ///
    /// Always settles to exactly one terminal [`RegistrationOutcome`]; after
    /// any terminal state the credential status must be considered stale and
    /// re-queried (the status store never caches, so a fresh query suffices).
    pub async fn register(&self, email: &str) -> RegistrationOutcome {
        registration::run(self, email).await
    }

    /// Run one authentication ceremony for `email`.
    ///
    /// Always settles to exactly one terminal [`AuthenticationOutcome`]. A
    /// missing credential surfaces as `NeedsRegistration`, never as `Failure`.
    pub async fn authenticate(&self, email: &str) -> AuthenticationOutcome {
        authentication::run(self, email).await
    }

    /// Preconditions shared by both ceremonies, checked before any network
    /// call: the capability probe must pass and the email must be non-empty.
    pub(crate) fn preflight(&self, email: &str) -> Result<(), AuthError> {
        if !self.probe.supports_ceremony() {
            return Err(AuthError::UnsupportedCapability);
        }
        if email.trim().is_empty() {
            return Err(AuthError::InvalidInput("email is required".to_string()));
        }
        Ok(())
    }
}
