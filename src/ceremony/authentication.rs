//! # Authentication Ceremony
//!
//! Asserts an existing biometric credential for an email. Same five-step shape
//! as registration, with two differences: the challenge request may come back
//! with a distinguished "needs registration" condition (no credential exists
//! for this email), and a successful verdict carries the server-resolved
//! identity. That resolution is authoritative - the caller mints the local
//! pseudo-session from it, never from user-typed data.

use super::types::ResolvedIdentity;
use super::{
    AuthenticationOutcome, Ceremony, CeremonyClient, CeremonyKind, CeremonyPhase,
};
use crate::authenticator::AuthenticatorError;
use crate::boundary::BoundaryError;
use crate::error::AuthError;

/// Run one authentication ceremony to its terminal outcome.
pub(super) async fn run(client: &CeremonyClient, email: &str) -> AuthenticationOutcome {
    let mut ceremony = Ceremony::new(CeremonyKind::Authenticate, email);

    if let Err(e) = client.preflight(email) {
        ceremony.advance(CeremonyPhase::Failure);
        return AuthenticationOutcome::Failure(e);
    }

    ceremony.advance(CeremonyPhase::ChallengeRequested);
    let options = match client.boundary.init_authentication(ceremony.email()).await {
        Ok(options) => options,
        // Its own terminal state: the UI offers "register now", not a retry
        Err(BoundaryError::NeedsRegistration(msg)) => {
            tracing::debug!(email = %ceremony.email(), %msg, "no credential provisioned");
            ceremony.advance(CeremonyPhase::NeedsRegistration);
            return AuthenticationOutcome::NeedsRegistration {
                email: ceremony.email().to_string(),
            };
        }
        Err(e) => {
            ceremony.advance(CeremonyPhase::Failure);
            return AuthenticationOutcome::Failure(e.into());
        }
    };

    ceremony.advance(CeremonyPhase::AwaitingAuthenticator);
    let assertion = match client.authenticator.get_credential(&options).await {
        Ok(assertion) => assertion,
        Err(AuthenticatorError::Cancelled) => {
            ceremony.advance(CeremonyPhase::Failure);
            return AuthenticationOutcome::Failure(AuthError::UserCancelled);
        }
        Err(AuthenticatorError::Failed(msg)) => {
            ceremony.advance(CeremonyPhase::Failure);
            return AuthenticationOutcome::Failure(AuthError::Internal(msg));
        }
    };

    ceremony.advance(CeremonyPhase::Verifying);
    let verdict = match client.boundary.verify_authentication(&assertion).await {
        Ok(verdict) => verdict,
        Err(e) => {
            ceremony.advance(CeremonyPhase::Failure);
            return AuthenticationOutcome::Failure(e.into());
        }
    };

    // A verified verdict without a resolved identity is malformed - treat it
    // the same as a rejection rather than minting a session from nothing.
    if verdict.verified && !verdict.user_id.is_empty() {
        ceremony.advance(CeremonyPhase::Success);
        tracing::info!(email = %verdict.email, "biometric authentication verified");
        AuthenticationOutcome::Success(ResolvedIdentity {
            user_id: verdict.user_id,
            email: verdict.email,
        })
    } else {
        ceremony.advance(CeremonyPhase::Failure);
        AuthenticationOutcome::Failure(AuthError::VerificationRejected)
    }
}
