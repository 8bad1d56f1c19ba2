//! # Registration Ceremony
//!
//! Provisions a new biometric credential for an email. Registration is a
//! challenge-response exchange: the relying party mints a single-use
//! challenge, the platform authenticator produces an attestation over it, and
//! the relying party verifies and stores the resulting public key.
//!
//! The private key never leaves the user's device; this client only shuttles
//! opaque payloads between the two parties.

use super::types::CeremonyOptions;
use super::{Ceremony, CeremonyClient, CeremonyKind, CeremonyPhase, RegistrationOutcome};
use crate::authenticator::AuthenticatorError;
use crate::error::AuthError;

/// Run one registration ceremony to its terminal outcome.
///
/// ## Flow
/// 1. Preconditions (no I/O yet): capability probe, non-empty email
/// 2. `ChallengeRequested` - fetch ceremony options scoped to `email`
/// 3. `AwaitingAuthenticator` - create the credential; the user may cancel
///    here, which is a quiet failure, not a corrupted state
/// 4. `Verifying` - submit the attestation
/// 5. Terminal: `Success` when the server reports `verified: true`, otherwise
///    `Failure(VerificationRejected)`
pub(super) async fn run(client: &CeremonyClient, email: &str) -> RegistrationOutcome {
    let mut ceremony = Ceremony::new(CeremonyKind::Register, email);

    if let Err(e) = client.preflight(email) {
        ceremony.advance(CeremonyPhase::Failure);
        return RegistrationOutcome::Failure(e);
    }

    // Step 2: server-issued challenge options. Nothing has been committed
    // yet, so a rejection here simply reports the server's message.
    ceremony.advance(CeremonyPhase::ChallengeRequested);
    let options: CeremonyOptions = match client.boundary.init_registration(ceremony.email()).await
    {
        Ok(options) => options,
        Err(e) => {
            ceremony.advance(CeremonyPhase::Failure);
            return RegistrationOutcome::Failure(e.into());
        }
    };

    // Step 3: the authenticator prompt. Unbounded duration - the user decides
    // when (and whether) this resolves.
    ceremony.advance(CeremonyPhase::AwaitingAuthenticator);
    let attestation = match client.authenticator.create_credential(&options).await {
        Ok(attestation) => attestation,
        Err(AuthenticatorError::Cancelled) => {
            ceremony.advance(CeremonyPhase::Failure);
            return RegistrationOutcome::Failure(AuthError::UserCancelled);
        }
        Err(AuthenticatorError::Failed(msg)) => {
            ceremony.advance(CeremonyPhase::Failure);
            return RegistrationOutcome::Failure(AuthError::Internal(msg));
        }
    };

    // Step 4: hand the attestation to the relying party for verification
    ceremony.advance(CeremonyPhase::Verifying);
    let verdict = match client.boundary.verify_registration(&attestation).await {
        Ok(verdict) => verdict,
        Err(e) => {
            ceremony.advance(CeremonyPhase::Failure);
            return RegistrationOutcome::Failure(e.into());
        }
    };

    if verdict.verified {
        ceremony.advance(CeremonyPhase::Success);
        tracing::info!(email = %ceremony.email(), "biometric credential registered");
        RegistrationOutcome::Success {
            email: ceremony.email().to_string(),
        }
    } else {
        ceremony.advance(CeremonyPhase::Failure);
        RegistrationOutcome::Failure(AuthError::VerificationRejected)
    }
}
