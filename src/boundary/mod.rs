//! # Relying-Party Boundary
//!
//! The relying party is the server-side collaborator that issues challenges
//! and verifies authenticator responses. This subsystem never performs
//! cryptographic verification itself - every ceremony round-trips through
//! this boundary.
//!
//! The boundary is a trait so the protocol logic can be exercised against
//! mocks; [`HttpRelyingParty`] is the production implementation.

mod http;

pub use http::HttpRelyingParty;

use crate::ceremony::types::{
    Assertion, Attestation, BiometricStatus, CeremonyOptions, VerifiedAuthentication,
    VerifiedRegistration,
};
use crate::error::AuthError;
use crate::session::ProofToken;
use async_trait::async_trait;
use thiserror::Error;

/// Failures the boundary can produce, one variant per recovery path
///
/// `NeedsRegistration` is a first-class variant rather than a flag on a
/// generic error: only `init_authentication` produces it, and the ceremony
/// client routes it to its own terminal outcome instead of a failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoundaryError {
    /// The server rejected the request with an explicit message (4xx)
    #[error("rejected: {0}")]
    Rejected(String),

    /// No credential is provisioned for the requested email; the server
    /// suggests registering first
    #[error("no credential registered: {0}")]
    NeedsRegistration(String),

    /// The server could not be reached, timed out, or answered with a 5xx
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// The bearer proof token was missing, stale, or not accepted
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

impl From<BoundaryError> for AuthError {
    /// Translate a boundary failure into the subsystem taxonomy.
    ///
    /// `NeedsRegistration` has no taxonomy arm on purpose - callers that can
    /// receive it (the authentication ceremony) must branch on it *before*
    /// converting; anywhere else it degrades to a plain rejection.
    fn from(e: BoundaryError) -> Self {
        match e {
            BoundaryError::Rejected(msg) => AuthError::ServerRejected(msg),
            BoundaryError::NeedsRegistration(msg) => AuthError::ServerRejected(msg),
            BoundaryError::Unavailable(msg) => AuthError::ServerUnavailable(msg),
            BoundaryError::Unauthorized(msg) => AuthError::Unauthorized(msg),
        }
    }
}

/// Request/response surface of the relying-party server
///
/// All payloads are JSON. Challenge options, attestations, and assertions are
/// opaque - only the relying party interprets them.
#[async_trait]
pub trait RelyingParty: Send + Sync {
    /// Request registration ceremony options scoped to `email`.
    async fn init_registration(&self, email: &str) -> Result<CeremonyOptions, BoundaryError>;

    /// Submit an attestation produced by the authenticator for verification.
    async fn verify_registration(
        &self,
        attestation: &Attestation,
    ) -> Result<VerifiedRegistration, BoundaryError>;

    /// Request authentication ceremony options scoped to `email`.
    ///
    /// Fails with [`BoundaryError::NeedsRegistration`] when no credential is
    /// provisioned for `email`.
    async fn init_authentication(&self, email: &str) -> Result<CeremonyOptions, BoundaryError>;

    /// Submit an assertion produced by the authenticator for verification.
    async fn verify_authentication(
        &self,
        assertion: &Assertion,
    ) -> Result<VerifiedAuthentication, BoundaryError>;

    /// Query whether a biometric credential is provisioned for the identity
    /// the proof token authenticates.
    async fn biometric_status(&self, proof: &ProofToken)
        -> Result<BiometricStatus, BoundaryError>;

    /// Delete any provisioned biometric credential for the identity the proof
    /// token authenticates. Idempotent server-side: deleting when nothing is
    /// provisioned succeeds.
    async fn revoke_credentials(&self, proof: &ProofToken) -> Result<(), BoundaryError>;
}
