//! # Platform Authenticator Capability
//!
//! The host-provided mechanism that performs the actual biometric or
//! security-key challenge with the user (fingerprint reader, face scan,
//! roaming key). This crate drives it but never implements it: embedders wire
//! in whatever the platform offers.
//!
//! Both operations suspend for an unbounded, user-controlled duration - the
//! user may dismiss the OS prompt at any time. Implementations must resolve
//! deterministically on dismissal (with [`AuthenticatorError::Cancelled`]),
//! never leave the future pending.

use crate::ceremony::types::{Assertion, Attestation, CeremonyOptions};
use async_trait::async_trait;
use thiserror::Error;

/// Failures the platform authenticator can signal
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthenticatorError {
    /// The user dismissed the prompt
    #[error("the user cancelled the authenticator prompt")]
    Cancelled,

    /// The authenticator could not produce a response
    /// (hardware fault, malformed options, policy mismatch)
    #[error("authenticator failed: {0}")]
    Failed(String),
}

/// Host-provided challenge/response mechanism
#[async_trait]
pub trait PlatformAuthenticator: Send + Sync {
    /// Create a new credential for the challenge embedded in `options`,
    /// producing the attestation the relying party provisions from.
    async fn create_credential(
        &self,
        options: &CeremonyOptions,
    ) -> Result<Attestation, AuthenticatorError>;

    /// Sign the challenge embedded in `options` with an existing credential,
    /// producing the assertion the relying party verifies.
    async fn get_credential(
        &self,
        options: &CeremonyOptions,
    ) -> Result<Assertion, AuthenticatorError>;
}
