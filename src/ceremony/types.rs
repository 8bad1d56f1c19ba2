//! # Ceremony Wire Types
//!
//! Request/response types exchanged with the relying-party boundary and the
//! platform authenticator during a ceremony.
//!
//! ## Why serde_json::Value newtypes?
//! Challenge options, attestations, and assertions are complex WebAuthn
//! structures that this subsystem treats as opaque: the server mints them and
//! the authenticator consumes them (or vice versa). Instead of modelling every
//! nested field, they are carried as raw JSON - the relying party is the only
//! party that interprets them.

use serde::{Deserialize, Serialize};

/// Server-issued challenge options for one ceremony
///
/// Embeds a single-use, server-bound challenge plus policy constraints
/// (allowed authenticator types, timeout). Opaque and ceremony-scoped:
/// options from one ceremony must never be fed into another.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CeremonyOptions(pub serde_json::Value);

/// The authenticator's response to a registration ceremony
///
/// Contains the attestation object and client data the relying party needs
/// to provision the credential. Opaque to this subsystem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attestation(pub serde_json::Value);

/// The authenticator's response to an authentication ceremony
///
/// Contains the signed challenge (assertion). Opaque to this subsystem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assertion(pub serde_json::Value);

/// Relying-party verdict on a submitted attestation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedRegistration {
    /// Whether the credential was accepted and provisioned
    pub verified: bool,
}

/// Relying-party verdict on a submitted assertion
///
/// On success the server resolves which identity the credential belongs to.
/// That resolution is authoritative - a locally supplied display name is only
/// a cosmetic default, never identity data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedAuthentication {
    /// Whether the assertion was accepted
    pub verified: bool,
    /// Server-resolved identity id (absent when `verified` is false)
    #[serde(default)]
    pub user_id: String,
    /// Server-resolved email (absent when `verified` is false)
    #[serde(default)]
    pub email: String,
}

/// The identity the relying party resolved for a successful authentication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub user_id: String,
    pub email: String,
}

/// Provisioning state reported by the relying party
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiometricStatus {
    /// Whether a biometric credential is currently provisioned for the
    /// authenticated identity
    pub has_biometric: bool,
}

/// Error body shape the relying party uses for 4xx responses
///
/// The `needsRegistration` flag rides along on authentication-init rejections
/// when no credential exists for the requested email. It is read exactly once,
/// at the HTTP adapter edge, where it becomes a tagged
/// [`BoundaryError::NeedsRegistration`] variant - nothing downstream ever
/// infers meaning from field presence.
///
/// [`BoundaryError::NeedsRegistration`]: crate::boundary::BoundaryError::NeedsRegistration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub needs_registration: bool,
}
