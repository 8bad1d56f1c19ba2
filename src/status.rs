//! # Credential Status Store
//!
//! Tracks, per identity, whether a biometric credential is currently
//! provisioned. The relying party is the sole source of truth: provisioning
//! can change out-of-band (a credential deleted from another device), so no
//! result is ever cached - every query re-asks the boundary. Invalidation
//! after a terminal ceremony state is therefore just a fresh `fetch_status`
//! call.
//!
//! Both operations require a bearer proof token, which only verified
//! identities carry. A pseudo or empty session resolves to `Unauthorized`
//! locally, without ever calling the endpoint - callers should hide the
//! affordance for such sessions.

use crate::boundary::RelyingParty;
use crate::error::{AuthError, AuthResult};
use crate::session::{Identity, ProofToken};
use std::sync::Arc;

/// Provisioning state of the queried identity's biometric credential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialStatus {
    pub provisioned: bool,
}

/// Cache-free view onto the relying party's credential registration records
#[derive(Clone)]
pub struct CredentialStatusStore {
    boundary: Arc<dyn RelyingParty>,
}

impl CredentialStatusStore {
    pub fn new(boundary: Arc<dyn RelyingParty>) -> Self {
        CredentialStatusStore { boundary }
    }

    /// Ask the relying party whether a credential is provisioned for the
    /// identity the proof token authenticates.
    pub async fn fetch_status(&self, proof: &ProofToken) -> AuthResult<CredentialStatus> {
        let status = self.boundary.biometric_status(proof).await?;
        Ok(CredentialStatus {
            provisioned: status.has_biometric,
        })
    }

    /// Delete any provisioned credential. Idempotent: revoking when nothing
    /// is provisioned is not an error.
    pub async fn revoke(&self, proof: &ProofToken) -> AuthResult<()> {
        self.boundary.revoke_credentials(proof).await?;
        tracing::info!("biometric credentials revoked");
        Ok(())
    }

    /// Status query keyed by the current identity, resolving its proof token.
    pub async fn fetch_status_for(&self, identity: &Identity) -> AuthResult<CredentialStatus> {
        self.fetch_status(Self::proof_of(identity)?).await
    }

    /// Revocation keyed by the current identity, resolving its proof token.
    pub async fn revoke_for(&self, identity: &Identity) -> AuthResult<()> {
        self.revoke(Self::proof_of(identity)?).await
    }

    fn proof_of(identity: &Identity) -> AuthResult<&ProofToken> {
        identity.proof().ok_or_else(|| {
            AuthError::Unauthorized(
                "biometric status requires a verified (password/federated) session".to_string(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::PseudoIdentity;
    use crate::ceremony::types::ResolvedIdentity;

    #[test]
    fn pseudo_identity_is_unauthorized_without_a_call() {
        let resolved = ResolvedIdentity {
            user_id: "u-1".to_string(),
            email: "e@x.com".to_string(),
        };
        let identity = Identity::Pseudo(PseudoIdentity::mint(&resolved, "E"));
        let err = CredentialStatusStore::proof_of(&identity).unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized(_)));
    }
}
