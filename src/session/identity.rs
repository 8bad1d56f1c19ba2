//! # Identity Types
//!
//! Two kinds of identity can occupy the current-session slot:
//!
//! - [`VerifiedIdentity`]: stable, server-issued, durable - backed by a
//!   password or federated login, carrying a bearer proof token.
//! - [`PseudoIdentity`]: locally synthesized on a successful biometric
//!   ceremony when no verified session exists. It has no durable server
//!   proof and is never persisted server-side.

use crate::ceremony::types::ResolvedIdentity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reserved prefix for synthetic pseudo-identity ids.
///
/// The prefix is how a persisted snapshot is recognized as restorable, and
/// the remainder is the server-resolved user id verbatim - so repeated
/// biometric logins mint the same id and externally keyed data (favorites)
/// stays stable across sessions.
pub const PSEUDO_ID_PREFIX: &str = "bio:";

/// Bearer token proving a verified identity to the relying party
///
/// Only verified identities carry one; pseudo-sessions have no durable server
/// proof, which is why status/revoke calls are unauthorized for them.
#[derive(Clone, PartialEq, Eq)]
pub struct ProofToken(String);

impl ProofToken {
    pub fn new(token: impl Into<String>) -> Self {
        ProofToken(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Never let the token leak into logs
impl std::fmt::Debug for ProofToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ProofToken(..)")
    }
}

/// Stable, server-issued identity (password or federated login)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub photo_url: Option<String>,
    pub proof: ProofToken,
}

/// Locally synthesized identity minted from a successful biometric ceremony
///
/// Serializable because it is the one piece of session state persisted across
/// reloads (the snapshot). Profile edits on a pseudo identity live only in
/// memory and the snapshot; they are lost on logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PseudoIdentity {
    pub id: String,
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    pub registered_at: DateTime<Utc>,
}

impl PseudoIdentity {
    /// Synthesize a pseudo identity from the server-resolved identity of a
    /// successful authentication ceremony.
    ///
    /// The id reuses the resolved user id verbatim behind the reserved prefix;
    /// a random id is minted only in the degenerate case of an empty
    /// resolution.
    pub(crate) fn mint(resolved: &ResolvedIdentity, display_name: &str) -> Self {
        let suffix = if resolved.user_id.is_empty() {
            uuid::Uuid::new_v4().to_string()
        } else {
            resolved.user_id.clone()
        };
        PseudoIdentity {
            id: format!("{}{}", PSEUDO_ID_PREFIX, suffix),
            email: resolved.email.clone(),
            display_name: display_name.to_string(),
            photo_url: None,
            registered_at: Utc::now(),
        }
    }

    /// A restorable snapshot must carry the reserved synthetic-id prefix.
    pub(crate) fn is_well_formed(&self) -> bool {
        self.id.starts_with(PSEUDO_ID_PREFIX) && !self.email.is_empty()
    }
}

/// Either kind of current identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Verified(VerifiedIdentity),
    Pseudo(PseudoIdentity),
}

impl Identity {
    pub fn id(&self) -> &str {
        match self {
            Identity::Verified(v) => &v.id,
            Identity::Pseudo(p) => &p.id,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Identity::Verified(v) => &v.email,
            Identity::Pseudo(p) => &p.email,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Identity::Verified(v) => &v.display_name,
            Identity::Pseudo(p) => &p.display_name,
        }
    }

    pub fn photo_url(&self) -> Option<&str> {
        match self {
            Identity::Verified(v) => v.photo_url.as_deref(),
            Identity::Pseudo(p) => p.photo_url.as_deref(),
        }
    }

    /// The bearer proof token, present only for verified identities.
    pub fn proof(&self) -> Option<&ProofToken> {
        match self {
            Identity::Verified(v) => Some(&v.proof),
            Identity::Pseudo(_) => None,
        }
    }
}

/// How the current session was established
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    Password,
    Federated,
    Biometric,
    #[default]
    None,
}

/// Read-only session value exposed to external collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentSession {
    pub identity_id: String,
    pub email: String,
    pub display_name: String,
    pub photo_url: Option<String>,
    pub auth_method: AuthMethod,
}

/// Partial profile update applied to whichever identity kind is current
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved() -> ResolvedIdentity {
        ResolvedIdentity {
            user_id: "u-123".to_string(),
            email: "e@x.com".to_string(),
        }
    }

    #[test]
    fn minted_pseudo_id_reuses_resolved_id_behind_prefix() {
        let pseudo = PseudoIdentity::mint(&resolved(), "E");
        assert_eq!(pseudo.id, "bio:u-123");
        assert!(pseudo.is_well_formed());
    }

    #[test]
    fn repeated_logins_mint_the_same_id() {
        let a = PseudoIdentity::mint(&resolved(), "E");
        let b = PseudoIdentity::mint(&resolved(), "Other Name");
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn unprefixed_snapshot_is_malformed() {
        let mut pseudo = PseudoIdentity::mint(&resolved(), "E");
        pseudo.id = "u-123".to_string();
        assert!(!pseudo.is_well_formed());
    }

    #[test]
    fn proof_token_debug_is_redacted() {
        let token = ProofToken::new("secret-bearer-value");
        assert_eq!(format!("{:?}", token), "ProofToken(..)");
    }
}
