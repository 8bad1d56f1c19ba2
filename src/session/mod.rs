//! # Session Model
//!
//! The current-session model unifies "real" password/federated accounts with
//! ephemeral biometric-derived pseudo-identities into exactly one
//! current-session value. External collaborators (event catalog, favorites,
//! profile UI) consume only the read-only [`CurrentSession`] projection and
//! the session-changed subscription - never the identity internals.

mod identity;
mod reconciler;
mod storage;

pub use identity::{
    AuthMethod, CurrentSession, Identity, ProfilePatch, ProofToken, PseudoIdentity,
    VerifiedIdentity, PSEUDO_ID_PREFIX,
};
pub use reconciler::SessionReconciler;
pub use storage::{FileStore, MemoryStore, SnapshotStore};

/// The current-identity slot plus its authentication method
///
/// At most one identity is current at any time. Created on successful
/// login/signup/ceremony, restored on process start from persisted minimal
/// state (biometric case only), destroyed on logout.
#[derive(Debug, Clone, Default)]
pub(crate) struct Session {
    pub(crate) identity: Option<Identity>,
    pub(crate) auth_method: AuthMethod,
}

impl Session {
    /// The read-only projection handed to external collaborators.
    pub(crate) fn view(&self) -> Option<CurrentSession> {
        self.identity.as_ref().map(|identity| CurrentSession {
            identity_id: identity.id().to_string(),
            email: identity.email().to_string(),
            display_name: identity.display_name().to_string(),
            photo_url: identity.photo_url().map(str::to_string),
            auth_method: self.auth_method,
        })
    }
}
