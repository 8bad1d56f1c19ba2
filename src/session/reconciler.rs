//! # Session Reconciler
//!
//! Merges three identity sources (an active federated/password session, a
//! restorable biometric pseudo-session, or neither) into exactly one current
//! session, and keeps it consistent across reloads.
//!
//! ## Precedence (applied at startup and after every auth-affecting event)
//! 1. An active verified session wins; any lingering pseudo snapshot is
//!    discarded.
//! 2. Otherwise a well-formed persisted pseudo snapshot (parses, carries the
//!    reserved synthetic-id prefix, matches the persisted identity id)
//!    restores as the current session with `AuthMethod::Biometric`.
//! 3. Otherwise the current session is empty.
//!
//! The persisted snapshot is a single mutable slot; only `commit_pseudo`,
//! `update_profile`, and `clear` write it, each as one read-modify-write with
//! the session lock held.

use super::identity::{
    AuthMethod, CurrentSession, Identity, ProfilePatch, PseudoIdentity, VerifiedIdentity,
};
use super::storage::SnapshotStore;
use super::Session;
use crate::ceremony::types::ResolvedIdentity;
use crate::error::{AuthError, AuthResult};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

/// Persisted identity id of the current session (biometric case only).
const KEY_CURRENT_IDENTITY_ID: &str = "current_identity_id";
/// Persisted JSON snapshot of the current pseudo identity.
const KEY_PSEUDO_SNAPSHOT: &str = "pseudo_snapshot";

/// Produces and owns the single current session
pub struct SessionReconciler {
    store: Arc<dyn SnapshotStore>,
    current: Mutex<Session>,
    changed: watch::Sender<Option<CurrentSession>>,
}

impl SessionReconciler {
    /// Create a reconciler over the given persistence port and immediately
    /// reconcile with no verified signal, restoring a persisted biometric
    /// session if one is well-formed.
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        let (changed, _) = watch::channel(None);
        let reconciler = SessionReconciler {
            store,
            current: Mutex::new(Session::default()),
            changed,
        };
        reconciler.reconcile(None);
        reconciler
    }

    /// Apply the identity-precedence rules and commit the resulting session.
    ///
    /// `verified` is the active federated/password session signal, if any.
    pub fn reconcile(&self, verified: Option<(VerifiedIdentity, AuthMethod)>) {
        let mut session = self.lock();
        match verified {
            Some((identity, method)) => {
                // Rule 1: verified wins, lingering snapshots are discarded
                self.discard_snapshot();
                self.store.set(KEY_CURRENT_IDENTITY_ID, &identity.id);
                session.identity = Some(Identity::Verified(identity));
                session.auth_method = method;
            }
            None => match self.restorable_snapshot() {
                // Rule 2: restore the persisted biometric session
                Some(pseudo) => {
                    tracing::info!(id = %pseudo.id, "restored biometric session");
                    session.identity = Some(Identity::Pseudo(pseudo));
                    session.auth_method = AuthMethod::Biometric;
                }
                // Rule 3: empty session
                None => {
                    self.discard_snapshot();
                    session.identity = None;
                    session.auth_method = AuthMethod::None;
                }
            },
        }
        self.publish(&session);
    }

    /// Commit a verified (password/federated) session.
    pub fn commit_verified(&self, identity: VerifiedIdentity, method: AuthMethod) {
        self.reconcile(Some((identity, method)));
    }

    /// Mint and commit a pseudo identity from a ceremony's server-resolved
    /// identity, persisting the snapshot for restore-on-reload.
    ///
    /// Never overwrites an active verified session: callers reach this only
    /// after precedence already determined none is active, and violating that
    /// is an internal error rather than a silent replacement.
    pub fn commit_pseudo(
        &self,
        resolved: &ResolvedIdentity,
        display_name: &str,
    ) -> AuthResult<PseudoIdentity> {
        let mut session = self.lock();
        if matches!(session.identity, Some(Identity::Verified(_))) {
            return Err(AuthError::Internal(
                "refusing to replace an active verified session with a pseudo identity"
                    .to_string(),
            ));
        }

        let pseudo = PseudoIdentity::mint(resolved, display_name);
        self.persist_snapshot(&pseudo)?;
        session.identity = Some(Identity::Pseudo(pseudo.clone()));
        session.auth_method = AuthMethod::Biometric;
        self.publish(&session);

        tracing::info!(id = %pseudo.id, "committed biometric pseudo-session");
        Ok(pseudo)
    }

    /// Patch display name / photo URL on whichever identity kind is current.
    ///
    /// For a pseudo identity the patch is re-persisted to the snapshot (and
    /// still lost on `clear`); for a verified identity it is memory-only here -
    /// pushing it to the account server is the profile collaborator's job.
    pub fn update_profile(&self, patch: ProfilePatch) -> AuthResult<()> {
        let mut session = self.lock();
        match session.identity.as_mut() {
            None => {
                return Err(AuthError::InvalidInput(
                    "no user is logged in".to_string(),
                ))
            }
            Some(Identity::Verified(identity)) => {
                if let Some(name) = patch.display_name {
                    identity.display_name = name;
                }
                if let Some(photo) = patch.photo_url {
                    identity.photo_url = Some(photo);
                }
            }
            Some(Identity::Pseudo(identity)) => {
                if let Some(name) = patch.display_name {
                    identity.display_name = name;
                }
                if let Some(photo) = patch.photo_url {
                    identity.photo_url = Some(photo);
                }
                let updated = identity.clone();
                self.persist_snapshot(&updated)?;
            }
        }
        self.publish(&session);
        Ok(())
    }

    /// Drop the session and every persisted snapshot. Used by logout.
    pub fn clear(&self) {
        let mut session = self.lock();
        self.discard_snapshot();
        session.identity = None;
        session.auth_method = AuthMethod::None;
        self.publish(&session);
    }

    /// Logout, as exposed to external collaborators.
    pub fn logout(&self) {
        tracing::info!("logging out");
        self.clear();
    }

    /// The read-only current-session value, or `None` when logged out.
    pub fn current(&self) -> Option<CurrentSession> {
        self.lock().view()
    }

    /// Whether an active verified session holds the current slot.
    pub fn has_verified_session(&self) -> bool {
        matches!(self.lock().identity, Some(Identity::Verified(_)))
    }

    /// The current identity, including its proof token when verified.
    pub fn current_identity(&self) -> Option<Identity> {
        self.lock().identity.clone()
    }

    /// Subscribe to session changes; fires on every commit.
    pub fn subscribe(&self) -> watch::Receiver<Option<CurrentSession>> {
        self.changed.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.current.lock().expect("session lock poisoned")
    }

    fn publish(&self, session: &Session) {
        // send_replace: deliver even when no subscriber is listening yet
        self.changed.send_replace(session.view());
    }

    fn persist_snapshot(&self, pseudo: &PseudoIdentity) -> AuthResult<()> {
        let json = serde_json::to_string(pseudo)?;
        self.store.set(KEY_CURRENT_IDENTITY_ID, &pseudo.id);
        self.store.set(KEY_PSEUDO_SNAPSHOT, &json);
        Ok(())
    }

    fn discard_snapshot(&self) {
        self.store.remove(KEY_CURRENT_IDENTITY_ID);
        self.store.remove(KEY_PSEUDO_SNAPSHOT);
    }

    /// Read and validate the persisted pseudo snapshot. Anything malformed -
    /// unparseable JSON, a missing prefix, an id mismatch - is treated as
    /// absent (and subsequently discarded by the caller).
    fn restorable_snapshot(&self) -> Option<PseudoIdentity> {
        let stored_id = self.store.get(KEY_CURRENT_IDENTITY_ID)?;
        let json = self.store.get(KEY_PSEUDO_SNAPSHOT)?;

        let pseudo: PseudoIdentity = match serde_json::from_str(&json) {
            Ok(pseudo) => pseudo,
            Err(e) => {
                tracing::warn!("dropping unparseable pseudo snapshot: {}", e);
                return None;
            }
        };

        if !pseudo.is_well_formed() || pseudo.id != stored_id {
            tracing::warn!(id = %pseudo.id, "dropping ill-formed pseudo snapshot");
            return None;
        }
        Some(pseudo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MemoryStore, PSEUDO_ID_PREFIX};
    use crate::session::identity::ProofToken;

    fn resolved() -> ResolvedIdentity {
        ResolvedIdentity {
            user_id: "u-1".to_string(),
            email: "e@x.com".to_string(),
        }
    }

    fn verified() -> VerifiedIdentity {
        VerifiedIdentity {
            id: "acct-9".to_string(),
            email: "v@x.com".to_string(),
            display_name: "V".to_string(),
            photo_url: None,
            proof: ProofToken::new("token"),
        }
    }

    #[test]
    fn starts_empty_with_no_snapshot() {
        let reconciler = SessionReconciler::new(Arc::new(MemoryStore::new()));
        assert!(reconciler.current().is_none());
    }

    #[test]
    fn pseudo_round_trips_across_reload() {
        let store = Arc::new(MemoryStore::new());
        let reconciler = SessionReconciler::new(store.clone());
        reconciler.commit_pseudo(&resolved(), "E").unwrap();

        // Simulated reload: a fresh reconciler over the same store
        let restored = SessionReconciler::new(store);
        let session = restored.current().unwrap();
        assert_eq!(session.email, "e@x.com");
        assert_eq!(session.display_name, "E");
        assert_eq!(session.auth_method, AuthMethod::Biometric);
        assert!(session.identity_id.starts_with(PSEUDO_ID_PREFIX));
    }

    #[test]
    fn verified_session_wins_and_discards_snapshot() {
        let store = Arc::new(MemoryStore::new());
        let reconciler = SessionReconciler::new(store.clone());
        reconciler.commit_pseudo(&resolved(), "E").unwrap();

        reconciler.reconcile(Some((verified(), AuthMethod::Password)));

        let session = reconciler.current().unwrap();
        assert_eq!(session.auth_method, AuthMethod::Password);
        assert_eq!(session.identity_id, "acct-9");
        // snapshot storage is empty post-reconciliation
        assert_eq!(store.get(KEY_PSEUDO_SNAPSHOT), None);

        // and a later reload without the verified signal yields no biometric
        // restore either
        let reloaded = SessionReconciler::new(store);
        assert!(reloaded.current().is_none());
    }

    #[test]
    fn commit_pseudo_refuses_to_replace_verified_session() {
        let reconciler = SessionReconciler::new(Arc::new(MemoryStore::new()));
        reconciler.commit_verified(verified(), AuthMethod::Federated);

        let err = reconciler.commit_pseudo(&resolved(), "E").unwrap_err();
        assert!(matches!(err, AuthError::Internal(_)));
        assert_eq!(reconciler.current().unwrap().identity_id, "acct-9");
    }

    #[test]
    fn clear_drops_session_and_snapshots() {
        let store = Arc::new(MemoryStore::new());
        let reconciler = SessionReconciler::new(store.clone());
        reconciler.commit_pseudo(&resolved(), "E").unwrap();

        reconciler.logout();
        assert!(reconciler.current().is_none());

        let reloaded = SessionReconciler::new(store);
        assert!(reloaded.current().is_none());
    }

    #[test]
    fn malformed_snapshot_is_dropped_and_cleared() {
        let store = Arc::new(MemoryStore::new());
        store.set(KEY_CURRENT_IDENTITY_ID, "bio:u-1");
        store.set(KEY_PSEUDO_SNAPSHOT, "{ not json");

        let reconciler = SessionReconciler::new(store.clone());
        assert!(reconciler.current().is_none());
        assert_eq!(store.get(KEY_CURRENT_IDENTITY_ID), None);
        assert_eq!(store.get(KEY_PSEUDO_SNAPSHOT), None);
    }

    #[test]
    fn snapshot_without_reserved_prefix_is_not_restored() {
        let store = Arc::new(MemoryStore::new());
        let snapshot = r#"{"id":"u-1","email":"e@x.com","display_name":"E","registered_at":"2026-01-01T00:00:00Z"}"#;
        store.set(KEY_CURRENT_IDENTITY_ID, "u-1");
        store.set(KEY_PSEUDO_SNAPSHOT, snapshot);

        let reconciler = SessionReconciler::new(store);
        assert!(reconciler.current().is_none());
    }

    #[test]
    fn profile_patch_on_pseudo_survives_reload() {
        let store = Arc::new(MemoryStore::new());
        let reconciler = SessionReconciler::new(store.clone());
        reconciler.commit_pseudo(&resolved(), "E").unwrap();
        reconciler
            .update_profile(ProfilePatch {
                display_name: Some("Edited".to_string()),
                photo_url: Some("https://x.com/p.png".to_string()),
            })
            .unwrap();

        let reloaded = SessionReconciler::new(store);
        let session = reloaded.current().unwrap();
        assert_eq!(session.display_name, "Edited");
        assert_eq!(session.photo_url.as_deref(), Some("https://x.com/p.png"));
    }

    #[test]
    fn update_profile_without_session_is_invalid_input() {
        let reconciler = SessionReconciler::new(Arc::new(MemoryStore::new()));
        let err = reconciler
            .update_profile(ProfilePatch::default())
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn subscription_fires_on_commit() {
        let reconciler = SessionReconciler::new(Arc::new(MemoryStore::new()));
        let mut rx = reconciler.subscribe();

        reconciler.commit_pseudo(&resolved(), "E").unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_some());

        reconciler.logout();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_none());
    }
}
