//! # Ceremony UI Controller
//!
//! A presentation state machine layered over the ceremony client and the
//! session reconciler. It owns no protocol logic: every terminal protocol
//! outcome maps to exactly one presentation state, observable through a watch
//! channel so views can render progress without polling.
//!
//! ## Transition rules
//! - `Scanning`/`Registering` are entered *synchronously*, before the first
//!   suspension point - this is the single-ceremony-at-a-time gate. A second
//!   trigger while busy returns immediately instead of queueing.
//! - Every terminal state auto-reverts to `Idle` after the configured display
//!   interval, except `NeedsRegistration`, which persists until the user
//!   explicitly registers or cancels, and `Unsupported`, which is permanent.
//! - User cancellation is silent: straight back to `Idle`, no error surface.
//!
//! User interaction (email entry, removal confirmation) goes through the
//! injected [`Prompter`] capability, keeping this module free of any
//! presentation technology.

use crate::ceremony::{AuthenticationOutcome, CeremonyClient, RegistrationOutcome};
use crate::error::{AuthError, AuthResult};
use crate::session::SessionReconciler;
use crate::status::CredentialStatusStore;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

/// User-interaction capability injected into the controller
///
/// Decouples the ceremony flows from whatever dialog technology the embedder
/// uses. Both calls are synchronous from the controller's point of view.
pub trait Prompter: Send + Sync {
    /// Ask the user a yes/no question.
    fn confirm(&self, prompt: &str) -> bool;

    /// Ask the user for a line of input; `None` means they cancelled.
    fn prompt_for_input(&self, label: &str) -> Option<String>;
}

/// Presentation state exposed to views
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerState {
    /// The platform cannot run ceremonies at all; terminal
    Unsupported,
    Idle,
    /// An authentication ceremony is in flight
    Scanning,
    /// A registration ceremony is in flight
    Registering,
    Success,
    RegistrationSuccess,
    Error(String),
    RegistrationError(String),
    /// No credential exists for the attempted email; persists until the user
    /// registers or cancels
    NeedsRegistration,
}

impl ControllerState {
    fn is_busy(&self) -> bool {
        matches!(self, ControllerState::Scanning | ControllerState::Registering)
    }
}

/// Drives ceremonies on behalf of views and reflects their progress
pub struct CeremonyController {
    client: CeremonyClient,
    reconciler: Arc<SessionReconciler>,
    status_store: CredentialStatusStore,
    prompter: Arc<dyn Prompter>,
    state: watch::Sender<ControllerState>,
    /// Bumped on every transition so a stale auto-revert can never clobber a
    /// newer state.
    generation: Arc<AtomicU64>,
    /// Serializes the check-and-set in `try_begin`.
    transition: Mutex<()>,
    /// Email captured by a `NeedsRegistration` outcome, consumed by the
    /// "register now" affordance.
    pending_email: Mutex<Option<String>>,
    display_interval: Duration,
}

impl CeremonyController {
    /// Build a controller. When the capability probe is negative the
    /// controller starts (and stays) in `Unsupported` instead of offering
    /// ceremony actions.
    pub fn new(
        client: CeremonyClient,
        reconciler: Arc<SessionReconciler>,
        status_store: CredentialStatusStore,
        prompter: Arc<dyn Prompter>,
        display_interval: Duration,
    ) -> Self {
        let initial = if client.probe.supports_ceremony() {
            ControllerState::Idle
        } else {
            ControllerState::Unsupported
        };
        let (state, _) = watch::channel(initial);
        CeremonyController {
            client,
            reconciler,
            status_store,
            prompter,
            state,
            generation: Arc::new(AtomicU64::new(0)),
            transition: Mutex::new(()),
            pending_email: Mutex::new(None),
            display_interval,
        }
    }

    /// The current presentation state.
    pub fn state(&self) -> ControllerState {
        self.state.borrow().clone()
    }

    /// Subscribe to presentation-state changes.
    pub fn subscribe(&self) -> watch::Receiver<ControllerState> {
        self.state.subscribe()
    }

    /// Biometric login, prompting the user for their email first.
    ///
    /// A cancelled prompt is treated like any other user cancellation:
    /// quietly back to idle.
    pub async fn login(&self) {
        // Don't bother the user with a prompt the gate would ignore anyway
        let current = self.state.borrow().clone();
        if current != ControllerState::Idle {
            return;
        }
        let Some(email) = self
            .prompter
            .prompt_for_input("Please enter your email for biometric login")
        else {
            return;
        };
        self.login_as(&email).await;
    }

    /// Biometric login for a known email.
    pub async fn login_as(&self, email: &str) {
        // Gate synchronously, before any suspension point: two rapid triggers
        // must not start two ceremonies.
        let Some(run) = self.try_begin(ControllerState::Scanning) else {
            return;
        };

        match self.client.authenticate(email).await {
            AuthenticationOutcome::Success(resolved) => {
                // Precedence check before minting: an active verified session
                // is never silently replaced.
                if !self.reconciler.has_verified_session() {
                    // The display name is only a cosmetic default; the server
                    // resolution is the identity data.
                    let display_name = default_display_name(&resolved.email);
                    if let Err(e) = self.reconciler.commit_pseudo(&resolved, &display_name) {
                        tracing::error!("could not commit biometric session: {}", e);
                        self.finish(run, ControllerState::Error(e.to_string()));
                        return;
                    }
                }
                self.finish(run, ControllerState::Success);
            }
            AuthenticationOutcome::NeedsRegistration { email } => {
                *self.pending_email.lock().expect("pending email lock") = Some(email);
                // Persistent state: no auto-revert
                self.set_state(run, ControllerState::NeedsRegistration);
            }
            AuthenticationOutcome::Failure(AuthError::UserCancelled) => {
                self.set_state(run, ControllerState::Idle);
            }
            AuthenticationOutcome::Failure(e) => {
                self.finish(run, ControllerState::Error(e.to_string()));
            }
        }
    }

    /// Register a biometric credential for `email`.
    pub async fn register(&self, email: &str) {
        let Some(run) = self.try_begin(ControllerState::Registering) else {
            return;
        };

        match self.client.register(email).await {
            RegistrationOutcome::Success { email } => {
                tracing::debug!(%email, "registration ceremony succeeded");
                *self.pending_email.lock().expect("pending email lock") = None;
                self.finish(run, ControllerState::RegistrationSuccess);
            }
            RegistrationOutcome::Failure(AuthError::UserCancelled) => {
                self.set_state(run, ControllerState::Idle);
            }
            RegistrationOutcome::Failure(e) => {
                self.finish(run, ControllerState::RegistrationError(e.to_string()));
            }
        }
    }

    /// The "register now" affordance offered by `NeedsRegistration`: register
    /// with the email the failed authentication attempt captured, prompting
    /// only if none was captured.
    pub async fn register_pending(&self) {
        let pending = self.pending_email.lock().expect("pending email lock").clone();
        let email = match pending {
            Some(email) => email,
            None => match self.prompter.prompt_for_input("Email for biometric registration") {
                Some(email) => email,
                None => return,
            },
        };
        self.register(&email).await;
    }

    /// Dismiss a pending `NeedsRegistration` state.
    pub fn cancel_registration(&self) {
        let _guard = self.transition.lock().expect("transition lock");
        let current = self.state.borrow().clone();
        if current == ControllerState::NeedsRegistration {
            *self.pending_email.lock().expect("pending email lock") = None;
            self.generation.fetch_add(1, Ordering::SeqCst);
            self.state.send_replace(ControllerState::Idle);
        }
    }

    /// Remove the current identity's provisioned credential, after asking the
    /// user to confirm. Returns `Ok(false)` when the user declines.
    ///
    /// Requires a verified session; a pseudo or empty session is unauthorized
    /// without any boundary call.
    pub async fn remove_credentials(&self) -> AuthResult<bool> {
        let identity = self.reconciler.current_identity().ok_or_else(|| {
            AuthError::Unauthorized("no user is logged in".to_string())
        })?;

        if !self
            .prompter
            .confirm("Remove biometric credentials from your account?")
        {
            return Ok(false);
        }

        self.status_store.revoke_for(&identity).await?;
        Ok(true)
    }

    /// Synchronous check-and-set into a busy state. Returns the run's
    /// generation token, or `None` when another ceremony is in flight, the
    /// platform is unsupported, or a persistent state holds the screen.
    fn try_begin(&self, busy: ControllerState) -> Option<u64> {
        let _guard = self.transition.lock().expect("transition lock");
        let current = self.state.borrow().clone();
        let blocked = current.is_busy()
            || current == ControllerState::Unsupported
            || (current == ControllerState::NeedsRegistration
                && busy == ControllerState::Scanning);
        if blocked {
            tracing::debug!(?current, "ceremony trigger ignored");
            return None;
        }
        let run = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(busy);
        Some(run)
    }

    /// Transition without scheduling an auto-revert.
    fn set_state(&self, run: u64, next: ControllerState) {
        tracing::debug!(?next, "controller state");
        self.generation.store(run, Ordering::SeqCst);
        self.state.send_replace(next);
    }

    /// Transition into a terminal display state and schedule the revert to
    /// idle after the display interval.
    fn finish(&self, run: u64, terminal: ControllerState) {
        self.set_state(run, terminal);

        let sender = self.state.clone();
        let generation = Arc::clone(&self.generation);
        let delay = self.display_interval;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Only revert if nothing newer replaced this state meanwhile
            if generation
                .compare_exchange(run, run + 1, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                sender.send_replace(ControllerState::Idle);
            }
        });
    }
}

/// Cosmetic default shown until the user edits their profile.
fn default_display_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}
