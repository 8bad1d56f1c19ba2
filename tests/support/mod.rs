//! Shared test doubles: a scriptable relying party and platform authenticator.

use async_trait::async_trait;
use biometric_auth::{
    Assertion, Attestation, AuthenticatorError, BiometricStatus, BoundaryError, CeremonyOptions,
    PlatformAuthenticator, Prompter, ProofToken, RelyingParty, VerifiedAuthentication,
    VerifiedRegistration,
};
use serde_json::json;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

/// Proof tokens the mock server accepts are `proof:<email>`.
pub fn proof_for(email: &str) -> ProofToken {
    ProofToken::new(format!("proof:{}", email))
}

/// In-memory relying party: tracks which emails have a provisioned
/// credential and answers the full boundary surface.
#[derive(Default)]
pub struct MockRelyingParty {
    provisioned: Mutex<HashSet<String>>,
    /// Next `verify_*` call reports `verified: false` when set.
    pub reject_verification: Mutex<bool>,
    /// Every `init_*` call fails with this when set.
    pub init_failure: Mutex<Option<BoundaryError>>,
    pub init_calls: AtomicUsize,
}

impl MockRelyingParty {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(email: &str) -> Self {
        let rp = Self::default();
        rp.provisioned.lock().unwrap().insert(email.to_string());
        rp
    }

    pub fn is_provisioned(&self, email: &str) -> bool {
        self.provisioned.lock().unwrap().contains(email)
    }

    fn email_of(proof: &ProofToken) -> Result<String, BoundaryError> {
        proof
            .as_str()
            .strip_prefix("proof:")
            .map(str::to_string)
            .ok_or_else(|| BoundaryError::Unauthorized("bad token".to_string()))
    }

    fn options_for(&self, email: &str) -> Result<CeremonyOptions, BoundaryError> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.init_failure.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(CeremonyOptions(json!({
            "challenge": format!("challenge-for-{}", email),
            "email": email,
        })))
    }
}

#[async_trait]
impl RelyingParty for MockRelyingParty {
    async fn init_registration(&self, email: &str) -> Result<CeremonyOptions, BoundaryError> {
        self.options_for(email)
    }

    async fn verify_registration(
        &self,
        attestation: &Attestation,
    ) -> Result<VerifiedRegistration, BoundaryError> {
        if *self.reject_verification.lock().unwrap() {
            return Ok(VerifiedRegistration { verified: false });
        }
        let email = attestation.0["email"].as_str().unwrap_or_default().to_string();
        self.provisioned.lock().unwrap().insert(email);
        Ok(VerifiedRegistration { verified: true })
    }

    async fn init_authentication(&self, email: &str) -> Result<CeremonyOptions, BoundaryError> {
        if !self.is_provisioned(email) {
            self.init_calls.fetch_add(1, Ordering::SeqCst);
            return Err(BoundaryError::NeedsRegistration(
                "No biometric credentials found".to_string(),
            ));
        }
        self.options_for(email)
    }

    async fn verify_authentication(
        &self,
        assertion: &Assertion,
    ) -> Result<VerifiedAuthentication, BoundaryError> {
        if *self.reject_verification.lock().unwrap() {
            return Ok(VerifiedAuthentication {
                verified: false,
                user_id: String::new(),
                email: String::new(),
            });
        }
        let email = assertion.0["email"].as_str().unwrap_or_default().to_string();
        Ok(VerifiedAuthentication {
            verified: true,
            user_id: format!("user-{}", email),
            email,
        })
    }

    async fn biometric_status(
        &self,
        proof: &ProofToken,
    ) -> Result<BiometricStatus, BoundaryError> {
        let email = Self::email_of(proof)?;
        Ok(BiometricStatus {
            has_biometric: self.is_provisioned(&email),
        })
    }

    async fn revoke_credentials(&self, proof: &ProofToken) -> Result<(), BoundaryError> {
        let email = Self::email_of(proof)?;
        // Idempotent: removing an absent credential is still success
        self.provisioned.lock().unwrap().remove(&email);
        Ok(())
    }
}

/// What the mock authenticator does when invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticatorBehavior {
    /// Echo the challenge back as an approved response
    Approve,
    /// The user dismisses the prompt
    Cancel,
    /// Park until [`MockAuthenticator::release`] is called, then approve -
    /// models the unbounded user-controlled duration of the prompt
    Hang,
}

pub struct MockAuthenticator {
    behavior: Mutex<AuthenticatorBehavior>,
    release: Notify,
}

impl MockAuthenticator {
    pub fn new(behavior: AuthenticatorBehavior) -> Self {
        MockAuthenticator {
            behavior: Mutex::new(behavior),
            release: Notify::new(),
        }
    }

    pub fn release(&self) {
        self.release.notify_one();
    }

    async fn respond(&self, options: &CeremonyOptions) -> Result<serde_json::Value, AuthenticatorError> {
        let behavior = *self.behavior.lock().unwrap();
        match behavior {
            AuthenticatorBehavior::Cancel => Err(AuthenticatorError::Cancelled),
            AuthenticatorBehavior::Hang => {
                self.release.notified().await;
                Ok(json!({
                    "signed": options.0["challenge"],
                    "email": options.0["email"],
                }))
            }
            AuthenticatorBehavior::Approve => Ok(json!({
                "signed": options.0["challenge"],
                "email": options.0["email"],
            })),
        }
    }
}

#[async_trait]
impl PlatformAuthenticator for MockAuthenticator {
    async fn create_credential(
        &self,
        options: &CeremonyOptions,
    ) -> Result<Attestation, AuthenticatorError> {
        self.respond(options).await.map(Attestation)
    }

    async fn get_credential(
        &self,
        options: &CeremonyOptions,
    ) -> Result<Assertion, AuthenticatorError> {
        self.respond(options).await.map(Assertion)
    }
}

/// Prompter with canned answers
pub struct MockPrompter {
    pub input: Option<String>,
    pub confirmation: bool,
}

impl MockPrompter {
    pub fn answering(input: &str) -> Self {
        MockPrompter {
            input: Some(input.to_string()),
            confirmation: true,
        }
    }
}

impl Prompter for MockPrompter {
    fn confirm(&self, _prompt: &str) -> bool {
        self.confirmation
    }

    fn prompt_for_input(&self, _label: &str) -> Option<String> {
        self.input.clone()
    }
}
