//! # Passwordless Biometric Authentication Client
//!
//! Client-side subsystem for WebAuthn-style passwordless authentication:
//! the challenge-response credential ceremony (registration and
//! authentication), the biometric-credential lifecycle, and the
//! identity-reconciliation layer that unifies password/federated accounts
//! with biometric-derived pseudo-identities into one current-session model.
//!
//! ## Key Concepts
//! - **Ceremony**: one complete challenge-response exchange for registering
//!   or asserting a credential
//! - **Relying party**: the server that issues challenges and verifies
//!   authenticator responses - an external collaborator behind [`boundary`]
//! - **Platform authenticator**: the host-provided mechanism (fingerprint,
//!   face, security key) that performs the challenge with the user
//!
//! ## Control flow
//! The [`controller::CeremonyController`] triggers the
//! [`ceremony::CeremonyClient`], which talks to the relying-party boundary
//! and the platform authenticator. On success the
//! [`session::SessionReconciler`] commits a new current session, the
//! [`status::CredentialStatusStore`] is re-queried, and the controller
//! reflects the terminal state to its views.

pub mod authenticator; // Platform-authenticator capability trait
pub mod boundary;      // Relying-party server boundary (trait + HTTP adapter)
pub mod capability;    // Host capability probe
pub mod ceremony;      // Registration/authentication ceremony state machine
pub mod config;        // Environment-driven configuration
pub mod controller;    // Presentation state machine for calling views
pub mod error;         // Crate-wide error taxonomy
pub mod session;       // Identity model, persistence port, session reconciler
pub mod status;        // Credential provisioning status (server-sourced)

pub use authenticator::{AuthenticatorError, PlatformAuthenticator};
pub use boundary::{BoundaryError, HttpRelyingParty, RelyingParty};
pub use capability::{CapabilityProbe, SecureContextProbe, StaticProbe};
pub use ceremony::{
    AuthenticationOutcome, CeremonyClient, CeremonyKind, CeremonyPhase, RegistrationOutcome,
};
pub use ceremony::types::{
    Assertion, Attestation, BiometricStatus, CeremonyOptions, ResolvedIdentity,
    VerifiedAuthentication, VerifiedRegistration,
};
pub use config::Config;
pub use controller::{CeremonyController, ControllerState, Prompter};
pub use error::{AuthError, AuthResult};
pub use session::{
    AuthMethod, CurrentSession, FileStore, Identity, MemoryStore, ProfilePatch, ProofToken,
    PseudoIdentity, SessionReconciler, SnapshotStore, VerifiedIdentity, PSEUDO_ID_PREFIX,
};
pub use status::{CredentialStatus, CredentialStatusStore};
