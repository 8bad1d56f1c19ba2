//! # Capability Probe
//!
//! Detects whether the host exposes a biometric/security-key authenticator
//! capability at all. Every ceremony entry point short-circuits on a negative
//! probe, and the UI controller renders a terminal "not supported" state
//! instead of offering ceremony actions.
//!
//! The probe is pure and synchronous - safe to call repeatedly, no side
//! effects, no I/O.

use url::Url;

/// Host capability detection
pub trait CapabilityProbe: Send + Sync {
    /// Whether a biometric/security-key ceremony can be attempted at all.
    ///
    /// `false` means the host lacks a platform public-key-credential
    /// capability or is not running in a secure context.
    fn supports_ceremony(&self) -> bool;
}

/// Fixed-answer probe, for embedders that detect capability themselves
/// and for tests
#[derive(Debug, Clone, Copy)]
pub struct StaticProbe(pub bool);

impl CapabilityProbe for StaticProbe {
    fn supports_ceremony(&self) -> bool {
        self.0
    }
}

/// Probe answering from two facts fixed at construction: whether an
/// authenticator backend is wired in, and whether the relying-party origin is
/// a secure context (https, or a loopback host).
///
/// Both checks happen in `new` so that `supports_ceremony` stays pure.
#[derive(Debug, Clone, Copy)]
pub struct SecureContextProbe {
    has_authenticator: bool,
    secure_origin: bool,
}

impl SecureContextProbe {
    pub fn new(origin: &str, has_authenticator: bool) -> Self {
        SecureContextProbe {
            has_authenticator,
            secure_origin: is_secure_origin(origin),
        }
    }
}

impl CapabilityProbe for SecureContextProbe {
    fn supports_ceremony(&self) -> bool {
        self.has_authenticator && self.secure_origin
    }
}

/// A secure context is https anywhere, or http on a loopback host
/// (local development).
fn is_secure_origin(origin: &str) -> bool {
    let Ok(url) = Url::parse(origin) else {
        return false;
    };
    match url.scheme() {
        "https" => true,
        "http" => matches!(
            url.host_str(),
            Some("localhost") | Some("127.0.0.1") | Some("[::1]")
        ),
        _ => false,
    }
}
