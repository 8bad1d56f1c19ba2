//! # HTTP Relying-Party Adapter
//!
//! Implements [`RelyingParty`] over the server's JSON/HTTP surface:
//!
//! - `GET  {base}/init-register?email=...`
//! - `POST {base}/verify-register`
//! - `GET  {base}/init-auth?email=...`
//! - `POST {base}/verify-auth`
//! - `GET  {base}/biometric-status` (bearer auth)
//! - `DELETE {base}/biometric-credentials` (bearer auth)
//!
//! ## Error mapping
//! Transport failures and 5xx map to `Unavailable`; 401/403 to `Unauthorized`;
//! remaining 4xx bodies are parsed as `{ error, needsRegistration }` and
//! become `NeedsRegistration` or `Rejected`. This is the single place the
//! wire's ad hoc `needsRegistration` flag is read - from here on it is a
//! tagged variant.

use super::{BoundaryError, RelyingParty};
use crate::ceremony::types::{
    Assertion, Attestation, BiometricStatus, CeremonyOptions, ErrorBody, VerifiedAuthentication,
    VerifiedRegistration,
};
use crate::config::Config;
use crate::session::ProofToken;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// reqwest-backed relying-party client
#[derive(Debug, Clone)]
pub struct HttpRelyingParty {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRelyingParty {
    /// Build a boundary client from configuration.
    ///
    /// Fails only if the underlying HTTP client cannot be constructed
    /// (e.g. no TLS backend available).
    pub fn new(config: &Config) -> Result<Self, BoundaryError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| BoundaryError::Unavailable(format!("http client: {}", e)))?;

        Ok(HttpRelyingParty {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Send a prepared request and decode the JSON body, translating every
    /// failure into [`BoundaryError`].
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, BoundaryError> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!("relying party unreachable: {}", e);
            BoundaryError::Unavailable(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| BoundaryError::Rejected(format!("malformed response: {}", e)));
        }

        if status.is_server_error() {
            return Err(BoundaryError::Unavailable(format!(
                "server error ({})",
                status
            )));
        }

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(BoundaryError::Unauthorized(format!(
                "request not authorized ({})",
                status
            )));
        }

        // Remaining 4xx: the server includes a JSON error body
        let body = response.json::<ErrorBody>().await.unwrap_or_default();
        Err(classify_rejection(body, status))
    }
}

/// Map a 4xx error body onto the boundary taxonomy.
fn classify_rejection(body: ErrorBody, status: reqwest::StatusCode) -> BoundaryError {
    let message = body
        .error
        .unwrap_or_else(|| format!("request rejected ({})", status));
    if body.needs_registration {
        BoundaryError::NeedsRegistration(message)
    } else {
        BoundaryError::Rejected(message)
    }
}

#[async_trait]
impl RelyingParty for HttpRelyingParty {
    async fn init_registration(&self, email: &str) -> Result<CeremonyOptions, BoundaryError> {
        let request = self
            .client
            .get(self.url("init-register"))
            .query(&[("email", email)]);
        self.send(request).await
    }

    async fn verify_registration(
        &self,
        attestation: &Attestation,
    ) -> Result<VerifiedRegistration, BoundaryError> {
        let request = self.client.post(self.url("verify-register")).json(attestation);
        self.send(request).await
    }

    async fn init_authentication(&self, email: &str) -> Result<CeremonyOptions, BoundaryError> {
        let request = self
            .client
            .get(self.url("init-auth"))
            .query(&[("email", email)]);
        self.send(request).await
    }

    async fn verify_authentication(
        &self,
        assertion: &Assertion,
    ) -> Result<VerifiedAuthentication, BoundaryError> {
        let request = self.client.post(self.url("verify-auth")).json(assertion);
        self.send(request).await
    }

    async fn biometric_status(
        &self,
        proof: &ProofToken,
    ) -> Result<BiometricStatus, BoundaryError> {
        let request = self
            .client
            .get(self.url("biometric-status"))
            .bearer_auth(proof.as_str());
        self.send(request).await
    }

    async fn revoke_credentials(&self, proof: &ProofToken) -> Result<(), BoundaryError> {
        let request = self
            .client
            .delete(self.url("biometric-credentials"))
            .bearer_auth(proof.as_str());
        // The body is an empty JSON object; only the status matters
        let _: serde_json::Value = self.send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn needs_registration_flag_becomes_tagged_variant() {
        let body: ErrorBody = serde_json::from_str(
            r#"{"error":"No biometric credentials found","needsRegistration":true}"#,
        )
        .unwrap();
        let err = classify_rejection(body, reqwest::StatusCode::NOT_FOUND);
        assert!(matches!(err, BoundaryError::NeedsRegistration(_)));
    }

    #[test]
    fn plain_error_body_becomes_rejected() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"error":"Failed to initialize registration"}"#).unwrap();
        let err = classify_rejection(body, reqwest::StatusCode::BAD_REQUEST);
        assert_eq!(
            err,
            BoundaryError::Rejected("Failed to initialize registration".to_string())
        );
    }

    #[test]
    fn missing_error_body_still_classifies() {
        let err = classify_rejection(ErrorBody::default(), reqwest::StatusCode::BAD_REQUEST);
        assert!(matches!(err, BoundaryError::Rejected(_)));
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let config = Config {
            api_base_url: "http://localhost:3000/".to_string(),
            ..Config::default()
        };
        let rp = HttpRelyingParty::new(&config).unwrap();
        assert_eq!(rp.url("init-auth"), "http://localhost:3000/init-auth");
    }
}
