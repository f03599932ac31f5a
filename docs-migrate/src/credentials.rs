//! Service-account credentials and the OAuth2 JWT-bearer exchange.
//!
//! Both stores accept the same Google access token: the Realtime Database as an
//! `access_token` query parameter, Firestore as a bearer header.

use anyhow::{Context, Result};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const SCOPES: &str = "https://www.googleapis.com/auth/datastore \
https://www.googleapis.com/auth/firebase.database \
https://www.googleapis.com/auth/userinfo.email";

const TOKEN_LIFETIME_SECS: u64 = 3600;

/// The subset of a service-account key file that the token exchange needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Signs the assertion that is traded for an access token.
pub fn signed_assertion(key: &ServiceAccountKey, issued_at: u64) -> Result<String> {
    let claims = Claims {
        iss: &key.client_email,
        scope: SCOPES,
        aud: &key.token_uri,
        iat: issued_at,
        exp: issued_at + TOKEN_LIFETIME_SECS,
    };
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .context("Service account private_key is not a valid RSA PEM key")?;
    encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
        .context("Failed to sign service account assertion")
}

/// Exchanges the service account for a one-hour access token.
pub async fn fetch_access_token(http: &reqwest::Client, key: &ServiceAccountKey) -> Result<String> {
    let issued_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("System clock is before the Unix epoch")?
        .as_secs();
    let assertion = signed_assertion(key, issued_at)?;

    tracing::info!(token_uri = %key.token_uri, client_email = %key.client_email, "Requesting access token");
    let response = http
        .post(&key.token_uri)
        .form(&[
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", assertion.as_str()),
        ])
        .send()
        .await
        .context("Token request failed")?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!(status = %status, body = %body, "Token endpoint rejected the assertion");
        anyhow::bail!("Token endpoint returned {status}: {body}");
    }

    let token: TokenResponse = response
        .json()
        .await
        .context("Token endpoint returned an unexpected body")?;
    tracing::info!("Access token obtained");
    Ok(token.access_token)
}
