use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::{
    accounts::repo_types::Account,
    auth::claims::Claims,
    config::{ConfigError, JwtConfig},
    state::AppState,
};

/// The only algorithm tokens are signed and accepted with.
pub const PINNED_ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Error)]
#[error("failed to sign token: {0}")]
pub struct SigningError(#[from] jsonwebtoken::errors::Error);

/// Why a presented token was refused. Only ever logged, never sent to clients.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("signature does not verify")]
    BadSignature,
    #[error("unexpected signing algorithm")]
    WrongAlgorithm,
    #[error("token expired")]
    Expired,
    #[error("issuer or audience mismatch")]
    ClaimMismatch,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm => TokenError::WrongAlgorithm,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience | ErrorKind::ImmatureSignature => {
                TokenError::ClaimMismatch
            }
            _ => TokenError::Malformed,
        }
    }
}

/// Signing and verification keys, built once at startup and shared read-only.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Result<Self, ConfigError> {
        if cfg.secret.trim().is_empty() {
            return Err(ConfigError::EmptySecret);
        }

        let mut validation = Validation::new(PINNED_ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.set_issuer(std::slice::from_ref(&cfg.issuer));
        validation.set_audience(std::slice::from_ref(&cfg.audience));

        Ok(Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            validation,
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::minutes(cfg.ttl_minutes),
        })
    }

    pub fn issue(&self, account: &Account) -> Result<String, SigningError> {
        self.issue_for(account.number)
    }

    pub fn issue_for(&self, account_number: i64) -> Result<String, SigningError> {
        self.issue_expiring_at(account_number, OffsetDateTime::now_utc() + self.ttl)
    }

    pub fn issue_expiring_at(
        &self,
        account_number: i64,
        expires_at: OffsetDateTime,
    ) -> Result<String, SigningError> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            account_number,
            iat: unix_seconds(now),
            exp: unix_seconds(expires_at),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::new(PINNED_ALGORITHM), &claims, &self.encoding)?;
        debug!(account_number, exp = claims.exp, "jwt signed");
        Ok(token)
    }

    /// Checks structure, algorithm, signature, expiry, issuer and audience.
    /// The header's `alg` is compared against [`PINNED_ALGORITHM`] before any
    /// signature work happens.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        debug!(account_number = data.claims.account_number, "jwt verified");
        Ok(data.claims)
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

fn unix_seconds(at: OffsetDateTime) -> u64 {
    at.unix_timestamp().max(0) as u64
}
