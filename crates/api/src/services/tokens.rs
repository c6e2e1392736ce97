//! Session token issuance.
//!
//! Session tokens are compact JWS strings (`header.payload.signature`, each
//! part base64url without padding) signed with an HMAC over SHA-2. The
//! payload carries only the subject, the guest flag and the expiry:
//!
//! ```json
//! {"sub": "5d0c…", "is_guest": true, "exp": 1760000000}
//! ```
//!
//! Tokens are not persisted and cannot be revoked; expiry is the only way a
//! token stops being valid.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Sha256, Sha384, Sha512};
use thiserror::Error;

use crate::config::TokenConfig;

/// Errors minting or verifying a session token.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("signing key rejected")]
    InvalidKey,

    #[error("token lifetime out of range (got {0} minutes)")]
    InvalidLifetime(i64),

    #[error("token encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("malformed token")]
    Malformed,

    #[error("token signature mismatch")]
    BadSignature,

    #[error("token expired")]
    Expired,
}

/// HMAC algorithm used to sign tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningAlgorithm {
    Hs256,
    Hs384,
    Hs512,
}

impl SigningAlgorithm {
    /// The JOSE `alg` identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hs256 => "HS256",
            Self::Hs384 => "HS384",
            Self::Hs512 => "HS512",
        }
    }

    fn sign(self, key: &[u8], message: &[u8]) -> Result<Vec<u8>, TokenError> {
        match self {
            Self::Hs256 => mac_bytes::<Hmac<Sha256>>(key, message),
            Self::Hs384 => mac_bytes::<Hmac<Sha384>>(key, message),
            Self::Hs512 => mac_bytes::<Hmac<Sha512>>(key, message),
        }
    }

    fn verify(self, key: &[u8], message: &[u8], signature: &[u8]) -> Result<(), TokenError> {
        match self {
            Self::Hs256 => mac_verify::<Hmac<Sha256>>(key, message, signature),
            Self::Hs384 => mac_verify::<Hmac<Sha384>>(key, message, signature),
            Self::Hs512 => mac_verify::<Hmac<Sha512>>(key, message, signature),
        }
    }
}

impl std::str::FromStr for SigningAlgorithm {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HS256" => Ok(Self::Hs256),
            "HS384" => Ok(Self::Hs384),
            "HS512" => Ok(Self::Hs512),
            other => Err(TokenError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

fn mac_bytes<M: Mac + KeyInit>(key: &[u8], message: &[u8]) -> Result<Vec<u8>, TokenError> {
    let mut mac = <M as KeyInit>::new_from_slice(key).map_err(|_| TokenError::InvalidKey)?;
    Mac::update(&mut mac, message);
    Ok(Mac::finalize(mac).into_bytes().to_vec())
}

fn mac_verify<M: Mac + KeyInit>(
    key: &[u8],
    message: &[u8],
    signature: &[u8],
) -> Result<(), TokenError> {
    let mut mac = <M as KeyInit>::new_from_slice(key).map_err(|_| TokenError::InvalidKey)?;
    Mac::update(&mut mac, message);
    Mac::verify_slice(mac, signature).map_err(|_| TokenError::BadSignature)
}

/// Claims bound into a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(rename = "sub")]
    pub subject: String,
    pub is_guest: bool,
}

/// A signed session token and its expiry.
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
struct Header<'a> {
    alg: &'a str,
    typ: &'a str,
}

#[derive(Serialize, Deserialize)]
struct Payload {
    #[serde(flatten)]
    claims: SessionClaims,
    exp: i64,
}

/// Signs session tokens with the process-wide secret.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: SecretString,
    algorithm: SigningAlgorithm,
    ttl_minutes: i64,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

impl TokenIssuer {
    #[must_use]
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            algorithm: config.algorithm,
            ttl_minutes: config.ttl_minutes,
        }
    }

    /// Mint a token using the configured lifetime.
    ///
    /// # Errors
    ///
    /// See [`TokenIssuer::mint`].
    pub fn issue(&self, claims: &SessionClaims) -> Result<SessionToken, TokenError> {
        self.mint(claims, self.ttl_minutes)
    }

    /// Mint a token that expires `ttl_minutes` after now.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::InvalidLifetime` for a non-positive lifetime or one
    /// whose expiry cannot be represented, and `TokenError::InvalidKey` if the
    /// secret cannot key the MAC.
    pub fn mint(&self, claims: &SessionClaims, ttl_minutes: i64) -> Result<SessionToken, TokenError> {
        let expires_at = Duration::try_minutes(ttl_minutes)
            .filter(|ttl| *ttl > Duration::zero())
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or(TokenError::InvalidLifetime(ttl_minutes))?;

        let header = Header {
            alg: self.algorithm.as_str(),
            typ: "JWT",
        };
        let payload = Payload {
            claims: claims.clone(),
            exp: expires_at.timestamp(),
        };

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload)?)
        );
        let signature = self
            .algorithm
            .sign(self.secret.expose_secret().as_bytes(), signing_input.as_bytes())?;

        Ok(SessionToken {
            token: format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature)),
            expires_at,
        })
    }

    /// Verify a token's algorithm, signature and expiry, returning its claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Malformed` for structurally invalid tokens or a
    /// mismatched algorithm, `TokenError::BadSignature` for tampered tokens,
    /// and `TokenError::Expired` once the expiry has passed.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let (signing_input, signature) = token.rsplit_once('.').ok_or(TokenError::Malformed)?;
        let (header, payload) = signing_input
            .split_once('.')
            .ok_or(TokenError::Malformed)?;
        if payload.contains('.') {
            return Err(TokenError::Malformed);
        }

        let header_bytes = URL_SAFE_NO_PAD
            .decode(header)
            .map_err(|_| TokenError::Malformed)?;
        let parsed: Header<'_> =
            serde_json::from_slice(&header_bytes).map_err(|_| TokenError::Malformed)?;
        if parsed.alg != self.algorithm.as_str() {
            return Err(TokenError::Malformed);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;
        self.algorithm.verify(
            self.secret.expose_secret().as_bytes(),
            signing_input.as_bytes(),
            &signature,
        )?;

        let payload_bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;
        let payload: Payload =
            serde_json::from_slice(&payload_bytes).map_err(|_| TokenError::Malformed)?;
        if payload.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(payload.claims)
    }
}
