use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use utoipa::ToSchema;

use crate::config::AuthConfig;
use crate::core_types::SellerId;
use crate::seller::SellerStore;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // Subject (seller_id as string)
    pub exp: usize,  // Expiration time (as UTC timestamp)
    pub iat: usize,  // Issued at
}

impl Claims {
    pub fn seller_id(&self) -> Option<SellerId> {
        self.sub.parse().ok()
    }
}

/// Token Request
#[derive(Debug, Deserialize, ToSchema)]
pub struct TokenRequest {
    #[schema(example = "test1")]
    pub username: String,
    #[schema(example = "1234")]
    pub password: String,
}

/// Token Response (JWT)
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
    pub user_id: SellerId,
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Unable to log in with provided credentials.")]
    InvalidCredentials,

    #[error("Seller account is disabled")]
    Inactive,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Token encoding failed: {0}")]
    Encode(String),

    #[error("Seller lookup failed: {0}")]
    Store(String),
}

/// Hash a password with Argon2 and a fresh salt
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| AuthError::Hash(e.to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

pub struct UserAuthService {
    sellers: Arc<dyn SellerStore>,
    jwt_secret: String,
    ttl: Duration,
}

impl UserAuthService {
    pub fn new(sellers: Arc<dyn SellerStore>, config: &AuthConfig) -> Self {
        Self {
            sellers,
            jwt_secret: config.jwt_secret.clone(),
            ttl: Duration::hours(config.jwt_ttl_hours),
        }
    }

    /// Check credentials and issue a JWT
    pub async fn login(&self, req: &TokenRequest) -> Result<TokenResponse, AuthError> {
        let creds = self
            .sellers
            .find_credentials(&req.username)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        // Sellers created without a password cannot log in
        let hash = creds
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;
        verify_password(&req.password, hash)?;

        if !creds.is_active {
            return Err(AuthError::Inactive);
        }

        Ok(TokenResponse {
            token: self.issue_token(creds.seller_id)?,
            user_id: creds.seller_id,
        })
    }

    pub fn issue_token(&self, seller_id: SellerId) -> Result<String, AuthError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::Encode("expiry out of range".to_string()))?;

        let claims = Claims {
            sub: seller_id.to_string(),
            exp: expiration.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::Encode(e.to_string()))
    }

    /// Verify JWT token
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }
}
