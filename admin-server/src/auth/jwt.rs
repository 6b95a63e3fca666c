//! JWT token service
//!
//! Generates, validates and parses session tokens. The token claims carry
//! the session payload: identity plus the resolved permission set.

use std::collections::BTreeSet;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::resolver;

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Signing key (at least 32 bytes)
    pub secret: String,
    /// Token lifetime in minutes
    pub expiration_minutes: i64,
    /// Token issuer
    pub issuer: String,
    /// Token audience
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        let secret = match load_jwt_secret() {
            Ok(secret) => secret,
            Err(e) => {
                #[cfg(debug_assertions)]
                {
                    tracing::warn!("JWT configuration error: {}, using generated key", e);
                    generate_secure_printable_jwt_secret()
                }
                #[cfg(not(debug_assertions))]
                {
                    panic!("FATAL: JWT_SECRET configuration failed: {}", e);
                }
            }
        };

        Self {
            secret,
            expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1440), // 24h
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "admin-server".to_string()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "admin-clients".to_string()),
        }
    }
}

/// Claims stored in the token
///
/// `roles` and `permissions` form the session payload consumed by the
/// authorization middleware: `{ id, name, email, roles, permissions }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID (subject)
    pub sub: String,
    /// Display name
    pub name: String,
    /// Email (unique login identity)
    pub email: String,
    /// Assigned role names
    pub roles: Vec<String>,
    /// Resolved effective permission set
    pub permissions: Vec<String>,
    /// Token type
    pub token_type: String,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued-at timestamp
    pub iat: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
}

/// JWT errors
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Generate a printable signing key (development fallback)
fn generate_secure_printable_jwt_secret() -> String {
    let allowed_chars =
        "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+";

    let rng = SystemRandom::new();
    let mut key = String::new();

    for _ in 0..64 {
        let mut byte = [0u8; 1];
        if rng.fill(&mut byte).is_err() {
            return "AdminServerDevelopmentOnlyKey-ReplaceInProduction!".to_string();
        }
        let idx = (byte[0] as usize) % allowed_chars.len();
        key.push(allowed_chars.as_bytes()[idx] as char);
    }

    key
}

/// Load the signing key from the environment
fn load_jwt_secret() -> Result<String, JwtError> {
    match std::env::var("JWT_SECRET") {
        Ok(secret) => {
            if secret.len() < 32 {
                return Err(JwtError::ConfigError(
                    "JWT_SECRET must be at least 32 characters long".to_string(),
                ));
            }
            Ok(secret)
        }
        Err(_) => {
            #[cfg(debug_assertions)]
            {
                tracing::warn!("JWT_SECRET not set, generating a temporary development key");
                Ok(generate_secure_printable_jwt_secret())
            }
            #[cfg(not(debug_assertions))]
            {
                Err(JwtError::ConfigError(
                    "JWT_SECRET environment variable must be set in production".to_string(),
                ))
            }
        }
    }
}

/// JWT token service
#[derive(Debug, Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Create a new JWT service with default configuration
    pub fn new() -> Self {
        Self::with_config(JwtConfig::default())
    }

    /// Create a new JWT service with the given configuration
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Generate a token for an authenticated user
    ///
    /// `permissions` is the effective set produced by the resolver; it is
    /// embedded as a sorted array and stays fixed for the token's lifetime.
    pub fn generate_token(
        &self,
        user_id: &str,
        name: &str,
        email: &str,
        roles: &[String],
        permissions: &BTreeSet<String>,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: user_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            roles: roles.to_vec(),
            permissions: permissions.iter().cloned().collect(),
            token_type: "access".to_string(),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidToken => JwtError::InvalidToken(e.to_string()),
                _ => JwtError::InvalidToken(format!("Token validation failed: {}", e)),
            }
        })?;

        Ok(token_data.claims)
    }

    /// Extract the bearer token from an Authorization header value
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

impl Default for JwtService {
    fn default() -> Self {
        Self::new()
    }
}

/// Current user context, parsed from validated JWT claims
///
/// Created by the authentication middleware and injected into request
/// extensions. Validated at construction: a claim set without a subject is
/// rejected rather than carried around half-formed.
///
/// # Example
///
/// ```ignore
/// async fn handler(user: CurrentUser) -> Json<()> {
///     if user.has_permission("users:read") {
///         // authorized
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// User ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Email
    pub email: String,
    /// Assigned role names
    pub roles: Vec<String>,
    /// Effective permission set (resolved at token issuance)
    pub permissions: BTreeSet<String>,
}

impl TryFrom<Claims> for CurrentUser {
    type Error = JwtError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        if claims.sub.is_empty() {
            return Err(JwtError::InvalidToken("Missing subject".to_string()));
        }
        if claims.email.is_empty() {
            return Err(JwtError::InvalidToken("Missing email".to_string()));
        }

        Ok(Self {
            id: claims.sub,
            name: claims.name,
            email: claims.email,
            roles: claims.roles,
            permissions: claims.permissions.into_iter().collect(),
        })
    }
}

impl CurrentUser {
    /// Check a single permission against the session's resolved set
    ///
    /// Exact, case-sensitive membership — no role shortcuts, no wildcards.
    /// An empty set always answers false (fail-closed).
    pub fn has_permission(&self, permission: &str) -> bool {
        resolver::check(&self.permissions, permission)
    }

    /// Check whether any one of the given permissions is held
    pub fn has_any_permission(&self, permissions: &[&str]) -> bool {
        resolver::check_any(&self.permissions, permissions)
    }

    /// Session payload in wire shape
    pub fn to_session_info(&self) -> shared::client::SessionInfo {
        shared::client::SessionInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            roles: self.roles.clone(),
            permissions: self.permissions.iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn permission_set(perms: &[&str]) -> BTreeSet<String> {
        perms.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_jwt_generation_and_validation() {
        let service = JwtService::new();
        let permissions = permission_set(&["users:read", "dashboard:access"]);

        let token = service
            .generate_token(
                "42",
                "Jane Doe",
                "jane@example.com",
                &["user".to_string()],
                &permissions,
            )
            .expect("Failed to generate test token");

        let claims = service
            .validate_token(&token)
            .expect("Failed to validate test token");

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.email, "jane@example.com");
        assert_eq!(claims.roles, vec!["user".to_string()]);
        // BTreeSet iteration keeps the claim array sorted
        assert_eq!(
            claims.permissions,
            vec!["dashboard:access".to_string(), "users:read".to_string()]
        );
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let service = JwtService::new();
        let other = JwtService::with_config(JwtConfig {
            secret: "another-secret-key-of-sufficient-length!".to_string(),
            ..service.config.clone()
        });

        let token = other
            .generate_token("1", "x", "x@example.com", &[], &BTreeSet::new())
            .expect("Failed to generate token");

        assert!(service.validate_token(&token).is_err());
    }

    #[test]
    fn test_current_user_checks_are_exact() {
        let user = CurrentUser {
            id: "1".to_string(),
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            roles: vec!["user".to_string()],
            permissions: permission_set(&["users:read", "dashboard:access"]),
        };

        assert!(user.has_permission("users:read"));
        assert!(!user.has_permission("Users:Read"));
        assert!(!user.has_permission("users:delete"));
        assert!(user.has_any_permission(&["permissions:read", "users:read"]));
        assert!(!user.has_any_permission(&["permissions:read", "roles:read"]));
    }

    #[test]
    fn test_admin_role_grants_nothing_by_itself() {
        // Holding the "admin" role name does not bypass the set membership
        // check; authority comes only from the resolved permissions.
        let user = CurrentUser {
            id: "1".to_string(),
            name: "Admin".to_string(),
            email: "admin@example.com".to_string(),
            roles: vec!["admin".to_string()],
            permissions: BTreeSet::new(),
        };

        assert!(!user.has_permission("users:read"));
    }

    #[test]
    fn test_claims_without_subject_are_rejected() {
        let claims = Claims {
            sub: String::new(),
            name: "x".to_string(),
            email: "x@example.com".to_string(),
            roles: vec![],
            permissions: vec![],
            token_type: "access".to_string(),
            exp: 0,
            iat: 0,
            iss: "i".to_string(),
            aud: "a".to_string(),
        };

        assert!(CurrentUser::try_from(claims).is_err());
    }
}
