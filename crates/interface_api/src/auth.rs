//! Authentication and authorization

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use core_kernel::OperationMetadata;

use crate::error::ApiError;

/// Role granting every permission
pub const ADMIN_ROLE: &str = "ADMIN";

/// Upper bound on token lifetime (ten years)
const MAX_TOKEN_LIFETIME_SECS: u64 = 10 * 365 * 24 * 3600;

/// Header carrying the request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// User's roles, issued either as a list or as "ROLE_A:ROLE_B"
    #[serde(deserialize_with = "deserialize_roles")]
    pub roles: Vec<String>,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RolesClaim {
    List(Vec<String>),
    Joined(String),
}

/// Splits a colon-separated role string, dropping blanks
pub fn parse_roles(joined: &str) -> Vec<String> {
    joined
        .split(':')
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .map(String::from)
        .collect()
}

fn deserialize_roles<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RolesClaim::deserialize(deserializer)? {
        RolesClaim::List(roles) => roles,
        RolesClaim::Joined(joined) => parse_roles(&joined),
    })
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Missing permission: {0}")]
    MissingPermission(String),
}

/// Creates a new JWT token
///
/// # Arguments
///
/// * `user_id` - User identifier
/// * `roles` - User's roles
/// * `secret` - JWT secret key
/// * `expiration_secs` - Token validity in seconds
pub fn create_token(
    user_id: &str,
    roles: Vec<String>,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs.min(MAX_TOKEN_LIFETIME_SECS) as i64);

    let claims = Claims {
        sub: user_id.to_string(),
        roles,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Validates a JWT token
///
/// # Arguments
///
/// * `token` - The JWT token to validate
/// * `secret` - JWT secret key
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

/// Checks if user has required role; role names compare case-insensitively
pub fn has_role(claims: &Claims, required_role: &str) -> bool {
    claims.roles.iter().any(|r| {
        r.eq_ignore_ascii_case(required_role) || r.eq_ignore_ascii_case(ADMIN_ROLE)
    })
}

/// Fails with `MissingPermission` unless the user holds `permission` or is an admin
pub fn require_permission(claims: &Claims, permission: &str) -> Result<(), AuthError> {
    if has_role(claims, permission) {
        Ok(())
    } else {
        Err(AuthError::MissingPermission(permission.to_string()))
    }
}

/// Permission definitions
///
/// Names contain no `:` so they survive the colon-joined roles claim.
pub mod permissions {
    pub const REFERENCE_DATA_WRITE: &str = "reference_data.write";
    pub const DOCUMENT_CONFIG_WRITE: &str = "document_config.write";
}

/// Authenticated caller of a request
///
/// Extracted from the claims the auth middleware stored on the request. The
/// subject becomes the actor recorded on versioned writes.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub claims: Claims,
    pub metadata: OperationMetadata,
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or(ApiError::Unauthorized)?;

        let mut metadata = OperationMetadata::initiated_by(claims.sub.clone());
        metadata.correlation_id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(String::from);

        Ok(Self { claims, metadata })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_token_round_trip() {
        let token = create_token("ops-user", vec!["USER".to_string()], SECRET, 60).unwrap();
        let claims = validate_token(&token, SECRET).unwrap();

        assert_eq!(claims.sub, "ops-user");
        assert_eq!(claims.roles, vec!["USER".to_string()]);
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = create_token("ops-user", vec![], SECRET, 60).unwrap();
        assert!(matches!(
            validate_token(&token, "other-secret"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_colon_separated_roles_claim() {
        let claims: Claims = serde_json::from_str(
            r#"{"sub":"u1","roles":"ADMIN:USER","exp":4102444800,"iat":0}"#,
        )
        .unwrap();

        assert_eq!(claims.roles, vec!["ADMIN".to_string(), "USER".to_string()]);
        assert!(has_role(&claims, "anything"));
    }

    #[test]
    fn test_permission_granted_through_joined_roles_claim() {
        let claims: Claims = serde_json::from_str(
            r#"{"sub":"u3","roles":"USER:reference_data.write","exp":4102444800,"iat":0}"#,
        )
        .unwrap();

        assert!(require_permission(&claims, permissions::REFERENCE_DATA_WRITE).is_ok());
        assert!(require_permission(&claims, permissions::DOCUMENT_CONFIG_WRITE).is_err());
    }

    #[test]
    fn test_write_permission_required_without_admin() {
        let claims = Claims {
            sub: "u2".to_string(),
            roles: vec!["USER".to_string(), permissions::DOCUMENT_CONFIG_WRITE.to_string()],
            exp: 0,
            iat: 0,
        };

        assert!(require_permission(&claims, permissions::DOCUMENT_CONFIG_WRITE).is_ok());
        assert!(matches!(
            require_permission(&claims, permissions::REFERENCE_DATA_WRITE),
            Err(AuthError::MissingPermission(_))
        ));
    }

    #[tokio::test]
    async fn test_context_carries_actor_and_request_id() {
        let claims = Claims {
            sub: "ops-user".to_string(),
            roles: vec!["USER".to_string()],
            exp: 0,
            iat: 0,
        };
        let (mut parts, _) = axum::http::Request::builder()
            .header(REQUEST_ID_HEADER, "req-42")
            .extension(claims)
            .body(())
            .unwrap()
            .into_parts();

        let context = RequestContext::from_request_parts(&mut parts, &()).await.unwrap();

        assert_eq!(context.metadata.initiated_by.as_deref(), Some("ops-user"));
        assert_eq!(context.metadata.correlation_id.as_deref(), Some("req-42"));
    }
}
