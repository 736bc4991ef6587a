/*!
 * # Authentication and Authorization Module
 *
 * Users sign in with an external identity provider which issues HS256 bearer tokens. This
 * module only verifies those tokens and gates routes by the workshop role carried in the
 * `role` claim.
 */

use crate::errors::ServiceError;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Workshop roles known to the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Role {
    Admin,
    /// Cutter: maintains cutting sheets
    Coupeur,
    /// Workshop head
    Chef,
    User,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Some(Role::Admin),
            "COUPEUR" => Some(Role::Coupeur),
            "CHEF" => Some(Role::Chef),
            "USER" => Some(Role::User),
            _ => None,
        }
    }
}

/// Route groups by the roles allowed to call them.
pub mod roles {
    use super::Role;

    pub const CUTTING_WRITE: &[Role] = &[Role::Admin, Role::Coupeur, Role::Chef];
    pub const WORKSHOP_WRITE: &[Role] = &[Role::Admin, Role::Chef];
    pub const OFFICE_WRITE: &[Role] = &[Role::Admin, Role::Chef];
    pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
}

/// Claim structure of identity-provider tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// Authenticated user extracted from the bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Role,
}

impl AuthUser {
    pub fn has_any_role(&self, allowed: &[Role]) -> bool {
        allowed.contains(&self.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
}

impl AuthConfig {
    pub fn new(jwt_secret: String, jwt_issuer: String, jwt_audience: String) -> Self {
        Self {
            jwt_secret,
            jwt_issuer,
            jwt_audience,
        }
    }
}

impl From<&crate::config::AppConfig> for AuthConfig {
    fn from(cfg: &crate::config::AppConfig) -> Self {
        Self::new(
            cfg.jwt_secret.clone(),
            cfg.auth_issuer.clone(),
            cfg.auth_audience.clone(),
        )
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InsufficientPermissions => ServiceError::Forbidden(err.to_string()),
            AuthError::TokenCreation(msg) => ServiceError::InternalError(msg),
            other => ServiceError::Unauthorized(other.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ServiceError::from(self).into_response()
    }
}

#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        Self {
            config,
            decoding_key,
            encoding_key,
        }
    }

    /// Verifies signature, expiry, issuer and audience, then resolves the role.
    pub fn validate_token(&self, token: &str) -> Result<AuthUser, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.jwt_issuer]);
        validation.set_audience(&[&self.config.jwt_audience]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            debug!(error = %e, "Rejected bearer token");
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            }
        })?;

        let claims = data.claims;
        let role = Role::parse(&claims.role).ok_or_else(|| AuthError::UnknownRole(claims.role.clone()))?;
        Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
            name: claims.name,
            role,
        })
    }

    /// Signs a token the same way the identity provider does. Used by tooling and tests.
    pub fn issue_token(
        &self,
        sub: &str,
        role: Role,
        ttl: chrono::Duration,
    ) -> Result<String, AuthError> {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: sub.to_string(),
            email: None,
            name: None,
            role: role.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Validates the bearer token and stores the [`AuthUser`] in the request extensions.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return ServiceError::InternalError("Authentication service not available".into())
                .into_response();
        }
    };

    let user = match bearer_token(request.headers()) {
        Some(token) => auth_service.validate_token(token),
        None => Err(AuthError::MissingAuth),
    };

    match user {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Rejects users whose role is not in the allowed set
pub async fn role_middleware(
    State(allowed): State<&'static [Role]>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or(AuthError::MissingAuth)?;

    if !user.has_any_role(allowed) {
        debug!(user_id = %user.user_id, role = %user.role, "Role not allowed for route");
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_roles(self, allowed: &'static [Role]) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_roles(self, allowed: &'static [Role]) -> Self {
        self.layer(axum::middleware::from_fn_with_state(allowed, role_middleware))
            .with_auth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn service() -> AuthService {
        AuthService::new(AuthConfig::new(
            "a-very-long-test-secret-with-enough-entropy".into(),
            "atelier-identity".into(),
            "atelier-api".into(),
        ))
    }

    #[test]
    fn issued_token_round_trips_role() {
        let svc = service();
        let token = svc
            .issue_token("u1", Role::Coupeur, chrono::Duration::minutes(5))
            .unwrap();
        let user = svc.validate_token(&token).unwrap();
        assert_eq!(user.user_id, "u1");
        assert_eq!(user.role, Role::Coupeur);
        assert!(!user.is_admin());
    }

    #[test]
    fn expired_token_is_rejected() {
        let svc = service();
        let token = svc
            .issue_token("u1", Role::Admin, chrono::Duration::minutes(-10))
            .unwrap();
        assert_eq!(svc.validate_token(&token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn token_for_other_audience_is_rejected() {
        let other = AuthService::new(AuthConfig::new(
            "a-very-long-test-secret-with-enough-entropy".into(),
            "atelier-identity".into(),
            "someone-else".into(),
        ));
        let token = other
            .issue_token("u1", Role::Admin, chrono::Duration::minutes(5))
            .unwrap();
        assert_eq!(service().validate_token(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn role_parsing_is_case_insensitive() {
        assert_eq!(Role::parse(" chef "), Some(Role::Chef));
        assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::parse("boss"), None);
        assert_eq!(Role::Coupeur.to_string(), "COUPEUR");
    }

    #[test]
    fn bearer_token_requires_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
        headers.insert(header::AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc"));
    }

    #[test]
    fn auth_errors_map_to_service_errors() {
        assert_matches!(
            ServiceError::from(AuthError::InsufficientPermissions),
            ServiceError::Forbidden(_)
        );
        assert_matches!(
            ServiceError::from(AuthError::TokenExpired),
            ServiceError::Unauthorized(msg) if msg == "Token has expired"
        );
        assert_matches!(
            ServiceError::from(AuthError::TokenCreation("no key".into())),
            ServiceError::InternalError(_)
        );
    }
}
