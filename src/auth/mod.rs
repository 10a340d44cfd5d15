/*!
 * # Authentication
 *
 * Username/password accounts with JWT bearer tokens:
 *
 * - passwords are stored as Argon2 PHC strings
 * - access and refresh tokens are HS256 JWTs sharing one claim set, told apart by `kind`
 * - refresh tokens are persisted and rotate on every use
 * - logged-out access tokens stay on an in-memory revocation list until they expire
 *
 * Every `/api` route except register, login and refresh sits behind [`auth_middleware`], which
 * puts the resolved [`AuthUser`] into the request extensions.
 */

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use axum::{
    extract::{DefaultBodyLimit, FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, SqlErr,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{config::AppConfig, errors::ServiceError};

pub mod refresh_token;
pub mod user;

pub use user::Role;

/// Header carrying the refresh token on `/auth/refresh` and `/auth/logout`
pub const REFRESH_TOKEN_HEADER: &str = "x-refresh-token";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,      // user id
    pub username: String, // login name at issue time
    pub role: Role,
    pub kind: TokenKind,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// Caller resolved from a valid access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub role: Role,
    pub token_id: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub jwt_issuer: String,
    pub access_token_expiration: Duration,
    pub refresh_token_expiration: Duration,
}

impl From<&AppConfig> for AuthConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            jwt_secret: cfg.jwt_secret.clone(),
            jwt_audience: cfg.jwt_audience.clone(),
            jwt_issuer: cfg.jwt_issuer.clone(),
            access_token_expiration: cfg.access_token_ttl(),
            refresh_token_expiration: cfg.refresh_token_ttl(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(length(min = 10, max = 128))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Username
    pub login_id: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: i32,
    pub username: String,
    pub role: Role,
}

impl From<&user::Model> for UserInfo {
    fn from(model: &user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username.clone(),
            role: model.role,
        }
    }
}

/// Issued token pair
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    pub user: UserInfo,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token has been revoked")]
    RevokedToken,

    #[error("Username {0} is already taken")]
    UsernameTaken(String),

    #[error("Invalid registration: {0}")]
    Validation(String),

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::InvalidCredentials => warn!("login rejected"),
            AuthError::Database(_) | AuthError::Internal(_) | AuthError::TokenCreation(_) => {}
            other => debug!(reason = %other, "authentication rejected"),
        }
        ServiceError::from(self).into_response()
    }
}

#[derive(Clone, Debug)]
struct RevokedToken {
    jti: String,
    expiry: DateTime<Utc>,
}

/// Issues, validates, rotates and revokes tokens
#[derive(Debug, Clone)]
pub struct AuthService {
    pub config: AuthConfig,
    db: Arc<DatabaseConnection>,
    revoked_tokens: Arc<RwLock<Vec<RevokedToken>>>,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DatabaseConnection>) -> Self {
        Self {
            config,
            db,
            revoked_tokens: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Creates a USER account and logs it in.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AuthError> {
        request
            .validate()
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        let db = self.db.as_ref();
        let taken = user::Entity::find()
            .filter(user::Column::Username.eq(request.username.as_str()))
            .one(db)
            .await?
            .is_some();
        if taken {
            return Err(AuthError::UsernameTaken(request.username));
        }

        let now = Utc::now();
        let account = user::ActiveModel {
            username: Set(request.username.clone()),
            password_hash: Set(hash_password(&request.password)?),
            role: Set(Role::User),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|err| match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AuthError::UsernameTaken(request.username.clone())
            }
            _ => AuthError::Database(err),
        })?;

        info!(user_id = account.id, "user registered");
        self.generate_token(&account).await
    }

    /// Any failure is reported as `InvalidCredentials`, whether or not the user exists.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        let account = user::Entity::find()
            .filter(user::Column::Username.eq(request.login_id.as_str()))
            .one(self.db.as_ref())
            .await?;

        let Some(account) = account else {
            // same Argon2 work as a wrong password for a real account
            let _ = verify_password(&request.password, unknown_account_hash());
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(&request.password, &account.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        info!(user_id = account.id, "user logged in");
        self.generate_token(&account).await
    }

    /// Issues a new access/refresh pair and stores the refresh token.
    pub async fn generate_token(&self, account: &user::Model) -> Result<AuthResponse, AuthError> {
        let now = Utc::now();
        let access_exp = now + chrono_duration(self.config.access_token_expiration)?;
        let refresh_exp = now + chrono_duration(self.config.refresh_token_expiration)?;

        let access_jti = Uuid::new_v4().to_string();
        let refresh_jti = Uuid::new_v4().to_string();

        let access_token = self.encode_claims(&self.claims(
            account,
            TokenKind::Access,
            &access_jti,
            now,
            access_exp,
        ))?;
        let refresh_token = self.encode_claims(&self.claims(
            account,
            TokenKind::Refresh,
            &refresh_jti,
            now,
            refresh_exp,
        ))?;

        refresh_token::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(account.id),
            token_id: Set(refresh_jti),
            created_at: Set(now),
            expires_at: Set(refresh_exp),
            revoked: Set(false),
        }
        .insert(self.db.as_ref())
        .await?;

        Ok(AuthResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_expiration.as_secs() as i64,
            user: UserInfo::from(account),
        })
    }

    /// Decodes a token, checking signature, expiry, issuer, audience, kind and revocation.
    pub async fn validate_token(&self, token: &str, kind: TokenKind) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.jwt_issuer.as_str()]);
        validation.set_audience(&[self.config.jwt_audience.as_str()]);

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?
        .claims;

        if claims.kind != kind {
            return Err(AuthError::InvalidToken);
        }
        if self.is_token_revoked(&claims.jti).await {
            return Err(AuthError::RevokedToken);
        }
        Ok(claims)
    }

    /// Exchanges a refresh token for a new pair. Each refresh token works once.
    pub async fn refresh_token(&self, token: &str) -> Result<AuthResponse, AuthError> {
        let claims = self.validate_token(token, TokenKind::Refresh).await?;
        let user_id = parse_subject(&claims)?;
        let db = self.db.as_ref();

        let stored = refresh_token::Entity::find()
            .filter(refresh_token::Column::TokenId.eq(claims.jti.as_str()))
            .one(db)
            .await?
            .ok_or(AuthError::InvalidToken)?;
        if stored.revoked || stored.user_id != user_id || stored.expires_at <= Utc::now() {
            return Err(AuthError::RevokedToken);
        }

        let account = user::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if !self.revoke_refresh_token(&claims.jti).await? {
            return Err(AuthError::RevokedToken);
        }

        debug!(user_id, "refresh token rotated");
        self.generate_token(&account).await
    }

    /// Revokes the caller's access token and, when given, a refresh token of the same user.
    pub async fn logout(
        &self,
        auth: &AuthUser,
        refresh_token: Option<&str>,
    ) -> Result<(), AuthError> {
        {
            let mut revoked = self.revoked_tokens.write().await;
            revoked.push(RevokedToken {
                jti: auth.token_id.clone(),
                expiry: auth.expires_at,
            });
            let now = Utc::now();
            revoked.retain(|t| t.expiry > now);
        }

        if let Some(token) = refresh_token {
            match self.validate_token(token, TokenKind::Refresh).await {
                Ok(claims) if parse_subject(&claims).ok() == Some(auth.user_id) => {
                    self.revoke_refresh_token(&claims.jti).await?;
                }
                Ok(_) => warn!(user_id = auth.user_id, "logout with another user's refresh token"),
                Err(err) => debug!(reason = %err, "refresh token ignored on logout"),
            }
        }

        info!(user_id = auth.user_id, "user logged out");
        Ok(())
    }

    async fn is_token_revoked(&self, token_id: &str) -> bool {
        let revoked = self.revoked_tokens.read().await;
        revoked.iter().any(|t| t.jti == token_id)
    }

    /// Marks a stored refresh token revoked. Returns false if it already was.
    async fn revoke_refresh_token(&self, token_id: &str) -> Result<bool, AuthError> {
        let result = refresh_token::Entity::update_many()
            .col_expr(
                refresh_token::Column::Revoked,
                sea_orm::sea_query::Expr::value(true),
            )
            .filter(refresh_token::Column::TokenId.eq(token_id))
            .filter(refresh_token::Column::Revoked.eq(false))
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected == 1)
    }

    fn claims(
        &self,
        account: &user::Model,
        kind: TokenKind,
        jti: &str,
        issued: DateTime<Utc>,
        expires: DateTime<Utc>,
    ) -> Claims {
        Claims {
            sub: account.id.to_string(),
            username: account.username.clone(),
            role: account.role,
            kind,
            jti: jti.to_string(),
            iat: issued.timestamp(),
            exp: expires.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        }
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }
}

fn chrono_duration(duration: Duration) -> Result<ChronoDuration, AuthError> {
    ChronoDuration::from_std(duration)
        .map_err(|_| AuthError::Internal("Invalid token duration".to_string()))
}

fn parse_subject(claims: &Claims) -> Result<i32, AuthError> {
    claims.sub.parse().map_err(|_| AuthError::InvalidToken)
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Internal(format!("password hashing failed: {}", e)))
}

/// Argon2 hash with default parameters, checked when the login id matches no account.
fn unknown_account_hash() -> &'static str {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| {
        hash_password(&Uuid::new_v4().to_string()).unwrap_or_else(|e| {
            warn!(error = %e, "could not build hash for unknown-account logins");
            String::new()
        })
    })
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn refresh_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(REFRESH_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Rejects requests without a valid access token
pub async fn auth_middleware(
    State(auth_service): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        return AuthError::MissingAuth.into_response();
    };

    let claims = match auth_service.validate_token(token, TokenKind::Access).await {
        Ok(claims) => claims,
        Err(err) => return err.into_response(),
    };
    let user_id = match parse_subject(&claims) {
        Ok(id) => id,
        Err(err) => return err.into_response(),
    };
    let expires_at = Utc
        .timestamp_opt(claims.exp, 0)
        .single()
        .unwrap_or_else(Utc::now);

    request.extensions_mut().insert(AuthUser {
        user_id,
        username: claims.username,
        role: claims.role,
        token_id: claims.jti,
        expires_at,
    });
    next.run(request).await
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

/// Auth routes. Register, login and refresh are public; logout needs a valid access token.
pub fn auth_routes<S>(auth_service: Arc<AuthService>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let protected = Router::<Arc<AuthService>>::new()
        .route("/logout", post(logout_handler))
        .with_auth(auth_service.clone());

    Router::<Arc<AuthService>>::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/refresh", post(refresh_token_handler))
        .merge(protected)
        .layer(DefaultBodyLimit::max(1024 * 64))
        .with_state(auth_service)
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid username or password", body = crate::errors::ErrorResponse),
        (status = 409, description = "Username taken", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register_handler(
    State(auth_service): State<Arc<AuthService>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthError> {
    let response = auth_service.register(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Authentication failed", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(auth_service): State<Arc<AuthService>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    Ok(Json(auth_service.login(request).await?))
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    params(("X-Refresh-Token" = String, Header, description = "Refresh token")),
    responses(
        (status = 200, description = "New token pair", body = AuthResponse),
        (status = 401, description = "Missing, invalid or used refresh token", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn refresh_token_handler(
    State(auth_service): State<Arc<AuthService>>,
    headers: HeaderMap,
) -> Result<Json<AuthResponse>, AuthError> {
    let token = refresh_header(&headers).ok_or(AuthError::MissingAuth)?;
    Ok(Json(auth_service.refresh_token(token).await?))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    params(("X-Refresh-Token" = Option<String>, Header, description = "Refresh token to revoke")),
    responses(
        (status = 204, description = "Logged out"),
        (status = 401, description = "Not authenticated", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn logout_handler(
    State(auth_service): State<Arc<AuthService>>,
    auth_user: AuthUser,
    headers: HeaderMap,
) -> Result<StatusCode, AuthError> {
    auth_service
        .logout(&auth_user, refresh_header(&headers))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self, auth_service: Arc<AuthService>) -> Self;
}

impl<S> AuthRouterExt for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self, auth_service: Arc<AuthService>) -> Self {
        self.layer(axum::middleware::from_fn_with_state(
            auth_service,
            auth_middleware,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse battery", &hash));
        assert!(!verify_password("wrong horse battery", &hash));
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn unknown_account_hash_costs_the_same_as_a_real_one() {
        let dummy = PasswordHash::new(unknown_account_hash()).unwrap();
        let real_hash = hash_password("operator-password").unwrap();
        let real = PasswordHash::new(&real_hash).unwrap();

        assert_eq!(dummy.algorithm, real.algorithm);
        assert_eq!(dummy.version, real.version);
        assert_eq!(dummy.params, real.params);
        assert!(!verify_password("operator-password", unknown_account_hash()));
    }

    #[test]
    fn bearer_token_requires_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer abc.def".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def"));

        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn claims_serialize_kind_lowercase() {
        let claims = Claims {
            sub: "1".into(),
            username: "alice".into(),
            role: Role::Admin,
            kind: TokenKind::Refresh,
            jti: "j".into(),
            iat: 0,
            exp: 1,
            iss: "iss".into(),
            aud: "aud".into(),
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["kind"], "refresh");
        assert_eq!(json["role"], "ADMIN");
    }
}
