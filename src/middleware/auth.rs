use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{Role, UserRecord},
    state::AppState,
};

pub const SESSION_COOKIE: &str = "token";
pub const SESSION_DAYS: i64 = 7;

#[derive(Debug, Deserialize, Serialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub username: String,
    pub role: String,
    pub iat: usize,
    pub exp: usize,
}

/// Signs and verifies session tokens and renders the session cookie.
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    secure_cookie: bool,
}

impl SessionKeys {
    pub fn new(secret: &[u8], secure_cookie: bool) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            secure_cookie,
        }
    }

    pub fn issue(&self, user: &UserRecord) -> AppResult<String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(Duration::days(SESSION_DAYS))
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            username: user.username.clone(),
            role: user.role.clone(),
            iat: now.timestamp() as usize,
            exp: expiration.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
    }

    pub fn verify(&self, token: &str) -> AppResult<AuthUser> {
        let decoded = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

        let user_id = decoded
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

        Ok(AuthUser {
            user_id,
            email: decoded.claims.email,
            username: decoded.claims.username,
            role: Role::parse(&decoded.claims.role),
        })
    }

    pub fn session_cookie(&self, token: &str) -> String {
        let max_age = SESSION_DAYS * 24 * 60 * 60;
        let mut cookie =
            format!("{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age}");
        if self.secure_cookie {
            cookie.push_str("; Secure");
        }
        cookie
    }

    pub fn clear_cookie(&self) -> String {
        let mut cookie = format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0");
        if self.secure_cookie {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Identity decoded from a verified session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub email: String,
    pub username: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

pub fn ensure_role(user: &AuthUser, role: Role) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden(format!(
            "{} role required",
            role.as_str()
        )));
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, Role::Admin)
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let (key, value) = cookie.split_once('=')?;
            (key.trim() == name).then(|| value.trim())
        })
}

/// Session cookie first, then an `Authorization: Bearer` header.
fn session_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(token) = cookie_value(headers, SESSION_COOKIE).filter(|t| !t.is_empty()) {
        return Some(token);
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or_else(|| {
            AppError::Unauthorized("Access denied. No token provided.".into())
        })?;

        state.keys.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn record(role: &str) -> UserRecord {
        UserRecord {
            id: 42,
            email: "ana@florecer.com".into(),
            username: "ana".into(),
            password_hash: "x".into(),
            role: role.into(),
            avatar_url: None,
            bio: None,
            description: None,
            preferences: "[]".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn issued_token_round_trips_identity() {
        let keys = SessionKeys::new(b"secret", false);
        let token = keys.issue(&record("admin")).unwrap();
        let user = keys.verify(&token).unwrap();
        assert_eq!(user.user_id, 42);
        assert_eq!(user.username, "ana");
        assert!(user.is_admin());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = SessionKeys::new(b"one", false).issue(&record("user")).unwrap();
        let err = SessionKeys::new(b"two", false).verify(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = SessionKeys::new(b"secret", false);
        let past = (Utc::now() - Duration::hours(2)).timestamp() as usize;
        let claims = Claims {
            sub: "1".into(),
            email: "a@x.com".into(),
            username: "a".into(),
            role: "user".into(),
            iat: past,
            exp: past,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).unwrap();
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn token_is_read_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; token=abc.def.ghi"),
        );
        assert_eq!(session_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn bearer_header_is_the_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(session_token(&headers), Some("xyz"));
        assert_eq!(session_token(&HeaderMap::new()), None);
    }

    #[test]
    fn session_cookie_attributes() {
        let cookie = SessionKeys::new(b"s", true).session_cookie("t");
        assert!(cookie.starts_with("token=t;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(cookie.ends_with("Secure"));
    }

    #[test]
    fn role_check_rejects_plain_users() {
        let user = AuthUser {
            user_id: 1,
            email: "u@x.com".into(),
            username: "u".into(),
            role: Role::User,
        };
        assert!(matches!(ensure_admin(&user), Err(AppError::Forbidden(_))));
        assert!(ensure_role(&user, Role::User).is_ok());
    }
}
