use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::{
    config::{AdminConfig, SessionConfig},
    error::AppError,
};

pub const SESSION_COOKIE: &str = "admin_session";
const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

/// Контекст аутентифицированного администратора.
///
/// Передается в каждый админский обработчик явно, вместо глобального флага сессии.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub username: String,
}

/// Сравнение логина и пароля с настроенными.
///
/// Сравниваем SHA-256 дайджесты, чтобы длина пароля не влияла на время сравнения.
pub fn verify_credentials(admin: &AdminConfig, username: &str, password: &str) -> bool {
    let user_ok = digest_eq(username, &admin.username);
    let pass_ok = digest_eq(password, &admin.password);
    user_ok & pass_ok
}

fn digest_eq(a: &str, b: &str) -> bool {
    let da = Sha256::digest(a.as_bytes());
    let db = Sha256::digest(b.as_bytes());
    da.iter().zip(db.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Выпустить подписанный токен сессии.
pub fn issue_token(session: &SessionConfig, username: &str) -> Result<String, AppError> {
    let claims = SessionClaims {
        sub: username.to_string(),
        role: ADMIN_ROLE.to_string(),
        exp: (Utc::now() + Duration::hours(session.expires_in_hours)).timestamp() as usize,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(session.secret.as_bytes()))
        .map_err(|e| AppError::Internal(format!("Token encoding failed: {}", e)))
}

pub fn verify_token(session: &SessionConfig, token: &str) -> Option<SessionClaims> {
    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(session.secret.as_bytes()),
        &Validation::default(),
    )
    .ok()?;

    (data.claims.role == ADMIN_ROLE).then_some(data.claims)
}

/// Cookie с токеном сессии. `secure` добавляет атрибут `Secure`
/// (везде, кроме локальной разработки).
pub fn session_cookie(token: &str, session: &SessionConfig, secure: bool) -> String {
    format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}{}",
        SESSION_COOKIE,
        token,
        session.expires_in_hours * 3600,
        secure_attr(secure)
    )
}

pub fn clear_session_cookie(secure: bool) -> String {
    format!(
        "{}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0{}",
        SESSION_COOKIE,
        secure_attr(secure)
    )
}

fn secure_attr(secure: bool) -> &'static str {
    if secure {
        "; Secure"
    } else {
        ""
    }
}

fn cookie_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
}

// Basic Auth: "Basic base64(username:password)"
fn basic_credentials(encoded: &str) -> Option<(String, String)> {
    let decoded = general_purpose::STANDARD.decode(encoded.trim()).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;
    let (user, pass) = credentials.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

// Порядок: Bearer токен, cookie сессии, Basic Auth
impl FromRequestParts<Arc<crate::AppState>> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        if let Some(token) = auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
            let claims = verify_token(&state.config.session, token.trim())
                .ok_or(AppError::Unauthorized)?;
            return Ok(AdminSession { username: claims.sub });
        }

        if let Some(token) = cookie_value(parts, SESSION_COOKIE) {
            if let Some(claims) = verify_token(&state.config.session, token) {
                return Ok(AdminSession { username: claims.sub });
            }
        }

        if let Some(encoded) = auth_header.and_then(|h| h.strip_prefix("Basic ")) {
            let (user, pass) = basic_credentials(encoded).ok_or(AppError::Unauthorized)?;
            if verify_credentials(&state.config.admin, &user, &pass) {
                return Ok(AdminSession { username: user });
            }
        }

        Err(AppError::Unauthorized)
    }
}
