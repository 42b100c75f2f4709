use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration as ChronoDuration, Utc};
use cookie::time::Duration as CookieDuration;
use rand_core::OsRng;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use crate::web::{
    AppState,
    models::UserCredentialsRow,
    templates::{AuthPageKind, render_auth_page, render_error_page},
};

#[derive(Clone, sqlx::FromRow)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub is_admin: bool,
}

pub const SESSION_COOKIE: &str = "auth_token";
pub const SESSION_TTL_DAYS: i64 = 7;
pub const MIN_PASSWORD_LEN: usize = 6;

const DUPLICATE_KEY_CODE: &str = "23505";

#[derive(Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login_page(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Html<String>, Redirect> {
    if let Some(redirect) = redirect_if_authenticated(&state, &jar).await {
        return Err(redirect);
    }

    Ok(Html(render_auth_page(AuthPageKind::Login, None, "")))
}

pub async fn process_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<(CookieJar, Redirect), (StatusCode, Html<String>)> {
    let email = normalize_email(&form.email);

    let user = match fetch_user_by_email(state.pool_ref(), &email).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err(form_error(AuthPageKind::Login, &email)),
        Err(err) => {
            error!(?err, "failed to fetch user during login");
            return Err(server_error());
        }
    };

    if !verify_password(&form.password, &user.password_hash) {
        return Err(form_error(AuthPageKind::Login, &email));
    }

    let jar = start_session(state.pool_ref(), jar, user.id)
        .await
        .map_err(|err| {
            error!(?err, "failed to create session");
            server_error()
        })?;

    Ok((jar, Redirect::to("/")))
}

pub async fn signup_page(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Html<String>, Redirect> {
    if let Some(redirect) = redirect_if_authenticated(&state, &jar).await {
        return Err(redirect);
    }

    Ok(Html(render_auth_page(AuthPageKind::Signup, None, "")))
}

pub async fn process_signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<(CookieJar, Redirect), (StatusCode, Html<String>)> {
    let email = normalize_email(&form.email);

    if let Err(message) = validate_signup(&email, &form.password) {
        return Err((
            StatusCode::OK,
            Html(render_auth_page(AuthPageKind::Signup, Some(message), &email)),
        ));
    }

    let password_hash = hash_password(&form.password).map_err(|err| {
        error!(?err, "failed to hash password during signup");
        server_error()
    })?;

    let user_id = match insert_user(state.pool_ref(), &email, &password_hash, false).await {
        Ok(id) => id,
        Err(sqlx::Error::Database(db_err))
            if db_err.code().as_deref() == Some(DUPLICATE_KEY_CODE) =>
        {
            return Err((
                StatusCode::OK,
                Html(render_auth_page(
                    AuthPageKind::Signup,
                    Some("Email already registered."),
                    &email,
                )),
            ));
        }
        Err(err) => {
            error!(?err, "failed to create user during signup");
            return Err(server_error());
        }
    };

    info!(user_id, "new account registered");

    let jar = start_session(state.pool_ref(), jar, user_id)
        .await
        .map_err(|err| {
            error!(?err, "failed to create session after signup");
            server_error()
        })?;

    Ok((jar, Redirect::to("/")))
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let mut jar = jar;

    if let Some(token) = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
    {
        if let Err(err) = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(token)
            .execute(state.pool_ref())
            .await
        {
            error!(?err, "failed to remove session during logout");
        }
    }

    let mut removal = Cookie::new(SESSION_COOKIE, "");
    removal.set_path("/");
    removal.set_http_only(true);
    removal.set_same_site(SameSite::Lax);
    removal.set_max_age(CookieDuration::seconds(0));
    jar = jar.remove(removal);

    (jar, Redirect::to("/"))
}

/// Persists a new server-side session for `user_id` and attaches its cookie.
pub async fn start_session(pool: &PgPool, jar: CookieJar, user_id: i64) -> sqlx::Result<CookieJar> {
    let session_token = Uuid::new_v4();
    let expires_at = Utc::now() + ChronoDuration::days(SESSION_TTL_DAYS);

    sqlx::query("INSERT INTO sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
        .bind(session_token)
        .bind(user_id)
        .bind(expires_at)
        .execute(pool)
        .await?;

    let mut cookie = Cookie::new(SESSION_COOKIE, session_token.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(CookieDuration::days(SESSION_TTL_DAYS));

    Ok(jar.add(cookie))
}

/// Resolves the signed-in user, if any. Lookup failures are logged and treated as anonymous.
pub async fn current_user(state: &AppState, jar: &CookieJar) -> Option<AuthUser> {
    let token_cookie = jar.get(SESSION_COOKIE)?;
    let token = Uuid::parse_str(token_cookie.value()).ok()?;

    match fetch_user_by_session(state.pool_ref(), token).await {
        Ok(user) => user,
        Err(err) => {
            error!(?err, "failed to resolve session");
            None
        }
    }
}

pub async fn redirect_if_authenticated(state: &AppState, jar: &CookieJar) -> Option<Redirect> {
    current_user(state, jar).await.map(|_| Redirect::to("/"))
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn validate_signup(email: &str, password: &str) -> Result<(), &'static str> {
    if email.is_empty() {
        return Err("Email is required.");
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err("Password must be at least 6 characters.");
    }
    Ok(())
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let parsed = PasswordHash::new(password_hash);
    match parsed {
        Ok(hash) => Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok(),
        Err(_) => false,
    }
}

pub async fn fetch_user_by_email(
    pool: &PgPool,
    email: &str,
) -> sqlx::Result<Option<UserCredentialsRow>> {
    sqlx::query_as::<_, UserCredentialsRow>(
        "SELECT id, email, password_hash, is_admin FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn insert_user(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    is_admin: bool,
) -> sqlx::Result<i64> {
    sqlx::query_scalar(
        "INSERT INTO users (email, password_hash, is_admin) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(normalize_email(email))
    .bind(password_hash)
    .bind(is_admin)
    .fetch_one(pool)
    .await
}

pub async fn fetch_user_by_session(pool: &PgPool, token: Uuid) -> sqlx::Result<Option<AuthUser>> {
    sqlx::query_as::<_, AuthUser>(
        "SELECT users.id, users.email, users.is_admin FROM sessions JOIN users ON users.id = sessions.user_id WHERE sessions.id = $1 AND sessions.expires_at > NOW()",
    )
    .bind(token)
    .fetch_optional(pool)
    .await
}

fn form_error(kind: AuthPageKind, email: &str) -> (StatusCode, Html<String>) {
    let message = match kind {
        AuthPageKind::AdminLogin => "Invalid admin credentials.",
        _ => "Invalid email or password.",
    };
    (
        StatusCode::UNAUTHORIZED,
        Html(render_auth_page(kind, Some(message), email)),
    )
}

pub(crate) fn invalid_admin_credentials(email: &str) -> (StatusCode, Html<String>) {
    form_error(AuthPageKind::AdminLogin, email)
}

pub(crate) fn server_error() -> (StatusCode, Html<String>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(render_error_page(
            "Server error",
            "Something went wrong. Please try again later.",
        )),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("correct horse").expect("hash");
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn verify_rejects_malformed_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Student@Example.COM "), "student@example.com");
    }

    #[test]
    fn signup_requires_six_character_password() {
        assert_eq!(
            validate_signup("a@b.c", "12345"),
            Err("Password must be at least 6 characters.")
        );
        assert_eq!(validate_signup("a@b.c", "123456"), Ok(()));
        assert_eq!(validate_signup("", "123456"), Err("Email is required."));
    }
}
