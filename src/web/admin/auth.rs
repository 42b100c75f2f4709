use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{error, info, warn};

use crate::web::{
    AppState, AuthUser,
    auth::{self, CredentialsForm},
    templates::{AuthPageKind, render_auth_page},
};

/// Gate for every `/admin` route. Anonymous and non-admin visitors go to the admin login.
pub async fn require_admin_user(state: &AppState, jar: &CookieJar) -> Result<AuthUser, Redirect> {
    match auth::current_user(state, jar).await {
        Some(user) if user.is_admin => Ok(user),
        _ => Err(Redirect::to("/admin/login")),
    }
}

pub async fn admin_login_page(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Html<String>, Redirect> {
    if require_admin_user(&state, &jar).await.is_ok() {
        return Err(Redirect::to("/admin"));
    }

    Ok(Html(render_auth_page(AuthPageKind::AdminLogin, None, "")))
}

pub async fn process_admin_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<(CookieJar, Redirect), (StatusCode, Html<String>)> {
    let email = auth::normalize_email(&form.email);

    let user = match auth::fetch_user_by_email(state.pool_ref(), &email).await {
        Ok(Some(user)) if user.is_admin => user,
        Ok(_) => return Err(auth::invalid_admin_credentials(&email)),
        Err(err) => {
            error!(?err, "failed to fetch user during admin login");
            return Err(auth::server_error());
        }
    };

    if !auth::verify_password(&form.password, &user.password_hash) {
        warn!(email = %user.email, "rejected admin login");
        return Err(auth::invalid_admin_credentials(&email));
    }

    let jar = auth::start_session(state.pool_ref(), jar, user.id)
        .await
        .map_err(|err| {
            error!(?err, "failed to create admin session");
            auth::server_error()
        })?;

    info!(admin_id = user.id, "admin signed in");
    Ok((jar, Redirect::to("/admin")))
}
