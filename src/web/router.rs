use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::{
    config::MAX_UPLOAD_BYTES,
    web::{AppState, admin, api, auth, eligibility, landing, scholarships, storage},
};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(landing::landing_page))
        .route("/signup", get(auth::signup_page).post(auth::process_signup))
        .route("/login", get(auth::login_page).post(auth::process_login))
        .route("/logout", get(auth::logout).post(auth::logout))
        .route("/healthz", get(healthz))
        .route("/scholarships", get(scholarships::browse))
        .route("/scholarships/:id", get(scholarships::detail))
        .route(
            "/eligibility",
            get(eligibility::eligibility_page).post(eligibility::submit_eligibility),
        )
        .route("/uploads/:filename", get(storage::uploaded_file))
        .route("/api/scholarships", get(api::list_scholarships))
        .route("/api/eligibility", post(api::check_eligibility))
        .route(
            "/admin/login",
            get(admin::admin_login_page).post(admin::process_admin_login),
        )
        .route("/admin", get(admin::dashboard))
        .route(
            "/admin/add",
            get(admin::new_scholarship_page).post(admin::create_scholarship),
        )
        .route(
            "/admin/edit/:id",
            get(admin::edit_scholarship_page).post(admin::update_scholarship),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}
