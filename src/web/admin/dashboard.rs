use std::borrow::Cow;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::error;

use crate::{
    listings::Scholarship,
    web::{
        AppState, AuthUser,
        admin_utils::compose_flash_message,
        data::fetch_scholarships_newest_first,
        templates::{PageLayout, escape_html, render_error_page, render_page},
    },
};

use super::{auth::require_admin_user, types::DashboardQuery};

pub async fn dashboard(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<DashboardQuery>,
) -> Result<Html<String>, Response> {
    let admin = require_admin_user(&state, &jar)
        .await
        .map_err(IntoResponse::into_response)?;

    let rows = fetch_scholarships_newest_first(state.pool_ref())
        .await
        .map_err(|err| {
            error!(?err, "failed to load dashboard scholarships");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render_error_page(
                    "Server error",
                    "Scholarships could not be loaded.",
                )),
            )
                .into_response()
        })?;

    let listings: Vec<Scholarship> = rows.into_iter().map(Scholarship::from).collect();
    Ok(Html(render_dashboard(&admin, &listings, &params)))
}

fn render_dashboard(admin: &AuthUser, listings: &[Scholarship], params: &DashboardQuery) -> String {
    let flash = compose_flash_message(params.status.as_deref(), params.error.as_deref());

    let mut table_rows = String::new();
    if listings.is_empty() {
        table_rows.push_str(r#"<tr><td colspan="6">No scholarships yet.</td></tr>"#);
    } else {
        for item in listings {
            table_rows.push_str(&format!(
                r#"<tr><td>{id}</td><td><a href="/scholarships/{id}">{name}</a></td><td>{country}</td><td>{deadline}</td><td>{international}</td><td><a href="/admin/edit/{id}">Edit</a></td></tr>"#,
                id = item.id,
                name = escape_html(&item.name),
                country = escape_html(&item.country),
                deadline = escape_html(item.deadline.as_deref().unwrap_or("")),
                international = if item.is_international_only { "Yes" } else { "No" },
            ));
        }
    }

    let body = format!(
        r#"        <section class="panel">
            {flash}
            <div style="display:flex; justify-content:space-between; align-items:center; flex-wrap:wrap; gap:1rem;">
                <h2>Manage scholarships</h2>
                <a class="admin-link" href="/admin/add">+ Add scholarship</a>
            </div>
            <table>
                <thead><tr><th>ID</th><th>Name</th><th>Country</th><th>Deadline</th><th>International only</th><th></th></tr></thead>
                <tbody>{table_rows}</tbody>
            </table>
        </section>"#,
    );

    render_page(PageLayout {
        title: "Admin",
        user: Some(admin),
        body_html: Cow::Owned(body),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listings::sample;

    fn admin() -> AuthUser {
        AuthUser {
            id: 1,
            email: "admin@academicachievers.app".to_string(),
            is_admin: true,
        }
    }

    #[test]
    fn dashboard_links_each_listing_to_its_editor() {
        let listings = vec![sample(9, "Fulbright", "United States"), sample(3, "DAAD", "Germany")];
        let html = render_dashboard(&admin(), &listings, &DashboardQuery::default());
        assert!(html.contains(r#"href="/admin/edit/9""#));
        assert!(html.contains(r#"href="/admin/edit/3""#));
        assert!(html.find("Fulbright") < html.find("DAAD"));
    }

    #[test]
    fn dashboard_shows_flash() {
        let params = DashboardQuery {
            status: Some("created".to_string()),
            error: None,
        };
        let html = render_dashboard(&admin(), &[], &params);
        assert!(html.contains("flash success"));
        assert!(html.contains("No scholarships yet."));
    }
}
