use std::borrow::Cow;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::error;

use crate::{
    listings::{BrowseCriteria, Scholarship, SortKey, filter_and_sort},
    web::{
        AppState, AuthUser, auth,
        data::{fetch_scholarship, fetch_scholarships},
        templates::{
            PageLayout, encode_path_segment, encode_query_value, escape_html, render_error_page,
            render_page,
        },
    },
};

#[derive(Default, Deserialize)]
pub struct BrowseQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
}

/// `GET /scholarships?q=&country=&sort=`
pub async fn browse(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<BrowseQuery>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let user = auth::current_user(&state, &jar).await;

    let rows = fetch_scholarships(state.pool_ref()).await.map_err(|err| {
        error!(?err, "failed to load scholarships");
        load_failure()
    })?;

    let criteria = BrowseCriteria::from_params(
        params.q.as_deref(),
        params.country.as_deref(),
        params.sort.as_deref(),
    );
    let listings = rows.into_iter().map(Scholarship::from).collect();
    let results = filter_and_sort(listings, &criteria);

    Ok(Html(render_browse_page(user.as_ref(), &params, criteria.sort, &results)))
}

/// `GET /scholarships/:id`. Unknown ids fall back to the listing page.
pub async fn detail(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<Html<String>, Redirect> {
    let user = auth::current_user(&state, &jar).await;

    let row = match fetch_scholarship(state.pool_ref(), id).await {
        Ok(Some(row)) => row,
        Ok(None) => return Err(Redirect::to("/scholarships")),
        Err(err) => {
            error!(?err, id, "failed to load scholarship");
            return Err(Redirect::to("/scholarships"));
        }
    };

    Ok(Html(render_detail_page(user.as_ref(), &Scholarship::from(row))))
}

fn load_failure() -> (StatusCode, Html<String>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(render_error_page(
            "Server error",
            "Scholarships could not be loaded. Please try again later.",
        )),
    )
}

fn render_browse_page(
    user: Option<&AuthUser>,
    params: &BrowseQuery,
    sort: SortKey,
    results: &[Scholarship],
) -> String {
    let sort_options = [
        (SortKey::None, "Default order"),
        (SortKey::DeadlineAscending, "Deadline: soonest first"),
        (SortKey::DeadlineDescending, "Deadline: latest first"),
    ]
    .iter()
    .map(|(key, label)| {
        format!(
            r#"<option value="{value}"{selected}>{label}</option>"#,
            value = key.as_param(),
            selected = if *key == sort { " selected" } else { "" },
            label = label,
        )
    })
    .collect::<String>();

    let rows = if results.is_empty() {
        r#"<tr><td colspan="4">No scholarships match your search.</td></tr>"#.to_string()
    } else {
        results.iter().map(render_result_row).collect::<String>()
    };

    let body = format!(
        r#"        <section class="panel">
            <h2>Scholarships</h2>
            <form class="filters" method="get" action="/scholarships">
                <div><label for="q">Name</label><input id="q" type="text" name="q" value="{q}"></div>
                <div><label for="country">Country</label><input id="country" type="text" name="country" value="{country}"></div>
                <div><label for="sort">Sort</label><select id="sort" name="sort">{sort_options}</select></div>
                <div><button type="submit">Search</button></div>
            </form>
            <table>
                <thead><tr><th>Name</th><th>Country</th><th>Deadline</th><th>Link</th></tr></thead>
                <tbody>{rows}</tbody>
            </table>
        </section>"#,
        q = escape_html(params.q.as_deref().unwrap_or("")),
        country = escape_html(params.country.as_deref().unwrap_or("")),
        sort_options = sort_options,
        rows = rows,
    );

    render_page(PageLayout {
        title: "Scholarships",
        user,
        body_html: Cow::Owned(body),
    })
}

fn render_result_row(item: &Scholarship) -> String {
    format!(
        r#"<tr><td><a href="/scholarships/{id}">{name}</a></td><td><a href="/scholarships?country={country_param}">{country}</a></td><td>{deadline}</td><td><a href="{link}" rel="noopener" target="_blank">Apply</a></td></tr>"#,
        id = item.id,
        name = escape_html(&item.name),
        country_param = encode_query_value(&item.country),
        country = escape_html(&item.country),
        deadline = escape_html(item.deadline.as_deref().unwrap_or("Rolling")),
        link = escape_html(&item.link),
    )
}

fn render_detail_page(user: Option<&AuthUser>, item: &Scholarship) -> String {
    let image = item
        .image_filename
        .as_deref()
        .map(|name| {
            format!(
                r#"<img class="cover" src="/uploads/{src}" alt="{alt}">"#,
                src = encode_path_segment(name),
                alt = escape_html(&item.name),
            )
        })
        .unwrap_or_default();

    let brochure = item
        .brochure_filename
        .as_deref()
        .map(|name| {
            format!(
                r#"<p><a href="/uploads/{href}">Download brochure</a></p>"#,
                href = encode_path_segment(name),
            )
        })
        .unwrap_or_default();

    let facts = [
        ("Country", Some(item.country.as_str())),
        ("University", item.university.as_deref()),
        ("Level", item.level.as_deref()),
        ("Field", item.field.as_deref()),
        ("Tags", item.tags.as_deref()),
        ("Deadline", item.deadline.as_deref()),
    ]
    .into_iter()
    .filter_map(|(label, value)| {
        value
            .filter(|value| !value.is_empty())
            .map(|value| format!("<tr><th>{label}</th><td>{}</td></tr>", escape_html(value)))
    })
    .collect::<String>();

    let gpa_row = item
        .min_gpa
        .map(|gpa| format!("<tr><th>Minimum GPA</th><td>{gpa:.2}</td></tr>"))
        .unwrap_or_default();

    let international = if item.is_international_only {
        r#"<p><span class="tag">International students only</span></p>"#
    } else {
        ""
    };

    let checklist = if item.checklist.is_empty() {
        String::new()
    } else {
        let entries = item
            .checklist
            .iter()
            .map(|entry| format!("<li>{}</li>", escape_html(entry)))
            .collect::<String>();
        format!(r#"<h3>Application checklist</h3><ul class="checklist">{entries}</ul>"#)
    };

    let body = format!(
        r#"        <section class="panel">
            {image}
            <h2>{name}</h2>
            {international}
            <table>{facts}{gpa_row}</table>
            {checklist}
            <p><a href="{link}" rel="noopener" target="_blank">Official page</a></p>
            {brochure}
            <p><a href="/scholarships">← Back to all scholarships</a></p>
        </section>"#,
        image = image,
        name = escape_html(&item.name),
        international = international,
        facts = facts,
        gpa_row = gpa_row,
        checklist = checklist,
        link = escape_html(&item.link),
        brochure = brochure,
    );

    render_page(PageLayout {
        title: &item.name,
        user,
        body_html: Cow::Owned(body),
    })
}
