use std::borrow::Cow;

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::Html,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::error;

use crate::{
    listings::{EligibilityCriteria, Scholarship, matches},
    web::{
        AppState, AuthUser, auth,
        data::{fetch_eligibility_options, fetch_scholarships},
        models::EligibilityOptions,
        templates::{PageLayout, escape_html, render_error_page, render_page},
    },
};

#[derive(Default, Deserialize)]
pub struct EligibilityForm {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub gpa: Option<String>,
    /// Checkbox: present means checked, whatever the value.
    #[serde(default)]
    pub is_international: Option<String>,
}

impl EligibilityForm {
    fn criteria(&self) -> EligibilityCriteria {
        EligibilityCriteria::from_raw(
            self.country.as_deref(),
            self.level.as_deref(),
            self.field.as_deref(),
            self.gpa.as_deref(),
            self.is_international.is_some(),
        )
    }
}

/// `GET /eligibility`
pub async fn eligibility_page(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let user = auth::current_user(&state, &jar).await;
    let options = load_options(&state).await?;

    Ok(Html(render_eligibility_page(
        user.as_ref(),
        &options,
        &EligibilityForm::default(),
        None,
    )))
}

/// `POST /eligibility`
pub async fn submit_eligibility(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<EligibilityForm>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let user = auth::current_user(&state, &jar).await;
    let options = load_options(&state).await?;

    let rows = fetch_scholarships(state.pool_ref()).await.map_err(|err| {
        error!(?err, "failed to load scholarships for eligibility");
        load_failure()
    })?;

    let listings = rows.into_iter().map(Scholarship::from).collect();
    let results = matches(listings, &form.criteria());

    Ok(Html(render_eligibility_page(
        user.as_ref(),
        &options,
        &form,
        Some(&results),
    )))
}

async fn load_options(state: &AppState) -> Result<EligibilityOptions, (StatusCode, Html<String>)> {
    fetch_eligibility_options(state.pool_ref())
        .await
        .map_err(|err| {
            error!(?err, "failed to load eligibility options");
            load_failure()
        })
}

fn load_failure() -> (StatusCode, Html<String>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(render_error_page(
            "Server error",
            "Eligibility data could not be loaded. Please try again later.",
        )),
    )
}

fn render_select(name: &str, label: &str, values: &[String], selected: Option<&str>) -> String {
    let selected = selected.map(str::trim).unwrap_or("");
    let options = values
        .iter()
        .map(|value| {
            format!(
                r#"<option value="{value}"{marker}>{value}</option>"#,
                value = escape_html(value),
                marker = if value == selected { " selected" } else { "" },
            )
        })
        .collect::<String>();

    format!(
        r#"<div><label for="{name}">{label}</label><select id="{name}" name="{name}"><option value="">Any</option>{options}</select></div>"#,
    )
}

fn render_eligibility_page(
    user: Option<&AuthUser>,
    options: &EligibilityOptions,
    form: &EligibilityForm,
    results: Option<&[Scholarship]>,
) -> String {
    let results_html = match results {
        None => String::new(),
        Some([]) => r#"<section class="panel"><h2>Results</h2><p class="note">No scholarships match these criteria.</p></section>"#.to_string(),
        Some(items) => {
            let rows = items
                .iter()
                .map(|item| {
                    format!(
                        r#"<tr><td><a href="/scholarships/{id}">{name}</a></td><td>{country}</td><td>{level}</td><td>{field}</td><td>{min_gpa}</td><td>{deadline}</td></tr>"#,
                        id = item.id,
                        name = escape_html(&item.name),
                        country = escape_html(&item.country),
                        level = escape_html(item.level.as_deref().unwrap_or("")),
                        field = escape_html(item.field.as_deref().unwrap_or("")),
                        min_gpa = item
                            .min_gpa
                            .map(|gpa| format!("{gpa:.2}"))
                            .unwrap_or_else(|| "None".to_string()),
                        deadline = escape_html(item.deadline.as_deref().unwrap_or("Rolling")),
                    )
                })
                .collect::<String>();
            format!(
                r#"<section class="panel"><h2>Results ({count})</h2><table><thead><tr><th>Name</th><th>Country</th><th>Level</th><th>Field</th><th>Min GPA</th><th>Deadline</th></tr></thead><tbody>{rows}</tbody></table></section>"#,
                count = items.len(),
            )
        }
    };

    let body = format!(
        r#"        <section class="panel">
            <h2>Check your eligibility</h2>
            <p class="note">Leave a field on "Any" to skip it. Listings without a GPA requirement always pass the GPA check.</p>
            <form method="post" action="/eligibility">
                <div class="filters">
                    {country}
                    {level}
                    {field}
                    <div><label for="gpa">Your GPA</label><input id="gpa" type="text" name="gpa" inputmode="decimal" value="{gpa}"></div>
                </div>
                <label class="checkbox"><input type="checkbox" name="is_international"{international}> International students only</label>
                <p><button type="submit">Find scholarships</button></p>
            </form>
        </section>
        {results_html}"#,
        country = render_select("country", "Country", &options.countries, form.country.as_deref()),
        level = render_select("level", "Level", &options.levels, form.level.as_deref()),
        field = render_select("field", "Field", &options.fields, form.field.as_deref()),
        gpa = escape_html(form.gpa.as_deref().unwrap_or("")),
        international = if form.is_international.is_some() { " checked" } else { "" },
        results_html = results_html,
    );

    render_page(PageLayout {
        title: "Eligibility",
        user,
        body_html: Cow::Owned(body),
    })
}
