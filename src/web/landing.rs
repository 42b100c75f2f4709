use std::borrow::Cow;

use axum::{extract::State, response::Html};
use axum_extra::extract::cookie::CookieJar;

use crate::web::{
    AppState, AuthUser, auth,
    templates::{PageLayout, escape_html, render_page},
};

pub async fn landing_page(State(state): State<AppState>, jar: CookieJar) -> Html<String> {
    let user = auth::current_user(&state, &jar).await;
    Html(render_home(user.as_ref()))
}

fn render_home(user: Option<&AuthUser>) -> String {
    let cards = [
        (
            "Browse scholarships",
            "Search every listing by name or country and sort by deadline.",
            "/scholarships",
        ),
        (
            "Check eligibility",
            "Enter your destination, level, field and GPA to see which listings fit.",
            "/eligibility",
        ),
    ];

    let card_html = cards
        .iter()
        .map(|(title, description, href)| {
            format!(
                r#"<a class="panel" style="display:block; text-decoration:none; color:inherit;" href="{href}"><h2>{title}</h2><p class="note">{description}</p></a>"#,
                title = escape_html(title),
                description = escape_html(description),
                href = href,
            )
        })
        .collect::<String>();

    let greeting = match user {
        Some(user) => format!("Welcome back, {}.", escape_html(&user.email)),
        None => "Find funding for your studies abroad.".to_string(),
    };

    let body = format!(
        r#"        <section>
            <h1>Scholarship finder</h1>
            <p class="note">{greeting}</p>
        </section>
        <section style="display:grid; gap:1.5rem; grid-template-columns: repeat(auto-fit, minmax(260px, 1fr));">
            {card_html}
        </section>"#,
    );

    render_page(PageLayout {
        title: "Home",
        user,
        body_html: Cow::Owned(body),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_greets_signed_in_user() {
        let user = AuthUser {
            id: 2,
            email: "student@example.org".to_string(),
            is_admin: false,
        };
        let html = render_home(Some(&user));
        assert!(html.contains("Welcome back, student@example.org."));
        assert!(html.contains(r#"href="/eligibility""#));
    }
}
