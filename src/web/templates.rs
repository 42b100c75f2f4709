use std::borrow::Cow;

use chrono::{Datelike, Utc};

use crate::web::AuthUser;

const SITE_TITLE: &str = "Academic Achievers";

const PAGE_BASE_STYLES: &str = r#"
        :root { color-scheme: light; }
        body { font-family: "Helvetica Neue", Arial, sans-serif; margin: 0; background: #f8fafc; color: #0f172a; min-height: 100vh; display: flex; flex-direction: column; }
        header { background: #ffffff; padding: 1.25rem 1.5rem; border-bottom: 1px solid #e2e8f0; }
        .header-bar { display: flex; justify-content: space-between; align-items: center; flex-wrap: wrap; gap: 1rem; max-width: 1100px; margin: 0 auto; }
        .brand { font-size: 1.35rem; font-weight: 700; color: #0f172a; text-decoration: none; }
        nav { display: flex; gap: 0.75rem; align-items: center; flex-wrap: wrap; }
        nav a { color: #1d4ed8; text-decoration: none; font-weight: 600; }
        nav a:hover { text-decoration: underline; }
        nav span { color: #475569; font-size: 0.95rem; }
        .admin-link { display: inline-flex; align-items: center; color: #0f172a; background: #fee2e2; border: 1px solid #fecaca; padding: 0.35rem 0.8rem; border-radius: 999px; text-decoration: none; font-weight: 600; }
        .logout-form { display: inline; margin: 0; }
        .logout-form button { padding: 0.4rem 0.9rem; border-radius: 999px; }
        main { flex: 1; padding: 2rem 1.5rem; max-width: 1100px; margin: 0 auto; width: 100%; box-sizing: border-box; }
        section { margin-bottom: 2.5rem; }
        .panel { background: #ffffff; border-radius: 12px; border: 1px solid #e2e8f0; padding: 1.5rem; box-shadow: 0 18px 40px rgba(15, 23, 42, 0.08); }
        .panel h2 { margin-top: 0; }
        label { display: block; margin: 0.9rem 0 0.4rem; font-weight: 600; color: #0f172a; }
        input[type="text"], input[type="email"], input[type="password"], input[type="url"], input[type="number"], input[type="date"], input[type="file"], select, textarea { width: 100%; padding: 0.7rem; border-radius: 8px; border: 1px solid #cbd5f5; background: #f8fafc; color: #0f172a; box-sizing: border-box; font-size: 0.95rem; }
        textarea { min-height: 7rem; }
        input:focus, select:focus, textarea:focus { outline: none; border-color: #2563eb; box-shadow: 0 0 0 3px rgba(37, 99, 235, 0.12); }
        .checkbox { display: flex; align-items: center; gap: 0.5rem; font-weight: 600; margin-top: 1rem; }
        .filters { display: grid; gap: 1rem; grid-template-columns: repeat(auto-fit, minmax(180px, 1fr)); align-items: end; }
        .filters label { margin-top: 0; }
        button { padding: 0.75rem 1.2rem; border: none; border-radius: 8px; background: #2563eb; color: #ffffff; font-weight: 600; cursor: pointer; transition: background 0.15s ease; }
        button:hover { background: #1d4ed8; }
        table { width: 100%; border-collapse: collapse; margin-top: 1.5rem; background: #ffffff; border: 1px solid #e2e8f0; border-radius: 12px; overflow: hidden; }
        th, td { padding: 0.75rem 1rem; border-bottom: 1px solid #e2e8f0; text-align: left; vertical-align: top; }
        th { background: #f1f5f9; color: #0f172a; font-weight: 600; }
        td a { color: #2563eb; text-decoration: none; font-weight: 600; }
        .flash { padding: 1rem 1.25rem; border-radius: 10px; margin-bottom: 1.5rem; font-weight: 600; border: 1px solid transparent; }
        .flash.success { background: #ecfdf3; border-color: #bbf7d0; color: #166534; }
        .flash.error { background: #fef2f2; border-color: #fecaca; color: #b91c1c; }
        .note { color: #475569; font-size: 0.95rem; line-height: 1.6; }
        .tag { display: inline-flex; padding: 0.2rem 0.65rem; border-radius: 999px; font-size: 0.8rem; font-weight: 600; background: #e0f2fe; color: #1d4ed8; }
        .checklist li { margin: 0.3rem 0; }
        .cover { max-width: 100%; border-radius: 12px; margin-bottom: 1rem; }
        .app-footer { margin-top: 3rem; text-align: center; font-size: 0.85rem; color: #94a3b8; }
        @media (max-width: 768px) {
            header { padding: 1rem; }
            main { padding: 1.5rem 1rem; }
            table { font-size: 0.9rem; }
            th, td { padding: 0.5rem; }
        }
"#;

pub struct PageLayout<'a> {
    pub title: &'a str,
    pub user: Option<&'a AuthUser>,
    pub body_html: Cow<'a, str>,
}

pub fn render_page(layout: PageLayout<'_>) -> String {
    let PageLayout {
        title,
        user,
        body_html,
    } = layout;

    let account_html = match user {
        Some(user) => {
            let admin_link = if user.is_admin {
                r#"<a class="admin-link" href="/admin">Admin</a>"#
            } else {
                ""
            };
            format!(
                r#"<span>Signed in as <strong>{email}</strong></span>{admin_link}<form class="logout-form" method="post" action="/logout"><button type="submit">Log out</button></form>"#,
                email = escape_html(&user.email),
                admin_link = admin_link,
            )
        }
        None => r#"<a href="/login">Log in</a><a href="/signup">Sign up</a>"#.to_string(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title} · {site}</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>
{styles}
    </style>
</head>
<body>
    <header>
        <div class="header-bar">
            <a class="brand" href="/">{site}</a>
            <nav>
                <a href="/scholarships">Scholarships</a>
                <a href="/eligibility">Eligibility</a>
                {account_html}
            </nav>
        </div>
    </header>
    <main>
{body_html}
        {footer}
    </main>
</body>
</html>"#,
        title = escape_html(title),
        site = SITE_TITLE,
        styles = PAGE_BASE_STYLES,
        account_html = account_html,
        body_html = body_html,
        footer = render_footer(),
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthPageKind {
    Login,
    Signup,
    AdminLogin,
}

impl AuthPageKind {
    fn heading(self) -> &'static str {
        match self {
            AuthPageKind::Login => "Log in",
            AuthPageKind::Signup => "Create an account",
            AuthPageKind::AdminLogin => "Admin login",
        }
    }

    fn action(self) -> &'static str {
        match self {
            AuthPageKind::Login => "/login",
            AuthPageKind::Signup => "/signup",
            AuthPageKind::AdminLogin => "/admin/login",
        }
    }
}

/// Login, signup and admin login share one form; `error` is shown above it.
pub fn render_auth_page(kind: AuthPageKind, error: Option<&str>, email: &str) -> String {
    let flash = error
        .map(|message| format!(r#"<div class="flash error">{}</div>"#, escape_html(message)))
        .unwrap_or_default();

    let (password_hint, alternate) = match kind {
        AuthPageKind::Login => (
            "",
            r#"<p class="note">No account yet? <a href="/signup">Sign up</a>.</p>"#,
        ),
        AuthPageKind::Signup => (
            r#" minlength="6""#,
            r#"<p class="note">Already registered? <a href="/login">Log in</a>.</p>"#,
        ),
        AuthPageKind::AdminLogin => ("", ""),
    };

    let body = format!(
        r#"        <section class="panel" style="max-width: 480px; margin: 0 auto;">
            <h2>{heading}</h2>
            {flash}
            <form method="post" action="{action}">
                <label for="email">Email</label>
                <input id="email" type="email" name="email" value="{email}" required>
                <label for="password">Password</label>
                <input id="password" type="password" name="password"{password_hint} required>
                <p><button type="submit">{heading}</button></p>
            </form>
            {alternate}
        </section>"#,
        heading = kind.heading(),
        action = kind.action(),
        flash = flash,
        email = escape_html(email),
        password_hint = password_hint,
        alternate = alternate,
    );

    render_page(PageLayout {
        title: kind.heading(),
        user: None,
        body_html: Cow::Owned(body),
    })
}

pub fn render_error_page(title: &str, message: &str) -> String {
    render_page(PageLayout {
        title,
        user: None,
        body_html: Cow::Owned(format!(
            r#"        <section class="panel"><h2>{}</h2><p class="note">{}</p></section>"#,
            escape_html(title),
            escape_html(message)
        )),
    })
}

pub fn render_footer() -> String {
    let current_year = Utc::now().year();
    format!(
        r#"<footer class="app-footer">© {year} {site}</footer>"#,
        year = current_year,
        site = SITE_TITLE,
    )
}

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escapes `value` for use inside a URL query string.
pub fn encode_query_value(value: &str) -> String {
    percent_encode(value, "+")
}

/// Escapes `value` for use as a single URL path segment.
pub fn encode_path_segment(value: &str) -> String {
    percent_encode(value, "%20")
}

fn percent_encode(value: &str, space: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            b' ' => encoded.push_str(space),
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}
