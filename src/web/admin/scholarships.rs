use std::borrow::Cow;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{error, info};

use crate::{
    listings::{Scholarship, encode_checklist, parse_gpa},
    web::{
        AppState, AuthUser,
        data::{fetch_scholarship, insert_scholarship, update_scholarship as update_row},
        models::ScholarshipDraft,
        templates::{PageLayout, escape_html, render_error_page, render_page},
        uploads::{FileNaming, FormSubmission, read_form_submission, store_upload},
    },
};

use super::auth::require_admin_user;

const IMAGE_FIELD: &str = "image_file";
const BROCHURE_FIELD: &str = "brochure_file";
const MISSING_REQUIRED: &str = "Name, country and link are required.";

/// `GET /admin/add`
pub async fn new_scholarship_page(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Html<String>, Redirect> {
    let admin = require_admin_user(&state, &jar).await?;
    Ok(Html(render_form_page(
        &admin,
        FormTarget::Create,
        &ScholarshipDraft::default(),
        None,
    )))
}

/// `POST /admin/add`
pub async fn create_scholarship(
    State(state): State<AppState>,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<Redirect, Response> {
    let admin = require_admin_user(&state, &jar)
        .await
        .map_err(IntoResponse::into_response)?;

    let submission = read_submission(multipart).await?;
    let mut draft = match draft_from_submission(&submission) {
        Ok(draft) => draft,
        Err(message) => {
            let values = values_from_submission(&submission);
            return Err(form_error(&admin, FormTarget::Create, &values, message));
        }
    };

    if let Err(message) = attach_uploads(&state, &submission, &mut draft).await {
        return Err(form_error(&admin, FormTarget::Create, &draft, message));
    }

    match insert_scholarship(state.pool_ref(), &draft).await {
        Ok(id) => {
            info!(id, admin_id = admin.id, name = %draft.name, "scholarship created");
            Ok(Redirect::to("/admin?status=created"))
        }
        Err(err) => {
            error!(?err, admin_id = admin.id, "failed to insert scholarship");
            Err(server_error())
        }
    }
}

/// `GET /admin/edit/:id`
pub async fn edit_scholarship_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<Html<String>, Redirect> {
    let admin = require_admin_user(&state, &jar).await?;
    let existing = load_existing(&state, id).await?;

    Ok(Html(render_form_page(
        &admin,
        FormTarget::Edit(id),
        &draft_from_listing(&existing),
        None,
    )))
}

/// `POST /admin/edit/:id`. Replaces every field; stored files survive unless replaced.
pub async fn update_scholarship(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Redirect, Response> {
    let admin = require_admin_user(&state, &jar)
        .await
        .map_err(IntoResponse::into_response)?;
    let existing = load_existing(&state, id)
        .await
        .map_err(IntoResponse::into_response)?;

    let submission = read_submission(multipart).await?;
    let mut draft = match draft_from_submission(&submission) {
        Ok(draft) => draft,
        Err(message) => {
            let mut values = values_from_submission(&submission);
            values.image_filename = existing.image_filename.clone();
            values.brochure_filename = existing.brochure_filename.clone();
            return Err(form_error(&admin, FormTarget::Edit(id), &values, message));
        }
    };
    draft.image_filename = existing.image_filename;
    draft.brochure_filename = existing.brochure_filename;

    if let Err(message) = attach_uploads(&state, &submission, &mut draft).await {
        return Err(form_error(&admin, FormTarget::Edit(id), &draft, message));
    }

    match update_row(state.pool_ref(), id, &draft).await {
        Ok(0) => Ok(Redirect::to("/admin?error=not_found")),
        Ok(_) => {
            info!(id, admin_id = admin.id, "scholarship updated");
            Ok(Redirect::to("/admin?status=updated"))
        }
        Err(err) => {
            error!(?err, id, "failed to update scholarship");
            Err(server_error())
        }
    }
}

async fn load_existing(state: &AppState, id: i64) -> Result<Scholarship, Redirect> {
    match fetch_scholarship(state.pool_ref(), id).await {
        Ok(Some(row)) => Ok(Scholarship::from(row)),
        Ok(None) => Err(Redirect::to("/admin")),
        Err(err) => {
            error!(?err, id, "failed to load scholarship for editing");
            Err(Redirect::to("/admin?error=unknown"))
        }
    }
}

async fn read_submission(multipart: Multipart) -> Result<FormSubmission, Response> {
    read_form_submission(multipart).await.map_err(|err| {
        error!(error = %err, "failed to read scholarship form");
        (
            StatusCode::BAD_REQUEST,
            Html(render_error_page("Upload failed", err.message())),
        )
            .into_response()
    })
}

async fn attach_uploads(
    state: &AppState,
    submission: &FormSubmission,
    draft: &mut ScholarshipDraft,
) -> Result<(), &'static str> {
    let uploads = [
        (IMAGE_FIELD, FileNaming::Image),
        (BROCHURE_FIELD, FileNaming::Brochure),
    ];

    for (field, naming) in uploads {
        let Some(file) = submission.file_for(field) else {
            continue;
        };

        let stored = store_upload(state.upload_dir(), naming, &draft.name, file)
            .await
            .map_err(|err| {
                error!(error = %err, field, "failed to store upload");
                "The uploaded file could not be saved."
            })?;

        match naming {
            FileNaming::Image => draft.image_filename = Some(stored),
            FileNaming::Brochure => draft.brochure_filename = Some(stored),
        }
    }

    Ok(())
}

fn text(submission: &FormSubmission, field: &str) -> String {
    submission
        .first_text(field)
        .map(str::trim)
        .unwrap_or("")
        .to_string()
}

/// Raw form values, trimmed, used to refill the form after a validation error.
fn values_from_submission(submission: &FormSubmission) -> ScholarshipDraft {
    let deadline = text(submission, "deadline");
    ScholarshipDraft {
        name: text(submission, "name"),
        country: text(submission, "country"),
        university: text(submission, "university"),
        level: text(submission, "level"),
        field: text(submission, "field"),
        tags: text(submission, "tags"),
        deadline: (!deadline.is_empty()).then_some(deadline),
        link: text(submission, "link"),
        checklist: text(submission, "checklist"),
        min_gpa: parse_gpa(&text(submission, "min_gpa")),
        is_international_only: submission.has_field("is_international_only"),
        image_filename: None,
        brochure_filename: None,
    }
}

pub(crate) fn draft_from_submission(
    submission: &FormSubmission,
) -> Result<ScholarshipDraft, &'static str> {
    let draft = values_from_submission(submission);
    if draft.name.is_empty() || draft.country.is_empty() || draft.link.is_empty() {
        return Err(MISSING_REQUIRED);
    }
    Ok(draft)
}

fn draft_from_listing(item: &Scholarship) -> ScholarshipDraft {
    ScholarshipDraft {
        name: item.name.clone(),
        country: item.country.clone(),
        university: item.university.clone().unwrap_or_default(),
        level: item.level.clone().unwrap_or_default(),
        field: item.field.clone().unwrap_or_default(),
        tags: item.tags.clone().unwrap_or_default(),
        deadline: item.deadline.clone(),
        link: item.link.clone(),
        checklist: encode_checklist(&item.checklist),
        min_gpa: item.min_gpa,
        is_international_only: item.is_international_only,
        image_filename: item.image_filename.clone(),
        brochure_filename: item.brochure_filename.clone(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FormTarget {
    Create,
    Edit(i64),
}

impl FormTarget {
    fn action(self) -> String {
        match self {
            FormTarget::Create => "/admin/add".to_string(),
            FormTarget::Edit(id) => format!("/admin/edit/{id}"),
        }
    }

    fn heading(self) -> &'static str {
        match self {
            FormTarget::Create => "Add scholarship",
            FormTarget::Edit(_) => "Edit scholarship",
        }
    }
}

fn form_error(
    admin: &AuthUser,
    target: FormTarget,
    values: &ScholarshipDraft,
    message: &str,
) -> Response {
    Html(render_form_page(admin, target, values, Some(message))).into_response()
}

fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(render_error_page(
            "Server error",
            "The scholarship could not be saved.",
        )),
    )
        .into_response()
}

fn render_form_page(
    admin: &AuthUser,
    target: FormTarget,
    values: &ScholarshipDraft,
    error: Option<&str>,
) -> String {
    let flash = error
        .map(|message| format!(r#"<div class="flash error">{}</div>"#, escape_html(message)))
        .unwrap_or_default();

    let current_file = |label: &str, name: Option<&str>| {
        name.map(|name| {
            format!(
                r#"<p class="note">Current {label}: {}</p>"#,
                escape_html(name)
            )
        })
        .unwrap_or_default()
    };

    let input = |name: &str, label: &str, kind: &str, value: &str, required: bool| {
        format!(
            r#"<label for="{name}">{label}</label><input id="{name}" type="{kind}" name="{name}" value="{value}"{required}>"#,
            value = escape_html(value),
            required = if required { " required" } else { "" },
        )
    };

    let min_gpa = values.min_gpa.map(|gpa| gpa.to_string()).unwrap_or_default();

    let body = format!(
        r#"        <section class="panel">
            <h2>{heading}</h2>
            {flash}
            <form method="post" action="{action}" enctype="multipart/form-data">
                {name}
                {country}
                {university}
                {level}
                {field}
                {tags}
                {deadline}
                {link}
                <label for="checklist">Checklist (one item per line)</label>
                <textarea id="checklist" name="checklist">{checklist}</textarea>
                {min_gpa}
                <label class="checkbox"><input type="checkbox" name="is_international_only"{international}> International students only</label>
                <label for="image_file">Image</label>
                <input id="image_file" type="file" name="image_file" accept="image/*">
                {current_image}
                <label for="brochure_file">Brochure</label>
                <input id="brochure_file" type="file" name="brochure_file">
                {current_brochure}
                <p><button type="submit">Save</button> <a href="/admin">Cancel</a></p>
            </form>
        </section>"#,
        heading = target.heading(),
        flash = flash,
        action = target.action(),
        name = input("name", "Name", "text", &values.name, true),
        country = input("country", "Country", "text", &values.country, true),
        university = input("university", "University", "text", &values.university, false),
        level = input("level", "Level", "text", &values.level, false),
        field = input("field", "Field", "text", &values.field, false),
        tags = input("tags", "Tags", "text", &values.tags, false),
        deadline = input(
            "deadline",
            "Deadline (YYYY-MM-DD)",
            "text",
            values.deadline.as_deref().unwrap_or(""),
            false
        ),
        link = input("link", "Link", "url", &values.link, true),
        checklist = escape_html(&values.checklist),
        min_gpa = input("min_gpa", "Minimum GPA", "text", &min_gpa, false),
        international = if values.is_international_only { " checked" } else { "" },
        current_image = current_file("image", values.image_filename.as_deref()),
        current_brochure = current_file("brochure", values.brochure_filename.as_deref()),
    );

    render_page(PageLayout {
        title: target.heading(),
        user: Some(admin),
        body_html: Cow::Owned(body),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{listings::decode_checklist, web::uploads::PendingFile};

    fn submission(fields: &[(&str, &str)]) -> FormSubmission {
        let mut submission = FormSubmission::default();
        for (name, value) in fields {
            submission
                .text_fields
                .entry(name.to_string())
                .or_default()
                .push(value.to_string());
        }
        submission
    }

    #[test]
    fn required_fields_are_enforced() {
        let missing_link = submission(&[("name", "Vanier"), ("country", "Canada"), ("link", "  ")]);
        assert_eq!(draft_from_submission(&missing_link), Err(MISSING_REQUIRED));
    }

    #[test]
    fn optional_fields_are_normalized() {
        let form = submission(&[
            ("name", " Vanier Graduate "),
            ("country", "Canada"),
            ("link", "https://vanier.gc.ca"),
            ("deadline", " "),
            ("min_gpa", "abc"),
            ("checklist", "  CV\nResearch proposal\n"),
            ("is_international_only", "on"),
        ]);
        let draft = draft_from_submission(&form).expect("valid");

        assert_eq!(draft.name, "Vanier Graduate");
        assert_eq!(draft.deadline, None);
        assert_eq!(draft.min_gpa, None);
        assert!(draft.is_international_only);
        assert_eq!(
            decode_checklist(Some(&draft.checklist)),
            vec!["CV".to_string(), "Research proposal".to_string()]
        );
    }

    #[test]
    fn unchecked_checkbox_means_not_international() {
        let form = submission(&[
            ("name", "DAAD"),
            ("country", "Germany"),
            ("link", "https://daad.de"),
            ("min_gpa", "3.2"),
        ]);
        let draft = draft_from_submission(&form).expect("valid");
        assert!(!draft.is_international_only);
        assert_eq!(draft.min_gpa, Some(3.2));
    }

    #[test]
    fn listing_round_trips_into_form_values() {
        let mut item = crate::listings::sample(5, "Chevening", "United Kingdom");
        item.checklist = vec!["Passport".to_string(), "Essay".to_string()];
        item.image_filename = Some("img_Chevening_cover.png".to_string());

        let draft = draft_from_listing(&item);
        assert_eq!(draft.checklist, "Passport\nEssay");
        assert_eq!(draft.university, "");
        assert_eq!(draft.image_filename.as_deref(), Some("img_Chevening_cover.png"));
    }

    #[test]
    fn edit_form_is_prefilled() {
        let admin = AuthUser {
            id: 1,
            email: "admin@academicachievers.app".to_string(),
            is_admin: true,
        };
        let mut values = ScholarshipDraft {
            name: "Erasmus \"Mundus\"".to_string(),
            min_gpa: Some(3.5),
            ..ScholarshipDraft::default()
        };
        values.brochure_filename = Some("doc_Erasmus_guide.pdf".to_string());

        let html = render_form_page(&admin, FormTarget::Edit(12), &values, Some(MISSING_REQUIRED));
        assert!(html.contains(r#"action="/admin/edit/12""#));
        assert!(html.contains("Erasmus &quot;Mundus&quot;"));
        assert!(html.contains(r#"value="3.5""#));
        assert!(html.contains("Current brochure: doc_Erasmus_guide.pdf"));
        assert!(html.contains(MISSING_REQUIRED));
    }

    #[test]
    fn submission_file_lookup_ignores_other_fields() {
        let mut form = submission(&[("name", "X")]);
        form.files.push(PendingFile {
            field_name: BROCHURE_FIELD.to_string(),
            original_name: "guide.pdf".to_string(),
            bytes: b"%PDF".to_vec(),
        });
        assert!(form.file_for(IMAGE_FIELD).is_none());
        assert!(form.file_for(BROCHURE_FIELD).is_some());
    }
}
