use sqlx::PgPool;

use super::models::{EligibilityOptions, ScholarshipDraft, ScholarshipRow};

const SCHOLARSHIP_COLUMNS: &str = "id, name, country, university, level, field, tags, deadline, link, checklist, min_gpa, is_international_only, image_filename, brochure_filename";

pub async fn fetch_scholarships(pool: &PgPool) -> sqlx::Result<Vec<ScholarshipRow>> {
    sqlx::query_as::<_, ScholarshipRow>(&format!(
        "SELECT {SCHOLARSHIP_COLUMNS} FROM scholarships ORDER BY id"
    ))
    .fetch_all(pool)
    .await
}

pub async fn fetch_scholarships_newest_first(pool: &PgPool) -> sqlx::Result<Vec<ScholarshipRow>> {
    sqlx::query_as::<_, ScholarshipRow>(&format!(
        "SELECT {SCHOLARSHIP_COLUMNS} FROM scholarships ORDER BY id DESC"
    ))
    .fetch_all(pool)
    .await
}

pub async fn fetch_scholarship(pool: &PgPool, id: i64) -> sqlx::Result<Option<ScholarshipRow>> {
    sqlx::query_as::<_, ScholarshipRow>(&format!(
        "SELECT {SCHOLARSHIP_COLUMNS} FROM scholarships WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn count_scholarships(pool: &PgPool) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM scholarships")
        .fetch_one(pool)
        .await
}

pub async fn insert_scholarship(pool: &PgPool, draft: &ScholarshipDraft) -> sqlx::Result<i64> {
    sqlx::query_scalar(
        "INSERT INTO scholarships
            (name, country, university, level, field, tags, deadline, link,
             checklist, min_gpa, is_international_only, image_filename, brochure_filename)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
         RETURNING id",
    )
    .bind(&draft.name)
    .bind(&draft.country)
    .bind(&draft.university)
    .bind(&draft.level)
    .bind(&draft.field)
    .bind(&draft.tags)
    .bind(draft.deadline.as_deref())
    .bind(&draft.link)
    .bind(&draft.checklist)
    .bind(draft.min_gpa)
    .bind(draft.is_international_only)
    .bind(draft.image_filename.as_deref())
    .bind(draft.brochure_filename.as_deref())
    .fetch_one(pool)
    .await
}

/// Replaces every column except `id`. Returns the number of rows touched.
pub async fn update_scholarship(
    pool: &PgPool,
    id: i64,
    draft: &ScholarshipDraft,
) -> sqlx::Result<u64> {
    sqlx::query(
        "UPDATE scholarships
         SET name = $2, country = $3, university = $4, level = $5, field = $6, tags = $7,
             deadline = $8, link = $9, checklist = $10, min_gpa = $11,
             is_international_only = $12, image_filename = $13, brochure_filename = $14
         WHERE id = $1",
    )
    .bind(id)
    .bind(&draft.name)
    .bind(&draft.country)
    .bind(&draft.university)
    .bind(&draft.level)
    .bind(&draft.field)
    .bind(&draft.tags)
    .bind(draft.deadline.as_deref())
    .bind(&draft.link)
    .bind(&draft.checklist)
    .bind(draft.min_gpa)
    .bind(draft.is_international_only)
    .bind(draft.image_filename.as_deref())
    .bind(draft.brochure_filename.as_deref())
    .execute(pool)
    .await
    .map(|result| result.rows_affected())
}

pub async fn fetch_eligibility_options(pool: &PgPool) -> sqlx::Result<EligibilityOptions> {
    Ok(EligibilityOptions {
        countries: fetch_distinct(pool, "country").await?,
        levels: fetch_distinct(pool, "level").await?,
        fields: fetch_distinct(pool, "field").await?,
    })
}

// Only ever called with the fixed column names above.
async fn fetch_distinct(pool: &PgPool, column: &'static str) -> sqlx::Result<Vec<String>> {
    sqlx::query_scalar(&format!(
        "SELECT DISTINCT {column} FROM scholarships WHERE {column} IS NOT NULL AND {column} <> '' ORDER BY {column}"
    ))
    .fetch_all(pool)
    .await
}
