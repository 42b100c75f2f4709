use std::{path::Path, sync::Arc};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::{info, warn};

use crate::{
    config::AppConfig,
    listings::encode_checklist,
    web::{
        auth::{hash_password, insert_user},
        data::{count_scholarships, insert_scholarship},
        models::ScholarshipDraft,
    },
};

#[derive(Clone)]
pub struct AppState {
    pool: PgPool,
    config: Arc<AppConfig>,
}

/// Entry of the optional seed file loaded into an empty catalogue.
#[derive(Debug, Deserialize)]
pub(crate) struct SeedScholarship {
    name: String,
    country: String,
    #[serde(default)]
    deadline: Option<String>,
    link: String,
    #[serde(default)]
    checklist: Vec<String>,
}

impl From<SeedScholarship> for ScholarshipDraft {
    fn from(seed: SeedScholarship) -> Self {
        Self {
            name: seed.name,
            country: seed.country,
            deadline: seed.deadline,
            link: seed.link,
            checklist: encode_checklist(&seed.checklist),
            ..Self::default()
        }
    }
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
            .context("failed to connect to Postgres")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run database migrations")?;

        tokio::fs::create_dir_all(&config.upload_dir)
            .await
            .with_context(|| {
                format!(
                    "failed to ensure upload directory at {}",
                    config.upload_dir.display()
                )
            })?;

        Ok(Self {
            pool,
            config: Arc::new(config),
        })
    }

    /// Creates the bootstrap admin unless some admin account already exists.
    pub async fn ensure_seed_admin(&self) -> Result<()> {
        let has_admin: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE is_admin = TRUE)")
                .fetch_one(&self.pool)
                .await
                .context("failed to verify admin presence")?;

        if has_admin {
            return Ok(());
        }

        let password_hash = hash_password(&self.config.admin_password)
            .map_err(|err| anyhow!("failed to hash seed admin password: {err}"))?;

        insert_user(&self.pool, &self.config.admin_email, &password_hash, true)
            .await
            .context("failed to insert seed admin user")?;

        info!(
            email = %self.config.admin_email,
            "Seeded default admin account. Change its password promptly."
        );

        Ok(())
    }

    /// Loads the seed file into an empty `scholarships` table. A missing file is not an error.
    pub async fn seed_scholarships(&self) -> Result<()> {
        let existing = count_scholarships(&self.pool)
            .await
            .context("failed to count scholarships")?;
        if existing > 0 {
            return Ok(());
        }

        let path = self.config.seed_data_path.as_path();
        let Some(seeds) = read_seed_file(path).await? else {
            warn!(path = %path.display(), "no seed file found; starting with an empty catalogue");
            return Ok(());
        };

        let total = seeds.len();
        for seed in seeds {
            let draft = ScholarshipDraft::from(seed);
            insert_scholarship(&self.pool, &draft)
                .await
                .with_context(|| format!("failed to insert seed scholarship `{}`", draft.name))?;
        }

        info!(count = total, "Seeded scholarships from JSON.");
        Ok(())
    }

    pub fn pool_ref(&self) -> &PgPool {
        &self.pool
    }

    pub fn upload_dir(&self) -> &Path {
        &self.config.upload_dir
    }
}

pub(crate) async fn read_seed_file(path: &Path) -> Result<Option<Vec<SeedScholarship>>> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()));
        }
    };

    let seeds = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse seed file {}", path.display()))?;
    Ok(Some(seeds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn missing_seed_file_is_not_an_error() {
        let dir = tempdir().expect("temp dir");
        let result = read_seed_file(&dir.path().join("absent.json"))
            .await
            .expect("read");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn seed_file_entries_become_drafts() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("seed.json");
        tokio::fs::write(
            &path,
            r#"[{"name":"Vanier","country":"Canada","link":"https://vanier.gc.ca","checklist":["CV","Research proposal"]},
                {"name":"DAAD","country":"Germany","deadline":"2025-10-31","link":"https://daad.de"}]"#,
        )
        .await
        .expect("write seed");

        let seeds = read_seed_file(&path).await.expect("read").expect("present");
        let drafts: Vec<ScholarshipDraft> = seeds.into_iter().map(ScholarshipDraft::from).collect();

        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].checklist, "CV\nResearch proposal");
        assert_eq!(drafts[0].deadline, None);
        assert_eq!(drafts[1].deadline.as_deref(), Some("2025-10-31"));
        assert!(drafts[1].checklist.is_empty());
        assert!(!drafts[1].is_international_only);
    }

    #[tokio::test]
    async fn malformed_seed_file_is_reported() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("seed.json");
        tokio::fs::write(&path, "{not json").await.expect("write seed");
        assert!(read_seed_file(&path).await.is_err());
    }
}
