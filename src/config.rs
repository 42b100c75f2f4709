use std::{env, path::PathBuf, str::FromStr};

use anyhow::{Context, Result};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_SEED_DATA_PATH: &str = "data/seed_scholarships.json";
const DEFAULT_ADMIN_EMAIL: &str = "admin@academicachievers.app";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Upper bound for multipart submissions on the admin forms.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub seed_data_path: PathBuf,
    pub admin_email: String,
    pub admin_password: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL env var is missing")?;

        Ok(Self {
            database_url,
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS),
            port: parse_or("PORT", DEFAULT_PORT),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_UPLOAD_DIR)),
            seed_data_path: env::var("SEED_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_SEED_DATA_PATH)),
            admin_email: env::var("ADMIN_EMAIL")
                .map(|email| email.trim().to_lowercase())
                .unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.to_string()),
            admin_password: env::var("ADMIN_PASSWORD")
                .unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string()),
        })
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    parse_value(env::var(key).ok().as_deref(), default)
}

fn parse_value<T: FromStr>(raw: Option<&str>, default: T) -> T {
    raw.and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}
