pub mod admin;
pub mod admin_utils;
pub mod api;
pub mod auth;
pub mod data;
pub mod eligibility;
pub mod landing;
pub mod models;
pub mod responses;
pub mod router;
pub mod scholarships;
pub mod state;
pub mod storage;
pub mod templates;
pub mod uploads;

pub use auth::AuthUser;
pub use responses::{ApiMessage, json_error};
pub use state::AppState;
