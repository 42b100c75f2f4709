mod auth;
mod dashboard;
mod scholarships;
mod types;

pub use auth::{admin_login_page, process_admin_login};
pub use dashboard::dashboard;
pub use scholarships::{
    create_scholarship, edit_scholarship_page, new_scholarship_page, update_scholarship,
};
