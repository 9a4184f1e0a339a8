pub mod admin;
pub mod auth;

pub use admin::AdminAuth;
pub use auth::AuthUser;
