pub mod admin;
pub mod auth;
pub mod health;
pub mod linked_accounts;
pub mod user;
pub mod verify;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(health::health_check)
            .configure(auth::auth_routes)
            .configure(verify::verify_routes)
            .configure(user::user_routes)
            .configure(linked_accounts::linked_account_routes)
            .configure(admin::admin_routes),
    );
}
