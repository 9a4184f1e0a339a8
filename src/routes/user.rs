use actix_web::{HttpResponse, get, put, web};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::errors::ApiError;
use crate::middleware::AuthUser;
use crate::models::users::{self, Entity as Users};
use crate::utils::password;

#[derive(Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
}

#[derive(Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[derive(Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[serde(rename = "currentPassword")]
    #[validate(length(min = 1))]
    pub current_password: String,
    #[serde(rename = "newPassword")]
    #[validate(length(min = 8))]
    pub new_password: String,
}

async fn load_user(db: &DatabaseConnection, user_id: Uuid) -> Result<users::Model, ApiError> {
    Users::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("User not found"))
}

/// GET /user/profile - Profil de l'utilisateur connecté (PROTÉGÉE)
#[get("/profile")]
pub async fn get_profile(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let user = load_user(db.get_ref(), auth_user.user_id).await?;

    Ok(HttpResponse::Ok().json(ProfileResponse {
        id: user.id,
        name: user.name,
        phone: user.phone,
    }))
}

/// PUT /user/profile - Modifier son nom (PROTÉGÉE)
#[put("/profile")]
pub async fn update_profile(
    auth_user: AuthUser,
    body: web::Json<UpdateProfileRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;

    let user = load_user(db.get_ref(), auth_user.user_id).await?;

    let mut active: users::ActiveModel = user.into();
    active.name = Set(body.name.trim().to_string());
    active.updated_at = Set(Utc::now());
    active.update(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Profile updated successfully"
    })))
}

/// PUT /user/password - Changer son mot de passe (PROTÉGÉE)
#[put("/password")]
pub async fn change_password(
    auth_user: AuthUser,
    body: web::Json<ChangePasswordRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;

    let user = load_user(db.get_ref(), auth_user.user_id).await?;

    // Vérifier l'ancien mot de passe
    if !password::verify_password(&body.current_password, &user.password_hash)? {
        return Err(ApiError::Unauthorized("Current password is incorrect"));
    }

    // Hasher et enregistrer le nouveau
    let new_hash = password::hash_password(&body.new_password)?;

    let mut active: users::ActiveModel = user.into();
    active.password_hash = Set(new_hash);
    active.updated_at = Set(Utc::now());
    active.update(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Password updated successfully"
    })))
}

pub fn user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user")
            .service(get_profile)
            .service(update_profile)
            .service(change_password),
    );
}
