use actix_web::{HttpResponse, get, post, web};
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::config::Config;
use crate::errors::ApiError;
use crate::middleware::AuthUser;
use crate::models::users::{self, Column as UserColumn, Entity as Users};
use crate::utils::{jwt, password};

// DTO pour l'inscription
#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 9, max = 15))]
    pub phone: String,
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    #[validate(length(min = 6))]
    pub password: String,
}

// DTO pour la connexion
#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub phone: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub phone: String,
    pub name: String,
}

// Réponse après login/register : paire access + refresh
#[derive(Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
    pub refresh_token: String,
}

// Réponse pour /auth/me
#[derive(Serialize)]
pub struct MeResponse {
    pub user_id: Uuid,
    pub phone: String,
}

fn issue_token_pair(config: &Config, user: &users::Model) -> Result<(String, String), ApiError> {
    let token = jwt::generate_token(
        user.id,
        &user.phone,
        &config.jwt_secret,
        Duration::hours(config.jwt_expiration_hours),
    )?;
    let refresh_token = jwt::generate_token(
        user.id,
        &user.phone,
        &config.jwt_secret,
        Duration::hours(config.refresh_token_expiration_hours),
    )?;
    Ok((token, refresh_token))
}

/// POST /auth/register - Créer un compte (PUBLIC)
#[post("/register")]
pub async fn register(
    body: web::Json<RegisterRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;

    // 1. Vérifier si le numéro est déjà enregistré
    let existing_user = Users::find()
        .filter(UserColumn::Phone.eq(&body.phone))
        .one(db.get_ref())
        .await?;

    if existing_user.is_some() {
        return Err(ApiError::PhoneAlreadyRegistered);
    }

    // 2. Hash le mot de passe
    let password_hash = password::hash_password(&body.password)?;

    // 3. Créer l'utilisateur
    let now = Utc::now();
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        phone: Set(body.phone.clone()),
        name: Set(body.name.trim().to_string()),
        password_hash: Set(password_hash),
        country_code: Set(None),
        preferred_currency: Set("USD".to_string()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db.get_ref())
    .await?;

    // 4. Générer la paire de tokens
    let (token, refresh_token) = issue_token_pair(&config, &user)?;

    Ok(HttpResponse::Created().json(AuthResponse {
        user: UserResponse {
            id: user.id,
            phone: user.phone,
            name: user.name,
        },
        token,
        refresh_token,
    }))
}

/// POST /auth/login - Se connecter (PUBLIC)
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;

    // 1. Trouver l'utilisateur - numéro inconnu et mauvais mot de passe
    // produisent la même réponse
    let user = Users::find()
        .filter(UserColumn::Phone.eq(&body.phone))
        .one(db.get_ref())
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    // 2. Vérifier le mot de passe
    if !password::verify_password(&body.password, &user.password_hash)? {
        return Err(ApiError::InvalidCredentials);
    }

    // 3. Générer la paire de tokens
    let (token, refresh_token) = issue_token_pair(&config, &user)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        user: UserResponse {
            id: user.id,
            phone: user.phone,
            name: user.name,
        },
        token,
        refresh_token,
    }))
}

/// GET /auth/me - Vérifier le token de session (PROTÉGÉE)
#[get("/me")]
pub async fn me(auth_user: AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(MeResponse {
        user_id: auth_user.user_id,
        phone: auth_user.phone,
    })
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(register)
            .service(login)
            .service(me),
    );
}
