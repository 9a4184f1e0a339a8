// Flux de vérification téléphone :
//   send-code -> verify-code (échange code contre token) -> verify-token
//
// Politique d'erreurs : mauvais code, code expiré et code déjà consommé
// renvoient tous la même réponse 401 générique.

use actix_web::{HttpResponse, post, web};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use validator::Validate;

use crate::errors::ApiError;
use crate::services::otp_service::OtpService;
use crate::services::whatsapp::WhatsAppProvider;

#[derive(Deserialize, Validate)]
pub struct SendCodeRequest {
    #[validate(length(min = 9, max = 9))]
    pub phone: String,
}

#[derive(Deserialize, Validate)]
pub struct VerifyCodeRequest {
    #[validate(length(min = 9, max = 9))]
    pub phone: String,
    #[validate(length(equal = 6))]
    pub code: String,
}

#[derive(Deserialize, Validate)]
pub struct VerifyTokenRequest {
    #[validate(length(equal = 64))]
    pub token: String,
}

/// POST /verify/send-code - Générer et envoyer un code OTP (PUBLIC)
#[post("/send-code")]
pub async fn send_code(
    body: web::Json<SendCodeRequest>,
    db: web::Data<DatabaseConnection>,
    whatsapp: web::Data<WhatsAppProvider>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;

    let code = OtpService::request_code(db.get_ref(), &body.phone).await?;

    // Un échec d'envoi n'annule pas le code déjà persisté : sur un échec
    // ambigu le message a pu être livré quand même
    whatsapp.send_code(&code, &body.phone).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Verification code sent"
    })))
}

/// POST /verify/verify-code - Échanger un code contre un token (PUBLIC)
#[post("/verify-code")]
pub async fn verify_code(
    body: web::Json<VerifyCodeRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;

    let token = OtpService::verify_code(db.get_ref(), &body.phone, &body.code).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "token": token
    })))
}

/// POST /verify/verify-token - Consommer un token de vérification (PUBLIC)
#[post("/verify-token")]
pub async fn verify_token(
    body: web::Json<VerifyTokenRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;

    let valid = OtpService::check_token(db.get_ref(), &body.token).await?;

    if !valid {
        return Err(ApiError::Unauthorized("Invalid or expired token"));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "valid": true
    })))
}

pub fn verify_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/verify")
            .service(send_code)
            .service(verify_code)
            .service(verify_token),
    );
}
