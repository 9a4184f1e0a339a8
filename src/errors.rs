// Taxonomie des erreurs API
//
// Toutes les erreurs de vérification (mauvais code, code expiré, code déjà
// consommé) sont rapportées avec le même message générique pour ne pas
// donner d'oracle à un attaquant. Les erreurs internes (BD, passerelle)
// sont loggées côté serveur et jamais exposées au client.

use actix_web::{HttpResponse, http::StatusCode};
use sea_orm::DbErr;
use thiserror::Error;
use validator::ValidationErrors;

use crate::services::whatsapp::WhatsAppError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired code")]
    InvalidOrExpiredCode,

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("Phone number already registered")]
    PhoneAlreadyRegistered,

    #[error("This account is already linked to your profile")]
    AccountAlreadyLinked,

    #[error("{0}")]
    NotFound(&'static str),

    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("messaging gateway error: {0}")]
    Delivery(#[from] WhatsAppError),

    #[error("invariant violation: {0}")]
    Invariant(&'static str),

    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::InvalidOrExpiredCode => "INVALID_OR_EXPIRED",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::PhoneAlreadyRegistered => "PHONE_ALREADY_REGISTERED",
            ApiError::AccountAlreadyLinked => "ACCOUNT_ALREADY_LINKED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Database(_)
            | ApiError::Delivery(_)
            | ApiError::Invariant(_)
            | ApiError::Internal(_) => {
                "INTERNAL_ERROR"
            }
        }
    }

    /// Message renvoyé au client. Les erreurs internes sont masquées.
    fn public_message(&self) -> String {
        match self {
            ApiError::Database(_)
            | ApiError::Delivery(_)
            | ApiError::Invariant(_)
            | ApiError::Internal(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}

impl From<crate::utils::password::PasswordError> for ApiError {
    fn from(_: crate::utils::password::PasswordError) -> Self {
        // Hash mal formé ou dérivation en échec : défaut côté serveur
        ApiError::Internal("credential hashing failure")
    }
}

impl From<crate::utils::jwt::TokenError> for ApiError {
    fn from(err: crate::utils::jwt::TokenError) -> Self {
        match err {
            crate::utils::jwt::TokenError::Signing => ApiError::Internal("token signing failure"),
            crate::utils::jwt::TokenError::Invalid => ApiError::Unauthorized("Invalid token"),
        }
    }
}

impl actix_web::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials
            | ApiError::InvalidOrExpiredCode
            | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::PhoneAlreadyRegistered | ApiError::AccountAlreadyLinked => {
                StatusCode::CONFLICT
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_)
            | ApiError::Delivery(_)
            | ApiError::Invariant(_)
            | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Database(e) => tracing::error!(error = %e, "database failure"),
            ApiError::Delivery(e) => tracing::error!(error = %e, "messaging gateway failure"),
            ApiError::Invariant(msg) => tracing::error!(detail = %msg, "invariant violation"),
            _ => {}
        }

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": {
                "code": self.code(),
                "message": self.public_message(),
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InvalidOrExpiredCode.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::AccountAlreadyLinked.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Database(DbErr::Custom("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_detail_is_masked() {
        let err = ApiError::Database(DbErr::Custom("password=secret".into()));
        assert_eq!(err.public_message(), "Internal server error");
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }
}
