use actix_web::{Error, FromRequest, HttpRequest, dev::Payload, web};
use futures::future::{Ready, ready};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::ApiError;
use crate::utils::jwt;

/// Structure qui contient les infos de l'utilisateur authentifié.
/// Produite UNE fois par la validation du JWT, puis passée explicitement
/// aux handlers : pas d'identité transportée en valeur non typée.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub phone: String,
}

/// Implémentation de FromRequest pour AuthUser
/// Cela permet à Actix-Web d'extraire automatiquement AuthUser des requêtes
impl FromRequest for AuthUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        // 1. Extraire le header Authorization
        let auth_header = match req.headers().get("Authorization") {
            Some(header) => header,
            None => {
                return ready(Err(
                    ApiError::Unauthorized("Authorization header required").into()
                ));
            }
        };

        // 2. Convertir le header en string
        let auth_str = match auth_header.to_str() {
            Ok(s) => s,
            Err(_) => {
                return ready(Err(
                    ApiError::Unauthorized("Invalid Authorization header").into()
                ));
            }
        };

        // 3. Extraire le token (format: "Bearer <token>")
        let token = match auth_str.strip_prefix("Bearer ") {
            Some(token) => token,
            None => {
                return ready(Err(ApiError::Unauthorized(
                    "Invalid Authorization format (expected: Bearer <token>)",
                )
                .into()));
            }
        };

        // 4. Récupérer le secret depuis la config injectée
        let config = match req.app_data::<web::Data<Config>>() {
            Some(config) => config,
            None => {
                tracing::error!("Config not registered in app data");
                return ready(Err(ApiError::Unauthorized("Invalid token").into()));
            }
        };

        // 5. Vérifier le token JWT
        let claims = match jwt::validate_token(token, &config.jwt_secret) {
            Ok(claims) => claims,
            Err(_) => {
                // Message uniforme : signature invalide, token expiré et
                // algorithme inattendu sont indistinguables pour le client
                return ready(Err(ApiError::Unauthorized("Invalid token").into()));
            }
        };

        // 6. Créer et retourner AuthUser
        ready(Ok(AuthUser {
            user_id: claims.sub,
            phone: claims.phone,
        }))
    }
}
