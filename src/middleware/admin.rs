use actix_web::{Error, FromRequest, HttpRequest, dev::Payload, web};
use futures::future::{Ready, ready};

use crate::config::Config;
use crate::errors::ApiError;

/// Extracteur pour les routes d'administration.
/// Compare le header X-Admin-Token au token configuré.
#[derive(Debug, Clone)]
pub struct AdminAuth;

impl FromRequest for AdminAuth {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let config = match req.app_data::<web::Data<Config>>() {
            Some(config) => config,
            None => {
                tracing::error!("Config not registered in app data");
                return ready(Err(ApiError::Unauthorized("Invalid admin token").into()));
            }
        };

        // Un ADMIN_TOKEN vide désactive toutes les routes admin
        if config.admin_token.is_empty() {
            return ready(Err(ApiError::Unauthorized("Invalid admin token").into()));
        }

        let provided = req
            .headers()
            .get("X-Admin-Token")
            .and_then(|h| h.to_str().ok());

        match provided {
            Some(token) if token == config.admin_token => ready(Ok(AdminAuth)),
            _ => ready(Err(ApiError::Unauthorized("Invalid admin token").into())),
        }
    }
}
