// Administration des sessions de la passerelle WhatsApp.
// Toutes ces routes exigent le header X-Admin-Token (extracteur AdminAuth).

use actix_web::{HttpResponse, delete, get, post, web};
use serde::Deserialize;

use crate::errors::ApiError;
use crate::middleware::AdminAuth;
use crate::services::whatsapp::WhatsAppProvider;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSessionRequest {
    pub session_id: String,
    #[serde(default)]
    pub read_incoming_messages: bool,
    #[serde(default)]
    pub sync_full_history: bool,
}

/// GET /admin/whatsapp/sessions - Lister les sessions de la passerelle
#[get("/sessions")]
pub async fn list_sessions(
    _admin: AdminAuth,
    whatsapp: web::Data<WhatsAppProvider>,
) -> Result<HttpResponse, ApiError> {
    let response = whatsapp.list_sessions().await?;
    Ok(HttpResponse::Ok().json(response))
}

/// GET /admin/whatsapp/sessions/{session_id} - État d'une session
#[get("/sessions/{session_id}")]
pub async fn get_session(
    _admin: AdminAuth,
    path: web::Path<String>,
    whatsapp: web::Data<WhatsAppProvider>,
) -> Result<HttpResponse, ApiError> {
    let response = whatsapp.find_session(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// POST /admin/whatsapp/sessions - Créer une session (retourne le QR)
#[post("/sessions")]
pub async fn add_session(
    _admin: AdminAuth,
    body: web::Json<AddSessionRequest>,
    whatsapp: web::Data<WhatsAppProvider>,
) -> Result<HttpResponse, ApiError> {
    let response = whatsapp
        .add_session(
            &body.session_id,
            body.read_incoming_messages,
            body.sync_full_history,
        )
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

/// DELETE /admin/whatsapp/sessions/{session_id} - Supprimer une session
#[delete("/sessions/{session_id}")]
pub async fn delete_session(
    _admin: AdminAuth,
    path: web::Path<String>,
    whatsapp: web::Data<WhatsAppProvider>,
) -> Result<HttpResponse, ApiError> {
    let response = whatsapp.delete_session(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub fn admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin/whatsapp")
            .service(list_sessions)
            .service(get_session)
            .service(add_session)
            .service(delete_session),
    );
}
