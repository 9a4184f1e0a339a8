use actix_web::{HttpResponse, get};

/// GET /api/v1/health - Vérifier que le serveur répond (PUBLIC)
#[get("/health")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
    }))
}
