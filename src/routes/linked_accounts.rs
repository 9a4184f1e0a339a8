use actix_web::{HttpResponse, delete, get, patch, post, web};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::errors::ApiError;
use crate::middleware::AuthUser;
use crate::models::linked_accounts::{self, Provider};
use crate::services::linked_account_service::{LinkAccountData, LinkedAccountService};

#[derive(Deserialize, Validate)]
pub struct CurrencyDto {
    #[validate(length(min = 1))]
    pub code: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub symbol: String,
}

#[derive(Deserialize, Validate)]
pub struct CredentialsDto {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfoDto {
    #[validate(length(min = 1))]
    pub device_id: String,
    pub device_model: String,
    pub manufacturer: String,
    pub os_version: String,
}

// DTO pour lier un compte
#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LinkAccountRequest {
    pub provider: Provider,
    #[validate(length(min = 1))]
    pub account_id: String,
    #[validate(length(min = 1))]
    pub account_number: String,
    #[validate(length(min = 1))]
    pub account_title: String,
    #[validate(length(min = 1))]
    pub account_type: String,
    #[validate(nested)]
    pub currency: CurrencyDto,
    #[serde(default)]
    pub is_default_account: bool,
    #[validate(nested)]
    pub credentials: CredentialsDto,
    #[validate(nested)]
    pub device_info: DeviceInfoDto,
}

#[derive(Serialize)]
pub struct CurrencyResponse {
    pub code: String,
    pub name: String,
    pub symbol: String,
}

// Réponse compte lié : jamais d'identifiants fournisseur dedans
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: Uuid,
    pub provider: Provider,
    pub account_id: String,
    pub account_number: String,
    pub account_title: String,
    pub account_type: String,
    pub currency: CurrencyResponse,
    pub is_default_account: bool,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync_at: Option<String>,
}

impl From<&linked_accounts::Model> for AccountResponse {
    fn from(account: &linked_accounts::Model) -> Self {
        AccountResponse {
            id: account.id,
            provider: account.provider,
            account_id: account.account_id.clone(),
            account_number: account.account_number.clone(),
            account_title: account.account_title.clone(),
            account_type: account.account_type.clone(),
            currency: CurrencyResponse {
                code: account.currency_code.clone(),
                name: account.currency_name.clone(),
                symbol: account.currency_symbol.clone(),
            },
            is_default_account: account.is_default_account,
            created_at: account.created_at.to_rfc3339(),
            last_sync_at: account.last_sync_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// POST /linked-accounts - Lier un compte mobile money (PROTÉGÉE)
#[post("")]
pub async fn link_account(
    auth_user: AuthUser,
    body: web::Json<LinkAccountRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;
    let body = body.into_inner();

    let data = LinkAccountData {
        provider: body.provider,
        account_id: body.account_id,
        account_number: body.account_number,
        account_title: body.account_title,
        account_type: body.account_type,
        currency_code: body.currency.code,
        currency_name: body.currency.name,
        currency_symbol: body.currency.symbol,
        is_default_account: body.is_default_account,
        provider_username: body.credentials.username,
        provider_password: body.credentials.password,
        device_id: body.device_info.device_id,
    };

    let account = LinkedAccountService::link_account(db.get_ref(), auth_user.user_id, data).await?;

    Ok(HttpResponse::Created().json(AccountResponse::from(&account)))
}

/// GET /linked-accounts - Lister ses comptes actifs (PROTÉGÉE)
#[get("")]
pub async fn get_accounts(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let accounts = LinkedAccountService::get_accounts(db.get_ref(), auth_user.user_id).await?;

    let response: Vec<AccountResponse> = accounts.iter().map(AccountResponse::from).collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "accounts": response
    })))
}

/// GET /linked-accounts/{id} - Récupérer un compte (PROTÉGÉE)
#[get("/{id}")]
pub async fn get_account(
    auth_user: AuthUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let account =
        LinkedAccountService::get_account(db.get_ref(), auth_user.user_id, path.into_inner())
            .await?;

    Ok(HttpResponse::Ok().json(AccountResponse::from(&account)))
}

/// DELETE /linked-accounts/{id} - Délier un compte, soft-delete (PROTÉGÉE)
#[delete("/{id}")]
pub async fn unlink_account(
    auth_user: AuthUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    LinkedAccountService::unlink_account(db.get_ref(), auth_user.user_id, path.into_inner())
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// PATCH /linked-accounts/{id}/default - Définir le compte par défaut (PROTÉGÉE)
#[patch("/{id}/default")]
pub async fn set_default_account(
    auth_user: AuthUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let account = LinkedAccountService::set_default_account(
        db.get_ref(),
        auth_user.user_id,
        path.into_inner(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "id": account.id,
        "isDefaultAccount": true
    })))
}

/// POST /linked-accounts/{id}/refresh - Rafraîchir un compte (PROTÉGÉE)
#[post("/{id}/refresh")]
pub async fn refresh_account(
    auth_user: AuthUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let account =
        LinkedAccountService::refresh_account(db.get_ref(), auth_user.user_id, path.into_inner())
            .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "id": account.id,
        "lastSyncAt": account.last_sync_at.map(|t| t.to_rfc3339()),
        "status": "SUCCESS"
    })))
}

pub fn linked_account_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/linked-accounts")
            .service(link_account)
            .service(get_accounts)
            .service(get_account)
            .service(unlink_account)
            .service(set_default_account)
            .service(refresh_account),
    );
}
