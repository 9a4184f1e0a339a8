// ============================================================================
// MODÈLE : LINKED ACCOUNTS
// ============================================================================
//
// Description:
//   Compte mobile money tiers lié au profil d'un utilisateur.
//
// Invariant:
//   Au plus UN compte avec is_default_account = true par couple
//   (user_id, provider). L'invariant est maintenu par
//   services::linked_account_service (rétrogradation des autres comptes
//   dans la même transaction que l'écriture déclenchante), jamais par un
//   hook de cycle de vie sur l'entité.
//
// Cycle de vie:
//   absent -> actif -> soft-delete (deleted_at) -> réactivé -> actif
//   La réactivation réutilise la ligne soft-delete du même triple
//   (user_id, provider, account_number) pour éviter un conflit d'unicité
//   tout en conservant l'historique et l'id.
//
// Points d'attention:
//   - provider_username / provider_password / device_id sont des secrets :
//     jamais sérialisés en JSON
//   - deleted_at NULL = compte actif ; toutes les lectures filtrent dessus
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Fournisseurs mobile money supportés (enum fermée)
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Provider {
    #[sea_orm(string_value = "ZAAD")]
    Zaad,
    #[sea_orm(string_value = "EDAHAB")]
    Edahab,
    #[sea_orm(string_value = "SAHAL")]
    Sahal,
    #[sea_orm(string_value = "EVCPLUS")]
    Evcplus,
    #[sea_orm(string_value = "SOMNET")]
    Somnet,
    #[sea_orm(string_value = "SOLTELCO")]
    Soltelco,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "linked_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub user_id: Uuid,

    pub provider: Provider,

    pub account_id: String,

    pub account_number: String,

    pub account_title: String,

    pub account_type: String,

    pub currency_code: String,

    pub currency_name: String,

    pub currency_symbol: String,

    pub is_default_account: bool,

    // Identifiants fournisseur (chiffrés côté stockage) - jamais exposés
    #[serde(skip_serializing)]
    pub provider_username: String,

    #[serde(skip_serializing)]
    pub provider_password: String,

    #[serde(skip_serializing)]
    pub device_id: String,

    pub customer_id: Option<String>,

    pub subscription_id: Option<String>,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,

    pub last_sync_at: Option<DateTimeUtc>,

    // Marqueur de soft-delete (NULL = actif)
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,

    #[sea_orm(has_many = "super::account_syncs::Entity")]
    AccountSyncs,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::account_syncs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountSyncs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
