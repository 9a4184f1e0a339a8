// Historique des synchronisations d'un compte lié (append-only).
// Une ligne par tentative de refresh, succès ou échec.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "account_syncs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub linked_account_id: Uuid,

    pub sync_status: String,

    pub error_message: Option<String>,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::linked_accounts::Entity",
        from = "Column::LinkedAccountId",
        to = "super::linked_accounts::Column::Id"
    )]
    LinkedAccount,
}

impl Related<super::linked_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LinkedAccount.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
