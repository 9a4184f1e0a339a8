use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub phone: String,

    pub name: String,

    #[serde(skip_serializing)] // Ne jamais exposer le hash en JSON
    pub password_hash: String,

    pub country_code: Option<String>,

    pub preferred_currency: String,

    pub is_active: bool,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::linked_accounts::Entity")]
    LinkedAccounts,
}

impl Related<super::linked_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LinkedAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
