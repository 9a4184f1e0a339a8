// ============================================================================
// MODÈLE : VERIFICATION TOKENS
// ============================================================================
//
// Description:
//   Token opaque (32 octets aléatoires, 64 caractères hex) émis après un
//   échange OTP réussi. Prouve qu'une vérification téléphone vient d'aboutir,
//   indépendamment des JWT de session.
//
// Colonnes de la table verification_tokens:
//   - id (UUID, PRIMARY KEY)
//   - token (VARCHAR(64), UNIQUE, NOT NULL)
//   - phone (VARCHAR(50), NOT NULL)
//   - expires_at (TIMESTAMPTZ, NOT NULL) - created_at + 2 minutes
//   - created_at (TIMESTAMPTZ, NOT NULL)
//
// Points d'attention:
//   - Usage unique : la validation supprime la ligne. La suppression filtrée
//     (token = ? AND expires_at > now) est l'unique test de validité, donc
//     deux validations concurrentes ne peuvent pas réussir toutes les deux
//   - Un token inconnu/expiré/déjà utilisé est un résultat négatif normal,
//     pas une erreur
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "verification_tokens")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub token: String,

    pub phone: String,

    pub expires_at: DateTimeUtc,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
