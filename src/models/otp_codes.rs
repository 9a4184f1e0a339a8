// ============================================================================
// MODÈLE : OTP CODES
// ============================================================================
//
// Description:
//   Codes de vérification à 6 chiffres envoyés par WhatsApp pour prouver la
//   possession d'un numéro de téléphone.
//
// Colonnes de la table otp_codes:
//   - id (UUID, PRIMARY KEY)
//   - code (VARCHAR(6), NOT NULL)
//   - phone (VARCHAR(50), NOT NULL)
//   - expires_at (TIMESTAMPTZ, NOT NULL) - created_at + 5 minutes
//   - created_at (TIMESTAMPTZ, NOT NULL)
//
// Workflow:
//   1. Client appelle POST /api/v1/verify/send-code avec son numéro
//   2. Backend génère un code à 6 chiffres, l'insère ici, l'envoie via WhatsApp
//   3. Client soumet le code via POST /api/v1/verify/verify-code
//   4. Backend cherche la ligne la plus récente (phone, code, non expirée)
//   5. Backend SUPPRIME la ligne (consommation) puis émet un verification_token
//
// Points d'attention:
//   - Plusieurs codes actifs par numéro sont permis (pas d'unicité) ;
//     la vérification prend toujours la ligne la plus récente
//   - La consommation se fait par suppression conditionnelle : si deux
//     requêtes concurrentes soumettent le même code, une seule suppression
//     touche une ligne, donc une seule requête réussit
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "otp_codes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub code: String,

    pub phone: String,

    pub expires_at: DateTimeUtc,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
