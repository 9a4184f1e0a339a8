// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table PostgreSQL avec SeaORM.
//
// Liste des modules:
//   - users : Utilisateurs (identité par numéro de téléphone)
//   - otp_codes : Codes OTP à 6 chiffres envoyés via WhatsApp (expire 5 min)
//   - verification_tokens : Tokens opaques post-OTP (usage unique, expire 2 min)
//   - linked_accounts : Comptes mobile money liés (ZAAD, EDAHAB, ...)
//   - account_syncs : Historique des synchronisations d'un compte lié
//
// Points d'attention:
//   - Tous les modèles utilisent SeaORM (pas de SQL brut)
//   - Les codes OTP et les tokens sont consommés par SUPPRESSION de la ligne,
//     pas par un flag "used" : la suppression conditionnelle est ce qui rend
//     la consommation atomique entre requêtes concurrentes
//   - linked_accounts utilise un soft-delete (deleted_at) pour permettre la
//     réactivation d'un compte délié sans conflit de clé
//
// ============================================================================

pub mod account_syncs;
pub mod linked_accounts;
pub mod otp_codes;
pub mod users;
pub mod verification_tokens;
