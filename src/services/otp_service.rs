// Cycle de vie des codes OTP et des tokens de vérification.
//
// Consommation atomique :
//   - un code est consommé par delete_by_id ; si rows_affected == 0 une
//     requête concurrente l'a consommé en premier et on échoue pareil
//   - un token est consommé par un DELETE filtré (token + non expiré) ;
//     le nombre de lignes touchées est l'unique signal de validité
// Aucun verrou applicatif : la sûreté repose sur ces écritures
// conditionnelles mono-ligne.

use chrono::{Duration, Utc};
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::models::otp_codes::{self, Column as OtpColumn, Entity as OtpCodes};
use crate::models::verification_tokens::{self, Column as TokenColumn, Entity as VerificationTokens};

const CODE_TTL_MINUTES: i64 = 5;
const TOKEN_TTL_MINUTES: i64 = 2;
const TOKEN_BYTES: usize = 32;

pub struct OtpService;

impl OtpService {
    /// Génère un code à 6 chiffres pour un numéro et le persiste avec une
    /// expiration de 5 minutes. Les codes précédents restent valides :
    /// l'utilisateur peut recevoir le premier code après en avoir
    /// redemandé un deuxième.
    pub async fn request_code(
        db: &DatabaseConnection,
        phone: &str,
    ) -> Result<String, ApiError> {
        // Source aléatoire cryptographique (thread_rng = ChaCha)
        let code = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000));
        let now = Utc::now();

        otp_codes::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code.clone()),
            phone: Set(phone.to_string()),
            expires_at: Set(now + Duration::minutes(CODE_TTL_MINUTES)),
            created_at: Set(now),
        }
        .insert(db)
        .await?;

        Ok(code)
    }

    /// Valide un code soumis et l'échange contre un token de vérification
    /// opaque (64 caractères hex, expire dans 2 minutes).
    ///
    /// Code inconnu, expiré ou déjà consommé produisent la même erreur :
    /// le client ne doit pas pouvoir distinguer les trois cas.
    pub async fn verify_code(
        db: &DatabaseConnection,
        phone: &str,
        code: &str,
    ) -> Result<String, ApiError> {
        let now = Utc::now();

        let found = OtpCodes::find()
            .filter(OtpColumn::Phone.eq(phone))
            .filter(OtpColumn::Code.eq(code))
            .filter(OtpColumn::ExpiresAt.gt(now))
            .order_by_desc(OtpColumn::CreatedAt)
            .one(db)
            .await?
            .ok_or(ApiError::InvalidOrExpiredCode)?;

        // Consommation : si une requête concurrente a déjà supprimé la
        // ligne, rows_affected vaut 0 et cette requête-ci échoue aussi
        let deleted = OtpCodes::delete_by_id(found.id).exec(db).await?;
        if deleted.rows_affected == 0 {
            return Err(ApiError::InvalidOrExpiredCode);
        }

        // À partir d'ici le code est consommé. Si l'insertion du token
        // échoue, le client doit redemander un code (fenêtre assumée,
        // pas de transaction distribuée).
        let mut token_bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill(&mut token_bytes);
        let token = hex::encode(token_bytes);

        verification_tokens::ActiveModel {
            id: Set(Uuid::new_v4()),
            token: Set(token.clone()),
            phone: Set(phone.to_string()),
            expires_at: Set(now + Duration::minutes(TOKEN_TTL_MINUTES)),
            created_at: Set(now),
        }
        .insert(db)
        .await?;

        Ok(token)
    }

    /// Vérifie un token de vérification et le consomme (usage unique).
    /// Un token inconnu/expiré/déjà utilisé retourne false, pas une erreur.
    pub async fn check_token(db: &DatabaseConnection, token: &str) -> Result<bool, ApiError> {
        let result = VerificationTokens::delete_many()
            .filter(TokenColumn::Token.eq(token))
            .filter(TokenColumn::ExpiresAt.gt(Utc::now()))
            .exec(db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectOptions, ConnectionTrait, Database, Schema};

    async fn setup_db() -> DatabaseConnection {
        // Une seule connexion : chaque connexion sqlite::memory: aurait
        // sa propre base
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1);
        let db = Database::connect(options).await.unwrap();
        let backend = db.get_database_backend();
        let schema = Schema::new(backend);

        db.execute(backend.build(&schema.create_table_from_entity(OtpCodes)))
            .await
            .unwrap();
        db.execute(backend.build(&schema.create_table_from_entity(VerificationTokens)))
            .await
            .unwrap();

        db
    }

    #[tokio::test]
    async fn test_request_code_is_six_digits() {
        let db = setup_db().await;
        let code = OtpService::request_code(&db, "612345678").await.unwrap();

        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn test_code_verifies_exactly_once() {
        let db = setup_db().await;
        let code = OtpService::request_code(&db, "612345678").await.unwrap();

        let token = OtpService::verify_code(&db, "612345678", &code)
            .await
            .unwrap();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));

        // Deuxième soumission du même code : déjà consommé
        let second = OtpService::verify_code(&db, "612345678", &code).await;
        assert!(matches!(second, Err(ApiError::InvalidOrExpiredCode)));
    }

    #[tokio::test]
    async fn test_wrong_code_fails() {
        let db = setup_db().await;
        let code = OtpService::request_code(&db, "612345678").await.unwrap();
        let wrong = if code == "000000" { "000001" } else { "000000" };

        let result = OtpService::verify_code(&db, "612345678", wrong).await;
        assert!(matches!(result, Err(ApiError::InvalidOrExpiredCode)));
    }

    #[tokio::test]
    async fn test_code_for_another_phone_fails() {
        let db = setup_db().await;
        let code = OtpService::request_code(&db, "612345678").await.unwrap();

        let result = OtpService::verify_code(&db, "699999999", &code).await;
        assert!(matches!(result, Err(ApiError::InvalidOrExpiredCode)));
    }

    #[tokio::test]
    async fn test_expired_code_fails_even_if_never_consumed() {
        let db = setup_db().await;
        let now = Utc::now();

        otp_codes::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set("482913".to_string()),
            phone: Set("612345678".to_string()),
            expires_at: Set(now - Duration::seconds(1)),
            created_at: Set(now - Duration::minutes(6)),
        }
        .insert(&db)
        .await
        .unwrap();

        let result = OtpService::verify_code(&db, "612345678", "482913").await;
        assert!(matches!(result, Err(ApiError::InvalidOrExpiredCode)));
    }

    #[tokio::test]
    async fn test_multiple_outstanding_codes_stay_valid() {
        let db = setup_db().await;
        let first = OtpService::request_code(&db, "612345678").await.unwrap();
        let second = OtpService::request_code(&db, "612345678").await.unwrap();

        // Redemander un code n'invalide pas le précédent
        assert!(OtpService::verify_code(&db, "612345678", &second)
            .await
            .is_ok());
        if first != second {
            assert!(OtpService::verify_code(&db, "612345678", &first)
                .await
                .is_ok());
        }
    }

    #[tokio::test]
    async fn test_token_checks_true_exactly_once() {
        let db = setup_db().await;
        let code = OtpService::request_code(&db, "612345678").await.unwrap();
        let token = OtpService::verify_code(&db, "612345678", &code)
            .await
            .unwrap();

        assert!(OtpService::check_token(&db, &token).await.unwrap());
        assert!(!OtpService::check_token(&db, &token).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_token_is_false() {
        let db = setup_db().await;
        let unknown = "a".repeat(64);
        assert!(!OtpService::check_token(&db, &unknown).await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_token_is_false() {
        let db = setup_db().await;
        let now = Utc::now();

        verification_tokens::ActiveModel {
            id: Set(Uuid::new_v4()),
            token: Set("f".repeat(64)),
            phone: Set("612345678".to_string()),
            expires_at: Set(now - Duration::seconds(1)),
            created_at: Set(now - Duration::minutes(3)),
        }
        .insert(&db)
        .await
        .unwrap();

        assert!(!OtpService::check_token(&db, &"f".repeat(64)).await.unwrap());
    }
}
