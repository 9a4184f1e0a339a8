// Moteur d'invariant des comptes liés.
//
// Invariant : au plus UN compte par défaut par couple (user, provider),
// sur les comptes actifs. Chaque écriture qui pose is_default_account = true
// rétrograde les autres comptes du couple DANS LA MÊME TRANSACTION : si la
// rétrogradation échoue, l'écriture déclenchante est annulée avec elle.
// C'est une méthode de service explicite, pas un hook de cycle de vie :
// l'ordre des écritures et le contrat d'atomicité sont visibles et testables.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::models::account_syncs;
use crate::models::linked_accounts::{self, Column, Entity as LinkedAccounts, Provider};

/// Données de liaison soumises par le client (déjà validées par la route)
#[derive(Debug, Clone)]
pub struct LinkAccountData {
    pub provider: Provider,
    pub account_id: String,
    pub account_number: String,
    pub account_title: String,
    pub account_type: String,
    pub currency_code: String,
    pub currency_name: String,
    pub currency_symbol: String,
    pub is_default_account: bool,
    pub provider_username: String,
    pub provider_password: String,
    pub device_id: String,
}

pub struct LinkedAccountService;

impl LinkedAccountService {
    /// Lie un compte mobile money au profil de l'utilisateur.
    ///
    /// - un compte actif existe déjà pour (user, provider, account_number)
    ///   -> AccountAlreadyLinked
    /// - une ligne soft-delete existe pour ce triple -> réactivation sur
    ///   place (l'id est conservé, les champs mutables sont écrasés)
    /// - sinon insertion d'une nouvelle ligne
    pub async fn link_account(
        db: &DatabaseConnection,
        user_id: Uuid,
        data: LinkAccountData,
    ) -> Result<linked_accounts::Model, ApiError> {
        let txn = db.begin().await?;

        let active_existing = LinkedAccounts::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::Provider.eq(data.provider))
            .filter(Column::AccountNumber.eq(&data.account_number))
            .filter(Column::DeletedAt.is_null())
            .one(&txn)
            .await?;

        if active_existing.is_some() {
            return Err(ApiError::AccountAlreadyLinked);
        }

        let soft_deleted = LinkedAccounts::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::Provider.eq(data.provider))
            .filter(Column::AccountNumber.eq(&data.account_number))
            .filter(Column::DeletedAt.is_not_null())
            .one(&txn)
            .await?;

        let now = Utc::now();
        let model = match soft_deleted {
            Some(account) => {
                // Réactivation : on réutilise la ligne existante pour
                // conserver l'id et l'historique de synchronisation
                let mut active: linked_accounts::ActiveModel = account.into();
                active.deleted_at = Set(None);
                active.account_id = Set(data.account_id);
                active.account_title = Set(data.account_title);
                active.account_type = Set(data.account_type);
                active.currency_code = Set(data.currency_code);
                active.currency_name = Set(data.currency_name);
                active.currency_symbol = Set(data.currency_symbol);
                active.is_default_account = Set(data.is_default_account);
                active.provider_username = Set(data.provider_username);
                active.provider_password = Set(data.provider_password);
                active.device_id = Set(data.device_id);
                active.updated_at = Set(now);
                active.update(&txn).await?
            }
            None => {
                linked_accounts::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id),
                    provider: Set(data.provider),
                    account_id: Set(data.account_id),
                    account_number: Set(data.account_number),
                    account_title: Set(data.account_title),
                    account_type: Set(data.account_type),
                    currency_code: Set(data.currency_code),
                    currency_name: Set(data.currency_name),
                    currency_symbol: Set(data.currency_symbol),
                    is_default_account: Set(data.is_default_account),
                    provider_username: Set(data.provider_username),
                    provider_password: Set(data.provider_password),
                    device_id: Set(data.device_id),
                    customer_id: Set(None),
                    subscription_id: Set(None),
                    created_at: Set(now),
                    updated_at: Set(now),
                    last_sync_at: Set(None),
                    deleted_at: Set(None),
                }
                .insert(&txn)
                .await?
            }
        };

        if model.is_default_account {
            Self::demote_siblings(&txn, user_id, model.provider, model.id).await?;
            Self::assert_single_default(&txn, user_id, model.provider).await?;
        }

        txn.commit().await?;
        Ok(model)
    }

    /// Liste les comptes actifs de l'utilisateur
    pub async fn get_accounts(
        db: &DatabaseConnection,
        user_id: Uuid,
    ) -> Result<Vec<linked_accounts::Model>, ApiError> {
        let accounts = LinkedAccounts::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::DeletedAt.is_null())
            .order_by_asc(Column::CreatedAt)
            .all(db)
            .await?;
        Ok(accounts)
    }

    /// Récupère un compte actif par id, scoped à l'utilisateur
    pub async fn get_account(
        db: &DatabaseConnection,
        user_id: Uuid,
        account_id: Uuid,
    ) -> Result<linked_accounts::Model, ApiError> {
        Self::find_active(db, user_id, account_id)
            .await?
            .ok_or(ApiError::NotFound("Account not found"))
    }

    /// Délie un compte (soft-delete). Le flag par défaut n'est pas touché :
    /// une réactivation ultérieure le réécrit depuis la soumission et
    /// repasse par la rétrogradation, donc l'invariant tient.
    pub async fn unlink_account(
        db: &DatabaseConnection,
        user_id: Uuid,
        account_id: Uuid,
    ) -> Result<(), ApiError> {
        let account = Self::find_active(db, user_id, account_id)
            .await?
            .ok_or(ApiError::NotFound("Account not found"))?;

        let now = Utc::now();
        let mut active: linked_accounts::ActiveModel = account.into();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(db).await?;

        Ok(())
    }

    /// Marque un compte comme compte par défaut de son provider et
    /// rétrograde les autres dans la même transaction
    pub async fn set_default_account(
        db: &DatabaseConnection,
        user_id: Uuid,
        account_id: Uuid,
    ) -> Result<linked_accounts::Model, ApiError> {
        let txn = db.begin().await?;

        let account = LinkedAccounts::find()
            .filter(Column::Id.eq(account_id))
            .filter(Column::UserId.eq(user_id))
            .filter(Column::DeletedAt.is_null())
            .one(&txn)
            .await?
            .ok_or(ApiError::NotFound("Account not found"))?;

        let provider = account.provider;
        let mut active: linked_accounts::ActiveModel = account.into();
        active.is_default_account = Set(true);
        active.updated_at = Set(Utc::now());
        let model = active.update(&txn).await?;

        Self::demote_siblings(&txn, user_id, provider, model.id).await?;
        Self::assert_single_default(&txn, user_id, provider).await?;

        txn.commit().await?;
        Ok(model)
    }

    /// Rafraîchit un compte : met à jour last_sync_at et ajoute une ligne
    /// d'audit. N'interagit pas avec le flag par défaut.
    pub async fn refresh_account(
        db: &DatabaseConnection,
        user_id: Uuid,
        account_id: Uuid,
    ) -> Result<linked_accounts::Model, ApiError> {
        let account = Self::find_active(db, user_id, account_id)
            .await?
            .ok_or(ApiError::NotFound("Account not found"))?;

        let txn = db.begin().await?;
        let now = Utc::now();

        let mut active: linked_accounts::ActiveModel = account.into();
        active.last_sync_at = Set(Some(now));
        active.updated_at = Set(now);
        let model = active.update(&txn).await?;

        account_syncs::ActiveModel {
            id: Set(Uuid::new_v4()),
            linked_account_id: Set(model.id),
            sync_status: Set("SUCCESS".to_string()),
            error_message: Set(None),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(model)
    }

    async fn find_active(
        db: &DatabaseConnection,
        user_id: Uuid,
        account_id: Uuid,
    ) -> Result<Option<linked_accounts::Model>, DbErr> {
        LinkedAccounts::find()
            .filter(Column::Id.eq(account_id))
            .filter(Column::UserId.eq(user_id))
            .filter(Column::DeletedAt.is_null())
            .one(db)
            .await
    }

    /// Passe is_default_account à false sur tous les AUTRES comptes actifs
    /// du couple (user, provider). Une seule écriture filtrée, exécutée
    /// dans la transaction de l'écriture déclenchante.
    async fn demote_siblings(
        txn: &DatabaseTransaction,
        user_id: Uuid,
        provider: Provider,
        keep_id: Uuid,
    ) -> Result<(), DbErr> {
        LinkedAccounts::update_many()
            .col_expr(Column::IsDefaultAccount, Expr::value(false))
            .filter(Column::UserId.eq(user_id))
            .filter(Column::Provider.eq(provider))
            .filter(Column::Id.ne(keep_id))
            .filter(Column::IsDefaultAccount.eq(true))
            .filter(Column::DeletedAt.is_null())
            .exec(txn)
            .await?;
        Ok(())
    }

    /// Garde-fou : si la rétrogradation est correcte ce compte est
    /// inatteignable. Un compte > 1 annule la transaction.
    async fn assert_single_default(
        txn: &DatabaseTransaction,
        user_id: Uuid,
        provider: Provider,
    ) -> Result<(), ApiError> {
        let defaults = LinkedAccounts::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::Provider.eq(provider))
            .filter(Column::IsDefaultAccount.eq(true))
            .filter(Column::DeletedAt.is_null())
            .count(txn)
            .await?;

        if defaults > 1 {
            return Err(ApiError::Invariant(
                "more than one default account for (user, provider)",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users;
    use sea_orm::{ConnectOptions, ConnectionTrait, Database, Schema};

    async fn setup_db() -> (DatabaseConnection, Uuid) {
        // Une seule connexion : chaque connexion sqlite::memory: aurait
        // sa propre base
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1);
        let db = Database::connect(options).await.unwrap();
        let backend = db.get_database_backend();
        let schema = Schema::new(backend);

        db.execute(backend.build(&schema.create_table_from_entity(users::Entity)))
            .await
            .unwrap();
        db.execute(backend.build(&schema.create_table_from_entity(LinkedAccounts)))
            .await
            .unwrap();
        db.execute(backend.build(&schema.create_table_from_entity(account_syncs::Entity)))
            .await
            .unwrap();

        let user_id = Uuid::new_v4();
        let now = Utc::now();
        users::ActiveModel {
            id: Set(user_id),
            phone: Set("612345678".to_string()),
            name: Set("Test User".to_string()),
            password_hash: Set("pbkdf2:sha256:260000$x$y".to_string()),
            country_code: Set(Some("SO".to_string())),
            preferred_currency: Set("USD".to_string()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&db)
        .await
        .unwrap();

        (db, user_id)
    }

    fn link_data(provider: Provider, number: &str, is_default: bool) -> LinkAccountData {
        LinkAccountData {
            provider,
            account_id: format!("acc-{}", number),
            account_number: number.to_string(),
            account_title: "Main account".to_string(),
            account_type: "MOBILE_WALLET".to_string(),
            currency_code: "USD".to_string(),
            currency_name: "US Dollar".to_string(),
            currency_symbol: "$".to_string(),
            is_default_account: is_default,
            provider_username: "user".to_string(),
            provider_password: "pass".to_string(),
            device_id: "device-1".to_string(),
        }
    }

    async fn count_defaults(db: &DatabaseConnection, user_id: Uuid, provider: Provider) -> u64 {
        LinkedAccounts::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::Provider.eq(provider))
            .filter(Column::IsDefaultAccount.eq(true))
            .filter(Column::DeletedAt.is_null())
            .count(db)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_active_link_is_conflict() {
        let (db, user_id) = setup_db().await;

        LinkedAccountService::link_account(&db, user_id, link_data(Provider::Zaad, "100", false))
            .await
            .unwrap();

        let second = LinkedAccountService::link_account(
            &db,
            user_id,
            link_data(Provider::Zaad, "100", false),
        )
        .await;
        assert!(matches!(second, Err(ApiError::AccountAlreadyLinked)));
    }

    #[tokio::test]
    async fn test_unlink_then_relink_reactivates_same_row() {
        let (db, user_id) = setup_db().await;

        let first = LinkedAccountService::link_account(
            &db,
            user_id,
            link_data(Provider::Edahab, "200", false),
        )
        .await
        .unwrap();

        LinkedAccountService::unlink_account(&db, user_id, first.id)
            .await
            .unwrap();

        // Délié : plus visible dans la liste
        let listed = LinkedAccountService::get_accounts(&db, user_id).await.unwrap();
        assert!(listed.is_empty());

        let mut data = link_data(Provider::Edahab, "200", false);
        data.account_title = "Renamed".to_string();
        let relinked = LinkedAccountService::link_account(&db, user_id, data)
            .await
            .unwrap();

        assert_eq!(relinked.id, first.id);
        assert_eq!(relinked.account_title, "Renamed");
        assert!(relinked.deleted_at.is_none());
    }

    #[tokio::test]
    async fn test_exactly_one_default_after_each_write() {
        let (db, user_id) = setup_db().await;

        let a = LinkedAccountService::link_account(
            &db,
            user_id,
            link_data(Provider::Zaad, "300", true),
        )
        .await
        .unwrap();
        assert_eq!(count_defaults(&db, user_id, Provider::Zaad).await, 1);

        let b = LinkedAccountService::link_account(
            &db,
            user_id,
            link_data(Provider::Zaad, "301", true),
        )
        .await
        .unwrap();
        assert_eq!(count_defaults(&db, user_id, Provider::Zaad).await, 1);

        // B est maintenant le défaut, A a été rétrogradé
        let a_now = LinkedAccountService::get_account(&db, user_id, a.id)
            .await
            .unwrap();
        assert!(!a_now.is_default_account);
        assert!(b.is_default_account);

        // Re-promouvoir A explicitement
        LinkedAccountService::set_default_account(&db, user_id, a.id)
            .await
            .unwrap();
        assert_eq!(count_defaults(&db, user_id, Provider::Zaad).await, 1);
        let b_now = LinkedAccountService::get_account(&db, user_id, b.id)
            .await
            .unwrap();
        assert!(!b_now.is_default_account);
    }

    #[tokio::test]
    async fn test_default_is_scoped_per_provider() {
        let (db, user_id) = setup_db().await;

        LinkedAccountService::link_account(&db, user_id, link_data(Provider::Zaad, "400", true))
            .await
            .unwrap();
        LinkedAccountService::link_account(
            &db,
            user_id,
            link_data(Provider::Edahab, "401", true),
        )
        .await
        .unwrap();

        // Un défaut par provider, pas un défaut global
        assert_eq!(count_defaults(&db, user_id, Provider::Zaad).await, 1);
        assert_eq!(count_defaults(&db, user_id, Provider::Edahab).await, 1);
    }

    #[tokio::test]
    async fn test_set_default_unknown_account_is_not_found() {
        let (db, user_id) = setup_db().await;
        let result =
            LinkedAccountService::set_default_account(&db, user_id, Uuid::new_v4()).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unlink_unknown_account_is_not_found() {
        let (db, user_id) = setup_db().await;
        let result = LinkedAccountService::unlink_account(&db, user_id, Uuid::new_v4()).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_refresh_updates_sync_timestamp_and_appends_audit() {
        let (db, user_id) = setup_db().await;

        let account = LinkedAccountService::link_account(
            &db,
            user_id,
            link_data(Provider::Sahal, "500", true),
        )
        .await
        .unwrap();
        assert!(account.last_sync_at.is_none());

        let refreshed = LinkedAccountService::refresh_account(&db, user_id, account.id)
            .await
            .unwrap();
        assert!(refreshed.last_sync_at.is_some());
        // Le refresh ne touche pas au flag par défaut
        assert!(refreshed.is_default_account);

        let syncs = account_syncs::Entity::find()
            .filter(account_syncs::Column::LinkedAccountId.eq(account.id))
            .all(&db)
            .await
            .unwrap();
        assert_eq!(syncs.len(), 1);
        assert_eq!(syncs[0].sync_status, "SUCCESS");
    }

    #[tokio::test]
    async fn test_reactivation_with_default_demotes_promoted_sibling() {
        let (db, user_id) = setup_db().await;

        // A défaut, puis délié ; B promu entre-temps
        let a = LinkedAccountService::link_account(
            &db,
            user_id,
            link_data(Provider::Zaad, "600", true),
        )
        .await
        .unwrap();
        LinkedAccountService::unlink_account(&db, user_id, a.id)
            .await
            .unwrap();
        let b = LinkedAccountService::link_account(
            &db,
            user_id,
            link_data(Provider::Zaad, "601", true),
        )
        .await
        .unwrap();

        // Réactivation de A avec le flag défaut : B doit être rétrogradé
        let a_again = LinkedAccountService::link_account(
            &db,
            user_id,
            link_data(Provider::Zaad, "600", true),
        )
        .await
        .unwrap();

        assert_eq!(a_again.id, a.id);
        assert_eq!(count_defaults(&db, user_id, Provider::Zaad).await, 1);
        let b_now = LinkedAccountService::get_account(&db, user_id, b.id)
            .await
            .unwrap();
        assert!(!b_now.is_default_account);
    }
}
