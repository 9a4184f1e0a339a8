// connexion BD

use sea_orm::{Database, DatabaseConnection, DbErr};

use crate::config::Config;

pub async fn establish_connection(config: &Config) -> Result<DatabaseConnection, DbErr> {
    Database::connect(&config.database_url).await
}
