// Configuration chargée depuis l'environnement (.env via dotenv)

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,

    // Base de données
    pub database_url: String,

    // JWT
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub refresh_token_expiration_hours: i64,

    // Passerelle WhatsApp
    pub whatsapp_api_base_url: String,
    pub whatsapp_api_key: String,
    pub whatsapp_session_id: String,

    // Admin
    pub admin_token: String,
}

impl Config {
    /// Construit la config depuis les variables d'environnement.
    /// Les variables critiques (DATABASE_URL, JWT_SECRET) sont obligatoires.
    pub fn from_env() -> Config {
        Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database_url: env::var("DATABASE_URL")
                .expect("DATABASE_URL must be set in .env file"),
            jwt_secret: env::var("JWT_SECRET")
                .expect("JWT_SECRET must be set in .env file"),
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(24),
            refresh_token_expiration_hours: env::var("REFRESH_TOKEN_EXPIRATION_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(24 * 7),
            whatsapp_api_base_url: env::var("WHATSAPP_API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            whatsapp_api_key: env::var("WHATSAPP_API_KEY").unwrap_or_default(),
            whatsapp_session_id: env::var("WHATSAPP_SESSION_ID")
                .unwrap_or_else(|_| "kobacpay".to_string()),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_default(),
        }
    }
}
