use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Claims embarquées dans les JWT de session (access et refresh).
/// Validité purement stateless : signature + expiration, pas de révocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,     // user_id
    pub phone: String,
    pub exp: i64,      // expiration timestamp
    pub iat: i64,      // issued at
    pub nbf: i64,      // not before
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign token")]
    Signing,
    #[error("invalid or expired token")]
    Invalid,
}

/// Génère un JWT HS256 pour un utilisateur, avec la durée de vie demandée
pub fn generate_token(
    user_id: Uuid,
    phone: &str,
    secret: &str,
    ttl: Duration,
) -> Result<String, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::Signing);
    }

    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        phone: phone.to_string(),
        exp: (now + ttl).timestamp(),
        iat: now.timestamp(),
        nbf: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| TokenError::Signing)
}

/// Vérifie et décode un JWT de session.
/// Seul HS256 est accepté : un token "alg: none" ou signé avec un autre
/// algorithme est rejeté avant toute lecture des claims.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_nbf = true;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| TokenError::Invalid)?;

    // exp == now est déjà expiré (un ttl de zéro ne donne aucune fenêtre)
    if data.claims.exp <= Utc::now().timestamp() {
        return Err(TokenError::Invalid);
    }

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key";

    #[test]
    fn test_generate_and_validate_token() {
        let user_id = Uuid::new_v4();
        let token = generate_token(user_id, "612345678", SECRET, Duration::hours(24)).unwrap();
        let claims = validate_token(&token, SECRET).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.phone, "612345678");
        assert!(claims.exp > claims.iat);
        assert_eq!(claims.iat, claims.nbf);
    }

    #[test]
    fn test_malformed_token() {
        assert!(matches!(
            validate_token("invalid.token.here", SECRET),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_wrong_secret_always_fails() {
        let token =
            generate_token(Uuid::new_v4(), "612345678", SECRET, Duration::hours(24)).unwrap();
        assert!(matches!(
            validate_token(&token, "another-secret"),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_zero_ttl_is_immediately_invalid() {
        let token = generate_token(Uuid::new_v4(), "612345678", SECRET, Duration::zero()).unwrap();
        assert!(matches!(
            validate_token(&token, SECRET),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_expired_token() {
        let token =
            generate_token(Uuid::new_v4(), "612345678", SECRET, Duration::seconds(-60)).unwrap();
        assert!(matches!(
            validate_token(&token, SECRET),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_empty_secret_rejected_at_signing() {
        assert!(matches!(
            generate_token(Uuid::new_v4(), "612345678", "", Duration::hours(1)),
            Err(TokenError::Signing)
        ));
    }
}
