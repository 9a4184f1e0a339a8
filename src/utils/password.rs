use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::Hmac;
use pbkdf2::pbkdf2;
use rand::Rng;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const ITERATIONS: u32 = 260000;
const KEY_LENGTH: usize = 32;
const SALT_LENGTH: usize = 16;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed")]
    Hashing,
    #[error("invalid password digest")]
    InvalidDigest,
}

/// Hash un mot de passe avec PBKDF2-HMAC-SHA256 (260000 itérations,
/// salt aléatoire de 16 bytes).
/// Format produit: pbkdf2:sha256:iterations$salt$hash (base64 URL-safe sans padding)
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill(&mut salt);

    let mut key = [0u8; KEY_LENGTH];
    pbkdf2::<HmacSha256>(password.as_bytes(), &salt, ITERATIONS, &mut key)
        .map_err(|_| PasswordError::Hashing)?;

    let salt_b64 = URL_SAFE_NO_PAD.encode(salt);
    let hash_b64 = URL_SAFE_NO_PAD.encode(key);

    Ok(format!("pbkdf2:sha256:{}${}${}", ITERATIONS, salt_b64, hash_b64))
}

/// Vérifie un mot de passe contre un hash stocké.
/// Un mot de passe incorrect retourne Ok(false) ; seul un hash mal formé
/// retourne une erreur.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    // Parser le format: pbkdf2:sha256:iterations$salt$hash
    let parts: Vec<&str> = stored_hash.split('$').collect();
    if parts.len() != 3 {
        return Err(PasswordError::InvalidDigest);
    }

    let header_parts: Vec<&str> = parts[0].split(':').collect();
    if header_parts.len() != 3 || header_parts[0] != "pbkdf2" || header_parts[1] != "sha256" {
        return Err(PasswordError::InvalidDigest);
    }

    let iterations = header_parts[2]
        .parse::<u32>()
        .map_err(|_| PasswordError::InvalidDigest)?;

    let salt = URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|_| PasswordError::InvalidDigest)?;
    let expected_hash = URL_SAFE_NO_PAD
        .decode(parts[2])
        .map_err(|_| PasswordError::InvalidDigest)?;

    if expected_hash.is_empty() {
        return Err(PasswordError::InvalidDigest);
    }

    // Recalculer avec le même salt et les mêmes itérations.
    // Le coût PBKDF2 domine largement la comparaison, pas d'oracle de timing
    // exploitable sur l'égalité finale.
    let mut computed = vec![0u8; expected_hash.len()];
    pbkdf2::<HmacSha256>(password.as_bytes(), &salt, iterations, &mut computed)
        .map_err(|_| PasswordError::Hashing)?;

    Ok(computed == expected_hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("s3cret-phrase").unwrap();
        assert!(hash.starts_with("pbkdf2:sha256:260000$"));
        assert!(verify_password("s3cret-phrase", &hash).unwrap());
    }

    #[test]
    fn test_wrong_password_is_false_not_error() {
        let hash = hash_password("correct-horse").unwrap();
        assert!(!verify_password("battery-staple", &hash).unwrap());
    }

    #[test]
    fn test_same_password_different_salts() {
        let h1 = hash_password("dup").unwrap();
        let h2 = hash_password("dup").unwrap();
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_malformed_digest_is_error() {
        assert!(matches!(
            verify_password("x", "not-a-digest"),
            Err(PasswordError::InvalidDigest)
        ));
        assert!(matches!(
            verify_password("x", "bcrypt:sha256:10$abc$def"),
            Err(PasswordError::InvalidDigest)
        ));
        assert!(matches!(
            verify_password("x", "pbkdf2:sha256:nan$abc$def"),
            Err(PasswordError::InvalidDigest)
        ));
    }
}
