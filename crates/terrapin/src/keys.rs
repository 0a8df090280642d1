//! controller keypair management and session jwt signing.
//!
//! the controller owns one rsa-2048 keypair, persisted under an `auth/`
//! directory next to the rest of the persistent state. the private pem
//! signs session jwts; the public pem is handed to newts inside auth-proxy
//! configs so they can verify those jwts without a controller round-trip.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// rsa key size for the controller keypair.
const KEY_BITS: usize = 2048;

/// file name of the pkcs#8 private key pem.
const PRIVATE_KEY_FILE: &str = "jwt_private.pem";

/// file name of the spki public key pem.
const PUBLIC_KEY_FILE: &str = "jwt_public.pem";

/// errors from keypair loading, generation or signing.
#[derive(Debug, Error)]
pub enum KeyError {
    /// filesystem error while reading or writing key material.
    #[error("key file io error: {0}")]
    Io(#[from] std::io::Error),

    /// key generation or pem encoding failed.
    #[error("key material error: {0}")]
    KeyMaterial(String),

    /// jwt signing failed.
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// claims carried in a signed session jwt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// subject: the user id.
    pub sub: String,
    /// user e-mail, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// issued-at, seconds since epoch.
    pub iat: i64,
    /// expiry, seconds since epoch.
    pub exp: i64,
}

impl SessionClaims {
    /// claims for a user session expiring at the given time.
    pub fn new(user_id: &str, email: Option<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: user_id.to_string(),
            email,
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
        }
    }
}

/// the controller keypair, cached in memory after first load.
pub struct JwtKeys {
    private_pem: String,
    public_pem: String,
    encoding_key: EncodingKey,
}

impl JwtKeys {
    /// load the keypair from `<data_dir>/auth/`, generating a fresh one if
    /// either pem file is missing.
    ///
    /// the private key is written with mode 0600, the public key 0644.
    /// both pems are cached; nothing re-reads the disk afterwards.
    pub fn load_or_generate(data_dir: &Path) -> Result<Self, KeyError> {
        let auth_dir = data_dir.join("auth");
        let private_path = auth_dir.join(PRIVATE_KEY_FILE);
        let public_path = auth_dir.join(PUBLIC_KEY_FILE);

        let (private_pem, public_pem) = if private_path.is_file() && public_path.is_file() {
            (
                fs::read_to_string(&private_path)?,
                fs::read_to_string(&public_path)?,
            )
        } else {
            info!(dir = %auth_dir.display(), "generating controller keypair");
            let pems = generate_keypair()?;
            persist_keypair(&auth_dir, &private_path, &public_path, &pems)?;
            pems
        };

        let encoding_key = EncodingKey::from_rsa_pem(private_pem.as_bytes())?;
        Ok(Self {
            private_pem,
            public_pem,
            encoding_key,
        })
    }

    /// the cached spki public key pem.
    pub fn public_key_pem(&self) -> &str {
        &self.public_pem
    }

    /// the cached pkcs#8 private key pem.
    pub fn private_key_pem(&self) -> &str {
        &self.private_pem
    }

    /// sign session claims into an rs256 jwt.
    pub fn sign(&self, claims: &SessionClaims) -> Result<String, KeyError> {
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::RS256),
            claims,
            &self.encoding_key,
        )?;
        Ok(token)
    }
}

/// generate a fresh rsa-2048 keypair as (pkcs#8 private pem, spki public pem).
fn generate_keypair() -> Result<(String, String), KeyError> {
    let mut rng = rand::thread_rng();
    let private_key = RsaPrivateKey::new(&mut rng, KEY_BITS)
        .map_err(|e| KeyError::KeyMaterial(e.to_string()))?;
    let public_key = RsaPublicKey::from(&private_key);

    let private_pem = private_key
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| KeyError::KeyMaterial(e.to_string()))?
        .to_string();
    let public_pem = public_key
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| KeyError::KeyMaterial(e.to_string()))?;

    Ok((private_pem, public_pem))
}

/// write both pems, restricting the private key to the owner.
fn persist_keypair(
    auth_dir: &Path,
    private_path: &Path,
    public_path: &Path,
    (private_pem, public_pem): &(String, String),
) -> Result<(), KeyError> {
    fs::create_dir_all(auth_dir)?;
    fs::write(private_path, private_pem)?;
    fs::write(public_path, public_pem)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(private_path, fs::Permissions::from_mode(0o600))?;
        fs::set_permissions(public_path, fs::Permissions::from_mode(0o644))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{DecodingKey, Validation};

    #[test]
    fn generates_and_persists_keypair() {
        let dir = tempfile::tempdir().unwrap();
        let keys = JwtKeys::load_or_generate(dir.path()).unwrap();

        assert!(keys.private_key_pem().contains("BEGIN PRIVATE KEY"));
        assert!(keys.public_key_pem().contains("BEGIN PUBLIC KEY"));
        assert!(dir.path().join("auth").join(PRIVATE_KEY_FILE).is_file());
        assert!(dir.path().join("auth").join(PUBLIC_KEY_FILE).is_file());
    }

    #[test]
    fn reload_returns_the_same_keypair() {
        let dir = tempfile::tempdir().unwrap();
        let first = JwtKeys::load_or_generate(dir.path()).unwrap();
        let second = JwtKeys::load_or_generate(dir.path()).unwrap();
        assert_eq!(first.public_key_pem(), second.public_key_pem());
        assert_eq!(first.private_key_pem(), second.private_key_pem());
    }

    #[test]
    fn missing_private_key_regenerates_both() {
        let dir = tempfile::tempdir().unwrap();
        let first = JwtKeys::load_or_generate(dir.path()).unwrap();

        std::fs::remove_file(dir.path().join("auth").join(PRIVATE_KEY_FILE)).unwrap();
        let second = JwtKeys::load_or_generate(dir.path()).unwrap();
        assert_ne!(
            first.public_key_pem(),
            second.public_key_pem(),
            "a lone public key must not survive regeneration"
        );
    }

    #[cfg(unix)]
    #[test]
    fn private_key_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        JwtKeys::load_or_generate(dir.path()).unwrap();

        let mode = std::fs::metadata(dir.path().join("auth").join(PRIVATE_KEY_FILE))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);

        let mode = std::fs::metadata(dir.path().join("auth").join(PUBLIC_KEY_FILE))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn signed_jwt_verifies_against_public_pem() {
        let dir = tempfile::tempdir().unwrap();
        let keys = JwtKeys::load_or_generate(dir.path()).unwrap();

        let claims = SessionClaims::new(
            "u1",
            Some("a@x".to_string()),
            Utc::now() + Duration::hours(1),
        );
        let token = keys.sign(&claims).unwrap();

        let decoding = DecodingKey::from_rsa_pem(keys.public_key_pem().as_bytes()).unwrap();
        let decoded = jsonwebtoken::decode::<SessionClaims>(
            &token,
            &decoding,
            &Validation::new(Algorithm::RS256),
        )
        .unwrap();
        assert_eq!(decoded.claims.sub, "u1");
        assert_eq!(decoded.claims.email.as_deref(), Some("a@x"));
    }
}
