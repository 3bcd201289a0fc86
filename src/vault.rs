//! Encryption of stored account passwords.
//!
//! A random 32-byte key lives in `vault.key` next to `accounts.json`. When a
//! passphrase is configured the cipher key is derived from it with Argon2id,
//! salted with the first half of the key file, so the key file alone is not
//! enough to read the passwords. Changing the passphrase makes existing
//! ciphertexts unreadable.

use crate::error::AppError;
use argon2::Argon2;
use base64::prelude::*;
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use rand::RngCore;
use std::fs;
use std::path::{Path, PathBuf};

const KEY_FILE: &str = "vault.key";
const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 24;
const TAG_LEN: usize = 16;

pub struct Vault {
    key: [u8; KEY_LEN],
}

impl Vault {
    pub fn open(data_dir: &Path, passphrase: Option<&str>) -> Result<Self, AppError> {
        let key_path = data_dir.join(KEY_FILE);
        let stored = if key_path.exists() {
            read_key_file(&key_path)?
        } else {
            create_key_file(data_dir, &key_path)?
        };

        let key = match passphrase {
            Some(passphrase) => derive_key(passphrase, &stored[..16])?,
            None => stored,
        };

        Ok(Vault { key })
    }

    /// Returns `base64(nonce || ciphertext || tag)`.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, AppError> {
        let cipher = XChaCha20Poly1305::new((&self.key).into());
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = XNonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| AppError::Crypto(format!("encryption failed: {}", e)))?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(BASE64_STANDARD.encode(out))
    }

    pub fn decrypt(&self, encoded: &str) -> Result<String, AppError> {
        let data = BASE64_STANDARD
            .decode(encoded.trim())
            .map_err(|e| AppError::Crypto(format!("stored password is not valid base64: {}", e)))?;
        if data.len() < NONCE_LEN + TAG_LEN {
            return Err(AppError::Crypto("stored password is too short".to_string()));
        }

        let cipher = XChaCha20Poly1305::new((&self.key).into());
        let nonce = XNonce::from_slice(&data[..NONCE_LEN]);
        let plaintext = cipher.decrypt(nonce, &data[NONCE_LEN..]).map_err(|_| {
            AppError::Crypto(
                "could not decrypt stored password (wrong passphrase or vault key?)".to_string(),
            )
        })?;

        String::from_utf8(plaintext)
            .map_err(|_| AppError::Crypto("decrypted password is not valid UTF-8".to_string()))
    }
}

fn read_key_file(path: &Path) -> Result<[u8; KEY_LEN], AppError> {
    let content = fs::read_to_string(path)?;
    let bytes = BASE64_STANDARD
        .decode(content.trim())
        .map_err(|e| AppError::Crypto(format!("{} is corrupt: {}", path.display(), e)))?;

    bytes.try_into().map_err(|_| {
        AppError::Crypto(format!("{} does not hold a {}-byte key", path.display(), KEY_LEN))
    })
}

fn create_key_file(data_dir: &Path, path: &PathBuf) -> Result<[u8; KEY_LEN], AppError> {
    let mut key = [0u8; KEY_LEN];
    rand::thread_rng().fill_bytes(&mut key);

    fs::create_dir_all(data_dir)?;
    fs::write(path, BASE64_STANDARD.encode(key))?;
    restrict_permissions(path)?;
    log::info!("Created new vault key at {}", path.display());

    Ok(key)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), AppError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), AppError> {
    Ok(())
}

fn derive_key(passphrase: &str, salt: &[u8]) -> Result<[u8; KEY_LEN], AppError> {
    let mut key = [0u8; KEY_LEN];
    Argon2::default()
        .hash_password_into(passphrase.as_bytes(), salt, &mut key)
        .map_err(|e| AppError::Crypto(format!("key derivation failed: {}", e)))?;
    Ok(key)
}
