//! Encrypted on-disk token store
//!
//! The token map is serialized to JSON and sealed with AES-256-GCM. The key
//! is derived with HKDF-SHA256 from a random 32-byte wrapping key kept in a
//! sibling file readable only by the owner.

use std::collections::HashMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::TokenStore;
use crate::errors::{StorageError, StorageResult};

const FORMAT_VERSION: u32 = 1;
const NONCE_SIZE: usize = 12;
const KEY_INFO: &[u8] = b"kinema-token-store-v1";
const WRAP_KEY_EXTENSION: &str = "key";

#[derive(Debug, Serialize, Deserialize)]
struct SealedTokens {
    /// Base64 encoded nonce
    nonce: String,
    /// Base64 encoded encrypted token map
    ciphertext: String,
    version: u32,
}

#[derive(Debug)]
pub struct EncryptedFileTokenStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl EncryptedFileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn wrap_key_path(&self) -> PathBuf {
        self.path.with_extension(WRAP_KEY_EXTENSION)
    }

    fn load_wrap_key(&self) -> StorageResult<Option<Zeroizing<Vec<u8>>>> {
        let path = self.wrap_key_path();
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(&path).map_err(StorageError::ReadFailed)?;
        Ok(Some(Zeroizing::new(bytes)))
    }

    fn load_or_create_wrap_key(&self) -> StorageResult<Zeroizing<Vec<u8>>> {
        if let Some(key) = self.load_wrap_key()? {
            return Ok(key);
        }
        let key = Aes256Gcm::generate_key(&mut OsRng);
        let key = Zeroizing::new(key.to_vec());
        write_private(&self.wrap_key_path(), &key)?;
        log::debug!(
            "[TokenStore] Created wrapping key at {:?}",
            self.wrap_key_path()
        );
        Ok(key)
    }

    fn cipher(wrap_key: &[u8]) -> StorageResult<Aes256Gcm> {
        let hk = hkdf::Hkdf::<sha2::Sha256>::new(None, wrap_key);
        let mut okm = Zeroizing::new([0u8; 32]);
        hk.expand(KEY_INFO, &mut okm[..])
            .map_err(|_| StorageError::KeyDerivationFailed)?;
        let key = Key::<Aes256Gcm>::from_slice(&okm[..]);
        Ok(Aes256Gcm::new(key))
    }

    fn read_map(&self) -> StorageResult<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let Some(wrap_key) = self.load_wrap_key()? else {
            log::warn!(
                "[TokenStore] Token file {:?} has no wrapping key; ignoring it",
                self.path
            );
            return Ok(HashMap::new());
        };

        let json =
            std::fs::read_to_string(&self.path).map_err(StorageError::ReadFailed)?;
        let sealed: SealedTokens =
            serde_json::from_str(&json).map_err(StorageError::CorruptedData)?;
        if sealed.version != FORMAT_VERSION {
            log::warn!(
                "[TokenStore] Unsupported token store version {}; ignoring it",
                sealed.version
            );
            return Ok(HashMap::new());
        }

        let nonce_bytes = BASE64
            .decode(&sealed.nonce)
            .map_err(|e| StorageError::DecryptionFailed(e.to_string()))?;
        if nonce_bytes.len() != NONCE_SIZE {
            return Err(StorageError::DecryptionFailed(format!(
                "invalid nonce length: expected {} bytes, got {}",
                NONCE_SIZE,
                nonce_bytes.len()
            )));
        }
        let ciphertext = BASE64
            .decode(&sealed.ciphertext)
            .map_err(|e| StorageError::DecryptionFailed(e.to_string()))?;

        let cipher = Self::cipher(&wrap_key)?;
        let plaintext = cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), &ciphertext[..])
            .map_err(|e| StorageError::DecryptionFailed(e.to_string()))?;
        let plaintext = Zeroizing::new(plaintext);

        serde_json::from_slice(&plaintext).map_err(StorageError::CorruptedData)
    }

    fn write_map(&self, map: &HashMap<String, String>) -> StorageResult<()> {
        if map.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path)
                    .map_err(StorageError::WriteFailed)?;
                log::info!("[TokenStore] Cleared token store");
            }
            return Ok(());
        }

        let wrap_key = self.load_or_create_wrap_key()?;
        let cipher = Self::cipher(&wrap_key)?;
        let plaintext = Zeroizing::new(
            serde_json::to_vec(map).map_err(StorageError::CorruptedData)?,
        );
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, &plaintext[..])
            .map_err(|e| StorageError::EncryptionFailed(e.to_string()))?;

        let sealed = SealedTokens {
            nonce: BASE64.encode(nonce),
            ciphertext: BASE64.encode(ciphertext),
            version: FORMAT_VERSION,
        };
        let json = serde_json::to_vec_pretty(&sealed)
            .map_err(StorageError::CorruptedData)?;
        write_private(&self.path, &json)
    }

    fn update(
        &self,
        change: impl FnOnce(&mut HashMap<String, String>),
    ) -> StorageResult<()> {
        let _guard = self.lock.lock();
        let mut map = self.read_map()?;
        change(&mut map);
        self.write_map(&map)
    }
}

impl TokenStore for EncryptedFileTokenStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self.lock.lock();
        let mut map = self.read_map()?;
        Ok(map.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.update(|map| {
            map.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.update(|map| {
            map.remove(key);
        })
    }

    fn apply(&self, changes: &[(&str, Option<&str>)]) -> StorageResult<()> {
        self.update(|map| {
            for (key, value) in changes {
                match value {
                    Some(value) => {
                        map.insert(key.to_string(), value.to_string());
                    }
                    None => {
                        map.remove(*key);
                    }
                }
            }
        })
    }
}

/// Write through a temp file and rename, restricting permissions on unix.
fn write_private(path: &Path, contents: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(StorageError::WriteFailed)?;
    }
    let tmp = path.with_extension("tmp");
    let mut file =
        std::fs::File::create(&tmp).map_err(StorageError::WriteFailed)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))
            .map_err(StorageError::WriteFailed)?;
    }
    file.write_all(contents).map_err(StorageError::WriteFailed)?;
    file.sync_all().map_err(StorageError::WriteFailed)?;
    drop(file);
    std::fs::rename(&tmp, path).map_err(StorageError::WriteFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> EncryptedFileTokenStore {
        EncryptedFileTokenStore::new(dir.path().join("tokens.enc"))
    }

    #[test]
    fn survives_reopen() {
        let dir = TempDir::new().unwrap();
        store_in(&dir).set(ACCESS_TOKEN_KEY, "A1").unwrap();
        store_in(&dir).set(REFRESH_TOKEN_KEY, "R1").unwrap();

        let reopened = store_in(&dir);
        assert_eq!(reopened.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("A1"));
        assert_eq!(reopened.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("R1"));
    }

    #[test]
    fn tokens_are_not_stored_in_plaintext() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set(ACCESS_TOKEN_KEY, "very-secret-access").unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(!raw.contains("very-secret-access"));
    }

    #[test]
    fn removing_last_entry_deletes_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .apply(&[(ACCESS_TOKEN_KEY, Some("A1")), (REFRESH_TOKEN_KEY, Some("R1"))])
            .unwrap();
        assert!(store.path().exists());

        store
            .apply(&[(ACCESS_TOKEN_KEY, None), (REFRESH_TOKEN_KEY, None)])
            .unwrap();
        assert!(!store.path().exists());
        assert!(store.get(ACCESS_TOKEN_KEY).unwrap().is_none());
    }

    #[test]
    fn tampered_ciphertext_fails_to_decrypt() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set(ACCESS_TOKEN_KEY, "A1").unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let mut sealed: SealedTokens = serde_json::from_str(&raw).unwrap();
        sealed.ciphertext = BASE64.encode(b"not the real ciphertext");
        std::fs::write(store.path(), serde_json::to_string(&sealed).unwrap())
            .unwrap();

        assert!(matches!(
            store.get(ACCESS_TOKEN_KEY),
            Err(StorageError::DecryptionFailed(_))
        ));
    }

    #[test]
    fn missing_wrap_key_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set(ACCESS_TOKEN_KEY, "A1").unwrap();
        std::fs::remove_file(store.wrap_key_path()).unwrap();

        assert!(store.get(ACCESS_TOKEN_KEY).unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn files_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set(ACCESS_TOKEN_KEY, "A1").unwrap();

        for path in [store.path().to_path_buf(), store.wrap_key_path()] {
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600, "{path:?}");
        }
    }
}
