//! Account key storage
//!
//! Persists account key pairs as two PEM files per account:
//!
//! ```text
//! storage/
//! ├── <name>-private.pem    # 0600
//! └── <name>-public.pem     # 0644
//! ```
//!
//! The base directory is created with restrictive permissions (0700 on
//! Unix).

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, trace};

use crate::error::{AcmeError, StorageError};
use crate::keys::{AccountKeys, KeySpec};

/// File-backed store for account key pairs.
#[derive(Debug)]
pub struct AccountStore {
    base_path: PathBuf,
}

impl AccountStore {
    /// Open (creating if needed) a key store at the given directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or its
    /// permissions cannot be set.
    pub fn new(base_path: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(base_path)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(base_path, fs::Permissions::from_mode(0o700))?;
        }

        info!(
            storage_path = %base_path.display(),
            "Initialized account key storage"
        );

        Ok(Self {
            base_path: base_path.to_path_buf(),
        })
    }

    /// Get the storage base path
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn private_key_path(&self, name: &str) -> PathBuf {
        self.base_path.join(format!("{name}-private.pem"))
    }

    fn public_key_path(&self, name: &str) -> PathBuf {
        self.base_path.join(format!("{name}-public.pem"))
    }

    /// Whether both key files exist for the account.
    pub fn exists(&self, name: &str) -> bool {
        self.private_key_path(name).exists() && self.public_key_path(name).exists()
    }

    /// Persist an account key pair.
    ///
    /// The private key is written with 0600 permissions, the public key
    /// with 0644.
    pub fn save(&self, name: &str, keys: &AccountKeys) -> Result<(), AcmeError> {
        let private_path = self.private_key_path(name);
        let public_path = self.public_key_path(name);

        fs::write(&private_path, keys.private_key_pem()?).map_err(StorageError::Io)?;
        fs::write(&public_path, keys.public_key_pem()?).map_err(StorageError::Io)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&private_path, fs::Permissions::from_mode(0o600))
                .map_err(StorageError::Io)?;
            fs::set_permissions(&public_path, fs::Permissions::from_mode(0o644))
                .map_err(StorageError::Io)?;
        }

        info!(
            account = %name,
            path = %private_path.display(),
            "Saved account key pair"
        );
        Ok(())
    }

    /// Load an account key pair.
    ///
    /// # Errors
    ///
    /// [`StorageError::KeyNotFound`] when the private key file is missing,
    /// [`StorageError::InvalidKey`] when it cannot be parsed.
    pub fn load(&self, name: &str) -> Result<AccountKeys, AcmeError> {
        let private_path = self.private_key_path(name);

        if !private_path.exists() {
            trace!(account = %name, "No stored account key found");
            return Err(StorageError::KeyNotFound {
                path: private_path.display().to_string(),
            }
            .into());
        }

        let pem = fs::read_to_string(&private_path).map_err(StorageError::Io)?;
        let keys = AccountKeys::from_private_key_pem(&pem)
            .map_err(|e| StorageError::InvalidKey(e.to_string()))?;

        debug!(account = %name, "Loaded account key pair");
        Ok(keys)
    }

    /// Generate a fresh key pair and persist it.
    pub fn create_and_save(&self, name: &str, spec: KeySpec) -> Result<AccountKeys, AcmeError> {
        let keys = AccountKeys::generate(spec)?;
        self.save(name, &keys)?;
        Ok(keys)
    }

    /// Load the stored pair, or generate and persist one if absent.
    pub fn load_or_create(&self, name: &str, spec: KeySpec) -> Result<AccountKeys, AcmeError> {
        if self.exists(name) {
            self.load(name)
        } else {
            self.create_and_save(name, spec)
        }
    }

    /// Delete both key files for an account.
    pub fn delete(&self, name: &str) -> Result<(), StorageError> {
        for path in [self.private_key_path(name), self.public_key_path(name)] {
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }
        info!(account = %name, "Deleted stored account keys");
        Ok(())
    }
}
