use crate::cipher::KEY_LENGTH;
use crate::ConfigError;

use std::env;
use std::fmt;
use std::path::PathBuf;

pub const ENCRYPTION_KEY_VAR: &str = "BALLOTBOX_ENCRYPTION_KEY";
pub const PUBLIC_SALT_VAR: &str = "BALLOTBOX_PUBLIC_SALT";
pub const DATA_DIR_VAR: &str = "BALLOTBOX_DATA_DIR";

const DEFAULT_PUBLIC_SALT: &str = "public_salt_for_receipts";
const DEFAULT_DATA_DIR: &str = "data";

/// The process-wide 256-bit ballot encryption key.
#[derive(Clone)]
pub struct EncryptionKey([u8; KEY_LENGTH]);

impl EncryptionKey {
    /// Parse a 64-hex-character key, rejecting anything else.
    pub fn from_hex(hex_key: &str) -> Result<Self, ConfigError> {
        if hex_key.len() != KEY_LENGTH * 2 {
            return Err(ConfigError::KeyLength);
        }
        let bytes = hex::decode(hex_key)?;

        let mut key = [0u8; KEY_LENGTH];
        key.copy_from_slice(&bytes);
        Ok(EncryptionKey(key))
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.0
    }
}

// Key material must not leak through debug output or logs.
impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EncryptionKey(..)")
    }
}

/// Process configuration, loaded once at startup.
pub struct Config {
    pub encryption_key: EncryptionKey,
    pub public_salt: String,
    pub data_dir: PathBuf,
}

impl Config {
    /// Read configuration from the environment.
    ///
    /// A missing or malformed encryption key is fatal. The public salt is not
    /// secret but must stay stable for the lifetime of the system, or old
    /// receipts become unverifiable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let hex_key = env::var(ENCRYPTION_KEY_VAR)
            .map_err(|_| ConfigError::MissingVar(ENCRYPTION_KEY_VAR))?;
        let encryption_key = EncryptionKey::from_hex(hex_key.trim())?;

        let public_salt =
            env::var(PUBLIC_SALT_VAR).unwrap_or_else(|_| DEFAULT_PUBLIC_SALT.to_string());
        let data_dir = env::var(DATA_DIR_VAR)
            .unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string())
            .into();

        Ok(Config {
            encryption_key,
            public_salt,
            data_dir,
        })
    }
}
