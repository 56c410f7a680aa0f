use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy_primitives::Address;
use base64::{Engine as _, engine::general_purpose};
use keyring::Entry;
use serde_json::{Value, json};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum SecretsStoreError {
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("UUID error: {0}")]
    UuidError(#[from] uuid::Error),

    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Base64 error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error("UTF-8 error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    #[error("Keyring error: {0}")]
    KeyringError(#[from] keyring::Error),

    #[error("Key not found")]
    KeyNotFound,
}

const SERVICE_NAME: &str = "friendfi";

pub struct SecretsStore {
    data_dir: PathBuf,
}

impl SecretsStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
        }
    }

    fn get_device_key(&self) -> Vec<u8> {
        let uuid_file = self.data_dir.join("friendfi_uuid");

        let uuid = if uuid_file.exists() {
            // Read existing UUID
            std::fs::read_to_string(&uuid_file)
                .map_err(SecretsStoreError::FileError)
                .and_then(|s| s.parse::<Uuid>().map_err(SecretsStoreError::UuidError))
        } else {
            // Generate new UUID
            let new_uuid = Uuid::new_v4();
            let _ = std::fs::create_dir_all(&self.data_dir).map_err(SecretsStoreError::FileError);
            let _ = std::fs::write(uuid_file, new_uuid.to_string())
                .map_err(SecretsStoreError::FileError);
            Ok(new_uuid)
        };

        uuid.expect("Couldn't unwrap UUID").as_bytes().to_vec()
    }

    fn get_file_path(&self) -> PathBuf {
        self.data_dir.join("friendfi.json")
    }

    fn obfuscate(&self, data: &str) -> String {
        let xored: Vec<u8> = data
            .as_bytes()
            .iter()
            .zip(self.get_device_key().iter().cycle())
            .map(|(&x1, &x2)| x1 ^ x2)
            .collect();
        general_purpose::STANDARD_NO_PAD.encode(xored)
    }

    fn deobfuscate(&self, data: &str) -> Result<String, SecretsStoreError> {
        let decoded = general_purpose::STANDARD_NO_PAD
            .decode(data)
            .map_err(SecretsStoreError::Base64Error)?;
        let xored: Vec<u8> = decoded
            .iter()
            .zip(self.get_device_key().iter().cycle())
            .map(|(&x1, &x2)| x1 ^ x2)
            .collect();
        String::from_utf8(xored).map_err(SecretsStoreError::Utf8Error)
    }

    fn read_secrets_file(&self) -> Result<Value, SecretsStoreError> {
        let content = match fs::read_to_string(self.get_file_path()) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::from("{}"),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    fn write_secrets_file(&self, secrets: &Value) -> Result<(), SecretsStoreError> {
        let content = serde_json::to_string_pretty(secrets)?;
        fs::write(self.get_file_path(), content)?;
        Ok(())
    }

    /// Stores a wallet private key in the system's keyring, using the
    /// account address as the identifier.
    ///
    /// On Android there is no system keyring, so keys are XOR-obfuscated
    /// with a per-device UUID and written to a JSON file instead.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// * The Entry creation fails
    /// * Setting the password in the keyring fails
    pub fn store_private_key(
        &self,
        address: &Address,
        private_key_hex: &str,
    ) -> Result<(), SecretsStoreError> {
        let identifier = format!("{address:#x}");
        if cfg!(target_os = "android") {
            let mut secrets = self.read_secrets_file().unwrap_or(json!({}));
            let obfuscated_key = self.obfuscate(private_key_hex);
            secrets[identifier] = json!(obfuscated_key);
            self.write_secrets_file(&secrets)?;
        } else {
            let entry = Entry::new(SERVICE_NAME, identifier.as_str())
                .map_err(SecretsStoreError::KeyringError)?;
            entry
                .set_password(private_key_hex)
                .map_err(SecretsStoreError::KeyringError)?;
        }

        Ok(())
    }

    /// Retrieves the private key hex associated with an account address.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// * The Entry creation fails
    /// * Retrieving the password from the keyring fails
    /// * The key was never stored for this address
    pub fn private_key_for_address(&self, address: &Address) -> Result<String, SecretsStoreError> {
        let identifier = format!("{address:#x}");
        if cfg!(target_os = "android") {
            let secrets = self.read_secrets_file()?;
            let obfuscated_key = secrets[identifier.as_str()]
                .as_str()
                .ok_or(SecretsStoreError::KeyNotFound)?;
            self.deobfuscate(obfuscated_key)
        } else {
            let entry = Entry::new(SERVICE_NAME, identifier.as_str())
                .map_err(SecretsStoreError::KeyringError)?;
            entry.get_password().map_err(SecretsStoreError::KeyringError)
        }
    }

    /// Removes the private key associated with an account address.
    ///
    /// If the entry doesn't exist or the deletion fails, the function will
    /// still return Ok(()) to maintain idempotency.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// * The Entry creation fails
    pub fn remove_private_key_for_address(
        &self,
        address: &Address,
    ) -> Result<(), SecretsStoreError> {
        let identifier = format!("{address:#x}");
        if cfg!(target_os = "android") {
            let mut secrets = self.read_secrets_file()?;
            secrets
                .as_object_mut()
                .map(|obj| obj.remove(identifier.as_str()));
            self.write_secrets_file(&secrets)?;
        } else {
            let entry = Entry::new(SERVICE_NAME, identifier.as_str());
            if let Ok(entry) = entry {
                let _ = entry.delete_credential();
            }
        }
        Ok(())
    }
}
