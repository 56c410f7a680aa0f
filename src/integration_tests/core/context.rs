use std::collections::HashMap;

use crate::{Account, FriendFi, FriendFiError};

/// Private keys of the first accounts derived from the standard devnet
/// mnemonic ("test test ... junk"). Anvil and hardhat both pre-fund these;
/// the first one deploys the contract and therefore owns it.
const DEVNET_FUNDED_KEYS: &[&str] = &[
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
    "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
    "0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a",
];

#[derive(Clone)]
pub struct ScenarioContext {
    pub friendfi: &'static FriendFi,
    /// Funded devnet keys not yet claimed by a named wallet.
    pub unclaimed_keys: Vec<&'static str>,
    pub accounts: HashMap<String, Account>,
    /// Private key each named wallet logged in with, for session switching.
    pub keys: HashMap<String, String>,
    /// Username each named wallet registered during this run.
    pub usernames: HashMap<String, String>,
    /// Message texts sent during the scenario, by label.
    pub sent_texts: HashMap<String, String>,
    pub tests_count: u32,
    pub tests_passed: u32,
}

impl ScenarioContext {
    pub fn new(friendfi: &'static FriendFi) -> Self {
        Self {
            friendfi,
            unclaimed_keys: DEVNET_FUNDED_KEYS.to_vec(),
            accounts: HashMap::new(),
            keys: HashMap::new(),
            usernames: HashMap::new(),
            sent_texts: HashMap::new(),
            tests_count: 0,
            tests_passed: 0,
        }
    }

    /// Claims the next funded devnet key for a named wallet.
    pub fn claim_funded_key(&mut self, name: &str) -> Result<&'static str, FriendFiError> {
        if self.unclaimed_keys.is_empty() {
            return Err(FriendFiError::Configuration(format!(
                "No funded devnet key left for wallet '{}'",
                name
            )));
        }
        let key = self.unclaimed_keys.remove(0);
        self.keys.insert(name.to_string(), key.to_string());
        Ok(key)
    }

    pub fn add_account(&mut self, name: &str, account: Account) {
        self.accounts.insert(name.to_string(), account);
    }

    pub fn get_account(&self, name: &str) -> Result<&Account, FriendFiError> {
        self.accounts.get(name).ok_or(FriendFiError::AccountNotFound)
    }

    pub fn get_key(&self, name: &str) -> Result<&String, FriendFiError> {
        self.keys.get(name).ok_or_else(|| {
            FriendFiError::Configuration(format!("No stored key for wallet '{}'", name))
        })
    }

    pub fn add_username(&mut self, name: &str, username: String) {
        self.usernames.insert(name.to_string(), username);
    }

    pub fn add_sent_text(&mut self, label: &str, text: String) {
        self.sent_texts.insert(label.to_string(), text);
    }

    pub fn get_sent_text(&self, label: &str) -> Result<&String, FriendFiError> {
        self.sent_texts.get(label).ok_or_else(|| {
            FriendFiError::Configuration(format!("No sent text stored under '{}'", label))
        })
    }

    pub fn record_test(&mut self, passed: bool) {
        self.tests_count += 1;
        if passed {
            self.tests_passed += 1;
        }
    }
}
