use std::path::{Path, PathBuf};

use anyhow::Context;
use tokio::sync::{Mutex, OnceCell, RwLock, mpsc};

pub mod access;
pub mod accounts;
pub mod admin;
pub mod analytics;
pub mod app_settings;
mod cache;
pub mod content_store;
pub mod conversation;
pub mod database;
pub mod messages;
pub mod operations;
pub mod rewards;
mod sanitizer;
pub mod secrets_store;
pub mod signers;
pub mod staking;
pub mod users;
pub mod utils;

use crate::chain::{ChainClient, ChainConfig, ChainNetwork};
use crate::error::{FriendFiError, Result};
use crate::init_tracing;

use accounts::Session;
use app_settings::AppSettings;
use cache::QueryCache;
use content_store::ContentStore;
use conversation::ConversationBuilder;
use database::Database;
use operations::{NotificationEvent, OperationTracker};
use secrets_store::SecretsStore;

/// Standard local Kubo API port. Uploads need a node the app can write to.
const DEFAULT_IPFS_API_URL: &str = "http://127.0.0.1:5001";

fn default_ipfs_gateway_url() -> &'static str {
    if cfg!(debug_assertions) {
        "http://127.0.0.1:8080"
    } else {
        "https://ipfs.io"
    }
}

#[derive(Clone, Debug)]
pub struct FriendFiConfig {
    /// Directory for application data
    pub data_dir: PathBuf,

    /// Directory for application logs
    pub logs_dir: PathBuf,

    /// Which CrossFi network the contract lives on
    pub network: ChainNetwork,

    /// Overrides the network's default JSON-RPC endpoint
    pub rpc_url_override: Option<String>,

    /// Overrides the network's default contract address. Mainnet has no
    /// default deployment, so it always needs this.
    pub contract_address_override: Option<String>,

    /// IPFS HTTP API endpoint used for uploads
    pub ipfs_api_url: String,

    /// IPFS gateway used for content fetches
    pub ipfs_gateway_url: String,
}

impl FriendFiConfig {
    pub fn new(data_dir: &Path, logs_dir: &Path) -> Self {
        let env_suffix = if cfg!(debug_assertions) {
            "dev"
        } else {
            "release"
        };
        let formatted_data_dir = data_dir.join(env_suffix);
        let formatted_logs_dir = logs_dir.join(env_suffix);

        Self {
            data_dir: formatted_data_dir,
            logs_dir: formatted_logs_dir,
            network: ChainNetwork::Testnet,
            rpc_url_override: None,
            contract_address_override: None,
            ipfs_api_url: DEFAULT_IPFS_API_URL.to_string(),
            ipfs_gateway_url: default_ipfs_gateway_url().to_string(),
        }
    }

    /// Create a new configuration with explicit chain endpoints
    pub fn new_with_endpoints(
        data_dir: &Path,
        logs_dir: &Path,
        network: ChainNetwork,
        rpc_url_override: Option<String>,
        contract_address_override: Option<String>,
    ) -> Self {
        let mut config = Self::new(data_dir, logs_dir);
        config.network = network;
        config.rpc_url_override = rpc_url_override;
        config.contract_address_override = contract_address_override;
        config
    }
}

pub struct FriendFi {
    pub config: FriendFiConfig,
    database: Database,
    chain: ChainClient,
    content_store: ContentStore,
    conversation: ConversationBuilder,
    cache: QueryCache,
    secrets_store: SecretsStore,
    session: RwLock<Option<Session>>,
    tracker: OperationTracker,
    /// Taken once by the embedding shell to drain write notifications.
    notifications: Mutex<Option<mpsc::Receiver<NotificationEvent>>>,
}

static GLOBAL_FRIENDFI: OnceCell<FriendFi> = OnceCell::const_new();

impl std::fmt::Debug for FriendFi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FriendFi")
            .field("config", &self.config)
            .field("database", &"<REDACTED>")
            .field("chain", &"<REDACTED>")
            .field("secrets_store", &"<REDACTED>")
            .finish()
    }
}

impl FriendFi {
    /// Initializes the FriendFi application with the provided configuration.
    ///
    /// This method sets up the necessary data and log directories, configures
    /// logging, initializes the database, resolves the chain endpoints,
    /// creates the content store and caches, and ensures app settings exist.
    /// The node's chain id is confirmed in the background; a mismatch is
    /// logged rather than fatal so startup works offline.
    ///
    /// # Arguments
    ///
    /// * `config` - A [`FriendFiConfig`] struct specifying directories and endpoints.
    pub async fn initialize_friendfi(config: FriendFiConfig) -> Result<()> {
        GLOBAL_FRIENDFI
            .get_or_try_init(|| async {
                let data_dir = &config.data_dir;
                let logs_dir = &config.logs_dir;

                std::fs::create_dir_all(data_dir)
                    .with_context(|| format!("Failed to create data directory: {:?}", data_dir))
                    .map_err(FriendFiError::from)?;
                std::fs::create_dir_all(logs_dir)
                    .with_context(|| format!("Failed to create logs directory: {:?}", logs_dir))
                    .map_err(FriendFiError::from)?;

                // Only initialize tracing once
                init_tracing(logs_dir);

                tracing::debug!(target: "friendfi::initialize_friendfi", "Logging initialized in directory: {:?}", logs_dir);

                let database = Database::new(data_dir.join("friendfi.sqlite")).await?;

                let chain_config = ChainConfig::resolve(
                    config.network,
                    config.rpc_url_override.as_deref(),
                    config.contract_address_override.as_deref(),
                )?;
                let chain = ChainClient::new(chain_config, ChainClient::default_timeout())?;

                let content_store = ContentStore::new(
                    &config.ipfs_api_url,
                    &config.ipfs_gateway_url,
                    database.clone(),
                );

                let secrets_store = SecretsStore::new(data_dir);
                let (tracker, notification_receiver) = OperationTracker::new();

                let friendfi = Self {
                    config,
                    database,
                    chain,
                    content_store,
                    conversation: ConversationBuilder::new(),
                    cache: QueryCache::new(),
                    secrets_store,
                    session: RwLock::new(None),
                    tracker,
                    notifications: Mutex::new(Some(notification_receiver)),
                };

                // Create default app settings in the database if they don't exist
                AppSettings::find_or_create_default(&friendfi).await?;

                // No need to wait for the chain id check
                tokio::spawn({
                    let chain = friendfi.chain.clone();
                    async move {
                        if let Err(e) = chain.verify_network().await {
                            tracing::warn!(
                                target: "friendfi::initialize_friendfi",
                                "Chain verification failed: {}",
                                e
                            );
                        }
                    }
                });

                tracing::debug!(
                    target: "friendfi::initialize_friendfi",
                    "Initialization complete"
                );
                Ok(friendfi)
            })
            .await
            .map(|_: &FriendFi| ())
    }

    /// Returns a reference to the global FriendFi singleton instance.
    ///
    /// This method provides access to the globally initialized FriendFi
    /// instance that was created by [`FriendFi::initialize_friendfi`]. The
    /// instance is stored as a static singleton using
    /// [`tokio::sync::OnceCell`] to ensure async-safe thread-safe access and
    /// single initialization.
    pub fn get_instance() -> Result<&'static Self> {
        GLOBAL_FRIENDFI.get().ok_or(FriendFiError::Initialization)
    }

    /// Hands the write-notification stream to the embedding shell.
    ///
    /// There is exactly one receiver; the first caller gets it and later
    /// calls return `None`. Without a holder, events are dropped with a
    /// warning once the buffer fills.
    pub async fn take_notification_receiver(&self) -> Option<mpsc::Receiver<NotificationEvent>> {
        self.notifications.lock().await.take()
    }

    /// Deletes all application data: stored keys, the database, cached
    /// contract reads, the session, and log files.
    ///
    /// Account rows are enumerated first so their private keys can be
    /// removed from the keyring before the rows are dropped.
    pub async fn delete_all_data(&self) -> Result<()> {
        tracing::debug!(target: "friendfi::delete_all_data", "Deleting all data");

        match self.all_accounts().await {
            Ok(accounts) => {
                for account in accounts {
                    if let Err(e) = self
                        .secrets_store
                        .remove_private_key_for_address(&account.address)
                    {
                        tracing::warn!(
                            target: "friendfi::delete_all_data",
                            "Failed to remove private key for {:#x}: {}",
                            account.address,
                            e
                        );
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    target: "friendfi::delete_all_data",
                    "Could not enumerate accounts for key cleanup: {}",
                    e
                );
            }
        }

        self.database.delete_all_data().await?;
        self.cache.clear();

        {
            let mut session = self.session.write().await;
            session.take();
        }

        // Remove logs
        if self.config.logs_dir.exists() {
            for entry in std::fs::read_dir(&self.config.logs_dir)? {
                let entry = entry?;
                let path = entry.path();
                if path.is_file() {
                    std::fs::remove_file(path)?;
                } else if path.is_dir() {
                    std::fs::remove_dir_all(path)?;
                }
            }
        }

        Ok(())
    }
}
